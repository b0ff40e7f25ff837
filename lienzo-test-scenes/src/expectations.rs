use lienzo::Colorspace;

/// A single pixel-color expectation to validate after rendering.
pub struct PixelExpectation {
    pub x: u32,
    pub y: u32,
    pub expected_r: u8,
    pub expected_g: u8,
    pub expected_b: u8,
    pub expected_a: u8,
    /// Per-channel tolerance for comparison (default 2).
    pub tolerance: u8,
    /// Human-readable label for failure messages.
    pub label: &'static str,
}

impl PixelExpectation {
    pub fn new(x: u32, y: u32, r: u8, g: u8, b: u8, a: u8, label: &'static str) -> Self {
        Self {
            x,
            y,
            expected_r: r,
            expected_g: g,
            expected_b: b,
            expected_a: a,
            tolerance: 2,
            label,
        }
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Convenience: expect a fully opaque color.
    pub fn opaque(x: u32, y: u32, r: u8, g: u8, b: u8, label: &'static str) -> Self {
        Self::new(x, y, r, g, b, 255, label)
    }

    /// Convenience: expect a fully transparent pixel.
    pub fn transparent(x: u32, y: u32, label: &'static str) -> Self {
        Self::new(x, y, 0, 0, 0, 0, label)
    }
}

/// Validates pixel expectations against a rendered `u32` target buffer.
///
/// Returns a list of human-readable failure descriptions. An empty list
/// means all expectations passed.
pub fn check_pixels(
    pixels: &[u32],
    width: u32,
    height: u32,
    cs: Colorspace,
    expectations: &[PixelExpectation],
) -> Vec<String> {
    let mut failures = Vec::new();

    for expectation in expectations {
        if expectation.x >= width || expectation.y >= height {
            failures.push(format!(
                "[{}] pixel ({},{}) is outside canvas {}×{}",
                expectation.label, expectation.x, expectation.y, width, height,
            ));
            continue;
        }

        let px = pixels[(expectation.y * width + expectation.x) as usize];
        let (r, g, b, a) = decode(px, cs);

        let tolerance = expectation.tolerance as i16;
        let matches = channel_matches(r, expectation.expected_r, tolerance)
            && channel_matches(g, expectation.expected_g, tolerance)
            && channel_matches(b, expectation.expected_b, tolerance)
            && channel_matches(a, expectation.expected_a, tolerance);

        if !matches {
            failures.push(format!(
                "[{}] pixel ({},{}) expected rgba({},{},{},{}) ±{} but got rgba({},{},{},{})",
                expectation.label,
                expectation.x,
                expectation.y,
                expectation.expected_r,
                expectation.expected_g,
                expectation.expected_b,
                expectation.expected_a,
                expectation.tolerance,
                r,
                g,
                b,
                a,
            ));
        }
    }

    failures
}

fn decode(px: u32, cs: Colorspace) -> (u8, u8, u8, u8) {
    let a = (px >> 24) as u8;
    let c1 = (px >> 16) as u8;
    let c2 = (px >> 8) as u8;
    let c3 = px as u8;
    match cs {
        Colorspace::Argb8888 | Colorspace::Argb8888S => (c1, c2, c3, a),
        Colorspace::Abgr8888 | Colorspace::Abgr8888S => (c3, c2, c1, a),
    }
}

fn channel_matches(actual: u8, expected: u8, tolerance: i16) -> bool {
    let diff = (actual as i16) - (expected as i16);
    diff.abs() <= tolerance
}

/// FNV-1a over the raw pixel words, for cross-run output comparison.
pub fn checksum(pixels: &[u32]) -> u64 {
    let mut hash = 0xcbf2_9ce4_8422_2325u64;
    for px in pixels {
        for byte in px.to_le_bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
    }
    hash
}
