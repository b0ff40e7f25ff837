//! Deterministic scene builders shared by the integration tests.

use lienzo::{Color, ColorStop, Gradient, Paint, Shape, Stroke, StrokeCap, StrokeJoin};

pub const CANVAS_WIDTH: u32 = 100;
pub const CANVAS_HEIGHT: u32 = 100;

/// Small LCG so scenes are reproducible without an RNG dependency.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u32
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (self.next() % 10_000) as f32 / 10_000.0 * (hi - lo)
    }

    fn byte(&mut self) -> u8 {
        (self.next() % 256) as u8
    }
}

/// Builds `count` pseudo-random paints — filled rects, circles, gradient
/// fills, the occasional stroke — identical for identical seeds.
pub fn random_shapes(seed: u64, count: usize, w: f32, h: f32) -> Vec<Paint> {
    let mut rng = Lcg(seed.wrapping_add(0x9e37_79b9_7f4a_7c15));
    let mut paints = Vec::with_capacity(count);
    for _ in 0..count {
        let mut shape = Shape::new();
        let x = rng.range(0.0, w * 0.8);
        let y = rng.range(0.0, h * 0.8);
        let sw = rng.range(2.0, w * 0.5);
        let sh = rng.range(2.0, h * 0.5);

        match rng.next() % 3 {
            0 => shape.append_rect(x, y, sw, sh, 0.0, 0.0).unwrap(),
            1 => shape
                .append_rect(x, y, sw, sh, sw * 0.2, sh * 0.2)
                .unwrap(),
            _ => shape
                .append_circle(x + sw * 0.5, y + sh * 0.5, sw * 0.5, sh * 0.5)
                .unwrap(),
        }

        if rng.next() % 4 == 0 {
            let mut gradient =
                Gradient::linear(x, y, x + sw.max(1.0), y + sh.max(1.0)).unwrap();
            gradient
                .color_stops(&[
                    ColorStop::new(0.0, rng.byte(), rng.byte(), rng.byte(), 255),
                    ColorStop::new(1.0, rng.byte(), rng.byte(), rng.byte(), 255),
                ])
                .unwrap();
            shape.fill_gradient(gradient).unwrap();
        } else {
            shape
                .fill(Color::rgba(rng.byte(), rng.byte(), rng.byte(), rng.byte()))
                .unwrap();
        }

        if rng.next() % 3 == 0 {
            let mut stroke = Stroke::new(
                rng.range(0.5, 4.0),
                Color::rgb(rng.byte(), rng.byte(), rng.byte()),
            );
            stroke.cap = match rng.next() % 3 {
                0 => StrokeCap::Butt,
                1 => StrokeCap::Round,
                _ => StrokeCap::Square,
            };
            stroke.join = match rng.next() % 3 {
                0 => StrokeJoin::Bevel,
                1 => StrokeJoin::Round,
                _ => StrokeJoin::Miter,
            };
            shape.set_stroke(stroke).unwrap();
        }

        let mut paint = Paint::from(shape);
        if rng.next() % 5 == 0 {
            paint.opacity((rng.next() % 200 + 55) as u8);
        }
        paints.push(paint);
    }
    paints
}
