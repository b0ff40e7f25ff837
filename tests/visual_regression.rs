//! Visual regression tests for the software renderer.
//!
//! Each test drives the full `target → push → update → draw → sync`
//! cycle into an in-memory buffer and validates pixels against expected
//! colors.
//!
//! Run with:   cargo test --test visual_regression

use lienzo::{
    Canvas, Color, ColorStop, Colorspace, CompositeMethod, FillRule, Gradient, Matrix, Paint,
    Picture, Scene, Shape, SpreadMode, Stroke, StrokeCap,
};
use lienzo_test_scenes::{check_pixels, checksum, PixelExpectation};

const W: u32 = 100;
const H: u32 = 100;

fn render(paints: Vec<Paint>, cs: Colorspace) -> Vec<u32> {
    lienzo::init(0).unwrap();
    let mut buffer = vec![0u32; (W * H) as usize];
    {
        let mut canvas = Canvas::new().unwrap();
        canvas.target(&mut buffer, W, W, H, cs).unwrap();
        for paint in paints {
            canvas.push(paint).unwrap();
        }
        canvas.update().unwrap();
        canvas.draw().unwrap();
        canvas.sync().unwrap();
    }
    lienzo::term().unwrap();
    buffer
}

fn expect(buffer: &[u32], cs: Colorspace, expectations: &[PixelExpectation]) {
    let failures = check_pixels(buffer, W, H, cs, expectations);
    if !failures.is_empty() {
        panic!(
            "{} pixel expectation(s) failed:\n{}",
            failures.len(),
            failures.join("\n"),
        );
    }
}

fn white_rect_50() -> Paint {
    let mut shape = Shape::new();
    shape.append_rect(0.0, 0.0, 50.0, 50.0, 0.0, 0.0).unwrap();
    shape.fill(Color::WHITE).unwrap();
    Paint::from(shape)
}

/// White 50×50 rect on an ABGR8888 target: inside is solid white, every
/// other pixel stays fully transparent.
#[test]
fn white_rect_abgr_quadrant() {
    let buffer = render(vec![white_rect_50()], Colorspace::Abgr8888);
    for y in 0..H {
        for x in 0..W {
            let px = buffer[(y * W + x) as usize];
            if x < 50 && y < 50 {
                assert_eq!(px, 0xffff_ffff, "pixel ({x},{y})");
            } else {
                assert_eq!(px, 0x0000_0000, "pixel ({x},{y})");
            }
        }
    }
}

/// Left-to-right alpha ramp: output alpha tracks round(x·255/99) within
/// one LSB on every column.
#[test]
fn linear_gradient_alpha_ramp() {
    let mut shape = Shape::new();
    shape.append_rect(0.0, 0.0, 100.0, 100.0, 0.0, 0.0).unwrap();
    let mut gradient = Gradient::linear(0.0, 0.0, 99.0, 0.0).unwrap();
    gradient
        .color_stops(&[
            ColorStop::new(0.0, 0, 0, 0, 0),
            ColorStop::new(1.0, 255, 255, 255, 255),
        ])
        .unwrap();
    shape.fill_gradient(gradient).unwrap();

    let buffer = render(vec![Paint::from(shape)], Colorspace::Argb8888);
    for y in [0u32, 37, 99] {
        for x in 0..W {
            let alpha = (buffer[(y * W + x) as usize] >> 24) as i32;
            let expected = (x as f32 * 255.0 / 99.0).round() as i32;
            assert!(
                (alpha - expected).abs() <= 1,
                "x={x} y={y} alpha={alpha} expected={expected}"
            );
        }
    }
}

/// Red rect clipped by a circle: the rect corner outside the circle is
/// culled, interior pixels keep their fill.
#[test]
fn clip_path_composite() {
    let mut rect = Shape::new();
    rect.append_rect(0.0, 0.0, 50.0, 50.0, 0.0, 0.0).unwrap();
    rect.fill(Color::rgb(255, 0, 0)).unwrap();
    let mut paint = Paint::from(rect);

    let mut circle = Shape::new();
    circle.append_circle(50.0, 50.0, 50.0, 50.0).unwrap();
    paint.composite(Paint::from(circle), CompositeMethod::ClipPath);

    let buffer = render(vec![paint], Colorspace::Abgr8888);
    expect(
        &buffer,
        Colorspace::Abgr8888,
        &[
            PixelExpectation::transparent(0, 0, "corner_outside_circle"),
            PixelExpectation::transparent(10, 10, "still_outside_circle"),
            PixelExpectation::opaque(40, 40, 255, 0, 0, "inside_rect_and_circle"),
            PixelExpectation::opaque(49, 49, 255, 0, 0, "near_center"),
            PixelExpectation::transparent(60, 60, "outside_rect"),
        ],
    );
}

/// An axis-aligned rectangle traced once renders identically under both
/// fill rules.
#[test]
fn fill_rules_agree_on_simple_rect() {
    let build = |rule: FillRule| {
        let mut shape = Shape::new();
        shape.move_to(10.0, 10.0).unwrap();
        shape.line_to(90.0, 10.0).unwrap();
        shape.line_to(90.0, 90.0).unwrap();
        shape.line_to(10.0, 90.0).unwrap();
        shape.close().unwrap();
        shape.fill(Color::rgb(0, 200, 100)).unwrap();
        shape.fill_rule(rule);
        Paint::from(shape)
    };
    let nonzero = render(vec![build(FillRule::NonZero)], Colorspace::Argb8888);
    let evenodd = render(vec![build(FillRule::EvenOdd)], Colorspace::Argb8888);
    assert_eq!(checksum(&nonzero), checksum(&evenodd));
    expect(
        &nonzero,
        Colorspace::Argb8888,
        &[
            PixelExpectation::opaque(50, 50, 0, 200, 100, "interior"),
            PixelExpectation::transparent(5, 5, "exterior"),
        ],
    );
}

/// A triangle traced twice in the same direction fills under non-zero
/// and vanishes under even-odd.
#[test]
fn double_traced_triangle_fill_rule_complement() {
    let build = |rule: FillRule| {
        let mut shape = Shape::new();
        for _ in 0..2 {
            shape.move_to(20.0, 20.0).unwrap();
            shape.line_to(80.0, 20.0).unwrap();
            shape.line_to(50.0, 80.0).unwrap();
            shape.close().unwrap();
        }
        shape.fill(Color::WHITE).unwrap();
        shape.fill_rule(rule);
        Paint::from(shape)
    };
    let nonzero = render(vec![build(FillRule::NonZero)], Colorspace::Argb8888);
    let evenodd = render(vec![build(FillRule::EvenOdd)], Colorspace::Argb8888);
    assert_eq!(nonzero[(40 * W + 50) as usize], 0xffff_ffff);
    assert_eq!(evenodd[(40 * W + 50) as usize], 0);
    // Even-odd output is empty everywhere.
    assert!(evenodd.iter().all(|px| *px == 0));
}

/// Horizontal line, width 10, square caps: black within [5,95)×[45,55)
/// with anti-aliased edges inside one pixel.
#[test]
fn stroke_square_caps() {
    let mut shape = Shape::new();
    shape.move_to(10.0, 50.0).unwrap();
    shape.line_to(90.0, 50.0).unwrap();
    let mut stroke = Stroke::new(10.0, Color::BLACK);
    stroke.cap = StrokeCap::Square;
    shape.set_stroke(stroke).unwrap();

    let buffer = render(vec![Paint::from(shape)], Colorspace::Argb8888);
    for x in 6..94u32 {
        for y in 46..54u32 {
            assert_eq!(
                buffer[(y * W + x) as usize],
                0xff00_0000,
                "interior pixel ({x},{y})"
            );
        }
    }
    for (x, y) in [(3u32, 50u32), (96, 50), (50, 43), (50, 56), (0, 0)] {
        assert_eq!(buffer[(y * W + x) as usize], 0, "outside pixel ({x},{y})");
    }
}

/// A duplicated paint renders bit-identically to its source.
#[test]
fn duplicate_renders_identically() {
    let build = || {
        let mut shape = Shape::new();
        shape.append_circle(40.0, 40.0, 30.0, 20.0).unwrap();
        let mut gradient = Gradient::radial(40.0, 40.0, 30.0).unwrap();
        gradient
            .color_stops(&[
                ColorStop::new(0.0, 255, 220, 0, 255),
                ColorStop::new(0.6, 200, 40, 40, 255),
                ColorStop::new(1.0, 20, 20, 90, 200),
            ])
            .unwrap();
        gradient.spread(SpreadMode::Reflect);
        shape.fill_gradient(gradient).unwrap();
        let mut stroke = Stroke::new(3.0, Color::rgb(10, 10, 10));
        stroke.dash(&[6.0, 3.0]).unwrap();
        shape.set_stroke(stroke).unwrap();
        let mut paint = Paint::from(shape);
        paint.rotate(15.0).unwrap();
        paint.translate(20.0, 10.0).unwrap();
        paint.opacity(220);
        paint
    };
    let original = build();
    let copy = original.duplicate();

    let a = render(vec![original], Colorspace::Argb8888);
    let b = render(vec![copy], Colorspace::Argb8888);
    assert_eq!(checksum(&a), checksum(&b));
    assert!(a.iter().any(|px| *px != 0));
}

/// Split transforms compose to the same rendered output as their sum and
/// product.
#[test]
fn transform_composition_matches_rendered_output() {
    let base = || {
        let mut shape = Shape::new();
        shape.append_rect(5.0, 5.0, 20.0, 12.0, 0.0, 0.0).unwrap();
        shape.fill(Color::rgb(250, 120, 30)).unwrap();
        Paint::from(shape)
    };

    let mut split = base();
    split.translate(8.0, 3.0).unwrap();
    split.translate(12.0, 17.0).unwrap();
    let mut joined = base();
    joined.translate(20.0, 20.0).unwrap();
    let a = render(vec![split], Colorspace::Argb8888);
    let b = render(vec![joined], Colorspace::Argb8888);
    assert_eq!(checksum(&a), checksum(&b));

    let mut split = base();
    split.scale(2.0).unwrap();
    split.scale(1.5).unwrap();
    let mut joined = base();
    joined.scale(3.0).unwrap();
    let a = render(vec![split], Colorspace::Argb8888);
    let b = render(vec![joined], Colorspace::Argb8888);
    assert_eq!(checksum(&a), checksum(&b));
}

/// Same-color stops yield that color for every covered pixel, under all
/// three spread modes and both gradient kinds.
#[test]
fn constant_gradient_is_flat() {
    for spread in [SpreadMode::Pad, SpreadMode::Reflect, SpreadMode::Repeat] {
        for radial in [false, true] {
            let mut shape = Shape::new();
            shape.append_rect(0.0, 0.0, 100.0, 100.0, 0.0, 0.0).unwrap();
            let mut gradient = if radial {
                Gradient::radial(30.0, 30.0, 25.0).unwrap()
            } else {
                Gradient::linear(10.0, 0.0, 55.0, 80.0).unwrap()
            };
            gradient
                .color_stops(&[
                    ColorStop::new(0.0, 12, 34, 56, 255),
                    ColorStop::new(1.0, 12, 34, 56, 255),
                ])
                .unwrap();
            gradient.spread(spread);
            shape.fill_gradient(gradient).unwrap();

            let buffer = render(vec![Paint::from(shape)], Colorspace::Argb8888);
            let expected = 0xff00_0000 | (12 << 16) | (34 << 8) | 56;
            assert!(
                buffer.iter().all(|px| *px == expected),
                "spread {spread:?} radial {radial} produced non-constant output"
            );
        }
    }
}

/// Paint opacity scales the premultiplied output: destination alpha is
/// A·O/255.
#[test]
fn opacity_composes_into_destination_alpha() {
    let mut shape = Shape::new();
    shape.append_rect(0.0, 0.0, 100.0, 100.0, 0.0, 0.0).unwrap();
    shape.fill(Color::rgba(200, 100, 50, 180)).unwrap();
    let mut paint = Paint::from(shape);
    paint.opacity(128);

    let buffer = render(vec![paint], Colorspace::Argb8888);
    let px = buffer[(50 * W + 50) as usize];
    let a = (px >> 24) as i32;
    let r = ((px >> 16) & 0xff) as i32;
    let expected_a = (180.0f32 * 128.0 / 255.0).round() as i32;
    let expected_r = (200.0f32 * expected_a as f32 / 255.0).round() as i32;
    assert!((a - expected_a).abs() <= 1, "alpha {a} vs {expected_a}");
    assert!((r - expected_r).abs() <= 1, "red {r} vs {expected_r}");
}

/// Alpha masking modulates coverage; the inverse mask shows the
/// complement.
#[test]
fn alpha_mask_and_inverse() {
    let masked = |method: CompositeMethod| {
        let mut rect = Shape::new();
        rect.append_rect(0.0, 0.0, 100.0, 100.0, 0.0, 0.0).unwrap();
        rect.fill(Color::WHITE).unwrap();
        let mut paint = Paint::from(rect);

        let mut mask = Shape::new();
        mask.append_rect(0.0, 0.0, 50.0, 100.0, 0.0, 0.0).unwrap();
        mask.fill(Color::rgba(255, 255, 255, 128)).unwrap();
        paint.composite(Paint::from(mask), method);
        paint
    };

    let direct = render(vec![masked(CompositeMethod::AlphaMask)], Colorspace::Argb8888);
    let left = (direct[(50 * W + 20) as usize] >> 24) as i32;
    let right = (direct[(50 * W + 80) as usize] >> 24) as i32;
    assert!((left - 128).abs() <= 1, "masked half alpha {left}");
    assert_eq!(right, 0, "outside the mask nothing shows");

    let inverse = render(
        vec![masked(CompositeMethod::InvAlphaMask)],
        Colorspace::Argb8888,
    );
    let left = (inverse[(50 * W + 20) as usize] >> 24) as i32;
    let right = (inverse[(50 * W + 80) as usize] >> 24) as i32;
    assert!((left - 127).abs() <= 1, "inverse masked half alpha {left}");
    assert_eq!(right, 255, "inverse mask shows the complement fully");
}

/// Luma masking weighs the mask's luminance: white passes, black blocks.
#[test]
fn luma_mask_uses_luminance() {
    let masked = |mask_color: Color| {
        let mut rect = Shape::new();
        rect.append_rect(0.0, 0.0, 100.0, 100.0, 0.0, 0.0).unwrap();
        rect.fill(Color::rgb(0, 0, 255)).unwrap();
        let mut paint = Paint::from(rect);

        let mut mask = Shape::new();
        mask.append_rect(0.0, 0.0, 100.0, 100.0, 0.0, 0.0).unwrap();
        mask.fill(mask_color).unwrap();
        paint.composite(Paint::from(mask), CompositeMethod::LumaMask);
        paint
    };

    let white = render(vec![masked(Color::WHITE)], Colorspace::Argb8888);
    assert!((white[(50 * W + 50) as usize] >> 24) >= 254);

    let black = render(vec![masked(Color::BLACK)], Colorspace::Argb8888);
    assert_eq!(black[(50 * W + 50) as usize] >> 24, 0);
}

/// Scene grouping: the scene's transform and opacity apply to children,
/// drawn in push order.
#[test]
fn scene_transform_and_order() {
    let mut below = Shape::new();
    below.append_rect(0.0, 0.0, 30.0, 30.0, 0.0, 0.0).unwrap();
    below.fill(Color::rgb(255, 0, 0)).unwrap();
    let mut above = Shape::new();
    above.append_rect(10.0, 10.0, 30.0, 30.0, 0.0, 0.0).unwrap();
    above.fill(Color::rgb(0, 255, 0)).unwrap();

    let mut scene = Scene::new();
    scene.push(below);
    scene.push(above);
    let mut paint = Paint::from(scene);
    paint.translate(20.0, 20.0).unwrap();

    let buffer = render(vec![paint], Colorspace::Argb8888);
    expect(
        &buffer,
        Colorspace::Argb8888,
        &[
            // Overlap region: the later child wins.
            PixelExpectation::opaque(35, 35, 0, 255, 0, "later_child_on_top"),
            PixelExpectation::opaque(25, 25, 255, 0, 0, "first_child_visible"),
            PixelExpectation::opaque(55, 55, 0, 255, 0, "translated_second_child"),
            PixelExpectation::transparent(5, 5, "outside_translated_scene"),
        ],
    );
}

/// Raw-buffer pictures render through their transform, nearest sampled.
#[test]
fn raw_picture_scales_to_size() {
    // 2×2 checker: red, green / blue, white, premultiplied ARGB.
    let pixels: Vec<u32> = vec![0xffff_0000, 0xff00_ff00, 0xff00_00ff, 0xffff_ffff];
    let mut picture = Picture::new();
    picture.load_raw(&pixels, 2, 2, true).unwrap();
    picture.set_size(100.0, 100.0).unwrap();

    let buffer = render(vec![Paint::from(picture)], Colorspace::Argb8888);
    expect(
        &buffer,
        Colorspace::Argb8888,
        &[
            PixelExpectation::opaque(20, 20, 255, 0, 0, "top_left_texel"),
            PixelExpectation::opaque(80, 20, 0, 255, 0, "top_right_texel"),
            PixelExpectation::opaque(20, 80, 0, 0, 255, "bottom_left_texel"),
            PixelExpectation::opaque(80, 80, 255, 255, 255, "bottom_right_texel"),
        ],
    );
}

/// Straight-alpha targets un-multiply at sync.
#[test]
fn straight_alpha_target_unmultiplies() {
    let mut shape = Shape::new();
    shape.append_rect(0.0, 0.0, 100.0, 100.0, 0.0, 0.0).unwrap();
    shape.fill(Color::rgba(255, 255, 255, 128)).unwrap();

    let buffer = render(vec![Paint::from(shape)], Colorspace::Argb8888S);
    let px = buffer[(50 * W + 50) as usize];
    assert_eq!(px >> 24, 128, "alpha survives");
    assert!((px >> 16) & 0xff >= 254, "channels back to straight white");

    // The premultiplied variant keeps scaled channels.
    let mut shape = Shape::new();
    shape.append_rect(0.0, 0.0, 100.0, 100.0, 0.0, 0.0).unwrap();
    shape.fill(Color::rgba(255, 255, 255, 128)).unwrap();
    let premul = render(vec![Paint::from(shape)], Colorspace::Argb8888);
    let px = premul[(50 * W + 50) as usize];
    assert!((((px >> 16) & 0xff) as i32 - 128).abs() <= 1);
}

/// Dashed strokes leave gaps along the path.
#[test]
fn dashed_stroke_has_gaps() {
    let mut shape = Shape::new();
    shape.move_to(0.0, 50.0).unwrap();
    shape.line_to(100.0, 50.0).unwrap();
    let mut stroke = Stroke::new(6.0, Color::BLACK);
    stroke.cap = StrokeCap::Butt;
    stroke.dash(&[10.0, 10.0]).unwrap();
    shape.set_stroke(stroke).unwrap();

    let buffer = render(vec![Paint::from(shape)], Colorspace::Argb8888);
    // On segments: [0,10), [20,30), ... Off: [10,20), [30,40), ...
    assert_eq!(buffer[(50 * W + 5) as usize], 0xff00_0000, "first dash");
    assert_eq!(buffer[(50 * W + 15) as usize], 0, "first gap");
    assert_eq!(buffer[(50 * W + 25) as usize], 0xff00_0000, "second dash");
    assert_eq!(buffer[(50 * W + 35) as usize], 0, "second gap");
}

/// A custom matrix composes beneath the accumulated parts.
#[test]
fn custom_matrix_transform() {
    let mut shape = Shape::new();
    shape.append_rect(0.0, 0.0, 10.0, 10.0, 0.0, 0.0).unwrap();
    shape.fill(Color::WHITE).unwrap();
    let mut paint = Paint::from(shape);
    paint.transform(Matrix::translation(40.0, 40.0)).unwrap();

    let buffer = render(vec![paint], Colorspace::Argb8888);
    expect(
        &buffer,
        Colorspace::Argb8888,
        &[
            PixelExpectation::opaque(45, 45, 255, 255, 255, "translated_by_matrix"),
            PixelExpectation::transparent(5, 5, "origin_left_empty"),
        ],
    );
}
