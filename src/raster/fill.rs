//! Fill generators: per-span premultiplied sample production for solid
//! colors and gradients.
//!
//! Gradient sampling goes through a 1024-entry lookup table of
//! premultiplied colors interpolated linearly between adjacent stops.
//! The gradient parameter is evaluated in paint-local space through the
//! inverse of the cumulative transform; for linear gradients it is affine
//! in screen coordinates and walks each span incrementally.

use crate::color::{Color, Colorspace};
use crate::gradient::{Brush, Gradient, GradientKind, SpreadMode};
use crate::math::Matrix;

use super::compose::premultiply;

const LUT_SIZE: usize = 1024;

/// A ready-to-run span filler for one paint, one frame.
pub(crate) enum Filler {
    Solid(u32),
    Gradient(Box<GradientFiller>),
}

pub(crate) struct GradientFiller {
    lut: Vec<u32>,
    spread: SpreadMode,
    kind: FillerKind,
}

enum FillerKind {
    /// t(x, y) = a·x + b·y + c, precomputed from the inverse transform.
    Linear { a: f32, b: f32, c: f32 },
    /// Distance from the design-space center over the radius.
    Radial {
        inv: Matrix,
        cx: f32,
        cy: f32,
        inv_r: f32,
    },
}

impl Filler {
    /// Builds a filler, or `None` when the brush cannot produce samples
    /// (invalid gradient, degenerate transform).
    pub(crate) fn build(
        brush: &Brush,
        total: &Matrix,
        opacity: u8,
        cs: Colorspace,
    ) -> Option<Filler> {
        match brush {
            Brush::Solid(color) => Some(Filler::Solid(solid_color(*color, opacity, cs))),
            Brush::Gradient(gradient) => {
                GradientFiller::build(gradient, total, opacity, cs).map(|g| Filler::Gradient(Box::new(g)))
            }
        }
    }

    /// Writes `len` premultiplied samples for the span starting at (x, y).
    pub(crate) fn span(&self, x: i32, y: i32, len: usize, out: &mut [u32]) {
        match self {
            Filler::Solid(color) => out[..len].fill(*color),
            Filler::Gradient(g) => g.span(x, y, len, out),
        }
    }

    /// The constant color of a solid filler, letting the compositor skip
    /// the scratch scanline.
    pub(crate) fn as_solid(&self) -> Option<u32> {
        match self {
            Filler::Solid(color) => Some(*color),
            Filler::Gradient(_) => None,
        }
    }
}

/// Premultiplies a straight color against `opacity` in the channel order
/// of the target colorspace.
pub(crate) fn solid_color(color: Color, opacity: u8, cs: Colorspace) -> u32 {
    let (r, g, b) = if cs.swaps_rb() {
        (color.b(), color.g(), color.r())
    } else {
        (color.r(), color.g(), color.b())
    };
    let a = mul_u8(color.a(), opacity);
    premultiply(r, g, b, a)
}

#[inline]
fn mul_u8(x: u8, y: u8) -> u8 {
    ((x as u32 * y as u32 + 127) / 255) as u8
}

impl GradientFiller {
    fn build(
        gradient: &Gradient,
        total: &Matrix,
        opacity: u8,
        cs: Colorspace,
    ) -> Option<GradientFiller> {
        if !gradient.is_valid() {
            return None;
        }
        // Screen space → gradient design space.
        let inv = total.concat(&gradient.transform).invert()?;

        let kind = match gradient.kind {
            GradientKind::Linear { x1, y1, x2, y2 } => {
                let dx = x2 - x1;
                let dy = y2 - y1;
                let len2 = dx * dx + dy * dy;
                if len2 <= 0.0 {
                    // Degenerate axis: every pixel samples the last stop.
                    FillerKind::Linear { a: 0.0, b: 0.0, c: 1.0 }
                } else {
                    FillerKind::Linear {
                        a: (inv.sx * dx + inv.ky * dy) / len2,
                        b: (inv.kx * dx + inv.sy * dy) / len2,
                        c: ((inv.tx - x1) * dx + (inv.ty - y1) * dy) / len2,
                    }
                }
            }
            GradientKind::Radial { cx, cy, r } => FillerKind::Radial {
                inv,
                cx,
                cy,
                inv_r: 1.0 / r,
            },
        };

        Some(GradientFiller {
            lut: build_lut(gradient, opacity, cs),
            spread: gradient.spread,
            kind,
        })
    }

    fn span(&self, x: i32, y: i32, len: usize, out: &mut [u32]) {
        match &self.kind {
            FillerKind::Linear { a, b, c } => {
                let mut t = a * x as f32 + b * y as f32 + c;
                for slot in out[..len].iter_mut() {
                    *slot = self.lut[self.lut_index(t)];
                    t += a;
                }
            }
            FillerKind::Radial { inv, cx, cy, inv_r } => {
                // Walk design-space coordinates incrementally along x.
                let mut px = inv.sx * x as f32 + inv.kx * y as f32 + inv.tx;
                let mut py = inv.ky * x as f32 + inv.sy * y as f32 + inv.ty;
                for slot in out[..len].iter_mut() {
                    let dx = px - cx;
                    let dy = py - cy;
                    let t = (dx * dx + dy * dy).sqrt() * inv_r;
                    *slot = self.lut[self.lut_index(t)];
                    px += inv.sx;
                    py += inv.ky;
                }
            }
        }
    }

    #[inline]
    fn lut_index(&self, t: f32) -> usize {
        let t = spread_remap(t, self.spread);
        let idx = (t * (LUT_SIZE - 1) as f32 + 0.5) as usize;
        idx.min(LUT_SIZE - 1)
    }
}

/// Maps the raw gradient parameter into [0, 1] per spread mode.
#[inline]
pub(crate) fn spread_remap(t: f32, spread: SpreadMode) -> f32 {
    if !t.is_finite() {
        return 0.0;
    }
    match spread {
        SpreadMode::Pad => t.clamp(0.0, 1.0),
        SpreadMode::Repeat => {
            let u = t - t.floor();
            u.clamp(0.0, 1.0)
        }
        SpreadMode::Reflect => {
            let u = t - 2.0 * (t * 0.5).floor();
            if u > 1.0 {
                2.0 - u
            } else {
                u
            }
        }
    }
}

fn build_lut(gradient: &Gradient, opacity: u8, cs: Colorspace) -> Vec<u32> {
    let stops = gradient.stops();
    let mut lut = Vec::with_capacity(LUT_SIZE);
    let mut seg = 0usize;
    for i in 0..LUT_SIZE {
        let t = i as f32 / (LUT_SIZE - 1) as f32;
        while seg + 2 < stops.len() && t > stops[seg + 1].offset {
            seg += 1;
        }
        let lo = &stops[seg];
        let hi = &stops[seg + 1];
        let span = hi.offset - lo.offset;
        let f = if t <= lo.offset || span <= 0.0 {
            0.0
        } else if t >= hi.offset {
            1.0
        } else {
            (t - lo.offset) / span
        };
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * f + 0.5) as u8;
        let (mut r, g, mut b, a) = (
            lerp(lo.r, hi.r),
            lerp(lo.g, hi.g),
            lerp(lo.b, hi.b),
            lerp(lo.a, hi.a),
        );
        if cs.swaps_rb() {
            core::mem::swap(&mut r, &mut b);
        }
        let a = mul_u8(a, opacity);
        lut.push(premultiply(r, g, b, a));
    }
    lut
}
