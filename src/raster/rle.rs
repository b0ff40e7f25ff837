//! Scanline rasterization into run-length coverage spans.
//!
//! Outlines rasterize through a signed-area accumulation grid: every edge
//! deposits per-pixel area deltas for the scanlines it crosses, then a
//! prefix sum along each row reconstructs the winding-weighted coverage
//! per pixel. The fill rule maps that winding to [0, 1] — non-zero
//! saturates the magnitude, even-odd folds it by parity — and equal
//! quantized coverage runs compress into [`Span`]s. The result is
//! anti-aliased analytically, with no sampling grid.
//!
//! Horizontal clipping happens before accumulation by splitting edges at
//! the clip columns and pinning the outside pieces, which preserves the
//! winding they contribute to the visible strip.

use crate::math::Point;
use crate::shape::FillRule;

use super::flatten::Outline;

/// An integer clip rectangle in target pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RectI {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl RectI {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    pub fn intersect(&self, other: &RectI) -> RectI {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.w).min(other.x + other.w);
        let y1 = (self.y + self.h).min(other.y + other.h);
        RectI::new(x0, y0, x1 - x0, y1 - y0)
    }
}

/// A horizontal run of pixels sharing one coverage value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub y: i32,
    pub x: i32,
    pub len: u16,
    pub coverage: u8,
}

/// Spans sorted by y, then x: the rasterizer's output.
#[derive(Debug, Clone, Default)]
pub struct SpanList {
    pub spans: Vec<Span>,
}

impl SpanList {
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Coverage at one pixel; linear scan, test helper quality.
    #[cfg(test)]
    pub(crate) fn coverage_at(&self, x: i32, y: i32) -> u8 {
        for span in &self.spans {
            if span.y == y && x >= span.x && x < span.x + span.len as i32 {
                return span.coverage;
            }
        }
        0
    }
}

/// Rasterizes a (transformed) outline against `clip`.
pub(crate) fn rasterize(outline: &Outline, rule: FillRule, clip: &RectI) -> SpanList {
    let mut list = SpanList::default();
    if clip.is_empty() || outline.is_empty() {
        return list;
    }
    let Some((min, max)) = outline.bounds() else {
        return list;
    };

    let x0 = (min.x.floor() as i32).max(clip.x);
    let y0 = (min.y.floor() as i32).max(clip.y);
    let x1 = (max.x.ceil() as i32).min(clip.x + clip.w);
    let y1 = (max.y.ceil() as i32).min(clip.y + clip.h);
    if x1 <= x0 || y1 <= y0 {
        return list;
    }

    let w = (x1 - x0) as usize;
    let h = (y1 - y0) as usize;
    let aw = w + 2;
    let mut acc = vec![0.0f32; aw * h];

    let offset = Point::new(x0 as f32, y0 as f32);
    for contour in &outline.contours {
        let pts = &contour.pts;
        if pts.len() < 2 {
            continue;
        }
        for i in 0..pts.len() {
            // Filling treats every contour as closed.
            let a = pts[i];
            let b = pts[(i + 1) % pts.len()];
            let a = Point::new(a.x - offset.x, a.y - offset.y);
            let b = Point::new(b.x - offset.x, b.y - offset.y);
            split_x(a, b, w as f32, |p0, p1| {
                accumulate_edge(&mut acc, aw, h, w as f32, p0, p1);
            });
        }
    }

    sweep(&acc, aw, w, h, rule, x0, y0, &mut list.spans);
    list
}

/// Splits an edge at the clip columns 0 and `w`, pinning outside pieces
/// to the boundary so their winding still lands on the strip.
fn split_x(p0: Point, p1: Point, w: f32, mut emit: impl FnMut(Point, Point)) {
    let dx = p1.x - p0.x;
    let mut ts = [0.0f32, 1.0, 1.0, 1.0];
    let mut n = 1;
    if dx.abs() > 1e-9 {
        for boundary in [0.0, w] {
            let t = (boundary - p0.x) / dx;
            if t > 0.0 && t < 1.0 {
                ts[n] = t;
                n += 1;
            }
        }
        ts[..=n].sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
    }
    ts[n] = 1.0;

    let lerp = |t: f32| {
        Point::new(p0.x + dx * t, p0.y + (p1.y - p0.y) * t)
    };
    for i in 0..n {
        let (ta, tb) = (ts[i], ts[i + 1]);
        if tb - ta <= 0.0 {
            continue;
        }
        let mut a = lerp(ta);
        let mut b = lerp(tb);
        let mid_x = 0.5 * (a.x + b.x);
        if mid_x < 0.0 {
            a.x = 0.0;
            b.x = 0.0;
        } else if mid_x > w {
            a.x = w;
            b.x = w;
        }
        emit(a, b);
    }
}

/// Deposits the signed per-pixel area deltas of one edge. Classic
/// accumulation rasterization: each cell receives d(coverage)/dx terms,
/// later integrated left to right by [`sweep`].
fn accumulate_edge(acc: &mut [f32], aw: usize, h: usize, w: f32, p0: Point, p1: Point) {
    if (p0.y - p1.y).abs() <= 1e-9 {
        return;
    }
    let (dir, top, bot) = if p0.y < p1.y {
        (1.0f32, p0, p1)
    } else {
        (-1.0f32, p1, p0)
    };
    if top.y >= h as f32 || bot.y <= 0.0 {
        return;
    }
    let dxdy = (bot.x - top.x) / (bot.y - top.y);

    let mut x = top.x;
    if top.y < 0.0 {
        x -= top.y * dxdy;
    }
    let y_start = top.y.max(0.0) as usize;
    let y_end = (bot.y.min(h as f32).ceil() as usize).min(h);

    for y in y_start..y_end {
        let row = y * aw;
        let dy = ((y + 1) as f32).min(bot.y) - (y as f32).max(top.y);
        let xnext = x + dxdy * dy;
        let d = dy * dir;
        let (x0, x1) = if x < xnext { (x, xnext) } else { (xnext, x) };
        let x0 = x0.clamp(0.0, w);
        let x1 = x1.clamp(0.0, w);

        let x0floor = x0.floor();
        let x0i = x0floor as usize;
        let x1ceil = x1.ceil();
        let x1i = x1ceil as usize;

        if x1i <= x0i + 1 {
            // The edge crosses a single pixel column this scanline.
            let xmf = 0.5 * (x0 + x1) - x0floor;
            acc[row + x0i] += d - d * xmf;
            acc[row + x0i + 1] += d * xmf;
        } else {
            let s = (x1 - x0).recip();
            let x0f = x0 - x0floor;
            let a0 = 0.5 * s * (1.0 - x0f) * (1.0 - x0f);
            let x1f = x1 - x1ceil + 1.0;
            let am = 0.5 * s * x1f * x1f;
            acc[row + x0i] += d * a0;
            if x1i == x0i + 2 {
                acc[row + x0i + 1] += d * (1.0 - a0 - am);
            } else {
                let a1 = s * (1.5 - x0f);
                acc[row + x0i + 1] += d * (a1 - a0);
                for xi in x0i + 2..x1i - 1 {
                    acc[row + xi] += d * s;
                }
                let a2 = a1 + (x1i - x0i - 3) as f32 * s;
                acc[row + x1i - 1] += d * (1.0 - a2 - am);
            }
            acc[row + x1i] += d * am;
        }
        x = xnext;
    }
}

#[inline]
fn coverage_of(winding: f32, rule: FillRule) -> f32 {
    match rule {
        FillRule::NonZero => winding.abs().min(1.0),
        FillRule::EvenOdd => {
            let t = winding.rem_euclid(2.0);
            if t > 1.0 {
                2.0 - t
            } else {
                t
            }
        }
    }
}

fn sweep(
    acc: &[f32],
    aw: usize,
    w: usize,
    h: usize,
    rule: FillRule,
    x_off: i32,
    y_off: i32,
    spans: &mut Vec<Span>,
) {
    for y in 0..h {
        let row = &acc[y * aw..y * aw + w];
        let mut winding = 0.0f32;
        let mut run_start = 0usize;
        let mut run_cov = 0u8;
        for (x, delta) in row.iter().enumerate() {
            winding += delta;
            let cov = (coverage_of(winding, rule) * 255.0 + 0.5) as u8;
            if cov != run_cov {
                if run_cov != 0 {
                    push_run(spans, x_off, y_off, y, run_start, x, run_cov);
                }
                run_start = x;
                run_cov = cov;
            }
        }
        if run_cov != 0 {
            push_run(spans, x_off, y_off, y, run_start, w, run_cov);
        }
    }
}

fn push_run(
    spans: &mut Vec<Span>,
    x_off: i32,
    y_off: i32,
    y: usize,
    start: usize,
    end: usize,
    coverage: u8,
) {
    let mut start = start;
    while start < end {
        let len = (end - start).min(u16::MAX as usize);
        spans.push(Span {
            y: y_off + y as i32,
            x: x_off + start as i32,
            len: len as u16,
            coverage,
        });
        start += len;
    }
}
