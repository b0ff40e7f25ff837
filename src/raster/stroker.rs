//! Stroke expansion: turns flattened polylines into closed stroke
//! outlines.
//!
//! Each polyline grows into the set of points within width/2 of it: two
//! parallel offset sides, join geometry at interior vertices (miter with
//! bevel fallback, bevel, or round) and cap geometry at open ends (butt,
//! square, or round). Dash patterns split the polyline by arc length
//! before expansion. The resulting contours are filled with the non-zero
//! rule, so overlapping joins and self-intersections resolve themselves.

use smallvec::SmallVec;

use crate::math::Point;
use crate::stroke::{StrokeCap, StrokeJoin};

use super::flatten::{Contour, Outline};

/// Chord error allowed when approximating round joins and caps.
const ARC_TOLERANCE: f32 = 0.25;
const EPS: f32 = 1e-6;

/// Stroke parameters snapshot, detached from the public `Stroke` so
/// prepare tasks can carry it across threads.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StrokeStyle {
    pub width: f32,
    pub cap: StrokeCap,
    pub join: StrokeJoin,
    pub miter_limit: f32,
    pub dash: Option<SmallVec<[f32; 4]>>,
}

pub(crate) fn stroke_outline(outline: &Outline, style: &StrokeStyle) -> Outline {
    let radius = style.width * 0.5;
    let mut result = Outline::default();
    if radius <= 0.0 {
        return result;
    }

    for contour in &outline.contours {
        let mut pts = dedupe(&contour.pts);
        // A closed contour whose last point repeats the first would leave
        // a zero-length seam segment.
        if contour.closed && pts.len() > 1 && pts[0].distance(pts[pts.len() - 1]) <= EPS {
            pts.pop();
        }
        if pts.is_empty() {
            continue;
        }
        match &style.dash {
            Some(pattern) => {
                for piece in dash_polyline(&pts, contour.closed, pattern) {
                    stroke_polyline(&piece, false, radius, style, &mut result);
                }
            }
            None => stroke_polyline(&pts, contour.closed, radius, style, &mut result),
        }
    }
    result
}

fn dedupe(pts: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(pts.len());
    for p in pts {
        if out.last().map_or(true, |last| last.distance(*p) > EPS) {
            out.push(*p);
        }
    }
    out
}

fn stroke_polyline(pts: &[Point], closed: bool, radius: f32, style: &StrokeStyle, out: &mut Outline) {
    match pts.len() {
        0 => {}
        1 => stroke_dot(pts[0], radius, style.cap, out),
        2.. if closed && pts.len() >= 3 => {
            let mut ring = Vec::new();
            offset_ring(pts, radius, style, &mut ring);
            out.contours.push(Contour {
                pts: ring,
                closed: true,
            });

            let reversed: Vec<Point> = pts.iter().rev().copied().collect();
            let mut inner = Vec::new();
            offset_ring(&reversed, radius, style, &mut inner);
            out.contours.push(Contour {
                pts: inner,
                closed: true,
            });
        }
        _ => {
            let mut body = Vec::new();
            offset_side(pts, radius, style, &mut body);

            let d_end = direction(pts[pts.len() - 2], pts[pts.len() - 1]);
            emit_cap(pts[pts.len() - 1], d_end, radius, style.cap, &mut body);

            let reversed: Vec<Point> = pts.iter().rev().copied().collect();
            offset_side(&reversed, radius, style, &mut body);

            let d_start = direction(pts[1], pts[0]);
            emit_cap(pts[0], d_start, radius, style.cap, &mut body);

            out.contours.push(Contour {
                pts: body,
                closed: true,
            });
        }
    }
}

/// A zero-length sub-path still shows its cap shape.
fn stroke_dot(center: Point, radius: f32, cap: StrokeCap, out: &mut Outline) {
    match cap {
        StrokeCap::Butt => {}
        StrokeCap::Round => {
            let mut pts = vec![Point::new(center.x + radius, center.y)];
            emit_arc(
                center,
                radius,
                Point::new(1.0, 0.0),
                2.0 * core::f32::consts::PI,
                &mut pts,
            );
            out.contours.push(Contour { pts, closed: true });
        }
        StrokeCap::Square => {
            let r = radius;
            out.contours.push(Contour {
                pts: vec![
                    Point::new(center.x - r, center.y - r),
                    Point::new(center.x + r, center.y - r),
                    Point::new(center.x + r, center.y + r),
                    Point::new(center.x - r, center.y + r),
                ],
                closed: true,
            });
        }
    }
}

#[inline]
fn direction(from: Point, to: Point) -> Point {
    let len = from.distance(to);
    Point::new((to.x - from.x) / len, (to.y - from.y) / len)
}

#[inline]
fn perp(d: Point) -> Point {
    Point::new(-d.y, d.x)
}

/// Offsets the polyline on its perp side, inserting joins at gaps.
fn offset_side(pts: &[Point], radius: f32, style: &StrokeStyle, out: &mut Vec<Point>) {
    let first_dir = direction(pts[0], pts[1]);
    let n0 = perp(first_dir);
    out.push(Point::new(
        pts[0].x + radius * n0.x,
        pts[0].y + radius * n0.y,
    ));

    for j in 1..pts.len() - 1 {
        let d_in = direction(pts[j - 1], pts[j]);
        let d_out = direction(pts[j], pts[j + 1]);
        offset_vertex(pts[j], d_in, d_out, radius, style, out);
    }

    let last_dir = direction(pts[pts.len() - 2], pts[pts.len() - 1]);
    let nl = perp(last_dir);
    out.push(Point::new(
        pts[pts.len() - 1].x + radius * nl.x,
        pts[pts.len() - 1].y + radius * nl.y,
    ));
}

/// Offsets a closed polyline, joining every vertex including the wrap.
fn offset_ring(pts: &[Point], radius: f32, style: &StrokeStyle, out: &mut Vec<Point>) {
    let n = pts.len();
    for j in 0..n {
        let prev = pts[(j + n - 1) % n];
        let next = pts[(j + 1) % n];
        if prev.distance(pts[j]) <= EPS || pts[j].distance(next) <= EPS {
            continue;
        }
        let d_in = direction(prev, pts[j]);
        let d_out = direction(pts[j], next);
        offset_vertex(pts[j], d_in, d_out, radius, style, out);
    }
}

fn offset_vertex(
    p: Point,
    d_in: Point,
    d_out: Point,
    radius: f32,
    style: &StrokeStyle,
    out: &mut Vec<Point>,
) {
    let u_in = perp(d_in);
    let u_out = perp(d_out);
    let e_in = Point::new(p.x + radius * u_in.x, p.y + radius * u_in.y);
    let e_out = Point::new(p.x + radius * u_out.x, p.y + radius * u_out.y);

    let cross = d_in.x * d_out.y - d_in.y * d_out.x;
    if cross >= -EPS {
        // The offset side is the inner side of this turn; the rings
        // overlap and non-zero filling absorbs it.
        out.push(e_in);
        out.push(e_out);
        return;
    }

    out.push(e_in);
    match style.join {
        StrokeJoin::Bevel => {}
        StrokeJoin::Miter => {
            let mid = Point::new(u_in.x + u_out.x, u_in.y + u_out.y);
            let len2 = mid.x * mid.x + mid.y * mid.y;
            if len2 > EPS {
                // Miter length in half-widths is 2 / |u_in + u_out|.
                let factor = 2.0 / len2.sqrt();
                if factor <= style.miter_limit {
                    out.push(Point::new(
                        p.x + mid.x * 2.0 * radius / len2,
                        p.y + mid.y * 2.0 * radius / len2,
                    ));
                }
            }
        }
        StrokeJoin::Round => {
            let dot = (u_in.x * u_out.x + u_in.y * u_out.y).clamp(-1.0, 1.0);
            let sweep = -(dot.acos());
            emit_arc(p, radius, u_in, sweep, out);
        }
    }
    out.push(e_out);
}

fn emit_cap(p: Point, d: Point, radius: f32, cap: StrokeCap, out: &mut Vec<Point>) {
    let n = perp(d);
    match cap {
        StrokeCap::Butt => {}
        StrokeCap::Square => {
            out.push(Point::new(
                p.x + radius * (n.x + d.x),
                p.y + radius * (n.y + d.y),
            ));
            out.push(Point::new(
                p.x + radius * (d.x - n.x),
                p.y + radius * (d.y - n.y),
            ));
        }
        StrokeCap::Round => {
            // Half turn from +n through d to −n.
            emit_arc(p, radius, n, -core::f32::consts::PI, out);
        }
    }
}

/// Appends points along a circular arc starting at `center + radius·from`
/// and sweeping `sweep` radians. Endpoints are the caller's concern.
fn emit_arc(center: Point, radius: f32, from: Point, sweep: f32, out: &mut Vec<Point>) {
    if radius <= ARC_TOLERANCE {
        return;
    }
    let max_step = 2.0 * (1.0 - ARC_TOLERANCE / radius).clamp(-1.0, 1.0).acos();
    let steps = (sweep.abs() / max_step).ceil().max(1.0) as usize;
    let step = sweep / steps as f32;
    let (sin, cos) = step.sin_cos();
    let mut v = from;
    for _ in 0..steps.saturating_sub(1) {
        v = Point::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos);
        out.push(Point::new(
            center.x + radius * v.x,
            center.y + radius * v.y,
        ));
    }
}

/// Splits a polyline into "on" pieces by walking the dash pattern along
/// accumulated arc length, wrapping as the pattern repeats.
fn dash_polyline(pts: &[Point], closed: bool, pattern: &[f32]) -> Vec<Vec<Point>> {
    let mut looped: Vec<Point>;
    let pts = if closed && pts.len() >= 3 {
        looped = pts.to_vec();
        looped.push(pts[0]);
        looped.as_slice()
    } else {
        pts
    };
    if pts.len() < 2 {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    let mut index = 0usize;
    let mut remaining = pattern[0];
    let mut on = true;
    let mut current: Vec<Point> = vec![pts[0]];

    for win in pts.windows(2) {
        let (a, b) = (win[0], win[1]);
        let mut seg_len = a.distance(b);
        if seg_len <= EPS {
            continue;
        }
        let mut cursor = a;
        while seg_len > remaining {
            let t = remaining / seg_len;
            let split = Point::new(
                cursor.x + (b.x - cursor.x) * t,
                cursor.y + (b.y - cursor.y) * t,
            );
            if on {
                current.push(split);
                if current.len() > 1 {
                    pieces.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            } else {
                current.clear();
                current.push(split);
            }
            on = !on;
            seg_len -= remaining;
            index += 1;
            remaining = pattern[index % pattern.len()];
            cursor = split;
        }
        remaining -= seg_len;
        if on {
            current.push(b);
        }
    }

    if on && current.len() > 1 {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(width: f32) -> StrokeStyle {
        StrokeStyle {
            width,
            cap: StrokeCap::Butt,
            join: StrokeJoin::Bevel,
            miter_limit: 4.0,
            dash: None,
        }
    }

    fn line_outline(a: Point, b: Point) -> Outline {
        Outline {
            contours: vec![Contour {
                pts: vec![a, b],
                closed: false,
            }],
        }
    }

    fn outline_bounds(outline: &Outline) -> (Point, Point) {
        outline.bounds().unwrap()
    }

    #[test]
    fn butt_capped_line_covers_exactly_its_length() {
        let outline = line_outline(Point::new(10.0, 50.0), Point::new(90.0, 50.0));
        let stroked = stroke_outline(&outline, &style(10.0));
        let (min, max) = outline_bounds(&stroked);
        assert!((min.x - 10.0).abs() < 1e-3 && (max.x - 90.0).abs() < 1e-3);
        assert!((min.y - 45.0).abs() < 1e-3 && (max.y - 55.0).abs() < 1e-3);
    }

    #[test]
    fn square_caps_extend_by_half_width() {
        let outline = line_outline(Point::new(10.0, 50.0), Point::new(90.0, 50.0));
        let mut s = style(10.0);
        s.cap = StrokeCap::Square;
        let stroked = stroke_outline(&outline, &s);
        let (min, max) = outline_bounds(&stroked);
        assert!((min.x - 5.0).abs() < 1e-3 && (max.x - 95.0).abs() < 1e-3);
    }

    #[test]
    fn round_caps_stay_within_half_width() {
        let outline = line_outline(Point::new(10.0, 50.0), Point::new(90.0, 50.0));
        let mut s = style(10.0);
        s.cap = StrokeCap::Round;
        let stroked = stroke_outline(&outline, &s);
        let (min, max) = outline_bounds(&stroked);
        assert!(min.x >= 4.9 && max.x <= 95.1);
        assert!(min.y >= 44.9 && max.y <= 55.1);
    }

    #[test]
    fn miter_join_reaches_the_corner() {
        let outline = Outline {
            contours: vec![Contour {
                pts: vec![
                    Point::new(0.0, 50.0),
                    Point::new(50.0, 50.0),
                    Point::new(50.0, 0.0),
                ],
                closed: false,
            }],
        };
        let mut s = style(10.0);
        s.join = StrokeJoin::Miter;
        let stroked = stroke_outline(&outline, &s);
        let (_, max) = outline_bounds(&stroked);
        // The right-angle miter lands at (55, 55).
        assert!((max.x - 55.0).abs() < 1e-3 && (max.y - 55.0).abs() < 1e-3);
    }

    #[test]
    fn sharp_miter_falls_back_to_bevel() {
        let outline = Outline {
            contours: vec![Contour {
                pts: vec![
                    Point::new(0.0, 0.0),
                    Point::new(50.0, 1.0),
                    Point::new(0.0, 2.0),
                ],
                closed: false,
            }],
        };
        let mut s = style(2.0);
        s.join = StrokeJoin::Miter;
        let stroked = stroke_outline(&outline, &s);
        let (_, max) = outline_bounds(&stroked);
        // An un-limited miter would shoot far past x = 51.
        assert!(max.x < 56.0);
    }

    #[test]
    fn closed_contour_produces_two_rings() {
        let outline = Outline {
            contours: vec![Contour {
                pts: vec![
                    Point::new(0.0, 0.0),
                    Point::new(100.0, 0.0),
                    Point::new(100.0, 100.0),
                    Point::new(0.0, 100.0),
                ],
                closed: true,
            }],
        };
        let stroked = stroke_outline(&outline, &style(4.0));
        assert_eq!(stroked.contours.len(), 2);
        let (min, max) = outline_bounds(&stroked);
        assert!(min.x <= -1.9 && max.x >= 101.9);
    }

    #[test]
    fn dashing_splits_by_arc_length() {
        let pts = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let pieces = dash_polyline(&pts, false, &[3.0, 2.0]);
        assert_eq!(pieces.len(), 2);
        assert!((pieces[0][0].x - 0.0).abs() < 1e-4);
        assert!((pieces[0][1].x - 3.0).abs() < 1e-4);
        assert!((pieces[1][0].x - 5.0).abs() < 1e-4);
        assert!((pieces[1][1].x - 8.0).abs() < 1e-4);
    }

    #[test]
    fn dashing_wraps_across_segments() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(4.0, 0.0),
            Point::new(4.0, 4.0),
        ];
        let pieces = dash_polyline(&pts, false, &[6.0, 1.0]);
        // First on-piece spans the corner: 4 along x plus 2 down y.
        assert_eq!(pieces[0].len(), 3);
        assert!((pieces[0][2].y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn stroke_ignores_zero_width() {
        let outline = line_outline(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let stroked = stroke_outline(&outline, &style(0.0));
        assert!(stroked.contours.is_empty());
    }
}
