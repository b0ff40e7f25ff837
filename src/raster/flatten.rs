//! Path flattening: cubic Béziers into polylines.
//!
//! Curves flatten by recursive midpoint subdivision. The termination test
//! is the flatness criterion over the control polygon: with endpoints P1,
//! P2 and controls C1, C2,
//!
//! ```text
//! d1 = |3·C1 − 2·P1 − P2|      d2 = |3·C2 − 2·P2 − P1|
//! ```
//!
//! taken componentwise, the curve is flat once
//! `max(d1.x, d2.x) + max(d1.y, d2.y)` drops below the tolerance. Flat
//! segments emit a single line to the endpoint; anything else splits at
//! t = 0.5 with de Casteljau and recurses, depth-capped to bound the
//! worst case.

use crate::math::{Matrix, Point};
use crate::path::{Path, PathCommand};

/// Flatness tolerance in design-space units.
const FLATNESS_TOLERANCE: f32 = 0.5;
/// Hard cap on subdivision depth.
const MAX_SUBDIVISIONS: u32 = 32;

/// One connected polyline of a flattened path.
#[derive(Debug, Clone, Default)]
pub(crate) struct Contour {
    pub pts: Vec<Point>,
    pub closed: bool,
}

/// A flattened path: polylines only, ready for stroking or rasterization.
#[derive(Debug, Clone, Default)]
pub(crate) struct Outline {
    pub contours: Vec<Contour>,
}

impl Outline {
    pub fn transform(&mut self, m: &Matrix) {
        if m.is_identity() {
            return;
        }
        for contour in &mut self.contours {
            for p in &mut contour.pts {
                *p = m.apply(*p);
            }
        }
    }

    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut iter = self.contours.iter().flat_map(|c| c.pts.iter());
        let first = *iter.next()?;
        let mut min = first;
        let mut max = first;
        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(|c| c.pts.len() < 2)
    }
}

/// Flattens `path` in design space.
pub(crate) fn flatten(path: &Path) -> Outline {
    let mut outline = Outline::default();
    let mut current = Contour::default();
    let mut pts = path.points().iter();

    for cmd in path.commands() {
        match cmd {
            PathCommand::MoveTo => {
                if current.pts.len() > 1 {
                    outline.contours.push(std::mem::take(&mut current));
                } else {
                    current.pts.clear();
                    current.closed = false;
                }
                current.pts.push(*pts.next().expect("consistent path"));
            }
            PathCommand::LineTo => {
                current.pts.push(*pts.next().expect("consistent path"));
            }
            PathCommand::CubicTo => {
                let c1 = *pts.next().expect("consistent path");
                let c2 = *pts.next().expect("consistent path");
                let end = *pts.next().expect("consistent path");
                let start = *current.pts.last().expect("open sub-path");
                flatten_cubic(start, c1, c2, end, MAX_SUBDIVISIONS, &mut current.pts);
            }
            PathCommand::Close => {
                if current.pts.len() > 1 {
                    current.closed = true;
                    outline.contours.push(std::mem::take(&mut current));
                } else {
                    current.pts.clear();
                }
                current.closed = false;
            }
        }
    }
    if current.pts.len() > 1 {
        outline.contours.push(current);
    }
    outline
}

fn is_flat(p1: Point, c1: Point, c2: Point, p2: Point) -> bool {
    let d1x = (3.0 * c1.x - 2.0 * p1.x - p2.x).abs();
    let d1y = (3.0 * c1.y - 2.0 * p1.y - p2.y).abs();
    let d2x = (3.0 * c2.x - 2.0 * p2.x - p1.x).abs();
    let d2y = (3.0 * c2.y - 2.0 * p2.y - p1.y).abs();
    d1x.max(d2x) + d1y.max(d2y) <= FLATNESS_TOLERANCE
}

fn flatten_cubic(p1: Point, c1: Point, c2: Point, p2: Point, depth: u32, out: &mut Vec<Point>) {
    if depth == 0 || is_flat(p1, c1, c2, p2) {
        out.push(p2);
        return;
    }

    // De Casteljau split at t = 0.5.
    let mid = |a: Point, b: Point| Point::new(0.5 * (a.x + b.x), 0.5 * (a.y + b.y));
    let ab = mid(p1, c1);
    let bc = mid(c1, c2);
    let cd = mid(c2, p2);
    let abc = mid(ab, bc);
    let bcd = mid(bc, cd);
    let abcd = mid(abc, bcd);

    flatten_cubic(p1, ab, abc, abcd, depth - 1, out);
    flatten_cubic(abcd, bcd, cd, p2, depth - 1, out);
}
