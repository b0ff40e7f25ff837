//! Path storage: parallel command and point sequences.
//!
//! A [`Path`] keeps two arrays that must stay consistent: a command array
//! drawn from {MoveTo, LineTo, CubicTo, Close} and a point array holding
//! one point per MoveTo/LineTo, three per CubicTo (two controls plus the
//! endpoint) and none per Close. Higher-level appenders (rectangles,
//! circles, arcs) expand into these commands, emitting arcs as cubic
//! Béziers with the 4/3·tan(θ/4) control-distance rule.

use crate::error::{Error, Result};
use crate::math::Point;

/// Control-distance ratio for a quarter-circle cubic approximation.
const PATH_KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCommand {
    MoveTo,
    LineTo,
    CubicTo,
    Close,
}

impl PathCommand {
    /// How many points the command consumes from the point array.
    #[inline]
    pub fn point_count(self) -> usize {
        match self {
            PathCommand::MoveTo | PathCommand::LineTo => 1,
            PathCommand::CubicTo => 3,
            PathCommand::Close => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    cmds: Vec<PathCommand>,
    pts: Vec<Point>,
    /// Whether the current sub-path has seen a MoveTo.
    open: bool,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.cmds
    }

    pub fn points(&self) -> &[Point] {
        &self.pts
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    pub fn reset(&mut self) {
        self.cmds.clear();
        self.pts.clear();
        self.open = false;
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> Result {
        let p = Point::new(x, y);
        if !p.is_finite() {
            return Err(Error::InvalidArgument);
        }
        self.cmds.push(PathCommand::MoveTo);
        self.pts.push(p);
        self.open = true;
        Ok(())
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> Result {
        let p = Point::new(x, y);
        if !p.is_finite() {
            return Err(Error::InvalidArgument);
        }
        if !self.open {
            return Err(Error::InvalidArgument);
        }
        self.cmds.push(PathCommand::LineTo);
        self.pts.push(p);
        Ok(())
    }

    pub fn cubic_to(
        &mut self,
        cx1: f32,
        cy1: f32,
        cx2: f32,
        cy2: f32,
        x: f32,
        y: f32,
    ) -> Result {
        let c1 = Point::new(cx1, cy1);
        let c2 = Point::new(cx2, cy2);
        let p = Point::new(x, y);
        if !c1.is_finite() || !c2.is_finite() || !p.is_finite() {
            return Err(Error::InvalidArgument);
        }
        if !self.open {
            return Err(Error::InvalidArgument);
        }
        self.cmds.push(PathCommand::CubicTo);
        self.pts.push(c1);
        self.pts.push(c2);
        self.pts.push(p);
        Ok(())
    }

    /// Closes the current sub-path. A close with no prior MoveTo is a no-op.
    pub fn close(&mut self) -> Result {
        if !self.open {
            return Ok(());
        }
        self.cmds.push(PathCommand::Close);
        self.open = false;
        Ok(())
    }

    /// Appends a raw command/point pair, validating that point consumption
    /// matches the point array exactly.
    pub fn append(&mut self, cmds: &[PathCommand], pts: &[Point]) -> Result {
        let consumed: usize = cmds.iter().map(|c| c.point_count()).sum();
        if consumed != pts.len() {
            return Err(Error::InvalidArgument);
        }
        if pts.iter().any(|p| !p.is_finite()) {
            return Err(Error::InvalidArgument);
        }
        // The first non-Close command of a sub-path must be MoveTo.
        let mut open = self.open;
        for cmd in cmds {
            match cmd {
                PathCommand::MoveTo => open = true,
                PathCommand::LineTo | PathCommand::CubicTo => {
                    if !open {
                        return Err(Error::InvalidArgument);
                    }
                }
                PathCommand::Close => open = false,
            }
        }
        self.cmds.extend_from_slice(cmds);
        self.pts.extend_from_slice(pts);
        self.open = open;
        Ok(())
    }

    /// Appends an axis-aligned rectangle, optionally with rounded corners.
    /// Radii clamp to half the rectangle extents.
    pub fn append_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> Result {
        if ![x, y, w, h, rx, ry].iter().all(|v| v.is_finite()) || w < 0.0 || h < 0.0 {
            return Err(Error::InvalidArgument);
        }
        let rx = rx.max(0.0).min(w * 0.5);
        let ry = ry.max(0.0).min(h * 0.5);

        if rx == 0.0 && ry == 0.0 {
            self.move_to(x, y)?;
            self.line_to(x + w, y)?;
            self.line_to(x + w, y + h)?;
            self.line_to(x, y + h)?;
            return self.close();
        }

        let kx = rx * PATH_KAPPA;
        let ky = ry * PATH_KAPPA;
        self.move_to(x + rx, y)?;
        self.line_to(x + w - rx, y)?;
        self.cubic_to(x + w - rx + kx, y, x + w, y + ry - ky, x + w, y + ry)?;
        self.line_to(x + w, y + h - ry)?;
        self.cubic_to(
            x + w,
            y + h - ry + ky,
            x + w - rx + kx,
            y + h,
            x + w - rx,
            y + h,
        )?;
        self.line_to(x + rx, y + h)?;
        self.cubic_to(x + rx - kx, y + h, x, y + h - ry + ky, x, y + h - ry)?;
        self.line_to(x, y + ry)?;
        self.cubic_to(x, y + ry - ky, x + rx - kx, y, x + rx, y)?;
        self.close()
    }

    /// Appends an ellipse centered at (cx, cy) with per-axis radii.
    pub fn append_circle(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> Result {
        if ![cx, cy, rx, ry].iter().all(|v| v.is_finite()) || rx < 0.0 || ry < 0.0 {
            return Err(Error::InvalidArgument);
        }
        let kx = rx * PATH_KAPPA;
        let ky = ry * PATH_KAPPA;
        self.move_to(cx + rx, cy)?;
        self.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry)?;
        self.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy)?;
        self.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry)?;
        self.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy)?;
        self.close()
    }

    /// Appends a circular arc of `sweep_deg` degrees starting at
    /// `start_deg`. With `pie`, the arc connects through the center and
    /// closes into a wedge.
    pub fn append_arc(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        start_deg: f32,
        sweep_deg: f32,
        pie: bool,
    ) -> Result {
        if ![cx, cy, r, start_deg, sweep_deg].iter().all(|v| v.is_finite()) || r < 0.0 {
            return Err(Error::InvalidArgument);
        }
        let start = start_deg.to_radians();
        let sweep = sweep_deg.to_radians().clamp(
            -2.0 * core::f32::consts::PI,
            2.0 * core::f32::consts::PI,
        );

        let first = Point::new(cx + r * start.cos(), cy + r * start.sin());
        if pie {
            self.move_to(cx, cy)?;
            self.line_to(first.x, first.y)?;
        } else {
            self.move_to(first.x, first.y)?;
        }

        // At most four segments, each no wider than a quarter turn.
        let segments = (sweep.abs() / core::f32::consts::FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / segments as f32;
        let mut a0 = start;
        for _ in 0..segments {
            let a1 = a0 + step;
            let k = 4.0 / 3.0 * ((a1 - a0) / 4.0).tan();
            let (s0, c0) = a0.sin_cos();
            let (s1, c1) = a1.sin_cos();
            self.cubic_to(
                cx + r * (c0 - k * s0),
                cy + r * (s0 + k * c0),
                cx + r * (c1 + k * s1),
                cy + r * (s1 - k * c1),
                cx + r * c1,
                cy + r * s1,
            )?;
            a0 = a1;
        }

        if pie {
            self.close()?;
        }
        Ok(())
    }

    /// Bounding box of the control points, or `None` for an empty path.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let first = self.pts.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.pts[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// Total points consumed by the command array. Always equals
    /// `points().len()` for a well-formed path.
    pub fn consumed_points(&self) -> usize {
        self.cmds.iter().map(|c| c.point_count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_and_point_arrays_stay_consistent() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0).unwrap();
        path.line_to(10.0, 0.0).unwrap();
        path.cubic_to(12.0, 2.0, 14.0, 6.0, 10.0, 10.0).unwrap();
        path.close().unwrap();
        path.move_to(20.0, 20.0).unwrap();
        path.line_to(30.0, 20.0).unwrap();
        assert_eq!(path.consumed_points(), path.points().len());
    }

    #[test]
    fn close_without_move_is_a_noop() {
        let mut path = Path::new();
        path.close().unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn line_before_move_is_rejected() {
        let mut path = Path::new();
        assert_eq!(path.line_to(1.0, 1.0), Err(Error::InvalidArgument));
    }

    #[test]
    fn nan_coordinates_are_rejected() {
        let mut path = Path::new();
        assert_eq!(path.move_to(f32::NAN, 0.0), Err(Error::InvalidArgument));
        assert!(path.is_empty());
    }

    #[test]
    fn append_validates_consumption() {
        let mut path = Path::new();
        let cmds = [PathCommand::MoveTo, PathCommand::LineTo];
        let pts = [Point::new(0.0, 0.0)];
        assert_eq!(path.append(&cmds, &pts), Err(Error::InvalidArgument));

        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 5.0)];
        path.append(&cmds, &pts).unwrap();
        assert_eq!(path.consumed_points(), 2);
    }

    #[test]
    fn rect_radii_clamp_to_half_extent() {
        let mut path = Path::new();
        path.append_rect(0.0, 0.0, 10.0, 10.0, 100.0, 100.0).unwrap();
        let (min, max) = path.bounds().unwrap();
        assert!(min.x >= -0.01 && min.y >= -0.01);
        assert!(max.x <= 10.01 && max.y <= 10.01);
    }

    #[test]
    fn arc_pie_touches_center() {
        let mut path = Path::new();
        path.append_arc(50.0, 50.0, 10.0, 0.0, 90.0, true).unwrap();
        assert_eq!(path.points()[0], Point::new(50.0, 50.0));
        assert!(matches!(path.commands().last(), Some(PathCommand::Close)));
    }

    #[test]
    fn full_circle_stays_within_radius_bounds() {
        let mut path = Path::new();
        path.append_circle(0.0, 0.0, 10.0, 5.0).unwrap();
        let (min, max) = path.bounds().unwrap();
        assert!(min.x >= -10.01 && max.x <= 10.01);
        assert!(min.y >= -5.01 && max.y <= 5.01);
    }
}
