//! The `Shape` paint variant: a path plus fill and stroke descriptions.
//!
//! # Examples
//!
//! ```
//! use lienzo::{Color, FillRule, Paint, Shape, Stroke};
//!
//! let mut shape = Shape::new();
//! shape.append_rect(10.0, 10.0, 80.0, 80.0, 0.0, 0.0).unwrap();
//! shape.fill(Color::rgb(255, 0, 0)).unwrap();
//! shape.fill_rule(FillRule::EvenOdd);
//! shape.set_stroke(Stroke::new(2.0, Color::BLACK)).unwrap();
//!
//! let paint = Paint::from(shape);
//! ```

use crate::color::Color;
use crate::error::{Error, Result};
use crate::gradient::{Brush, Gradient};
use crate::paint::Dirty;
use crate::path::{Path, PathCommand};
use crate::math::Point;
use crate::stroke::{Stroke, StrokeCap, StrokeJoin};

/// Decides which regions of a self-intersecting path are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// Signed winding number.
    #[default]
    NonZero,
    /// Parity of edge crossings.
    EvenOdd,
}

/// A fillable, strokable path paint.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    pub(crate) path: Path,
    pub(crate) fill: Option<Brush>,
    pub(crate) stroke: Option<Stroke>,
    pub(crate) rule: FillRule,
    pub(crate) dirty: Dirty,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Path building ────────────────────────────────────────────────────

    pub fn move_to(&mut self, x: f32, y: f32) -> Result {
        self.path.move_to(x, y)?;
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> Result {
        self.path.line_to(x, y)?;
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    pub fn cubic_to(&mut self, cx1: f32, cy1: f32, cx2: f32, cy2: f32, x: f32, y: f32) -> Result {
        self.path.cubic_to(cx1, cy1, cx2, cy2, x, y)?;
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    pub fn close(&mut self) -> Result {
        self.path.close()?;
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    pub fn append_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> Result {
        self.path.append_rect(x, y, w, h, rx, ry)?;
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    pub fn append_circle(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> Result {
        self.path.append_circle(cx, cy, rx, ry)?;
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    pub fn append_arc(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        start_deg: f32,
        sweep_deg: f32,
        pie: bool,
    ) -> Result {
        self.path.append_arc(cx, cy, r, start_deg, sweep_deg, pie)?;
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    pub fn append_path(&mut self, cmds: &[PathCommand], pts: &[Point]) -> Result {
        self.path.append(cmds, pts)?;
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    /// Drops all path data, fill and stroke stay.
    pub fn reset(&mut self) {
        self.path.reset();
        self.dirty.set(Dirty::PATH);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ── Fill ─────────────────────────────────────────────────────────────

    /// Sets a solid fill color.
    pub fn fill(&mut self, color: impl Into<Color>) -> Result {
        self.fill = Some(Brush::Solid(color.into()));
        self.dirty.set(Dirty::COLOR);
        Ok(())
    }

    /// Sets a gradient fill.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the gradient has no valid stop table.
    pub fn fill_gradient(&mut self, gradient: Gradient) -> Result {
        if !gradient.is_valid() {
            return Err(Error::InvalidArgument);
        }
        self.fill = Some(Brush::Gradient(gradient));
        self.dirty.set(Dirty::GRADIENT);
        Ok(())
    }

    pub fn fill_rule(&mut self, rule: FillRule) {
        self.rule = rule;
        self.dirty.set(Dirty::PATH);
    }

    pub fn fill_color(&self) -> Option<Color> {
        match self.fill {
            Some(Brush::Solid(c)) => Some(c),
            _ => None,
        }
    }

    pub fn fill_brush(&self) -> Option<&Brush> {
        self.fill.as_ref()
    }

    pub fn rule(&self) -> FillRule {
        self.rule
    }

    // ── Stroke ───────────────────────────────────────────────────────────

    /// Replaces the whole stroke description.
    pub fn set_stroke(&mut self, stroke: Stroke) -> Result {
        if !stroke.width.is_finite() || stroke.width < 0.0 {
            return Err(Error::InvalidArgument);
        }
        self.stroke = Some(stroke);
        self.dirty.set(Dirty::STROKE);
        Ok(())
    }

    pub fn stroke_width(&mut self, width: f32) -> Result {
        if !width.is_finite() || width < 0.0 {
            return Err(Error::InvalidArgument);
        }
        self.stroke_mut().width = width;
        self.dirty.set(Dirty::STROKE);
        Ok(())
    }

    pub fn stroke_color(&mut self, color: impl Into<Color>) -> Result {
        self.stroke_mut().brush = Brush::Solid(color.into());
        self.dirty.set(Dirty::STROKE);
        Ok(())
    }

    pub fn stroke_gradient(&mut self, gradient: Gradient) -> Result {
        if !gradient.is_valid() {
            return Err(Error::InvalidArgument);
        }
        self.stroke_mut().brush = Brush::Gradient(gradient);
        self.dirty.set(Dirty::STROKE);
        Ok(())
    }

    pub fn stroke_dash(&mut self, pattern: &[f32]) -> Result {
        self.stroke_mut().dash(pattern)?;
        self.dirty.set(Dirty::STROKE);
        Ok(())
    }

    pub fn stroke_cap(&mut self, cap: StrokeCap) {
        self.stroke_mut().cap = cap;
        self.dirty.set(Dirty::STROKE);
    }

    pub fn stroke_join(&mut self, join: StrokeJoin) {
        self.stroke_mut().join = join;
        self.dirty.set(Dirty::STROKE);
    }

    pub fn stroke_miter_limit(&mut self, limit: f32) -> Result {
        if !limit.is_finite() || limit < 1.0 {
            return Err(Error::InvalidArgument);
        }
        self.stroke_mut().miter_limit = limit;
        self.dirty.set(Dirty::STROKE);
        Ok(())
    }

    pub fn stroke(&self) -> Option<&Stroke> {
        self.stroke.as_ref()
    }

    fn stroke_mut(&mut self) -> &mut Stroke {
        self.stroke.get_or_insert_with(Stroke::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutators_mark_the_matching_dirty_flags() {
        let mut shape = Shape::new();
        shape.move_to(0.0, 0.0).unwrap();
        assert!(shape.dirty.contains(Dirty::PATH));

        shape.dirty = Dirty::clean();
        shape.fill(Color::rgb(1, 2, 3)).unwrap();
        assert!(shape.dirty.contains(Dirty::COLOR));

        shape.dirty = Dirty::clean();
        shape.stroke_width(3.0).unwrap();
        assert!(shape.dirty.contains(Dirty::STROKE));
    }

    #[test]
    fn invalid_gradient_fill_is_rejected() {
        let mut shape = Shape::new();
        let gradient = Gradient::linear(0.0, 0.0, 1.0, 0.0).unwrap();
        assert_eq!(shape.fill_gradient(gradient), Err(Error::InvalidArgument));
        assert!(shape.fill_brush().is_none());
    }

    #[test]
    fn stroke_setters_build_up_one_description() {
        let mut shape = Shape::new();
        shape.stroke_width(6.0).unwrap();
        shape.stroke_color(Color::rgb(9, 9, 9)).unwrap();
        shape.stroke_cap(StrokeCap::Round);
        shape.stroke_join(StrokeJoin::Miter);
        let stroke = shape.stroke().unwrap();
        assert_eq!(stroke.width, 6.0);
        assert_eq!(stroke.cap, StrokeCap::Round);
        assert_eq!(stroke.join, StrokeJoin::Miter);
    }

    #[test]
    fn negative_stroke_width_is_rejected() {
        let mut shape = Shape::new();
        assert_eq!(shape.stroke_width(-1.0), Err(Error::InvalidArgument));
    }
}
