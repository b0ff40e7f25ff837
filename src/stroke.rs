//! Stroke properties for shapes.
//!
//! A [`Stroke`] describes how a shape's outline is expanded into painted
//! geometry: width, paint source, end caps, joins, miter limit, and an
//! optional dash pattern.
//!
//! # Examples
//!
//! ```
//! use lienzo::{Color, Stroke, StrokeCap, StrokeJoin};
//!
//! let mut stroke = Stroke::new(4.0, Color::BLACK);
//! stroke.cap = StrokeCap::Round;
//! stroke.join = StrokeJoin::Miter;
//! assert!(!stroke.is_empty());
//!
//! assert!(Stroke::default().is_empty());
//! ```

use smallvec::SmallVec;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::gradient::Brush;

/// The shape drawn at the ends of open stroked sub-paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeCap {
    /// Flat cap flush with the endpoint.
    Butt,
    /// Semicircle of radius width/2.
    Round,
    /// Flat cap extended by width/2 along the tangent.
    #[default]
    Square,
}

/// The shape drawn where two stroked segments meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeJoin {
    /// Straight segment between the outer edges.
    #[default]
    Bevel,
    /// Circular arc of radius width/2.
    Round,
    /// Outer edges extended to their intersection, falling back to bevel
    /// past the miter limit.
    Miter,
}

/// Alternating on/off dash lengths. Small patterns stay inline.
pub type DashPattern = SmallVec<[f32; 4]>;

/// Stroke description attached to a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    /// Stroke width in design units.
    pub width: f32,
    /// Paint source for the stroked area.
    pub brush: Brush,
    pub cap: StrokeCap,
    pub join: StrokeJoin,
    /// Miter length limit as a multiple of width/2.
    pub miter_limit: f32,
    pub(crate) dash: Option<DashPattern>,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 0.0,
            brush: Brush::Solid(Color::TRANSPARENT),
            cap: StrokeCap::default(),
            join: StrokeJoin::default(),
            miter_limit: 4.0,
            dash: None,
        }
    }
}

impl Stroke {
    pub fn new(width: f32, brush: impl Into<Brush>) -> Self {
        Self {
            width,
            brush: brush.into(),
            ..Self::default()
        }
    }

    /// Sets the dash pattern, interpreted as alternating on/off lengths.
    /// An odd-length pattern repeats doubled. Passing an empty slice
    /// clears dashing.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when any length is not finite or not positive.
    pub fn dash(&mut self, pattern: &[f32]) -> Result {
        if pattern.is_empty() {
            self.dash = None;
            return Ok(());
        }
        if pattern.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(Error::InvalidArgument);
        }
        let mut dash: DashPattern = SmallVec::from_slice(pattern);
        if pattern.len() % 2 != 0 {
            dash.extend_from_slice(pattern);
        }
        self.dash = Some(dash);
        Ok(())
    }

    pub fn dash_pattern(&self) -> Option<&[f32]> {
        self.dash.as_deref()
    }

    /// A stroke draws nothing when its width is zero or its paint source
    /// is fully transparent.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || !self.brush.is_visible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stroke_is_empty() {
        assert!(Stroke::default().is_empty());
        assert!(!Stroke::new(1.0, Color::BLACK).is_empty());
        assert!(Stroke::new(1.0, Color::TRANSPARENT).is_empty());
    }

    #[test]
    fn odd_dash_pattern_doubles() {
        let mut stroke = Stroke::new(2.0, Color::BLACK);
        stroke.dash(&[5.0, 2.0, 1.0]).unwrap();
        assert_eq!(
            stroke.dash_pattern().unwrap(),
            &[5.0, 2.0, 1.0, 5.0, 2.0, 1.0]
        );
    }

    #[test]
    fn non_positive_dash_lengths_are_rejected() {
        let mut stroke = Stroke::new(2.0, Color::BLACK);
        assert_eq!(stroke.dash(&[1.0, 0.0]), Err(Error::InvalidArgument));
        assert_eq!(stroke.dash(&[-1.0]), Err(Error::InvalidArgument));
        assert!(stroke.dash_pattern().is_none());
    }

    #[test]
    fn empty_pattern_clears_dashing() {
        let mut stroke = Stroke::new(2.0, Color::BLACK);
        stroke.dash(&[4.0, 4.0]).unwrap();
        stroke.dash(&[]).unwrap();
        assert!(stroke.dash_pattern().is_none());
    }
}
