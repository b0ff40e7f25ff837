//! Gradient fills: linear and radial, with color-stop tables and spread
//! modes.
//!
//! # Examples
//!
//! ```
//! use lienzo::{ColorStop, Gradient, SpreadMode};
//!
//! let mut gradient = Gradient::linear(0.0, 0.0, 100.0, 0.0).unwrap();
//! gradient
//!     .color_stops(&[
//!         ColorStop::new(0.0, 255, 0, 0, 255),
//!         ColorStop::new(1.0, 0, 0, 255, 255),
//!     ])
//!     .unwrap();
//! gradient.spread(SpreadMode::Reflect);
//! ```

use crate::color::Color;
use crate::error::{Error, Result};
use crate::math::Matrix;

/// A single entry in a gradient's color table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient parameter, in [0, 1].
    pub offset: f32,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorStop {
    pub fn new(offset: f32, r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { offset, r, g, b, a }
    }
}

/// How the gradient parameter maps outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadMode {
    /// Clamp to the terminal stop colors.
    #[default]
    Pad,
    /// Mirror back and forth.
    Reflect,
    /// Wrap around.
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GradientKind {
    Linear { x1: f32, y1: f32, x2: f32, y2: f32 },
    Radial { cx: f32, cy: f32, r: f32 },
}

/// A linear or radial gradient paint source.
///
/// Carries an ordered color-stop table (at least two stops, offsets
/// non-decreasing and clamped to [0, 1]), a spread mode, and a fill
/// transform applied on top of the owning paint's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub(crate) kind: GradientKind,
    pub(crate) stops: Vec<ColorStop>,
    pub(crate) spread: SpreadMode,
    pub(crate) transform: Matrix,
}

impl Gradient {
    /// Creates a linear gradient between two endpoints.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when a coordinate is not finite.
    pub fn linear(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            kind: GradientKind::Linear { x1, y1, x2, y2 },
            stops: Vec::new(),
            spread: SpreadMode::default(),
            transform: Matrix::identity(),
        })
    }

    /// Creates a radial gradient with center (cx, cy) and radius `r`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when a coordinate is not finite or `r <= 0`.
    pub fn radial(cx: f32, cy: f32, r: f32) -> Result<Self> {
        if ![cx, cy, r].iter().all(|v| v.is_finite()) || r <= 0.0 {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            kind: GradientKind::Radial { cx, cy, r },
            stops: Vec::new(),
            spread: SpreadMode::default(),
            transform: Matrix::identity(),
        })
    }

    /// Replaces the color-stop table. Offsets are clamped to [0, 1] and
    /// forced non-decreasing.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when fewer than two stops are given or an offset
    /// is not finite.
    pub fn color_stops(&mut self, stops: &[ColorStop]) -> Result {
        if stops.len() < 2 || stops.iter().any(|s| !s.offset.is_finite()) {
            return Err(Error::InvalidArgument);
        }
        self.stops.clear();
        self.stops.reserve(stops.len());
        let mut last = 0.0f32;
        for stop in stops {
            let mut fixed = *stop;
            fixed.offset = fixed.offset.clamp(0.0, 1.0).max(last);
            last = fixed.offset;
            self.stops.push(fixed);
        }
        Ok(())
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn spread(&mut self, spread: SpreadMode) {
        self.spread = spread;
    }

    pub fn spread_mode(&self) -> SpreadMode {
        self.spread
    }

    /// Sets the gradient's own fill transform (identity by default).
    pub fn transform(&mut self, m: Matrix) -> Result {
        if !m.is_finite() {
            return Err(Error::InvalidArgument);
        }
        self.transform = m;
        Ok(())
    }

    pub fn transform_matrix(&self) -> Matrix {
        self.transform
    }

    /// Linear endpoints, or `None` for a radial gradient.
    pub fn linear_points(&self) -> Option<(f32, f32, f32, f32)> {
        match self.kind {
            GradientKind::Linear { x1, y1, x2, y2 } => Some((x1, y1, x2, y2)),
            GradientKind::Radial { .. } => None,
        }
    }

    /// Radial center and radius, or `None` for a linear gradient.
    pub fn radial_params(&self) -> Option<(f32, f32, f32)> {
        match self.kind {
            GradientKind::Radial { cx, cy, r } => Some((cx, cy, r)),
            GradientKind::Linear { .. } => None,
        }
    }

    /// Whether the gradient is renderable (has a valid stop table).
    pub(crate) fn is_valid(&self) -> bool {
        self.stops.len() >= 2
    }
}

/// A paint source: either a flat color or a gradient. Used for both fills
/// and strokes.
#[derive(Debug, Clone, PartialEq)]
pub enum Brush {
    Solid(Color),
    Gradient(Gradient),
}

impl Brush {
    pub(crate) fn is_visible(&self) -> bool {
        match self {
            Brush::Solid(c) => c.a() > 0,
            Brush::Gradient(g) => g.is_valid(),
        }
    }
}

impl From<Color> for Brush {
    fn from(value: Color) -> Self {
        Brush::Solid(value)
    }
}

impl From<Gradient> for Brush {
    fn from(value: Gradient) -> Self {
        Brush::Gradient(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radial_requires_positive_radius() {
        assert_eq!(
            Gradient::radial(0.0, 0.0, 0.0).unwrap_err(),
            Error::InvalidArgument
        );
        assert!(Gradient::radial(0.0, 0.0, 1.0).is_ok());
    }

    #[test]
    fn stop_table_requires_two_entries() {
        let mut g = Gradient::linear(0.0, 0.0, 1.0, 0.0).unwrap();
        let one = [ColorStop::new(0.0, 0, 0, 0, 255)];
        assert_eq!(g.color_stops(&one), Err(Error::InvalidArgument));
        assert!(!g.is_valid());
    }

    #[test]
    fn stop_offsets_are_clamped_and_monotonic() {
        let mut g = Gradient::linear(0.0, 0.0, 1.0, 0.0).unwrap();
        g.color_stops(&[
            ColorStop::new(-0.5, 0, 0, 0, 255),
            ColorStop::new(0.8, 0, 0, 0, 255),
            ColorStop::new(0.2, 0, 0, 0, 255),
            ColorStop::new(2.0, 0, 0, 0, 255),
        ])
        .unwrap();
        let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.8, 0.8, 1.0]);
    }

    #[test]
    fn kind_accessors_match_variant() {
        let linear = Gradient::linear(1.0, 2.0, 3.0, 4.0).unwrap();
        assert_eq!(linear.linear_points(), Some((1.0, 2.0, 3.0, 4.0)));
        assert_eq!(linear.radial_params(), None);

        let radial = Gradient::radial(5.0, 6.0, 7.0).unwrap();
        assert_eq!(radial.radial_params(), Some((5.0, 6.0, 7.0)));
        assert_eq!(radial.linear_points(), None);
    }
}
