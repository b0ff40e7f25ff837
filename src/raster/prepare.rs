//! Prepared blocks: the renderer-private cache attached to each paint.
//!
//! `update` derives these from the paint's current attributes — possibly
//! on a worker thread — and `draw` consumes them. Geometry work
//! (flatten, stroke, rasterize) is the expensive part and runs inside
//! the prepare task; fillers and compositing stay on the draw path where
//! the target surface lives.

use std::sync::Arc;

use crate::error::Error;
use crate::math::Matrix;
use crate::path::Path;
use crate::scheduler::TaskHandle;
use crate::shape::FillRule;

use super::flatten;
use super::rle::{self, RectI, SpanList};
use super::stroker::{self, StrokeStyle};

/// Rasterized coverage for one shape: outline fill plus optional stroke.
#[derive(Debug, Default)]
pub(crate) struct ShapeRle {
    pub fill: Option<SpanList>,
    pub stroke: Option<SpanList>,
}

/// What a shape prepare task yields.
pub(crate) type ShapeResult = Result<Arc<ShapeRle>, Error>;

/// Prepared block of a shape paint.
pub(crate) struct ShapeData {
    /// In-flight prepare, joined lazily at first draw use.
    pub task: Option<TaskHandle<ShapeResult>>,
    pub rle: Option<Arc<ShapeRle>>,
    /// Cumulative transform at prepare time, for gradient/picture inverse
    /// mapping at draw time.
    pub total: Matrix,
    /// Cumulative opacity at prepare time.
    pub opacity: u8,
    /// Content hash the current rle/task corresponds to.
    pub key: u64,
    /// A prepare failed; the paint is skipped until re-updated.
    pub failed: bool,
}

impl ShapeData {
    pub fn new() -> Self {
        Self {
            task: None,
            rle: None,
            total: Matrix::identity(),
            opacity: 255,
            key: 0,
            failed: false,
        }
    }
}

/// Prepared block of a bitmap picture.
pub(crate) struct PictureData {
    /// Coverage of the transformed content rectangle.
    pub rle: SpanList,
    /// Target space → content space.
    pub inv: Option<Matrix>,
    pub opacity: u8,
}

pub(crate) enum RdKind {
    Shape(ShapeData),
    Picture(PictureData),
    /// Scenes and vector pictures: children carry their own blocks.
    Group,
}

/// The per-paint prepared block.
pub(crate) struct RenderData {
    /// Target region the composite mask covers, when one is attached.
    pub mask_region: Option<RectI>,
    pub kind: RdKind,
}

/// Inputs captured for an off-thread shape rasterization.
pub(crate) struct ShapeJob {
    pub path: Path,
    pub total: Matrix,
    pub rule: FillRule,
    pub fill_visible: bool,
    pub stroke: Option<StrokeStyle>,
    pub clip: RectI,
}

/// Flattens, strokes and rasterizes one shape. Pure: runs on any thread.
pub(crate) fn rasterize_shape(job: &ShapeJob) -> ShapeRle {
    let mut out = ShapeRle::default();
    let outline = flatten::flatten(&job.path);
    if outline.contours.is_empty() {
        return out;
    }

    if job.fill_visible {
        let mut filled = outline.clone();
        filled.transform(&job.total);
        let spans = rle::rasterize(&filled, job.rule, &job.clip);
        if !spans.is_empty() {
            out.fill = Some(spans);
        }
    }

    if let Some(style) = &job.stroke {
        // Stroke in design space so the transform stretches strokes the
        // same way it stretches fills.
        let mut stroked = stroker::stroke_outline(&outline, style);
        stroked.transform(&job.total);
        let spans = rle::rasterize(&stroked, FillRule::NonZero, &job.clip);
        if !spans.is_empty() {
            out.stroke = Some(spans);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_produces_fill_and_stroke_coverage() {
        let mut path = Path::new();
        path.append_rect(2.0, 2.0, 6.0, 6.0, 0.0, 0.0).unwrap();
        let job = ShapeJob {
            path,
            total: Matrix::identity(),
            rule: FillRule::NonZero,
            fill_visible: true,
            stroke: Some(StrokeStyle {
                width: 2.0,
                cap: crate::stroke::StrokeCap::Butt,
                join: crate::stroke::StrokeJoin::Miter,
                miter_limit: 4.0,
                dash: None,
            }),
            clip: RectI::new(0, 0, 16, 16),
        };
        let rle = rasterize_shape(&job);
        let fill = rle.fill.unwrap();
        let stroke = rle.stroke.unwrap();
        assert_eq!(fill.coverage_at(4, 4), 255);
        // The stroke straddles the rect edge by one unit on each side.
        assert_eq!(stroke.coverage_at(1, 4), 255);
        assert_eq!(stroke.coverage_at(4, 4), 0);
    }

    #[test]
    fn transform_applies_before_rasterization() {
        let mut path = Path::new();
        path.append_rect(0.0, 0.0, 4.0, 4.0, 0.0, 0.0).unwrap();
        let job = ShapeJob {
            path,
            total: Matrix::translation(8.0, 8.0),
            rule: FillRule::NonZero,
            fill_visible: true,
            stroke: None,
            clip: RectI::new(0, 0, 16, 16),
        };
        let rle = rasterize_shape(&job);
        let fill = rle.fill.unwrap();
        assert_eq!(fill.coverage_at(2, 2), 0);
        assert_eq!(fill.coverage_at(9, 9), 255);
    }

    #[test]
    fn invisible_fill_skips_fill_coverage() {
        let mut path = Path::new();
        path.append_rect(0.0, 0.0, 4.0, 4.0, 0.0, 0.0).unwrap();
        let job = ShapeJob {
            path,
            total: Matrix::identity(),
            rule: FillRule::NonZero,
            fill_visible: false,
            stroke: None,
            clip: RectI::new(0, 0, 16, 16),
        };
        let rle = rasterize_shape(&job);
        assert!(rle.fill.is_none());
        assert!(rle.stroke.is_none());
    }
}
