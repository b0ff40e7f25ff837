//! The software renderer: prepares paints into RLE coverage and
//! composites them into the client's pixel buffer.
//!
//! `prepare` walks a paint with its cumulative transform and opacity,
//! re-deriving the prepared block wherever dirty flags (or an ancestor's)
//! demand it. Geometry work is shipped to the scheduler as a task per
//! shape; the draw path joins each task lazily at first use, so worker
//! threads overlap with the caller building subsequent frames.

use std::sync::Arc;

use tracing::warn;

use crate::color::Colorspace;
use crate::error::{Error, Result};
use crate::math::Matrix;
use crate::paint::{CompositeMethod, Dirty, Paint, PaintKind};
use crate::picture::PictureContent;
use crate::scheduler;

mod cache;
mod compose;
mod fill;
mod flatten;
mod pool;
pub(crate) mod prepare;
pub(crate) mod rle;
mod stroker;

pub use compose::Surface;
pub use rle::{RectI, Span, SpanList};

use cache::OutlineCache;
use compose::{Mask, MaskKind};
use fill::Filler;
use pool::ScratchPools;
use prepare::{PictureData, RdKind, RenderData, ShapeData, ShapeJob};
use stroker::StrokeStyle;

#[inline]
pub(crate) fn mul_opacity(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

/// The CPU rasterization backend.
pub struct SwRenderer {
    pools: ScratchPools,
    cache: OutlineCache,
}

impl Default for SwRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SwRenderer {
    pub fn new() -> Self {
        Self {
            pools: ScratchPools::new(),
            cache: OutlineCache::new(),
        }
    }

    // ── Prepare ──────────────────────────────────────────────────────────

    pub(crate) fn prepare_paint(
        &mut self,
        paint: &mut Paint,
        transform: &Matrix,
        opacity: u8,
        clip: &rle::RectI,
        inherited: Dirty,
        force_fill: bool,
    ) -> Result {
        let total = transform.concat(&paint.matrix());
        let opacity = mul_opacity(opacity, paint.opacity);
        let effective = paint.combined_dirty().union(inherited);

        // The mask renders over the masked paint's target-space bounds,
        // in region-local coordinates.
        let mask_region = if paint.composite.is_some() {
            paint.bounds_with(transform).map(|(x, y, w, h)| {
                let x0 = x.floor() as i32;
                let y0 = y.floor() as i32;
                let x1 = (x + w).ceil() as i32;
                let y1 = (y + h).ceil() as i32;
                rle::RectI::new(x0, y0, x1 - x0, y1 - y0).intersect(clip)
            })
        } else {
            None
        };
        if let Some(region) = mask_region.filter(|r| !r.is_empty()) {
            if let Some(comp) = paint.composite.as_deref_mut() {
                let method = comp.method;
                let mask_transform =
                    Matrix::translation(-(region.x as f32), -(region.y as f32)).concat(transform);
                let mask_clip = rle::RectI::new(0, 0, region.w, region.h);
                self.prepare_paint(
                    &mut comp.target,
                    &mask_transform,
                    255,
                    &mask_clip,
                    effective,
                    method == CompositeMethod::ClipPath,
                )?;
            }
        }

        {
            let Paint { kind, rdata, .. } = paint;
            match kind {
                PaintKind::Shape(shape) => {
                    let mut data = match rdata.take() {
                        Some(RenderData {
                            kind: RdKind::Shape(d),
                            ..
                        }) => d,
                        _ => ShapeData::new(),
                    };
                    data.total = total;
                    data.opacity = opacity;

                    let fill_visible = force_fill
                        || shape.fill.as_ref().map_or(false, |b| b.is_visible());
                    let stroke_style = shape
                        .stroke
                        .as_ref()
                        .filter(|s| !s.is_empty())
                        .map(|s| StrokeStyle {
                            width: s.width,
                            cap: s.cap,
                            join: s.join,
                            miter_limit: s.miter_limit,
                            dash: s.dash.clone(),
                        });

                    let missing = data.rle.is_none() && data.task.is_none();
                    if (effective.needs_geometry() || missing)
                        && (fill_visible || stroke_style.is_some())
                        && !shape.path.is_empty()
                    {
                        let key = cache::shape_key(
                            &shape.path,
                            &total,
                            shape.rule,
                            stroke_style.as_ref(),
                            clip,
                        );
                        if key != data.key || missing {
                            // Serialize with any unjoined previous prepare.
                            if let Some(prev) = data.task.take() {
                                let _ = prev.into_value();
                            }
                            data.failed = false;
                            data.key = key;
                            if let Some(hit) = self.cache.get(key) {
                                data.rle = Some(hit);
                            } else {
                                let job = ShapeJob {
                                    path: shape.path.clone(),
                                    total,
                                    rule: shape.rule,
                                    fill_visible,
                                    stroke: stroke_style,
                                    clip: *clip,
                                };
                                data.rle = None;
                                data.task = Some(scheduler::execute(move || {
                                    Ok(Arc::new(prepare::rasterize_shape(&job)))
                                }));
                            }
                        }
                    }
                    *rdata = Some(RenderData {
                        mask_region,
                        kind: RdKind::Shape(data),
                    });
                }
                PaintKind::Picture(picture) => {
                    picture.refresh_frame();
                    let (sx, sy) = picture.content_scale();
                    let content_total = total.concat(&Matrix::scaling(sx, sy));
                    match &mut picture.content {
                        Some(PictureContent::Scene(inner)) => {
                            self.prepare_paint(
                                inner,
                                &content_total,
                                opacity,
                                clip,
                                effective,
                                false,
                            )?;
                            *rdata = Some(RenderData {
                                mask_region,
                                kind: RdKind::Group,
                            });
                        }
                        Some(PictureContent::Bitmap(bitmap)) => {
                            let mut rect = flatten::Outline::default();
                            rect.contours.push(flatten::Contour {
                                pts: vec![
                                    crate::math::Point::new(0.0, 0.0),
                                    crate::math::Point::new(bitmap.width() as f32, 0.0),
                                    crate::math::Point::new(
                                        bitmap.width() as f32,
                                        bitmap.height() as f32,
                                    ),
                                    crate::math::Point::new(0.0, bitmap.height() as f32),
                                ],
                                closed: true,
                            });
                            rect.transform(&content_total);
                            let spans =
                                rle::rasterize(&rect, crate::shape::FillRule::NonZero, clip);
                            *rdata = Some(RenderData {
                                mask_region,
                                kind: RdKind::Picture(PictureData {
                                    rle: spans,
                                    inv: content_total.invert(),
                                    opacity,
                                }),
                            });
                        }
                        None => {
                            *rdata = Some(RenderData {
                                mask_region,
                                kind: RdKind::Group,
                            });
                        }
                    }
                }
                PaintKind::Scene(scene) => {
                    for child in &mut scene.children {
                        self.prepare_paint(child, &total, opacity, clip, effective, false)?;
                    }
                    *rdata = Some(RenderData {
                        mask_region,
                        kind: RdKind::Group,
                    });
                }
            }
        }

        paint.clear_dirty();
        Ok(())
    }

    // ── Render ───────────────────────────────────────────────────────────

    pub(crate) fn render_paint(
        &mut self,
        paint: &mut Paint,
        surface: &mut Surface<'_>,
        masks: &[&Mask],
    ) -> Result {
        let Some(method) = paint.composite.as_ref().map(|c| c.method) else {
            return self.render_content(paint, surface, masks);
        };
        let region = paint.rdata.as_ref().and_then(|r| r.mask_region);
        match region.filter(|r| !r.is_empty()) {
            Some(region) => {
                let mask = self.render_mask(paint, &region, method)?;
                let combined: Vec<&Mask> =
                    masks.iter().copied().chain(std::iter::once(&mask)).collect();
                let result = self.render_content(paint, surface, &combined);
                drop(combined);
                match mask.kind {
                    MaskKind::Alpha { buf, .. } => self.pools.put_mask_buf(buf),
                    MaskKind::Clip { cov } => self.pools.put_cov_buf(cov),
                }
                result
            }
            None => match method {
                // An absent mask hides direct-masked content entirely and
                // leaves inverse-masked content untouched.
                CompositeMethod::AlphaMask
                | CompositeMethod::ClipPath
                | CompositeMethod::LumaMask => Ok(()),
                CompositeMethod::InvAlphaMask | CompositeMethod::InvLumaMask => {
                    self.render_content(paint, surface, masks)
                }
            },
        }
    }

    fn render_content(
        &mut self,
        paint: &mut Paint,
        surface: &mut Surface<'_>,
        masks: &[&Mask],
    ) -> Result {
        let Paint { kind, rdata, .. } = paint;
        match kind {
            PaintKind::Shape(shape) => {
                let Some(RenderData {
                    kind: RdKind::Shape(data),
                    ..
                }) = rdata.as_mut()
                else {
                    return Ok(());
                };
                self.resolve_shape(data)?;
                if data.opacity == 0 {
                    return Ok(());
                }
                let Some(shape_rle) = data.rle.as_ref() else {
                    return Ok(());
                };
                if let (Some(spans), Some(brush)) = (
                    &shape_rle.fill,
                    shape.fill.as_ref().filter(|b| b.is_visible()),
                ) {
                    if let Some(filler) =
                        Filler::build(brush, &data.total, data.opacity, surface.cs)
                    {
                        compose::blend_spans(
                            surface,
                            spans,
                            &filler,
                            &mut self.pools.scanline,
                            masks,
                        );
                    }
                }
                if let (Some(spans), Some(stroke)) = (&shape_rle.stroke, shape.stroke.as_ref()) {
                    if let Some(filler) =
                        Filler::build(&stroke.brush, &data.total, data.opacity, surface.cs)
                    {
                        compose::blend_spans(
                            surface,
                            spans,
                            &filler,
                            &mut self.pools.scanline,
                            masks,
                        );
                    }
                }
                Ok(())
            }
            PaintKind::Picture(picture) => match &mut picture.content {
                Some(PictureContent::Scene(inner)) => self.render_paint(inner, surface, masks),
                Some(PictureContent::Bitmap(bitmap)) => {
                    let Some(RenderData {
                        kind: RdKind::Picture(data),
                        ..
                    }) = rdata.as_mut()
                    else {
                        return Ok(());
                    };
                    if data.opacity == 0 {
                        return Ok(());
                    }
                    if let Some(inv) = &data.inv {
                        compose::blend_bitmap(surface, &data.rle, bitmap, inv, data.opacity, masks);
                    }
                    Ok(())
                }
                None => Ok(()),
            },
            PaintKind::Scene(scene) => {
                // Children draw back-to-front; one failing child skips
                // itself, the rest still composite.
                let mut first_err = None;
                for child in &mut scene.children {
                    if let Err(e) = self.render_paint(child, surface, masks) {
                        warn!(paint = %child.id(), "skipping paint after failed prepare");
                        first_err.get_or_insert(e);
                    }
                }
                first_err.map_or(Ok(()), Err)
            }
        }
    }

    /// Joins an in-flight prepare and caches its result.
    fn resolve_shape(&mut self, data: &mut ShapeData) -> Result {
        if let Some(task) = data.task.take() {
            match task.into_value() {
                Some(Ok(shape_rle)) => {
                    self.cache.insert(data.key, Arc::clone(&shape_rle));
                    data.rle = Some(shape_rle);
                }
                Some(Err(e)) => {
                    data.failed = true;
                    return Err(e);
                }
                None => {
                    data.failed = true;
                    return Err(Error::Unknown);
                }
            }
        }
        if data.failed {
            return Err(Error::Unknown);
        }
        Ok(())
    }

    // ── Masks ────────────────────────────────────────────────────────────

    fn render_mask(
        &mut self,
        paint: &mut Paint,
        region: &rle::RectI,
        method: CompositeMethod,
    ) -> Result<Mask> {
        let len = region.w as usize * region.h as usize;
        let comp = paint
            .composite
            .as_deref_mut()
            .ok_or(Error::InsufficientCondition)?;
        match method {
            CompositeMethod::ClipPath => {
                let mut cov = self.pools.take_cov_buf(len);
                self.collect_clip(&mut comp.target, &mut cov, region)?;
                Ok(Mask {
                    kind: MaskKind::Clip { cov },
                    region: *region,
                })
            }
            CompositeMethod::AlphaMask
            | CompositeMethod::InvAlphaMask
            | CompositeMethod::LumaMask
            | CompositeMethod::InvLumaMask => {
                let mut buf = self.pools.take_mask_buf(len);
                {
                    // Masks composite in the internal premultiplied order,
                    // independent of the client target layout.
                    let mut mask_surface = Surface::new(
                        &mut buf,
                        region.w as u32,
                        region.w as u32,
                        region.h as u32,
                        Colorspace::Argb8888,
                    );
                    self.render_paint(&mut comp.target, &mut mask_surface, &[])?;
                }
                Ok(Mask {
                    kind: MaskKind::Alpha {
                        buf,
                        inverse: matches!(
                            method,
                            CompositeMethod::InvAlphaMask | CompositeMethod::InvLumaMask
                        ),
                        luma: matches!(
                            method,
                            CompositeMethod::LumaMask | CompositeMethod::InvLumaMask
                        ),
                    },
                    region: *region,
                })
            }
        }
    }

    /// Gathers binary geometry coverage for a clip-path mask; fill colors
    /// are ignored by construction.
    fn collect_clip(
        &mut self,
        paint: &mut Paint,
        cov: &mut [u8],
        region: &rle::RectI,
    ) -> Result {
        let Paint { kind, rdata, .. } = paint;
        match kind {
            PaintKind::Shape(_) => {
                if let Some(RenderData {
                    kind: RdKind::Shape(data),
                    ..
                }) = rdata.as_mut()
                {
                    self.resolve_shape(data)?;
                    if let Some(shape_rle) = data.rle.as_ref() {
                        if let Some(spans) = &shape_rle.fill {
                            compose::accumulate_clip(cov, region, spans);
                        }
                    }
                }
                Ok(())
            }
            PaintKind::Picture(picture) => match &mut picture.content {
                Some(PictureContent::Scene(inner)) => self.collect_clip(inner, cov, region),
                Some(PictureContent::Bitmap(_)) => {
                    if let Some(RenderData {
                        kind: RdKind::Picture(data),
                        ..
                    }) = rdata.as_ref()
                    {
                        compose::accumulate_clip(cov, region, &data.rle);
                    }
                    Ok(())
                }
                None => Ok(()),
            },
            PaintKind::Scene(scene) => {
                for child in &mut scene.children {
                    self.collect_clip(child, cov, region)?;
                }
                Ok(())
            }
        }
    }

    // ── Sync / dispose ───────────────────────────────────────────────────

    /// Joins every outstanding prepare in the subtree. Errors were either
    /// surfaced at draw or will be at the next one; this is the barrier.
    pub(crate) fn join_pending(&mut self, paint: &mut Paint) {
        if let Some(comp) = paint.composite.as_deref_mut() {
            self.join_pending(&mut comp.target);
        }
        let Paint { kind, rdata, .. } = paint;
        if let Some(RenderData {
            kind: RdKind::Shape(data),
            ..
        }) = rdata.as_mut()
        {
            let _ = self.resolve_shape(data);
        }
        match kind {
            PaintKind::Scene(scene) => {
                for child in &mut scene.children {
                    self.join_pending(child);
                }
            }
            PaintKind::Picture(picture) => {
                if let Some(PictureContent::Scene(inner)) = &mut picture.content {
                    self.join_pending(inner);
                }
            }
            PaintKind::Shape(_) => {}
        }
    }

    /// Drops the subtree's prepared blocks, joining in-flight work first.
    pub(crate) fn dispose_paint(&mut self, paint: &mut Paint) {
        self.join_pending(paint);
        paint.rdata = None;
        if let Some(comp) = paint.composite.as_deref_mut() {
            self.dispose_paint(&mut comp.target);
        }
        match &mut paint.kind {
            PaintKind::Scene(scene) => {
                for child in &mut scene.children {
                    self.dispose_paint(child);
                }
            }
            PaintKind::Picture(picture) => {
                if let Some(PictureContent::Scene(inner)) = &mut picture.content {
                    self.dispose_paint(inner);
                }
            }
            PaintKind::Shape(_) => {}
        }
        self.pools.trim();
    }
}
