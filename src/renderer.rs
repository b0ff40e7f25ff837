//! The renderer abstraction: the crate's single dynamic-dispatch seam.
//!
//! A canvas drives its backend exclusively through this trait, so an
//! accelerated implementation can slot in beside the software one without
//! touching the paint tree or the canvas protocol. Paint variants and
//! gradient variants stay tagged enums; only the backend is polymorphic.

use crate::error::Result;
use crate::math::Matrix;
use crate::paint::{Dirty, Paint};
use crate::raster::{RectI, Surface, SwRenderer};

pub trait Renderer {
    /// Derives (or re-derives) the paint's prepared block for the given
    /// cumulative transform, opacity and clip. May enqueue asynchronous
    /// work; rendering joins it lazily.
    fn prepare(
        &mut self,
        paint: &mut Paint,
        transform: &Matrix,
        opacity: u8,
        clip: &RectI,
    ) -> Result;

    /// Composites one prepared paint into the surface, blocking on its
    /// outstanding prepare work at the point of first use.
    fn render(&mut self, paint: &mut Paint, surface: &mut Surface<'_>) -> Result;

    /// Barrier: joins all outstanding work for the paint's subtree.
    fn sync(&mut self, paint: &mut Paint);

    /// Releases the paint's prepared data, joining outstanding work first.
    fn dispose(&mut self, paint: &mut Paint);
}

impl Renderer for SwRenderer {
    fn prepare(
        &mut self,
        paint: &mut Paint,
        transform: &Matrix,
        opacity: u8,
        clip: &RectI,
    ) -> Result {
        self.prepare_paint(paint, transform, opacity, clip, Dirty::clean(), false)
    }

    fn render(&mut self, paint: &mut Paint, surface: &mut Surface<'_>) -> Result {
        self.render_paint(paint, surface, &[])
    }

    fn sync(&mut self, paint: &mut Paint) {
        self.join_pending(paint);
    }

    fn dispose(&mut self, paint: &mut Paint) {
        self.dispose_paint(paint);
    }
}
