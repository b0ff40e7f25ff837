//! Cache of rasterized shape coverage keyed on content.
//!
//! Two paints with identical geometry, transform and stroke rasterize to
//! identical span lists, so prepared results are shared through an LRU
//! keyed on a content hash. Duplicated paints hit this cache instead of
//! re-flattening.

use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::Arc;

use ahash::AHasher;
use lru::LruCache;

use crate::math::Matrix;
use crate::path::Path;
use crate::raster::rle::RectI;
use crate::raster::stroker::StrokeStyle;
use crate::shape::FillRule;

use super::prepare::ShapeRle;

const MAX_CACHED_OUTLINES: usize = 512;

pub(crate) struct OutlineCache {
    entries: LruCache<u64, Arc<ShapeRle>>,
}

impl OutlineCache {
    pub fn new() -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(MAX_CACHED_OUTLINES).unwrap()),
        }
    }

    pub fn get(&mut self, key: u64) -> Option<Arc<ShapeRle>> {
        self.entries.get(&key).cloned()
    }

    pub fn insert(&mut self, key: u64, rle: Arc<ShapeRle>) {
        self.entries.put(key, rle);
    }
}

/// Content hash over everything that feeds shape rasterization.
pub(crate) fn shape_key(
    path: &Path,
    total: &Matrix,
    rule: FillRule,
    stroke: Option<&StrokeStyle>,
    clip: &RectI,
) -> u64 {
    let mut hasher = AHasher::default();
    for cmd in path.commands() {
        (*cmd as u8).hash(&mut hasher);
    }
    for p in path.points() {
        p.x.to_bits().hash(&mut hasher);
        p.y.to_bits().hash(&mut hasher);
    }
    for v in [total.sx, total.kx, total.tx, total.ky, total.sy, total.ty] {
        v.to_bits().hash(&mut hasher);
    }
    (rule as u8).hash(&mut hasher);
    match stroke {
        None => 0u8.hash(&mut hasher),
        Some(style) => {
            1u8.hash(&mut hasher);
            style.width.to_bits().hash(&mut hasher);
            (style.cap as u8).hash(&mut hasher);
            (style.join as u8).hash(&mut hasher);
            style.miter_limit.to_bits().hash(&mut hasher);
            match &style.dash {
                None => 0usize.hash(&mut hasher),
                Some(dash) => {
                    dash.len().hash(&mut hasher);
                    for v in dash {
                        v.to_bits().hash(&mut hasher);
                    }
                }
            }
        }
    }
    (clip.x, clip.y, clip.w, clip.h).hash(&mut hasher);
    hasher.finish()
}
