//! The paint tree: a sum type over shapes, pictures and scenes, carrying
//! the attributes every renderable node shares.
//!
//! Paints own their children outright: a scene owns its child paints, and
//! a composite target is owned by the paint that masks with it. The tree
//! is strict; no node is reachable twice.
//!
//! # Examples
//!
//! ```
//! use lienzo::{Color, CompositeMethod, Paint, Shape};
//!
//! let mut shape = Shape::new();
//! shape.append_circle(50.0, 50.0, 40.0, 40.0).unwrap();
//! shape.fill(Color::rgb(0, 128, 255)).unwrap();
//!
//! let mut paint = Paint::from(shape);
//! paint.translate(10.0, 10.0).unwrap();
//! paint.opacity(128);
//!
//! let mut mask = Shape::new();
//! mask.append_rect(0.0, 0.0, 60.0, 60.0, 0.0, 0.0).unwrap();
//! mask.fill(Color::WHITE).unwrap();
//! paint.composite(Paint::from(mask), CompositeMethod::AlphaMask);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::math::{Matrix, Point};
use crate::picture::Picture;
use crate::raster::prepare::RenderData;
use crate::scene::Scene;
use crate::shape::Shape;

/// Stable identifier assigned to every paint at construction. Used to
/// address paints inside a canvas after ownership has transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaintId(pub u64);

impl fmt::Display for PaintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static NEXT_PAINT_ID: AtomicU64 = AtomicU64::new(1);

fn next_paint_id() -> PaintId {
    PaintId(NEXT_PAINT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Per-paint invalidation flags. Mutators set the matching bit; `update`
/// re-derives only flagged data and clears the bits as work completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dirty(u8);

impl Dirty {
    pub const PATH: Dirty = Dirty(1 << 0);
    pub const TRANSFORM: Dirty = Dirty(1 << 1);
    pub const COLOR: Dirty = Dirty(1 << 2);
    pub const GRADIENT: Dirty = Dirty(1 << 3);
    pub const STROKE: Dirty = Dirty(1 << 4);
    pub const COMPOSITE: Dirty = Dirty(1 << 5);
    pub const OPACITY: Dirty = Dirty(1 << 6);
    pub const ALL: Dirty = Dirty(0x7f);

    pub fn clean() -> Dirty {
        Dirty(0)
    }

    #[inline]
    pub fn set(&mut self, flag: Dirty) {
        self.0 |= flag.0;
    }

    #[inline]
    pub fn contains(&self, flag: Dirty) -> bool {
        self.0 & flag.0 != 0
    }

    #[inline]
    pub fn union(self, other: Dirty) -> Dirty {
        Dirty(self.0 | other.0)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0 = 0;
    }

    /// Whether any flag requiring geometry re-rasterization is set.
    #[inline]
    pub(crate) fn needs_geometry(&self) -> bool {
        self.contains(Self::PATH) || self.contains(Self::TRANSFORM) || self.contains(Self::STROKE)
    }
}

/// How a composite target modulates the paint it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMethod {
    /// Source coverage scales with the mask's alpha.
    AlphaMask,
    /// Source coverage scales with 255 − mask alpha.
    InvAlphaMask,
    /// The mask is a binary shape; its fill color is ignored.
    ClipPath,
    /// Coverage from the mask's luminance, modulated by its alpha.
    LumaMask,
    /// Inverse of `LumaMask`.
    InvLumaMask,
}

/// A mask relationship: the target paint plus the method applied.
#[derive(Debug, Clone)]
pub struct Composite {
    pub(crate) target: Paint,
    pub(crate) method: CompositeMethod,
}

impl Composite {
    pub fn target(&self) -> &Paint {
        &self.target
    }

    pub fn method(&self) -> CompositeMethod {
        self.method
    }
}

#[derive(Debug, Clone)]
pub enum PaintKind {
    Shape(Shape),
    Picture(Picture),
    Scene(Scene),
}

/// A renderable node of the paint tree.
pub struct Paint {
    pub(crate) id: PaintId,
    // Accumulated transform parts. Translations add, rotations add,
    // scales multiply; a custom matrix composes beneath them.
    tx: f32,
    ty: f32,
    rotation: f32,
    scale: f32,
    custom: Matrix,
    pub(crate) opacity: u8,
    pub(crate) composite: Option<Box<Composite>>,
    pub(crate) dirty: Dirty,
    pub(crate) kind: PaintKind,
    /// Renderer-private prepared block. Never cloned.
    pub(crate) rdata: Option<RenderData>,
}

impl fmt::Debug for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paint")
            .field("id", &self.id)
            .field("opacity", &self.opacity)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Paint {
    fn from_kind(kind: PaintKind) -> Self {
        Self {
            id: next_paint_id(),
            tx: 0.0,
            ty: 0.0,
            rotation: 0.0,
            scale: 1.0,
            custom: Matrix::identity(),
            opacity: 255,
            composite: None,
            dirty: Dirty::ALL,
            kind,
            rdata: None,
        }
    }

    pub fn id(&self) -> PaintId {
        self.id
    }

    // ── Shared attribute mutators ────────────────────────────────────────

    /// Moves the paint by (x, y). Consecutive translations accumulate.
    pub fn translate(&mut self, x: f32, y: f32) -> Result {
        if !x.is_finite() || !y.is_finite() {
            return Err(Error::InvalidArgument);
        }
        self.tx += x;
        self.ty += y;
        self.dirty.set(Dirty::TRANSFORM);
        Ok(())
    }

    /// Rotates the paint by `deg` degrees. Consecutive rotations accumulate.
    pub fn rotate(&mut self, deg: f32) -> Result {
        if !deg.is_finite() {
            return Err(Error::InvalidArgument);
        }
        self.rotation += deg;
        self.dirty.set(Dirty::TRANSFORM);
        Ok(())
    }

    /// Scales the paint uniformly. Consecutive scales multiply.
    pub fn scale(&mut self, factor: f32) -> Result {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(Error::InvalidArgument);
        }
        self.scale *= factor;
        self.dirty.set(Dirty::TRANSFORM);
        Ok(())
    }

    /// Sets a custom matrix composed beneath the accumulated
    /// translate/rotate/scale parts.
    pub fn transform(&mut self, m: Matrix) -> Result {
        if !m.is_finite() {
            return Err(Error::InvalidArgument);
        }
        self.custom = m;
        self.dirty.set(Dirty::TRANSFORM);
        Ok(())
    }

    /// The paint's local transform.
    pub fn matrix(&self) -> Matrix {
        Matrix::translation(self.tx, self.ty)
            .concat(&Matrix::rotation(self.rotation))
            .concat(&Matrix::scaling(self.scale, self.scale))
            .concat(&self.custom)
    }

    /// Sets the opacity; 0 is fully transparent, 255 fully opaque.
    pub fn opacity(&mut self, value: u8) {
        if self.opacity != value {
            self.opacity = value;
            self.dirty.set(Dirty::OPACITY);
        }
    }

    pub fn opacity_value(&self) -> u8 {
        self.opacity
    }

    /// Attaches another paint as a mask. The target is owned by this
    /// paint from here on.
    pub fn composite(&mut self, target: impl Into<Paint>, method: CompositeMethod) {
        self.composite = Some(Box::new(Composite {
            target: target.into(),
            method,
        }));
        self.dirty.set(Dirty::COMPOSITE);
    }

    /// Removes any mask relationship, returning the former target.
    pub fn clear_composite(&mut self) -> Option<Paint> {
        let prev = self.composite.take().map(|c| c.target);
        if prev.is_some() {
            self.dirty.set(Dirty::COMPOSITE);
        }
        prev
    }

    pub fn composite_target(&self) -> Option<&Composite> {
        self.composite.as_deref()
    }

    /// Axis-aligned bounds (x, y, w, h) after the paint's own transform.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        self.bounds_with(&Matrix::identity())
    }

    pub(crate) fn bounds_with(&self, parent: &Matrix) -> Option<(f32, f32, f32, f32)> {
        let m = parent.concat(&self.matrix());
        match &self.kind {
            PaintKind::Shape(shape) => {
                let (min, max) = shape.path.bounds()?;
                Some(transform_aabb(&m, min, max))
            }
            PaintKind::Picture(picture) => {
                let (w, h) = picture.size();
                if w <= 0.0 || h <= 0.0 {
                    return None;
                }
                Some(transform_aabb(&m, Point::new(0.0, 0.0), Point::new(w, h)))
            }
            PaintKind::Scene(scene) => {
                let mut acc: Option<(f32, f32, f32, f32)> = None;
                for child in &scene.children {
                    if let Some((x, y, w, h)) = child.bounds_with(&m) {
                        acc = Some(match acc {
                            None => (x, y, w, h),
                            Some((ax, ay, aw, ah)) => {
                                let x0 = ax.min(x);
                                let y0 = ay.min(y);
                                let x1 = (ax + aw).max(x + w);
                                let y1 = (ay + ah).max(y + h);
                                (x0, y0, x1 - x0, y1 - y0)
                            }
                        });
                    }
                }
                acc
            }
        }
    }

    /// Deep copy with a fresh identity and no prepared state.
    pub fn duplicate(&self) -> Paint {
        self.clone()
    }

    // ── Variant access ───────────────────────────────────────────────────

    pub fn as_shape(&self) -> Option<&Shape> {
        match &self.kind {
            PaintKind::Shape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut Shape> {
        match &mut self.kind {
            PaintKind::Shape(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_picture(&self) -> Option<&Picture> {
        match &self.kind {
            PaintKind::Picture(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_picture_mut(&mut self) -> Option<&mut Picture> {
        match &mut self.kind {
            PaintKind::Picture(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_scene(&self) -> Option<&Scene> {
        match &self.kind {
            PaintKind::Scene(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_scene_mut(&mut self) -> Option<&mut Scene> {
        match &mut self.kind {
            PaintKind::Scene(s) => Some(s),
            _ => None,
        }
    }

    // ── Dirty bookkeeping ────────────────────────────────────────────────

    /// Attribute flags combined with the variant's own flags.
    pub(crate) fn combined_dirty(&self) -> Dirty {
        let kind_dirty = match &self.kind {
            PaintKind::Shape(s) => s.dirty,
            PaintKind::Picture(p) => p.dirty,
            PaintKind::Scene(s) => s.dirty,
        };
        self.dirty.union(kind_dirty)
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear();
        match &mut self.kind {
            PaintKind::Shape(s) => s.dirty.clear(),
            PaintKind::Picture(p) => p.dirty.clear(),
            PaintKind::Scene(s) => s.dirty.clear(),
        }
    }

    /// Finds a paint by id in this subtree, including composite targets.
    pub(crate) fn find_mut(&mut self, id: PaintId) -> Option<&mut Paint> {
        if self.id == id {
            return Some(self);
        }
        if let Some(composite) = self.composite.as_deref_mut() {
            if let Some(found) = composite.target.find_mut(id) {
                return Some(found);
            }
        }
        match &mut self.kind {
            PaintKind::Scene(scene) => scene
                .children
                .iter_mut()
                .find_map(|child| child.find_mut(id)),
            PaintKind::Picture(picture) => match &mut picture.content {
                Some(crate::picture::PictureContent::Scene(inner)) => inner.find_mut(id),
                _ => None,
            },
            PaintKind::Shape(_) => None,
        }
    }
}

impl Clone for Paint {
    fn clone(&self) -> Self {
        Self {
            id: next_paint_id(),
            tx: self.tx,
            ty: self.ty,
            rotation: self.rotation,
            scale: self.scale,
            custom: self.custom,
            opacity: self.opacity,
            composite: self.composite.clone(),
            dirty: Dirty::ALL,
            kind: self.kind.clone(),
            rdata: None,
        }
    }
}

impl From<Shape> for Paint {
    fn from(value: Shape) -> Self {
        Paint::from_kind(PaintKind::Shape(value))
    }
}

impl From<Picture> for Paint {
    fn from(value: Picture) -> Self {
        Paint::from_kind(PaintKind::Picture(value))
    }
}

impl From<Scene> for Paint {
    fn from(value: Scene) -> Self {
        Paint::from_kind(PaintKind::Scene(value))
    }
}

fn transform_aabb(m: &Matrix, min: Point, max: Point) -> (f32, f32, f32, f32) {
    let corners = [
        m.apply(min),
        m.apply(Point::new(max.x, min.y)),
        m.apply(max),
        m.apply(Point::new(min.x, max.y)),
    ];
    let mut lo = corners[0];
    let mut hi = corners[0];
    for c in &corners[1..] {
        lo.x = lo.x.min(c.x);
        lo.y = lo.y.min(c.y);
        hi.x = hi.x.max(c.x);
        hi.y = hi.y.max(c.y);
    }
    (lo.x, lo.y, hi.x - lo.x, hi.y - lo.y)
}
