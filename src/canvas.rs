//! The canvas: owns the root paint list, binds the target buffer, and
//! drives the `update → draw → sync` protocol.
//!
//! # Examples
//!
//! ```
//! use lienzo::{Canvas, Color, Colorspace, Shape};
//!
//! lienzo::init(0).unwrap();
//! let mut buffer = vec![0u32; 100 * 100];
//! let mut canvas = Canvas::new().unwrap();
//! canvas
//!     .target(&mut buffer, 100, 100, 100, Colorspace::Abgr8888)
//!     .unwrap();
//!
//! let mut shape = Shape::new();
//! shape.append_rect(0.0, 0.0, 50.0, 50.0, 0.0, 0.0).unwrap();
//! shape.fill(Color::WHITE).unwrap();
//! canvas.push(shape).unwrap();
//!
//! canvas.update().unwrap();
//! canvas.draw().unwrap();
//! canvas.sync().unwrap();
//! lienzo::term().unwrap();
//! ```

use std::fmt;

use tracing::debug;

use crate::color::Colorspace;
use crate::engine;
use crate::error::{Error, Result};
use crate::math::Matrix;
use crate::paint::{Dirty, Paint, PaintId};
use crate::raster::{RectI, Surface, SwRenderer};
use crate::renderer::Renderer;

/// Rendering protocol phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Updated,
    Drawing,
    Synced,
}

struct Target<'buf> {
    pixels: &'buf mut [u32],
    width: u32,
    stride: u32,
    height: u32,
    cs: Colorspace,
}

/// A drawing surface bound to a client-supplied pixel buffer.
///
/// The canvas owns its root paints; [`Canvas::push`] transfers ownership
/// and returns a [`PaintId`] for later addressing. One canvas belongs to
/// one thread; separate canvases are fully independent.
pub struct Canvas<'buf, R: Renderer = SwRenderer> {
    renderer: R,
    target: Option<Target<'buf>>,
    paints: Vec<Paint>,
    state: State,
}

impl<'buf, R: Renderer> fmt::Debug for Canvas<'buf, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("state", &self.state)
            .field("paints", &self.paints.len())
            .finish()
    }
}

impl<'buf> Canvas<'buf, SwRenderer> {
    /// Creates a canvas backed by the software renderer.
    ///
    /// # Errors
    ///
    /// `InsufficientCondition` when the engine is not initialized.
    pub fn new() -> Result<Self> {
        if !engine::initialized() {
            return Err(Error::InsufficientCondition);
        }
        Ok(Self {
            renderer: SwRenderer::new(),
            target: None,
            paints: Vec::new(),
            state: State::Idle,
        })
    }
}

impl<'buf, R: Renderer> Canvas<'buf, R> {
    /// Binds the output buffer: `height` rows of `stride` pixels, the
    /// leftmost `width` of each visible.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` on a zero dimension, `stride < width`, or a
    /// buffer smaller than `stride * height`;
    /// `InsufficientCondition` while a draw is in flight.
    pub fn target(
        &mut self,
        buffer: &'buf mut [u32],
        width: u32,
        stride: u32,
        height: u32,
        cs: Colorspace,
    ) -> Result {
        if width == 0 || height == 0 || stride < width {
            return Err(Error::InvalidArgument);
        }
        if buffer.len() < stride as usize * height as usize {
            return Err(Error::InvalidArgument);
        }
        if self.state == State::Drawing {
            return Err(Error::InsufficientCondition);
        }
        self.target = Some(Target {
            pixels: buffer,
            width,
            stride,
            height,
            cs,
        });
        // Prepared coverage was clipped against the old target.
        for paint in &mut self.paints {
            paint.dirty.set(Dirty::TRANSFORM);
        }
        self.state = State::Idle;
        Ok(())
    }

    /// Appends a root paint; ownership moves to the canvas.
    ///
    /// # Errors
    ///
    /// `InsufficientCondition` unless the canvas is idle. On error the
    /// paint is returned untouched inside the error — it was never added.
    pub fn push(&mut self, paint: impl Into<Paint>) -> Result<PaintId> {
        if self.state != State::Idle {
            return Err(Error::InsufficientCondition);
        }
        let paint = paint.into();
        let id = paint.id();
        self.paints.push(paint);
        Ok(id)
    }

    /// Drops every root paint, joining outstanding work first.
    pub fn clear(&mut self) -> Result {
        let Canvas {
            renderer, paints, ..
        } = self;
        for paint in paints.iter_mut() {
            renderer.dispose(paint);
        }
        paints.clear();
        self.state = State::Idle;
        Ok(())
    }

    /// Re-derives prepared data for every paint with dirty flags. May
    /// enqueue work on the scheduler and return immediately.
    ///
    /// # Errors
    ///
    /// `InsufficientCondition` without a target, or while a draw awaits
    /// its sync.
    pub fn update(&mut self) -> Result {
        if self.state == State::Drawing {
            return Err(Error::InsufficientCondition);
        }
        let clip = self.clip()?;
        let identity = Matrix::identity();
        let Canvas {
            renderer, paints, ..
        } = self;
        for paint in paints.iter_mut() {
            renderer.prepare(paint, &identity, 255, &clip)?;
        }
        self.state = State::Updated;
        Ok(())
    }

    /// Like [`Canvas::update`], restricted to the tree containing `id`.
    /// Paints with clean flags cost nothing, so the containing root is
    /// walked as a whole.
    ///
    /// # Errors
    ///
    /// `InsufficientCondition` unless updated, `InvalidArgument` when the
    /// paint is not in the tree.
    pub fn update_paint(&mut self, id: PaintId) -> Result {
        if self.state != State::Updated {
            return Err(Error::InsufficientCondition);
        }
        let clip = self.clip()?;
        let identity = Matrix::identity();
        let Canvas {
            renderer, paints, ..
        } = self;
        for paint in paints.iter_mut() {
            if paint.find_mut(id).is_some() {
                return renderer.prepare(paint, &identity, 255, &clip);
            }
        }
        Err(Error::InvalidArgument)
    }

    /// Composites all prepared paints back-to-front into the target.
    /// Blocks only where a paint's prepare is still in flight.
    ///
    /// # Errors
    ///
    /// `InsufficientCondition` without a preceding update. If some paints
    /// fail, the rest still composite and the first failure is returned.
    pub fn draw(&mut self) -> Result {
        if self.state != State::Updated {
            return Err(Error::InsufficientCondition);
        }
        let Canvas {
            renderer,
            target,
            paints,
            ..
        } = self;
        let target = target.as_mut().ok_or(Error::InsufficientCondition)?;
        let mut surface = Surface::new(
            target.pixels,
            target.width,
            target.stride,
            target.height,
            target.cs,
        );
        let mut first_err = None;
        for paint in paints.iter_mut() {
            if let Err(e) = renderer.render(paint, &mut surface) {
                debug!(paint = %paint.id(), error = %e, "paint skipped during draw");
                first_err.get_or_insert(e);
            }
        }
        self.state = State::Drawing;
        first_err.map_or(Ok(()), Err)
    }

    /// Barrier: after this returns, the pixel buffer holds the finished
    /// frame (un-multiplied for the straight-alpha colorspaces).
    ///
    /// # Errors
    ///
    /// `InsufficientCondition` with no draw in flight.
    pub fn sync(&mut self) -> Result {
        if self.state != State::Drawing {
            return Err(Error::InsufficientCondition);
        }
        let Canvas {
            renderer, paints, ..
        } = self;
        for paint in paints.iter_mut() {
            renderer.sync(paint);
        }
        if let Some(target) = self.target.as_mut() {
            if target.cs.is_straight() {
                let mut surface = Surface::new(
                    target.pixels,
                    target.width,
                    target.stride,
                    target.height,
                    target.cs,
                );
                surface.unmultiply_in_place();
            }
        }
        self.state = State::Synced;
        Ok(())
    }

    /// Addresses a pushed paint for mutation between cycles.
    pub fn paint_mut(&mut self, id: PaintId) -> Option<&mut Paint> {
        if self.state == State::Drawing {
            return None;
        }
        self.paints.iter_mut().find_map(|p| p.find_mut(id))
    }

    pub fn paints(&self) -> &[Paint] {
        &self.paints
    }

    fn clip(&self) -> Result<RectI> {
        let target = self.target.as_ref().ok_or(Error::InsufficientCondition)?;
        Ok(RectI::new(0, 0, target.width as i32, target.height as i32))
    }
}
