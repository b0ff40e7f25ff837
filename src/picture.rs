//! The `Picture` paint variant: a loaded vector sub-scene or bitmap
//! surface with a viewbox.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::loader::{self, LoadModule};
use crate::paint::{Dirty, Paint};

/// An immutable bitmap surface in premultiplied ARGB8888.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub(crate) pixels: Arc<Vec<u32>>,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Bitmap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

#[derive(Debug, Clone)]
pub(crate) enum PictureContent {
    Scene(Box<Paint>),
    Bitmap(Bitmap),
}

/// A paint that embeds externally loaded content.
///
/// The picture itself stays format-agnostic: a loader yields either a
/// paint tree (vector formats) or a bitmap surface (raster formats), and
/// the picture scales that content from its natural size to the size set
/// with [`Picture::set_size`].
#[derive(Debug, Default)]
pub struct Picture {
    pub(crate) content: Option<PictureContent>,
    /// Content dimensions reported by the loader.
    pub(crate) natural: (f32, f32),
    /// Client override applied on top of the natural size.
    pub(crate) size: Option<(f32, f32)>,
    pub(crate) loader: Option<Arc<Mutex<dyn LoadModule>>>,
    /// Loader frame the current content was decoded from.
    pub(crate) decoded_frame: f32,
    pub(crate) dirty: Dirty,
}

impl Picture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads content from a file path. The format is recognized by
    /// extension from a closed enumeration.
    ///
    /// # Errors
    ///
    /// `NotSupported` when no loader for the format is compiled in,
    /// `InvalidArgument` when the path names no recognizable format.
    pub fn load(&mut self, path: &str) -> Result {
        let module = loader::open_from_path(path)?;
        self.adopt(module)
    }

    /// Loads content from an in-memory encoding. With `copy == false` the
    /// loader may be shared process-wide keyed on the data's identity.
    pub fn load_data(&mut self, data: &[u8], mimetype: &str, copy: bool) -> Result {
        let module = loader::open_from_data(data, mimetype, copy)?;
        self.adopt(module)
    }

    /// Loads a raw pixel buffer of `w * h` premultiplied ARGB8888 values.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the buffer does not match the dimensions.
    pub fn load_raw(&mut self, pixels: &[u32], w: u32, h: u32, copy: bool) -> Result {
        let module = loader::open_raw(pixels, w, h, copy)?;
        self.adopt(module)
    }

    pub(crate) fn adopt(&mut self, module: Arc<Mutex<dyn LoadModule>>) -> Result {
        let (content, natural, frame) = {
            let mut loader = module.lock().map_err(|_| Error::Unknown)?;
            loader.read()?;
            let natural = loader.size();
            let frame = loader.cur_frame();
            let content = if let Some(scene) = loader.scene() {
                PictureContent::Scene(Box::new(scene))
            } else if let Some(bitmap) = loader.bitmap() {
                PictureContent::Bitmap(bitmap)
            } else {
                return Err(Error::Unknown);
            };
            (content, natural, frame)
        };
        if let Some(old) = self.loader.take() {
            loader::release(&old);
        }
        self.content = Some(content);
        self.natural = natural;
        self.decoded_frame = frame;
        self.loader = Some(module);
        self.dirty.set(Dirty::PATH);
        Ok(())
    }

    /// Content size after any client override.
    pub fn size(&self) -> (f32, f32) {
        self.size.unwrap_or(self.natural)
    }

    /// Scales the content to `w × h` pixels.
    pub fn set_size(&mut self, w: f32, h: f32) -> Result {
        if !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0 {
            return Err(Error::InvalidArgument);
        }
        self.size = Some((w, h));
        self.dirty.set(Dirty::TRANSFORM);
        Ok(())
    }

    /// The content's viewbox: origin plus natural dimensions.
    pub fn viewbox(&self) -> (f32, f32, f32, f32) {
        (0.0, 0.0, self.natural.0, self.natural.1)
    }

    /// Re-pulls the scene from an animated loader when its frame moved
    /// since the last decode. Returns whether content changed.
    pub(crate) fn refresh_frame(&mut self) -> bool {
        let Some(module) = &self.loader else {
            return false;
        };
        let Ok(mut loader) = module.lock() else {
            return false;
        };
        let frame = loader.cur_frame();
        if frame == self.decoded_frame {
            return false;
        }
        if let Some(scene) = loader.scene() {
            self.content = Some(PictureContent::Scene(Box::new(scene)));
            self.natural = loader.size();
            self.decoded_frame = frame;
            self.dirty.set(Dirty::PATH);
            return true;
        }
        false
    }

    /// Scale matrix mapping natural content space to the set size.
    pub(crate) fn content_scale(&self) -> (f32, f32) {
        let (w, h) = self.size();
        if self.natural.0 <= 0.0 || self.natural.1 <= 0.0 {
            return (1.0, 1.0);
        }
        (w / self.natural.0, h / self.natural.1)
    }
}

impl Clone for Picture {
    fn clone(&self) -> Self {
        if let Some(module) = &self.loader {
            loader::share(module);
        }
        Self {
            content: self.content.clone(),
            natural: self.natural,
            size: self.size,
            loader: self.loader.clone(),
            decoded_frame: self.decoded_frame,
            dirty: self.dirty,
        }
    }
}

impl Drop for Picture {
    fn drop(&mut self) {
        if let Some(module) = self.loader.take() {
            loader::release(&module);
        }
    }
}
