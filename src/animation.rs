//! Frame-seek control over an animated picture.
//!
//! An [`Animation`] wraps a picture whose loader exposes frames. The
//! picture itself is handed to a canvas like any other paint; the
//! animation keeps hold of the shared loader, so seeking marks the
//! picture's content stale and the next `update`/`draw` regenerates the
//! paint tree for that frame.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::loader::{self, LoadModule};
use crate::paint::Paint;
use crate::picture::Picture;

pub struct Animation {
    picture: Option<Paint>,
    module: Option<Arc<Mutex<dyn LoadModule>>>,
    /// Playable frame range restriction, if any.
    segment: Option<(f32, f32)>,
}

impl Animation {
    pub fn new() -> Self {
        Self {
            picture: None,
            module: None,
            segment: None,
        }
    }

    /// Loads an animated file.
    ///
    /// # Errors
    ///
    /// `NotSupported` when no loader for the format is compiled in.
    pub fn load(&mut self, path: &str) -> Result {
        let module = loader::open_from_path(path)?;
        self.adopt(module)
    }

    pub(crate) fn adopt(&mut self, module: Arc<Mutex<dyn LoadModule>>) -> Result {
        let mut picture = Picture::new();
        loader::share(&module);
        picture.adopt(Arc::clone(&module))?;
        self.picture = Some(Paint::from(picture));
        self.module = Some(module);
        self.segment = None;
        Ok(())
    }

    /// Hands the animated picture over, typically to push into a canvas.
    /// Frame control stays with the animation through the shared loader.
    pub fn take_picture(&mut self) -> Option<Paint> {
        self.picture.take()
    }

    pub fn total_frame(&self) -> f32 {
        self.with_loader(|l| l.total_frames()).unwrap_or(0.0)
    }

    pub fn cur_frame(&self) -> f32 {
        self.with_loader(|l| l.cur_frame()).unwrap_or(0.0)
    }

    /// Playback duration in seconds.
    pub fn duration(&self) -> f32 {
        self.with_loader(|l| l.duration()).unwrap_or(0.0)
    }

    /// Seeks to frame `n`, clamped to the active segment.
    ///
    /// # Errors
    ///
    /// `InsufficientCondition` when nothing is loaded or the clamped frame
    /// equals the current one, `NotSupported` when the loader has no
    /// frames.
    pub fn frame(&mut self, n: f32) -> Result {
        if !n.is_finite() {
            return Err(Error::InvalidArgument);
        }
        let Some(module) = &self.module else {
            return Err(Error::InsufficientCondition);
        };
        let mut loader = module.lock().map_err(|_| Error::Unknown)?;
        let total = loader.total_frames();
        if total <= 0.0 {
            return Err(Error::NotSupported);
        }
        let (lo, hi) = self.segment.unwrap_or((0.0, total));
        let clamped = n.clamp(lo, hi.min(total));
        if clamped == loader.cur_frame() {
            return Err(Error::InsufficientCondition);
        }
        loader.set_frame(clamped)
    }

    /// Restricts the playable range to `[begin, end]`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `begin >= end` or the range leaves
    /// `[0, total_frame()]`, `InsufficientCondition` when nothing is
    /// loaded.
    pub fn segment(&mut self, begin: f32, end: f32) -> Result {
        if !begin.is_finite() || !end.is_finite() {
            return Err(Error::InvalidArgument);
        }
        let total = {
            let Some(module) = &self.module else {
                return Err(Error::InsufficientCondition);
            };
            let loader = module.lock().map_err(|_| Error::Unknown)?;
            loader.total_frames()
        };
        if begin >= end || begin < 0.0 || end > total {
            return Err(Error::InvalidArgument);
        }
        self.segment = Some((begin, end));
        Ok(())
    }

    fn with_loader<T>(&self, f: impl FnOnce(&dyn LoadModule) -> T) -> Option<T> {
        let module = self.module.as_ref()?;
        let loader = module.lock().ok()?;
        Some(f(&*loader))
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Animation {
    fn drop(&mut self) {
        if let Some(module) = self.module.take() {
            loader::release(&module);
        }
    }
}
