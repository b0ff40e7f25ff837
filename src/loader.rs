//! The loader boundary: the contract any format loader fulfills, plus the
//! process-wide cache that shares loaded assets.
//!
//! The engine itself parses no file formats. A [`LoadModule`] hands it
//! either a paint tree (vector formats) or a bitmap surface (raster
//! formats); the closed format enumeration below names what a full build
//! may compile in. This build ships only the raw-buffer loader — every
//! other format reports `NotSupported` at open time.
//!
//! Loaded assets are shared process-wide: a cache keyed on file path (or
//! on data identity for zero-copy memory loads) hands out the same loader
//! with a sharing counter. Formats whose results are not structurally
//! shareable (SVG, Lottie, and any `copy == true` memory load) bypass the
//! cache.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::paint::Paint;
use crate::picture::Bitmap;

/// The closed enumeration of recognized formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Svg,
    Lottie,
    Tvg,
    Png,
    Jpg,
    Webp,
    Ttf,
    Raw,
}

impl FileType {
    pub fn from_path(path: &str) -> Option<FileType> {
        let ext = path.rsplit('.').next()?;
        Self::from_name(ext)
    }

    pub fn from_mimetype(mimetype: &str) -> Option<FileType> {
        let name = mimetype.rsplit('/').next()?;
        Self::from_name(name)
    }

    fn from_name(name: &str) -> Option<FileType> {
        match name.to_ascii_lowercase().as_str() {
            "svg" | "svg+xml" => Some(FileType::Svg),
            "json" | "lottie" | "lottie+json" => Some(FileType::Lottie),
            "tvg" => Some(FileType::Tvg),
            "png" => Some(FileType::Png),
            "jpg" | "jpeg" => Some(FileType::Jpg),
            "webp" => Some(FileType::Webp),
            "ttf" | "otf" => Some(FileType::Ttf),
            "raw" => Some(FileType::Raw),
            _ => None,
        }
    }

    /// Whether loads of this format may be shared through the cache.
    /// Scene-producing text formats rebuild per consumer and stay private.
    pub(crate) fn shareable(self) -> bool {
        !matches!(self, FileType::Svg | FileType::Lottie)
    }
}

/// The contract a format loader fulfills.
///
/// `read` parses the body and may run expensive decoding; a loader is free
/// to submit that work through the scheduler and join it inside `close`
/// or the first content accessor. Exactly one of [`LoadModule::scene`] or
/// [`LoadModule::bitmap`] returns content once `read` succeeded.
pub trait LoadModule: Send + std::fmt::Debug {
    /// Parses the body. Called once after the loader was opened.
    fn read(&mut self) -> Result;

    /// Releases backing memory, joining any outstanding decode work.
    fn close(&mut self) -> Result;

    /// Natural content dimensions, discovered at open time.
    fn size(&self) -> (f32, f32);

    /// The parsed paint tree, for vector formats.
    fn scene(&mut self) -> Option<Paint> {
        None
    }

    /// The decoded surface, for raster formats.
    fn bitmap(&mut self) -> Option<Bitmap> {
        None
    }

    // ── Animation surface (optional) ─────────────────────────────────────

    fn total_frames(&self) -> f32 {
        0.0
    }

    fn cur_frame(&self) -> f32 {
        0.0
    }

    /// Playback duration in seconds.
    fn duration(&self) -> f32 {
        0.0
    }

    /// Seeks to a frame. Loaders without frames reject the call.
    fn set_frame(&mut self, _frame: f32) -> Result {
        Err(Error::NotSupported)
    }
}

// ── Raw-buffer loader ────────────────────────────────────────────────────

/// Wraps a client-provided `w × h` premultiplied ARGB8888 buffer.
#[derive(Debug)]
struct RawLoader {
    pixels: Arc<Vec<u32>>,
    width: u32,
    height: u32,
}

impl RawLoader {
    fn new(pixels: &[u32], width: u32, height: u32) -> Self {
        Self {
            pixels: Arc::new(pixels.to_vec()),
            width,
            height,
        }
    }
}

impl LoadModule for RawLoader {
    fn read(&mut self) -> Result {
        Ok(())
    }

    fn close(&mut self) -> Result {
        Ok(())
    }

    fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    fn bitmap(&mut self) -> Option<Bitmap> {
        Some(Bitmap {
            pixels: Arc::clone(&self.pixels),
            width: self.width,
            height: self.height,
        })
    }
}

// ── Process-wide cache ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheKey {
    Path(String),
    /// Identity of non-copied memory data.
    Data(usize),
}

struct CacheSlot {
    key: CacheKey,
    refs: usize,
    module: Arc<Mutex<dyn LoadModule>>,
}

static CACHE: Mutex<Vec<CacheSlot>> = Mutex::new(Vec::new());

fn cache_lookup(key: &CacheKey) -> Option<Arc<Mutex<dyn LoadModule>>> {
    let mut cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    for slot in cache.iter_mut() {
        if slot.key == *key {
            slot.refs += 1;
            debug!(refs = slot.refs, "loader cache hit");
            return Some(Arc::clone(&slot.module));
        }
    }
    None
}

fn cache_insert(key: CacheKey, module: &Arc<Mutex<dyn LoadModule>>) {
    let mut cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.push(CacheSlot {
        key,
        refs: 1,
        module: Arc::clone(module),
    });
}

/// Opens a loader for a file path, sharing a cached one when possible.
pub(crate) fn open_from_path(path: &str) -> Result<Arc<Mutex<dyn LoadModule>>> {
    let Some(filetype) = FileType::from_path(path) else {
        return Err(Error::NotSupported);
    };
    if filetype.shareable() {
        if let Some(module) = cache_lookup(&CacheKey::Path(path.to_string())) {
            return Ok(module);
        }
    }
    // No file-format parser is compiled into this build; the raw loader
    // only opens from memory with explicit dimensions.
    Err(Error::NotSupported)
}

/// Opens a loader for in-memory encoded data.
pub(crate) fn open_from_data(
    data: &[u8],
    mimetype: &str,
    copy: bool,
) -> Result<Arc<Mutex<dyn LoadModule>>> {
    if data.is_empty() {
        return Err(Error::InvalidArgument);
    }
    let Some(filetype) = FileType::from_mimetype(mimetype) else {
        return Err(Error::NotSupported);
    };
    if filetype.shareable() && !copy {
        if let Some(module) = cache_lookup(&CacheKey::Data(data.as_ptr() as usize)) {
            return Ok(module);
        }
    }
    Err(Error::NotSupported)
}

/// Opens the raw-buffer loader over `w × h` premultiplied ARGB8888 pixels.
/// With `copy == false` the load is cached keyed on the buffer identity.
pub(crate) fn open_raw(
    pixels: &[u32],
    width: u32,
    height: u32,
    copy: bool,
) -> Result<Arc<Mutex<dyn LoadModule>>> {
    if width == 0 || height == 0 || pixels.len() != (width as usize) * (height as usize) {
        return Err(Error::InvalidArgument);
    }
    let key = CacheKey::Data(pixels.as_ptr() as usize);
    if !copy {
        if let Some(module) = cache_lookup(&key) {
            return Ok(module);
        }
    }
    let module: Arc<Mutex<dyn LoadModule>> =
        Arc::new(Mutex::new(RawLoader::new(pixels, width, height)));
    if !copy {
        cache_insert(key, &module);
    }
    Ok(module)
}

/// Registers another consumer of a cached loader.
pub(crate) fn share(module: &Arc<Mutex<dyn LoadModule>>) {
    let mut cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    for slot in cache.iter_mut() {
        if Arc::ptr_eq(&slot.module, module) {
            slot.refs += 1;
            return;
        }
    }
}

/// Drops one consumer; the loader is closed and evicted at zero.
pub(crate) fn release(module: &Arc<Mutex<dyn LoadModule>>) {
    let mut cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    let Some(index) = cache.iter().position(|s| Arc::ptr_eq(&s.module, module)) else {
        // Uncached loaders die with their last Arc.
        return;
    };
    if cache[index].refs == 0 {
        warn!("loader sharing count underflow");
        return;
    }
    cache[index].refs -= 1;
    if cache[index].refs == 0 {
        let slot = cache.remove(index);
        let lock_result = slot.module.lock();
        if let Ok(mut loader) = lock_result {
            let _ = loader.close();
        }
    }
}

/// Flushes every cached loader. Called at the final [`crate::term`].
pub(crate) fn flush() {
    let mut cache = CACHE.lock().unwrap_or_else(|e| e.into_inner());
    for slot in cache.drain(..) {
        if let Ok(mut loader) = slot.module.lock() {
            let _ = loader.close();
        }
    }
}

/// Whether a loader is still cached, for tests.
#[cfg(test)]
pub(crate) fn is_cached(module: &Arc<Mutex<dyn LoadModule>>) -> bool {
    CACHE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .any(|s| Arc::ptr_eq(&s.module, module))
}
