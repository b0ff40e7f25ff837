//! Library lifecycle: reference-counted engine initialization.
//!
//! # Examples
//!
//! ```
//! lienzo::init(0).unwrap();
//! // ... build canvases, render ...
//! lienzo::term().unwrap();
//! ```

use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::loader;
use crate::scheduler;

static INIT_REFS: Mutex<usize> = Mutex::new(0);

/// Initializes the engine with a worker pool of `threads` threads
/// (`0` keeps all preparation inline on the caller thread).
///
/// Repeated calls nest: each `init` must be matched by one [`term`]. Only
/// the first call sizes the pool.
pub fn init(threads: usize) -> Result {
    let mut refs = INIT_REFS.lock().unwrap_or_else(|e| e.into_inner());
    *refs += 1;
    if *refs > 1 {
        return Ok(());
    }
    scheduler::start(threads);
    tracing::debug!(threads = scheduler::threads(), "engine initialized");
    Ok(())
}

/// Tears the engine down. At the last nested `term` the worker pool is
/// joined and the loader cache flushed.
///
/// # Errors
///
/// `InsufficientCondition` when called without a matching [`init`].
pub fn term() -> Result {
    let mut refs = INIT_REFS.lock().unwrap_or_else(|e| e.into_inner());
    if *refs == 0 {
        return Err(Error::InsufficientCondition);
    }
    *refs -= 1;
    if *refs > 0 {
        return Ok(());
    }
    scheduler::stop();
    loader::flush();
    Ok(())
}

/// Whether any `init` is currently outstanding.
pub(crate) fn initialized() -> bool {
    *INIT_REFS.lock().unwrap_or_else(|e| e.into_inner()) > 0
}

/// The crate version as a (major, minor, patch) triple.
pub fn version() -> (u32, u32, u32) {
    let mut parts = env!("CARGO_PKG_VERSION")
        .splitn(3, '.')
        .map(|p| p.parse().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    let patch = parts.next().unwrap_or(0);
    (major, minor, patch)
}
