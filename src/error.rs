//! Result codes returned across the public API boundary.
//!
//! Operations never panic through the API; every fallible call returns a
//! [`Result`] carrying one of the codes below. Each public method documents
//! which codes it can produce.

use thiserror::Error;

/// The error half of every public operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A null, out-of-range, or malformed argument (NaN coordinates,
    /// zero-sized target, stride smaller than width).
    #[error("invalid argument")]
    InvalidArgument,
    /// The operation was called in a state where its prerequisites are not
    /// met (draw before update, sync with no draw, term before init).
    #[error("insufficient condition")]
    InsufficientCondition,
    /// An allocation failed. Propagated without partial mutation of
    /// caller-visible state.
    #[error("allocation failed")]
    FailedAllocation,
    /// The engine detected an internal invariant break, such as a loader
    /// sharing-count underflow. Library-fatal.
    #[error("memory corruption")]
    MemoryCorruption,
    /// The requested format or backend is not compiled in.
    #[error("not supported")]
    NotSupported,
    /// Reserved for defensive paths.
    #[error("unknown error")]
    Unknown,
}

/// Shorthand result type used throughout the crate.
pub type Result<T = ()> = core::result::Result<T, Error>;
