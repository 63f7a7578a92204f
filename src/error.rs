//! Error taxonomy shared by the adapter, client and boundary layers.

use thiserror::Error;

/// Failures surfaced by the client and its backends.
///
/// Internal layers propagate these with `?`; only the handle boundary
/// flattens them into sentinel returns plus the last-error slot.
#[derive(Debug, Error)]
pub enum DfsError {
    #[error("unable to reach filesystem endpoint {endpoint}: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("path not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not a regular file: {0}")]
    NotAFile(String),

    #[error("offset {offset} is beyond end of file (length {len})")]
    OffsetBeyondEof { offset: u64, len: u64 },

    #[error("stream is closed")]
    StreamClosed,

    #[error("io service has no worker threads")]
    NoWorkers,

    #[error("io service is stopped")]
    ServiceStopped,

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl DfsError {
    /// Errno-style code recorded in the boundary's last-error slot.
    pub fn errno(&self) -> i32 {
        match self {
            DfsError::Unreachable { .. } => libc::ENODEV,
            DfsError::NotFound(_) => libc::ENOENT,
            DfsError::PermissionDenied(_) => libc::EACCES,
            DfsError::NotAFile(_) => libc::EISDIR,
            DfsError::OffsetBeyondEof { .. } => libc::EINVAL,
            DfsError::StreamClosed => libc::EBADF,
            DfsError::NoWorkers | DfsError::ServiceStopped => libc::EIO,
            DfsError::Io(_) => libc::EIO,
        }
    }
}
