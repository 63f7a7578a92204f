//! Backend trait consumed by the session and reader code.

use crate::error::DfsError;
use async_trait::async_trait;
use bytes::Bytes;

/// Metadata service endpoint. How `host`/`port` are interpreted belongs to
/// the backend (a network backend resolves them, the local mock ignores them).
#[derive(Clone, Debug)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Descriptor of one remote file opened for read.
#[derive(Clone, Debug)]
pub struct FileInfo {
    pub path: String,
    pub len: u64,
}

/// Asynchronous remote-filesystem backend.
///
/// Implementations must be stateless with respect to any read cursor:
/// concurrent `read_at` calls on the same file at different offsets are legal.
#[async_trait]
pub trait DfsBackend: Send + Sync + 'static {
    /// Verify the endpoint is reachable and accepts a session.
    async fn handshake(&self, endpoint: &Endpoint) -> Result<(), DfsError>;

    /// Open-for-read handshake: resolve `path` to a readable regular file.
    async fn lookup(&self, path: &str) -> Result<FileInfo, DfsError>;

    /// Read up to `len` bytes starting at absolute `offset`. The caller has
    /// already clamped `offset + len` to the file length from `lookup`.
    async fn read_at(&self, file: &FileInfo, offset: u64, len: usize) -> Result<Bytes, DfsError>;
}
