//! Positional reads against one open remote stream.

use crate::error::DfsError;
use crate::fsadapter::client::{DfsBackend, FileInfo};
use crate::ioserv::IoService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An open read-only stream.
///
/// Reads are stateless with respect to position: `pread` neither keeps nor
/// consults a cursor, so concurrent calls at different offsets from multiple
/// threads are safe. Completion order across concurrent reads is unspecified.
pub struct FileReader {
    info: FileInfo,
    backend: Arc<dyn DfsBackend>,
    io: Arc<IoService>,
    closed: AtomicBool,
}

impl FileReader {
    pub(crate) fn new(info: FileInfo, backend: Arc<dyn DfsBackend>, io: Arc<IoService>) -> Self {
        Self {
            info,
            backend,
            io,
            closed: AtomicBool::new(false),
        }
    }

    /// True until [`close`](Self::close) is called.
    pub fn is_open_for_read(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    /// Total stream length as reported at open time.
    pub fn len(&self) -> u64 {
        self.info.len
    }

    pub fn is_empty(&self) -> bool {
        self.info.len == 0
    }

    pub fn path(&self) -> &str {
        &self.info.path
    }

    /// Close the stream; terminal, idempotent. Callers should not close a
    /// stream concurrently with an in-flight read on it: the in-flight read
    /// may still deliver its bytes or fail with [`DfsError::StreamClosed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Read up to `buf.len()` bytes starting at absolute `offset` into `buf`;
    /// returns the number of bytes read.
    ///
    /// Returns `min(buf.len(), len - offset)` bytes while `offset < len`,
    /// `Ok(0)` at `offset == len`, and [`DfsError::OffsetBeyondEof`] past it.
    /// Blocks the calling thread until a worker completes the read.
    pub fn pread(&self, buf: &mut [u8], offset: u64) -> Result<usize, DfsError> {
        if !self.is_open_for_read() {
            return Err(DfsError::StreamClosed);
        }
        let size = self.info.len;
        if offset > size {
            return Err(DfsError::OffsetBeyondEof { offset, len: size });
        }
        let want = (buf.len() as u64).min(size - offset) as usize;
        if want == 0 {
            return Ok(0);
        }

        let backend = Arc::clone(&self.backend);
        let info = self.info.clone();
        let bytes = self
            .io
            .run(async move { backend.read_at(&info, offset, want).await })??;

        let got = bytes.len().min(buf.len());
        buf[..got].copy_from_slice(&bytes[..got]);
        Ok(got)
    }
}
