//! Filesystem session: one connection to a remote filesystem.

use crate::client::reader::FileReader;
use crate::error::DfsError;
use crate::fsadapter::client::{DfsBackend, Endpoint};
use crate::ioserv::IoService;
use log::debug;
use std::sync::Arc;

/// Connection-time options.
#[derive(Clone, Copy, Debug)]
pub struct ConnectOptions {
    /// Initial io worker threads; clamped to at least 1.
    pub worker_threads: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self { worker_threads: 1 }
    }
}

/// One authenticated session against a remote filesystem endpoint.
///
/// The session owns the io service and the backend; dropping it stops the
/// service and joins every worker thread. Close readers before dropping the
/// session; a reader that outlives it keeps the backend alive but its reads
/// fail with [`DfsError::ServiceStopped`].
pub struct DfsSession {
    backend: Arc<dyn DfsBackend>,
    io: Arc<IoService>,
    endpoint: Endpoint,
}

impl std::fmt::Debug for DfsSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DfsSession")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl DfsSession {
    /// Connect to `host:port` through `backend`, spinning up the io service
    /// with `opts.worker_threads` workers first.
    ///
    /// On handshake failure the service is stopped and its workers joined
    /// before the error is returned, so no partially constructed session
    /// escapes.
    pub fn connect<B: DfsBackend>(
        backend: B,
        host: &str,
        port: u16,
        opts: ConnectOptions,
    ) -> Result<Self, DfsError> {
        let io = Arc::new(IoService::new());
        for _ in 0..opts.worker_threads.max(1) {
            if let Err(e) = io.add_worker_thread() {
                io.shutdown();
                return Err(e);
            }
        }

        let backend: Arc<dyn DfsBackend> = Arc::new(backend);
        let endpoint = Endpoint {
            host: host.to_string(),
            port,
        };

        let b = Arc::clone(&backend);
        let ep = endpoint.clone();
        let handshake = io.run(async move { b.handshake(&ep).await });
        match handshake {
            Ok(Ok(())) => {}
            Ok(Err(e)) | Err(e) => {
                io.shutdown();
                return Err(e);
            }
        }

        debug!(
            "connected to {endpoint} with {} io worker(s)",
            io.thread_count()
        );
        Ok(Self {
            backend,
            io,
            endpoint,
        })
    }

    /// Open `path` for positional reads. On failure no reader is created and
    /// the session stays usable.
    pub fn open_for_read(&self, path: &str) -> Result<FileReader, DfsError> {
        let b = Arc::clone(&self.backend);
        let p = path.to_string();
        let info = self.io.run(async move { b.lookup(&p).await })??;
        debug!("opened {} for read ({} bytes)", info.path, info.len);
        Ok(FileReader::new(
            info,
            Arc::clone(&self.backend),
            Arc::clone(&self.io),
        ))
    }

    /// How many worker threads are servicing io requests.
    pub fn worker_thread_count(&self) -> usize {
        self.io.thread_count()
    }

    /// Add one worker thread to scale read concurrency for this session;
    /// returns the new pool size.
    pub fn add_worker_thread(&self) -> Result<usize, DfsError> {
        self.io.add_worker_thread()
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Drop for DfsSession {
    fn drop(&mut self) {
        self.io.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsadapter::localfs::LocalFsBackend;
    use crate::fsadapter::memfs::InMemoryBackend;

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn test_connect_open_read_roundtrip() {
        let _ = env_logger::builder().is_test(true).try_init();
        let tmp = tempfile::tempdir().unwrap();
        let data = patterned(64 * 1024 + 17);
        std::fs::write(tmp.path().join("hello.bin"), &data).unwrap();

        let session = DfsSession::connect(
            LocalFsBackend::new(tmp.path()),
            "localhost",
            8020,
            ConnectOptions::default(),
        )
        .unwrap();
        assert_eq!(session.worker_thread_count(), 1);

        let reader = session.open_for_read("/hello.bin").unwrap();
        assert!(reader.is_open_for_read());
        assert_eq!(reader.len(), data.len() as u64);

        let mut buf = vec![0u8; 4096];
        let n = reader.pread(&mut buf, 8192).unwrap();
        assert_eq!(n, 4096);
        assert_eq!(&buf[..], &data[8192..8192 + 4096]);
    }

    #[test]
    fn test_connect_unreachable_endpoint() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("no-such-root");
        let err = DfsSession::connect(
            LocalFsBackend::new(&missing),
            "unreachable.invalid",
            8020,
            ConnectOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DfsError::Unreachable { .. }));
        assert_eq!(err.errno(), libc::ENODEV);
    }

    #[test]
    fn test_open_missing_path_keeps_session_usable() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("present"), b"x").unwrap();
        let session = DfsSession::connect(
            LocalFsBackend::new(tmp.path()),
            "localhost",
            8020,
            ConnectOptions::default(),
        )
        .unwrap();

        assert!(matches!(
            session.open_for_read("/absent"),
            Err(DfsError::NotFound(_))
        ));
        // the failed open must not poison the session
        assert!(session.open_for_read("/present").is_ok());
    }

    #[test]
    fn test_add_worker_thread_scales_pool() {
        let backend = InMemoryBackend::new();
        let session =
            DfsSession::connect(backend, "mem", 0, ConnectOptions { worker_threads: 2 }).unwrap();
        assert_eq!(session.worker_thread_count(), 2);
        assert_eq!(session.add_worker_thread().unwrap(), 3);
        assert_eq!(session.worker_thread_count(), 3);
    }

    #[test]
    fn test_concurrent_preads_disjoint_offsets() {
        let backend = InMemoryBackend::new();
        let data = patterned(256 * 1024);
        backend.insert("/big", data.clone());
        let session =
            DfsSession::connect(backend, "mem", 0, ConnectOptions { worker_threads: 4 }).unwrap();
        let reader = Arc::new(session.open_for_read("/big").unwrap());

        let chunk = 32 * 1024usize;
        let mut joins = Vec::new();
        for i in 0..8usize {
            let reader = Arc::clone(&reader);
            joins.push(std::thread::spawn(move || {
                let mut buf = vec![0u8; chunk];
                let n = reader.pread(&mut buf, (i * chunk) as u64).unwrap();
                (i, n, buf)
            }));
        }
        for j in joins {
            let (i, n, buf) = j.join().unwrap();
            assert_eq!(n, chunk);
            assert_eq!(&buf[..], &data[i * chunk..(i + 1) * chunk]);
        }
    }

    #[test]
    fn test_reader_outliving_session_fails_closed() {
        let backend = InMemoryBackend::new();
        backend.insert("/f", vec![1u8; 128]);
        let session =
            DfsSession::connect(backend, "mem", 0, ConnectOptions::default()).unwrap();
        let reader = session.open_for_read("/f").unwrap();
        drop(session);

        let mut buf = [0u8; 16];
        assert!(matches!(
            reader.pread(&mut buf, 0),
            Err(DfsError::ServiceStopped)
        ));
    }
}
