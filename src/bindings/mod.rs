//! Opaque-handle boundary.
//!
//! The only externally callable surface. Sessions and readers live in an
//! arena keyed by integer ids; callers hold `Copy` tokens minted here and
//! give them back to every operation. A token whose object was destroyed is
//! simply absent from the arena, so stale or forged tokens fail like a null
//! handle would: sentinel return plus an errno-style code in the process-wide
//! last-error slot, with no chance of touching a freed object.
//!
//! Return conventions: a null token is `None`, status calls return `0`/`-1`,
//! reads return a signed byte count with `-1` on failure. After any failure,
//! inspect [`last_error`].

use crate::client::fs::{ConnectOptions, DfsSession};
use crate::client::reader::FileReader;
use crate::fsadapter::client::DfsBackend;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Process-wide last-error slot, POSIX-errno style.
static LAST_ERROR: AtomicI32 = AtomicI32::new(0);

/// Code recorded by the most recent failing boundary operation.
pub fn last_error() -> i32 {
    LAST_ERROR.load(Ordering::Relaxed)
}

fn report_error(errnum: i32, msg: &str) {
    LAST_ERROR.store(errnum, Ordering::Relaxed);
    #[cfg(feature = "diagnostics")]
    log::error!("errno={errnum} message=\"{msg}\"");
    #[cfg(not(feature = "diagnostics"))]
    let _ = msg;
}

/// Token for one connected filesystem session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FsHandle(u64);

/// Token for one open file stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileHandle(u64);

struct FileEntry {
    session: u64,
    reader: Arc<FileReader>,
}

/// Arena of live sessions and file streams.
pub struct HandleTable {
    sessions: Mutex<HashMap<u64, Arc<DfsSession>>>,
    files: Mutex<HashMap<u64, FileEntry>>,
    next_id: AtomicU64,
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleTable {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn alloc_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn session(&self, fs: FsHandle) -> Option<Arc<DfsSession>> {
        self.sessions.lock().unwrap().get(&fs.0).cloned()
    }

    /// Connect to `host:port` through `backend` with default options.
    /// Returns `None` and records device-unavailable on failure.
    pub fn connect<B: DfsBackend>(&self, backend: B, host: &str, port: u16) -> Option<FsHandle> {
        self.connect_with(backend, host, port, ConnectOptions::default())
    }

    pub fn connect_with<B: DfsBackend>(
        &self,
        backend: B,
        host: &str,
        port: u16,
        opts: ConnectOptions,
    ) -> Option<FsHandle> {
        match DfsSession::connect(backend, host, port, opts) {
            Ok(session) => {
                let id = self.alloc_id();
                self.sessions.lock().unwrap().insert(id, Arc::new(session));
                Some(FsHandle(id))
            }
            Err(e) => {
                report_error(libc::ENODEV, &format!("unable to connect to {host}:{port}: {e}"));
                None
            }
        }
    }

    /// Destroy the session: stops the io service and joins all its workers.
    pub fn disconnect(&self, fs: FsHandle) -> i32 {
        let removed = self.sessions.lock().unwrap().remove(&fs.0);
        match removed {
            Some(session) => {
                drop(session); // join happens here, outside the table lock
                0
            }
            None => {
                report_error(libc::ENODEV, "cannot disconnect unknown filesystem handle");
                -1
            }
        }
    }

    /// Open `path` for read under `fs`. Returns `None` on failure; the lower
    /// layer's error code is recorded verbatim in the last-error slot.
    pub fn open_for_read(&self, fs: FsHandle, path: &str) -> Option<FileHandle> {
        let Some(session) = self.session(fs) else {
            report_error(
                libc::ENODEV,
                "cannot perform FS operations with unknown filesystem handle",
            );
            return None;
        };
        match session.open_for_read(path) {
            Ok(reader) => {
                let id = self.alloc_id();
                self.files.lock().unwrap().insert(
                    id,
                    FileEntry {
                        session: fs.0,
                        reader: Arc::new(reader),
                    },
                );
                Some(FileHandle(id))
            }
            Err(e) => {
                report_error(e.errno(), &format!("cannot open {path}: {e}"));
                None
            }
        }
    }

    /// True iff `file` names a live stream that is open for read. Unknown
    /// tokens yield `false` without recording an error.
    pub fn is_open_for_read(&self, file: FileHandle) -> bool {
        self.files
            .lock()
            .unwrap()
            .get(&file.0)
            .map(|entry| entry.reader.is_open_for_read())
            .unwrap_or(false)
    }

    /// Close the stream and release its resources.
    pub fn close_file(&self, fs: FsHandle, file: FileHandle) -> i32 {
        if self.session(fs).is_none() {
            report_error(
                libc::ENODEV,
                "cannot perform FS operations with unknown filesystem handle",
            );
            return -1;
        }
        let mut files = self.files.lock().unwrap();
        match files.get(&file.0).map(|entry| entry.session) {
            Some(owner) if owner == fs.0 => {
                if let Some(entry) = files.remove(&file.0) {
                    entry.reader.close();
                }
                0
            }
            Some(_) => {
                report_error(libc::EBADF, "file handle belongs to a different filesystem");
                -1
            }
            None => {
                report_error(
                    libc::EBADF,
                    "cannot perform FS operations with unknown file handle",
                );
                -1
            }
        }
    }

    /// Positional read into `buf`; returns the byte count, or `-1` with the
    /// last-error slot set.
    pub fn pread(&self, fs: FsHandle, file: FileHandle, offset: u64, buf: &mut [u8]) -> isize {
        if self.session(fs).is_none() {
            report_error(
                libc::ENODEV,
                "cannot perform FS operations with unknown filesystem handle",
            );
            return -1;
        }
        let reader = {
            let files = self.files.lock().unwrap();
            match files.get(&file.0) {
                Some(entry) => Arc::clone(&entry.reader),
                None => {
                    report_error(
                        libc::EBADF,
                        "cannot perform FS operations with unknown file handle",
                    );
                    return -1;
                }
            }
        };
        match reader.pread(buf, offset) {
            Ok(n) => n as isize,
            Err(e) => {
                report_error(e.errno(), &format!("read failed: {e}"));
                -1
            }
        }
    }
}
