//! libdfs: a lifecycle-managed handle boundary over an asynchronous
//! distributed-filesystem client.
//!
//! Layering, bottom up:
//! - [`fsadapter`]: the `DfsBackend` seam where the real remote client plugs
//!   in, with local-directory and in-memory mock backends.
//! - [`ioserv`]: worker-thread pool driving queued async jobs; callers get a
//!   blocking contract over the async engine.
//! - [`client`]: `DfsSession` (connect/open/scale) and `FileReader`
//!   (positional reads).
//! - [`bindings`]: the opaque-handle surface. Integer tokens over an arena
//!   of live objects, errno-style last-error reporting.
//!
//! With the `diagnostics` cargo feature enabled, every error recorded at the
//! boundary is also emitted through `log::error!`.

pub mod bindings;
pub mod client;
pub mod error;
pub mod fsadapter;
pub mod ioserv;

pub use bindings::{last_error, FileHandle, FsHandle, HandleTable};
pub use client::fs::{ConnectOptions, DfsSession};
pub use client::reader::FileReader;
pub use error::DfsError;
pub use fsadapter::client::{DfsBackend, Endpoint, FileInfo};
pub use ioserv::IoService;
