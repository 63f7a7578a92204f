//! Remote filesystem adapter (fsAdapter)
//!
//! Submodules:
//! - `client`: the `DfsBackend` trait used by the session/reader code
//! - `localfs`: directory-rooted mock backend for local development/testing
//! - `memfs`: in-memory map backend for unit tests
//!
//! Responsibilities summary:
//! - Provide an async API for endpoint handshake, open-for-read lookup and
//!   positional reads of remote files.
//! - Keep the real client (metadata RPC, block location, datanode reads)
//!   behind this seam; everything above it only sees `DfsBackend`.

pub mod client;
pub mod localfs;
pub mod memfs;
