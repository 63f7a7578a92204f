//! Blocking client over the async engine.
//!
//! Submodules:
//! - `fs`: `DfsSession`, one connection; owns the io service and creates
//!   readers
//! - `reader`: `FileReader`, positional reads against one open stream
//!
//! Every blocking call here suspends the calling thread until a worker of the
//! session's [`crate::ioserv::IoService`] completes the corresponding
//! asynchronous operation. Do not call these methods from inside a tokio
//! runtime; they are meant for plain application threads.

pub mod fs;
pub mod reader;
