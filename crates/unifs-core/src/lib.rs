//! Backend-agnostic file access for unifs.
//!
//! This crate defines the single contract every storage backend implements:
//! open a path for reading, read it whole, create it for writing, write it
//! whole, and remove it. Code written against [`FileSystem`] runs unchanged on
//! any backend.
//!
//! # Backends
//!
//! - `unifs-memory` -- `MemoryFs`, a flat key-addressed store with emulated
//!   directories
//! - `unifs-local` -- `LocalFs`, rooted in a host directory
//! - `unifs-remote` -- `RemoteFs`, over an object store bucket
//!
//! # Contract Rules
//!
//! 1. Writes become visible only when the writer is shut down.
//! 2. A reader sees the content as of the moment it was opened.
//! 3. Creating an existing path truncates it.
//! 4. Removing a path that is not a file removes everything under it as a
//!    prefix; removing nothing is an error.
//! 5. Every failure is returned to the caller. Nothing retries internally.

pub mod error;
pub mod io;
pub mod path;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{FsError, FsResult};
pub use io::{read_fully, write_fully, FileReader, FileWriter};
pub use traits::FileSystem;
