//! Local disk backend for unifs.
//!
//! [`LocalFs`] maps every unifs path onto a file below a root directory.
//! Writes go to a temporary sibling and are renamed into place on shutdown, so
//! a half-written file is never observable and already-open readers keep the
//! content they opened.
//!
//! Directory removal deletes the directory tree named by the path. Unlike the
//! memory backend it does not match partial final segments: removing `/a/b`
//! leaves `/a/bc` alone.

mod local;
mod writer;

pub use local::LocalFs;
pub use writer::LocalWriter;
