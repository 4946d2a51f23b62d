//! Object-store backend for unifs.
//!
//! [`RemoteFs`] maps each path onto an object key in one bucket (optionally
//! below a key prefix) of any [`object_store::ObjectStore`]: Amazon S3 and
//! compatible services in production, `object_store::memory::InMemory` in
//! tests.
//!
//! Writes stream through a channel into a background multipart upload. The
//! upload completes when the writer is shut down and is aborted if the writer
//! is dropped first, so a partial object is never published.
//!
//! # Consistency
//!
//! The backend adds no caching. Whether a read issued right after a write or
//! a removal observes it is up to the underlying store; eventually consistent
//! stores may briefly serve stale content or listings.

mod remote;
mod upload;

pub use remote::RemoteFs;
pub use upload::RemoteWriter;
