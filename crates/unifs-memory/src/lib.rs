//! In-memory backend for unifs.
//!
//! [`MemoryFs`] keeps every file in a [`ContentStore`]: a flat map from path
//! string to bytes behind a single mutex. There are no directory entries. A
//! directory is whatever set of keys shares a prefix, and removing it removes
//! that set.
//!
//! # Design Rules
//!
//! 1. The store lock is held for one map operation and never across an await.
//! 2. Readers get a snapshot at open time; later writes do not reach them.
//! 3. Writers buffer privately and publish on shutdown, replacing prior content.
//! 4. Several writers on one path race: the last to shut down wins.
//! 5. Clones of a store share its contents, so backends can share one store.

pub mod memory;
pub mod store;
pub mod stream;

pub use memory::MemoryFs;
pub use store::ContentStore;
pub use stream::{MemoryReader, MemoryWriter};
