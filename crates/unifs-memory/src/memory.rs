use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use unifs_core::{path, FileReader, FileSystem, FileWriter, FsError, FsResult};

use crate::store::ContentStore;
use crate::stream::{MemoryReader, MemoryWriter};

/// File system held entirely in process memory.
///
/// Intended for tests and embedding. Cloning a `MemoryFs` (or building two
/// from the same [`ContentStore`]) gives backends that see the same files.
#[derive(Clone, Debug, Default)]
pub struct MemoryFs {
    store: ContentStore,
}

impl MemoryFs {
    /// Create a backend over a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend over an existing, possibly shared, store.
    pub fn with_store(store: ContentStore) -> Self {
        Self { store }
    }

    /// The store backing this file system.
    pub fn store(&self) -> &ContentStore {
        &self.store
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn open(&self, path: &str) -> FsResult<FileReader> {
        path::validate(path)?;
        let snapshot = self
            .store
            .get(path)
            .ok_or_else(|| FsError::not_found(path))?;
        Ok(Box::pin(MemoryReader::new(snapshot)))
    }

    async fn create(&self, path: &str) -> FsResult<FileWriter> {
        path::validate(path)?;
        Ok(Box::pin(MemoryWriter::new(self.store.clone(), path)))
    }

    async fn write_all(&self, path: &str, contents: &[u8]) -> FsResult<()> {
        path::validate(path)?;
        self.store.set(path, Bytes::copy_from_slice(contents));
        Ok(())
    }

    async fn remove(&self, path: &str) -> FsResult<()> {
        path::validate(path)?;
        match self.store.remove_file_or_prefix(path) {
            0 => Err(FsError::not_found(path)),
            removed => {
                debug!(path = %path, removed, "removed from memory store");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod conformance {
    use super::MemoryFs;
    use unifs_conformance::{conformance_suite, Subject};

    conformance_suite!(|| Subject::new(MemoryFs::new()));
}
