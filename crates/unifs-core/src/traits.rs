use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FsResult;
use crate::io::{read_fully, write_fully, FileReader, FileWriter};

/// Backend-agnostic file system.
///
/// All implementations must satisfy these invariants:
/// - `create` truncates: once its writer is shut down, the path holds exactly
///   the bytes written through it.
/// - Content written through a writer is invisible until `shutdown()`, and a
///   writer dropped without shutdown leaves the path untouched.
/// - A reader returned by `open` is unaffected by later writes to its path.
/// - `remove` deletes the exact file or, failing that, everything under the
///   path; it reports `NotFound` when nothing was removed.
/// - All I/O errors are propagated, never silently ignored.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Short label used in logs, e.g. `"memory"`.
    fn name(&self) -> &'static str;

    /// Open a path for reading.
    ///
    /// Returns `FsError::NotFound` if no file exists at `path`.
    async fn open(&self, path: &str) -> FsResult<FileReader>;

    /// Open a path, read it to the end, and close it.
    ///
    /// Backends should not override this: it is defined as exactly the
    /// sequence a caller would issue by hand.
    async fn read_all(&self, path: &str) -> FsResult<Vec<u8>> {
        let mut reader = self.open(path).await?;
        read_fully(&mut reader, path).await
    }

    /// Create (or truncate) a path and return a writer for it.
    async fn create(&self, path: &str) -> FsResult<FileWriter>;

    /// Replace the content at `path` with `contents`.
    ///
    /// Default implementation creates a writer, writes everything and shuts it
    /// down. Backends may override with a direct store as long as the outcome
    /// is indistinguishable.
    async fn write_all(&self, path: &str, contents: &[u8]) -> FsResult<()> {
        let mut writer = self.create(path).await?;
        write_fully(&mut writer, path, contents).await
    }

    /// Remove a file, or every file under `path` when it names no file.
    async fn remove(&self, path: &str) -> FsResult<()>;
}

#[async_trait]
impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn open(&self, path: &str) -> FsResult<FileReader> {
        (**self).open(path).await
    }

    async fn read_all(&self, path: &str) -> FsResult<Vec<u8>> {
        (**self).read_all(path).await
    }

    async fn create(&self, path: &str) -> FsResult<FileWriter> {
        (**self).create(path).await
    }

    async fn write_all(&self, path: &str, contents: &[u8]) -> FsResult<()> {
        (**self).write_all(path, contents).await
    }

    async fn remove(&self, path: &str) -> FsResult<()> {
        (**self).remove(path).await
    }
}

#[async_trait]
impl<T: FileSystem + ?Sized> FileSystem for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn open(&self, path: &str) -> FsResult<FileReader> {
        (**self).open(path).await
    }

    async fn read_all(&self, path: &str) -> FsResult<Vec<u8>> {
        (**self).read_all(path).await
    }

    async fn create(&self, path: &str) -> FsResult<FileWriter> {
        (**self).create(path).await
    }

    async fn write_all(&self, path: &str, contents: &[u8]) -> FsResult<()> {
        (**self).write_all(path, contents).await
    }

    async fn remove(&self, path: &str) -> FsResult<()> {
        (**self).remove(path).await
    }
}
