use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use unifs_core::{path, FileReader, FileSystem, FileWriter, FsError, FsResult};

use crate::writer::LocalWriter;

/// File system rooted in a directory on the local disk.
#[derive(Clone, Debug)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Open a backend over an existing, writable directory.
    pub fn new(root: impl Into<PathBuf>) -> FsResult<Self> {
        let root = root.into();
        let display = root.display().to_string();
        let attr = std::fs::metadata(&root).map_err(|e| FsError::from_io(&display, e))?;

        if !attr.is_dir() {
            return Err(FsError::io(
                display,
                io::Error::other("root path must be a directory"),
            ));
        }
        if attr.permissions().readonly() {
            return Err(FsError::io(
                display,
                io::Error::other("root directory must be writable"),
            ));
        }

        let root = root.canonicalize().map_err(|e| FsError::io(&display, e))?;
        Ok(Self { root })
    }

    /// Create the root directory if needed, then open a backend over it.
    pub fn create_root(root: impl Into<PathBuf>) -> FsResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| FsError::io(root.display().to_string(), e))?;
        Self::new(root)
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a unifs path onto a host path below the root.
    fn resolve(&self, path: &str) -> FsResult<PathBuf> {
        path::validate(path)?;
        let mut resolved = self.root.clone();
        for component in Path::new(path::relative(path)).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(FsError::InvalidPath {
                        path: path.to_string(),
                        reason: "path escapes the backend root",
                    })
                }
            }
        }
        if resolved == self.root {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
                reason: "path names the backend root",
            });
        }
        Ok(resolved)
    }
}

#[async_trait]
impl FileSystem for LocalFs {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn open(&self, path: &str) -> FsResult<FileReader> {
        let file_path = self.resolve(path)?;
        if path::names_directory(path) {
            return Err(FsError::not_found(path));
        }
        let file = tokio::fs::File::open(&file_path)
            .await
            .map_err(|e| FsError::from_io(path, e))?;
        let attr = file.metadata().await.map_err(|e| FsError::io(path, e))?;
        if attr.is_dir() {
            return Err(FsError::not_found(path));
        }
        Ok(Box::pin(file))
    }

    async fn create(&self, path: &str) -> FsResult<FileWriter> {
        let target = self.resolve(path)?;
        if path::names_directory(path) {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
                reason: "path ends with a separator",
            });
        }
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|e| FsError::io(path, e))?;

        let temp = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(".unifs-")
                .suffix(".tmp")
                .tempfile_in(parent)
        })
        .await
        .map_err(|e| FsError::io(path, io::Error::other(e)))?
        .map_err(|e| FsError::io(path, e))?;

        let (file, temp_path) = temp.into_parts();
        let file = tokio::fs::File::from_std(file);
        Ok(Box::pin(LocalWriter::new(path, target, file, temp_path)))
    }

    async fn remove(&self, path: &str) -> FsResult<()> {
        let target = self.resolve(path)?;
        let attr = tokio::fs::metadata(&target)
            .await
            .map_err(|e| FsError::from_io(path, e))?;
        if path::names_directory(path) && !attr.is_dir() {
            return Err(FsError::not_found(path));
        }

        let removed = if attr.is_dir() {
            tokio::fs::remove_dir_all(&target).await
        } else {
            tokio::fs::remove_file(&target).await
        };
        removed.map_err(|e| FsError::from_io(path, e))?;

        debug!(path = %path, dir = attr.is_dir(), "removed from local disk");
        Ok(())
    }
}

#[cfg(test)]
mod conformance {
    use super::LocalFs;
    use unifs_conformance::{conformance_suite, Subject};

    conformance_suite!(|| {
        let dir = tempfile::tempdir().unwrap();
        let fs = LocalFs::new(dir.path()).unwrap();
        Subject::with_guard(fs, dir)
    });
}
