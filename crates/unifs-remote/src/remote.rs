use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use tokio_util::io::StreamReader;
use tracing::debug;
use unifs_core::{path, FileReader, FileSystem, FileWriter, FsError, FsResult};

use crate::upload::RemoteWriter;

/// File system over an object store bucket.
#[derive(Clone, Debug)]
pub struct RemoteFs {
    store: Arc<dyn ObjectStore>,
    prefix: Option<String>,
}

impl RemoteFs {
    /// Address objects at the top level of `store`.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            prefix: None,
        }
    }

    /// Address objects below `prefix` within `store`.
    pub fn with_prefix(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_matches('/');
        Self {
            store,
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
        }
    }

    /// Connect to an S3 bucket, taking credentials from the environment.
    ///
    /// `endpoint` selects an S3-compatible service; plain `http://` endpoints
    /// are allowed so local emulators work.
    pub fn s3(
        bucket: &str,
        region: Option<&str>,
        endpoint: Option<&str>,
    ) -> object_store::Result<Self> {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Some(region) = region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }
        Ok(Self::new(Arc::new(builder.build()?)))
    }

    /// The underlying object store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Map a unifs path onto an object key.
    fn location(&self, path: &str) -> FsResult<ObjectPath> {
        path::validate(path)?;
        let relative = path::relative(path);
        if relative.trim_matches('/').is_empty() {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
                reason: "path names the bucket root",
            });
        }
        // Object keys have no empty segments, so `a//b` would alias `a/b`.
        if relative.trim_end_matches('/').contains("//") {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
                reason: "path contains an empty segment",
            });
        }
        Ok(match &self.prefix {
            Some(prefix) => ObjectPath::from(format!("{prefix}/{relative}")),
            None => ObjectPath::from(relative),
        })
    }

    /// Delete every object whose key starts with the key for `path`.
    ///
    /// Object store listings match whole segments, so this lists the parent
    /// and filters by string to get the same matching as the memory backend.
    async fn remove_prefix(&self, path: &str, location: &ObjectPath) -> FsResult<usize> {
        let needle = if path::names_directory(path) {
            format!("{location}/")
        } else {
            location.to_string()
        };
        let parent = ObjectPath::from(path::parent_prefix(location.as_ref()));

        let matched: Vec<ObjectPath> = self
            .store
            .list(Some(&parent))
            .map_ok(|meta| meta.location)
            .try_filter(|key| futures::future::ready(path::matches_prefix(key.as_ref(), &needle)))
            .try_collect()
            .await
            .map_err(|e| to_fs_error(path, e))?;

        if matched.is_empty() {
            return Ok(0);
        }
        let count = matched.len();
        let locations = futures::stream::iter(matched.into_iter().map(Ok)).boxed();
        self.store
            .delete_stream(locations)
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| to_fs_error(path, e))?;
        Ok(count)
    }
}

fn to_fs_error(path: &str, err: object_store::Error) -> FsError {
    match err {
        object_store::Error::NotFound { .. } => FsError::not_found(path),
        other => FsError::io(path, io::Error::other(other)),
    }
}

#[async_trait]
impl FileSystem for RemoteFs {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn open(&self, path: &str) -> FsResult<FileReader> {
        let location = self.location(path)?;
        if path::names_directory(path) {
            return Err(FsError::not_found(path));
        }
        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| to_fs_error(path, e))?;
        let stream = result.into_stream().map_err(io::Error::other);
        Ok(Box::pin(StreamReader::new(stream)))
    }

    async fn create(&self, path: &str) -> FsResult<FileWriter> {
        let location = self.location(path)?;
        if path::names_directory(path) {
            return Err(FsError::InvalidPath {
                path: path.to_string(),
                reason: "path ends with a separator",
            });
        }
        let upload = self
            .store
            .put_multipart(&location)
            .await
            .map_err(|e| to_fs_error(path, e))?;
        debug!(path = %path, location = %location, "started multipart upload");
        Ok(Box::pin(RemoteWriter::spawn(path, location, upload)))
    }

    async fn remove(&self, path: &str) -> FsResult<()> {
        let location = self.location(path)?;
        if !path::names_directory(path) {
            match self.store.head(&location).await {
                Ok(_) => {
                    self.store
                        .delete(&location)
                        .await
                        .map_err(|e| to_fs_error(path, e))?;
                    debug!(path = %path, "removed object");
                    return Ok(());
                }
                Err(object_store::Error::NotFound { .. }) => {}
                Err(e) => return Err(to_fs_error(path, e)),
            }
        }

        match self.remove_prefix(path, &location).await? {
            0 => Err(FsError::not_found(path)),
            removed => {
                debug!(path = %path, removed, "removed objects by prefix");
                Ok(())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use tokio::io::AsyncWriteExt;

    fn in_memory() -> (Arc<dyn ObjectStore>, RemoteFs) {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        (Arc::clone(&store), RemoteFs::new(store))
    }

    async fn keys(store: &Arc<dyn ObjectStore>) -> Vec<String> {
        let mut keys: Vec<String> = store
            .list(None)
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .unwrap();
        keys.sort();
        keys
    }

    // -----------------------------------------------------------------------
    // Key mapping
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn leading_separator_is_stripped_from_keys() {
        let (store, fs) = in_memory();
        fs.write_all("/a/b/file", b"x").await.unwrap();
        assert_eq!(keys(&store).await, vec!["a/b/file"]);
    }

    #[tokio::test]
    async fn prefix_scopes_keys() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
        let tenant_a = RemoteFs::with_prefix(Arc::clone(&store), "/tenant-a/");
        let tenant_b = RemoteFs::with_prefix(Arc::clone(&store), "tenant-b");

        tenant_a.write_all("/doc", b"a").await.unwrap();
        tenant_b.write_all("/doc", b"b").await.unwrap();

        assert_eq!(keys(&store).await, vec!["tenant-a/doc", "tenant-b/doc"]);
        assert_eq!(tenant_a.read_all("/doc").await.unwrap(), b"a");

        tenant_a.remove("/").await.unwrap_err();
        tenant_b.remove("/doc").await.unwrap();
        assert_eq!(keys(&store).await, vec!["tenant-a/doc"]);
    }

    #[tokio::test]
    async fn bucket_root_is_rejected() {
        let (_store, fs) = in_memory();
        let err = fs.remove("/").await.unwrap_err();
        assert!(matches!(err, FsError::InvalidPath { .. }));
    }

    // -----------------------------------------------------------------------
    // Directory emulation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn remove_dir_scenario() {
        let (store, fs) = in_memory();
        fs.write_all("/a/b/file1", b"echo").await.unwrap();
        fs.write_all("/a/b/file2", b"echo").await.unwrap();

        fs.remove("/a/b").await.unwrap();
        assert!(fs.read_all("/a/b/file1").await.unwrap_err().is_not_found());
        assert!(fs.read_all("/a/b/file2").await.unwrap_err().is_not_found());
        assert!(keys(&store).await.is_empty());
    }

    #[tokio::test]
    async fn remove_matches_by_string_prefix() {
        let (store, fs) = in_memory();
        for p in ["/a/b/file", "/a/bc", "/a/d"] {
            fs.write_all(p, b"x").await.unwrap();
        }
        fs.remove("/a/b").await.unwrap();
        assert_eq!(keys(&store).await, vec!["a/d"]);
    }

    #[tokio::test]
    async fn remove_with_trailing_separator_keeps_siblings() {
        let (store, fs) = in_memory();
        fs.write_all("/a/b/file", b"x").await.unwrap();
        fs.write_all("/a/bc", b"x").await.unwrap();

        fs.remove("/a/b/").await.unwrap();
        assert_eq!(keys(&store).await, vec!["a/bc"]);
    }

    #[tokio::test]
    async fn trailing_separator_never_matches_the_file_itself() {
        let (store, fs) = in_memory();
        fs.write_all("/a/b", b"kept").await.unwrap();

        assert!(fs.remove("/a/b/").await.unwrap_err().is_not_found());
        assert!(fs.open("/a/b/").await.map(drop).unwrap_err().is_not_found());
        assert!(matches!(
            fs.create("/a/b/").await.map(drop).unwrap_err(),
            FsError::InvalidPath { .. }
        ));
        assert_eq!(keys(&store).await, vec!["a/b"]);
    }

    #[tokio::test]
    async fn empty_segments_are_rejected() {
        let (store, fs) = in_memory();
        let err = fs.write_all("/a//b", b"x").await.unwrap_err();
        assert!(matches!(err, FsError::InvalidPath { .. }));
        assert!(matches!(
            fs.remove("/a//b/").await.unwrap_err(),
            FsError::InvalidPath { .. }
        ));
        assert!(keys(&store).await.is_empty());
    }

    #[tokio::test]
    async fn path_through_an_object_is_not_found() {
        let (_store, fs) = in_memory();
        fs.write_all("/f", b"x").await.unwrap();
        assert!(fs.open("/f/x").await.map(drop).unwrap_err().is_not_found());
        assert!(fs.remove("/f/x").await.unwrap_err().is_not_found());
    }

    // -----------------------------------------------------------------------
    // Streamed upload
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn dropped_writer_aborts_upload() {
        let (store, fs) = in_memory();
        let mut writer = fs.create("/partial").await.unwrap();
        writer.write_all(b"never completed").await.unwrap();
        drop(writer);

        tokio::task::yield_now().await;
        assert!(keys(&store).await.is_empty());
        assert!(fs.open("/partial").await.map(drop).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn large_write_spans_multiple_parts() {
        let (_store, fs) = in_memory();
        let contents: Vec<u8> = (0..12 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

        let mut writer = fs.create("/big").await.unwrap();
        for chunk in contents.chunks(64 * 1024) {
            writer.write_all(chunk).await.unwrap();
        }
        writer.shutdown().await.unwrap();

        assert_eq!(fs.read_all("/big").await.unwrap(), contents);
    }

    #[tokio::test]
    async fn write_after_shutdown_fails() {
        let (_store, fs) = in_memory();
        let mut writer = fs.create("/f").await.unwrap();
        writer.shutdown().await.unwrap();
        writer.shutdown().await.unwrap();
        let err = writer.write(b"late").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
