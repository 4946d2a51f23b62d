use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use unifs_core::FileSystem;
use unifs_local::LocalFs;
use unifs_memory::MemoryFs;
use unifs_remote::RemoteFs;

/// Errors from loading configuration or opening a backend.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to open {backend} backend: {source}")]
    Backend {
        backend: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Which backend to open, and how.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// A fresh in-process store. Contents are lost on exit.
    #[default]
    Memory,
    /// Files below `root` on the local disk.
    Local {
        root: PathBuf,
        /// Create `root` if it does not exist.
        #[serde(default)]
        create: bool,
    },
    /// Objects in an S3 (or S3-compatible) bucket.
    S3 {
        bucket: String,
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        endpoint: Option<String>,
        /// Key prefix all paths are placed under.
        #[serde(default)]
        prefix: Option<String>,
    },
}

impl BackendConfig {
    /// Backend label, matching [`FileSystem::name`] of what it opens.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Local { .. } => "local",
            Self::S3 { .. } => "remote",
        }
    }
}

/// Top-level configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifsConfig {
    #[serde(default)]
    pub backend: BackendConfig,
}

impl UnifsConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Construct the backend `config` describes.
pub fn open_backend(config: &BackendConfig) -> Result<Arc<dyn FileSystem>, ConfigError> {
    let backend_error = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::Backend {
        backend: config.kind(),
        source,
    };

    let fs: Arc<dyn FileSystem> = match config {
        BackendConfig::Memory => Arc::new(MemoryFs::new()),
        BackendConfig::Local { root, create } => {
            let opened = if *create {
                LocalFs::create_root(root)
            } else {
                LocalFs::new(root)
            };
            Arc::new(opened.map_err(|e| backend_error(e.into()))?)
        }
        BackendConfig::S3 {
            bucket,
            region,
            endpoint,
            prefix,
        } => {
            let remote = RemoteFs::s3(bucket, region.as_deref(), endpoint.as_deref())
                .map_err(|e| backend_error(e.into()))?;
            match prefix {
                Some(prefix) => Arc::new(RemoteFs::with_prefix(Arc::clone(remote.store()), prefix)),
                None => Arc::new(remote),
            }
        }
    };

    info!(backend = fs.name(), "opened backend");
    Ok(fs)
}
