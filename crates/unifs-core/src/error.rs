/// Errors from file system operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// No file at the path, and for removal no file under it either.
    #[error("path not found: {path}")]
    NotFound { path: String },

    /// The underlying medium failed (disk, network, object store).
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A bulk write was only partially accepted.
    #[error("short write to {path}: wrote {written} of {expected} bytes")]
    ShortWrite {
        path: String,
        written: usize,
        expected: usize,
    },

    /// The caller passed a path the contract does not allow.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

impl FsError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify an I/O error, promoting absence to [`FsError::NotFound`].
    ///
    /// `NotADirectory` counts as absence: a path that runs through a file
    /// names nothing.
    pub fn from_io(path: impl Into<String>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => {
                Self::not_found(path)
            }
            _ => Self::io(path, source),
        }
    }

    /// Returns `true` for [`FsError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The path the failed operation was addressed to.
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::ShortWrite { path, .. }
            | Self::InvalidPath { path, .. } => path,
        }
    }
}

/// Result alias for file system operations.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn from_io_promotes_not_found() {
        let err = FsError::from_io("/x", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert_eq!(err.path(), "/x");
    }

    #[test]
    fn from_io_promotes_not_a_directory() {
        let err = FsError::from_io("/f/x", io::Error::from(io::ErrorKind::NotADirectory));
        assert!(err.is_not_found());
    }

    #[test]
    fn from_io_keeps_other_kinds() {
        let err = FsError::from_io("/x", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, FsError::Io { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn display_messages() {
        assert_eq!(FsError::not_found("/a").to_string(), "path not found: /a");
        let short = FsError::ShortWrite {
            path: "/a".into(),
            written: 3,
            expected: 8,
        };
        assert_eq!(short.to_string(), "short write to /a: wrote 3 of 8 bytes");
        let invalid = FsError::InvalidPath {
            path: String::new(),
            reason: "path is empty",
        };
        assert_eq!(invalid.to_string(), "invalid path \"\": path is empty");
    }
}
