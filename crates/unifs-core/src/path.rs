//! Path rules shared by every backend.
//!
//! Paths are plain strings. There is no hierarchy beyond what backends infer:
//! the memory and remote backends treat a directory as the set of keys that
//! start with its path, compared byte-for-byte. `"/a/b"` therefore also
//! covers `"/a/bc"`; pass `"/a/b/"` to restrict removal to one directory.

use crate::error::{FsError, FsResult};

/// Reject paths no backend can address.
///
/// The empty path would prefix-match every entry on removal, so it is
/// refused up front.
pub fn validate(path: &str) -> FsResult<()> {
    if path.is_empty() {
        return Err(FsError::InvalidPath {
            path: String::new(),
            reason: "path is empty",
        });
    }
    Ok(())
}

/// Whether `key` falls under `prefix` for directory removal.
pub fn matches_prefix(key: &str, prefix: &str) -> bool {
    key.starts_with(prefix)
}

/// A trailing separator marks a directory: such a path never names a file,
/// and removing it only touches keys below it.
pub fn names_directory(path: &str) -> bool {
    path.ends_with('/')
}

/// Strip leading separators so the path can be joined under a root or key prefix.
pub fn relative(path: &str) -> &str {
    path.trim_start_matches('/')
}

/// The portion of `path` up to and including its last separator.
///
/// Listing under this parent finds every key that could string-match `path`.
pub fn parent_prefix(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_is_invalid() {
        let err = validate("").unwrap_err();
        assert!(matches!(err, FsError::InvalidPath { .. }));
        assert!(validate("/").is_ok());
        assert!(validate("relative/file").is_ok());
    }

    #[test]
    fn prefix_matching_is_by_string_not_segment() {
        assert!(matches_prefix("/a/b/file", "/a/b"));
        assert!(matches_prefix("/a/bc", "/a/b"));
        assert!(matches_prefix("/a/b", "/a/b"));
        assert!(!matches_prefix("/a/bc", "/a/b/"));
        assert!(!matches_prefix("/a", "/a/b"));
    }

    #[test]
    fn trailing_separator_names_a_directory() {
        assert!(names_directory("/a/b/"));
        assert!(!names_directory("/a/b"));
        assert!(!names_directory("a"));
    }

    #[test]
    fn relative_strips_leading_separators() {
        assert_eq!(relative("/a/b"), "a/b");
        assert_eq!(relative("//a"), "a");
        assert_eq!(relative("a/b"), "a/b");
        assert_eq!(relative("/"), "");
    }

    #[test]
    fn parent_prefix_keeps_trailing_separator() {
        assert_eq!(parent_prefix("/a/b"), "/a/");
        assert_eq!(parent_prefix("/a/b/"), "/a/b/");
        assert_eq!(parent_prefix("a"), "");
        assert_eq!(parent_prefix("/a"), "/");
    }
}
