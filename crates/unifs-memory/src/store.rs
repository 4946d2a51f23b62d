use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::trace;
use unifs_core::path;

/// Concurrency-safe map from path to content.
///
/// Each method is atomic with respect to every other: the lock is taken for
/// exactly one map operation. Cloning yields another handle to the same map.
#[derive(Clone, Default)]
pub struct ContentStore {
    entries: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl ContentStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // Every critical section is a single map call, so a panic elsewhere
    // cannot leave the map half-updated and poisoning is safe to ignore.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Bytes>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the content at `path`.
    ///
    /// The returned `Bytes` is immutable; replacing the entry later does not
    /// change it.
    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.lock().get(path).cloned()
    }

    /// Insert or replace the content at `path`.
    pub fn set(&self, path: impl Into<String>, contents: impl Into<Bytes>) {
        let path = path.into();
        let contents = contents.into();
        trace!(path = %path, bytes = contents.len(), "store set");
        self.lock().insert(path, contents);
    }

    /// Remove the entry at exactly `path`. Returns `true` if it existed.
    pub fn delete(&self, path: &str) -> bool {
        self.lock().remove(path).is_some()
    }

    /// Whether an entry exists at exactly `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.lock().contains_key(path)
    }

    /// Point-in-time snapshot of all keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remove every entry whose key starts with `prefix`.
    ///
    /// Matching is by string, not path segment. Returns the number removed.
    pub fn delete_by_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.lock();
        Self::retain_outside(&mut entries, prefix)
    }

    /// Remove the file at `path`, or if there is none, everything under it.
    ///
    /// Both steps run under one critical section so a concurrent `set` sees
    /// either none or all of the removal. Returns the number removed; zero
    /// means nothing matched.
    pub fn remove_file_or_prefix(&self, path: &str) -> usize {
        let mut entries = self.lock();
        if entries.remove(path).is_some() {
            return 1;
        }
        Self::retain_outside(&mut entries, path)
    }

    fn retain_outside(entries: &mut HashMap<String, Bytes>, prefix: &str) -> usize {
        let before = entries.len();
        entries.retain(|key, _| !path::matches_prefix(key, prefix));
        before - entries.len()
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Total bytes across all entries.
    pub fn total_bytes(&self) -> u64 {
        self.lock().values().map(|b| b.len() as u64).sum()
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("ContentStore")
            .field("entry_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(paths: &[&str]) -> ContentStore {
        let store = ContentStore::new();
        for p in paths {
            store.set(*p, Bytes::from(p.to_string()));
        }
        store
    }

    // -----------------------------------------------------------------------
    // Get / Set / Delete
    // -----------------------------------------------------------------------

    #[test]
    fn set_and_get() {
        let store = ContentStore::new();
        store.set("/hello", Bytes::from_static(b"world"));
        assert_eq!(store.get("/hello").unwrap(), Bytes::from_static(b"world"));
    }

    #[test]
    fn get_missing_returns_none() {
        let store = ContentStore::new();
        assert!(store.get("/missing").is_none());
    }

    #[test]
    fn set_replaces_existing() {
        let store = ContentStore::new();
        store.set("/f", Bytes::from_static(b"a longer first value"));
        store.set("/f", Bytes::from_static(b"short"));
        assert_eq!(store.get("/f").unwrap(), Bytes::from_static(b"short"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn snapshot_survives_replacement() {
        let store = ContentStore::new();
        store.set("/f", Bytes::from_static(b"before"));
        let snapshot = store.get("/f").unwrap();
        store.set("/f", Bytes::from_static(b"after"));
        assert_eq!(snapshot, Bytes::from_static(b"before"));
    }

    #[test]
    fn delete_present_and_missing() {
        let store = store_with(&["/f"]);
        assert!(store.delete("/f"));
        assert!(!store.contains("/f"));
        assert!(!store.delete("/f"));
    }

    // -----------------------------------------------------------------------
    // Prefix removal
    // -----------------------------------------------------------------------

    #[test]
    fn delete_by_prefix_removes_all_matches() {
        let store = store_with(&["/a/b/file1", "/a/b/file2", "/a/c/file3"]);
        assert_eq!(store.delete_by_prefix("/a/b"), 2);
        assert_eq!(store.keys(), vec!["/a/c/file3".to_string()]);
    }

    #[test]
    fn delete_by_prefix_is_string_based() {
        let store = store_with(&["/a/b/file", "/a/bc", "/a/d"]);
        assert_eq!(store.delete_by_prefix("/a/b"), 2);
        assert_eq!(store.keys(), vec!["/a/d".to_string()]);
    }

    #[test]
    fn separator_suffix_restricts_to_one_directory() {
        let store = store_with(&["/a/b/file", "/a/bc"]);
        assert_eq!(store.delete_by_prefix("/a/b/"), 1);
        assert_eq!(store.keys(), vec!["/a/bc".to_string()]);
    }

    #[test]
    fn remove_file_or_prefix_prefers_exact_match() {
        let store = store_with(&["/a", "/ab", "/a/child"]);
        assert_eq!(store.remove_file_or_prefix("/a"), 1);
        assert_eq!(
            store.keys(),
            vec!["/a/child".to_string(), "/ab".to_string()]
        );
    }

    #[test]
    fn remove_file_or_prefix_falls_back_to_prefix() {
        let store = store_with(&["/dir/x", "/dir/y"]);
        assert_eq!(store.remove_file_or_prefix("/dir"), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn remove_file_or_prefix_reports_no_match() {
        let store = store_with(&["/dir/x"]);
        assert_eq!(store.remove_file_or_prefix("/other"), 0);
        assert_eq!(store.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn len_and_is_empty() {
        let store = ContentStore::new();
        assert!(store.is_empty());
        store.set("/a", Bytes::from_static(b"a"));
        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn total_bytes() {
        let store = ContentStore::new();
        store.set("/a", Bytes::from_static(b"12345"));
        store.set("/b", Bytes::from_static(b"123456789"));
        assert_eq!(store.total_bytes(), 14);
    }

    #[test]
    fn clear_removes_all() {
        let store = store_with(&["/a", "/b"]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn keys_are_sorted() {
        let store = store_with(&["/c", "/a", "/b"]);
        assert_eq!(store.keys(), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn clones_share_entries() {
        let store = ContentStore::new();
        let other = store.clone();
        other.set("/shared", Bytes::from_static(b"x"));
        assert!(store.contains("/shared"));
    }

    #[test]
    fn debug_format() {
        let store = store_with(&["/x"]);
        let debug = format!("{store:?}");
        assert!(debug.contains("ContentStore"));
        assert!(debug.contains("entry_count"));
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_sets_on_distinct_paths() {
        use std::thread;

        let store = ContentStore::new();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    let path = format!("/t/{i}");
                    store.set(path.clone(), Bytes::from(path.clone()));
                    assert_eq!(store.get(&path).unwrap(), Bytes::from(path));
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(store.len(), 16);
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let store = store_with(&["/kept"]);
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("poison the store lock");
        })
        .join();

        assert!(store.entries.is_poisoned());
        assert!(store.contains("/kept"));
        store.set("/after", Bytes::from_static(b"ok"));
        assert_eq!(store.len(), 2);
    }
}
