use std::any::Any;
use std::fmt;
use std::sync::Arc;

use unifs_core::FileSystem;

/// A backend under test, plus anything that has to outlive it.
pub struct Subject {
    pub fs: Arc<dyn FileSystem>,
    _guard: Option<Box<dyn Any + Send + Sync>>,
}

impl Subject {
    pub fn new(fs: impl FileSystem + 'static) -> Self {
        Self {
            fs: Arc::new(fs),
            _guard: None,
        }
    }

    /// Keep `guard` (a temporary directory, say) alive as long as the subject.
    pub fn with_guard(fs: impl FileSystem + 'static, guard: impl Any + Send + Sync) -> Self {
        Self {
            fs: Arc::new(fs),
            _guard: Some(Box::new(guard)),
        }
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("backend", &self.fs.name())
            .finish()
    }
}

/// A fresh absolute path unlikely to collide with any other test's.
pub fn new_test_path() -> String {
    format!("/unifs/file-{:016x}", rand::random::<u64>())
}
