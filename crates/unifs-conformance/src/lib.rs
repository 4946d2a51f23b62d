//! Cross-backend conformance suite for unifs.
//!
//! Every backend crate instantiates the same scenarios through
//! [`conformance_suite!`], so memory, disk and object-store backends are held
//! to identical observable behavior:
//!
//! ```rust,ignore
//! #[cfg(test)]
//! mod conformance {
//!     use unifs_conformance::{conformance_suite, Subject};
//!     use crate::MemoryFs;
//!
//!     conformance_suite!(|| Subject::new(MemoryFs::new()));
//! }
//! ```
//!
//! Each scenario gets a fresh [`Subject`] and panics on the first violated
//! expectation, in the manner of an ordinary `#[test]`.

mod scenarios;
mod subject;

pub use scenarios::*;
pub use subject::{new_test_path, Subject};

/// Expand to one `#[tokio::test]` per conformance scenario.
///
/// `$builder` is any expression callable with no arguments that returns a
/// [`Subject`]. The calling crate must depend on `tokio`.
#[macro_export]
macro_rules! conformance_suite {
    ($builder:expr) => {
        $crate::conformance_suite!(@scenarios $builder;
            read_write,
            read_write_all,
            read_all_matches_open,
            read_same_file_multiple_times,
            dropping_one_reader_leaves_others_intact,
            read_isolated_from_concurrent_write,
            write_all_truncates_existent_path,
            create_truncates_existent_path,
            write_empty_contents,
            unclosed_writer_is_invisible,
            remove_file,
            remove_dir,
            remove_nested_dir,
            remove_non_existent_file,
            read_non_existent_file,
            open_non_existent_file,
            path_through_a_file_is_not_found,
            trailing_separator_never_names_a_file,
            empty_path_is_rejected,
            concurrent_read_write,
            concurrent_read_write_same_file,
        );
    };
    (@scenarios $builder:expr; $($scenario:ident),* $(,)?) => {
        $(
            #[::tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn $scenario() {
                let subject: $crate::Subject = ($builder)();
                $crate::$scenario(subject).await;
            }
        )*
    };
}
