use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use unifs_core::{FileReader, FileSystem, FsError};

use crate::subject::{new_test_path, Subject};

const CONCURRENCY: usize = 50;

/// A subject with one file already written at a fresh path.
struct Fixture {
    fs: Arc<dyn FileSystem>,
    path: String,
    contents: Vec<u8>,
    _subject: Subject,
}

impl Fixture {
    async fn with_file(subject: Subject) -> Self {
        let fs = Arc::clone(&subject.fs);
        let path = new_test_path();
        let contents = path.clone().into_bytes();
        fs.write_all(&path, &contents)
            .await
            .unwrap_or_else(|e| panic!("writing contents to path[{path}]: {e}"));
        Self {
            fs,
            path,
            contents,
            _subject: subject,
        }
    }

    async fn open(&self) -> FileReader {
        self.fs
            .open(&self.path)
            .await
            .unwrap_or_else(|e| panic!("opening file[{}]: {e}", self.path))
    }
}

async fn drain(reader: &mut FileReader) -> Vec<u8> {
    let mut contents = Vec::new();
    reader
        .read_to_end(&mut contents)
        .await
        .expect("draining reader");
    contents
}

fn assert_not_found<T>(result: Result<T, FsError>, what: &str) {
    match result {
        Err(FsError::NotFound { .. }) => {}
        Err(other) => panic!("{what}: expected NotFound, got {other:?}"),
        Ok(_) => panic!("{what}: expected NotFound, got success"),
    }
}

async fn assert_file_dont_exist(fs: &dyn FileSystem, path: &str) {
    assert_not_found(fs.read_all(path).await, &format!("reading file[{path}]"));
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

pub async fn read_write(subject: Subject) {
    let fs = &subject.fs;
    let path = new_test_path();
    let expected = path.clone().into_bytes();

    let mut writer = fs.create(&path).await.expect("creating writer");
    let n = writer.write(&expected).await.expect("writing");
    assert_eq!(n, expected.len(), "expected to write {} bytes", expected.len());
    writer.shutdown().await.expect("closing writer");

    let mut reader = fs.open(&path).await.expect("creating reader");
    assert_eq!(drain(&mut reader).await, expected);
}

pub async fn read_write_all(subject: Subject) {
    let fs = &subject.fs;
    let path = new_test_path();
    let expected = path.clone().into_bytes();

    fs.write_all(&path, &expected).await.expect("writing contents");
    assert_eq!(fs.read_all(&path).await.expect("reading file"), expected);
}

pub async fn read_all_matches_open(subject: Subject) {
    let f = Fixture::with_file(subject).await;

    let bulk = f.fs.read_all(&f.path).await.expect("reading file");
    let mut reader = f.open().await;
    let streamed = drain(&mut reader).await;
    drop(reader);

    assert_eq!(bulk, streamed);
    assert_eq!(bulk, f.contents);
}

pub async fn read_same_file_multiple_times(subject: Subject) {
    let f = Fixture::with_file(subject).await;

    let mut readers = Vec::new();
    for _ in 0..6 {
        readers.push(f.open().await);
    }
    for mut reader in readers {
        assert_eq!(drain(&mut reader).await, f.contents);
    }
}

pub async fn dropping_one_reader_leaves_others_intact(subject: Subject) {
    let f = Fixture::with_file(subject).await;

    let mut first = f.open().await;
    let mut second = f.open().await;
    let mut third = f.open().await;

    let mut head = [0u8; 4];
    first.read_exact(&mut head).await.expect("partial read");
    second.read_exact(&mut head).await.expect("partial read");
    drop(first);

    let mut rest = Vec::new();
    second.read_to_end(&mut rest).await.expect("draining second");
    let mut whole = head.to_vec();
    whole.extend(rest);
    assert_eq!(whole, f.contents);
    assert_eq!(drain(&mut third).await, f.contents);
}

pub async fn read_isolated_from_concurrent_write(subject: Subject) {
    let f = Fixture::with_file(subject).await;

    let mut reader = f.open().await;
    let mut head = [0u8; 4];
    reader.read_exact(&mut head).await.expect("partial read");

    let replacement = b"replacement contents, longer than the original path string".to_vec();
    let overwrite = {
        let fs = Arc::clone(&f.fs);
        let path = f.path.clone();
        let replacement = replacement.clone();
        tokio::spawn(async move { fs.write_all(&path, &replacement).await })
    };
    overwrite
        .await
        .expect("overwrite task panicked")
        .expect("overwriting file");

    let mut whole = head.to_vec();
    whole.extend(drain(&mut reader).await);
    assert_eq!(whole, f.contents);
    assert_eq!(f.fs.read_all(&f.path).await.expect("rereading"), replacement);
}

// ---------------------------------------------------------------------------
// Truncation and visibility
// ---------------------------------------------------------------------------

pub async fn write_all_truncates_existent_path(subject: Subject) {
    let fs = &subject.fs;
    let path = new_test_path();
    let expected = path.clone().into_bytes();
    let longer = [expected.as_slice(), b"-with-a-tail"].concat();

    fs.write_all(&path, &longer).await.expect("writing long contents");
    fs.write_all(&path, &expected).await.expect("writing contents");

    assert_eq!(fs.read_all(&path).await.expect("reading file"), expected);
}

pub async fn create_truncates_existent_path(subject: Subject) {
    let f = Fixture::with_file(subject).await;

    let mut writer = f.fs.create(&f.path).await.expect("creating writer");
    writer.write_all(b"short").await.expect("writing");
    writer.shutdown().await.expect("closing writer");

    assert_eq!(f.fs.read_all(&f.path).await.expect("reading file"), b"short");
}

pub async fn write_empty_contents(subject: Subject) {
    let fs = &subject.fs;
    let path = new_test_path();

    fs.write_all(&path, b"").await.expect("writing empty contents");
    assert_eq!(fs.read_all(&path).await.expect("reading file"), b"");
}

pub async fn unclosed_writer_is_invisible(subject: Subject) {
    let fs = &subject.fs;
    let path = new_test_path();

    let mut writer = fs.create(&path).await.expect("creating writer");
    writer.write_all(b"never committed").await.expect("writing");
    drop(writer);
    tokio::task::yield_now().await;

    assert_file_dont_exist(fs.as_ref(), &path).await;
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

pub async fn remove_file(subject: Subject) {
    let f = Fixture::with_file(subject).await;

    f.fs.remove(&f.path).await.expect("removing file");

    assert_file_dont_exist(f.fs.as_ref(), &f.path).await;
    assert_not_found(f.fs.open(&f.path).await, "opening removed file");
}

pub async fn remove_dir(subject: Subject) {
    let fs = &subject.fs;
    let dir = new_test_path();
    let file1 = format!("{dir}/file1");
    let file2 = format!("{dir}/file2");

    fs.write_all(&file1, b"echo").await.expect("writing file1");
    fs.write_all(&file2, b"echo").await.expect("writing file2");

    fs.remove(&dir).await.expect("removing dir");
    assert_file_dont_exist(fs.as_ref(), &file1).await;
    assert_file_dont_exist(fs.as_ref(), &file2).await;
}

pub async fn remove_nested_dir(subject: Subject) {
    let fs = &subject.fs;
    let kept = "/a/keep/file";
    for path in ["/a/b/file1", "/a/b/file2", "/a/b/c/file3", kept] {
        fs.write_all(path, b"echo").await.expect("writing file");
    }

    fs.remove("/a/b").await.expect("removing dir");
    for path in ["/a/b/file1", "/a/b/file2", "/a/b/c/file3"] {
        assert_file_dont_exist(fs.as_ref(), path).await;
    }
    assert_eq!(fs.read_all(kept).await.expect("reading kept file"), b"echo");
}

pub async fn remove_non_existent_file(subject: Subject) {
    let path = new_test_path();
    assert_not_found(subject.fs.remove(&path).await, "removing missing file");
}

// ---------------------------------------------------------------------------
// Missing and invalid paths
// ---------------------------------------------------------------------------

pub async fn read_non_existent_file(subject: Subject) {
    let path = new_test_path();
    assert_not_found(subject.fs.read_all(&path).await, "reading missing file");
}

pub async fn open_non_existent_file(subject: Subject) {
    let path = new_test_path();
    assert_not_found(subject.fs.open(&path).await, "opening missing file");
}

pub async fn path_through_a_file_is_not_found(subject: Subject) {
    let f = Fixture::with_file(subject).await;
    let below = format!("{}/x", f.path);

    assert_not_found(f.fs.open(&below).await, "opening path below a file");
    assert_not_found(f.fs.read_all(&below).await, "reading path below a file");
    assert_not_found(f.fs.remove(&below).await, "removing path below a file");
    assert_eq!(f.fs.read_all(&f.path).await.expect("reading file"), f.contents);
}

pub async fn trailing_separator_never_names_a_file(subject: Subject) {
    let f = Fixture::with_file(subject).await;
    let as_dir = format!("{}/", f.path);

    assert_not_found(f.fs.open(&as_dir).await, "opening file as a directory");
    assert_not_found(f.fs.remove(&as_dir).await, "removing file as a directory");
    assert_eq!(f.fs.read_all(&f.path).await.expect("reading file"), f.contents);
}

pub async fn empty_path_is_rejected(subject: Subject) {
    let fs = &subject.fs;
    let invalid = |r: Result<(), FsError>| matches!(r, Err(FsError::InvalidPath { .. }));

    assert!(invalid(fs.open("").await.map(drop)));
    assert!(invalid(fs.read_all("").await.map(drop)));
    assert!(invalid(fs.create("").await.map(drop)));
    assert!(invalid(fs.write_all("", b"x").await));
    assert!(invalid(fs.remove("").await));
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

pub async fn concurrent_read_write(subject: Subject) {
    let mut tasks = Vec::with_capacity(CONCURRENCY);
    for _ in 0..CONCURRENCY {
        let fs = Arc::clone(&subject.fs);
        tasks.push(tokio::spawn(async move {
            let path = new_test_path();
            let contents = path.clone().into_bytes();

            let mut writer = fs.create(&path).await.expect("creating writer");
            let n = writer.write(&contents).await.expect("writing");
            assert_eq!(n, contents.len());
            writer.shutdown().await.expect("closing writer");

            let mut reader = fs.open(&path).await.expect("opening");
            assert_eq!(drain(&mut reader).await, contents);
            assert_eq!(fs.read_all(&path).await.expect("reading"), contents);
        }));
    }
    for task in tasks {
        task.await.expect("task panicked");
    }
}

pub async fn concurrent_read_write_same_file(subject: Subject) {
    let f = Arc::new(Fixture::with_file(subject).await);
    let mut tasks = Vec::with_capacity(CONCURRENCY);
    for _ in 0..CONCURRENCY {
        let f = Arc::clone(&f);
        tasks.push(tokio::spawn(async move {
            let mut reader = f.open().await;
            assert_eq!(drain(&mut reader).await, f.contents);
            drop(reader);
            assert_eq!(f.fs.read_all(&f.path).await.expect("reading"), f.contents);
        }));
    }
    for task in tasks {
        task.await.expect("task panicked");
    }
}
