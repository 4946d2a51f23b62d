//! Stream handle types and bulk transfer helpers.

use std::pin::Pin;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{FsError, FsResult};

/// Sequential read handle. Dropping it closes it.
pub type FileReader = Pin<Box<dyn AsyncRead + Send>>;

/// Sequential write handle. Content is committed by `shutdown()`; a writer
/// dropped before shutdown commits nothing.
pub type FileWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// Drain a reader to the end.
pub async fn read_fully(reader: &mut FileReader, path: &str) -> FsResult<Vec<u8>> {
    let mut contents = Vec::new();
    reader
        .read_to_end(&mut contents)
        .await
        .map_err(|e| FsError::io(path, e))?;
    Ok(contents)
}

/// Write every byte of `contents`, then shut the writer down.
///
/// A writer that stops accepting bytes before the end yields
/// [`FsError::ShortWrite`] rather than a generic I/O error.
pub async fn write_fully(writer: &mut FileWriter, path: &str, contents: &[u8]) -> FsResult<()> {
    let mut written = 0;
    while written < contents.len() {
        let n = writer
            .write(&contents[written..])
            .await
            .map_err(|e| FsError::io(path, e))?;
        if n == 0 {
            return Err(FsError::ShortWrite {
                path: path.to_string(),
                written,
                expected: contents.len(),
            });
        }
        written += n;
    }
    writer.shutdown().await.map_err(|e| FsError::io(path, e))
}
