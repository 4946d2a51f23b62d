//! Stream adapters over [`ContentStore`] entries.

use std::io::{self, Cursor};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing::debug;

use crate::store::ContentStore;

/// Reader over a snapshot taken when the file was opened.
///
/// Holds no lock and no reference into the store.
#[derive(Debug)]
pub struct MemoryReader {
    cursor: Cursor<Bytes>,
}

impl MemoryReader {
    pub fn new(snapshot: Bytes) -> Self {
        Self {
            cursor: Cursor::new(snapshot),
        }
    }

    /// Release the snapshot. Later reads hit end of file. Closing again is a
    /// no-op, and dropping a reader closes it too.
    pub fn close(&mut self) {
        self.cursor = Cursor::new(Bytes::new());
    }

    /// Bytes not yet read.
    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        len.saturating_sub(self.cursor.position()) as usize
    }
}

impl AsyncRead for MemoryReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().cursor).poll_read(cx, buf)
    }
}

/// Writer that buffers privately and publishes to the store on shutdown.
///
/// Nothing written is visible to readers until `shutdown()`. Dropping the
/// writer first discards the buffer. Shutting down twice is a no-op, and
/// writing after shutdown fails with `BrokenPipe`.
pub struct MemoryWriter {
    store: ContentStore,
    path: String,
    buffer: Vec<u8>,
    closed: bool,
}

impl MemoryWriter {
    pub fn new(store: ContentStore, path: impl Into<String>) -> Self {
        Self {
            store,
            path: path.into(),
            buffer: Vec::new(),
            closed: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bytes buffered and not yet published.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn publish(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let contents = Bytes::from(std::mem::take(&mut self.buffer));
        debug!(path = %self.path, bytes = contents.len(), "publishing memory writer");
        self.store.set(self.path.clone(), contents);
    }
}

impl AsyncWrite for MemoryWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.closed {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("write to closed file {}", this.path),
            )));
        }
        this.buffer.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.get_mut().publish();
        Poll::Ready(Ok(()))
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        if !self.closed {
            debug!(
                path = %self.path,
                bytes = self.buffer.len(),
                "discarding unclosed memory writer"
            );
        }
    }
}

impl std::fmt::Debug for MemoryWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryWriter")
            .field("path", &self.path)
            .field("buffered", &self.buffer.len())
            .field("closed", &self.closed)
            .finish()
    }
}
