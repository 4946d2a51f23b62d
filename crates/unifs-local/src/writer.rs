use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tempfile::TempPath;
use tokio::io::AsyncWrite;
use tokio::task::JoinHandle;
use tracing::debug;

/// Writer into a temporary file that is renamed over the target on shutdown.
///
/// Dropping the writer before shutdown deletes the temporary file and leaves
/// the target untouched. The rename runs on the blocking pool.
pub struct LocalWriter {
    path: String,
    target: PathBuf,
    // Declared before `temp` so the handle is closed before the file is deleted.
    file: tokio::fs::File,
    temp: Option<TempPath>,
    persisting: Option<JoinHandle<io::Result<()>>>,
}

impl LocalWriter {
    pub(crate) fn new(path: &str, target: PathBuf, file: tokio::fs::File, temp: TempPath) -> Self {
        Self {
            path: path.to_string(),
            target,
            file,
            temp: Some(temp),
            persisting: None,
        }
    }

    fn closed(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::BrokenPipe,
            format!("write to closed file {}", self.path),
        )
    }
}

impl AsyncWrite for LocalWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        if this.temp.is_none() {
            return Poll::Ready(Err(this.closed()));
        }
        Pin::new(&mut this.file).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.temp.is_some() {
            ready!(Pin::new(&mut this.file).poll_shutdown(cx))?;
            if let Some(temp) = this.temp.take() {
                let target = this.target.clone();
                this.persisting = Some(tokio::task::spawn_blocking(move || {
                    temp.persist(&target).map_err(io::Error::from)
                }));
            }
        }
        let Some(task) = this.persisting.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        let joined = ready!(Pin::new(task).poll(cx));
        this.persisting = None;
        let persisted = joined.unwrap_or_else(|e| Err(io::Error::other(e)));
        if persisted.is_ok() {
            debug!(path = %this.path, target = %this.target.display(), "persisted local file");
        }
        Poll::Ready(persisted)
    }
}

impl std::fmt::Debug for LocalWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWriter")
            .field("path", &self.path)
            .field("target", &self.target)
            .field("closed", &(self.temp.is_none() && self.persisting.is_none()))
            .finish()
    }
}
