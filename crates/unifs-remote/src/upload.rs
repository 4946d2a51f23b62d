use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::Bytes;
use object_store::path::Path as ObjectPath;
use object_store::{MultipartUpload, WriteMultipart};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Parts allowed in flight before the upload task stops draining the channel.
const MAX_CONCURRENT_PARTS: usize = 8;

enum UploadMessage {
    Chunk(Bytes),
    Finish,
}

/// Writer feeding a background multipart upload.
///
/// Each write is queued for the upload task. `shutdown()` asks the task to
/// complete the upload and waits for the result. Dropping the writer before
/// shutdown closes the queue, which makes the task abort the upload.
pub struct RemoteWriter {
    path: String,
    tx: Option<mpsc::UnboundedSender<UploadMessage>>,
    task: Option<JoinHandle<io::Result<()>>>,
}

impl RemoteWriter {
    pub(crate) fn spawn(
        path: &str,
        location: ObjectPath,
        upload: Box<dyn MultipartUpload>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_upload(location, upload, rx));
        Self {
            path: path.to_string(),
            tx: Some(tx),
            task: Some(task),
        }
    }

    fn terminated(&self) -> io::Error {
        io::Error::new(
            io::ErrorKind::BrokenPipe,
            format!("upload for {} is no longer accepting data", self.path),
        )
    }
}

async fn run_upload(
    location: ObjectPath,
    upload: Box<dyn MultipartUpload>,
    mut rx: mpsc::UnboundedReceiver<UploadMessage>,
) -> io::Result<()> {
    let mut writer = WriteMultipart::new(upload);
    while let Some(message) = rx.recv().await {
        match message {
            UploadMessage::Chunk(bytes) => {
                if let Err(e) = writer.wait_for_capacity(MAX_CONCURRENT_PARTS).await {
                    abort(writer, &location).await;
                    return Err(io::Error::other(e));
                }
                writer.put(bytes);
            }
            UploadMessage::Finish => {
                writer.finish().await.map_err(io::Error::other)?;
                debug!(location = %location, "completed multipart upload");
                return Ok(());
            }
        }
    }

    warn!(location = %location, "writer dropped before close, aborting upload");
    abort(writer, &location).await;
    Err(io::Error::new(
        io::ErrorKind::Interrupted,
        format!("upload to {location} aborted before close"),
    ))
}

async fn abort(writer: WriteMultipart, location: &ObjectPath) {
    if let Err(e) = writer.abort().await {
        warn!(location = %location, error = %e, "failed to abort multipart upload");
    }
}

impl AsyncWrite for RemoteWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let Some(tx) = this.tx.as_ref() else {
            return Poll::Ready(Err(this.terminated()));
        };
        if tx.send(UploadMessage::Chunk(Bytes::copy_from_slice(buf))).is_err() {
            return Poll::Ready(Err(this.terminated()));
        }
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if let Some(tx) = this.tx.take() {
            // A send failure means the task already ended; its result says why.
            let _ = tx.send(UploadMessage::Finish);
        }
        let Some(task) = this.task.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        let joined = ready!(Pin::new(task).poll(cx));
        this.task = None;
        Poll::Ready(joined.unwrap_or_else(|e| Err(io::Error::other(e))))
    }
}

impl std::fmt::Debug for RemoteWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteWriter")
            .field("path", &self.path)
            .field("closed", &self.tx.is_none())
            .finish()
    }
}
