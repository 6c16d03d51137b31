use std::future::Future;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::http::request::{Request, RequestError};
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::ResponseWriter;

/// Application code invoked once per successfully parsed request.
///
/// The handler owns the whole response: status line, headers, body and any
/// trailers, written in wire order through `writer`. The connection is closed
/// as soon as the returned future completes. An error is logged and otherwise
/// ignored; nothing further is written on its behalf.
pub trait Handler: Send + Sync + 'static {
    fn handle<W>(
        &self,
        writer: &mut ResponseWriter<W>,
        request: &Request,
    ) -> impl Future<Output = anyhow::Result<()>> + Send
    where
        W: AsyncWrite + Unpin + Send;
}

/// One accepted client, driven through a single request/response cycle.
///
/// ```text
///   Reading ──parsed──▶ Handling ──▶ Closed
///      │
///      └──failed──▶ Rejecting (fixed 400) ──▶ Closed
/// ```
///
/// The stream is owned for the whole cycle and dropped when [`Connection::run`]
/// returns, whichever way it returns.
pub struct Connection<S> {
    stream: S,
    buffer_size: usize,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(stream: S, buffer_size: usize) -> Self {
        Self {
            stream,
            buffer_size,
        }
    }

    pub async fn run<H: Handler>(mut self, handler: &H) -> anyhow::Result<()> {
        let request = match Request::from_reader(&mut self.stream, self.buffer_size).await {
            Ok(request) => request,
            Err(e) => {
                match &e {
                    RequestError::Io(io) => warn!(error = %io, "failed reading request"),
                    other => debug!(error = %other, "rejecting request"),
                }
                self.reject().await;
                return Ok(());
            }
        };

        debug!(
            method = %request.request_line.method,
            target = %request.request_line.request_target,
            "request parsed"
        );

        let mut writer = ResponseWriter::new(self.stream);
        let result = handler.handle(&mut writer, &request).await;
        debug!(bytes = writer.bytes_written(), "response written");

        let mut stream = writer.into_inner();
        if let Err(e) = stream.shutdown().await {
            debug!(error = %e, "shutdown after response failed");
        }

        result
    }

    /// Sends the fixed 400 response. Write failures are ignored.
    async fn reject(self) {
        let mut writer = ResponseWriter::new(self.stream);

        if writer.write_status_line(StatusCode::BadRequest).await.is_err() {
            return;
        }
        if writer.write_headers(&default_headers(0)).await.is_err() {
            return;
        }

        let _ = writer.into_inner().shutdown().await;
    }
}
