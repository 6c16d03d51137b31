use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::{StatusCode, UnrecognizedStatus};

const HTTP_VERSION: &str = "HTTP/1.1";

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error(transparent)]
    Status(#[from] UnrecognizedStatus),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the pieces of a response straight to the underlying stream.
///
/// Each call emits its bytes immediately, in the order the calls are made.
/// Nothing checks that the status line comes before the headers or that the
/// headers come before the body; out of order calls produce well-formed lines
/// in the wrong place. [`ResponseWriter::write_headers`] may be called again
/// after a chunked body to send the trailer block.
///
/// The writer knows nothing about chunked framing. A handler that advertises
/// `Transfer-Encoding: chunked` frames each piece itself, for example with
/// [`crate::http::chunked::encode_chunk`], and writes the last chunk before
/// any trailers.
pub struct ResponseWriter<W> {
    stream: W,
    written: usize,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(stream: W) -> Self {
        Self { stream, written: 0 }
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        let line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.write_raw(line.as_bytes()).await
    }

    /// Like [`ResponseWriter::write_status_line`] but for a raw numeric code.
    ///
    /// Nothing is written when the code is not one of the supported statuses.
    pub async fn write_status_code(&mut self, code: u16) -> Result<(), WriteError> {
        let status = StatusCode::try_from(code)?;
        self.write_status_line(status).await
    }

    /// Writes one `Name: Value\r\n` line per header, then the blank line.
    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        let mut buf = Vec::new();

        for (name, value) in headers.iter() {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(b"\r\n");

        self.write_raw(&buf).await
    }

    /// Writes body bytes unmodified and returns how many were written.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.write_raw(body).await?;
        Ok(body.len())
    }

    /// Total bytes handed to the stream so far.
    pub fn bytes_written(&self) -> usize {
        self.written
    }

    pub fn get_ref(&self) -> &W {
        &self.stream
    }

    pub fn into_inner(self) -> W {
        self.stream
    }

    async fn write_raw(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        self.stream.write_all(bytes).await?;
        self.written += bytes.len();
        Ok(())
    }
}
