//! Outbound fetches for the `/httpbin/` route.
//!
//! Requests go out over a plain TCP connection as HTTP/1.0 with
//! `Connection: close`, so the upstream answers without chunked framing and
//! the body simply runs until the connection closes (or until
//! `Content-Length` bytes have arrived, when the upstream sends one).

use std::time::Duration;

use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default buffer size for reading upstream responses
const BUFFER_SIZE: usize = 8192;

/// Upper bound on the upstream status line plus headers
const MAX_HEAD_SIZE: usize = 64 * 1024;

pub struct Upstream {
    base_url: String,
    connect_timeout: Duration,
}

impl Upstream {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout,
        }
    }

    /// Resolves `path` against the base URL by plain concatenation.
    pub fn target_url(&self, path: &str) -> Result<url::Url> {
        let joined = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        url::Url::parse(&joined).with_context(|| format!("invalid upstream url {joined:?}"))
    }

    /// Connects, sends the request and reads the response head.
    ///
    /// Body bytes are pulled afterwards with [`UpstreamBody::next_chunk`].
    pub async fn fetch(&self, path: &str) -> Result<UpstreamBody> {
        let url = self.target_url(path)?;
        let host = url.host_str().context("upstream url missing host")?;
        let port = url.port_or_known_default().unwrap_or(80);

        let mut stream = timeout(self.connect_timeout, TcpStream::connect((host, port)))
            .await
            .context("upstream connect timeout")?
            .with_context(|| format!("failed to connect to {host}:{port}"))?;

        tracing::debug!(url = %url, "fetching from upstream");

        stream.write_all(&build_request(&url)).await?;
        stream.flush().await?;

        UpstreamBody::read_head(stream).await
    }
}

/// Serializes the outbound request for `url`.
pub fn build_request(url: &url::Url) -> Vec<u8> {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }

    let host = match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    format!(
        "GET {target} HTTP/1.0\r\nHost: {host}\r\nUser-Agent: rawhttp\r\nAccept: */*\r\nConnection: close\r\n\r\n"
    )
    .into_bytes()
}

/// The body of an upstream response, read incrementally.
pub struct UpstreamBody {
    stream: TcpStream,
    buffer: BytesMut,
    status: u16,
    /// Bytes still expected when the upstream sent `Content-Length`
    remaining: Option<usize>,
}

impl UpstreamBody {
    async fn read_head(mut stream: TcpStream) -> Result<Self> {
        let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

        loop {
            if let Some(end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = buffer.split_to(end + 4);
                let (status, content_length) = parse_head(&head)?;
                let remaining = content_length.map(|len| len.saturating_sub(buffer.len()));
                if let Some(len) = content_length {
                    buffer.truncate(len);
                }

                return Ok(Self {
                    stream,
                    buffer,
                    status,
                    remaining,
                });
            }

            if buffer.len() > MAX_HEAD_SIZE {
                anyhow::bail!("upstream response head too large");
            }

            let n = stream.read_buf(&mut buffer).await?;
            if n == 0 {
                anyhow::bail!("upstream closed before sending a complete response head");
            }
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns up to `max` body bytes, or `None` once the body is complete.
    pub async fn next_chunk(&mut self, max: usize) -> Result<Option<Bytes>> {
        if self.buffer.is_empty() {
            let want = match self.remaining {
                Some(0) => return Ok(None),
                Some(left) => left.min(BUFFER_SIZE),
                None => BUFFER_SIZE,
            };

            self.buffer.reserve(want);
            let n = self.stream.read_buf(&mut self.buffer).await?;
            if n == 0 {
                if matches!(self.remaining, Some(left) if left > 0) {
                    anyhow::bail!("upstream closed before complete body received");
                }
                return Ok(None);
            }

            if let Some(left) = self.remaining.as_mut() {
                let taken = n.min(*left);
                self.buffer.truncate(taken);
                *left -= taken;
            }
        }

        let take = self.buffer.len().min(max.max(1));
        Ok(Some(self.buffer.split_to(take).freeze()))
    }
}

/// Extracts the status code and `Content-Length`, if any, from a response head.
fn parse_head(head: &[u8]) -> Result<(u16, Option<usize>)> {
    let text = std::str::from_utf8(head).context("invalid UTF-8 in upstream response head")?;
    let mut lines = text.split("\r\n");

    let status_line = lines.next().context("empty upstream response")?;
    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        anyhow::bail!("invalid upstream status line: {status_line}");
    }
    let status: u16 = parts
        .next()
        .context("upstream status line missing code")?
        .parse()
        .context("invalid upstream status code")?;

    let mut content_length = None;
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("Content-Length") {
                content_length = Some(
                    value
                        .trim()
                        .parse()
                        .context("invalid upstream Content-Length")?,
                );
            }
        }
    }

    Ok((status, content_length))
}
