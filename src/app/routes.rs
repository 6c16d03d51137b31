use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;
use tracing::{info, warn};

use crate::app::pages;
use crate::app::upstream::Upstream;
use crate::config::Config;
use crate::http::chunked::{LAST_CHUNK, encode_chunk};
use crate::http::connection::Handler;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{StatusCode, default_headers};
use crate::http::writer::ResponseWriter;

const PROXY_PREFIX: &str = "/httpbin/";
const VIDEO_FILE: &str = "super_heavy.mp4";

pub const TRAILER_SHA256: &str = "X-Content-SHA256";
pub const TRAILER_LENGTH: &str = "X-Content-Length";

/// Prefix-based dispatch to the demo responses.
pub struct Router {
    assets_dir: PathBuf,
    upstream: Upstream,
    chunk_size: usize,
}

impl Router {
    pub fn new(cfg: &Config) -> Self {
        Self {
            assets_dir: cfg.assets_dir.clone(),
            upstream: Upstream::new(
                cfg.upstream_url.clone(),
                Duration::from_secs(cfg.upstream_timeout_secs),
            ),
            chunk_size: cfg.proxy_chunk_size,
        }
    }

    async fn video<W>(&self, writer: &mut ResponseWriter<W>) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let path = self.assets_dir.join(VIDEO_FILE);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read asset");
                return html(writer, StatusCode::InternalServerError, pages::INTERNAL_SERVER_ERROR)
                    .await;
            }
        };

        let mut headers = default_headers(data.len());
        headers.replace("Content-Type", "video/mp4");

        writer.write_status_line(StatusCode::Ok).await?;
        writer.write_headers(&headers).await?;
        writer.write_body(&data).await?;
        Ok(())
    }

    /// Streams an upstream body back as a chunked response with trailers.
    async fn proxy<W>(&self, writer: &mut ResponseWriter<W>, path: &str) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut body = match self.upstream.fetch(path).await {
            Ok(body) => body,
            Err(e) => {
                warn!(path, error = %e, "upstream request failed");
                return html(writer, StatusCode::InternalServerError, pages::INTERNAL_SERVER_ERROR)
                    .await;
            }
        };
        info!(path, upstream_status = body.status(), "proxying upstream response");

        let mut headers = default_headers(0);
        headers.delete("Content-Length");
        headers.set("Transfer-Encoding", "chunked");
        headers.replace("Content-Type", "text/plain");
        headers.set("Trailer", TRAILER_SHA256);
        headers.set("Trailer", TRAILER_LENGTH);

        writer.write_status_line(StatusCode::Ok).await?;
        writer.write_headers(&headers).await?;

        let mut hasher = Sha256::new();
        let mut total = 0usize;
        while let Some(chunk) = body.next_chunk(self.chunk_size).await? {
            hasher.update(&chunk);
            total += chunk.len();
            writer.write_body(&encode_chunk(&chunk)).await?;
        }
        writer.write_body(LAST_CHUNK).await?;

        let mut trailers = Headers::new();
        trailers.set(TRAILER_SHA256, format!("{:x}", hasher.finalize()));
        trailers.set(TRAILER_LENGTH, total.to_string());
        writer.write_headers(&trailers).await?;

        Ok(())
    }
}

impl Handler for Router {
    async fn handle<W>(&self, writer: &mut ResponseWriter<W>, request: &Request) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = request.request_line.request_target.as_str();

        if target == "/yourproblem" {
            html(writer, StatusCode::BadRequest, pages::BAD_REQUEST).await
        } else if target == "/myproblem" {
            html(writer, StatusCode::InternalServerError, pages::INTERNAL_SERVER_ERROR).await
        } else if target == "/video" {
            self.video(writer).await
        } else if let Some(rest) = target.strip_prefix(PROXY_PREFIX) {
            self.proxy(writer, rest).await
        } else {
            html(writer, StatusCode::Ok, pages::OK).await
        }
    }
}

async fn html<W>(writer: &mut ResponseWriter<W>, status: StatusCode, body: &str) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = default_headers(body.len());
    headers.replace("Content-Type", "text/html");

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(body.as_bytes()).await?;
    Ok(())
}
