use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rawhttp::http::connection::{Connection, Handler};
use rawhttp::http::request::Request;
use rawhttp::http::response::{StatusCode, default_headers};
use rawhttp::http::writer::ResponseWriter;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, duplex};

const BAD_REQUEST: &str = "HTTP/1.1 400 Bad Request\r\n\
    Content-Length: 0\r\n\
    Connection: close\r\n\
    Content-Type: text/plain\r\n\
    \r\n";

/// Echoes the request target back and counts invocations.
#[derive(Default)]
struct EchoHandler {
    calls: Arc<AtomicUsize>,
}

impl Handler for EchoHandler {
    async fn handle<W>(&self, writer: &mut ResponseWriter<W>, request: &Request) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let body = request.request_line.request_target.clone();
        writer.write_status_line(StatusCode::Ok).await?;
        writer.write_headers(&default_headers(body.len())).await?;
        writer.write_body(body.as_bytes()).await?;
        Ok(())
    }
}

struct FailingHandler;

impl Handler for FailingHandler {
    async fn handle<W>(&self, writer: &mut ResponseWriter<W>, _request: &Request) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        writer.write_status_line(StatusCode::InternalServerError).await?;
        anyhow::bail!("handler gave up")
    }
}

async fn exchange<H: Handler>(handler: &H, request: &[u8], close_write: bool) -> (anyhow::Result<()>, String) {
    let (mut client, server) = duplex(4096);

    client.write_all(request).await.unwrap();
    if close_write {
        client.shutdown().await.unwrap();
    }

    let result = Connection::new(server, 1024).run(handler).await;

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    (result, String::from_utf8(out).unwrap())
}

#[tokio::test]
async fn test_handler_called_once_on_success() {
    let handler = EchoHandler::default();

    let (result, out) = exchange(&handler, b"GET /coffee HTTP/1.1\r\nHost: x\r\n\r\n", false).await;

    result.unwrap();
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        out,
        "HTTP/1.1 200 OK\r\n\
         Content-Length: 7\r\n\
         Connection: close\r\n\
         Content-Type: text/plain\r\n\
         \r\n\
         /coffee"
    );
}

#[tokio::test]
async fn test_parse_error_sends_fixed_400() {
    let handler = EchoHandler::default();

    let (result, out) = exchange(&handler, b"BADLINE\r\n", false).await;

    result.unwrap();
    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    assert_eq!(out, BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_version_sends_fixed_400() {
    let handler = EchoHandler::default();

    let (_, out) = exchange(&handler, b"GET /x HTTP/2.0\r\n", false).await;

    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    assert_eq!(out, BAD_REQUEST);
}

#[tokio::test]
async fn test_eof_before_request_line_sends_400() {
    let handler = EchoHandler::default();

    let (_, out) = exchange(&handler, b"GET / HTTP/1.1", true).await;

    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    assert_eq!(out, BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_request_line_sends_400() {
    let handler = EchoHandler::default();
    let target = "a".repeat(2000);
    let request = format!("GET /{target} HTTP/1.1\r\n");

    let (_, out) = exchange(&handler, request.as_bytes(), false).await;

    assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    assert_eq!(out, BAD_REQUEST);
}

#[tokio::test]
async fn test_handler_error_is_returned_and_connection_closed() {
    let (result, out) = exchange(&FailingHandler, b"GET / HTTP/1.1\r\n", false).await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "handler gave up");
    assert_eq!(out, "HTTP/1.1 500 Internal Server Error\r\n");
}
