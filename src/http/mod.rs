//! HTTP/1.1 wire handling on top of raw byte streams.
//!
//! # Architecture
//!
//! - **`parser`**: finds and validates the request line in a byte buffer
//! - **`request`**: the per-connection parse state machine and its read loop
//! - **`headers`**: ordered, case-insensitive header fields
//! - **`response`**: status codes and default response headers
//! - **`writer`**: emits status line, headers and body bytes in call order
//! - **`chunked`**: chunk frames for handlers streaming a chunked body
//! - **`connection`**: one request/response cycle per accepted stream
//!
//! Only the request line is parsed. Request headers, request bodies,
//! keep-alive and pipelining are not implemented; every connection is closed
//! after its single response.
//!
//! # Example
//!
//! A handler streaming a chunked body followed by a trailer:
//!
//! ```ignore
//! let mut headers = default_headers(0);
//! headers.delete("Content-Length");
//! headers.set("Transfer-Encoding", "chunked");
//! headers.set("Trailer", "X-Content-Length");
//!
//! writer.write_status_line(StatusCode::Ok).await?;
//! writer.write_headers(&headers).await?;
//! writer.write_body(&encode_chunk(b"hello")).await?;
//! writer.write_body(LAST_CHUNK).await?;
//!
//! let mut trailers = Headers::new();
//! trailers.set("X-Content-Length", "5");
//! writer.write_headers(&trailers).await?;
//! ```

pub mod chunked;
pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

pub use connection::{Connection, Handler};
pub use headers::Headers;
pub use request::{ParserState, Request, RequestError, RequestLine};
pub use response::{StatusCode, default_headers};
pub use writer::{ResponseWriter, WriteError};
