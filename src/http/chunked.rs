//! Chunked transfer-encoding frames.
//!
//! These are helpers for handlers; [`crate::http::writer::ResponseWriter`]
//! never frames anything on its own. A chunked response body is written as
//! a series of [`encode_chunk`] frames, then [`LAST_CHUNK`], then an optional
//! trailer block written with `write_headers`.

use std::io::Write;

/// The zero-length chunk closing a chunked body.
///
/// The blank line that follows it comes from the trailer block, so a response
/// without trailers still needs an empty `write_headers` call after this.
pub const LAST_CHUNK: &[u8] = b"0\r\n";

/// Frames `data` as `<size in hex>\r\n<data>\r\n`.
pub fn encode_chunk(data: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(data.len() + 12);
    // Writing into a Vec cannot fail.
    let _ = write!(frame, "{:x}\r\n", data.len());
    frame.extend_from_slice(data);
    frame.extend_from_slice(b"\r\n");
    frame
}
