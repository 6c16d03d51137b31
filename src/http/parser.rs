use crate::http::request::RequestLine;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed request-line")]
    MalformedRequestLine,
    #[error("unsupported http version")]
    UnsupportedVersion,
    #[error("request in error state")]
    RequestInErrorState,
}

/// Parses a request line from the front of `buf`.
///
/// Returns `Ok(None)` while no CRLF is present. On success returns the line
/// together with the number of bytes it occupied, terminator included.
pub fn parse_request_line(buf: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(line_end) = find_crlf(buf) else {
        return Ok(None);
    };
    let consumed = line_end + CRLF.len();

    let line = std::str::from_utf8(&buf[..line_end])
        .map_err(|_| ParseError::MalformedRequestLine)?;

    // Single spaces only: "GET  / HTTP/1.1" yields an empty token and four parts.
    let parts: Vec<&str> = line.split(' ').collect();
    let &[method, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };

    let version_parts: Vec<&str> = version.split('/').collect();
    let ["HTTP", "1.1"] = version_parts.as_slice() else {
        return Err(ParseError::UnsupportedVersion);
    };

    let request_line = RequestLine {
        method: method.to_string(),
        request_target: target.to_string(),
        http_version: version_parts[1].to_string(),
    };

    Ok(Some((request_line, consumed)))
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}
