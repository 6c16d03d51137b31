use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::parser::{ParseError, parse_request_line};

/// Size of the read buffer used when none is configured.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// The first line of an HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// The HTTP method, taken verbatim (e.g. "GET")
    pub method: String,
    /// The request target (e.g. "/index.html")
    pub request_target: String,
    /// Version digits only, always "1.1" for an accepted line
    pub http_version: String,
}

/// Progress of a [`Request`] through parsing.
///
/// `Done` and `Error` are terminal: once reached, no call to
/// [`Request::parse`] moves the request anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Init,
    Done,
    Error,
}

impl ParserState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ParserState::Done | ParserState::Error)
    }
}

/// Failure to obtain a request from a stream.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),

    /// The buffer filled up before a request line terminator arrived.
    #[error("request line exceeds read buffer of {capacity} bytes")]
    BufferFull { capacity: usize },
}

/// A request being parsed from a connection.
///
/// Only the request line is ever parsed. Headers and body bytes that follow
/// it are left on the wire.
#[derive(Debug, Clone)]
pub struct Request {
    /// Valid once [`Request::state`] is `Done`
    pub request_line: RequestLine,
    state: ParserState,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            state: ParserState::Init,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state.is_terminal()
    }

    /// Feeds the unconsumed bytes received so far.
    ///
    /// Returns how many bytes were consumed. `Ok(0)` in the `Init` state means
    /// the terminator has not arrived yet and the caller should read more.
    /// The first error latches the request; after that every call returns
    /// [`ParseError::RequestInErrorState`].
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Error => Err(ParseError::RequestInErrorState),
            ParserState::Done => Ok(0),
            ParserState::Init => match parse_request_line(data) {
                Ok(Some((line, consumed))) => {
                    self.request_line = line;
                    self.state = ParserState::Done;
                    Ok(consumed)
                }
                Ok(None) => Ok(0),
                Err(e) => {
                    self.state = ParserState::Error;
                    Err(e)
                }
            },
        }
    }

    /// Reads from `reader` until a request line has been parsed.
    ///
    /// Uses a fixed buffer of `capacity` bytes. Consumed bytes are dropped
    /// from the front after every parse and the remainder shifted down.
    pub async fn from_reader<R>(reader: &mut R, capacity: usize) -> Result<Request, RequestError>
    where
        R: AsyncRead + Unpin,
    {
        let mut request = Request::new();
        let mut buf = vec![0u8; capacity];
        let mut filled = 0;

        while !request.is_done() {
            if filled == buf.len() {
                return Err(RequestError::BufferFull { capacity });
            }

            let n = reader.read(&mut buf[filled..]).await?;
            if n == 0 {
                return Err(RequestError::Io(std::io::ErrorKind::UnexpectedEof.into()));
            }
            filled += n;

            let consumed = request.parse(&buf[..filled])?;

            buf.copy_within(consumed..filled, 0);
            filled -= consumed;
        }

        Ok(request)
    }
}
