//! Resumable HTTP/1.1 response parser.
//!
//! The parser is fed byte chunks one at a time as they arrive from the I/O
//! layer and must tolerate a status line, a header line, or the blank line
//! terminator being split arbitrarily across chunk boundaries — this is
//! the one place in the HTTP layer that actually suspends.

use crate::error::{codes, CoreError, ErrorCategory};
use crate::layer::LayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    StatusLine,
    Header,
    BodyFramed { content_length: usize, seen: usize },
    BodyEof,
    Done,
    Error,
}

/// Output of one [`HttpParser::feed`] call: the layer state to propagate
/// and any body bytes that became available during this call, ready to
/// hand to the codec layer.
pub struct FeedOutcome {
    pub state: LayerState,
    pub body: Vec<u8>,
}

#[derive(Debug)]
pub struct HttpParser {
    state: ParseState,
    line_buf: Vec<u8>,
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
}

impl Default for HttpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::StatusLine,
            line_buf: Vec::new(),
            status: None,
            headers: Vec::new(),
        }
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ParseState::Done | ParseState::Error)
    }

    /// Feeds one chunk of response bytes through the state machine,
    /// advancing as far as the available bytes allow. The parsed result
    /// must be the same regardless of how the response bytes were split
    /// into chunks on the way in.
    ///
    /// `cursor` is carried as an owned buffer rather than a borrowed slice
    /// of `chunk`: once header parsing consumes the blank-line terminator,
    /// anything still sitting in `line_buf` is the start of the body, and
    /// it must flow into the same body-accumulation path a later `feed`
    /// call's bytes would — a borrowed cursor fixed to `chunk`'s lifetime
    /// cannot carry bytes that arrived from `line_buf` instead.
    pub fn feed(&mut self, chunk: &[u8]) -> FeedOutcome {
        let mut cursor: Vec<u8> = chunk.to_vec();
        let mut body = Vec::new();

        loop {
            match self.state {
                ParseState::StatusLine | ParseState::Header => {
                    self.line_buf.append(&mut cursor);
                    match take_line(&mut self.line_buf) {
                        None => return FeedOutcome { state: LayerState::WantRead, body },
                        Some(line) => {
                            let advance = self.advance_line(&line);
                            if let LayerState::Error(err) = advance {
                                self.state = ParseState::Error;
                                return FeedOutcome { state: LayerState::Error(err), body };
                            }
                            // Whatever is left in `line_buf` — another
                            // header line, or the leading body bytes once
                            // the blank line just advanced the state — is
                            // this loop's next cursor.
                            cursor = std::mem::take(&mut self.line_buf);
                        }
                    }
                }
                ParseState::BodyFramed { content_length, seen } => {
                    if cursor.is_empty() {
                        return FeedOutcome { state: LayerState::WantRead, body };
                    }
                    let remaining = content_length - seen;
                    let take = remaining.min(cursor.len());
                    body.extend_from_slice(&cursor[..take]);
                    if let ParseState::BodyFramed { seen, .. } = &mut self.state {
                        *seen += take;
                    }
                    if seen + take == content_length {
                        self.state = ParseState::Done;
                        return FeedOutcome { state: LayerState::Ok, body };
                    }
                    return FeedOutcome { state: LayerState::WantRead, body };
                }
                ParseState::BodyEof => {
                    body.append(&mut cursor);
                    return FeedOutcome { state: LayerState::WantRead, body };
                }
                ParseState::Done | ParseState::Error => {
                    return FeedOutcome { state: LayerState::Ok, body };
                }
            }
        }
    }

    /// The I/O layer's peer-close notification; only meaningful while
    /// reading an unframed (`BodyEof`) body, where peer close is what marks
    /// the body complete.
    pub fn on_peer_close(&mut self) -> LayerState {
        match self.state {
            ParseState::BodyEof => {
                self.state = ParseState::Done;
                LayerState::Ok
            }
            ParseState::Done => LayerState::Ok,
            _ => {
                let err = CoreError::new(
                    codes::HTTP_PARSER_ERROR,
                    ErrorCategory::Protocol,
                    "connection closed before response was fully framed",
                );
                self.state = ParseState::Error;
                LayerState::Error(err)
            }
        }
    }

    fn advance_line(&mut self, line: &[u8]) -> LayerState {
        let line = String::from_utf8_lossy(line);
        match self.state {
            ParseState::StatusLine => {
                let Some(status) = parse_status_line(&line) else {
                    return LayerState::Error(CoreError::new(
                        codes::HTTP_PARSER_ERROR,
                        ErrorCategory::Protocol,
                        format!("malformed status line: {line:?}"),
                    ));
                };
                self.status = Some(status);
                self.state = ParseState::Header;
                LayerState::Ok
            }
            ParseState::Header => {
                if line.is_empty() {
                    self.state = match self.content_length() {
                        Some(content_length) => ParseState::BodyFramed { content_length, seen: 0 },
                        None => ParseState::BodyEof,
                    };
                    return LayerState::Ok;
                }
                let Some((name, value)) = line.split_once(':') else {
                    return LayerState::Error(CoreError::new(
                        codes::HTTP_PARSER_ERROR,
                        ErrorCategory::Protocol,
                        format!("malformed header line: {line:?}"),
                    ));
                };
                self.headers
                    .push((name.trim().to_string(), value.trim().to_string()));
                LayerState::Ok
            }
            _ => unreachable!("advance_line only called from StatusLine/Header"),
        }
    }

    fn content_length(&self) -> Option<usize> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
            .and_then(|(_, value)| value.parse().ok())
    }
}

/// Pulls one `\r\n`-terminated line out of `buf` if present, leaving any
/// remainder in place for the next call.
fn take_line(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let pos = buf.windows(2).position(|w| w == b"\r\n")?;
    let line = buf[..pos].to_vec();
    buf.drain(..pos + 2);
    Some(line)
}

fn parse_status_line(line: &str) -> Option<u16> {
    let mut parts = line.splitn(3, ' ');
    let _http_version = parts.next()?;
    let status = parts.next()?;
    status.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_response_split_across_three_chunks() {
        let mut parser = HttpParser::new();
        let mut body = Vec::new();

        let out = parser.feed(b"HTTP/1.1 20");
        assert!(matches!(out.state, LayerState::WantRead));

        let out = parser.feed(b"0 OK\r\nContent-Length: 4\r\n\r");
        body.extend(out.body);
        assert!(matches!(out.state, LayerState::WantRead));

        let out = parser.feed(b"\nOKAY");
        body.extend(out.body);
        assert!(matches!(out.state, LayerState::Ok));
        assert_eq!(parser.status, Some(200));
        assert_eq!(body, b"OKAY");
        assert!(parser.is_terminal());
    }

    #[test]
    fn malformed_status_line_is_terminal_error() {
        let mut parser = HttpParser::new();
        let out = parser.feed(b"GARBAGE\r\n");
        assert!(matches!(out.state, LayerState::Error(_)));
        assert_eq!(parser.state(), &ParseState::Error);
    }

    #[test]
    fn body_eof_completes_on_peer_close() {
        let mut parser = HttpParser::new();
        parser.feed(b"HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(parser.state(), &ParseState::BodyEof);
        let out = parser.feed(b"partial-body");
        assert_eq!(out.body, b"partial-body");
        let state = parser.on_peer_close();
        assert!(matches!(state, LayerState::Ok));
        assert!(parser.is_terminal());
    }
}
