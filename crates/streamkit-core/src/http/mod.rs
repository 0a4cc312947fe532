//! HTTP/1.1 framing layer.
//!
//! Outgoing requests are built here, but the body bytes come from a nested
//! call into the codec layer's [`encode_body`](crate::codec::encode_body) —
//! not a chain dispatch — because the HTTP layer needs the encoded length
//! before it can write the `Content-Length` header. Incoming bytes are
//! parsed by [`HttpParser`] and forwarded body-first to the codec layer as
//! they arrive.

pub mod parser;
pub mod request;
pub mod response;

pub use parser::{HttpParser, ParseState};
pub use request::Request;
pub use response::Response;

use crate::codec::CodecLayer;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::layer::LayerState;

/// Fixed header emission order: request line, Host, User-Agent, X-ApiKey,
/// Content-Type, Content-Length, blank line, body.
const USER_AGENT: &str = "streamkit-rs/0.1";

pub struct HttpLayer {
    parser: HttpParser,
}

impl Default for HttpLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpLayer {
    pub fn new() -> Self {
        Self { parser: HttpParser::new() }
    }

    pub fn reset(&mut self) {
        self.parser = HttpParser::new();
    }

    /// Builds the full outgoing byte buffer for `request`: request line,
    /// headers in fixed order, blank line, body. This is what gets handed
    /// to the I/O layer as a single const descriptor.
    pub fn build_request_bytes(&self, config: &ClientConfig, request: &Request) -> Result<Vec<u8>> {
        let body = crate::codec::encode_body(request)?;
        let mut out = String::new();
        out.push_str(&format!(
            "{} {} HTTP/1.1\r\n",
            request.method(),
            request.path()
        ));
        out.push_str(&format!("Host: {}\r\n", config.host));
        out.push_str(&format!("User-Agent: {USER_AGENT}\r\n"));
        out.push_str(&format!("X-ApiKey: {}\r\n", config.api_key));
        out.push_str("Content-Type: text/csv\r\n");
        out.push_str(&format!("Content-Length: {}\r\n", body.len()));
        out.push_str("\r\n");

        let mut bytes = out.into_bytes();
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Feeds a chunk of response bytes through the parser, forwarding any
    /// decoded body bytes to the codec layer as they become available.
    pub fn on_data_received(&mut self, chunk: &[u8], codec: &mut CodecLayer) -> LayerState {
        let outcome = self.parser.feed(chunk);
        if !outcome.body.is_empty() {
            codec.accept_body_chunk(&outcome.body);
        }
        outcome.state
    }

    /// The I/O layer's notification that the peer closed the connection;
    /// only changes anything while reading an unframed body.
    pub fn on_peer_close(&mut self) -> LayerState {
        self.parser.on_peer_close()
    }

    pub fn is_done(&self) -> bool {
        self.parser.is_terminal()
    }

    pub fn state(&self) -> &ParseState {
        self.parser.state()
    }

    /// Assembles the terminal [`Response`] once the parser has reached
    /// `Done`, using whatever the codec layer decoded from the accumulated
    /// body bytes.
    pub fn finish_response(&self, codec: &CodecLayer) -> Result<Response> {
        let status = self.parser.status.unwrap_or(0);
        let content_length = self
            .parser
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
            .and_then(|(_, v)| v.parse().ok());
        let records = codec.decode()?;
        Ok(Response::new(status, content_length, records))
    }
}
