//! Tabular (CSV-like) codec layer.
//!
//! The codec layer has no suspension points of its own — it only transforms
//! buffers it already owns — so it does not implement a resumable state
//! machine the way the I/O and HTTP layers do. It exposes two plain
//! operations instead: [`encode_body`], called by the HTTP layer as a
//! nested function call while it builds an outgoing request (the HTTP
//! layer needs the encoded length before it can write `Content-Length`),
//! and [`CodecLayer`], which accumulates response body bytes as the HTTP
//! layer parses them and decodes the finished buffer once parsing reaches
//! `Done`.

pub mod record;
pub mod timestamp;

pub use record::{BoundedString, Datapoint, Value, VALUE_STRING_MAX_SIZE};
pub use timestamp::Timestamp;

use crate::error::Result;
use crate::http::request::Request;
use crate::layer::{Layer, LayerState};

/// Encodes the body bytes for an outgoing request. Range and delete
/// operations carry their parameters in the query string instead, so they
/// encode to an empty body.
pub fn encode_body(request: &Request) -> Result<Vec<u8>> {
    let records: Vec<String> = match request {
        Request::FeedUpdate { datastream_id, point, .. }
        | Request::DatastreamCreate { datastream_id, point, .. }
        | Request::DatastreamUpdate { datastream_id, point, .. } => {
            vec![record::encode_record(datastream_id, point)]
        }
        Request::DatapointDelete { .. }
        | Request::DatapointDeleteRange { .. }
        | Request::FeedGet { .. }
        | Request::DatastreamGet { .. }
        | Request::DatastreamDelete { .. } => Vec::new(),
    };
    Ok(records.join("\n").into_bytes())
}

/// The codec layer's per-context state block: an accumulating byte buffer
/// and, once the HTTP layer signals the body is complete, the decoded
/// records. This is the terminal store for the top layer of the chain,
/// which has no successor to hand its result to.
#[derive(Debug, Default)]
pub struct CodecLayer {
    buffer: Vec<u8>,
}

impl CodecLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of response body bytes as the HTTP layer delivers
    /// them; never suspends, since buffering bytes already in hand can't
    /// block on anything.
    pub fn accept_body_chunk(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Parses the accumulated buffer into records once the HTTP layer has
    /// reached `Done` for the response body: CR/LF/CRLF line splitting,
    /// quoted-field comma splitting, narrowest numeric type first.
    pub fn decode(&self) -> Result<Vec<Datapoint>> {
        let text = String::from_utf8_lossy(&self.buffer);
        let mut points = Vec::new();
        for line in split_lines(&text) {
            if line.is_empty() {
                continue;
            }
            let fields = record::split_fields(&line);
            if fields.len() < 3 {
                continue;
            }
            let timestamp = Timestamp::parse(&fields[1]).unwrap_or_else(Timestamp::now);
            let value = record::parse_value(&fields[2])?;
            points.push(Datapoint::new(timestamp, value));
        }
        Ok(points)
    }
}

/// Splits on CR, LF, or CRLF without merging adjacent blank lines away. A
/// bare `\r` is a line break in its own right, not just a prefix of `\r\n`,
/// so a plain `split(['\n'])` would swallow a CR-only record boundary into
/// the previous line: normalize `\r\n` to `\n` first, then split on
/// whichever of `\n`/`\r` remains.
fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split(['\n', '\r'])
        .map(str::to_string)
        .collect()
}

/// The codec layer's [`Layer`] contract: it never suspends, so
/// `on_data_ready`/`on_data_received` are the only entry points with
/// anything to do. `HttpLayer` and `TcpIoLayer` drive their suspendable
/// operations through more specific contracts ([`crate::http::HttpLayer`]'s
/// inherent methods, `io_layer::IoLayer`) that need dispatcher access this
/// trait's shape deliberately omits.
impl Layer for CodecLayer {
    type Down = ();
    type Up = Vec<u8>;

    fn on_data_ready(&mut self, _payload: ()) -> LayerState {
        LayerState::Ok
    }

    fn on_data_received(&mut self, payload: Vec<u8>) -> LayerState {
        self.accept_body_chunk(&payload);
        LayerState::Ok
    }

    fn on_close(&mut self) -> LayerState {
        self.reset();
        LayerState::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::Request;

    #[test]
    fn decode_handles_crlf_and_lf_line_endings() {
        let mut codec = CodecLayer::new();
        codec.accept_body_chunk(b"temp,2013-06-01T12:00:00Z,23\r\nhum,2013-06-01T12:00:01Z,55.5\n");
        let points = codec.decode().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value.as_int(), Some(23));
        assert_eq!(points[1].value.as_float(), Some(55.5));
    }

    #[test]
    fn decode_handles_bare_cr_line_endings() {
        let mut codec = CodecLayer::new();
        codec.accept_body_chunk(b"temp,2013-06-01T12:00:00Z,23\rhum,2013-06-01T12:00:01Z,55.5\r");
        let points = codec.decode().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value.as_int(), Some(23));
        assert_eq!(points[1].value.as_float(), Some(55.5));
    }

    #[test]
    fn encode_body_is_empty_for_range_delete() {
        let request = Request::DatapointDeleteRange {
            feed_id: 9,
            datastream_id: "s1".to_string(),
            start: Timestamp::new(0, 0),
            end: Timestamp::new(86_400, 0),
        };
        assert!(encode_body(&request).unwrap().is_empty());
    }
}
