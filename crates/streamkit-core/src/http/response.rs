//! The HTTP layer's terminal output: status, a header subset, and the
//! codec-decoded record list.

use crate::codec::Datapoint;

/// A successfully parsed response. `status` and `headers` come straight off
/// the wire; `records` is whatever the codec layer decoded from the body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub content_length: Option<usize>,
    pub records: Vec<Datapoint>,
}

impl Response {
    pub fn new(status: u16, content_length: Option<usize>, records: Vec<Datapoint>) -> Self {
        Self { status, content_length, records }
    }

    /// Convenience accessor for the common single-datapoint response shape
    /// (a `datastream_get` call expects exactly one point back).
    pub fn single_datapoint(&self) -> Option<&Datapoint> {
        self.records.first()
    }
}
