//! The HTTP layer's input: a tagged request variant.

use crate::codec::{Datapoint, Timestamp};

/// One of the eight operations the public API can inject at the top of the
/// pipeline. Each arm carries exactly the fields its HTTP request line and
/// body need.
#[derive(Debug, Clone)]
pub enum Request {
    FeedGet {
        feed_id: u64,
    },
    FeedUpdate {
        feed_id: u64,
        datastream_id: String,
        point: Datapoint,
    },
    DatastreamGet {
        feed_id: u64,
        datastream_id: String,
    },
    DatastreamCreate {
        feed_id: u64,
        datastream_id: String,
        point: Datapoint,
    },
    DatastreamUpdate {
        feed_id: u64,
        datastream_id: String,
        point: Datapoint,
    },
    DatastreamDelete {
        feed_id: u64,
        datastream_id: String,
    },
    DatapointDelete {
        feed_id: u64,
        datastream_id: String,
        timestamp: Timestamp,
    },
    DatapointDeleteRange {
        feed_id: u64,
        datastream_id: String,
        start: Timestamp,
        end: Timestamp,
    },
}

impl Request {
    pub fn method(&self) -> &'static str {
        match self {
            Request::FeedGet { .. } | Request::DatastreamGet { .. } => "GET",
            Request::FeedUpdate { .. }
            | Request::DatastreamUpdate { .. } => "PUT",
            Request::DatastreamCreate { .. } => "POST",
            Request::DatastreamDelete { .. }
            | Request::DatapointDelete { .. }
            | Request::DatapointDeleteRange { .. } => "DELETE",
        }
    }

    /// Builds the request-line path: feed, datastream,
    /// datastream-with-point, datapoint, and datapoint range-query are the
    /// five URL shapes a request can take.
    pub fn path(&self) -> String {
        match self {
            Request::FeedGet { feed_id } | Request::FeedUpdate { feed_id, .. } => {
                format!("/v2/feeds/{feed_id}")
            }
            Request::DatastreamGet { feed_id, datastream_id }
            | Request::DatastreamCreate { feed_id, datastream_id, .. }
            | Request::DatastreamUpdate { feed_id, datastream_id, .. }
            | Request::DatastreamDelete { feed_id, datastream_id } => {
                format!("/v2/feeds/{feed_id}/datastreams/{datastream_id}")
            }
            Request::DatapointDelete { feed_id, datastream_id, timestamp } => {
                format!(
                    "/v2/feeds/{feed_id}/datastreams/{datastream_id}/datapoints?timestamp={timestamp}"
                )
            }
            Request::DatapointDeleteRange { feed_id, datastream_id, start, end } => {
                format!(
                    "/v2/feeds/{feed_id}/datastreams/{datastream_id}/datapoints?start={start}&end={end}"
                )
            }
        }
    }
}
