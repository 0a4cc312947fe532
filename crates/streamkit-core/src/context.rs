//! The public entry point: one context owns one layer chain and drives
//! each top-level operation to completion.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

use crate::codec::{CodecLayer, Datapoint, Timestamp};
use crate::config::ClientConfig;
use crate::dispatcher::EventDispatcher;
use crate::error::Result;
use crate::http::{HttpLayer, Request, Response};
use crate::io_layer::{ConnectionTarget, IoLayer, ReadOutcome};
use crate::layer::LayerState;

const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 30_000;

/// Process-wide, read-mostly network timeout. Updates need no locking
/// because reads and writes happen only from the dispatcher thread.
static NETWORK_TIMEOUT_MS: AtomicU64 = AtomicU64::new(DEFAULT_NETWORK_TIMEOUT_MS);

/// The single-threaded, `!Send`-by-construction pipeline owner. `Io` is the
/// concrete transport; `streamkit-transport-tcp::TcpIoLayer` is the only
/// implementation supplied in this workspace.
pub struct Context<Io: IoLayer> {
    io: Io,
    dispatcher: EventDispatcher<Io::Reactor>,
    http: HttpLayer,
    codec: CodecLayer,
    config: ClientConfig,
    connected: bool,
    // Holding the dispatcher's non-`Send` reactor by value is enough to make
    // `Context` `!Send` on its own, but this marker documents the intent
    // even if a future `Reactor` impl happens to be `Send`.
    _not_send: std::marker::PhantomData<std::rc::Rc<()>>,
}

impl<Io: IoLayer> Context<Io> {
    /// Builds a context bound to `config`, ready to drive requests. The I/O
    /// layer and dispatcher are supplied already constructed; no socket is
    /// opened until the first request runs.
    pub fn new(io: Io, dispatcher: EventDispatcher<Io::Reactor>, config: ClientConfig) -> Self {
        Self {
            io,
            dispatcher,
            http: HttpLayer::new(),
            codec: CodecLayer::new(),
            config,
            connected: false,
            _not_send: std::marker::PhantomData,
        }
    }

    pub fn set_network_timeout(seconds: u64) {
        NETWORK_TIMEOUT_MS.store(seconds.saturating_mul(1000), Ordering::Relaxed);
    }

    pub fn network_timeout() -> u64 {
        NETWORK_TIMEOUT_MS.load(Ordering::Relaxed) / 1000
    }

    /// Establishes a fresh connection for the request about to run. Every
    /// top-level operation opens its own socket and closes it once the
    /// response is in hand rather than pooling one connection across calls.
    /// A prior connection left open by an interrupted previous call (e.g. a
    /// panic mid-`execute`) is closed first.
    fn reconnect(&mut self) -> Result<()> {
        if self.connected {
            let _ = self.io.close(&mut self.dispatcher);
            self.connected = false;
        }
        self.dispatcher.set_network_timeout(Some(Duration::from_millis(
            NETWORK_TIMEOUT_MS.load(Ordering::Relaxed),
        )));
        let target = ConnectionTarget::new(self.config.host.clone(), self.config.port);
        debug!(target: "streamkit_core::context", host = %target.host, port = target.port, "connecting");
        self.io.connect(&mut self.dispatcher, &target)?;
        self.connected = true;
        Ok(())
    }

    /// Reads and parses the response, forwarding body bytes to the codec
    /// layer as they arrive, until the HTTP parser reaches a terminal state.
    fn drain_response(&mut self) -> Result<()> {
        while !self.http.is_done() {
            match self.io.read_chunk(&mut self.dispatcher, 32)? {
                ReadOutcome::Bytes(chunk) => {
                    if let LayerState::Error(err) = self.http.on_data_received(&chunk, &mut self.codec) {
                        return Err(err);
                    }
                }
                ReadOutcome::PeerClosed => {
                    if let LayerState::Error(err) = self.http.on_peer_close() {
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    /// Runs one request to completion: a fresh connect, the framed request
    /// write, the response read/parse, and a close before returning — every
    /// top-level operation owns its own connection from end to end.
    fn execute(&mut self, request: Request) -> Result<Response> {
        self.reconnect()?;
        self.http.reset();
        self.codec.reset();

        let bytes = self.http.build_request_bytes(&self.config, &request)?;
        let outcome = self
            .io
            .write_all(&mut self.dispatcher, &bytes)
            .and_then(|_| self.drain_response());

        if let Err(err) = self.io.close(&mut self.dispatcher) {
            debug!(target: "streamkit_core::context", code = err.code(), "error closing connection after request, ignoring");
        }
        self.connected = false;

        outcome?;
        self.http.finish_response(&self.codec)
    }

    pub fn feed_get(&mut self, feed_id: u64) -> Result<Response> {
        self.execute(Request::FeedGet { feed_id })
    }

    pub fn feed_update(&mut self, feed_id: u64, datastream_id: impl Into<String>, point: Datapoint) -> Result<Response> {
        self.execute(Request::FeedUpdate { feed_id, datastream_id: datastream_id.into(), point })
    }

    pub fn datastream_get(&mut self, feed_id: u64, datastream_id: impl Into<String>) -> Result<Response> {
        self.execute(Request::DatastreamGet { feed_id, datastream_id: datastream_id.into() })
    }

    pub fn datastream_create(
        &mut self,
        feed_id: u64,
        datastream_id: impl Into<String>,
        point: Datapoint,
    ) -> Result<Response> {
        self.execute(Request::DatastreamCreate { feed_id, datastream_id: datastream_id.into(), point })
    }

    pub fn datastream_update(
        &mut self,
        feed_id: u64,
        datastream_id: impl Into<String>,
        point: Datapoint,
    ) -> Result<Response> {
        self.execute(Request::DatastreamUpdate { feed_id, datastream_id: datastream_id.into(), point })
    }

    pub fn datastream_delete(&mut self, feed_id: u64, datastream_id: impl Into<String>) -> Result<Response> {
        self.execute(Request::DatastreamDelete { feed_id, datastream_id: datastream_id.into() })
    }

    pub fn datapoint_delete(
        &mut self,
        feed_id: u64,
        datastream_id: impl Into<String>,
        timestamp: Timestamp,
    ) -> Result<Response> {
        self.execute(Request::DatapointDelete { feed_id, datastream_id: datastream_id.into(), timestamp })
    }

    pub fn datapoint_delete_range(
        &mut self,
        feed_id: u64,
        datastream_id: impl Into<String>,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Response> {
        self.execute(Request::DatapointDeleteRange {
            feed_id,
            datastream_id: datastream_id.into(),
            start,
            end,
        })
    }
}

impl<Io: IoLayer> Drop for Context<Io> {
    /// Best-effort shutdown of the socket if one is live, matching the I/O
    /// layer's close-path cleanup guarantee.
    fn drop(&mut self) {
        if self.connected {
            if let Err(err) = self.io.close(&mut self.dispatcher) {
                debug!(target: "streamkit_core::context", code = err.code(), "error closing context, ignoring");
            }
        }
    }
}
