//! The I/O layer's contract as seen by [`Context`](crate::Context).
//!
//! Selecting between a POSIX backend, an embedded one, or a stub for tests
//! is a concern external to this crate; non-blocking semantics are fixed,
//! but the concrete transport is pluggable. [`IoLayer`] is that contract —
//! `streamkit-transport-tcp::TcpIoLayer` is the one implementation in this
//! workspace, built on `mio`.

use crate::dispatcher::{EventDispatcher, Reactor};
use crate::error::Result;

/// A host and numeric port resolved fresh on every connect.
#[derive(Debug, Clone)]
pub struct ConnectionTarget {
    pub host: String,
    pub port: u16,
}

impl ConnectionTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

/// Everything [`Context`](crate::Context) needs from a concrete transport.
/// `connect`, `write`, and `close` each drive the dispatcher internally
/// until their operation reaches a terminal state, so top-level operations
/// read as synchronous from the caller's perspective even though they are
/// event-driven underneath.
pub trait IoLayer {
    type Reactor: Reactor;

    /// Resolves `target`, creates the non-blocking socket, and connects —
    /// suspending on `EINPROGRESS` until the dispatcher reports the fd
    /// writable.
    fn connect(
        &mut self,
        dispatcher: &mut EventDispatcher<Self::Reactor>,
        target: &ConnectionTarget,
    ) -> Result<()>;

    /// Writes `payload` in full, suspending across short writes and
    /// `EAGAIN`/`EWOULDBLOCK` until the dispatcher reports the fd writable
    /// again.
    fn write_all(
        &mut self,
        dispatcher: &mut EventDispatcher<Self::Reactor>,
        payload: &[u8],
    ) -> Result<()>;

    /// Blocks (via the dispatcher) until at least one chunk of response
    /// bytes is available, or the peer has closed the connection.
    /// `scratch_len` bounds the read buffer so a spontaneous wakeup never
    /// reads past it.
    fn read_chunk(
        &mut self,
        dispatcher: &mut EventDispatcher<Self::Reactor>,
        scratch_len: usize,
    ) -> Result<ReadOutcome>;

    /// Best-effort shutdown + close; always unregisters the fd and frees
    /// the layer's state even if shutdown/close itself fails.
    fn close(&mut self, dispatcher: &mut EventDispatcher<Self::Reactor>) -> Result<()>;
}

/// What a single [`IoLayer::read_chunk`] call produced.
#[derive(Debug)]
pub enum ReadOutcome {
    Bytes(Vec<u8>),
    PeerClosed,
}
