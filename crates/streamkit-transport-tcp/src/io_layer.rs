//! Concrete non-blocking POSIX TCP I/O layer, built on `mio::net::TcpStream`
//! with `SO_ERROR` inspection via `socket2`.

use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::io::AsRawFd;

use socket2::SockRef;
use tracing::{debug, warn};

use streamkit_core::dispatcher::{Direction, EventDispatcher};
use streamkit_core::error::{codes, CoreError, ErrorCategory, Result};
use streamkit_core::io_layer::{ConnectionTarget, IoLayer, ReadOutcome};
use streamkit_core::layer::{LayerState, Resumable};

use crate::error::TransportError;
use crate::reactor::MioReactor;
use crate::resolve::resolve;
use crate::state::{ConnectState, WriteState};

/// Per-context I/O layer state block: owns exactly one socket, created
/// fresh on each [`IoLayer::connect`] and torn down on [`IoLayer::close`].
#[derive(Default)]
pub struct TcpIoLayer {
    stream: Option<mio::net::TcpStream>,
}

impl TcpIoLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn fd(&self) -> Result<i32> {
        self.stream
            .as_ref()
            .map(|s| s.as_raw_fd())
            .ok_or_else(|| not_connected())
    }

    fn connect_error(&self) -> Result<Option<std::io::Error>> {
        let stream = self.stream.as_ref().ok_or_else(not_connected)?;
        SockRef::from(stream)
            .take_error()
            .map_err(|err| CoreError::from_io(codes::SOCKET_CONNECTION_ERROR, ErrorCategory::Connection, err))
    }
}

fn not_connected() -> CoreError {
    TransportError::NotConnected.into()
}

impl IoLayer for TcpIoLayer {
    type Reactor = MioReactor;

    fn connect(
        &mut self,
        dispatcher: &mut EventDispatcher<MioReactor>,
        target: &ConnectionTarget,
    ) -> Result<()> {
        let addr = resolve(&target.host, target.port)?;
        debug!(target: "streamkit_transport_tcp::io", addr = %addr, "socket init + connect");

        // `mio::net::TcpStream::connect` creates the non-blocking socket and
        // issues `connect(2)` in one call, swallowing `EINPROGRESS` as `Ok`.
        // Any `Err` it does return is therefore a genuine connect failure —
        // including an immediate `ECONNREFUSED` some platforms deliver
        // synchronously for loopback destinations — not a socket-creation
        // failure, so it maps to `SOCKET_CONNECTION_ERROR` rather than the
        // init error code.
        let stream = mio::net::TcpStream::connect(addr).map_err(|err| {
            CoreError::from_io(codes::SOCKET_CONNECTION_ERROR, ErrorCategory::Connection, err)
        })?;
        let fd = stream.as_raw_fd();
        self.stream = Some(stream);

        dispatcher.register_fd(fd)?;

        let mut cursor = ConnectState::new();
        while !cursor.is_done() {
            dispatcher.continue_when_event(fd, Direction::Write, Box::new(|| LayerState::Ok))?;
            dispatcher.run_once()?;
            let (state, _) = cursor.step(self.connect_error()?);
            if let LayerState::Error(err) = state {
                warn!(target: "streamkit_transport_tcp::io", fd, code = err.code(), "connect failed");
                dispatcher.unregister_fd(fd);
                self.stream = None;
                return Err(err);
            }
        }
        debug!(target: "streamkit_transport_tcp::io", fd, "connect completed");
        Ok(())
    }

    fn write_all(&mut self, dispatcher: &mut EventDispatcher<MioReactor>, payload: &[u8]) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }
        let fd = self.fd()?;
        let mut cursor = WriteState::new(payload.len());

        while !cursor.is_done() {
            let stream = self.stream.as_mut().ok_or_else(not_connected)?;
            let attempt = stream.write(&payload[cursor.remaining_from()..]);
            if let Ok(n) = &attempt {
                if *n > 0 && cursor.remaining_from() + n < payload.len() {
                    debug!(target: "streamkit_transport_tcp::io", fd, n, "short write");
                }
            }
            let (state, _) = cursor.step(attempt);
            match state {
                LayerState::Ok => return Ok(()),
                LayerState::WantWrite => {
                    dispatcher.continue_when_event(fd, Direction::Write, Box::new(|| LayerState::Ok))?;
                    dispatcher.run_once()?;
                }
                LayerState::Error(err) => {
                    warn!(target: "streamkit_transport_tcp::io", fd, code = err.code(), "write failed");
                    return Err(err);
                }
                LayerState::WantRead => unreachable!("write never yields WANT_READ"),
            }
        }
        Ok(())
    }

    fn read_chunk(
        &mut self,
        dispatcher: &mut EventDispatcher<MioReactor>,
        scratch_len: usize,
    ) -> Result<ReadOutcome> {
        let fd = self.fd()?;
        let capacity = scratch_len.saturating_sub(1);

        loop {
            let mut scratch = vec![0u8; scratch_len];
            let stream = self.stream.as_mut().ok_or_else(not_connected)?;
            match stream.read(&mut scratch[..capacity]) {
                Ok(0) => {
                    debug!(target: "streamkit_transport_tcp::io", fd, "peer closed connection");
                    return Ok(ReadOutcome::PeerClosed);
                }
                Ok(n) => {
                    scratch[n] = 0; // terminating zero guard
                    scratch.truncate(n);
                    return Ok(ReadOutcome::Bytes(scratch));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    dispatcher.continue_when_event(fd, Direction::Read, Box::new(|| LayerState::Ok))?;
                    dispatcher.run_once()?;
                }
                Err(err) => {
                    warn!(target: "streamkit_transport_tcp::io", fd, %err, "read failed");
                    return Err(CoreError::from_io(codes::TRANSPORT_READ_ERROR, ErrorCategory::Transport, err));
                }
            }
        }
    }

    fn close(&mut self, dispatcher: &mut EventDispatcher<MioReactor>) -> Result<()> {
        let Some(stream) = self.stream.take() else {
            return Ok(());
        };
        let fd = stream.as_raw_fd();
        let shutdown_result = stream.shutdown(Shutdown::Both);
        dispatcher.unregister_fd(fd);
        drop(stream);

        shutdown_result.map_err(|err| {
            warn!(target: "streamkit_transport_tcp::io", fd, %err, "shutdown failed during close, fd still reclaimed");
            CoreError::from_io(codes::SOCKET_SHUTDOWN_ERROR, ErrorCategory::Shutdown, err)
        })
    }
}
