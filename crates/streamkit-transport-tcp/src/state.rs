//! Explicit coroutine-cursor state machines for the I/O layer's suspendable
//! operations. Each implements [`Resumable`] so a `step` call is the only
//! place state advances — deterministic and easy to drive directly from a
//! test without a real socket.

use std::io;

use streamkit_core::error::{codes, CoreError, ErrorCategory};
use streamkit_core::layer::{LayerState, Resumable};

/// Connect suspends exactly once, waiting for the writable wakeup that
/// follows `EINPROGRESS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectState {
    AwaitingWritable,
    Done,
}

impl ConnectState {
    pub fn new() -> Self {
        ConnectState::AwaitingWritable
    }
}

impl Resumable for ConnectState {
    /// The `SO_ERROR` read after a writable wakeup: `None` means connected.
    type Input = Option<io::Error>;
    type Output = ();

    fn step(&mut self, input: Option<io::Error>) -> (LayerState, Option<()>) {
        match input {
            None => {
                *self = ConnectState::Done;
                (LayerState::Ok, Some(()))
            }
            Some(err) => (
                LayerState::Error(CoreError::from_io(
                    codes::SOCKET_CONNECTION_ERROR,
                    ErrorCategory::Connection,
                    err,
                )),
                None,
            ),
        }
    }

    fn is_done(&self) -> bool {
        matches!(self, ConnectState::Done)
    }
}

/// Tracks how much of a write descriptor has been sent so far, resuming
/// across short writes and `EAGAIN`.
#[derive(Debug, Clone, Copy)]
pub struct WriteState {
    total: usize,
    sent: usize,
}

impl WriteState {
    pub fn new(total: usize) -> Self {
        Self { total, sent: 0 }
    }

    pub fn remaining_from(self) -> usize {
        self.sent
    }
}

impl Resumable for WriteState {
    /// The result of one `write(2)` attempt over the remaining bytes.
    type Input = io::Result<usize>;
    type Output = ();

    fn step(&mut self, input: io::Result<usize>) -> (LayerState, Option<()>) {
        match input {
            // a 0-byte write is a stall, not a failure.
            Ok(0) => (LayerState::WantWrite, None),
            Ok(n) => {
                self.sent += n;
                if self.sent >= self.total {
                    (LayerState::Ok, Some(()))
                } else {
                    (LayerState::WantWrite, None)
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => (LayerState::WantWrite, None),
            Err(err) => (
                LayerState::Error(CoreError::from_io(
                    codes::TRANSPORT_WRITE_ERROR,
                    ErrorCategory::Transport,
                    err,
                )),
                None,
            ),
        }
    }

    fn is_done(&self) -> bool {
        self.sent >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_state_resumes_across_short_write() {
        let mut state = WriteState::new(2048);
        let (layer_state, output) = state.step(Ok(1024));
        assert!(matches!(layer_state, LayerState::WantWrite));
        assert!(output.is_none());
        assert!(!state.is_done());

        let (layer_state, output) = state.step(Ok(1024));
        assert!(matches!(layer_state, LayerState::Ok));
        assert!(output.is_some());
        assert!(state.is_done());
    }

    #[test]
    fn write_state_treats_zero_byte_write_as_want_write() {
        let mut state = WriteState::new(10);
        let (layer_state, _) = state.step(Ok(0));
        assert!(matches!(layer_state, LayerState::WantWrite));
    }

    #[test]
    fn connect_state_resolves_on_clean_so_error() {
        let mut state = ConnectState::new();
        let (layer_state, output) = state.step(None);
        assert!(matches!(layer_state, LayerState::Ok));
        assert!(output.is_some());
        assert!(state.is_done());
    }

    #[test]
    fn connect_state_reports_connection_refused() {
        let mut state = ConnectState::new();
        let err = io::Error::from(io::ErrorKind::ConnectionRefused);
        let (layer_state, _) = state.step(Some(err));
        assert!(matches!(layer_state, LayerState::Error(_)));
        assert!(!state.is_done());
    }
}
