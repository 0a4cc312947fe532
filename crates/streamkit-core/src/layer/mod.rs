//! The four-entry-point layer contract and the byte descriptors layers use
//! to pass payloads to one another.
//!
//! Every layer in the pipeline — I/O, HTTP, tabular codec — implements
//! [`Layer`]. The chain itself (`Pipeline` in the crate root) is the driver:
//! it is the one thing allowed to call a layer's entry points, which keeps
//! "a layer never mutates another layer's state block" true by construction
//! rather than by convention.

use crate::error::CoreError;

mod cursor;
pub mod chain;
pub use cursor::Resumable;
pub use chain::ChainPosition;

/// Outcome of a single entry-point call. A layer forwarding to its neighbor
/// passes this straight through; the chain driver converts `WantRead`/
/// `WantWrite` into event-dispatcher re-arms.
#[derive(Debug)]
pub enum LayerState {
    Ok,
    WantRead,
    WantWrite,
    Error(CoreError),
}

impl LayerState {
    pub fn is_terminal_error(&self) -> bool {
        matches!(self, LayerState::Error(_))
    }
}

/// A borrowed byte region flowing downward (const) or upward (mutable).
/// Rust's slice types make a separate pointer+capacity pair redundant, so
/// this only needs to track how much of the slice is meaningful and how
/// much of it has already been consumed by a partial operation.
#[derive(Debug)]
pub struct ReadBuf<'a> {
    data: &'a mut [u8],
    filled: usize,
}

impl<'a> ReadBuf<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, filled: 0 }
    }

    /// Capacity available for a read, reserving one byte for the guard
    /// terminator a read always writes after the bytes it fills.
    pub fn read_capacity(&self) -> usize {
        self.data.len().saturating_sub(1)
    }

    pub fn raw_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Records how many bytes a read produced, writes the zero guard just
    /// past them, and resets the read cursor to the start.
    pub fn set_filled(&mut self, len: usize) {
        debug_assert!(len < self.data.len());
        for byte in self.data.iter_mut() {
            *byte = 0;
        }
        self.filled = len;
        // guard byte: already zero from the fill above, written explicitly
        // to document the invariant rather than rely on the zero-fill.
        self.data[len] = 0;
    }

    pub fn filled(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    pub fn filled_len(&self) -> usize {
        self.filled
    }
}

/// A const byte region flowing downward toward the socket.
#[derive(Debug, Clone, Copy)]
pub struct WriteBuf<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> WriteBuf<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, cursor: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.remaining().is_empty()
    }

    pub fn remaining(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    /// Advances the cursor after a (possibly short) write.
    pub fn advance(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.data.len());
    }

    pub fn total_len(&self) -> usize {
        self.data.len()
    }
}

/// The four-entry-point contract every layer implements.
///
/// `Up`/`Down` are the payload types this layer accepts on its upward and
/// downward faces; the pipeline driver is responsible for matching a
/// layer's `Up` output to the next layer's expected input, which is why
/// `Layer` is not object-safe and the chain is driven concretely rather
/// than through `dyn Layer`.
pub trait Layer {
    type Down;
    type Up;

    /// Downward: caller-supplied or upstream-produced payload is ready to
    /// be processed toward I/O.
    fn on_data_ready(&mut self, payload: Self::Down) -> LayerState;

    /// Upward: bytes from I/O (or an upstream layer's decoded payload) are
    /// delivered to this layer. Returns the decoded payload alongside the
    /// layer state once decoding made forward progress.
    fn on_data_received(&mut self, payload: Self::Up) -> LayerState;

    /// Downward close signal — a no-op acknowledgement for layers with no
    /// teardown work of their own.
    fn close(&mut self) -> LayerState {
        LayerState::Ok
    }

    /// Upward close notification; terminal for the layer.
    fn on_close(&mut self) -> LayerState {
        LayerState::Ok
    }
}
