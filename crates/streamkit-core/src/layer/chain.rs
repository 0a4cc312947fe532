//! Layer chain bookkeeping.
//!
//! The chain is a fixed three-position array indexed by [`ChainPosition`]
//! rather than neighbor-linked nodes — no back-pointer ownership ambiguity,
//! and a layer's neighbor is just the adjacent array slot.
//! [`Context`](crate::Context) owns the concrete I/O, HTTP, and codec
//! layers directly and drives calls between them; this type exists so the
//! chain's shape and direction of travel are documented and testable
//! independent of that concrete driver.

/// The three fixed positions in every context's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPosition {
    Io,
    Http,
    Codec,
}

impl ChainPosition {
    /// The neighbor one step closer to the socket, or `None` at `Io` — the
    /// bottom layer has no predecessor of its own.
    pub fn predecessor(self) -> Option<ChainPosition> {
        match self {
            ChainPosition::Io => None,
            ChainPosition::Http => Some(ChainPosition::Io),
            ChainPosition::Codec => Some(ChainPosition::Http),
        }
    }

    /// The neighbor one step closer to the user, or `None` at `Codec` — the
    /// top layer has no successor.
    pub fn successor(self) -> Option<ChainPosition> {
        match self {
            ChainPosition::Io => Some(ChainPosition::Http),
            ChainPosition::Http => Some(ChainPosition::Codec),
            ChainPosition::Codec => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_is_bottom_and_codec_is_top() {
        assert_eq!(ChainPosition::Io.predecessor(), None);
        assert_eq!(ChainPosition::Codec.successor(), None);
        assert_eq!(ChainPosition::Io.successor(), Some(ChainPosition::Http));
        assert_eq!(ChainPosition::Http.successor(), Some(ChainPosition::Codec));
    }
}
