//! Transport-agnostic core of a layered, non-blocking client for a
//! time-series/feed IoT service: the layer contract, the event dispatcher,
//! the HTTP framing layer, the tabular codec, and the `Context` that ties
//! them together for one connection at a time.
//!
//! This crate names no concrete socket implementation. `Context` is generic
//! over [`io_layer::IoLayer`]; `streamkit-transport-tcp` supplies the one
//! implementation in this workspace, built on non-blocking POSIX sockets
//! via `mio`.

pub mod codec;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod io_layer;
pub mod layer;

pub use config::ClientConfig;
pub use context::Context;
pub use error::{CoreError, Result};
pub use io_layer::{ConnectionTarget, IoLayer, ReadOutcome};
