//! Non-blocking POSIX TCP transport for `streamkit-core`'s `Context`.
//!
//! Supplies the one [`streamkit_core::io_layer::IoLayer`] implementation in
//! this workspace ([`TcpIoLayer`]) and the [`streamkit_core::dispatcher::Reactor`]
//! it runs on ([`MioReactor`]), both built on `mio`.

pub mod error;
pub mod io_layer;
pub mod reactor;
pub mod resolve;
pub mod state;

pub use io_layer::TcpIoLayer;
pub use reactor::MioReactor;

use streamkit_core::config::ClientConfig;
use streamkit_core::context::Context;
use streamkit_core::dispatcher::EventDispatcher;

/// Convenience constructor wiring [`TcpIoLayer`] and [`MioReactor`] together
/// into a ready-to-use `Context`.
pub fn connect(config: ClientConfig) -> std::io::Result<Context<TcpIoLayer>> {
    let reactor = MioReactor::new()?;
    let dispatcher = EventDispatcher::new(reactor);
    Ok(Context::new(TcpIoLayer::new(), dispatcher, config))
}
