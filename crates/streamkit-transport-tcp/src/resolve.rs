//! Synchronous name resolution. `ToSocketAddrs` shells out to the platform
//! resolver and blocks the calling thread — acceptable here because connect
//! is the only place in the pipeline that resolves a name, and a fresh
//! connect (and so a fresh resolve) happens at the start of every top-level
//! call rather than once per context.

use std::net::{SocketAddr, ToSocketAddrs};

use streamkit_core::error::{codes, CoreError, ErrorCategory, Result};

pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|err| {
            CoreError::from_io(codes::SOCKET_GETHOSTBYNAME_ERROR, ErrorCategory::Connection, err)
        })?
        .next()
        .ok_or_else(|| {
            CoreError::new(
                codes::SOCKET_GETHOSTBYNAME_ERROR,
                ErrorCategory::Connection,
                format!("no addresses found for host {host}"),
            )
        })
}
