//! Transport-local error enum, converted into [`CoreError`] at the
//! `IoLayer` boundary. `streamkit-core` avoids `thiserror` for its
//! cross-cutting error type, but a leaf transport crate with just a
//! handful of local variants reaches for it directly.

use streamkit_core::error::{codes, CoreError, ErrorCategory};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("operation attempted on a context with no live socket")]
    NotConnected,
}

impl From<TransportError> for CoreError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotConnected => CoreError::new(
                codes::TRANSPORT_WRITE_ERROR,
                ErrorCategory::Transport,
                err.to_string(),
            ),
        }
    }
}
