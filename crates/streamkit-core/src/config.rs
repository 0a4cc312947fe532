//! Client configuration surface. Reading this from environment variables,
//! files, or a secret store is the host program's job, not this crate's —
//! this type only models the already-resolved endpoint and credentials a
//! [`crate::Context`] needs to run requests.

/// Target endpoint and credentials for one [`crate::Context`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub api_key: String,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            api_key: api_key.into(),
        }
    }
}
