use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

use super::errors::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Single upstream resolver, `IP:PORT`.
    #[serde(default = "default_server")]
    pub server: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Answer SERVFAIL when the upstream fails; otherwise the query is dropped.
    #[serde(default = "default_true")]
    pub servfail_on_error: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            timeout_ms: default_timeout_ms(),
            servfail_on_error: true,
        }
    }
}

impl UpstreamConfig {
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.parse().map_err(|_| {
            ConfigError::Validation(format!(
                "Invalid upstream address '{}'. Expected IP:PORT",
                self.server
            ))
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_server() -> String {
    "8.8.8.8:53".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}
