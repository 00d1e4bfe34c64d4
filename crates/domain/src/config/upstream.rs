use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::errors::ConfigError;
use crate::dns_protocol::{DnsProtocol, UpstreamProtocol};
use crate::transport_config::TransportConfig;

/// Upper bound on concurrent upstream queries: one per transaction identifier.
pub const MAX_IN_FLIGHT_LIMIT: usize = 65_536;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// IP, hostname or (for HTTPS) full URL of the upstream resolver.
    #[serde(default = "default_server")]
    pub server: String,

    /// `udp`, `tcp`, `tls` or `https`, case-insensitive.
    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,

    #[serde(default)]
    pub tls_hostname: Option<String>,
}

impl UpstreamConfig {
    pub fn protocol(&self) -> Result<UpstreamProtocol, ConfigError> {
        self.protocol.parse().map_err(ConfigError::Validation)
    }

    pub fn endpoint(&self) -> Result<DnsProtocol, ConfigError> {
        let protocol = self.protocol()?;
        DnsProtocol::new(protocol, &self.server, self.tls_hostname.as_deref())
            .map_err(ConfigError::Validation)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolves the section into the immutable settings handed to the dispatcher.
    pub fn transport_config(&self) -> Result<TransportConfig, ConfigError> {
        Ok(TransportConfig {
            endpoint: self.endpoint()?,
            timeout: self.timeout(),
            max_in_flight: self.max_in_flight,
        })
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            protocol: default_protocol(),
            timeout_ms: default_timeout_ms(),
            max_in_flight: default_max_in_flight(),
            tls_hostname: None,
        }
    }
}

fn default_server() -> String {
    "1.1.1.1".to_string()
}

fn default_protocol() -> String {
    "udp".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_in_flight() -> usize {
    1024
}
