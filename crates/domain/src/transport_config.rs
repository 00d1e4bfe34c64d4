use std::time::Duration;

use crate::dns_protocol::DnsProtocol;

/// Immutable upstream settings shared by every query the gateway forwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub endpoint: DnsProtocol,
    pub timeout: Duration,
    pub max_in_flight: usize,
}

impl TransportConfig {
    pub fn new(endpoint: DnsProtocol, timeout: Duration) -> Self {
        Self {
            endpoint,
            timeout,
            max_in_flight: 1024,
        }
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}
