use super::connection::UpstreamConnection;
use async_trait::async_trait;
use dashmap::DashMap;
use doh_gateway_application::ports::UpstreamDispatcher;
use doh_gateway_domain::{DnsMessage, DnsProtocol, DomainError, TransportConfig};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Forwards queries to the upstream named in its `TransportConfig`.
///
/// Each dispatcher owns its connection registry, so differently configured
/// dispatchers can live side by side.
pub struct ForwardingDispatcher {
    config: TransportConfig,
    connections: DashMap<DnsProtocol, Arc<UpstreamConnection>>,
    in_flight: Semaphore,
}

impl ForwardingDispatcher {
    pub fn new(config: TransportConfig) -> Self {
        let in_flight = Semaphore::new(config.max_in_flight);
        Self {
            config,
            connections: DashMap::new(),
            in_flight,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn connection(&self) -> Arc<UpstreamConnection> {
        self.connections
            .entry(self.config.endpoint.clone())
            .or_insert_with(|| Arc::new(UpstreamConnection::new(self.config.endpoint.clone())))
            .clone()
    }

    /// Queries still registered on the live channel.
    pub async fn pending_queries(&self) -> usize {
        let connection = self
            .connections
            .get(&self.config.endpoint)
            .map(|entry| Arc::clone(entry.value()));
        match connection {
            Some(connection) => connection.pending_len().await,
            None => 0,
        }
    }

    async fn exchange(&self, query: &DnsMessage) -> Result<DnsMessage, DomainError> {
        let _permit = self.in_flight.acquire().await.map_err(|_| {
            DomainError::UpstreamFailure("Upstream dispatcher is shut down".to_string())
        })?;
        self.connection().query(query).await
    }
}

#[async_trait]
impl UpstreamDispatcher for ForwardingDispatcher {
    async fn dispatch(&self, query: &DnsMessage) -> Result<DnsMessage, DomainError> {
        let endpoint = &self.config.endpoint;

        match tokio::time::timeout(self.config.timeout, self.exchange(query)).await {
            Ok(Ok(response)) => {
                debug!(
                    upstream = %endpoint,
                    client_id = query.id(),
                    response_len = response.as_bytes().len(),
                    "Upstream query completed"
                );
                Ok(response)
            }
            Ok(Err(e)) => {
                warn!(upstream = %endpoint, error = %e, "Upstream query failed");
                Err(e)
            }
            Err(_) => {
                warn!(
                    upstream = %endpoint,
                    timeout_ms = self.config.timeout_ms(),
                    "Upstream query timed out"
                );
                Err(DomainError::UpstreamTimeout {
                    server: endpoint.to_string(),
                    timeout_ms: self.config.timeout_ms(),
                })
            }
        }
    }
}
