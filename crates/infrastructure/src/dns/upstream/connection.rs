use crate::dns::transport::Transport;
use doh_gateway_domain::{DnsMessage, DnsProtocol, DomainError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Reusable channel to one upstream endpoint.
///
/// The underlying transport is opened lazily and replaced once it reports
/// itself closed. Queries already waiting on a failed transport are failed by
/// that transport; they never migrate to its replacement.
pub struct UpstreamConnection {
    endpoint: DnsProtocol,
    transport: Mutex<Option<Arc<Transport>>>,
}

impl UpstreamConnection {
    pub fn new(endpoint: DnsProtocol) -> Self {
        Self {
            endpoint,
            transport: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &DnsProtocol {
        &self.endpoint
    }

    async fn transport(&self) -> Result<Arc<Transport>, DomainError> {
        let mut slot = self.transport.lock().await;

        if let Some(transport) = slot.as_ref() {
            if !transport.is_closed() {
                return Ok(Arc::clone(transport));
            }
            debug!(upstream = %self.endpoint, "Discarding closed upstream channel");
        }

        let transport = Arc::new(Transport::connect(&self.endpoint).await?);
        info!(
            upstream = %self.endpoint,
            protocol = transport.protocol_name(),
            "Upstream channel established"
        );
        *slot = Some(Arc::clone(&transport));
        Ok(transport)
    }

    /// Sends `query` under a fresh internal identifier and waits for the
    /// matching reply. The caller bounds the wait.
    pub async fn query(&self, query: &DnsMessage) -> Result<DnsMessage, DomainError> {
        let transport = self.transport().await?;
        let (guard, reply_rx) = transport.pending().register(query.id())?;
        let wire_id = guard.wire_id();

        debug!(
            upstream = %self.endpoint,
            client_id = query.id(),
            wire_id,
            "Forwarding query upstream"
        );
        transport.send(query.with_id(wire_id).into_bytes()).await?;

        let reply = reply_rx.await.map_err(|_| {
            DomainError::UpstreamFailure(format!(
                "Connection to {} closed while waiting for a reply",
                self.endpoint
            ))
        })?;
        drop(guard);

        DnsMessage::from_wire(reply).map_err(|e| {
            DomainError::UpstreamFailure(format!(
                "Unparseable reply from {}: {}",
                self.endpoint, e
            ))
        })
    }

    /// Outstanding queries on the current channel.
    pub async fn pending_len(&self) -> usize {
        self.transport
            .lock()
            .await
            .as_ref()
            .map_or(0, |transport| transport.pending().len())
    }
}
