pub mod https;
pub mod tcp;
pub mod tls;
pub mod udp;

use crate::dns::upstream::PendingQueries;
use async_trait::async_trait;
use bytes::Bytes;
use doh_gateway_domain::{DnsProtocol, DomainError, UpstreamAddr};
use std::net::SocketAddr;
use std::sync::Arc;

/// A live channel to the upstream resolver.
///
/// Replies are not returned from `send`; they are delivered to the channel's
/// pending-query table, keyed by the wire identifier of the query.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(&self, query: Bytes) -> Result<(), DomainError>;

    fn pending(&self) -> &Arc<PendingQueries>;

    /// A closed channel must be replaced before the next query.
    fn is_closed(&self) -> bool;

    fn protocol_name(&self) -> &'static str;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::StreamTransport),
    #[cfg(feature = "dns-over-rustls")]
    Tls(tcp::StreamTransport),
    #[cfg(feature = "dns-over-https")]
    Https(https::HttpsTransport),
}

impl Transport {
    /// Opens a new channel to `endpoint` with an empty pending table.
    pub async fn connect(endpoint: &DnsProtocol) -> Result<Self, DomainError> {
        match endpoint {
            DnsProtocol::Udp { addr } => {
                let server_addr = resolve(addr).await?;
                Ok(Self::Udp(udp::UdpTransport::connect(server_addr).await?))
            }
            DnsProtocol::Tcp { addr } => {
                let server_addr = resolve(addr).await?;
                Ok(Self::Tcp(tcp::connect(server_addr).await?))
            }

            #[cfg(feature = "dns-over-rustls")]
            DnsProtocol::Tls { addr, hostname } => {
                let server_addr = resolve(addr).await?;
                Ok(Self::Tls(tls::connect(server_addr, hostname).await?))
            }

            #[cfg(not(feature = "dns-over-rustls"))]
            DnsProtocol::Tls { addr, .. } => Err(DomainError::UpstreamFailure(format!(
                "TLS feature not enabled. Enable 'dns-over-rustls' feature to use: {}",
                addr
            ))),

            #[cfg(feature = "dns-over-https")]
            DnsProtocol::Https { url, .. } => {
                Ok(Self::Https(https::HttpsTransport::new(Arc::clone(url))))
            }

            #[cfg(not(feature = "dns-over-https"))]
            DnsProtocol::Https { url, .. } => Err(DomainError::UpstreamFailure(format!(
                "HTTPS feature not enabled. Enable 'dns-over-https' feature to use: {}",
                url
            ))),
        }
    }

    fn inner(&self) -> &dyn DnsTransport {
        match self {
            Self::Udp(t) => t,
            Self::Tcp(t) => t,
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(t) => t,
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => t,
        }
    }

    pub async fn send(&self, query: Bytes) -> Result<(), DomainError> {
        self.inner().send(query).await
    }

    pub fn pending(&self) -> &Arc<PendingQueries> {
        self.inner().pending()
    }

    pub fn is_closed(&self) -> bool {
        self.inner().is_closed()
    }

    pub fn protocol_name(&self) -> &'static str {
        self.inner().protocol_name()
    }
}

/// Resolves a configured hostname to the first address the system resolver
/// returns.
pub async fn resolve(addr: &UpstreamAddr) -> Result<SocketAddr, DomainError> {
    match addr {
        UpstreamAddr::Resolved(socket_addr) => Ok(*socket_addr),
        UpstreamAddr::Unresolved { hostname, port } => {
            tokio::net::lookup_host((hostname.as_ref(), *port))
                .await
                .map_err(|e| {
                    DomainError::UpstreamFailure(format!(
                        "Failed to resolve upstream {}: {}",
                        addr, e
                    ))
                })?
                .next()
                .ok_or_else(|| {
                    DomainError::UpstreamFailure(format!("No addresses found for upstream {}", addr))
                })
        }
    }
}

/// Hands a reply read from the wire to its waiting query.
pub(crate) fn deliver(pending: &PendingQueries, reply: Bytes, server: &dyn std::fmt::Display) {
    let Some(wire_id) = doh_gateway_domain::DnsMessage::peek_id(&reply) else {
        tracing::warn!(server = %server, len = reply.len(), "Discarding runt reply from upstream");
        return;
    };

    match pending.complete(wire_id, reply) {
        Some(client_id) => {
            tracing::debug!(server = %server, wire_id, client_id, "Upstream reply matched");
        }
        None => {
            tracing::warn!(server = %server, wire_id, "Reply does not match any pending query");
        }
    }
}
