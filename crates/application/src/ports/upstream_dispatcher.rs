use async_trait::async_trait;
use doh_gateway_domain::{DnsMessage, DomainError};

/// Forwards a decoded query to the configured upstream resolver.
#[async_trait]
pub trait UpstreamDispatcher: Send + Sync {
    /// Sends `query` and returns the upstream's reply.
    ///
    /// The reply's transaction identifier is unspecified; callers restore the
    /// client's identifier themselves. Implementations bound the whole
    /// exchange by their configured timeout and report expiry as
    /// `DomainError::UpstreamTimeout`.
    async fn dispatch(&self, query: &DnsMessage) -> Result<DnsMessage, DomainError>;
}
