//! HTTPS Transport for DNS queries: DNS-over-HTTPS (RFC 8484)
//!
//! Sends DNS queries as HTTP POST requests with `application/dns-message` content type.
//! The request body is the raw DNS wire format message, and the response body
//! contains the raw DNS wire format response.
//!
//! Requires the `dns-over-https` feature flag.
//!
//! Wire format (HTTP):
//! ```text
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//!
//! <raw DNS message bytes>
//! ```

use super::DnsTransport;
use crate::dns::upstream::PendingQueries;
use async_trait::async_trait;
use bytes::Bytes;
use doh_gateway_domain::{DnsMessage, DomainError, DNS_MESSAGE_MEDIA_TYPE};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Shared client with connection pooling; HTTP/2 is negotiated via ALPN.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .use_rustls_tls()
        .pool_max_idle_per_host(4)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

pub struct HttpsTransport {
    url: Arc<str>,
    pending: Arc<PendingQueries>,
}

impl HttpsTransport {
    pub fn new(url: Arc<str>) -> Self {
        Self {
            url,
            pending: Arc::new(PendingQueries::new()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    /// Runs the whole HTTP exchange and delivers the body to the query that
    /// was sent, whatever identifier the upstream put in its reply.
    async fn send(&self, query: Bytes) -> Result<(), DomainError> {
        let wire_id = DnsMessage::peek_id(&query).ok_or_else(|| {
            DomainError::UpstreamFailure("Query is missing its DNS header".to_string())
        })?;

        debug!(url = %self.url, message_len = query.len(), "Sending DoH query");

        let response = SHARED_CLIENT
            .post(&*self.url)
            .header(CONTENT_TYPE, DNS_MESSAGE_MEDIA_TYPE)
            .header(ACCEPT, DNS_MESSAGE_MEDIA_TYPE)
            .body(query)
            .send()
            .await
            .map_err(|e| {
                DomainError::UpstreamFailure(format!("DoH request to {} failed: {}", self.url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::UpstreamFailure(format!(
                "DoH server {} returned HTTP {}: {}",
                self.url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let response_bytes = response.bytes().await.map_err(|e| {
            DomainError::UpstreamFailure(format!(
                "Failed to read DoH response from {}: {}",
                self.url, e
            ))
        })?;

        debug!(
            url = %self.url,
            response_len = response_bytes.len(),
            "DoH response received"
        );

        self.pending.complete(wire_id, response_bytes);
        Ok(())
    }

    fn pending(&self) -> &Arc<PendingQueries> {
        &self.pending
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
