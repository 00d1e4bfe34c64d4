//! TLS Transport for DNS queries: DNS-over-TLS (RFC 7858)
//!
//! Same framing as TCP, over a rustls session. The client config is built
//! once and shared, so session resumption applies across reconnects.

use super::tcp::{connect_tcp, StreamTransport};
use doh_gateway_domain::DomainError;
use rustls::pki_types::ServerName;
use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};
use tracing::info;

static SHARED_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Arc::new(client_config(root_store))
});

/// Selects aws-lc-rs as the process-wide rustls provider. reqwest pulls in
/// `ring` as well, so rustls cannot pick one on its own.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

pub(crate) fn client_config(root_store: rustls::RootCertStore) -> rustls::ClientConfig {
    install_crypto_provider();
    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// TCP connect plus TLS handshake, verifying the certificate against
/// `hostname`.
pub async fn connect(server_addr: SocketAddr, hostname: &str) -> Result<StreamTransport, DomainError> {
    connect_with_config(server_addr, hostname, Arc::clone(&SHARED_TLS_CONFIG)).await
}

pub(crate) async fn connect_with_config(
    server_addr: SocketAddr,
    hostname: &str,
    config: Arc<rustls::ClientConfig>,
) -> Result<StreamTransport, DomainError> {
    let server_name = ServerName::try_from(hostname.to_string()).map_err(|e| {
        DomainError::UpstreamFailure(format!("Invalid TLS hostname '{}': {}", hostname, e))
    })?;

    let tcp_stream = connect_tcp(server_addr).await?;

    let connector = tokio_rustls::TlsConnector::from(config);
    let tls_stream = connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| {
            DomainError::UpstreamFailure(format!(
                "TLS handshake failed with {}: {}",
                server_addr, e
            ))
        })?;

    info!(server = %server_addr, hostname, "TLS connection established");
    Ok(StreamTransport::spawn(
        tls_stream,
        format!("{}:{}", hostname, server_addr.port()),
        "TLS",
    ))
}
