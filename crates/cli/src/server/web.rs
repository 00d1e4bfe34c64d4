use super::tls;
use axum::Router;
use doh_gateway_api::{create_doh_routes, AppState};
use doh_gateway_domain::config::ServerConfig;
use doh_gateway_domain::DOH_PATH;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

pub async fn start_web_server(
    bind_addr: SocketAddr,
    state: AppState,
    server: &ServerConfig,
) -> anyhow::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    match (&server.tls_cert_path, &server.tls_key_path) {
        (Some(cert_path), Some(key_path)) => {
            let acceptor = tls::create_tls_acceptor(cert_path, key_path)?;
            info!(
                bind_address = %bind_addr,
                doh_url = format!("https://{}{}", bind_addr, DOH_PATH),
                "Starting DoH listener"
            );
            tls::serve_tls(listener, acceptor, app, shutdown_signal()).await
        }
        _ => {
            info!(
                bind_address = %bind_addr,
                doh_url = format!("http://{}{}", bind_addr, DOH_PATH),
                "Starting DoH listener without TLS"
            );
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            Ok(())
        }
    }
}

fn create_app(state: AppState) -> Router {
    create_doh_routes(state).layer(TraceLayer::new_for_http())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("Shutdown signal received");
}
