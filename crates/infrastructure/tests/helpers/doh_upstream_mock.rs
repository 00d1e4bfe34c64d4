use super::messages::answer_for;
use axum::body::Bytes;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Plain-HTTP DoH upstream answering POST /dns-query.
pub struct MockDohUpstream {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDohUpstream {
    /// `status` other than 200 makes every request fail with that status.
    /// Replies always carry identifier 0, as RFC 8484 recommends for queries.
    pub async fn start(status: StatusCode) -> Self {
        let app = Router::new().route(
            "/dns-query",
            post(move |body: Bytes| async move {
                if status != StatusCode::OK || body.len() < 12 {
                    return (status, "upstream error").into_response();
                }
                (
                    [(header::CONTENT_TYPE, "application/dns-message")],
                    answer_for(&body, 0),
                )
                    .into_response()
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/dns-query", self.addr)
    }
}

impl Drop for MockDohUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
