use crate::handlers;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::any, Router};
use doh_gateway_domain::{DOH_PATH, MAX_DNS_MESSAGE_LEN};

pub fn create_doh_routes(state: AppState) -> Router {
    Router::new()
        .route(
            DOH_PATH,
            any(handlers::dns_query).layer(DefaultBodyLimit::max(MAX_DNS_MESSAGE_LEN)),
        )
        .fallback(handlers::not_found)
        .with_state(state)
}
