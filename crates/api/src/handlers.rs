use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use doh_gateway_domain::{DohRequest, DomainError, HttpMethod, DNS_MESSAGE_MEDIA_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::errors::DohError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DnsQueryParams {
    pub dns: Option<String>,
}

/// Entry point for `/dns-query`; method and media-type checks happen in the
/// decoder so they follow its fixed order.
pub async fn dns_query(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: Result<Query<DnsQueryParams>, QueryRejection>,
    body: Bytes,
) -> Response {
    let (dns_param, query_error) = match params {
        Ok(Query(params)) => (params.dns, None),
        Err(rejection) => (None, Some(rejection.body_text())),
    };
    let request = DohRequest {
        method: HttpMethod::from(method.as_str()),
        path: uri.path().to_string(),
        accept: header_value(&headers, header::ACCEPT),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        dns_param,
        query_error,
        body,
    };

    match state.handle_query.execute(&request).await {
        Ok(answer) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, DNS_MESSAGE_MEDIA_TYPE),
                (header::CACHE_CONTROL, "no-store"),
            ],
            answer,
        )
            .into_response(),
        Err(error) => {
            debug!(
                method = %method,
                path = uri.path(),
                kind = error.kind(),
                error = %error,
                "DoH request failed"
            );
            DohError::new(error, state.status_mapping).into_response()
        }
    }
}

/// Every other path. The body is never read, so its size does not matter.
pub async fn not_found(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    debug!(method = %method, path = uri.path(), "Request for unknown path");
    DohError::new(DomainError::PathNotFound, state.status_mapping).into_response()
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}
