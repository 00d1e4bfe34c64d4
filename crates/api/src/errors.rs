use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use doh_gateway_domain::{DomainError, StatusMapping};

const TIMEOUT_BODY: &str = "DNS query timed out.";

/// A pipeline failure on its way to becoming an HTTP response.
pub struct DohError {
    pub error: DomainError,
    pub mapping: StatusMapping,
}

impl DohError {
    pub fn new(error: DomainError, mapping: StatusMapping) -> Self {
        Self { error, mapping }
    }

    pub fn status(&self) -> StatusCode {
        status_for(&self.error, self.mapping)
    }
}

pub fn status_for(error: &DomainError, mapping: StatusMapping) -> StatusCode {
    match (error, mapping) {
        (DomainError::PathNotFound, _) => StatusCode::NOT_FOUND,
        (DomainError::UpstreamTimeout { .. }, _) => StatusCode::GATEWAY_TIMEOUT,
        (_, StatusMapping::Collapsed) => StatusCode::INTERNAL_SERVER_ERROR,

        (DomainError::MediaTypeUnsupported(_), StatusMapping::Rfc8484) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        (DomainError::MethodUnsupported(_), StatusMapping::Rfc8484) => {
            StatusCode::METHOD_NOT_ALLOWED
        }
        (DomainError::DecodeError(_), StatusMapping::Rfc8484) => StatusCode::BAD_REQUEST,
        (DomainError::UpstreamFailure(_), StatusMapping::Rfc8484) => StatusCode::BAD_GATEWAY,
        (DomainError::EncodeError(_), StatusMapping::Rfc8484) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for DohError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.error {
            DomainError::UpstreamTimeout { .. } => TIMEOUT_BODY.to_string(),
            other => other.to_string(),
        };

        let mut response = (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response();

        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, header::HeaderValue::from_static("GET, POST"));
        }
        response
    }
}
