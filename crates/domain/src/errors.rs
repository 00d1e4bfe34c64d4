use thiserror::Error;

/// Failure kinds of the DoH translation pipeline.
///
/// Every stage (decode, dispatch, encode) reports through this type; the HTTP
/// layer maps each kind to a status code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("not found")]
    PathNotFound,

    #[error("DoH request type not supported: {0}")]
    MediaTypeUnsupported(String),

    #[error("HTTP method not supported: {0}")]
    MethodUnsupported(String),

    #[error("Failed to decode DNS request: {0}")]
    DecodeError(String),

    #[error("DNS query to {server} timed out after {timeout_ms} ms")]
    UpstreamTimeout { server: String, timeout_ms: u64 },

    #[error("Upstream failure: {0}")]
    UpstreamFailure(String),

    #[error("Failed to encode DNS response: {0}")]
    EncodeError(String),
}

impl DomainError {
    /// Short stable name of the failure kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PathNotFound => "path_not_found",
            Self::MediaTypeUnsupported(_) => "media_type_unsupported",
            Self::MethodUnsupported(_) => "method_unsupported",
            Self::DecodeError(_) => "decode_error",
            Self::UpstreamTimeout { .. } => "upstream_timeout",
            Self::UpstreamFailure(_) => "upstream_failure",
            Self::EncodeError(_) => "encode_error",
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTimeout { .. } | Self::UpstreamFailure(_)
        )
    }
}
