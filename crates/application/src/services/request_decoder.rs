use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use doh_gateway_domain::{
    DnsMessage, DohRequest, DomainError, HttpMethod, DNS_MESSAGE_MEDIA_TYPE, DOH_PATH,
};
use hickory_proto::op::Message;

/// Turns an inbound DoH request into a validated DNS query.
pub struct RequestDecoder;

impl RequestDecoder {
    /// Checks run in a fixed order: path, `accept`, then the method-specific
    /// payload rules.
    pub fn decode(request: &DohRequest) -> Result<DnsMessage, DomainError> {
        if request.path != DOH_PATH {
            return Err(DomainError::PathNotFound);
        }

        if let Some(accept) = request.accept.as_deref() {
            if !accept.contains(DNS_MESSAGE_MEDIA_TYPE) {
                return Err(DomainError::MediaTypeUnsupported(format!(
                    "accept '{}' does not include {}",
                    accept, DNS_MESSAGE_MEDIA_TYPE
                )));
            }
        }

        let wire = match &request.method {
            HttpMethod::Get => {
                if let Some(error) = request.query_error.as_deref() {
                    return Err(DomainError::DecodeError(format!(
                        "invalid query string: {}",
                        error
                    )));
                }
                let param = request
                    .dns_param
                    .as_deref()
                    .filter(|param| !param.is_empty())
                    .ok_or_else(|| DomainError::DecodeError("missing argument 'dns'".to_string()))?;
                Self::decode_base64url(param)?
            }
            HttpMethod::Post => match request.content_type.as_deref() {
                Some(DNS_MESSAGE_MEDIA_TYPE) => request.body.to_vec(),
                Some(other) => {
                    return Err(DomainError::MediaTypeUnsupported(format!(
                        "content-type '{}'",
                        other
                    )))
                }
                None => {
                    return Err(DomainError::MediaTypeUnsupported(
                        "missing content-type".to_string(),
                    ))
                }
            },
            HttpMethod::Other(method) => {
                return Err(DomainError::MethodUnsupported(method.clone()));
            }
        };

        Self::parse_query(wire)
    }

    /// Decodes the `dns` parameter: base64url with or without padding.
    pub fn decode_base64url(param: &str) -> Result<Vec<u8>, DomainError> {
        let mut normalized: String = param
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();
        while normalized.len() % 4 != 0 {
            normalized.push('=');
        }

        STANDARD
            .decode(normalized.as_bytes())
            .map_err(|e| DomainError::DecodeError(format!("invalid base64url: {}", e)))
    }

    fn parse_query(wire: Vec<u8>) -> Result<DnsMessage, DomainError> {
        let message = DnsMessage::from_wire(wire)?;
        Message::from_vec(message.as_bytes())
            .map_err(|e| DomainError::DecodeError(format!("malformed DNS message: {}", e)))?;
        Ok(message)
    }
}
