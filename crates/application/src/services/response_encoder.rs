use bytes::Bytes;
use doh_gateway_domain::{DnsMessage, DomainError};
use hickory_proto::op::Message;
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};

/// Serializes an upstream reply for the HTTP client.
pub struct ResponseEncoder;

impl ResponseEncoder {
    /// Re-serializes `response` to wire format and stamps `client_id` on it.
    pub fn encode(client_id: u16, response: &DnsMessage) -> Result<Bytes, DomainError> {
        let message = Message::from_vec(response.as_bytes()).map_err(|e| {
            DomainError::EncodeError(format!("Failed to parse upstream response: {}", e))
        })?;

        let mut buf = Vec::with_capacity(response.as_bytes().len());
        let mut encoder = BinEncoder::new(&mut buf);
        message.emit(&mut encoder).map_err(|e| {
            DomainError::EncodeError(format!("Failed to serialize DNS message: {}", e))
        })?;

        let encoded = DnsMessage::from_wire(buf).map_err(|e| DomainError::EncodeError(e.to_string()))?;
        Ok(encoded.with_id(client_id).into_bytes())
    }
}
