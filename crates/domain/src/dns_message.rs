//! DNS message entity.
//!
//! The gateway never interprets the body of a DNS message; it only needs the
//! 16-bit transaction identifier in the first two header bytes. Everything
//! else travels as opaque wire-format bytes.

use crate::DomainError;
use bytes::{Bytes, BytesMut};

/// Length of the fixed DNS header (RFC 1035 §4.1.1).
pub const DNS_HEADER_LEN: usize = 12;

/// Largest DNS message that fits a TCP length prefix or a DoH body.
pub const MAX_DNS_MESSAGE_LEN: usize = 65_535;

/// Wire-format DNS message with an addressable transaction identifier.
///
/// Always holds at least a complete header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsMessage {
    wire: Bytes,
}

impl DnsMessage {
    pub fn from_wire(wire: impl Into<Bytes>) -> Result<Self, DomainError> {
        let wire = wire.into();
        if wire.len() < DNS_HEADER_LEN {
            return Err(DomainError::DecodeError(format!(
                "message is {} bytes, shorter than the {}-byte DNS header",
                wire.len(),
                DNS_HEADER_LEN
            )));
        }
        if wire.len() > MAX_DNS_MESSAGE_LEN {
            return Err(DomainError::DecodeError(format!(
                "message is {} bytes, larger than the {}-byte DNS maximum",
                wire.len(),
                MAX_DNS_MESSAGE_LEN
            )));
        }
        Ok(Self { wire })
    }

    /// Reads the transaction identifier of a raw buffer without validating it.
    pub fn peek_id(wire: &[u8]) -> Option<u16> {
        match wire {
            [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
            _ => None,
        }
    }

    pub fn id(&self) -> u16 {
        u16::from_be_bytes([self.wire[0], self.wire[1]])
    }

    /// Returns a copy of this message carrying `id`; the rest of the wire
    /// bytes are untouched.
    pub fn with_id(&self, id: u16) -> Self {
        if id == self.id() {
            return self.clone();
        }
        let mut wire = BytesMut::from(&self.wire[..]);
        wire[..2].copy_from_slice(&id.to_be_bytes());
        Self {
            wire: wire.freeze(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.wire
    }

    pub fn into_bytes(self) -> Bytes {
        self.wire
    }
}

impl AsRef<[u8]> for DnsMessage {
    fn as_ref(&self) -> &[u8] {
        &self.wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(id: u16) -> Vec<u8> {
        let mut wire = id.to_be_bytes().to_vec();
        wire.extend_from_slice(&[0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0]);
        wire
    }

    #[test]
    fn test_with_id_only_touches_first_two_bytes() {
        let original = DnsMessage::from_wire(header(0x1234)).unwrap();
        let rewritten = original.with_id(0xbeef);

        assert_eq!(rewritten.id(), 0xbeef);
        assert_eq!(&rewritten.as_bytes()[2..], &original.as_bytes()[2..]);
        assert_eq!(original.id(), 0x1234);
    }

    #[test]
    fn test_peek_id_short_buffer() {
        assert_eq!(DnsMessage::peek_id(&[0x12]), None);
        assert_eq!(DnsMessage::peek_id(&[0x12, 0x34]), Some(0x1234));
    }
}
