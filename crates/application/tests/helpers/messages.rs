use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Wire-format recursive A query for `domain` with transaction id `id`.
pub fn a_query(id: u16, domain: &str) -> Vec<u8> {
    let mut query = Query::new();
    query.set_name(Name::from_str(domain).unwrap());
    query.set_query_type(RecordType::A);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new(id, MessageType::Query, OpCode::Query);
    message.set_recursion_desired(true);
    message.add_query(query);

    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}

/// Turns a single-question query into a response with id `id` and one A
/// record pointing at the question name.
pub fn answer_for(query: &[u8], id: u16, ip: Ipv4Addr) -> Vec<u8> {
    let mut wire = query.to_vec();
    wire[0..2].copy_from_slice(&id.to_be_bytes());
    wire[2] |= 0x80;
    wire[3] = 0x80;
    wire[6..8].copy_from_slice(&1u16.to_be_bytes());

    wire.extend_from_slice(&[0xc0, 0x0c]);
    wire.extend_from_slice(&1u16.to_be_bytes());
    wire.extend_from_slice(&1u16.to_be_bytes());
    wire.extend_from_slice(&300u32.to_be_bytes());
    wire.extend_from_slice(&4u16.to_be_bytes());
    wire.extend_from_slice(&ip.octets());
    wire
}

pub fn encode_url_safe(wire: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(wire)
}
