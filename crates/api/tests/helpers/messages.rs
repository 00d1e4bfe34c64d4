use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Wire-format recursive A query for `name` (dotted, no trailing dot).
pub fn a_query(id: u16, name: &str) -> Vec<u8> {
    let mut wire = Vec::with_capacity(64);
    wire.extend_from_slice(&id.to_be_bytes());
    wire.extend_from_slice(&[0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    for label in name.split('.') {
        wire.push(label.len() as u8);
        wire.extend_from_slice(label.as_bytes());
    }
    wire.push(0);
    wire.extend_from_slice(&[0x00, 0x01, 0x00, 0x01]);
    wire
}

/// Response to `query` with identifier `id` and one A record.
pub fn answer_for(query: &[u8], id: u16) -> Vec<u8> {
    let mut response = Vec::with_capacity(query.len() + 16);
    response.extend_from_slice(&id.to_be_bytes());
    response.extend_from_slice(&[0x81, 0x80]);
    response.extend_from_slice(&query[4..6]);
    response.extend_from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x00]);
    response.extend_from_slice(&query[12..]);
    response.extend_from_slice(&[
        0xc0, 0x0c, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3c, 0x00, 0x04, 93, 184, 216, 34,
    ]);
    response
}

pub fn encode_url_safe(wire: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(wire)
}
