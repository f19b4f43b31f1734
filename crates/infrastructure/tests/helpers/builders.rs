#![allow(dead_code)]

/// Standard A query for `domain`; all bytes stay below 0x80 for small ids so
/// the datagram is a valid cache key.
pub fn query_bytes(id: u16, domain: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&id.to_be_bytes());
    buf.extend_from_slice(&[0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    for label in domain.split('.') {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x01]);
    buf
}
