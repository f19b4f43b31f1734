use super::decoder::{decode_header, decode_question_section, HEADER_LEN};
use super::Header;

pub const RCODE_SERVFAIL: u8 = 2;

/// Builds a SERVFAIL reply echoing the request's id and question section.
///
/// Returns `None` when the header or questions cannot be decoded, in which
/// case the caller drops the query.
pub fn build_servfail_response(request: &[u8]) -> Option<Vec<u8>> {
    let request_header = decode_header(request).ok()?;

    let (_, question_end) = decode_question_section(request, request_header.qdcount).ok()?;

    let header = Header {
        id: request_header.id,
        qr: true,
        opcode: request_header.opcode,
        rd: request_header.rd,
        ra: true,
        rcode: RCODE_SERVFAIL,
        qdcount: request_header.qdcount,
        ..Header::default()
    };

    let mut response = Vec::with_capacity(question_end);
    response.extend_from_slice(&header.id.to_be_bytes());
    response.extend_from_slice(&header.flags().to_be_bytes());
    response.extend_from_slice(&header.qdcount.to_be_bytes());
    response.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    response.extend_from_slice(&request[HEADER_LEN..question_end]);
    Some(response)
}
