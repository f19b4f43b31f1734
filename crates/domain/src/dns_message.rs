//! DNS wire-format message model and decoder (RFC 1035 §4.1).
//!
//! Decoding is diagnostic only: the resolver forwards and caches raw bytes and
//! never rebuilds a message from these structures.

mod decoder;
mod header;
mod record;
mod wire_response;

pub use decoder::{
    decode_header, decode_message, decode_name, decode_question, decode_question_section,
    decode_resource_record, HEADER_LEN,
};
pub use header::Header;
pub use record::{Message, Question, ResourceRecord};
pub use wire_response::{build_servfail_response, RCODE_SERVFAIL};
