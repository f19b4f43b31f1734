use super::{Header, Message, Question, ResourceRecord};
use crate::DomainError;

pub const HEADER_LEN: usize = 12;

/// Length bytes at or above this value mark a compression pointer.
const POINTER_MARKER: u8 = 0xC0;
const POINTER_LEN: usize = 2;
const RR_FIXED_LEN: usize = 10;

fn read_u16(buf: &[u8], pos: usize) -> Result<u16, DomainError> {
    match buf.get(pos..pos + 2) {
        Some(b) => Ok(u16::from_be_bytes([b[0], b[1]])),
        None => Err(DomainError::malformed(format!(
            "need 2 bytes at offset {}, buffer is {} bytes",
            pos,
            buf.len()
        ))),
    }
}

fn read_u32(buf: &[u8], pos: usize) -> Result<u32, DomainError> {
    match buf.get(pos..pos + 4) {
        Some(b) => Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        None => Err(DomainError::malformed(format!(
            "need 4 bytes at offset {}, buffer is {} bytes",
            pos,
            buf.len()
        ))),
    }
}

pub fn decode_header(buf: &[u8]) -> Result<Header, DomainError> {
    if buf.len() < HEADER_LEN {
        return Err(DomainError::malformed(format!(
            "header needs {} bytes, got {}",
            HEADER_LEN,
            buf.len()
        )));
    }

    let mut header = Header::with_flags(read_u16(buf, 0)?, read_u16(buf, 2)?);
    header.qdcount = read_u16(buf, 4)?;
    header.ancount = read_u16(buf, 6)?;
    header.nscount = read_u16(buf, 8)?;
    header.arcount = read_u16(buf, 10)?;
    Ok(header)
}

/// Reads labels starting at `offset`. With `allow_pointer` a length byte
/// >= 0xC0 ends the name without being followed; otherwise every byte is
/// taken as a plain label length.
fn read_labels(
    buf: &[u8],
    mut pos: usize,
    allow_pointer: bool,
) -> Result<(String, usize), DomainError> {
    let mut labels: Vec<&str> = Vec::new();

    loop {
        let len = *buf
            .get(pos)
            .ok_or_else(|| DomainError::malformed(format!("name runs past end at offset {}", pos)))?;

        if len == 0 {
            pos += 1;
            break;
        }

        if allow_pointer && len >= POINTER_MARKER {
            if pos + POINTER_LEN > buf.len() {
                return Err(DomainError::malformed(format!(
                    "truncated compression pointer at offset {}",
                    pos
                )));
            }
            pos += POINTER_LEN;
            break;
        }

        let start = pos + 1;
        let end = start + len as usize;
        let raw = buf.get(start..end).ok_or_else(|| {
            DomainError::malformed(format!(
                "label of {} bytes at offset {} runs past end of {}-byte buffer",
                len,
                pos,
                buf.len()
            ))
        })?;
        let label = std::str::from_utf8(raw).map_err(|e| {
            DomainError::malformed(format!("label at offset {} is not UTF-8: {}", pos, e))
        })?;
        labels.push(label);
        pos = end;
    }

    Ok((labels.join("."), pos))
}

/// Decodes an uncompressed domain name, returning it and the offset past
/// the terminating zero byte.
pub fn decode_name(buf: &[u8], offset: usize) -> Result<(String, usize), DomainError> {
    read_labels(buf, offset, false)
}

pub fn decode_question(buf: &[u8], offset: usize) -> Result<(Question, usize), DomainError> {
    let (qname, pos) = decode_name(buf, offset)?;
    let qtype = read_u16(buf, pos)?;
    let qclass = read_u16(buf, pos + 2)?;

    Ok((
        Question {
            qname,
            qtype,
            qclass,
        },
        pos + 4,
    ))
}

/// Decodes one resource record. A compression pointer in the owner name is
/// not resolved: the name holds only the labels preceding it.
pub fn decode_resource_record(
    buf: &[u8],
    offset: usize,
) -> Result<(ResourceRecord, usize), DomainError> {
    let (name, pos) = read_labels(buf, offset, true)?;

    if pos + RR_FIXED_LEN > buf.len() {
        return Err(DomainError::malformed(format!(
            "record fields need {} bytes at offset {}, buffer is {} bytes",
            RR_FIXED_LEN,
            pos,
            buf.len()
        )));
    }

    let rtype = read_u16(buf, pos)?;
    let rclass = read_u16(buf, pos + 2)?;
    let ttl = read_u32(buf, pos + 4)?;
    let rdlength = read_u16(buf, pos + 8)?;

    let rdata_start = pos + RR_FIXED_LEN;
    let rdata_end = rdata_start + rdlength as usize;
    let rdata = buf
        .get(rdata_start..rdata_end)
        .ok_or_else(|| {
            DomainError::malformed(format!(
                "rdata of {} bytes at offset {} runs past end of {}-byte buffer",
                rdlength,
                rdata_start,
                buf.len()
            ))
        })?
        .to_vec();

    Ok((
        ResourceRecord {
            name,
            rtype,
            rclass,
            ttl,
            rdlength,
            rdata,
        },
        rdata_end,
    ))
}

/// Decodes the `qdcount` questions following the header and returns them
/// with the offset just past the question section.
pub fn decode_question_section(
    buf: &[u8],
    qdcount: u16,
) -> Result<(Vec<Question>, usize), DomainError> {
    // capacity is never taken from wire counts
    let mut questions = Vec::new();
    let mut pos = HEADER_LEN;
    for _ in 0..qdcount {
        let (question, next) = decode_question(buf, pos)?;
        questions.push(question);
        pos = next;
    }
    Ok((questions, pos))
}

fn decode_records(
    buf: &[u8],
    count: u16,
    pos: &mut usize,
) -> Result<Vec<ResourceRecord>, DomainError> {
    let mut records = Vec::new();
    for _ in 0..count {
        let (record, next) = decode_resource_record(buf, *pos)?;
        records.push(record);
        *pos = next;
    }
    Ok(records)
}

/// Decodes a full message. Sections are read strictly in order, each
/// starting where the previous one ended; trailing bytes are ignored.
pub fn decode_message(buf: &[u8]) -> Result<Message, DomainError> {
    let header = decode_header(buf)?;
    let (questions, question_end) = decode_question_section(buf, header.qdcount)?;
    let mut pos = question_end;

    let answers = decode_records(buf, header.ancount, &mut pos)?;
    let authorities = decode_records(buf, header.nscount, &mut pos)?;
    let additionals = decode_records(buf, header.arcount, &mut pos)?;

    Ok(Message {
        header,
        questions,
        answers,
        authorities,
        additionals,
        question_end,
    })
}
