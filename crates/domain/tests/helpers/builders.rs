#![allow(dead_code)]

/// Assembles DNS wire bytes for decoder tests.
pub struct WireBuilder {
    buf: Vec<u8>,
}

impl WireBuilder {
    pub fn new(id: u16, flags: u16, counts: [u16; 4]) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&id.to_be_bytes());
        buf.extend_from_slice(&flags.to_be_bytes());
        for count in counts {
            buf.extend_from_slice(&count.to_be_bytes());
        }
        Self { buf }
    }

    pub fn query(id: u16, domain: &str) -> Self {
        Self::new(id, 0x0100, [1, 0, 0, 0]).question(domain, 1, 1)
    }

    pub fn name(mut self, domain: &str) -> Self {
        for label in domain.split('.').filter(|l| !l.is_empty()) {
            self.buf.push(label.len() as u8);
            self.buf.extend_from_slice(label.as_bytes());
        }
        self.buf.push(0);
        self
    }

    pub fn pointer(mut self, offset: u16) -> Self {
        self.buf.extend_from_slice(&(0xC000 | offset).to_be_bytes());
        self
    }

    pub fn question(self, domain: &str, qtype: u16, qclass: u16) -> Self {
        self.name(domain).u16(qtype).u16(qclass)
    }

    /// Record fields after the owner name.
    pub fn record_body(self, rtype: u16, rclass: u16, ttl: u32, rdata: &[u8]) -> Self {
        let mut this = self.u16(rtype).u16(rclass).u32(ttl).u16(rdata.len() as u16);
        this.buf.extend_from_slice(rdata);
        this
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// A single-answer A response for `www.example.com` using a pointer to the question.
pub fn example_response(id: u16) -> Vec<u8> {
    WireBuilder::new(id, 0x8180, [1, 1, 0, 0])
        .question("www.example.com", 1, 1)
        .pointer(12)
        .record_body(1, 1, 60, &[93, 184, 216, 34])
        .build()
}
