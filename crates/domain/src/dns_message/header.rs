use std::fmt;

const QR_BIT: u16 = 1 << 15;
const AA_BIT: u16 = 1 << 10;
const TC_BIT: u16 = 1 << 9;
const RD_BIT: u16 = 1 << 8;
const RA_BIT: u16 = 1 << 7;

/// Fixed 12-byte DNS header with the flags word unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    pub opcode: u8,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: u8,
    pub rcode: u8,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    /// Unpacks the flags word into its bit fields, leaving the counts at zero.
    pub fn with_flags(id: u16, flags: u16) -> Self {
        Self {
            id,
            qr: flags & QR_BIT != 0,
            opcode: ((flags >> 11) & 0x0F) as u8,
            aa: flags & AA_BIT != 0,
            tc: flags & TC_BIT != 0,
            rd: flags & RD_BIT != 0,
            ra: flags & RA_BIT != 0,
            z: ((flags >> 4) & 0x07) as u8,
            rcode: (flags & 0x0F) as u8,
            ..Self::default()
        }
    }

    /// Packs the bit fields back into the 16-bit flags word.
    pub fn flags(&self) -> u16 {
        let mut flags = (u16::from(self.opcode & 0x0F) << 11)
            | (u16::from(self.z & 0x07) << 4)
            | u16::from(self.rcode & 0x0F);
        if self.qr {
            flags |= QR_BIT;
        }
        if self.aa {
            flags |= AA_BIT;
        }
        if self.tc {
            flags |= TC_BIT;
        }
        if self.rd {
            flags |= RD_BIT;
        }
        if self.ra {
            flags |= RA_BIT;
        }
        flags
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id={} qr={} opcode={} aa={} tc={} rd={} ra={} z={} rcode={} qd={} an={} ns={} ar={}",
            self.id,
            u8::from(self.qr),
            self.opcode,
            u8::from(self.aa),
            u8::from(self.tc),
            u8::from(self.rd),
            u8::from(self.ra),
            self.z,
            self.rcode,
            self.qdcount,
            self.ancount,
            self.nscount,
            self.arcount
        )
    }
}
