//! Encoding to the RFC 1035 wire format.  Names are always written
//! in full; compression pointers are never emitted.

use bytes::{BufMut, BytesMut};

use crate::protocol::types::*;

impl Message {
    /// Encode for sending over UDP.
    ///
    /// # Errors
    ///
    /// Whatever `serialise` rejects, and any encoding longer than
    /// `MESSAGE_MAX_LEN`.
    pub fn to_octets(&self) -> Result<BytesMut, Error> {
        let mut buffer = WritableBuffer::default();
        self.serialise(&mut buffer)?;

        let size = buffer.index();
        if size > MESSAGE_MAX_LEN {
            return Err(Error::MessageTooLarge { size });
        }

        Ok(buffer.octets)
    }

    /// Serialise a message of any size.  The section counts written
    /// are the lengths of the sections, whatever the header says.
    ///
    /// # Errors
    ///
    /// If a section has more than 65535 entries, or an RDATA is too
    /// long.
    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), Error> {
        let header = Header {
            qdcount: usize_to_u16(self.questions.len())?,
            ancount: usize_to_u16(self.answers.len())?,
            nscount: usize_to_u16(self.authority.len())?,
            arcount: usize_to_u16(self.additional.len())?,
            ..self.header
        };

        header.serialise(buffer);

        for question in &self.questions {
            question.serialise(buffer);
        }
        let records = self.answers.iter().chain(&self.authority).chain(&self.additional);
        for rr in records {
            rr.serialise(buffer)?;
        }

        Ok(())
    }
}

impl Header {
    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        let opcode = HEADER_MASK_OPCODE & (u8::from(self.opcode) << HEADER_OFFSET_OPCODE);
        let z = HEADER_MASK_Z & (self.z << HEADER_OFFSET_Z);
        let rcode = HEADER_MASK_RCODE & (u8::from(self.rcode) << HEADER_OFFSET_RCODE);

        buffer.write_u16(self.id);
        buffer.write_u8(
            flag(self.is_response, HEADER_MASK_QR)
                | opcode
                | flag(self.is_authoritative, HEADER_MASK_AA)
                | flag(self.is_truncated, HEADER_MASK_TC)
                | flag(self.recursion_desired, HEADER_MASK_RD),
        );
        buffer.write_u8(flag(self.recursion_available, HEADER_MASK_RA) | z | rcode);
        for count in [self.qdcount, self.ancount, self.nscount, self.arcount] {
            buffer.write_u16(count);
        }
    }
}

fn flag(set: bool, mask: u8) -> u8 {
    if set {
        mask
    } else {
        0
    }
}

impl Question {
    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        self.name.serialise(buffer);
        self.qtype.serialise(buffer);
        self.qclass.serialise(buffer);
    }
}

impl ResourceRecord {
    /// # Errors
    ///
    /// If the RDATA comes to more than 65535 octets.
    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), Error> {
        self.name.serialise(buffer);
        self.rtype_with_data.rtype().serialise(buffer);
        self.rclass.serialise(buffer);
        buffer.write_u32(self.ttl);

        let rdlength_at = buffer.index();
        buffer.write_u16(0);

        match &self.rtype_with_data {
            RecordTypeWithData::A { address } => buffer.write_octets(&address.octets()),
            RecordTypeWithData::NS { nsdname } => nsdname.serialise(buffer),
            RecordTypeWithData::CNAME { cname } => cname.serialise(buffer),
            RecordTypeWithData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                mname.serialise(buffer);
                rname.serialise(buffer);
                buffer.write_u32(*serial);
                buffer.write_u32(*refresh);
                buffer.write_u32(*retry);
                buffer.write_u32(*expire);
                buffer.write_u32(*minimum);
            }
            RecordTypeWithData::PTR { ptrdname } => ptrdname.serialise(buffer),
            RecordTypeWithData::MX {
                preference,
                exchange,
            } => {
                buffer.write_u16(*preference);
                exchange.serialise(buffer);
            }
            RecordTypeWithData::TXT { octets } => buffer.write_octets(octets),
            RecordTypeWithData::AAAA { address } => buffer.write_octets(&address.octets()),
            RecordTypeWithData::Unknown { octets, .. } => buffer.write_octets(octets),
        }

        let rdata_len = buffer.index() - (rdlength_at + 2);
        buffer.patch_u16(rdlength_at, usize_to_u16(rdata_len)?);

        Ok(())
    }
}

impl DomainName {
    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        for label in self.labels() {
            buffer.write_u8(label.len());
            buffer.write_octets(label.octets());
        }
    }
}

impl RecordType {
    pub fn serialise(self, buffer: &mut WritableBuffer) {
        buffer.write_u16(self.into());
    }
}

impl RecordClass {
    pub fn serialise(self, buffer: &mut WritableBuffer) {
        buffer.write_u16(self.into());
    }
}

/// Why a message could not be encoded.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum Error {
    /// The name given to `encode_query` did not parse.
    #[error("invalid domain name: {0}")]
    Name(#[from] NameError),

    #[error("message is {size} octets, but the limit is 512")]
    MessageTooLarge { size: usize },

    /// A section or an RDATA is longer than a 16 bit field can say.
    #[error("'{counter}' cannot be converted to a u16")]
    CounterTooLarge { counter: usize },
}

/// Growable output for the `serialise` methods.  Everything is
/// written in network byte order.
pub struct WritableBuffer {
    pub octets: BytesMut,
}

impl Default for WritableBuffer {
    fn default() -> Self {
        Self {
            octets: BytesMut::with_capacity(MESSAGE_MAX_LEN),
        }
    }
}

impl WritableBuffer {
    pub fn index(&self) -> usize {
        self.octets.len()
    }

    pub fn write_u8(&mut self, octet: u8) {
        self.octets.put_u8(octet);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.octets.put_u16(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.octets.put_u32(value);
    }

    pub fn write_octets(&mut self, octets: &[u8]) {
        self.octets.put_slice(octets);
    }

    /// Overwrite two octets which have already been written.
    pub fn patch_u16(&mut self, index: usize, value: u16) {
        self.octets[index..index + 2].copy_from_slice(&value.to_be_bytes());
    }
}

fn usize_to_u16(counter: usize) -> Result<u16, Error> {
    u16::try_from(counter).map_err(|_| Error::CounterTooLarge { counter })
}
