//! Deserialisation of DNS messages from the network.  See the `types`
//! module for details of the format.

use bytes::Bytes;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::protocol::types::*;

impl Message {
    /// # Errors
    ///
    /// If the message cannot be parsed.
    pub fn from_octets(octets: &[u8]) -> Result<Self, Error> {
        Self::deserialise(&mut ConsumableBuffer::new(octets))
    }

    /// # Errors
    ///
    /// If the message cannot be parsed.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let header = Header::deserialise(buffer)?;
        // the counts are untrusted: reserve no more than the rest of
        // the buffer could hold
        let remaining = buffer.remaining();
        let mut questions = Vec::with_capacity(section_capacity(header.qdcount, remaining, 5));
        let mut answers = Vec::with_capacity(section_capacity(header.ancount, remaining, 11));
        let mut authority = Vec::with_capacity(section_capacity(header.nscount, remaining, 11));
        let mut additional = Vec::with_capacity(section_capacity(header.arcount, remaining, 11));

        for _ in 0..header.qdcount {
            questions.push(Question::deserialise(buffer)?);
        }
        for _ in 0..header.ancount {
            answers.push(ResourceRecord::deserialise(buffer)?);
        }
        for _ in 0..header.nscount {
            authority.push(ResourceRecord::deserialise(buffer)?);
        }
        for _ in 0..header.arcount {
            additional.push(ResourceRecord::deserialise(buffer)?);
        }

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
        })
    }
}

/// How many entries of at least `min_len` octets fit in `remaining`
/// octets, capped at `count`.
fn section_capacity(count: u16, remaining: usize, min_len: usize) -> usize {
    usize::from(count).min(remaining / min_len)
}

impl Header {
    /// # Errors
    ///
    /// If the header is too short.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        if buffer.remaining() < HEADER_LEN {
            return Err(Error::TruncatedBuffer);
        }

        let id = buffer.next_u16().ok_or(Error::TruncatedBuffer)?;
        let flags1 = buffer.next_u8().ok_or(Error::TruncatedBuffer)?;
        let flags2 = buffer.next_u8().ok_or(Error::TruncatedBuffer)?;
        let qdcount = buffer.next_u16().ok_or(Error::TruncatedBuffer)?;
        let ancount = buffer.next_u16().ok_or(Error::TruncatedBuffer)?;
        let nscount = buffer.next_u16().ok_or(Error::TruncatedBuffer)?;
        let arcount = buffer.next_u16().ok_or(Error::TruncatedBuffer)?;

        Ok(Self {
            id,
            is_response: flags1 & HEADER_MASK_QR != 0,
            opcode: Opcode::from((flags1 & HEADER_MASK_OPCODE) >> HEADER_OFFSET_OPCODE),
            is_authoritative: flags1 & HEADER_MASK_AA != 0,
            is_truncated: flags1 & HEADER_MASK_TC != 0,
            recursion_desired: flags1 & HEADER_MASK_RD != 0,
            recursion_available: flags2 & HEADER_MASK_RA != 0,
            z: (flags2 & HEADER_MASK_Z) >> HEADER_OFFSET_Z,
            rcode: Rcode::from((flags2 & HEADER_MASK_RCODE) >> HEADER_OFFSET_RCODE),
            qdcount,
            ancount,
            nscount,
            arcount,
        })
    }
}

impl Question {
    /// # Errors
    ///
    /// If the question cannot be parsed.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let name = DomainName::deserialise(buffer)?;
        let qtype = RecordType::deserialise(buffer)?;
        let qclass = RecordClass::deserialise(buffer)?;

        Ok(Self {
            name,
            qtype,
            qclass,
        })
    }
}

impl ResourceRecord {
    /// # Errors
    ///
    /// If the record cannot be parsed.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let name = DomainName::deserialise(buffer)?;
        let rtype = RecordType::deserialise(buffer)?;
        let rclass = RecordClass::deserialise(buffer)?;
        let ttl = buffer.next_u32().ok_or(Error::TruncatedBuffer)?;
        let rdlength = usize::from(buffer.next_u16().ok_or(Error::TruncatedBuffer)?);

        if buffer.remaining() < rdlength {
            return Err(Error::TruncatedBuffer);
        }

        let check_length = |expected: usize| {
            if rdlength == expected {
                Ok(())
            } else {
                Err(Error::InvalidLength {
                    rtype,
                    expected,
                    actual: rdlength,
                })
            }
        };

        let rdata_start = buffer.position();

        // for records which include domain names, deserialise them to
        // expand pointers.
        let rtype_with_data = match rtype {
            RecordType::A => {
                check_length(4)?;
                RecordTypeWithData::A {
                    address: Ipv4Addr::from(buffer.next_u32().ok_or(Error::TruncatedBuffer)?),
                }
            }
            RecordType::NS => RecordTypeWithData::NS {
                nsdname: DomainName::deserialise(buffer)?,
            },
            RecordType::CNAME => RecordTypeWithData::CNAME {
                cname: DomainName::deserialise(buffer)?,
            },
            RecordType::SOA => RecordTypeWithData::SOA {
                mname: DomainName::deserialise(buffer)?,
                rname: DomainName::deserialise(buffer)?,
                serial: buffer.next_u32().ok_or(Error::TruncatedBuffer)?,
                refresh: buffer.next_u32().ok_or(Error::TruncatedBuffer)?,
                retry: buffer.next_u32().ok_or(Error::TruncatedBuffer)?,
                expire: buffer.next_u32().ok_or(Error::TruncatedBuffer)?,
                minimum: buffer.next_u32().ok_or(Error::TruncatedBuffer)?,
            },
            RecordType::PTR => RecordTypeWithData::PTR {
                ptrdname: DomainName::deserialise(buffer)?,
            },
            RecordType::MX => RecordTypeWithData::MX {
                preference: buffer.next_u16().ok_or(Error::TruncatedBuffer)?,
                exchange: DomainName::deserialise(buffer)?,
            },
            RecordType::TXT => RecordTypeWithData::TXT {
                octets: raw_rdata(buffer, rdlength)?,
            },
            RecordType::AAAA => {
                check_length(16)?;
                let octets = buffer.take(16).ok_or(Error::TruncatedBuffer)?;
                let mut address = [0; 16];
                address.copy_from_slice(octets);
                RecordTypeWithData::AAAA {
                    address: Ipv6Addr::from(address),
                }
            }
            RecordType::Unknown(tag) => RecordTypeWithData::Unknown {
                tag,
                octets: raw_rdata(buffer, rdlength)?,
            },
        };

        let consumed = buffer.position() - rdata_start;
        if consumed != rdlength {
            return Err(Error::InvalidLength {
                rtype,
                expected: rdlength,
                actual: consumed,
            });
        }

        Ok(Self {
            name,
            rtype_with_data,
            rclass,
            ttl,
        })
    }
}

/// Copy the RDATA out of the buffer as-is.
fn raw_rdata(buffer: &mut ConsumableBuffer, rdlength: usize) -> Result<Bytes, Error> {
    buffer
        .take(rdlength)
        .map(Bytes::copy_from_slice)
        .ok_or(Error::TruncatedBuffer)
}

impl DomainName {
    /// # Errors
    ///
    /// If the domain cannot be parsed.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        Self::deserialise_at_depth(buffer, 0)
    }

    /// `depth` is the number of pointers already followed to get to
    /// this name.
    fn deserialise_at_depth(buffer: &mut ConsumableBuffer, depth: usize) -> Result<Self, Error> {
        let mut labels = Vec::<Label>::with_capacity(5);
        let mut len = 0;
        let start = buffer.position();

        loop {
            let size = buffer.next_u8().ok_or(Error::TruncatedBuffer)?;

            if size & POINTER_MASK == 0 {
                len += 1 + usize::from(size);
                if len > DOMAINNAME_MAX_LEN {
                    return Err(Error::NameTooLong);
                }

                if size == 0 {
                    break;
                }

                let os = buffer.take(size.into()).ok_or(Error::TruncatedBuffer)?;
                // the top two bits are clear so this is at most 63
                let label = Label::try_from(os).map_err(|_| Error::InvalidLabel { octet: size })?;
                labels.push(label);
            } else if size & POINTER_MASK == POINTER_MASK {
                let hi = size & !POINTER_MASK;
                let lo = buffer.next_u8().ok_or(Error::TruncatedBuffer)?;
                let offset = usize::from(u16::from_be_bytes([hi, lo]));

                // pointer must be to an earlier record (not merely a
                // different one: an earlier one: RFC 1035 section
                // 4.1.4)
                if offset >= start || depth >= POINTER_DEPTH_LIMIT {
                    return Err(Error::InvalidPointer { offset });
                }

                let other = DomainName::deserialise_at_depth(&mut buffer.at_offset(offset), depth + 1)?;
                if len + other.encoded_len() > DOMAINNAME_MAX_LEN {
                    return Err(Error::NameTooLong);
                }
                labels.extend_from_slice(other.labels());
                break;
            } else {
                return Err(Error::InvalidLabel { octet: size });
            }
        }

        DomainName::from_labels(labels).map_err(|_| Error::NameTooLong)
    }
}

impl RecordType {
    /// # Errors
    ///
    /// If the record type is too short.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let value = buffer.next_u16().ok_or(Error::TruncatedBuffer)?;
        Ok(Self::from(value))
    }
}

impl RecordClass {
    /// # Errors
    ///
    /// If the record class is too short.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, Error> {
        let value = buffer.next_u16().ok_or(Error::TruncatedBuffer)?;
        Ok(Self::from(value))
    }
}

/// Errors encountered when parsing a datagram.  No partially decoded
/// message is returned alongside an error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum Error {
    /// The datagram ends in the middle of a field.
    #[error("message ended unexpectedly")]
    TruncatedBuffer,

    /// A compression pointer does not point strictly before the name
    /// containing it, or the chain of pointers is too long.
    #[error("invalid compression pointer to offset {offset}")]
    InvalidPointer { offset: usize },

    /// A length octet starts with `01` or `10`.
    #[error("invalid label length octet {octet:#04x}")]
    InvalidLabel { octet: u8 },

    /// A domain is over 255 octets in size.
    #[error("domain name is longer than 255 octets")]
    NameTooLong,

    /// The RDATA is the wrong size for the record type.
    #[error("invalid RDATA length for {rtype} record: expected {expected}, got {actual}")]
    InvalidLength {
        rtype: RecordType,
        expected: usize,
        actual: usize,
    },
}

/// A buffer which will be consumed by the parsing process.
pub struct ConsumableBuffer<'a> {
    octets: &'a [u8],
    position: usize,
}

impl<'a> ConsumableBuffer<'a> {
    pub fn new(octets: &'a [u8]) -> Self {
        Self {
            octets,
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.octets.len().saturating_sub(self.position)
    }

    pub fn next_u8(&mut self) -> Option<u8> {
        let octets = self.take(1)?;
        Some(octets[0])
    }

    pub fn next_u16(&mut self) -> Option<u16> {
        let octets = self.take(2)?;
        Some(u16::from_be_bytes([octets[0], octets[1]]))
    }

    pub fn next_u32(&mut self) -> Option<u32> {
        let octets = self.take(4)?;
        Some(u32::from_be_bytes([
            octets[0], octets[1], octets[2], octets[3],
        ]))
    }

    pub fn take(&mut self, size: usize) -> Option<&'a [u8]> {
        if self.remaining() >= size {
            let slice = &self.octets[self.position..self.position + size];
            self.position += size;
            Some(slice)
        } else {
            None
        }
    }

    /// A new buffer over the same octets, starting at `position` (or
    /// at the end, if `position` is past it).  Consuming from it does
    /// not move this one.
    pub fn at_offset(&self, position: usize) -> ConsumableBuffer<'a> {
        Self {
            octets: self.octets,
            position: position.min(self.octets.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::serialise::WritableBuffer;
    use crate::protocol::types::test_util::*;

    #[rustfmt::skip]
    const EXAMPLE_COM_RESPONSE: [u8; 45] = [
        // HEADER
        0x12, 0x34, // ID
        0b1000_0001, 0b1000_0000, // QR, RD, RA
        0, 1, 0, 1, 0, 0, 0, 0, // counts
        // QUESTION
        7, 101, 120, 97, 109, 112, 108, 101, // "example"
        3, 99, 111, 109, 0, // "com"
        0, 1, // A
        0, 1, // IN
        // ANSWER
        0b1100_0000, 12, // pointer to the question name
        0, 1, // A
        0, 1, // IN
        0, 0, 0x0e, 0x10, // TTL 3600
        0, 4, // RDLENGTH
        93, 184, 216, 34, // RDATA
    ];

    #[test]
    #[rustfmt::skip]
    fn test_query() {
        let octets = [
            0xab, 0xcd, // ID
            0b0000_0001, 0, // RD
            0, 1, 0, 0, 0, 0, 0, 0, // counts
            7, 101, 120, 97, 109, 112, 108, 101, // "example"
            3, 99, 111, 109, 0, // "com"
            0, 1, // A
            0, 1, // IN
        ];

        let message = Message::from_octets(&octets).unwrap();

        assert_eq!(0xabcd, message.header.id);
        assert!(!message.header.is_response);
        assert!(message.header.recursion_desired);
        assert_eq!(
            vec![Question {
                name: domain("example.com."),
                qtype: RecordType::A,
                qclass: RecordClass::IN,
            }],
            message.questions
        );
        assert!(message.answers.is_empty());
    }

    #[test]
    fn test_response_with_pointer() {
        let message = Message::from_octets(&EXAMPLE_COM_RESPONSE).unwrap();

        assert!(message.header.is_response);
        assert!(message.header.recursion_available);
        assert_eq!(1, message.header.ancount);

        let mut expected = a_record("example.com.", Ipv4Addr::new(93, 184, 216, 34));
        expected.ttl = 3600;
        assert_eq!(vec![expected], message.answers);
        assert_eq!(
            "93.184.216.34",
            message.answers[0].rtype_with_data.to_string()
        );
    }

    #[test]
    #[rustfmt::skip]
    fn test_compression_is_transparent() {
        let uncompressed = [
            0x12, 0x34,
            0b1000_0001, 0b1000_0000,
            0, 1, 0, 1, 0, 0, 0, 0,
            7, 101, 120, 97, 109, 112, 108, 101,
            3, 99, 111, 109, 0,
            0, 1,
            0, 1,
            // the answer name spelled out
            7, 101, 120, 97, 109, 112, 108, 101,
            3, 99, 111, 109, 0,
            0, 1,
            0, 1,
            0, 0, 0x0e, 0x10,
            0, 4,
            93, 184, 216, 34,
        ];

        assert_eq!(
            Message::from_octets(&uncompressed),
            Message::from_octets(&EXAMPLE_COM_RESPONSE)
        );
    }

    #[test]
    #[rustfmt::skip]
    fn test_mx_answer() {
        let octets = [
            0, 7,
            0b1000_0000, 0,
            0, 0, 0, 1, 0, 0, 0, 0,
            // NAME
            7, 101, 120, 97, 109, 112, 108, 101, // "example"
            3, 99, 111, 109, 0, // "com"
            0, 15, // MX
            0, 1, // IN
            0, 0, 1, 44, // TTL 300
            0, 9, // RDLENGTH
            0, 10, // preference
            4, 109, 97, 105, 108, // "mail"
            0b1100_0000, 12, // pointer to "example.com"
        ];

        let message = Message::from_octets(&octets).unwrap();

        assert_eq!(
            vec![mx_record("example.com.", 10, "mail.example.com.")],
            message.answers
        );
    }

    #[test]
    #[rustfmt::skip]
    fn test_header_flags() {
        let octets = [
            0, 0,
            0b0001_0100, // OPCODE 2, AA
            0b0000_0011, // RCODE 3
            0, 0, 0, 0, 0, 0, 0, 0,
        ];

        let header = Message::from_octets(&octets).unwrap().header;

        assert_eq!(Opcode::Status, header.opcode);
        assert!(header.is_authoritative);
        assert_eq!(Rcode::NameError, header.rcode);
        assert!(!header.is_response);
        assert!(!header.is_truncated);
        assert!(!header.recursion_desired);
        assert!(!header.recursion_available);
        assert_eq!(0, header.z);
    }

    #[test]
    fn test_unknown_codes() {
        let mut octets = vec![0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0];
        octets.extend_from_slice(&[0, 0, 99, 0, 9]);
        octets.extend_from_slice(&[0, 0, 0, 0, 0, 3, 1, 2, 3]);

        let rr = &Message::from_octets(&octets).unwrap().answers[0];

        assert_eq!(RecordType::from(99), rr.rtype_with_data.rtype());
        assert_eq!(RecordClass::from(9), rr.rclass);
        assert_eq!(
            RecordTypeWithData::Unknown {
                tag: match RecordType::from(99) {
                    RecordType::Unknown(tag) => tag,
                    _ => unreachable!(),
                },
                octets: Bytes::from_static(&[1, 2, 3]),
            },
            rr.rtype_with_data
        );
    }

    #[test]
    fn test_truncated_anywhere() {
        for len in 0..EXAMPLE_COM_RESPONSE.len() {
            assert_eq!(
                Err(Error::TruncatedBuffer),
                Message::from_octets(&EXAMPLE_COM_RESPONSE[..len]),
                "prefix of length {len}"
            );
        }
    }

    #[test]
    fn test_truncated_anywhere_with_name_rdata() {
        let mut response = Message::from_question(
            9,
            Question {
                name: domain("example.com."),
                qtype: RecordType::MX,
                qclass: RecordClass::IN,
            },
        )
        .make_response();
        response.answers = vec![mx_record("example.com.", 10, "mail.example.com.")];
        response.authority = vec![ns_record("example.com.", "ns1.example.com.")];
        response.additional = vec![cname_record("www.example.com.", "example.com.")];
        let octets = response.to_octets().unwrap();

        for len in 0..octets.len() {
            assert_eq!(
                Err(Error::TruncatedBuffer),
                Message::from_octets(&octets[..len]),
                "prefix of length {len}"
            );
        }
    }

    #[test]
    #[rustfmt::skip]
    fn test_huge_counts_in_tiny_message() {
        let octets = [
            0, 0, // ID
            0b1000_0001, 0b1000_0000, // flags
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // counts
        ];

        assert_eq!(Err(Error::TruncatedBuffer), Message::from_octets(&octets));
    }

    #[test]
    fn test_section_capacity_is_bounded_by_buffer() {
        assert_eq!(0, section_capacity(u16::MAX, 0, 5));
        assert_eq!(2, section_capacity(u16::MAX, 23, 11));
        assert_eq!(3, section_capacity(3, 500, 5));
    }

    #[test]
    fn test_at_offset_past_end() {
        let buffer = ConsumableBuffer::new(&[1, 2, 3]);
        let mut past = buffer.at_offset(10);

        assert_eq!(0, past.remaining());
        assert_eq!(Some(&[][..]), past.take(0));
        assert_eq!(None, past.next_u8());
    }

    #[test]
    fn test_pointer_to_self() {
        let octets = [0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0b1100_0000, 12, 0, 1, 0, 1];

        assert_eq!(
            Err(Error::InvalidPointer { offset: 12 }),
            Message::from_octets(&octets)
        );
    }

    #[test]
    fn test_pointer_forwards() {
        let octets = [
            0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0b1100_0000, 14, 0, 0, 1, 0, 1,
        ];

        assert_eq!(
            Err(Error::InvalidPointer { offset: 14 }),
            Message::from_octets(&octets)
        );
    }

    #[test]
    fn test_pointer_outside_buffer() {
        let octets = [
            0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0b1111_1111, 0b1111_1111, 0, 1, 0, 1,
        ];

        assert_eq!(
            Err(Error::InvalidPointer { offset: 0x3fff }),
            Message::from_octets(&octets)
        );
    }

    #[test]
    fn test_pointer_chain_depth() {
        // a root name at offset 0, then each pointer refers to the one
        // before it
        fn chain(pointers: usize) -> Vec<u8> {
            let mut octets = vec![0];
            for i in 0..pointers {
                let target = if i == 0 { 0 } else { 2 * i - 1 };
                octets.push(0b1100_0000);
                octets.push(u8::try_from(target).unwrap());
            }
            octets
        }

        let octets = chain(POINTER_DEPTH_LIMIT);
        let mut buffer = ConsumableBuffer::new(&octets).at_offset(octets.len() - 2);
        assert_eq!(
            Ok(DomainName::root_domain()),
            DomainName::deserialise(&mut buffer)
        );

        let octets = chain(POINTER_DEPTH_LIMIT + 1);
        let mut buffer = ConsumableBuffer::new(&octets).at_offset(octets.len() - 2);
        assert!(matches!(
            DomainName::deserialise(&mut buffer),
            Err(Error::InvalidPointer { .. })
        ));
    }

    #[test]
    fn test_invalid_label_prefixes() {
        for octet in [0b0100_0000, 0b1000_0000, 0b1011_1111] {
            let octets = [octet, 0];
            assert_eq!(
                Err(Error::InvalidLabel { octet }),
                DomainName::deserialise(&mut ConsumableBuffer::new(&octets))
            );
        }
    }

    #[test]
    fn test_name_too_long() {
        let mut octets = Vec::new();
        for _ in 0..4 {
            octets.push(63);
            octets.extend_from_slice(&[b'a'; 63]);
        }
        octets.push(0);

        assert_eq!(
            Err(Error::NameTooLong),
            DomainName::deserialise(&mut ConsumableBuffer::new(&octets))
        );
    }

    #[test]
    fn test_name_too_long_through_pointer() {
        // 3 * 64 + 1 = 193 octets at offset 0
        let mut octets = Vec::new();
        for _ in 0..3 {
            octets.push(63);
            octets.extend_from_slice(&[b'a'; 63]);
        }
        octets.push(0);
        let start = octets.len();
        // then 64 more octets followed by a pointer
        octets.push(63);
        octets.extend_from_slice(&[b'b'; 63]);
        octets.extend_from_slice(&[0b1100_0000, 0]);

        let mut buffer = ConsumableBuffer::new(&octets).at_offset(start);
        assert_eq!(Err(Error::NameTooLong), DomainName::deserialise(&mut buffer));
    }

    #[test]
    fn test_label_runs_off_end() {
        let octets = [5, b'a', b'b'];

        assert_eq!(
            Err(Error::TruncatedBuffer),
            DomainName::deserialise(&mut ConsumableBuffer::new(&octets))
        );
    }

    #[test]
    fn test_a_wrong_rdlength() {
        let mut octets = EXAMPLE_COM_RESPONSE.to_vec();
        octets[40] = 5;
        octets.push(0);

        assert_eq!(
            Err(Error::InvalidLength {
                rtype: RecordType::A,
                expected: 4,
                actual: 5,
            }),
            Message::from_octets(&octets)
        );
    }

    #[test]
    fn test_rdata_not_fully_consumed() {
        let mut buf = WritableBuffer::default();
        cname_record("www.example.com.", "example.com.")
            .serialise(&mut buf)
            .unwrap();
        // the RDLENGTH is after the 17 octet name and 8 octets of
        // type, class, and TTL
        buf.octets[26] += 2;
        buf.write_octets(&[0, 0]);

        assert_eq!(
            Err(Error::InvalidLength {
                rtype: RecordType::CNAME,
                expected: 15,
                actual: 13,
            }),
            ResourceRecord::deserialise(&mut ConsumableBuffer::new(&buf.octets))
        );
    }

    #[test]
    fn test_rdata_shorter_than_rdlength() {
        let mut octets = EXAMPLE_COM_RESPONSE.to_vec();
        octets[40] = 10;

        assert_eq!(Err(Error::TruncatedBuffer), Message::from_octets(&octets));
    }

    #[test]
    fn test_decoded_name_preserves_case() {
        let octets = [3, b'W', b'w', b'W', 0];

        assert_eq!(
            Ok("WwW.".to_string()),
            DomainName::deserialise(&mut ConsumableBuffer::new(&octets)).map(|d| d.to_string())
        );
    }

    #[test]
    fn roundtrip_arbitrary_messages() {
        for _ in 0..100 {
            let original: Message = arbitrary_value();

            let mut buf = WritableBuffer::default();
            original.serialise(&mut buf).unwrap();

            assert_eq!(Ok(original), Message::from_octets(&buf.octets));
        }
    }

    #[test]
    fn roundtrip_a_full_response() {
        let mut original = Message::from_question(
            77,
            Question {
                name: domain("example.com."),
                qtype: RecordType::MX,
                qclass: RecordClass::IN,
            },
        )
        .make_response();
        original.header.is_authoritative = true;
        original.header.ancount = 2;
        original.header.nscount = 1;
        original.header.arcount = 2;
        original.answers = vec![
            mx_record("example.com.", 10, "mail.example.com."),
            mx_record("example.com.", 20, "backup.example.com."),
        ];
        original.authority = vec![ns_record("example.com.", "ns1.example.com.")];
        original.additional = vec![
            a_record("mail.example.com.", Ipv4Addr::new(10, 0, 0, 1)),
            aaaa_record("mail.example.com.", Ipv6Addr::LOCALHOST),
        ];

        let octets = original.to_octets().unwrap();

        assert_eq!(Ok(original), Message::from_octets(&octets));
    }
}
