use bytes::Bytes;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Longest a name can be on the wire: one length octet per label plus
/// the label octets, root label included.
pub const DOMAINNAME_MAX_LEN: usize = 255;

/// Longest a single label can be.
pub const LABEL_MAX_LEN: usize = 63;

/// Largest message which fits in a plain UDP datagram (RFC 1035
/// section 4.2.1).
pub const MESSAGE_MAX_LEN: usize = 512;

/// Size of the fixed header.
pub const HEADER_LEN: usize = 12;

/// How many compression pointers may be chased for one name.
pub const POINTER_DEPTH_LIMIT: usize = 20;

/// QR, in the first flags octet: set in responses.
pub const HEADER_MASK_QR: u8 = 0b1000_0000;

/// OPCODE, the 4 bits after QR.
pub const HEADER_MASK_OPCODE: u8 = 0b0111_1000;

/// Shift to move an opcode into place under `HEADER_MASK_OPCODE`.
pub const HEADER_OFFSET_OPCODE: usize = 3;

/// AA, in the first flags octet.
pub const HEADER_MASK_AA: u8 = 0b0000_0100;

/// TC, in the first flags octet.
pub const HEADER_MASK_TC: u8 = 0b0000_0010;

/// RD, the lowest bit of the first flags octet.
pub const HEADER_MASK_RD: u8 = 0b0000_0001;

/// RA, the highest bit of the second flags octet.
pub const HEADER_MASK_RA: u8 = 0b1000_0000;

/// Z, the 3 reserved bits after RA.
pub const HEADER_MASK_Z: u8 = 0b0111_0000;

/// Shift to move a Z value into place under `HEADER_MASK_Z`.
pub const HEADER_OFFSET_Z: usize = 4;

/// RCODE, the low 4 bits of the second flags octet.
pub const HEADER_MASK_RCODE: u8 = 0b0000_1111;

/// RCODE sits in the low bits, so needs no shift.
pub const HEADER_OFFSET_RCODE: usize = 0;

/// The top two bits of a length octet which mark a compression
/// pointer.
pub const POINTER_MASK: u8 = 0b1100_0000;

/// A whole message: a header, then the question section, then three
/// sections of resource records.  Queries and responses share the
/// format (RFC 1035 section 4.1).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    /// A standard query for a single question.  The section counts
    /// are set to match.
    pub fn from_question(id: u16, question: Question) -> Self {
        Self {
            header: Header {
                id,
                is_response: false,
                opcode: Opcode::Standard,
                is_authoritative: false,
                is_truncated: false,
                recursion_desired: false,
                recursion_available: false,
                z: 0,
                rcode: Rcode::NoError,
                qdcount: 1,
                ancount: 0,
                nscount: 0,
                arcount: 0,
            },
            questions: vec![question],
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Like `from_question`, but with a fresh random ID.
    pub fn query(question: Question, recursion_desired: bool) -> Self {
        let mut message = Self::from_question(rand::random(), question);
        message.header.recursion_desired = recursion_desired;
        message
    }

    /// An empty `NOERROR` response to this message, echoing its ID,
    /// opcode, RD flag, and questions.
    pub fn make_response(&self) -> Self {
        Self {
            header: Header {
                id: self.header.id,
                is_response: true,
                opcode: self.header.opcode,
                is_authoritative: false,
                is_truncated: false,
                recursion_desired: self.header.recursion_desired,
                recursion_available: true,
                z: 0,
                rcode: Rcode::NoError,
                qdcount: self.header.qdcount,
                ancount: 0,
                nscount: 0,
                arcount: 0,
            },
            questions: self.questions.clone(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }
}

/// In the style of `dig`.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.header)?;

        if !self.questions.is_empty() {
            writeln!(f, "\n;; QUESTION SECTION:")?;
            for question in &self.questions {
                writeln!(f, ";{question}")?;
            }
        }

        for (heading, rrs) in [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authority),
            ("ADDITIONAL", &self.additional),
        ] {
            if rrs.is_empty() {
                continue;
            }
            writeln!(f, "\n;; {heading} SECTION:")?;
            for rr in rrs {
                writeln!(f, "{rr}")?;
            }
        }

        Ok(())
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Message {
    // the counts in the header have to agree with the sections
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let mut header: Header = u.arbitrary()?;
        let questions: Vec<Question> = arbitrary_section(u)?;
        let answers: Vec<ResourceRecord> = arbitrary_section(u)?;
        let authority: Vec<ResourceRecord> = arbitrary_section(u)?;
        let additional: Vec<ResourceRecord> = arbitrary_section(u)?;

        header.qdcount = questions.len().try_into().unwrap_or(u16::MAX);
        header.ancount = answers.len().try_into().unwrap_or(u16::MAX);
        header.nscount = authority.len().try_into().unwrap_or(u16::MAX);
        header.arcount = additional.len().try_into().unwrap_or(u16::MAX);

        Ok(Self {
            header,
            questions,
            answers,
            authority,
            additional,
        })
    }
}

#[cfg(any(feature = "test-util", test))]
fn arbitrary_section<'a, T: arbitrary::Arbitrary<'a>>(
    u: &mut arbitrary::Unstructured<'a>,
) -> arbitrary::Result<Vec<T>> {
    let len = u.int_in_range::<usize>(0..=3)?;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(u.arbitrary()?);
    }
    Ok(out)
}

/// The fixed 12 octet header (RFC 1035 section 4.1.1):
///
/// ```text
///     octets 0-1   ID
///     octet  2     QR(1) OPCODE(4) AA(1) TC(1) RD(1)
///     octet  3     RA(1) Z(3) RCODE(4)
///     octets 4-11  QDCOUNT ANCOUNT NSCOUNT ARCOUNT
/// ```
///
/// The counts are what was read off the wire.  When a `Message` is
/// serialised they are recomputed from its sections.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Header {
    /// Chosen by whoever sends the query, and echoed back in the
    /// response so the two can be paired up.
    pub id: u16,

    /// QR: clear in queries, set in responses.
    pub is_response: bool,

    pub opcode: Opcode,

    /// AA: the responding server is an authority for the queried
    /// name.
    pub is_authoritative: bool,

    /// TC: the message was cut short to fit the transport.
    pub is_truncated: bool,

    /// RD: the querier wants the server to recurse.  Copied into the
    /// response.
    pub recursion_desired: bool,

    /// RA: the server is willing to recurse.
    pub recursion_available: bool,

    /// Reserved.  Only the low 3 bits are significant.
    pub z: u8,

    pub rcode: Rcode,

    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {}, status: {}, id: {}",
            self.opcode, self.rcode, self.id
        )?;

        write!(f, ";; flags:")?;
        for (set, flag) in [
            (self.is_response, "qr"),
            (self.is_authoritative, "aa"),
            (self.is_truncated, "tc"),
            (self.recursion_desired, "rd"),
            (self.recursion_available, "ra"),
        ] {
            if set {
                write!(f, " {flag}")?;
            }
        }
        write!(
            f,
            "; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            self.qdcount, self.ancount, self.nscount, self.arcount
        )
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Header {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self {
            id: u.arbitrary()?,
            is_response: u.arbitrary()?,
            opcode: u.arbitrary()?,
            is_authoritative: u.arbitrary()?,
            is_truncated: u.arbitrary()?,
            recursion_desired: u.arbitrary()?,
            recursion_available: u.arbitrary()?,
            z: u.int_in_range(0..=7)?,
            rcode: u.arbitrary()?,
            qdcount: u.arbitrary()?,
            ancount: u.arbitrary()?,
            nscount: u.arbitrary()?,
            arcount: u.arbitrary()?,
        })
    }
}

/// One entry of the question section: a name followed by a 16 bit
/// type and a 16 bit class (RFC 1035 section 4.1.2).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Question {
    pub name: DomainName,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t\t{}\t{}", self.name, self.qclass, self.qtype)
    }
}

/// One entry of the answer, authority, or additional section (RFC
/// 1035 section 4.1.3).  On the wire:
///
/// ```text
///     NAME      owner name, possibly compressed
///     TYPE      16 bits
///     CLASS     16 bits
///     TTL       32 bits, seconds
///     RDLENGTH  16 bits
///     RDATA     RDLENGTH octets, format depends on TYPE
/// ```
///
/// TYPE and RDATA are kept together in `rtype_with_data`, and
/// RDLENGTH is implied by the RDATA.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct ResourceRecord {
    pub name: DomainName,
    pub rtype_with_data: RecordTypeWithData,
    pub rclass: RecordClass,

    /// How long, in seconds, the record may be cached for.
    pub ttl: u32,
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name,
            self.ttl,
            self.rclass,
            self.rtype_with_data.rtype(),
            self.rtype_with_data
        )
    }
}

/// The RDATA of a record, decoded according to its type.  Names
/// inside RDATA have had any compression pointers expanded.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecordTypeWithData {
    /// Exactly 4 octets.
    A { address: Ipv4Addr },

    /// An authoritative nameserver for the owner name.
    NS { nsdname: DomainName },

    /// The owner name is an alias for `cname`.
    CNAME { cname: DomainName },

    /// Start of a zone of authority: the primary nameserver, the
    /// responsible mailbox, and five 32 bit counters and timers.
    SOA {
        mname: DomainName,
        rname: DomainName,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },

    PTR { ptrdname: DomainName },

    /// A mail exchange for the owner name.  Lower `preference` wins.
    MX {
        preference: u16,
        exchange: DomainName,
    },

    /// One or more length-prefixed character strings, kept as they
    /// were on the wire.
    TXT { octets: Bytes },

    /// Exactly 16 octets.
    AAAA { address: Ipv6Addr },

    /// Anything else, uninterpreted.
    Unknown {
        tag: RecordTypeUnknown,
        octets: Bytes,
    },
}

impl RecordTypeWithData {
    pub fn rtype(&self) -> RecordType {
        match self {
            RecordTypeWithData::A { .. } => RecordType::A,
            RecordTypeWithData::NS { .. } => RecordType::NS,
            RecordTypeWithData::CNAME { .. } => RecordType::CNAME,
            RecordTypeWithData::SOA { .. } => RecordType::SOA,
            RecordTypeWithData::PTR { .. } => RecordType::PTR,
            RecordTypeWithData::MX { .. } => RecordType::MX,
            RecordTypeWithData::TXT { .. } => RecordType::TXT,
            RecordTypeWithData::AAAA { .. } => RecordType::AAAA,
            RecordTypeWithData::Unknown { tag, .. } => RecordType::Unknown(*tag),
        }
    }
}

/// Presentation format of the RDATA, as in a zone file.
impl fmt::Display for RecordTypeWithData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordTypeWithData::A { address } => write!(f, "{address}"),
            RecordTypeWithData::NS { nsdname } => write!(f, "{nsdname}"),
            RecordTypeWithData::CNAME { cname } => write!(f, "{cname}"),
            RecordTypeWithData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}"
            ),
            RecordTypeWithData::PTR { ptrdname } => write!(f, "{ptrdname}"),
            RecordTypeWithData::MX {
                preference,
                exchange,
            } => write!(f, "{preference} {exchange}"),
            RecordTypeWithData::TXT { octets } => match character_strings(octets) {
                Some(strings) => {
                    let mut first = true;
                    for string in strings {
                        if first {
                            first = false;
                        } else {
                            write!(f, " ")?;
                        }
                        write_character_string(f, string)?;
                    }
                    Ok(())
                }
                None => write_generic_rdata(f, octets),
            },
            RecordTypeWithData::AAAA { address } => write!(f, "{address}"),
            RecordTypeWithData::Unknown { octets, .. } => write_generic_rdata(f, octets),
        }
    }
}

/// Split TXT RDATA into its character strings, or `None` if a length
/// octet overruns the data.
fn character_strings(octets: &[u8]) -> Option<Vec<&[u8]>> {
    let mut strings = Vec::new();
    let mut rest = octets;
    while let Some((len, tail)) = rest.split_first() {
        let len = usize::from(*len);
        if tail.len() < len {
            return None;
        }
        strings.push(&tail[..len]);
        rest = &tail[len..];
    }
    Some(strings)
}

fn write_character_string(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    write!(f, "\"")?;
    for octet in octets {
        match octet {
            b'"' | b'\\' => write!(f, "\\{}", *octet as char)?,
            0x20..=0x7e => write!(f, "{}", *octet as char)?,
            _ => write!(f, "\\{octet:03}")?,
        }
    }
    write!(f, "\"")
}

/// The RFC 3597 form for data of an unknown type.
fn write_generic_rdata(f: &mut fmt::Formatter, octets: &[u8]) -> fmt::Result {
    write!(f, "\\# {}", octets.len())?;
    if !octets.is_empty() {
        write!(f, " ")?;
        for octet in octets {
            write!(f, "{octet:02x}")?;
        }
    }
    Ok(())
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for RecordTypeWithData {
    // this is pretty verbose but it feels like a better way to guarantee the
    // max size of the `Bytes`s than adding a wrapper type
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let len = u.int_in_range(0..=64)?;
        let octets = Bytes::copy_from_slice(u.bytes(len)?);

        let rtype_with_data = match u.arbitrary::<RecordType>()? {
            RecordType::A => RecordTypeWithData::A {
                address: u.arbitrary()?,
            },
            RecordType::NS => RecordTypeWithData::NS {
                nsdname: u.arbitrary()?,
            },
            RecordType::CNAME => RecordTypeWithData::CNAME {
                cname: u.arbitrary()?,
            },
            RecordType::SOA => RecordTypeWithData::SOA {
                mname: u.arbitrary()?,
                rname: u.arbitrary()?,
                serial: u.arbitrary()?,
                refresh: u.arbitrary()?,
                retry: u.arbitrary()?,
                expire: u.arbitrary()?,
                minimum: u.arbitrary()?,
            },
            RecordType::PTR => RecordTypeWithData::PTR {
                ptrdname: u.arbitrary()?,
            },
            RecordType::MX => RecordTypeWithData::MX {
                preference: u.arbitrary()?,
                exchange: u.arbitrary()?,
            },
            RecordType::TXT => RecordTypeWithData::TXT { octets },
            RecordType::AAAA => RecordTypeWithData::AAAA {
                address: u.arbitrary()?,
            },
            RecordType::Unknown(tag) => RecordTypeWithData::Unknown { tag, octets },
        };
        Ok(rtype_with_data)
    }
}

/// What sort of query this is.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Opcode {
    Standard,
    Inverse,
    Status,
    Reserved(OpcodeReserved),
}

/// An opcode with no assigned meaning.  Only `Opcode::from` makes
/// these, so the value always fits in 4 bits.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OpcodeReserved(u8);

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::Standard => write!(f, "QUERY"),
            Opcode::Inverse => write!(f, "IQUERY"),
            Opcode::Status => write!(f, "STATUS"),
            Opcode::Reserved(OpcodeReserved(n)) => write!(f, "RESERVED{n}"),
        }
    }
}

impl From<u8> for Opcode {
    fn from(octet: u8) -> Self {
        match octet & 0b0000_1111 {
            0 => Opcode::Standard,
            1 => Opcode::Inverse,
            2 => Opcode::Status,
            other => Opcode::Reserved(OpcodeReserved(other)),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(value: Opcode) -> Self {
        match value {
            Opcode::Standard => 0,
            Opcode::Inverse => 1,
            Opcode::Status => 2,
            Opcode::Reserved(OpcodeReserved(octet)) => octet,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Opcode {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u8>()?))
    }
}

/// What sort of response this is.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Rcode {
    NoError,
    FormatError,
    ServerFailure,
    NameError,
    NotImplemented,
    Refused,
    Reserved(RcodeReserved),
}

/// Like `OpcodeReserved`, but for response codes 6 to 15.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RcodeReserved(u8);

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rcode::NoError => write!(f, "NOERROR"),
            Rcode::FormatError => write!(f, "FORMERR"),
            Rcode::ServerFailure => write!(f, "SERVFAIL"),
            Rcode::NameError => write!(f, "NXDOMAIN"),
            Rcode::NotImplemented => write!(f, "NOTIMP"),
            Rcode::Refused => write!(f, "REFUSED"),
            Rcode::Reserved(RcodeReserved(n)) => write!(f, "RESERVED{n}"),
        }
    }
}

impl From<u8> for Rcode {
    fn from(octet: u8) -> Self {
        match octet & 0b0000_1111 {
            0 => Rcode::NoError,
            1 => Rcode::FormatError,
            2 => Rcode::ServerFailure,
            3 => Rcode::NameError,
            4 => Rcode::NotImplemented,
            5 => Rcode::Refused,
            other => Rcode::Reserved(RcodeReserved(other)),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(value: Rcode) -> Self {
        match value {
            Rcode::NoError => 0,
            Rcode::FormatError => 1,
            Rcode::ServerFailure => 2,
            Rcode::NameError => 3,
            Rcode::NotImplemented => 4,
            Rcode::Refused => 5,
            Rcode::Reserved(RcodeReserved(octet)) => octet,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Rcode {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u8>()?))
    }
}

/// A fully qualified name, stored as its labels with the empty root
/// label last.  At most 255 octets in wire form.  Case is kept as
/// given and counts for equality.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DomainName {
    labels: Vec<Label>,
    // INVARIANT: len == len(labels) + sum(map(len, labels))
    len: usize,
}

impl DomainName {
    pub fn root_domain() -> Self {
        DomainName {
            labels: vec![Label::new()],
            len: 1,
        }
    }

    pub fn is_root(&self) -> bool {
        self.len == 1 && self.labels[0].is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Size of the name on the wire, uncompressed.
    pub fn encoded_len(&self) -> usize {
        self.len
    }

    /// Every label followed by a `.`, or just `.` for the root.  In
    /// labels, `.` and `\\` are backslash-escaped and octets which are
    /// not printable ASCII are written as `\DDD` (RFC 1035 section
    /// 5.1).
    pub fn to_dotted_string(&self) -> String {
        if self.is_root() {
            return ".".to_string();
        }

        let mut out = String::with_capacity(self.len);
        for label in &self.labels {
            if label.is_empty() {
                break;
            }
            for &octet in label.octets().iter() {
                match octet {
                    b'.' | b'\\' => {
                        out.push('\\');
                        out.push(char::from(octet));
                    }
                    0x21..=0x7e => out.push(char::from(octet)),
                    _ => out.push_str(&format!("\\{octet:03}")),
                }
            }
            out.push('.');
        }

        out
    }

    /// Parse a name, undoing the escapes `to_dotted_string` writes.
    /// The trailing `.` is optional: `"example.com"` and
    /// `"example.com."` are the same name.
    ///
    /// # Errors
    ///
    /// If a label is empty or too long, an escape is malformed, or the
    /// name is too long.
    pub fn from_dotted_string(s: &str) -> Result<Self, NameError> {
        if s == "." {
            return Ok(Self::root_domain());
        }

        let mut raw_labels = split_escaped_labels(s)?;
        if raw_labels.len() > 1 && raw_labels.last().is_some_and(Vec::is_empty) {
            raw_labels.pop();
        }

        let mut labels = Vec::with_capacity(raw_labels.len() + 1);
        for octets in raw_labels {
            if octets.is_empty() {
                return Err(NameError::EmptyLabel);
            }
            labels.push(Label::try_from(&octets[..])?);
        }

        Self::from_labels(labels)
    }

    /// Build a name from its labels.  The root label is added if it
    /// is missing.
    ///
    /// # Errors
    ///
    /// If there is an empty label before the end, or the name is too
    /// long.
    pub fn from_labels(mut labels: Vec<Label>) -> Result<Self, NameError> {
        if !labels.last().is_some_and(|label| label.is_empty()) {
            labels.push(Label::new());
        }

        let last = labels.len() - 1;
        let mut len = labels.len();
        for (i, label) in labels.iter().enumerate() {
            if label.is_empty() && i != last {
                return Err(NameError::EmptyLabel);
            }
            len += usize::from(label.len());
        }

        if len <= DOMAINNAME_MAX_LEN {
            Ok(Self { labels, len })
        } else {
            Err(NameError::NameTooLong { len })
        }
    }
}

/// Split on unescaped `.`s, resolving `\X` and `\DDD` escapes.
fn split_escaped_labels(s: &str) -> Result<Vec<Vec<u8>>, NameError> {
    let mut labels = Vec::new();
    let mut current = Vec::new();
    let mut octets = s.bytes();

    while let Some(octet) = octets.next() {
        match octet {
            b'.' => labels.push(std::mem::take(&mut current)),
            b'\\' => current.push(unescape(&mut octets)?),
            _ => current.push(octet),
        }
    }
    labels.push(current);

    Ok(labels)
}

/// The octet named by an escape, with the leading `\` already
/// consumed.
fn unescape(octets: &mut impl Iterator<Item = u8>) -> Result<u8, NameError> {
    let first = octets.next().ok_or(NameError::InvalidEscape)?;
    if !first.is_ascii_digit() {
        return Ok(first);
    }

    let mut value = u16::from(first - b'0');
    for _ in 0..2 {
        match octets.next() {
            Some(digit) if digit.is_ascii_digit() => value = value * 10 + u16::from(digit - b'0'),
            _ => return Err(NameError::InvalidEscape),
        }
    }
    u8::try_from(value).map_err(|_| NameError::InvalidEscape)
}

impl fmt::Debug for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainName")
            .field("to_dotted_string()", &self.to_dotted_string())
            .finish()
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", &self.to_dotted_string())
    }
}

impl FromStr for DomainName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DomainName::from_dotted_string(s)
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for DomainName {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_labels = u.int_in_range::<usize>(0..=10)?;
        let mut labels = Vec::with_capacity(num_labels + 1);
        for _ in 0..num_labels {
            labels.push(u.arbitrary()?);
        }
        // at most 10 labels of at most 20 octets each, so this can't
        // be too long
        DomainName::from_labels(labels).map_err(|_| arbitrary::Error::IncorrectFormat)
    }
}

/// Errors that can arise when building a `DomainName`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum NameError {
    #[error("domain name has an empty label")]
    EmptyLabel,

    #[error("escape must be \\X or \\DDD with DDD at most 255")]
    InvalidEscape,

    #[error("label is {len} octets long, but the limit is 63")]
    LabelTooLong { len: usize },

    #[error("domain name is {len} octets long when encoded, but the limit is 255")]
    NameTooLong { len: usize },
}

/// Up to 63 arbitrary octets.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Label {
    octets: Bytes,
}

impl Label {
    /// The root label.
    pub fn new() -> Self {
        Self {
            octets: Bytes::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> u8 {
        // at most LABEL_MAX_LEN
        self.octets.len() as u8
    }

    pub fn is_empty(&self) -> bool {
        self.octets.is_empty()
    }

    pub fn octets(&self) -> &Bytes {
        &self.octets
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<&[u8]> for Label {
    type Error = NameError;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        if octets.len() > LABEL_MAX_LEN {
            return Err(NameError::LabelTooLong { len: octets.len() });
        }

        Ok(Self {
            octets: Bytes::copy_from_slice(octets),
        })
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Label {
    // only generates non-empty labels
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Label> {
        let label_len = u.int_in_range::<u8>(1..=20)?;
        let bs = u.bytes(label_len.into())?;
        let mut octets = Vec::with_capacity(bs.len());
        for b in bs {
            let ascii_byte = if b.is_ascii() { *b } else { *b % 128 };
            octets.push(
                if ascii_byte == b'.' || !ascii_byte.is_ascii_graphic() {
                    b'x'
                } else {
                    ascii_byte
                },
            );
        }
        Ok(Self {
            octets: Bytes::from(octets),
        })
    }
}

/// The record types this crate knows the RDATA layout of.  Any other
/// code is carried as `RecordType::Unknown`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecordType {
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    Unknown(RecordTypeUnknown),
}

/// A type code outside the registry.  Never holds a code which has
/// its own `RecordType` variant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordTypeUnknown(u16);

/// Wire code and mnemonic of every named `RecordType`.
const RECORD_TYPES: [(RecordType, u16, &str); 8] = [
    (RecordType::A, 1, "A"),
    (RecordType::NS, 2, "NS"),
    (RecordType::CNAME, 5, "CNAME"),
    (RecordType::SOA, 6, "SOA"),
    (RecordType::PTR, 12, "PTR"),
    (RecordType::MX, 15, "MX"),
    (RecordType::TXT, 16, "TXT"),
    (RecordType::AAAA, 28, "AAAA"),
];

impl RecordType {
    pub fn is_unknown(&self) -> bool {
        matches!(self, RecordType::Unknown(_))
    }

    fn mnemonic(self) -> Option<&'static str> {
        RECORD_TYPES
            .iter()
            .find(|(rtype, _, _)| *rtype == self)
            .map(|(_, _, mnemonic)| *mnemonic)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.mnemonic() {
            Some(mnemonic) => f.write_str(mnemonic),
            None => write!(f, "TYPE{}", u16::from(*self)),
        }
    }
}

/// Accepts the mnemonics in any case, and the RFC 3597 `TYPEnnn`
/// form.
impl FromStr for RecordType {
    type Err = RecordTypeFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if let Some((rtype, _, _)) = RECORD_TYPES.iter().find(|(_, _, m)| *m == upper) {
            return Ok(*rtype);
        }

        let code = upper
            .strip_prefix("TYPE")
            .ok_or(RecordTypeFromStr::NoParse)?;
        code.parse::<u16>()
            .map(RecordType::from)
            .map_err(|_| RecordTypeFromStr::BadType)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum RecordTypeFromStr {
    #[error("the number in TYPE<num> must fit in 16 bits")]
    BadType,
    #[error("not a known record type mnemonic")]
    NoParse,
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        RECORD_TYPES
            .iter()
            .find(|(_, code, _)| *code == value)
            .map_or(RecordType::Unknown(RecordTypeUnknown(value)), |(rtype, _, _)| {
                *rtype
            })
    }
}

impl From<RecordType> for u16 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::Unknown(RecordTypeUnknown(value)) => value,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for RecordType {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecordClass {
    IN,
    CH,
    HS,
    Unknown(RecordClassUnknown),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordClassUnknown(u16);

const RECORD_CLASSES: [(RecordClass, u16, &str); 3] = [
    (RecordClass::IN, 1, "IN"),
    (RecordClass::CH, 3, "CH"),
    (RecordClass::HS, 4, "HS"),
];

impl RecordClass {
    pub fn is_unknown(&self) -> bool {
        matches!(self, RecordClass::Unknown(_))
    }

    fn mnemonic(self) -> Option<&'static str> {
        RECORD_CLASSES
            .iter()
            .find(|(rclass, _, _)| *rclass == self)
            .map(|(_, _, mnemonic)| *mnemonic)
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.mnemonic() {
            Some(mnemonic) => f.write_str(mnemonic),
            None => write!(f, "CLASS{}", u16::from(*self)),
        }
    }
}

impl FromStr for RecordClass {
    type Err = RecordClassFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if let Some((rclass, _, _)) = RECORD_CLASSES.iter().find(|(_, _, m)| *m == upper) {
            return Ok(*rclass);
        }

        let code = upper
            .strip_prefix("CLASS")
            .ok_or(RecordClassFromStr::NoParse)?;
        code.parse::<u16>()
            .map(RecordClass::from)
            .map_err(|_| RecordClassFromStr::BadClass)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum RecordClassFromStr {
    #[error("the number in CLASS<num> must fit in 16 bits")]
    BadClass,
    #[error("not a known record class mnemonic")]
    NoParse,
}

impl From<u16> for RecordClass {
    fn from(value: u16) -> Self {
        RECORD_CLASSES
            .iter()
            .find(|(_, code, _)| *code == value)
            .map_or(RecordClass::Unknown(RecordClassUnknown(value)), |(rclass, _, _)| {
                *rclass
            })
    }
}

impl From<RecordClass> for u16 {
    fn from(value: RecordClass) -> Self {
        match value {
            RecordClass::IN => 1,
            RecordClass::CH => 3,
            RecordClass::HS => 4,
            RecordClass::Unknown(RecordClassUnknown(value)) => value,
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for RecordClass {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from(u.arbitrary::<u16>()?))
    }
}


#[cfg(any(feature = "test-util", test))]
#[allow(clippy::missing_panics_doc)]
pub mod test_util {
    use super::*;

    use arbitrary::{Arbitrary, Unstructured};
    use rand::Rng;

    /// Generate an arbitrary value from random input, trying
    /// progressively larger inputs until one is big enough.
    pub fn arbitrary_value<T: for<'a> Arbitrary<'a>>() -> T {
        let mut rng = rand::rng();
        for size in [128, 256, 512, 1024, 2048, 4096] {
            let mut buf = vec![0u8; size];
            rng.fill(&mut buf[..]);

            if let Ok(value) = T::arbitrary(&mut Unstructured::new(&buf)) {
                return value;
            }
        }

        panic!("could not generate arbitrary value!");
    }

    pub fn domain(name: &str) -> DomainName {
        DomainName::from_dotted_string(name).unwrap()
    }

    pub fn a_record(name: &str, address: Ipv4Addr) -> ResourceRecord {
        ResourceRecord {
            name: domain(name),
            rtype_with_data: RecordTypeWithData::A { address },
            rclass: RecordClass::IN,
            ttl: 300,
        }
    }

    pub fn aaaa_record(name: &str, address: Ipv6Addr) -> ResourceRecord {
        ResourceRecord {
            name: domain(name),
            rtype_with_data: RecordTypeWithData::AAAA { address },
            rclass: RecordClass::IN,
            ttl: 300,
        }
    }

    pub fn cname_record(name: &str, target_name: &str) -> ResourceRecord {
        ResourceRecord {
            name: domain(name),
            rtype_with_data: RecordTypeWithData::CNAME {
                cname: domain(target_name),
            },
            rclass: RecordClass::IN,
            ttl: 300,
        }
    }

    pub fn ns_record(superdomain_name: &str, nameserver_name: &str) -> ResourceRecord {
        ResourceRecord {
            name: domain(superdomain_name),
            rtype_with_data: RecordTypeWithData::NS {
                nsdname: domain(nameserver_name),
            },
            rclass: RecordClass::IN,
            ttl: 300,
        }
    }

    pub fn mx_record(name: &str, preference: u16, exchange: &str) -> ResourceRecord {
        ResourceRecord {
            name: domain(name),
            rtype_with_data: RecordTypeWithData::MX {
                preference,
                exchange: domain(exchange),
            },
            rclass: RecordClass::IN,
            ttl: 300,
        }
    }

    pub fn unknown_record(name: &str, octets: &[u8]) -> ResourceRecord {
        ResourceRecord {
            name: domain(name),
            rtype_with_data: RecordTypeWithData::Unknown {
                tag: RecordTypeUnknown(100),
                octets: Bytes::copy_from_slice(octets),
            },
            rclass: RecordClass::IN,
            ttl: 300,
        }
    }
}
