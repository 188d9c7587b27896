use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use std::str::FromStr;

use crate::protocol::serialise::EncodeError;

/// Maximum encoded length of a domain name.  The number of labels
/// plus sum of the lengths of the labels, plus the terminating octet.
pub const DOMAINNAME_MAX_LEN: usize = 255;

/// Maximum length of a single label in a domain name.
pub const LABEL_MAX_LEN: usize = 63;

/// Maximum number of compression pointers followed while decoding a
/// single name.  A name has at most 127 labels, and every pointer
/// produced by a well-behaved encoder lands on at least one label.
pub const POINTER_HOP_LIMIT: usize = 128;

/// Pointers can only address the first 14 bits of a message.
pub const POINTER_MAX_OFFSET: usize = 0x3fff;

/// Octet mask marking a length octet as a compression pointer.
pub const POINTER_MASK: u8 = 0b1100_0000;

/// Size of the header on the wire.
pub const HEADER_LEN: usize = 12;

/// Flag mask for the QR bit being set (response).
pub const FLAG_QR: u16 = 0b1000_0000_0000_0000;

/// Flag mask for the opcode field.
pub const FLAG_MASK_OPCODE: u16 = 0b0111_1000_0000_0000;

/// Offset for the opcode field.
pub const FLAG_OFFSET_OPCODE: u32 = 11;

/// Flag mask for the AA bit being set (authoritative)
pub const FLAG_AA: u16 = 0b0000_0100_0000_0000;

/// Flag mask for the TC bit being set (truncated)
pub const FLAG_TC: u16 = 0b0000_0010_0000_0000;

/// Flag mask for the RD bit being set (recursion desired)
pub const FLAG_RECURSION_DESIRED: u16 = 0b0000_0001_0000_0000;

/// Flag mask for the RA bit being set (recursion available)
pub const FLAG_RA: u16 = 0b0000_0000_1000_0000;

/// Flag mask for the rcode field.
pub const FLAG_MASK_RCODE: u16 = 0b0000_0000_0000_1111;

/// Basic DNS message format, used for both queries and responses.
///
/// ```text
///     +---------------------+
///     |        Header       |
///     +---------------------+
///     |       Question      | the question for the name server
///     +---------------------+
///     |        Answer       | RRs answering the question
///     +---------------------+
///     |      Authority      | RRs pointing toward an authority
///     +---------------------+
///     |      Additional     | RRs holding additional information
///     +---------------------+
/// ```
///
/// See section 4.1 of RFC 1035.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Packet {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl Packet {
    /// A query packet holding a single question and no records.
    pub fn from_question(id: u16, flags: u16, question: Question) -> Self {
        Self {
            header: Header {
                id,
                flags,
                qdcount: 1,
                ancount: 0,
                nscount: 0,
                arcount: 0,
            },
            questions: vec![question],
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Packet {
    // the header counts have to agree with the sections, or the
    // packet will not survive a round trip
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let mut header = u.arbitrary::<Header>()?;
        let questions = u.arbitrary::<Vec<Question>>()?;
        let answers = u.arbitrary::<Vec<ResourceRecord>>()?;
        let authorities = u.arbitrary::<Vec<ResourceRecord>>()?;
        let additionals = u.arbitrary::<Vec<ResourceRecord>>()?;

        let count = |len: usize| u16::try_from(len).map_err(|_| arbitrary::Error::IncorrectFormat);
        header.qdcount = count(questions.len())?;
        header.ancount = count(answers.len())?;
        header.nscount = count(authorities.len())?;
        header.arcount = count(additionals.len())?;

        Ok(Self {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }
}

/// Common header type for all messages.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      ID                       |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |QR|   Opcode  |AA|TC|RD|RA|   Z    |   RCODE   |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    QDCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ANCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    NSCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                    ARCOUNT                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// The flags are kept as the raw 16 bit field, so that reserved bits
/// survive a round trip.  Use the accessor methods to pick out the
/// individual flags.
///
/// See section 4.1.1 of RFC 1035.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Header {
    /// A 16 bit identifier assigned by the program that generates any
    /// kind of query.  This identifier is copied the corresponding
    /// reply and can be used by the requester to match up replies to
    /// outstanding queries.
    pub id: u16,

    /// The QR, Opcode, AA, TC, RD, RA, Z, and RCODE fields.
    pub flags: u16,

    /// an unsigned 16 bit integer specifying the number of entries in
    /// the question section.
    pub qdcount: u16,

    /// an unsigned 16 bit integer specifying the number of resource
    /// records in the answer section.
    pub ancount: u16,

    /// an unsigned 16 bit integer specifying the number of name
    /// server resource records in the authority records section.
    pub nscount: u16,

    /// an unsigned 16 bit integer specifying the number of
    /// resource records in the additional records section.
    pub arcount: u16,
}

impl Header {
    /// Whether this message is a query (`false`), or a response
    /// (`true`).
    pub fn is_response(&self) -> bool {
        self.flags & FLAG_QR != 0
    }

    /// The kind of query in this message.  This value is set by the
    /// originator of a query and copied into the response.
    #[allow(clippy::cast_possible_truncation)]
    pub fn opcode(&self) -> Opcode {
        Opcode::from(((self.flags & FLAG_MASK_OPCODE) >> FLAG_OFFSET_OPCODE) as u8)
    }

    /// Authoritative Answer - this bit is valid in responses, and
    /// specifies that the responding name server is an authority for
    /// the domain name in question section.
    pub fn is_authoritative(&self) -> bool {
        self.flags & FLAG_AA != 0
    }

    /// TrunCation - specifies that this message was truncated due to
    /// length greater than that permitted on the transmission
    /// channel.
    pub fn is_truncated(&self) -> bool {
        self.flags & FLAG_TC != 0
    }

    /// Recursion Desired - this bit may be set in a query and is
    /// copied into the response.
    pub fn recursion_desired(&self) -> bool {
        self.flags & FLAG_RECURSION_DESIRED != 0
    }

    /// Recursion Available - this be is set or cleared in a response,
    /// and denotes whether recursive query support is available in
    /// the name server.
    pub fn recursion_available(&self) -> bool {
        self.flags & FLAG_RA != 0
    }

    /// Response code - this 4 bit field is set as part of responses.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rcode(&self) -> Rcode {
        Rcode::from((self.flags & FLAG_MASK_RCODE) as u8)
    }
}

/// The question section has a list of questions (usually 1 but
/// possibly more) being asked.  This is the structure for a single
/// question.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                                               |
///     /                     QNAME                     /
///     /                                               /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     QTYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     QCLASS                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// See section 4.1.2 of RFC 1035.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(any(feature = "test-util", test), derive(arbitrary::Arbitrary))]
pub struct Question {
    pub name: DomainName,
    pub qtype: RecordType,
    pub qclass: RecordClass,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.qclass, self.qtype)
    }
}

/// The answer, authority, and additional sections are all the same
/// format: a variable number of resource records.  This is the
/// structure for a single resource record.
///
/// ```text
///                                     1  1  1  1  1  1
///       0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                                               |
///     /                                               /
///     /                      NAME                     /
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TYPE                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                     CLASS                     |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                      TTL                      |
///     |                                               |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
///     |                   RDLENGTH                    |
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--|
///     /                     RDATA                     /
///     /                                               /
///     +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// The RDATA is kept opaque: see the `rdata` module for turning it
/// into something more useful.
///
/// See section 4.1.3 of RFC 1035.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ResourceRecord {
    /// a domain name to which this resource record pertains.
    pub name: DomainName,

    pub rtype: RecordType,

    pub rclass: RecordClass,

    /// a 32 bit unsigned integer that specifies the time interval (in
    /// seconds) that the resource record may be cached before it
    /// should be discarded.
    pub ttl: u32,

    pub data: Bytes,
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for ResourceRecord {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let name = u.arbitrary()?;
        let rtype = u.arbitrary()?;
        let rclass = u.arbitrary()?;
        let ttl = u.arbitrary()?;
        let len = u.int_in_range(0..=128)?;
        let data = Bytes::copy_from_slice(u.bytes(len)?);

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            data,
        })
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

/// A struct with a private constructor, to ensure invalid `Opcode`s
/// cannot be created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct OpcodeReserved(u8);

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

/// A struct with a private constructor, to ensure invalid `Rcode`s
/// cannot be created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RcodeReserved(u8);

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rcode::NoError => write!(f, "no-error"),
            Rcode::FormatError => write!(f, "format-error"),
            Rcode::ServerFailure => write!(f, "server-failure"),
            Rcode::NameError => write!(f, "name-error"),
            Rcode::NotImplemented => write!(f, "not-implemented"),
            Rcode::Refused => write!(f, "refused"),
            Rcode::Reserved(RcodeReserved(octet)) => write!(f, "reserved-{octet}"),
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

/// A domain name is a sequence of labels, where each label is a
/// length octet followed by that number of octets.  The root domain
/// has no labels at all: on the wire it is just the terminating zero
/// octet.
///
/// A label must be 63 octets or shorter.  A name must be 255 octets
/// or shorter in total, including both length and label octets.
///
/// Label octets are kept exactly as they were given: there is no case
/// folding and no character encoding.
#[derive(Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DomainName {
    pub(crate) labels: Vec<Label>,
}

impl DomainName {
    pub fn root_domain() -> Self {
        Self { labels: Vec::new() }
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Size of the uncompressed wire form: a length octet per label,
    /// the label octets, and the terminating zero octet.
    pub fn wire_len(&self) -> usize {
        wire_len(&self.labels)
    }

    /// # Errors
    ///
    /// If the name would be longer than 255 octets on the wire.
    pub fn from_labels(labels: Vec<Label>) -> Result<Self, EncodeError> {
        let len = wire_len(&labels);
        if len > DOMAINNAME_MAX_LEN {
            return Err(EncodeError::NameTooLong { len });
        }

        Ok(Self { labels })
    }

    /// Split a name on `.`.  Empty segments are skipped, so a trailing
    /// dot is allowed and the empty string is the root domain.
    ///
    /// # Errors
    ///
    /// If a segment is longer than 63 octets, or the whole name would
    /// be longer than 255 octets on the wire.
    pub fn from_dotted_string(s: &str) -> Result<Self, EncodeError> {
        let mut labels = Vec::<Label>::with_capacity(5);
        for segment in s.split('.').filter(|segment| !segment.is_empty()) {
            labels.push(Label::try_from(segment.as_bytes())?);
        }

        Self::from_labels(labels)
    }

    /// The decoded byte form: label octets joined by `.`, with no
    /// trailing dot.  The root domain is the empty string.
    pub fn to_dotted_octets(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.wire_len());
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                out.put_u8(b'.');
            }
            out.put_slice(label.octets());
        }
        out.freeze()
    }

    /// A printable form: dots between labels, with any unprintable
    /// octet (or a literal `.` or `\` inside a label) written as a
    /// `\ddd` escape.  The root domain is `.`.
    pub fn to_dotted_string(&self) -> String {
        if self.is_root() {
            return ".".to_string();
        }

        let mut out = String::with_capacity(self.wire_len());
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            for octet in label.octets() {
                if octet.is_ascii_graphic() && *octet != b'.' && *octet != b'\\' {
                    out.push(*octet as char);
                } else {
                    out.push_str(&format!("\\{octet:03}"));
                }
            }
        }
        out
    }
}

fn wire_len(labels: &[Label]) -> usize {
    labels
        .iter()
        .map(|label| usize::from(label.len()) + 1)
        .sum::<usize>()
        + 1
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
        write!(f, "{}", self.to_dotted_string())
    }
}

impl FromStr for DomainName {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dotted_string(s)
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for DomainName {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let num_labels = u.int_in_range::<usize>(0..=10)?;
        let mut labels = Vec::with_capacity(num_labels);
        for _ in 0..num_labels {
            labels.push(u.arbitrary()?);
        }
        Ok(Self { labels })
    }
}

/// A single non-empty label of at most 63 octets.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Label {
    pub(crate) octets: Bytes,
}

impl Label {
    #[allow(clippy::len_without_is_empty)]
    #[allow(clippy::missing_panics_doc)]
    pub fn len(&self) -> u8 {
        // safe because of the check in the constructor
        u8::try_from(self.octets.len()).unwrap()
    }

    pub fn octets(&self) -> &[u8] {
        &self.octets
    }
}

impl TryFrom<&[u8]> for Label {
    type Error = EncodeError;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        if octets.is_empty() {
            Err(EncodeError::EmptyLabel)
        } else if octets.len() > LABEL_MAX_LEN {
            Err(EncodeError::LabelTooLong {
                label: String::from_utf8_lossy(octets).into_owned(),
                len: octets.len(),
            })
        } else {
            Ok(Self {
                octets: Bytes::copy_from_slice(octets),
            })
        }
    }
}

#[cfg(any(feature = "test-util", test))]
impl<'a> arbitrary::Arbitrary<'a> for Label {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let len = u.int_in_range::<usize>(1..=20)?;
        Ok(Self {
            octets: Bytes::copy_from_slice(u.bytes(len)?),
        })
    }
}

/// Record types are used by resource records and by queries.  Only a
/// handful of common types get a name: every other value is carried
/// through as `Unknown`.
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

/// A struct with a private constructor, to ensure invalid `RecordType`s
/// cannot be created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordTypeUnknown(u16);

impl RecordType {
    pub fn is_unknown(&self) -> bool {
        matches!(self, RecordType::Unknown(_))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::NS => write!(f, "NS"),
            RecordType::CNAME => write!(f, "CNAME"),
            RecordType::SOA => write!(f, "SOA"),
            RecordType::PTR => write!(f, "PTR"),
            RecordType::MX => write!(f, "MX"),
            RecordType::TXT => write!(f, "TXT"),
            RecordType::AAAA => write!(f, "AAAA"),
            RecordType::Unknown(RecordTypeUnknown(n)) => write!(f, "TYPE{n}"),
        }
    }
}

impl FromStr for RecordType {
    type Err = RecordTypeFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "NS" => Ok(RecordType::NS),
            "CNAME" => Ok(RecordType::CNAME),
            "SOA" => Ok(RecordType::SOA),
            "PTR" => Ok(RecordType::PTR),
            "MX" => Ok(RecordType::MX),
            "TXT" => Ok(RecordType::TXT),
            "AAAA" => Ok(RecordType::AAAA),
            upper => match upper.strip_prefix("TYPE") {
                Some(number) => match u16::from_str(number) {
                    Ok(n) => Ok(RecordType::from(n)),
                    Err(_) => Err(RecordTypeFromStr::BadType),
                },
                None => Err(RecordTypeFromStr::NoParse),
            },
        }
    }
}

/// Errors that can arise when converting a `&str` into a `RecordType`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum RecordTypeFromStr {
    #[error("TYPE<num> number must be a u16")]
    BadType,
    #[error("could not parse string")]
    NoParse,
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        match value {
            1 => RecordType::A,
            2 => RecordType::NS,
            5 => RecordType::CNAME,
            6 => RecordType::SOA,
            12 => RecordType::PTR,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            28 => RecordType::AAAA,
            _ => RecordType::Unknown(RecordTypeUnknown(value)),
        }
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

/// Record classes are used by resource records and by queries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum RecordClass {
    IN,
    CS,
    CH,
    HS,
    Unknown(RecordClassUnknown),
}

/// A struct with a private constructor, to ensure invalid
/// `RecordClass`es cannot be created.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct RecordClassUnknown(u16);

impl RecordClass {
    pub fn is_unknown(&self) -> bool {
        matches!(self, RecordClass::Unknown(_))
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordClass::IN => write!(f, "IN"),
            RecordClass::CS => write!(f, "CS"),
            RecordClass::CH => write!(f, "CH"),
            RecordClass::HS => write!(f, "HS"),
            RecordClass::Unknown(RecordClassUnknown(n)) => write!(f, "CLASS{n}"),
        }
    }
}

impl FromStr for RecordClass {
    type Err = RecordClassFromStr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(RecordClass::IN),
            "CS" => Ok(RecordClass::CS),
            "CH" => Ok(RecordClass::CH),
            "HS" => Ok(RecordClass::HS),
            upper => match upper.strip_prefix("CLASS") {
                Some(number) => match u16::from_str(number) {
                    Ok(n) => Ok(RecordClass::from(n)),
                    Err(_) => Err(RecordClassFromStr::BadClass),
                },
                None => Err(RecordClassFromStr::NoParse),
            },
        }
    }
}

/// Errors that can arise when converting a `&str` into a `RecordClass`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum RecordClassFromStr {
    #[error("CLASS<num> number must be a u16")]
    BadClass,
    #[error("could not parse string")]
    NoParse,
}

impl From<u16> for RecordClass {
    fn from(value: u16) -> Self {
        match value {
            1 => RecordClass::IN,
            2 => RecordClass::CS,
            3 => RecordClass::CH,
            4 => RecordClass::HS,
            _ => RecordClass::Unknown(RecordClassUnknown(value)),
        }
    }
}

impl From<RecordClass> for u16 {
    fn from(value: RecordClass) -> Self {
        match value {
            RecordClass::IN => 1,
            RecordClass::CS => 2,
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
    use std::net::Ipv4Addr;

    /// Generate an arbitrary value from random input, trying bigger
    /// and bigger inputs until one is big enough.
    pub fn arbitrary<T: for<'a> Arbitrary<'a>>() -> T {
        let mut rng = rand::rng();
        for size in [128, 256, 512, 1024, 2048, 4096, 8192] {
            let mut buf = BytesMut::with_capacity(size);
            for _ in 0..size {
                buf.put_u8(rng.random());
            }

            if let Ok(value) = T::arbitrary(&mut Unstructured::new(&buf.freeze())) {
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
            rtype: RecordType::A,
            rclass: RecordClass::IN,
            ttl: 300,
            data: Bytes::copy_from_slice(&address.octets()),
        }
    }

    pub fn unknown_record(name: &str, octets: &[u8]) -> ResourceRecord {
        ResourceRecord {
            name: domain(name),
            rtype: RecordType::Unknown(RecordTypeUnknown(100)),
            rclass: RecordClass::IN,
            ttl: 300,
            data: Bytes::copy_from_slice(octets),
        }
    }

    pub fn a_question(name: &str) -> Question {
        Question {
            name: domain(name),
            qtype: RecordType::A,
            qclass: RecordClass::IN,
        }
    }
}
