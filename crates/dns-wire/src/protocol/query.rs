//! Building queries and decoding responses: the interface a transport
//! deals with.

use bytes::BytesMut;

use crate::protocol::deserialise::DecodeError;
use crate::protocol::serialise::EncodeError;
use crate::protocol::types::*;

/// Something which hands out query ids.
///
/// Id generation is passed in, rather than done here, so that query
/// building is deterministic given its inputs.
pub trait IdSource {
    fn next_id(&mut self) -> u16;
}

/// An `IdSource` which always gives the same id.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FixedId(pub u16);

impl IdSource for FixedId {
    fn next_id(&mut self) -> u16 {
        self.0
    }
}

/// Build a recursive query for `domain`, of class `IN`.
///
/// # Errors
///
/// If `domain` cannot be encoded.
pub fn build_query(domain: &str, rtype: RecordType, id: u16) -> Result<BytesMut, EncodeError> {
    build_query_with_flags(domain, rtype, id, FLAG_RECURSION_DESIRED)
}

/// Build a query for `domain`, of class `IN`, with the given header
/// flags.
///
/// # Errors
///
/// If `domain` cannot be encoded.
pub fn build_query_with_flags(
    domain: &str,
    rtype: RecordType,
    id: u16,
    flags: u16,
) -> Result<BytesMut, EncodeError> {
    let question = Question {
        name: DomainName::from_dotted_string(domain)?,
        qtype: rtype,
        qclass: RecordClass::IN,
    };

    Packet::from_question(id, flags, question).to_octets()
}

/// Like `build_query`, but taking the id from an `IdSource`.  Returns
/// the id used along with the query.
///
/// # Errors
///
/// If `domain` cannot be encoded.
pub fn build_query_from(
    domain: &str,
    rtype: RecordType,
    ids: &mut impl IdSource,
) -> Result<(u16, BytesMut), EncodeError> {
    let id = ids.next_id();
    Ok((id, build_query(domain, rtype, id)?))
}

/// Decode a complete message.
///
/// # Errors
///
/// If the message cannot be decoded.  No partial result is returned.
pub fn decode_packet(octets: &[u8]) -> Result<Packet, DecodeError> {
    Packet::from_octets(octets)
}
