//! Deserialisation of DNS messages from the network.  See the `types`
//! module for details of the format.
//!
//! Decoding never panics and never reads outside of the input: every
//! read goes through a `ConsumableBuffer`, which is an immutable slice
//! plus a cursor owned by the decode call.

use bytes::Bytes;

use crate::protocol::types::*;

/// Smallest possible question: the root name, a type, and a class.
const QUESTION_MIN_LEN: usize = 1 + 2 + 2;

/// Smallest possible resource record: the root name, a type, a class,
/// a TTL, and a zero RDLENGTH.
const RECORD_MIN_LEN: usize = 1 + 2 + 2 + 4 + 2;

impl Packet {
    /// # Errors
    ///
    /// If the message cannot be parsed.
    pub fn from_octets(octets: &[u8]) -> Result<Self, DecodeError> {
        Self::deserialise(&mut ConsumableBuffer::new(octets))
    }

    /// Decode a header and then exactly as many questions and records
    /// as it declares.  Anything after the last record is ignored.
    ///
    /// # Errors
    ///
    /// If the message cannot be parsed.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, DecodeError> {
        let header = Header::deserialise(buffer)?;
        let mut questions = Vec::with_capacity(buffer.capacity_for(header.qdcount, QUESTION_MIN_LEN));
        let mut answers = Vec::with_capacity(buffer.capacity_for(header.ancount, RECORD_MIN_LEN));
        let mut authorities = Vec::with_capacity(buffer.capacity_for(header.nscount, RECORD_MIN_LEN));
        let mut additionals = Vec::with_capacity(buffer.capacity_for(header.arcount, RECORD_MIN_LEN));

        for _ in 0..header.qdcount {
            questions.push(Question::deserialise(buffer)?);
        }
        for _ in 0..header.ancount {
            answers.push(ResourceRecord::deserialise(buffer)?);
        }
        for _ in 0..header.nscount {
            authorities.push(ResourceRecord::deserialise(buffer)?);
        }
        for _ in 0..header.arcount {
            additionals.push(ResourceRecord::deserialise(buffer)?);
        }

        Ok(Self {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }
}

impl Header {
    /// # Errors
    ///
    /// If there are fewer than 12 octets left.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, DecodeError> {
        let start = buffer.position();
        let truncated = || DecodeError::Truncated {
            offset: start,
            expected: HEADER_LEN,
        };

        if buffer.remaining() < HEADER_LEN {
            return Err(truncated());
        }

        Ok(Self {
            id: buffer.next_u16().ok_or_else(truncated)?,
            flags: buffer.next_u16().ok_or_else(truncated)?,
            qdcount: buffer.next_u16().ok_or_else(truncated)?,
            ancount: buffer.next_u16().ok_or_else(truncated)?,
            nscount: buffer.next_u16().ok_or_else(truncated)?,
            arcount: buffer.next_u16().ok_or_else(truncated)?,
        })
    }
}

impl Question {
    /// # Errors
    ///
    /// If the question cannot be parsed.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, DecodeError> {
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
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, DecodeError> {
        let name = DomainName::deserialise(buffer)?;
        let rtype = RecordType::deserialise(buffer)?;
        let rclass = RecordClass::deserialise(buffer)?;
        let ttl = buffer.next_u32().ok_or_else(|| buffer.truncated(4))?;
        let rdlength = buffer.next_u16().ok_or_else(|| buffer.truncated(2))?;
        let data = buffer
            .take(rdlength.into())
            .ok_or_else(|| buffer.truncated(rdlength.into()))?;

        Ok(Self {
            name,
            rtype,
            rclass,
            ttl,
            data: Bytes::copy_from_slice(data),
        })
    }
}

impl DomainName {
    /// Decode a name, following compression pointers.
    ///
    /// Pointers are followed iteratively with a second cursor, and each
    /// one must point strictly before the run of labels it ends (for
    /// the first pointer that is the start of the name).  The pointed-to
    /// offsets therefore strictly decrease, so decoding always
    /// terminates; `POINTER_HOP_LIMIT` additionally bounds the work.
    ///
    /// Afterwards the buffer is positioned just past the name as it
    /// appears here: after the terminating zero octet, or after the
    /// first pointer.
    ///
    /// # Errors
    ///
    /// If the name cannot be parsed.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, DecodeError> {
        let start = buffer.position();
        let mut labels = Vec::<Label>::with_capacity(5);
        let mut len = 1;
        let mut hops = 0;
        let mut run_start = start;
        let mut resume_at = None;
        let mut cursor = buffer.at_offset(start);

        loop {
            let offset = cursor.position();
            let size = cursor.next_u8().ok_or_else(|| cursor.truncated(1))?;

            if size == 0 {
                break;
            } else if usize::from(size) <= LABEL_MAX_LEN {
                len += usize::from(size) + 1;
                if len > DOMAINNAME_MAX_LEN {
                    return Err(DecodeError::NameTooLong { offset: start });
                }

                let octets = cursor
                    .take(size.into())
                    .ok_or_else(|| cursor.truncated(size.into()))?;
                labels.push(Label {
                    octets: Bytes::copy_from_slice(octets),
                });
            } else if size & POINTER_MASK == POINTER_MASK {
                let lo = cursor.next_u8().ok_or_else(|| cursor.truncated(1))?;
                let target = usize::from(u16::from_be_bytes([size & !POINTER_MASK, lo]));

                if target >= cursor.len() {
                    return Err(DecodeError::MalformedPointer { offset, target });
                }

                // pointers only go backwards, to before the labels
                // they end (RFC 1035 section 4.1.4)
                if target >= run_start {
                    return Err(DecodeError::PointerLoop { offset, target });
                }

                hops += 1;
                if hops > POINTER_HOP_LIMIT {
                    return Err(DecodeError::PointerBudgetExceeded { offset: start });
                }

                if resume_at.is_none() {
                    resume_at = Some(cursor.position());
                }
                run_start = target;
                cursor = cursor.at_offset(target);
            } else {
                return Err(DecodeError::ReservedLabelType {
                    offset,
                    octet: size,
                });
            }
        }

        buffer.seek(resume_at.unwrap_or(cursor.position()));
        Ok(Self { labels })
    }
}

impl RecordType {
    /// # Errors
    ///
    /// If the record type is too short.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, DecodeError> {
        let value = buffer.next_u16().ok_or_else(|| buffer.truncated(2))?;
        Ok(Self::from(value))
    }
}

impl RecordClass {
    /// # Errors
    ///
    /// If the record class is too short.
    pub fn deserialise(buffer: &mut ConsumableBuffer) -> Result<Self, DecodeError> {
        let value = buffer.next_u16().ok_or_else(|| buffer.truncated(2))?;
        Ok(Self::from(value))
    }
}

/// Errors encountered when parsing a datagram.  Every error carries
/// the absolute offset into the message at which the problem was
/// found.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum DecodeError {
    /// The message ended in the middle of a field.
    #[error("message truncated: expected {expected} more octets at offset {offset}")]
    Truncated { offset: usize, expected: usize },

    /// A compression pointer points outside of the message.
    #[error("compression pointer at offset {offset} points outside of the message (to {target})")]
    MalformedPointer { offset: usize, target: usize },

    /// A compression pointer points to or after the labels it ends, so
    /// following it could loop.
    #[error("compression pointer at offset {offset} points forwards (to {target})")]
    PointerLoop { offset: usize, target: usize },

    /// The name starting at this offset chains too many compression
    /// pointers together.
    #[error("name at offset {offset} follows more than {} compression pointers", POINTER_HOP_LIMIT)]
    PointerBudgetExceeded { offset: usize },

    /// A label length octet has the top bits `01` or `10`: these are
    /// neither a label nor a pointer.
    #[error("length octet {octet:#04x} at offset {offset} is neither a label nor a pointer")]
    ReservedLabelType { offset: usize, octet: u8 },

    /// The name starting at this offset is over 255 octets in size.
    #[error("name at offset {offset} is longer than {} octets", DOMAINNAME_MAX_LEN)]
    NameTooLong { offset: usize },
}

/// A buffer which will be consumed by the parsing process.
#[derive(Debug, Copy, Clone)]
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

    /// Absolute offset of the next octet to be read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Size of the whole message, consumed or not.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    pub fn remaining(&self) -> usize {
        self.octets.len().saturating_sub(self.position)
    }

    pub fn next_u8(&mut self) -> Option<u8> {
        let a = *self.octets.get(self.position)?;
        self.position += 1;
        Some(a)
    }

    pub fn next_u16(&mut self) -> Option<u16> {
        let octets = self.take(2)?;
        Some(u16::from_be_bytes([octets[0], octets[1]]))
    }

    pub fn next_u32(&mut self) -> Option<u32> {
        let octets = self.take(4)?;
        Some(u32::from_be_bytes([octets[0], octets[1], octets[2], octets[3]]))
    }

    pub fn take(&mut self, size: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(size)?;
        let slice = self.octets.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    /// A new cursor over the same message.
    pub fn at_offset(&self, position: usize) -> ConsumableBuffer<'a> {
        Self {
            octets: self.octets,
            position,
        }
    }

    pub(crate) fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// The error for a field of `expected` octets not fitting in what
    /// is left.
    pub(crate) fn truncated(&self, expected: usize) -> DecodeError {
        DecodeError::Truncated {
            offset: self.position,
            expected,
        }
    }

    /// How much to pre-allocate for `count` entries each at least
    /// `min_len` octets long: never more than could actually be left.
    fn capacity_for(&self, count: u16, min_len: usize) -> usize {
        usize::from(count).min(self.remaining() / min_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::test_util::*;

    use rand::Rng;
    use std::net::Ipv4Addr;

    #[rustfmt::skip]
    const EXAMPLE_RESPONSE: [u8; 49] = [
        // header
        0x60, 0x56, 0x81, 0x80, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
        // question: www.example.com A IN
        0x03, 0x77, 0x77, 0x77,
        0x07, 0x65, 0x78, 0x61, 0x6d, 0x70, 0x6c, 0x65,
        0x03, 0x63, 0x6f, 0x6d, 0x00,
        0x00, 0x01, 0x00, 0x01,
        // answer: pointer to offset 12, A IN, TTL 21147, 4 octets
        0xc0, 0x0c,
        0x00, 0x01, 0x00, 0x01,
        0x00, 0x00, 0x52, 0x9b,
        0x00, 0x04,
        0x5d, 0xb8, 0xd8, 0x22,
    ];

    #[test]
    fn decodes_example_response() {
        let packet = Packet::from_octets(&EXAMPLE_RESPONSE).unwrap();

        assert_eq!(
            Header {
                id: 24662,
                flags: 33152,
                qdcount: 1,
                ancount: 1,
                nscount: 0,
                arcount: 0,
            },
            packet.header
        );
        assert_eq!(vec![a_question("www.example.com")], packet.questions);
        assert_eq!(
            vec![ResourceRecord {
                ttl: 21147,
                ..a_record("www.example.com", Ipv4Addr::new(93, 184, 216, 34))
            }],
            packet.answers
        );
        assert!(packet.authorities.is_empty());
        assert!(packet.additionals.is_empty());
        assert_eq!(
            &b"www.example.com"[..],
            &packet.answers[0].name.to_dotted_octets()[..]
        );
    }

    #[test]
    fn ignores_trailing_octets() {
        let mut octets = EXAMPLE_RESPONSE.to_vec();
        octets.resize(512, 0);

        assert_eq!(
            Packet::from_octets(&EXAMPLE_RESPONSE),
            Packet::from_octets(&octets)
        );
    }

    #[test]
    fn every_truncation_of_example_response_is_an_error() {
        for len in 0..EXAMPLE_RESPONSE.len() {
            match Packet::from_octets(&EXAMPLE_RESPONSE[..len]) {
                Err(DecodeError::Truncated { offset, expected }) => {
                    assert!(offset <= len);
                    assert!(offset + expected > len);
                }
                other => panic!("expected truncation at length {len}, got {other:?}"),
            }
        }
    }

    #[test]
    fn header_too_short() {
        assert_eq!(
            Err(DecodeError::Truncated {
                offset: 0,
                expected: 12
            }),
            Header::deserialise(&mut ConsumableBuffer::new(&EXAMPLE_RESPONSE[..11]))
        );
    }

    #[test]
    fn rdlength_longer_than_message() {
        let mut octets = EXAMPLE_RESPONSE.to_vec();
        // RDLENGTH of the answer
        octets[43] = 0x00;
        octets[44] = 0x05;

        assert_eq!(
            Err(DecodeError::Truncated {
                offset: 45,
                expected: 5
            }),
            Packet::from_octets(&octets)
        );
    }

    #[test]
    fn cursor_resumes_after_pointer() {
        let mut buffer = ConsumableBuffer::new(&EXAMPLE_RESPONSE);
        buffer.seek(33);

        let name = DomainName::deserialise(&mut buffer).unwrap();
        assert_eq!(domain("www.example.com"), name);
        assert_eq!(35, buffer.position());
        assert_eq!(Some(1), buffer.next_u16());
    }

    #[test]
    fn cursor_resumes_after_terminator() {
        let mut buffer = ConsumableBuffer::new(&EXAMPLE_RESPONSE);
        buffer.seek(12);

        let question = Question::deserialise(&mut buffer).unwrap();
        assert_eq!(a_question("www.example.com"), question);
        assert_eq!(33, buffer.position());
    }

    #[test]
    #[rustfmt::skip]
    fn pointer_to_suffix_with_labels_before() {
        let octets = [
            // offset 0: "example.com"
            7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0,
            // offset 13: "www" + pointer to offset 0
            3, b'w', b'w', b'w', 0xc0, 0x00,
            // offset 19: "mail" + pointer to offset 13
            4, b'm', b'a', b'i', b'l', 0xc0, 13,
        ];

        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(19);
        assert_eq!(Ok(domain("mail.www.example.com")), DomainName::deserialise(&mut buffer));
        assert_eq!(octets.len(), buffer.position());
    }

    #[test]
    fn pointer_to_itself() {
        let octets = [0xc0, 0x00];
        assert_eq!(
            Err(DecodeError::PointerLoop {
                offset: 0,
                target: 0
            }),
            DomainName::deserialise(&mut ConsumableBuffer::new(&octets))
        );
    }

    #[test]
    fn pointer_forwards() {
        let octets = [0xc0, 0x02, 0x00];
        assert_eq!(
            Err(DecodeError::PointerLoop {
                offset: 0,
                target: 2
            }),
            DomainName::deserialise(&mut ConsumableBuffer::new(&octets))
        );
    }

    #[test]
    #[rustfmt::skip]
    fn pointer_into_own_labels() {
        // "a" then a pointer back to the "a": earlier than the
        // pointer, but not earlier than the name
        let octets = [0, 1, b'a', 0xc0, 0x01];
        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(1);

        assert_eq!(
            Err(DecodeError::PointerLoop { offset: 3, target: 1 }),
            DomainName::deserialise(&mut buffer)
        );
    }

    #[test]
    #[rustfmt::skip]
    fn pointer_cycle() {
        let octets = [
            // offset 0: "a" + pointer to offset 5
            1, b'a', 0xc0, 0x05, 0,
            // offset 5: "b" + pointer to offset 0
            1, b'b', 0xc0, 0x00,
        ];

        // starting at 5: b -> 0: a -> 5, which is not before 0
        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(5);
        assert_eq!(
            Err(DecodeError::PointerLoop { offset: 2, target: 5 }),
            DomainName::deserialise(&mut buffer)
        );

        // starting at 0: the first pointer already points forwards
        assert_eq!(
            Err(DecodeError::PointerLoop { offset: 2, target: 5 }),
            DomainName::deserialise(&mut ConsumableBuffer::new(&octets))
        );
    }

    #[test]
    fn pointer_outside_message() {
        let octets = [0, 0xc0, 0x10];
        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(1);

        assert_eq!(
            Err(DecodeError::MalformedPointer {
                offset: 1,
                target: 16
            }),
            DomainName::deserialise(&mut buffer)
        );
    }

    #[test]
    fn pointer_just_past_end_of_message() {
        let octets = [0, 0xc0, 0x03];
        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(1);

        assert_eq!(
            Err(DecodeError::MalformedPointer {
                offset: 1,
                target: 3
            }),
            DomainName::deserialise(&mut buffer)
        );
    }

    #[test]
    fn decoded_labels_match_constructed_name() {
        let mut buffer = ConsumableBuffer::new(&EXAMPLE_RESPONSE);
        buffer.seek(12);

        let name = DomainName::deserialise(&mut buffer).unwrap();
        assert_eq!(
            DomainName::from_labels(vec![
                Label::try_from(&b"www"[..]).unwrap(),
                Label::try_from(&b"example"[..]).unwrap(),
                Label::try_from(&b"com"[..]).unwrap(),
            ]),
            Ok(name)
        );
    }

    #[test]
    fn pointer_missing_second_octet() {
        let octets = [0, 0xc0];
        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(1);

        assert_eq!(
            Err(DecodeError::Truncated {
                offset: 2,
                expected: 1
            }),
            DomainName::deserialise(&mut buffer)
        );
    }

    #[test]
    fn pointer_chain_over_budget() {
        // offset 0 is the root name, then each pointer points to the
        // one before it
        let mut octets = vec![0, 0xc0, 0x00];
        for i in 0..POINTER_HOP_LIMIT {
            let [hi, lo] = u16::try_from(1 + 2 * i).unwrap().to_be_bytes();
            octets.push(hi | POINTER_MASK);
            octets.push(lo);
        }
        let last = octets.len() - 2;

        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(last);
        assert_eq!(
            Err(DecodeError::PointerBudgetExceeded { offset: last }),
            DomainName::deserialise(&mut buffer)
        );

        // one fewer hop is fine
        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(last - 2);
        assert_eq!(Ok(DomainName::root_domain()), DomainName::deserialise(&mut buffer));
        assert_eq!(last, buffer.position());
    }

    #[test]
    fn reserved_label_types() {
        for octet in [0b0100_0000, 0b1000_0000, 0b1011_1111] {
            let octets = [octet, 0, 0];
            assert_eq!(
                Err(DecodeError::ReservedLabelType { offset: 0, octet }),
                DomainName::deserialise(&mut ConsumableBuffer::new(&octets))
            );
        }
    }

    #[test]
    fn name_too_long() {
        let mut octets = Vec::new();
        for _ in 0..4 {
            octets.push(63);
            octets.extend_from_slice(&[b'x'; 63]);
        }
        octets.push(0);

        assert_eq!(
            Err(DecodeError::NameTooLong { offset: 0 }),
            DomainName::deserialise(&mut ConsumableBuffer::new(&octets))
        );
    }

    #[test]
    fn name_too_long_through_pointer() {
        // 3 * 64 octets at the start, then a name of 64 octets
        // pointing back to it: 256 + 1 in total
        let mut octets = Vec::new();
        for _ in 0..3 {
            octets.push(63);
            octets.extend_from_slice(&[b'x'; 63]);
        }
        octets.push(0);
        let start = octets.len();
        octets.push(63);
        octets.extend_from_slice(&[b'y'; 63]);
        octets.extend_from_slice(&[0xc0, 0x00]);

        let mut buffer = ConsumableBuffer::new(&octets);
        buffer.seek(start);
        assert_eq!(
            Err(DecodeError::NameTooLong { offset: start }),
            DomainName::deserialise(&mut buffer)
        );
    }

    #[test]
    fn unknown_types_and_classes_are_preserved() {
        let mut octets = EXAMPLE_RESPONSE.to_vec();
        // QTYPE 65280, QCLASS 65281
        octets[29..33].copy_from_slice(&[0xff, 0x00, 0xff, 0x01]);

        let packet = Packet::from_octets(&octets).unwrap();
        assert_eq!(65280, u16::from(packet.questions[0].qtype));
        assert_eq!(65281, u16::from(packet.questions[0].qclass));
        assert!(packet.questions[0].qtype.is_unknown());
        assert!(packet.questions[0].qclass.is_unknown());
    }

    #[test]
    fn huge_counts_do_not_preallocate() {
        let octets = [0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
        let buffer = ConsumableBuffer::new(&octets[..]);

        assert_eq!(0, buffer.at_offset(12).capacity_for(u16::MAX, RECORD_MIN_LEN));
        assert!(matches!(
            Packet::from_octets(&octets),
            Err(DecodeError::Truncated { offset: 12, .. })
        ));
    }

    #[test]
    fn random_input_never_panics() {
        let mut rng = rand::rng();
        for _ in 0..2000 {
            let len = rng.random_range(0..256);
            let mut octets = vec![0u8; len];
            rng.fill(&mut octets[..]);

            // bias towards plausible headers and pointers
            if len > 12 && rng.random_bool(0.5) {
                octets[4..12].copy_from_slice(&[0, 1, 0, 2, 0, 1, 0, 1]);
            }
            for octet in &mut octets[12.min(len)..] {
                if rng.random_bool(0.1) {
                    *octet |= POINTER_MASK;
                }
            }

            let _ = Packet::from_octets(&octets);
            for start in 0..len {
                let mut buffer = ConsumableBuffer::new(&octets);
                buffer.seek(start);
                if DomainName::deserialise(&mut buffer).is_ok() {
                    assert!(buffer.position() <= len);
                }
            }
        }
    }
}
