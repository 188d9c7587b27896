//! Serialisation of DNS messages to the wire format.  See the `types`
//! module for details of the format.

use bytes::{BufMut, BytesMut};
use std::collections::HashMap;

use crate::protocol::types::*;

impl Packet {
    /// # Errors
    ///
    /// If a section has more than 65535 entries, or a record has more
    /// than 65535 octets of data.
    pub fn to_octets(&self) -> Result<BytesMut, EncodeError> {
        let mut buffer = WritableBuffer::default();
        self.serialise(&mut buffer)?;
        Ok(buffer.octets)
    }

    /// The counts in the header are taken from the sections, not from
    /// `self.header`.
    ///
    /// # Errors
    ///
    /// If a section has more than 65535 entries, or a record has more
    /// than 65535 octets of data.
    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), EncodeError> {
        let header = Header {
            qdcount: usize_to_u16(self.questions.len())?,
            ancount: usize_to_u16(self.answers.len())?,
            nscount: usize_to_u16(self.authorities.len())?,
            arcount: usize_to_u16(self.additionals.len())?,
            ..self.header
        };

        header.serialise(buffer);
        for question in &self.questions {
            question.serialise(buffer);
        }
        for rr in &self.answers {
            rr.serialise(buffer)?;
        }
        for rr in &self.authorities {
            rr.serialise(buffer)?;
        }
        for rr in &self.additionals {
            rr.serialise(buffer)?;
        }

        Ok(())
    }
}

impl Header {
    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        buffer.write_u16(self.id);
        buffer.write_u16(self.flags);
        buffer.write_u16(self.qdcount);
        buffer.write_u16(self.ancount);
        buffer.write_u16(self.nscount);
        buffer.write_u16(self.arcount);
    }
}

impl Question {
    pub fn serialise(&self, buffer: &mut WritableBuffer) {
        self.name.serialise(buffer, true);
        self.qtype.serialise(buffer);
        self.qclass.serialise(buffer);
    }
}

impl ResourceRecord {
    /// # Errors
    ///
    /// If the RDATA is too long.
    pub fn serialise(&self, buffer: &mut WritableBuffer) -> Result<(), EncodeError> {
        let rdlength = usize_to_u16(self.data.len())?;

        self.name.serialise(buffer, true);
        self.rtype.serialise(buffer);
        self.rclass.serialise(buffer);
        buffer.write_u32(self.ttl);
        buffer.write_u16(rdlength);
        buffer.write_octets(&self.data);

        Ok(())
    }
}

impl DomainName {
    /// Write the name.  If `compress` is set, the longest suffix which
    /// has already been written to this buffer is replaced with a
    /// pointer to it.
    pub fn serialise(&self, buffer: &mut WritableBuffer, compress: bool) {
        for (i, label) in self.labels().iter().enumerate() {
            let suffix = &self.labels()[i..];
            if compress {
                if let Some(ptr) = buffer.name_pointer(suffix) {
                    buffer.write_u16(ptr);
                    return;
                }
            }

            buffer.memoise_name(suffix);
            buffer.write_u8(label.len());
            buffer.write_octets(label.octets());
        }
        buffer.write_u8(0);
    }

    /// The uncompressed wire form of the name.
    pub fn to_octets(&self) -> BytesMut {
        let mut buffer = WritableBuffer::default();
        self.serialise(&mut buffer, false);
        buffer.octets
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

/// Encode a dotted domain name as a sequence of length-prefixed labels
/// terminated by a zero octet.  Empty segments are skipped, so `""` is
/// the root domain and encodes as a single zero octet.
///
/// # Errors
///
/// If a label is longer than 63 octets, or the name is longer than
/// 255 octets.
pub fn encode_name(name: &str) -> Result<BytesMut, EncodeError> {
    Ok(DomainName::from_dotted_string(name)?.to_octets())
}

/// Errors encountered when serialising a message.
#[derive(Debug, Clone, Eq, PartialEq, Hash, thiserror::Error)]
pub enum EncodeError {
    /// A label is over 63 octets in size.
    #[error("label '{label}' is {len} octets long, more than {} allowed", LABEL_MAX_LEN)]
    LabelTooLong { label: String, len: usize },

    /// Labels must have at least one octet: the empty label only
    /// appears as the terminator.
    #[error("label is empty")]
    EmptyLabel,

    /// A domain is over 255 octets in size.
    #[error("name is {len} octets long, more than {} allowed", DOMAINNAME_MAX_LEN)]
    NameTooLong { len: usize },

    /// A counter does not fit in the desired width.
    #[error("'{counter}' cannot be converted to a u{bits}")]
    CounterTooLarge { counter: usize, bits: u32 },
}

/// A buffer which can be written to, for serialisation purposes.
pub struct WritableBuffer {
    pub octets: BytesMut,
    name_pointers: HashMap<Vec<Label>, u16>,
}

impl Default for WritableBuffer {
    fn default() -> Self {
        Self {
            octets: BytesMut::with_capacity(512),
            name_pointers: HashMap::new(),
        }
    }
}

impl WritableBuffer {
    pub fn index(&self) -> usize {
        self.octets.len()
    }

    /// Remember that the name (or name suffix) `labels` is about to be
    /// written at the current index.  Names past the range a pointer
    /// can reach are not remembered.
    pub fn memoise_name(&mut self, labels: &[Label]) {
        if labels.is_empty() || self.name_pointers.contains_key(labels) {
            return;
        }

        if self.index() <= POINTER_MAX_OFFSET {
            if let Ok(index) = u16::try_from(self.index()) {
                let [hi, lo] = index.to_be_bytes();
                self.name_pointers
                    .insert(labels.to_vec(), u16::from_be_bytes([hi | POINTER_MASK, lo]));
            }
        }
    }

    pub fn name_pointer(&self, labels: &[Label]) -> Option<u16> {
        self.name_pointers.get(labels).copied()
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
}

/// Helper function to convert a `usize` into a `u16` (or return an error).
///
/// # Errors
///
/// If the value cannot be converted.
fn usize_to_u16(counter: usize) -> Result<u16, EncodeError> {
    if let Ok(t) = u16::try_from(counter) {
        Ok(t)
    } else {
        Err(EncodeError::CounterTooLarge {
            counter,
            bits: u16::BITS,
        })
    }
}
