//! Interpretation of RDATA.  Records carry their data as opaque octets;
//! this module turns those octets into something more useful for the
//! record types which have a fixed, self-contained format.

use std::fmt;
use std::net::Ipv4Addr;

use crate::protocol::types::*;

/// The interpreted form of a record's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordData<'a> {
    /// The data of an `A` record.
    Address(Ipv4Addr),

    /// Data of any other type, left as it was.
    Opaque(&'a [u8]),
}

impl fmt::Display for RecordData<'_> {
    /// Addresses are printed normally, anything else in the generic
    /// `\# <len> <hex>` form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::Address(address) => write!(f, "{address}"),
            RecordData::Opaque(octets) => {
                write!(f, "\\# {}", octets.len())?;
                if !octets.is_empty() {
                    write!(f, " ")?;
                    for octet in *octets {
                        write!(f, "{octet:02x}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Interpret `octets` as the data of a record of type `rtype`.
///
/// # Errors
///
/// If the octets are not valid for the type.
pub fn interpret(rtype: RecordType, octets: &[u8]) -> Result<RecordData<'_>, RdataError> {
    match rtype {
        RecordType::A => match <[u8; 4]>::try_from(octets) {
            Ok(address) => Ok(RecordData::Address(Ipv4Addr::from(address))),
            Err(_) => Err(RdataError::BadLength {
                rtype,
                expected: 4,
                actual: octets.len(),
            }),
        },
        _ => Ok(RecordData::Opaque(octets)),
    }
}

impl ResourceRecord {
    /// # Errors
    ///
    /// If the data is not valid for the record type.
    pub fn rdata(&self) -> Result<RecordData<'_>, RdataError> {
        interpret(self.rtype, &self.data)
    }

    /// The address of an `A` record, or `None` for any other record
    /// (including an `A` record with malformed data).
    pub fn address(&self) -> Option<Ipv4Addr> {
        match self.rdata() {
            Ok(RecordData::Address(address)) => Some(address),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceRecord {
    /// Zone-file style: `name ttl class type data`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t",
            self.name, self.ttl, self.rclass, self.rtype
        )?;
        match self.rdata() {
            Ok(rdata) => write!(f, "{rdata}"),
            Err(_) => write!(f, "{}", RecordData::Opaque(&self.data)),
        }
    }
}

/// Errors encountered when interpreting RDATA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum RdataError {
    #[error("{rtype} record has {actual} octets of data, expected {expected}")]
    BadLength {
        rtype: RecordType,
        expected: usize,
        actual: usize,
    },
}
