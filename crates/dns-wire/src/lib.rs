#![warn(clippy::pedantic)]
// Don't care enough to fix
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::similar_names)]
#![allow(clippy::wildcard_imports)]

pub mod protocol;

pub use self::protocol::deserialise::{ConsumableBuffer, DecodeError};
pub use self::protocol::query::{
    build_query, build_query_from, build_query_with_flags, decode_packet, FixedId, IdSource,
};
pub use self::protocol::rdata::{RdataError, RecordData};
pub use self::protocol::serialise::{encode_name, EncodeError, WritableBuffer};
pub use self::protocol::types::{
    DomainName, Header, Label, Packet, Question, RecordClass, RecordType, ResourceRecord,
};
