#![no_main]
use libfuzzer_sys::fuzz_target;

use dns_wire::protocol::types::Packet;

fuzz_target!(|data: &[u8]| {
    if let Ok(deserialised) = Packet::from_octets(data) {
        let serialised = deserialised.to_octets().unwrap();
        let re_deserialised = Packet::from_octets(&serialised);
        assert_eq!(Ok(deserialised), re_deserialised);
    }
});
