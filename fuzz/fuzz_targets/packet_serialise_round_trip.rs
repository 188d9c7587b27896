#![no_main]
use libfuzzer_sys::fuzz_target;

use dns_wire::protocol::types::Packet;

fuzz_target!(|packet: Packet| {
    let serialised = packet.to_octets().unwrap();
    let deserialised = Packet::from_octets(&serialised);
    assert_eq!(Ok(packet), deserialised);
});
