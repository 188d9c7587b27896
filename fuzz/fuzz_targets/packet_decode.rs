#![no_main]
use libfuzzer_sys::fuzz_target;

use dns_wire::protocol::query::decode_packet;

fuzz_target!(|data: &[u8]| {
    let _ = decode_packet(data);
});
