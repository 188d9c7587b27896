use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use std::hint::black_box;
use std::net::Ipv4Addr;

use dns_wire::protocol::query::build_query;
use dns_wire::protocol::types::test_util::*;
use dns_wire::protocol::types::*;

#[allow(non_snake_case)]
fn bench__query(c: &mut Criterion) {
    c.bench_function("serialise/query", |b| {
        b.iter(|| build_query(black_box("www.example.com."), RecordType::A, 1234))
    });

    let serialised = build_query("www.example.com.", RecordType::A, 1234).unwrap();
    c.bench_function("deserialise/query", |b| {
        b.iter(|| Packet::from_octets(black_box(&serialised)))
    });
}

#[allow(non_snake_case)]
fn bench__answer__small(c: &mut Criterion) {
    let mut packet = Packet::from_question(1234, FLAG_QR, a_question("www.example.com."));
    packet.answers = vec![a_record("www.example.com.", Ipv4Addr::new(1, 1, 1, 1))];

    c.bench_function("serialise/answer/small", |b| {
        b.iter_batched(
            || packet.clone(),
            |packet| packet.to_octets(),
            BatchSize::SmallInput,
        )
    });

    let serialised = packet.to_octets().unwrap();
    c.bench_function("deserialise/answer/small", |b| {
        b.iter(|| Packet::from_octets(black_box(&serialised)))
    });
}

#[allow(non_snake_case)]
fn bench__answer__big(c: &mut Criterion) {
    let mut packet = Packet::from_question(1234, FLAG_QR, a_question("www.example.com."));

    let count = 128;

    for i in 0..count {
        packet.answers.push(opaque_record(
            "www.example.com.",
            RecordType::CNAME,
            &format!("www.cname-target-{i:?}.example.com."),
        ));
    }
    for i in 0..count {
        packet.authorities.push(opaque_record(
            &format!("cname-target-{i:?}.example.com."),
            RecordType::NS,
            &format!("ns-{i:?}.example.com."),
        ));
    }
    for i in 0..count {
        packet.additionals.push(a_record(
            &format!("ns-{i:?}.example.com."),
            Ipv4Addr::new(1, 1, 1, 1),
        ));
    }

    c.bench_function("serialise/answer/big", |b| {
        b.iter_batched(
            || packet.clone(),
            |packet| packet.to_octets(),
            BatchSize::SmallInput,
        )
    });

    let serialised = packet.to_octets().unwrap();
    c.bench_function("deserialise/answer/big", |b| {
        b.iter(|| Packet::from_octets(black_box(&serialised)))
    });
}

fn opaque_record(name: &str, rtype: RecordType, target_name: &str) -> ResourceRecord {
    ResourceRecord {
        rtype,
        data: domain(target_name).to_octets().freeze(),
        ..unknown_record(name, &[])
    }
}

criterion_group!(
    benches,
    bench__query,
    bench__answer__small,
    bench__answer__big,
);
criterion_main!(benches);
