// Copyright (C) 2020 Matthew Waters <matthew@centricular.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use candidateparser::candidate::parse_candidate;
use candidateparser::tokenize::tokenize;

const LINES: [(&str, &str); 3] = [
    ("Host", "1 1 UDP 2130706431 192.168.1.1 8998 typ host"),
    (
        "Related",
        "candidate:842163049 1 UDP 1677729535 203.0.113.7 46154 typ srflx raddr 192.168.1.2 rport 46154",
    ),
    (
        "Extensions",
        "candidate:842163049 1 UDP 1677729535 203.0.113.7 46154 typ srflx raddr 192.168.1.2 rport 46154 generation 0 ufrag EsAw network-id 1 network-cost 999",
    ),
];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Candidate");
    for (name, line) in LINES {
        group.throughput(criterion::Throughput::Bytes(line.len() as u64));
        group.bench_function(BenchmarkId::new("Tokenize", name), |b| {
            b.iter(|| tokenize(black_box(line.as_bytes())).count())
        });
        group.bench_function(BenchmarkId::new("Parse", name), |b| {
            b.iter(|| parse_candidate(black_box(line.as_bytes())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
