//! 재조립기 / 타임스탬프 벤치마크
//!
//! 멀티라인 재조립과 타임스탬프 해석, push 본문 생성의 처리량을 측정합니다.

use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use pgloki_core::config::{ClampPolicy, SourceConfig};
use pgloki_shipper::payload::PushRequest;
use pgloki_shipper::reassembler::{Entries, LineStart};
use pgloki_shipper::timestamp::TimestampResolver;

/// 한 줄짜리 엔트리
const SINGLE_LINE: &str = "2024-12-24 10:00:00.000 CET [4211] LOG:  checkpoint starting: time";

/// 멀티라인 엔트리의 첫 줄
const STATEMENT_HEAD: &str = "2024-12-24 10:00:01.123 CET [4212] ERROR:  duplicate key value violates unique constraint \"users_pkey\"";

/// 멀티라인 엔트리의 연속 라인
const STATEMENT_TAIL: [&str; 3] = [
    "\tDETAIL:  Key (id)=(42) already exists.",
    "\tSTATEMENT:  INSERT INTO users (id, name)",
    "\t    VALUES (42, 'alice');",
];

/// `entries`개 엔트리로 구성된 라인 목록 생성 (짝수: 한 줄, 홀수: 네 줄)
fn generate_lines(entries: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(entries * 3);
    for i in 0..entries {
        if i % 2 == 0 {
            lines.push(SINGLE_LINE.to_owned());
        } else {
            lines.push(STATEMENT_HEAD.to_owned());
            lines.extend(STATEMENT_TAIL.iter().map(|s| (*s).to_owned()));
        }
    }
    lines
}

fn bench_reassemble(c: &mut Criterion) {
    let line_start = LineStart::from_config(&SourceConfig::default()).unwrap();

    let mut group = c.benchmark_group("reassemble");
    for size in [100usize, 1_000, 10_000] {
        let lines = generate_lines(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &lines, |b, lines| {
            b.iter(|| Entries::new(black_box(lines).iter(), &line_start).count())
        });
    }
    group.finish();
}

fn bench_line_start(c: &mut Criterion) {
    let line_start = LineStart::from_config(&SourceConfig::default()).unwrap();

    let mut group = c.benchmark_group("line_start");
    group.throughput(Throughput::Elements(1));
    group.bench_function("match", |b| {
        b.iter(|| line_start.is_match(black_box(SINGLE_LINE)))
    });
    group.bench_function("no_match", |b| {
        b.iter(|| line_start.is_match(black_box(STATEMENT_TAIL[0])))
    });
    group.finish();
}

fn bench_timestamp(c: &mut Criterion) {
    let resolver = TimestampResolver::from_config(&SourceConfig::default(), ClampPolicy::Now)
        .unwrap();
    let now = resolver.default_nanos();

    let mut group = c.benchmark_group("timestamp");
    group.throughput(Throughput::Elements(1));
    group.bench_function("parsed", |b| {
        b.iter(|| resolver.resolve(black_box(SINGLE_LINE), now))
    });
    group.bench_function("default_fallback", |b| {
        b.iter(|| resolver.resolve(black_box("orphan continuation line"), now))
    });
    group.finish();
}

fn bench_payload(c: &mut Criterion) {
    let labels: BTreeMap<String, String> = [
        ("job".to_owned(), "postgresql-logs".to_owned()),
        ("source".to_owned(), "postgresql".to_owned()),
    ]
    .into_iter()
    .collect();
    let entry = format!("{STATEMENT_HEAD} {}", STATEMENT_TAIL.join(" "));

    c.bench_function("payload_to_json", |b| {
        b.iter(|| {
            PushRequest::single(&labels, 1_734_994_800_000_000_000, black_box(&entry))
                .to_json()
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_reassemble,
    bench_line_start,
    bench_timestamp,
    bench_payload
);
criterion_main!(benches);
