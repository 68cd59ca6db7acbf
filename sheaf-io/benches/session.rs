use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sheaf_io::{
    write_rows_parallel, MemorySink, NdjsonSink, ParallelConfig, SchemaDescriptor,
    SessionOptions, WriteSession,
};
use sheaf_test_utils::TestDataGenerator;

fn profile_session() -> WriteSession {
    let json = TestDataGenerator::profile_descriptor().to_json_string();
    let descriptor = SchemaDescriptor::from_json_str(&json).unwrap();
    WriteSession::open(&descriptor, SessionOptions::default()).unwrap()
}

fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_open");

    for (groups, leaves) in [(4, 8), (32, 32)] {
        let json = TestDataGenerator::wide_descriptor(groups, leaves).to_json_string();
        let descriptor = SchemaDescriptor::from_json_str(&json).unwrap();

        group.throughput(Throughput::Elements((groups * leaves) as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", groups, leaves)),
            &descriptor,
            |b, descriptor| {
                b.iter(|| {
                    black_box(WriteSession::open(descriptor, SessionOptions::default()).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_write_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_rows");
    let session = profile_session();
    let rows = TestDataGenerator::profile_rows(10_000);
    group.throughput(Throughput::Elements(rows.len() as u64));

    group.bench_function("sequential_ndjson", |b| {
        b.iter(|| {
            let mut sink = NdjsonSink::new(Vec::with_capacity(1 << 20));
            black_box(session.write_rows(rows.clone(), &mut sink).unwrap());
        });
    });

    for threads in [2, 4] {
        let config = ParallelConfig {
            max_threads: Some(threads),
        };
        group.bench_with_input(
            BenchmarkId::new("parallel_memory", threads),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut sink = MemorySink::new();
                    black_box(write_rows_parallel(&session, rows.clone(), &mut sink, config).unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_open, bench_write_rows);
criterion_main!(benches);
