//! Benchmarks for context merging and marshalling.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wirecontext::context::Context;
use wirecontext::merge::Merger;
use wirecontext::observability::NoOpMergeObserver;
use wirecontext::testing::{sibling_contexts, TestIdentity};
use std::sync::Arc;

fn merge_benchmark(c: &mut Criterion) {
    let identity = TestIdentity::new();
    let merger = Merger::default().with_observer(Arc::new(NoOpMergeObserver));

    let mut group = c.benchmark_group("merge");
    for count in [2, 8, 32] {
        let sources = sibling_contexts(&identity, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &sources, |b, sources| {
            b.iter(|| {
                let mut target = Context::background();
                merger.merge(&mut target, black_box(sources)).ok();
                target
            });
        });
    }
    group.finish();
}

fn marshal_benchmark(c: &mut Criterion) {
    let ctx = TestIdentity::new().context();
    let Ok(bytes) = ctx.to_json() else {
        return;
    };

    c.bench_function("to_json", |b| b.iter(|| black_box(&ctx).to_json().ok()));
    c.bench_function("from_json", |b| {
        b.iter(|| Context::from_json(black_box(&bytes)).ok());
    });
}

criterion_group!(benches, merge_benchmark, marshal_benchmark);
criterion_main!(benches);
