use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mrindex_core::{mapreduce, reduce::reduce, InMemoryCorpus, InMemoryDocument, KeyValue};

fn synthetic_corpus(docs: u32) -> InMemoryCorpus {
    let words = ["index", "term", "posting", "reduce", "map", "bucket", "hash", "combine", "Dictionary", "prüfung"];
    (0..docs)
        .map(|id| {
            let body: Vec<&str> = (0..64).map(|i| words[((id as usize) * 7 + i * 3) % words.len()]).collect();
            InMemoryDocument::new(id, [("body", body.join(" "))])
        })
        .collect()
}

fn bench_mapreduce(c: &mut Criterion) {
    let corpus = synthetic_corpus(2_000);
    let mut group = c.benchmark_group("mapreduce");
    for (mappers, reducers) in [(1, 1), (4, 4), (8, 16)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{mappers}x{reducers}")),
            &(mappers, reducers),
            |b, &(m, r)| b.iter(|| mapreduce(&corpus, &["body"], m, r, false)),
        );
    }
    group.finish();
}

fn bench_reduce_hot_term(c: &mut Criterion) {
    // One term spread over many documents stresses the per-document lookup.
    let part: Vec<KeyValue> = (0..50_000u32).map(|i| KeyValue::new("hot", i % 5_000)).collect();
    c.bench_function("reduce_hot_term", |b| b.iter(|| reduce(&part)));
}

criterion_group!(benches, bench_mapreduce, bench_reduce_hot_term);
criterion_main!(benches);
