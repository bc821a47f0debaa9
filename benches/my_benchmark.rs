use bindelta::{decode, encode};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

/// Build a synthetic "firmware revision" pair: a reference blob and a
/// target that's mostly identical with one perturbed region and a short
/// appended tail, the shape the format is optimized for.
fn firmware_pair(len: usize) -> (Vec<u8>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(7);
    let reference: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
    let mut target = reference.clone();
    let perturb_start = len / 4;
    let perturb_end = len / 3;
    rng.fill(&mut target[perturb_start..perturb_end]);
    target.extend_from_slice(b"appended firmware metadata tail");
    (reference, target)
}

fn criterion_benchmark(c: &mut Criterion) {
    let (reference, target) = firmware_pair(4_000_000);

    c.bench_function("encode firmware revision", |b| {
        b.iter(|| encode(black_box(&reference), black_box(&target), 64).unwrap())
    });

    let patch = encode(&reference, &target, 64).unwrap();
    c.bench_function("decode firmware revision", |b| {
        b.iter(|| decode(black_box(&reference), black_box(&patch)).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
