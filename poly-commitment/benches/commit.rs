//! Run this bench using `cargo criterion -p honk-poly-commitment --bench commit`

use ark_bn254::{Fr, G1Affine};
use ark_ff::UniformRand;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use honk_poly_commitment::SRS;

fn benchmark_commit_at_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("SRS commit");
    let mut rng = ark_std::test_rng();
    let srs = SRS::<G1Affine>::create(1 << 16);

    for log_n in [10, 12, 14, 15] {
        let n = 1usize << log_n;
        let coeffs: Vec<Fr> = (0..n).map(|_| Fr::rand(&mut rng)).collect();
        group.bench_with_input(BenchmarkId::new("commit_at_offset", n), &n, |b, _| {
            b.iter(|| black_box(srs.commit_at_offset(&coeffs, 1).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_commit_at_offset);
criterion_main!(benches);
