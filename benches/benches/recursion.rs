//! Recursion Benchmarks
//!
//! - multi-scalar multiplication
//! - proof generation and native verification by circuit size
//! - building the recursive circuit for each variant pair

use bls12_381::Scalar;
use commitments::msm::msm;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use plonk_arith::ComposerVariant;
use plonk_core::PlonkComposer;
use plonk_recursion::RecursiveCircuit;
use recursion_benches::utils::{random_msm_inputs, squaring_chain, BenchmarkConfig};

fn bench_msm(c: &mut Criterion) {
    let config = BenchmarkConfig::default();
    let mut rng = config.rng();
    let mut group = c.benchmark_group("msm");

    for size in [64usize, 256, 1024] {
        let (scalars, points) = random_msm_inputs(size, &mut rng);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| msm(black_box(&scalars), black_box(&points)).unwrap())
        });
    }
    group.finish();
}

fn bench_prove_and_verify(c: &mut Criterion) {
    let config = BenchmarkConfig::default();
    let srs = config.reference_string().unwrap();
    let mut group = c.benchmark_group("plonk");
    group.sample_size(10);

    for &gates in &config.sizes {
        let mut cs = squaring_chain(ComposerVariant::Standard, srs.clone(), gates);
        let prover = cs.create_prover().unwrap();
        let verifier = cs.create_verifier().unwrap();
        let proof = prover.construct_proof().unwrap();

        group.throughput(Throughput::Elements(gates as u64));
        group.bench_with_input(BenchmarkId::new("prove", gates), &gates, |b, _| {
            b.iter(|| prover.construct_proof().unwrap())
        });
        group.bench_with_input(BenchmarkId::new("verify", gates), &gates, |b, _| {
            b.iter(|| assert!(verifier.verify_proof(black_box(&proof)).unwrap()))
        });
    }
    group.finish();
}

fn bench_recursive_circuit(c: &mut Criterion) {
    let config = BenchmarkConfig::default();
    let srs = config.reference_string().unwrap();
    let inputs = [Scalar::from(5u64), Scalar::from(7u64), Scalar::from(12u64)];
    let variants = [ComposerVariant::Standard, ComposerVariant::Ultra];
    let mut group = c.benchmark_group("recursive_circuit");
    group.sample_size(10);

    for inner in variants {
        for outer in variants {
            let id = format!("{:?}_in_{:?}", inner, outer);
            group.bench_function(BenchmarkId::new("generate", id), |b| {
                b.iter(|| {
                    RecursiveCircuit::generate_with_reference_string(srs.clone(), inputs, inner, outer)
                        .unwrap()
                })
            });
        }
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_msm,
    bench_prove_and_verify,
    bench_recursive_circuit
);
criterion_main!(benches);
