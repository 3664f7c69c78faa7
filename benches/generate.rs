use dkim_vectors::witness_gen::header::render_header;
use dkim_vectors::witness_gen::padding::pad_sha256;
use dkim_vectors::witness_gen::signature::{generate_keypair, modulus, sign, KEY_BITS};
use dkim_vectors::{generate, EmailFormat, GenerationConfig, LimbParams};
use rand::rngs::StdRng;
use rand::SeedableRng;

use criterion::{criterion_group, criterion_main, Criterion};

fn bench_padding(c: &mut Criterion) {
    let header = render_header(EmailFormat::FullRegex, "123456");
    c.bench_function("pad-full-regex", |b| {
        b.iter(|| pad_sha256(header.as_bytes(), 512).expect("header fits"))
    });
}

fn bench_limbs(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let private_key = generate_keypair(&mut rng, KEY_BITS).expect("keygen should not fail");
    let n = modulus(&private_key);
    let params = LimbParams::default();

    c.bench_function("limbs-2048", |b| {
        b.iter(|| params.to_decimal(&n).expect("modulus fits"))
    });

    let header = render_header(EmailFormat::Hybrid, "123456");
    c.bench_function("sign-2048", |b| {
        b.iter(|| sign(&mut rng, &private_key, header.as_bytes()).expect("sign should not fail"))
    });
}

fn bench_generate(c: &mut Criterion) {
    let config = GenerationConfig::for_format(EmailFormat::FixedPosition);
    let mut rng = StdRng::seed_from_u64(1);

    let mut group = c.benchmark_group("generate");
    // keygen dominates and is slow
    group.sample_size(10);
    group.bench_function("fixed-position-2048", |b| {
        b.iter(|| generate(&config, &mut rng).expect("generation should not fail"))
    });
    group.finish();
}

criterion_group!(benches, bench_padding, bench_limbs, bench_generate);
criterion_main!(benches);
