use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polymul::karatsuba::karatsuba_mul;
use polymul::schoolbook_mul::schoolbook_mul;
use polymul::{distributed_karatsuba_mul, distributed_regular_mul, LocalCluster, Poly};
use rand::SeedableRng;

fn random_poly(rng: &mut rand_chacha::ChaCha8Rng, size: usize) -> Poly {
    Poly::random(rng, size - 1, 9)
}
fn bench_schoolbook_mul(c: &mut Criterion) {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    let a = random_poly(&mut rng, 1000);
    let b = random_poly(&mut rng, 1000);
    c.bench_function("schoolbook_mul_1k", |bench| {
        bench.iter(|| schoolbook_mul(black_box(&a), black_box(&b)))
    });
}
fn bench_karatsuba_mul(c: &mut Criterion) {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    let a = random_poly(&mut rng, 1000);
    let b = random_poly(&mut rng, 1000);
    c.bench_function("karatsuba_mul_1k", |bench| {
        bench.iter(|| karatsuba_mul(black_box(&a), black_box(&b)));
    });
}
fn bench_karatsuba_mul_10k(c: &mut Criterion) {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    let a = random_poly(&mut rng, 10000);
    let b = random_poly(&mut rng, 10000);
    c.bench_function("karatsuba_mul_10k", |bench| {
        bench.iter(|| karatsuba_mul(black_box(&a), black_box(&b)));
    });
}
fn bench_distributed_regular_mul_10k(c: &mut Criterion) {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    let a = random_poly(&mut rng, 10000);
    let b = random_poly(&mut rng, 10000);
    c.bench_function("distributed_regular_mul_10k_4_roles", |bench| {
        bench.iter(|| {
            LocalCluster::new(4)
                .run(|comm| distributed_regular_mul(comm, &a, &b))
                .unwrap()
        });
    });
}
fn bench_distributed_karatsuba_mul_10k(c: &mut Criterion) {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    let a = random_poly(&mut rng, 10000);
    let b = random_poly(&mut rng, 10000);
    c.bench_function("distributed_karatsuba_mul_10k_4_roles", |bench| {
        bench.iter(|| {
            LocalCluster::new(4)
                .run(|comm| distributed_karatsuba_mul(comm, &a, &b))
                .unwrap()
        });
    });
}
fn bench_add_assign(c: &mut Criterion) {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
    let a = random_poly(&mut rng, 1000);
    let b = random_poly(&mut rng, 1000);
    c.bench_function("add_assign", |bench| {
        bench.iter(|| {
            let mut sum = a.clone();
            sum += &b;
            sum
        });
    });
}

fn profiled() -> Criterion {
    Criterion::default().sample_size(10)
}
criterion_group!(
    name = benches;
    config = profiled();
    targets =
        bench_schoolbook_mul,
        bench_karatsuba_mul,
        bench_karatsuba_mul_10k,
        bench_distributed_regular_mul_10k,
        bench_distributed_karatsuba_mul_10k,
        bench_add_assign,
);
criterion_main!(benches);
