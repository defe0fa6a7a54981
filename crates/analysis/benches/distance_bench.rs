use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use landgen_analysis::analysis::{
    IsolationAnalysis, LowerTriangle, distance_matrix, pairwise_distances, pca,
};
use landgen_sim::genome::{Genotype, Individual};
use landgen_sim::simulation::Species;
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::hint::black_box;

fn random_dosage(n_individuals: usize, n_loci: usize) -> DMatrix<f64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    DMatrix::from_fn(n_individuals, n_loci, |_, _| rng.random_range(0..3) as f64 / 2.0)
}

fn create_test_species(n_individuals: u64, n_loci: usize) -> Species {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
    let individuals = (0..n_individuals)
        .map(|id| {
            let x: f64 = rng.random_range(0.0..50.0);
            let loci: Vec<[u8; 2]> = (0..n_loci)
                .map(|_| {
                    let p = x / 50.0;
                    [u8::from(rng.random_bool(p)), u8::from(rng.random_bool(p))]
                })
                .collect();
            let env = vec![rng.random_range(0.0..1.0)];
            Individual::new(id, Genotype::new(&loci).unwrap(), (x, rng.random_range(0.0..50.0)), env)
        })
        .collect();
    Species::new("bench", 0, individuals).unwrap()
}

fn bench_pairwise_distances(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairwise_distances");

    for &(n_ind, n_loci) in &[(100, 100), (500, 100), (1000, 100)] {
        let points = random_dosage(n_ind, n_loci);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{n_ind}ind_{n_loci}loci")),
            &points,
            |b, points| {
                b.iter(|| black_box(pairwise_distances(points).unwrap()));
            },
        );
    }

    group.finish();
}

fn bench_distance_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_matrix");

    for &n_ind in &[100, 500] {
        let points = random_dosage(n_ind, 100);
        group.bench_with_input(BenchmarkId::from_parameter(n_ind), &points, |b, points| {
            b.iter(|| black_box(distance_matrix(points).unwrap()));
        });
    }

    group.finish();
}

fn bench_lower_triangle(c: &mut Criterion) {
    let points = random_dosage(500, 100);
    c.bench_function("lower_triangle_500ind", |b| {
        b.iter(|| black_box(LowerTriangle::new(&points).map(|(_, _, d)| d).sum::<f64>()));
    });
}

fn bench_pca(c: &mut Criterion) {
    let mut group = c.benchmark_group("pca");

    for &n_ind in &[100, 300] {
        let data = random_dosage(n_ind, 100);
        group.bench_with_input(BenchmarkId::from_parameter(n_ind), &data, |b, data| {
            b.iter(|| black_box(pca(data, None).unwrap()));
        });
    }

    group.finish();
}

fn bench_isolation(c: &mut Criterion) {
    let species = create_test_species(100, 100);
    let analysis = IsolationAnalysis::default();
    c.bench_function("isolation_100ind_100loci", |b| {
        b.iter(|| black_box(analysis.run(&species).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_pairwise_distances,
    bench_distance_matrix,
    bench_lower_triangle,
    bench_pca,
    bench_isolation
);
criterion_main!(benches);
