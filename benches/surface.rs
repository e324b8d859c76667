use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use spherepack::{NeighborGraph, PackingConfig, SpherePacking};
use std::hint::black_box;

const TEST_POINTS: [usize; 3] = [100, 500, 2000];

fn seeded() -> SpherePacking {
    let config = PackingConfig {
        width: 300,
        height: 300,
        depth: 60,
        seed: Some(7),
        ..PackingConfig::default()
    };
    let mut packing = SpherePacking::new(config).unwrap();
    packing.fill_bottom_layer().unwrap();
    packing
}

fn benchmark_specific_surface(c: &mut Criterion) {
    let mut packing = seeded();
    packing.connect_neighbors();

    let mut group = c.benchmark_group("specific_surface");
    group.sample_size(10);
    for &points in &TEST_POINTS {
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, &p| {
            b.iter(|| black_box(packing.specific_surface(p).unwrap()))
        });
    }
    group.finish();
}

fn benchmark_neighbor_graph(c: &mut Criterion) {
    let packing = seeded();
    c.bench_function(&format!("neighbor_graph_{}_spheres", packing.spheres().len()), |b| {
        b.iter(|| black_box(NeighborGraph::from_proximity(packing.spheres())))
    });
}

criterion_group!(benches, benchmark_specific_surface, benchmark_neighbor_graph);
criterion_main!(benches);
