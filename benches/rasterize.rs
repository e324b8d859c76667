use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use spherepack::{Layer, PackingConfig, SpherePacking};
use std::hint::black_box;

const DOMAINS: [(usize, usize, usize); 3] = [(100, 100, 40), (200, 200, 60), (400, 300, 80)];

fn seeded(width: usize, height: usize, depth: usize) -> SpherePacking {
    let config = PackingConfig {
        width,
        height,
        depth,
        seed: Some(42),
        ..PackingConfig::default()
    };
    let mut packing = SpherePacking::new(config).unwrap();
    packing.fill_bottom_layer().unwrap();
    packing
}

fn benchmark_cross_sections(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_sections");
    group.sample_size(20);

    for &(x, y, z) in &DOMAINS {
        let mut packing = seeded(x, y, z);
        println!("{}x{}x{}: {} spheres", x, y, z, packing.spheres().len());
        group.bench_with_input(BenchmarkId::from_parameter(format!("{x}x{y}x{z}")), &z, |b, _| {
            b.iter(|| {
                packing.rasterize_cross_sections().unwrap();
            })
        });
    }
    group.finish();
}

fn benchmark_fill_circle(c: &mut Criterion) {
    let mut layer = Layer::new(512, 512);
    c.bench_function("fill_circle_r40", |b| {
        b.iter(|| {
            layer.clear();
            layer.fill_circle(black_box(256.3), black_box(255.7), black_box(40.0));
        })
    });
}

fn benchmark_porosity(c: &mut Criterion) {
    let mut packing = seeded(200, 200, 60);
    packing.rasterize_cross_sections().unwrap();
    c.bench_function("porosity_200x200x60", |b| {
        b.iter(|| black_box(packing.porosity()))
    });
}

criterion_group!(benches, benchmark_cross_sections, benchmark_fill_circle, benchmark_porosity);
criterion_main!(benches);
