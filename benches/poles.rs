use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use medial_poles::sampling::{fibonacci_sphere_samples, tube_samples};
use medial_poles::{
    analyze_poles, select_poles, Bounds, DVec3, DelaunayDual, MedialAxis, MedialConfig,
    SpokeOptions, VoronoiDiagram, VoronoiDual,
};

const SIZES: [usize; 3] = [250, 1000, 2000];

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for &size in &SIZES {
        let (points, normals) = fibonacci_sphere_samples(size, 10.0, DVec3::ZERO, 42);

        group.bench_with_input(BenchmarkId::new("sphere", size), &size, |b, _| {
            b.iter(|| MedialAxis::compute(points.clone(), normals.clone(), MedialConfig::default()))
        });
    }

    let (points, normals) = tube_samples(40.0, 2.0, 80, 24, 42);
    group.bench_function("tube_1920", |b| {
        b.iter(|| MedialAxis::compute(points.clone(), normals.clone(), MedialConfig::default()))
    });

    group.finish();
}

fn benchmark_phases(c: &mut Criterion) {
    let (points, normals) = fibonacci_sphere_samples(2000, 10.0, DVec3::ZERO, 7);
    let raw = DelaunayDual::new().compute(&points).unwrap();
    let bounds = Bounds::from_points(&points).unwrap();
    let diagram = VoronoiDiagram::from_raw(&raw, bounds, points.len()).unwrap();
    let selection = select_poles(&points, &normals, &diagram, 4).unwrap();

    let mut group = c.benchmark_group("phases");

    group.bench_function("select_poles", |b| {
        b.iter(|| select_poles(&points, &normals, &diagram, 4))
    });

    group.bench_function("analyze_poles", |b| {
        b.iter(|| analyze_poles(&diagram.loci, &selection.sources, &points, SpokeOptions::default()))
    });

    group.finish();
}

criterion_group!(benches, benchmark_pipeline, benchmark_phases);
criterion_main!(benches);
