use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::{Point3, Vector3};
use rugo_core::{analyze, AnalyzeConfig};

/// Synthetic rough plate: sinusoidal texture over a flat sheet.
fn make_plate(n: usize) -> (Vec<Point3<f64>>, Vec<Vector3<f64>>) {
    let mut vertices = Vec::with_capacity(n * n);
    let mut normals = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let x = i as f64 * 0.1;
            let y = j as f64 * 0.1;
            let z = 0.02 * (x * 3.0).sin() * (y * 2.0).cos();
            vertices.push(Point3::new(x, y, z));
            normals.push(
                Vector3::new(
                    -0.06 * (x * 3.0).cos() * (y * 2.0).cos(),
                    0.04 * (x * 3.0).sin() * (y * 2.0).sin(),
                    1.0,
                )
                .normalize(),
            );
        }
    }
    (vertices, normals)
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    for n in [100, 300] {
        let (vertices, normals) = make_plate(n);
        let config = AnalyzeConfig::default();
        group.bench_function(format!("plate_{}x{}", n, n), |b| {
            b.iter(|| analyze(black_box(&vertices), black_box(&normals), &config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analyze);
criterion_main!(benches);
