use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use isomarch_field::{LayeredNoiseField, LayeredNoiseParams, SphereField};
use isomarch_geom::Vec3;
use isomarch_grid::{GridDims, PointGrid2, PointGrid3};
use isomarch_mesh_cpu::{
    CubeOptions, SquareOptions, WeldMode, march_cubes, march_cubes_par, march_squares,
    recalculate_normals,
};

fn sphere_grid(n: usize) -> PointGrid3 {
    let c = n as f32 * 0.5 + 0.13;
    let f = SphereField::new(Vec3::splat(c), n as f32 * 0.4);
    PointGrid3::sample_par(GridDims::cubic(n), Vec3::ZERO, Vec3::ONE, &f).expect("unit cells")
}

fn bench_cubes_sphere(c: &mut Criterion) {
    let mut group = c.benchmark_group("march_cubes_sphere");
    let g = sphere_grid(48);
    for weld in [WeldMode::Off, WeldMode::Keyed] {
        let opts = CubeOptions {
            weld,
            ..CubeOptions::default()
        };
        group.bench_function(format!("serial_48_{:?}", weld), |b| {
            b.iter(|| black_box(march_cubes(&g, &opts)))
        });
        group.bench_function(format!("par_48_{:?}", weld), |b| {
            b.iter(|| black_box(march_cubes_par(&g, &opts)))
        });
    }
    group.finish();
}

fn bench_terrain_with_normals(c: &mut Criterion) {
    let mut group = c.benchmark_group("march_cubes_terrain");
    group.measurement_time(Duration::from_secs(8));
    let f = LayeredNoiseField::new(LayeredNoiseParams::default());
    let g = PointGrid3::sample_par(GridDims::new(64, 12, 64), Vec3::ZERO, Vec3::ONE, &f).expect("unit cells");
    let opts = CubeOptions {
        weld: WeldMode::Keyed,
        ..CubeOptions::default()
    };
    group.bench_function("64x12x64_keyed_normals", |b| {
        b.iter(|| {
            let (mut m, _) = march_cubes(&g, &opts);
            recalculate_normals(&mut m);
            black_box(m);
        })
    });
    group.finish();
}

fn bench_squares(c: &mut Criterion) {
    let mut group = c.benchmark_group("march_squares");
    let f = |p: Vec3| ((p.x * 0.3).sin() * (p.z * 0.3).cos() + 1.0) * 0.5;
    let g = PointGrid2::centered(128, 128, Vec3::ZERO, 0.5, &f).expect("positive cell");
    group.bench_function("128x128_flat", |b| {
        b.iter(|| black_box(march_squares(&g, &SquareOptions::default())))
    });
    let extruded = SquareOptions {
        extrude: Some(1.0),
        ..SquareOptions::default()
    };
    group.bench_function("128x128_extruded", |b| {
        b.iter(|| black_box(march_squares(&g, &extruded)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_cubes_sphere,
    bench_terrain_with_normals,
    bench_squares
);
criterion_main!(benches);
