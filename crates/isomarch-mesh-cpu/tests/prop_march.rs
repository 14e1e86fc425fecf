use isomarch_geom::Vec3;
use isomarch_grid::{CUBE_CORNER_OFFSETS, GridDims, GridPoint, PointGrid3, SQUARE_CORNER_OFFSETS};
use isomarch_mesh_cpu::tables::{SQUARE_CASES, cube_triangles};
use isomarch_mesh_cpu::{
    EdgeInterp, MeshBuild, WeldMode, WeldingSink, classify_cube, emit_square, interpolate_with,
    march_cube, square_polygon,
};
use proptest::prelude::*;

fn value() -> impl Strategy<Value = f32> {
    -4.0f32..4.0
}

// Bounded away from zero so no corner sits on the threshold.
fn off_threshold() -> impl Strategy<Value = f32> {
    (0.1f32..4.0, any::<bool>()).prop_map(|(v, neg)| if neg { -v } else { v })
}

fn point() -> impl Strategy<Value = Vec3> {
    (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn unit_cube(values: [f32; 8]) -> [GridPoint; 8] {
    let mut out = [GridPoint::default(); 8];
    for (i, o) in CUBE_CORNER_OFFSETS.iter().enumerate() {
        out[i] = GridPoint::new(Vec3::new(o[0] as f32, o[1] as f32, o[2] as f32), values[i]);
    }
    out
}

fn unit_square(values: [f32; 4]) -> [GridPoint; 4] {
    let mut out = [GridPoint::default(); 4];
    for (i, o) in SQUARE_CORNER_OFFSETS.iter().enumerate() {
        out[i] = GridPoint::new(Vec3::new(o[0] as f32, 0.0, o[1] as f32), values[i]);
    }
    out
}

proptest! {
    // Clamped interpolation never leaves the segment
    #[test]
    fn clamped_interp_stays_on_segment(
        pa in point(), pb in point(), va in value(), vb in value(), th in value()
    ) {
        let p = interpolate_with(pa, va, pb, vb, th, EdgeInterp::LerpClamped);
        let lo = pa.min(pb);
        let hi = pa.max(pb);
        let eps = 1e-4;
        prop_assert!(p.x >= lo.x - eps && p.x <= hi.x + eps);
        prop_assert!(p.y >= lo.y - eps && p.y <= hi.y + eps);
        prop_assert!(p.z >= lo.z - eps && p.z <= hi.z + eps);
    }

    // Midpoint mode ignores the values entirely
    #[test]
    fn midpoint_mode_is_exact(pa in point(), pb in point(), va in value(), vb in value()) {
        let p = interpolate_with(pa, va, pb, vb, 0.0, EdgeInterp::Midpoint);
        prop_assert_eq!(p, (pa + pb) * 0.5);
    }

    // Emitted count follows the table and every vertex stays inside the cell,
    // since crossed edges always straddle the threshold
    #[test]
    fn cube_emits_table_rows_inside_cell(vals in prop::array::uniform8(value()), th in -1.0f32..1.0) {
        let cube = unit_cube(vals);
        let state = classify_cube(&vals, th);
        let mut m = MeshBuild::new();
        let n = march_cube(&cube, th, EdgeInterp::Lerp, &mut m);
        prop_assert_eq!(n, cube_triangles(state).len());
        prop_assert_eq!(m.triangle_count(), n);
        for v in m.vertices() {
            for c in v.to_array() {
                prop_assert!((-1e-5..=1.0 + 1e-5).contains(&c));
            }
        }
    }

    // Welding never adds vertices and keeps every surviving triangle
    #[test]
    fn keyed_weld_shrinks_cube(vals in prop::array::uniform8(value())) {
        let cube = unit_cube(vals);
        let mut soup = MeshBuild::new();
        march_cube(&cube, 0.0, EdgeInterp::Lerp, &mut soup);
        let mut welded = MeshBuild::new();
        let mut sink = WeldingSink::new(&mut welded, WeldMode::Keyed);
        march_cube(&cube, 0.0, EdgeInterp::Lerp, &mut sink);
        let collapsed = sink.collapsed;
        prop_assert!(welded.vertex_count() <= soup.vertex_count());
        prop_assert_eq!(welded.triangle_count() + collapsed, soup.triangle_count());
    }

    // Polygon size matches the table and flat output always faces up
    #[test]
    fn square_polygons_face_up(vals in prop::array::uniform4(0.0f32..1.0)) {
        let sq = unit_square(vals);
        let poly = square_polygon(&sq, 0.5, EdgeInterp::LerpClamped);
        prop_assert_eq!(poly.vertices().len(), SQUARE_CASES[poly.state as usize].vertices.len());
        let mut m = MeshBuild::new();
        emit_square(&poly, &mut m);
        for t in 0..m.triangle_count() {
            let [a, b, c] = m.triangle_positions(t);
            prop_assert!((b - a).cross(c - a).y >= -1e-6);
        }
    }

    // Two cells sharing a face place every crossing on it at the same bits
    #[test]
    fn shared_face_crossings_are_bit_identical(vals in prop::collection::vec(off_threshold(), 12)) {
        let g = PointGrid3::from_values(GridDims::new(2, 1, 1), Vec3::ZERO, Vec3::ONE, &vals).unwrap();
        let on_face = |x: usize| {
            let mut m = MeshBuild::new();
            march_cube(&g.cube_corners(x, 0, 0), 0.0, EdgeInterp::Lerp, &mut m);
            let mut bits: Vec<[u32; 3]> = m
                .vertices()
                .filter(|v| v.x == 1.0)
                .map(|v| v.to_array().map(f32::to_bits))
                .collect();
            bits.sort();
            bits.dedup();
            bits
        };
        prop_assert_eq!(on_face(0), on_face(1));
    }
}
