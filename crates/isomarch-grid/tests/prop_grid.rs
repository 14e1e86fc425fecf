use isomarch_geom::Vec3;
use isomarch_grid::{CUBE_CORNER_OFFSETS, GridDims, PointGrid2, PointGrid3};
use proptest::prelude::*;

fn dim() -> impl Strategy<Value = usize> {
    1usize..=6
}

fn cell() -> impl Strategy<Value = f32> {
    0.25f32..4.0
}

// Encodes the lattice coordinate into the value so lookups can be checked.
fn coord_code(p: Vec3, origin: Vec3, c: Vec3) -> f32 {
    let x = ((p.x - origin.x) / c.x).round();
    let y = ((p.y - origin.y) / c.y).round();
    let z = ((p.z - origin.z) / c.z).round();
    x + y * 100.0 + z * 10_000.0
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(nx in dim(), ny in dim(), nz in dim()) {
        let dims = GridDims::new(nx, ny, nz);
        let g = PointGrid3::sample(dims, Vec3::ZERO, Vec3::ONE, &|_p: Vec3| 0.0f32).unwrap();
        let expect = dims.point_count();
        prop_assert_eq!(g.points.len(), expect);
        let mut seen = vec![false; expect];
        for y in 0..=ny { for z in 0..=nz { for x in 0..=nx {
            let i = g.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // Lookup recovers the point that was sampled at that coordinate
    #[test]
    fn lookup_matches_generation(nx in dim(), ny in dim(), nz in dim(), cx in cell(), cy in cell(), cz in cell()) {
        let origin = Vec3::new(-3.0, 1.5, 7.0);
        let c = Vec3::new(cx, cy, cz);
        let g = PointGrid3::sample(GridDims::new(nx, ny, nz), origin, c, &|p: Vec3| coord_code(p, origin, c)).unwrap();
        for y in 0..=ny { for z in 0..=nz { for x in 0..=nx {
            let p = g.get(x, y, z);
            prop_assert_eq!(p.value, x as f32 + y as f32 * 100.0 + z as f32 * 10_000.0);
            prop_assert_eq!(p.pos, g.position(x, y, z));
        }}}
    }

    // Parallel sampling fills the same lattice as the serial path
    #[test]
    fn parallel_sampling_matches_serial(nx in dim(), ny in dim(), nz in dim()) {
        let f = |p: Vec3| p.x * 0.5 - p.y * p.z;
        let dims = GridDims::new(nx, ny, nz);
        let a = PointGrid3::sample(dims, Vec3::ONE, Vec3::splat(0.5), &f).unwrap();
        let b = PointGrid3::sample_par(dims, Vec3::ONE, Vec3::splat(0.5), &f).unwrap();
        prop_assert_eq!(a.points, b.points);
    }

    // Each cube corner sits one cell step from corner 3 (the cell minimum)
    #[test]
    fn cube_corners_follow_offsets(nx in dim(), ny in dim(), nz in dim()) {
        let c = Vec3::new(1.0, 2.0, 0.5);
        let g = PointGrid3::sample(GridDims::new(nx, ny, nz), Vec3::ZERO, c, &|_p: Vec3| 1.0f32).unwrap();
        for y in 0..ny { for z in 0..nz { for x in 0..nx {
            let corners = g.cube_corners(x, y, z);
            let base = corners[3].pos;
            prop_assert_eq!(base, g.position(x, y, z));
            for (i, o) in CUBE_CORNER_OFFSETS.iter().enumerate() {
                let want = base + Vec3::new(o[0] as f32 * c.x, o[1] as f32 * c.y, o[2] as f32 * c.z);
                prop_assert!((corners[i].pos - want).length() < 1e-4);
            }
        }}}
    }

    // 2D lookup agrees with generation and corners are TL, TR, BL, BR
    #[test]
    fn square_lookup_and_corners(nx in dim(), nz in dim(), c in cell()) {
        let origin = Vec3::new(2.0, -1.0, 3.0);
        let g = PointGrid2::sample(nx, nz, origin, c, &|p: Vec3| {
            ((p.x - origin.x) / c).round() + ((p.z - origin.z) / c).round() * 100.0
        }).unwrap();
        for z in 0..=nz { for x in 0..=nx {
            prop_assert_eq!(g.get(x, z).value, x as f32 + z as f32 * 100.0);
            prop_assert_eq!(g.get(x, z).pos.y, origin.y);
        }}
        for z in 0..nz { for x in 0..nx {
            let [tl, tr, bl, br] = g.square_corners(x, z);
            prop_assert!(tl.pos.z > bl.pos.z && tr.pos.z > br.pos.z);
            prop_assert!(tr.pos.x > tl.pos.x && br.pos.x > bl.pos.x);
            prop_assert_eq!(bl, g.get(x, z));
            prop_assert_eq!(tr, g.get(x + 1, z + 1));
        }}
    }
}
