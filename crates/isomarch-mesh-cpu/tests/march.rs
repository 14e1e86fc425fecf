use isomarch_field::{ScalarField, SphereField};
use isomarch_geom::Vec3;
use isomarch_grid::{CUBE_CORNER_OFFSETS, GridDims, GridPoint, PointGrid2, PointGrid3, SQUARE_CORNER_OFFSETS};
use isomarch_mesh_cpu::squares::prism_triangles;
use isomarch_mesh_cpu::{
    CubeOptions, EdgeInterp, MeshBuild, NormalMode, SquareOptions, WeldMode, extract_surface,
    march_cube, march_cubes, march_cubes_into, march_cubes_par, march_squares, square_polygon,
};

const CENTER: Vec3 = Vec3::new(4.1, 3.8, 4.3);
const RADIUS: f32 = 2.5;

fn sphere_grid() -> PointGrid3 {
    let f = SphereField::new(CENTER, RADIUS);
    PointGrid3::sample(GridDims::cubic(8), Vec3::ZERO, Vec3::ONE, &f).unwrap()
}

fn unit_cube(values: [f32; 8]) -> [GridPoint; 8] {
    let mut out = [GridPoint::default(); 8];
    for (i, o) in CUBE_CORNER_OFFSETS.iter().enumerate() {
        out[i] = GridPoint::new(Vec3::new(o[0] as f32, o[1] as f32, o[2] as f32), values[i]);
    }
    out
}

fn square_with_state(state: u8) -> [GridPoint; 4] {
    let mut out = [GridPoint::default(); 4];
    for (i, o) in SQUARE_CORNER_OFFSETS.iter().enumerate() {
        let v = if state & (1 << i) != 0 { 1.0 } else { 0.0 };
        out[i] = GridPoint::new(Vec3::new(o[0] as f32, 0.0, o[1] as f32), v);
    }
    out
}

// Signed volume of a closed triangle mesh, positive when faces point out.
fn signed_volume(m: &MeshBuild, about: Vec3) -> f32 {
    let mut v = 0.0;
    for t in 0..m.triangle_count() {
        let [a, b, c] = m.triangle_positions(t);
        v += (a - about).dot((b - about).cross(c - about)) / 6.0;
    }
    v
}

#[test]
fn uniform_fields_emit_nothing() {
    for v in [-1.0f32, 1.0] {
        let f = move |_p: Vec3| v;
        let g = PointGrid3::sample(GridDims::new(3, 2, 4), Vec3::ZERO, Vec3::ONE, &f).unwrap();
        let (m, stats) = march_cubes(&g, &CubeOptions::default());
        assert!(m.is_empty());
        assert_eq!(stats.cells, 24);
        assert_eq!(stats.active_cells, 0);
    }
}

#[test]
fn corner_zero_alone_gives_one_triangle_on_its_edges() {
    let mut v = [1.0f32; 8];
    v[0] = -1.0;
    let cube = unit_cube(v);
    let mut m = MeshBuild::new();
    assert_eq!(march_cube(&cube, 0.0, EdgeInterp::Lerp, &mut m), 1);
    // Corner 0 sits at (0,0,1); its edges run to corners 1, 3 and 4
    let c0 = cube[0].pos;
    let mut expect = vec![
        c0.lerp(cube[1].pos, 0.5),
        c0.lerp(cube[3].pos, 0.5),
        c0.lerp(cube[4].pos, 0.5),
    ];
    let mut got: Vec<Vec3> = m.vertices().collect();
    let key = |p: &Vec3| (p.x * 4.0 + p.y * 2.0 + p.z) as i32;
    expect.sort_by_key(key);
    got.sort_by_key(key);
    assert_eq!(got, expect);
}

#[test]
fn square_polygon_sizes_per_state() {
    let expect = [0, 3, 3, 4, 3, 4, 6, 5, 3, 6, 4, 5, 4, 5, 5, 4];
    for state in 0..16u8 {
        let p = square_polygon(&square_with_state(state), 0.5, EdgeInterp::LerpClamped);
        assert_eq!(p.state, state);
        assert_eq!(p.vertices().len(), expect[state as usize], "state {}", state);
    }
}

#[test]
fn full_plane_is_two_up_facing_triangles_per_cell() {
    let g = PointGrid2::sample(3, 2, Vec3::new(0.0, 1.5, 0.0), 0.5, &|_p: Vec3| 1.0f32).unwrap();
    let (m, stats) = march_squares(&g, &SquareOptions::default());
    assert_eq!(stats.cells, 6);
    assert_eq!(stats.histogram[15], 6);
    assert_eq!(m.triangle_count(), 12);
    for t in 0..m.triangle_count() {
        let [a, b, c] = m.triangle_positions(t);
        assert!((b - a).cross(c - a).y > 0.0);
        assert_eq!(a.y, 1.5);
    }
    assert_eq!(stats.value_range, Some((1.0, 1.0)));
}

#[test]
fn extrusion_emits_caps_and_walls() {
    // Single cell per state; saddles extrude two triangle prisms
    let sizes: [&[usize]; 16] = [
        &[], &[3], &[3], &[4], &[3], &[4], &[3, 3], &[5],
        &[3], &[3, 3], &[4], &[5], &[4], &[5], &[5], &[4],
    ];
    for state in 0..16u8 {
        let corners = square_with_state(state);
        let values: Vec<f32> = [corners[2], corners[3], corners[0], corners[1]]
            .iter()
            .map(|p| p.value)
            .collect();
        let g = PointGrid2::from_values(1, 1, Vec3::ZERO, 1.0, &values).unwrap();
        let opts = SquareOptions {
            extrude: Some(2.0),
            ..SquareOptions::default()
        };
        let (m, stats) = march_squares(&g, &opts);
        assert_eq!(stats.histogram[state as usize], 1);
        let want: usize = sizes[state as usize].iter().map(|&n| prism_triangles(n)).sum();
        assert_eq!(m.triangle_count(), want, "state {}", state);
        assert_eq!(m.vertex_count(), want * 3);
        if let Some(b) = m.bounds() {
            assert_eq!(b.min.y, 0.0);
            assert_eq!(b.max.y, 2.0);
        }
    }
}

#[test]
fn sphere_vertices_lie_near_the_surface() {
    let g = sphere_grid();
    let (m, stats) = march_cubes(&g, &CubeOptions::default());
    assert!(stats.triangles > 0);
    let eps = 0.2;
    for v in m.vertices() {
        let d = v.distance(CENTER);
        assert!((d - RADIUS).abs() <= eps, "vertex {:?} at distance {}", v, d);
    }
}

#[test]
fn sphere_winds_outward() {
    let g = sphere_grid();
    let (m, _) = march_cubes(&g, &CubeOptions::default());
    let vol = signed_volume(&m, CENTER);
    let exact = 4.0 / 3.0 * std::f32::consts::PI * RADIUS.powi(3);
    assert!(vol > 0.0);
    assert!((vol - exact).abs() / exact < 0.1, "volume {} vs {}", vol, exact);
}

#[test]
fn keyed_weld_shares_vertices_without_losing_area() {
    let g = sphere_grid();
    let (soup, _) = march_cubes(&g, &CubeOptions::default());
    let keyed = CubeOptions {
        weld: WeldMode::Keyed,
        ..CubeOptions::default()
    };
    let (welded, stats) = march_cubes(&g, &keyed);
    assert!(welded.vertex_count() < soup.vertex_count() / 3);
    assert_eq!(welded.triangle_count() + stats.collapsed, soup.triangle_count());
    let v_soup = signed_volume(&soup, CENTER);
    let v_weld = signed_volume(&welded, CENTER);
    assert!((v_soup - v_weld).abs() < 1e-2);
}

#[test]
fn parallel_matches_serial() {
    let g = sphere_grid();
    for weld in [WeldMode::Off, WeldMode::Keyed] {
        let opts = CubeOptions {
            weld,
            ..CubeOptions::default()
        };
        let (a, sa) = march_cubes(&g, &opts);
        let (b, sb) = march_cubes_par(&g, &opts);
        assert_eq!(a.positions(), b.positions(), "weld {:?}", weld);
        assert_eq!(a.indices(), b.indices(), "weld {:?}", weld);
        assert_eq!(sa.active_cells, sb.active_cells);
    }
}

#[test]
fn march_into_reuses_buffer() {
    let g = sphere_grid();
    let mut m = MeshBuild::new();
    let first = march_cubes_into(&g, &CubeOptions::default(), &mut m);
    let second = march_cubes_into(&g, &CubeOptions::default(), &mut m);
    assert_eq!(first.triangles, second.triangles);
    assert_eq!(m.triangle_count(), first.triangles);
}

#[test]
fn extracted_normals_are_unit_and_outward() {
    let g = sphere_grid();
    for (weld, normals, parallel) in [
        (WeldMode::Off, NormalMode::Keyed, false),
        (WeldMode::Keyed, NormalMode::PerIndex, true),
        (WeldMode::Exact, NormalMode::PerIndex, false),
    ] {
        let out = extract_surface(
            &g,
            &CubeOptions {
                weld,
                normals,
                parallel,
                ..CubeOptions::default()
            },
        );
        let bbox = out.bbox.unwrap();
        assert!(bbox.min.x > CENTER.x - RADIUS - 0.2 && bbox.max.x < CENTER.x + RADIUS + 0.2);
        assert_eq!(out.mesh.normals().len(), out.mesh.positions().len());
        let mut used = vec![false; out.mesh.vertex_count()];
        for &i in out.mesh.indices() {
            used[i as usize] = true;
        }
        for (i, _) in used.iter().enumerate().filter(|(_, u)| **u) {
            let n = out.mesh.normal(i);
            assert!((n.length() - 1.0).abs() < 1e-3, "normal {:?}", n);
            assert!(n.dot(out.mesh.vertex(i) - CENTER) > 0.0);
        }
    }
}

#[test]
fn closures_drive_the_walker() {
    let plane = |p: Vec3| p.y - 1.5;
    assert_eq!(plane.sample(Vec3::new(0.0, 1.5, 0.0)), 0.0);
    let g = PointGrid3::sample(GridDims::new(2, 3, 2), Vec3::ZERO, Vec3::ONE, &plane).unwrap();
    let (m, stats) = march_cubes(&g, &CubeOptions::default());
    // One layer of cells crosses the plane, two triangles each
    assert_eq!(stats.active_cells, 4);
    assert_eq!(m.triangle_count(), 8);
    for v in m.vertices() {
        assert!((v.y - 1.5).abs() < 1e-6);
    }
}

#[test]
fn surface_attrs_reach_every_walker() {
    let g = sphere_grid();
    let check = |m: &MeshBuild| {
        assert!(m.vertex_count() > 0);
        assert_eq!(m.uv.len(), m.vertex_count() * 2);
        assert_eq!(m.col.len(), m.vertex_count() * 4);
        for (i, v) in m.vertices().enumerate() {
            assert_eq!(&m.uv[i * 2..i * 2 + 2], &[v.x, v.z]);
        }
        assert!(m.col.iter().all(|&c| c == 255));
    };
    for weld in [WeldMode::Off, WeldMode::Keyed] {
        let opts = CubeOptions {
            weld,
            surface_attrs: true,
            ..CubeOptions::default()
        };
        check(&march_cubes(&g, &opts).0);
        check(&march_cubes_par(&g, &opts).0);
        check(&extract_surface(&g, &CubeOptions { parallel: true, ..opts }).mesh);
        let mut reused = MeshBuild::new();
        march_cubes_into(&g, &opts, &mut reused);
        check(&reused);
    }
    let (plain, _) = march_cubes(&g, &CubeOptions::default());
    assert!(plain.uv.is_empty() && plain.col.is_empty());

    let plane = PointGrid2::sample(4, 4, Vec3::ZERO, 0.5, &|p: Vec3| p.x + p.z * 0.25).unwrap();
    for extrude in [None, Some(1.0)] {
        let opts = SquareOptions {
            threshold: 0.8,
            extrude,
            surface_attrs: true,
            ..SquareOptions::default()
        };
        check(&march_squares(&plane, &opts).0);
    }
}

#[test]
fn exact_weld_joins_cells_like_keyed() {
    // Neighbouring cells interpolate a shared edge identically
    let g = sphere_grid();
    let opts = |weld| CubeOptions {
        weld,
        ..CubeOptions::default()
    };
    let (exact, se) = march_cubes(&g, &opts(WeldMode::Exact));
    let (keyed, sk) = march_cubes(&g, &opts(WeldMode::Keyed));
    assert_eq!(exact.vertex_count(), keyed.vertex_count());
    assert_eq!(exact.positions(), keyed.positions());
    assert_eq!(exact.indices(), keyed.indices());
    assert_eq!(se.collapsed, sk.collapsed);
}

#[test]
fn parallel_exact_weld_merges_by_key() {
    let g = sphere_grid();
    let exact = CubeOptions {
        weld: WeldMode::Exact,
        ..CubeOptions::default()
    };
    let keyed = CubeOptions {
        weld: WeldMode::Keyed,
        ..CubeOptions::default()
    };
    let (par, _) = march_cubes_par(&g, &exact);
    let (serial, _) = march_cubes(&g, &keyed);
    assert_eq!(par.positions(), serial.positions());
    assert_eq!(par.indices(), serial.indices());
}
