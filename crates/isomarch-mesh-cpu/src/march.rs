use std::time::Instant;

use isomarch_grid::{PointGrid2, PointGrid3};
use rayon::prelude::*;

use crate::constants::SQUARE_STATES;
use crate::cubes::{CubeOptions, march_cube};
use crate::emit::WeldingSink;
use crate::mesh_build::MeshBuild;
use crate::squares::{SquareOptions, emit_square, emit_square_extruded, square_polygon};
use crate::weld::{WeldMode, weld_keyed};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarchStats {
    pub cells: usize,
    /// Cells that produced at least one triangle.
    pub active_cells: usize,
    pub vertices: usize,
    pub triangles: usize,
    /// Triangles discarded because welding merged two corners.
    pub collapsed: usize,
    pub ms: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SquareStats {
    pub cells: usize,
    pub vertices: usize,
    pub triangles: usize,
    /// Cell count per square state.
    pub histogram: [u32; SQUARE_STATES],
    pub value_range: Option<(f32, f32)>,
    pub ms: u32,
}

fn elapsed_ms(start: Instant) -> u32 {
    start.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

/// Triangulates cell layers `y0..y1`, walking y, then z, then x.
fn march_layers(
    grid: &PointGrid3,
    opts: &CubeOptions,
    y0: usize,
    y1: usize,
    mesh: &mut MeshBuild,
) -> (usize, usize) {
    let d = grid.dims;
    let mut sink = WeldingSink::new(mesh, opts.weld);
    let mut active = 0;
    for y in y0..y1 {
        for z in 0..d.nz {
            for x in 0..d.nx {
                let corners = grid.cube_corners(x, y, z);
                if march_cube(&corners, opts.threshold, opts.interp, &mut sink) > 0 {
                    active += 1;
                }
            }
        }
    }
    (active, sink.collapsed)
}

/// Marches every cell of `grid` into `mesh`, which is cleared first. Vertex
/// sharing follows `opts.weld` and `mesh.surface_attrs` is overwritten by
/// `opts.surface_attrs`; normals are left untouched.
pub fn march_cubes_into(grid: &PointGrid3, opts: &CubeOptions, mesh: &mut MeshBuild) -> MarchStats {
    let start = Instant::now();
    mesh.clear_keep_capacity();
    mesh.surface_attrs = opts.surface_attrs;
    let (active_cells, collapsed) = march_layers(grid, opts, 0, grid.dims.ny, mesh);
    let stats = MarchStats {
        cells: grid.dims.cell_count(),
        active_cells,
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        collapsed,
        ms: elapsed_ms(start),
    };
    log_cube_stats("march_cubes", opts, &stats);
    stats
}

pub fn march_cubes(grid: &PointGrid3, opts: &CubeOptions) -> (MeshBuild, MarchStats) {
    let mut mesh = MeshBuild::with_attrs(opts.surface_attrs);
    let stats = march_cubes_into(grid, opts, &mut mesh);
    (mesh, stats)
}

/// Parallel variant: each y-layer of cells is triangulated into its own
/// buffer on the rayon pool, buffers are joined in layer order, and shared
/// vertices are merged by key afterwards. The result matches
/// [`march_cubes`] with the same options for `WeldMode::Off` and
/// `WeldMode::Keyed`; `WeldMode::Exact` is merged by key across layers.
pub fn march_cubes_par(grid: &PointGrid3, opts: &CubeOptions) -> (MeshBuild, MarchStats) {
    let start = Instant::now();
    if opts.weld == WeldMode::Exact {
        log::warn!("exact welding is not supported in parallel; merging by vertex key instead");
    }
    let layers: Vec<(MeshBuild, usize, usize)> = (0..grid.dims.ny)
        .into_par_iter()
        .map(|y| {
            let t = Instant::now();
            let mut mesh = MeshBuild::with_attrs(opts.surface_attrs);
            let (active, collapsed) = march_layers(grid, opts, y, y + 1, &mut mesh);
            log::trace!(
                target: "perf",
                "ms={} march_layer y={} tris={}",
                elapsed_ms(t),
                y,
                mesh.triangle_count()
            );
            (mesh, active, collapsed)
        })
        .collect();

    let mut joined = MeshBuild::with_attrs(opts.surface_attrs);
    joined.reserve_triangles(layers.iter().map(|(m, _, _)| m.triangle_count()).sum());
    let mut active_cells = 0;
    let mut collapsed = 0;
    for (m, a, c) in &layers {
        joined.append(m);
        active_cells += a;
        collapsed += c;
    }
    let mesh = if opts.weld == WeldMode::Off {
        joined
    } else {
        let welded = weld_keyed(&joined);
        collapsed += joined.triangle_count() - welded.triangle_count();
        welded
    };
    let stats = MarchStats {
        cells: grid.dims.cell_count(),
        active_cells,
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        collapsed,
        ms: elapsed_ms(start),
    };
    log_cube_stats("march_cubes_par", opts, &stats);
    (mesh, stats)
}

fn log_cube_stats(label: &str, opts: &CubeOptions, s: &MarchStats) {
    log::debug!(
        target: "perf",
        "ms={} {} cells={} active={} verts={} tris={} collapsed={} weld={:?} interp={:?}",
        s.ms,
        label,
        s.cells,
        s.active_cells,
        s.vertices,
        s.triangles,
        s.collapsed,
        opts.weld,
        opts.interp
    );
}

/// Marches every cell of a plane grid, flat or extruded.
pub fn march_squares(grid: &PointGrid2, opts: &SquareOptions) -> (MeshBuild, SquareStats) {
    let start = Instant::now();
    let mut mesh = MeshBuild::with_attrs(opts.surface_attrs);
    let mut histogram = [0u32; SQUARE_STATES];
    for z in 0..grid.nz {
        for x in 0..grid.nx {
            let corners = grid.square_corners(x, z);
            let poly = square_polygon(&corners, opts.threshold, opts.interp);
            histogram[poly.state as usize] += 1;
            match opts.extrude {
                Some(h) => emit_square_extruded(&poly, h, &mut mesh),
                None => emit_square(&poly, &mut mesh),
            }
        }
    }
    let stats = SquareStats {
        cells: grid.nx * grid.nz,
        vertices: mesh.vertex_count(),
        triangles: mesh.triangle_count(),
        histogram,
        value_range: grid.value_range(),
        ms: elapsed_ms(start),
    };
    log::debug!(
        target: "perf",
        "ms={} march_squares cells={} verts={} tris={} extrude={:?}",
        stats.ms,
        stats.cells,
        stats.vertices,
        stats.triangles,
        opts.extrude
    );
    if let Some((lo, hi)) = stats.value_range {
        log::debug!("square values in [{}, {}] states={:?}", lo, hi, stats.histogram);
    }
    (mesh, stats)
}
