//! CPU isosurface extraction: marching cubes and marching squares over
//! sampled point grids, with vertex welding and normal reconstruction.
#![forbid(unsafe_code)]

pub mod classify;
pub mod constants;
pub mod cubes;
pub mod emit;
pub mod interp;
pub mod march;
pub mod mesh_build;
pub mod normals;
pub mod squares;
pub mod tables;
pub mod weld;

use isomarch_geom::Aabb;
use isomarch_grid::PointGrid3;

pub use classify::{classify_cube, classify_square, cube_state, square_state};
pub use cubes::{CubeOptions, NormalMode, march_cube};
pub use emit::{TriangleSink, WeldingSink};
pub use interp::{EdgeInterp, interpolate, interpolate_points, interpolate_with};
pub use march::{MarchStats, SquareStats, march_cubes, march_cubes_into, march_cubes_par, march_squares};
pub use mesh_build::MeshBuild;
pub use normals::{rebuild_normals, recalculate_normals};
pub use squares::{
    SquareOptions, SquarePolygon, emit_square, emit_square_extruded, square_polygon,
};
pub use weld::{VertexKey, WeldMode, Welder, weld_keyed};

/// Finished surface: geometry plus its bounds. `bbox` is `None` when the
/// field never crosses the threshold inside the grid.
#[derive(Clone, Debug)]
pub struct IsoMeshCPU {
    pub bbox: Option<Aabb>,
    pub mesh: MeshBuild,
    pub stats: MarchStats,
}

/// Marches `grid` with `opts` (serial or parallel) and fills normals as
/// requested.
pub fn extract_surface(grid: &PointGrid3, opts: &CubeOptions) -> IsoMeshCPU {
    let (mut mesh, stats) = if opts.parallel {
        march_cubes_par(grid, opts)
    } else {
        march_cubes(grid, opts)
    };
    match opts.normals {
        NormalMode::None => {}
        NormalMode::PerIndex => recalculate_normals(&mut mesh),
        NormalMode::Keyed => rebuild_normals(&mut mesh),
    }
    IsoMeshCPU {
        bbox: mesh.bounds(),
        mesh,
        stats,
    }
}
