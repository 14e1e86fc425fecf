use isomarch_geom::Vec3;
use isomarch_grid::{CUBE_CORNER_OFFSETS, GridPoint};
use serde::Deserialize;

use crate::classify::cube_state;
use crate::constants::FULL_CUBE;
use crate::emit::TriangleSink;
use crate::interp::{EdgeInterp, interpolate_points};
use crate::tables::{CORNER_A_FROM_EDGE, CORNER_B_FROM_EDGE, EDGE_MASKS, cube_triangles};
use crate::weld::WeldMode;

/// How the surface is normalised after extraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalMode {
    /// Leave `norm` empty.
    None,
    /// Area-weighted accumulation over each vertex index.
    #[default]
    PerIndex,
    /// Area-weighted accumulation over every vertex sharing a
    /// [`VertexKey`](crate::VertexKey), so unwelded soups shade smoothly.
    Keyed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubeOptions {
    pub threshold: f32,
    /// Cube edges default to unclamped lerp.
    pub interp: EdgeInterp,
    pub weld: WeldMode,
    pub normals: NormalMode,
    pub parallel: bool,
    /// Give every vertex a planar XZ UV and an opaque white color.
    pub surface_attrs: bool,
}

impl Default for CubeOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            interp: EdgeInterp::Lerp,
            weld: WeldMode::Off,
            normals: NormalMode::PerIndex,
            parallel: false,
            surface_attrs: false,
        }
    }
}

/// Cube edges as `(from, to)` corner pairs, `from` being the corner with the
/// lower lattice index. Two cells sharing an edge then interpolate it in the
/// same direction and get bit-identical crossings.
pub const EDGE_ENDPOINTS: [(usize, usize); 12] = edge_endpoints();

const fn edge_endpoints() -> [(usize, usize); 12] {
    let mut out = [(0, 0); 12];
    let mut e = 0;
    while e < 12 {
        let a = CORNER_A_FROM_EDGE[e];
        let b = CORNER_B_FROM_EDGE[e];
        let oa = CUBE_CORNER_OFFSETS[a];
        let ob = CUBE_CORNER_OFFSETS[b];
        // Endpoints differ along one axis only
        out[e] = if oa[0] + oa[1] + oa[2] <= ob[0] + ob[1] + ob[2] {
            (a, b)
        } else {
            (b, a)
        };
        e += 1;
    }
    out
}

/// Triangulates one cube and returns the number of triangles emitted.
///
/// Each table triple `(a, b, c)` is emitted as `(a, c, b)`, which faces the
/// normal away from corners below the threshold: for a signed distance
/// field that is negative inside, triangles face outward.
pub fn march_cube<S: TriangleSink + ?Sized>(
    corners: &[GridPoint; 8],
    threshold: f32,
    interp: EdgeInterp,
    sink: &mut S,
) -> usize {
    let state = cube_state(corners, threshold);
    if state == 0 || state == FULL_CUBE {
        return 0;
    }
    let mask = EDGE_MASKS[state as usize];
    let mut edge_pos = [Vec3::ZERO; 12];
    for (e, slot) in edge_pos.iter_mut().enumerate() {
        if mask & (1 << e) != 0 {
            let (from, to) = EDGE_ENDPOINTS[e];
            *slot = interpolate_points(corners[from], corners[to], threshold, interp);
        }
    }
    let tris = cube_triangles(state);
    for t in tris {
        let a = edge_pos[t[0] as usize];
        let b = edge_pos[t[1] as usize];
        let c = edge_pos[t[2] as usize];
        sink.triangle(a, c, b);
    }
    tris.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeshBuild;
    use isomarch_grid::CUBE_CORNER_OFFSETS;

    fn unit_cube(values: [f32; 8]) -> [GridPoint; 8] {
        let mut out = [GridPoint::default(); 8];
        for (i, o) in CUBE_CORNER_OFFSETS.iter().enumerate() {
            let p = Vec3::new(o[0] as f32, o[1] as f32, o[2] as f32);
            out[i] = GridPoint::new(p, values[i]);
        }
        out
    }

    #[test]
    fn edges_start_at_the_lower_corner() {
        for (e, &(from, to)) in EDGE_ENDPOINTS.iter().enumerate() {
            let (a, b) = (CUBE_CORNER_OFFSETS[from], CUBE_CORNER_OFFSETS[to]);
            let diff: Vec<usize> = (0..3).filter(|&i| a[i] != b[i]).collect();
            assert_eq!(diff.len(), 1, "edge {}", e);
            assert!(a[diff[0]] < b[diff[0]], "edge {}", e);
            let mut pair = [from, to];
            pair.sort();
            let mut table = [CORNER_A_FROM_EDGE[e], CORNER_B_FROM_EDGE[e]];
            table.sort();
            assert_eq!(pair, table);
        }
    }

    #[test]
    fn empty_and_full_emit_nothing() {
        let mut n = 0usize;
        assert_eq!(march_cube(&unit_cube([1.0; 8]), 0.0, EdgeInterp::Lerp, &mut n), 0);
        assert_eq!(march_cube(&unit_cube([-1.0; 8]), 0.0, EdgeInterp::Lerp, &mut n), 0);
        assert_eq!(n, 0);
    }

    #[test]
    fn single_corner_triangle_faces_away_from_inside() {
        let mut v = [1.0f32; 8];
        v[0] = -1.0;
        let cube = unit_cube(v);
        let mut m = MeshBuild::new();
        assert_eq!(march_cube(&cube, 0.0, EdgeInterp::Lerp, &mut m), 1);
        let [a, b, c] = m.triangle_positions(0);
        let n = (b - a).cross(c - a);
        // Corner 0 is inside; the face normal must point away from it
        let centroid = (a + b + c) / 3.0;
        assert!(n.dot(centroid - cube[0].pos) > 0.0);
    }
}
