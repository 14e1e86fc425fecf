use isomarch_geom::Vec3;
use isomarch_grid::GridPoint;

use crate::classify::square_state;
use crate::interp::{EdgeInterp, interpolate_points};
use crate::mesh_build::MeshBuild;
use crate::tables::{SQUARE_CASES, SquareShape, SquareVertex};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareOptions {
    pub threshold: f32,
    /// Square edges default to clamped lerp.
    pub interp: EdgeInterp,
    /// Extrude each cell polygon upward into a prism of this height.
    pub extrude: Option<f32>,
    /// Give every vertex a planar XZ UV and an opaque white color.
    pub surface_attrs: bool,
}

impl Default for SquareOptions {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            interp: EdgeInterp::LerpClamped,
            extrude: None,
            surface_attrs: false,
        }
    }
}

/// Polygon for one square cell, resolved to positions.
#[derive(Clone, Copy, Debug)]
pub struct SquarePolygon {
    pub state: u8,
    pub shape: SquareShape,
    verts: [Vec3; 6],
    len: usize,
}

impl SquarePolygon {
    /// All resolved vertices in table order. Saddle states list the two
    /// triangles back to back.
    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.verts[..self.len]
    }

    /// Convex pieces to triangulate: one polygon, or two triangles for a
    /// saddle, or none.
    pub fn pieces(&self) -> impl Iterator<Item = &[Vec3]> {
        let step = match self.shape {
            SquareShape::TwoTriangles => 3,
            _ => self.len.max(1),
        };
        self.vertices().chunks(step)
    }
}

/// Resolves the polygon of one cell with corners ordered top-left,
/// top-right, bottom-left, bottom-right.
pub fn square_polygon(corners: &[GridPoint; 4], threshold: f32, interp: EdgeInterp) -> SquarePolygon {
    let state = square_state(corners, threshold);
    let case = &SQUARE_CASES[state as usize];
    let mut verts = [Vec3::ZERO; 6];
    for (slot, v) in verts.iter_mut().zip(case.vertices) {
        *slot = match *v {
            SquareVertex::Corner(c) => corners[c as usize].pos,
            SquareVertex::Edge(a, b) => {
                interpolate_points(corners[a as usize], corners[b as usize], threshold, interp)
            }
        };
    }
    SquarePolygon {
        state,
        shape: case.shape,
        verts,
        len: case.vertices.len(),
    }
}

/// Fan-triangulates the polygon flat, facing up.
pub fn emit_square(poly: &SquarePolygon, mesh: &mut MeshBuild) {
    for piece in poly.pieces() {
        mesh.add_polygon(piece);
    }
}

/// Emits the polygon as a closed prism of the given height.
pub fn emit_square_extruded(poly: &SquarePolygon, height: f32, mesh: &mut MeshBuild) {
    for piece in poly.pieces() {
        mesh.add_prism(piece, height);
    }
}

/// Triangles a polygon of `n` vertices produces flat and extruded.
#[inline]
pub const fn fan_triangles(n: usize) -> usize {
    if n < 3 { 0 } else { n - 2 }
}

#[inline]
pub const fn prism_triangles(n: usize) -> usize {
    if n < 3 { 0 } else { 2 * fan_triangles(n) + 2 * n }
}
