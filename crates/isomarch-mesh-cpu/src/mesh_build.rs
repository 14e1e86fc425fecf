use isomarch_geom::{Aabb, Vec3};

use crate::constants::OPAQUE_WHITE;

/// Growable triangle-list mesh. Positions and normals are interleaved xyz,
/// UVs are uv pairs, colors are rgba. `idx` holds three entries per
/// triangle.
///
/// When `surface_attrs` is set every pushed vertex also gets a planar XZ UV
/// and an opaque white color; otherwise `uv` and `col` stay empty.
#[derive(Default, Clone, Debug)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
    pub col: Vec<u8>,
    pub surface_attrs: bool,
}

impl MeshBuild {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh that emits UVs and colors when `surface_attrs` is set.
    pub fn with_attrs(surface_attrs: bool) -> Self {
        Self {
            surface_attrs,
            ..Self::default()
        }
    }

    /// Clears all arrays but retains capacity. Slices handed out before the
    /// call are invalid afterwards.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
        self.col.clear();
    }

    /// Pre-reserve capacity for `n_tris` unshared triangles.
    #[inline]
    pub fn reserve_triangles(&mut self, n_tris: usize) {
        self.pos.reserve(n_tris * 3 * 3);
        self.idx.reserve(n_tris * 3);
        if self.surface_attrs {
            self.uv.reserve(n_tris * 3 * 2);
            self.col.reserve(n_tris * 3 * 4);
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.idx.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    #[inline]
    pub fn vertex(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos[i * 3], self.pos[i * 3 + 1], self.pos[i * 3 + 2])
    }

    #[inline]
    pub fn normal(&self, i: usize) -> Vec3 {
        Vec3::new(self.norm[i * 3], self.norm[i * 3 + 1], self.norm[i * 3 + 2])
    }

    /// Vertex indices of triangle `t`.
    #[inline]
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        [self.idx[t * 3], self.idx[t * 3 + 1], self.idx[t * 3 + 2]]
    }

    /// Corner positions of triangle `t`.
    #[inline]
    pub fn triangle_positions(&self, t: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangle(t);
        [
            self.vertex(a as usize),
            self.vertex(b as usize),
            self.vertex(c as usize),
        ]
    }

    pub fn vertices(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.pos.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2]))
    }

    /// Appends a vertex and returns its index.
    #[inline]
    pub fn push_vertex(&mut self, p: Vec3) -> u32 {
        let i = self.vertex_count() as u32;
        self.pos.extend_from_slice(&[p.x, p.y, p.z]);
        if self.surface_attrs {
            self.uv.extend_from_slice(&[p.x, p.z]);
            self.col.extend_from_slice(&OPAQUE_WHITE);
        }
        i
    }

    #[inline]
    pub fn push_indices(&mut self, a: u32, b: u32, c: u32) {
        self.idx.extend_from_slice(&[a, b, c]);
    }

    /// Appends three new vertices and one triangle over them.
    #[inline]
    pub fn add_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let ia = self.push_vertex(a);
        let ib = self.push_vertex(b);
        let ic = self.push_vertex(c);
        self.push_indices(ia, ib, ic);
    }

    /// Fan-triangulates a convex polygon from its first vertex:
    /// `(0,1,2), (0,2,3), ...`.
    pub fn add_polygon(&mut self, vs: &[Vec3]) {
        if vs.len() < 3 {
            return;
        }
        for i in 1..vs.len() - 1 {
            self.add_triangle(vs[0], vs[i], vs[i + 1]);
        }
    }

    /// Wall between a bottom edge and the same edge raised by `height`:
    /// `bottom1 -> bottom2 -> top2 -> top1`.
    pub fn add_side_quad(&mut self, bottom1: Vec3, bottom2: Vec3, height: f32) {
        let up = Vec3::UP * height;
        let top1 = bottom1 + up;
        let top2 = bottom2 + up;
        self.add_triangle(bottom1, bottom2, top2);
        self.add_triangle(bottom1, top2, top1);
    }

    /// Extrudes a convex polygon upward into a closed prism: a top cap in the
    /// polygon's winding, a bottom cap reversed, and one wall per edge.
    pub fn add_prism(&mut self, vs: &[Vec3], height: f32) {
        if vs.len() < 3 {
            return;
        }
        let up = Vec3::UP * height;
        let top: Vec<Vec3> = vs.iter().map(|&v| v + up).collect();
        self.add_polygon(&top);
        let bottom: Vec<Vec3> = vs.iter().rev().copied().collect();
        self.add_polygon(&bottom);
        for i in 0..vs.len() {
            self.add_side_quad(vs[i], vs[(i + 1) % vs.len()], height);
        }
    }

    /// Moves `other`'s geometry onto the end of this mesh, rebasing indices.
    pub fn append(&mut self, other: &MeshBuild) {
        let base = self.vertex_count() as u32;
        self.pos.extend_from_slice(&other.pos);
        self.norm.extend_from_slice(&other.norm);
        self.uv.extend_from_slice(&other.uv);
        self.col.extend_from_slice(&other.col);
        self.idx.extend(other.idx.iter().map(|i| i + base));
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices())
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }
    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    /// Empty until normals are computed.
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
    pub fn indices(&self) -> &[u32] {
        &self.idx
    }
}
