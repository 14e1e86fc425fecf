use hashbrown::HashMap;
use isomarch_geom::Vec3;
use serde::Deserialize;

use crate::constants::VERTEX_KEY_SCALE;
use crate::mesh_build::MeshBuild;

/// Position quantized to five decimal places. Vertices produced by
/// neighbouring cells for the same edge land on the same key even when their
/// float bits differ slightly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl VertexKey {
    #[inline]
    pub fn from_pos(p: Vec3) -> Self {
        #[inline]
        fn q(v: f32) -> i64 {
            (v as f64 * VERTEX_KEY_SCALE).round() as i64
        }
        Self {
            x: q(p.x),
            y: q(p.y),
            z: q(p.z),
        }
    }
}

/// Vertex sharing policy while emitting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeldMode {
    /// Every triangle gets three fresh vertices.
    #[default]
    Off,
    /// Reuse a vertex only when its position is bit-identical.
    Exact,
    /// Reuse a vertex whose [`VertexKey`] matches.
    Keyed,
}

// -0.0 and 0.0 must share a slot.
#[inline]
fn exact_bits(p: Vec3) -> [u32; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

/// Index lookup used while pushing vertices into a [`MeshBuild`].
///
/// The maps only remember vertices pushed through this welder, so a welder
/// lives exactly as long as one pass over the mesh it indexes.
#[derive(Default, Debug)]
pub struct Welder {
    mode: WeldMode,
    exact: HashMap<[u32; 3], u32>,
    keyed: HashMap<VertexKey, u32>,
}

impl Welder {
    pub fn new(mode: WeldMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    #[inline]
    pub fn mode(&self) -> WeldMode {
        self.mode
    }

    /// Returns the index of `p` in `mesh`, pushing it if no shared vertex
    /// exists.
    pub fn vertex(&mut self, mesh: &mut MeshBuild, p: Vec3) -> u32 {
        match self.mode {
            WeldMode::Off => mesh.push_vertex(p),
            WeldMode::Exact => *self
                .exact
                .entry(exact_bits(p))
                .or_insert_with(|| mesh.push_vertex(p)),
            WeldMode::Keyed => *self
                .keyed
                .entry(VertexKey::from_pos(p))
                .or_insert_with(|| mesh.push_vertex(p)),
        }
    }

    /// Welds and appends one triangle. Returns false when sharing collapsed
    /// two of its corners, in which case no indices are pushed.
    #[inline]
    pub fn triangle(&mut self, mesh: &mut MeshBuild, a: Vec3, b: Vec3, c: Vec3) -> bool {
        let ia = self.vertex(mesh, a);
        let ib = self.vertex(mesh, b);
        let ic = self.vertex(mesh, c);
        if self.mode != WeldMode::Off && (ia == ib || ib == ic || ia == ic) {
            return false;
        }
        mesh.push_indices(ia, ib, ic);
        true
    }
}

/// Rebuilds `mesh` with vertices merged by [`VertexKey`], keeping the first
/// occurrence of each key and the original triangle order.
///
/// Triangles whose corners collapse onto fewer than three distinct keys are
/// dropped. Per-vertex normals, UVs and colors follow the surviving vertex.
pub fn weld_keyed(mesh: &MeshBuild) -> MeshBuild {
    let mut out = MeshBuild {
        surface_attrs: mesh.surface_attrs,
        ..MeshBuild::default()
    };
    out.reserve_triangles(mesh.triangle_count());
    let has_norm = mesh.norm.len() == mesh.pos.len();
    let has_uv = !mesh.uv.is_empty();
    let has_col = !mesh.col.is_empty();
    let mut remap: HashMap<VertexKey, u32> = HashMap::with_capacity(mesh.vertex_count());
    let mut old_to_new: Vec<u32> = Vec::with_capacity(mesh.vertex_count());
    for i in 0..mesh.vertex_count() {
        let p = mesh.vertex(i);
        let key = VertexKey::from_pos(p);
        let ni = match remap.get(&key) {
            Some(&ni) => ni,
            None => {
                let ni = out.vertex_count() as u32;
                out.pos.extend_from_slice(&[p.x, p.y, p.z]);
                if has_norm {
                    out.norm.extend_from_slice(&mesh.norm[i * 3..i * 3 + 3]);
                }
                if has_uv {
                    out.uv.extend_from_slice(&mesh.uv[i * 2..i * 2 + 2]);
                }
                if has_col {
                    out.col.extend_from_slice(&mesh.col[i * 4..i * 4 + 4]);
                }
                remap.insert(key, ni);
                ni
            }
        };
        old_to_new.push(ni);
    }
    for t in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.triangle(t).map(|i| old_to_new[i as usize]);
        if a == b || b == c || a == c {
            continue;
        }
        out.push_indices(a, b, c);
    }
    out
}
