use hashbrown::HashMap;
use isomarch_geom::Vec3;

use crate::mesh_build::MeshBuild;
use crate::weld::VertexKey;

/// Twice the triangle's area along its face normal.
#[inline]
fn face_cross(mesh: &MeshBuild, t: usize) -> Vec3 {
    let [a, b, c] = mesh.triangle_positions(t);
    (b - a).cross(c - a)
}

fn write_normals(mesh: &mut MeshBuild, acc: impl Fn(usize) -> Vec3) {
    let n = mesh.vertex_count();
    let mut norm = std::mem::take(&mut mesh.norm);
    norm.clear();
    norm.reserve(n * 3);
    for i in 0..n {
        let v = acc(i).normalized();
        norm.extend_from_slice(&[v.x, v.y, v.z]);
    }
    mesh.norm = norm;
}

/// Area-weighted vertex normals over each vertex index. Unwelded soups get
/// flat shading; welded meshes get smooth shading. Vertices referenced only
/// by degenerate triangles keep a zero normal.
pub fn recalculate_normals(mesh: &mut MeshBuild) {
    let mut acc = vec![Vec3::ZERO; mesh.vertex_count()];
    for t in 0..mesh.triangle_count() {
        let n = face_cross(mesh, t);
        for i in mesh.triangle(t) {
            acc[i as usize] += n;
        }
    }
    write_normals(mesh, |i| acc[i]);
}

/// Area-weighted vertex normals shared by every vertex with the same
/// [`VertexKey`], so coincident but unshared vertices shade as one.
pub fn rebuild_normals(mesh: &mut MeshBuild) {
    let mut acc: HashMap<VertexKey, Vec3> = HashMap::with_capacity(mesh.vertex_count());
    for t in 0..mesh.triangle_count() {
        // Unit normal scaled by area
        let n = face_cross(mesh, t) * 0.5;
        for i in mesh.triangle(t) {
            *acc.entry(VertexKey::from_pos(mesh.vertex(i as usize)))
                .or_insert(Vec3::ZERO) += n;
        }
    }
    let keys: Vec<VertexKey> = mesh.vertices().map(VertexKey::from_pos).collect();
    write_normals(mesh, |i| acc.get(&keys[i]).copied().unwrap_or(Vec3::ZERO));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tent() -> MeshBuild {
        // Two triangles folded along the z axis, unshared vertices
        let mut m = MeshBuild::new();
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.0, 0.0, 1.0);
        m.add_triangle(a, b, Vec3::new(1.0, -1.0, 0.5));
        m.add_triangle(b, a, Vec3::new(-1.0, -1.0, 0.5));
        m
    }

    #[test]
    fn per_index_is_flat_on_soup() {
        let mut m = tent();
        recalculate_normals(&mut m);
        assert_eq!(m.normals().len(), m.positions().len());
        let n0 = m.normal(0);
        let n3 = m.normal(3);
        assert!((n0.length() - 1.0).abs() < 1e-5);
        assert!(n0.x > 0.0 && n3.x < 0.0);
    }

    #[test]
    fn keyed_averages_coincident_vertices() {
        let mut m = tent();
        rebuild_normals(&mut m);
        // The ridge vertices see both faces; x components cancel
        let n0 = m.normal(0);
        assert!(n0.x.abs() < 1e-5);
        assert!((n0.y - 1.0).abs() < 1e-5);
        // Vertex 1 and vertex 3 share a position
        assert_eq!(m.normal(1), m.normal(3));
    }
}
