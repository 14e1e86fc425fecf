//! Wavefront OBJ output for inspecting extracted meshes.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use isomarch_mesh_cpu::MeshBuild;

/// Writes positions, then UVs and normals when present, then 1-based faces.
pub fn write_obj<W: Write>(w: &mut W, mesh: &MeshBuild, name: &str) -> io::Result<()> {
    writeln!(w, "# isomarch")?;
    writeln!(w, "# vertices {} triangles {}", mesh.vertex_count(), mesh.triangle_count())?;
    writeln!(w, "o {}", name)?;
    for p in mesh.pos.chunks_exact(3) {
        writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
    }
    let has_uv = mesh.uv.len() == mesh.vertex_count() * 2 && !mesh.uv.is_empty();
    if has_uv {
        for t in mesh.uv.chunks_exact(2) {
            writeln!(w, "vt {} {}", t[0], t[1])?;
        }
    }
    let has_norm = mesh.norm.len() == mesh.pos.len() && !mesh.norm.is_empty();
    if has_norm {
        for n in mesh.norm.chunks_exact(3) {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
        }
    }
    for tri in mesh.idx.chunks_exact(3) {
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        match (has_uv, has_norm) {
            (false, false) => writeln!(w, "f {} {} {}", a, b, c)?,
            (true, false) => writeln!(w, "f {a}/{a} {b}/{b} {c}/{c}")?,
            (false, true) => writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}")?,
            (true, true) => writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?,
        }
    }
    Ok(())
}

pub fn save_obj(path: &Path, mesh: &MeshBuild) -> io::Result<()> {
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("mesh");
    let mut w = BufWriter::new(File::create(path)?);
    write_obj(&mut w, mesh, name)?;
    w.flush()?;
    log::info!(
        "wrote {} ({} verts, {} tris)",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomarch_geom::Vec3;
    use isomarch_mesh_cpu::recalculate_normals;

    #[test]
    fn faces_are_one_based() {
        let mut m = MeshBuild::new();
        m.add_triangle(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let mut out = Vec::new();
        write_obj(&mut out, &m, "tri").unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.contains("o tri\n"));
        assert_eq!(s.lines().filter(|l| l.starts_with("v ")).count(), 3);
        assert!(s.lines().any(|l| l == "f 1 2 3"));

        recalculate_normals(&mut m);
        let mut out = Vec::new();
        write_obj(&mut out, &m, "tri").unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.lines().any(|l| l == "vn 0 1 0"));
        assert!(s.lines().any(|l| l == "f 1//1 2//2 3//3"));
    }
}
