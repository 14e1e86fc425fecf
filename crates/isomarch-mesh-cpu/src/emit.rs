use isomarch_geom::Vec3;

use crate::mesh_build::MeshBuild;
use crate::weld::{WeldMode, Welder};

/// Destination for triangles produced by the cell builders.
pub trait TriangleSink {
    fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3);
}

/// Unshared emission: three fresh vertices per triangle.
impl TriangleSink for MeshBuild {
    #[inline]
    fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        self.add_triangle(a, b, c);
    }
}

/// Counts triangles without storing them.
impl TriangleSink for usize {
    #[inline]
    fn triangle(&mut self, _a: Vec3, _b: Vec3, _c: Vec3) {
        *self += 1;
    }
}

/// Emits into a mesh while sharing vertices according to a [`WeldMode`].
pub struct WeldingSink<'a> {
    pub mesh: &'a mut MeshBuild,
    pub welder: Welder,
    /// Triangles dropped because welding merged two of their corners.
    pub collapsed: usize,
}

impl<'a> WeldingSink<'a> {
    pub fn new(mesh: &'a mut MeshBuild, mode: WeldMode) -> Self {
        Self {
            mesh,
            welder: Welder::new(mode),
            collapsed: 0,
        }
    }
}

impl TriangleSink for WeldingSink<'_> {
    #[inline]
    fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        if !self.welder.triangle(self.mesh, a, b, c) {
            self.collapsed += 1;
        }
    }
}
