use serde::Deserialize;

use isomarch_geom::Vec3;

use crate::{
    Field, LayeredNoiseField, LayeredNoiseParams, PlanarNoiseField, PointDensityField,
    SimplexField, SphereField, SquaredSphereField,
};

/// Field description as written in a scene file, e.g.
///
/// ```toml
/// [field]
/// kind = "sphere"
/// center = [4.0, 4.0, 4.0]
/// radius = 3.0
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldSpec {
    Sphere {
        #[serde(default)]
        center: [f32; 3],
        #[serde(default = "default_radius")]
        radius: f32,
    },
    SphereSquared {
        #[serde(default)]
        center: [f32; 3],
        #[serde(default = "default_radius")]
        radius: f32,
    },
    LayeredNoise(LayeredNoiseParams),
    Simplex {
        #[serde(default = "default_seed")]
        seed: i32,
        #[serde(default = "default_simplex_scale")]
        scale: f32,
    },
    PlanarNoise {
        #[serde(default = "default_seed")]
        seed: i32,
        #[serde(default = "default_planar_scale")]
        scale: f32,
        #[serde(default)]
        offset: [f32; 2],
    },
    PointDensity {
        points: Vec<[f32; 3]>,
        #[serde(default = "default_density_cell")]
        cell: [f32; 3],
        #[serde(default = "default_max_count")]
        max_count: u32,
    },
}

fn default_radius() -> f32 {
    3.0
}
fn default_seed() -> i32 {
    1337
}
fn default_simplex_scale() -> f32 {
    0.2
}
fn default_planar_scale() -> f32 {
    0.1
}
fn default_density_cell() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_max_count() -> u32 {
    100
}

impl Default for FieldSpec {
    fn default() -> Self {
        FieldSpec::Sphere {
            center: [0.0, 0.0, 0.0],
            radius: default_radius(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldError {
    InvalidParameter(&'static str),
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::InvalidParameter(msg) => write!(f, "invalid field parameter: {}", msg),
        }
    }
}

impl std::error::Error for FieldError {}

impl FieldSpec {
    /// Builds the concrete field. Noise generators are seeded here once.
    pub fn build(&self) -> Result<Field, FieldError> {
        Ok(match self {
            FieldSpec::Sphere { center, radius } => {
                Field::Sphere(SphereField::new(Vec3::from(*center), *radius))
            }
            FieldSpec::SphereSquared { center, radius } => {
                Field::SphereSquared(SquaredSphereField::new(Vec3::from(*center), *radius))
            }
            FieldSpec::LayeredNoise(p) => {
                if p.height_range[0] == p.height_range[1] {
                    return Err(FieldError::InvalidParameter("height_range is empty"));
                }
                Field::LayeredNoise(LayeredNoiseField::new(p.clone()))
            }
            FieldSpec::Simplex { seed, scale } => Field::Simplex(SimplexField::new(*seed, *scale)),
            FieldSpec::PlanarNoise {
                seed,
                scale,
                offset,
            } => Field::PlanarNoise(PlanarNoiseField::new(*seed, *scale, *offset)),
            FieldSpec::PointDensity {
                points,
                cell,
                max_count,
            } => {
                let pts: Vec<Vec3> = points.iter().copied().map(Vec3::from).collect();
                let f = PointDensityField::new(&pts, Vec3::from(*cell), *max_count)
                    .ok_or(FieldError::InvalidParameter("cell must be positive on every axis"))?;
                log::debug!(
                    "point density: {} points in {} cells",
                    pts.len(),
                    f.occupied_cells()
                );
                Field::PointDensity(f)
            }
        })
    }
}
