use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use isomarch_field::FieldSpec;
use isomarch_mesh_cpu::{CubeOptions, EdgeInterp, NormalMode, SquareOptions, WeldMode};

/// A scene file: which field to sample and how to march it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub march: MarchConfig,
    #[serde(default)]
    pub squares: SquaresConfig,
    #[serde(default)]
    pub field: FieldSpec,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_cells")]
    pub cells: [usize; 3],
    #[serde(default)]
    pub origin: [f32; 3],
    #[serde(default = "default_cell_size")]
    pub cell_size: [f32; 3],
    /// For point-density fields: ignore `cells` and `origin` and cover the
    /// point cloud with one empty cell of padding.
    #[serde(default)]
    pub fit_to_points: bool,
    #[serde(default)]
    pub parallel_sampling: bool,
}

fn default_cells() -> [usize; 3] {
    [16, 16, 16]
}
fn default_cell_size() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cells: default_cells(),
            origin: [0.0, 0.0, 0.0],
            cell_size: default_cell_size(),
            fit_to_points: false,
            parallel_sampling: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct MarchConfig {
    #[serde(default)]
    pub threshold: f32,
    #[serde(default = "default_true")]
    pub lerp: bool,
    #[serde(default)]
    pub clamp: bool,
    #[serde(default)]
    pub weld: WeldMode,
    #[serde(default)]
    pub normals: NormalMode,
    #[serde(default)]
    pub parallel: bool,
    /// Planar XZ UVs and white vertex colors on the output.
    #[serde(default)]
    pub surface_attrs: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            lerp: true,
            clamp: false,
            weld: WeldMode::Off,
            normals: NormalMode::PerIndex,
            parallel: false,
            surface_attrs: false,
        }
    }
}

impl MarchConfig {
    pub fn to_options(&self) -> CubeOptions {
        CubeOptions {
            threshold: self.threshold,
            interp: EdgeInterp::from_flags(self.lerp, self.clamp),
            weld: self.weld,
            normals: self.normals,
            parallel: self.parallel,
            surface_attrs: self.surface_attrs,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct SquaresConfig {
    #[serde(default = "default_square_cells")]
    pub cells: [usize; 2],
    #[serde(default = "default_square_cell")]
    pub cell_size: f32,
    #[serde(default)]
    pub center: [f32; 3],
    #[serde(default = "default_square_threshold")]
    pub threshold: f32,
    #[serde(default = "default_true")]
    pub lerp: bool,
    /// Prism height; 0 keeps the output flat.
    #[serde(default)]
    pub extrude: f32,
    #[serde(default)]
    pub normals: NormalMode,
    #[serde(default)]
    pub surface_attrs: bool,
}

fn default_square_cells() -> [usize; 2] {
    [32, 32]
}
fn default_square_cell() -> f32 {
    0.5
}
fn default_square_threshold() -> f32 {
    0.5
}

impl Default for SquaresConfig {
    fn default() -> Self {
        Self {
            cells: default_square_cells(),
            cell_size: default_square_cell(),
            center: [0.0, 0.0, 0.0],
            threshold: default_square_threshold(),
            lerp: true,
            extrude: 0.0,
            normals: NormalMode::PerIndex,
            surface_attrs: false,
        }
    }
}

impl SquaresConfig {
    pub fn to_options(&self) -> SquareOptions {
        SquareOptions {
            threshold: self.threshold,
            interp: EdgeInterp::from_flags(self.lerp, true),
            extrude: (self.extrude > 0.0).then_some(self.extrude),
            surface_attrs: self.surface_attrs,
        }
    }
}

pub fn load_scene(path: &Path) -> Result<SceneConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: SceneConfig = toml::from_str(&s)?;
    log::info!("loaded scene {}", path.display());
    Ok(cfg)
}
