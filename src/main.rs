mod config;
mod obj;

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use isomarch_bitmask::{
    BuildingGrid, Face, ModuleCatalog, Occupancy2, TileRules, assign_tiles, bitmasks,
};
use isomarch_field::{Field, FieldSpec};
use isomarch_geom::Vec3;
use isomarch_grid::{GridDims, SampleGrid2, SampleGrid3};
use isomarch_mesh_cpu::{
    IsoMeshCPU, MeshBuild, NormalMode, SquareStats, extract_surface, march_squares,
    rebuild_normals, recalculate_normals,
};

use config::{SceneConfig, load_scene};

#[derive(Parser)]
#[command(name = "isomarch")]
#[command(version)]
#[command(about = "Marching cubes/squares extraction and bitmask tiling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a 3D isosurface with marching cubes
    Cubes {
        /// Scene file (.toml)
        scene: PathBuf,
        /// Output OBJ file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract 2D contours with marching squares, optionally extruded
    Squares {
        /// Scene file (.toml)
        scene: PathBuf,
        /// Output OBJ file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pick a tile for every occupied cell of an ASCII map
    Tiles {
        /// Map of '#' and '.' rows, first row north
        occupancy: PathBuf,
        /// Rule file of `bitmask=tile` lines
        rules: PathBuf,
    },

    /// Stack cells on a building grid and list the module for each lattice point
    Building {
        /// Module catalog (.toml with a [modules] table)
        catalog: PathBuf,
        /// Grid size in cells as x,y,z
        #[arg(long, value_delimiter = ',', num_args = 3, default_values_t = [4, 3, 4])]
        size: Vec<usize>,
        /// Raise the column at x,z by one cell (repeatable)
        #[arg(long, value_parser = parse_column)]
        raise: Vec<(usize, usize)>,
    },
}

fn parse_column(s: &str) -> Result<(usize, usize), String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,z but got '{}'", s))?;
    let x = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let z = z.trim().parse().map_err(|e| format!("bad z '{}': {}", z, e))?;
    Ok((x, z))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let res = match cli.command {
        Commands::Cubes { scene, output } => run_cubes(&scene, output.as_deref()),
        Commands::Squares { scene, output } => run_squares(&scene, output.as_deref()),
        Commands::Tiles { occupancy, rules } => run_tiles(&occupancy, &rules),
        Commands::Building {
            catalog,
            size,
            raise,
        } => run_building(&catalog, &size, &raise),
    };
    if let Err(e) = res {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn grid_extent(cfg: &SceneConfig, field: &Field) -> Result<(GridDims, Vec3), Box<dyn Error>> {
    let g = &cfg.grid;
    if g.fit_to_points {
        let Field::PointDensity(f) = field else {
            return Err("fit_to_points needs a point_density field".into());
        };
        let (origin, cells) = f
            .padded_extent()
            .ok_or("point_density field has no points")?;
        return Ok((GridDims::new(cells[0], cells[1], cells[2]), origin));
    }
    Ok((
        GridDims::new(g.cells[0], g.cells[1], g.cells[2]),
        Vec3::from(g.origin),
    ))
}

fn build_field(spec: &FieldSpec) -> Result<Field, Box<dyn Error>> {
    let field = spec.build()?;
    log::info!("field: {}", field.kind_name());
    Ok(field)
}

/// Samples the scene's field on its grid and marches it.
fn cube_surface(cfg: &SceneConfig) -> Result<IsoMeshCPU, Box<dyn Error>> {
    let field = build_field(&cfg.field)?;
    let (dims, origin) = grid_extent(cfg, &field)?;
    let cell = match &field {
        Field::PointDensity(f) if cfg.grid.fit_to_points => f.cell_size(),
        _ => Vec3::from(cfg.grid.cell_size),
    };
    let grid = field.visit(SampleGrid3 {
        dims,
        origin,
        cell,
        parallel: cfg.grid.parallel_sampling,
    })?;
    if let Some((lo, hi)) = grid.value_range() {
        log::info!(
            "sampled {} points in [{}, {}]",
            grid.points.len(),
            lo,
            hi
        );
    }
    Ok(extract_surface(&grid, &cfg.march.to_options()))
}

fn run_cubes(scene: &Path, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let cfg = load_scene(scene)?;
    let out = cube_surface(&cfg)?;
    log::info!(
        "cubes: {} cells, {} active, {} verts, {} tris in {} ms",
        out.stats.cells,
        out.stats.active_cells,
        out.stats.vertices,
        out.stats.triangles,
        out.stats.ms
    );
    match out.bbox {
        Some(b) => log::info!("bounds {:?} .. {:?}", b.min, b.max),
        None => log::warn!("field never crosses threshold {}", cfg.march.threshold),
    }
    if let Some(path) = output {
        obj::save_obj(path, &out.mesh)?;
    }
    Ok(())
}

fn square_mesh(cfg: &SceneConfig) -> Result<(MeshBuild, SquareStats), Box<dyn Error>> {
    let field = build_field(&cfg.field)?;
    let sq = &cfg.squares;
    let center = Vec3::from(sq.center);
    let origin = Vec3::new(
        center.x - sq.cells[0] as f32 * sq.cell_size * 0.5,
        center.y,
        center.z - sq.cells[1] as f32 * sq.cell_size * 0.5,
    );
    let grid = field.visit(SampleGrid2 {
        nx: sq.cells[0],
        nz: sq.cells[1],
        origin,
        cell: sq.cell_size,
    })?;
    let (mut mesh, stats) = march_squares(&grid, &sq.to_options());
    apply_normals(&mut mesh, sq.normals);
    Ok((mesh, stats))
}

fn run_squares(scene: &Path, output: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let cfg = load_scene(scene)?;
    let (mesh, stats) = square_mesh(&cfg)?;
    log::info!(
        "squares: {} cells, {} verts, {} tris in {} ms",
        stats.cells,
        stats.vertices,
        stats.triangles,
        stats.ms
    );
    log::info!("state histogram {:?}", stats.histogram);
    if let Some(path) = output {
        obj::save_obj(path, &mesh)?;
    }
    Ok(())
}

fn apply_normals(mesh: &mut MeshBuild, normals: NormalMode) {
    match normals {
        NormalMode::None => {}
        NormalMode::PerIndex => recalculate_normals(mesh),
        NormalMode::Keyed => rebuild_normals(mesh),
    }
}

fn run_tiles(occupancy: &Path, rules: &Path) -> Result<(), Box<dyn Error>> {
    let occ = Occupancy2::load(occupancy)?;
    let rules = TileRules::load(rules)?;
    let masks = bitmasks(&occ);
    let tiles = assign_tiles(&occ, &rules);
    // North row first, matching the input map
    for j in (0..occ.h).rev() {
        let row: Vec<String> = (0..occ.w)
            .map(|i| {
                let k = occ.idx(i, j);
                match (masks[k], tiles[k]) {
                    (None, _) => "  .".to_string(),
                    (Some(_), Some(t)) => format!("{:>3}", t),
                    (Some(m), None) => format!("?{:<3}", m),
                }
            })
            .collect();
        println!("{}", row.join(" "));
    }
    let missing = masks
        .iter()
        .zip(&tiles)
        .filter(|(m, t)| m.is_some() && t.is_none())
        .count();
    if missing > 0 {
        log::warn!("{} occupied cells have no rule", missing);
    }
    Ok(())
}

/// Ground layer of a `size` grid with each `raise` column grown by one cell.
fn raise_columns(size: &[usize], raise: &[(usize, usize)]) -> Result<BuildingGrid, Box<dyn Error>> {
    let &[gx, gy, gz] = size else {
        return Err("size needs three values".into());
    };
    let mut grid = BuildingGrid::with_ground(gx, gy, gz)?;
    for &(x, z) in raise {
        let top = (0..gy)
            .rev()
            .find(|&y| grid.is_active([x as i64, y as i64, z as i64]))
            .ok_or_else(|| format!("column {},{} is outside the grid", x, z))?;
        if grid.add_adjacent([x, top, z], Face::Up).is_none() {
            log::warn!("column {},{} is already at full height", x, z);
        }
    }
    Ok(grid)
}

fn run_building(
    catalog: &Path,
    size: &[usize],
    raise: &[(usize, usize)],
) -> Result<(), Box<dyn Error>> {
    let cat = ModuleCatalog::<PathBuf>::from_path(catalog)?;
    let grid = raise_columns(size, raise)?;
    log::info!("{} active cells", grid.active_count());
    let mut missing = 0usize;
    for (p, key) in grid.module_points() {
        let pos = grid.point_position(p);
        match cat.get(key) {
            Some(m) => println!(
                "{:>6} ({:.3}, {:.3}, {:.3}) {}",
                key.to_string(),
                pos.x,
                pos.y,
                pos.z,
                m.display()
            ),
            None => {
                missing += 1;
                println!("{:>6} ({:.3}, {:.3}, {:.3}) -", key.to_string(), pos.x, pos.y, pos.z);
            }
        }
    }
    if missing > 0 {
        log::warn!("{} lattice points have no module", missing);
    }
    Ok(())
}
