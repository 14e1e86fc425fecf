//! Bitmask rule selection: 8-neighbour tile bitmasks with a `key=value` rule
//! table, and the 3D building-block grid whose lattice points pick modules
//! by stratum and corner bitmask.
#![forbid(unsafe_code)]

pub mod building;
pub mod catalog;
pub mod rules;
pub mod tile;

pub use building::{BuildingError, BuildingGrid, Face, Stratum, stratum_for_level};
pub use catalog::{ModuleCatalog, ModuleKey, ModuleKeyError};
pub use rules::{RuleErrorKind, RuleParseError, TileRules, parse_rules};
pub use tile::{Occupancy2, OccupancyError, assign_tiles, bitmasks, tile_bitmask};
