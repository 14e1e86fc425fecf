use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::building::{BuildingGrid, Stratum};

/// Module lookup key. Written as the bare bitmask for middle storeys and
/// with a `0_`, `1_` or `2_` prefix for ground, basement and roof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKey {
    pub stratum: Stratum,
    pub bitmask: u8,
}

impl ModuleKey {
    pub const fn new(stratum: Stratum, bitmask: u8) -> Self {
        Self { stratum, bitmask }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stratum {
            Stratum::Ground => write!(f, "0_{}", self.bitmask),
            Stratum::Basement => write!(f, "1_{}", self.bitmask),
            Stratum::Middle => write!(f, "{}", self.bitmask),
            Stratum::Roof => write!(f, "2_{}", self.bitmask),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleKeyError(pub String);

impl fmt::Display for ModuleKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a module name", self.0)
    }
}

impl Error for ModuleKeyError {}

impl FromStr for ModuleKey {
    type Err = ModuleKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ModuleKeyError(s.to_string());
        let (stratum, mask) = match s.split_once('_') {
            Some(("0", m)) => (Stratum::Ground, m),
            Some(("1", m)) => (Stratum::Basement, m),
            Some(("2", m)) => (Stratum::Roof, m),
            Some(_) => return Err(bad()),
            None => (Stratum::Middle, s),
        };
        let bitmask = mask.parse::<u8>().map_err(|_| bad())?;
        Ok(ModuleKey { stratum, bitmask })
    }
}

/// Modules keyed by stratum and bitmask. A missing entry is a deliberate
/// gap, not an error.
#[derive(Clone, Debug)]
pub struct ModuleCatalog<M> {
    by_key: HashMap<ModuleKey, M>,
}

impl<M> Default for ModuleCatalog<M> {
    fn default() -> Self {
        Self {
            by_key: HashMap::new(),
        }
    }
}

impl<M> ModuleCatalog<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ModuleKey, module: M) -> Option<M> {
        self.by_key.insert(key, module)
    }

    #[inline]
    pub fn get(&self, key: ModuleKey) -> Option<&M> {
        self.by_key.get(&key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Builds a catalog from named modules, e.g. `("0_12", mesh)`.
    pub fn from_named<I, S>(named: I) -> Result<Self, ModuleKeyError>
    where
        I: IntoIterator<Item = (S, M)>,
        S: AsRef<str>,
    {
        let mut cat = Self::new();
        for (name, m) in named {
            let key: ModuleKey = name.as_ref().parse()?;
            cat.insert(key, m);
        }
        Ok(cat)
    }

    /// Module shown at lattice point `p`, if any.
    pub fn for_point(&self, grid: &BuildingGrid, p: [usize; 3]) -> Option<&M> {
        grid.point_key(p).and_then(|k| self.get(k))
    }
}

#[derive(Deserialize)]
struct ModulesConfig {
    modules: HashMap<String, String>,
}

impl ModuleCatalog<PathBuf> {
    /// Reads a `[modules]` table mapping module names to asset paths:
    ///
    /// ```toml
    /// [modules]
    /// "0_15" = "modules/ground_corner.obj"
    /// "12" = "modules/wall.obj"
    /// ```
    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: ModulesConfig = toml::from_str(toml_str)?;
        let cat = Self::from_named(
            cfg.modules
                .into_iter()
                .map(|(name, path)| (name, PathBuf::from(path))),
        )?;
        Ok(cat)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path.as_ref())?;
        let cat = Self::from_toml_str(&s)?;
        log::info!("loaded {} modules from {}", cat.len(), path.as_ref().display());
        Ok(cat)
    }
}
