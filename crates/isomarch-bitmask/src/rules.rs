use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleErrorKind {
    /// No `=` on the line.
    MissingSeparator,
    InvalidKey(String),
    InvalidValue(String),
    /// Key parsed but is not a bitmask in `0..=255`.
    KeyOutOfRange(i64),
    /// Same bitmask listed twice.
    DuplicateKey(u8),
}

/// Rule text rejected at `line` (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleParseError {
    pub line: usize,
    pub kind: RuleErrorKind,
}

impl fmt::Display for RuleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule line {}: ", self.line)?;
        match &self.kind {
            RuleErrorKind::MissingSeparator => write!(f, "expected key=value"),
            RuleErrorKind::InvalidKey(k) => write!(f, "key '{}' is not an integer", k),
            RuleErrorKind::InvalidValue(v) => write!(f, "value '{}' is not a tile index", v),
            RuleErrorKind::KeyOutOfRange(k) => write!(f, "key {} is outside 0..=255", k),
            RuleErrorKind::DuplicateKey(k) => write!(f, "key {} already defined", k),
        }
    }
}

impl Error for RuleParseError {}

/// Bitmask to tile index table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileRules {
    by_mask: HashMap<u8, u32>,
}

impl TileRules {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, bitmask: u8) -> Option<u32> {
        self.by_mask.get(&bitmask).copied()
    }

    /// Returns the previous tile for `bitmask`, if any.
    pub fn insert(&mut self, bitmask: u8, tile: u32) -> Option<u32> {
        self.by_mask.insert(bitmask, tile)
    }

    pub fn len(&self) -> usize {
        self.by_mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mask.is_empty()
    }

    /// Rules sorted by bitmask.
    pub fn entries(&self) -> Vec<(u8, u32)> {
        let mut v: Vec<(u8, u32)> = self.by_mask.iter().map(|(&k, &t)| (k, t)).collect();
        v.sort_unstable();
        v
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        let rules = parse_rules(&s)?;
        log::info!("loaded {} tile rules from {}", rules.len(), path.display());
        Ok(rules)
    }
}

/// Parses `key=value` lines such as `90=4,`. Surrounding whitespace and
/// trailing commas on the value are ignored, as are blank lines. The first
/// bad line fails the whole parse.
pub fn parse_rules(text: &str) -> Result<TileRules, RuleParseError> {
    let mut rules = TileRules::new();
    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let err = |kind| RuleParseError { line: n + 1, kind };
        let (k, v) = line
            .split_once('=')
            .ok_or_else(|| err(RuleErrorKind::MissingSeparator))?;
        let k = k.trim();
        let key: i64 = k
            .parse()
            .map_err(|_| err(RuleErrorKind::InvalidKey(k.to_string())))?;
        let mask = u8::try_from(key).map_err(|_| err(RuleErrorKind::KeyOutOfRange(key)))?;
        let v = v.trim().trim_end_matches(',').trim();
        let tile: u32 = v
            .parse()
            .map_err(|_| err(RuleErrorKind::InvalidValue(v.to_string())))?;
        if rules.insert(mask, tile).is_some() {
            return Err(err(RuleErrorKind::DuplicateKey(mask)));
        }
    }
    log::debug!("parsed {} tile rules", rules.len());
    Ok(rules)
}
