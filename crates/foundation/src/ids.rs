use std::fmt;

/// Tile identifier as assigned by the tileset loader.
///
/// `TileId(0)` is the tileset root, which carries no geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TileId(pub u64);

impl TileId {
    pub const ROOT: TileId = TileId(0);
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key of a feature inside one tile's batch table. Not globally unique.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureId {
    Index(u64),
    Name(String),
}

impl From<u64> for FeatureId {
    fn from(v: u64) -> Self {
        FeatureId::Index(v)
    }
}

impl From<&str> for FeatureId {
    fn from(v: &str) -> Self {
        FeatureId::Name(v.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(v: String) -> Self {
        FeatureId::Name(v)
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Index(n) => write!(f, "{n}"),
            FeatureId::Name(s) => f.write_str(s),
        }
    }
}

/// A feature addressed by its row in a tile's batch table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureRef {
    pub tile: TileId,
    pub index: usize,
}

impl FeatureRef {
    pub fn new(tile: TileId, index: usize) -> Self {
        Self { tile, index }
    }
}
