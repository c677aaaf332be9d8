use std::fs;
use std::path::{Path, PathBuf};

use foundation::ids::TileId;
use serde::{Deserialize, Serialize};
use temporal::{EventQueue, TemporalExtensionModel};
use tracing::info;

use crate::extension::{BatchTableExtension, FormatError, TilesetExtension};

/// A tileset's temporal extension bundled with the batch tables of its
/// tiles, as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalScene {
    pub tileset: TilesetExtension,
    #[serde(default)]
    pub tiles: Vec<TileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileEntry {
    pub id: u64,
    pub batch_table: BatchTableExtension,
}

#[derive(Debug)]
pub enum SceneLoadError {
    Io { path: PathBuf, source: std::io::Error },
    Format(FormatError),
    Tile { tile: TileId, source: FormatError },
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            SceneLoadError::Format(e) => write!(f, "temporal extension error: {e}"),
            SceneLoadError::Tile { tile, source } => {
                write!(f, "tile {tile}: {source}")
            }
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Model with every tile of the scene loaded, plus the tile ids in file
/// order.
#[derive(Debug)]
pub struct LoadedScene {
    pub model: TemporalExtensionModel,
    pub tiles: Vec<TileId>,
}

impl LoadedScene {
    /// One `TileLoaded` per tile, in file order.
    pub fn loaded_events(&self) -> EventQueue {
        let mut queue = EventQueue::new();
        for tile in &self.tiles {
            queue.tile_loaded(*tile);
        }
        queue
    }
}

impl TemporalScene {
    pub fn from_json_str(s: &str) -> Result<Self, SceneLoadError> {
        serde_json::from_str(s).map_err(|e| SceneLoadError::Format(FormatError::Json(e)))
    }

    pub fn load(&self) -> Result<LoadedScene, SceneLoadError> {
        let mut model = self.tileset.to_model().map_err(SceneLoadError::Format)?;
        let mut tiles = Vec::with_capacity(self.tiles.len());
        for entry in &self.tiles {
            let tile = TileId(entry.id);
            entry
                .batch_table
                .insert_into(&mut model, tile)
                .map_err(|source| SceneLoadError::Tile { tile, source })?;
            tiles.push(tile);
        }
        Ok(LoadedScene { model, tiles })
    }
}

pub fn load_scene_file(path: impl AsRef<Path>) -> Result<LoadedScene, SceneLoadError> {
    let path = path.as_ref();
    let payload = fs::read_to_string(path).map_err(|e| SceneLoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let scene = TemporalScene::from_json_str(&payload)?;
    let loaded = scene.load()?;
    info!(
        "loaded {} tiles and {} transactions from {}",
        loaded.tiles.len(),
        loaded.model.transactions().len(),
        path.display()
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::{SceneLoadError, TemporalScene};
    use foundation::ids::TileId;
    use temporal::{TemporalEvent, TemporalModel};

    const SCENE: &str = r#"{
        "tileset": { "transactions": [] },
        "tiles": [
            { "id": 2, "batchTable": { "featureIds": [1], "startDates": [0], "endDates": [1] } },
            { "id": 1, "batchTable": { "featureIds": [], "startDates": [], "endDates": [] } }
        ]
    }"#;

    #[test]
    fn loads_tiles_in_file_order() {
        let loaded = TemporalScene::from_json_str(SCENE).unwrap().load().unwrap();
        assert_eq!(loaded.tiles, vec![TileId(2), TileId(1)]);
        assert_eq!(loaded.model.batch_table(TileId(2)).unwrap().len(), 1);
        assert_eq!(
            loaded.loaded_events().events(),
            &[
                TemporalEvent::TileLoaded(TileId(2)),
                TemporalEvent::TileLoaded(TileId(1))
            ]
        );
    }

    #[test]
    fn tile_errors_name_the_tile() {
        let scene = TemporalScene::from_json_str(
            r#"{ "tileset": {}, "tiles": [ { "id": 9, "batchTable":
                 { "featureIds": [1], "startDates": ["nope"], "endDates": [1] } } ] }"#,
        )
        .unwrap();
        let err = scene.load().unwrap_err();
        assert!(matches!(err, SceneLoadError::Tile { tile: TileId(9), .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = super::load_scene_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SceneLoadError::Io { .. }));
    }
}
