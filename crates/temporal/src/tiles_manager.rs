use std::collections::{BTreeMap, BTreeSet};

use foundation::ids::{FeatureRef, TileId};
use tracing::debug;

use crate::style::{ApplyOptions, FeatureStyle, StyleRegistry, VisibleTiles};

/// In-process tiles manager: keeps the style table, per-feature style
/// assignments and the visible tile set.
///
/// Assignments made through `set_style` stay pending until the tile is
/// applied, either individually or in the next batched `apply_styles`.
#[derive(Debug, Default)]
pub struct TilesManager {
    styles: BTreeMap<String, FeatureStyle>,
    assigned: BTreeMap<FeatureRef, String>,
    applied: BTreeMap<FeatureRef, String>,
    pending: BTreeSet<TileId>,
    visible: BTreeSet<TileId>,
    redraws: u64,
    batches: u64,
}

impl TilesManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_visible(&mut self, tile: TileId, visible: bool) {
        if visible {
            self.visible.insert(tile);
        } else {
            self.visible.remove(&tile);
        }
    }

    /// Style name last assigned to a feature, applied or not.
    pub fn assigned_style(&self, feature: FeatureRef) -> Option<&str> {
        self.assigned.get(&feature).map(|s| s.as_str())
    }

    /// Style name the renderer currently shows for a feature.
    pub fn applied_style(&self, feature: FeatureRef) -> Option<&str> {
        self.applied.get(&feature).map(|s| s.as_str())
    }

    /// Applied style names of one tile, in feature index order.
    pub fn applied_tile_styles(&self, tile: TileId) -> Vec<(usize, &str)> {
        self.applied
            .range(FeatureRef::new(tile, 0)..=FeatureRef::new(tile, usize::MAX))
            .map(|(f, s)| (f.index, s.as_str()))
            .collect()
    }

    pub fn pending_tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.pending.iter().copied()
    }

    /// Number of times a redraw was requested.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    /// Number of batched `apply_styles` calls.
    pub fn batches(&self) -> u64 {
        self.batches
    }

    fn flush_tile(&mut self, tile: TileId) {
        let range = FeatureRef::new(tile, 0)..=FeatureRef::new(tile, usize::MAX);
        for (feature, name) in self.assigned.range(range) {
            self.applied.insert(*feature, name.clone());
        }
        self.pending.remove(&tile);
    }
}

impl StyleRegistry for TilesManager {
    fn register_style(&mut self, name: &str, style: FeatureStyle) {
        debug!("register style {name}");
        self.styles.insert(name.to_string(), style);
    }

    fn is_style_registered(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    fn set_style(&mut self, feature: FeatureRef, name: &str) {
        self.assigned.insert(feature, name.to_string());
        self.pending.insert(feature.tile);
    }

    fn apply_style_to_tile(&mut self, tile: TileId, opts: ApplyOptions) {
        self.flush_tile(tile);
        if opts.update_view {
            self.redraws += 1;
        }
    }

    fn apply_styles(&mut self) {
        let tiles: Vec<TileId> = self.pending.iter().copied().collect();
        for tile in tiles {
            self.flush_tile(tile);
        }
        self.batches += 1;
        self.redraws += 1;
    }
}

impl VisibleTiles for TilesManager {
    fn visible_tiles(&self) -> Vec<TileId> {
        self.visible.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::TilesManager;
    use crate::style::{ApplyOptions, FeatureStyle, StyleRegistry, VisibleTiles};
    use foundation::ids::{FeatureRef, TileId};

    #[test]
    fn assignments_stay_pending_until_applied() {
        let mut tm = TilesManager::new();
        tm.register_style("hide", FeatureStyle::default());
        let f = FeatureRef::new(TileId(3), 1);

        tm.set_style(f, "hide");
        assert_eq!(tm.assigned_style(f), Some("hide"));
        assert_eq!(tm.applied_style(f), None);
        assert_eq!(tm.pending_tiles().collect::<Vec<_>>(), vec![TileId(3)]);

        tm.apply_style_to_tile(TileId(3), ApplyOptions::default());
        assert_eq!(tm.applied_style(f), Some("hide"));
        assert_eq!(tm.pending_tiles().count(), 0);
        assert_eq!(tm.redraws(), 0);
    }

    #[test]
    fn batch_apply_flushes_every_tile_once() {
        let mut tm = TilesManager::new();
        tm.set_style(FeatureRef::new(TileId(1), 0), "creation");
        tm.set_style(FeatureRef::new(TileId(2), 4), "demolition");
        tm.apply_styles();

        assert_eq!(tm.applied_tile_styles(TileId(1)), vec![(0, "creation")]);
        assert_eq!(tm.applied_tile_styles(TileId(2)), vec![(4, "demolition")]);
        assert_eq!(tm.batches(), 1);
        assert_eq!(tm.redraws(), 1);
    }

    #[test]
    fn visible_tiles_are_sorted() {
        let mut tm = TilesManager::new();
        tm.set_visible(TileId(9), true);
        tm.set_visible(TileId(2), true);
        tm.set_visible(TileId(5), true);
        tm.set_visible(TileId(5), false);
        assert_eq!(tm.visible_tiles(), vec![TileId(2), TileId(9)]);
    }
}
