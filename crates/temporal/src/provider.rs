use foundation::ids::{FeatureRef, TileId};
use foundation::time::Time;
use tracing::{debug, warn};

use crate::cache::StateCache;
use crate::config::{TemporalConfig, register_styles};
use crate::cull::{CullOptions, cull};
use crate::error::TemporalError;
use crate::events::{EventQueue, TemporalEvent};
use crate::model::TemporalModel;
use crate::style::{ApplyOptions, StyleLabel, StyleRegistry, VisibleTiles};

/// Drives feature styling from the simulation time.
///
/// Owns the state cache; reads batch tables from `M` and pushes style
/// assignments to `T`. Everything runs to completion on the caller's thread.
#[derive(Debug)]
pub struct TemporalProvider<M, T> {
    model: M,
    tiles_manager: T,
    current_time: Time,
    config: TemporalConfig,
    cache: StateCache,
}

impl<M, T> TemporalProvider<M, T>
where
    M: TemporalModel,
    T: StyleRegistry + VisibleTiles,
{
    /// Registers the default styles into `tiles_manager`.
    pub fn new(model: M, tiles_manager: T, current_time: Time) -> Self {
        Self::build(model, tiles_manager, current_time, TemporalConfig::default())
    }

    pub fn with_config(
        model: M,
        tiles_manager: T,
        current_time: Time,
        config: TemporalConfig,
    ) -> Result<Self, TemporalError> {
        config.validate()?;
        Ok(Self::build(model, tiles_manager, current_time, config))
    }

    fn build(model: M, mut tiles_manager: T, current_time: Time, config: TemporalConfig) -> Self {
        register_styles(&mut tiles_manager, &config);
        Self {
            model,
            tiles_manager,
            current_time,
            config,
            cache: StateCache::new(),
        }
    }

    pub fn current_time(&self) -> Time {
        self.current_time
    }

    /// Cached states of other times stay valid.
    pub fn set_current_time(&mut self, time: Time) {
        self.current_time = time;
    }

    pub fn config(&self) -> &TemporalConfig {
        &self.config
    }

    pub fn cache(&self) -> &StateCache {
        &self.cache
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Batch tables must not change once states were computed for their
    /// tile; cached states are not recomputed.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn tiles_manager(&self) -> &T {
        &self.tiles_manager
    }

    /// Style label of each feature of `tile` at the current time, in batch
    /// table order.
    ///
    /// Empty for the root tile and for tiles whose batch table is not loaded
    /// yet; the latter is not cached.
    pub fn compute_features_states(&mut self, tile: TileId) -> Vec<StyleLabel> {
        if tile == self.config.root_tile() {
            return Vec::new();
        }
        if let Some(states) = self.cache.get(self.current_time, tile) {
            return states.to_vec();
        }

        let Some(table) = self.model.batch_table(tile) else {
            warn!("tile {tile}: no temporal batch table loaded, feature states undetermined");
            return Vec::new();
        };

        let opts = CullOptions {
            half_vintage: self.config.half_vintage,
        };
        let states = cull(table, self.current_time, opts);
        debug!(
            "tile {tile}: computed {} feature states at t={}",
            states.len(),
            self.current_time.0
        );
        self.cache
            .insert(self.current_time, tile, states)
            .to_vec()
    }

    /// Assigns every feature of `tile` its style for the current time.
    /// Labels without a registered style fall back to `noTransaction`.
    ///
    /// Returns the number of features styled.
    pub fn compute_tile_state(&mut self, tile: TileId) -> usize {
        let states = self.compute_features_states(tile);
        for (index, label) in states.iter().enumerate() {
            let feature = FeatureRef::new(tile, index);
            if self.tiles_manager.is_style_registered(label.as_str()) {
                self.tiles_manager.set_style(feature, label.as_str());
            } else {
                warn!(
                    "tile {tile} feature {index}: style {label} is not registered, using {}",
                    StyleLabel::NO_TRANSACTION
                );
                self.tiles_manager
                    .set_style(feature, StyleLabel::NO_TRANSACTION.as_str());
            }
        }
        states.len()
    }

    /// Styles one tile and applies it without requesting a redraw.
    pub fn change_tile_state(&mut self, tile: TileId) -> usize {
        let styled = self.compute_tile_state(tile);
        self.tiles_manager
            .apply_style_to_tile(tile, ApplyOptions { update_view: false });
        styled
    }

    /// Styles every visible tile, then applies all of them in one batch.
    ///
    /// Returns the number of features styled.
    pub fn change_visible_tiles_states(&mut self) -> usize {
        let tiles = self.tiles_manager.visible_tiles();
        let styled: usize = tiles
            .into_iter()
            .map(|tile| self.compute_tile_state(tile))
            .sum();
        self.tiles_manager.apply_styles();
        styled
    }

    pub fn handle_event(&mut self, event: TemporalEvent) {
        match event {
            TemporalEvent::TileLoaded(tile) => {
                self.change_tile_state(tile);
            }
            TemporalEvent::TimeChanged(time) => {
                self.set_current_time(time);
                self.change_visible_tiles_states();
            }
        }
    }

    /// Handles queued events in emission order. Returns how many ran.
    pub fn process_events(&mut self, queue: &mut EventQueue) -> usize {
        let events = queue.drain();
        let n = events.len();
        for event in events {
            self.handle_event(event);
        }
        n
    }
}
