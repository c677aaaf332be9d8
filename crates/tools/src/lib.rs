//! Commands behind the `atlas-temporal` binary.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use formats::LoadedScene;
use foundation::ids::TileId;
use foundation::time::Time;
use serde::Serialize;
use temporal::{
    FeatureStyle, StyleLabel, TemporalConfig, TemporalExtensionModel,
    TemporalProvider, TilesManager,
};
use tracing::debug;

/// Upper bound on the number of sweep steps.
pub const MAX_SWEEP_STEPS: usize = 100_000;

type Provider = TemporalProvider<TemporalExtensionModel, TilesManager>;

/// Config file (if any) with the command-line override applied on top.
pub fn load_config(
    path: Option<&Path>,
    half_vintage: Option<f64>,
) -> Result<TemporalConfig, String> {
    let mut config = match path {
        Some(p) => {
            let payload = fs::read_to_string(p).map_err(|e| format!("read {p:?}: {e}"))?;
            TemporalConfig::from_json_str(&payload).map_err(|e| format!("{p:?}: {e}"))?
        }
        None => TemporalConfig::default(),
    };
    if let Some(hv) = half_vintage {
        config.half_vintage = hv;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn provider(loaded: LoadedScene, config: TemporalConfig, time: Time) -> Result<Provider, String> {
    let mut tm = TilesManager::new();
    for tile in &loaded.tiles {
        tm.set_visible(*tile, true);
    }
    TemporalProvider::with_config(loaded.model, tm, time, config).map_err(|e| e.to_string())
}

/// Feature states per tile at `time`, keyed by tile id. Restricted to
/// `tiles` when non-empty.
pub fn states_report(
    loaded: LoadedScene,
    config: TemporalConfig,
    time: f64,
    tiles: &[u64],
) -> Result<BTreeMap<String, Vec<StyleLabel>>, String> {
    let wanted: Vec<TileId> = if tiles.is_empty() {
        loaded.tiles.clone()
    } else {
        tiles.iter().copied().map(TileId).collect()
    };
    let mut p = provider(loaded, config, Time(time))?;

    let mut out = BTreeMap::new();
    for tile in wanted {
        out.insert(tile.to_string(), p.compute_features_states(tile));
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub time: f64,
    /// Applied style name -> number of features.
    pub counts: BTreeMap<String, usize>,
}

/// Steps the time from `from` to `to` (inclusive) by `step`, restyling all
/// tiles through `TimeChanged` events, and counts the applied styles at each
/// step. Bounds default to the tileset's time bounds.
pub fn sweep(
    loaded: LoadedScene,
    config: TemporalConfig,
    from: Option<f64>,
    to: Option<f64>,
    step: f64,
) -> Result<Vec<SweepRow>, String> {
    if !step.is_finite() || step <= 0.0 {
        return Err(format!("step must be a positive number, got {step}"));
    }
    let bounds = loaded.model.time_bounds();
    let from = from
        .or(bounds.map(|b| b.start.0))
        .ok_or("no --from given and the scene has no time bounds")?;
    let to = to
        .or(bounds.map(|b| b.end.0))
        .ok_or("no --to given and the scene has no time bounds")?;
    if to < from {
        return Err(format!("--to ({to}) is before --from ({from})"));
    }
    let intervals = ((to - from) / step).floor();
    if !intervals.is_finite() || intervals + 1.0 > MAX_SWEEP_STEPS as f64 {
        return Err(format!(
            "sweeping [{from}, {to}] by {step} exceeds {MAX_SWEEP_STEPS} steps"
        ));
    }
    let steps = intervals as usize + 1;

    let tiles = loaded.tiles.clone();
    let mut queue = loaded.loaded_events();
    let mut p = provider(loaded, config, Time(from))?;
    let mut rows = Vec::with_capacity(steps);

    for i in 0..steps {
        let t = from + i as f64 * step;
        queue.time_changed(Time(t));
        p.process_events(&mut queue);

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for tile in &tiles {
            for (_, name) in p.tiles_manager().applied_tile_styles(*tile) {
                *counts.entry(name.to_string()).or_default() += 1;
            }
        }
        debug!("t={t}: {counts:?}");
        rows.push(SweepRow { time: t, counts });
    }
    Ok(rows)
}

/// Styles a provider built with `config` would register.
pub fn styles_table(config: &TemporalConfig) -> BTreeMap<String, FeatureStyle> {
    config.resolved_styles()
}
