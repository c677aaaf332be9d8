use std::collections::BTreeMap;

use foundation::ids::TileId;
use serde::{Deserialize, Serialize};

use crate::error::TemporalError;
use crate::style::{FeatureStyle, StyleRegistry, default_styles};

/// Width of the synthetic creation/demolition window on each side of a
/// feature's lifespan.
pub const DEFAULT_HALF_VINTAGE: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemporalConfig {
    pub half_vintage: f64,
    /// Tile that never carries geometry and always yields no states.
    pub root_tile: u64,
    /// Extra or overriding styles, registered after the defaults.
    pub styles: BTreeMap<String, FeatureStyle>,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            half_vintage: DEFAULT_HALF_VINTAGE,
            root_tile: TileId::ROOT.0,
            styles: BTreeMap::new(),
        }
    }
}

impl TemporalConfig {
    pub fn from_json_str(s: &str) -> Result<Self, TemporalError> {
        let config: TemporalConfig =
            serde_json::from_str(s).map_err(|e| TemporalError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TemporalError> {
        if !self.half_vintage.is_finite() || self.half_vintage < 0.0 {
            return Err(TemporalError::Config(format!(
                "halfVintage must be finite and >= 0, got {}",
                self.half_vintage
            )));
        }
        Ok(())
    }

    pub fn root_tile(&self) -> TileId {
        TileId(self.root_tile)
    }

    /// Defaults first, then the configured styles on top.
    pub fn resolved_styles(&self) -> BTreeMap<String, FeatureStyle> {
        let mut styles = default_styles();
        for (name, style) in &self.styles {
            styles.insert(name.clone(), *style);
        }
        styles
    }
}

pub fn register_styles<R: StyleRegistry + ?Sized>(registry: &mut R, config: &TemporalConfig) {
    for (name, style) in config.resolved_styles() {
        registry.register_style(&name, style);
    }
}

#[cfg(test)]
mod tests {
    use super::{TemporalConfig, register_styles};
    use crate::error::TemporalError;
    use crate::style::{StyleLabel, StyleRegistry};
    use crate::tiles_manager::TilesManager;
    use foundation::ids::TileId;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_gives_defaults() {
        let cfg = TemporalConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, TemporalConfig::default());
        assert_eq!(cfg.root_tile(), TileId(0));
        assert_eq!(cfg.resolved_styles().len(), 5);
    }

    #[test]
    fn configured_styles_extend_and_override() {
        let cfg = TemporalConfig::from_json_str(
            r#"{
                "halfVintage": 2.0,
                "styles": {
                    "aggregate-creation-demolition": { "opacity": 0.5, "color": [0.0, 0.0, 1.0] },
                    "hide": { "opacity": 0.1, "color": [1.0, 1.0, 1.0], "alphaTest": 0.05 }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.half_vintage, 2.0);
        let styles = cfg.resolved_styles();
        assert_eq!(styles.len(), 6);
        assert_eq!(styles["hide"].opacity, 0.1);
        assert_eq!(styles["hide"].alpha_test, Some(0.05));
        assert_eq!(styles["aggregate-creation-demolition"].color, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn negative_half_vintage_is_rejected() {
        let err = TemporalConfig::from_json_str(r#"{ "halfVintage": -1 }"#).unwrap_err();
        assert!(matches!(err, TemporalError::Config(_)));
    }

    #[test]
    fn registration_covers_canonical_and_configured_styles() {
        let cfg = TemporalConfig::from_json_str(
            r#"{ "styles": { "aggregate-creation": { "opacity": 0.5, "color": [0.0, 0.0, 1.0] } } }"#,
        )
        .unwrap();
        let mut tm = TilesManager::new();
        assert!(!tm.is_style_registered("creation"));
        register_styles(&mut tm, &cfg);
        for label in StyleLabel::CANONICAL {
            assert!(tm.is_style_registered(label.as_str()), "missing {label}");
        }
        assert!(tm.is_style_registered("aggregate-creation"));
        assert!(!tm.is_style_registered("aggregate-demolition"));
    }
}
