use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use foundation::ids::{FeatureRef, TileId};
use serde::{Deserialize, Serialize};

/// Name of a visual treatment applied to a feature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StyleLabel(Cow<'static, str>);

impl StyleLabel {
    pub const NO_TRANSACTION: StyleLabel = StyleLabel(Cow::Borrowed("noTransaction"));
    pub const CREATION: StyleLabel = StyleLabel(Cow::Borrowed("creation"));
    pub const DEMOLITION: StyleLabel = StyleLabel(Cow::Borrowed("demolition"));
    pub const MODIFICATION: StyleLabel = StyleLabel(Cow::Borrowed("modification"));
    pub const HIDE: StyleLabel = StyleLabel(Cow::Borrowed("hide"));

    /// The five labels every registry is expected to know.
    pub const CANONICAL: [StyleLabel; 5] = [
        Self::NO_TRANSACTION,
        Self::CREATION,
        Self::DEMOLITION,
        Self::MODIFICATION,
        Self::HIDE,
    ];

    pub fn new(name: impl Into<String>) -> Self {
        StyleLabel(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StyleLabel {
    fn from(v: String) -> Self {
        StyleLabel::new(v)
    }
}

impl fmt::Display for StyleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    pub opacity: f32,
    /// Linear RGB in `[0, 1]`.
    pub color: [f32; 3],
    /// Fragments with alpha below this are discarded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_test: Option<f32>,
}

impl FeatureStyle {
    pub fn new(opacity: f32, color: [f32; 3]) -> Self {
        Self {
            opacity,
            color,
            alpha_test: None,
        }
    }

    pub fn from_hex(opacity: f32, rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::new(opacity, [channel(16), channel(8), channel(0)])
    }

    pub fn with_alpha_test(mut self, threshold: f32) -> Self {
        self.alpha_test = Some(threshold);
        self
    }
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self::new(1.0, [1.0, 1.0, 1.0])
    }
}

/// Styles for the canonical labels.
pub fn default_styles() -> BTreeMap<String, FeatureStyle> {
    let mut styles = BTreeMap::new();
    styles.insert(
        StyleLabel::NO_TRANSACTION.to_string(),
        FeatureStyle::from_hex(1.0, 0xffffff),
    );
    styles.insert(
        StyleLabel::CREATION.to_string(),
        FeatureStyle::from_hex(0.6, 0x009900),
    );
    styles.insert(
        StyleLabel::DEMOLITION.to_string(),
        FeatureStyle::from_hex(0.6, 0xff0000),
    );
    styles.insert(
        StyleLabel::MODIFICATION.to_string(),
        FeatureStyle::from_hex(0.6, 0xffd700),
    );
    styles.insert(
        StyleLabel::HIDE.to_string(),
        FeatureStyle::from_hex(0.0, 0xffffff).with_alpha_test(0.3),
    );
    styles
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ApplyOptions {
    /// Ask the renderer to redraw right away.
    pub update_view: bool,
}

/// Receives style registrations and per-feature style assignments.
pub trait StyleRegistry {
    fn register_style(&mut self, name: &str, style: FeatureStyle);

    fn is_style_registered(&self, name: &str) -> bool;

    fn set_style(&mut self, feature: FeatureRef, name: &str);

    fn apply_style_to_tile(&mut self, tile: TileId, opts: ApplyOptions);

    /// Push every pending assignment in one batch.
    fn apply_styles(&mut self);
}

/// Reports which tiles the viewer currently displays.
pub trait VisibleTiles {
    fn visible_tiles(&self) -> Vec<TileId>;
}
