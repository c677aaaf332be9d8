use std::collections::HashMap;
use std::sync::Arc;

use foundation::ids::FeatureId;
use foundation::time::TimeSpan;

use crate::error::TemporalError;
use crate::transaction::Transaction;

/// The transactions a feature takes part in, one per role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTransactions {
    pub as_source: Option<Arc<Transaction>>,
    pub as_destination: Option<Arc<Transaction>>,
}

/// Per-tile temporal attributes, immutable once built.
///
/// `feature_ids[i]`, `start_dates[i]` and `end_dates[i]` describe the same
/// feature (row `i` of the tile's batch table).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalBatchTable {
    feature_ids: Vec<FeatureId>,
    start_dates: Vec<f64>,
    end_dates: Vec<f64>,
    features_transacs: HashMap<FeatureId, FeatureTransactions>,
}

impl TemporalBatchTable {
    pub fn new(
        feature_ids: Vec<FeatureId>,
        start_dates: Vec<f64>,
        end_dates: Vec<f64>,
        features_transacs: HashMap<FeatureId, FeatureTransactions>,
    ) -> Result<Self, TemporalError> {
        if feature_ids.len() != start_dates.len() || feature_ids.len() != end_dates.len() {
            return Err(TemporalError::BatchTableShape {
                feature_ids: feature_ids.len(),
                start_dates: start_dates.len(),
                end_dates: end_dates.len(),
            });
        }
        Ok(Self {
            feature_ids,
            start_dates,
            end_dates,
            features_transacs,
        })
    }

    pub fn len(&self) -> usize {
        self.feature_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_ids.is_empty()
    }

    pub fn feature_ids(&self) -> &[FeatureId] {
        &self.feature_ids
    }

    pub fn lifespan(&self, index: usize) -> Option<TimeSpan> {
        let start = *self.start_dates.get(index)?;
        let end = *self.end_dates.get(index)?;
        Some(TimeSpan::new(start, end))
    }

    pub fn transactions(&self, id: &FeatureId) -> Option<&FeatureTransactions> {
        self.features_transacs.get(id)
    }

    /// Span covering every feature lifespan, or `None` for an empty table.
    pub fn time_bounds(&self) -> Option<TimeSpan> {
        (0..self.len())
            .filter_map(|i| self.lifespan(i))
            .reduce(|acc, s| acc.union(s))
    }
}
