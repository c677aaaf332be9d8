use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use foundation::ids::{FeatureId, TileId};
use foundation::time::TimeSpan;
use tracing::debug;

use crate::batch_table::{FeatureTransactions, TemporalBatchTable};
use crate::error::TemporalError;
use crate::transaction::Transaction;

/// Read-only source of per-tile temporal batch tables.
pub trait TemporalModel {
    fn batch_table(&self, tile: TileId) -> Option<&TemporalBatchTable>;
}

/// Maps every feature to the transactions it takes part in.
///
/// Each source id gets the transaction as `as_source`, each destination id as
/// `as_destination`. Later transactions overwrite earlier ones for the same
/// feature and role. Transactions nested in aggregates are not indexed on
/// their own.
pub fn index_transactions(
    transactions: &[Arc<Transaction>],
) -> HashMap<FeatureId, FeatureTransactions> {
    let mut index: HashMap<FeatureId, FeatureTransactions> = HashMap::new();
    for transaction in transactions {
        for id in &transaction.source {
            let entry = index.entry(id.clone()).or_default();
            if entry.as_source.is_some() {
                debug!("feature {id}: source transaction replaced");
            }
            entry.as_source = Some(transaction.clone());
        }
        for id in &transaction.destination {
            let entry = index.entry(id.clone()).or_default();
            if entry.as_destination.is_some() {
                debug!("feature {id}: destination transaction replaced");
            }
            entry.as_destination = Some(transaction.clone());
        }
    }
    index
}

/// Temporal data of a whole tileset: its transaction graph plus the batch
/// tables of the tiles loaded so far.
#[derive(Debug, Default)]
pub struct TemporalExtensionModel {
    span: Option<TimeSpan>,
    transactions: Vec<Arc<Transaction>>,
    features_transacs: HashMap<FeatureId, FeatureTransactions>,
    batch_tables: BTreeMap<TileId, Arc<TemporalBatchTable>>,
}

impl TemporalExtensionModel {
    pub fn new(span: Option<TimeSpan>, transactions: Vec<Transaction>) -> Self {
        let transactions: Vec<Arc<Transaction>> = transactions.into_iter().map(Arc::new).collect();
        let features_transacs = index_transactions(&transactions);
        Self {
            span,
            transactions,
            features_transacs,
            batch_tables: BTreeMap::new(),
        }
    }

    pub fn transactions(&self) -> &[Arc<Transaction>] {
        &self.transactions
    }

    pub fn feature_transactions(&self, id: &FeatureId) -> Option<&FeatureTransactions> {
        self.features_transacs.get(id)
    }

    /// Build and store a tile's batch table from its parallel arrays,
    /// attaching the transactions of the features it lists.
    pub fn insert_tile(
        &mut self,
        tile: TileId,
        feature_ids: Vec<FeatureId>,
        start_dates: Vec<f64>,
        end_dates: Vec<f64>,
    ) -> Result<Arc<TemporalBatchTable>, TemporalError> {
        let transacs: HashMap<FeatureId, FeatureTransactions> = feature_ids
            .iter()
            .filter_map(|id| {
                self.feature_transactions(id)
                    .map(|t| (id.clone(), t.clone()))
            })
            .collect();
        let table = TemporalBatchTable::new(feature_ids, start_dates, end_dates, transacs)?;
        Ok(self.insert_batch_table(tile, table))
    }

    pub fn insert_batch_table(
        &mut self,
        tile: TileId,
        table: TemporalBatchTable,
    ) -> Arc<TemporalBatchTable> {
        let table = Arc::new(table);
        if self.batch_tables.insert(tile, table.clone()).is_some() {
            debug!("tile {tile}: temporal batch table replaced");
        }
        table
    }

    /// Declared tileset span, or else the span covering every loaded
    /// feature.
    pub fn time_bounds(&self) -> Option<TimeSpan> {
        self.span.or_else(|| {
            self.batch_tables
                .values()
                .filter_map(|t| t.time_bounds())
                .reduce(|acc, s| acc.union(s))
        })
    }
}

impl TemporalModel for TemporalExtensionModel {
    fn batch_table(&self, tile: TileId) -> Option<&TemporalBatchTable> {
        self.batch_tables.get(&tile).map(|t| t.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::{TemporalExtensionModel, TemporalModel};
    use crate::transaction::{Transaction, TransactionType};
    use foundation::ids::{FeatureId, TileId};
    use foundation::time::TimeSpan;

    fn modification(a: &str, b: &str, start: f64, end: f64) -> Transaction {
        Transaction::primary(TimeSpan::new(start, end), TransactionType::Modification)
            .unwrap()
            .with_source(vec![FeatureId::from(a)])
            .with_destination(vec![FeatureId::from(b)])
    }

    #[test]
    fn tiles_get_transactions_of_their_features() {
        let mut model = TemporalExtensionModel::new(
            None,
            vec![modification("a", "b", 2009.0, 2012.0)],
        );
        model
            .insert_tile(
                TileId(1),
                vec![FeatureId::from("a"), FeatureId::from("z")],
                vec![2000.0, 2000.0],
                vec![2009.0, 2020.0],
            )
            .unwrap();

        let table = model.batch_table(TileId(1)).unwrap();
        let a = table.transactions(&FeatureId::from("a")).unwrap();
        assert!(a.as_source.is_some());
        assert!(a.as_destination.is_none());
        assert!(table.transactions(&FeatureId::from("z")).is_none());
        assert!(table.transactions(&FeatureId::from("b")).is_none());
        assert!(model.batch_table(TileId(2)).is_none());
    }

    #[test]
    fn later_transaction_wins_per_role() {
        let model = TemporalExtensionModel::new(
            None,
            vec![
                modification("a", "b", 2000.0, 2001.0),
                modification("a", "c", 2005.0, 2006.0),
            ],
        );
        let a = model.feature_transactions(&FeatureId::from("a")).unwrap();
        let source = a.as_source.as_ref().unwrap();
        assert_eq!(source.span, TimeSpan::new(2005.0, 2006.0));
        assert!(model.feature_transactions(&FeatureId::from("b")).is_some());
    }

    #[test]
    fn time_bounds_fall_back_to_loaded_tiles() {
        let mut model = TemporalExtensionModel::new(None, vec![]);
        assert_eq!(model.time_bounds(), None);
        model
            .insert_tile(TileId(1), vec![FeatureId::from(1)], vec![2001.0], vec![2004.0])
            .unwrap();
        model
            .insert_tile(TileId(2), vec![FeatureId::from(1)], vec![1999.0], vec![2002.0])
            .unwrap();
        assert_eq!(model.time_bounds(), Some(TimeSpan::new(1999.0, 2004.0)));

        let declared = TemporalExtensionModel::new(Some(TimeSpan::new(1.0, 2.0)), vec![]);
        assert_eq!(declared.time_bounds(), Some(TimeSpan::new(1.0, 2.0)));
    }
}
