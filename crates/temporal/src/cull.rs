use foundation::time::{Time, TimeSpan};
use tracing::warn;

use crate::batch_table::{FeatureTransactions, TemporalBatchTable};
use crate::config::DEFAULT_HALF_VINTAGE;
use crate::style::StyleLabel;
use crate::transaction::Transaction;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CullOptions {
    /// Width of the synthetic creation/demolition window used for features
    /// without any transaction record.
    pub half_vintage: f64,
}

impl Default for CullOptions {
    fn default() -> Self {
        Self {
            half_vintage: DEFAULT_HALF_VINTAGE,
        }
    }
}

/// Style label of every feature of `table` at `time`, in row order.
///
/// Per feature, first match wins:
/// 1. inside its own lifespan (inclusive): `noTransaction`;
/// 2. has a transaction record: the source transaction's style during its
///    first half `(start, start + h]`, the destination transaction's style
///    during its second half `(start + h, end]` (destination is checked last
///    and wins if both match), `hide` otherwise;
/// 3. no record: `creation` in `[start - hv, start)`, `demolition` in
///    `(end, end + hv]`, `hide` otherwise.
pub fn cull(table: &TemporalBatchTable, time: Time, opts: CullOptions) -> Vec<StyleLabel> {
    let t = time.0;

    table
        .feature_ids()
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let Some(lifespan) = table.lifespan(i) else {
                return StyleLabel::HIDE;
            };
            if lifespan.contains(time) {
                return StyleLabel::NO_TRANSACTION;
            }
            match table.transactions(id) {
                Some(transacs) => transaction_label(transacs, t),
                None => vintage_label(lifespan, t, opts.half_vintage),
            }
        })
        .collect()
}

fn transaction_label(transacs: &FeatureTransactions, t: f64) -> StyleLabel {
    let mut label = None;

    if let Some(source) = &transacs.as_source
        && source.in_first_half(t)
    {
        label = Some(resolve(source));
    }
    if let Some(destination) = &transacs.as_destination
        && destination.in_second_half(t)
    {
        label = Some(resolve(destination));
    }

    label.unwrap_or(StyleLabel::HIDE)
}

fn resolve(transaction: &Transaction) -> StyleLabel {
    match transaction.style_name() {
        Some(name) => StyleLabel::from(name),
        None => {
            warn!(
                "malformed transaction {}: neither primary nor aggregate, hiding feature",
                transaction.id.as_deref().unwrap_or("<anonymous>")
            );
            StyleLabel::HIDE
        }
    }
}

fn vintage_label(lifespan: TimeSpan, t: f64, half_vintage: f64) -> StyleLabel {
    let (start, end) = (lifespan.start.0, lifespan.end.0);
    if start - half_vintage <= t && t < start {
        StyleLabel::CREATION
    } else if end < t && t <= end + half_vintage {
        StyleLabel::DEMOLITION
    } else {
        StyleLabel::HIDE
    }
}
