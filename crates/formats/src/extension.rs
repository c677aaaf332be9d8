//! Serde model of the `3DTILES_temporal` extension.
//!
//! The tileset-level extension carries the transaction graph; each tile's
//! batch table carries the lifespans of its features as parallel arrays.

use foundation::ids::{FeatureId, TileId};
use foundation::time::TimeSpan;
use serde::{Deserialize, Serialize};
use temporal::{
    TemporalError, TemporalExtensionModel, Transaction, TransactionBody, TransactionType,
};
use tracing::warn;

#[derive(Debug)]
pub enum FormatError {
    Json(serde_json::Error),
    InvalidDate(String),
    MissingDate { transaction: Option<String> },
    Model(TemporalError),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::Json(e) => write!(f, "json: {e}"),
            FormatError::InvalidDate(s) => write!(f, "invalid date: {s:?}"),
            FormatError::MissingDate { transaction } => write!(
                f,
                "transaction {} has no start or end date",
                transaction.as_deref().unwrap_or("<anonymous>")
            ),
            FormatError::Model(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<serde_json::Error> for FormatError {
    fn from(e: serde_json::Error) -> Self {
        FormatError::Json(e)
    }
}

impl From<TemporalError> for FormatError {
    fn from(e: TemporalError) -> Self {
        FormatError::Model(e)
    }
}

/// A date as found in the extension: a plain number, or a `YYYY[-MM[-DD]]`
/// string (anything after a `T` is ignored).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Number(f64),
    Text(String),
}

impl DateValue {
    /// Fractional year: `YYYY + (MM - 1) / 12 + (DD - 1) / 365`.
    pub fn to_time(&self) -> Result<f64, FormatError> {
        match self {
            DateValue::Number(v) if v.is_finite() => Ok(*v),
            DateValue::Number(v) => Err(FormatError::InvalidDate(v.to_string())),
            DateValue::Text(s) => parse_date(s),
        }
    }
}

fn parse_date(s: &str) -> Result<f64, FormatError> {
    let invalid = || FormatError::InvalidDate(s.to_string());
    let date = s.trim().split('T').next().unwrap_or_default();
    let (sign, date) = match date.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, date.strip_prefix('+').unwrap_or(date)),
    };
    let mut parts = date.split('-');

    let year: i32 = parts
        .next()
        .filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|p| p.parse().ok())
        .ok_or_else(invalid)?;
    let year = sign * year;
    let month: u32 = match parts.next() {
        Some(p) => p.parse().map_err(|_| invalid())?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(p) => p.parse().map_err(|_| invalid())?,
        None => 1,
    };
    if parts.next().is_some() || !(1..=12).contains(&month) {
        return Err(invalid());
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(invalid());
    }

    Ok(year as f64 + (month - 1) as f64 / 12.0 + (day - 1) as f64 / 365.0)
}

/// Proleptic Gregorian calendar.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureIdValue {
    Index(u64),
    Name(String),
}

impl From<&FeatureIdValue> for FeatureId {
    fn from(v: &FeatureIdValue) -> Self {
        match v {
            FeatureIdValue::Index(n) => FeatureId::Index(*n),
            FeatureIdValue::Name(s) => FeatureId::Name(s.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateValue>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Vec<FeatureIdValue>,
    #[serde(default)]
    pub destination: Vec<FeatureIdValue>,
    /// Set on primary transactions.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Set on aggregate transactions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TransactionExtension>>,
}

impl TransactionExtension {
    /// Nested transactions take the dates they omit from `parent`'s span.
    pub fn to_transaction(&self, parent: Option<TimeSpan>) -> Result<Transaction, FormatError> {
        let span = match (&self.start_date, &self.end_date, parent) {
            (Some(s), Some(e), _) => TimeSpan::new(s.to_time()?, e.to_time()?),
            (Some(s), None, Some(p)) => TimeSpan::new(s.to_time()?, p.end.0),
            (None, Some(e), Some(p)) => TimeSpan::new(p.start.0, e.to_time()?),
            (None, None, Some(p)) => p,
            _ => {
                return Err(FormatError::MissingDate {
                    transaction: self.id.clone(),
                });
            }
        };

        let body = match (&self.kind, &self.transactions) {
            (Some(kind), nested) => {
                if nested.is_some() {
                    warn!(
                        "transaction {}: has both a type and nested transactions, treating as primary",
                        self.label()
                    );
                }
                TransactionBody::Primary {
                    kind: TransactionType::parse(kind),
                }
            }
            (None, Some(nested)) => TransactionBody::Aggregate {
                transactions: nested
                    .iter()
                    .map(|t| t.to_transaction(Some(span)))
                    .collect::<Result<_, _>>()?,
            },
            (None, None) => {
                warn!(
                    "transaction {}: neither a type nor nested transactions",
                    self.label()
                );
                TransactionBody::Unrecognized
            }
        };

        let transaction = Transaction::new(span, body).map_err(|e| match e {
            TemporalError::InvalidTransactionSpan { span, .. } => {
                TemporalError::InvalidTransactionSpan {
                    id: self.id.clone(),
                    span,
                }
            }
            other => other,
        })?;

        let mut transaction = transaction
            .with_source(self.source.iter().map(FeatureId::from).collect())
            .with_destination(self.destination.iter().map(FeatureId::from).collect())
            .with_tags(self.tags.clone());
        transaction.id = self.id.clone();
        Ok(transaction)
    }

    fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<anonymous>")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesetExtension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateValue>,
    #[serde(default)]
    pub transactions: Vec<TransactionExtension>,
}

impl TilesetExtension {
    pub fn from_json_str(s: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn span(&self) -> Result<Option<TimeSpan>, FormatError> {
        match (&self.start_date, &self.end_date) {
            (Some(s), Some(e)) => Ok(Some(TimeSpan::new(s.to_time()?, e.to_time()?))),
            _ => Ok(None),
        }
    }

    /// Model holding this tileset's transaction graph and no tiles yet.
    pub fn to_model(&self) -> Result<TemporalExtensionModel, FormatError> {
        let transactions = self
            .transactions
            .iter()
            .map(|t| t.to_transaction(None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TemporalExtensionModel::new(self.span()?, transactions))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTableExtension {
    pub feature_ids: Vec<FeatureIdValue>,
    pub start_dates: Vec<DateValue>,
    pub end_dates: Vec<DateValue>,
}

impl BatchTableExtension {
    pub fn from_json_str(s: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Builds the tile's batch table, attaching the transactions the model
    /// knows for its features.
    pub fn insert_into(
        &self,
        model: &mut TemporalExtensionModel,
        tile: TileId,
    ) -> Result<(), FormatError> {
        let dates = |v: &[DateValue]| v.iter().map(DateValue::to_time).collect::<Result<Vec<_>, _>>();
        let start_dates = dates(&self.start_dates)?;
        let end_dates = dates(&self.end_dates)?;
        let ids = self.feature_ids.iter().map(FeatureId::from).collect();
        model.insert_tile(tile, ids, start_dates, end_dates)?;
        Ok(())
    }
}
