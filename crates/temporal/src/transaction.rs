use std::fmt;

use foundation::ids::FeatureId;
use foundation::time::TimeSpan;

use crate::error::TemporalError;

/// Prefix of every composed aggregate style name.
pub const AGGREGATE_PREFIX: &str = "aggregate";

/// Kind of a primary transaction. Open-ended: kinds outside the three
/// built-in ones are carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Creation,
    Demolition,
    Modification,
    Other(String),
}

impl TransactionType {
    pub fn parse(s: &str) -> Self {
        match s {
            "creation" => TransactionType::Creation,
            "demolition" => TransactionType::Demolition,
            "modification" => TransactionType::Modification,
            other => TransactionType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransactionType::Creation => "creation",
            TransactionType::Demolition => "demolition",
            TransactionType::Modification => "modification",
            TransactionType::Other(s) => s,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionBody {
    Primary { kind: TransactionType },
    Aggregate { transactions: Vec<Transaction> },
    /// Neither a type nor nested transactions. Kept so the engine can report
    /// it instead of dropping the record at load time.
    Unrecognized,
}

/// A time-bounded relation from source features to destination features.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<String>,
    pub span: TimeSpan,
    pub source: Vec<FeatureId>,
    pub destination: Vec<FeatureId>,
    pub tags: Vec<String>,
    pub body: TransactionBody,
}

impl Transaction {
    pub fn new(span: TimeSpan, body: TransactionBody) -> Result<Self, TemporalError> {
        if !span.is_ordered() {
            return Err(TemporalError::InvalidTransactionSpan { id: None, span });
        }
        Ok(Self {
            id: None,
            span,
            source: Vec::new(),
            destination: Vec::new(),
            tags: Vec::new(),
            body,
        })
    }

    pub fn primary(span: TimeSpan, kind: TransactionType) -> Result<Self, TemporalError> {
        Self::new(span, TransactionBody::Primary { kind })
    }

    pub fn aggregate(span: TimeSpan, transactions: Vec<Transaction>) -> Result<Self, TemporalError> {
        Self::new(span, TransactionBody::Aggregate { transactions })
    }

    pub fn with_source(mut self, source: Vec<FeatureId>) -> Self {
        self.source = source;
        self
    }

    pub fn with_destination(mut self, destination: Vec<FeatureId>) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Style label this transaction is drawn with.
    ///
    /// Primary transactions resolve to their type. Aggregates resolve to
    /// `aggregate` followed by `-<child>` for each nested transaction in
    /// order; nested aggregates start their own `aggregate` prefix, so
    /// `aggregate(creation, aggregate(modification), demolition)` reads
    /// `aggregate-creation-aggregate-modification-demolition`.
    ///
    /// Returns `None` when the transaction, or any nested one, is
    /// unrecognized.
    pub fn style_name(&self) -> Option<String> {
        match &self.body {
            TransactionBody::Primary { kind } => Some(kind.as_str().to_string()),
            TransactionBody::Aggregate { transactions } => {
                let mut name = String::from(AGGREGATE_PREFIX);
                for nested in transactions {
                    name.push('-');
                    name.push_str(&nested.style_name()?);
                }
                Some(name)
            }
            TransactionBody::Unrecognized => None,
        }
    }

    /// `(start, start + h]` with `h` half the transaction's duration.
    pub fn in_first_half(&self, t: f64) -> bool {
        let start = self.span.start.0;
        t > start && t <= start + self.span.half_duration()
    }

    /// `(start + h, end]` with `h` half the transaction's duration.
    pub fn in_second_half(&self, t: f64) -> bool {
        let start = self.span.start.0;
        t > start + self.span.half_duration() && t <= self.span.end.0
    }
}
