use foundation::time::TimeSpan;

/// Construction-time failures. Display-loop diagnostics (missing batch
/// tables, unregistered styles, malformed transactions) are logged and
/// never surface as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalError {
    BatchTableShape {
        feature_ids: usize,
        start_dates: usize,
        end_dates: usize,
    },
    InvalidTransactionSpan {
        id: Option<String>,
        span: TimeSpan,
    },
    Config(String),
}

impl std::fmt::Display for TemporalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemporalError::BatchTableShape {
                feature_ids,
                start_dates,
                end_dates,
            } => write!(
                f,
                "batch table arrays differ in length: featureIds={feature_ids} startDates={start_dates} endDates={end_dates}"
            ),
            TemporalError::InvalidTransactionSpan { id, span } => write!(
                f,
                "transaction {} ends before it starts: [{}, {}]",
                id.as_deref().unwrap_or("<anonymous>"),
                span.start.0,
                span.end.0
            ),
            TemporalError::Config(msg) => write!(f, "invalid temporal config: {msg}"),
        }
    }
}

impl std::error::Error for TemporalError {}
