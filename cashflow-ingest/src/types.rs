use cashflow_core::{EventError, FinancialEvent, LocalDateError};
use thiserror::Error;

/// Why a single record was refused at the boundary.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("record is not an object")]
    NotAnObject,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("type must be \"income\" or \"expense\", got {0}")]
    InvalidKind(String),
    #[error("amount must be a number, got {0}")]
    NonNumericAmount(String),
    #[error(transparent)]
    Contract(#[from] EventError),
    #[error(transparent)]
    LocalTime(#[from] LocalDateError),
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A record that did not make it into the event list.
#[derive(Debug)]
pub struct Rejected {
    /// Zero-based position in the source
    pub index: usize,
    pub id: Option<String>,
    pub error: IngestError,
}

/// Normalized output of the ingest parsers (source-agnostic).
///
/// `events` passed the contract checks; their `date` may still be `None`,
/// which aggregation skips and reports on its own.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub events: Vec<FinancialEvent>,
    pub rejected: Vec<Rejected>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Records seen, accepted or not
    pub fn total(&self) -> usize {
        self.events.len() + self.rejected.len()
    }

    pub(crate) fn push(&mut self, index: usize, id: Option<String>, result: Result<FinancialEvent, IngestError>) {
        match result {
            Ok(event) => self.events.push(event),
            Err(error) => {
                tracing::warn!(index, id = id.as_deref().unwrap_or("-"), %error, "rejecting record");
                self.rejected.push(Rejected { index, id, error });
            }
        }
    }
}

/// Identifier for records the source sent without one.
pub(crate) fn positional_id(index: usize) -> String {
    format!("row-{:04}", index + 1)
}
