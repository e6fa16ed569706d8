//! cashflow-ingest: boundary validation for event sources (REST JSON payloads and CSV exports).
//!
//! Contract violations are rejected here so the aggregation core only ever
//! sees well-typed events.

pub mod parsers;
pub mod types;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cashflow_core::Tz;

pub use parsers::{parse_events_csv, parse_events_csv_path, parse_events_json};
pub use types::{IngestError, IngestReport, Rejected};

/// Load events from a `.csv` or JSON file, chosen by extension.
pub fn load_events_file(path: impl AsRef<Path>, tz: &Tz) -> Result<IngestReport> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let report = if is_csv {
        parse_events_csv_path(path, tz)?
    } else {
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        parse_events_json(&text).with_context(|| format!("parsing {}", path.display()))?
    };

    tracing::info!(
        path = %path.display(),
        accepted = report.events.len(),
        rejected = report.rejected.len(),
        "loaded events"
    );
    Ok(report)
}
