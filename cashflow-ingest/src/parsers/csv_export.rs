//! CSV export parser.
//!
//! Expected header (any column order, extra columns ignored):
//!   id,name,description,date,amount,type,attachment
//!
//! `name`, `date`, `amount` and `type` are required columns. `date` holds Unix
//! seconds or a local `YYYY-MM-DD[ HH:MM]` read in the caller's timezone.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use cashflow_core::{EventKind, FinancialEvent, LocalDateError, Tz, parse_local_date};
use regex::Regex;

use crate::types::{IngestError, IngestReport, positional_id};

struct Columns {
    id: Option<usize>,
    name: usize,
    description: Option<usize>,
    date: usize,
    amount: usize,
    kind: usize,
    attachment: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| anyhow!("CSV header is missing required column '{name}'"))
        };

        Ok(Self {
            id: find("id"),
            name: require("name")?,
            description: find("description"),
            date: require("date")?,
            amount: require("amount")?,
            kind: require("type")?,
            attachment: find("attachment"),
        })
    }
}

/// Parse CSV text from any reader, interpreting calendar dates in `tz`.
pub fn parse_events_csv<R: Read>(reader: R, tz: &Tz) -> Result<IngestReport> {
    let rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    parse_records(rdr, tz)
}

/// Parse a CSV file from disk.
pub fn parse_events_csv_path(path: impl AsRef<Path>, tz: &Tz) -> Result<IngestReport> {
    let rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    parse_records(rdr, tz)
}

/// Recognizes the two accepted `date` cell shapes.
struct DateCells {
    seconds: Regex,
    local: Regex,
}

impl DateCells {
    fn new() -> Result<Self> {
        Ok(Self {
            seconds: Regex::new(r"^-?\d+$")?,
            local: Regex::new(r"^\d{4}-\d{2}-\d{2}( \d{2}:\d{2})?$")?,
        })
    }

    /// Unrecognized cells are treated as missing, never guessed. A well-formed
    /// local time the clock skipped is an error, not a missing date.
    fn parse(&self, cell: &str, tz: &Tz) -> Result<Option<i64>, IngestError> {
        if self.seconds.is_match(cell) {
            Ok(cell.parse().ok())
        } else if self.local.is_match(cell) {
            match parse_local_date(cell, tz) {
                Ok(secs) => Ok(Some(secs)),
                Err(LocalDateError::Format(_)) => Ok(None),
                Err(err) => Err(err.into()),
            }
        } else {
            Ok(None)
        }
    }
}

fn parse_records<R: Read>(mut rdr: csv::Reader<R>, tz: &Tz) -> Result<IngestReport> {
    let cols = Columns::from_headers(rdr.headers().context("reading CSV header")?)?;
    let dates = DateCells::new()?;

    let mut report = IngestReport::default();

    for (index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading CSV row {}", index + 1))?;
        let id = optional_cell(&record, cols.id);
        let decoded = decode_row(&record, &cols, &dates, tz, id.clone(), index);
        report.push(index, id, decoded);
    }

    Ok(report)
}

fn cell(record: &csv::StringRecord, i: usize) -> &str {
    record.get(i).unwrap_or("")
}

fn optional_cell(record: &csv::StringRecord, i: Option<usize>) -> Option<String> {
    i.map(|i| cell(record, i))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn decode_row(
    record: &csv::StringRecord,
    cols: &Columns,
    dates: &DateCells,
    tz: &Tz,
    id: Option<String>,
    index: usize,
) -> Result<FinancialEvent, IngestError> {
    let kind_cell = cell(record, cols.kind);
    let kind = EventKind::parse(kind_cell)
        .ok_or_else(|| IngestError::InvalidKind(format!("{kind_cell:?}")))?;

    let amount_cell = cell(record, cols.amount);
    let amount: f64 = amount_cell
        .parse()
        .map_err(|_| IngestError::NonNumericAmount(format!("{amount_cell:?}")))?;

    let event = FinancialEvent {
        id: id.unwrap_or_else(|| positional_id(index)),
        name: cell(record, cols.name).to_string(),
        description: optional_cell(record, cols.description),
        date: dates.parse(cell(record, cols.date), tz)?,
        amount,
        kind,
        attachment: optional_cell(record, cols.attachment),
    };
    event.validate()?;
    Ok(event)
}
