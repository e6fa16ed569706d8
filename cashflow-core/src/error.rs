//! Error and diagnostic types shared across the pipeline.

use thiserror::Error;

/// A contract violation on a single event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventError {
    #[error("event {id}: name is empty")]
    EmptyName { id: String },
    #[error("event {id}: amount is not a finite number")]
    NonFiniteAmount { id: String },
    #[error("event {id}: amount {amount} is negative (sign is carried by the type)")]
    NegativeAmount { id: String, amount: f64 },
}

/// Failure to parse a `YYYY-MM` month key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthKeyError {
    #[error("invalid month key '{0}': expected YYYY-MM")]
    Format(String),
    #[error("invalid month key '{0}': month must be 01-12")]
    Month(String),
}

/// Why the grouper left an event out of every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("missing or non-numeric date")]
    MissingDate,
    #[error("timestamp {0} is outside the representable calendar range")]
    OutOfRange(i64),
}

/// Failure to turn a local wall-clock date into a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocalDateError {
    #[error("invalid local date '{0}': expected YYYY-MM-DD or YYYY-MM-DD HH:MM")]
    Format(String),
    #[error("local time '{0}' does not exist in {1} (skipped by a clock change)")]
    Nonexistent(String, String),
}
