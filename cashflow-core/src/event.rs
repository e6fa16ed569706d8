//! Financial event model: a single recorded income or expense.

use chrono::{DateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::EventError;

/// Direction of money flow. The sign lives here, never in the amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EventKind {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Income => "income",
            EventKind::Expense => "expense",
        }
    }

    /// Parse the wire representation. Only the exact lowercase names are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(EventKind::Income),
            "expense" => Some(EventKind::Expense),
            _ => None,
        }
    }
}

/// A recorded income or expense, as supplied by the data source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialEvent {
    /// Opaque identifier assigned by the persistence layer
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Unix timestamp in seconds. `None` when the source sent nothing usable.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: Option<i64>,
    /// Non-negative magnitude
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Encoded image payload, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

impl FinancialEvent {
    /// Create a new dated event
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        date: i64,
        amount: f64,
        kind: EventKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            date: Some(date),
            amount,
            kind,
            attachment: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }

    /// Drop the timestamp, e.g. to model a record the source sent without one.
    pub fn undated(mut self) -> Self {
        self.date = None;
        self
    }

    pub fn is_income(&self) -> bool {
        self.kind == EventKind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == EventKind::Expense
    }

    /// Amount with the sign implied by `kind` applied.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EventKind::Income => self.amount,
            EventKind::Expense => -self.amount,
        }
    }

    /// The event's instant, if the timestamp is present and representable.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Check the contract every event must satisfy before aggregation.
    ///
    /// The date is not checked: undated events are skipped by the grouper.
    pub fn validate(&self) -> Result<(), EventError> {
        if self.name.trim().is_empty() {
            return Err(EventError::EmptyName {
                id: self.id.clone(),
            });
        }
        if !self.amount.is_finite() {
            return Err(EventError::NonFiniteAmount {
                id: self.id.clone(),
            });
        }
        if self.amount < 0.0 {
            return Err(EventError::NegativeAmount {
                id: self.id.clone(),
                amount: self.amount,
            });
        }
        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Seconds(i64),
    Float(f64),
    Other(IgnoredAny),
}

/// Accept integer seconds (or a float with no fractional part); everything
/// else, including `null` and numeric strings, becomes `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawDate>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawDate::Seconds(secs)) => Some(secs),
        Some(RawDate::Float(f))
            if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 =>
        {
            Some(f as i64)
        }
        _ => None,
    })
}
