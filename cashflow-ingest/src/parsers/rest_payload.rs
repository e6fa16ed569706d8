//! REST payload parser.
//!
//! Accepts the service envelope or a bare array:
//!   {"events": [{"_id": "...", "name": "...", "date": 1705312800, "amount": 150, "type": "expense"}]}
//!   [{"id": "...", ...}]

use anyhow::{Context, Result};
use cashflow_core::{EventKind, FinancialEvent};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{IngestError, IngestReport, positional_id};

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Envelope { events: Vec<Value> },
    Bare(Vec<Value>),
}

/// Parse a JSON payload into validated events.
///
/// Only a payload that is neither an envelope nor an array is an error;
/// bad records are rejected one by one and listed in the report.
pub fn parse_events_json(text: &str) -> Result<IngestReport> {
    let payload: Payload = serde_json::from_str(text)
        .context("expected an {\"events\": [...]} object or an array of events")?;
    let records = match payload {
        Payload::Envelope { events } => events,
        Payload::Bare(events) => events,
    };

    let mut report = IngestReport::default();
    for (index, value) in records.into_iter().enumerate() {
        let id = record_id(&value);
        report.push(index, id.clone(), decode_record(index, value, id));
    }
    Ok(report)
}

/// First usable identifier among `id` and `_id`. Empty strings and
/// non-scalar values don't count.
fn record_id(value: &Value) -> Option<String> {
    ["id", "_id"]
        .into_iter()
        .filter_map(|field| value.get(field))
        .find_map(|raw| match raw {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn decode_record(index: usize, mut value: Value, id: Option<String>) -> Result<FinancialEvent, IngestError> {
    let obj = value.as_object_mut().ok_or(IngestError::NotAnObject)?;

    match obj.get("name") {
        Some(Value::String(_)) => {}
        _ => return Err(IngestError::MissingField("name")),
    }

    match obj.get("type") {
        Some(Value::String(s)) if EventKind::parse(s).is_some() => {}
        Some(other) => return Err(IngestError::InvalidKind(other.to_string())),
        None => return Err(IngestError::MissingField("type")),
    }

    match obj.get("amount") {
        Some(Value::Number(_)) => {}
        Some(other) => return Err(IngestError::NonNumericAmount(other.to_string())),
        None => return Err(IngestError::MissingField("amount")),
    }

    // Normalize the identifier so exactly one `id` field remains
    obj.remove("_id");
    obj.insert(
        "id".to_string(),
        Value::String(id.unwrap_or_else(|| positional_id(index))),
    );

    let event: FinancialEvent = serde_json::from_value(value)?;
    event.validate()?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashflow_core::EventError;

    #[test]
    fn test_parse_envelope() {
        let text = r#"{"events": [
            {"_id": "65a1", "name": "Salary", "description": "monthly", "date": 1705312800, "amount": 2500, "type": "income"},
            {"_id": "65a2", "name": "Rent", "date": 1705312900, "amount": 1200.5, "type": "expense", "attachment": "data:image/png;base64,AAAA"}
        ]}"#;

        let report = parse_events_json(text).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.events.len(), 2);
        assert_eq!(report.events[0].id, "65a1");
        assert_eq!(report.events[1].amount, 1200.5);
        assert_eq!(
            report.events[1].attachment.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_parse_bare_array_and_empty() {
        let report = parse_events_json(
            r#"[{"id": "x", "name": "Coffee", "date": 1705312800, "amount": 3, "type": "expense"}]"#,
        )
        .unwrap();
        assert_eq!(report.events.len(), 1);

        let empty = parse_events_json(r#"{"events": []}"#).unwrap();
        assert_eq!(empty.total(), 0);
    }

    #[test]
    fn test_not_a_payload() {
        assert!(parse_events_json(r#"{"data": 1}"#).is_err());
        assert!(parse_events_json("not json").is_err());
    }

    #[test]
    fn test_contract_violations_are_rejected_not_coerced() {
        let text = r#"[
            {"id": "ok", "name": "Fine", "date": 1705312800, "amount": 1, "type": "income"},
            {"id": "str-amount", "name": "Coerce me", "date": 1705312800, "amount": "12", "type": "income"},
            {"id": "kind", "name": "Transfer", "date": 1705312800, "amount": 1, "type": "transfer"},
            {"id": "neg", "name": "Negative", "date": 1705312800, "amount": -4, "type": "expense"},
            {"id": "blank", "name": "  ", "date": 1705312800, "amount": 4, "type": "expense"},
            {"id": "no-amount", "name": "Missing", "date": 1705312800, "type": "expense"},
            42
        ]"#;

        let report = parse_events_json(text).unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.rejected.len(), 6);

        let by_id = |id: &str| {
            report
                .rejected
                .iter()
                .find(|r| r.id.as_deref() == Some(id))
                .unwrap()
        };
        assert!(matches!(by_id("str-amount").error, IngestError::NonNumericAmount(_)));
        assert!(matches!(by_id("kind").error, IngestError::InvalidKind(_)));
        assert!(matches!(
            by_id("neg").error,
            IngestError::Contract(EventError::NegativeAmount { .. })
        ));
        assert!(matches!(
            by_id("blank").error,
            IngestError::Contract(EventError::EmptyName { .. })
        ));
        assert!(matches!(by_id("no-amount").error, IngestError::MissingField("amount")));

        let last = report.rejected.last().unwrap();
        assert_eq!(last.index, 6);
        assert!(matches!(last.error, IngestError::NotAnObject));
    }

    #[test]
    fn test_bad_dates_are_accepted_as_undated() {
        let text = r#"[
            {"id": "null-date", "name": "A", "date": null, "amount": 1, "type": "income"},
            {"id": "text-date", "name": "B", "date": "yesterday", "amount": 1, "type": "income"},
            {"id": "no-date", "name": "C", "amount": 1, "type": "income"}
        ]"#;
        let report = parse_events_json(text).unwrap();
        assert!(report.is_clean());
        assert!(report.events.iter().all(|e| e.date.is_none()));
    }

    #[test]
    fn test_missing_ids_get_positions() {
        let text = r#"[
            {"id": "", "name": "A", "date": 1, "amount": 1, "type": "income"},
            {"_id": 77, "name": "B", "date": 1, "amount": 1, "type": "income"}
        ]"#;
        let report = parse_events_json(text).unwrap();
        assert_eq!(report.events[0].id, "row-0001");
        assert_eq!(report.events[1].id, "77");
    }

    #[test]
    fn test_blank_id_falls_back_to_mongo_id() {
        let text = r#"[
            {"id": "", "_id": "65abc", "name": "A", "date": 1, "amount": 1, "type": "income"},
            {"id": null, "_id": "65abd", "name": "B", "date": 1, "amount": 1, "type": "income"},
            {"id": "own", "_id": "65abe", "name": "C", "date": 1, "amount": 1, "type": "income"}
        ]"#;
        let report = parse_events_json(text).unwrap();
        let ids: Vec<&str> = report.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["65abc", "65abd", "own"]);
    }
}
