//! Event grouper: partitions events into calendar-month buckets.

use std::collections::HashMap;

use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::SkipReason;
use crate::event::FinancialEvent;
use crate::flow::MonthlyFlow;
use crate::month::MonthKey;
use crate::time::month_key_for;

/// An event left out of aggregation, with the reason.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SkippedEvent {
    pub event: FinancialEvent,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: SkipReason,
}

fn serialize_reason<S: serde::Serializer>(reason: &SkipReason, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

/// Output of [`group`]: unordered buckets plus the events that could not be placed.
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    pub buckets: HashMap<MonthKey, MonthlyFlow>,
    pub skipped: Vec<SkippedEvent>,
}

/// Group events by the month of their timestamp as seen in `tz`.
///
/// Events keep their encounter order inside a bucket. Undated or
/// unrepresentable events are collected in `skipped` instead of failing.
pub fn group<I>(events: I, tz: &Tz) -> Grouping
where
    I: IntoIterator<Item = FinancialEvent>,
{
    let mut grouping = Grouping::default();

    for event in events {
        let placed = match event.date {
            Some(secs) => month_key_for(secs, tz),
            None => Err(SkipReason::MissingDate),
        };

        match placed {
            Ok(key) => {
                grouping
                    .buckets
                    .entry(key)
                    .or_insert_with(|| {
                        debug!(month = %key, "new monthly bucket");
                        MonthlyFlow::new(key)
                    })
                    .events
                    .push(event);
            }
            Err(reason) => {
                warn!(id = %event.id, name = %event.name, %reason, "skipping event");
                grouping.skipped.push(SkippedEvent { event, reason });
            }
        }
    }

    grouping
}
