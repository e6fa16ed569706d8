//! The aggregation pipeline: events in, month-ordered cash-flow report out.

use chrono_tz::Tz;
use serde::Serialize;
use tracing::info;

use crate::event::FinancialEvent;
use crate::flow::{MonthlyFlow, compute_totals};
use crate::grouper::{SkippedEvent, group};
use crate::month::MonthKey;

/// Report-ready result of one aggregation call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventFlow {
    pub initial_money: f64,
    /// Ascending by month
    pub flows: Vec<MonthlyFlow>,
    pub skipped: Vec<SkippedEvent>,
}

impl EventFlow {
    /// Buckets newest first, the order the report is usually read in.
    pub fn most_recent_first(&self) -> impl Iterator<Item = &MonthlyFlow> {
        self.flows.iter().rev()
    }

    /// Look up a month. `flows` is sorted, so this is a binary search.
    pub fn get(&self, key: &MonthKey) -> Option<&MonthlyFlow> {
        self.flows
            .binary_search_by_key(key, |f| f.key)
            .ok()
            .map(|i| &self.flows[i])
    }

    /// Balance after the last month, or the starting balance when there is none.
    pub fn current_balance(&self) -> f64 {
        self.flows
            .last()
            .map(|f| f.global)
            .unwrap_or(self.initial_money)
    }

    pub fn total_income(&self) -> f64 {
        self.flows.iter().map(|f| f.income).sum()
    }

    pub fn total_expense(&self) -> f64 {
        self.flows.iter().map(|f| f.expense).sum()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

/// Group `events` by month in `tz` and compute running balances from
/// `initial_money`. Pure: no caching, every call recomputes from its inputs.
pub fn process_events<I>(events: I, initial_money: f64, tz: &Tz) -> EventFlow
where
    I: IntoIterator<Item = FinancialEvent>,
{
    let grouping = group(events, tz);
    let flows = compute_totals(grouping.buckets, initial_money);

    let report = EventFlow {
        initial_money,
        flows,
        skipped: grouping.skipped,
    };

    info!(
        months = report.flows.len(),
        skipped = report.skipped_count(),
        initial_money,
        balance = report.current_balance(),
        "processed events"
    );

    report
}
