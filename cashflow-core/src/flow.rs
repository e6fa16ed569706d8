//! Monthly flow buckets and the running-balance calculator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::{EventKind, FinancialEvent};
use crate::month::MonthKey;

/// All events of one calendar month plus their aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyFlow {
    pub key: MonthKey,
    /// Insertion order as produced by the grouper
    pub events: Vec<FinancialEvent>,
    pub income: f64,
    pub expense: f64,
    /// `income - expense`
    pub monthly: f64,
    /// Running balance through the end of this month
    pub global: f64,
}

impl MonthlyFlow {
    /// Empty bucket with zeroed aggregates
    pub fn new(key: MonthKey) -> Self {
        Self {
            key,
            events: Vec::new(),
            income: 0.0,
            expense: 0.0,
            monthly: 0.0,
            global: 0.0,
        }
    }

    /// Events ordered by timestamp, ties kept in insertion order.
    pub fn events_by_date(&self) -> Vec<&FinancialEvent> {
        let mut events: Vec<&FinancialEvent> = self.events.iter().collect();
        events.sort_by_key(|e| e.date);
        events
    }
}

/// Sum of `amount` over events of the given kind.
pub fn total_of(events: &[FinancialEvent], kind: EventKind) -> f64 {
    events
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.amount)
        .sum()
}

pub fn total_income(events: &[FinancialEvent]) -> f64 {
    total_of(events, EventKind::Income)
}

pub fn total_expense(events: &[FinancialEvent]) -> f64 {
    total_of(events, EventKind::Expense)
}

/// Fill in a bucket's order-independent sums.
fn with_sums(mut flow: MonthlyFlow) -> MonthlyFlow {
    flow.income = total_income(&flow.events);
    flow.expense = total_expense(&flow.events);
    flow.monthly = flow.income - flow.expense;
    flow
}

/// Compute income, expense, monthly net and the running global balance.
///
/// Buckets come in any order and leave sorted ascending by month. The global
/// balance is a strict left-to-right scan seeded with `initial_money`.
pub fn compute_totals(
    buckets: HashMap<MonthKey, MonthlyFlow>,
    initial_money: f64,
) -> Vec<MonthlyFlow> {
    let mut flows: Vec<MonthlyFlow> = buckets.into_values().map(with_sums).collect();
    flows.sort_by_key(|f| f.key);

    flows
        .into_iter()
        .scan(initial_money, |running, mut flow| {
            *running += flow.monthly;
            flow.global = *running;
            debug!(
                month = %flow.key,
                income = flow.income,
                expense = flow.expense,
                monthly = flow.monthly,
                global = flow.global,
                "computed monthly flow"
            );
            Some(flow)
        })
        .collect()
}
