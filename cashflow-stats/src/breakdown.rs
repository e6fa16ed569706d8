//! Daily and weekly breakdowns of a single month.

use std::collections::BTreeMap;

use cashflow_core::{EventKind, FinancialEvent, MonthKey, Tz};
use chrono::{DateTime, Datelike};
use serde::Serialize;
use tracing::debug;

/// One day or week of a month.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatRow {
    pub label: String,
    pub income: f64,
    pub expense: f64,
    /// `income - expense`
    pub total: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PeriodStats {
    /// Ascending; only periods with at least one event
    pub rows: Vec<StatRow>,
    pub total_income: f64,
    pub total_expense: f64,
    pub total_balance: f64,
}

/// Per-day income and expense for `month`, labeled by day of month.
pub fn daily_stats(events: &[FinancialEvent], month: MonthKey, tz: &Tz) -> PeriodStats {
    breakdown(events, month, tz, |day| day, |day| day.to_string())
}

/// Per-week income and expense for `month`. Week 1 is days 1-7, week 5 is 29-31.
pub fn weekly_stats(events: &[FinancialEvent], month: MonthKey, tz: &Tz) -> PeriodStats {
    breakdown(events, month, tz, week_of_month, |week| format!("Week {week}"))
}

pub fn week_of_month(day: u32) -> u32 {
    (day.max(1) - 1) / 7 + 1
}

fn breakdown(
    events: &[FinancialEvent],
    month: MonthKey,
    tz: &Tz,
    slot: impl Fn(u32) -> u32,
    label: impl Fn(u32) -> String,
) -> PeriodStats {
    let mut slots: BTreeMap<u32, (f64, f64)> = BTreeMap::new();

    for event in events {
        let Some(local) = event
            .date
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|utc| utc.with_timezone(tz))
        else {
            continue;
        };
        if MonthKey::from_datetime(&local) != Some(month) {
            continue;
        }

        let entry = slots.entry(slot(local.day())).or_default();
        match event.kind {
            EventKind::Income => entry.0 += event.amount,
            EventKind::Expense => entry.1 += event.amount,
        }
    }

    let rows: Vec<StatRow> = slots
        .into_iter()
        .map(|(n, (income, expense))| StatRow {
            label: label(n),
            income,
            expense,
            total: income - expense,
        })
        .collect();

    let total_income: f64 = rows.iter().map(|r| r.income).sum();
    let total_expense: f64 = rows.iter().map(|r| r.expense).sum();
    debug!(month = %month, rows = rows.len(), total_income, total_expense, "computed breakdown");

    PeriodStats {
        rows,
        total_income,
        total_expense,
        total_balance: total_income - total_expense,
    }
}
