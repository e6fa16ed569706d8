//! Plain-text rendering of reports and statistics.
//!
//! Values are rounded to cents here and only here.

use cashflow_core::{EventFlow, EventKind, Tz};
use cashflow_stats::{PeriodStats, TransactionPeriod};
use chrono::DateTime;
use std::fmt::Write;

/// Two-decimal money string; never prints `-0.00`.
pub fn money(v: f64) -> String {
    let cents = (v * 100.0).round() / 100.0;
    let cents = if cents == 0.0 { 0.0 } else { cents };
    format!("{cents:.2}")
}

pub fn render_report(report: &EventFlow, details: bool, tz: &Tz) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Starting balance: {}", money(report.initial_money));
    let _ = writeln!(out, "Current balance:  {}\n", money(report.current_balance()));

    if report.is_empty() {
        let _ = writeln!(out, "(no dated events)");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<16} {:>12} {:>12} {:>12} {:>14}",
        "Month", "Income", "Expense", "Monthly", "Balance"
    );
    for flow in report.most_recent_first() {
        let _ = writeln!(
            out,
            "{:<16} {:>12} {:>12} {:>12} {:>14}",
            flow.key.label(),
            money(flow.income),
            money(flow.expense),
            money(flow.monthly),
            money(flow.global)
        );

        if details {
            for event in flow.events_by_date() {
                let day = event
                    .date
                    .and_then(|secs| local_day(secs, tz))
                    .unwrap_or_default();
                let sign = match event.kind {
                    EventKind::Income => "+",
                    EventKind::Expense => "-",
                };
                let _ = writeln!(
                    out,
                    "    {day}  {sign}{:>11}  {}",
                    money(event.amount),
                    event.name
                );
            }
        }
    }
    out
}

/// One-line diagnostic about records that did not reach the totals.
pub fn render_diagnostics(rejected: usize, skipped: usize) -> Option<String> {
    if rejected == 0 && skipped == 0 {
        return None;
    }
    Some(format!(
        "{rejected} record(s) rejected, {skipped} event(s) skipped without a usable date"
    ))
}

pub fn render_periods(periods: &[TransactionPeriod]) -> String {
    if periods.is_empty() {
        return "(no dated events)\n".to_string();
    }
    let mut out = String::new();
    for p in periods {
        let months: Vec<String> = p.months.iter().map(|m| format!("{m:02}")).collect();
        let _ = writeln!(out, "{}: {}", p.year, months.join(", "));
    }
    out
}

pub fn render_stats(title: &str, stats: &PeriodStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}\n");
    if stats.rows.is_empty() {
        let _ = writeln!(out, "(no events this month)");
        return out;
    }

    let _ = writeln!(out, "{:<10} {:>12} {:>12} {:>12}", "", "Income", "Expense", "Total");
    for row in &stats.rows {
        let _ = writeln!(
            out,
            "{:<10} {:>12} {:>12} {:>12}",
            row.label,
            money(row.income),
            money(row.expense),
            money(row.total)
        );
    }
    let _ = writeln!(
        out,
        "\nIncome {} | Expense {} | Balance {}",
        money(stats.total_income),
        money(stats.total_expense),
        money(stats.total_balance)
    );
    out
}

/// Calendar day of a timestamp as seen in `tz`
pub fn local_day(secs: i64, tz: &Tz) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|utc| utc.with_timezone(tz).format("%Y-%m-%d").to_string())
}
