//! Which years and months have any recorded activity.

use std::collections::{BTreeMap, BTreeSet};

use cashflow_core::{FinancialEvent, Tz, month_key_for};
use serde::Serialize;

/// A year with the months that contain at least one event.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TransactionPeriod {
    pub year: i32,
    /// Most recent first
    pub months: Vec<u32>,
}

/// Years with activity, most recent first. Undated events are ignored.
pub fn transaction_periods(events: &[FinancialEvent], tz: &Tz) -> Vec<TransactionPeriod> {
    let mut years: BTreeMap<i32, BTreeSet<u32>> = BTreeMap::new();

    for key in events
        .iter()
        .filter_map(|e| e.date)
        .filter_map(|secs| month_key_for(secs, tz).ok())
    {
        years.entry(key.year()).or_default().insert(key.month());
    }

    years
        .into_iter()
        .rev()
        .map(|(year, months)| TransactionPeriod {
            year,
            months: months.into_iter().rev().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashflow_core::EventKind;

    fn ev(date: i64) -> FinancialEvent {
        FinancialEvent::new("e", "e", date, 1.0, EventKind::Expense)
    }

    #[test]
    fn test_periods_most_recent_first() {
        let events = vec![
            // 2023-11-30, 2024-01-05, 2024-03-05, 2024-01-20
            ev(1_701_302_400),
            ev(1_704_412_800),
            ev(1_709_596_800),
            ev(1_705_708_800),
            ev(0).undated(),
        ];
        let periods = transaction_periods(&events, &Tz::UTC);
        assert_eq!(
            periods,
            vec![
                TransactionPeriod { year: 2024, months: vec![3, 1] },
                TransactionPeriod { year: 2023, months: vec![11] },
            ]
        );
    }

    #[test]
    fn test_periods_empty() {
        assert!(transaction_periods(&[], &Tz::UTC).is_empty());
    }
}
