//! cashflow-stats: activity periods plus daily and weekly breakdowns of a month

pub mod breakdown;
pub mod periods;

pub use breakdown::{PeriodStats, StatRow, daily_stats, week_of_month, weekly_stats};
pub use periods::{TransactionPeriod, transaction_periods};
