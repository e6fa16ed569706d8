//! cashflow-core: month-bucketed cash-flow aggregation for personal finance events

pub mod error;
pub mod event;
pub mod flow;
pub mod grouper;
pub mod month;
pub mod report;
pub mod time;

pub use error::{EventError, LocalDateError, MonthKeyError, SkipReason};
pub use event::{EventKind, FinancialEvent};
pub use flow::{MonthlyFlow, compute_totals, total_expense, total_income};
pub use grouper::{Grouping, SkippedEvent, group};
pub use month::MonthKey;
pub use report::{EventFlow, process_events};
pub use time::{DEFAULT_TIMEZONE, month_key_for, parse_local_date, parse_timezone};

pub use chrono_tz::Tz;
