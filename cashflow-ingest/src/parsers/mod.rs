pub mod csv_export;
pub mod rest_payload;

pub use csv_export::{parse_events_csv, parse_events_csv_path};
pub use rest_payload::parse_events_json;
