use anyhow::{Context, Result, bail};
use cashflow_core::{
    EventKind, FinancialEvent, MonthKey, Tz, month_key_for, parse_timezone, process_events,
};
use cashflow_ingest::{IngestReport, load_events_file, parse_events_json};
use cashflow_stats::{daily_stats, transaction_periods, weekly_stats};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

mod api;
mod config;
mod logging;
mod render;
mod setup;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "cashflow",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CASHFLOW_BUILD_SHA"), ")"),
    about = "Monthly cash-flow reports from income and expense events"
)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Month-by-month income, expense and running balance, newest first
    Report {
        #[command(flatten)]
        source: SourceArgs,

        /// Starting balance (default: API profile, then [profile].initial_money)
        #[arg(long, allow_hyphen_values = true)]
        initial_money: Option<f64>,

        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,

        /// List each month's events
        #[arg(long)]
        details: bool,
    },

    /// Activity periods and per-month breakdowns
    Stats {
        #[command(subcommand)]
        command: StatsCommand,
    },

    /// Download events from the configured API into a local file
    Fetch {
        /// Output file (default: ~/.cashflow/events.json)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Only fetch one kind of event
        #[arg(long = "type", value_enum)]
        kind: Option<KindArg>,
    },

    /// Interactive setup: starting balance, timezone, API access
    Setup,

    /// Manage ~/.cashflow/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StatsCommand {
    /// Years and months that have events, most recent first
    Periods {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long)]
        json: bool,
    },
    /// Per-day totals for one month
    Daily {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        month: MonthArgs,
        #[arg(long)]
        json: bool,
    },
    /// Per-week totals for one month
    Weekly {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        month: MonthArgs,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Events file (.json payload or .csv export); fetched from the API when omitted
    #[arg(long)]
    events: Option<PathBuf>,

    /// IANA timezone used to assign events to months (default: [profile].timezone)
    #[arg(long)]
    timezone: Option<String>,
}

#[derive(Args, Debug)]
struct MonthArgs {
    /// Year (default: most recent year with events)
    #[arg(long)]
    year: Option<i32>,

    /// Month 1-12 (default: most recent month with events)
    #[arg(long)]
    month: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for EventKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Income => EventKind::Income,
            KindArg::Expense => EventKind::Expense,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Report {
            source,
            initial_money,
            json,
            details,
        } => {
            let cfg = config::load_config()?;
            let tz = resolve_timezone(&cfg, source.timezone.as_deref())?;
            let loaded = load_events(&cfg, source.events, &tz).await?;

            // The server profile is only consulted when the events came from it too
            let profile_money = match (initial_money, loaded.from_api) {
                (None, true) => api::fetch_profile_initial_money(&cfg.api).await?,
                _ => None,
            };
            let initial_money = starting_balance(initial_money, profile_money, cfg.profile.initial_money);

            let rejected = loaded.ingest.rejected.len();
            let report = process_events(loaded.ingest.events, initial_money, &tz);

            if json {
                print_json(&report)?;
            } else {
                print!("{}", render::render_report(&report, details, &tz));
            }
            print_diagnostics(rejected, report.skipped_count());
        }

        Command::Stats { command } => {
            let cfg = config::load_config()?;
            match command {
                StatsCommand::Periods { source, json } => {
                    let input = StatsInput::load(&cfg, source).await?;
                    let periods = transaction_periods(&input.events, &input.tz);
                    if json {
                        print_json(&periods)?;
                    } else {
                        print!("{}", render::render_periods(&periods));
                    }
                    input.print_diagnostics();
                }
                StatsCommand::Daily { source, month, json } => {
                    let input = StatsInput::load(&cfg, source).await?;
                    let key = resolve_month(&input.events, &month, &input.tz)?;
                    let stats = daily_stats(&input.events, key, &input.tz);
                    if json {
                        print_json(&stats)?;
                    } else {
                        print!("{}", render::render_stats(&format!("Daily - {}", key.label()), &stats));
                    }
                    input.print_diagnostics();
                }
                StatsCommand::Weekly { source, month, json } => {
                    let input = StatsInput::load(&cfg, source).await?;
                    let key = resolve_month(&input.events, &month, &input.tz)?;
                    let stats = weekly_stats(&input.events, key, &input.tz);
                    if json {
                        print_json(&stats)?;
                    } else {
                        print!("{}", render::render_stats(&format!("Weekly - {}", key.label()), &stats));
                    }
                    input.print_diagnostics();
                }
            }
        }

        Command::Fetch { out, kind } => {
            let cfg = config::load_config()?;
            let body = api::fetch_events_payload(&cfg.api, kind.map(EventKind::from)).await?;

            // Validate before writing so a broken payload never lands on disk
            let parsed = parse_events_json(&body).context("API returned an unexpected payload")?;

            let out = match out {
                Some(p) => p,
                None => state::events_cache_path()?,
            };
            fs::write(&out, &body).with_context(|| format!("write {}", out.display()))?;
            println!(
                "Fetched {} events ({} rejected) into {}",
                parsed.total(),
                parsed.rejected.len(),
                out.display()
            );
        }

        Command::Setup => {
            setup::run_setup()?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&redacted(cfg)).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn resolve_timezone(cfg: &Config, flag: Option<&str>) -> Result<Tz> {
    match flag {
        Some(tz) => parse_timezone(tz),
        None => cfg.timezone(),
    }
}

/// `--initial-money`, then the API profile, then `[profile].initial_money`.
fn starting_balance(flag: Option<f64>, profile: Option<f64>, configured: f64) -> f64 {
    flag.or(profile).unwrap_or(configured)
}

struct Loaded {
    ingest: IngestReport,
    from_api: bool,
}

async fn load_events(cfg: &Config, path: Option<PathBuf>, tz: &Tz) -> Result<Loaded> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("events file not found: {} (pass --events <path>)", path.display());
            }
            Ok(Loaded {
                ingest: load_events_file(&path, tz)?,
                from_api: false,
            })
        }
        None => {
            let body = api::fetch_events_payload(&cfg.api, None).await?;
            Ok(Loaded {
                ingest: parse_events_json(&body).context("parsing API response")?,
                from_api: true,
            })
        }
    }
}

/// Accepted events for the `stats` commands, with what was dropped on the way.
struct StatsInput {
    events: Vec<FinancialEvent>,
    tz: Tz,
    rejected: usize,
}

impl StatsInput {
    async fn load(cfg: &Config, source: SourceArgs) -> Result<Self> {
        let tz = resolve_timezone(cfg, source.timezone.as_deref())?;
        let ingest = load_events(cfg, source.events, &tz).await?.ingest;
        Ok(Self {
            rejected: ingest.rejected.len(),
            events: ingest.events,
            tz,
        })
    }

    fn print_diagnostics(&self) {
        print_diagnostics(self.rejected, unplaced_count(&self.events, &self.tz));
    }
}

/// Events that no month can hold: undated or out of calendar range.
fn unplaced_count(events: &[FinancialEvent], tz: &Tz) -> usize {
    events
        .iter()
        .filter(|e| e.date.is_none_or(|secs| month_key_for(secs, tz).is_err()))
        .count()
}

fn print_diagnostics(rejected: usize, skipped: usize) {
    if let Some(diag) = render::render_diagnostics(rejected, skipped) {
        eprintln!("\n{diag} (run with -v for details)");
    }
}

/// Explicit `--year/--month`, or the most recent month with activity.
fn resolve_month(events: &[FinancialEvent], args: &MonthArgs, tz: &Tz) -> Result<MonthKey> {
    let periods = transaction_periods(events, tz);
    let latest = periods.first();

    let year = match (args.year, latest) {
        (Some(y), _) => y,
        (None, Some(p)) => p.year,
        (None, None) => bail!("no dated events; pass --year and --month"),
    };
    let month = match args.month {
        Some(m) => m,
        None => periods
            .iter()
            .find(|p| p.year == year)
            .and_then(|p| p.months.first().copied())
            .with_context(|| format!("no events in {year}; pass --month"))?,
    };

    MonthKey::new(year, month).with_context(|| format!("invalid month {year}-{month}"))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn redacted(mut cfg: Config) -> Config {
    if cfg.api.token.is_some() {
        cfg.api.token = Some("********".to_string());
    }
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ev(id: &str, y: i32, m: u32, d: u32) -> FinancialEvent {
        let secs = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp();
        FinancialEvent::new(id, id, secs, 10.0, EventKind::Expense)
    }

    fn events() -> Vec<FinancialEvent> {
        vec![
            ev("nov", 2023, 11, 15),
            ev("mar", 2024, 3, 2),
            ev("jan", 2024, 1, 20),
            ev("undated", 2024, 5, 1).undated(),
        ]
    }

    fn month(year: Option<i32>, month: Option<u32>) -> MonthArgs {
        MonthArgs { year, month }
    }

    #[test]
    fn test_resolve_month_defaults_to_latest() {
        let key = resolve_month(&events(), &month(None, None), &Tz::UTC).unwrap();
        assert_eq!(key.to_string(), "2024-03");
    }

    #[test]
    fn test_resolve_month_year_only_picks_latest_month_of_year() {
        let key = resolve_month(&events(), &month(Some(2023), None), &Tz::UTC).unwrap();
        assert_eq!(key.to_string(), "2023-11");
    }

    #[test]
    fn test_resolve_month_explicit_wins() {
        let key = resolve_month(&events(), &month(Some(2022), Some(5)), &Tz::UTC).unwrap();
        assert_eq!(key.to_string(), "2022-05");
    }

    #[test]
    fn test_resolve_month_errors() {
        let err = resolve_month(&events(), &month(Some(2022), None), &Tz::UTC).unwrap_err();
        assert!(err.to_string().contains("no events in 2022"));

        let err = resolve_month(&events(), &month(Some(2024), Some(13)), &Tz::UTC).unwrap_err();
        assert!(err.to_string().contains("invalid month 2024-13"));

        let err = resolve_month(&[], &month(None, None), &Tz::UTC).unwrap_err();
        assert!(err.to_string().contains("no dated events"));
    }

    #[test]
    fn test_starting_balance_precedence() {
        assert_eq!(starting_balance(Some(5.0), Some(100.0), 7.0), 5.0);
        assert_eq!(starting_balance(None, Some(100.0), 7.0), 100.0);
        assert_eq!(starting_balance(None, None, 7.0), 7.0);
        assert_eq!(starting_balance(Some(0.0), Some(100.0), 7.0), 0.0);
    }

    #[test]
    fn test_unplaced_count() {
        let mut events = events();
        events.push(FinancialEvent::new("far", "far", i64::MAX, 1.0, EventKind::Income));
        assert_eq!(unplaced_count(&events, &Tz::UTC), 2);
    }
}
