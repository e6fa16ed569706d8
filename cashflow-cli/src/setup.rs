use anyhow::{Context, Result};
use cashflow_core::parse_timezone;
use std::io::{self, Write};

use crate::config::{Config, config_path, load_config, save_config};

fn prompt(label: &str, current: &str) -> Result<String> {
    print!("{} [{}]: ", label, current);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    let s = s.trim();
    Ok(if s.is_empty() { current.to_string() } else { s.to_string() })
}

pub fn run_setup() -> Result<()> {
    println!("Cashflow setup (press enter to keep the value in brackets)\n");
    let mut cfg: Config = load_config()?;

    let money = prompt("Starting balance", &cfg.profile.initial_money.to_string())?;
    cfg.profile.initial_money = money
        .parse()
        .with_context(|| format!("starting balance must be a number, got '{money}'"))?;

    let tz = prompt("Timezone (IANA name)", &cfg.profile.timezone)?;
    parse_timezone(&tz)?;
    cfg.profile.timezone = tz;

    cfg.api.base_url = prompt("Events API base URL", &cfg.api.base_url)?;

    let token = prompt("API token (optional)", cfg.api.token.as_deref().unwrap_or(""))?;
    cfg.api.token = if token.is_empty() { None } else { Some(token) };

    save_config(&cfg)?;
    println!("\nWrote {}", config_path()?.display());

    println!("\nNext recommended steps:");
    println!("- cashflow fetch                 (download events from the API)");
    println!("- cashflow report --events <file>");

    Ok(())
}
