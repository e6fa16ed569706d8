use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. Logs go to stderr so stdout stays
/// parseable for `--json`. `RUST_LOG` wins over `verbosity`.
pub fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "cashflow=warn",
        1 => "cashflow=info",
        _ => "cashflow=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
