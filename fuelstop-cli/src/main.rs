//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    init_logging();
    if let Err(err) = fuelstop_cli::run() {
        eprintln!("fuelstop: {err}");
        std::process::exit(1);
    }
}

/// Log to stderr so stdout stays machine-readable. `log` records from the
/// library crates are bridged into the same subscriber.
fn init_logging() {
    let filter = EnvFilter::try_from_env(fuelstop_cli::LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
