//! Command-line interface for the fuel stop engine.
//!
//! Three subcommands share one configuration story: values come from CLI
//! flags, `FUELSTOP_*` environment variables or configuration files, merged
//! by `ortho_config` with the CLI taking precedence.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod ingest;
mod plan;
mod stations;

pub use error::CliError;

use ingest::{IngestArgs, run_ingest};
use plan::{PlanArgs, run_plan};
use stations::{StationsArgs, run_stations};

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_ENV: &str = "FUELSTOP_LOG";

/// Station database used when no path is configured.
pub(crate) const DEFAULT_DATABASE: &str = "stations.db";

pub(crate) const ARG_PRICE_SHEET: &str = "price-sheet";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ARG_START: &str = "start";
pub(crate) const ARG_FINISH: &str = "finish";
pub(crate) const ARG_ORS_BASE_URL: &str = "ors-base-url";
pub(crate) const ARG_ORS_API_KEY: &str = "ors-api-key";
pub(crate) const ARG_NOMINATIM_BASE_URL: &str = "nominatim-base-url";
pub(crate) const ARG_MPG: &str = "mpg";
pub(crate) const ARG_TANK_GALLONS: &str = "tank-gallons";
pub(crate) const ARG_CORRIDOR_MILES: &str = "corridor-miles";
pub(crate) const ENV_PRICE_SHEET: &str = "FUELSTOP_CMDS_INGEST_PRICE_SHEET";
pub(crate) const ENV_START: &str = "FUELSTOP_CMDS_PLAN_START";
pub(crate) const ENV_FINISH: &str = "FUELSTOP_CMDS_PLAN_FINISH";

/// Run the CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration merging or the
/// selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Ingest(args) => run_ingest(args),
        Command::Stations(args) => run_stations(args),
        Command::Plan(args) => run_plan(args),
    }
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match fuelstop_fs::is_regular_file(path) {
        Ok(true) => Ok(()),
        Ok(false) if path.exists() => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "fuelstop",
    about = "Plan the cheapest fuel stops along a driving route",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build a station database from a retail price sheet.
    Ingest(IngestArgs),
    /// List the cheapest stations in a station database.
    Stations(StationsArgs),
    /// Plan fuel stops between two places.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;
