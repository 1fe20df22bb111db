//! Stations command: list the cheapest stations in a database.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use fuelstop_core::{FuelStation, StationCatalog};
use fuelstop_data::catalog::SqliteStationCatalog;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DATABASE, ARG_LIMIT, CliError, DEFAULT_DATABASE, require_existing, write_json};

/// Stations listed when no limit is configured.
pub(crate) const DEFAULT_LIMIT: usize = 10;

/// CLI arguments for the `stations` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List the cheapest stations in a station database")]
#[ortho_config(prefix = "FUELSTOP")]
pub(crate) struct StationsArgs {
    /// Path to the station database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// How many stations to list.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

impl StationsArgs {
    pub(crate) fn into_config(self) -> Result<StationsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(StationsConfig::from(merged))
    }
}

/// Resolved `stations` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StationsConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) limit: usize,
}

impl From<StationsArgs> for StationsConfig {
    fn from(args: StationsArgs) -> Self {
        Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            limit: args.limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}

/// Printed listing: the cheapest stations and the catalog size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct StationListing {
    pub(crate) database: Utf8PathBuf,
    pub(crate) total: usize,
    pub(crate) stations: Vec<FuelStation>,
}

pub(crate) fn run_stations(args: StationsArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_stations_with(args, &mut stdout)
}

pub(crate) fn run_stations_with(
    args: StationsArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.database, ARG_DATABASE)?;

    let snapshot = SqliteStationCatalog::open(config.database.clone())?.snapshot();
    let stations = snapshot.cheapest(config.limit);
    tracing::debug!(
        listed = stations.len(),
        total = snapshot.len(),
        "listing cheapest stations"
    );
    write_json(
        writer,
        &StationListing {
            database: config.database,
            total: snapshot.len(),
            stations,
        },
    )
}
