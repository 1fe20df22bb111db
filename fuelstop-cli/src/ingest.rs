//! Ingest command: condense a price sheet into a station database.

use std::collections::BTreeMap;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fuelstop_core::Geocoder;
use fuelstop_data::catalog::{
    IngestSummary, load_station_locations, locate_stations, read_price_sheet_file,
    write_station_database,
};
use fuelstop_data::geocoding::{
    DEFAULT_NOMINATIM_BASE_URL, NominatimGeocoder, NominatimGeocoderConfig,
};
use geo::Coord;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_NOMINATIM_BASE_URL, ARG_OUTPUT, ARG_PRICE_SHEET, CliError, DEFAULT_DATABASE,
    ENV_PRICE_SHEET, require_existing, write_json,
};

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read an OPIS retail price sheet (CSV), average prices \
                 per truckstop and write the result to a SQLite station \
                 database. Truckstops without latitude and longitude \
                 columns reuse the coordinates already stored in the \
                 output database or are geocoded through Nominatim. The \
                 database is replaced atomically.",
    about = "Build a station database from a price sheet"
)]
#[ortho_config(prefix = "FUELSTOP")]
pub(crate) struct IngestArgs {
    /// Path to the price sheet CSV.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) price_sheet: Option<Utf8PathBuf>,
    /// Where to write the station database.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Base URL of the Nominatim geocoder.
    #[arg(long = ARG_NOMINATIM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_base_url: Option<String>,
}

impl IngestArgs {
    pub(crate) fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Resolved `ingest` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestConfig {
    pub(crate) price_sheet: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
    pub(crate) nominatim_base_url: String,
}

impl IngestConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.price_sheet, ARG_PRICE_SHEET)
    }
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let price_sheet = args.price_sheet.ok_or(CliError::MissingArgument {
            field: ARG_PRICE_SHEET,
            env: ENV_PRICE_SHEET,
        })?;
        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE));
        Ok(Self {
            price_sheet,
            output,
            nominatim_base_url: args
                .nominatim_base_url
                .unwrap_or_else(|| DEFAULT_NOMINATIM_BASE_URL.to_owned()),
        })
    }
}

/// Printed once the database has been written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct IngestReport {
    pub(crate) database: Utf8PathBuf,
    pub(crate) stations: usize,
    pub(crate) rows: usize,
    pub(crate) merged_rows: usize,
    pub(crate) rejected_rows: usize,
    pub(crate) missing_coordinates: usize,
    pub(crate) rejected_stations: usize,
    pub(crate) reused_coordinates: usize,
    pub(crate) geocoded: usize,
    pub(crate) geocode_failures: usize,
}

impl IngestReport {
    fn new(database: Utf8PathBuf, summary: IngestSummary) -> Self {
        Self {
            database,
            stations: summary.stations,
            rows: summary.rows,
            merged_rows: summary.merged_rows,
            rejected_rows: summary.rejected_rows,
            missing_coordinates: summary.missing_coordinates,
            rejected_stations: summary.rejected_stations,
            reused_coordinates: summary.reused_coordinates,
            geocoded: summary.geocoded,
            geocode_failures: summary.geocode_failures,
        }
    }
}

/// Builds the geocoder that locates truckstops lacking coordinates.
///
/// Only invoked when the price sheet leaves some truckstop unlocated.
pub(crate) trait GeocoderBuilder {
    fn build(&self, config: &IngestConfig) -> Result<Box<dyn Geocoder>, CliError>;
}

pub(crate) struct DefaultGeocoderBuilder;

impl GeocoderBuilder for DefaultGeocoderBuilder {
    fn build(&self, config: &IngestConfig) -> Result<Box<dyn Geocoder>, CliError> {
        let geocoder = NominatimGeocoder::with_config(NominatimGeocoderConfig::new(
            config.nominatim_base_url.clone(),
        ))
        .map_err(|source| CliError::BuildProvider {
            service: "geocoding",
            base_url: config.nominatim_base_url.clone(),
            source,
        })?;
        Ok(Box::new(geocoder))
    }
}

pub(crate) fn run_ingest(args: IngestArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_ingest_with(args, &DefaultGeocoderBuilder, &mut stdout)
}

pub(crate) fn run_ingest_with(
    args: IngestArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let report = execute_ingest(args, builder)?;
    write_json(writer, &report)
}

/// Coordinates stored by an earlier ingest into `output`. A database that
/// cannot be read only costs the reuse, so the failure is logged.
fn known_locations(output: &Utf8Path) -> BTreeMap<u64, Coord<f64>> {
    if !matches!(fuelstop_fs::is_regular_file(output), Ok(true)) {
        return BTreeMap::new();
    }
    match load_station_locations(output) {
        Ok(known) => known,
        Err(err) => {
            tracing::warn!(database = %output, error = %err, "ignoring stored coordinates");
            BTreeMap::new()
        }
    }
}

fn execute_ingest(
    args: IngestArgs,
    builder: &dyn GeocoderBuilder,
) -> Result<IngestReport, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;

    let mut sheet = read_price_sheet_file(&config.price_sheet)?;
    if !sheet.unlocated.is_empty() {
        tracing::info!(
            unlocated = sheet.unlocated.len(),
            "locating truckstops without coordinates"
        );
        let known = known_locations(&config.output);
        let geocoder = builder.build(&config)?;
        sheet = locate_stations(sheet, &geocoder, &known);
    }
    write_station_database(&config.output, &sheet.records)?;
    tracing::info!(
        database = %config.output,
        stations = sheet.summary.stations,
        "station database written"
    );
    Ok(IngestReport::new(config.output, sheet.summary))
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<IngestConfig, CliError> {
    let merged = IngestArgs::merge_from_layers(layers).map_err(CliError::from)?;
    IngestConfig::try_from(merged)
}
