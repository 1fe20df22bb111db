//! Focused unit tests covering ingest configuration and execution.

use super::helpers::{
    FixedGeocoderBuilder, TOMAH, TUCSON, utf8_tempdir, write_price_sheet, write_raw_price_sheet,
    write_utf8,
};
use super::*;
use crate::ingest::{
    IngestArgs, IngestConfig, IngestReport, config_from_layers_for_test, run_ingest_with,
};
use camino::{Utf8Path, Utf8PathBuf};
use fuelstop_core::StationCatalog;
use fuelstop_data::catalog::{SqliteStationCatalog, load_station_locations};
use fuelstop_data::geocoding::DEFAULT_NOMINATIM_BASE_URL;
use rstest::rstest;

fn ingest(sheet: &Utf8Path, database: &Utf8Path, builder: &FixedGeocoderBuilder) -> IngestReport {
    let mut stdout = Vec::new();
    run_ingest_with(
        IngestArgs {
            price_sheet: Some(sheet.to_path_buf()),
            output: Some(database.to_path_buf()),
            ..IngestArgs::default()
        },
        builder,
        &mut stdout,
    )
    .expect("ingest should succeed");
    serde_json::from_slice(&stdout).expect("report is JSON")
}

#[rstest]
fn converting_ingest_without_price_sheet_errors() {
    let err = IngestConfig::try_from(IngestArgs::default()).expect_err("price sheet required");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PRICE_SHEET);
            assert_eq!(env, ENV_PRICE_SHEET);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn ingest_output_defaults_to_working_directory_database() {
    let args = IngestArgs {
        price_sheet: Some(Utf8PathBuf::from("prices.csv")),
        ..IngestArgs::default()
    };

    let config = IngestConfig::try_from(args).expect("config should build");
    assert_eq!(config.output, Utf8PathBuf::from(DEFAULT_DATABASE));
    assert_eq!(config.nominatim_base_url, DEFAULT_NOMINATIM_BASE_URL);
}

#[rstest]
fn validate_sources_reports_missing_sheet() {
    let (_tmp, root) = utf8_tempdir();
    let config = IngestConfig {
        price_sheet: root.join("absent.csv"),
        output: root.join("stations.db"),
        nominatim_base_url: DEFAULT_NOMINATIM_BASE_URL.to_owned(),
    };

    match config.validate_sources() {
        Err(CliError::MissingSourceFile { field, .. }) => assert_eq!(field, ARG_PRICE_SHEET),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_directories() {
    let (_tmp, root) = utf8_tempdir();
    let folder = root.join("sheets");
    std::fs::create_dir(&folder).expect("create folder");
    let config = IngestConfig {
        price_sheet: folder.clone(),
        output: root.join("stations.db"),
        nominatim_base_url: DEFAULT_NOMINATIM_BASE_URL.to_owned(),
    };

    match config.validate_sources() {
        Err(CliError::SourcePathNotFile { field, path }) => {
            assert_eq!(field, ARG_PRICE_SHEET);
            assert_eq!(path, folder);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn ingest_writes_database_and_reports_counts() {
    let (_tmp, root) = utf8_tempdir();
    let sheet = root.join("prices.csv");
    let database = root.join("out/stations.db");
    write_price_sheet(&sheet);

    let builder = FixedGeocoderBuilder::empty();

    let report = ingest(&sheet, &database, &builder);

    assert_eq!(report.database, database);
    assert_eq!(report.rows, 4);
    assert_eq!(report.stations, 3);
    assert_eq!(report.merged_rows, 1);
    assert_eq!(builder.builds.get(), 0, "located sheets need no geocoder");

    let catalog = SqliteStationCatalog::open(database).expect("database opens");
    assert_eq!(catalog.snapshot().len(), 3);
}

#[rstest]
fn coordinate_free_sheet_is_geocoded() {
    let (_tmp, root) = utf8_tempdir();
    let sheet = root.join("raw.csv");
    let database = root.join("stations.db");
    write_raw_price_sheet(&sheet);

    let report = ingest(&sheet, &database, &FixedGeocoderBuilder::truckstops());

    assert_eq!(report.stations, 2);
    assert_eq!(report.geocoded, 2);
    assert_eq!(report.missing_coordinates, 0);
    let known = load_station_locations(&database).expect("database opens");
    assert_eq!(known.get(&18), Some(&TOMAH));
    assert_eq!(known.get(&42), Some(&TUCSON));
}

#[rstest]
fn reingest_reuses_stored_coordinates() {
    let (_tmp, root) = utf8_tempdir();
    let sheet = root.join("raw.csv");
    let database = root.join("stations.db");
    write_raw_price_sheet(&sheet);
    ingest(&sheet, &database, &FixedGeocoderBuilder::truckstops());

    let report = ingest(&sheet, &database, &FixedGeocoderBuilder::empty());

    assert_eq!(report.stations, 2);
    assert_eq!(report.reused_coordinates, 2);
    assert_eq!(report.geocoded, 0);
    assert_eq!(report.geocode_failures, 0);
}

#[rstest]
fn unresolved_truckstops_are_reported() {
    let (_tmp, root) = utf8_tempdir();
    let sheet = root.join("raw.csv");
    let database = root.join("stations.db");
    write_raw_price_sheet(&sheet);

    let report = ingest(&sheet, &database, &FixedGeocoderBuilder::empty());

    assert_eq!(report.stations, 0);
    assert_eq!(report.geocode_failures, 2);
    assert_eq!(report.missing_coordinates, 2);
}

#[rstest]
fn malformed_sheet_surfaces_ingest_error() {
    let (_tmp, root) = utf8_tempdir();
    let sheet = root.join("prices.csv");
    write_utf8(
        &sheet,
        b"OPIS Truckstop ID,Truckstop Name,Retail Price\nseven,WOODSHED,3.40\n",
    );

    let err = run_ingest_with(
        IngestArgs {
            price_sheet: Some(sheet),
            output: Some(root.join("stations.db")),
            ..IngestArgs::default()
        },
        &FixedGeocoderBuilder::empty(),
        &mut Vec::new(),
    )
    .expect_err("identifier must be numeric");
    assert!(matches!(err, CliError::Ingest(_)), "found {err:?}");
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "price_sheet": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    assert!(matches!(err, CliError::Configuration(_)), "found {err:?}");
}

#[rstest]
fn merge_layers_prefer_cli_over_environment_and_file() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({ "price_sheet": "file.csv", "output": "file.db" }),
        None,
    );
    composer.push_environment(json!({ "output": "env.db" }));
    composer.push_cli(json!({ "price_sheet": "cli.csv" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.price_sheet, Utf8PathBuf::from("cli.csv"));
    assert_eq!(config.output, Utf8PathBuf::from("env.db"));
}
