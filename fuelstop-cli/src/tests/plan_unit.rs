//! Focused unit tests covering plan configuration.

use super::*;
use crate::plan::{PlanArgs, PlanConfig, config_from_layers_for_test};
use camino::Utf8PathBuf;
use fuelstop_core::{FuelCostModel, InvalidInputError, RouteProjector};
use fuelstop_data::geocoding::DEFAULT_NOMINATIM_BASE_URL;
use fuelstop_data::routing::DEFAULT_ORS_BASE_URL;
use fuelstop_optimizer::Waypoint;
use geo::Coord;
use rstest::{fixture, rstest};

#[fixture]
fn args() -> PlanArgs {
    PlanArgs {
        start: Some("Austin, TX".into()),
        finish: Some("39.7392, -104.9903".into()),
        ..PlanArgs::default()
    }
}

#[rstest]
fn plan_config_applies_defaults(args: PlanArgs) {
    let config = PlanConfig::try_from(args).expect("config should build");

    assert_eq!(config.request.start, Waypoint::Named("Austin, TX".into()));
    assert_eq!(
        config.request.finish,
        Waypoint::Coordinates(Coord {
            x: -104.9903,
            y: 39.7392
        })
    );
    assert_eq!(config.database, Utf8PathBuf::from(DEFAULT_DATABASE));
    assert_eq!(config.ors_base_url, DEFAULT_ORS_BASE_URL);
    assert_eq!(config.ors_api_key, None);
    assert_eq!(config.nominatim_base_url, DEFAULT_NOMINATIM_BASE_URL);
    assert_eq!(config.cost_model, FuelCostModel::default());
    assert_eq!(config.projector, RouteProjector::default());
}

#[rstest]
#[case::start(None, Some("Denver"), ARG_START, ENV_START)]
#[case::finish(Some("Austin"), None, ARG_FINISH, ENV_FINISH)]
#[case::blank_start(Some("   "), Some("Denver"), ARG_START, ENV_START)]
fn missing_endpoints_name_flag_and_variable(
    #[case] start: Option<&str>,
    #[case] finish: Option<&str>,
    #[case] expected_field: &str,
    #[case] expected_env: &str,
) {
    let args = PlanArgs {
        start: start.map(str::to_owned),
        finish: finish.map(str::to_owned),
        ..PlanArgs::default()
    };

    match PlanConfig::try_from(args) {
        Err(CliError::MissingArgument { field, env }) => {
            assert_eq!(field, expected_field);
            assert_eq!(env, expected_env);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn out_of_range_coordinates_are_rejected(mut args: PlanArgs) {
    args.start = Some("95.0, -97.7".into());

    match PlanConfig::try_from(args) {
        Err(CliError::InvalidArgument { field, source }) => {
            assert_eq!(field, ARG_START);
            assert!(matches!(source, InvalidInputError::Coordinate { .. }));
        }
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
#[case::mpg(Some(0.0), None, None, ARG_MPG)]
#[case::tank(None, Some(-5.0), None, ARG_TANK_GALLONS)]
#[case::corridor(None, None, Some(f64::NAN), ARG_CORRIDOR_MILES)]
fn vehicle_parameters_are_validated(
    mut args: PlanArgs,
    #[case] mpg: Option<f64>,
    #[case] tank_gallons: Option<f64>,
    #[case] corridor_miles: Option<f64>,
    #[case] expected_field: &str,
) {
    args.mpg = mpg;
    args.tank_gallons = tank_gallons;
    args.corridor_miles = corridor_miles;

    match PlanConfig::try_from(args) {
        Err(CliError::InvalidArgument { field, .. }) => assert_eq!(field, expected_field),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn vehicle_overrides_reach_the_optimizer(mut args: PlanArgs) {
    args.mpg = Some(6.5);
    args.tank_gallons = Some(120.0);
    args.corridor_miles = Some(5.0);

    let config = PlanConfig::try_from(args).expect("config should build");
    let optimizer = config.optimizer();

    assert_eq!(optimizer.config().cost_model.miles_per_gallon(), 6.5);
    assert_eq!(optimizer.config().cost_model.tank_capacity_gallons(), 120.0);
    assert_eq!(config.projector.corridor_miles(), 5.0);
}

#[rstest]
fn empty_api_key_counts_as_unset(mut args: PlanArgs) {
    args.ors_api_key = Some(String::new());
    let config = PlanConfig::try_from(args).expect("config should build");
    assert_eq!(config.ors_api_key, None);
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "start": "Austin, TX",
            "finish": "Denver, CO",
            "mpg": 7.0,
            "ors_base_url": "http://from-file:8080/ors",
        }),
        None,
    );
    composer.push_environment(json!({
        "ors_api_key": "from-env",
        "mpg": 8.0,
    }));
    composer.push_cli(json!({ "finish": "Amarillo, TX" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request.start, Waypoint::Named("Austin, TX".into()));
    assert_eq!(config.request.finish, Waypoint::Named("Amarillo, TX".into()));
    assert_eq!(config.ors_base_url, "http://from-file:8080/ors");
    assert_eq!(config.ors_api_key.as_deref(), Some("from-env"));
    assert_eq!(config.cost_model.miles_per_gallon(), 8.0);
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "mpg": "thirsty" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    assert!(matches!(err, CliError::Configuration(_)), "found {err:?}");
}
