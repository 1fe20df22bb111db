//! Plan command: choose fuel stops between two places.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use fuelstop_core::{FuelCostModel, InvalidInputError, RouteProjector};
use fuelstop_data::catalog::SqliteStationCatalog;
use fuelstop_data::geocoding::{
    DEFAULT_NOMINATIM_BASE_URL, NominatimGeocoder, NominatimGeocoderConfig,
};
use fuelstop_data::routing::{DEFAULT_ORS_BASE_URL, OrsRouteProvider, OrsRouteProviderConfig};
use fuelstop_optimizer::{
    FuelStopOptimizer, FuelStopOptimizerConfig, Planner, TripPlan, TripPlanner, TripRequest,
    Waypoint,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CORRIDOR_MILES, ARG_DATABASE, ARG_FINISH, ARG_MPG, ARG_NOMINATIM_BASE_URL,
    ARG_ORS_API_KEY, ARG_ORS_BASE_URL, ARG_START, ARG_TANK_GALLONS, CliError, DEFAULT_DATABASE,
    ENV_FINISH, ENV_START, require_existing, write_json,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Geocode the start and finish, fetch a driving route from \
                 openrouteservice and pick the cheapest refuelling stops \
                 from the station database. Endpoints accept a place name \
                 or a \"lat,lng\" pair.",
    about = "Plan fuel stops between two places"
)]
#[ortho_config(prefix = "FUELSTOP")]
pub(crate) struct PlanArgs {
    /// Where the trip begins: a place name or "lat,lng".
    #[arg(long = ARG_START, value_name = "place")]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Where the trip ends: a place name or "lat,lng".
    #[arg(long = ARG_FINISH, value_name = "place")]
    #[serde(default)]
    pub(crate) finish: Option<String>,
    /// Path to the station database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Base URL of the openrouteservice API.
    #[arg(long = ARG_ORS_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) ors_base_url: Option<String>,
    /// openrouteservice API key.
    #[arg(long = ARG_ORS_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) ors_api_key: Option<String>,
    /// Base URL of the Nominatim geocoder.
    #[arg(long = ARG_NOMINATIM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) nominatim_base_url: Option<String>,
    /// Vehicle fuel efficiency in miles per gallon.
    #[arg(long = ARG_MPG, value_name = "mpg")]
    #[serde(default)]
    pub(crate) mpg: Option<f64>,
    /// Vehicle tank capacity in gallons.
    #[arg(long = ARG_TANK_GALLONS, value_name = "gallons")]
    #[serde(default)]
    pub(crate) tank_gallons: Option<f64>,
    /// How far from the route a station may be, in miles.
    #[arg(long = ARG_CORRIDOR_MILES, value_name = "miles")]
    #[serde(default)]
    pub(crate) corridor_miles: Option<f64>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` configuration with vehicle parameters already checked.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlanConfig {
    pub(crate) request: TripRequest,
    pub(crate) database: Utf8PathBuf,
    pub(crate) ors_base_url: String,
    pub(crate) ors_api_key: Option<String>,
    pub(crate) nominatim_base_url: String,
    pub(crate) cost_model: FuelCostModel,
    pub(crate) projector: RouteProjector,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.database, ARG_DATABASE)
    }

    pub(crate) fn optimizer(&self) -> FuelStopOptimizer {
        FuelStopOptimizer::with_config(FuelStopOptimizerConfig {
            cost_model: self.cost_model,
            ..FuelStopOptimizerConfig::default()
        })
    }
}

fn parse_waypoint(
    value: Option<String>,
    field: &'static str,
    env: &'static str,
) -> Result<Waypoint, CliError> {
    let raw = value
        .filter(|text| !text.trim().is_empty())
        .ok_or(CliError::MissingArgument { field, env })?;
    raw.parse()
        .map_err(|source| CliError::InvalidArgument { field, source })
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let start = parse_waypoint(args.start, ARG_START, ENV_START)?;
        let finish = parse_waypoint(args.finish, ARG_FINISH, ENV_FINISH)?;

        let defaults = FuelCostModel::default();
        let mpg = args.mpg.unwrap_or_else(|| defaults.miles_per_gallon());
        let tank = args
            .tank_gallons
            .unwrap_or_else(|| defaults.tank_capacity_gallons());
        let cost_model = FuelCostModel::new(mpg, tank).map_err(|source| {
            let field = if matches!(source, InvalidInputError::TankCapacity(_)) {
                ARG_TANK_GALLONS
            } else {
                ARG_MPG
            };
            CliError::InvalidArgument { field, source }
        })?;
        let projector = match args.corridor_miles {
            Some(miles) => {
                RouteProjector::new(miles).map_err(|source| CliError::InvalidArgument {
                    field: ARG_CORRIDOR_MILES,
                    source,
                })?
            }
            None => RouteProjector::default(),
        };

        Ok(Self {
            request: TripRequest::new(start, finish),
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            ors_base_url: args
                .ors_base_url
                .unwrap_or_else(|| DEFAULT_ORS_BASE_URL.to_owned()),
            ors_api_key: args.ors_api_key.filter(|key| !key.is_empty()),
            nominatim_base_url: args
                .nominatim_base_url
                .unwrap_or_else(|| DEFAULT_NOMINATIM_BASE_URL.to_owned()),
            cost_model,
            projector,
        })
    }
}

/// Builds a planner for the current plan invocation.
pub(crate) trait PlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError>;
}

pub(crate) struct DefaultPlannerBuilder;

impl PlannerBuilder for DefaultPlannerBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError> {
        let catalog = SqliteStationCatalog::open(config.database.clone())?;
        let geocoder = NominatimGeocoder::with_config(NominatimGeocoderConfig::new(
            config.nominatim_base_url.clone(),
        ))
        .map_err(|source| CliError::BuildProvider {
            service: "geocoding",
            base_url: config.nominatim_base_url.clone(),
            source,
        })?;

        let mut ors = OrsRouteProviderConfig::new(config.ors_base_url.clone());
        match &config.ors_api_key {
            Some(key) => ors = ors.with_api_key(key.clone()),
            None if config.ors_base_url == DEFAULT_ORS_BASE_URL => {
                tracing::warn!("no openrouteservice API key configured; requests will be rejected");
            }
            None => {}
        }
        let router = OrsRouteProvider::with_config(ors).map_err(|source| {
            CliError::BuildProvider {
                service: "routing",
                base_url: config.ors_base_url.clone(),
                source,
            }
        })?;

        Ok(Box::new(
            TripPlanner::new(geocoder, router, catalog)
                .with_optimizer(config.optimizer())
                .with_projector(config.projector),
        ))
    }
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &DefaultPlannerBuilder, &mut stdout)
}

pub(crate) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let plan = execute_plan(args, builder)?;
    write_json(writer, &plan)
}

fn execute_plan(args: PlanArgs, builder: &dyn PlannerBuilder) -> Result<TripPlan, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let planner = builder.build(&config)?;
    let span = tracing::info_span!(
        "plan",
        start = %config.request.start,
        finish = %config.request.finish
    );
    let _entered = span.enter();
    planner.plan(&config.request).map_err(CliError::Plan)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
