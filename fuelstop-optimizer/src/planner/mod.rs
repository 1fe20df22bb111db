//! Trip planning: resolve endpoints, fetch a route and choose fuel stops.
//!
//! [`TripPlanner`] wires the collaborators together. It takes one catalog
//! snapshot per request so a concurrent refresh never mixes station sets
//! within a plan.

use std::fmt;
use std::str::FromStr;

use fuelstop_core::{
    GeocodeError, Geocoder, InvalidInputError, OptimizeError, OptimizedRoute, Optimizer,
    RouteProjector, RouteProvider, RouteProviderError, StationCatalog, validate_coord,
};
use geo::Coord;
use thiserror::Error;

use crate::FuelStopOptimizer;

/// One end of a trip.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waypoint {
    /// A place name resolved through the geocoder.
    Named(String),
    /// A coordinate used as given (`x = longitude`, `y = latitude`).
    Coordinates(Coord<f64>),
}

impl Waypoint {
    /// Build a coordinate waypoint from latitude and longitude.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Coordinate`] when either value is out of
    /// range.
    pub fn from_lat_lng(lat: f64, lng: f64) -> Result<Self, InvalidInputError> {
        validate_coord(Coord { x: lng, y: lat }).map(Self::Coordinates)
    }
}

impl FromStr for Waypoint {
    type Err = InvalidInputError;

    /// Parse `"lat,lng"` as coordinates and anything else as a place name.
    ///
    /// ```
    /// use fuelstop_optimizer::Waypoint;
    ///
    /// let parsed: Waypoint = "30.2672, -97.7431".parse().expect("valid coordinates");
    /// assert!(matches!(parsed, Waypoint::Coordinates(_)));
    /// let named: Waypoint = "Austin, TX".parse().expect("place names always parse");
    /// assert_eq!(named, Waypoint::Named("Austin, TX".into()));
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let numbers = text
            .split_once(',')
            .and_then(|(lat, lng)| Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?)));
        match numbers {
            Some((lat, lng)) => Self::from_lat_lng(lat, lng),
            None => Ok(Self::Named(text.to_owned())),
        }
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Coordinates(coord) => write!(f, "{},{}", coord.y, coord.x),
        }
    }
}

/// Parameters for a plan request.
///
/// # Examples
/// ```rust
/// use fuelstop_optimizer::{TripRequest, Waypoint};
///
/// let request = TripRequest::new(
///     Waypoint::Named("Austin, TX".into()),
///     Waypoint::Named("Denver, CO".into()),
/// );
/// assert_eq!(request.finish.to_string(), "Denver, CO");
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TripRequest {
    /// Where the trip begins.
    pub start: Waypoint,
    /// Where the trip ends.
    pub finish: Waypoint,
}

impl TripRequest {
    /// Pair the two endpoints.
    #[must_use]
    pub const fn new(start: Waypoint, finish: Waypoint) -> Self {
        Self { start, finish }
    }
}

/// A completed plan.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TripPlan {
    /// Resolved start coordinate.
    pub start: Coord<f64>,
    /// Resolved finish coordinate.
    pub finish: Coord<f64>,
    /// Driving distance in miles.
    pub route_miles: f64,
    /// Driving time in seconds, when the route provider reports one.
    pub duration_secs: Option<f64>,
    /// Chosen stops, priced legs and total cost.
    pub optimized: OptimizedRoute,
}

/// Errors returned by [`Planner::plan`].
///
/// Collaborator errors are carried unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// An endpoint could not be geocoded.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    /// The routing service failed or found no route.
    #[error(transparent)]
    Route(#[from] RouteProviderError),
    /// Stop selection failed.
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    /// A coordinate endpoint was malformed.
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
}

/// Produce a fuel plan for a trip.
pub trait Planner: Send + Sync {
    /// Plan `request`, returning the route and chosen stops.
    fn plan(&self, request: &TripRequest) -> Result<TripPlan, PlanError>;
}

/// Default [`Planner`] built from a geocoder, a route provider and a
/// station catalog.
pub struct TripPlanner<G, R, C>
where
    G: Geocoder,
    R: RouteProvider,
    C: StationCatalog,
{
    geocoder: G,
    router: R,
    catalog: C,
    optimizer: FuelStopOptimizer,
    projector: RouteProjector,
}

impl<G, R, C> TripPlanner<G, R, C>
where
    G: Geocoder,
    R: RouteProvider,
    C: StationCatalog,
{
    /// Construct a planner with the default optimizer and corridor.
    pub fn new(geocoder: G, router: R, catalog: C) -> Self {
        Self {
            geocoder,
            router,
            catalog,
            optimizer: FuelStopOptimizer::default(),
            projector: RouteProjector::default(),
        }
    }

    /// Replace the optimizer.
    #[must_use]
    pub fn with_optimizer(mut self, optimizer: FuelStopOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Replace the station projector.
    #[must_use]
    pub fn with_projector(mut self, projector: RouteProjector) -> Self {
        self.projector = projector;
        self
    }

    fn resolve(&self, waypoint: &Waypoint) -> Result<Coord<f64>, PlanError> {
        match waypoint {
            Waypoint::Named(name) => Ok(self.geocoder.resolve(name)?),
            Waypoint::Coordinates(coord) => Ok(validate_coord(*coord)?),
        }
    }
}

impl<G, R, C> Planner for TripPlanner<G, R, C>
where
    G: Geocoder,
    R: RouteProvider,
    C: StationCatalog,
{
    fn plan(&self, request: &TripRequest) -> Result<TripPlan, PlanError> {
        let start = self.resolve(&request.start)?;
        let finish = self.resolve(&request.finish)?;
        let route = self.router.route(start, finish)?;
        let route_miles = route.length_miles();
        log::info!(
            "planning {} -> {} over {route_miles:.1} miles",
            request.start,
            request.finish
        );

        let snapshot = self.catalog.snapshot();
        let bounds = self.projector.corridor_bounds(&route);
        let nearby: Vec<_> = snapshot.stations_in_bbox(&bounds).collect();
        let candidates = self.projector.project_all(&route, nearby.iter().copied());
        log::debug!(
            "{} of {} catalog stations inside the route bounds, {} within the corridor",
            nearby.len(),
            snapshot.len(),
            candidates.len()
        );

        let range_miles = self.optimizer.config().cost_model.range_miles();
        let optimized = self.optimizer.optimize(&route, &candidates, range_miles)?;
        log::info!(
            "chose {} stops, estimated cost {:.2}",
            optimized.stops.len(),
            optimized.total_cost
        );
        Ok(TripPlan {
            start,
            finish,
            route_miles,
            duration_secs: route.duration_secs(),
            optimized,
        })
    }
}
