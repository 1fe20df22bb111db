//! Facade crate for the fuelstop route planning engine.
//!
//! This crate re-exports the core domain types and exposes the optimizer and
//! the service adapters behind feature flags.

#![forbid(unsafe_code)]

pub use fuelstop_core::{
    FuelCostModel, FuelLeg, FuelStation, GeocodeError, Geocoder, InvalidInputError,
    OptimizeError, OptimizedRoute, Optimizer, ProjectedStation, RouteProjector, RouteProvider,
    RouteProviderError, RoutePoint, RoutePolyline, RouteSegment, SharedCatalog, StationCatalog,
    StationSnapshot,
};

#[cfg(feature = "optimizer")]
pub use fuelstop_optimizer::{
    FuelStopOptimizer, FuelStopOptimizerConfig, PlanError, Planner, TripPlan, TripPlanner,
    TripRequest, Waypoint, optimize,
};

#[cfg(feature = "adapters")]
pub use fuelstop_data::{
    catalog::SqliteStationCatalog, geocoding::NominatimGeocoder, routing::OrsRouteProvider,
};
