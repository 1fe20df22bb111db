//! Core domain types for the fuelstop engine.
//!
//! The crate models a driving route as a polyline with cumulative mileage,
//! fuel stations with per-gallon prices, and the pure computations that sit
//! between them: projecting stations onto the route, pricing the legs of a
//! trip, and the traits through which geocoding, routing and price catalogs
//! are consumed.
//!
//! Constructors return `Result` so that malformed coordinates, prices or
//! ranges are rejected before any optimisation runs.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod catalog;
mod cost;
pub mod geodesy;
mod geocode;
mod optimize;
mod projection;
mod route;
mod routing;
mod station;
mod validation;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use catalog::{SharedCatalog, StationCatalog, StationSnapshot};
pub use cost::{
    DEFAULT_MILES_PER_GALLON, DEFAULT_TANK_CAPACITY_GALLONS, FuelCostModel, FuelLeg,
};
pub use geocode::{GeocodeError, Geocoder};
pub use optimize::{OptimizeError, OptimizedRoute, Optimizer};
pub use projection::{DEFAULT_CORRIDOR_MILES, RouteProjector};
pub use route::{RoutePoint, RoutePolyline, RouteSegment};
pub use routing::{RouteProvider, RouteProviderError};
pub use station::{FuelStation, ProjectedStation};
pub use validation::{InvalidInputError, validate_coord};
