//! Driving routes from OpenRouteService.
//!
//! [`OrsRouteProvider`] implements [`fuelstop_core::RouteProvider`] by
//! calling the directions API and turning the returned GeoJSON `LineString`
//! into a [`fuelstop_core::RoutePolyline`]. The trait is synchronous, so the
//! provider blocks on its HTTP request internally; see
//! [`OrsRouteProvider`] for the runtime rules.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use fuelstop_data::routing::{OrsRouteProvider, OrsRouteProviderConfig};
//!
//! let config = OrsRouteProviderConfig::new("http://localhost:8080/ors")
//!     .with_profile("driving-hgv")
//!     .with_timeout(Duration::from_secs(60));
//! let provider = OrsRouteProvider::with_config(config)?;
//! # Ok::<(), fuelstop_data::ProviderBuildError>(())
//! ```

mod ors;
mod provider;

pub use provider::{
    DEFAULT_ORS_BASE_URL, DEFAULT_PROFILE, DEFAULT_ROUTE_CACHE_CAPACITY, DEFAULT_ROUTE_CACHE_TTL,
    OrsRouteProvider, OrsRouteProviderConfig,
};
