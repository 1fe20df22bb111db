//! Fuel-stop optimisation and trip planning.
//!
//! [`FuelStopOptimizer`] is the default implementation of the
//! [`Optimizer`](fuelstop_core::Optimizer) trait. It solves the refuelling
//! problem exactly: stations projected onto a route form a DAG ordered by
//! mileage, and a forward dynamic programme finds the cheapest feasible set
//! of stops under the vehicle's range.
//!
//! [`TripPlanner`] sits on top and coordinates the collaborators for a full
//! request: geocoding the endpoints, fetching a route, prefiltering the
//! station catalog by the route corridor, projecting and optimising.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod optimizer;
mod planner;
mod program;

pub use optimizer::{FuelStopOptimizer, FuelStopOptimizerConfig, optimize};
pub use planner::{PlanError, Planner, TripPlan, TripPlanner, TripRequest, Waypoint};
