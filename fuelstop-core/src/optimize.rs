//! The optimizer contract: choosing refuelling stops along a route.

use thiserror::Error;

use crate::{FuelLeg, InvalidInputError, ProjectedStation, RoutePolyline};

/// Result of a successful optimisation.
///
/// Holds the route travelled, the chosen refuelling stops in route order,
/// the priced legs between them and the total estimated fuel cost.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptimizedRoute {
    /// The route the stops were chosen along.
    pub path: RoutePolyline,
    /// Chosen stops, strictly increasing in route distance.
    pub stops: Vec<ProjectedStation>,
    /// Legs between consecutive stops, priced at the stop that begins them.
    pub legs: Vec<FuelLeg>,
    /// Sum of the leg costs.
    pub total_cost: f64,
}

impl OptimizedRoute {
    /// Total route length in miles.
    pub fn length_miles(&self) -> f64 {
        self.path.length_miles()
    }

    /// Gallons burnt over the whole route.
    pub fn total_gallons(&self) -> f64 {
        self.legs.iter().map(|leg| leg.gallons).sum()
    }
}

/// Errors returned by [`Optimizer::optimize`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimizeError {
    /// A parameter, coordinate or station was malformed.
    #[error("invalid optimisation input: {0}")]
    InvalidInput(#[from] InvalidInputError),
    /// Some gap between consecutive refuelling opportunities exceeds the
    /// available range.
    #[error(
        "no station within range between mile {from_miles:.1} and mile {to_miles:.1} \
         (range {range_miles:.1} miles)"
    )]
    InfeasibleRoute {
        /// Route distance of the last reachable refuelling point.
        from_miles: f64,
        /// Route distance of the next refuelling point or the destination.
        to_miles: f64,
        /// Range available when leaving `from_miles`.
        range_miles: f64,
    },
}

/// Choose refuelling stops along a route.
///
/// Implementations are deterministic: identical inputs yield identical
/// results. They must be `Send + Sync` so one optimizer can serve concurrent
/// requests.
pub trait Optimizer: Send + Sync {
    /// Select stops from `stations` so that no gap exceeds `range_miles`,
    /// minimising total fuel cost.
    fn optimize(
        &self,
        route: &RoutePolyline,
        stations: &[ProjectedStation],
        range_miles: f64,
    ) -> Result<OptimizedRoute, OptimizeError>;
}
