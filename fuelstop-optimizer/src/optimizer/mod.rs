//! `FuelStopOptimizer`, the default [`Optimizer`] implementation.

use fuelstop_core::geodesy::EPSILON_MILES;
use fuelstop_core::{
    FuelCostModel, InvalidInputError, OptimizeError, OptimizedRoute, Optimizer, ProjectedStation,
    RoutePolyline,
};

use crate::program::RefuelProgram;

/// Configuration for [`FuelStopOptimizer`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FuelStopOptimizerConfig {
    /// Vehicle efficiency and fuel pricing.
    pub cost_model: FuelCostModel,
    /// Share of the range available at departure, within `(0, 1]`.
    pub initial_range_fraction: f64,
}

impl Default for FuelStopOptimizerConfig {
    fn default() -> Self {
        Self {
            cost_model: FuelCostModel::default(),
            initial_range_fraction: 1.0,
        }
    }
}

impl FuelStopOptimizerConfig {
    /// Check the fraction and the cost model.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::RangeFraction`] for a fraction outside
    /// `(0, 1]` and the cost model's own errors otherwise.
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        let fraction = self.initial_range_fraction;
        if !(fraction.is_finite() && fraction > 0.0 && fraction <= 1.0) {
            return Err(InvalidInputError::RangeFraction(fraction));
        }
        self.cost_model.validate()
    }
}

/// Chooses the cheapest set of refuelling stops along a route.
///
/// The search is exact: every feasible combination of stops is implicitly
/// considered and the one minimising total fuel cost is returned. Among
/// equal-cost answers the optimizer prefers fewer stops and then stations
/// farther along the route. Results are deterministic.
///
/// # Examples
///
/// ```
/// use fuelstop_core::Optimizer;
/// use fuelstop_core::test_support::{equator_route, station_at_mile};
/// use fuelstop_optimizer::FuelStopOptimizer;
///
/// let route = equator_route(980.0, 20.0);
/// let stations = vec![station_at_mile(1, 480.0, 3.00), station_at_mile(2, 490.0, 2.50)];
/// let result = FuelStopOptimizer::default()
///     .optimize(&route, &stations, 500.0)
///     .expect("route is feasible");
/// assert_eq!(result.stops.len(), 1);
/// assert_eq!(result.stops[0].station.id, 2);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FuelStopOptimizer {
    config: FuelStopOptimizerConfig,
}

impl FuelStopOptimizer {
    /// Construct an optimizer with explicit configuration.
    #[must_use]
    pub const fn with_config(config: FuelStopOptimizerConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &FuelStopOptimizerConfig {
        &self.config
    }

    /// Validate stations and order them along the route.
    #[expect(
        clippy::float_arithmetic,
        reason = "station positions are compared with a mileage tolerance"
    )]
    fn prepare_stations(
        route_miles: f64,
        stations: &[ProjectedStation],
    ) -> Result<Vec<ProjectedStation>, InvalidInputError> {
        let mut prepared = Vec::with_capacity(stations.len());
        for candidate in stations {
            candidate.station.validate()?;
            let miles = candidate.route_miles;
            let inside = miles.is_finite()
                && miles >= -EPSILON_MILES
                && miles <= route_miles + EPSILON_MILES;
            if !inside {
                return Err(InvalidInputError::StationPosition {
                    id: candidate.station.id,
                    route_miles: miles,
                });
            }
            let mut station = candidate.clone();
            station.route_miles = miles.clamp(0.0, route_miles);
            prepared.push(station);
        }
        prepared.sort_by(ProjectedStation::cmp_along_route);
        Ok(prepared)
    }
}

impl Optimizer for FuelStopOptimizer {
    #[expect(
        clippy::float_arithmetic,
        reason = "initial reach is a fraction of the full range"
    )]
    fn optimize(
        &self,
        route: &RoutePolyline,
        stations: &[ProjectedStation],
        range_miles: f64,
    ) -> Result<OptimizedRoute, OptimizeError> {
        if !(range_miles.is_finite() && range_miles > 0.0) {
            return Err(InvalidInputError::Range(range_miles).into());
        }
        self.config.validate()?;

        let route_miles = route.length_miles();
        let initial_range_miles = range_miles * self.config.initial_range_fraction;
        let cost_model = &self.config.cost_model;
        let sorted = Self::prepare_stations(route_miles, stations)?;

        let chosen = if route_miles <= initial_range_miles + EPSILON_MILES {
            log::debug!(
                "destination at mile {route_miles:.1} is within the initial range; no stops needed"
            );
            Vec::new()
        } else {
            let program = RefuelProgram {
                route_miles,
                stations: &sorted,
                range_miles,
                initial_range_miles,
                cost_model,
            };
            program.check_gaps()?;
            let indices = program.solve()?;
            log::debug!(
                "selected {} of {} candidate stations over {route_miles:.1} miles",
                indices.len(),
                sorted.len()
            );
            indices
                .into_iter()
                .filter_map(|i| sorted.get(i).cloned())
                .collect()
        };

        let legs = cost_model.price_legs(route_miles, &chosen);
        let total_cost = FuelCostModel::sum_legs(&legs);
        Ok(OptimizedRoute {
            path: route.clone(),
            stops: chosen,
            legs,
            total_cost,
        })
    }
}

/// Optimize with the default vehicle model and a full tank at departure.
///
/// # Errors
///
/// See [`Optimizer::optimize`]: invalid input and infeasible routes are
/// reported as [`OptimizeError`].
pub fn optimize(
    route: &RoutePolyline,
    stations: &[ProjectedStation],
    range_miles: f64,
) -> Result<OptimizedRoute, OptimizeError> {
    FuelStopOptimizer::default().optimize(route, stations, range_miles)
}
