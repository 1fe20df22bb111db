//! Proptest strategies and oracles for optimizer property tests.
//!
//! Routes run along the equator so that station mileage is exact, and the
//! brute-force oracle enumerates every ordered subset of stations for small
//! inputs.

use fuelstop_core::test_support::{equator_route, station_at_mile};
use fuelstop_core::{FuelCostModel, ProjectedStation, RoutePolyline};
use proptest::prelude::*;

/// Tolerance used when comparing mileage.
pub const MILES_TOLERANCE: f64 = 1e-6;

/// Tolerance used when comparing costs.
pub const COST_TOLERANCE: f64 = 1e-6;

/// A generated optimisation problem.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Route along the equator.
    pub route: RoutePolyline,
    /// Stations placed on the route, in generation order.
    pub stations: Vec<ProjectedStation>,
    /// Vehicle range in miles.
    pub range_miles: f64,
}

/// Strategy for problems with up to `max_stations` stations.
///
/// Station mileage and price are drawn independently, so many problems are
/// infeasible; properties handle both outcomes.
pub fn problem_strategy(max_stations: usize) -> impl Strategy<Value = Problem> {
    let length = 50.0_f64..2500.0_f64;
    let range = 150.0_f64..700.0_f64;
    let stations =
        proptest::collection::vec((0.0_f64..=1.0_f64, 1.5_f64..5.0_f64), 0..=max_stations);
    (length, range, stations).prop_map(|(length, range_miles, raw)| {
        let route = equator_route(length, 50.0);
        let stations = raw
            .into_iter()
            .zip(1_u64..)
            .map(|((fraction, price), id)| station_at_mile(id, fraction * length, price))
            .collect();
        Problem {
            route,
            stations,
            range_miles,
        }
    })
}

/// Mileage of each refuelling point in the order visited: start, stops,
/// finish.
#[must_use]
pub fn visit_positions(route_miles: f64, stops: &[ProjectedStation]) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(stops.iter().map(|s| s.route_miles))
        .chain(std::iter::once(route_miles))
        .collect()
}

/// Whether some gap between consecutive stations (with start and finish)
/// exceeds the range.
#[must_use]
pub fn has_uncrossable_gap(problem: &Problem) -> bool {
    let mut sorted = problem.stations.clone();
    sorted.sort_by(ProjectedStation::cmp_along_route);
    visit_positions(problem.route.length_miles(), &sorted)
        .windows(2)
        .any(|pair| pair[1] - pair[0] > problem.range_miles + MILES_TOLERANCE)
}

/// Cheapest feasible cost found by enumerating every subset of stations.
///
/// Returns `None` when no subset is feasible.
#[must_use]
pub fn brute_force_cost(problem: &Problem, model: &FuelCostModel) -> Option<f64> {
    let mut sorted = problem.stations.clone();
    sorted.sort_by(ProjectedStation::cmp_along_route);
    let route_miles = problem.route.length_miles();
    let n = sorted.len();
    let mut best: Option<f64> = None;
    for mask in 0_u32..(1_u32 << n) {
        let chosen: Vec<ProjectedStation> = sorted
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, s)| s.clone())
            .collect();
        let feasible = visit_positions(route_miles, &chosen)
            .windows(2)
            .all(|pair| pair[1] - pair[0] <= problem.range_miles + MILES_TOLERANCE);
        if feasible {
            let cost = model.total_cost(route_miles, &chosen);
            best = Some(best.map_or(cost, |b| b.min(cost)));
        }
    }
    best
}
