//! Behavioural tests for `FuelStopOptimizer` using rstest-bdd.

use std::cell::RefCell;

use fuelstop_core::test_support::{equator_route, station_at_mile};
use fuelstop_core::{OptimizeError, OptimizedRoute, Optimizer, ProjectedStation, RoutePolyline};
use fuelstop_optimizer::FuelStopOptimizer;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[derive(Debug)]
struct OptimizerWorld {
    route: RefCell<Option<RoutePolyline>>,
    stations: RefCell<Vec<ProjectedStation>>,
    range_miles: RefCell<f64>,
    outcome: RefCell<Option<Result<OptimizedRoute, OptimizeError>>>,
}

impl OptimizerWorld {
    fn new() -> Self {
        Self {
            route: RefCell::new(None),
            stations: RefCell::new(Vec::new()),
            range_miles: RefCell::new(500.0),
            outcome: RefCell::new(None),
        }
    }

    #[expect(
        clippy::expect_used,
        reason = "behaviour tests use expect for readable failures"
    )]
    fn expect_outcome(&self) -> Result<OptimizedRoute, OptimizeError> {
        self.outcome
            .borrow()
            .as_ref()
            .cloned()
            .expect("outcome should be recorded before assertions")
    }
}

#[fixture]
fn world() -> OptimizerWorld {
    OptimizerWorld::new()
}

#[given("a 980 mile route")]
fn given_980_route(world: &OptimizerWorld) {
    world.route.replace(Some(equator_route(980.0, 20.0)));
}

#[given("a 1000 mile route")]
fn given_1000_route(world: &OptimizerWorld) {
    world.route.replace(Some(equator_route(1000.0, 20.0)));
}

#[given("a 900 mile route")]
fn given_900_route(world: &OptimizerWorld) {
    world.route.replace(Some(equator_route(900.0, 20.0)));
}

#[given("a 300 mile route")]
fn given_300_route(world: &OptimizerWorld) {
    world.route.replace(Some(equator_route(300.0, 20.0)));
}

#[given("stations at mile 480 for 3.00 and mile 490 for 2.50")]
fn given_two_stations(world: &OptimizerWorld) {
    world.stations.replace(vec![
        station_at_mile(480, 480.0, 3.00),
        station_at_mile(490, 490.0, 2.50),
    ]);
}

#[given("a single station at mile 100")]
fn given_station_at_100(world: &OptimizerWorld) {
    world.stations.replace(vec![station_at_mile(100, 100.0, 3.00)]);
}

#[given("a single station at mile 600")]
fn given_station_at_600(world: &OptimizerWorld) {
    world.stations.replace(vec![station_at_mile(600, 600.0, 3.00)]);
}

#[given("a vehicle range of 500 miles")]
fn given_range(world: &OptimizerWorld) {
    world.range_miles.replace(500.0);
}

#[when("the optimizer runs")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn when_optimizer_runs(world: &OptimizerWorld) {
    let route = world.route.borrow().clone().expect("route prepared");
    let stations = world.stations.borrow().clone();
    let range = *world.range_miles.borrow();
    let outcome = FuelStopOptimizer::default().optimize(&route, &stations, range);
    world.outcome.replace(Some(outcome));
}

#[then("the only stop is the station at mile 490")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_single_stop(world: &OptimizerWorld) {
    let plan = world.expect_outcome().expect("expected a feasible plan");
    let ids: Vec<u64> = plan.stops.iter().map(|s| s.station.id).collect();
    assert_eq!(ids, vec![490]);
}

#[then("no stops are chosen")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_no_stops(world: &OptimizerWorld) {
    let plan = world.expect_outcome().expect("expected a feasible plan");
    assert!(plan.stops.is_empty());
}

#[then("the route is reported as infeasible from mile 0")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_infeasible_from_start(world: &OptimizerWorld) {
    let err = world.expect_outcome().expect_err("expected infeasibility");
    assert!(matches!(
        err,
        OptimizeError::InfeasibleRoute { from_miles, .. } if from_miles == 0.0
    ));
}

#[then("the route is reported as infeasible from mile 490")]
#[expect(
    clippy::expect_used,
    reason = "behaviour tests use expect for readable failures"
)]
fn then_infeasible_from_490(world: &OptimizerWorld) {
    let err = world.expect_outcome().expect_err("expected infeasibility");
    assert!(matches!(
        err,
        OptimizeError::InfeasibleRoute { from_miles, to_miles, .. }
            if from_miles == 490.0 && to_miles == 1000.0
    ));
}

#[scenario(path = "tests/features/fuel_stop_optimizer.feature", index = 0)]
fn cheaper_station_preferred(world: OptimizerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fuel_stop_optimizer.feature", index = 1)]
fn short_route_without_stops(world: OptimizerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fuel_stop_optimizer.feature", index = 2)]
fn unreachable_first_station(world: OptimizerWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/fuel_stop_optimizer.feature", index = 3)]
fn final_stretch_too_long(world: OptimizerWorld) {
    let _ = world;
}
