//! Behavioural tests for projecting stations onto a route.

use fuelstop_core::{FuelStation, ProjectedStation, RoutePolyline, RouteProjector};
use geo::Coord;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

fn station(id: u64, x: f64, y: f64) -> FuelStation {
    FuelStation::new(id, format!("Station {id}"), Coord { x, y }, 3.25).expect("valid station")
}

#[fixture]
fn route() -> RefCell<Option<RoutePolyline>> {
    RefCell::new(None)
}

#[fixture]
fn stations() -> RefCell<Vec<FuelStation>> {
    RefCell::new(Vec::new())
}

#[fixture]
fn projected() -> RefCell<Vec<ProjectedStation>> {
    RefCell::new(Vec::new())
}

#[given("a straight route running east along the equator for two degrees")]
fn given_route(#[from(route)] route: &RefCell<Option<RoutePolyline>>) {
    let line = RoutePolyline::from_coordinates(vec![
        Coord { x: 0.0, y: 0.0 },
        Coord { x: 1.0, y: 0.0 },
        Coord { x: 2.0, y: 0.0 },
    ])
    .expect("valid route");
    *route.borrow_mut() = Some(line);
}

#[given("a station just north of the route midpoint")]
fn given_midpoint_station(#[from(stations)] stations: &RefCell<Vec<FuelStation>>) {
    stations.borrow_mut().push(station(1, 1.0, 0.01));
}

#[given("a station fifty miles north of the route")]
fn given_distant_station(#[from(stations)] stations: &RefCell<Vec<FuelStation>>) {
    stations.borrow_mut().push(station(2, 1.0, 0.72));
}

#[given("stations near the end and near the start of the route")]
fn given_two_stations(#[from(stations)] stations: &RefCell<Vec<FuelStation>>) {
    let mut stations = stations.borrow_mut();
    stations.push(station(10, 1.9, 0.0));
    stations.push(station(20, 0.1, 0.0));
}

#[when("I project the stations with the default corridor")]
fn when_project(
    #[from(route)] route: &RefCell<Option<RoutePolyline>>,
    #[from(stations)] stations: &RefCell<Vec<FuelStation>>,
    #[from(projected)] projected: &RefCell<Vec<ProjectedStation>>,
) {
    let route = route.borrow();
    let route = route.as_ref().expect("route prepared");
    *projected.borrow_mut() = RouteProjector::default().project_all(route, stations.borrow().iter());
}

#[then("one station is placed near the route midpoint")]
fn then_midpoint(
    #[from(route)] route: &RefCell<Option<RoutePolyline>>,
    #[from(projected)] projected: &RefCell<Vec<ProjectedStation>>,
) {
    let half = route.borrow().as_ref().expect("route prepared").length_miles() / 2.0;
    let projected = projected.borrow();
    let only = projected.first().expect("one station projected");
    assert_eq!(projected.len(), 1, "expected a single projected station");
    assert!(
        (only.route_miles - half).abs() < 0.1,
        "expected mile {half}, got {}",
        only.route_miles
    );
    assert!(only.offset_miles < 1.0, "expected a small offset");
}

#[then("no stations are placed on the route")]
fn then_none(#[from(projected)] projected: &RefCell<Vec<ProjectedStation>>) {
    assert!(projected.borrow().is_empty(), "expected no projected stations");
}

#[then("the station near the start is listed first")]
fn then_ordered(#[from(projected)] projected: &RefCell<Vec<ProjectedStation>>) {
    let ids: Vec<u64> = projected.borrow().iter().map(|p| p.station.id).collect();
    assert_eq!(ids, vec![20, 10]);
}

#[scenario(path = "tests/features/route_projection.feature", index = 0)]
fn scenario_station_beside_route(
    route: RefCell<Option<RoutePolyline>>,
    stations: RefCell<Vec<FuelStation>>,
    projected: RefCell<Vec<ProjectedStation>>,
) {
    let _ = (route, stations, projected);
}

#[scenario(path = "tests/features/route_projection.feature", index = 1)]
fn scenario_station_far_from_route(
    route: RefCell<Option<RoutePolyline>>,
    stations: RefCell<Vec<FuelStation>>,
    projected: RefCell<Vec<ProjectedStation>>,
) {
    let _ = (route, stations, projected);
}

#[scenario(path = "tests/features/route_projection.feature", index = 2)]
fn scenario_stations_ordered(
    route: RefCell<Option<RoutePolyline>>,
    stations: RefCell<Vec<FuelStation>>,
    projected: RefCell<Vec<ProjectedStation>>,
) {
    let _ = (route, stations, projected);
}
