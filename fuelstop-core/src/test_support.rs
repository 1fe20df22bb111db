//! Deterministic collaborators and route builders shared by unit and
//! behaviour tests.

use std::collections::HashMap;

use geo::Coord;

use crate::geodesy::EARTH_RADIUS_MILES;
use crate::{
    FuelStation, GeocodeError, Geocoder, ProjectedStation, RoutePoint, RoutePolyline,
    RouteProvider, RouteProviderError,
};

/// Miles spanned by one degree of longitude on the equator.
fn miles_per_equator_degree() -> f64 {
    EARTH_RADIUS_MILES.to_radians()
}

/// Coordinate on the equator `miles` east of the prime meridian.
pub fn equator_coord(miles: f64) -> Coord<f64> {
    Coord {
        x: miles / miles_per_equator_degree(),
        y: 0.0,
    }
}

/// A route along the equator of exactly `length_miles`, with a point every
/// `step_miles`.
///
/// Cumulative distances are exact, which keeps optimiser assertions free of
/// geodesic rounding.
///
/// # Panics
///
/// Panics when `step_miles` is not positive or the route would wrap past the
/// antimeridian.
pub fn equator_route(length_miles: f64, step_miles: f64) -> RoutePolyline {
    assert!(step_miles > 0.0, "step must be positive");
    let mut points = vec![RoutePoint::new(equator_coord(0.0), 0.0)];
    let mut miles = 0.0;
    while miles < length_miles {
        miles = (miles + step_miles).min(length_miles);
        points.push(RoutePoint::new(equator_coord(miles), miles));
    }
    RoutePolyline::new(points).expect("equator route must be valid")
}

/// A station already placed at `mile` on an equator route.
///
/// # Panics
///
/// Panics when `price` is not positive and finite.
pub fn station_at_mile(id: u64, mile: f64, price: f64) -> ProjectedStation {
    let station = FuelStation::new(id, format!("Station {id}"), equator_coord(mile), price)
        .expect("test station must be valid");
    ProjectedStation::on_route(station, mile)
}

/// Geocoder answering from a fixed table of names.
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    places: HashMap<String, Coord<f64>>,
}

impl StaticGeocoder {
    /// Register `name` at `coord`.
    #[must_use]
    pub fn with_place(mut self, name: impl Into<String>, coord: Coord<f64>) -> Self {
        self.places.insert(name.into(), coord);
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn resolve(&self, name: &str) -> Result<Coord<f64>, GeocodeError> {
        let query = name.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        self.places
            .get(query)
            .copied()
            .ok_or_else(|| GeocodeError::NotFound {
                query: query.to_owned(),
            })
    }
}

/// Route provider returning the straight line between the endpoints,
/// densified so that no segment exceeds `max_segment_miles`.
#[derive(Debug, Clone, Copy)]
pub struct StraightLineRouteProvider {
    max_segment_miles: f64,
    speed_mph: Option<f64>,
}

impl Default for StraightLineRouteProvider {
    fn default() -> Self {
        Self {
            max_segment_miles: 25.0,
            speed_mph: None,
        }
    }
}

impl StraightLineRouteProvider {
    /// Report a driving time as if the whole route were covered at
    /// `speed_mph`.
    #[must_use]
    pub fn with_speed_mph(mut self, speed_mph: f64) -> Self {
        self.speed_mph = Some(speed_mph);
        self
    }
}

impl RouteProvider for StraightLineRouteProvider {
    fn route(
        &self,
        start: Coord<f64>,
        finish: Coord<f64>,
    ) -> Result<RoutePolyline, RouteProviderError> {
        let direct = crate::geodesy::haversine_miles(start, finish);
        let steps = (direct / self.max_segment_miles).ceil().max(1.0) as usize;
        let coords = (0..=steps).map(|i| {
            let t = i as f64 / steps as f64;
            Coord {
                x: start.x + (finish.x - start.x) * t,
                y: start.y + (finish.y - start.y) * t,
            }
        });
        let route = RoutePolyline::from_coordinates(coords)?;
        Ok(match self.speed_mph {
            Some(speed) => {
                let hours = route.length_miles() / speed;
                route.with_duration_secs(hours * 3600.0)
            }
            None => route,
        })
    }
}

/// Route provider that always fails with the configured error.
#[derive(Debug, Clone)]
pub struct FailingRouteProvider {
    error: RouteProviderError,
}

impl FailingRouteProvider {
    /// Fail every request with `error`.
    pub fn new(error: RouteProviderError) -> Self {
        Self { error }
    }
}

impl RouteProvider for FailingRouteProvider {
    fn route(
        &self,
        _start: Coord<f64>,
        _finish: Coord<f64>,
    ) -> Result<RoutePolyline, RouteProviderError> {
        Err(self.error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn equator_route_has_exact_length() {
        let route = equator_route(1000.0, 30.0);
        assert_eq!(route.length_miles(), 1000.0);
        assert!(route.segments().all(|s| s.length() <= 30.0));
    }

    #[rstest]
    fn static_geocoder_trims_and_reports_missing() {
        let geocoder = StaticGeocoder::default().with_place("Austin", Coord { x: -97.7, y: 30.3 });
        assert!(geocoder.resolve("  Austin ").is_ok());
        assert_eq!(
            geocoder.resolve("Nowhere"),
            Err(GeocodeError::NotFound {
                query: "Nowhere".into()
            })
        );
        assert_eq!(geocoder.resolve("   "), Err(GeocodeError::EmptyQuery));
    }

    #[rstest]
    fn straight_line_route_connects_endpoints() {
        let start = Coord { x: -97.7, y: 30.3 };
        let finish = Coord { x: -96.8, y: 32.8 };
        let route = StraightLineRouteProvider::default()
            .route(start, finish)
            .expect("route");
        assert_eq!(route.start().location, start);
        assert_eq!(route.finish().location, finish);
        assert!(route.points().len() > 2);
    }
}
