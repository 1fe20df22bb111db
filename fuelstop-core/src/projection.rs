//! Project stations onto a route to obtain their along-route mileage.

use geo::{Coord, Rect};

use crate::geodesy::{
    LocalFrame, MILES_PER_DEGREE_LATITUDE, haversine_miles, miles_per_degree_longitude,
};
use crate::{FuelStation, InvalidInputError, ProjectedStation, RoutePolyline, RouteSegment};

/// Default maximum distance between a station and the route, in miles.
pub const DEFAULT_CORRIDOR_MILES: f64 = 2.0;

/// Places stations along a route.
///
/// Each station is matched to its nearest route segment. The cumulative
/// distance is interpolated along that segment, so the projected mileage is
/// monotone along the polyline. Stations farther than `corridor_miles` from
/// the route are discarded.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use fuelstop_core::{FuelStation, RoutePolyline, RouteProjector};
///
/// # fn main() -> Result<(), fuelstop_core::InvalidInputError> {
/// let route = RoutePolyline::from_coordinates(vec![
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 2.0, y: 0.0 },
/// ])?;
/// let station = FuelStation::new(1, "Midway", Coord { x: 1.0, y: 0.01 }, 3.0)?;
/// let projected = RouteProjector::default().project(&route, &station);
/// let projected = projected.expect("station is inside the corridor");
/// assert!((projected.route_miles - route.length_miles() / 2.0).abs() < 0.1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteProjector {
    corridor_miles: f64,
}

impl Default for RouteProjector {
    fn default() -> Self {
        Self {
            corridor_miles: DEFAULT_CORRIDOR_MILES,
        }
    }
}

impl RouteProjector {
    /// Build a projector with a custom corridor width.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Corridor`] when the width is negative or
    /// non-finite.
    pub fn new(corridor_miles: f64) -> Result<Self, InvalidInputError> {
        if !corridor_miles.is_finite() || corridor_miles < 0.0 {
            return Err(InvalidInputError::Corridor(corridor_miles));
        }
        Ok(Self { corridor_miles })
    }

    /// Corridor width in miles.
    pub fn corridor_miles(&self) -> f64 {
        self.corridor_miles
    }

    /// Project one station, returning `None` when it lies outside the
    /// corridor.
    pub fn project(&self, route: &RoutePolyline, station: &FuelStation) -> Option<ProjectedStation> {
        let (route_miles, offset_miles) = nearest_position(route, station.location);
        (offset_miles <= self.corridor_miles).then(|| ProjectedStation {
            station: station.clone(),
            route_miles,
            offset_miles,
        })
    }

    /// Project every station and return those inside the corridor, ordered
    /// by route distance, price and identifier.
    pub fn project_all<'a, I>(&self, route: &RoutePolyline, stations: I) -> Vec<ProjectedStation>
    where
        I: IntoIterator<Item = &'a FuelStation>,
    {
        let mut projected: Vec<ProjectedStation> = stations
            .into_iter()
            .filter_map(|station| self.project(route, station))
            .collect();
        projected.sort_by(ProjectedStation::cmp_along_route);
        log::debug!(
            "projected {} stations within {} miles of a {:.1} mile route",
            projected.len(),
            self.corridor_miles,
            route.length_miles()
        );
        projected
    }

    /// Bounding rectangle of the route widened by the corridor.
    ///
    /// Used to prefilter a spatial index before projecting. Longitudinal
    /// padding is computed at the latitude farthest from the equator so the
    /// rectangle never undershoots the corridor.
    pub fn corridor_bounds(&self, route: &RoutePolyline) -> Rect<f64> {
        let rect = route.bounding_rect();
        let (min, max) = (rect.min(), rect.max());
        let lat_pad = self.corridor_miles / MILES_PER_DEGREE_LATITUDE;
        let min_y = (min.y - lat_pad).max(-90.0);
        let max_y = (max.y + lat_pad).min(90.0);
        let widest = min_y.abs().max(max_y.abs());
        let lon_scale = miles_per_degree_longitude(widest);
        let (min_x, max_x) = if lon_scale > f64::EPSILON {
            let lon_pad = self.corridor_miles / lon_scale;
            ((min.x - lon_pad).max(-180.0), (max.x + lon_pad).min(180.0))
        } else {
            (-180.0, 180.0)
        };
        Rect::new(Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y })
    }
}

/// Cumulative distance and perpendicular offset of the nearest point on the
/// route. Ties keep the earliest segment.
fn nearest_position(route: &RoutePolyline, location: Coord<f64>) -> (f64, f64) {
    let start = route.start();
    let mut best = (start.distance_miles, haversine_miles(start.location, location));
    for segment in route.segments() {
        let candidate = project_onto_segment(&segment, location);
        if candidate.1 < best.1 {
            best = candidate;
        }
    }
    best
}

fn project_onto_segment(segment: &RouteSegment, location: Coord<f64>) -> (f64, f64) {
    let reference_latitude = (segment.start.location.y + segment.end.location.y) / 2.0;
    let frame = LocalFrame::new(segment.start.location, reference_latitude);
    let end = frame.to_plane(segment.end.location);
    let point = frame.to_plane(location);
    let length_sq = end.x * end.x + end.y * end.y;
    let t = if length_sq > 0.0 {
        ((point.x * end.x + point.y * end.y) / length_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let offset = (point.x - t * end.x).hypot(point.y - t * end.y);
    (segment.start.distance_miles + t * segment.length(), offset)
}
