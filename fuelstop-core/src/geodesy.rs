//! Distance helpers on the WGS84 sphere approximation.
//!
//! All distances are expressed in statute miles. Coordinates use
//! `x = longitude`, `y = latitude`.

use geo::Coord;

/// Mean earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Approximate length of one degree of latitude in miles.
pub const MILES_PER_DEGREE_LATITUDE: f64 = 69.0;

/// Tolerance applied when comparing distances along a route.
pub const EPSILON_MILES: f64 = 1e-6;

/// Great-circle distance between two coordinates in miles.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use fuelstop_core::geodesy::haversine_miles;
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// assert!(haversine_miles(origin, origin).abs() < 1e-9);
/// let one_degree = haversine_miles(origin, Coord { x: 0.0, y: 1.0 });
/// assert!((one_degree - 69.09).abs() < 0.01);
/// ```
#[must_use]
pub fn haversine_miles(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat_a = a.y.to_radians();
    let lat_b = b.y.to_radians();
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().clamp(0.0, 1.0).asin()
}

/// Miles spanned by one degree of longitude at `latitude`.
#[must_use]
pub fn miles_per_degree_longitude(latitude: f64) -> f64 {
    MILES_PER_DEGREE_LATITUDE * latitude.to_radians().cos()
}

/// Local planar frame centred on a reference coordinate.
///
/// Converts degrees to miles with an equirectangular approximation, which is
/// accurate for the short segments produced by routing services.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalFrame {
    origin: Coord<f64>,
    x_scale: f64,
    y_scale: f64,
}

impl LocalFrame {
    /// Frame centred on `origin`, scaled at `reference_latitude`.
    pub(crate) fn new(origin: Coord<f64>, reference_latitude: f64) -> Self {
        let y_scale = EARTH_RADIUS_MILES.to_radians();
        Self {
            origin,
            x_scale: y_scale * reference_latitude.to_radians().cos(),
            y_scale,
        }
    }

    /// Planar offset of `coord` from the origin in miles.
    pub(crate) fn to_plane(self, coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (coord.x - self.origin.x) * self.x_scale,
            y: (coord.y - self.origin.y) * self.y_scale,
        }
    }
}
