//! Input validation shared by the domain constructors.

use geo::Coord;
use thiserror::Error;

/// Errors raised when a request carries malformed input.
///
/// These are rejected before any computation starts and are never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInputError {
    /// Latitude or longitude was non-finite or outside its valid range.
    #[error("coordinate (lat {lat}, lon {lon}) is outside the valid range")]
    Coordinate {
        /// Offending latitude in degrees.
        lat: f64,
        /// Offending longitude in degrees.
        lon: f64,
    },
    /// Vehicle range was zero, negative or non-finite.
    #[error("range must be a positive, finite number of miles (got {0})")]
    Range(f64),
    /// The share of range available at departure was outside `(0, 1]`.
    #[error("initial range fraction must be within (0, 1] (got {0})")]
    RangeFraction(f64),
    /// Fuel efficiency was zero, negative or non-finite.
    #[error("fuel efficiency must be a positive, finite number of miles per gallon (got {0})")]
    Efficiency(f64),
    /// Tank capacity was zero, negative or non-finite.
    #[error("tank capacity must be a positive, finite number of gallons (got {0})")]
    TankCapacity(f64),
    /// A station price was zero, negative or non-finite.
    #[error("price for station {id} must be positive and finite (got {price})")]
    Price {
        /// Identifier of the offending station.
        id: u64,
        /// Offending price per gallon.
        price: f64,
    },
    /// The price of fuel already in the tank was zero, negative or non-finite.
    #[error("initial fuel price must be positive and finite (got {0})")]
    InitialPrice(f64),
    /// A route polyline contained no points.
    #[error("route must contain at least one point")]
    EmptyRoute,
    /// A route point carried a non-finite, negative or decreasing distance.
    #[error("route distance at point {index} is invalid ({distance_miles} miles)")]
    RouteDistance {
        /// Position of the offending point within the polyline.
        index: usize,
        /// Offending cumulative distance.
        distance_miles: f64,
    },
    /// A projected station sits outside the route it was projected onto.
    #[error("station {id} is positioned at mile {route_miles}, outside the route")]
    StationPosition {
        /// Identifier of the offending station.
        id: u64,
        /// Offending route position in miles.
        route_miles: f64,
    },
    /// The corridor width was negative or non-finite.
    #[error("corridor width must be a non-negative, finite number of miles (got {0})")]
    Corridor(f64),
}

/// Check that `coord` holds a finite latitude in `[-90, 90]` and a finite
/// longitude in `[-180, 180]`.
///
/// Coordinates follow the WGS84 convention used throughout the crate:
/// `x = longitude`, `y = latitude`.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use fuelstop_core::validate_coord;
///
/// assert!(validate_coord(Coord { x: -97.7, y: 30.3 }).is_ok());
/// assert!(validate_coord(Coord { x: 0.0, y: 91.0 }).is_err());
/// ```
pub fn validate_coord(coord: Coord<f64>) -> Result<Coord<f64>, InvalidInputError> {
    let lat_ok = coord.y.is_finite() && (-90.0..=90.0).contains(&coord.y);
    let lon_ok = coord.x.is_finite() && (-180.0..=180.0).contains(&coord.x);
    if lat_ok && lon_ok {
        Ok(coord)
    } else {
        Err(InvalidInputError::Coordinate {
            lat: coord.y,
            lon: coord.x,
        })
    }
}

/// Accept strictly positive, finite values.
pub(crate) fn is_positive_finite(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
