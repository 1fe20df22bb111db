//! Fuel stations and their positions along a route.

use std::cmp::Ordering;

use geo::Coord;
use rstar::{AABB, PointDistance, RTreeObject};

use crate::InvalidInputError;
use crate::validation::{is_positive_finite, validate_coord};

/// A retail fuel station with its current price per gallon.
///
/// # Examples
///
/// ```
/// use geo::Coord;
/// use fuelstop_core::FuelStation;
///
/// # fn main() -> Result<(), fuelstop_core::InvalidInputError> {
/// let station = FuelStation::new(7, "Loves", Coord { x: -97.7, y: 30.3 }, 3.19)?
///     .with_locality("Austin", "TX");
/// assert_eq!(station.state, "TX");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuelStation {
    /// Stable identifier (the price sheet's truckstop id).
    pub id: u64,
    /// Display name.
    pub name: String,
    /// City the station is located in.
    #[cfg_attr(feature = "serde", serde(default))]
    pub city: String,
    /// Two-letter state code.
    #[cfg_attr(feature = "serde", serde(default))]
    pub state: String,
    /// Position in WGS84 (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Retail price per gallon.
    pub price: f64,
}

impl FuelStation {
    /// Validate and construct a station without locality details.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Coordinate`] for an out-of-range location
    /// and [`InvalidInputError::Price`] for a non-positive or non-finite price.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        location: Coord<f64>,
        price: f64,
    ) -> Result<Self, InvalidInputError> {
        let station = Self {
            id,
            name: name.into(),
            city: String::new(),
            state: String::new(),
            location,
            price,
        };
        station.validate()?;
        Ok(station)
    }

    /// Attach city and state.
    #[must_use]
    pub fn with_locality(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.city = city.into();
        self.state = state.into();
        self
    }

    /// Re-check the location and price invariants.
    ///
    /// Stations may arrive through deserialisation or public field access,
    /// so consumers call this before trusting the values.
    ///
    /// # Errors
    ///
    /// See [`FuelStation::new`].
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        validate_coord(self.location)?;
        if !is_positive_finite(self.price) {
            return Err(InvalidInputError::Price {
                id: self.id,
                price: self.price,
            });
        }
        Ok(())
    }
}

impl RTreeObject for FuelStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.x, self.location.y])
    }
}

impl PointDistance for FuelStation {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.location.x - point[0];
        let dy = self.location.y - point[1];
        dx * dx + dy * dy
    }
}

/// A station positioned along a specific route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectedStation {
    /// The underlying station.
    pub station: FuelStation,
    /// Cumulative route distance of the station's projection, in miles.
    pub route_miles: f64,
    /// Perpendicular distance between the station and the route, in miles.
    pub offset_miles: f64,
}

impl ProjectedStation {
    /// Place `station` at `route_miles` with no lateral offset.
    pub fn on_route(station: FuelStation, route_miles: f64) -> Self {
        Self {
            station,
            route_miles,
            offset_miles: 0.0,
        }
    }

    /// Price per gallon at this stop.
    pub fn price(&self) -> f64 {
        self.station.price
    }

    /// Total order by route distance, then price, then identifier.
    ///
    /// This is the deterministic order in which stations are considered.
    pub fn cmp_along_route(&self, other: &Self) -> Ordering {
        self.route_miles
            .total_cmp(&other.route_miles)
            .then_with(|| self.station.price.total_cmp(&other.station.price))
            .then_with(|| self.station.id.cmp(&other.station.id))
    }
}
