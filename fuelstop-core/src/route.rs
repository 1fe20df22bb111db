//! Route polylines annotated with cumulative mileage.

use geo::{Coord, Rect};

use crate::InvalidInputError;
use crate::geodesy::haversine_miles;
use crate::validation::validate_coord;

/// A coordinate on a route together with its distance from the route start.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fuelstop_core::RoutePoint;
///
/// let point = RoutePoint::new(Coord { x: -97.7, y: 30.3 }, 12.5);
/// assert_eq!(point.distance_miles, 12.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoutePoint {
    /// Position in WGS84 (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Cumulative distance from the route start in miles.
    pub distance_miles: f64,
}

impl RoutePoint {
    /// Pair a coordinate with its cumulative distance.
    pub fn new(location: Coord<f64>, distance_miles: f64) -> Self {
        Self {
            location,
            distance_miles,
        }
    }
}

/// Two consecutive points of a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSegment {
    /// Segment start.
    pub start: RoutePoint,
    /// Segment end.
    pub end: RoutePoint,
}

impl RouteSegment {
    /// Distance covered by the segment in miles.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end.distance_miles - self.start.distance_miles
    }
}

/// An ordered, non-empty sequence of route points.
///
/// Distances are finite, start at zero and never decrease. The route length
/// is the distance of the last point.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fuelstop_core::RoutePolyline;
///
/// # fn main() -> Result<(), fuelstop_core::InvalidInputError> {
/// let route = RoutePolyline::from_coordinates(vec![
///     Coord { x: 0.0, y: 0.0 },
///     Coord { x: 0.0, y: 1.0 },
/// ])?;
/// assert!((route.length_miles() - 69.09).abs() < 0.01);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RoutePolyline {
    points: Vec<RoutePoint>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    duration_secs: Option<f64>,
}

impl RoutePolyline {
    /// Validate and wrap points that already carry cumulative distances.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::EmptyRoute`] for an empty list,
    /// [`InvalidInputError::Coordinate`] for an out-of-range coordinate and
    /// [`InvalidInputError::RouteDistance`] when a distance is non-finite,
    /// the first distance is not zero, or distances decrease.
    pub fn new(points: Vec<RoutePoint>) -> Result<Self, InvalidInputError> {
        if points.is_empty() {
            return Err(InvalidInputError::EmptyRoute);
        }
        let mut previous = 0.0_f64;
        for (index, point) in points.iter().enumerate() {
            validate_coord(point.location)?;
            let distance = point.distance_miles;
            let first_ok = index != 0 || distance == 0.0;
            if !distance.is_finite() || !first_ok || distance < previous {
                return Err(InvalidInputError::RouteDistance {
                    index,
                    distance_miles: distance,
                });
            }
            previous = distance;
        }
        Ok(Self {
            points,
            duration_secs: None,
        })
    }

    /// Build a polyline from raw coordinates, accumulating haversine
    /// distances between consecutive points.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::EmptyRoute`] for an empty list and
    /// [`InvalidInputError::Coordinate`] for an out-of-range coordinate.
    pub fn from_coordinates<I>(coords: I) -> Result<Self, InvalidInputError>
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        let mut points: Vec<RoutePoint> = Vec::new();
        for coord in coords {
            let location = validate_coord(coord)?;
            let distance_miles = points
                .last()
                .map_or(0.0, |prev| prev.distance_miles + haversine_miles(prev.location, location));
            points.push(RoutePoint::new(location, distance_miles));
        }
        Self::new(points)
    }

    /// Attach the driving time reported by a routing service.
    ///
    /// Negative or non-finite values are discarded.
    ///
    /// ```
    /// use geo::Coord;
    /// use fuelstop_core::RoutePolyline;
    ///
    /// let route = RoutePolyline::from_coordinates([Coord { x: 0.0, y: 0.0 }])
    ///     .expect("valid route")
    ///     .with_duration_secs(90.0);
    /// assert_eq!(route.duration_secs(), Some(90.0));
    /// ```
    #[must_use]
    pub fn with_duration_secs(mut self, duration_secs: f64) -> Self {
        self.duration_secs =
            (duration_secs.is_finite() && duration_secs >= 0.0).then_some(duration_secs);
        self
    }

    /// Driving time in seconds, when the routing service reported one.
    #[must_use]
    pub fn duration_secs(&self) -> Option<f64> {
        self.duration_secs
    }

    /// Points in route order.
    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    /// Iterate over consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = RouteSegment> + '_ {
        self.points.windows(2).map(|pair| RouteSegment {
            start: pair[0],
            end: pair[1],
        })
    }

    /// First point of the route.
    pub fn start(&self) -> RoutePoint {
        self.points[0]
    }

    /// Last point of the route.
    pub fn finish(&self) -> RoutePoint {
        self.points[self.points.len() - 1]
    }

    /// Total route length in miles.
    #[must_use]
    pub fn length_miles(&self) -> f64 {
        self.finish().distance_miles
    }

    /// Smallest rectangle containing every route point.
    pub fn bounding_rect(&self) -> Rect<f64> {
        let first = self.start().location;
        let (min, max) = self.points.iter().fold((first, first), |(min, max), p| {
            (
                Coord {
                    x: min.x.min(p.location.x),
                    y: min.y.min(p.location.y),
                },
                Coord {
                    x: max.x.max(p.location.x),
                    y: max.y.max(p.location.y),
                },
            )
        });
        Rect::new(min, max)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RoutePolyline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        struct Raw {
            points: Vec<RoutePoint>,
            #[serde(default)]
            duration_secs: Option<f64>,
        }
        let raw = Raw::deserialize(deserializer)?;
        let route = Self::new(raw.points).map_err(serde::de::Error::custom)?;
        Ok(match raw.duration_secs {
            Some(secs) => route.with_duration_secs(secs),
            None => route,
        })
    }
}
