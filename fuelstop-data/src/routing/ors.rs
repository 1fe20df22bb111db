//! OpenRouteService directions response types.
//!
//! The GET directions endpoint answers with a GeoJSON `FeatureCollection`
//! whose first feature carries the route as a `LineString` of
//! `[longitude, latitude]` pairs. Failures use a JSON body of the form
//! `{"error": {"code": 2010, "message": "..."}}`, although gateway errors
//! (quota, authentication) send a bare string instead.
//!
//! See: <https://openrouteservice.org/dev/#/api-docs/v2/directions>

use fuelstop_core::{RoutePolyline, RouteProviderError};
use geo::Coord;
use serde::Deserialize;

/// Route could not be found between the requested points.
const ROUTE_NOT_FOUND: i64 = 2009;
/// A requested point could not be snapped to the road network.
const POINT_NOT_FOUND: i64 = 2010;

/// Longest body excerpt carried in an HTTP error message.
const MAX_BODY_EXCERPT: usize = 200;

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    #[serde(default)]
    pub(crate) features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    pub(crate) geometry: Geometry,
    #[serde(default)]
    pub(crate) properties: Option<Properties>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Geometry {
    #[serde(rename = "type")]
    pub(crate) kind: String,
    /// Positions may carry a third (elevation) value, which is ignored.
    pub(crate) coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Properties {
    #[serde(default)]
    pub(crate) summary: Option<Summary>,
}

/// Route totals in the service's units (metres and seconds by default).
#[derive(Debug, Deserialize)]
pub(crate) struct Summary {
    #[serde(default)]
    pub(crate) distance: Option<f64>,
    #[serde(default)]
    pub(crate) duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Coded { code: i64, message: String },
    Text(String),
}

/// Turn a successful directions response into a route polyline.
///
/// Cumulative distances come from the geometry itself, so they agree with
/// the distances used for station projection.
pub(crate) fn route_from_response(
    response: DirectionsResponse,
) -> Result<RoutePolyline, RouteProviderError> {
    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or(RouteProviderError::NoRoute)?;
    if feature.geometry.kind != "LineString" {
        return Err(RouteProviderError::Parse {
            message: format!(
                "expected LineString geometry, found {}",
                feature.geometry.kind
            ),
        });
    }
    let summary = feature.properties.and_then(|p| p.summary);
    if let Some(summary) = &summary {
        log::debug!(
            "route summary: {:?} m over {:?} s",
            summary.distance,
            summary.duration
        );
    }
    let coords = feature
        .geometry
        .coordinates
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Ok(Coord { x: *lon, y: *lat }),
            _ => Err(RouteProviderError::Parse {
                message: format!("route position has {} values", position.len()),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let route = RoutePolyline::from_coordinates(coords)?;
    Ok(match summary.and_then(|s| s.duration) {
        Some(secs) => route.with_duration_secs(secs),
        None => route,
    })
}

/// Interpret the body of a non-success response.
pub(crate) fn error_from_body(url: &str, status: u16, body: &str) -> RouteProviderError {
    match serde_json::from_str::<ErrorResponse>(body).map(|parsed| parsed.error) {
        Ok(ErrorDetail::Coded { code, .. })
            if matches!(code, ROUTE_NOT_FOUND | POINT_NOT_FOUND) =>
        {
            RouteProviderError::NoRoute
        }
        Ok(ErrorDetail::Coded { code, message }) => RouteProviderError::Service { code, message },
        Ok(ErrorDetail::Text(message)) => RouteProviderError::Http {
            url: url.to_owned(),
            status,
            message,
        },
        Err(_) => RouteProviderError::Http {
            url: url.to_owned(),
            status,
            message: body.trim().chars().take(MAX_BODY_EXCERPT).collect(),
        },
    }
}
