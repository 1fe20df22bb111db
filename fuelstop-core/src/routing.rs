//! Driving-route retrieval.

use geo::Coord;
use thiserror::Error;

use crate::{InvalidInputError, RoutePolyline};

/// Errors from [`RouteProvider::route`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteProviderError {
    /// No drivable path connects the endpoints.
    #[error("no drivable route between the requested endpoints")]
    NoRoute,
    /// The routing service rejected the request.
    #[error("routing service error {code}: {message}")]
    Service {
        /// Service-specific error code.
        code: i64,
        /// Service-provided description.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("routing request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL without credentials.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("routing service at {url} returned HTTP {status}: {message}")]
    Http {
        /// Request URL without credentials.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Reason phrase or body excerpt.
        message: String,
    },
    /// The request failed before a response was received.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL without credentials.
        url: String,
        /// Underlying error description.
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("failed to parse routing response: {message}")]
    Parse {
        /// Underlying error description.
        message: String,
    },
    /// The returned geometry did not form a valid route.
    #[error("routing service returned an invalid route: {0}")]
    InvalidGeometry(#[from] InvalidInputError),
}

/// Compute a driving route between two coordinates.
pub trait RouteProvider: Send + Sync {
    /// Return the route from `start` to `finish`.
    ///
    /// Implementations return [`RouteProviderError::NoRoute`] when the
    /// endpoints are not connected by road.
    fn route(
        &self,
        start: Coord<f64>,
        finish: Coord<f64>,
    ) -> Result<RoutePolyline, RouteProviderError>;
}

impl<T: RouteProvider + ?Sized> RouteProvider for &T {
    fn route(
        &self,
        start: Coord<f64>,
        finish: Coord<f64>,
    ) -> Result<RoutePolyline, RouteProviderError> {
        (**self).route(start, finish)
    }
}

impl<T: RouteProvider + ?Sized> RouteProvider for Box<T> {
    fn route(
        &self,
        start: Coord<f64>,
        finish: Coord<f64>,
    ) -> Result<RoutePolyline, RouteProviderError> {
        (**self).route(start, finish)
    }
}
