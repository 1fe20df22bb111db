//! Place-name resolution.

use geo::Coord;
use thiserror::Error;

/// Errors from [`Geocoder::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The query was empty after trimming whitespace.
    #[error("location query must not be empty")]
    EmptyQuery,
    /// The service found no match for the query.
    #[error("no location found for `{query}`")]
    NotFound {
        /// The query as submitted.
        query: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("geocoding request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL without credentials.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success status.
    #[error("geocoding service at {url} returned HTTP {status}: {message}")]
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
    #[error("failed to parse geocoding response: {message}")]
    Parse {
        /// Underlying error description.
        message: String,
    },
}

/// Resolve human-readable place names to coordinates.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use fuelstop_core::{GeocodeError, Geocoder};
///
/// struct Fixed;
///
/// impl Geocoder for Fixed {
///     fn resolve(&self, name: &str) -> Result<Coord<f64>, GeocodeError> {
///         match name {
///             "Austin, TX" => Ok(Coord { x: -97.74, y: 30.27 }),
///             other => Err(GeocodeError::NotFound { query: other.to_owned() }),
///         }
///     }
/// }
///
/// assert!(Fixed.resolve("Austin, TX").is_ok());
/// assert!(Fixed.resolve("Atlantis").is_err());
/// ```
pub trait Geocoder: Send + Sync {
    /// Return the coordinate for `name`.
    ///
    /// Implementations return [`GeocodeError::NotFound`] when the name
    /// cannot be resolved.
    fn resolve(&self, name: &str) -> Result<Coord<f64>, GeocodeError>;
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn resolve(&self, name: &str) -> Result<Coord<f64>, GeocodeError> {
        (**self).resolve(name)
    }
}

impl<T: Geocoder + ?Sized> Geocoder for Box<T> {
    fn resolve(&self, name: &str) -> Result<Coord<f64>, GeocodeError> {
        (**self).resolve(name)
    }
}
