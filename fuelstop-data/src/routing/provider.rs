//! [`RouteProvider`] backed by the OpenRouteService directions API.

use std::time::Duration;

use fuelstop_core::{RoutePolyline, RouteProvider, RouteProviderError};
use geo::Coord;
use reqwest::header::{ACCEPT, AUTHORIZATION};

use super::ors::{self, DirectionsResponse};
use crate::cache::ExpiringCache;
use crate::http::{
    BlockingClient, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError, join_url,
};

/// Public OpenRouteService endpoint.
pub const DEFAULT_ORS_BASE_URL: &str = "https://api.openrouteservice.org";

/// Routing profile used unless configured otherwise.
pub const DEFAULT_PROFILE: &str = "driving-car";

/// How long a fetched route is served from the cache.
pub const DEFAULT_ROUTE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Most routes held in the cache at once.
pub const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 1024;

/// Coordinates are rounded to this many units per degree for cache keys,
/// roughly one metre.
const CACHE_KEY_SCALE: f64 = 1e5;

/// Configuration for [`OrsRouteProvider`].
#[derive(Debug, Clone)]
pub struct OrsRouteProviderConfig {
    /// Base URL of the service, without the `/v2` path.
    pub base_url: String,
    /// API key sent in the `Authorization` header, if any.
    pub api_key: Option<String>,
    /// Routing profile, e.g. `"driving-car"` or `"driving-hgv"`.
    pub profile: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// How long a route stays cached.
    pub cache_ttl: Duration,
    /// Most routes cached at once; zero disables caching.
    pub cache_capacity: usize,
}

impl Default for OrsRouteProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ORS_BASE_URL.to_owned(),
            api_key: None,
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            cache_ttl: DEFAULT_ROUTE_CACHE_TTL,
            cache_capacity: DEFAULT_ROUTE_CACHE_CAPACITY,
        }
    }
}

impl OrsRouteProviderConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set how long routes stay cached and how many are kept.
    #[must_use]
    pub fn with_cache(mut self, ttl: Duration, capacity: usize) -> Self {
        self.cache_ttl = ttl;
        self.cache_capacity = capacity;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RouteKey([i64; 4]);

impl RouteKey {
    fn new(start: Coord<f64>, finish: Coord<f64>) -> Self {
        let scale = |value: f64| (value * CACHE_KEY_SCALE).round() as i64;
        Self([scale(start.x), scale(start.y), scale(finish.x), scale(finish.y)])
    }
}

/// Driving routes from OpenRouteService.
///
/// Routes are cached in memory, keyed by the endpoints rounded to about a
/// metre, so repeated plans between the same places issue a single request.
/// Entries expire after [`OrsRouteProviderConfig::cache_ttl`] and the oldest
/// are evicted beyond [`OrsRouteProviderConfig::cache_capacity`].
///
/// # Example
///
/// ```no_run
/// use fuelstop_core::RouteProvider;
/// use fuelstop_data::routing::{OrsRouteProvider, OrsRouteProviderConfig};
/// use geo::Coord;
///
/// let config = OrsRouteProviderConfig::default().with_api_key("secret");
/// let provider = OrsRouteProvider::with_config(config)?;
/// let route = provider.route(
///     Coord { x: -97.7431, y: 30.2672 },
///     Coord { x: -104.9903, y: 39.7392 },
/// )?;
/// println!("{:.0} miles", route.length_miles());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct OrsRouteProvider {
    http: BlockingClient,
    config: OrsRouteProviderConfig,
    cache: ExpiringCache<RouteKey, RoutePolyline>,
}

impl OrsRouteProvider {
    /// Create a provider for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OrsRouteProviderConfig::new(base_url))
    }

    /// Create a provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OrsRouteProviderConfig) -> Result<Self, ProviderBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            http,
            cache: ExpiringCache::new(config.cache_ttl, config.cache_capacity),
            config,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OrsRouteProviderConfig {
        &self.config
    }

    /// Number of cached routes.
    #[must_use]
    pub fn cached_routes(&self) -> usize {
        self.cache.len()
    }

    /// Build the directions URL: `{base}/v2/directions/{profile}?start=lon,lat&end=lon,lat`.
    ///
    /// The API key travels in a header so the URL is safe to log.
    fn directions_url(&self, start: Coord<f64>, finish: Coord<f64>) -> String {
        let path = format!("v2/directions/{}", self.config.profile);
        format!(
            "{}?start={},{}&end={},{}",
            join_url(&self.config.base_url, &path),
            start.x,
            start.y,
            finish.x,
            finish.y
        )
    }

    async fn fetch_route(
        &self,
        start: Coord<f64>,
        finish: Coord<f64>,
    ) -> Result<RoutePolyline, RouteProviderError> {
        let url = self.directions_url(start, finish);
        let mut request = self
            .http
            .client()
            .get(&url)
            .header(ACCEPT, "application/geo+json, application/json");
        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, key.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.http.classify(&err, &url))?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|err| self.http.classify(&err, &url))?;
            return Err(ors::error_from_body(&url, status.as_u16(), &body));
        }

        let directions: DirectionsResponse =
            response
                .json()
                .await
                .map_err(|err| RouteProviderError::Parse {
                    message: err.to_string(),
                })?;
        ors::route_from_response(directions)
    }
}

impl RouteProvider for OrsRouteProvider {
    /// Fetch the driving route between two points.
    ///
    /// # Runtime requirements
    ///
    /// Inside an existing Tokio runtime the runtime must be multi-threaded;
    /// see [`OrsRouteProvider`] for the blocking behaviour.
    fn route(
        &self,
        start: Coord<f64>,
        finish: Coord<f64>,
    ) -> Result<RoutePolyline, RouteProviderError> {
        let key = RouteKey::new(start, finish);
        if let Some(route) = self.cache.get(&key) {
            log::debug!("route served from cache");
            return Ok(route);
        }

        let route = self.http.block_on(self.fetch_route(start, finish))?;
        log::info!(
            "fetched {:.1} mile route with {} points",
            route.length_miles(),
            route.points().len()
        );
        self.cache.insert(key, route.clone());
        Ok(route)
    }
}
