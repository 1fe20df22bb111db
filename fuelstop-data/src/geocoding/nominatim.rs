//! [`Geocoder`] backed by the Nominatim search API.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use fuelstop_core::{GeocodeError, Geocoder, validate_coord};
use geo::Coord;
use serde::Deserialize;

use crate::cache::ExpiringCache;
use crate::http::{
    BlockingClient, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError, join_url,
};

/// Public Nominatim endpoint.
pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Comma-separated ISO 3166-1 codes that results are limited to.
pub const DEFAULT_COUNTRY_CODES: &str = "us";

/// How long a resolved place is served from the cache.
pub const DEFAULT_GEOCODE_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Most places held in the cache at once.
pub const DEFAULT_GEOCODE_CACHE_CAPACITY: usize = 8192;

/// Shortest gap between two requests; the public service allows one per
/// second.
pub const DEFAULT_MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone)]
pub struct NominatimGeocoderConfig {
    /// Base URL of the service.
    pub base_url: String,
    /// Country filter passed as `countrycodes`.
    pub country_codes: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// How long a resolved place stays cached.
    pub cache_ttl: Duration,
    /// Most places cached at once; zero disables caching.
    pub cache_capacity: usize,
    /// Shortest gap between two requests.
    pub min_request_interval: Duration,
}

impl Default for NominatimGeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_BASE_URL.to_owned(),
            country_codes: DEFAULT_COUNTRY_CODES.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            cache_ttl: DEFAULT_GEOCODE_CACHE_TTL,
            cache_capacity: DEFAULT_GEOCODE_CACHE_CAPACITY,
            min_request_interval: DEFAULT_MIN_REQUEST_INTERVAL,
        }
    }
}

impl NominatimGeocoderConfig {
    /// Create a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Limit results to the given countries.
    #[must_use]
    pub fn with_country_codes(mut self, country_codes: impl Into<String>) -> Self {
        self.country_codes = country_codes.into();
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

    /// Set the shortest gap between two requests.
    #[must_use]
    pub fn with_min_request_interval(mut self, interval: Duration) -> Self {
        self.min_request_interval = interval;
        self
    }

    /// Set how long places stay cached and how many are kept.
    #[must_use]
    pub fn with_cache(mut self, ttl: Duration, capacity: usize) -> Self {
        self.cache_ttl = ttl;
        self.cache_capacity = capacity;
        self
    }
}

/// One entry of a Nominatim `format=json` result; coordinates arrive as
/// strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

/// Geocoder answering from Nominatim with an in-memory cache.
///
/// Queries are trimmed before lookup and caching, so `" Denver "` and
/// `"Denver"` share a cache entry. Only successful resolutions are cached,
/// and entries expire after [`NominatimGeocoderConfig::cache_ttl`].
#[derive(Debug)]
pub struct NominatimGeocoder {
    http: BlockingClient,
    config: NominatimGeocoderConfig,
    cache: ExpiringCache<String, Coord<f64>>,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    /// Create a geocoder for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(NominatimGeocoderConfig::new(base_url))
    }

    /// Create a geocoder with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: NominatimGeocoderConfig) -> Result<Self, ProviderBuildError> {
        let http = BlockingClient::new(&config.user_agent, config.timeout)?;
        Ok(Self {
            http,
            cache: ExpiringCache::new(config.cache_ttl, config.cache_capacity),
            last_request: Mutex::new(None),
            config,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &NominatimGeocoderConfig {
        &self.config
    }

    /// Wait until `min_request_interval` has passed since the previous
    /// request. The lock is held while sleeping so concurrent callers queue.
    fn throttle(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last {
            let wait = self
                .config
                .min_request_interval
                .saturating_sub(previous.elapsed());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        *last = Some(Instant::now());
    }

    fn search_url(&self) -> String {
        join_url(&self.config.base_url, "search")
    }

    async fn fetch(&self, query: &str) -> Result<Coord<f64>, GeocodeError> {
        let url = self.search_url();
        let response = self
            .http
            .client()
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", self.config.country_codes.as_str()),
            ])
            .send()
            .await
            .map_err(|err| self.http.classify(&err, &url))?
            .error_for_status()
            .map_err(|err| self.http.classify(&err, &url))?;

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|err| GeocodeError::Parse {
                message: err.to_string(),
            })?;
        coord_from_places(query, places)
    }
}

impl Geocoder for NominatimGeocoder {
    fn resolve(&self, name: &str) -> Result<Coord<f64>, GeocodeError> {
        let query = name.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }
        if let Some(coord) = self.cache.get(query) {
            log::debug!("coordinates for `{query}` served from cache");
            return Ok(coord);
        }

        self.throttle();
        let coord = self.http.block_on(self.fetch(query))?;
        log::info!("geocoded `{query}` to ({}, {})", coord.y, coord.x);
        self.cache.insert(query.to_owned(), coord);
        Ok(coord)
    }
}

fn coord_from_places(query: &str, places: Vec<Place>) -> Result<Coord<f64>, GeocodeError> {
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| GeocodeError::NotFound {
            query: query.to_owned(),
        })?;
    let parse = |field: &str, value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|err| GeocodeError::Parse {
                message: format!("invalid {field} `{value}`: {err}"),
            })
    };
    let coord = Coord {
        x: parse("longitude", &place.lon)?,
        y: parse("latitude", &place.lat)?,
    };
    if let Some(name) = &place.display_name {
        log::debug!("`{query}` matched {name}");
    }
    validate_coord(coord).map_err(|err| GeocodeError::Parse {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn places(json: &str) -> Vec<Place> {
        serde_json::from_str(json).expect("should deserialise")
    }

    #[fixture]
    fn geocoder() -> NominatimGeocoder {
        NominatimGeocoder::new("http://nominatim.example.com/").expect("geocoder should build")
    }

    #[rstest]
    fn converts_first_place() {
        let parsed = places(
            r#"[
                {"lat": "39.7392364", "lon": "-104.984862", "display_name": "Denver, Colorado"},
                {"lat": "0", "lon": "0"}
            ]"#,
        );

        let coord = coord_from_places("Denver", parsed).expect("should resolve");

        assert_eq!(
            coord,
            Coord {
                x: -104.984862,
                y: 39.7392364
            }
        );
    }

    #[rstest]
    fn empty_result_is_not_found() {
        let err = coord_from_places("Atlantis", places("[]")).expect_err("nothing matched");
        assert_eq!(
            err,
            GeocodeError::NotFound {
                query: "Atlantis".into()
            }
        );
    }

    #[rstest]
    #[case(r#"[{"lat": "north", "lon": "-104.9"}]"#)]
    #[case(r#"[{"lat": "91.0", "lon": "-104.9"}]"#)]
    fn malformed_coordinates_are_parse_errors(#[case] json: &str) {
        let err = coord_from_places("Denver", places(json)).expect_err("bad coordinates");
        assert!(matches!(err, GeocodeError::Parse { .. }));
    }

    #[rstest]
    fn search_url_strips_trailing_slash(geocoder: NominatimGeocoder) {
        assert_eq!(geocoder.search_url(), "http://nominatim.example.com/search");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_queries_are_rejected_without_a_request(
        geocoder: NominatimGeocoder,
        #[case] query: &str,
    ) {
        assert_eq!(geocoder.resolve(query), Err(GeocodeError::EmptyQuery));
    }

    #[rstest]
    fn cached_queries_are_trimmed(geocoder: NominatimGeocoder) {
        let denver = Coord {
            x: -104.99,
            y: 39.74,
        };
        geocoder.cache.insert("Denver".into(), denver);

        assert_eq!(geocoder.resolve("  Denver "), Ok(denver));
    }

    #[rstest]
    fn expired_places_are_looked_up_again() {
        let config = NominatimGeocoderConfig::new("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .with_cache(Duration::ZERO, 8);
        let geocoder = NominatimGeocoder::with_config(config).expect("geocoder should build");
        geocoder.cache.insert("Denver".into(), Coord { x: -104.99, y: 39.74 });

        let err = geocoder.resolve("Denver").expect_err("stale entry must refetch");

        assert!(matches!(
            err,
            GeocodeError::Network { .. } | GeocodeError::Timeout { .. }
        ));
    }

    #[rstest]
    fn consecutive_requests_are_spaced() {
        let config = NominatimGeocoderConfig::new("http://127.0.0.1:9")
            .with_min_request_interval(Duration::from_millis(200));
        let geocoder = NominatimGeocoder::with_config(config).expect("geocoder should build");

        let started = Instant::now();
        geocoder.throttle();
        geocoder.throttle();

        assert!(started.elapsed() >= Duration::from_millis(200));
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = NominatimGeocoderConfig::default()
            .with_country_codes("us,ca")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("fuelstop-tests/1.0");

        assert_eq!(config.base_url, DEFAULT_NOMINATIM_BASE_URL);
        assert_eq!(config.country_codes, "us,ca");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "fuelstop-tests/1.0");
        assert_eq!(config.cache_ttl, DEFAULT_GEOCODE_CACHE_TTL);
        assert_eq!(config.min_request_interval, DEFAULT_MIN_REQUEST_INTERVAL);
    }
}
