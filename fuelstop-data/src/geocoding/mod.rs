//! Place-name resolution through Nominatim.
//!
//! [`NominatimGeocoder`] implements [`fuelstop_core::Geocoder`] against the
//! OpenStreetMap Nominatim search API, restricted to the configured
//! countries (the United States by default, where the price sheet applies).

mod nominatim;

pub use nominatim::{
    DEFAULT_COUNTRY_CODES, DEFAULT_GEOCODE_CACHE_CAPACITY, DEFAULT_GEOCODE_CACHE_TTL,
    DEFAULT_MIN_REQUEST_INTERVAL, DEFAULT_NOMINATIM_BASE_URL, NominatimGeocoder,
    NominatimGeocoderConfig,
};
