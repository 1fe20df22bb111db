//! Data access and ingestion for the fuel stop engine.
//!
//! Responsibilities:
//! - Condense retail price sheets into a SQLite station database.
//! - Load the database into a refreshable in-memory catalog.
//! - Provide HTTP adapters for geocoding (Nominatim) and routing
//!   (openrouteservice).
//!
//! Boundaries:
//! - Do not encode optimisation rules (live in `fuelstop-optimizer`).
//! - The HTTP adapters expose blocking trait methods and drive their async
//!   clients on an owned runtime, or on the caller's multi-threaded runtime
//!   when one is present.
//!
//! Invariants:
//! - Every station handed to `fuelstop-core` has passed validation.
//! - No global mutable state; caches live inside their adapter and expire.

#![forbid(unsafe_code)]

mod cache;
pub mod catalog;
pub mod geocoding;
mod http;
pub mod routing;

pub use http::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, ProviderBuildError};
