//! SQLite persistence for the station catalog.

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use fuelstop_core::{
    FuelStation, InvalidInputError, SharedCatalog, StationCatalog, StationSnapshot,
};
use geo::Coord;
use rusqlite::{Connection, Error as SqliteError, OpenFlags, Transaction};
use thiserror::Error;

use super::StationRecord;

/// Errors raised when writing or reading the station database.
#[derive(Debug, Error)]
pub enum SqliteCatalogError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the write transaction failed.
    #[error("failed to begin station transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating or clearing the `stations` table failed.
    #[error("failed to prepare stations table")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing the insert statement failed.
    #[error("failed to prepare station insert statement")]
    PrepareInsert {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A station identifier does not fit an SQLite integer.
    #[error("station id {id} exceeds SQLite i64 range")]
    IdOutOfRange {
        /// Identifier that failed the conversion.
        id: u64,
    },
    /// A supply rack identifier does not fit an SQLite integer.
    #[error("rack id {rack_id} of station {id} exceeds SQLite i64 range")]
    RackIdOutOfRange {
        /// Station carrying the rack identifier.
        id: u64,
        /// Rack identifier that failed the conversion.
        rack_id: u64,
    },
    /// Writing a station row failed.
    #[error("failed to persist station {id}")]
    PersistRow {
        /// Identifier of the station being written.
        id: u64,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit station transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Reading station rows failed.
    #[error("failed to read stations from {path:?}")]
    Query {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A stored row carries a negative identifier.
    #[error("stored station id {id} is negative")]
    NegativeId {
        /// Identifier as stored.
        id: i64,
    },
    /// A stored row fails station validation.
    #[error("stored station {id} is invalid")]
    InvalidStation {
        /// Identifier of the offending row.
        id: u64,
        /// Validation failure.
        #[source]
        source: InvalidInputError,
    },
}

/// Replace the contents of the station database at `path` with `records`.
///
/// Parent directories are created automatically and the `stations` table is
/// created if missing. Existing rows are removed in the same transaction, so
/// readers never observe a half-written catalog.
///
/// # Errors
///
/// Returns [`SqliteCatalogError`] describing the step that failed.
pub fn write_station_database(
    path: &Utf8Path,
    records: &[StationRecord],
) -> Result<(), SqliteCatalogError> {
    fuelstop_fs::ensure_parent_dir(path).map_err(|source| SqliteCatalogError::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| SqliteCatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    let transaction = connection
        .transaction()
        .map_err(|source| SqliteCatalogError::BeginTransaction { source })?;

    reset_schema(&transaction)?;
    persist_rows(&transaction, records)?;

    transaction
        .commit()
        .map_err(|source| SqliteCatalogError::Commit { source })?;
    log::info!("wrote {} stations to {path}", records.len());
    Ok(())
}

fn reset_schema(transaction: &Transaction<'_>) -> Result<(), SqliteCatalogError> {
    transaction
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS stations (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                address TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                rack_id INTEGER,
                price REAL NOT NULL,
                lat REAL NOT NULL,
                lon REAL NOT NULL
            );
            DELETE FROM stations;",
        )
        .map_err(|source| SqliteCatalogError::CreateSchema { source })
}

fn persist_rows(
    transaction: &Transaction<'_>,
    records: &[StationRecord],
) -> Result<(), SqliteCatalogError> {
    if records.is_empty() {
        return Ok(());
    }

    let mut statement = transaction
        .prepare(
            "INSERT INTO stations (id, name, address, city, state, rack_id, price, lat, lon)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(|source| SqliteCatalogError::PrepareInsert { source })?;

    for record in records {
        let id = i64::try_from(record.id)
            .map_err(|_| SqliteCatalogError::IdOutOfRange { id: record.id })?;
        let rack_id = record
            .rack_id
            .map(|rack_id| {
                i64::try_from(rack_id).map_err(|_| SqliteCatalogError::RackIdOutOfRange {
                    id: record.id,
                    rack_id,
                })
            })
            .transpose()?;
        statement
            .execute((
                id,
                &record.name,
                &record.address,
                &record.city,
                &record.state,
                rack_id,
                record.price,
                record.location.y,
                record.location.x,
            ))
            .map_err(|source| SqliteCatalogError::PersistRow {
                id: record.id,
                source,
            })?;
    }

    Ok(())
}

type StationRow = (i64, String, String, String, f64, f64, f64);

/// Load every station from the database at `path`, ordered by identifier.
///
/// # Errors
///
/// Returns [`SqliteCatalogError::Open`] when the database is missing,
/// [`SqliteCatalogError::Query`] when the table cannot be read, and
/// [`SqliteCatalogError::InvalidStation`] when a row fails validation.
pub fn load_station_database(path: &Utf8Path) -> Result<Vec<FuelStation>, SqliteCatalogError> {
    let connection =
        Connection::open_with_flags(path.as_std_path(), OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| SqliteCatalogError::Open {
                path: path.to_path_buf(),
                source,
            })?;
    let query_error = |source: SqliteError| SqliteCatalogError::Query {
        path: path.to_path_buf(),
        source,
    };

    let mut statement = connection
        .prepare("SELECT id, name, city, state, price, lat, lon FROM stations ORDER BY id")
        .map_err(query_error)?;
    let rows = statement
        .query_map([], |row| -> rusqlite::Result<StationRow> {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })
        .map_err(query_error)?;

    let mut stations = Vec::new();
    for row in rows {
        stations.push(station_from_row(row.map_err(query_error)?)?);
    }
    Ok(stations)
}

/// Coordinates of every station in the database at `path`, keyed by
/// identifier. Ingest uses them to avoid geocoding known truckstops again.
///
/// # Errors
///
/// As [`load_station_database`].
pub fn load_station_locations(
    path: &Utf8Path,
) -> Result<BTreeMap<u64, Coord<f64>>, SqliteCatalogError> {
    Ok(load_station_database(path)?
        .into_iter()
        .map(|station| (station.id, station.location))
        .collect())
}

fn station_from_row(row: StationRow) -> Result<FuelStation, SqliteCatalogError> {
    let (raw_id, name, city, state, price, lat, lon) = row;
    let id = u64::try_from(raw_id).map_err(|_| SqliteCatalogError::NegativeId { id: raw_id })?;
    FuelStation::new(id, name, Coord { x: lon, y: lat }, price)
        .map(|station| station.with_locality(city, state))
        .map_err(|source| SqliteCatalogError::InvalidStation { id, source })
}

/// A [`StationCatalog`] loaded from a station database.
///
/// The database is read once on [`open`](Self::open); [`reload`](Self::reload)
/// swaps in a fresh snapshot without disturbing requests that already hold
/// the previous one.
#[derive(Debug)]
pub struct SqliteStationCatalog {
    path: Utf8PathBuf,
    current: SharedCatalog,
}

impl SqliteStationCatalog {
    /// Open the database at `path` and load its stations.
    ///
    /// # Errors
    ///
    /// See [`load_station_database`].
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, SqliteCatalogError> {
        let path = path.into();
        let stations = load_station_database(&path)?;
        Ok(Self {
            current: SharedCatalog::new(stations),
            path,
        })
    }

    /// The database this catalog reads from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Re-read the database and publish the result, returning the station
    /// count. On failure the previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// See [`load_station_database`].
    pub fn reload(&self) -> Result<usize, SqliteCatalogError> {
        let stations = load_station_database(&self.path)?;
        let count = stations.len();
        self.current.replace(stations);
        Ok(count)
    }
}

impl StationCatalog for SqliteStationCatalog {
    fn snapshot(&self) -> StationSnapshot {
        self.current.snapshot()
    }
}
