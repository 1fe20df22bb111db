//! Station catalog preparation and loading.
//!
//! The catalog starts life as a retail price sheet (CSV, one row per
//! truckstop and rack). It is condensed into one [`StationRecord`] per
//! truckstop, truckstops without coordinates are located through a
//! [`fuelstop_core::Geocoder`], and the result is persisted to SQLite and
//! finally loaded into an in-memory [`fuelstop_core::StationSnapshot`] by
//! [`SqliteStationCatalog`].

mod locate;
mod price_sheet;
mod sqlite;

use fuelstop_core::{FuelStation, InvalidInputError};
use geo::Coord;
use serde::Serialize;

pub use locate::locate_stations;
pub use price_sheet::{
    IngestError, IngestSummary, PriceSheet, UnlocatedStation, clean_station_name,
    read_price_sheet, read_price_sheet_file,
};
pub use sqlite::{
    SqliteCatalogError, SqliteStationCatalog, load_station_database, load_station_locations,
    write_station_database,
};

/// One truckstop as persisted in the station database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationRecord {
    /// Truckstop identifier from the price sheet.
    pub id: u64,
    /// Name with store numbers removed.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// Supply rack identifier, when the sheet lists one.
    pub rack_id: Option<u64>,
    /// Average retail price per gallon across the truckstop's rows.
    pub price: f64,
    /// Position (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
}

impl StationRecord {
    /// Convert into a validated [`FuelStation`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] when the location or price is invalid.
    pub fn to_station(&self) -> Result<FuelStation, InvalidInputError> {
        Ok(
            FuelStation::new(self.id, self.name.clone(), self.location, self.price)?
                .with_locality(self.city.clone(), self.state.clone()),
        )
    }
}
