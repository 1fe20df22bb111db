//! Retail price sheet ingestion.
//!
//! The sheet lists one row per truckstop and supply rack with the columns
//! `OPIS Truckstop ID, Truckstop Name, Address, City, State, Rack ID,
//! Retail Price`, optionally followed by geocoded `latitude, longitude`.
//! Rows are grouped by truckstop: the first row supplies the descriptive
//! fields and the retail prices are averaged. Truckstops whose rows carry no
//! coordinates are returned as [`UnlocatedStation`]s for
//! [`locate_stations`](super::locate_stations) to resolve.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::Read;

use camino::{Utf8Path, Utf8PathBuf};
use csv::{ReaderBuilder, Trim};
use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::StationRecord;

/// Errors raised while reading a price sheet.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The sheet could not be opened.
    #[error("failed to open price sheet at {path:?}")]
    Open {
        /// Path of the sheet.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A row could not be decoded; the message carries the line number.
    #[error("malformed price sheet: {0}")]
    Csv(#[from] csv::Error),
}

/// Counts describing what ingestion kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// Data rows read from the sheet.
    pub rows: usize,
    /// Stations kept.
    pub stations: usize,
    /// Rows folded into an earlier row for the same truckstop.
    pub merged_rows: usize,
    /// Rows dropped for a missing, zero or negative price.
    pub rejected_rows: usize,
    /// Truckstops still without coordinates.
    pub missing_coordinates: usize,
    /// Truckstops dropped because their coordinates were out of range.
    pub rejected_stations: usize,
    /// Truckstops located from an earlier station database.
    pub reused_coordinates: usize,
    /// Truckstops located by the geocoder.
    pub geocoded: usize,
    /// Truckstops the geocoder could not locate.
    pub geocode_failures: usize,
}

/// Stations condensed from a price sheet, ordered by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSheet {
    /// One record per located truckstop.
    pub records: Vec<StationRecord>,
    /// Truckstops no row gave coordinates for.
    pub unlocated: Vec<UnlocatedStation>,
    /// What was kept and dropped.
    pub summary: IngestSummary,
}

/// A condensed truckstop still waiting for coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct UnlocatedStation {
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
    /// Average retail price per gallon.
    pub price: f64,
}

impl UnlocatedStation {
    /// Free-text query handed to a geocoder.
    ///
    /// ```
    /// use fuelstop_data::catalog::UnlocatedStation;
    ///
    /// let station = UnlocatedStation {
    ///     id: 18,
    ///     name: "KWIK TRIP".into(),
    ///     address: "I-94 EXIT 143".into(),
    ///     city: "Tomah".into(),
    ///     state: "WI".into(),
    ///     rack_id: None,
    ///     price: 3.139,
    /// };
    /// assert_eq!(station.geocoding_query(), "KWIK TRIP, Tomah, WI, USA");
    /// ```
    #[must_use]
    pub fn geocoding_query(&self) -> String {
        format!("{}, {}, {}, USA", self.name, self.city, self.state)
    }

    /// Attach a position, producing a record ready for persistence.
    #[must_use]
    pub fn with_location(self, location: Coord<f64>) -> StationRecord {
        StationRecord {
            id: self.id,
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            rack_id: self.rack_id,
            price: self.price,
            location,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "OPIS Truckstop ID")]
    id: u64,
    #[serde(rename = "Truckstop Name")]
    name: String,
    #[serde(rename = "Address", default)]
    address: String,
    #[serde(rename = "City", default)]
    city: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Rack ID", default)]
    rack_id: Option<u64>,
    #[serde(rename = "Retail Price")]
    price: f64,
    #[serde(default, alias = "Latitude")]
    latitude: Option<f64>,
    #[serde(default, alias = "Longitude")]
    longitude: Option<f64>,
}

impl PriceRow {
    fn location(&self) -> Option<Coord<f64>> {
        match (self.latitude, self.longitude) {
            (Some(y), Some(x)) => Some(Coord { x, y }),
            _ => None,
        }
    }
}

struct Group {
    first: PriceRow,
    price_total: f64,
    price_rows: u32,
    location: Option<Coord<f64>>,
}

impl Group {
    fn new(row: PriceRow) -> Self {
        Self {
            price_total: row.price,
            price_rows: 1,
            location: row.location(),
            first: row,
        }
    }

    fn absorb(&mut self, row: &PriceRow) {
        self.price_total += row.price;
        self.price_rows += 1;
        if self.location.is_none() {
            self.location = row.location();
        }
    }

    fn condense(self) -> (UnlocatedStation, Option<Coord<f64>>) {
        let station = UnlocatedStation {
            id: self.first.id,
            name: clean_station_name(&self.first.name),
            address: self.first.address,
            city: self.first.city,
            state: self.first.state,
            rack_id: self.first.rack_id,
            price: self.price_total / f64::from(self.price_rows),
        };
        (station, self.location)
    }
}

/// Read and condense a price sheet.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] for unreadable input or a row whose
/// identifier or price does not parse.
pub fn read_price_sheet<R: Read>(reader: R) -> Result<PriceSheet, IngestError> {
    let mut rows = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut summary = IngestSummary::default();
    let mut groups: BTreeMap<u64, Group> = BTreeMap::new();

    for result in rows.deserialize::<PriceRow>() {
        let row = result?;
        summary.rows += 1;
        if !(row.price.is_finite() && row.price > 0.0) {
            log::warn!("dropping row for truckstop {} with price {}", row.id, row.price);
            summary.rejected_rows += 1;
            continue;
        }
        match groups.entry(row.id) {
            Entry::Vacant(slot) => {
                slot.insert(Group::new(row));
            }
            Entry::Occupied(mut slot) => {
                summary.merged_rows += 1;
                slot.get_mut().absorb(&row);
            }
        }
    }

    let mut records = Vec::with_capacity(groups.len());
    let mut unlocated = Vec::new();
    for (id, group) in groups {
        let (station, location) = group.condense();
        let Some(location) = location else {
            log::debug!("truckstop {id} has no coordinates");
            summary.missing_coordinates += 1;
            unlocated.push(station);
            continue;
        };
        let record = station.with_location(location);
        if let Err(err) = record.to_station() {
            log::warn!("dropping truckstop {id}: {err}");
            summary.rejected_stations += 1;
            continue;
        }
        records.push(record);
    }
    summary.stations = records.len();

    log::info!(
        "price sheet: {} rows condensed into {} stations",
        summary.rows,
        summary.stations
    );
    Ok(PriceSheet {
        records,
        unlocated,
        summary,
    })
}

/// Read and condense the price sheet at `path`.
///
/// # Errors
///
/// Returns [`IngestError::Open`] when the file cannot be opened, otherwise
/// as [`read_price_sheet`].
pub fn read_price_sheet_file(path: &Utf8Path) -> Result<PriceSheet, IngestError> {
    let file = fuelstop_fs::open_utf8_file(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_price_sheet(file)
}

/// Remove store numbers such as `#796` from a station name and collapse the
/// whitespace left behind.
///
/// ```
/// use fuelstop_data::catalog::clean_station_name;
///
/// assert_eq!(clean_station_name("KWIK TRIP #796"), "KWIK TRIP");
/// assert_eq!(clean_station_name("PILOT #12 TRAVEL CENTER"), "PILOT TRAVEL CENTER");
/// assert_eq!(clean_station_name("LOVES # TRAVEL STOP"), "LOVES # TRAVEL STOP");
/// ```
#[must_use]
pub fn clean_station_name(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '#' && chars.peek().is_some_and(char::is_ascii_digit) {
            while chars.next_if(char::is_ascii_digit).is_some() {}
            continue;
        }
        cleaned.push(ch);
    }
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
