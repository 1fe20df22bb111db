//! Test helpers for preparing price sheets and station databases.

use camino::{Utf8Path, Utf8PathBuf};
use fuelstop_core::Geocoder;
use fuelstop_core::test_support::{StaticGeocoder, equator_coord};
use fuelstop_data::catalog::{StationRecord, write_station_database};
use geo::Coord;
use std::cell::Cell;
use tempfile::TempDir;

use crate::CliError;
use crate::ingest::{GeocoderBuilder, IngestConfig};

pub(super) const RAW_SHEET_HEADER: &str =
    "OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price\n";

pub(super) const TOMAH: Coord<f64> = Coord { x: -90.50, y: 43.98 };
pub(super) const TUCSON: Coord<f64> = Coord { x: -110.9, y: 32.2 };

pub(super) const SHEET_HEADER: &str =
    "OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price,latitude,longitude\n";

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// A temporary directory addressed through UTF-8 paths.
pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Write a price sheet with three truckstops, one of them priced over two
/// racks.
pub(super) fn write_price_sheet(path: &Utf8Path) {
    let rows = "\
7,WOODSHED OF BIG CABIN #1,I-44 EXIT 283,Big Cabin,OK,307,3.40,36.52,-95.22
7,WOODSHED OF BIG CABIN #1,I-44 EXIT 283,Big Cabin,OK,308,3.60,36.52,-95.22
18,KWIK TRIP #796,I-94 EXIT 143,Tomah,WI,480,3.139,43.98,-90.50
42,PILOT #123 TRAVEL CENTER,I-10 EXIT 264,Tucson,AZ,,2.999,32.2,-110.9
";
    write_utf8(path, format!("{SHEET_HEADER}{rows}").as_bytes());
}

/// Write a sheet in the raw OPIS layout, which carries no coordinates.
pub(super) fn write_raw_price_sheet(path: &Utf8Path) {
    let rows = "\
18,KWIK TRIP #796,I-94 EXIT 143,Tomah,WI,480,3.139
42,PILOT #123 TRAVEL CENTER,I-10 EXIT 264,Tucson,AZ,,2.999
42,PILOT #123 TRAVEL CENTER,I-10 EXIT 264,Tucson,AZ,,3.099
";
    write_utf8(path, format!("{RAW_SHEET_HEADER}{rows}").as_bytes());
}

/// Hands out a fixed gazetteer and counts how often it was asked to.
pub(super) struct FixedGeocoderBuilder {
    geocoder: StaticGeocoder,
    pub(super) builds: Cell<usize>,
}

impl FixedGeocoderBuilder {
    pub(super) fn new(geocoder: StaticGeocoder) -> Self {
        Self {
            geocoder,
            builds: Cell::new(0),
        }
    }

    /// Knows the two truckstops of [`write_raw_price_sheet`].
    pub(super) fn truckstops() -> Self {
        Self::new(
            StaticGeocoder::default()
                .with_place("KWIK TRIP, Tomah, WI, USA", TOMAH)
                .with_place("PILOT TRAVEL CENTER, Tucson, AZ, USA", TUCSON),
        )
    }

    pub(super) fn empty() -> Self {
        Self::new(StaticGeocoder::default())
    }
}

impl GeocoderBuilder for FixedGeocoderBuilder {
    fn build(&self, _config: &IngestConfig) -> Result<Box<dyn Geocoder>, CliError> {
        self.builds.set(self.builds.get() + 1);
        Ok(Box::new(self.geocoder.clone()))
    }
}

/// A station on the equator `mile` miles east of the prime meridian.
pub(super) fn equator_station(id: u64, mile: f64, price: f64) -> StationRecord {
    StationRecord {
        id,
        name: format!("Station {id}"),
        address: format!("Mile {mile}"),
        city: "Equator".into(),
        state: "EQ".into(),
        rack_id: None,
        price,
        location: equator_coord(mile),
    }
}

pub(super) fn write_database(path: &Utf8Path, records: &[StationRecord]) {
    write_station_database(path, records).expect("write station database");
}
