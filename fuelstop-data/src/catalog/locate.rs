//! Give coordinates to truckstops the price sheet left unlocated.
//!
//! Coordinates already stored for a truckstop are reused first; the rest are
//! looked up by name and locality. Once the geocoder fails at the transport
//! level (timeouts, network or HTTP errors) the remaining lookups are
//! skipped, so an unreachable service costs one timeout rather than one per
//! truckstop.

use std::collections::BTreeMap;

use fuelstop_core::{GeocodeError, Geocoder};
use geo::Coord;

use super::PriceSheet;

/// Resolve every unlocated station in `sheet`.
///
/// `known` maps truckstop identifiers to coordinates from an earlier
/// database; those are trusted and never re-geocoded. Stations that remain
/// unlocated stay in [`PriceSheet::unlocated`] and are counted in
/// [`IngestSummary::missing_coordinates`](super::IngestSummary::missing_coordinates).
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use fuelstop_core::{GeocodeError, Geocoder};
/// use fuelstop_data::catalog::{locate_stations, read_price_sheet};
/// use geo::Coord;
///
/// struct Tomah;
///
/// impl Geocoder for Tomah {
///     fn resolve(&self, name: &str) -> Result<Coord<f64>, GeocodeError> {
///         match name {
///             "KWIK TRIP, Tomah, WI, USA" => Ok(Coord { x: -90.50, y: 43.98 }),
///             other => Err(GeocodeError::NotFound { query: other.to_owned() }),
///         }
///     }
/// }
///
/// let raw = "OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price\n\
///            18,KWIK TRIP #796,I-94 EXIT 143,Tomah,WI,480,3.139\n";
/// let sheet = read_price_sheet(raw.as_bytes()).expect("sheet parses");
/// let located = locate_stations(sheet, &Tomah, &BTreeMap::new());
///
/// assert_eq!(located.records.len(), 1);
/// assert_eq!(located.summary.geocoded, 1);
/// ```
pub fn locate_stations<G>(
    sheet: PriceSheet,
    geocoder: &G,
    known: &BTreeMap<u64, Coord<f64>>,
) -> PriceSheet
where
    G: Geocoder + ?Sized,
{
    let PriceSheet {
        mut records,
        unlocated,
        mut summary,
    } = sheet;
    let mut still_unlocated = Vec::new();
    let mut service_down = false;

    for station in unlocated {
        let location = if let Some(coord) = known.get(&station.id) {
            summary.reused_coordinates += 1;
            *coord
        } else if service_down {
            summary.geocode_failures += 1;
            still_unlocated.push(station);
            continue;
        } else {
            let query = station.geocoding_query();
            match geocoder.resolve(&query) {
                Ok(coord) => {
                    summary.geocoded += 1;
                    coord
                }
                Err(err) => {
                    summary.geocode_failures += 1;
                    if is_transport_failure(&err) {
                        log::warn!("geocoding stopped after `{query}` failed: {err}");
                        service_down = true;
                    } else {
                        log::debug!("could not locate truckstop {}: {err}", station.id);
                    }
                    still_unlocated.push(station);
                    continue;
                }
            }
        };

        let record = station.with_location(location);
        if let Err(err) = record.to_station() {
            log::warn!("dropping truckstop {}: {err}", record.id);
            summary.rejected_stations += 1;
            continue;
        }
        records.push(record);
    }

    records.sort_by_key(|record| record.id);
    summary.missing_coordinates = still_unlocated.len();
    summary.stations = records.len();
    log::info!(
        "located {} truckstops ({} reused, {} geocoded), {} still missing",
        summary.reused_coordinates + summary.geocoded,
        summary.reused_coordinates,
        summary.geocoded,
        summary.missing_coordinates
    );
    PriceSheet {
        records,
        unlocated: still_unlocated,
        summary,
    }
}

fn is_transport_failure(err: &GeocodeError) -> bool {
    matches!(
        err,
        GeocodeError::Timeout { .. } | GeocodeError::Network { .. } | GeocodeError::Http { .. }
    )
}
