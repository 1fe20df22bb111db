//! Station catalog snapshots backed by an R\*-tree.
//!
//! The catalog lives for the whole process and is refreshed by swapping in a
//! new snapshot. Requests clone the snapshot they start with, so a refresh
//! never changes the stations a running request sees.

use std::sync::{Arc, PoisonError, RwLock};

use geo::Rect;
use rstar::{AABB, RTree};

use crate::FuelStation;

/// An immutable, cheaply cloneable set of stations with a spatial index.
///
/// # Examples
///
/// ```
/// use geo::{Coord, Rect};
/// use fuelstop_core::{FuelStation, StationSnapshot};
///
/// # fn main() -> Result<(), fuelstop_core::InvalidInputError> {
/// let snapshot = StationSnapshot::new(vec![
///     FuelStation::new(1, "A", Coord { x: 0.0, y: 0.0 }, 3.0)?,
///     FuelStation::new(2, "B", Coord { x: 5.0, y: 5.0 }, 2.0)?,
/// ]);
/// let bbox = Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 });
/// let hits: Vec<_> = snapshot.stations_in_bbox(&bbox).collect();
/// assert_eq!(hits.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StationSnapshot {
    tree: Arc<RTree<FuelStation>>,
}

impl StationSnapshot {
    /// Bulk-load a snapshot from stations.
    pub fn new(stations: Vec<FuelStation>) -> Self {
        Self {
            tree: Arc::new(RTree::bulk_load(stations)),
        }
    }

    /// Number of stations in the snapshot.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the snapshot holds no stations.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Iterate over every station in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &FuelStation> + '_ {
        self.tree.iter()
    }

    /// Stations whose location lies inside `bbox`; boundary points count as
    /// inside.
    pub fn stations_in_bbox<'a>(
        &'a self,
        bbox: &Rect<f64>,
    ) -> impl Iterator<Item = &'a FuelStation> + 'a {
        let envelope = AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
        self.tree.locate_in_envelope_intersecting(&envelope)
    }

    /// The `limit` cheapest stations, ties broken by identifier.
    pub fn cheapest(&self, limit: usize) -> Vec<FuelStation> {
        let mut stations: Vec<&FuelStation> = self.tree.iter().collect();
        stations.sort_by(|a, b| a.price.total_cmp(&b.price).then_with(|| a.id.cmp(&b.id)));
        stations.into_iter().take(limit).cloned().collect()
    }
}

/// Source of station snapshots.
pub trait StationCatalog: Send + Sync {
    /// Return the current snapshot.
    fn snapshot(&self) -> StationSnapshot;
}

impl StationCatalog for StationSnapshot {
    fn snapshot(&self) -> StationSnapshot {
        self.clone()
    }
}

/// A catalog whose snapshot can be replaced while readers hold older ones.
#[derive(Debug, Default)]
pub struct SharedCatalog {
    current: RwLock<StationSnapshot>,
}

impl SharedCatalog {
    /// Start with the given stations.
    pub fn new(stations: Vec<FuelStation>) -> Self {
        Self {
            current: RwLock::new(StationSnapshot::new(stations)),
        }
    }

    /// Publish a new set of stations.
    pub fn replace(&self, stations: Vec<FuelStation>) {
        let next = StationSnapshot::new(stations);
        log::info!("station catalog refreshed with {} stations", next.len());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl StationCatalog for SharedCatalog {
    fn snapshot(&self) -> StationSnapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
