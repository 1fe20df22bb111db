//! Fuel cost accounting for a chosen sequence of stops.

use crate::validation::is_positive_finite;
use crate::{InvalidInputError, ProjectedStation};

/// Default fuel efficiency in miles per gallon.
pub const DEFAULT_MILES_PER_GALLON: f64 = 10.0;

/// Default tank capacity in gallons.
pub const DEFAULT_TANK_CAPACITY_GALLONS: f64 = 50.0;

/// Vehicle fuel parameters used to price a trip.
///
/// Each leg of a trip is driven on fuel bought at the stop that begins the
/// leg, so a leg costs `leg_miles / miles_per_gallon * price`. The first leg
/// uses the fuel already in the tank, priced at `initial_price` when given
/// and free otherwise.
///
/// # Examples
///
/// ```
/// use fuelstop_core::FuelCostModel;
///
/// let model = FuelCostModel::default();
/// assert_eq!(model.range_miles(), 500.0);
/// assert_eq!(model.leg_cost(100.0, 3.0), 30.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuelCostModel {
    miles_per_gallon: f64,
    tank_capacity_gallons: f64,
    initial_price: Option<f64>,
}

impl Default for FuelCostModel {
    fn default() -> Self {
        Self {
            miles_per_gallon: DEFAULT_MILES_PER_GALLON,
            tank_capacity_gallons: DEFAULT_TANK_CAPACITY_GALLONS,
            initial_price: None,
        }
    }
}

/// One priced leg of a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuelLeg {
    /// Station where the fuel for this leg was bought, if any.
    pub station_id: Option<u64>,
    /// Route distance where the leg begins.
    pub from_miles: f64,
    /// Route distance where the leg ends.
    pub to_miles: f64,
    /// Price per gallon of the fuel burnt on this leg.
    pub price: Option<f64>,
    /// Gallons burnt on this leg.
    pub gallons: f64,
    /// Cost of the fuel burnt on this leg.
    pub cost: f64,
}

impl FuelLeg {
    /// Length of the leg in miles.
    pub fn miles(&self) -> f64 {
        self.to_miles - self.from_miles
    }
}

impl FuelCostModel {
    /// Validate and construct a cost model.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Efficiency`] or
    /// [`InvalidInputError::TankCapacity`] for non-positive or non-finite
    /// values.
    pub fn new(miles_per_gallon: f64, tank_capacity_gallons: f64) -> Result<Self, InvalidInputError> {
        if !is_positive_finite(miles_per_gallon) {
            return Err(InvalidInputError::Efficiency(miles_per_gallon));
        }
        if !is_positive_finite(tank_capacity_gallons) {
            return Err(InvalidInputError::TankCapacity(tank_capacity_gallons));
        }
        Ok(Self {
            miles_per_gallon,
            tank_capacity_gallons,
            initial_price: None,
        })
    }

    /// Price the fuel that is in the tank at departure.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::InitialPrice`] for a non-positive or
    /// non-finite price.
    pub fn with_initial_price(mut self, price: f64) -> Result<Self, InvalidInputError> {
        if !is_positive_finite(price) {
            return Err(InvalidInputError::InitialPrice(price));
        }
        self.initial_price = Some(price);
        Ok(self)
    }

    /// Re-check the invariants enforced by the constructors.
    ///
    /// # Errors
    ///
    /// See [`FuelCostModel::new`] and [`FuelCostModel::with_initial_price`].
    pub fn validate(&self) -> Result<(), InvalidInputError> {
        let model = Self::new(self.miles_per_gallon, self.tank_capacity_gallons)?;
        match self.initial_price {
            Some(price) => model.with_initial_price(price).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Fuel efficiency in miles per gallon.
    pub fn miles_per_gallon(&self) -> f64 {
        self.miles_per_gallon
    }

    /// Tank capacity in gallons.
    pub fn tank_capacity_gallons(&self) -> f64 {
        self.tank_capacity_gallons
    }

    /// Price of the fuel in the tank at departure, if known.
    pub fn initial_price(&self) -> Option<f64> {
        self.initial_price
    }

    /// Distance covered by a full tank.
    #[must_use]
    pub fn range_miles(&self) -> f64 {
        self.miles_per_gallon * self.tank_capacity_gallons
    }

    /// Gallons burnt over `miles`.
    #[must_use]
    pub fn gallons_for(&self, miles: f64) -> f64 {
        miles / self.miles_per_gallon
    }

    /// Cost of driving `miles` on fuel bought at `price`.
    #[must_use]
    pub fn leg_cost(&self, miles: f64, price: f64) -> f64 {
        self.gallons_for(miles) * price
    }

    /// Cost of the first leg, driven on the fuel already in the tank.
    #[must_use]
    pub fn initial_leg_cost(&self, miles: f64) -> f64 {
        self.initial_price
            .map_or(0.0, |price| self.leg_cost(miles, price))
    }

    /// Split a route of `route_length` miles at `stops` and price each leg.
    ///
    /// `stops` must be ordered by route distance. A route without stops
    /// yields a single leg.
    pub fn price_legs(&self, route_length: f64, stops: &[ProjectedStation]) -> Vec<FuelLeg> {
        let mut legs = Vec::with_capacity(stops.len() + 1);
        let mut from_miles = 0.0;
        let mut station_id = None;
        let mut price = self.initial_price;
        let ends = stops.iter().map(Some).chain(std::iter::once(None));
        for next in ends {
            let to_miles = next.map_or(route_length, |stop| stop.route_miles);
            let gallons = self.gallons_for(to_miles - from_miles);
            legs.push(FuelLeg {
                station_id,
                from_miles,
                to_miles,
                price,
                gallons,
                cost: price.map_or(0.0, |p| gallons * p),
            });
            if let Some(stop) = next {
                from_miles = stop.route_miles;
                station_id = Some(stop.station.id);
                price = Some(stop.price());
            }
        }
        legs
    }

    /// Total cost of driving `route_length` miles with the given stops.
    #[must_use]
    pub fn total_cost(&self, route_length: f64, stops: &[ProjectedStation]) -> f64 {
        Self::sum_legs(&self.price_legs(route_length, stops))
    }

    /// Sum the cost of already priced legs.
    #[must_use]
    pub fn sum_legs(legs: &[FuelLeg]) -> f64 {
        legs.iter().map(|leg| leg.cost).sum()
    }
}
