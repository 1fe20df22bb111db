//! Exact minimum-cost refuelling program.
//!
//! Refuelling points form a DAG ordered by route distance: the start, every
//! candidate station, and the finish. An edge joins two points when the
//! second is reachable on the fuel taken on at the first, and costs the fuel
//! burnt over that distance at the first point's price. A forward pass over
//! the sorted points yields the cheapest path to the finish.

use fuelstop_core::geodesy::EPSILON_MILES;
use fuelstop_core::{FuelCostModel, OptimizeError, ProjectedStation};

/// Costs closer than this are treated as equal.
pub(crate) const EPSILON_COST: f64 = 1e-9;

/// Inputs to a single solve, already validated and sorted along the route.
pub(crate) struct RefuelProgram<'a> {
    pub(crate) route_miles: f64,
    pub(crate) stations: &'a [ProjectedStation],
    pub(crate) range_miles: f64,
    pub(crate) initial_range_miles: f64,
    pub(crate) cost_model: &'a FuelCostModel,
}

#[derive(Debug, Clone, Copy)]
struct Label {
    cost: f64,
    stops: usize,
    predecessor: Option<usize>,
}

impl Label {
    /// Whether `self` should replace `current`.
    ///
    /// Cheaper wins; near-equal costs prefer fewer stops, then the later
    /// predecessor because candidates are relaxed in route order.
    #[expect(
        clippy::float_arithmetic,
        reason = "cost comparison applies an absolute tolerance"
    )]
    fn improves_on(&self, current: Option<&Self>) -> bool {
        let Some(current) = current else {
            return true;
        };
        if self.cost < current.cost - EPSILON_COST {
            return true;
        }
        if self.cost > current.cost + EPSILON_COST {
            return false;
        }
        self.stops <= current.stops
    }
}

impl RefuelProgram<'_> {
    /// Node `0` is the start, nodes `1..=n` are stations, `n + 1` the finish.
    fn position(&self, node: usize) -> f64 {
        if node == 0 {
            return 0.0;
        }
        self.stations
            .get(node - 1)
            .map_or(self.route_miles, |station| station.route_miles)
    }

    fn reach_from(&self, node: usize) -> f64 {
        if node == 0 {
            self.initial_range_miles
        } else {
            self.range_miles
        }
    }

    fn edge_cost(&self, from: usize, miles: f64) -> f64 {
        match from.checked_sub(1).and_then(|i| self.stations.get(i)) {
            Some(station) => self.cost_model.leg_cost(miles, station.price()),
            None => self.cost_model.initial_leg_cost(miles),
        }
    }

    /// Report the first gap between consecutive refuelling points that the
    /// vehicle cannot cross.
    #[expect(
        clippy::float_arithmetic,
        reason = "gap checks compare mileage with a tolerance"
    )]
    pub(crate) fn check_gaps(&self) -> Result<(), OptimizeError> {
        let last = self.stations.len() + 1;
        for node in 0..last {
            let from_miles = self.position(node);
            let to_miles = self.position(node + 1);
            let range_miles = self.reach_from(node);
            if to_miles - from_miles > range_miles + EPSILON_MILES {
                return Err(OptimizeError::InfeasibleRoute {
                    from_miles,
                    to_miles,
                    range_miles,
                });
            }
        }
        Ok(())
    }

    /// Solve for the cheapest set of stops, returned as indices into
    /// `stations` in route order.
    ///
    /// Callers run [`RefuelProgram::check_gaps`] first; an unreachable
    /// finish is still reported as infeasible rather than panicking.
    #[expect(
        clippy::float_arithmetic,
        reason = "dynamic programme accumulates floating-point leg costs"
    )]
    pub(crate) fn solve(&self) -> Result<Vec<usize>, OptimizeError> {
        let finish = self.stations.len() + 1;
        let mut labels: Vec<Option<Label>> = vec![None; finish + 1];
        if let Some(first) = labels.first_mut() {
            *first = Some(Label {
                cost: 0.0,
                stops: 0,
                predecessor: None,
            });
        }

        for from in 0..finish {
            let Some(origin) = labels.get(from).copied().flatten() else {
                continue;
            };
            let from_miles = self.position(from);
            let reach = self.reach_from(from) + EPSILON_MILES;
            for to in (from + 1)..=finish {
                let miles = self.position(to) - from_miles;
                if miles > reach {
                    break;
                }
                let candidate = Label {
                    cost: origin.cost + self.edge_cost(from, miles),
                    stops: origin.stops + usize::from(to != finish),
                    predecessor: Some(from),
                };
                if let Some(slot) = labels.get_mut(to)
                    && candidate.improves_on(slot.as_ref())
                {
                    *slot = Some(candidate);
                }
            }
        }

        let mut stops = Vec::new();
        let mut cursor = labels
            .get(finish)
            .copied()
            .flatten()
            .ok_or(OptimizeError::InfeasibleRoute {
                from_miles: 0.0,
                to_miles: self.route_miles,
                range_miles: self.initial_range_miles,
            })?
            .predecessor;
        while let Some(node) = cursor {
            if node == 0 {
                break;
            }
            stops.push(node - 1);
            cursor = labels.get(node).copied().flatten().and_then(|l| l.predecessor);
        }
        stops.reverse();
        Ok(stops)
    }
}
