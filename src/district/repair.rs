use geo::{Area, BooleanOps, MultiPolygon, Polygon};
use tracing::{debug, warn};

use crate::{district::Assignments, error::GeometryError, geom::polygon_is_finite, unit::UnitDataset};

/// A detached fragment of the remaining area, small enough to absorb.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Fragment {
    pub(super) units: Vec<usize>, // Unassigned units to claim
    pub(super) population: u64,   // Every unit in the part, assigned or not
}

/// Tracks the area a growing district has not yet claimed, and finds the
/// holes and exclaves its growth cuts off.
///
/// The remaining area starts as the whole region and only ever shrinks.
#[derive(Debug)]
pub(super) struct TopologyRepair {
    remaining: MultiPolygon<f64>,
}

impl TopologyRepair {
    pub(super) fn new(region: &MultiPolygon<f64>) -> Self {
        Self { remaining: region.clone() }
    }

    /// Number of disjoint parts in the remaining area.
    #[inline] pub(super) fn num_parts(&self) -> usize { self.remaining.0.len() }

    /// Remove an absorbed unit's shape from the remaining area. On error the
    /// remaining area is left as it was.
    pub(super) fn subtract(&mut self, shape: &MultiPolygon<f64>) -> Result<(), GeometryError> {
        if !shape.0.iter().all(polygon_is_finite) {
            return Err(GeometryError::Degenerate("subtracted shape has non-finite coordinates".into()))
        }
        let remaining = self.remaining.difference(shape);
        if !remaining.0.iter().all(polygon_is_finite) {
            return Err(GeometryError::Degenerate("difference produced non-finite coordinates".into()))
        }
        self.remaining = remaining;
        Ok(())
    }

    /// Examine each part of a split remaining area and claim every part
    /// whose population fits under the threshold.
    ///
    /// A part's population counts every unit inside it, including units of
    /// earlier districts, but only unassigned units are claimed. `population`
    /// is the district's population before repair; claimed parts are dropped
    /// from the remaining area and returned in the order they were found. A
    /// part that cannot be examined is left in place.
    pub(super) fn fill(
        &mut self,
        dataset: &UnitDataset,
        assignments: &Assignments,
        threshold: f64,
        population: u64,
    ) -> Vec<Fragment> {
        if self.num_parts() <= 1 { return Vec::new() }
        debug!(parts = self.num_parts(), "remaining area split");

        let mut running = population;
        let mut fragments = Vec::new();
        let mut kept = Vec::with_capacity(self.remaining.0.len());

        for part in std::mem::take(&mut self.remaining.0) {
            let fragment = match examine(&part, dataset, assignments) {
                Ok(fragment) => fragment,
                Err(err) => {
                    warn!(error = %err, "skipping repair of remaining-area part");
                    kept.push(part);
                    continue;
                }
            };

            if (fragment.population as f64) < threshold - running as f64 {
                running += fragment.population;
                if !fragment.units.is_empty() { fragments.push(fragment) }
            } else {
                kept.push(part);
            }
        }

        self.remaining = MultiPolygon(kept);
        fragments
    }
}

/// Sum the population inside one part and collect its unassigned units.
fn examine(part: &Polygon<f64>, dataset: &UnitDataset, assignments: &Assignments) -> Result<Fragment, GeometryError> {
    if !polygon_is_finite(part) {
        return Err(GeometryError::Degenerate("part has non-finite coordinates".into()))
    }
    if !(part.unsigned_area() > 0.0) {
        return Err(GeometryError::Degenerate("part has no area".into()))
    }

    let within = dataset.geometries().units_within(part);
    let population = within.iter().map(|&u| dataset.unit(u).population()).sum();
    let units = within.into_iter().filter(|&u| !assignments.is_assigned(u)).collect();

    Ok(Fragment { units, population })
}

#[cfg(test)]
mod tests {
    use geo::{Coord, LineString, Rect};

    use super::*;
    use crate::unit::Unit;

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Rect::new(Coord { x, y }, Coord { x: x + 1.0, y: y + 1.0 }).to_polygon()])
    }

    /// Five units in a row with the given populations, ids "u0".."u4".
    fn row(pops: [u64; 5]) -> UnitDataset {
        UnitDataset::from_pairs(pops.into_iter().enumerate()
            .map(|(i, pop)| (Unit::new(format!("u{i}"), pop, 1.0), square(i as f64, 0.0)))
        ).unwrap()
    }

    #[test]
    fn subtracting_middle_unit_splits_remaining_area() {
        let dataset = row([1, 1, 1, 1, 1]);
        let mut repair = TopologyRepair::new(dataset.region());
        assert_eq!(repair.num_parts(), 1);

        repair.subtract(dataset.geometry(2)).unwrap();
        assert_eq!(repair.num_parts(), 2);
    }

    #[test]
    fn small_part_is_claimed_large_part_is_kept() {
        let dataset = row([5, 50, 50, 50, 50]);
        let mut assignments = Assignments::new(5);
        assignments.assign(1, 1);

        let mut repair = TopologyRepair::new(dataset.region());
        repair.subtract(dataset.geometry(1)).unwrap();

        // Budget is 100 - 50 = 50: u0 (5) fits, u2..u4 (150) does not.
        let fragments = repair.fill(&dataset, &assignments, 100.0, 50);
        assert_eq!(fragments, vec![Fragment { units: vec![0], population: 5 }]);
        assert_eq!(repair.num_parts(), 1);
    }

    #[test]
    fn part_filling_the_budget_exactly_is_kept() {
        let dataset = row([50, 50, 50, 50, 50]);
        let mut assignments = Assignments::new(5);
        assignments.assign(1, 1);

        let mut repair = TopologyRepair::new(dataset.region());
        repair.subtract(dataset.geometry(1)).unwrap();

        assert!(repair.fill(&dataset, &assignments, 100.0, 50).is_empty());
        assert_eq!(repair.num_parts(), 2);
    }

    #[test]
    fn assigned_units_count_toward_part_population() {
        let dataset = row([5, 95, 10, 50, 50]);
        let mut assignments = Assignments::new(5);
        assignments.assign(1, 1);
        assignments.assign(2, 2);

        let mut repair = TopologyRepair::new(dataset.region());
        repair.subtract(dataset.geometry(2)).unwrap();

        // Budget is 100 - 10 = 90. The left part holds u0 (5, free) and
        // u1 (95, district 1), so it weighs 100 and is not claimed.
        assert!(repair.fill(&dataset, &assignments, 100.0, 10).is_empty());
        assert_eq!(repair.num_parts(), 2);
        assert!(!assignments.is_assigned(0));
    }

    #[test]
    fn claimed_part_returns_only_unassigned_units() {
        let dataset = row([5, 10, 50, 50, 50]);
        let mut assignments = Assignments::new(5);
        assignments.assign(1, 1);
        assignments.assign(2, 2);

        let mut repair = TopologyRepair::new(dataset.region());
        repair.subtract(dataset.geometry(2)).unwrap();

        let fragments = repair.fill(&dataset, &assignments, 100.0, 50);
        assert_eq!(fragments, vec![Fragment { units: vec![0], population: 15 }]);
        assert_eq!(assignments.district(1), 1);
    }

    #[test]
    fn degenerate_parts_are_kept_and_valid_parts_still_claimed() {
        let dataset = row([5, 50, 50, 50, 50]);
        let mut assignments = Assignments::new(5);
        assignments.assign(1, 1);

        let mut repair = TopologyRepair::new(dataset.region());
        repair.subtract(dataset.geometry(1)).unwrap();

        let sliver = Polygon::new(LineString::from(vec![(10.0, 10.0), (11.0, 10.0), (10.0, 10.0)]), vec![]);
        let broken = Polygon::new(LineString::from(vec![(20.0, 20.0), (f64::NAN, 20.0), (21.0, 21.0), (20.0, 20.0)]), vec![]);
        repair.remaining.0.insert(0, sliver);
        repair.remaining.0.push(broken);
        assert_eq!(repair.num_parts(), 4);

        let fragments = repair.fill(&dataset, &assignments, 100.0, 50);
        assert_eq!(fragments, vec![Fragment { units: vec![0], population: 5 }]);
        // Both bad parts and the oversized u2..u4 part stay behind.
        assert_eq!(repair.num_parts(), 3);
        assert_eq!(assignments.as_slice(), &[0, 1, 0, 0, 0]);
    }

    #[test]
    fn non_finite_shape_is_not_subtracted() {
        let dataset = row([1, 1, 1, 1, 1]);
        let mut repair = TopologyRepair::new(dataset.region());

        let broken = MultiPolygon(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (f64::INFINITY, 0.0), (1.0, 1.0), (0.0, 0.0)]), vec![],
        )]);
        assert!(matches!(repair.subtract(&broken), Err(GeometryError::Degenerate(_))));
        assert_eq!(&repair.remaining, dataset.region());
    }

    #[test]
    fn unsplit_area_needs_no_repair() {
        let dataset = row([1, 1, 1, 1, 1]);
        let assignments = Assignments::new(5);
        let mut repair = TopologyRepair::new(dataset.region());
        repair.subtract(dataset.geometry(0)).unwrap();
        assert!(repair.fill(&dataset, &assignments, 10.0, 0).is_empty());
    }
}
