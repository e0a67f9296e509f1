use std::{cmp::Ordering, collections::BinaryHeap};

use crate::{district::Assignments, graph::AdjacencyGraph, unit::UnitDataset};

/// A growth candidate, ordered by density then by smallest id.
#[derive(Clone, Copy, Debug)]
struct Candidate {
    density: f64,
    rank: u32, // id rank; smaller wins ties
    unit: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.density.total_cmp(&other.density)
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Candidate {}

/// Unassigned neighbors of the district currently growing.
///
/// Entries are pushed when a member is absorbed and dropped lazily once
/// they turn out to be assigned, so `pop` always yields the densest unit
/// in (neighbors of members) minus (assigned set).
#[derive(Debug)]
pub(super) struct Frontier {
    heap: BinaryHeap<Candidate>,
    queued: Vec<u32>, // District for which each unit was last queued
    district: u32,
}

impl Frontier {
    pub(super) fn new(num_units: usize) -> Self {
        Self { heap: BinaryHeap::new(), queued: vec![0; num_units], district: 0 }
    }

    /// Start collecting candidates for a new district.
    pub(super) fn reset(&mut self, district: u32) {
        self.heap.clear();
        self.district = district;
    }

    /// Queue every unassigned neighbor of a newly absorbed unit.
    pub(super) fn extend_from(&mut self, unit: usize, dataset: &UnitDataset, graph: &AdjacencyGraph, assignments: &Assignments) {
        for v in graph.neighbors(unit) {
            if assignments.is_assigned(v) || self.queued[v] == self.district { continue }
            self.queued[v] = self.district;
            self.heap.push(Candidate { density: dataset.unit(v).density(), rank: dataset.id_rank(v), unit: v });
        }
    }

    /// Remove and return the best unassigned candidate.
    pub(super) fn pop(&mut self, assignments: &Assignments) -> Option<usize> {
        while let Some(candidate) = self.heap.pop() {
            if !assignments.is_assigned(candidate.unit) { return Some(candidate.unit) }
        }
        None
    }
}

/// Walks the dataset's density ranking to find each district's seed.
#[derive(Debug, Default)]
pub(super) struct SeedCursor {
    pos: usize,
}

impl SeedCursor {
    /// The densest unassigned unit, ties broken by smallest id.
    ///
    /// Assignments only ever grow, so units skipped here are never
    /// eligible again and the cursor only moves forward.
    pub(super) fn next(&mut self, dataset: &UnitDataset, assignments: &Assignments) -> Option<usize> {
        let order = dataset.density_order();
        while self.pos < order.len() && assignments.is_assigned(order[self.pos]) {
            self.pos += 1;
        }
        order.get(self.pos).copied()
    }
}

#[cfg(test)]
mod tests {
    use geo::{Coord, MultiPolygon, Rect};

    use super::*;
    use crate::{config::Contiguity, unit::Unit};

    fn star() -> (UnitDataset, AdjacencyGraph) {
        // Unit 0 touches 1, 2 and 3; 2 and 3 share the top density.
        let dataset = UnitDataset::from_pairs(
            [("hub", 1, 1.0), ("low", 5, 1.0), ("zed", 9, 1.0), ("mid", 9, 1.0)].into_iter().enumerate()
                .map(|(i, (id, pop, area))| (
                    Unit::new(id, pop, area),
                    MultiPolygon(vec![Rect::new(Coord { x: i as f64, y: 0.0 }, Coord { x: i as f64 + 1.0, y: 1.0 }).to_polygon()]),
                ))
        ).unwrap();
        let graph = AdjacencyGraph::from_lists(Contiguity::Rook, vec![vec![1, 2, 3], vec![], vec![], vec![]]);
        (dataset, graph)
    }

    #[test]
    fn pop_prefers_density_then_smallest_id() {
        let (dataset, graph) = star();
        let mut assignments = Assignments::new(4);
        assignments.assign(0, 1);

        let mut frontier = Frontier::new(4);
        frontier.reset(1);
        frontier.extend_from(0, &dataset, &graph, &assignments);

        assert_eq!(frontier.pop(&assignments), Some(3)); // "mid" < "zed"
        assert_eq!(frontier.pop(&assignments), Some(2));
        assert_eq!(frontier.pop(&assignments), Some(1));
        assert_eq!(frontier.pop(&assignments), None);
    }

    #[test]
    fn pop_skips_units_assigned_after_queueing() {
        let (dataset, graph) = star();
        let mut assignments = Assignments::new(4);
        assignments.assign(0, 1);

        let mut frontier = Frontier::new(4);
        frontier.reset(1);
        frontier.extend_from(0, &dataset, &graph, &assignments);
        assignments.assign(3, 1);

        assert_eq!(frontier.pop(&assignments), Some(2));
    }

    #[test]
    fn seed_cursor_walks_density_order() {
        let (dataset, _) = star();
        let mut assignments = Assignments::new(4);
        let mut seeds = SeedCursor::default();

        assert_eq!(seeds.next(&dataset, &assignments), Some(3));
        assignments.assign(3, 1);
        assignments.assign(2, 1);
        assert_eq!(seeds.next(&dataset, &assignments), Some(1));
        assignments.assign(1, 2);
        assignments.assign(0, 2);
        assert_eq!(seeds.next(&dataset, &assignments), None);
    }
}
