use tracing::{debug, info, warn};

use crate::{
    config::RunConfig,
    district::{
        frontier::{Frontier, SeedCursor},
        repair::TopologyRepair,
        Assignments, CancelToken, DistrictStatus, DistrictSummary, Districting,
    },
    error::{ConfigError, Error, Result},
    graph::AdjacencyGraph,
    unit::UnitDataset,
};

/// Grows districts one at a time from the densest unassigned unit,
/// absorbing the densest neighboring unit until each district reaches
/// `total population / district count`.
///
/// Density ties, for seeds and neighbors alike, go to the smallest unit id,
/// which makes every run over the same inputs produce the same mapping.
#[derive(Debug)]
pub struct DistrictBuilder<'a> {
    dataset: &'a UnitDataset,
    graph: &'a AdjacencyGraph,
    num_districts: u32,
    hole_filler: bool,
    threshold: f64,
    cancel: Option<CancelToken>,
}

/// Mutable state shared by all districts of one run.
struct Run {
    assignments: Assignments,
    frontier: Frontier,
    seeds: SeedCursor,
}

impl<'a> DistrictBuilder<'a> {
    /// Prepare a run over `dataset` using a graph built for it.
    pub fn new(dataset: &'a UnitDataset, graph: &'a AdjacencyGraph, num_districts: u32, hole_filler: bool) -> std::result::Result<Self, ConfigError> {
        if num_districts < 1 { return Err(ConfigError::NoDistricts) }
        if dataset.is_empty() { return Err(ConfigError::EmptyUnits) }
        assert!(graph.node_count() == dataset.len(), "graph.node_count() must equal number of units");

        Ok(Self {
            dataset,
            graph,
            num_districts,
            hole_filler,
            threshold: dataset.total_population() as f64 / num_districts as f64,
            cancel: None,
        })
    }

    /// Check `cancel` before each district and stop early once it is set.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Population each district grows toward.
    #[inline] pub fn threshold(&self) -> f64 { self.threshold }

    /// Run the greedy growth loop for every district.
    pub fn run(&self) -> Result<Districting> {
        info!(
            units = self.dataset.len(),
            districts = self.num_districts,
            threshold = self.threshold,
            contiguity = %self.graph.contiguity(),
            hole_filler = self.hole_filler,
            "beginning districting"
        );

        let n = self.dataset.len();
        let mut run = Run {
            assignments: Assignments::new(n),
            frontier: Frontier::new(n),
            seeds: SeedCursor::default(),
        };

        let mut districts = Vec::with_capacity(self.num_districts as usize);
        for id in 1..=self.num_districts {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                warn!(completed = id - 1, "districting cancelled");
                return Err(Error::Cancelled { completed: id - 1 })
            }
            districts.push(self.grow(id, &mut run));
        }

        let districting = Districting::new(self.dataset, self.threshold, run.assignments.into_vec(), districts);
        let unassigned = districting.unassigned().len();
        if unassigned > 0 {
            warn!(units = unassigned, population = districting.unassigned_population(), "units left unassigned");
        }
        Ok(districting)
    }

    /// Seed and grow a single district.
    fn grow(&self, id: u32, run: &mut Run) -> DistrictSummary {
        let Some(seed) = run.seeds.next(self.dataset, &run.assignments) else {
            warn!(district = id, "no unassigned unit left to seed district");
            return DistrictSummary::exhausted(id)
        };

        let mut district = DistrictSummary {
            id,
            population: 0,
            members: Vec::new(),
            status: DistrictStatus::Complete,
            fragments: 0,
        };
        run.frontier.reset(id);
        let mut repair = self.hole_filler.then(|| TopologyRepair::new(self.dataset.region()));

        self.absorb(seed, &mut district, run);
        info!(district = id, seed = self.dataset.unit(seed).id(), population = district.population, "seeded district");
        self.repair(&mut repair, seed, &mut district, run);

        district.status = loop {
            if district.population as f64 >= self.threshold { break DistrictStatus::Complete }

            let Some(next) = run.frontier.pop(&run.assignments) else {
                warn!(district = id, population = district.population, "no possible neighbors to add");
                break DistrictStatus::Stalled
            };

            self.absorb(next, &mut district, run);
            debug!(district = id, unit = self.dataset.unit(next).id(), population = district.population, "absorbed unit");
            self.repair(&mut repair, next, &mut district, run);
        };

        info!(
            district = id,
            population = district.population,
            members = district.members.len(),
            status = %district.status,
            "district finalized"
        );
        district
    }

    /// Commit `unit` to the district and queue its neighbors.
    fn absorb(&self, unit: usize, district: &mut DistrictSummary, run: &mut Run) {
        run.assignments.assign(unit, district.id);
        district.members.push(unit);
        district.population += self.dataset.unit(unit).population();
        run.frontier.extend_from(unit, self.dataset, self.graph, &run.assignments);
    }

    /// Remove an absorbed unit from the remaining area, then claim the
    /// fragments that fit under the threshold. If the geometry operation
    /// fails, repair is switched off for the rest of the district.
    fn repair(&self, repair: &mut Option<TopologyRepair>, unit: usize, district: &mut DistrictSummary, run: &mut Run) {
        let Some(state) = repair.as_mut() else { return };
        if let Err(err) = state.subtract(self.dataset.geometry(unit)) {
            warn!(unit = self.dataset.unit(unit).id(), error = %err, "disabling hole filling for this district");
            *repair = None;
            return
        }
        if district.population as f64 >= self.threshold { return }

        for fragment in state.fill(self.dataset, &run.assignments, self.threshold, district.population) {
            info!(district = district.id, units = fragment.units.len(), population = fragment.population, "filled a hole or exclave");
            for unit in fragment.units {
                // A unit straddling two parts is claimed by the first.
                if !run.assignments.is_assigned(unit) { self.absorb(unit, district, run) }
            }
            district.fragments += 1;
        }
    }
}

/// Build the adjacency graph for `config.contiguity` and run the builder.
pub fn build_districts(dataset: &UnitDataset, config: &RunConfig) -> Result<Districting> {
    config.validate()?;
    let graph = AdjacencyGraph::build(dataset, config.contiguity)?;
    DistrictBuilder::new(dataset, &graph, config.num_districts, config.hole_filler)?.run()
}
