use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::info;

use crate::{
    config::{Contiguity, RunConfig},
    district::{DistrictBuilder, Districting},
    error::{GeometryError, Result},
    graph::AdjacencyGraph,
    unit::UnitDataset,
};

/// Run several independent districtings over one dataset in parallel.
///
/// Each adjacency graph is built once per contiguity rule and shared by
/// every job that uses it. Results come back in the order of `jobs`; a
/// failing job does not affect the others.
pub fn run_batch(dataset: &UnitDataset, jobs: &[RunConfig]) -> Vec<Result<Districting>> {
    let mut rules = jobs.iter().map(|job| job.contiguity).collect::<Vec<_>>();
    rules.sort();
    rules.dedup();

    let graphs = rules.into_par_iter()
        .map(|rule| (rule, AdjacencyGraph::build(dataset, rule)))
        .collect::<BTreeMap<Contiguity, std::result::Result<AdjacencyGraph, GeometryError>>>();

    // Force the region union once instead of racing to build it.
    if jobs.iter().any(|job| job.hole_filler) { let _ = dataset.region(); }

    info!(jobs = jobs.len(), graphs = graphs.len(), "running districting batch");

    jobs.par_iter()
        .map(|job| {
            job.validate()?;
            let graph = graphs[&job.contiguity].as_ref().map_err(|err| err.clone())?;
            DistrictBuilder::new(dataset, graph, job.num_districts, job.hole_filler)?.run()
        })
        .collect()
}
