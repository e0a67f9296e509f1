use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::district::{DistrictStatus, Districting};

#[derive(Serialize)]
struct Report<'a> {
    threshold: f64,
    num_districts: u32,
    assigned_population: u64,
    unassigned_population: u64,
    unassigned: Vec<&'a str>,
    districts: Vec<DistrictReport<'a>>,
}

#[derive(Serialize)]
struct DistrictReport<'a> {
    id: u32,
    population: u64,
    members: usize,
    status: DistrictStatus,
    fragments_filled: u32,
    seed: Option<&'a str>,
}

impl<'a> Report<'a> {
    fn new(districting: &'a Districting) -> Self {
        Self {
            threshold: districting.threshold(),
            num_districts: districting.num_districts(),
            assigned_population: districting.assigned_population(),
            unassigned_population: districting.unassigned_population(),
            unassigned: districting.unassigned(),
            districts: districting.districts().iter()
                .map(|district| DistrictReport {
                    id: district.id(),
                    population: district.population(),
                    members: district.member_count(),
                    status: district.status(),
                    fragments_filled: district.fragments_filled(),
                    seed: district.seed().map(|unit| districting.unit_id(unit)),
                })
                .collect(),
        }
    }
}

/// Write the per-district summary of a run as pretty-printed JSON.
pub fn write_summary(districting: &Districting, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::json] Failed to create summary file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &Report::new(districting))
        .with_context(|| format!("[io::json] Failed to write summary to {:?}", path))
}
