use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::unit::UnitDataset;

/// How a district's growth ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistrictStatus {
    /// Population reached the threshold.
    Complete,
    /// No unassigned neighbor was left before the threshold was reached.
    Stalled,
    /// No unassigned unit was left to seed the district.
    Exhausted,
}

impl fmt::Display for DistrictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Stalled => write!(f, "stalled"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Final state of one district.
#[derive(Clone, Debug, PartialEq)]
pub struct DistrictSummary {
    pub(crate) id: u32,
    pub(crate) population: u64,
    pub(crate) members: Vec<usize>, // Dense unit indices, in absorption order
    pub(crate) status: DistrictStatus,
    pub(crate) fragments: u32,      // Holes/exclaves absorbed by repair
}

impl DistrictSummary {
    pub(crate) fn exhausted(id: u32) -> Self {
        Self { id, population: 0, members: Vec::new(), status: DistrictStatus::Exhausted, fragments: 0 }
    }

    #[inline] pub fn id(&self) -> u32 { self.id }

    #[inline] pub fn population(&self) -> u64 { self.population }

    /// Member units as dense indices, in the order they were absorbed.
    #[inline] pub fn members(&self) -> &[usize] { &self.members }

    #[inline] pub fn member_count(&self) -> usize { self.members.len() }

    #[inline] pub fn status(&self) -> DistrictStatus { self.status }

    /// Number of holes or exclaves absorbed by topology repair.
    #[inline] pub fn fragments_filled(&self) -> u32 { self.fragments }

    /// The seed unit, if the district has any members.
    #[inline] pub fn seed(&self) -> Option<usize> { self.members.first().copied() }
}

/// The outcome of a districting run.
#[derive(Clone, Debug)]
pub struct Districting {
    threshold: f64,
    ids: Vec<Arc<str>>,
    populations: Vec<u64>,
    assignments: Vec<u32>, // District per unit (0 = never assigned)
    districts: Vec<DistrictSummary>,
}

impl Districting {
    pub(crate) fn new(dataset: &UnitDataset, threshold: f64, assignments: Vec<u32>, districts: Vec<DistrictSummary>) -> Self {
        assert!(assignments.len() == dataset.len(), "assignments.len() must equal number of units");
        Self {
            threshold,
            ids: dataset.units().iter().map(|unit| unit.id_arc().clone()).collect(),
            populations: dataset.units().iter().map(|unit| unit.population()).collect(),
            assignments,
            districts,
        }
    }

    /// The trivial single-district plan: every unit in district 1.
    pub fn whole(dataset: &UnitDataset) -> Self {
        let members = (0..dataset.len()).collect::<Vec<_>>();
        let population = dataset.total_population();
        Self::new(
            dataset,
            population as f64,
            vec![1; dataset.len()],
            vec![DistrictSummary { id: 1, population, members, status: DistrictStatus::Complete, fragments: 0 }],
        )
    }

    /// Population target per district (total population / district count).
    #[inline] pub fn threshold(&self) -> f64 { self.threshold }

    /// Number of districts requested, including empty ones.
    #[inline] pub fn num_districts(&self) -> u32 { self.districts.len() as u32 }

    /// Per-district summaries, ordered by district id.
    #[inline] pub fn districts(&self) -> &[DistrictSummary] { &self.districts }

    /// Summary of a single district (ids start at 1).
    pub fn district(&self, id: u32) -> Option<&DistrictSummary> {
        id.checked_sub(1).and_then(|i| self.districts.get(i as usize))
    }

    /// District labels in dataset order (0 = never assigned).
    #[inline] pub fn assignment_vec(&self) -> &[u32] { &self.assignments }

    /// Id of the unit at a dense index.
    #[inline] pub fn unit_id(&self, unit: usize) -> &str { &self.ids[unit] }

    /// District of the unit at a dense index.
    #[inline] pub fn assignment(&self, unit: usize) -> u32 { self.assignments[unit] }

    /// Iterate over (unit id, district) pairs in dataset order.
    pub fn assignments(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.ids.iter().map(|id| &**id).zip(self.assignments.iter().copied())
    }

    /// Ids of units that no district reached.
    pub fn unassigned(&self) -> Vec<&str> {
        self.assignments().filter(|&(_, d)| d == 0).map(|(id, _)| id).collect()
    }

    /// Total population of units that no district reached.
    pub fn unassigned_population(&self) -> u64 {
        self.assignments.iter().zip(&self.populations)
            .filter(|&(&d, _)| d == 0)
            .map(|(_, &pop)| pop)
            .sum()
    }

    /// Total population across all districts.
    pub fn assigned_population(&self) -> u64 {
        self.districts.iter().map(|district| district.population).sum()
    }

    /// Districts that ended below the threshold (stalled or exhausted).
    pub fn under_threshold(&self) -> impl Iterator<Item = &DistrictSummary> + '_ {
        self.districts.iter().filter(|district| district.status != DistrictStatus::Complete)
    }
}
