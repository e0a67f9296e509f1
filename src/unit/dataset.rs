use std::sync::{Arc, OnceLock};

use ahash::AHashMap;
use geo::MultiPolygon;
use tracing::debug;

use crate::{error::ConfigError, geom::Geometries, unit::Unit};

/// The units of one region, indexed by id, with their geometry.
///
/// Read-only once constructed; a run's assignments live in the run itself,
/// so one dataset can back many independent runs at once.
#[derive(Debug)]
pub struct UnitDataset {
    units: Vec<Unit>,
    index: AHashMap<Arc<str>, usize>, // Map between unit ids and dense indices.
    geoms: Geometries,
    id_rank: Vec<u32>,         // Position of each unit in ascending id order.
    density_order: Vec<usize>, // Units by density (desc), ties by id (asc).
    total_population: u64,
    region: OnceLock<MultiPolygon<f64>>, // Union of all shapes, computed on first use.
}

impl UnitDataset {
    /// Construct a dataset from units and their shapes (same order).
    pub fn new(units: Vec<Unit>, shapes: Vec<MultiPolygon<f64>>) -> Result<Self, ConfigError> {
        assert!(units.len() == shapes.len(), "units.len() must equal shapes.len()");
        if units.is_empty() { return Err(ConfigError::EmptyUnits) }

        let mut index = AHashMap::with_capacity(units.len());
        for (i, (unit, shape)) in units.iter().zip(&shapes).enumerate() {
            if !(unit.area().is_finite() && unit.area() > 0.0) {
                return Err(ConfigError::InvalidArea { id: unit.id().to_string(), area: unit.area() })
            }
            if !Geometries::is_usable(shape) {
                return Err(ConfigError::EmptyGeometry(unit.id().to_string()))
            }
            if index.insert(unit.id_arc().clone(), i).is_some() {
                return Err(ConfigError::DuplicateId(unit.id().to_string()))
            }
        }

        let mut by_id = (0..units.len()).collect::<Vec<_>>();
        by_id.sort_by(|&a, &b| units[a].id().cmp(units[b].id()));
        let mut id_rank = vec![0u32; units.len()];
        by_id.iter().enumerate().for_each(|(rank, &i)| id_rank[i] = rank as u32);

        let mut density_order = (0..units.len()).collect::<Vec<_>>();
        density_order.sort_by(|&a, &b| {
            units[b].density().total_cmp(&units[a].density())
                .then(id_rank[a].cmp(&id_rank[b]))
        });

        let total_population = units.iter().map(|unit| unit.population()).sum();
        debug!(units = units.len(), total_population, "unit dataset loaded");

        Ok(Self {
            geoms: Geometries::new(shapes),
            units,
            index,
            id_rank,
            density_order,
            total_population,
            region: OnceLock::new(),
        })
    }

    /// Construct a dataset from (unit, shape) pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Unit, MultiPolygon<f64>)>) -> Result<Self, ConfigError> {
        let (units, shapes) = pairs.into_iter().unzip();
        Self::new(units, shapes)
    }

    /// Get the number of units.
    #[inline] pub fn len(&self) -> usize { self.units.len() }

    /// Check if there are no units (never true for a constructed dataset).
    #[inline] pub fn is_empty(&self) -> bool { self.units.is_empty() }

    /// Get all units in load order.
    #[inline] pub fn units(&self) -> &[Unit] { &self.units }

    /// Get the unit at a dense index.
    #[inline] pub fn unit(&self, idx: usize) -> &Unit { &self.units[idx] }

    /// Look up a unit's dense index by id.
    #[inline] pub fn index_of(&self, id: &str) -> Option<usize> { self.index.get(id).copied() }

    /// Get the shape of the unit at a dense index.
    #[inline] pub fn geometry(&self, idx: usize) -> &MultiPolygon<f64> { self.geoms.shape(idx) }

    /// Sum of all unit populations.
    #[inline] pub fn total_population(&self) -> u64 { self.total_population }

    /// Get the geometry store (shapes and spatial index).
    #[inline] pub(crate) fn geometries(&self) -> &Geometries { &self.geoms }

    /// Position of a unit in ascending id order; used to break density ties.
    #[inline] pub(crate) fn id_rank(&self, idx: usize) -> u32 { self.id_rank[idx] }

    /// All units ordered by density (descending), ties by smallest id.
    #[inline] pub(crate) fn density_order(&self) -> &[usize] { &self.density_order }

    /// Geometric union of every unit, computed once and cached.
    pub fn region(&self) -> &MultiPolygon<f64> {
        self.region.get_or_init(|| {
            let region = self.geoms.union();
            debug!(parts = region.0.len(), "region union computed");
            region
        })
    }
}
