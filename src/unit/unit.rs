use std::sync::Arc;

/// An areal unit (tract, block group, precinct, ...) and its fixed
/// attributes. Geometry is held alongside, in the dataset's spatial index.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: Arc<str>,
    population: u64,
    area: f64,
    density: f64, // population / area, fixed at load time
}

impl Unit {
    pub fn new(id: impl Into<Arc<str>>, population: u64, area: f64) -> Self {
        Self { id: id.into(), population, area, density: population as f64 / area }
    }

    #[inline] pub fn id(&self) -> &str { &self.id }

    #[inline] pub(crate) fn id_arc(&self) -> &Arc<str> { &self.id }

    #[inline] pub fn population(&self) -> u64 { self.population }

    #[inline] pub fn area(&self) -> f64 { self.area }

    #[inline] pub fn density(&self) -> f64 { self.density }
}
