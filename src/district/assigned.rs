/// The run-wide assigned set: which district (if any) owns each unit.
///
/// Owned by a single run. A unit moves from 0 (unassigned) to a positive
/// district id exactly once and never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignments {
    districts: Vec<u32>,
    assigned: usize,
}

impl Assignments {
    /// Create an assignment table with every unit unassigned.
    pub fn new(num_units: usize) -> Self {
        Self { districts: vec![0; num_units], assigned: 0 }
    }

    /// District of a unit, or 0 if unassigned.
    #[inline] pub fn district(&self, unit: usize) -> u32 { self.districts[unit] }

    #[inline] pub fn is_assigned(&self, unit: usize) -> bool { self.districts[unit] != 0 }

    /// Number of units assigned so far.
    #[inline] pub fn num_assigned(&self) -> usize { self.assigned }

    /// Get the per-unit district labels in dataset order.
    #[inline] pub fn as_slice(&self) -> &[u32] { &self.districts }

    /// Record `unit` as a member of `district`.
    ///
    /// Panics if the unit already belongs to a district.
    pub(crate) fn assign(&mut self, unit: usize, district: u32) {
        assert!(district > 0, "district ids start at 1");
        assert!(self.districts[unit] == 0, "unit {unit} already assigned to district {}", self.districts[unit]);
        self.districts[unit] = district;
        self.assigned += 1;
    }

    pub(crate) fn into_vec(self) -> Vec<u32> { self.districts }
}
