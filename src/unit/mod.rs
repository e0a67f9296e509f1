mod dataset;
mod unit;

pub use dataset::UnitDataset;
pub use unit::Unit;
