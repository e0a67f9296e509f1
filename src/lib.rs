#![doc = "Greedy, density-driven districting of areal units"]
mod config;
mod district;
mod error;
mod geom;
mod graph;
mod unit;

pub mod io;

#[doc(inline)]
pub use config::{Config, Contiguity, DataConfig, RunConfig};

#[doc(inline)]
pub use district::{build_districts, run_batch, Assignments, CancelToken, DistrictBuilder, DistrictStatus, DistrictSummary, Districting};

#[doc(inline)]
pub use error::{ConfigError, Error, GeometryError, Result};

#[doc(inline)]
pub use graph::AdjacencyGraph;

#[doc(inline)]
pub use unit::{Unit, UnitDataset};
