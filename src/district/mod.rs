mod assigned;
mod batch;
mod builder;
mod cancel;
mod frontier;
mod repair;
mod summary;

pub use assigned::Assignments;
pub use batch::run_batch;
pub use builder::{build_districts, DistrictBuilder};
pub use cancel::CancelToken;
pub use summary::{DistrictStatus, DistrictSummary, Districting};
