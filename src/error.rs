use thiserror::Error;

/// Fatal problems with the run configuration or input units, raised before
/// any assignment begins.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unrecognized contiguity rule '{0}' (expected 'rook' or 'queen')")]
    UnknownContiguity(String),

    #[error("district count must be at least 1")]
    NoDistricts,

    #[error("unit collection is empty")]
    EmptyUnits,

    #[error("duplicate unit id '{0}'")]
    DuplicateId(String),

    #[error("unit '{id}' has invalid area {area} (must be positive and finite)")]
    InvalidArea { id: String, area: f64 },

    #[error("unit '{0}' has empty geometry")]
    EmptyGeometry(String),
}

/// A geometric computation could not be carried out on the given input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("spatial predicate failed: {0}")]
    Predicate(String),
}

/// Errors returned by the districting core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("run cancelled after {completed} finalized district(s)")]
    Cancelled { completed: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
