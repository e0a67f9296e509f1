use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Geometric adjacency test between two units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contiguity {
    /// Units must share a boundary segment of positive length.
    #[default]
    Rook,
    /// Sharing a single boundary point is enough.
    Queen,
}

impl FromStr for Contiguity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rook" => Ok(Self::Rook),
            "queen" => Ok(Self::Queen),
            _ => Err(ConfigError::UnknownContiguity(s.to_string())),
        }
    }
}

impl fmt::Display for Contiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rook => write!(f, "rook"),
            Self::Queen => write!(f, "queen"),
        }
    }
}

/// Parameters of a single districting run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub contiguity: Contiguity,
    pub num_districts: u32,
    /// Absorb holes and exclaves created by greedy growth.
    pub hole_filler: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { contiguity: Contiguity::Rook, num_districts: 1, hole_filler: true }
    }
}

impl RunConfig {
    pub fn new(contiguity: Contiguity, num_districts: u32, hole_filler: bool) -> Self {
        Self { contiguity, num_districts, hole_filler }
    }

    /// Reject configurations the builder cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_districts < 1 { return Err(ConfigError::NoDistricts) }
        Ok(())
    }
}

/// Attribute names used when reading units from external files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Id property of GeoJSON features and id column of a population table.
    pub id_field: String,
    /// Id attribute of shapefile records.
    pub shape_id_field: String,
    pub population_field: String,
    pub area_field: String,
    /// Field separator of a delimited population table.
    pub separator: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            id_field: "GEOID".into(),
            shape_id_field: "GEOID10".into(),
            population_field: "POP10".into(),
            area_field: "ALAND".into(),
            separator: '\t',
        }
    }
}

/// On-disk configuration file: `{ "run": {..}, "data": {..} }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
    pub data: DataConfig,
}

impl Config {
    /// Load a configuration from a JSON file; missing keys take defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[config] Failed to open config file: {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[config] Failed to parse config file: {}", path.display()))?;
        config.run.validate()?;
        Ok(config)
    }
}
