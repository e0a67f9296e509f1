//! File adapters for loading units and exporting districting results.
//!
//! # Format Modules
//!
//! - `geojson` - GeoJSON feature collections (unit input, annotated output)
//! - `shp` - ESRI shapefiles with a dBase attribute table (unit input)
//! - `csv` - delimited population tables (input) and assignments (output)
//! - `json` - per-district run summaries (output)

mod csv;
mod geojson;
mod json;
mod shp;

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use geo::{Area, MultiPolygon};
use tracing::{info, warn};

use crate::{config::DataConfig, unit::{Unit, UnitDataset}};

pub use csv::{read_population_table, write_assignments, PopulationTable};
pub use geojson::{read_geojson, write_geojson};
pub use json::write_summary;
pub use shp::read_shapefile;

/// One unit as read from a file, before population data is resolved.
#[derive(Clone, Debug)]
pub struct UnitRecord {
    pub id: String,
    pub population: Option<u64>,
    pub area: Option<f64>,
    pub shape: MultiPolygon<f64>,
}

/// Load a unit dataset, choosing the reader by file extension.
///
/// With a population table, records are inner-joined against it by id and
/// population and area come from the table. Without one, each record must
/// carry its own population; a missing area falls back to planar area.
pub fn read_units(path: &Path, data: &DataConfig, population: Option<&Path>) -> Result<UnitDataset> {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    let records = match extension.as_deref() {
        Some("geojson" | "json") => read_geojson(path, data)?,
        Some("shp") => read_shapefile(path, data)?,
        _ => bail!("[io] Unsupported unit file (expected .geojson, .json or .shp): {}", path.display()),
    };

    let table = population.map(|table| read_population_table(table, data)).transpose()?;
    let dataset = assemble(records, table.as_ref())
        .with_context(|| format!("[io] Invalid units in {}", path.display()))?;

    info!(path = %path.display(), units = dataset.len(), population = dataset.total_population(), "loaded units");
    Ok(dataset)
}

/// Resolve population and area for every record and build the dataset.
pub fn assemble(records: Vec<UnitRecord>, table: Option<&PopulationTable>) -> Result<UnitDataset> {
    let total = records.len();
    let mut units = Vec::with_capacity(total);
    let mut shapes = Vec::with_capacity(total);

    for record in records {
        let (population, area) = match table {
            Some(table) => match table.get(&record.id) {
                Some(&(population, area)) => (population, area),
                None => continue,
            },
            None => {
                let Some(population) = record.population else {
                    bail!("[io] Unit '{}' has no population value", record.id)
                };
                (population, record.area.unwrap_or_else(|| record.shape.unsigned_area()))
            }
        };
        units.push(Unit::new(record.id, population, area));
        shapes.push(record.shape);
    }

    if units.len() < total {
        warn!(dropped = total - units.len(), "units missing from the population table were dropped");
    }
    ensure!(!units.is_empty() || total == 0, "[io] No unit matched the population table");

    Ok(UnitDataset::new(units, shapes)?)
}

#[cfg(test)]
mod tests {
    use ahash::AHashMap;
    use geo::{Coord, Rect};

    use super::*;

    fn record(id: &str, population: Option<u64>, area: Option<f64>, x: f64) -> UnitRecord {
        UnitRecord {
            id: id.into(),
            population,
            area,
            shape: MultiPolygon(vec![Rect::new(Coord { x, y: 0.0 }, Coord { x: x + 2.0, y: 2.0 }).to_polygon()]),
        }
    }

    #[test]
    fn missing_area_falls_back_to_planar_area() {
        let dataset = assemble(vec![record("a", Some(8), None, 0.0)], None).unwrap();
        assert_eq!(dataset.unit(0).area(), 4.0);
        assert_eq!(dataset.unit(0).density(), 2.0);
    }

    #[test]
    fn missing_population_without_table_is_an_error() {
        assert!(assemble(vec![record("a", None, Some(1.0), 0.0)], None).is_err());
    }

    #[test]
    fn table_join_drops_unmatched_records() {
        let table = PopulationTable::from_map(AHashMap::from_iter([("b".to_string(), (30, 3.0))]));
        let records = vec![record("a", Some(1), None, 0.0), record("b", None, None, 2.0)];

        let dataset = assemble(records, Some(&table)).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.unit(0).id(), "b");
        assert_eq!(dataset.unit(0).population(), 30);
        assert_eq!(dataset.unit(0).area(), 3.0);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(read_units(Path::new("units.kml"), &DataConfig::default(), None).is_err());
    }
}
