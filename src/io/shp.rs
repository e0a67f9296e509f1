use std::path::Path;

use anyhow::{Context, Result, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};

use crate::{config::DataConfig, io::{csv::parse_population, UnitRecord}};

/// Read every polygon and its attribute record from a `.shp` file.
///
/// The id comes from `data.shape_id_field`; population and area are read
/// from `data.population_field` / `data.area_field` when the table has them.
pub fn read_shapefile(path: &Path, data: &DataConfig) -> Result<Vec<UnitRecord>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut records = Vec::with_capacity(reader.shape_count()?);
    for (i, item) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = item.with_context(|| format!("[io::shp] Error reading shape+record #{i}"))?;
        records.push(
            shape_to_record(shape, &record, data)
                .with_context(|| format!("[io::shp] Invalid record #{i} in {}", path.display()))?
        );
    }
    Ok(records)
}

fn shape_to_record(shape: Shape, record: &Record, data: &DataConfig) -> Result<UnitRecord> {
    let id = get_character_field(record, &data.shape_id_field)?;
    let shape = match shape {
        Shape::Polygon(polygon) => shp_to_geo(&polygon),
        other => bail!("found non-Polygon shape for unit '{id}': {:?}", other.shapetype()),
    };

    let population = match get_optional_number(record, &data.population_field)? {
        Some(value) => Some(parse_population(&value.to_string()).with_context(|| format!("unit '{id}'"))?),
        None => None,
    };
    let area = get_optional_number(record, &data.area_field)?;

    Ok(UnitRecord { id, population, area, shape })
}

/// Get the value of a character field from a Record
fn get_character_field(record: &Record, field: &str) -> Result<String> {
    match record.get(field) {
        Some(FieldValue::Character(Some(s))) => Ok(s.trim().to_string()),
        Some(FieldValue::Numeric(Some(n))) => Ok(n.to_string()),
        _ => bail!("missing or invalid character field: {}", field)
    }
}

/// Get a numeric field from a Record, if present (numbers stored as text are parsed)
fn get_optional_number(record: &Record, field: &str) -> Result<Option<f64>> {
    Ok(match record.get(field) {
        None => None,
        Some(FieldValue::Numeric(n)) => *n,
        Some(FieldValue::Float(n)) => n.map(f64::from),
        Some(FieldValue::Double(n)) => Some(*n),
        Some(FieldValue::Integer(n)) => Some(f64::from(*n)),
        Some(FieldValue::Character(None)) => None,
        Some(FieldValue::Character(Some(s))) => Some(s.trim().parse()
            .with_context(|| format!("field {field} is not a number: {s:?}"))?),
        Some(other) => bail!("invalid numeric field {}: {:?}", field, other),
    })
}

/// Convert a shapefile polygon to a MultiPolygon, attaching each inner ring
/// to the outer ring that precedes it.
fn shp_to_geo(polygon: &shapefile::Polygon) -> MultiPolygon<f64> {
    fn ring(points: &[shapefile::Point]) -> LineString<f64> {
        let mut coords = points.iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect::<Vec<_>>();
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) && first != last {
            coords.push(first);
        }
        LineString(coords)
    }

    let mut polygons = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();

    for r in polygon.rings() {
        match r {
            PolygonRing::Outer(points) => {
                if let Some(ext) = exterior.replace(ring(points)) {
                    polygons.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
            }
            PolygonRing::Inner(points) => holes.push(ring(points)),
        }
    }
    if let Some(ext) = exterior {
        polygons.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polygons)
}
