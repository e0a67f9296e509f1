use std::{fs::File, io::BufWriter, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};

use crate::{config::DataConfig, district::Districting, io::{csv::parse_population, UnitRecord}, unit::UnitDataset};

/// Read units from a GeoJSON `FeatureCollection` of Polygon/MultiPolygon
/// features. Ids, populations and areas are taken from the feature
/// properties named in `data`; population and area may be absent.
pub fn read_geojson(path: &Path, data: &DataConfig) -> Result<Vec<UnitRecord>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to read GeoJSON file: {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("[io::geojson] Failed to parse GeoJSON: {}", path.display()))?;

    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] Expected a FeatureCollection in {}", path.display()))?;

    features.iter().enumerate()
        .map(|(i, feature)| parse_feature(feature, data).with_context(|| format!("[io::geojson] Invalid feature #{i}")))
        .collect()
}

fn parse_feature(feature: &Value, data: &DataConfig) -> Result<UnitRecord> {
    let properties = feature["properties"].as_object()
        .ok_or_else(|| anyhow!("missing properties"))?;

    let id = match properties.get(&data.id_field) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => bail!("missing or invalid id property: {}", data.id_field),
    };

    let population = match properties.get(&data.population_field) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => Some(parse_population(&n.to_string())?),
        Some(Value::String(s)) => Some(parse_population(s)?),
        Some(other) => bail!("invalid population for '{id}': {other}"),
    };

    let area = match properties.get(&data.area_field) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_f64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| anyhow!("invalid area for '{id}': {value}"))?),
    };

    let shape = parse_geometry(&feature["geometry"]).with_context(|| format!("unit '{id}'"))?;

    Ok(UnitRecord { id, population, area, shape })
}

/// Parse a GeoJSON Polygon or MultiPolygon geometry object.
fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()
        .ok_or_else(|| anyhow!("missing geometry coordinates"))?;

    match geometry["type"].as_str() {
        Some("Polygon") => Ok(MultiPolygon(vec![parse_polygon(coords)?])),
        Some("MultiPolygon") => Ok(MultiPolygon(coords.iter()
            .map(|polygon| polygon.as_array()
                .ok_or_else(|| anyhow!("invalid polygon in MultiPolygon"))
                .and_then(|rings| parse_polygon(rings)))
            .collect::<Result<Vec<_>>>()?)),
        Some(other) => bail!("unsupported geometry type: {other}"),
        None => bail!("missing geometry type"),
    }
}

/// Parse `[exterior, hole, hole, ...]` ring arrays into a polygon.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("invalid ring"))
            .and_then(|coords| parse_ring(coords))
    });

    let exterior = rings.next().ok_or_else(|| anyhow!("polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from `[[x, y], [x, y], ...]`, closing it if needed.
fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let x = pair[0].as_f64().ok_or_else(|| anyhow!("invalid coordinate: x must be a number"))?;
            let y = pair[1].as_f64().ok_or_else(|| anyhow!("invalid coordinate: y must be a number"))?;
            Ok(Coord { x, y })
        })
        .collect::<Result<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) && first != last {
        points.push(first);
    }
    Ok(LineString(points))
}

/// Convert a MultiPolygon to GeoJSON coordinates.
fn multipolygon_coords(shape: &MultiPolygon<f64>) -> Value {
    fn ring(ls: &LineString<f64>) -> Value {
        Value::Array(ls.coords().map(|c| json!([c.x, c.y])).collect())
    }

    Value::Array(shape.0.iter()
        .map(|polygon| Value::Array(
            std::iter::once(polygon.exterior()).chain(polygon.interiors()).map(ring).collect()
        ))
        .collect())
}

/// Write every unit's geometry annotated with its `district` (0 when
/// unassigned), for rendering by an external tool.
pub fn write_geojson(dataset: &UnitDataset, districting: &Districting, path: &Path) -> Result<()> {
    let features = (0..dataset.len()).map(|idx| {
        let mut properties = Map::new();
        properties.insert("id".into(), json!(districting.unit_id(idx)));
        properties.insert("population".into(), json!(dataset.unit(idx).population()));
        properties.insert("district".into(), json!(districting.assignment(idx)));
        json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": multipolygon_coords(dataset.geometry(idx)),
            },
            "properties": properties,
        })
    }).collect::<Vec<_>>();

    let mut collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    if let Some(bounds) = dataset.geometries().bounds() {
        collection["bbox"] = json!([bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y]);
    }

    let file = File::create(path)
        .with_context(|| format!("[io::geojson] Failed to create GeoJSON file: {}", path.display()))?;
    serde_json::to_writer(BufWriter::new(file), &collection)
        .with_context(|| format!("[io::geojson] Failed to write GeoJSON to {:?}", path))
}
