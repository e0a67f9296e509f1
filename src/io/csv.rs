//! Delimited population tables and assignment CSVs.

use std::{fs::File, path::Path};

use ahash::AHashMap;
use anyhow::{Context, Result, anyhow, ensure};
use polars::{frame::DataFrame, io::{SerReader, SerWriter}, prelude::{CsvReadOptions, CsvWriter, NamedFrom, StringChunked}, series::Series};

use crate::{config::DataConfig, district::Districting};

/// Population and land area per unit id, read from a delimited table.
#[derive(Clone, Debug, Default)]
pub struct PopulationTable {
    rows: AHashMap<String, (u64, f64)>,
}

impl PopulationTable {
    pub fn from_map(rows: AHashMap<String, (u64, f64)>) -> Self { Self { rows } }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// (population, area) of a unit id.
    #[inline] pub fn get(&self, id: &str) -> Option<&(u64, f64)> { self.rows.get(id) }
}

/// Read a population table with a header row, using the id, population and
/// area column names and separator from `data`.
///
/// Every column is read as a string so ids keep their leading zeros.
pub fn read_population_table(path: &Path, data: &DataConfig) -> Result<PopulationTable> {
    ensure!(data.separator.is_ascii(), "[io::csv] Separator must be a single ASCII character, got {:?}", data.separator);

    let file = File::open(path)
        .with_context(|| format!("[io::csv] Failed to open population table: {}", path.display()))?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .map_parse_options(|po| po.with_separator(data.separator as u8))
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv] Failed to read population table from {:?}", path))?;

    table_from_dataframe(&df, data)
        .with_context(|| format!("[io::csv] Invalid population table: {}", path.display()))
}

fn table_from_dataframe(df: &DataFrame, data: &DataConfig) -> Result<PopulationTable> {
    /// Get a column of the table as strings
    fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
        df.column(name)
            .with_context(|| format!("missing column {name:?}"))?
            .str()
            .with_context(|| format!("column {name:?} must be of type String"))
    }

    let ids = string_column(df, &data.id_field)?;
    let pops = string_column(df, &data.population_field)?;
    let areas = string_column(df, &data.area_field)?;

    let mut rows = AHashMap::with_capacity(df.height());
    for (row, ((id, pop), area)) in ids.into_iter().zip(pops).zip(areas).enumerate() {
        let id = id.map(str::trim).filter(|id| !id.is_empty())
            .ok_or_else(|| anyhow!("row {row}: missing id"))?;
        let pop = pop.ok_or_else(|| anyhow!("row {row}: missing population for '{id}'"))?;
        let area = area.ok_or_else(|| anyhow!("row {row}: missing area for '{id}'"))?;

        let population = parse_population(pop).with_context(|| format!("row {row}: unit '{id}'"))?;
        let area = area.trim().parse::<f64>()
            .with_context(|| format!("row {row}: invalid area {area:?} for unit '{id}'"))?;

        ensure!(rows.insert(id.to_string(), (population, area)).is_none(), "duplicate id '{id}' in population table");
    }

    Ok(PopulationTable { rows })
}

/// Parse a population count, accepting integral decimals such as "120.0".
pub(crate) fn parse_population(value: &str) -> Result<u64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u64>() { return Ok(n) }

    let n = value.parse::<f64>().with_context(|| format!("invalid population {value:?}"))?;
    ensure!(n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64, "population must be a non-negative integer, got {value:?}");
    Ok(n as u64)
}

/// Write the assignment mapping as `unit_id,district`, one row per unit in
/// dataset order. Unreached units are written with district 0.
pub fn write_assignments(districting: &Districting, path: &Path) -> Result<()> {
    let (ids, districts) = districting.assignments()
        .map(|(id, district)| (id.to_string(), district))
        .unzip::<_, _, Vec<_>, Vec<_>>();

    let mut df = DataFrame::new(vec![
        Series::new("unit_id".into(), ids).into(),
        Series::new("district".into(), districts).into(),
    ])?;

    let file = File::create(path)
        .with_context(|| format!("[io::csv] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(&mut df)
        .with_context(|| format!("[io::csv] Failed to write CSV to {:?}", path))
}
