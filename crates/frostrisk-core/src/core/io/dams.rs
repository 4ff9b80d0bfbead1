use super::{HeaderIndex, LoadError, cell, display_path, parse_decimal, parse_year};
use crate::core::utils::identifiers::normalize_identifier;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const ID_COLUMNS: &[&str] = &["id", "dam_id", "damnr", "dam_nr"];
const NAME_COLUMNS: &[&str] = &["name", "dam_name", "damnavn"];
const LATITUDE_COLUMNS: &[&str] = &["latitude", "lat"];
const LONGITUDE_COLUMNS: &[&str] = &["longitude", "lon", "lng"];
const PURPOSE_COLUMNS: &[&str] = &["purpose", "formal"];
const YEAR_COLUMNS: &[&str] = &["construction_year", "year", "byggear"];
const OWNER_COLUMNS: &[&str] = &["owner", "owner_type", "eier"];

/// A dam row as it appears in the population table, before registry resolution.
///
/// Coordinates are `None` when the cell is empty, non-numeric or non-finite.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDamRow {
    pub row: usize,
    pub id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub purpose: String,
    pub construction_year: Option<i32>,
    pub owner: String,
}

pub fn load_dams(path: &Path) -> Result<Vec<RawDamRow>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: display_path(path),
        source: e,
    })?;
    read_dams(file, &display_path(path))
}

/// Reads the dam population from any CSV source. `source` names it in errors.
pub fn read_dams(reader: impl Read, source: &str) -> Result<Vec<RawDamRow>, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| LoadError::Csv {
        path: source.to_string(),
        source: e,
    })?;
    let index = HeaderIndex::new(headers);
    let id_col = index.require(ID_COLUMNS, "id", source)?;
    let lat_col = index.require(LATITUDE_COLUMNS, "latitude", source)?;
    let lon_col = index.require(LONGITUDE_COLUMNS, "longitude", source)?;
    let name_col = index.find(NAME_COLUMNS);
    let purpose_col = index.find(PURPOSE_COLUMNS);
    let year_col = index.find(YEAR_COLUMNS);
    let owner_col = index.find(OWNER_COLUMNS);

    let mut rows = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Csv {
            path: source.to_string(),
            source: e,
        })?;
        let row = i + 2;
        let id = normalize_identifier(cell(&record, Some(id_col)));
        if id.is_empty() {
            debug!(row, "Dropping dam row without an identifier.");
            continue;
        }
        rows.push(RawDamRow {
            row,
            name: cell(&record, name_col).to_string(),
            latitude: parse_decimal(cell(&record, Some(lat_col))),
            longitude: parse_decimal(cell(&record, Some(lon_col))),
            purpose: cell(&record, purpose_col).to_string(),
            construction_year: parse_year(cell(&record, year_col)),
            owner: cell(&record, owner_col).to_string(),
            id,
        });
    }

    if rows.is_empty() {
        return Err(LoadError::Empty {
            path: source.to_string(),
        });
    }
    Ok(rows)
}
