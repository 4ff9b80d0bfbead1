use super::{HeaderIndex, LoadError, cell, display_path, parse_decimal};
use crate::core::catalog::stations::{Station, StationCatalog};
use crate::core::models::weather::SeasonalRecord;
use crate::core::utils::geometry::is_valid_coordinate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Seasonal records per station id, each series ordered by (year, month).
pub type StationSeries = BTreeMap<String, Vec<SeasonalRecord>>;

/// Parses a period cell into (year, month). Accepts `dd.mm.yyyy`, `mm.yyyy`, `yyyy-mm` and
/// `yyyy-mm-dd`.
pub fn parse_period(raw: &str) -> Option<(i32, u32)> {
    let raw = raw.trim();
    let (year, month): (i32, u32) = if raw.contains('.') {
        let parts: Vec<&str> = raw.split('.').collect();
        match parts.as_slice() {
            [_, month, year] | [month, year] => (year.parse().ok()?, month.parse().ok()?),
            _ => return None,
        }
    } else {
        let parts: Vec<&str> = raw.split('-').collect();
        match parts.as_slice() {
            [year, month] | [year, month, _] => (year.parse().ok()?, month.parse().ok()?),
            _ => return None,
        }
    };
    ((1..=12).contains(&month) && (1000..=9999).contains(&year)).then_some((year, month))
}

pub fn load_station_series(path: &Path) -> Result<StationSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: display_path(path),
        source: e,
    })?;
    read_station_series(file, &display_path(path))
}

/// Reads a semicolon-separated seasonal export. Rows whose period cannot be parsed (footers,
/// data-source notices) are dropped.
pub fn read_station_series(reader: impl Read, source: &str) -> Result<StationSeries, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers().map_err(|e| LoadError::Csv {
        path: source.to_string(),
        source: e,
    })?;
    let index = HeaderIndex::new(headers);

    let station_col = index.require(&["station", "station_id", "stationid"], "station", source)?;
    let time_col = index
        .find_by(|h| h.starts_with("time") || h == "date" || h == "period")
        .ok_or_else(|| LoadError::MissingColumn {
            path: source.to_string(),
            column: "time",
        })?;
    let max_col = index.find_by(|h| h.starts_with("maximum air temperature"));
    let mean_col = index.find_by(|h| h.starts_with("mean air temperature") && !h.contains("deviation"));
    let anomaly_col = index.find_by(|h| h.contains("deviation"));
    let precip_col = index.find_by(|h| h.starts_with("precipitation"));

    let mut series = StationSeries::new();
    let mut dropped = 0usize;
    for result in csv_reader.records() {
        let record = result.map_err(|e| LoadError::Csv {
            path: source.to_string(),
            source: e,
        })?;
        let station = cell(&record, Some(station_col));
        let Some((year, month)) = parse_period(cell(&record, Some(time_col))) else {
            dropped += 1;
            continue;
        };
        if station.is_empty() {
            dropped += 1;
            continue;
        }
        series
            .entry(station.to_string())
            .or_default()
            .push(SeasonalRecord {
                year,
                month,
                mean_temperature_c: parse_decimal(cell(&record, mean_col)),
                max_temperature_c: parse_decimal(cell(&record, max_col)),
                precipitation_mm: parse_decimal(cell(&record, precip_col)),
                temperature_anomaly_c: parse_decimal(cell(&record, anomaly_col)),
            });
    }
    if dropped > 0 {
        debug!(source, dropped, "Dropped unparseable station rows.");
    }
    if series.is_empty() {
        return Err(LoadError::Empty {
            path: source.to_string(),
        });
    }
    for records in series.values_mut() {
        records.sort_by_key(|r| (r.year, r.month));
    }
    Ok(series)
}

/// Merges several series exports; later files extend earlier ones per station.
pub fn load_station_series_files(paths: &[impl AsRef<Path>]) -> Result<StationSeries, LoadError> {
    let mut merged = StationSeries::new();
    for path in paths {
        for (station, mut records) in load_station_series(path.as_ref())? {
            let entry = merged.entry(station).or_default();
            entry.append(&mut records);
            entry.sort_by_key(|r| (r.year, r.month));
            entry.dedup_by_key(|r| (r.year, r.month));
        }
    }
    Ok(merged)
}

#[derive(Debug, Deserialize)]
struct StationRow {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
}

/// Loads a station catalog CSV with columns `id,name,latitude,longitude`.
pub fn load_station_catalog(path: &Path) -> Result<StationCatalog, LoadError> {
    let path_str = display_path(path);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| LoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;

    let mut stations = Vec::new();
    for (i, result) in reader.deserialize::<StationRow>().enumerate() {
        let row = result.map_err(|e| LoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        if !is_valid_coordinate(row.latitude, row.longitude) {
            return Err(LoadError::InvalidValue {
                path: path_str,
                row: i + 2,
                detail: format!("station '{}' has invalid coordinates", row.id),
            });
        }
        stations.push(Station {
            id: row.id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
        });
    }
    if stations.is_empty() {
        return Err(LoadError::Empty { path: path_str });
    }
    Ok(StationCatalog::from_stations(stations))
}
