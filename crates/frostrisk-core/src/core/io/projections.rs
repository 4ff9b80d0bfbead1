use super::{HeaderIndex, LoadError, cell, display_path, parse_decimal, parse_year};
use crate::core::climate::projection::ClimateProjection;
use crate::core::models::dam::ArcticZone;
use std::path::Path;

/// Loads a projection table CSV with columns `scenario,zone,year,delta_t`.
pub fn load_projections(path: &Path) -> Result<Vec<ClimateProjection>, LoadError> {
    let path_str = display_path(path);
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| LoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
    let headers = reader.headers().map_err(|e| LoadError::Csv {
        path: path_str.clone(),
        source: e,
    })?;
    let index = HeaderIndex::new(headers);
    let scenario_col = index.require(&["scenario"], "scenario", &path_str)?;
    let zone_col = index.require(&["zone", "region"], "zone", &path_str)?;
    let year_col = index.require(&["year", "target_year"], "year", &path_str)?;
    let delta_col = index.require(&["delta_t", "delta_t_c", "warming"], "delta_t", &path_str)?;

    let mut projections = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        let row = i + 2;
        let invalid = |detail: String| LoadError::InvalidValue {
            path: path_str.clone(),
            row,
            detail,
        };

        let scenario = cell(&record, Some(scenario_col));
        if scenario.is_empty() {
            return Err(invalid("empty scenario".to_string()));
        }
        let zone_label = cell(&record, Some(zone_col));
        let zone = ArcticZone::from_label(zone_label)
            .ok_or_else(|| invalid(format!("unknown zone '{zone_label}'")))?;
        let year = parse_year(cell(&record, Some(year_col)))
            .ok_or_else(|| invalid("unparseable year".to_string()))?;
        let delta_t_c = parse_decimal(cell(&record, Some(delta_col)))
            .ok_or_else(|| invalid("unparseable temperature delta".to_string()))?;

        projections.push(ClimateProjection {
            scenario: scenario.to_string(),
            zone,
            year,
            delta_t_c,
        });
    }
    if projections.is_empty() {
        return Err(LoadError::Empty { path: path_str });
    }
    Ok(projections)
}
