use crate::error::{CliError, Result};
use frostrisk::core::models::assessment::DamRiskAssessment;
use frostrisk::workflows::assess::AssessmentRecord;
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Writes one flattened row per assessment and returns the number of rows written.
pub fn write_records<'a>(
    path: &Path,
    assessments: impl IntoIterator<Item = &'a DamRiskAssessment>,
) -> Result<usize> {
    let output_error = |source: anyhow::Error| CliError::Output {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(|e| output_error(e.into()))?;
    let mut rows = 0;
    for assessment in assessments {
        writer
            .serialize(AssessmentRecord::from(assessment))
            .map_err(|e| output_error(e.into()))?;
        rows += 1;
    }
    writer.flush().map_err(|e| output_error(e.into()))?;
    info!(rows, path = %path.display(), "Records written.");
    Ok(rows)
}

pub fn to_toml<T: Serialize>(value: &T) -> Result<String> {
    toml::to_string(value).map_err(|e| CliError::Other(e.into()))
}

pub fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = to_toml(value)?;
    std::fs::write(path, content).map_err(|e| CliError::Output {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(path = %path.display(), "Summary written.");
    Ok(())
}
