use super::config::ConfigError;
use crate::core::io::LoadError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

pub use crate::core::models::assessment::DataIssue;

#[derive(Debug, Error)]
pub enum EngineError {
    /// An input table could not be parsed at all. The only fatal data error.
    #[error("Malformed {what}: {source}")]
    MalformedInput {
        what: &'static str,
        #[source]
        source: LoadError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// Why a dam row was left out of the Arctic population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Coordinates were missing, non-numeric or not a valid position.
    MalformedCoordinates,
    /// Valid position outside the national territory.
    OutsideTerritory,
    /// At or south of the Arctic Circle.
    BelowArcticCircle,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MalformedCoordinates => "malformed-coordinates",
            SkipReason::OutsideTerritory => "outside-territory",
            SkipReason::BelowArcticCircle => "below-arctic-circle",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dam that did not enter the assessment, with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDam {
    pub dam_id: String,
    pub row: usize,
    pub reason: SkipReason,
}
