use super::{LoadError, display_path};
use crate::core::physics::thermal::{IceThermalProfile, SoilThermalProfile};
use serde::Deserialize;
use std::path::Path;

/// Physical constants file: optional `[soil]` and `[ice]` tables, each field defaulting to the
/// reference values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThermalConstants {
    pub soil: SoilThermalProfile,
    pub ice: IceThermalProfile,
}

pub fn load_thermal_constants(path: &Path) -> Result<ThermalConstants, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: display_path(path),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| LoadError::Toml {
        path: display_path(path),
        source: e,
    })
}
