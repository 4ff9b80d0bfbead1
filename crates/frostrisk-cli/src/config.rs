use crate::cli::{AssessmentOverrides, InputArgs};
use crate::error::{CliError, Result};
use frostrisk::core::io::thermal::load_thermal_constants;
use frostrisk::core::physics::thermal::{IceThermalProfile, SoilThermalProfile};
use frostrisk::engine::config as core_config;
use frostrisk::engine::inputs::InputPaths;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

mod defaults;

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct PartialInputs {
    dams: Option<PathBuf>,
    registry: Option<PathBuf>,
    weather: Vec<PathBuf>,
    stations: Option<PathBuf>,
    projections: Option<PathBuf>,
    thermal_constants: Option<PathBuf>,
}

impl PartialInputs {
    /// Relative paths in a config file are relative to the file itself.
    fn rebase(&mut self, base: &Path) {
        let rebase = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        [
            &mut self.dams,
            &mut self.registry,
            &mut self.stations,
            &mut self.projections,
            &mut self.thermal_constants,
        ]
        .into_iter()
        .flatten()
        .for_each(rebase);
        self.weather.iter_mut().for_each(rebase);
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct PartialAssessment {
    scenario: Option<String>,
    target_year: Option<i32>,
    assessment_year: Option<i32>,
    risk_floor: Option<f64>,
    max_design_reduction: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct PartialZones {
    arctic_circle: Option<f64>,
    high_arctic: Option<f64>,
    extreme_arctic: Option<f64>,
}

impl PartialZones {
    fn merge(&self) -> core_config::ZoneThresholds {
        let d = core_config::ZoneThresholds::default();
        core_config::ZoneThresholds {
            arctic_circle: self.arctic_circle.unwrap_or(d.arctic_circle),
            high_arctic: self.high_arctic.unwrap_or(d.high_arctic),
            extreme_arctic: self.extreme_arctic.unwrap_or(d.extreme_arctic),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct PartialTerritory {
    min_latitude: Option<f64>,
    max_latitude: Option<f64>,
    min_longitude: Option<f64>,
    max_longitude: Option<f64>,
}

impl PartialTerritory {
    fn merge(&self) -> core_config::TerritoryBounds {
        let d = core_config::TerritoryBounds::default();
        core_config::TerritoryBounds {
            min_latitude: self.min_latitude.unwrap_or(d.min_latitude),
            max_latitude: self.max_latitude.unwrap_or(d.max_latitude),
            min_longitude: self.min_longitude.unwrap_or(d.min_longitude),
            max_longitude: self.max_longitude.unwrap_or(d.max_longitude),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct PartialWeather {
    station_tolerance_km: Option<f64>,
    min_record_years: Option<usize>,
    cache_cell_deg: Option<f64>,
    reference_year: Option<i32>,
}

impl PartialWeather {
    fn merge(&self) -> core_config::WeatherConfig {
        let d = core_config::WeatherConfig::default();
        core_config::WeatherConfig {
            station_tolerance_km: self.station_tolerance_km.unwrap_or(d.station_tolerance_km),
            min_record_years: self.min_record_years.unwrap_or(d.min_record_years),
            cache_cell_deg: self.cache_cell_deg.unwrap_or(d.cache_cell_deg),
            reference_year: self.reference_year.or(d.reference_year),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct PartialExposure {
    winter_days: Option<f64>,
    summer_days: Option<f64>,
    foundation_depth_m: Option<f64>,
}

impl PartialExposure {
    fn merge(&self) -> core_config::ExposureConfig {
        let d = core_config::ExposureConfig::default();
        core_config::ExposureConfig {
            winter_days: self.winter_days.unwrap_or(d.winter_days),
            summer_days: self.summer_days.unwrap_or(d.summer_days),
            foundation_depth_m: self.foundation_depth_m.unwrap_or(d.foundation_depth_m),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct PartialWeights {
    permafrost: Option<f64>,
    ice_dam: Option<f64>,
    freeze_thaw: Option<f64>,
}

impl PartialWeights {
    fn merge(&self) -> core_config::AggregationWeights {
        let d = core_config::AggregationWeights::default();
        core_config::AggregationWeights {
            permafrost: self.permafrost.unwrap_or(d.permafrost),
            ice_dam: self.ice_dam.unwrap_or(d.ice_dam),
            freeze_thaw: self.freeze_thaw.unwrap_or(d.freeze_thaw),
        }
    }
}

/// The config file as written, every field optional.
#[derive(Deserialize, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PartialConfig {
    inputs: PartialInputs,
    assessment: PartialAssessment,
    zones: PartialZones,
    territory: PartialTerritory,
    weather: PartialWeather,
    exposure: PartialExposure,
    weights: PartialWeights,
    soil: Option<SoilThermalProfile>,
    ice: Option<IceThermalProfile>,
}

/// Input locations and the validated engine configuration for one run.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub inputs: InputPaths,
    pub config: core_config::AssessmentConfig,
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        if let Some(dir) = path.parent() {
            config.inputs.rebase(dir);
        }
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Layers the sources as command line > `--set` > config file > defaults.
    pub fn resolve(
        mut self,
        args: &InputArgs,
        overrides: &AssessmentOverrides,
    ) -> Result<ResolvedRun> {
        self.apply_set_values(&args.set_values)?;
        let inputs = self.input_paths(args)?;
        let (soil, ice) = self.thermal_profiles(overrides.thermal.as_deref())?;

        let mut builder = core_config::AssessmentConfigBuilder::new()
            .scenario(
                overrides
                    .scenario
                    .clone()
                    .or(self.assessment.scenario.take())
                    .unwrap_or_else(|| defaults::SCENARIO.to_string()),
            )
            .target_year(
                overrides
                    .target_year
                    .or(self.assessment.target_year)
                    .unwrap_or(defaults::TARGET_YEAR),
            )
            .assessment_year(
                overrides
                    .assessment_year
                    .or(self.assessment.assessment_year)
                    .unwrap_or(defaults::ASSESSMENT_YEAR),
            )
            .zones(self.zones.merge())
            .territory(self.territory.merge())
            .weather(self.weather.merge())
            .exposure(self.exposure.merge())
            .weights(self.weights.merge())
            .soil(soil)
            .ice(ice);
        if let Some(floor) = self.assessment.risk_floor {
            builder = builder.risk_floor(floor);
        }
        if let Some(pct) = self.assessment.max_design_reduction {
            builder = builder.max_design_reduction_pct(pct);
        }

        let config = builder.build().map_err(|e| CliError::Config(e.to_string()))?;
        Ok(ResolvedRun { inputs, config })
    }

    fn input_paths(&self, args: &InputArgs) -> Result<InputPaths> {
        let dams = args
            .dams
            .clone()
            .or_else(|| self.inputs.dams.clone())
            .ok_or_else(|| {
                CliError::Config(
                    "A dam population table is required either as `inputs.dams` in the config file or via --dams."
                        .to_string(),
                )
            })?;
        let weather = if args.weather.is_empty() {
            self.inputs.weather.clone()
        } else {
            args.weather.clone()
        };
        Ok(InputPaths {
            dams,
            registry: args.registry.clone().or_else(|| self.inputs.registry.clone()),
            weather,
            stations: args.stations.clone().or_else(|| self.inputs.stations.clone()),
            projections: args
                .projections
                .clone()
                .or_else(|| self.inputs.projections.clone()),
        })
    }

    /// Inline `[soil]`/`[ice]` tables take precedence over a thermal constants file.
    fn thermal_profiles(
        &self,
        cli_path: Option<&Path>,
    ) -> Result<(SoilThermalProfile, IceThermalProfile)> {
        let from_file = match cli_path.or(self.inputs.thermal_constants.as_deref()) {
            Some(path) => {
                debug!("Loading thermal constants from {:?}", path);
                let constants =
                    load_thermal_constants(path).map_err(|e| CliError::FileParsing {
                        path: path.to_path_buf(),
                        source: e.into(),
                    })?;
                (constants.soil, constants.ice)
            }
            None => Default::default(),
        };
        Ok((
            self.soil.unwrap_or(from_file.0),
            self.ice.unwrap_or(from_file.1),
        ))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                "assessment.scenario" => self.assessment.scenario = Some(value.to_string()),
                "assessment.target-year" => {
                    self.assessment.target_year = Some(parse_value(key, value)?)
                }
                "assessment.assessment-year" => {
                    self.assessment.assessment_year = Some(parse_value(key, value)?)
                }
                "assessment.risk-floor" => {
                    self.assessment.risk_floor = Some(parse_value(key, value)?)
                }
                "assessment.max-design-reduction" => {
                    self.assessment.max_design_reduction = Some(parse_value(key, value)?)
                }
                "zones.arctic-circle" => self.zones.arctic_circle = Some(parse_value(key, value)?),
                "zones.high-arctic" => self.zones.high_arctic = Some(parse_value(key, value)?),
                "zones.extreme-arctic" => {
                    self.zones.extreme_arctic = Some(parse_value(key, value)?)
                }
                "territory.min-latitude" => {
                    self.territory.min_latitude = Some(parse_value(key, value)?)
                }
                "territory.max-latitude" => {
                    self.territory.max_latitude = Some(parse_value(key, value)?)
                }
                "territory.min-longitude" => {
                    self.territory.min_longitude = Some(parse_value(key, value)?)
                }
                "territory.max-longitude" => {
                    self.territory.max_longitude = Some(parse_value(key, value)?)
                }
                "weather.station-tolerance-km" => {
                    self.weather.station_tolerance_km = Some(parse_value(key, value)?)
                }
                "weather.min-record-years" => {
                    self.weather.min_record_years = Some(parse_value(key, value)?)
                }
                "weather.cache-cell-deg" => {
                    self.weather.cache_cell_deg = Some(parse_value(key, value)?)
                }
                "weather.reference-year" => {
                    self.weather.reference_year = Some(parse_value(key, value)?)
                }
                "exposure.winter-days" => {
                    self.exposure.winter_days = Some(parse_value(key, value)?)
                }
                "exposure.summer-days" => {
                    self.exposure.summer_days = Some(parse_value(key, value)?)
                }
                "exposure.foundation-depth-m" => {
                    self.exposure.foundation_depth_m = Some(parse_value(key, value)?)
                }
                "weights.permafrost" => self.weights.permafrost = Some(parse_value(key, value)?),
                "weights.ice-dam" => self.weights.ice_dam = Some(parse_value(key, value)?),
                "weights.freeze-thaw" => self.weights.freeze_thaw = Some(parse_value(key, value)?),
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}
