use crate::core::climate::projection::normalize_scenario;
use crate::core::models::dam::ArcticZone;
use crate::core::physics::thermal::{IceThermalProfile, SoilThermalProfile};
use thiserror::Error;

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Aggregation weights must sum to 1.0 (got {sum})")]
    InvalidWeights { sum: f64 },

    #[error("Invalid zone thresholds: {0}")]
    InvalidZoneThresholds(String),

    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Latitude thresholds for the Arctic scope and the exposure zones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneThresholds {
    pub arctic_circle: f64,
    pub high_arctic: f64,
    pub extreme_arctic: f64,
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        Self {
            arctic_circle: 66.5,
            high_arctic: 69.0,
            extreme_arctic: 71.0,
        }
    }
}

impl ZoneThresholds {
    /// Strictly north of the Arctic Circle.
    #[inline]
    pub fn is_arctic(&self, latitude: f64) -> bool {
        latitude > self.arctic_circle
    }

    pub fn zone(&self, latitude: f64) -> ArcticZone {
        if latitude >= self.extreme_arctic {
            ArcticZone::ExtremeArctic
        } else if latitude >= self.high_arctic {
            ArcticZone::HighArctic
        } else {
            ArcticZone::SubArctic
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.arctic_circle < self.high_arctic && self.high_arctic < self.extreme_arctic;
        let in_range = [self.arctic_circle, self.high_arctic, self.extreme_arctic]
            .iter()
            .all(|lat| lat.is_finite() && (-90.0..=90.0).contains(lat));
        if ordered && in_range {
            Ok(())
        } else {
            Err(ConfigError::InvalidZoneThresholds(format!(
                "expected arctic circle < high arctic < extreme arctic within ±90°, got {} / {} / {}",
                self.arctic_circle, self.high_arctic, self.extreme_arctic
            )))
        }
    }
}

/// Valid territorial extent of the dam population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerritoryBounds {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl Default for TerritoryBounds {
    fn default() -> Self {
        Self {
            min_latitude: 57.0,
            max_latitude: 81.0,
            min_longitude: 4.0,
            max_longitude: 32.0,
        }
    }
}

impl TerritoryBounds {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherConfig {
    /// Stations further than this from a dam are ignored.
    pub station_tolerance_km: f64,
    /// Distinct years a station series needs before it is trusted.
    pub min_record_years: usize,
    /// Grid size of the nearest-station cache.
    pub cache_cell_deg: f64,
    /// Year to summarise; the latest year in each series when unset.
    pub reference_year: Option<i32>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            station_tolerance_km: 250.0,
            min_record_years: 2,
            cache_cell_deg: 0.1,
            reference_year: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureConfig {
    pub winter_days: f64,
    pub summer_days: f64,
    pub foundation_depth_m: f64,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self {
            winter_days: 120.0,
            summer_days: 90.0,
            foundation_depth_m: 10.0,
        }
    }
}

/// Weights of the three scored components.
///
/// The climate-change component has no weight of its own: it acts through the climate multiplier,
/// which carries the fixed [`CLIMATE_SHARE`](Self::CLIMATE_SHARE) of the scheme. The three
/// weights plus that share must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationWeights {
    pub permafrost: f64,
    pub ice_dam: f64,
    pub freeze_thaw: f64,
}

impl Default for AggregationWeights {
    fn default() -> Self {
        Self {
            permafrost: 0.40,
            ice_dam: 0.25,
            freeze_thaw: 0.20,
        }
    }
}

impl AggregationWeights {
    /// Portion of the scheme carried by the climate multiplier. Not configurable.
    pub const CLIMATE_SHARE: f64 = 0.15;

    pub fn sum(&self) -> f64 {
        self.permafrost + self.ice_dam + self.freeze_thaw + Self::CLIMATE_SHARE
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let all_non_negative = [self.permafrost, self.ice_dam, self.freeze_thaw]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        let sum = self.sum();
        if all_non_negative && (sum - 1.0).abs() < WEIGHT_SUM_TOLERANCE {
            Ok(())
        } else {
            Err(ConfigError::InvalidWeights { sum })
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentConfig {
    pub scenario: String,
    pub target_year: i32,
    pub assessment_year: i32,
    pub zones: ZoneThresholds,
    pub territory: TerritoryBounds,
    pub weather: WeatherConfig,
    pub exposure: ExposureConfig,
    pub weights: AggregationWeights,
    pub soil: SoilThermalProfile,
    pub ice: IceThermalProfile,
    pub risk_floor: f64,
    pub max_design_reduction_pct: f64,
}

#[derive(Default)]
pub struct AssessmentConfigBuilder {
    scenario: Option<String>,
    target_year: Option<i32>,
    assessment_year: Option<i32>,
    zones: Option<ZoneThresholds>,
    territory: Option<TerritoryBounds>,
    weather: Option<WeatherConfig>,
    exposure: Option<ExposureConfig>,
    weights: Option<AggregationWeights>,
    soil: Option<SoilThermalProfile>,
    ice: Option<IceThermalProfile>,
    risk_floor: Option<f64>,
    max_design_reduction_pct: Option<f64>,
}

impl AssessmentConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }
    pub fn target_year(mut self, year: i32) -> Self {
        self.target_year = Some(year);
        self
    }
    pub fn assessment_year(mut self, year: i32) -> Self {
        self.assessment_year = Some(year);
        self
    }
    pub fn zones(mut self, zones: ZoneThresholds) -> Self {
        self.zones = Some(zones);
        self
    }
    pub fn territory(mut self, territory: TerritoryBounds) -> Self {
        self.territory = Some(territory);
        self
    }
    pub fn weather(mut self, weather: WeatherConfig) -> Self {
        self.weather = Some(weather);
        self
    }
    pub fn exposure(mut self, exposure: ExposureConfig) -> Self {
        self.exposure = Some(exposure);
        self
    }
    pub fn weights(mut self, weights: AggregationWeights) -> Self {
        self.weights = Some(weights);
        self
    }
    pub fn soil(mut self, soil: SoilThermalProfile) -> Self {
        self.soil = Some(soil);
        self
    }
    pub fn ice(mut self, ice: IceThermalProfile) -> Self {
        self.ice = Some(ice);
        self
    }
    pub fn risk_floor(mut self, floor: f64) -> Self {
        self.risk_floor = Some(floor);
        self
    }
    pub fn max_design_reduction_pct(mut self, pct: f64) -> Self {
        self.max_design_reduction_pct = Some(pct);
        self
    }

    pub fn build(self) -> Result<AssessmentConfig, ConfigError> {
        let scenario = self
            .scenario
            .map(|s| normalize_scenario(&s))
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingParameter("scenario"))?;
        let config = AssessmentConfig {
            scenario,
            target_year: self
                .target_year
                .ok_or(ConfigError::MissingParameter("target_year"))?,
            assessment_year: self
                .assessment_year
                .ok_or(ConfigError::MissingParameter("assessment_year"))?,
            zones: self.zones.unwrap_or_default(),
            territory: self.territory.unwrap_or_default(),
            weather: self.weather.unwrap_or_default(),
            exposure: self.exposure.unwrap_or_default(),
            weights: self.weights.unwrap_or_default(),
            soil: self.soil.unwrap_or_default(),
            ice: self.ice.unwrap_or_default(),
            risk_floor: self.risk_floor.unwrap_or(10.0),
            max_design_reduction_pct: self.max_design_reduction_pct.unwrap_or(60.0),
        };
        config.validate()?;
        Ok(config)
    }
}

impl AssessmentConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        self.zones.validate()?;

        let invalid = |name: &'static str, reason: &str| ConfigError::InvalidParameter {
            name,
            reason: reason.to_string(),
        };
        if !self.soil.is_physical() {
            return Err(invalid("soil", "all soil constants must be positive"));
        }
        if !self.ice.is_physical() {
            return Err(invalid("ice", "all ice constants must be positive"));
        }
        if !(self.exposure.winter_days > 0.0 && self.exposure.summer_days > 0.0) {
            return Err(invalid("exposure", "exposure durations must be positive"));
        }
        if !(self.exposure.foundation_depth_m > 0.0) {
            return Err(invalid("foundation_depth_m", "must be positive"));
        }
        if !(self.weather.station_tolerance_km >= 0.0) {
            return Err(invalid("station_tolerance_km", "must be non-negative"));
        }
        if !(self.weather.cache_cell_deg > 0.0) {
            return Err(invalid("cache_cell_deg", "must be positive"));
        }
        if !(0.0..=100.0).contains(&self.risk_floor) {
            return Err(invalid("risk_floor", "must lie in [0, 100]"));
        }
        if !(0.0..=100.0).contains(&self.max_design_reduction_pct) {
            return Err(invalid("max_design_reduction_pct", "must lie in [0, 100]"));
        }
        if self.target_year < self.assessment_year {
            return Err(invalid(
                "target_year",
                "projection target year precedes the assessment year",
            ));
        }
        Ok(())
    }
}
