use serde::Serialize;
use std::fmt;

/// Whether a value came from observed station data or from a fallback estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Real,
    Fallback,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Real => "real",
            Provenance::Fallback => "fallback",
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Provenance::Real)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendConfidence {
    High,
    Medium,
    Low,
}

/// Observed (or estimated) warming trend against the historical baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WarmingTrend {
    pub warming_c: f64,
    pub confidence: TrendConfidence,
}

/// Fully-populated climate conditions for one dam. Every field is present whether it was
/// observed or estimated; the provenance fields say which.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherObservation {
    pub station_id: String,
    pub station_name: String,
    pub station_latitude: Option<f64>,
    pub station_longitude: Option<f64>,
    pub station_distance_km: Option<f64>,
    pub data_year: Option<i32>,
    pub air_temperature_c: f64,
    pub winter_temperature_c: f64,
    pub summer_temperature_c: f64,
    pub max_temperature_c: f64,
    pub min_temperature_c: f64,
    pub precipitation_mm: f64,
    pub snow_depth_m: f64,
    pub temperature_anomaly_c: f64,
    pub wind_speed_ms: f64,
    pub freeze_thaw_cycles: u32,
    pub warming_trend: WarmingTrend,
    pub provenance: Provenance,
    pub freeze_thaw_provenance: Provenance,
}

impl WeatherObservation {
    pub fn is_real(&self) -> bool {
        self.provenance.is_real()
    }
}

/// One seasonal row from a station's historical series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalRecord {
    pub year: i32,
    pub month: u32,
    pub mean_temperature_c: Option<f64>,
    pub max_temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub temperature_anomaly_c: Option<f64>,
}
