use super::cache::StationCellCache;
use super::config::WeatherConfig;
use crate::core::catalog::stations::{Station, StationCatalog};
use crate::core::io::stations::StationSeries;
use crate::core::models::assessment::DataIssue;
use crate::core::models::weather::{
    Provenance, SeasonalRecord, TrendConfidence, WarmingTrend, WeatherObservation,
};
use crate::core::utils::geometry::great_circle_km;
use itertools::Itertools;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::{debug, instrument, warn};

// Latitude-linear fallback climate.
const FALLBACK_BASE_TEMP_C: f64 = -5.0;
const FALLBACK_LAPSE_C_PER_DEG: f64 = 0.5;
const WINTER_OFFSET_C: f64 = -10.0;
const SUMMER_OFFSET_C: f64 = 15.0;
const MAX_OFFSET_C: f64 = 20.0;
const MIN_OFFSET_C: f64 = -15.0;
pub const FALLBACK_PRECIPITATION_MM: f64 = 400.0;
pub const FALLBACK_ANOMALY_C: f64 = 1.0;
const SNOW_DEPTH_M_PER_FROST_DEGREE: f64 = 0.1;

// No source supplies wind; both are estimates.
pub const STATION_WIND_SPEED_MS: f64 = 5.0;
pub const FALLBACK_WIND_SPEED_MS: f64 = 6.0;

const SNOW_DEPTH_M_PER_WINTER_MM: f64 = 0.01;
const PLAUSIBLE_TEMPERATURE_C: RangeInclusive<f64> = -60.0..=40.0;
const WINTER_MONTHS: [u32; 4] = [12, 1, 2, 3];
const SUMMER_MONTHS: [u32; 4] = [6, 7, 8, 9];
/// Seasonal sign changes understate daily freeze–thaw cycling.
const SEASONAL_TO_DAILY_CYCLES: f64 = 15.0;

const TREND_RECENT_FROM: i32 = 2015;
const TREND_EARLY_UNTIL: i32 = 2010;
const MIN_WARMING_TREND_C: f64 = 0.5;
pub const DEFAULT_WARMING_TREND_C: f64 = 1.5;

/// Annual freeze–thaw cycles by latitude band, used when no series is available and as a floor
/// for series-derived counts.
pub fn latitude_band_cycles(latitude: f64) -> u32 {
    if latitude > 74.0 {
        80
    } else if latitude > 70.0 {
        60
    } else if latitude > 68.0 {
        45
    } else {
        30
    }
}

/// Per-station climate summary, computed once when the provider is built.
#[derive(Debug, Clone, PartialEq)]
struct StationSummary {
    data_year: i32,
    mean_c: f64,
    max_c: f64,
    min_c: f64,
    precipitation_mm: f64,
    anomaly_c: f64,
    winter_c: f64,
    summer_c: f64,
    snow_depth_m: f64,
    cycles_per_year: Option<f64>,
    warming_trend: WarmingTrend,
}

/// Weather for one dam plus, when real data could not be used, why.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWeather {
    pub observation: WeatherObservation,
    pub issue: Option<DataIssue>,
}

/// Resolves climate conditions for a coordinate from station records or the fallback model.
///
/// Built once from the catalog and the loaded series; read-only during the batch.
#[derive(Debug, Clone)]
pub struct WeatherDataProvider {
    catalog: StationCatalog,
    summaries: BTreeMap<String, Result<StationSummary, String>>,
    config: WeatherConfig,
    arctic_circle: f64,
    cache: StationCellCache,
}

impl WeatherDataProvider {
    #[instrument(skip_all, name = "weather_provider_init")]
    pub fn new(
        catalog: StationCatalog,
        series: &StationSeries,
        config: &WeatherConfig,
        arctic_circle: f64,
    ) -> Self {
        let summaries: BTreeMap<String, Result<StationSummary, String>> = catalog
            .stations()
            .iter()
            .map(|station| {
                let summary = match series.get(&station.id) {
                    Some(records) => summarize(records, config),
                    None => Err("no historical series loaded".to_string()),
                };
                if let Err(reason) = &summary {
                    debug!(station = %station.id, %reason, "Station record unusable.");
                }
                (station.id.clone(), summary)
            })
            .collect();

        let usable = summaries.values().filter(|s| s.is_ok()).count();
        if usable == 0 && !series.is_empty() {
            warn!("No loaded station series passed validation; all dams will use fallback weather.");
        }
        debug!(stations = catalog.len(), usable, "Weather provider ready.");

        Self {
            catalog,
            summaries,
            config: *config,
            arctic_circle,
            cache: StationCellCache::new(config.cache_cell_deg),
        }
    }

    /// Stations whose record passed the sanity checks.
    pub fn usable_stations(&self) -> usize {
        self.summaries.values().filter(|s| s.is_ok()).count()
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    /// Pre-resolves the candidate stations for every coordinate's grid cell. Call before the
    /// parallel phase; lookups afterwards never write.
    pub fn warm_cache(&mut self, coordinates: impl IntoIterator<Item = (f64, f64)>) {
        for (latitude, longitude) in coordinates {
            self.cache.warm(&self.catalog, latitude, longitude);
        }
        debug!(cells = self.cache.len(), "Station cell cache warmed.");
    }

    fn nearest_station(&self, latitude: f64, longitude: f64) -> Option<&Station> {
        let nearest = match self.cache.lookup(latitude, longitude) {
            Some(candidates) => self.catalog.nearest_among(candidates, latitude, longitude),
            None => self.catalog.nearest(latitude, longitude),
        };
        nearest.map(|(station, _)| station)
    }

    /// Always returns a fully populated observation; never fails.
    pub fn resolve(&self, latitude: f64, longitude: f64) -> ResolvedWeather {
        let Some(station) = self.nearest_station(latitude, longitude) else {
            return self.degraded(latitude, "station catalog is empty".to_string());
        };
        let distance_km =
            great_circle_km(latitude, longitude, station.latitude, station.longitude);
        if distance_km > self.config.station_tolerance_km {
            return self.degraded(
                latitude,
                format!(
                    "nearest station {} is {distance_km:.0} km away (tolerance {:.0} km)",
                    station.id, self.config.station_tolerance_km
                ),
            );
        }

        match self.summaries.get(&station.id) {
            Some(Ok(summary)) => ResolvedWeather {
                observation: observed(station, distance_km, summary, latitude),
                issue: None,
            },
            Some(Err(reason)) => {
                self.degraded(latitude, format!("station {}: {reason}", station.id))
            }
            None => self.degraded(latitude, format!("station {} not summarised", station.id)),
        }
    }

    fn degraded(&self, latitude: f64, detail: String) -> ResolvedWeather {
        ResolvedWeather {
            observation: fallback_observation(latitude, self.arctic_circle),
            issue: Some(DataIssue::DataUnavailable {
                category: "weather",
                detail,
            }),
        }
    }
}

/// Latitude-linear fallback climate for a dam with no usable station.
pub fn fallback_observation(latitude: f64, arctic_circle: f64) -> WeatherObservation {
    let base = FALLBACK_BASE_TEMP_C - (latitude - arctic_circle) * FALLBACK_LAPSE_C_PER_DEG;
    WeatherObservation {
        station_id: "fallback".to_string(),
        station_name: "Latitude climatology".to_string(),
        station_latitude: None,
        station_longitude: None,
        station_distance_km: None,
        data_year: None,
        air_temperature_c: base,
        winter_temperature_c: base + WINTER_OFFSET_C,
        summer_temperature_c: base + SUMMER_OFFSET_C,
        max_temperature_c: base + MAX_OFFSET_C,
        min_temperature_c: base + MIN_OFFSET_C,
        precipitation_mm: FALLBACK_PRECIPITATION_MM,
        snow_depth_m: (-base * SNOW_DEPTH_M_PER_FROST_DEGREE).max(0.0),
        temperature_anomaly_c: FALLBACK_ANOMALY_C,
        wind_speed_ms: FALLBACK_WIND_SPEED_MS,
        freeze_thaw_cycles: latitude_band_cycles(latitude),
        warming_trend: WarmingTrend {
            warming_c: DEFAULT_WARMING_TREND_C,
            confidence: TrendConfidence::Low,
        },
        provenance: Provenance::Fallback,
        freeze_thaw_provenance: Provenance::Fallback,
    }
}

fn observed(
    station: &Station,
    distance_km: f64,
    summary: &StationSummary,
    latitude: f64,
) -> WeatherObservation {
    let band = latitude_band_cycles(latitude);
    let (freeze_thaw_cycles, freeze_thaw_provenance) = match summary.cycles_per_year {
        Some(cycles) => ((cycles.round() as u32).max(band), Provenance::Real),
        None => (band, Provenance::Fallback),
    };
    WeatherObservation {
        station_id: station.id.clone(),
        station_name: station.name.clone(),
        station_latitude: Some(station.latitude),
        station_longitude: Some(station.longitude),
        station_distance_km: Some(distance_km),
        data_year: Some(summary.data_year),
        air_temperature_c: summary.mean_c,
        winter_temperature_c: summary.winter_c,
        summer_temperature_c: summary.summer_c,
        max_temperature_c: summary.max_c,
        min_temperature_c: summary.min_c,
        precipitation_mm: summary.precipitation_mm,
        snow_depth_m: summary.snow_depth_m,
        temperature_anomaly_c: summary.anomaly_c,
        wind_speed_ms: STATION_WIND_SPEED_MS,
        freeze_thaw_cycles,
        warming_trend: summary.warming_trend,
        provenance: Provenance::Real,
        freeze_thaw_provenance,
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn summarize(records: &[SeasonalRecord], config: &WeatherConfig) -> Result<StationSummary, String> {
    let years_with_data = records
        .iter()
        .filter(|r| r.mean_temperature_c.is_some())
        .map(|r| r.year)
        .unique()
        .count();
    if years_with_data < config.min_record_years {
        return Err(format!(
            "{years_with_data} year(s) of data, {} required",
            config.min_record_years
        ));
    }

    let data_year = match config.reference_year {
        Some(year) => year,
        None => records
            .iter()
            .filter(|r| r.mean_temperature_c.is_some())
            .map(|r| r.year)
            .max()
            .ok_or_else(|| "no mean temperatures".to_string())?,
    };
    let year_records: Vec<&SeasonalRecord> = records.iter().filter(|r| r.year == data_year).collect();
    let means: Vec<f64> = year_records
        .iter()
        .filter_map(|r| r.mean_temperature_c)
        .collect();
    let maxima: Vec<f64> = year_records
        .iter()
        .filter_map(|r| r.max_temperature_c)
        .collect();
    let precipitation: Vec<f64> = year_records
        .iter()
        .filter_map(|r| r.precipitation_mm)
        .collect();

    let mean_c = mean(means.iter().copied())
        .ok_or_else(|| format!("no mean temperature in reference year {data_year}"))?;
    if means
        .iter()
        .chain(maxima.iter())
        .any(|t| !PLAUSIBLE_TEMPERATURE_C.contains(t))
    {
        return Err(format!("implausible temperature in {data_year}"));
    }
    if precipitation.iter().any(|p| *p < 0.0) {
        return Err(format!("negative precipitation in {data_year}"));
    }

    let max_c = maxima
        .iter()
        .chain(means.iter())
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let min_c = means.iter().copied().fold(f64::INFINITY, f64::min);

    let seasonal_mean = |months: &[u32]| {
        mean(
            year_records
                .iter()
                .filter(|r| months.contains(&r.month))
                .filter_map(|r| r.mean_temperature_c),
        )
    };
    let winter_c = seasonal_mean(&WINTER_MONTHS).unwrap_or(mean_c + WINTER_OFFSET_C);
    let summer_c = seasonal_mean(&SUMMER_MONTHS).unwrap_or(mean_c + SUMMER_OFFSET_C);

    let precipitation_mm = if precipitation.is_empty() {
        FALLBACK_PRECIPITATION_MM
    } else {
        precipitation.iter().sum()
    };
    let winter_precipitation_mm: f64 = year_records
        .iter()
        .filter(|r| WINTER_MONTHS.contains(&r.month))
        .filter_map(|r| r.precipitation_mm)
        .sum();
    let snow_depth_m = if winter_c < 0.0 {
        winter_precipitation_mm * SNOW_DEPTH_M_PER_WINTER_MM
    } else {
        0.0
    };

    let anomaly_c = mean(year_records.iter().filter_map(|r| r.temperature_anomaly_c))
        .unwrap_or(FALLBACK_ANOMALY_C);

    Ok(StationSummary {
        data_year,
        mean_c,
        max_c,
        min_c,
        precipitation_mm,
        anomaly_c,
        winter_c,
        summer_c,
        snow_depth_m,
        cycles_per_year: freeze_thaw_cycles_per_year(records),
        warming_trend: warming_trend(records),
    })
}

/// Zero-crossings of the seasonal mean temperature per year, averaged over years with at least
/// two seasons, scaled to an annual cycle estimate. Only strict sign changes count; a season
/// sitting at exactly 0 °C crosses nothing.
fn freeze_thaw_cycles_per_year(records: &[SeasonalRecord]) -> Option<f64> {
    let per_year: Vec<usize> = records
        .iter()
        .sorted_by_key(|r| (r.year, r.month))
        .filter_map(|r| r.mean_temperature_c.map(|t| (r.year, t)))
        .chunk_by(|(year, _)| *year)
        .into_iter()
        .filter_map(|(_, group)| {
            let temps: Vec<f64> = group.map(|(_, t)| t).collect();
            (temps.len() >= 2).then(|| {
                temps
                    .windows(2)
                    .filter(|pair| pair[0] * pair[1] < 0.0)
                    .count()
            })
        })
        .collect();
    mean(per_year.iter().map(|&c| c as f64)).map(|c| c * SEASONAL_TO_DAILY_CYCLES)
}

fn warming_trend(records: &[SeasonalRecord]) -> WarmingTrend {
    let anomalies = || {
        records
            .iter()
            .filter_map(|r| r.temperature_anomaly_c.map(|a| (r.year, a)))
    };
    let recent = mean(anomalies().filter(|(y, _)| *y >= TREND_RECENT_FROM).map(|(_, a)| a));
    let early = mean(anomalies().filter(|(y, _)| *y <= TREND_EARLY_UNTIL).map(|(_, a)| a));

    let (warming_c, confidence) = match (recent, early) {
        (Some(recent), Some(early)) => (recent - early, TrendConfidence::High),
        _ => match mean(anomalies().map(|(_, a)| a)) {
            Some(overall) => (overall, TrendConfidence::Medium),
            None => (DEFAULT_WARMING_TREND_C, TrendConfidence::Low),
        },
    };
    WarmingTrend {
        warming_c: warming_c.max(MIN_WARMING_TREND_C),
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn record(year: i32, month: u32, mean: f64) -> SeasonalRecord {
        SeasonalRecord {
            year,
            month,
            mean_temperature_c: Some(mean),
            max_temperature_c: Some(mean + 8.0),
            precipitation_mm: Some(100.0),
            temperature_anomaly_c: Some(if year >= 2015 { 1.5 } else { 0.2 }),
        }
    }

    fn four_seasons(year: i32) -> Vec<SeasonalRecord> {
        vec![
            record(year, 3, -4.0),
            record(year, 6, 9.0),
            record(year, 9, 3.0),
            record(year, 12, -8.0),
        ]
    }

    fn tromso_catalog() -> StationCatalog {
        StationCatalog::from_stations(vec![Station {
            id: "SN90450".to_string(),
            name: "Tromsø".to_string(),
            latitude: 69.679,
            longitude: 18.940,
        }])
    }

    fn provider_with(records: Vec<SeasonalRecord>) -> WeatherDataProvider {
        let mut series = StationSeries::new();
        series.insert("SN90450".to_string(), records);
        WeatherDataProvider::new(tromso_catalog(), &series, &WeatherConfig::default(), 66.5)
    }

    #[test]
    fn fallback_at_sixty_eight_degrees_matches_reference_values() {
        let obs = fallback_observation(68.0, 66.5);
        assert!(f64_approx_equal(obs.air_temperature_c, -5.75));
        assert!(f64_approx_equal(obs.winter_temperature_c, -15.75));
        assert!(f64_approx_equal(obs.summer_temperature_c, 9.25));
        assert!(f64_approx_equal(obs.max_temperature_c, 14.25));
        assert!(f64_approx_equal(obs.min_temperature_c, -20.75));
        assert!(f64_approx_equal(obs.snow_depth_m, 0.575));
        assert_eq!(obs.temperature_anomaly_c, 1.0);
        assert_eq!(obs.provenance, Provenance::Fallback);
        assert_eq!(obs.freeze_thaw_cycles, 30);
    }

    #[test]
    fn latitude_bands_for_cycles() {
        assert_eq!(latitude_band_cycles(75.0), 80);
        assert_eq!(latitude_band_cycles(74.0), 60);
        assert_eq!(latitude_band_cycles(70.5), 60);
        assert_eq!(latitude_band_cycles(69.0), 45);
        assert_eq!(latitude_band_cycles(67.0), 30);
    }

    #[test]
    fn dam_near_a_valid_station_gets_real_weather() {
        let mut records = four_seasons(2009);
        records.extend(four_seasons(2023));
        let provider = provider_with(records);

        let resolved = provider.resolve(69.6, 19.0);
        let obs = resolved.observation;
        assert!(resolved.issue.is_none());
        assert_eq!(obs.provenance, Provenance::Real);
        assert_eq!(obs.station_id, "SN90450");
        assert_eq!(obs.data_year, Some(2023));
        assert!(f64_approx_equal(obs.air_temperature_c, 0.0));
        assert!(f64_approx_equal(obs.winter_temperature_c, -6.0));
        assert!(f64_approx_equal(obs.summer_temperature_c, 6.0));
        assert!(f64_approx_equal(obs.max_temperature_c, 17.0));
        assert!(f64_approx_equal(obs.min_temperature_c, -8.0));
        assert!(f64_approx_equal(obs.precipitation_mm, 400.0));
        assert!(f64_approx_equal(obs.snow_depth_m, 2.0));
        assert_eq!(obs.wind_speed_ms, STATION_WIND_SPEED_MS);
    }

    #[test]
    fn series_cycles_are_scaled_and_floored_at_the_band() {
        let mut records = four_seasons(2022);
        records.extend(four_seasons(2023));
        let provider = provider_with(records);
        let obs = provider.resolve(69.6, 19.0).observation;
        // -4 → 9 → 3 → -8: two crossings per year, ×15 = 30, below the 45 band floor.
        assert_eq!(obs.freeze_thaw_cycles, 45);
        assert_eq!(obs.freeze_thaw_provenance, Provenance::Real);
    }

    #[test]
    fn seasons_at_exactly_zero_are_not_crossings() {
        let records = vec![
            record(2023, 3, -2.0),
            record(2023, 6, 0.0),
            record(2023, 9, 3.0),
            record(2023, 12, -1.0),
        ];
        // Only 3 → -1 changes sign.
        assert_eq!(freeze_thaw_cycles_per_year(&records), Some(15.0));
    }

    #[test]
    fn warming_trend_compares_recent_and_early_anomalies() {
        let mut records = four_seasons(2005);
        records.extend(four_seasons(2020));
        let trend = warming_trend(&records);
        assert_eq!(trend.confidence, TrendConfidence::High);
        assert!(f64_approx_equal(trend.warming_c, 1.3));
    }

    #[test]
    fn warming_trend_without_anomalies_uses_default() {
        let records = vec![SeasonalRecord {
            year: 2020,
            month: 6,
            mean_temperature_c: Some(8.0),
            max_temperature_c: None,
            precipitation_mm: None,
            temperature_anomaly_c: None,
        }];
        let trend = warming_trend(&records);
        assert_eq!(trend.confidence, TrendConfidence::Low);
        assert_eq!(trend.warming_c, DEFAULT_WARMING_TREND_C);
    }

    #[test]
    fn warming_trend_is_floored() {
        let records: Vec<SeasonalRecord> = [2005, 2020]
            .iter()
            .map(|&year| SeasonalRecord {
                temperature_anomaly_c: Some(0.1),
                ..record(year, 6, 5.0)
            })
            .collect();
        assert_eq!(warming_trend(&records).warming_c, MIN_WARMING_TREND_C);
    }

    #[test]
    fn single_year_record_is_rejected() {
        let provider = provider_with(four_seasons(2023));
        let resolved = provider.resolve(69.6, 19.0);
        assert_eq!(resolved.observation.provenance, Provenance::Fallback);
        assert_eq!(provider.usable_stations(), 0);
        assert!(matches!(
            resolved.issue,
            Some(DataIssue::DataUnavailable {
                category: "weather",
                ..
            })
        ));
    }

    #[test]
    fn implausible_temperatures_reject_the_record() {
        let mut records = four_seasons(2022);
        records.extend(four_seasons(2023));
        records[4].mean_temperature_c = Some(-80.0);
        let provider = provider_with(records);
        assert_eq!(
            provider.resolve(69.6, 19.0).observation.provenance,
            Provenance::Fallback
        );
    }

    #[test]
    fn distant_dam_falls_back_even_with_valid_station() {
        let mut records = four_seasons(2022);
        records.extend(four_seasons(2023));
        let provider = provider_with(records);
        let resolved = provider.resolve(78.0, 15.0);
        assert_eq!(resolved.observation.provenance, Provenance::Fallback);
        let detail = resolved.issue.unwrap().to_string();
        assert!(detail.contains("tolerance"), "{detail}");
    }

    #[test]
    fn warmed_cache_keeps_the_dams_own_nearest_station_at_a_cell_boundary() {
        // B is nearest to the cell centre but has no series; A is nearest to the dam.
        let catalog = StationCatalog::from_stations(vec![
            Station {
                id: "A".to_string(),
                name: "A".to_string(),
                latitude: 69.0,
                longitude: 20.12,
            },
            Station {
                id: "B".to_string(),
                name: "B".to_string(),
                latitude: 69.05,
                longitude: 20.02,
            },
        ]);
        let mut records = four_seasons(2022);
        records.extend(four_seasons(2023));
        let mut series = StationSeries::new();
        series.insert("A".to_string(), records);

        let direct = WeatherDataProvider::new(catalog, &series, &WeatherConfig::default(), 66.5);
        let mut cached = direct.clone();
        cached.warm_cache([(69.001, 20.099)]);

        let resolved = cached.resolve(69.001, 20.099);
        assert!(resolved.issue.is_none(), "{:?}", resolved.issue);
        assert_eq!(resolved.observation.station_id, "A");
        assert_eq!(resolved.observation.provenance, Provenance::Real);
        assert_eq!(direct.resolve(69.001, 20.099), resolved);
    }

    #[test]
    fn empty_catalog_always_falls_back() {
        let provider = WeatherDataProvider::new(
            StationCatalog::default(),
            &StationSeries::new(),
            &WeatherConfig::default(),
            66.5,
        );
        let resolved = provider.resolve(70.0, 25.0);
        assert_eq!(resolved.observation.provenance, Provenance::Fallback);
    }
}
