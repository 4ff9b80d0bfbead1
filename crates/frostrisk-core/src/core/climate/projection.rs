use crate::core::models::dam::ArcticZone;
use serde::Serialize;
use std::collections::BTreeMap;

pub const BASELINE_YEAR: i32 = 2020;

/// Regional warming relative to the baseline year, per IPCC AR6-style shared socioeconomic
/// pathways: (scenario, zone, year, ΔT °C).
const BUILTIN_PROJECTIONS: &[(&str, ArcticZone, i32, f64)] = &[
    ("SSP1-2.6", ArcticZone::SubArctic, 2050, 1.5),
    ("SSP1-2.6", ArcticZone::HighArctic, 2050, 1.9),
    ("SSP1-2.6", ArcticZone::ExtremeArctic, 2050, 2.3),
    ("SSP1-2.6", ArcticZone::SubArctic, 2100, 1.8),
    ("SSP1-2.6", ArcticZone::HighArctic, 2100, 2.3),
    ("SSP1-2.6", ArcticZone::ExtremeArctic, 2100, 2.8),
    ("SSP2-4.5", ArcticZone::SubArctic, 2050, 2.0),
    ("SSP2-4.5", ArcticZone::HighArctic, 2050, 2.5),
    ("SSP2-4.5", ArcticZone::ExtremeArctic, 2050, 3.0),
    ("SSP2-4.5", ArcticZone::SubArctic, 2100, 3.4),
    ("SSP2-4.5", ArcticZone::HighArctic, 2100, 4.2),
    ("SSP2-4.5", ArcticZone::ExtremeArctic, 2100, 5.0),
    ("SSP5-8.5", ArcticZone::SubArctic, 2050, 2.6),
    ("SSP5-8.5", ArcticZone::HighArctic, 2050, 3.2),
    ("SSP5-8.5", ArcticZone::ExtremeArctic, 2050, 3.8),
    ("SSP5-8.5", ArcticZone::SubArctic, 2100, 6.2),
    ("SSP5-8.5", ArcticZone::HighArctic, 2100, 7.5),
    ("SSP5-8.5", ArcticZone::ExtremeArctic, 2100, 9.0),
];

/// One row of the projection table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateProjection {
    pub scenario: String,
    pub zone: ArcticZone,
    pub year: i32,
    pub delta_t_c: f64,
}

pub fn normalize_scenario(scenario: &str) -> String {
    scenario.trim().to_ascii_uppercase()
}

/// Read-only scenario × zone × year → ΔT lookup with linear interpolation between years.
#[derive(Debug, Clone, Default)]
pub struct ClimateProjector {
    series: BTreeMap<(String, ArcticZone), Vec<(i32, f64)>>,
}

impl ClimateProjector {
    /// The built-in table, anchored at ΔT = 0 in the baseline year for every series.
    pub fn builtin() -> Self {
        let mut entries: Vec<ClimateProjection> = BUILTIN_PROJECTIONS
            .iter()
            .map(|&(scenario, zone, year, delta_t_c)| ClimateProjection {
                scenario: scenario.to_string(),
                zone,
                year,
                delta_t_c,
            })
            .collect();

        let mut anchors: Vec<ClimateProjection> = Vec::new();
        for entry in &entries {
            if !anchors
                .iter()
                .any(|a| a.scenario == entry.scenario && a.zone == entry.zone)
            {
                anchors.push(ClimateProjection {
                    scenario: entry.scenario.clone(),
                    zone: entry.zone,
                    year: BASELINE_YEAR,
                    delta_t_c: 0.0,
                });
            }
        }
        entries.extend(anchors);
        Self::from_entries(entries)
    }

    /// Builds a projector from table rows. A later row for the same (scenario, zone, year)
    /// replaces an earlier one.
    pub fn from_entries(entries: Vec<ClimateProjection>) -> Self {
        let mut series: BTreeMap<(String, ArcticZone), Vec<(i32, f64)>> = BTreeMap::new();
        for entry in entries {
            let points = series
                .entry((normalize_scenario(&entry.scenario), entry.zone))
                .or_default();
            points.retain(|(year, _)| *year != entry.year);
            points.push((entry.year, entry.delta_t_c));
        }
        for points in series.values_mut() {
            points.sort_by_key(|(year, _)| *year);
        }
        Self { series }
    }

    pub fn scenarios(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.series.keys().map(|(s, _)| s.as_str()).collect();
        names.dedup();
        names
    }

    pub fn has_scenario(&self, scenario: &str) -> bool {
        let wanted = normalize_scenario(scenario);
        self.series.keys().any(|(s, _)| *s == wanted)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Projected warming for a scenario, zone and year. Years between table rows are linearly
    /// interpolated; years outside the table clamp to the nearest row.
    pub fn project(&self, scenario: &str, zone: ArcticZone, year: i32) -> Option<ClimateProjection> {
        let key = (normalize_scenario(scenario), zone);
        let points = self.series.get(&key)?;
        let delta_t_c = interpolate(points, year)?;
        Some(ClimateProjection {
            scenario: key.0,
            zone,
            year,
            delta_t_c,
        })
    }
}

fn interpolate(points: &[(i32, f64)], year: i32) -> Option<f64> {
    let (first, last) = (points.first()?, points.last()?);
    if year <= first.0 {
        return Some(first.1);
    }
    if year >= last.0 {
        return Some(last.1);
    }
    points.windows(2).find_map(|pair| {
        let ((y0, v0), (y1, v1)) = (pair[0], pair[1]);
        if year >= y0 && year <= y1 {
            let t = f64::from(year - y0) / f64::from(y1 - y0);
            Some(v0 + t * (v1 - v0))
        } else {
            None
        }
    })
}
