use crate::core::models::dam::{ArcticZone, DamRecord};
use crate::engine::config::{TerritoryBounds, ZoneThresholds};
use crate::engine::error::SkippedDam;
use crate::engine::inputs::AssessmentInputs;
use crate::engine::registry::DamRegistry;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamLocation {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&DamRecord> for DamLocation {
    fn from(dam: &DamRecord) -> Self {
        Self {
            id: dam.id.clone(),
            name: dam.name.clone(),
            latitude: dam.latitude,
            longitude: dam.longitude,
        }
    }
}

/// Descriptive statistics over the Arctic dam population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationStats {
    pub total_rows: usize,
    pub arctic_dams: usize,
    pub validated: usize,
    pub unvalidated: usize,
    pub latitude_min: Option<f64>,
    pub latitude_max: Option<f64>,
    pub latitude_mean: Option<f64>,
    pub earliest_construction: Option<i32>,
    pub latest_construction: Option<i32>,
    pub northernmost: Option<DamLocation>,
    pub southernmost: Option<DamLocation>,
    pub zones: BTreeMap<String, usize>,
    pub purposes: BTreeMap<String, usize>,
    pub decades: BTreeMap<String, usize>,
    pub skipped: Vec<SkippedDam>,
}

#[derive(Debug, Clone)]
pub struct LocateReport {
    pub dams: Vec<DamRecord>,
    pub stats: PopulationStats,
}

/// Builds the Arctic population and describes it. No weather or scoring is involved.
#[instrument(skip_all, name = "locate_workflow")]
pub fn run(
    inputs: &AssessmentInputs,
    zones: &ZoneThresholds,
    territory: &TerritoryBounds,
) -> LocateReport {
    let registry = DamRegistry::build(&inputs.dams, inputs.registry.as_ref(), zones, territory);
    let stats = describe(&registry);
    info!(
        arctic = stats.arctic_dams,
        northernmost = stats.latitude_max,
        "Arctic population located."
    );
    LocateReport {
        dams: registry.dams().to_vec(),
        stats,
    }
}

fn describe(registry: &DamRegistry) -> PopulationStats {
    let dams = registry.dams();
    let latitudes = || dams.iter().map(|d| d.latitude);
    let years = || dams.iter().filter_map(|d| d.construction_year);

    let mut zones: BTreeMap<String, usize> =
        ArcticZone::ALL.iter().map(|z| (z.as_str().to_string(), 0)).collect();
    let mut purposes: BTreeMap<String, usize> = BTreeMap::new();
    let mut decades: BTreeMap<String, usize> = BTreeMap::new();
    for dam in dams {
        *zones.entry(dam.zone.as_str().to_string()).or_default() += 1;
        *purposes.entry(dam.purpose.as_str().to_string()).or_default() += 1;
        let decade = dam
            .construction_year
            .map_or_else(|| "unknown".to_string(), |y| format!("{}s", y - y.rem_euclid(10)));
        *decades.entry(decade).or_default() += 1;
    }

    let validated = registry.validated_count();
    PopulationStats {
        total_rows: registry.total_rows(),
        arctic_dams: dams.len(),
        validated,
        unvalidated: dams.len() - validated,
        latitude_min: latitudes().reduce(f64::min),
        latitude_max: latitudes().reduce(f64::max),
        latitude_mean: (!dams.is_empty())
            .then(|| latitudes().sum::<f64>() / dams.len() as f64),
        earliest_construction: years().min(),
        latest_construction: years().max(),
        northernmost: dams.first().map(DamLocation::from),
        southernmost: dams.last().map(DamLocation::from),
        zones,
        purposes,
        decades,
        skipped: registry.skipped().to_vec(),
    }
}
