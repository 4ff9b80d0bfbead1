use crate::core::models::assessment::{ClimateImpact, RiskComponentScore};

const PERMAFROST_TRIGGER: f64 = 50.0;
const ICE_DAM_TRIGGER: f64 = 40.0;
const FREEZE_THAW_TRIGGER: f64 = 30.0;
const WARMING_TRIGGER_C: f64 = 2.0;

const PERMAFROST_MEASURES: &[&str] = &[
    "Stabilise foundation ground temperature with thermosyphons",
    "Monitor permafrost with thermistor strings",
    "Found below the maximum thaw depth with a thermal barrier",
];
const ICE_DAM_MEASURES: &[&str] = &[
    "Install an upstream ice boom",
    "Deploy automated ice detection and early warning",
    "Provide auxiliary spillway capacity for ice-jam floods",
];
const FREEZE_THAW_MEASURES: &[&str] = &[
    "Apply penetrating concrete sealer",
    "Add cathodic protection to reinforcement",
    "Inspect for freeze-thaw damage annually",
];
const CLIMATE_MEASURES: &[&str] = &[
    "Prepare a climate adaptation plan",
    "Increase spillway capacity for extreme precipitation",
    "Add real-time hydrological monitoring",
];
const ARCTIC_BASELINE_MEASURES: &[&str] = &[
    "Repeat the Arctic risk assessment annually with updated climate data",
    "Train operators in cold-climate dam operation",
    "Maintain an emergency response protocol for Arctic conditions",
];

/// Recommended measures for a dam, triggered by its component scores and projected warming.
pub fn recommend(
    permafrost: &RiskComponentScore,
    ice_dam: &RiskComponentScore,
    freeze_thaw: &RiskComponentScore,
    climate: &ClimateImpact,
) -> Vec<&'static str> {
    let triggers = [
        (permafrost.score > PERMAFROST_TRIGGER, PERMAFROST_MEASURES),
        (ice_dam.score > ICE_DAM_TRIGGER, ICE_DAM_MEASURES),
        (freeze_thaw.score > FREEZE_THAW_TRIGGER, FREEZE_THAW_MEASURES),
        (climate.delta_t_c > WARMING_TRIGGER_C, CLIMATE_MEASURES),
        (true, ARCTIC_BASELINE_MEASURES),
    ];
    triggers
        .into_iter()
        .filter(|(fired, _)| *fired)
        .flat_map(|(_, measures)| measures.iter().copied())
        .collect()
}
