use super::{ComponentScorer, ScoringInput};
use crate::core::models::assessment::{ComponentKind, Confidence, Rationale, RiskComponentScore};
use crate::core::physics::thermal::{
    SoilThermalProfile, freezing_index, frost_penetration_depth, ground_temperature,
    thaw_penetration_depth, thawing_index,
};
use crate::engine::config::ExposureConfig;

const HIGH_RATIO: f64 = 0.3;
const MEDIUM_RATIO: f64 = 0.15;
const HIGH_RATIO_POINTS: f64 = 40.0;
const MEDIUM_RATIO_POINTS: f64 = 20.0;

const WARM_GROUND_C: f64 = -1.0;
const MARGINAL_GROUND_C: f64 = -3.0;
const WARM_GROUND_POINTS: f64 = 35.0;
const MARGINAL_GROUND_POINTS: f64 = 15.0;

/// Settlement in millimetres per unit of active-layer ratio.
const HIGH_SETTLEMENT_MM: f64 = 100.0;
const MEDIUM_SETTLEMENT_MM: f64 = 50.0;

/// Foundation stability from Stefan frost penetration and ground temperature.
#[derive(Debug, Clone, Copy)]
pub struct PermafrostStabilityScorer {
    soil: SoilThermalProfile,
    exposure: ExposureConfig,
}

impl PermafrostStabilityScorer {
    pub fn new(soil: SoilThermalProfile, exposure: ExposureConfig) -> Self {
        Self { soil, exposure }
    }
}

impl ComponentScorer for PermafrostStabilityScorer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Permafrost
    }

    fn score(&self, input: &ScoringInput<'_>) -> RiskComponentScore {
        let weather = input.weather;
        let mut rationale = Rationale::new();
        let mut score = 0.0;

        let index = freezing_index(weather.winter_temperature_c, self.exposure.winter_days);
        let depth = frost_penetration_depth(&self.soil, index);
        let ratio = depth / self.exposure.foundation_depth_m;
        rationale.metric("freezing_index", index);
        rationale.metric("frost_depth_m", depth);
        rationale.metric("active_layer_ratio", ratio);

        let settlement_mm = if ratio > HIGH_RATIO {
            score += rationale.fire("active_layer_ratio>0.3", HIGH_RATIO_POINTS);
            ratio * HIGH_SETTLEMENT_MM
        } else if ratio > MEDIUM_RATIO {
            score += rationale.fire("active_layer_ratio>0.15", MEDIUM_RATIO_POINTS);
            ratio * MEDIUM_SETTLEMENT_MM
        } else {
            0.0
        };
        rationale.metric("settlement_potential_mm", settlement_mm);

        let ground_c = ground_temperature(weather.air_temperature_c);
        rationale.metric("ground_temperature_c", ground_c);
        if ground_c > WARM_GROUND_C {
            score += rationale.fire("ground_temperature>-1", WARM_GROUND_POINTS);
        } else if ground_c > MARGINAL_GROUND_C {
            score += rationale.fire("ground_temperature>-3", MARGINAL_GROUND_POINTS);
        }

        let thaw_index = thawing_index(weather.summer_temperature_c, self.exposure.summer_days);
        rationale.metric("thaw_depth_m", thaw_penetration_depth(&self.soil, thaw_index));

        RiskComponentScore::new(
            self.kind(),
            score,
            rationale,
            Confidence::from_provenance(weather.provenance),
        )
    }
}
