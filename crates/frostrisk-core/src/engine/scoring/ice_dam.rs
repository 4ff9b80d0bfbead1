use super::{ComponentScorer, ScoringInput};
use crate::core::models::assessment::{ComponentKind, Confidence, Rationale, RiskComponentScore};
use crate::core::physics::thermal::{IceThermalProfile, freezing_degree_days, ice_thickness};
use crate::engine::config::ExposureConfig;

const THICK_ICE_M: f64 = 0.5;
const THICK_ICE_JAM_PROBABILITY: f64 = 0.7;
const THIN_ICE_JAM_PROBABILITY: f64 = 0.3;
const THICK_ICE_POINTS: f64 = 45.0;
const THIN_ICE_POINTS: f64 = 20.0;

const FRAZIL_HIGH_POINTS: f64 = 30.0;
const FRAZIL_MEDIUM_POINTS: f64 = 15.0;

const EXTREME_EXPOSURE_LATITUDE: f64 = 70.0;
const EXTREME_EXPOSURE_MULTIPLIER: f64 = 1.2;

/// Ice-jam formation risk from freezing-degree-day ice growth and frazil conditions.
#[derive(Debug, Clone, Copy)]
pub struct IceDamFormationScorer {
    ice: IceThermalProfile,
    exposure: ExposureConfig,
}

impl IceDamFormationScorer {
    pub fn new(ice: IceThermalProfile, exposure: ExposureConfig) -> Self {
        Self { ice, exposure }
    }
}

impl ComponentScorer for IceDamFormationScorer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::IceDam
    }

    fn score(&self, input: &ScoringInput<'_>) -> RiskComponentScore {
        let weather = input.weather;
        let mut rationale = Rationale::new();
        let mut score = 0.0;

        let fdd = freezing_degree_days(weather.winter_temperature_c, self.exposure.winter_days);
        let thickness = ice_thickness(&self.ice, fdd);
        rationale.metric("freezing_degree_days", fdd);
        rationale.metric("ice_thickness_m", thickness);

        let jam_probability = if thickness > THICK_ICE_M {
            score += rationale.fire("ice_thickness>0.5m", THICK_ICE_POINTS);
            THICK_ICE_JAM_PROBABILITY
        } else {
            score += rationale.fire("ice_thickness<=0.5m", THIN_ICE_POINTS);
            THIN_ICE_JAM_PROBABILITY
        };
        rationale.metric("jam_probability", jam_probability);

        let air = weather.air_temperature_c;
        if -3.0 < air && air < 0.0 {
            score += rationale.fire("frazil_band_high", FRAZIL_HIGH_POINTS);
        } else if -6.0 < air && air <= -3.0 {
            score += rationale.fire("frazil_band_medium", FRAZIL_MEDIUM_POINTS);
        }

        if input.dam.latitude > EXTREME_EXPOSURE_LATITUDE {
            let extra = score * (EXTREME_EXPOSURE_MULTIPLIER - 1.0);
            score += rationale.fire("latitude>70", extra);
        }

        RiskComponentScore::new(
            self.kind(),
            score,
            rationale,
            Confidence::from_provenance(weather.provenance),
        )
    }
}
