use super::{ComponentScorer, ScoringInput};
use crate::core::models::assessment::{ComponentKind, Confidence, Rationale, RiskComponentScore};
use crate::core::models::dam::ArcticZone;

/// (cycles above, rule, service-life reduction %, points), most severe first.
const CYCLE_BANDS: [(u32, &str, f64, f64); 3] = [
    (100, "cycles>100", 50.0, 75.0),
    (60, "cycles>60", 30.0, 55.0),
    (30, "cycles>30", 15.0, 35.0),
];

const CRACK_PROPAGATION_HIGH_POINTS: f64 = 30.0;
const CRACK_PROPAGATION_SUB_ARCTIC_POINTS: f64 = 15.0;

/// Concrete degradation from annual freeze–thaw cycling.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreezeThawDegradationScorer;

impl FreezeThawDegradationScorer {
    pub fn new() -> Self {
        Self
    }
}

impl ComponentScorer for FreezeThawDegradationScorer {
    fn kind(&self) -> ComponentKind {
        ComponentKind::FreezeThaw
    }

    fn score(&self, input: &ScoringInput<'_>) -> RiskComponentScore {
        let cycles = input.weather.freeze_thaw_cycles;
        let mut rationale = Rationale::new();
        let mut score = 0.0;
        rationale.metric("annual_cycles", f64::from(cycles));

        let life_reduction = CYCLE_BANDS
            .iter()
            .find(|(threshold, ..)| cycles > *threshold)
            .map_or(0.0, |&(_, rule, reduction, points)| {
                score += rationale.fire(rule, points);
                reduction
            });
        rationale.metric("service_life_reduction_pct", life_reduction);

        score += match input.dam.zone {
            ArcticZone::HighArctic | ArcticZone::ExtremeArctic => {
                rationale.fire("crack_propagation_high", CRACK_PROPAGATION_HIGH_POINTS)
            }
            ArcticZone::SubArctic => {
                rationale.fire("crack_propagation_sub_arctic", CRACK_PROPAGATION_SUB_ARCTIC_POINTS)
            }
        };

        RiskComponentScore::new(
            self.kind(),
            score,
            rationale,
            Confidence::from_provenance(input.weather.freeze_thaw_provenance),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::weather::Provenance;
    use crate::engine::scoring::test_support::{dam_at, weather_with};

    fn score_for(cycles: u32, zone: ArcticZone) -> RiskComponentScore {
        let dam = dam_at(69.5, zone);
        let mut weather = weather_with(69.5, -3.0, -12.0, 10.0);
        weather.freeze_thaw_cycles = cycles;
        FreezeThawDegradationScorer::new().score(&ScoringInput { dam: &dam, weather: &weather })
    }

    #[test]
    fn cycle_bands_map_to_points_and_life_reduction() {
        let cases = [
            (101, 75.0 + 15.0, 50.0),
            (100, 55.0 + 15.0, 30.0),
            (61, 55.0 + 15.0, 30.0),
            (45, 35.0 + 15.0, 15.0),
            (30, 15.0, 0.0),
        ];
        for (cycles, expected_score, expected_reduction) in cases {
            let result = score_for(cycles, ArcticZone::SubArctic);
            assert_eq!(result.score, expected_score, "cycles = {cycles}");
            assert_eq!(
                result.rationale.metrics["service_life_reduction_pct"],
                expected_reduction
            );
        }
    }

    #[test]
    fn high_arctic_crack_term_and_cap() {
        assert_eq!(score_for(80, ArcticZone::HighArctic).score, 85.0);
        assert_eq!(score_for(120, ArcticZone::ExtremeArctic).score, 100.0);
    }

    #[test]
    fn confidence_follows_cycle_provenance() {
        let dam = dam_at(69.5, ArcticZone::HighArctic);
        let mut weather = weather_with(69.5, -3.0, -12.0, 10.0);
        weather.freeze_thaw_provenance = Provenance::Real;
        let result =
            FreezeThawDegradationScorer::new().score(&ScoringInput { dam: &dam, weather: &weather });
        assert_eq!(result.confidence, Confidence::High);
    }
}
