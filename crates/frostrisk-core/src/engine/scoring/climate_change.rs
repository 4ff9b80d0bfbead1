use super::{ComponentScorer, ScoringInput};
use crate::core::climate::projection::ClimateProjector;
use crate::core::models::assessment::{
    ClimateImpact, ComponentKind, Confidence, ImpactSeverity, Rationale, RiskComponentScore,
};
use crate::core::models::weather::Provenance;

/// Warming assumed when the table has no row for the scenario and zone.
pub const FALLBACK_DELTA_T_C: f64 = 1.5;
/// Risk increase per degree of warming.
const MULTIPLIER_PER_DEGREE: f64 = 0.1;
const SEVERE_DELTA_T_C: f64 = 2.5;
const SIGNIFICANT_DELTA_T_C: f64 = 2.0;

pub fn climate_multiplier(delta_t_c: f64) -> f64 {
    1.0 + MULTIPLIER_PER_DEGREE * delta_t_c
}

pub fn impact_severity(delta_t_c: f64) -> ImpactSeverity {
    if delta_t_c > SEVERE_DELTA_T_C {
        ImpactSeverity::Severe
    } else if delta_t_c > SIGNIFICANT_DELTA_T_C {
        ImpactSeverity::Significant
    } else {
        ImpactSeverity::Moderate
    }
}

/// Projected warming for the dam's zone, turned into a multiplier on the weighted risk.
#[derive(Debug, Clone, Copy)]
pub struct ClimateChangeScorer<'a> {
    projector: &'a ClimateProjector,
    scenario: &'a str,
    target_year: i32,
}

impl<'a> ClimateChangeScorer<'a> {
    pub fn new(projector: &'a ClimateProjector, scenario: &'a str, target_year: i32) -> Self {
        Self {
            projector,
            scenario,
            target_year,
        }
    }

    /// The climate impact and whether it came from the projection table.
    pub fn impact(&self, input: &ScoringInput<'_>) -> (ClimateImpact, Provenance) {
        let projection = self
            .projector
            .project(self.scenario, input.dam.zone, self.target_year);
        let (delta_t_c, provenance) = match projection {
            Some(p) => (p.delta_t_c, Provenance::Real),
            None => (FALLBACK_DELTA_T_C, Provenance::Fallback),
        };
        let impact = ClimateImpact {
            scenario: self.scenario.to_string(),
            target_year: self.target_year,
            delta_t_c,
            multiplier: climate_multiplier(delta_t_c),
            severity: impact_severity(delta_t_c),
        };
        (impact, provenance)
    }

    pub fn score_impact(&self, impact: &ClimateImpact, provenance: Provenance) -> RiskComponentScore {
        let mut rationale = Rationale::new();
        rationale.metric("delta_t_c", impact.delta_t_c);
        rationale.metric("multiplier", impact.multiplier);
        let rule = match impact.severity {
            ImpactSeverity::Severe => "delta_t>2.5",
            ImpactSeverity::Significant => "delta_t>2.0",
            ImpactSeverity::Moderate => "delta_t<=2.0",
        };
        let score = rationale.fire(rule, (impact.multiplier - 1.0) * 100.0);
        RiskComponentScore::new(
            self.kind(),
            score,
            rationale,
            Confidence::from_provenance(provenance),
        )
    }
}

impl ComponentScorer for ClimateChangeScorer<'_> {
    fn kind(&self) -> ComponentKind {
        ComponentKind::ClimateChange
    }

    fn score(&self, input: &ScoringInput<'_>) -> RiskComponentScore {
        let (impact, provenance) = self.impact(input);
        self.score_impact(&impact, provenance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::dam::ArcticZone;
    use crate::engine::scoring::test_support::{dam_at, weather_with};

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn three_degrees_gives_multiplier_of_one_point_three() {
        assert!(f64_approx_equal(climate_multiplier(3.0), 1.30));
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(impact_severity(2.6), ImpactSeverity::Severe);
        assert_eq!(impact_severity(2.5), ImpactSeverity::Significant);
        assert_eq!(impact_severity(2.1), ImpactSeverity::Significant);
        assert_eq!(impact_severity(2.0), ImpactSeverity::Moderate);
        assert_eq!(impact_severity(1.5), ImpactSeverity::Moderate);
    }

    #[test]
    fn projected_zone_warming_drives_the_score() {
        let projector = ClimateProjector::builtin();
        let scorer = ClimateChangeScorer::new(&projector, "SSP2-4.5", 2050);
        let dam = dam_at(71.5, ArcticZone::ExtremeArctic);
        let weather = weather_with(71.5, -6.0, -16.0, 9.0);
        let input = ScoringInput { dam: &dam, weather: &weather };

        let (impact, provenance) = scorer.impact(&input);
        assert_eq!(provenance, Provenance::Real);
        assert!(f64_approx_equal(impact.delta_t_c, 3.0));
        assert_eq!(impact.severity, ImpactSeverity::Severe);

        let result = scorer.score(&input);
        assert!(f64_approx_equal(result.score, 30.0));
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn unknown_scenario_uses_fallback_warming_with_low_confidence() {
        let projector = ClimateProjector::builtin();
        let scorer = ClimateChangeScorer::new(&projector, "RCP2.6", 2050);
        let dam = dam_at(68.0, ArcticZone::SubArctic);
        let weather = weather_with(68.0, -5.75, -15.75, 9.25);
        let input = ScoringInput { dam: &dam, weather: &weather };

        let (impact, provenance) = scorer.impact(&input);
        assert_eq!(provenance, Provenance::Fallback);
        assert!(f64_approx_equal(impact.multiplier, 1.15));
        assert_eq!(scorer.score(&input).confidence, Confidence::Low);
    }
}
