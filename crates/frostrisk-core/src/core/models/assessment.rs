use super::dam::{ArcticZone, DamRecord, ValidationStatus};
use super::weather::{Provenance, WeatherObservation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

#[inline]
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return MIN_SCORE;
    }
    score.clamp(MIN_SCORE, MAX_SCORE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Permafrost,
    IceDam,
    FreezeThaw,
    ClimateChange,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Permafrost => "permafrost",
            ComponentKind::IceDam => "ice-dam",
            ComponentKind::FreezeThaw => "freeze-thaw",
            ComponentKind::ClimateChange => "climate-change",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_provenance(provenance: Provenance) -> Self {
        match provenance {
            Provenance::Real => Confidence::High,
            Provenance::Fallback => Confidence::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A threshold rule that contributed points to a component score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiredThreshold {
    pub rule: &'static str,
    pub points: f64,
}

/// Which thresholds fired and the intermediate quantities they were evaluated on.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Rationale {
    pub fired: Vec<FiredThreshold>,
    pub metrics: BTreeMap<&'static str, f64>,
}

impl Rationale {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&mut self, rule: &'static str, points: f64) -> f64 {
        self.fired.push(FiredThreshold { rule, points });
        points
    }

    pub fn metric(&mut self, name: &'static str, value: f64) {
        self.metrics.insert(name, value);
    }

    pub fn has_fired(&self, rule: &str) -> bool {
        self.fired.iter().any(|f| f.rule == rule)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskComponentScore {
    pub component: ComponentKind,
    pub score: f64,
    pub rationale: Rationale,
    pub confidence: Confidence,
}

impl RiskComponentScore {
    /// Builds a component score, clamping it into [0, 100].
    pub fn new(
        component: ComponentKind,
        score: f64,
        rationale: Rationale,
        confidence: Confidence,
    ) -> Self {
        Self {
            component,
            score: clamp_score(score),
            rationale,
            confidence,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactSeverity {
    Moderate,
    Significant,
    Severe,
}

impl ImpactSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactSeverity::Moderate => "moderate",
            ImpactSeverity::Significant => "significant",
            ImpactSeverity::Severe => "severe",
        }
    }
}

/// Outcome of the climate-change component: a multiplier applied downstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateImpact {
    pub scenario: String,
    pub target_year: i32,
    pub delta_t_c: f64,
    pub multiplier: f64,
    pub severity: ImpactSeverity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 3] = [RiskCategory::Low, RiskCategory::Medium, RiskCategory::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction-era design regime, from least to most Arctic-aware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DesignPeriod {
    PreRegulation,
    EarlyStandards,
    ModernCode,
    CurrentCode,
}

impl DesignPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DesignPeriod::PreRegulation => "pre-regulation",
            DesignPeriod::EarlyStandards => "early-standards",
            DesignPeriod::ModernCode => "modern-code",
            DesignPeriod::CurrentCode => "current-code",
        }
    }
}

/// Dam-specific adjustments applied to the raw climate risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamModifiers {
    pub age_factor: f64,
    pub design_period: DesignPeriod,
    pub maintenance_quality: f64,
    pub safety_factor: f64,
    pub design_reduction_pct: f64,
}

/// Non-fatal data-quality problems, recorded on the assessment instead of interrupting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum DataIssue {
    #[error("{category} data unavailable: {detail}")]
    DataUnavailable {
        category: &'static str,
        detail: String,
    },
    #[error("dam '{dam_id}' not found in the authoritative registry")]
    RegistryMismatch { dam_id: String },
}

/// Per input category, whether the assessment used real or fallback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DataProvenance {
    pub weather: Provenance,
    pub freeze_thaw: Provenance,
    pub wind: Provenance,
    pub projection: Provenance,
    pub registry: ValidationStatus,
}

impl DataProvenance {
    pub fn degraded_inputs(&self) -> usize {
        let weather_degraded = !self.weather.is_real();
        let registry_degraded = self.registry == ValidationStatus::Unvalidated;
        usize::from(weather_degraded) + usize::from(registry_degraded)
    }
}

/// The engine's sole output artifact for one dam.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamRiskAssessment {
    pub dam: DamRecord,
    pub weather: WeatherObservation,
    pub permafrost: RiskComponentScore,
    pub ice_dam: RiskComponentScore,
    pub freeze_thaw: RiskComponentScore,
    pub climate_change: RiskComponentScore,
    pub climate: ClimateImpact,
    pub climate_multiplier: f64,
    pub raw_score: f64,
    pub modifiers: DamModifiers,
    pub overall_score: f64,
    pub risk_category: RiskCategory,
    pub confidence: Confidence,
    pub provenance: DataProvenance,
    pub issues: Vec<DataIssue>,
    pub mitigation: Vec<&'static str>,
}

impl DamRiskAssessment {
    pub fn dam_id(&self) -> &str {
        &self.dam.id
    }

    pub fn zone(&self) -> ArcticZone {
        self.dam.zone
    }

    pub fn components(&self) -> [&RiskComponentScore; 4] {
        [
            &self.permafrost,
            &self.ice_dam,
            &self.freeze_thaw,
            &self.climate_change,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_score_is_clamped_into_range() {
        let high = RiskComponentScore::new(
            ComponentKind::Permafrost,
            135.0,
            Rationale::new(),
            Confidence::High,
        );
        let low = RiskComponentScore::new(
            ComponentKind::IceDam,
            -4.0,
            Rationale::new(),
            Confidence::Low,
        );
        assert_eq!(high.score, 100.0);
        assert_eq!(low.score, 0.0);
    }

    #[test]
    fn nan_score_clamps_to_zero() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
    }

    #[test]
    fn rationale_records_fired_rules_in_order() {
        let mut rationale = Rationale::new();
        let added = rationale.fire("first", 20.0);
        rationale.fire("second", 15.0);
        rationale.metric("depth_m", 2.6);
        assert_eq!(added, 20.0);
        assert!(rationale.has_fired("second"));
        assert!(!rationale.has_fired("third"));
        assert_eq!(rationale.fired[0].rule, "first");
        assert_eq!(rationale.metrics["depth_m"], 2.6);
    }

    #[test]
    fn degraded_inputs_counts_weather_and_registry() {
        let provenance = DataProvenance {
            weather: Provenance::Fallback,
            freeze_thaw: Provenance::Fallback,
            wind: Provenance::Fallback,
            projection: Provenance::Real,
            registry: ValidationStatus::Unvalidated,
        };
        assert_eq!(provenance.degraded_inputs(), 2);
    }

    #[test]
    fn data_issue_messages_name_the_dam() {
        let issue = DataIssue::RegistryMismatch {
            dam_id: "1234".to_string(),
        };
        assert!(issue.to_string().contains("1234"));
    }
}
