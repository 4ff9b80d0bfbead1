use super::config::{AggregationWeights, AssessmentConfig};
use crate::core::models::assessment::{
    Confidence, DamModifiers, DataProvenance, DesignPeriod, MAX_SCORE, RiskCategory, clamp_score,
};
use crate::core::models::dam::{DamRecord, FreezeThawResistance};

const HIGH_RISK_ABOVE: f64 = 50.0;
const MEDIUM_RISK_ABOVE: f64 = 35.0;

/// Construction year assumed when the registry has none.
const ASSUMED_CONSTRUCTION_YEAR: i32 = 1980;
const SAFETY_FACTOR_HIGH: f64 = 2.5;
const SAFETY_FACTOR_MEDIUM: f64 = 2.0;
const MAINTENANCE_CREDIT_PCT: f64 = 15.0;

/// `HIGH` above 50, `MEDIUM` above 35 up to and including 50, otherwise `LOW`.
pub fn classify(score: f64) -> RiskCategory {
    if score > HIGH_RISK_ABOVE {
        RiskCategory::High
    } else if score > MEDIUM_RISK_ABOVE {
        RiskCategory::Medium
    } else {
        RiskCategory::Low
    }
}

/// Younger dams carry less risk, the oldest more. Unknown age is neutral.
pub fn age_factor(construction_year: Option<i32>, assessment_year: i32) -> f64 {
    let Some(year) = construction_year else {
        return 1.0;
    };
    match assessment_year - year {
        age if age < 20 => 0.8,
        age if age < 40 => 0.9,
        age if age < 60 => 1.0,
        age if age < 80 => 1.1,
        _ => 1.2,
    }
}

pub fn design_period(construction_year: Option<i32>) -> DesignPeriod {
    match construction_year.unwrap_or(ASSUMED_CONSTRUCTION_YEAR) {
        year if year < 1940 => DesignPeriod::PreRegulation,
        year if year <= 1980 => DesignPeriod::EarlyStandards,
        year if year <= 2010 => DesignPeriod::ModernCode,
        _ => DesignPeriod::CurrentCode,
    }
}

fn era_credit_pct(period: DesignPeriod) -> f64 {
    match period {
        DesignPeriod::PreRegulation => 5.0,
        DesignPeriod::EarlyStandards => 15.0,
        DesignPeriod::ModernCode => 30.0,
        DesignPeriod::CurrentCode => 40.0,
    }
}

fn safety_credit_pct(safety_factor: f64) -> f64 {
    if safety_factor >= SAFETY_FACTOR_HIGH {
        15.0
    } else if safety_factor >= SAFETY_FACTOR_MEDIUM {
        10.0
    } else {
        0.0
    }
}

fn resistance_credit_pct(resistance: FreezeThawResistance) -> f64 {
    match resistance {
        FreezeThawResistance::High => 20.0,
        FreezeThawResistance::Medium => 10.0,
        FreezeThawResistance::Low => 0.0,
    }
}

/// High when nothing was degraded, medium for one degraded input, low for both.
pub fn assessment_confidence(provenance: &DataProvenance) -> Confidence {
    match provenance.degraded_inputs() {
        0 => Confidence::High,
        1 => Confidence::Medium,
        _ => Confidence::Low,
    }
}

/// Combines component scores and applies dam-specific modifiers.
#[derive(Debug, Clone, Copy)]
pub struct RiskAggregator {
    weights: AggregationWeights,
    assessment_year: i32,
    risk_floor: f64,
    max_design_reduction_pct: f64,
}

impl RiskAggregator {
    pub fn new(config: &AssessmentConfig) -> Self {
        Self {
            weights: config.weights,
            assessment_year: config.assessment_year,
            risk_floor: config.risk_floor,
            max_design_reduction_pct: config.max_design_reduction_pct,
        }
    }

    pub fn weighted_sum(&self, permafrost: f64, ice_dam: f64, freeze_thaw: f64) -> f64 {
        self.weights.permafrost * permafrost
            + self.weights.ice_dam * ice_dam
            + self.weights.freeze_thaw * freeze_thaw
    }

    /// `min(100, weighted · multiplier)`, never negative.
    pub fn combine(&self, permafrost: f64, ice_dam: f64, freeze_thaw: f64, multiplier: f64) -> f64 {
        clamp_score(self.weighted_sum(permafrost, ice_dam, freeze_thaw) * multiplier)
    }

    pub fn modifiers(&self, dam: &DamRecord) -> DamModifiers {
        let standard = dam.purpose.design_standard();
        let period = design_period(dam.construction_year);
        let maintenance_quality = dam.owner.maintenance_quality();
        let reduction = era_credit_pct(period)
            + safety_credit_pct(standard.safety_factor)
            + resistance_credit_pct(standard.freeze_thaw_resistance)
            + maintenance_quality * MAINTENANCE_CREDIT_PCT;

        DamModifiers {
            age_factor: age_factor(dam.construction_year, self.assessment_year),
            design_period: period,
            maintenance_quality,
            safety_factor: standard.safety_factor,
            design_reduction_pct: reduction.min(self.max_design_reduction_pct),
        }
    }

    /// Applies age and design credit to the raw score, bounded by the floor and 100.
    pub fn adjust(&self, raw: f64, modifiers: &DamModifiers) -> f64 {
        let adjusted = raw * modifiers.age_factor * (1.0 - modifiers.design_reduction_pct / 100.0);
        clamp_score(adjusted.clamp(self.risk_floor, MAX_SCORE))
    }
}
