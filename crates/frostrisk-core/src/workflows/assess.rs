use crate::core::climate::projection::ClimateProjector;
use crate::core::models::assessment::{
    Confidence, DamRiskAssessment, DataIssue, DataProvenance, RiskCategory,
};
use crate::core::models::dam::{ArcticZone, DamRecord, ValidationStatus};
use crate::core::models::weather::Provenance;
use crate::engine::aggregate::{RiskAggregator, assessment_confidence, classify};
use crate::engine::config::AssessmentConfig;
use crate::engine::error::{EngineError, SkipReason, SkippedDam};
use crate::engine::inputs::AssessmentInputs;
use crate::engine::mitigation::recommend;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::registry::DamRegistry;
use crate::engine::scoring::{
    ClimateChangeScorer, ComponentScorer, FreezeThawDegradationScorer, IceDamFormationScorer,
    PermafrostStabilityScorer, ScoringInput,
};
use crate::engine::weather::WeatherDataProvider;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result for one dam row: a full assessment, or the reason it never entered the batch.
#[derive(Debug, Clone, PartialEq)]
pub enum DamOutcome {
    Assessed(Box<DamRiskAssessment>),
    Skipped(SkippedDam),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentReport {
    /// Assessed dams in population order, then skipped rows.
    pub outcomes: Vec<DamOutcome>,
    pub summary: BatchSummary,
}

impl AssessmentReport {
    pub fn assessments(&self) -> impl Iterator<Item = &DamRiskAssessment> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            DamOutcome::Assessed(assessment) => Some(assessment.as_ref()),
            DamOutcome::Skipped(_) => None,
        })
    }
}

/// The batch-level surface for degraded-data usage. Scalars come before tables so the summary
/// serialises cleanly to TOML.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub scenario: String,
    pub target_year: i32,
    pub assessment_year: i32,
    pub total_rows: usize,
    pub arctic_dams: usize,
    pub assessed: usize,
    pub unscheduled: usize,
    pub cancelled: bool,
    pub mean_overall_score: f64,
    pub max_overall_score: f64,
    pub risk_categories: BTreeMap<String, usize>,
    pub zones: BTreeMap<String, usize>,
    pub weather_provenance: BTreeMap<String, usize>,
    pub registry_provenance: BTreeMap<String, usize>,
    pub confidence: BTreeMap<String, usize>,
    pub skipped_by_reason: BTreeMap<String, usize>,
    pub skipped: Vec<SkippedDam>,
}

fn zeroed<'a>(labels: impl IntoIterator<Item = &'a str>) -> BTreeMap<String, usize> {
    labels.into_iter().map(|l| (l.to_string(), 0)).collect()
}

impl BatchSummary {
    fn tally(
        config: &AssessmentConfig,
        registry: &DamRegistry,
        assessments: &[DamRiskAssessment],
        unscheduled: usize,
        cancelled: bool,
    ) -> Self {
        let mut risk_categories = zeroed(RiskCategory::ALL.iter().map(|c| c.as_str()));
        let mut zones = zeroed(ArcticZone::ALL.iter().map(|z| z.as_str()));
        let mut weather_provenance =
            zeroed([Provenance::Real, Provenance::Fallback].iter().map(|p| p.as_str()));
        let mut registry_provenance = zeroed(
            [ValidationStatus::Validated, ValidationStatus::Unvalidated]
                .iter()
                .map(|v| v.as_str()),
        );
        let mut confidence = zeroed(
            [Confidence::High, Confidence::Medium, Confidence::Low]
                .iter()
                .map(|c| c.as_str()),
        );
        let mut skipped_by_reason = zeroed(
            [
                SkipReason::MalformedCoordinates,
                SkipReason::OutsideTerritory,
                SkipReason::BelowArcticCircle,
            ]
            .iter()
            .map(|r| r.as_str()),
        );

        let bump = |map: &mut BTreeMap<String, usize>, key: &str| {
            *map.entry(key.to_string()).or_default() += 1;
        };
        for a in assessments {
            bump(&mut risk_categories, a.risk_category.as_str());
            bump(&mut zones, a.zone().as_str());
            bump(&mut weather_provenance, a.provenance.weather.as_str());
            bump(&mut registry_provenance, a.provenance.registry.as_str());
            bump(&mut confidence, a.confidence.as_str());
        }
        for s in registry.skipped() {
            bump(&mut skipped_by_reason, s.reason.as_str());
        }

        let total: f64 = assessments.iter().map(|a| a.overall_score).sum();
        let mean_overall_score = if assessments.is_empty() {
            0.0
        } else {
            total / assessments.len() as f64
        };
        let max_overall_score = assessments
            .iter()
            .map(|a| a.overall_score)
            .fold(0.0, f64::max);

        Self {
            scenario: config.scenario.clone(),
            target_year: config.target_year,
            assessment_year: config.assessment_year,
            total_rows: registry.total_rows(),
            arctic_dams: registry.len(),
            assessed: assessments.len(),
            unscheduled,
            cancelled,
            mean_overall_score,
            max_overall_score,
            risk_categories,
            zones,
            weather_provenance,
            registry_provenance,
            confidence,
            skipped_by_reason,
            skipped: registry.skipped().to_vec(),
        }
    }
}

/// Scores individual dams. Holds only read-only state, so it is shared freely across threads.
pub struct BatchRunner<'a> {
    config: &'a AssessmentConfig,
    projector: &'a ClimateProjector,
    weather: WeatherDataProvider,
    permafrost: PermafrostStabilityScorer,
    ice_dam: IceDamFormationScorer,
    freeze_thaw: FreezeThawDegradationScorer,
    aggregator: RiskAggregator,
}

impl<'a> BatchRunner<'a> {
    pub fn new(inputs: &'a AssessmentInputs, config: &'a AssessmentConfig) -> Self {
        Self {
            config,
            projector: &inputs.projector,
            weather: WeatherDataProvider::new(
                inputs.catalog.clone(),
                &inputs.series,
                &config.weather,
                config.zones.arctic_circle,
            ),
            permafrost: PermafrostStabilityScorer::new(config.soil, config.exposure),
            ice_dam: IceDamFormationScorer::new(config.ice, config.exposure),
            freeze_thaw: FreezeThawDegradationScorer::new(),
            aggregator: RiskAggregator::new(config),
        }
    }

    /// Resolves nearest stations for the given dams ahead of the parallel phase.
    pub fn prepare(&mut self, dams: &[DamRecord]) {
        self.weather
            .warm_cache(dams.iter().map(|d| (d.latitude, d.longitude)));
    }

    /// The full per-dam pipeline: weather, four scorers, aggregation, classification.
    pub fn assess(&self, dam: &DamRecord) -> DamRiskAssessment {
        let resolved = self.weather.resolve(dam.latitude, dam.longitude);
        let weather = resolved.observation;
        let input = ScoringInput {
            dam,
            weather: &weather,
        };

        let permafrost = self.permafrost.score(&input);
        let ice_dam = self.ice_dam.score(&input);
        let freeze_thaw = self.freeze_thaw.score(&input);
        let climate_scorer =
            ClimateChangeScorer::new(self.projector, &self.config.scenario, self.config.target_year);
        let (climate, projection) = climate_scorer.impact(&input);
        let climate_change = climate_scorer.score_impact(&climate, projection);

        let raw_score = self.aggregator.combine(
            permafrost.score,
            ice_dam.score,
            freeze_thaw.score,
            climate.multiplier,
        );
        let modifiers = self.aggregator.modifiers(dam);
        let overall_score = self.aggregator.adjust(raw_score, &modifiers);

        let provenance = DataProvenance {
            weather: weather.provenance,
            freeze_thaw: weather.freeze_thaw_provenance,
            wind: Provenance::Fallback,
            projection,
            registry: dam.validation,
        };

        let mut issues = DamRegistry::issues_for(dam);
        issues.extend(resolved.issue);
        if !projection.is_real() {
            issues.push(DataIssue::DataUnavailable {
                category: "climate projection",
                detail: format!(
                    "no {} projection for {} in {}",
                    climate.scenario, dam.zone, climate.target_year
                ),
            });
        }

        let mitigation = recommend(&permafrost, &ice_dam, &freeze_thaw, &climate);
        let risk_category = classify(overall_score);
        debug!(
            dam_id = %dam.id,
            raw_score,
            overall_score,
            category = %risk_category,
            weather = %weather.provenance,
            "Dam assessed."
        );

        DamRiskAssessment {
            dam: dam.clone(),
            weather,
            permafrost,
            ice_dam,
            freeze_thaw,
            climate_change,
            climate_multiplier: climate.multiplier,
            climate,
            raw_score,
            modifiers,
            overall_score,
            risk_category,
            confidence: assessment_confidence(&provenance),
            provenance,
            issues,
            mitigation,
        }
    }
}

/// Assesses the whole Arctic population.
///
/// Setting `cancel` stops further dams from being scheduled; dams already running finish, and
/// the summary records how many were never started.
#[instrument(skip_all, name = "assessment_workflow")]
pub fn run(
    inputs: &AssessmentInputs,
    config: &AssessmentConfig,
    reporter: &ProgressReporter,
    cancel: &AtomicBool,
) -> Result<AssessmentReport, EngineError> {
    // === Phase 1: Arctic population ===
    reporter.report(Progress::PhaseStart { name: "Registry" });
    let registry = DamRegistry::build(
        &inputs.dams,
        inputs.registry.as_ref(),
        &config.zones,
        &config.territory,
    );
    if inputs.registry.is_none() {
        warn!("No authoritative registry supplied; every dam is unvalidated.");
    }
    reporter.report(Progress::Message(format!(
        "{} Arctic dam(s), {} row(s) skipped",
        registry.len(),
        registry.skipped().len()
    )));
    reporter.report(Progress::PhaseFinish);

    // === Phase 2: Weather resolution ===
    reporter.report(Progress::PhaseStart { name: "Weather" });
    if !inputs.projector.has_scenario(&config.scenario) {
        warn!(
            scenario = %config.scenario,
            "Scenario not in projection table; using fallback warming for every dam."
        );
    }
    let mut runner = BatchRunner::new(inputs, config);
    runner.prepare(registry.dams());
    info!(
        usable_stations = runner.weather.usable_stations(),
        "Weather provider prepared."
    );
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Scoring ===
    reporter.report(Progress::PhaseStart { name: "Scoring" });
    reporter.report(Progress::TaskStart {
        total_steps: registry.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = registry.dams().iter();

    #[cfg(feature = "parallel")]
    let iterator = registry.dams().par_iter();

    let runner = &runner;
    let results: Vec<Option<DamRiskAssessment>> = iterator
        .map(|dam| {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            let assessment = runner.assess(dam);
            reporter.report(Progress::TaskIncrement);
            Some(assessment)
        })
        .collect();

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let unscheduled = results.iter().filter(|r| r.is_none()).count();
    let cancelled = cancel.load(Ordering::Relaxed);
    let assessments: Vec<DamRiskAssessment> = results.into_iter().flatten().collect();
    if cancelled {
        warn!(unscheduled, "Assessment cancelled before all dams were scheduled.");
    }

    let summary = BatchSummary::tally(config, &registry, &assessments, unscheduled, cancelled);
    info!(
        assessed = summary.assessed,
        skipped = summary.skipped.len(),
        high = summary.risk_categories.get("HIGH").copied().unwrap_or(0),
        "Assessment complete."
    );

    let outcomes = assessments
        .into_iter()
        .map(|a| DamOutcome::Assessed(Box::new(a)))
        .chain(registry.skipped().iter().cloned().map(DamOutcome::Skipped))
        .collect();
    Ok(AssessmentReport { outcomes, summary })
}

/// One flattened output row per assessed dam.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRecord {
    pub dam_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub zone: &'static str,
    pub validated: bool,
    pub purpose: &'static str,
    pub owner: &'static str,
    pub construction_year: Option<i32>,
    pub permafrost: f64,
    pub ice_dam: f64,
    pub freeze_thaw: f64,
    pub climate_change: f64,
    pub climate_multiplier: f64,
    pub delta_t_c: f64,
    pub climate_severity: &'static str,
    pub raw_score: f64,
    pub age_factor: f64,
    pub design_reduction_pct: f64,
    pub overall_score: f64,
    pub risk_category: &'static str,
    pub confidence: &'static str,
    pub weather_provenance: &'static str,
    pub registry_provenance: &'static str,
    pub projection_provenance: &'static str,
    pub station_id: String,
    pub station_distance_km: Option<f64>,
    pub freeze_thaw_cycles: u32,
    pub issues: String,
}

impl From<&DamRiskAssessment> for AssessmentRecord {
    fn from(a: &DamRiskAssessment) -> Self {
        Self {
            dam_id: a.dam.id.clone(),
            name: a.dam.name.clone(),
            latitude: a.dam.latitude,
            longitude: a.dam.longitude,
            zone: a.dam.zone.as_str(),
            validated: a.dam.is_validated(),
            purpose: a.dam.purpose.as_str(),
            owner: a.dam.owner.as_str(),
            construction_year: a.dam.construction_year,
            permafrost: a.permafrost.score,
            ice_dam: a.ice_dam.score,
            freeze_thaw: a.freeze_thaw.score,
            climate_change: a.climate_change.score,
            climate_multiplier: a.climate_multiplier,
            delta_t_c: a.climate.delta_t_c,
            climate_severity: a.climate.severity.as_str(),
            raw_score: a.raw_score,
            age_factor: a.modifiers.age_factor,
            design_reduction_pct: a.modifiers.design_reduction_pct,
            overall_score: a.overall_score,
            risk_category: a.risk_category.as_str(),
            confidence: a.confidence.as_str(),
            weather_provenance: a.provenance.weather.as_str(),
            registry_provenance: a.provenance.registry.as_str(),
            projection_provenance: a.provenance.projection.as_str(),
            station_id: a.weather.station_id.clone(),
            station_distance_km: a.weather.station_distance_km,
            freeze_thaw_cycles: a.weather.freeze_thaw_cycles,
            issues: a
                .issues
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::dams::RawDamRow;
    use crate::core::io::registry::{AuthoritativeRegistry, RegistryEntry};
    use crate::core::models::weather::SeasonalRecord;
    use crate::engine::config::AssessmentConfigBuilder;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn config(scenario: &str) -> AssessmentConfig {
        AssessmentConfigBuilder::new()
            .scenario(scenario)
            .target_year(2050)
            .assessment_year(2024)
            .build()
            .unwrap()
    }

    fn raw(id: &str, latitude: f64, longitude: f64, year: Option<i32>) -> RawDamRow {
        RawDamRow {
            row: 2,
            id: id.to_string(),
            name: format!("Dam {id}"),
            latitude: Some(latitude),
            longitude: Some(longitude),
            purpose: "Kraftproduksjon".to_string(),
            construction_year: year,
            owner: "Statkraft".to_string(),
        }
    }

    fn tromso_series() -> Vec<SeasonalRecord> {
        [2022, 2023]
            .iter()
            .flat_map(|&year| {
                [(3, -4.0), (6, 9.0), (9, 3.0), (12, -8.0)]
                    .into_iter()
                    .map(move |(month, mean)| SeasonalRecord {
                        year,
                        month,
                        mean_temperature_c: Some(mean),
                        max_temperature_c: Some(mean + 8.0),
                        precipitation_mm: Some(100.0),
                        temperature_anomaly_c: Some(1.0),
                    })
            })
            .collect()
    }

    fn mixed_population() -> AssessmentInputs {
        let mut inputs = AssessmentInputs::new(vec![
            raw("fallback", 68.0, 16.0, Some(1960)),
            raw("tromso", 69.6, 19.0, Some(1995)),
            raw("north", 71.2, 25.5, None),
            raw("circle", 66.5, 14.0, Some(1970)),
            raw("just-north", 66.51, 14.0, Some(1970)),
            RawDamRow {
                latitude: None,
                ..raw("broken", 0.0, 0.0, None)
            },
        ]);
        let registry: AuthoritativeRegistry = ["tromso", "north"]
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    RegistryEntry {
                        id: id.to_string(),
                        ..Default::default()
                    },
                )
            })
            .collect();
        inputs.registry = Some(registry);
        inputs.series.insert("SN90450".to_string(), tromso_series());
        inputs
    }

    fn run_default(inputs: &AssessmentInputs, scenario: &str) -> AssessmentReport {
        run(
            inputs,
            &config(scenario),
            &ProgressReporter::new(),
            &AtomicBool::new(false),
        )
        .unwrap()
    }

    fn find<'a>(report: &'a AssessmentReport, id: &str) -> &'a DamRiskAssessment {
        report.assessments().find(|a| a.dam_id() == id).unwrap()
    }

    #[test]
    fn fallback_unvalidated_dam_matches_hand_calculation() {
        let report = run_default(&mixed_population(), "SSP2-4.5");
        let a = find(&report, "fallback");

        assert_eq!(a.permafrost.score, 20.0);
        assert_eq!(a.ice_dam.score, 60.0);
        assert_eq!(a.freeze_thaw.score, 15.0);
        assert!(f64_approx_equal(a.climate_multiplier, 1.2));
        // (0.40·20 + 0.25·60 + 0.20·15) · 1.2
        assert!(f64_approx_equal(a.raw_score, 31.2));
        // age 64 → 1.1; unknown purpose/owner, 1960: 15 + 15 + 10 + 10.5
        assert!(f64_approx_equal(a.overall_score, 31.2 * 1.1 * (1.0 - 0.505)));
        assert_eq!(a.risk_category, RiskCategory::Low);
        assert_eq!(a.confidence, Confidence::Low);
        assert_eq!(a.provenance.weather, Provenance::Fallback);
        assert_eq!(a.provenance.registry, ValidationStatus::Unvalidated);
        assert!(matches!(a.issues[0], DataIssue::RegistryMismatch { .. }));
        assert!(matches!(
            a.issues[1],
            DataIssue::DataUnavailable {
                category: "weather",
                ..
            }
        ));
    }

    #[test]
    fn dam_near_station_uses_real_weather_and_validated_attributes() {
        let report = run_default(&mixed_population(), "SSP2-4.5");
        let a = find(&report, "tromso");
        assert_eq!(a.provenance.weather, Provenance::Real);
        assert_eq!(a.provenance.wind, Provenance::Fallback);
        assert_eq!(a.provenance.registry, ValidationStatus::Validated);
        assert_eq!(a.confidence, Confidence::High);
        assert_eq!(a.weather.station_id, "SN90450");
        assert!(a.issues.is_empty());
    }

    #[test]
    fn arctic_circle_boundary_and_skips_are_reported() {
        let report = run_default(&mixed_population(), "SSP2-4.5");
        assert!(report.assessments().any(|a| a.dam_id() == "just-north"));
        assert!(!report.assessments().any(|a| a.dam_id() == "circle"));

        let summary = &report.summary;
        assert_eq!(summary.total_rows, 6);
        assert_eq!(summary.assessed, 4);
        assert_eq!(summary.skipped.len(), 2);
        assert_eq!(summary.skipped_by_reason["below-arctic-circle"], 1);
        assert_eq!(summary.skipped_by_reason["malformed-coordinates"], 1);
        assert_eq!(summary.skipped_by_reason["outside-territory"], 0);
        let skipped_outcomes = report
            .outcomes
            .iter()
            .filter(|o| matches!(o, DamOutcome::Skipped(_)))
            .count();
        assert_eq!(skipped_outcomes, 2);
    }

    #[test]
    fn summary_counts_are_consistent() {
        let report = run_default(&mixed_population(), "SSP2-4.5");
        let summary = &report.summary;
        assert_eq!(summary.risk_categories.values().sum::<usize>(), summary.assessed);
        assert_eq!(summary.zones.values().sum::<usize>(), summary.assessed);
        assert_eq!(summary.weather_provenance["real"], 1);
        assert_eq!(summary.weather_provenance["fallback"], 3);
        assert_eq!(summary.registry_provenance["validated"], 2);
        assert!(!summary.cancelled);
        assert_eq!(summary.unscheduled, 0);
    }

    #[test]
    fn all_scores_stay_in_range() {
        let report = run_default(&mixed_population(), "SSP5-8.5");
        for a in report.assessments() {
            assert!((0.0..=100.0).contains(&a.overall_score), "{}", a.dam_id());
            assert!((0.0..=100.0).contains(&a.raw_score));
            for component in a.components() {
                assert!((0.0..=100.0).contains(&component.score));
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let inputs = mixed_population();
        let first = run_default(&inputs, "SSP2-4.5");
        let second = run_default(&inputs, "SSP2-4.5");
        assert_eq!(first, second);

        let rows = |report: &AssessmentReport| -> Vec<AssessmentRecord> {
            report.assessments().map(AssessmentRecord::from).collect()
        };
        assert_eq!(rows(&first), rows(&second));
    }

    #[test]
    fn population_order_is_northernmost_first() {
        let report = run_default(&mixed_population(), "SSP2-4.5");
        let ids: Vec<&str> = report.assessments().map(|a| a.dam_id()).collect();
        assert_eq!(ids, vec!["north", "tromso", "fallback", "just-north"]);
    }

    #[test]
    fn cancellation_before_start_schedules_nothing() {
        let report = run(
            &mixed_population(),
            &config("SSP2-4.5"),
            &ProgressReporter::new(),
            &AtomicBool::new(true),
        )
        .unwrap();
        assert!(report.summary.cancelled);
        assert_eq!(report.summary.assessed, 0);
        assert_eq!(report.summary.unscheduled, 4);
        assert_eq!(report.summary.mean_overall_score, 0.0);
    }

    #[test]
    fn unknown_scenario_records_projection_fallback() {
        let report = run_default(&mixed_population(), "SSP9-9.9");
        let a = find(&report, "tromso");
        assert_eq!(a.provenance.projection, Provenance::Fallback);
        assert_eq!(a.climate_change.confidence, Confidence::Low);
        assert!(f64_approx_equal(a.climate.delta_t_c, 1.5));
        assert!(a.issues.iter().any(|i| matches!(
            i,
            DataIssue::DataUnavailable {
                category: "climate projection",
                ..
            }
        )));
    }

    #[test]
    fn record_flattens_the_assessment() {
        let report = run_default(&mixed_population(), "SSP2-4.5");
        let a = find(&report, "fallback");
        let record = AssessmentRecord::from(a);
        assert_eq!(record.dam_id, "fallback");
        assert_eq!(record.zone, "sub-arctic");
        assert!(!record.validated);
        assert_eq!(record.weather_provenance, "fallback");
        assert_eq!(record.registry_provenance, "unvalidated");
        assert_eq!(record.risk_category, "LOW");
        assert!(record.issues.contains("authoritative registry"));
    }

    #[test]
    fn progress_reports_one_increment_per_dam() {
        use std::sync::atomic::AtomicUsize;
        let increments = AtomicUsize::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if matches!(event, Progress::TaskIncrement) {
                increments.fetch_add(1, Ordering::Relaxed);
            }
        }));
        run(
            &mixed_population(),
            &config("SSP2-4.5"),
            &reporter,
            &AtomicBool::new(false),
        )
        .unwrap();
        drop(reporter);
        assert_eq!(increments.into_inner(), 4);
    }
}
