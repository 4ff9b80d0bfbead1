use super::config::{TerritoryBounds, ZoneThresholds};
use super::error::{SkipReason, SkippedDam};
use crate::core::io::dams::RawDamRow;
use crate::core::io::registry::{AuthoritativeRegistry, RegistryEntry};
use crate::core::models::assessment::DataIssue;
use crate::core::models::dam::{
    DamPurpose, DamRecord, OwnerType, ValidationStatus, arctic_distance_km,
};
use crate::core::utils::geometry::is_valid_coordinate;
use std::cmp::Ordering;
use tracing::{debug, info, instrument, warn};

/// The Arctic dam population for one run, cross-validated and zoned. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct DamRegistry {
    dams: Vec<DamRecord>,
    skipped: Vec<SkippedDam>,
    total_rows: usize,
}

impl DamRegistry {
    /// Filters raw rows to the Arctic subset and resolves each dam's attributes.
    ///
    /// Without an authoritative registry every dam is unvalidated.
    #[instrument(skip_all, name = "dam_registry_build")]
    pub fn build(
        rows: &[RawDamRow],
        authoritative: Option<&AuthoritativeRegistry>,
        zones: &ZoneThresholds,
        territory: &TerritoryBounds,
    ) -> Self {
        let mut dams = Vec::new();
        let mut skipped = Vec::new();

        for row in rows {
            let (latitude, longitude) = match locate(row, zones, territory) {
                Ok(position) => position,
                Err(reason) => {
                    if reason == SkipReason::BelowArcticCircle {
                        debug!(dam_id = %row.id, row = row.row, "Dam south of the Arctic Circle.");
                    } else {
                        warn!(dam_id = %row.id, row = row.row, %reason, "Skipping dam row.");
                    }
                    skipped.push(SkippedDam {
                        dam_id: row.id.clone(),
                        row: row.row,
                        reason,
                    });
                    continue;
                }
            };
            let entry = authoritative.and_then(|registry| registry.get(&row.id));
            dams.push(resolve(row, entry, latitude, longitude, zones));
        }

        dams.sort_by(|a, b| {
            b.latitude
                .partial_cmp(&a.latitude)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        let registry = Self {
            dams,
            skipped,
            total_rows: rows.len(),
        };
        info!(
            rows = registry.total_rows,
            arctic = registry.dams.len(),
            validated = registry.validated_count(),
            skipped = registry.skipped.len(),
            "Dam registry built."
        );
        registry
    }

    /// Arctic dams, northernmost first.
    pub fn dams(&self) -> &[DamRecord] {
        &self.dams
    }

    pub fn skipped(&self) -> &[SkippedDam] {
        &self.skipped
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn len(&self) -> usize {
        self.dams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dams.is_empty()
    }

    pub fn validated_count(&self) -> usize {
        self.dams.iter().filter(|d| d.is_validated()).count()
    }

    /// Registry-related data issues for a dam.
    pub fn issues_for(dam: &DamRecord) -> Vec<DataIssue> {
        match dam.validation {
            ValidationStatus::Validated => Vec::new(),
            ValidationStatus::Unvalidated => vec![DataIssue::RegistryMismatch {
                dam_id: dam.id.clone(),
            }],
        }
    }
}

/// Checks a row's coordinates in order: parseable, inside the territory, north of the circle.
pub fn locate(
    row: &RawDamRow,
    zones: &ZoneThresholds,
    territory: &TerritoryBounds,
) -> Result<(f64, f64), SkipReason> {
    let (Some(latitude), Some(longitude)) = (row.latitude, row.longitude) else {
        return Err(SkipReason::MalformedCoordinates);
    };
    if !is_valid_coordinate(latitude, longitude) {
        return Err(SkipReason::MalformedCoordinates);
    }
    if !territory.contains(latitude, longitude) {
        return Err(SkipReason::OutsideTerritory);
    }
    if !zones.is_arctic(latitude) {
        return Err(SkipReason::BelowArcticCircle);
    }
    Ok((latitude, longitude))
}

fn resolve(
    row: &RawDamRow,
    entry: Option<&RegistryEntry>,
    latitude: f64,
    longitude: f64,
    zones: &ZoneThresholds,
) -> DamRecord {
    let (purpose, construction_year, owner, validation) = match entry {
        Some(entry) => (
            DamPurpose::from_label(entry.purpose.as_deref().unwrap_or(&row.purpose)),
            entry.construction_year.or(row.construction_year),
            OwnerType::from_label(entry.owner.as_deref().unwrap_or(&row.owner)),
            ValidationStatus::Validated,
        ),
        None => {
            debug!(dam_id = %row.id, "Dam not in authoritative registry; using conservative defaults.");
            (
                DamPurpose::Unknown,
                row.construction_year,
                OwnerType::Unknown,
                ValidationStatus::Unvalidated,
            )
        }
    };

    DamRecord {
        id: row.id.clone(),
        name: row.name.clone(),
        latitude,
        longitude,
        purpose,
        construction_year,
        owner,
        validation,
        zone: zones.zone(latitude),
        arctic_distance_km: arctic_distance_km(latitude, zones.arctic_circle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::dam::ArcticZone;

    fn row(id: &str, latitude: Option<f64>, longitude: Option<f64>) -> RawDamRow {
        RawDamRow {
            row: 2,
            id: id.to_string(),
            name: format!("Dam {id}"),
            latitude,
            longitude,
            purpose: "Vannforsyning".to_string(),
            construction_year: Some(1975),
            owner: "Private person".to_string(),
        }
    }

    fn authoritative(ids: &[&str]) -> AuthoritativeRegistry {
        ids.iter()
            .map(|id| {
                (
                    id.to_string(),
                    RegistryEntry {
                        id: id.to_string(),
                        purpose: Some("Kraftproduksjon".to_string()),
                        construction_year: None,
                        owner: Some("Statkraft".to_string()),
                    },
                )
            })
            .collect()
    }

    fn build(rows: &[RawDamRow], registry: Option<&AuthoritativeRegistry>) -> DamRegistry {
        DamRegistry::build(
            rows,
            registry,
            &ZoneThresholds::default(),
            &TerritoryBounds::default(),
        )
    }

    #[test]
    fn arctic_circle_itself_is_excluded() {
        let rows = [
            row("on", Some(66.5), Some(14.0)),
            row("north", Some(66.51), Some(14.0)),
        ];
        let registry = build(&rows, None);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.dams()[0].id, "north");
        assert_eq!(registry.skipped()[0].reason, SkipReason::BelowArcticCircle);
    }

    #[test]
    fn skip_reasons_are_distinguished() {
        let rows = [
            row("missing", None, Some(14.0)),
            row("nan", Some(f64::NAN), Some(14.0)),
            row("abroad", Some(70.0), Some(45.0)),
            row("south", Some(60.0), Some(10.0)),
        ];
        let registry = build(&rows, None);
        let reasons: Vec<SkipReason> = registry.skipped().iter().map(|s| s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                SkipReason::MalformedCoordinates,
                SkipReason::MalformedCoordinates,
                SkipReason::OutsideTerritory,
                SkipReason::BelowArcticCircle,
            ]
        );
        assert!(registry.is_empty());
        assert_eq!(registry.total_rows(), 4);
    }

    #[test]
    fn matched_dams_take_authoritative_attributes() {
        let rows = [row("1", Some(70.2), Some(25.0))];
        let lookup = authoritative(&["1"]);
        let registry = build(&rows, Some(&lookup));
        let dam = &registry.dams()[0];
        assert_eq!(dam.validation, ValidationStatus::Validated);
        assert_eq!(dam.purpose, DamPurpose::Hydropower);
        assert_eq!(dam.owner, OwnerType::State);
        assert_eq!(dam.construction_year, Some(1975));
        assert_eq!(dam.zone, ArcticZone::HighArctic);
        assert!(DamRegistry::issues_for(dam).is_empty());
    }

    #[test]
    fn unmatched_dams_are_kept_with_conservative_defaults() {
        let rows = [row("2", Some(67.0), Some(15.0))];
        let lookup = authoritative(&["1"]);
        let registry = build(&rows, Some(&lookup));
        let dam = &registry.dams()[0];
        assert_eq!(dam.validation, ValidationStatus::Unvalidated);
        assert_eq!(dam.purpose, DamPurpose::Unknown);
        assert_eq!(dam.owner, OwnerType::Unknown);
        assert_eq!(
            DamRegistry::issues_for(dam),
            vec![DataIssue::RegistryMismatch {
                dam_id: "2".to_string()
            }]
        );
    }

    #[test]
    fn population_is_ordered_northernmost_first_with_id_ties() {
        let rows = [
            row("b", Some(68.0), Some(15.0)),
            row("c", Some(71.5), Some(25.0)),
            row("a", Some(68.0), Some(16.0)),
        ];
        let registry = build(&rows, None);
        let ids: Vec<&str> = registry.dams().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(registry.dams()[0].zone, ArcticZone::ExtremeArctic);
    }

    #[test]
    fn arctic_distance_is_recorded() {
        let rows = [row("1", Some(67.5), Some(15.0))];
        let registry = build(&rows, None);
        assert!((registry.dams()[0].arctic_distance_km - 111.32).abs() < 1e-9);
    }
}
