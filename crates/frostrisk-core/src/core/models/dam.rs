use serde::Serialize;
use std::fmt;

/// Kilometres per degree of latitude used for the distance north of the Arctic Circle.
const KM_PER_DEGREE_LATITUDE: f64 = 111.32;

/// Latitude-banded exposure class of an Arctic dam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArcticZone {
    SubArctic,     // Arctic Circle up to the high-arctic threshold
    HighArctic,    // High-arctic threshold up to the extreme-arctic threshold
    ExtremeArctic, // At or above the extreme-arctic threshold
}

impl ArcticZone {
    pub const ALL: [ArcticZone; 3] = [
        ArcticZone::SubArctic,
        ArcticZone::HighArctic,
        ArcticZone::ExtremeArctic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArcticZone::SubArctic => "sub-arctic",
            ArcticZone::HighArctic => "high-arctic",
            ArcticZone::ExtremeArctic => "extreme-arctic",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "sub-arctic" | "arctic-circle" => Some(ArcticZone::SubArctic),
            "high-arctic" => Some(ArcticZone::HighArctic),
            "extreme-arctic" | "far-arctic" => Some(ArcticZone::ExtremeArctic),
            _ => None,
        }
    }
}

impl fmt::Display for ArcticZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreezeThawResistance {
    High,
    Medium,
    Low,
}

/// Design standard implied by a dam's purpose classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignStandard {
    pub design_life_years: u32,
    pub safety_factor: f64,
    pub freeze_thaw_resistance: FreezeThawResistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DamPurpose {
    Hydropower,
    WaterSupply,
    FloodControl,
    Unknown,
}

impl DamPurpose {
    /// Parses a registry purpose label. Accepts the Norwegian registry vocabulary as well as
    /// English names; combined hydropower labels resolve to hydropower (the stricter standard).
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() {
            DamPurpose::Unknown
        } else if normalized.contains("kraft")
            || normalized.contains("hydro")
            || normalized.contains("power")
        {
            DamPurpose::Hydropower
        } else if normalized.contains("vannforsyning") || normalized.contains("water") {
            DamPurpose::WaterSupply
        } else if normalized.contains("flom") || normalized.contains("flood") {
            DamPurpose::FloodControl
        } else {
            DamPurpose::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DamPurpose::Hydropower => "hydropower",
            DamPurpose::WaterSupply => "water-supply",
            DamPurpose::FloodControl => "flood-control",
            DamPurpose::Unknown => "unknown",
        }
    }

    /// Minimum design standard for the purpose. `Unknown` gets the mid-range standard.
    pub fn design_standard(&self) -> DesignStandard {
        match self {
            DamPurpose::Hydropower => DesignStandard {
                design_life_years: 100,
                safety_factor: 2.5,
                freeze_thaw_resistance: FreezeThawResistance::High,
            },
            DamPurpose::WaterSupply => DesignStandard {
                design_life_years: 50,
                safety_factor: 2.0,
                freeze_thaw_resistance: FreezeThawResistance::Medium,
            },
            DamPurpose::FloodControl => DesignStandard {
                design_life_years: 75,
                safety_factor: 3.0,
                freeze_thaw_resistance: FreezeThawResistance::High,
            },
            DamPurpose::Unknown => DesignStandard {
                design_life_years: 75,
                safety_factor: 2.5,
                freeze_thaw_resistance: FreezeThawResistance::Medium,
            },
        }
    }
}

impl fmt::Display for DamPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnerType {
    State,
    Municipal,
    Private,
    Utility,
    Unknown,
}

impl OwnerType {
    /// Classifies an owner column. Explicit type names win; otherwise the owner's name is
    /// matched word by word against public-body and power-company vocabulary.
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "" | "unknown" => return OwnerType::Unknown,
            "state" => return OwnerType::State,
            "municipal" => return OwnerType::Municipal,
            "private" => return OwnerType::Private,
            "utility" => return OwnerType::Utility,
            _ => {}
        }

        let words: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let any_word = |pred: fn(&str) -> bool| words.iter().any(|w| pred(w));

        if any_word(|w| w.starts_with("stat") || w == "nve" || w == "government") {
            OwnerType::State
        } else if any_word(|w| w.contains("kommune") || w == "municipal" || w == "city") {
            OwnerType::Municipal
        } else if any_word(|w| {
            w.contains("kraft")
                || w.contains("energi")
                || w.contains("energy")
                || w.contains("power")
                || w == "as"
                || w == "asa"
        }) {
            OwnerType::Utility
        } else {
            OwnerType::Private
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::State => "state",
            OwnerType::Municipal => "municipal",
            OwnerType::Private => "private",
            OwnerType::Utility => "utility",
            OwnerType::Unknown => "unknown",
        }
    }

    /// Maintenance quality factor in [0, 1]; unknown owners are treated like private owners.
    pub fn maintenance_quality(&self) -> f64 {
        match self {
            OwnerType::State => 0.9,
            OwnerType::Municipal => 0.8,
            OwnerType::Private => 0.7,
            OwnerType::Utility => 0.85,
            OwnerType::Unknown => 0.7,
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationStatus {
    Validated,
    Unvalidated,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Validated => "validated",
            ValidationStatus::Unvalidated => "unvalidated",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dam in the Arctic population. Created when the registry is loaded and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamRecord {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub purpose: DamPurpose,
    pub construction_year: Option<i32>,
    pub owner: OwnerType,
    pub validation: ValidationStatus,
    pub zone: ArcticZone,
    pub arctic_distance_km: f64,
}

impl DamRecord {
    pub fn is_validated(&self) -> bool {
        self.validation == ValidationStatus::Validated
    }
}

pub fn arctic_distance_km(latitude: f64, arctic_circle: f64) -> f64 {
    ((latitude - arctic_circle) * KM_PER_DEGREE_LATITUDE).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_labels_from_norwegian_registry_are_recognized() {
        assert_eq!(DamPurpose::from_label("Kraftproduksjon"), DamPurpose::Hydropower);
        assert_eq!(DamPurpose::from_label("Vannforsyning"), DamPurpose::WaterSupply);
        assert_eq!(DamPurpose::from_label("Flomdemping"), DamPurpose::FloodControl);
        assert_eq!(
            DamPurpose::from_label("Kraftproduksjon og Vannforsyning"),
            DamPurpose::Hydropower
        );
    }

    #[test]
    fn unrecognized_or_empty_purpose_is_unknown() {
        assert_eq!(DamPurpose::from_label(""), DamPurpose::Unknown);
        assert_eq!(DamPurpose::from_label("Fiskeoppdrett"), DamPurpose::Unknown);
    }

    #[test]
    fn unknown_purpose_uses_mid_range_standard() {
        let standard = DamPurpose::Unknown.design_standard();
        assert_eq!(standard.safety_factor, 2.5);
        assert_eq!(
            standard.freeze_thaw_resistance,
            FreezeThawResistance::Medium
        );
    }

    #[test]
    fn owner_explicit_types_are_parsed() {
        assert_eq!(OwnerType::from_label("state"), OwnerType::State);
        assert_eq!(OwnerType::from_label(" Utility "), OwnerType::Utility);
        assert_eq!(OwnerType::from_label(""), OwnerType::Unknown);
    }

    #[test]
    fn owner_names_are_classified_by_keyword() {
        assert_eq!(OwnerType::from_label("Statkraft Energi AS"), OwnerType::State);
        assert_eq!(OwnerType::from_label("Narvik kommune"), OwnerType::Municipal);
        assert_eq!(OwnerType::from_label("Ymber AS"), OwnerType::Utility);
        assert_eq!(OwnerType::from_label("Troms Kraft Produksjon"), OwnerType::Utility);
        assert_eq!(OwnerType::from_label("Ola Nordmann"), OwnerType::Private);
    }

    #[test]
    fn company_suffix_is_not_matched_inside_other_words() {
        assert_eq!(OwnerType::from_label("Glassverk Hansen"), OwnerType::Private);
    }

    #[test]
    fn maintenance_quality_matches_owner_table() {
        assert_eq!(OwnerType::State.maintenance_quality(), 0.9);
        assert_eq!(OwnerType::Municipal.maintenance_quality(), 0.8);
        assert_eq!(OwnerType::Private.maintenance_quality(), 0.7);
        assert_eq!(OwnerType::Utility.maintenance_quality(), 0.85);
    }

    #[test]
    fn arctic_distance_is_zero_south_of_the_circle() {
        assert_eq!(arctic_distance_km(66.0, 66.5), 0.0);
        assert!((arctic_distance_km(67.5, 66.5) - 111.32).abs() < 1e-9);
    }

    #[test]
    fn zone_labels_round_trip_through_aliases() {
        assert_eq!(ArcticZone::from_label("far_arctic"), Some(ArcticZone::ExtremeArctic));
        assert_eq!(ArcticZone::from_label("high-arctic"), Some(ArcticZone::HighArctic));
        assert_eq!(ArcticZone::from_label("tropical"), None);
    }
}
