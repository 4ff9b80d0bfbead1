//! The four component scorers.
//!
//! Each scorer is a pure function of one dam and its resolved weather. Missing inputs never
//! fail a scorer; they lower the confidence of the score it returns.

pub mod climate_change;
pub mod freeze_thaw;
pub mod ice_dam;
pub mod permafrost;

use crate::core::models::assessment::{ComponentKind, RiskComponentScore};
use crate::core::models::dam::DamRecord;
use crate::core::models::weather::WeatherObservation;

pub use climate_change::ClimateChangeScorer;
pub use freeze_thaw::FreezeThawDegradationScorer;
pub use ice_dam::IceDamFormationScorer;
pub use permafrost::PermafrostStabilityScorer;

/// Everything a scorer may look at for one dam.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub dam: &'a DamRecord,
    pub weather: &'a WeatherObservation,
}

pub trait ComponentScorer: Send + Sync {
    fn kind(&self) -> ComponentKind;

    fn score(&self, input: &ScoringInput<'_>) -> RiskComponentScore;
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::models::dam::{
        ArcticZone, DamPurpose, DamRecord, OwnerType, ValidationStatus,
    };
    use crate::core::models::weather::WeatherObservation;
    use crate::engine::weather::fallback_observation;

    pub(crate) fn dam_at(latitude: f64, zone: ArcticZone) -> DamRecord {
        DamRecord {
            id: "test".to_string(),
            name: "Test dam".to_string(),
            latitude,
            longitude: 20.0,
            purpose: DamPurpose::Hydropower,
            construction_year: Some(1970),
            owner: OwnerType::State,
            validation: ValidationStatus::Validated,
            zone,
            arctic_distance_km: 0.0,
        }
    }

    pub(crate) fn weather_with(
        latitude: f64,
        air_c: f64,
        winter_c: f64,
        summer_c: f64,
    ) -> WeatherObservation {
        WeatherObservation {
            air_temperature_c: air_c,
            winter_temperature_c: winter_c,
            summer_temperature_c: summer_c,
            ..fallback_observation(latitude, 66.5)
        }
    }
}
