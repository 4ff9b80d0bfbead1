use serde::Deserialize;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Amplitude and decay of the air-to-ground thermal lag correction.
const GROUND_LAG_AMPLITUDE_C: f64 = 2.0;
const GROUND_LAG_DECAY_PER_C: f64 = 0.1;

/// Soil thermal constants for frost/thaw penetration. Loaded once, read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SoilThermalProfile {
    /// W/(m·K)
    pub conductivity_frozen: f64,
    /// W/(m·K)
    pub conductivity_unfrozen: f64,
    /// kg/m³
    pub density: f64,
    /// J/kg
    pub latent_heat_fusion: f64,
    /// Volumetric water content, dimensionless.
    pub water_content: f64,
}

impl Default for SoilThermalProfile {
    fn default() -> Self {
        Self {
            conductivity_frozen: 2.5,
            conductivity_unfrozen: 1.8,
            density: 1800.0,
            latent_heat_fusion: 334_000.0,
            water_content: 0.25,
        }
    }
}

impl SoilThermalProfile {
    pub fn is_physical(&self) -> bool {
        [
            self.conductivity_frozen,
            self.conductivity_unfrozen,
            self.density,
            self.latent_heat_fusion,
            self.water_content,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
    }

    fn latent_capacity(&self) -> f64 {
        self.density * self.latent_heat_fusion * self.water_content
    }
}

/// Freshwater ice constants for freezing-degree-day ice growth.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct IceThermalProfile {
    /// W/(m·K)
    pub conductivity: f64,
    /// kg/m³
    pub density: f64,
    /// J/kg
    pub latent_heat_fusion: f64,
}

impl Default for IceThermalProfile {
    fn default() -> Self {
        Self {
            conductivity: 2.22,
            density: 917.0,
            latent_heat_fusion: 334_000.0,
        }
    }
}

impl IceThermalProfile {
    pub fn is_physical(&self) -> bool {
        [self.conductivity, self.density, self.latent_heat_fusion]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }
}

/// Accumulated degree-seconds below freezing for a sustained air temperature.
#[inline]
pub fn freezing_index(air_temp_c: f64, days: f64) -> f64 {
    if air_temp_c >= 0.0 || days <= 0.0 {
        return 0.0;
    }
    air_temp_c.abs() * days * SECONDS_PER_DAY
}

/// Accumulated degree-seconds above freezing for a sustained air temperature.
#[inline]
pub fn thawing_index(air_temp_c: f64, days: f64) -> f64 {
    if air_temp_c <= 0.0 || days <= 0.0 {
        return 0.0;
    }
    air_temp_c * days * SECONDS_PER_DAY
}

/// Freezing degree-days (°C·day) for a sustained air temperature.
#[inline]
pub fn freezing_degree_days(air_temp_c: f64, days: f64) -> f64 {
    freezing_index(air_temp_c, days) / SECONDS_PER_DAY
}

/// Stefan frost penetration depth in metres: `sqrt(2·k_frozen·F / (ρ·L·θ))`.
#[inline]
pub fn frost_penetration_depth(soil: &SoilThermalProfile, freezing_index: f64) -> f64 {
    if freezing_index <= 0.0 {
        return 0.0;
    }
    (2.0 * soil.conductivity_frozen * freezing_index / soil.latent_capacity()).sqrt()
}

/// Stefan thaw (active layer) depth in metres, using the unfrozen conductivity.
#[inline]
pub fn thaw_penetration_depth(soil: &SoilThermalProfile, thawing_index: f64) -> f64 {
    if thawing_index <= 0.0 {
        return 0.0;
    }
    (2.0 * soil.conductivity_unfrozen * thawing_index / soil.latent_capacity()).sqrt()
}

/// Ice thickness in metres from freezing degree-days: `sqrt(2·k_ice·FDD / (ρ_ice·L_ice))`.
#[inline]
pub fn ice_thickness(ice: &IceThermalProfile, freezing_degree_days: f64) -> f64 {
    if freezing_degree_days <= 0.0 {
        return 0.0;
    }
    let degree_seconds = freezing_degree_days * SECONDS_PER_DAY;
    (2.0 * ice.conductivity * degree_seconds / (ice.density * ice.latent_heat_fusion)).sqrt()
}

/// Ground temperature estimated from air temperature with a thermal-lag offset.
#[inline]
pub fn ground_temperature(air_temp_c: f64) -> f64 {
    air_temp_c + GROUND_LAG_AMPLITUDE_C * (-GROUND_LAG_DECAY_PER_C * air_temp_c.abs()).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn freezing_index_for_sustained_cold_matches_hand_calculation() {
        assert!(f64_approx_equal(freezing_index(-20.0, 120.0), 207_360_000.0));
    }

    #[test]
    fn freezing_index_is_zero_at_or_above_freezing() {
        assert_eq!(freezing_index(0.0, 120.0), 0.0);
        assert_eq!(freezing_index(4.0, 120.0), 0.0);
        assert_eq!(freezing_index(-4.0, 0.0), 0.0);
    }

    #[test]
    fn stefan_depth_for_reference_soil_is_about_two_point_six_metres() {
        let soil = SoilThermalProfile::default();
        let depth = frost_penetration_depth(&soil, freezing_index(-20.0, 120.0));
        assert!((depth - 2.63).abs() < 0.01, "depth was {depth}");
    }

    #[test]
    fn stefan_depth_grows_with_square_root_of_freezing_index() {
        let soil = SoilThermalProfile::default();
        let d1 = frost_penetration_depth(&soil, 1.0e8);
        let d4 = frost_penetration_depth(&soil, 4.0e8);
        assert!(f64_approx_equal(d4, 2.0 * d1));
    }

    #[test]
    fn thaw_depth_uses_unfrozen_conductivity() {
        let soil = SoilThermalProfile::default();
        let index = thawing_index(10.0, 90.0);
        let thaw = thaw_penetration_depth(&soil, index);
        let frost_equivalent = frost_penetration_depth(&soil, index);
        let expected_ratio = (soil.conductivity_unfrozen / soil.conductivity_frozen).sqrt();
        assert!(f64_approx_equal(thaw / frost_equivalent, expected_ratio));
    }

    #[test]
    fn ice_thickness_is_zero_without_frost() {
        assert_eq!(ice_thickness(&IceThermalProfile::default(), 0.0), 0.0);
    }

    #[test]
    fn ice_thickness_exceeds_half_metre_for_a_cold_winter() {
        let ice = IceThermalProfile::default();
        let fdd = freezing_degree_days(-15.0, 120.0);
        assert!(f64_approx_equal(fdd, 1800.0));
        assert!(ice_thickness(&ice, fdd) > 0.5);
    }

    #[test]
    fn ice_thickness_stays_thin_for_a_mild_winter() {
        let ice = IceThermalProfile::default();
        let fdd = freezing_degree_days(-1.0, 120.0);
        assert!(ice_thickness(&ice, fdd) < 0.5);
    }

    #[test]
    fn ground_temperature_is_warmer_than_air() {
        assert!(f64_approx_equal(ground_temperature(0.0), 2.0));
        assert!(ground_temperature(-10.0) > -10.0);
        assert!(ground_temperature(-10.0) < -9.0);
    }

    #[test]
    fn default_profiles_are_physical() {
        assert!(SoilThermalProfile::default().is_physical());
        assert!(IceThermalProfile::default().is_physical());
        let broken = SoilThermalProfile {
            water_content: 0.0,
            ..SoilThermalProfile::default()
        };
        assert!(!broken.is_physical());
    }
}
