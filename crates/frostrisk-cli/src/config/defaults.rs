//! Values used when neither the command line nor the config file sets a parameter.

pub const SCENARIO: &str = "SSP2-4.5";
pub const TARGET_YEAR: i32 = 2050;
pub const ASSESSMENT_YEAR: i32 = 2024;
