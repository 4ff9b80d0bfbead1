//! # Physics Module
//!
//! Closed-form heat-transfer relations used by the risk scorers. Every function here is pure;
//! physical constants arrive through the immutable [`thermal::SoilThermalProfile`] and
//! [`thermal::IceThermalProfile`] objects rather than globals.

pub mod thermal;
