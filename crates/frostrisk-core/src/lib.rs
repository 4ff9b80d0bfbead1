//! # frostrisk Core Library
//!
//! A climate-risk scoring engine for hydropower dams above the Arctic Circle. It fuses sparse
//! weather-station records, a climatological fallback estimator, and four physically-motivated
//! risk sub-models into one classified assessment per dam.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`DamRecord`, `WeatherObservation`,
//!   `DamRiskAssessment`), pure physics (Stefan frost penetration, freezing-degree-day ice growth),
//!   the built-in station catalog, the climate projection table, and CSV loaders.
//!
//! - **[`engine`]: The Logic Core.** Configuration, the error taxonomy, weather resolution with
//!   graceful fallback, the four component scorers, and the aggregator that applies dam-specific
//!   modifiers and classifies the result.
//!
//! - **[`workflows`]: The Public API.** Batch entry points that take an immutable load of inputs,
//!   assess every Arctic dam (in parallel with the `parallel` feature), and emit the per-dam
//!   records and the batch summary consumed by reporting collaborators.

pub mod core;
pub mod engine;
pub mod workflows;
