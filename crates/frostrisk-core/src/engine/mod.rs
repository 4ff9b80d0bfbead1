//! # Engine Module
//!
//! The scoring engine: everything between loaded inputs and a classified
//! [`DamRiskAssessment`](crate::core::models::assessment::DamRiskAssessment).
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Zone thresholds, exposure durations, aggregation weights
//!   and physical constants, assembled through a validating builder
//! - **Inputs** ([`inputs`]) - The immutable, loaded-once input bundle
//! - **Registry** ([`registry`]) - Arctic filtering, registry cross-validation and zoning
//! - **Weather** ([`weather`]) - Station summaries and the latitude fallback model
//! - **Scoring** ([`scoring`]) - The four component scorers
//! - **Aggregation** ([`aggregate`]) - Weighted combination, dam modifiers, classification
//! - **Error Handling** ([`error`]) - Fatal load errors and per-dam skip reasons
//!
//! All state built here is read-only once the batch starts, so dams can be assessed in any
//! order, on any number of threads, with identical results.

pub mod aggregate;
pub(crate) mod cache;
pub mod config;
pub mod error;
pub mod inputs;
pub mod mitigation;
pub mod progress;
pub mod registry;
pub mod scoring;
pub mod weather;
