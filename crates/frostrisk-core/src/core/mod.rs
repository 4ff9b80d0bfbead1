//! # Core Module
//!
//! Stateless building blocks of the engine: everything here is either plain data or a pure
//! function of its inputs.
//!
//! - **Data Models** ([`models`]) - Dams, weather observations, and assessment records
//! - **Physics** ([`physics`]) - Soil and ice thermal profiles, frost/thaw penetration, ice growth
//! - **Station Catalog** ([`catalog`]) - The fixed set of known Arctic weather stations
//! - **Climate Projections** ([`climate`]) - Scenario × zone × year warming lookup
//! - **Input Loading** ([`io`]) - CSV readers for the dam population, registry, and station series
//! - **Utilities** ([`utils`]) - Geodesy and identifier helpers

pub mod catalog;
pub mod climate;
pub mod io;
pub mod models;
pub mod physics;
pub mod utils;
