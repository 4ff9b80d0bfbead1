//! # Workflows Module
//!
//! Top-level entry points. Each workflow takes already-loaded
//! [`AssessmentInputs`](crate::engine::inputs::AssessmentInputs), runs the engine and returns
//! plain data for the caller to write out.
//!
//! - **Assessment** ([`assess`]) - Scores every Arctic dam and summarises the batch
//! - **Population** ([`locate`]) - Statistics over the Arctic dam population, no scoring

pub mod assess;
pub mod locate;
