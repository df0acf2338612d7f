//! Twister Runner - JSON scenarios for twister simulations
//!
//! This crate provides:
//! - Serializable scenario configuration types
//! - A headless runner binary that steps a saved scenario and logs what happens

pub mod config;
pub mod telemetry;

pub use config::*;
