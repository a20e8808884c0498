//! Configuration module
//!
//! Profile selection, overrides, seeding and break cadence.

pub mod settings;

pub use settings::{BreakSettings, ConfigError, Settings};
