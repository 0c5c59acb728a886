//! Scenario configuration for Cosmo Trail.
//!
//! Scenarios are RON files describing the bodies and the simulation rates.
//! Missing fields fall back to defaults, and command-line overrides are
//! applied on top.

mod cli;
mod error;
mod scenario;

pub use cli::ScenarioOverrides;
pub use error::ConfigError;
pub use scenario::{BodyConfig, ElementsConfig, RatesConfig, ScenarioConfig, SecondsPerTick};
