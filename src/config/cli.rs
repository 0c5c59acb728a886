//! Command-line overrides shared by the binaries.

use clap::Args;

use super::ScenarioConfig;

/// Values that override the ones loaded from a scenario file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ScenarioOverrides {
    /// Integrate gravity instead of following orbital elements.
    #[arg(long)]
    pub physics: Option<bool>,

    /// Simulated seconds per frame. Negative values run time backwards.
    #[arg(long, allow_negative_numbers = true)]
    pub seconds_per_tick: Option<f64>,

    /// Integration substeps per frame.
    #[arg(long)]
    pub calculations_per_tick: Option<u32>,

    /// Log filter (error, warn, info, debug, trace, or a full filter directive).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl ScenarioConfig {
    /// Apply CLI overrides to a loaded scenario.
    pub fn apply_cli_overrides(&mut self, args: &ScenarioOverrides) {
        if let Some(physics) = args.physics {
            self.use_physics = physics;
        }
        if let Some(s) = args.seconds_per_tick {
            self.seconds_per_tick.initial = s;
        }
        if let Some(n) = args.calculations_per_tick {
            self.calculations_per_tick = n;
        }
    }
}
