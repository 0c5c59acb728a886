use tracing::{debug, warn};

use super::integrator::Integrator;
use super::orrery::Orrery;
use crate::astro::DAY;

/// The requested and derived rates of simulated time.
///
/// Invariant: `delta_t_increment * actual_calculations_per_tick ==
/// seconds_per_tick` after every recomputation. The requested seconds per tick
/// are rounded to make this hold exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRates {
    pub calculations_per_tick: u32,
    pub seconds_per_tick: f64,
    pub actual_calculations_per_tick: u32,
    pub delta_t_increment: f64,
}

impl Default for TickRates {
    fn default() -> Self {
        TickRates {
            calculations_per_tick: 1,
            seconds_per_tick: 1.0,
            actual_calculations_per_tick: 1,
            delta_t_increment: 1.0,
        }
    }
}

/// Decides how much simulated time passes per rendered frame, and moves the
/// bodies accordingly.
///
/// The ticker holds no integration state between ticks. In physics mode it
/// re-integrates the whole interval ending at the date the caller has already
/// advanced to.
#[derive(Debug, Clone, Default)]
pub struct Ticker {
    rates: TickRates,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rates(&self) -> &TickRates {
        &self.rates
    }

    /// Simulated seconds elapsed per tick.
    pub fn delta_t(&self) -> f64 {
        self.rates.seconds_per_tick
    }

    pub fn set_calculations_per_tick(&mut self, n: u32) {
        if n == 0 {
            warn!("Ignoring zero calculations per tick");
            return;
        }
        self.rates.calculations_per_tick = n;
        self.recompute();
    }

    /// Negative values play the simulation backwards. Zero and non-finite
    /// values are ignored.
    pub fn set_seconds_per_tick(&mut self, s: f64) {
        if s == 0.0 || !s.is_finite() {
            warn!("Ignoring invalid seconds per tick: {}", s);
            return;
        }
        self.rates.seconds_per_tick = s;
        self.recompute();
    }

    fn recompute(&mut self) {
        let rates = &mut self.rates;
        let magnitude = rates.seconds_per_tick.abs();

        // Never take substeps shorter than a second
        rates.actual_calculations_per_tick = if magnitude < rates.calculations_per_tick as f64 {
            (magnitude.floor() as u32).max(1)
        } else {
            rates.calculations_per_tick
        };

        let count = rates.actual_calculations_per_tick as f64;
        rates.delta_t_increment = rates.seconds_per_tick / count;
        rates.seconds_per_tick = rates.delta_t_increment * count;

        debug!(
            "Tick rates: {} s per tick in {} steps of {} s",
            rates.seconds_per_tick, rates.actual_calculations_per_tick, rates.delta_t_increment
        );
    }

    /// Moves every body for one frame, and returns the simulated seconds that
    /// elapsed. `jd` is the date the caller has already advanced to.
    pub fn tick(
        &self,
        use_physics: bool,
        jd: f64,
        orrery: &mut Orrery,
        integrator: &mut dyn Integrator,
    ) -> f64 {
        if use_physics {
            self.move_by_gravity(jd - self.rates.seconds_per_tick / DAY, orrery, integrator);
        } else {
            orrery.set_positions_from_jd(jd);
        }

        orrery.after_tick(self.rates.seconds_per_tick, !use_physics);
        self.rates.seconds_per_tick
    }

    fn move_by_gravity(&self, start_jd: f64, orrery: &mut Orrery, integrator: &mut dyn Integrator) {
        let delta_t = self.rates.delta_t_increment;
        for step in 1..=self.rates.actual_calculations_per_tick {
            let step_jd = start_jd + (step as f64 * delta_t) / DAY;
            integrator.advance(orrery.bodies_mut(), step_jd, delta_t);
        }
    }
}
