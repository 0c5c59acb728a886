use tracing::info;

use super::barycenter::set_barycenter;
use super::integrator::Integrator;
use super::orrery::Orrery;
use super::ticker::Ticker;
use crate::astro::DAY;

pub const DEFAULT_CALCULATIONS_PER_TICK: u32 = 10;

/// The knobs a scenario hands to the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationSettings {
    pub use_physics: bool,
    pub use_barycenter: bool,
    pub seconds_per_tick: f64,
    pub calculations_per_tick: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            use_physics: false,
            use_barycenter: true,
            seconds_per_tick: 3600.0,
            calculations_per_tick: DEFAULT_CALCULATIONS_PER_TICK,
        }
    }
}

/// What happened during one call to [Simulation::frame].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// The simulation was killed; the driving loop should stop.
    Killed,
    /// Simulated time moved forward by this many seconds, and the scene
    /// should be drawn.
    Advanced { elapsed: f64 },
    /// Time is paused, but something asked for the scene to be redrawn.
    Redraw,
    /// Nothing to do this frame.
    Idle,
}

impl FrameOutcome {
    pub fn needs_draw(&self) -> bool {
        matches!(self, FrameOutcome::Advanced { .. } | FrameOutcome::Redraw)
    }
}

/// All the state of a running scenario, driven one frame at a time.
///
/// Bodies are only added or removed by building a new simulation.
pub struct Simulation {
    orrery: Orrery,
    ticker: Ticker,
    integrator: Box<dyn Integrator>,
    settings: SimulationSettings,
    // The date is kept as a fixed origin plus simulated seconds, so that many
    // small steps don't lose precision against a large Julian date
    date_origin_jd: f64,
    elapsed_seconds: f64,
    playing: bool,
    killed: bool,
    draw_requested: bool,
}

impl Simulation {
    /// # Panics
    ///
    /// Panics if `orrery` has no bodies. Scenario files are checked for this
    /// when they are built.
    pub fn new(
        mut orrery: Orrery,
        settings: SimulationSettings,
        start_jd: f64,
        integrator: Box<dyn Integrator>,
    ) -> Self {
        if orrery.choose_central_body().is_none() {
            panic!("Cannot simulate a scenario with no bodies");
        }
        if !settings.use_physics {
            orrery.flatten_masses();
        }

        orrery.set_positions_from_jd(start_jd);
        set_barycenter(&mut orrery, settings.use_physics, settings.use_barycenter);

        let mut ticker = Ticker::new();
        ticker.set_seconds_per_tick(settings.seconds_per_tick);
        ticker.set_calculations_per_tick(settings.calculations_per_tick);

        info!(
            "Simulation ready with {} bodies around {}, physics {}",
            orrery.len(),
            orrery.central().name(),
            if settings.use_physics { "on" } else { "off" }
        );

        Simulation {
            orrery,
            ticker,
            integrator,
            settings,
            date_origin_jd: start_jd,
            elapsed_seconds: 0.0,
            playing: false,
            killed: false,
            draw_requested: true,
        }
    }

    pub fn orrery(&self) -> &Orrery {
        &self.orrery
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn current_jd(&self) -> f64 {
        self.date_origin_jd + self.elapsed_seconds / DAY
    }

    pub fn seconds_per_tick(&self) -> f64 {
        self.ticker.delta_t()
    }

    pub fn set_seconds_per_tick(&mut self, s: f64) {
        self.ticker.set_seconds_per_tick(s);
    }

    pub fn set_calculations_per_tick(&mut self, n: u32) {
        self.ticker.set_calculations_per_tick(n);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    pub fn start(&mut self) {
        if !self.playing {
            info!("Simulation started at JD {}", self.current_jd());
        }
        self.playing = true;
    }

    pub fn stop(&mut self) {
        if self.playing {
            info!("Simulation stopped at JD {}", self.current_jd());
        }
        self.playing = false;
        self.draw_requested = true;
    }

    pub fn toggle_playing(&mut self) {
        if self.playing {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Stops the driving loop for good. The frame in flight, if any, still
    /// completes.
    pub fn kill(&mut self) {
        info!("Simulation killed");
        self.killed = true;
        self.playing = false;
    }

    pub fn request_draw(&mut self) {
        self.draw_requested = true;
    }

    /// Jumps to a new date, stopping playback and putting every body back on
    /// its analytic orbit.
    pub fn set_date(&mut self, jd: f64) {
        self.playing = false;
        self.date_origin_jd = jd;
        self.elapsed_seconds = 0.0;
        self.draw_requested = true;
        self.reposition_bodies(true);
    }

    /// Goes back to the state analytically implied by the current date.
    pub fn reset(&mut self) {
        info!("Simulation reset at JD {}", self.current_jd());
        self.reposition_bodies(true);
        self.draw_requested = true;
    }

    /// Re-derives every body's state from the current date. Physics scenarios
    /// are only repositioned when forced, since their state is not implied by
    /// the date alone.
    pub fn reposition_bodies(&mut self, force: bool) -> bool {
        if !force && self.settings.use_physics {
            return false;
        }

        self.orrery.reset_bodies();
        let jd = self.current_jd();
        self.orrery.set_positions_from_jd(jd);
        self.ticker.tick(
            false,
            jd,
            &mut self.orrery,
            self.integrator.as_mut(),
        );
        set_barycenter(
            &mut self.orrery,
            self.settings.use_physics,
            self.settings.use_barycenter,
        );
        true
    }

    /// Runs one rendered frame's worth of simulation.
    pub fn frame(&mut self) -> FrameOutcome {
        if self.killed {
            return FrameOutcome::Killed;
        }

        let outcome = if self.playing {
            self.elapsed_seconds += self.ticker.delta_t();
            let elapsed = self.ticker.tick(
                self.settings.use_physics,
                self.current_jd(),
                &mut self.orrery,
                self.integrator.as_mut(),
            );
            FrameOutcome::Advanced { elapsed }
        } else if self.draw_requested {
            FrameOutcome::Redraw
        } else {
            FrameOutcome::Idle
        };

        self.draw_requested = false;
        outcome
    }
}
