use nalgebra::Point3;
use tracing::{debug, info};

use super::manager::{OrbitLinesManager, TracerManager};
use super::scale::SceneScale;
use crate::model::{BodyID, FrameOutcome, Simulation};

/// Where the camera is. `None` looks at the whole system from nowhere in
/// particular, `Some(body)` sits on the body's primary and looks at it.
pub type Focus = Option<BodyID>;

/// A running simulation together with the trails that follow it.
///
/// This is everything needed to advance and draw one frame, minus the
/// window. The focus cycles through the overview and then every non-central
/// body.
pub struct TrailScene {
    simulation: Simulation,
    start_jd: f64,
    scale: SceneScale,
    orbit_lines: OrbitLinesManager,
    tracers: TracerManager,
    focus_points: Vec<Focus>,
    focus_idx: usize,
    orbits_hidden: bool,
}

impl TrailScene {
    pub fn new(simulation: Simulation, solid_lines: bool) -> Self {
        let orrery = simulation.orrery();
        let scale = SceneScale::from_largest_dimension(orrery.largest_semimajor_axis());

        let mut orbit_lines = OrbitLinesManager::new(solid_lines);
        let mut tracers = TracerManager::new();
        let mut focus_points = vec![None];
        for body in orrery.bodies() {
            orbit_lines.add_body(body, orrery, &scale);
            tracers.add_body(body);
            if !body.is_central() {
                focus_points.push(Some(body.id));
            }
        }
        info!(
            "Scene set up with {} focus points, scale {:e} units/m",
            focus_points.len(),
            scale.factor()
        );

        let mut scene = TrailScene {
            start_jd: simulation.current_jd(),
            simulation,
            scale,
            orbit_lines,
            tracers,
            focus_points,
            focus_idx: 0,
            orbits_hidden: false,
        };
        scene.apply_focus();
        scene
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn scale(&self) -> &SceneScale {
        &self.scale
    }

    pub fn orbit_lines(&self) -> &OrbitLinesManager {
        &self.orbit_lines
    }

    pub fn tracers(&self) -> &TracerManager {
        &self.tracers
    }

    pub fn start_jd(&self) -> f64 {
        self.start_jd
    }

    pub fn focus(&self) -> Focus {
        self.focus_points[self.focus_idx]
    }

    /// The body the camera sits on, if any.
    pub fn look_from(&self) -> Option<BodyID> {
        let orrery = self.simulation.orrery();
        self.focus()
            .map(|id| orrery.get_body(id).parent.unwrap_or_else(|| orrery.central_id()))
    }

    pub fn look_at(&self) -> Option<BodyID> {
        self.focus()
    }

    /// Position of the focus in scene units. Everything is drawn relative to
    /// it.
    pub fn focus_position(&self) -> Point3<f64> {
        match self.focus() {
            Some(id) => self.scale.point(&self.simulation.orrery().get_body(id).position),
            None => Point3::origin(),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus_idx = (self.focus_idx + 1) % self.focus_points.len();
        self.apply_focus();
    }

    pub fn focus_prev(&mut self) {
        let n = self.focus_points.len();
        self.focus_idx = (self.focus_idx + n - 1) % n;
        self.apply_focus();
    }

    /// Focuses on `body`, or on the overview if it isn't a focus point.
    pub fn set_focus(&mut self, body: Focus) {
        self.focus_idx = self
            .focus_points
            .iter()
            .position(|&f| f == body)
            .unwrap_or(0);
        self.apply_focus();
    }

    fn apply_focus(&mut self) {
        let (look_from, look_at) = (self.look_from(), self.look_at());
        debug!("Looking from {:?} at {:?}", look_from, look_at);
        self.orbit_lines.on_camera_change(
            look_from,
            look_at,
            self.simulation.orrery(),
            &self.scale,
        );
        if self.orbits_hidden {
            self.orbit_lines.hide_all_orbits();
        }
        self.tracers.set_trace_from(look_from, look_at);
        self.simulation.request_draw();
    }

    pub fn orbits_hidden(&self) -> bool {
        self.orbits_hidden
    }

    pub fn toggle_orbits(&mut self) {
        self.orbits_hidden = !self.orbits_hidden;
        self.apply_focus();
    }

    /// Goes back to the date the scene started at, and starts every trail
    /// over.
    pub fn back_to_start(&mut self) {
        self.simulation.set_date(self.start_jd);
        let orrery = self.simulation.orrery();
        self.orbit_lines.reset_all(orrery, &self.scale);
        self.tracers.reset_trace();
    }

    /// Advances the simulation by one frame, and moves the trails along if
    /// anything needs drawing.
    pub fn step(&mut self) -> FrameOutcome {
        let outcome = self.simulation.frame();
        if outcome.needs_draw() {
            let orrery = self.simulation.orrery();
            let delta_t = self.simulation.seconds_per_tick();
            self.orbit_lines.draw(orrery, &self.scale, delta_t);
            self.tracers.draw(orrery, &self.scale);
        }
        outcome
    }
}
