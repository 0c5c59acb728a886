use std::collections::BTreeMap;

use tracing::debug;

use super::body_lines::BodyOrbitLines;
use super::scale::SceneScale;
use super::tracer::{Tracer, TRACER_VERTICES};
use crate::model::{Body, BodyID, Orrery};

/// Orbit lines of every body, keyed by body.
#[derive(Debug, Clone, Default)]
pub struct OrbitLinesManager {
    force_solid: bool,
    orbits: BTreeMap<BodyID, BodyOrbitLines>,
}

impl OrbitLinesManager {
    pub fn new(force_solid: bool) -> Self {
        OrbitLinesManager {
            force_solid,
            orbits: BTreeMap::new(),
        }
    }

    /// Builds the lines for a body, replacing any it already had.
    pub fn add_body(&mut self, body: &Body, orrery: &Orrery, scale: &SceneScale) {
        let lines = BodyOrbitLines::new(body, orrery, scale, self.force_solid);
        self.orbits.insert(body.id, lines);
    }

    pub fn get(&self, id: BodyID) -> Option<&BodyOrbitLines> {
        self.orbits.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyOrbitLines> {
        self.orbits.values()
    }

    pub fn show_all_orbits(&mut self) {
        self.orbits.values_mut().for_each(BodyOrbitLines::show_orbit);
    }

    pub fn hide_all_orbits(&mut self) {
        self.orbits.values_mut().for_each(BodyOrbitLines::hide_orbit);
    }

    pub fn hide_all_ecliptics(&mut self) {
        self.orbits
            .values_mut()
            .for_each(BodyOrbitLines::hide_ecliptic);
    }

    /// Picks which lines are visible for a camera sitting on `look_from` and
    /// pointed at `look_at`.
    ///
    /// From a body, only that body's ecliptic is shown, plus the orbit of the
    /// target if it goes around the viewpoint. From nowhere in particular,
    /// every orbit is shown.
    pub fn on_camera_change(
        &mut self,
        look_from: Option<BodyID>,
        look_at: Option<BodyID>,
        orrery: &Orrery,
        scale: &SceneScale,
    ) {
        match look_from.filter(|id| self.orbits.contains_key(id)) {
            Some(from) => {
                self.hide_all_orbits();
                self.hide_all_ecliptics();
                if let Some(lines) = self.orbits.get_mut(&from) {
                    lines.show_ecliptic();
                }

                if let Some(at) = look_at.filter(|&at| orrery.is_orbiting(at, from)) {
                    if let Some(lines) = self.orbits.get_mut(&at) {
                        lines.show_orbit();
                    }
                }
            }
            None => {
                self.reset_all(orrery, scale);
                self.show_all_orbits();
                self.hide_all_ecliptics();
            }
        }
    }

    /// Resamples every orbit line from its body's current state.
    pub fn reset_all(&mut self, orrery: &Orrery, scale: &SceneScale) {
        debug!("Resetting {} orbit lines", self.orbits.len());
        for (id, lines) in self.orbits.iter_mut() {
            lines.recalculate_orbit_line(orrery.get_body(*id), scale, true);
        }
    }

    pub fn draw(&mut self, orrery: &Orrery, scale: &SceneScale, delta_t: f64) {
        for lines in self.orbits.values_mut() {
            lines.draw(orrery, scale, delta_t);
        }
    }
}

/// Motion tracers, keyed by body.
///
/// Every non-central body gets a tracer, but only the active ones are shown.
/// Bodies that force a trace are shown from the first frame on, in the frame
/// of their trace reference.
#[derive(Debug, Clone, Default)]
pub struct TracerManager {
    tracers: BTreeMap<BodyID, Tracer>,
    forced: Vec<BodyID>,
    active: Vec<BodyID>,
    deferred: Vec<BodyID>,
}

impl TracerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_body(&mut self, body: &Body) {
        if body.is_central() && !body.info.force_trace {
            return;
        }

        let color = body.info.trace_color.unwrap_or(body.info.color);
        self.tracers
            .insert(body.id, Tracer::new(color, TRACER_VERTICES));

        if body.info.force_trace {
            self.forced.push(body.id);
            self.deferred.push(body.id);
        }
    }

    pub fn get(&self, id: BodyID) -> Option<&Tracer> {
        self.tracers.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BodyID, &Tracer)> {
        self.tracers.iter()
    }

    pub fn active(&self) -> &[BodyID] {
        &self.active
    }

    /// Hides every tracer not forced on.
    fn hide_tracers(&mut self) {
        for (id, tracer) in self.tracers.iter_mut() {
            if !self.forced.contains(id) {
                tracer.set_visible(false);
            }
        }
    }

    fn add_tracer(&mut self, tracing: BodyID, trace_from: Option<BodyID>) {
        if let Some(tracer) = self.tracers.get_mut(&tracing) {
            tracer.set_trace_from(trace_from);
            tracer.reset();
            tracer.set_visible(true);
            self.active.push(tracing);
        }
    }

    /// Shows the trace of `look_at` as seen from `look_from`, hiding every
    /// other tracer that isn't forced on.
    pub fn set_trace_from(&mut self, look_from: Option<BodyID>, look_at: Option<BodyID>) {
        debug!("Tracing {:?} from {:?}", look_at, look_from);
        self.hide_tracers();
        self.active.clear();
        if let Some(look_at) = look_at {
            self.add_tracer(look_at, look_from);
        }
    }

    /// Starts every active trace over, e.g. after a date change.
    pub fn reset_trace(&mut self) {
        self.hide_tracers();
        for id in self.active.iter() {
            if let Some(tracer) = self.tracers.get_mut(id) {
                tracer.reset();
                tracer.set_visible(true);
            }
        }
    }

    /// Records every body's position, and activates forced tracers on the
    /// first call.
    pub fn draw(&mut self, orrery: &Orrery, scale: &SceneScale) {
        for id in std::mem::take(&mut self.deferred) {
            let body = orrery.get_body(id);
            let trace_from = body.info.trace_relative_to.or(body.parent);
            self.add_tracer(id, trace_from);
        }

        for (id, tracer) in self.tracers.iter_mut() {
            let position = scale.point(&orrery.get_body(*id).position);
            let reference = tracer
                .trace_from()
                .map(|from| scale.point(&orrery.get_body(from).position));
            tracer.draw(&position, reference.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::{OrbitalElements, J2000};
    use crate::model::{BodyInfo, BodyMotion};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    struct System {
        orrery: Orrery,
        sun: BodyID,
        earth: BodyID,
        moon: BodyID,
        comet: BodyID,
    }

    fn system() -> System {
        let mut orrery = Orrery::new();
        let white = Point3::new(1.0, 1.0, 1.0);
        let sun = orrery.add_body(
            BodyInfo::new("sun", 7e8, white),
            2e30,
            None,
            BodyMotion::Free,
            Point3::origin(),
            Vector3::zeros(),
        );
        let orbit = OrbitalElements::from_kepler(1.5e11, 0.0, 0.0, 0.0, 0.0, 0.0, J2000);
        let earth = orrery.add_body(
            BodyInfo::new("earth", 6e6, white),
            6e24,
            None,
            BodyMotion::fixed(orbit, 2e30, 6e24),
            Point3::origin(),
            Vector3::zeros(),
        );
        let orbit = OrbitalElements::from_kepler(3.8e8, 0.0, 0.0, 0.0, 0.0, 0.0, J2000);
        let moon = orrery.add_body(
            BodyInfo::new("moon", 1.7e6, white),
            7e22,
            Some(earth),
            BodyMotion::fixed(orbit, 6e24, 7e22),
            Point3::origin(),
            Vector3::zeros(),
        );
        let mut info = BodyInfo::new("comet", 1e4, white);
        info.force_trace = true;
        info.trace_color = Some(Point3::new(1.0, 0.0, 0.0));
        info.trace_relative_to = Some(earth);
        // Periapsis would land exactly on the earth at J2000, so start it further along
        let orbit = OrbitalElements::from_kepler(3e11, 0.5, 0.2, 0.0, 0.0, 1.0, J2000);
        let comet = orrery.add_body(
            info,
            1e12,
            None,
            BodyMotion::fixed(orbit, 2e30, 1e12),
            Point3::origin(),
            Vector3::zeros(),
        );
        orrery.choose_central_body();
        orrery.set_positions_from_jd(J2000);
        System {
            orrery,
            sun,
            earth,
            moon,
            comet,
        }
    }

    fn orbit_manager(s: &System) -> (OrbitLinesManager, SceneScale) {
        let scale = SceneScale::from_largest_dimension(s.orrery.largest_semimajor_axis());
        let mut manager = OrbitLinesManager::new(false);
        for body in s.orrery.bodies() {
            manager.add_body(body, &s.orrery, &scale);
        }
        (manager, scale)
    }

    #[test]
    fn test_camera_from_nowhere_shows_every_orbit() {
        let s = system();
        let (mut manager, scale) = orbit_manager(&s);
        manager.on_camera_change(None, None, &s.orrery, &scale);

        assert!(manager.get(s.earth).unwrap().is_orbit_shown());
        assert!(manager.get(s.moon).unwrap().is_orbit_shown());
        assert!(manager.iter().all(|lines| !lines.is_ecliptic_shown()));
        // No orbit to show for the sun
        assert!(!manager.get(s.sun).unwrap().is_orbit_shown());
    }

    #[test]
    fn test_camera_from_body() {
        let s = system();
        let (mut manager, scale) = orbit_manager(&s);
        manager.on_camera_change(None, None, &s.orrery, &scale);

        manager.on_camera_change(Some(s.earth), Some(s.moon), &s.orrery, &scale);
        assert!(manager.get(s.earth).unwrap().is_ecliptic_shown());
        assert!(!manager.get(s.earth).unwrap().is_orbit_shown());
        assert!(manager.get(s.moon).unwrap().is_orbit_shown());
        assert!(!manager.get(s.comet).unwrap().is_orbit_shown());

        // The sun doesn't orbit the earth, so nothing but the ecliptic
        manager.on_camera_change(Some(s.earth), Some(s.sun), &s.orrery, &scale);
        assert_eq!(manager.iter().filter(|l| l.is_orbit_shown()).count(), 0);
        // Only bodies orbiting the central body directly have an ecliptic
        assert!(manager.get(s.moon).unwrap().ecliptic().is_none());
    }

    #[test]
    fn test_tracers_skip_central_body() {
        let s = system();
        let mut tracers = TracerManager::new();
        for body in s.orrery.bodies() {
            tracers.add_body(body);
        }
        assert!(tracers.get(s.sun).is_none());
        assert_eq!(tracers.iter().count(), 3);
        assert_relative_eq!(tracers.get(s.comet).unwrap().color(), Point3::new(0.3, 0.0, 0.0));
    }

    #[test]
    fn test_forced_tracer_starts_on_first_draw() {
        let s = system();
        let scale = SceneScale::from_largest_dimension(s.orrery.largest_semimajor_axis());
        let mut tracers = TracerManager::new();
        for body in s.orrery.bodies() {
            tracers.add_body(body);
        }
        assert!(tracers.active().is_empty());

        tracers.draw(&s.orrery, &scale);
        let comet = tracers.get(s.comet).unwrap();
        assert!(comet.is_visible());
        assert_eq!(comet.trace_from(), Some(s.earth));
        assert_eq!(comet.current_vertex(), 1);
        assert_eq!(tracers.active(), &[s.comet]);

        // Hidden tracers keep recording
        assert!(!tracers.get(s.earth).unwrap().is_visible());
        assert_eq!(tracers.get(s.earth).unwrap().current_vertex(), 1);
    }

    #[test]
    fn test_trace_from_switches_tracers() {
        let s = system();
        let scale = SceneScale::from_largest_dimension(s.orrery.largest_semimajor_axis());
        let mut tracers = TracerManager::new();
        for body in s.orrery.bodies() {
            tracers.add_body(body);
        }
        tracers.draw(&s.orrery, &scale);

        tracers.set_trace_from(Some(s.earth), Some(s.moon));
        let moon = tracers.get(s.moon).unwrap();
        assert!(moon.is_visible());
        assert_eq!(moon.trace_from(), Some(s.earth));
        assert_eq!(moon.current_vertex(), 0);
        assert_eq!(tracers.active(), &[s.moon]);

        // Forced tracers stay up, everything else goes
        assert!(tracers.get(s.comet).unwrap().is_visible());
        assert!(!tracers.get(s.earth).unwrap().is_visible());

        tracers.draw(&s.orrery, &scale);
        tracers.reset_trace();
        assert_eq!(tracers.get(s.moon).unwrap().current_vertex(), 0);
        assert!(tracers.get(s.moon).unwrap().is_visible());
    }
}
