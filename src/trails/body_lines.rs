use nalgebra::Point3;
use tracing::debug;

use super::orbit_line::{LineStyle, OrbitLine};
use super::scale::SceneScale;
use crate::astro::DAY;
use crate::model::{Body, BodyID, Orrery};

/// Positions a re-evaluable body passed through during the last tick, sampled
/// at `n` equal steps starting `delta_t` seconds before its current date.
/// Bodies without re-evaluable elements produce nothing.
pub fn vertices_in_delta_t(body: &Body, delta_t: f64, n: usize) -> Vec<Point3<f64>> {
    let dt = delta_t / DAY;
    let start_jd = body.current_jd() - dt;
    let inc = dt / n as f64;
    (0..n)
        .filter_map(|i| body.calculate_position(start_jd + i as f64 * inc))
        .collect()
}

/// The orbit and ecliptic lines of one body.
///
/// The orbit line is drawn around the body's primary. The ecliptic line is the
/// orbit turned inside out, drawn around the body itself, so that looking from
/// the body shows the path the central body appears to take.
#[derive(Debug, Clone)]
pub struct BodyOrbitLines {
    body: BodyID,
    force_solid: bool,
    orbit: Option<OrbitLine>,
    ecliptic: Option<OrbitLine>,
    orbit_shown: bool,
    ecliptic_shown: bool,
    /// Date the current solid orbit was sampled at, for bodies that resample
    /// it every revolution
    revolution_start_jd: Option<f64>,
}

impl BodyOrbitLines {
    pub fn new(body: &Body, orrery: &Orrery, scale: &SceneScale, force_solid: bool) -> Self {
        let mut lines = BodyOrbitLines {
            body: body.id,
            force_solid,
            orbit: None,
            ecliptic: None,
            orbit_shown: false,
            ecliptic_shown: false,
            revolution_start_jd: None,
        };
        lines.set_orbit_lines(body, orrery, scale);
        lines
    }

    fn scaled_orbit_vertices(body: &Body, scale: &SceneScale) -> Option<Vec<Point3<f64>>> {
        let vertices = body.orbit_vertices(body.current_jd(), body.info.show_solid_orbit)?;
        Some(vertices.iter().map(|v| scale.point(v)).collect())
    }

    fn set_orbit_lines(&mut self, body: &Body, orrery: &Orrery, scale: &SceneScale) {
        let vertices = match Self::scaled_orbit_vertices(body, scale) {
            Some(vertices) => vertices,
            None => return,
        };

        let style = if body.info.show_solid_orbit || self.force_solid {
            LineStyle::Solid
        } else {
            LineStyle::Gradient
        };
        match self.orbit.as_mut() {
            Some(orbit) => orbit.set_line(&vertices),
            None => self.orbit = Some(OrbitLine::new(style, body.info.color, &vertices)),
        }

        let central = orrery.central();
        if body.parent.map_or(true, |parent| parent == central.id) {
            let negated: Vec<_> = vertices.iter().map(|v| Point3::from(-v.coords)).collect();
            match self.ecliptic.as_mut() {
                Some(ecliptic) => ecliptic.set_line(&negated),
                None => {
                    self.ecliptic = Some(OrbitLine::new(
                        LineStyle::Solid,
                        central.info.color,
                        &negated,
                    ))
                }
            }
        }

        if body.motion.is_reevaluable() && body.info.show_solid_orbit {
            self.revolution_start_jd = Some(body.current_jd());
        }
    }

    /// Resamples the orbit line. Unless forced, only re-evaluable orbits are
    /// resampled, since nothing else can have changed.
    pub fn recalculate_orbit_line(&mut self, body: &Body, scale: &SceneScale, forced: bool) {
        if !forced && !body.motion.is_reevaluable() {
            return;
        }
        let vertices = match Self::scaled_orbit_vertices(body, scale) {
            Some(vertices) => vertices,
            None => return,
        };
        if let Some(orbit) = self.orbit.as_mut() {
            debug!("Rebuilding orbit line of {}", body.name());
            orbit.set_line(&vertices);
        }
        if self.revolution_start_jd.is_some() {
            self.revolution_start_jd = Some(body.current_jd());
        }
    }

    fn completed_revolution(&self, body: &Body) -> bool {
        match (self.revolution_start_jd, body.period()) {
            (Some(start), Some(period)) => (body.current_jd() - start).abs() * DAY >= period,
            _ => false,
        }
    }

    /// Follows the body for one frame. `delta_t` is the simulated seconds per
    /// tick, used to resample re-evaluable orbits behind the body.
    pub fn draw(&mut self, orrery: &Orrery, scale: &SceneScale, delta_t: f64) {
        let body = orrery.get_body(self.body);

        if self.completed_revolution(body) {
            self.recalculate_orbit_line(body, scale, false);
        }

        let orbit = match self.orbit.as_mut() {
            Some(orbit) if self.orbit_shown && orbit.is_gradient() => orbit,
            _ => return,
        };

        let pos = scale.point(&orrery.relative_position(self.body));
        let vel = orrery.relative_velocity(self.body);
        if body.motion.is_reevaluable() {
            let provider = |n: usize| -> Vec<Point3<f64>> {
                vertices_in_delta_t(body, delta_t, n)
                    .iter()
                    .map(|v| scale.point(v))
                    .collect()
            };
            orbit.update_pos(&pos, &vel, Some(&provider));
        } else {
            orbit.update_pos(&pos, &vel, None);
        }
    }

    pub fn body(&self) -> BodyID {
        self.body
    }

    pub fn orbit(&self) -> Option<&OrbitLine> {
        self.orbit.as_ref()
    }

    pub fn ecliptic(&self) -> Option<&OrbitLine> {
        self.ecliptic.as_ref()
    }

    pub fn is_orbit_shown(&self) -> bool {
        self.orbit.is_some() && self.orbit_shown
    }

    pub fn is_ecliptic_shown(&self) -> bool {
        self.ecliptic.is_some() && self.ecliptic_shown
    }

    pub fn show_orbit(&mut self) {
        self.orbit_shown = true;
    }

    pub fn hide_orbit(&mut self) {
        self.orbit_shown = false;
    }

    pub fn show_ecliptic(&mut self) {
        self.ecliptic_shown = true;
    }

    pub fn hide_ecliptic(&mut self) {
        self.ecliptic_shown = false;
    }
}
