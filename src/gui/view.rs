use std::collections::HashMap;

use kiss3d::camera::Camera;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::scene::SceneNode;
use kiss3d::window::Window;
use nalgebra::{Point2, Point3, Translation3, UnitQuaternion, Vector3};

use super::camera::OrbitCamera;
use super::controller::Controller;
use super::renderer::TrailRenderer;
use crate::astro::DAY;
use crate::model::{Body, BodyID, FrameOutcome, Simulation};
use crate::trails::{SceneScale, TrailScene, SCENE_SIZE};

// Bodies are drawn to scale, but never smaller than this many scene units
const MIN_SPHERE_RADIUS: f32 = 2.0;

pub struct View {
    scene: TrailScene,
    body_spheres: HashMap<BodyID, SceneNode>,
    camera: OrbitCamera,
    renderer: TrailRenderer,
}

impl View {
    pub fn new(scene: TrailScene, window: &mut Window) -> Self {
        let camera = OrbitCamera::new(1.5 * SCENE_SIZE as f32, 20.0 * SCENE_SIZE as f32);

        let mut body_spheres = HashMap::new();
        for body in scene.simulation().orrery().bodies() {
            let sphere = Self::create_body_object(window, body, scene.scale());
            body_spheres.insert(body.id, sphere);
        }

        let mut view = View {
            scene,
            body_spheres,
            camera,
            renderer: TrailRenderer::new(),
        };
        view.fix_camera_zoom();
        view.update_scene_objects();
        view
    }

    fn create_body_object(window: &mut Window, body: &Body, scale: &SceneScale) -> SceneNode {
        let radius = (scale.length(body.info.radius) as f32).max(MIN_SPHERE_RADIUS);
        let mut sphere = window.add_sphere(radius);
        let color = &body.info.color;
        sphere.set_color(color.x, color.y, color.z);
        sphere
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        self.scene.simulation_mut()
    }

    pub fn camera_focus_next(&mut self) {
        self.scene.focus_next();
        self.fix_camera_zoom();
    }

    pub fn camera_focus_prev(&mut self) {
        self.scene.focus_prev();
        self.fix_camera_zoom();
    }

    pub fn toggle_orbits(&mut self) {
        self.scene.toggle_orbits();
    }

    pub fn back_to_start(&mut self) {
        self.scene.back_to_start();
    }

    /// Frames the focused body's orbit, or the whole scene from the overview.
    fn fix_camera_zoom(&mut self) {
        let orrery = self.scene.simulation().orrery();
        let dist = match self.scene.focus() {
            Some(id) => orrery
                .get_body(id)
                .semimajor_axis()
                .map(|a| 1.5 * self.scene.scale().length(a) as f32)
                .unwrap_or(20.0 * MIN_SPHERE_RADIUS),
            None => 1.5 * SCENE_SIZE as f32,
        };
        self.camera.set_distance(dist);
    }

    /// Runs one frame of simulation. Returns false once the simulation has
    /// been killed.
    pub fn update(&mut self) -> bool {
        match self.scene.step() {
            FrameOutcome::Killed => false,
            outcome => {
                if outcome.needs_draw() {
                    self.update_scene_objects();
                }
                true
            }
        }
    }

    fn update_scene_objects(&mut self) {
        let origin = self.scene.focus_position();
        let scale = *self.scene.scale();
        let orrery = self.scene.simulation().orrery();
        for (id, sphere) in self.body_spheres.iter_mut() {
            let body = orrery.get_body(*id);
            let position = scale.point(&body.position) - origin;
            let position: Vector3<f32> = nalgebra::convert(position);
            sphere.set_local_translation(Translation3::from(position));
            sphere.set_local_rotation(UnitQuaternion::from_axis_angle(
                &Vector3::z_axis(),
                body.rotation() as f32,
            ));
        }
    }

    /// Offset that moves something positioned relative to `body` into focus
    /// space.
    fn offset_from(&self, body: Option<BodyID>) -> Vector3<f32> {
        let reference = match body {
            Some(id) => self
                .scene
                .scale()
                .point(&self.scene.simulation().orrery().get_body(id).position),
            None => Point3::origin(),
        };
        nalgebra::convert(reference - self.scene.focus_position())
    }

    pub fn prerender_scene(&mut self, window: &mut Window, controller: &Controller) {
        self.draw_orbit_lines();
        self.draw_tracers();

        let default_font = kiss3d::text::Font::default();
        let text_color = Point3::new(1.0, 1.0, 1.0);
        window.draw_text(
            &self.left_hand_text(),
            &Point2::origin(),
            60.0,
            &default_font,
            &text_color,
        );
        window.draw_text(
            &self.time_summary_text(controller.fps()),
            // no idea why i have to multiply by 2.0, but there it is
            &Point2::new(window.width() as f32 * 2.0 - 700.0, 0.0),
            60.0,
            &default_font,
            &text_color,
        );
    }

    fn draw_orbit_lines(&mut self) {
        let orrery = self.scene.simulation().orrery();
        let mut queued = vec![];
        for lines in self.scene.orbit_lines().iter() {
            let body = orrery.get_body(lines.body());
            if let Some(orbit) = lines.orbit().filter(|_| lines.is_orbit_shown()) {
                // Orbits are drawn around the body's primary
                let primary = body.parent.unwrap_or_else(|| orrery.central_id());
                queued.push((orbit, self.offset_from(Some(primary))));
            }
            if let Some(ecliptic) = lines.ecliptic().filter(|_| lines.is_ecliptic_shown()) {
                queued.push((ecliptic, self.offset_from(Some(body.id))));
            }
        }
        for (line, offset) in queued {
            self.renderer
                .add_strip(line.positions(), line.colors(), offset);
        }
    }

    fn draw_tracers(&mut self) {
        for (_, tracer) in self.scene.tracers().iter() {
            if !tracer.is_visible() {
                continue;
            }
            // Only the part of the ring that has been drawn into
            let used = tracer.current_vertex() + 1;
            let offset = self.offset_from(tracer.trace_from());
            self.renderer
                .add_path(tracer.vertices().take(used), tracer.color(), offset);
        }
    }

    fn left_hand_text(&self) -> String {
        let orrery = self.scene.simulation().orrery();
        let (name, from) = match (self.scene.look_at(), self.scene.look_from()) {
            (Some(at), Some(from)) => (orrery.get_body(at).name(), orrery.get_body(from).name()),
            _ => ("Overview", orrery.central().name()),
        };

        let mut text = format!("Focused on: {}\nSeen from: {}", name, from);
        if let Some(id) = self.scene.look_at() {
            let body = orrery.get_body(id);
            // Indentation is intentional
            text += &format!(
                "\nState:\n    Distance: {:.0} km\n    Speed: {:.3} km/s",
                orrery.relative_position(id).coords.norm() / 1000.0,
                orrery.relative_velocity(id).norm() / 1000.0,
            );
            if let Some(period) = body.period() {
                text += &format!("\n    Period: {:.2} d", period / DAY);
            }
            let satellites: Vec<_> = orrery.child_bodies(id).map(|b| b.name()).collect();
            if !satellites.is_empty() {
                text += &format!("\nSatellites: {}", satellites.join(", "));
            }
        }
        if self.scene.orbits_hidden() {
            text += "\nOrbits hidden";
        }
        text
    }

    fn time_summary_text(&self, fps: f64) -> String {
        let simulation = self.scene.simulation();
        let elapsed = (simulation.current_jd() - self.scene.start_jd()) * DAY;
        format!(
            "JD: {:.3}
Elapsed: {}
Timestep: {} s/tick{}
FPS: {:.0}",
            simulation.current_jd(),
            format_seconds(elapsed),
            simulation.seconds_per_tick(),
            if simulation.is_playing() { "" } else { " (paused)" },
            fps,
        )
    }

    pub fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        (Some(&mut self.camera), None, Some(&mut self.renderer), None)
    }
}

/// Formats a span of simulated time. Negative spans (time running backwards
/// past the start) get a leading minus.
fn format_seconds(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let mut total_seconds = seconds.abs() as u64;
    let n_minutes = 60;
    let n_hours = n_minutes * 60;
    let n_days = n_hours * 24;
    let n_years = 365 * n_days;

    macro_rules! count_and_remainder {
        ($variable:ident, $divisor:expr) => {
            let $variable = total_seconds / $divisor;
            total_seconds %= $divisor;
        };
    }

    count_and_remainder!(years, n_years);
    count_and_remainder!(days, n_days);
    count_and_remainder!(hours, n_hours);
    count_and_remainder!(minutes, n_minutes);

    format!(
        "{}{}y, {}d, {:02}:{:02}:{:02}",
        sign, years, days, hours, minutes, total_seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.0), "0y, 0d, 00:00:00");
        assert_eq!(format_seconds(DAY + 3661.0), "0y, 1d, 01:01:01");
        assert_eq!(format_seconds(-366.0 * DAY), "-1y, 1d, 00:00:00");
    }
}
