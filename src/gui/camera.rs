use std::f32::consts::PI;

use kiss3d::camera::Camera;
use kiss3d::event::{Action, Key, MouseButton, WindowEvent};
use kiss3d::resource::ShaderUniform;
use kiss3d::window::Canvas;
use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Vector2, Vector3};

const KEY_CAMERA_UP: Key = Key::W;
const KEY_CAMERA_DOWN: Key = Key::S;
const KEY_CAMERA_LEFT: Key = Key::A;
const KEY_CAMERA_RIGHT: Key = Key::D;
const KEY_ZOOM_IN: Key = Key::Equals;
const KEY_ZOOM_OUT: Key = Key::Minus;

const KEY_ANGLE_STEP: f32 = 0.1;
const KEY_ZOOM_STEP: f32 = 1.2;
const DRAG_STEP: f32 = 0.005;
const SCROLL_STEP: f32 = 1.5;
// Keeps the camera off the poles, where "up" stops making sense
const POLE_MARGIN: f32 = 0.001;

/// Orbits the origin at a distance, with z up.
///
/// The view translates the scene so the focused body sits at the origin, so
/// this camera never has to move its target. The clipping planes follow the
/// distance, which lets it zoom from a single planet out to the whole scene.
pub struct OrbitCamera {
    azimuth: f32,
    polar: f32,
    distance: f32,
    distance_range: (f32, f32),
    viewport: (u32, u32),
    fovy: f32,
    last_cursor: Vector2<f32>,
}

impl OrbitCamera {
    pub fn new(distance: f32, max_distance: f32) -> Self {
        OrbitCamera {
            azimuth: -PI / 2.0,
            polar: PI / 3.0,
            distance,
            distance_range: (1e-3, max_distance),
            viewport: (800, 600),
            fovy: PI / 4.0,
            last_cursor: Vector2::zeros(),
        }
    }

    fn projection(&self) -> Perspective3<f32> {
        let (w, h) = self.viewport;
        Perspective3::new(
            w as f32 / h.max(1) as f32,
            self.fovy,
            self.distance * 0.01,
            self.distance * 1024.0,
        )
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Moves to `distance`, within the allowed range.
    pub fn set_distance(&mut self, distance: f32) {
        self.distance = nalgebra::clamp(distance, self.distance_range.0, self.distance_range.1);
    }

    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.azimuth = (self.azimuth + d_azimuth) % (2.0 * PI);
        self.polar = nalgebra::clamp(self.polar + d_polar, POLE_MARGIN, PI - POLE_MARGIN);
    }

    pub fn zoom(&mut self, factor: f32) {
        self.set_distance(self.distance * factor);
    }
}

impl Camera for OrbitCamera {
    fn handle_event(&mut self, canvas: &Canvas, event: &WindowEvent) {
        match *event {
            WindowEvent::CursorPos(x, y, _) => {
                let cursor = Vector2::new(x as f32, y as f32);
                if canvas.get_mouse_button(MouseButton::Button1) == Action::Press {
                    // Dragging right swings the camera left
                    let delta = cursor - self.last_cursor;
                    self.rotate(-delta.x * DRAG_STEP, -delta.y * DRAG_STEP);
                }
                self.last_cursor = cursor;
            }
            WindowEvent::Scroll(_, off, _) if off < 0.0 => self.zoom(SCROLL_STEP),
            WindowEvent::Scroll(_, off, _) if off > 0.0 => self.zoom(SCROLL_STEP.recip()),
            WindowEvent::FramebufferSize(w, h) => self.viewport = (w, h),
            WindowEvent::Key(KEY_CAMERA_UP, Action::Press, _) => self.rotate(0.0, -KEY_ANGLE_STEP),
            WindowEvent::Key(KEY_CAMERA_DOWN, Action::Press, _) => self.rotate(0.0, KEY_ANGLE_STEP),
            WindowEvent::Key(KEY_CAMERA_LEFT, Action::Press, _) => self.rotate(-KEY_ANGLE_STEP, 0.0),
            WindowEvent::Key(KEY_CAMERA_RIGHT, Action::Press, _) => self.rotate(KEY_ANGLE_STEP, 0.0),
            WindowEvent::Key(KEY_ZOOM_IN, Action::Press, _) => self.zoom(KEY_ZOOM_STEP.recip()),
            WindowEvent::Key(KEY_ZOOM_OUT, Action::Press, _) => self.zoom(KEY_ZOOM_STEP),
            _ => {}
        }
    }

    fn eye(&self) -> Point3<f32> {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        Point3::new(
            self.distance * cos_azimuth * sin_polar,
            self.distance * sin_azimuth * sin_polar,
            self.distance * cos_polar,
        )
    }

    fn view_transform(&self) -> Isometry3<f32> {
        Isometry3::look_at_rh(&self.eye(), &Point3::origin(), &Vector3::z())
    }

    fn transformation(&self) -> Matrix4<f32> {
        self.projection().into_inner() * self.view_transform().to_homogeneous()
    }

    fn inverse_transformation(&self) -> Matrix4<f32> {
        self.transformation()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
    }

    fn clip_planes(&self) -> (f32, f32) {
        let projection = self.projection();
        (projection.znear(), projection.zfar())
    }

    fn update(&mut self, _canvas: &Canvas) {}

    fn upload(
        &self,
        _: usize,
        proj: &mut ShaderUniform<Matrix4<f32>>,
        view: &mut ShaderUniform<Matrix4<f32>>,
    ) {
        proj.upload(&self.projection().into_inner());
        view.upload(&self.view_transform().to_homogeneous());
    }
}
