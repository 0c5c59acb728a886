use kiss3d::camera::Camera;
use kiss3d::context::Context;
use kiss3d::renderer::Renderer;
use kiss3d::resource::{
    AllocationType, BufferType, Effect, GPUVec, ShaderAttribute, ShaderUniform,
};
use nalgebra::{Matrix4, Point3, Translation3, Vector3};

struct TrailData {
    // Stored as (pt, color, pt, color), one pair per segment
    segments: GPUVec<Point3<f32>>,
    // Moves the trail from its reference body's frame to focus space
    transform: Matrix4<f32>,
}

/// Draws orbit lines and tracers as colored line segments.
///
/// Trails are queued every frame with the translation that places them in
/// focus space, and dropped once they are rendered.
pub struct TrailRenderer {
    shader: Effect,
    pos: ShaderAttribute<Point3<f32>>,
    color: ShaderAttribute<Point3<f32>>,
    model: ShaderUniform<Matrix4<f32>>,
    view: ShaderUniform<Matrix4<f32>>,
    proj: ShaderUniform<Matrix4<f32>>,
    line_width: f32,
    trails: Vec<TrailData>,
}

impl TrailRenderer {
    pub fn new() -> Self {
        let mut shader = Effect::new_from_str(VERTEX_SRC, FRAGMENT_SRC);

        shader.use_program();

        TrailRenderer {
            pos: shader
                .get_attrib::<Point3<f32>>("position")
                .expect("Failed to get shader attribute."),
            color: shader
                .get_attrib::<Point3<f32>>("color")
                .expect("Failed to get shader attribute."),
            model: shader
                .get_uniform::<Matrix4<f32>>("model")
                .expect("Failed to get shader uniform."),
            view: shader
                .get_uniform::<Matrix4<f32>>("view")
                .expect("Failed to get shader uniform."),
            proj: shader
                .get_uniform::<Matrix4<f32>>("proj")
                .expect("Failed to get shader uniform."),
            shader,
            line_width: 1.0,
            trails: vec![],
        }
    }

    /// Queues a strip given as flat xyz buffers, one color per vertex.
    pub fn add_strip(&mut self, positions: &[f32], colors: &[f32], offset: Vector3<f32>) {
        let to_point = |c: &[f32]| Point3::new(c[0], c[1], c[2]);
        let points: Vec<_> = positions.chunks_exact(3).map(to_point).collect();
        let colors: Vec<_> = colors.chunks_exact(3).map(to_point).collect();
        self.push(strip_segments(&points, &colors), offset);
    }

    /// Queues a strip drawn in one color.
    pub fn add_path(
        &mut self,
        points: impl Iterator<Item = Point3<f64>>,
        color: Point3<f32>,
        offset: Vector3<f32>,
    ) {
        let points: Vec<_> = points.map(|p| p.map(|x| x as f32)).collect();
        let colors = vec![color; points.len()];
        self.push(strip_segments(&points, &colors), offset);
    }

    fn push(&mut self, segments: Vec<Point3<f32>>, offset: Vector3<f32>) {
        if segments.is_empty() {
            return;
        }
        self.trails.push(TrailData {
            segments: GPUVec::new(segments, BufferType::Array, AllocationType::StreamDraw),
            transform: Translation3::from(offset).to_homogeneous(),
        });
    }
}

/// Turns a strip into (pt, color) pairs for `Context::LINES`.
fn strip_segments(points: &[Point3<f32>], colors: &[Point3<f32>]) -> Vec<Point3<f32>> {
    let n = points.len().min(colors.len());
    let mut data = Vec::with_capacity(4 * n.saturating_sub(1));
    for i in 1..n {
        data.push(points[i - 1]);
        data.push(colors[i - 1]);
        data.push(points[i]);
        data.push(colors[i]);
    }
    data
}

impl Renderer for TrailRenderer {
    fn render(&mut self, pass: usize, camera: &mut dyn Camera) {
        if self.trails.is_empty() {
            return;
        }

        self.shader.use_program();
        self.pos.enable();
        self.color.enable();

        camera.upload(pass, &mut self.proj, &mut self.view);

        let ctxt = Context::get();
        ctxt.line_width(self.line_width);
        for trail in self.trails.iter_mut() {
            self.pos.bind_sub_buffer(&mut trail.segments, 1, 0);
            self.color.bind_sub_buffer(&mut trail.segments, 1, 1);

            self.model.upload(&trail.transform);

            ctxt.draw_arrays(Context::LINES, 0, (trail.segments.len() / 2) as i32);
        }

        self.pos.disable();
        self.color.disable();

        self.trails.clear();
    }
}

/// Vertex shader used by the material to display line.
static VERTEX_SRC: &str = "#version 100
    attribute vec3 position;
    attribute vec3 color;
    varying   vec3 vColor;
    uniform   mat4 model;
    uniform   mat4 proj;
    uniform   mat4 view;
    void main() {
        gl_Position = proj * view * model * vec4(position, 1.0);
        vColor = color;
    }";

/// Fragment shader used by the material to display line.
static FRAGMENT_SRC: &str = "#version 100
#ifdef GL_FRAGMENT_PRECISION_HIGH
   precision highp float;
#else
   precision mediump float;
#endif

    varying vec3 vColor;
    void main() {
        gl_FragColor = vec4(vColor, 1.0);
    }";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_segments() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let colors = [
            Point3::new(0.1, 0.1, 0.1),
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let data = strip_segments(&points, &colors);
        assert_eq!(data.len(), 8);
        assert_eq!(data[0], points[0]);
        assert_eq!(data[3], colors[1]);
        assert_eq!(data[4], points[1]);
        assert_eq!(data[7], colors[2]);

        assert!(strip_segments(&points[..1], &colors[..1]).is_empty());
    }
}
