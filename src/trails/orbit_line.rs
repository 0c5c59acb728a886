use nalgebra::{Point3, Vector3};
use tracing::trace;

use super::color::{darken, gradient};
use super::ring::VertexRing;
use crate::math::geometry::{extend_towards, is_at_least_quarter_turn};

/// Produces `n` fresh vertices to recycle into the wrapped part of a trail.
pub type VertexProvider<'a> = &'a dyn Fn(usize) -> Vec<Point3<f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// One flat color. The vertices never change once built.
    Solid,
    /// Colors fade in from the oldest vertex, and an extra slot at the end
    /// follows the body.
    Gradient,
}

/// A fixed-length path of vertices, drawn as one line strip.
///
/// Vertices are in scene units. `positions` and `colors` are the flat buffers
/// handed to the renderer: three floats per slot, one slot per vertex, plus the
/// live slot for gradient lines. Their length is fixed when the line is built.
#[derive(Debug, Clone)]
pub struct OrbitLine {
    style: LineStyle,
    color: Point3<f32>,
    vertices: VertexRing<Point3<f64>>,
    positions: Vec<f32>,
    colors: Vec<f32>,
}

impl OrbitLine {
    pub fn new(style: LineStyle, color: Point3<f32>, vertices: &[Point3<f64>]) -> Self {
        assert!(
            vertices.len() >= 2,
            "An orbit line needs at least two vertices, got {}",
            vertices.len()
        );

        let mut line = OrbitLine {
            style,
            color,
            vertices: VertexRing::new(vertices.to_vec()),
            positions: vec![],
            colors: vec![],
        };
        line.build_buffers();
        line
    }

    fn build_buffers(&mut self) {
        let n = self.vertices.len();
        let slots = match self.style {
            LineStyle::Solid => n,
            LineStyle::Gradient => n + 1,
        };

        self.positions = vec![0.0; 3 * slots];
        self.build_positions();

        let colors: Vec<Point3<f32>> = match self.style {
            LineStyle::Solid => vec![darken(&self.color, 0.5); n],
            LineStyle::Gradient => gradient(&self.color, n)
                .chain(std::iter::once(self.color))
                .collect(),
        };
        self.colors = colors.iter().flat_map(|c| [c.x, c.y, c.z]).collect();

        if self.style == LineStyle::Gradient {
            // Until the first update, the live slot closes the loop
            let first = self.vertices.get(0);
            self.set_live_slot(&first);
        }
    }

    fn build_positions(&mut self) {
        for (i, v) in self.vertices.iter().enumerate() {
            self.positions[3 * i] = v.x as f32;
            self.positions[3 * i + 1] = v.y as f32;
            self.positions[3 * i + 2] = v.z as f32;
        }
    }

    fn set_live_slot(&mut self, pos: &Point3<f64>) {
        let n = 3 * self.vertices.len();
        self.positions[n] = pos.x as f32;
        self.positions[n + 1] = pos.y as f32;
        self.positions[n + 2] = pos.z as f32;
    }

    /// Swaps in a freshly computed path. If it is the same length as the old
    /// one, the buffers are refilled in place.
    pub fn set_line(&mut self, vertices: &[Point3<f64>]) {
        if vertices.len() == self.vertices.len() {
            self.vertices.rebuild(vertices);
        } else {
            assert!(vertices.len() >= 2, "An orbit line needs at least two vertices");
            self.vertices = VertexRing::new(vertices.to_vec());
        }
        self.build_buffers();
    }

    pub fn style(&self) -> LineStyle {
        self.style
    }

    pub fn is_gradient(&self) -> bool {
        self.style == LineStyle::Gradient
    }

    pub fn color(&self) -> Point3<f32> {
        self.color
    }

    /// Number of path vertices, not counting the live slot.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Path vertices, oldest first.
    pub fn vertices(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.vertices.iter()
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// How many leading vertices the body has already passed: the index of the
    /// first vertex that lies at least a quarter turn away from the direction
    /// the body came from. `None` if no vertex does.
    pub fn vertices_behind(&self, pos: &Point3<f64>, vel: &Vector3<f64>) -> Option<usize> {
        let look_away = -vel;
        self.vertices
            .iter()
            .position(|vertex| is_at_least_quarter_turn(pos, &vertex, &look_away))
    }

    /// Recycles the vertices the body has passed, and moves the live slot to
    /// `pos`. Returns how many vertices were recycled.
    ///
    /// Passed vertices are moved to the end of the path. If `new_vertices` is
    /// given, their slots are refilled from it. Otherwise only the last slot
    /// changes, extended from the one before it towards `pos`.
    pub fn update_pos(
        &mut self,
        pos: &Point3<f64>,
        vel: &Vector3<f64>,
        new_vertices: Option<VertexProvider>,
    ) -> usize {
        if self.style != LineStyle::Gradient {
            return 0;
        }

        let stale = self.vertices_behind(pos, vel).unwrap_or(0);
        if stale > 0 {
            let n = self.vertices.len();
            self.vertices.rotate(stale);

            match new_vertices {
                Some(provider) => {
                    let fresh = provider(stale);
                    for (i, v) in fresh.into_iter().take(stale).enumerate() {
                        self.vertices.set(n - stale + i, v);
                    }
                }
                None => {
                    let start = self.vertices.get(n - 2);
                    let dumped = self.vertices.get(n - 1);
                    let length = (dumped - start).norm();
                    self.vertices.set(n - 1, extend_towards(&start, pos, length));
                }
            }

            trace!("Recycled {} orbit vertices", stale);
            self.build_positions();
        }

        self.set_live_slot(pos);
        stale
    }
}
