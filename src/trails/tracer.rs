use nalgebra::Point3;
use tracing::trace;

use super::color::darken;
use super::ring::VertexRing;
use crate::math::geometry::heading;
use crate::model::BodyID;

/// Vertices in every tracer.
pub const TRACER_VERTICES: usize = 1000;

/// Heading change, in radians, past which the path is considered to be
/// turning and a new vertex is started.
pub const SWITCH_THRESHOLD: f64 = 0.005;

/// A fixed-length trace of where a body has been, relative to some reference
/// body (or to the origin).
///
/// Straight stretches keep overwriting the same vertex, and turns start new
/// ones, so the vertex budget is spent where the path curves. Once every
/// vertex is in use, the oldest one is dropped for each new one.
#[derive(Debug, Clone)]
pub struct Tracer {
    color: Point3<f32>,
    vertices: VertexRing<Point3<f64>>,
    /// Logical index of the vertex being drawn. Never exceeds `last_vertex`.
    current_vertex: usize,
    last_vertex: usize,
    /// Heading of the last committed segment, cached until the next switch
    last_path_direction: Option<f64>,
    switch_vertex: bool,
    previous_pos: Option<Point3<f64>>,
    trace_from: Option<BodyID>,
    visible: bool,
}

impl Tracer {
    pub fn new(color: Point3<f32>, n_vertices: usize) -> Self {
        assert!(n_vertices >= 3, "A tracer needs at least three vertices");
        Tracer {
            color: darken(&color, 0.7),
            vertices: VertexRing::filled(Point3::origin(), n_vertices),
            current_vertex: 0,
            last_vertex: n_vertices - 1,
            last_path_direction: None,
            switch_vertex: false,
            previous_pos: None,
            trace_from: None,
            visible: false,
        }
    }

    /// Throws away the trace, and starts again from an empty one.
    pub fn reset(&mut self) {
        self.vertices.fill_from(0, Point3::origin());
        self.current_vertex = 0;
        self.last_path_direction = None;
        self.switch_vertex = false;
        self.previous_pos = None;
    }

    /// Changes the reference body. A trace is only meaningful in one frame, so
    /// changing it resets the trace. Returns whether it changed.
    pub fn set_trace_from(&mut self, trace_from: Option<BodyID>) -> bool {
        if self.trace_from == trace_from {
            return false;
        }
        trace!("Tracer reference changed to {:?}", trace_from);
        self.reset();
        self.trace_from = trace_from;
        true
    }

    pub fn trace_from(&self) -> Option<BodyID> {
        self.trace_from
    }

    pub fn color(&self) -> Point3<f32> {
        self.color
    }

    pub fn current_vertex(&self) -> usize {
        self.current_vertex
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// The trace, oldest first, relative to the reference body.
    pub fn vertices(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.vertices.iter()
    }

    fn change_vertex(&mut self) {
        self.last_path_direction = None;
        self.switch_vertex = self.current_vertex == self.last_vertex;
        if self.current_vertex < self.last_vertex {
            self.current_vertex += 1;
        }
        trace!("Tracer switched to vertex {}", self.current_vertex);
    }

    /// Records the body at `position`. `reference` is the position of the body
    /// being traced from, if any. Returns false if the body hasn't moved since
    /// the last recorded position.
    pub fn draw(&mut self, position: &Point3<f64>, reference: Option<&Point3<f64>>) -> bool {
        let pos = match reference {
            Some(reference) => Point3::from(position - reference),
            None => *position,
        };

        if (self.vertices.get(self.current_vertex) - pos).norm() == 0.0 {
            return false;
        }

        if self.current_vertex < self.last_vertex {
            self.vertices.fill_from(self.current_vertex, pos);
        } else {
            if self.switch_vertex {
                // Drop the oldest vertex
                self.vertices.rotate(1);
                self.switch_vertex = false;
            }
            self.vertices.set(self.last_vertex, pos);
        }

        match (self.current_vertex >= 2, self.previous_pos) {
            (true, Some(previous)) => {
                let c = self.current_vertex;
                let committed = match self.last_path_direction {
                    Some(direction) => direction,
                    None => {
                        let segment = self.vertices.get(c - 1) - self.vertices.get(c - 2);
                        let direction = heading(&segment);
                        self.last_path_direction = Some(direction);
                        direction
                    }
                };

                let deviation = (committed - heading(&(pos - previous))).abs();
                if deviation > SWITCH_THRESHOLD {
                    self.change_vertex();
                }
            }
            _ => self.change_vertex(),
        }

        self.previous_pos = Some(pos);
        true
    }
}
