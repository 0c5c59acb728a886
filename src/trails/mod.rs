//! Display-side state that follows the bodies around: orbit lines and motion
//! traces.
//!
//! None of this is stored on the bodies themselves. The managers own one entry
//! per [BodyID](crate::model::BodyID), and look bodies up in the
//! [Orrery](crate::model::Orrery) every frame.

pub mod body_lines;
pub mod color;
pub mod manager;
pub mod orbit_line;
pub mod ring;
pub mod scale;
pub mod scene;
pub mod tracer;

pub use body_lines::BodyOrbitLines;
pub use manager::{OrbitLinesManager, TracerManager};
pub use orbit_line::{LineStyle, OrbitLine};
pub use scale::{SceneScale, SCENE_SIZE};
pub use scene::{Focus, TrailScene};
pub use tracer::Tracer;
