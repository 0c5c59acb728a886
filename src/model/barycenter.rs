use nalgebra::Vector3;
use tracing::{debug, warn};

use super::orrery::Orrery;

/// Bodies at least this many times lighter than the central body are moved
/// along with it. Anything heavier is assumed to already share its frame.
pub const TRANSLATION_MASS_RATIO: f64 = 1e11;

/// Aggregate of every non-central body, computed fresh for each correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarycenterFrame {
    pub mass: f64,
    /// Streaming mass-weighted position average
    pub position: Vector3<f64>,
    /// Sum of momenta, before normalization
    pub momentum: Vector3<f64>,
}

impl BarycenterFrame {
    /// Folds every non-central body in, in orrery order.
    ///
    /// Each body's position is weighted by its share of the mass accumulated
    /// *so far*, not of the final total.
    pub fn accumulate(orrery: &Orrery) -> Self {
        let central = orrery.central_id();
        let mut frame = BarycenterFrame {
            mass: 0.0,
            position: Vector3::zeros(),
            momentum: Vector3::zeros(),
        };

        for body in orrery.bodies().filter(|b| b.id != central) {
            frame.mass += body.mass;
            let mass_ratio = body.mass / frame.mass;
            frame.position += body.position.coords * mass_ratio;
            frame.momentum += body.velocity * body.mass;
        }
        frame
    }
}

/// Re-expresses the scenario in the frame of its center of mass.
///
/// The central body is moved opposite the rest of the system, and every body
/// in its frame picks up its velocity. Precondition: the central body
/// dominates the mass of the system. Nothing guards against a zero or tiny
/// central mass; the result is simply non-finite.
///
/// Returns the aggregate that was used, or `None` if the correction was
/// skipped.
pub fn set_barycenter(
    orrery: &mut Orrery,
    use_physics: bool,
    use_barycenter: bool,
) -> Option<BarycenterFrame> {
    let central_id = orrery.central_id();
    if !use_physics || !use_barycenter || orrery.central().info.is_still {
        return None;
    }

    let frame = BarycenterFrame::accumulate(orrery);
    if frame.mass == 0.0 {
        warn!("Barycentric correction over zero mass; the frame will not be finite");
    }

    let central_mass = orrery.central().mass;
    let mean_velocity = frame.momentum / frame.mass;
    let mass_ratio = frame.mass / central_mass;

    let central = orrery.get_body_mut(central_id);
    central.velocity = mean_velocity * -mass_ratio;
    central.position = (frame.position * -mass_ratio).into();
    let (central_position, central_velocity) = (central.position, central.velocity);

    for body in orrery.bodies_mut() {
        if body.id == central_id {
            continue;
        }
        // Bodies in some other body's frame are carried by their parent
        if body.parent.map_or(false, |parent| parent != central_id) {
            continue;
        }

        body.add_to_velocity(&central_velocity);
        if central_mass / body.mass > TRANSLATION_MASS_RATIO {
            body.position += central_position.coords;
        }
    }

    debug!(
        "Barycenter: central body moved to {:?} at {:?}",
        central_position, central_velocity
    );
    Some(frame)
}
