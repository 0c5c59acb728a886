//! The boundary to the numerical force integration.

use nalgebra::Vector3;

use super::body::Body;
use crate::astro::NEWTON_G;

/// Advances body state under gravity, one substep at a time.
pub trait Integrator {
    /// Advances every body by `delta_t` seconds. `step_jd` is the Julian date
    /// the substep ends at.
    fn advance(&mut self, bodies: &mut [Body], step_jd: f64, delta_t: f64);
}

/// Velocity-Verlet integration of mutual point-mass gravity.
///
/// Still bodies exert gravity but are never moved.
#[derive(Debug, Default)]
pub struct VerletIntegrator {
    accelerations: Vec<Vector3<f64>>,
}

impl VerletIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    fn compute_accelerations(&mut self, bodies: &[Body]) {
        self.accelerations.clear();
        self.accelerations.resize(bodies.len(), Vector3::zeros());

        for (i, a) in bodies.iter().enumerate() {
            for (j, b) in bodies.iter().enumerate().skip(i + 1) {
                let offset = b.position - a.position;
                let dist_sq = offset.norm_squared();
                if dist_sq == 0.0 {
                    continue;
                }
                let pull = offset * (NEWTON_G / (dist_sq * dist_sq.sqrt()));
                self.accelerations[i] += pull * b.mass;
                self.accelerations[j] -= pull * a.mass;
            }
        }
    }
}

impl Integrator for VerletIntegrator {
    fn advance(&mut self, bodies: &mut [Body], _step_jd: f64, delta_t: f64) {
        if bodies.is_empty() {
            return;
        }
        let half_dt = 0.5 * delta_t;

        // Kick: v_n+1/2 = v_n + (1/2 * dt) * a_n
        self.compute_accelerations(bodies);
        for (body, a) in bodies.iter_mut().zip(self.accelerations.iter()) {
            if !body.info.is_still {
                body.velocity += half_dt * a;
            }
        }

        // Drift: x_n+1 = x_n + dt v_n+1/2
        for body in bodies.iter_mut().filter(|b| !b.info.is_still) {
            body.position += delta_t * body.velocity;
        }

        // Kick: v_n+1 = v_n+1/2 + (1/2 * dt) * a_n+1
        self.compute_accelerations(bodies);
        for (body, a) in bodies.iter_mut().zip(self.accelerations.iter()) {
            if !body.info.is_still {
                body.velocity += half_dt * a;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::body::{BodyID, BodyInfo, BodyMotion};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    const CENTRAL_MASS: f64 = 1e30;
    const ORBITING_MASS: f64 = 1e24;
    const RADIUS: f64 = 1.5e11;

    fn two_bodies() -> Vec<Body> {
        let white = Point3::new(1.0, 1.0, 1.0);
        let speed = (NEWTON_G * CENTRAL_MASS / RADIUS).sqrt();
        vec![
            Body::new(
                BodyID(0),
                BodyInfo::new("star", 7e8, white),
                CENTRAL_MASS,
                None,
                BodyMotion::Free,
                Point3::origin(),
                Vector3::zeros(),
            ),
            Body::new(
                BodyID(1),
                BodyInfo::new("planet", 6e6, white),
                ORBITING_MASS,
                None,
                BodyMotion::Free,
                Point3::new(RADIUS, 0.0, 0.0),
                Vector3::new(0.0, speed, 0.0),
            ),
        ]
    }

    fn momentum(bodies: &[Body]) -> Vector3<f64> {
        bodies
            .iter()
            .fold(Vector3::zeros(), |acc, b| acc + b.velocity * b.mass)
    }

    #[test]
    fn test_momentum_is_conserved() {
        let mut bodies = two_bodies();
        let mut integrator = VerletIntegrator::new();
        let before = momentum(&bodies);

        for _ in 0..1000 {
            integrator.advance(&mut bodies, 0.0, 3600.0);
        }

        let scale = ORBITING_MASS * bodies[1].velocity.norm();
        assert_relative_eq!((momentum(&bodies) - before).norm() / scale, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_circular_orbit_stays_circular() {
        let mut bodies = two_bodies();
        let mut integrator = VerletIntegrator::new();

        // Roughly a tenth of an orbit
        for _ in 0..900 {
            integrator.advance(&mut bodies, 0.0, 3600.0);
        }

        let separation = (bodies[1].position - bodies[0].position).norm();
        assert_relative_eq!(separation, RADIUS, max_relative = 1e-4);
    }

    #[test]
    fn test_still_bodies_do_not_move() {
        let mut bodies = two_bodies();
        bodies[0].info.is_still = true;
        let mut integrator = VerletIntegrator::new();

        for _ in 0..10 {
            integrator.advance(&mut bodies, 0.0, 3600.0);
        }
        assert_eq!(bodies[0].position, Point3::origin());
        assert_eq!(bodies[0].velocity, Vector3::zeros());
    }
}
