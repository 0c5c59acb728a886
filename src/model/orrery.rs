use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use super::body::{Anchor, Body, BodyID, BodyInfo, BodyMotion};

/// The full set of bodies in a scenario.
///
/// Bodies are kept in insertion order, and a body's parent must be inserted
/// before it. Walking the bodies in order therefore always visits a parent
/// before its children.
#[derive(Debug, Clone)]
pub struct Orrery {
    bodies: Vec<Body>,
    name_to_id: HashMap<String, BodyID>,
    central: Option<BodyID>,
}

impl Orrery {
    pub fn new() -> Self {
        Orrery {
            bodies: vec![],
            name_to_id: HashMap::new(),
            central: None,
        }
    }

    pub fn add_body(
        &mut self,
        info: BodyInfo,
        mass: f64,
        parent: Option<BodyID>,
        motion: BodyMotion,
        position: Point3<f64>,
        velocity: Vector3<f64>,
    ) -> BodyID {
        let id = BodyID(self.bodies.len());
        if let Some(parent_id) = parent {
            assert!(
                parent_id < id,
                "Parent {:?} of {} must be added before it",
                parent_id,
                info.name
            );
        }

        self.name_to_id.insert(info.name.clone(), id);
        self.bodies
            .push(Body::new(id, info, mass, parent, motion, position, velocity));
        id
    }

    /// Picks the central body: the first one flagged as central, otherwise the
    /// heaviest one. Only that body is left flagged.
    pub fn choose_central_body(&mut self) -> Option<BodyID> {
        let flagged = self.bodies.iter().find(|b| b.info.is_central).map(|b| b.id);
        let central = flagged.or_else(|| {
            self.bodies
                .iter()
                .max_by(|a, b| a.mass.total_cmp(&b.mass))
                .map(|b| b.id)
        })?;

        for body in self.bodies.iter_mut() {
            body.info.is_central = body.id == central;
        }
        self.central = Some(central);
        Some(central)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get_body(&self, id: BodyID) -> &Body {
        &self.bodies[id.0]
    }

    pub fn get_body_mut(&mut self, id: BodyID) -> &mut Body {
        &mut self.bodies[id.0]
    }

    pub fn body_by_name(&self, name: &str) -> Option<&Body> {
        self.name_to_id.get(name).map(|id| self.get_body(*id))
    }

    pub fn central_id(&self) -> BodyID {
        self.central
            .expect("Central body requested before one was chosen")
    }

    pub fn central(&self) -> &Body {
        self.get_body(self.central_id())
    }

    pub fn child_bodies(&self, id: BodyID) -> impl Iterator<Item = &Body> {
        self.bodies()
            .filter(move |body| body.parent == Some(id))
    }

    /// Whether `child` orbits `primary` directly. Bodies without a parent orbit
    /// the central body.
    pub fn is_orbiting(&self, child: BodyID, primary: BodyID) -> bool {
        match self.get_body(child).parent {
            Some(parent) => parent == primary,
            None => child != primary && Some(primary) == self.central,
        }
    }

    /// What a body's orbit is measured from: its parent's current state, or
    /// the origin for top-level bodies.
    pub fn anchor_of(&self, id: BodyID) -> Anchor {
        match self.get_body(id).parent {
            Some(parent) => {
                let parent = self.get_body(parent);
                Anchor {
                    position: parent.position,
                    velocity: parent.velocity,
                }
            }
            None => Anchor::origin(),
        }
    }

    pub fn relative_position(&self, id: BodyID) -> Point3<f64> {
        let anchor = self.anchor_of(id);
        Point3::from(self.get_body(id).position - anchor.position)
    }

    pub fn relative_velocity(&self, id: BodyID) -> Vector3<f64> {
        self.get_body(id).velocity - self.anchor_of(id).velocity
    }

    /// Analytically positions every body at the given date, parents first.
    pub fn set_positions_from_jd(&mut self, jd: f64) {
        for idx in 0..self.bodies.len() {
            let anchor = self.anchor_of(BodyID(idx));
            self.bodies[idx].set_position_from_jd(jd, &anchor);
        }
    }

    pub fn reset_bodies(&mut self) {
        for body in self.bodies.iter_mut() {
            body.reset();
        }
    }

    pub fn after_tick(&mut self, elapsed_seconds: f64, was_analytic_step: bool) {
        for body in self.bodies.iter_mut() {
            body.after_tick(elapsed_seconds, was_analytic_step);
        }
    }

    /// Non-central masses only matter to the integrator, so when it isn't
    /// running they are flattened out.
    pub fn flatten_masses(&mut self) {
        for body in self.bodies.iter_mut().filter(|b| !b.info.is_central) {
            body.mass = 1.0;
        }
    }

    /// Largest semi-major axis of any non-central body, used to size the scene.
    pub fn largest_semimajor_axis(&self) -> f64 {
        self.bodies()
            .filter(|b| !b.is_central())
            .filter_map(|b| b.semimajor_axis())
            .fold(0.0, f64::max)
    }

    /// Total momentum of every body, in kg m/s.
    pub fn total_momentum(&self) -> Vector3<f64> {
        self.bodies()
            .map(|b| b.velocity * b.mass)
            .fold(Vector3::zeros(), |acc, p| acc + p)
    }
}

impl Default for Orrery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::{OrbitalElements, J2000};
    use approx::assert_relative_eq;

    const SUN_MASS: f64 = 1.989e30;
    const EARTH_MASS: f64 = 5.97e24;
    const MOON_MASS: f64 = 7.35e22;
    const AU: f64 = 1.495_978_707e11;

    fn sun_earth_moon() -> (Orrery, BodyID, BodyID, BodyID) {
        let mut orrery = Orrery::new();
        let white = Point3::new(1.0, 1.0, 1.0);

        let sun = orrery.add_body(
            BodyInfo::new("sun", 7e8, white),
            SUN_MASS,
            None,
            BodyMotion::Free,
            Point3::origin(),
            Vector3::zeros(),
        );
        let earth_orbit = OrbitalElements::from_kepler(AU, 0.0, 0.0, 0.0, 0.0, 0.0, J2000);
        let earth = orrery.add_body(
            BodyInfo::new("earth", 6.4e6, white),
            EARTH_MASS,
            None,
            BodyMotion::fixed(earth_orbit, SUN_MASS, EARTH_MASS),
            Point3::origin(),
            Vector3::zeros(),
        );
        let moon_orbit = OrbitalElements::from_kepler(3.84e8, 0.0, 0.0, 0.0, 0.0, 0.0, J2000);
        let moon = orrery.add_body(
            BodyInfo::new("moon", 1.7e6, white),
            MOON_MASS,
            Some(earth),
            BodyMotion::fixed(moon_orbit, EARTH_MASS, MOON_MASS),
            Point3::origin(),
            Vector3::zeros(),
        );
        (orrery, sun, earth, moon)
    }

    #[test]
    fn test_heaviest_body_is_central() {
        let (mut orrery, sun, earth, moon) = sun_earth_moon();
        assert_eq!(orrery.choose_central_body(), Some(sun));
        assert!(orrery.central().is_central());
        assert!(orrery.is_orbiting(earth, sun));
        assert!(orrery.is_orbiting(moon, earth));
        assert!(!orrery.is_orbiting(moon, sun));
        assert_eq!(orrery.child_bodies(earth).count(), 1);
    }

    #[test]
    fn test_flagged_central_body_wins() {
        let (mut orrery, _, earth, _) = sun_earth_moon();
        orrery.get_body_mut(earth).info.is_central = true;
        assert_eq!(orrery.choose_central_body(), Some(earth));
        assert_eq!(orrery.bodies().filter(|b| b.is_central()).count(), 1);
    }

    #[test]
    fn test_children_are_positioned_relative_to_parents() {
        let (mut orrery, _, earth, moon) = sun_earth_moon();
        orrery.choose_central_body();
        orrery.set_positions_from_jd(J2000);

        assert_relative_eq!(
            orrery.get_body(moon).position,
            Point3::new(AU + 3.84e8, 0.0, 0.0),
            max_relative = 1e-12
        );
        assert_relative_eq!(
            orrery.relative_position(moon),
            Point3::new(3.84e8, 0.0, 0.0),
            max_relative = 1e-12
        );
        let moon_speed = orrery.relative_velocity(moon).norm();
        let earth_speed = orrery.get_body(earth).velocity.norm();
        assert!(moon_speed < earth_speed);
        assert_eq!(orrery.body_by_name("moon").map(|b| b.id), Some(moon));
    }

    #[test]
    fn test_flatten_masses_keeps_central() {
        let (mut orrery, sun, earth, _) = sun_earth_moon();
        orrery.choose_central_body();
        orrery.flatten_masses();
        assert_eq!(orrery.get_body(sun).mass, SUN_MASS);
        assert_eq!(orrery.get_body(earth).mass, 1.0);
        assert_relative_eq!(orrery.largest_semimajor_axis(), AU);
    }
}
