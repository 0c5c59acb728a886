use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use crate::astro::{two_body_mu, ElementRates, OrbitalElements, DAY, J2000};

/// Number of segments used to sample a full orbit for display.
pub const ORBIT_SEGMENTS: usize = 360;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct BodyID(pub usize);

// All the immutable info about a body
#[derive(Debug, Clone)]
pub struct BodyInfo {
    pub name: String,
    /// Meters
    pub radius: f64,
    pub color: Point3<f32>,
    pub trace_color: Option<Point3<f32>>,
    pub is_central: bool,
    /// A still body is never moved by the barycentric correction.
    pub is_still: bool,
    /// Seconds per full turn around the body's own axis
    pub sidereal_day: Option<f64>,
    pub show_solid_orbit: bool,
    pub force_trace: bool,
    /// Body whose frame this body's trace is drawn in, if not its parent's
    pub trace_relative_to: Option<BodyID>,
}

impl BodyInfo {
    pub fn new(name: &str, radius: f64, color: Point3<f32>) -> Self {
        BodyInfo {
            name: name.to_owned(),
            radius,
            color,
            trace_color: None,
            is_central: false,
            is_still: false,
            sidereal_day: None,
            show_solid_orbit: false,
            force_trace: false,
            trace_relative_to: None,
        }
    }
}

/// How a body's position can be evaluated without integrating.
#[derive(Debug, Clone)]
pub enum BodyMotion {
    /// No analytic orbit. The body keeps the state it was created with, and
    /// only moves under physics.
    Free,
    /// Keplerian elements that never change.
    FixedElements { elements: OrbitalElements, mu: f64 },
    /// Elements that drift over time, so the orbit has to be re-evaluated to
    /// know where the body will be.
    ReevaluableElements {
        elements: OrbitalElements,
        rates: ElementRates,
        mu: f64,
    },
}

impl BodyMotion {
    pub fn fixed(elements: OrbitalElements, primary_mass: f64, own_mass: f64) -> Self {
        BodyMotion::FixedElements {
            elements,
            mu: two_body_mu(primary_mass, own_mass),
        }
    }

    pub fn reevaluable(
        elements: OrbitalElements,
        rates: ElementRates,
        primary_mass: f64,
        own_mass: f64,
    ) -> Self {
        BodyMotion::ReevaluableElements {
            elements,
            rates,
            mu: two_body_mu(primary_mass, own_mass),
        }
    }

    /// The elements in effect at the given date, along with the gravitational
    /// parameter they should be evaluated with.
    pub fn elements_at(&self, jd: f64) -> Option<(OrbitalElements, f64)> {
        match self {
            BodyMotion::Free => None,
            BodyMotion::FixedElements { elements, mu } => Some((*elements, *mu)),
            BodyMotion::ReevaluableElements {
                elements,
                rates,
                mu,
            } => Some((rates.apply(elements, jd), *mu)),
        }
    }

    pub fn is_reevaluable(&self) -> bool {
        matches!(self, BodyMotion::ReevaluableElements { .. })
    }
}

/// The state of whatever a body's orbit is measured from.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub position: Point3<f64>,
    pub velocity: Vector3<f64>,
}

impl Anchor {
    pub fn origin() -> Self {
        Anchor {
            position: Point3::origin(),
            velocity: Vector3::zeros(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyID,
    pub info: BodyInfo,
    pub mass: f64,
    /// The body this one's orbit is expressed relative to. `None` means the
    /// orbit is around the central body, in the root frame.
    pub parent: Option<BodyID>,
    pub motion: BodyMotion,
    /// Absolute position, in meters
    pub position: Point3<f64>,
    /// Absolute velocity, in m/s
    pub velocity: Vector3<f64>,
    initial_position: Point3<f64>,
    initial_velocity: Vector3<f64>,
    // Date of the last analytic positioning, plus physics time since
    positioned_jd: f64,
    seconds_since_positioned: f64,
    rotation: f64,
}

impl Body {
    pub fn new(
        id: BodyID,
        info: BodyInfo,
        mass: f64,
        parent: Option<BodyID>,
        motion: BodyMotion,
        position: Point3<f64>,
        velocity: Vector3<f64>,
    ) -> Self {
        Body {
            id,
            info,
            mass,
            parent,
            motion,
            position,
            velocity,
            initial_position: position,
            initial_velocity: velocity,
            positioned_jd: J2000,
            seconds_since_positioned: 0.0,
            rotation: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn is_central(&self) -> bool {
        self.info.is_central
    }

    /// Date of the last analytic positioning, advanced by every tick since.
    pub fn current_jd(&self) -> f64 {
        self.positioned_jd + self.seconds_since_positioned / DAY
    }

    /// Current rotation around the body's own axis, in radians.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn add_to_velocity(&mut self, delta: &Vector3<f64>) {
        self.velocity += delta;
    }

    /// Orbital period in seconds, for bodies with an analytic orbit.
    pub fn period(&self) -> Option<f64> {
        self.motion
            .elements_at(self.current_jd())
            .map(|(elements, mu)| elements.period(mu))
    }

    pub fn semimajor_axis(&self) -> Option<f64> {
        self.motion
            .elements_at(self.current_jd())
            .map(|(elements, _)| elements.a)
    }

    /// Puts the body back where it was created.
    pub fn reset(&mut self) {
        self.position = self.initial_position;
        self.velocity = self.initial_velocity;
        self.rotation = 0.0;
    }

    /// Places the body on its analytic orbit at the given date. Bodies with no
    /// analytic orbit keep their state.
    pub fn set_position_from_jd(&mut self, jd: f64, anchor: &Anchor) {
        self.positioned_jd = jd;
        self.seconds_since_positioned = 0.0;
        if let Some((elements, mu)) = self.motion.elements_at(jd) {
            let (position, velocity) = elements.state_at(jd, mu);
            self.position = anchor.position + position.coords;
            self.velocity = anchor.velocity + velocity;
        }
    }

    /// Position relative to the body's primary at the given date, for bodies
    /// whose orbit has to be re-evaluated. Everything else returns `None`.
    pub fn calculate_position(&self, jd: f64) -> Option<Point3<f64>> {
        match &self.motion {
            BodyMotion::ReevaluableElements { .. } => self
                .motion
                .elements_at(jd)
                .map(|(elements, mu)| elements.position_at(jd, mu)),
            _ => None,
        }
    }

    /// Points along the body's orbit, relative to its primary.
    ///
    /// A solid orbit starts at the current position. A gradient orbit ends at
    /// it, so the last vertex is the most recent one.
    pub fn orbit_vertices(&self, jd: f64, solid: bool) -> Option<Vec<Point3<f64>>> {
        let (elements, mu) = self.motion.elements_at(jd)?;
        let start_jd = if solid {
            jd
        } else {
            jd - elements.period(mu) / DAY
        };
        Some(
            elements
                .sample_revolution(start_jd, mu, ORBIT_SEGMENTS)
                .collect(),
        )
    }

    /// Post-tick bookkeeping. Analytic steps recompute the rotation from the
    /// date, physics steps accumulate it.
    pub fn after_tick(&mut self, elapsed_seconds: f64, was_analytic_step: bool) {
        if !was_analytic_step {
            self.seconds_since_positioned += elapsed_seconds;
        }

        if let Some(sidereal_day) = self.info.sidereal_day {
            let turns = if was_analytic_step {
                (self.current_jd() - J2000) * DAY / sidereal_day
            } else {
                self.rotation / (2.0 * PI) + elapsed_seconds / sidereal_day
            };
            self.rotation = turns.rem_euclid(1.0) * 2.0 * PI;
        }
    }
}
