//! Analytic orbital mechanics.
//!
//! The important pieces of this module are:
//! - [OrbitalElements], a classical Keplerian orbit which can be evaluated
//!   directly at any Julian date, with no integration involved.
//! - [ElementRates], secular drift of those elements, used by bodies whose
//!   orbits are perturbed and must be re-evaluated over time.

mod elements;
mod kepler;

pub use elements::{ElementRates, OrbitalElements};

// Newton's gravitational constant, in N m^2 / kg^2
pub const NEWTON_G: f64 = 6.6743015e-11;

/// Seconds in a day. Julian dates count days, the integrator counts seconds.
pub const DAY: f64 = 86400.0;

/// Days in a Julian century, the unit element rates are given in.
pub const CENTURY: f64 = 36525.0;

/// Julian date of the J2000 epoch.
pub const J2000: f64 = 2451545.0;

/// Meters in a kilometer. Scenario files are written in km.
pub const KM: f64 = 1000.0;

/// Standard gravitational parameter of a two-body system.
pub fn two_body_mu(primary_mass: f64, secondary_mass: f64) -> f64 {
    NEWTON_G * (primary_mass + secondary_mass)
}
