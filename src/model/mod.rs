//! The simulated bodies, and everything that moves them.
//!
//! An [Orrery] owns the bodies. A [Ticker] decides how far they move each
//! frame, either by re-evaluating their orbits or by handing substeps to an
//! [Integrator]. [Simulation] ties these together with the play/pause
//! lifecycle.

pub mod barycenter;
pub mod body;
pub mod integrator;
pub mod orrery;
pub mod simulation;
pub mod ticker;

pub use barycenter::{set_barycenter, BarycenterFrame};
pub use body::{Anchor, Body, BodyID, BodyInfo, BodyMotion, ORBIT_SEGMENTS};
pub use integrator::{Integrator, VerletIntegrator};
pub use orrery::Orrery;
pub use simulation::{FrameOutcome, Simulation, SimulationSettings};
pub use ticker::{TickRates, Ticker};
