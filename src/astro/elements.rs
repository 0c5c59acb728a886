use std::f64::consts::PI;

use nalgebra::{Point3, Rotation3, Vector3};

use super::kepler::mean_to_eccentric;
use super::{CENTURY, DAY};

/// A classical set of Keplerian elements, referenced to an epoch.
///
/// Distances are in meters, angles in radians, and the epoch is a Julian date.
/// Only elliptic orbits are supported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// Semi-major axis
    pub a: f64,
    /// Eccentricity
    pub e: f64,
    /// Inclination
    pub i: f64,
    /// Longitude of the ascending node
    pub node: f64,
    /// Argument of periapsis
    pub peri: f64,
    /// Mean anomaly at the epoch
    pub mean_anomaly: f64,
    /// Julian date at which `mean_anomaly` holds
    pub epoch: f64,
}

/// Secular drift of each element, per Julian century.
///
/// The mean anomaly rate is a correction on top of the mean motion implied by
/// the semi-major axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementRates {
    pub a: f64,
    pub e: f64,
    pub i: f64,
    pub node: f64,
    pub peri: f64,
    pub mean_anomaly: f64,
}

impl OrbitalElements {
    pub fn from_kepler(
        a: f64,
        e: f64,
        i: f64,
        node: f64,
        peri: f64,
        mean_anomaly: f64,
        epoch: f64,
    ) -> Self {
        assert!(
            a > 0.0 && (0.0..1.0).contains(&e),
            "Currently can only evaluate elliptic orbits, got a = {}, e = {}",
            a,
            e
        );
        OrbitalElements {
            a,
            e,
            i,
            node,
            peri,
            mean_anomaly,
            epoch,
        }
    }

    /// Radians per second.
    pub fn mean_motion(&self, mu: f64) -> f64 {
        (mu / self.a.powi(3)).sqrt()
    }

    /// Seconds.
    pub fn period(&self, mu: f64) -> f64 {
        2.0 * PI / self.mean_motion(mu)
    }

    /// Moves the xy plane to the orbital plane, and x to point towards
    /// periapsis.
    pub fn rotation(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(&Vector3::z_axis(), self.node)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.i)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.peri)
    }

    pub fn mean_anomaly_at(&self, jd: f64, mu: f64) -> f64 {
        self.mean_anomaly + self.mean_motion(mu) * (jd - self.epoch) * DAY
    }

    /// Position and velocity relative to the primary at the given date.
    pub fn state_at(&self, jd: f64, mu: f64) -> (Point3<f64>, Vector3<f64>) {
        let ecc_anomaly = mean_to_eccentric(self.mean_anomaly_at(jd, mu), self.e);
        self.state_at_eccentric_anomaly(ecc_anomaly, mu)
    }

    pub fn position_at(&self, jd: f64, mu: f64) -> Point3<f64> {
        self.state_at(jd, mu).0
    }

    /// Position `seconds` after the given date. Short offsets stay precise
    /// even though the date itself is a large number.
    pub fn position_after(&self, jd: f64, seconds: f64, mu: f64) -> Point3<f64> {
        let mean_anomaly = self.mean_anomaly_at(jd, mu) + self.mean_motion(mu) * seconds;
        let ecc_anomaly = mean_to_eccentric(mean_anomaly, self.e);
        self.state_at_eccentric_anomaly(ecc_anomaly, mu).0
    }

    fn state_at_eccentric_anomaly(&self, ecc_anomaly: f64, mu: f64) -> (Point3<f64>, Vector3<f64>) {
        let (sin_e, cos_e) = ecc_anomaly.sin_cos();
        let beta = (1.0 - self.e * self.e).sqrt();
        let r = self.a * (1.0 - self.e * cos_e);

        // Evaluated in the orbit's natural frame (z normal, x periapsis)
        let position = Vector3::new(self.a * (cos_e - self.e), self.a * beta * sin_e, 0.0);
        let speed_factor = (mu * self.a).sqrt() / r;
        let velocity = Vector3::new(-sin_e, beta * cos_e, 0.0) * speed_factor;

        let rotation = self.rotation();
        (Point3::from(rotation * position), rotation * velocity)
    }

    /// Samples one full revolution, starting at the given date, into
    /// `num_segments` equal time steps. Returns `num_segments + 1` points, so
    /// the last one closes the loop.
    pub fn sample_revolution(
        &self,
        start_jd: f64,
        mu: f64,
        num_segments: usize,
    ) -> impl Iterator<Item = Point3<f64>> + '_ {
        path_iter_parametric(
            move |seconds| self.position_after(start_jd, seconds, mu),
            0.0,
            self.period(mu),
            num_segments,
        )
    }
}

impl ElementRates {
    /// The elements as they have drifted by the given date.
    pub fn apply(&self, base: &OrbitalElements, jd: f64) -> OrbitalElements {
        let centuries = (jd - base.epoch) / CENTURY;
        OrbitalElements {
            a: base.a + self.a * centuries,
            e: (base.e + self.e * centuries).clamp(0.0, 0.999_999),
            i: base.i + self.i * centuries,
            node: base.node + self.node * centuries,
            peri: base.peri + self.peri * centuries,
            mean_anomaly: base.mean_anomaly + self.mean_anomaly * centuries,
            epoch: base.epoch,
        }
    }
}

pub fn path_iter_parametric<F>(
    f: F,
    t_start: f64,
    t_end: f64,
    num_segments: usize,
) -> impl Iterator<Item = Point3<f64>>
where
    F: Fn(f64) -> Point3<f64>,
{
    assert!(
        num_segments >= 1,
        "Must have at least one segment, num_segments was {}",
        num_segments
    );
    (0..=num_segments)
        .map(move |i| i as f64 / num_segments as f64)
        // u ranges from 0 to 1 (inclusive)
        .map(move |u| t_start + u * (t_end - t_start))
        .map(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::{two_body_mu, J2000};
    use approx::assert_relative_eq;

    const SUN_MASS: f64 = 1.989e30;
    const AU: f64 = 1.495_978_707e11;

    fn earth_like(e: f64) -> OrbitalElements {
        OrbitalElements::from_kepler(AU, e, 0.0, 0.0, 0.0, 0.0, J2000)
    }

    #[test]
    fn test_periapsis_at_epoch() {
        let mu = two_body_mu(SUN_MASS, 0.0);
        let orbit = earth_like(0.3);
        let (position, velocity) = orbit.state_at(J2000, mu);

        assert_relative_eq!(position, Point3::new(0.7 * AU, 0.0, 0.0), epsilon = 1e-3);
        // Vis-viva at periapsis
        let expected_speed = (mu * (2.0 / (0.7 * AU) - 1.0 / AU)).sqrt();
        assert_relative_eq!(velocity.norm(), expected_speed, max_relative = 1e-12);
        assert_relative_eq!(velocity.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_one_period_returns_to_start() {
        let mu = two_body_mu(SUN_MASS, 5.97e24);
        let orbit = OrbitalElements::from_kepler(
            AU,
            0.2,
            0.3,
            1.1,
            2.0,
            0.5,
            J2000,
        );
        let period_days = orbit.period(mu) / DAY;

        let start = orbit.position_at(J2000 + 10.0, mu);
        let end = orbit.position_at(J2000 + 10.0 + period_days, mu);
        assert_relative_eq!(start, end, max_relative = 1e-8);
    }

    #[test]
    fn test_rotation_puts_periapsis_in_place() {
        let orbit = OrbitalElements::from_kepler(
            1.0,
            0.0,
            0.0,
            (30.0_f64).to_radians(),
            (60.0_f64).to_radians(),
            0.0,
            J2000,
        );
        // node + peri = 90 degrees in the plane, so periapsis is along y
        assert_relative_eq!(orbit.rotation() * Vector3::x(), Vector3::y(), epsilon = 1e-15);
    }

    #[test]
    fn test_sample_revolution_closes() {
        let mu = two_body_mu(SUN_MASS, 0.0);
        let orbit = earth_like(0.1);
        let points: Vec<_> = orbit.sample_revolution(J2000, mu, 360).collect();

        assert_eq!(points.len(), 361);
        assert_relative_eq!(points[0], orbit.position_at(J2000, mu), epsilon = 1e-9 * AU);
        assert_relative_eq!(points[0], points[360], epsilon = 1e-9 * AU);

        // Also from a date away from the epoch
        let start = J2000 + 1234.5;
        let points: Vec<_> = orbit.sample_revolution(start, mu, 360).collect();
        assert_relative_eq!(points[0], orbit.position_at(start, mu), epsilon = 1e-9 * AU);
        assert_relative_eq!(points[0], points[360], epsilon = 1e-9 * AU);
        assert_relative_eq!(
            points[180],
            orbit.position_at(start + orbit.period(mu) / DAY / 2.0, mu),
            epsilon = 1e-6 * AU
        );
    }

    #[test]
    fn test_rates_drift_elements() {
        let base = earth_like(0.1);
        let rates = ElementRates {
            e: 0.01,
            node: 0.5,
            ..Default::default()
        };
        let drifted = rates.apply(&base, J2000 + 2.0 * CENTURY);
        assert_relative_eq!(drifted.e, 0.12, max_relative = 1e-12);
        assert_relative_eq!(drifted.node, 1.0, max_relative = 1e-12);
        assert_eq!(drifted.epoch, base.epoch);
        assert_eq!(rates.apply(&base, J2000), base);
    }
}
