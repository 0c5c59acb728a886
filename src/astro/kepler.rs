use std::f64::consts::PI;

const MAX_ITERATIONS: usize = 100;

/// Wraps an angle into [-pi, pi).
fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// Solves Kepler's equation, M = E - e sin E, for the eccentric anomaly.
///
/// The root is always bracketed by [M - e, M + e], so we run Newton's method
/// and fall back to bisection whenever a step would leave the bracket.
#[allow(clippy::float_cmp)]
pub fn mean_to_eccentric(mean_anomaly: f64, e: f64) -> f64 {
    assert!(
        (0.0..1.0).contains(&e),
        "Can only solve Kepler's equation for elliptic orbits, e was {}",
        e
    );

    let m = wrap_angle(mean_anomaly);
    let kepler = |x: f64| (x - e * x.sin() - m, 1.0 - e * x.cos());

    let (mut lo, mut hi) = (m - e, m + e);
    let mut guess = if e < 0.8 { m } else { m.signum() * PI };
    guess = guess.clamp(lo, hi);

    for _ in 0..MAX_ITERATIONS {
        let (f, f_prime) = kepler(guess);
        if f == 0.0 {
            return guess;
        }

        // f is increasing in E, so the sign tells us which side the root is on
        if f < 0.0 {
            lo = guess;
        } else {
            hi = guess;
        }

        let newton = guess - f / f_prime;
        let next = if newton > lo && newton < hi {
            newton
        } else {
            0.5 * (lo + hi)
        };

        if (next - guess).abs() <= 1e-15 * next.abs().max(1.0) {
            return next;
        }
        guess = next;
    }

    guess
}
