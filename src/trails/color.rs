use nalgebra::Point3;

/// Parses an `rrggbb` color, with or without a leading `#` or `0x`.
pub fn parse_hex(s: &str) -> Option<Point3<f32>> {
    let digits = s
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x");
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }

    let channel = |i: usize| -> Option<f32> {
        u8::from_str_radix(&digits[2 * i..2 * i + 2], 16)
            .ok()
            .map(|c| c as f32 / 255.0)
    };
    Some(Point3::new(channel(0)?, channel(1)?, channel(2)?))
}

/// Scales a color towards black. An amount of 0 leaves it alone, 1 makes it
/// black.
pub fn darken(color: &Point3<f32>, amount: f32) -> Point3<f32> {
    *color * (1.0 - amount.clamp(0.0, 1.0))
}

/// Per-vertex colors for a path of `n` vertices, fading from black at the
/// oldest vertex up to (almost) the base color at the newest.
pub fn gradient(base: &Point3<f32>, n: usize) -> impl Iterator<Item = Point3<f32>> + '_ {
    (0..n).map(move |i| darken(base, 1.0 - i as f32 / n as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("ff0000"), Some(Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(parse_hex("#00ff00"), Some(Point3::new(0.0, 1.0, 0.0)));
        assert_eq!(parse_hex("0x0000ff"), Some(Point3::new(0.0, 0.0, 1.0)));
        assert_eq!(parse_hex("fff"), None);
        assert_eq!(parse_hex("gg0000"), None);
    }

    #[test]
    fn test_gradient_ramp() {
        let base = Point3::new(1.0, 0.5, 0.0);
        let ramp: Vec<_> = gradient(&base, 4).collect();
        assert_eq!(ramp.len(), 4);
        assert_eq!(ramp[0], Point3::origin());
        assert_relative_eq!(ramp[2], Point3::new(0.5, 0.25, 0.0));
        assert_relative_eq!(darken(&base, 0.5), Point3::new(0.5, 0.25, 0.0));
    }
}
