//! Numeric helpers shared by the motion loops and the operator controls.
//!
//! Everything here is a pure function over `f64`. Angles are in degrees and
//! joystick values are percentages in `[-100, 100]`.

/// The rated maximum voltage of a V5 smart motor.
pub const MAX_VOLTAGE: f64 = 12.0;

/// Reduces an angle to the range `[-180, 180)`.
///
/// Used for signed heading error, so the sign of the result picks the
/// shortest turn direction.
///
/// ```
/// use chassis::util::normalize_signed;
///
/// assert_eq!(normalize_signed(190.0), -170.0);
/// assert_eq!(normalize_signed(180.0), -180.0);
/// ```
pub fn normalize_signed(angle: f64) -> f64 { wrap(angle + 180.0) - 180.0 }

/// Reduces an angle to the range `[0, 360)`.
///
/// ```
/// use chassis::util::normalize_unsigned;
///
/// assert_eq!(normalize_unsigned(-90.0), 270.0);
/// assert_eq!(normalize_unsigned(720.0), 0.0);
/// ```
pub fn normalize_unsigned(angle: f64) -> f64 { wrap(angle) }

// `rem_euclid` can round up to exactly 360 for tiny negative inputs.
fn wrap(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Clamps a value between a minimum and maximum value.
///
/// Unlike [`f64::clamp`] this never panics; with `min > max` the result
/// is `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Creates a dead zone for a joystick axis.
///
/// Returns zero while `|value| < width` and the untouched value otherwise.
/// The remaining range is not rescaled.
pub fn deadband(value: f64, width: f64) -> f64 {
    if value.abs() < width { 0.0 } else { value }
}

/// Shapes a joystick percentage for finer control near the center.
///
/// The curve is odd, monotonic and passes through `0` and `±100`. A `scale`
/// of zero is a straight line; larger scales flatten the response around
/// the center and steepen it near full deflection.
///
/// ```
/// use chassis::util::response_curve;
///
/// assert_eq!(response_curve(40.0, 0.0), 40.0);
/// assert!(response_curve(40.0, 10.0) < 40.0);
/// ```
pub fn response_curve(x: f64, scale: f64) -> f64 {
    let center = (-scale / 10.0).exp();
    let edge = ((x.abs() - 100.0) / 10.0).exp();
    (center + edge * (1.0 - center)) * x
}

/// Converts a joystick percentage to a motor voltage.
///
/// The mapping is linear and saturates at [`MAX_VOLTAGE`].
pub fn percent_to_voltage(percent: f64) -> f64 {
    clamp(percent * MAX_VOLTAGE / 100.0, -MAX_VOLTAGE, MAX_VOLTAGE)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const ANGLES: [f64; 12] = [
        -1080.5, -720.0, -360.0, -181.0, -180.0, -0.25, 0.0, 45.0, 179.999, 180.0, 359.9, 7200.3,
    ];

    #[test]
    fn signed_range_and_period() {
        for a in ANGLES {
            let n = normalize_signed(a);
            assert!((-180.0..180.0).contains(&n), "{a} -> {n}");
            assert_relative_eq!(normalize_signed(a + 360.0), n, epsilon = 1e-9);
        }
        assert_relative_eq!(normalize_signed(-190.0), 170.0);
        assert_relative_eq!(normalize_signed(-180.0), -180.0);
    }

    #[test]
    fn unsigned_range_and_idempotence() {
        for a in ANGLES {
            let n = normalize_unsigned(a);
            assert!((0.0..360.0).contains(&n), "{a} -> {n}");
            assert_eq!(normalize_unsigned(n), n);
        }
        assert_eq!(normalize_unsigned(-1e-20), 0.0);
    }

    #[test]
    fn clamp_bounds() {
        for v in [-20.0, -12.0, -3.5, 0.0, 11.9, 12.0, 40.0] {
            let c = clamp(v, -12.0, 12.0);
            assert!((-12.0..=12.0).contains(&c));
            assert_eq!(clamp(c, -12.0, 12.0), c);
        }
        assert_eq!(clamp(3.0, 3.0, 3.0), 3.0);
    }

    #[test]
    fn deadband_does_not_rescale() {
        assert_eq!(deadband(4.9, 5.0), 0.0);
        assert_eq!(deadband(-4.9, 5.0), 0.0);
        assert_eq!(deadband(5.0, 5.0), 5.0);
        assert_eq!(deadband(-37.0, 5.0), -37.0);
    }

    #[test]
    fn curve_shape() {
        for scale in [0.0, 5.0, 10.0, 25.0] {
            assert_eq!(response_curve(0.0, scale), 0.0);
            assert_relative_eq!(response_curve(100.0, scale), 100.0, epsilon = 1e-9);
            let mut last = f64::NEG_INFINITY;
            for step in -100..=100 {
                let x = step as f64;
                let y = response_curve(x, scale);
                assert!(y > last, "not increasing at {x} for scale {scale}");
                assert_relative_eq!(response_curve(-x, scale), -y, epsilon = 1e-12);
                last = y;
            }
        }
        for x in [-80.0, -3.0, 12.5, 99.0] {
            assert_relative_eq!(response_curve(x, 0.0), x, epsilon = 1e-12);
        }
        // More scale means a softer center.
        assert!(response_curve(20.0, 10.0) < response_curve(20.0, 5.0));
    }

    #[test]
    fn percent_voltage_mapping() {
        assert_eq!(percent_to_voltage(0.0), 0.0);
        assert_relative_eq!(percent_to_voltage(50.0), 6.0);
        assert_relative_eq!(percent_to_voltage(-100.0), -12.0);
        assert_relative_eq!(percent_to_voltage(250.0), 12.0);
        let mut last = f64::NEG_INFINITY;
        for p in -100..=100 {
            let v = percent_to_voltage(p as f64);
            assert!(v > last);
            assert_eq!(percent_to_voltage(-(p as f64)), -v);
            last = v;
        }
    }
}
