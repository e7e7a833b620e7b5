//! Wheel power mixing calculations

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::FRAC_PI_4;
use super::NUM_MOTORS;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the wheel powers for the given course, velocity and rotation.
///
/// Powers are returned in the order front-left, front-right, back-left,
/// back-right. The course is the direction of travel in radians,
/// counter-clockwise from the robot's forward axis, and positive rotation is
/// counter-clockwise.
///
/// If any power would exceed a magnitude of 1 all powers are scaled down by
/// the largest magnitude, preserving the ratio between wheels.
pub fn calc_wheel_powers(course_rad: f64, velocity: f64, rotation: f64) -> [f64; NUM_MOTORS] {
    let diag_a = velocity * (course_rad + FRAC_PI_4).cos();
    let diag_b = velocity * (course_rad + FRAC_PI_4).sin();

    let mut powers = [
        diag_a - rotation,
        diag_b + rotation,
        diag_b - rotation,
        diag_a + rotation
    ];

    let max = powers.iter().fold(0f64, |m, p| m.max(p.abs()));
    if max > 1f64 {
        for p in powers.iter_mut() {
            *p /= max;
        }
    }

    powers
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    fn assert_powers(actual: [f64; NUM_MOTORS], expected: [f64; NUM_MOTORS]) {
        for i in 0..NUM_MOTORS {
            assert!(
                (actual[i] - expected[i]).abs() < 1e-9,
                "Power {} mismatch: {:?} != {:?}", i, actual, expected
            );
        }
    }

    #[test]
    fn test_forward() {
        let v = FRAC_1_SQRT_2;
        assert_powers(calc_wheel_powers(0.0, 1.0, 0.0), [v, v, v, v]);
    }

    #[test]
    fn test_strafe_left() {
        // Left strafe: front-left and back-right reverse
        let v = FRAC_1_SQRT_2;
        assert_powers(calc_wheel_powers(FRAC_PI_2, 1.0, 0.0), [-v, v, v, -v]);
    }

    #[test]
    fn test_rotate_only() {
        assert_powers(calc_wheel_powers(0.3, 0.0, 0.5), [-0.5, 0.5, -0.5, 0.5]);
    }

    #[test]
    fn test_normalisation() {
        let powers = calc_wheel_powers(0.0, 1.0, 1.0);
        let max = powers.iter().fold(0f64, |m, p| m.max(p.abs()));
        assert!((max - 1.0).abs() < 1e-12);

        // Ratio between wheels is preserved
        let raw_fl = FRAC_1_SQRT_2 - 1.0;
        let raw_fr = FRAC_1_SQRT_2 + 1.0;
        assert!((powers[0] / powers[1] - raw_fl / raw_fr).abs() < 1e-9);
    }
}
