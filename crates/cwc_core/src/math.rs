//! Vector and angle utilities for the kinematic model.
//!
//! Positions are in metres on the pitch plane. Directions are in degrees,
//! with 0° pointing along +x and angles increasing toward +y. Every
//! comparison goes through [`approx_equal`] so that players settle on their
//! destination instead of oscillating around it.

use serde::{Deserialize, Serialize};

/// Tolerance used for all position and angle comparisons.
pub const EPSILON: f64 = 1e-6;

/// Returns true if `a` and `b` differ by less than [`EPSILON`].
#[must_use]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Wraps an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed rotation in degrees that takes `from` to `to` the short way round.
///
/// The result lies in `(-180, +180]`. An exact half turn resolves to `+180`,
/// i.e. toward increasing angle.
#[must_use]
pub fn signed_angle_delta(from: f64, to: f64) -> f64 {
    let mut delta = normalize_degrees(to) - normalize_degrees(from);
    if delta > 180.0 {
        delta -= 360.0;
    }
    if delta <= -180.0 {
        delta += 360.0;
    }
    delta
}

/// Wrap-aware angle comparison (359.9999999° equals 0°).
#[must_use]
pub fn angles_approx_equal(a: f64, b: f64) -> bool {
    signed_angle_delta(a, b).abs() < EPSILON
}

/// 2D vector / point on the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate (along the length of the pitch).
    pub x: f64,
    /// Y coordinate (across the pitch).
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Component-wise comparison within [`EPSILON`].
    #[must_use]
    pub fn approx_equal(self, other: Self) -> bool {
        approx_equal(self.x, other.x) && approx_equal(self.y, other.y)
    }

    /// Vector from `self` to `other`.
    #[must_use]
    pub fn vector_to(self, other: Self) -> Self {
        other - self
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        self.vector_to(other).length()
    }

    /// Multiply both components by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Bearing in degrees from `self` toward `other`, in `[0, 360)`.
    ///
    /// Returns 0 when the two points coincide.
    #[must_use]
    pub fn bearing_to(self, other: Self) -> f64 {
        let v = self.vector_to(other);
        normalize_degrees(v.y.atan2(v.x).to_degrees())
    }

    /// True if both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees_wraps() {
        assert!(approx_equal(normalize_degrees(370.0), 10.0));
        assert!(approx_equal(normalize_degrees(-10.0), 350.0));
        assert!(approx_equal(normalize_degrees(720.0), 0.0));
        assert!(normalize_degrees(-1e-18) < 360.0);
    }

    #[test]
    fn test_signed_delta_takes_short_way() {
        // 10 -> 350 is a 20 degree turn through zero, not 340 the other way
        assert!(approx_equal(signed_angle_delta(10.0, 350.0), -20.0));
        assert!(approx_equal(signed_angle_delta(350.0, 10.0), 20.0));
        assert!(approx_equal(signed_angle_delta(90.0, 45.0), -45.0));
    }

    #[test]
    fn test_half_turn_resolves_positive() {
        assert!(approx_equal(signed_angle_delta(0.0, 180.0), 180.0));
        assert!(approx_equal(signed_angle_delta(180.0, 0.0), 180.0));
        assert!(approx_equal(signed_angle_delta(270.0, 90.0), 180.0));
    }

    #[test]
    fn test_angles_compare_across_wrap() {
        assert!(angles_approx_equal(359.999_999_9, 0.0));
        assert!(!angles_approx_equal(359.0, 0.0));
    }

    #[test]
    fn test_vec2_distance() {
        let a = Vec2::new(3.0, 0.0);
        let b = Vec2::new(0.0, 4.0);
        assert!(approx_equal(a.distance_to(b), 5.0));
    }

    #[test]
    fn test_bearing() {
        let origin = Vec2::ZERO;
        assert!(approx_equal(origin.bearing_to(Vec2::new(10.0, 0.0)), 0.0));
        assert!(approx_equal(origin.bearing_to(Vec2::new(0.0, 10.0)), 90.0));
        assert!(approx_equal(origin.bearing_to(Vec2::new(-10.0, 0.0)), 180.0));
        assert!(approx_equal(origin.bearing_to(Vec2::new(0.0, -10.0)), 270.0));
    }
}
