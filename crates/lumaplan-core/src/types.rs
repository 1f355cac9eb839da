//! Spatial types shared across crates

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// A point in the house's world space.
///
/// `x` and `y` are plan coordinates (`y` grows away from the viewer in the
/// plan), `elevation` is the height above the ground floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
    pub elevation: f64,
}

impl WorldPoint {
    pub const fn new(x: f64, y: f64, elevation: f64) -> Self {
        Self { x, y, elevation }
    }
}

/// A 2D point or vector, used for viewport percentages and pixel offsets
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f64> for Point2 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Div<f64> for Point2 {
    type Output = Self;
    fn div(self, scalar: f64) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_operations() {
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(4.0, 6.0);

        assert_eq!(a + b, Point2::new(5.0, 8.0));
        assert_eq!(b - a, Point2::new(3.0, 4.0));
        assert_eq!(a * 2.0, Point2::new(2.0, 4.0));
        assert_eq!(b / 2.0, Point2::new(2.0, 3.0));
        assert_eq!((b - a).length(), 5.0);
        assert_eq!(a.distance_squared(&b), 25.0);
    }

    #[test]
    fn test_normalized_zero_stays_zero() {
        assert_eq!(Point2::ZERO.normalized(), Point2::ZERO);
        let n = Point2::new(3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }
}
