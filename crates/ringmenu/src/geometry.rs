use std::f64::consts::{PI, TAU};

/// A point in menu space. Menu space is y-up: angles grow counter-clockwise
/// from the positive x axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    /// Point at `radius` and `angle` around `self`.
    pub fn orbit(self, radius: f64, angle: f64) -> Point {
        Point::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    pub radius: f64,
    /// Normalized to `[0, 2π)`.
    pub angle: f64,
}

impl Polar {
    /// Polar coordinates of `offset`, measured from the origin. Non-finite input yields `None`.
    pub fn from_offset(offset: Point) -> Option<Self> {
        if !offset.is_finite() {
            return None;
        }
        Some(Self {
            radius: offset.x.hypot(offset.y),
            angle: normalize_angle(offset.y.atan2(offset.x)),
        })
    }
}

pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if a >= TAU { 0.0 } else { a }
}

/// Shortest-arc distance between two angles, in `[0, π]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    ((a - b + PI).rem_euclid(TAU) - PI).abs()
}
