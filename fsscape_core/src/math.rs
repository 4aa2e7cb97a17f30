// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared numeric constants and small 3D vector types.
//!
//! Planar quantities (disc positions, treemap corners) use [`kurbo::Point`]
//! and [`kurbo::Vec2`]. The two 3D forms used by the camera are
//! Cartesian [`Xyz`] and cylindrical [`Rtz`] (radius, angle in degrees,
//! height).

use core::ops::{Add, Mul, Sub};

/// The golden ratio. Used as a framing proportion throughout the camera code.
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Square root of two.
pub const SQRT_2: f64 = core::f64::consts::SQRT_2;

/// Tolerance used for collapsed/expanded tests and degenerate-size guards.
pub const EPSILON: f64 = 1e-6;

/// Converts radians to degrees.
#[inline]
#[must_use]
pub fn deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Converts degrees to radians.
#[inline]
#[must_use]
pub fn rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Linear interpolation between `a` and `b`.
#[inline]
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Distance at which an object of the given diameter fills the field of view.
#[inline]
#[must_use]
pub fn field_distance(fov: f64, diameter: f64) -> f64 {
    diameter * (0.5 / rad(0.5 * fov).tan())
}

/// Diameter of the field of view at the given distance.
#[inline]
#[must_use]
pub fn field_diameter(fov: f64, distance: f64) -> f64 {
    2.0 * distance * rad(0.5 * fov).tan()
}

/// A Cartesian 3D vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Xyz {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Xyz {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a vector from components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Length of the XY projection.
    #[inline]
    #[must_use]
    pub fn planar_length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Cross product.
    #[inline]
    #[must_use]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Returns the unit vector in the same direction, or zero for a zero
    /// vector.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 { self * (1.0 / len) } else { Self::ZERO }
    }

    /// Converts to cylindrical coordinates.
    #[must_use]
    pub fn to_rtz(self) -> Rtz {
        Rtz {
            r: self.planar_length(),
            theta: deg(self.y.atan2(self.x)),
            z: self.z,
        }
    }
}

impl Add for Xyz {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Xyz {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Xyz {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// A cylindrical 3D vector: radius, angle in degrees, height.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rtz {
    /// Radial distance from the Z axis.
    pub r: f64,
    /// Angle in degrees, counter-clockwise from +X.
    pub theta: f64,
    /// Height.
    pub z: f64,
}

impl Rtz {
    /// Creates a vector from components.
    #[inline]
    #[must_use]
    pub const fn new(r: f64, theta: f64, z: f64) -> Self {
        Self { r, theta, z }
    }

    /// Converts to Cartesian coordinates.
    #[must_use]
    pub fn to_xyz(self) -> Xyz {
        let (sin, cos) = rad(self.theta).sin_cos();
        Xyz::new(self.r * cos, self.r * sin, self.z)
    }

    /// Euclidean distance between two cylindrical points.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.to_xyz() - other.to_xyz()).length()
    }
}
