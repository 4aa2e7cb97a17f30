// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 matrices for the camera.
//!
//! The engine hands the renderer a view matrix and a projection matrix and
//! nothing else, so this covers only what those need: identity, product,
//! translation, a right-handed look-at, and an OpenGL-style perspective.

use core::ops::Mul;

use crate::math::{EPSILON, Xyz};

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one column, `[x, y, z, w]`, which is the layout GPU
/// uniform buffers expect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four columns.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// A pure translation.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Right-handed view matrix looking from `eye` toward `center`.
    ///
    /// When the view direction is parallel to `up` (a camera looking
    /// straight down with a +Z up vector) the +Y axis is used as `up`
    /// instead, so the matrix stays finite.
    #[must_use]
    pub fn look_at(eye: Xyz, center: Xyz, up: Xyz) -> Self {
        let f = (center - eye).normalize();
        let mut s = f.cross(up);
        if s.length() < EPSILON {
            s = f.cross(Xyz::new(0.0, 1.0, 0.0));
        }
        let s = s.normalize();
        let u = s.cross(f);
        Self::from_cols(
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0],
        )
    }

    /// Perspective projection onto clip space with depth in `[-1, 1]`.
    ///
    /// `fov_y` is the vertical field of view in radians.
    #[must_use]
    pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Self {
        let f = 1.0 / (0.5 * fov_y).tan();
        let range = near - far;
        Self::from_cols(
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (far + near) / range, -1.0],
            [0.0, 0.0, 2.0 * far * near / range, 0.0],
        )
    }

    /// Applies the transform to a point, dividing by `w` when it is
    /// non-zero.
    #[must_use]
    pub fn transform_point(&self, p: Xyz) -> Xyz {
        let c = &self.cols;
        let row = |i: usize| c[0][i] * p.x + c[1][i] * p.y + c[2][i] * p.z + c[3][i];
        let w = row(3);
        let (x, y, z) = (row(0), row(1), row(2));
        if w.abs() > f64::EPSILON {
            Xyz::new(x / w, y / w, z / w)
        } else {
            Xyz::new(x, y, z)
        }
    }

    /// Is every entry finite?
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Xyz, b: Xyz) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn translation_composes() {
        let c = Transform3d::from_translation(1.0, 0.0, 0.0)
            * Transform3d::from_translation(0.0, 2.0, 0.0);
        assert_eq!(c.col(3), [1.0, 2.0, 0.0, 1.0], "translations add");
        assert_eq!(Transform3d::IDENTITY * c, c, "identity is neutral");
    }

    #[test]
    fn look_at_puts_the_target_on_negative_z() {
        let eye = Xyz::new(100.0, 50.0, 30.0);
        let target = Xyz::new(10.0, -20.0, 0.0);
        let view = Transform3d::look_at(eye, target, Xyz::new(0.0, 0.0, 1.0));
        let dist = (target - eye).length();
        assert!(close(view.transform_point(eye), Xyz::ZERO), "eye maps to origin");
        assert!(
            close(view.transform_point(target), Xyz::new(0.0, 0.0, -dist)),
            "target lies straight ahead"
        );
    }

    #[test]
    fn look_at_straight_down_stays_finite() {
        let view = Transform3d::look_at(
            Xyz::new(0.0, 0.0, 500.0),
            Xyz::ZERO,
            Xyz::new(0.0, 0.0, 1.0),
        );
        assert!(view.is_finite(), "fallback up vector");
        assert!(
            close(view.transform_point(Xyz::ZERO), Xyz::new(0.0, 0.0, -500.0)),
            "target lies straight ahead"
        );
    }

    #[test]
    fn perspective_maps_clip_planes_to_depth_bounds() {
        let p = Transform3d::perspective(core::f64::consts::FRAC_PI_2, 1.0, 1.0, 100.0);
        let near = p.transform_point(Xyz::new(0.0, 0.0, -1.0));
        let far = p.transform_point(Xyz::new(0.0, 0.0, -100.0));
        assert!((near.z + 1.0).abs() < 1e-9, "near plane at -1");
        assert!((far.z - 1.0).abs() < 1e-9, "far plane at +1");
    }
}
