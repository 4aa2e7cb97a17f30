// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node geometry records, one per visualization mode.
//!
//! Every node carries all three records. Only the one belonging to the active
//! mode is meaningful; the others keep whatever the last layout of their mode
//! left behind.

use kurbo::Point;

/// Disc layout record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiscGeom {
    /// Disc radius.
    pub radius: f64,
    /// Angle (degrees) of the node around its parent.
    pub theta: f64,
    /// Center, relative to the parent's center.
    pub pos: Point,
}

/// Treemap layout record.
///
/// Corners are absolute. `c0` is the low corner and `c1` the high corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapGeom {
    /// Low corner.
    pub c0: Point,
    /// High corner.
    pub c1: Point,
    /// Block height.
    pub height: f64,
}

impl MapGeom {
    /// Width along X.
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.c1.x - self.c0.x
    }

    /// Depth along Y.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.c1.y - self.c0.y
    }

    /// Center of the footprint.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        self.c0.midpoint(self.c1)
    }
}

/// Radial-tree record for a node drawn as a leaf on its parent's platform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreeLeafGeom {
    /// Radial distance from the parent platform's inner edge.
    pub distance: f64,
    /// Angle (degrees) relative to the parent platform.
    pub theta: f64,
    /// Height of the leaf block.
    pub height: f64,
}

/// Radial-tree record for an expanded directory's platform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreePlatformGeom {
    /// Angle (degrees) relative to the parent platform.
    pub theta: f64,
    /// Radial depth of the platform.
    pub depth: f64,
    /// Angular span (degrees) of the platform itself.
    pub arc_width: f64,
    /// Height of the platform slab.
    pub height: f64,
    /// Angular span (degrees) of all child platforms, weighted by deployment.
    pub subtree_arc_width: f64,
}

/// Radial-tree layout record.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TreeGeom {
    /// Leaf placement.
    pub leaf: TreeLeafGeom,
    /// Platform placement.
    pub platform: TreePlatformGeom,
}
