// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radial disc layout.
//!
//! Every node is a disc whose area equals its size. A directory's children
//! are spread around it on stems, largest first, alternating between the two
//! ends of the free angular range so that the range fills from both sides.
//! When the children do not fit in the range, every other child is pushed
//! outward by its own diameter.

use alloc::vec::Vec;
use core::f64::consts::PI;

use kurbo::Point;

use crate::animation::{Animator, MorphKey};
use crate::math::{deg, rad};
use crate::tree::{FsTree, NodeId, NodeKind};

/// Tunables for the disc layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscVConfig {
    /// Angular range (degrees) the children of a directory share.
    pub leaf_range_arc_width: f64,
    /// Stem length as a proportion of the child's radius.
    pub leaf_stem_proportion: f64,
    /// Sizes below this are rounded up before computing disc areas.
    pub min_size: u64,
}

impl DiscVConfig {
    /// The standard disc layout.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            leaf_range_arc_width: 315.0,
            leaf_stem_proportion: 0.5,
            min_size: 64,
        }
    }
}

impl Default for DiscVConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Lays out the whole tree.
///
/// The metanode sits at the origin with zero radius; the root directory is
/// placed on a stem pointing down (270°) and the metanode is then offset so
/// that the root disc's center is framed.
pub fn init(tree: &mut FsTree, animator: &mut Animator, config: &DiscVConfig) {
    let Some(root) = tree.root_dir() else {
        return;
    };
    let meta = tree.metanode();
    {
        let g = tree.discv_mut(meta);
        g.radius = 0.0;
        g.theta = 0.0;
    }
    init_recursive(tree, animator, config, meta, 270.0);
    let root_radius = tree.discv(root).radius;
    tree.discv_mut(meta).pos = Point::new(0.0, -root_radius);
}

/// Lays out the children of `dnode` around a stem at `stem_theta` degrees.
///
/// Directories have their deployment reset from their `expanded` flag and
/// any running deployment morph cancelled.
pub fn init_recursive(
    tree: &mut FsTree,
    animator: &mut Animator,
    config: &DiscVConfig,
    dnode: NodeId,
    stem_theta: f64,
) {
    if tree.kind(dnode) == NodeKind::Directory {
        animator.morph_break(MorphKey::Deployment(dnode));
        let expanded = tree.flags(dnode).expanded;
        tree.set_deployment(dnode, if expanded { 1.0 } else { 0.0 });
        tree.mark_rebuild(dnode);
    }

    let dir_radius = tree.discv(dnode).radius;
    let mut placed: Vec<Placement> = Vec::new();
    let mut total_arc = 0.0;
    for child in tree.children(dnode) {
        let mut size = tree.size(child).max(config.min_size);
        if tree.is_dir(child) {
            size += tree.subtree(child).size;
        }
        let radius = (size as f64 / PI).sqrt();
        let dist = dir_radius + radius * (1.0 + config.leaf_stem_proportion);
        let arc = 2.0 * deg((radius / dist).asin());
        total_arc += arc;
        placed.push(Placement {
            node: child,
            total_size: tree.total_size(child),
            radius,
            dist,
            arc,
        });
    }
    if placed.is_empty() {
        return;
    }

    placed.sort_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then_with(|| tree.name(a.node).cmp(tree.name(b.node)))
    });

    let k = config.leaf_range_arc_width / total_arc;
    let stagger = k <= 1.0;

    let mut theta0 = stem_theta - 180.0;
    let mut theta1 = stem_theta + 180.0;
    let mut even = true;
    let mut out = true;
    for (i, p) in placed.iter().enumerate() {
        let arc = k * p.arc;
        let mut dist = p.dist;
        if stagger && out {
            dist += 2.0 * p.radius;
        }

        let theta;
        if i == 0 {
            theta = theta0;
            theta0 += 0.5 * arc;
            theta1 -= 0.5 * arc;
            out = !out;
        } else if even {
            theta = theta0 + 0.5 * arc;
            theta0 += arc;
            out = !out;
        } else {
            theta = theta1 - 0.5 * arc;
            theta1 -= arc;
        }

        let (sin, cos) = rad(theta).sin_cos();
        let g = tree.discv_mut(p.node);
        g.radius = p.radius;
        g.theta = theta;
        g.pos = Point::new(dist * cos, dist * sin);

        if tree.is_dir(p.node) {
            init_recursive(tree, animator, config, p.node, theta + 180.0);
        }
        even = !even;
    }
}

/// Absolute position of a node's center: the sum of relative positions up
/// to and including the metanode.
#[must_use]
pub fn node_pos(tree: &FsTree, node: NodeId) -> Point {
    let mut pos = tree.discv(node).pos;
    for a in tree.ancestors(node) {
        pos += tree.discv(a).pos.to_vec2();
    }
    pos
}

#[derive(Clone, Copy, Debug)]
struct Placement {
    node: NodeId,
    total_size: u64,
    radius: f64,
    dist: f64,
    arc: f64,
}
