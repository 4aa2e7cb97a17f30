// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Radial tree layout.
//!
//! Expanded directories are platforms: annular sectors at increasing radii
//! around a central core. A platform's depth and arc width come from the
//! number of leaves it must hold; its children's platforms are fanned out
//! symmetrically on the next ring, each weighted by its deployment, so that
//! collapsing a directory narrows the whole ring smoothly.
//!
//! When the root's fan exceeds [`TreeVConfig::max_arc_width`] the core grows
//! and everything is reshaped; when it falls below the minimum the core
//! shrinks again, down to [`TreeVConfig::min_core_radius`].

use alloc::vec::Vec;
use core::f64::consts::PI;

use crate::animation::{Animator, MorphKey};
use crate::dirty;
use crate::math::Rtz;
use crate::trace::{ArrangeEvent, CubicFallbackEvent, Tracer};
use crate::tree::{FsTree, NodeId};

/// Tunables for the radial tree layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeVConfig {
    /// Narrowest root fan (degrees) before the core shrinks.
    pub min_arc_width: f64,
    /// Widest root fan (degrees) before the core grows.
    pub max_arc_width: f64,
    /// Smallest core radius.
    pub min_core_radius: f64,
    /// Factor by which the core grows or shrinks per adjustment.
    pub core_grow_factor: f64,
    /// Height of a directory platform.
    pub platform_height: f64,
    /// Tangential spacing between neighbouring platforms.
    pub platform_spacing_width: f64,
    /// Radial spacing between rings of platforms.
    pub platform_spacing_depth: f64,
    /// Scale applied to leaf heights.
    pub leaf_height_multiplier: f64,
    /// Side of a leaf's square footprint.
    pub leaf_node_edge: f64,
    /// Padding around a leaf's cursor box.
    pub leaf_padding: f64,
    /// Radial padding around a platform's cursor box.
    pub platform_padding: f64,
    /// Floor applied to sizes before taking logarithms.
    pub min_size: u64,
}

impl TreeVConfig {
    /// The standard radial tree layout.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            min_arc_width: 90.0,
            max_arc_width: 225.0,
            min_core_radius: 8192.0,
            core_grow_factor: 1.25,
            platform_height: 158.2,
            platform_spacing_width: 512.0,
            platform_spacing_depth: 2048.0,
            leaf_height_multiplier: 1.0,
            leaf_node_edge: 256.0,
            leaf_padding: 0.125 * 256.0,
            platform_padding: 0.5 * 512.0,
            min_size: 64,
        }
    }

    /// Smallest arc (degrees) at radius `r0` whose inner edge holds two
    /// leaves plus spacing.
    #[must_use]
    pub fn min_platform_arc(&self, r0: f64) -> f64 {
        (180.0 * (2.0 * self.leaf_node_edge + self.platform_spacing_width) / PI) / r0
    }
}

impl Default for TreeVConfig {
    fn default() -> Self {
        Self::standard()
    }
}

// -- Layout --

/// Lays out the whole tree, starting from a core of minimum radius.
pub fn init(
    tree: &mut FsTree,
    animator: &mut Animator,
    config: &TreeVConfig,
    core_radius: &mut f64,
    tracer: &mut Tracer<'_>,
) {
    let Some(root) = tree.root_dir() else {
        return;
    };
    *core_radius = config.min_core_radius;

    let meta = tree.metanode();
    {
        let p = &mut tree.treev_mut(meta).platform;
        p.theta = 0.0;
        p.depth = 0.0;
        p.arc_width = config.max_arc_width;
        p.height = 0.0;
    }
    tree.set_deployment(meta, 1.0);

    {
        let g = tree.treev_mut(root);
        g.platform.theta = 0.0;
        g.platform.height = 0.0;
        g.leaf.theta = 0.0;
        g.leaf.distance = 0.0;
    }
    tree.set_deployment(root, 1.0);

    init_recursive(tree, animator, config, root);
    arrange(tree, config, core_radius, true, tracer);
}

/// Resets deployments and assigns leaf and platform heights below `dnode`.
///
/// Leaf heights are logarithmic in size so that empty files and very large
/// ones stay within a readable range.
pub fn init_recursive(tree: &mut FsTree, animator: &mut Animator, config: &TreeVConfig, dnode: NodeId) {
    if tree.is_dir(dnode) {
        animator.morph_break(MorphKey::Deployment(dnode));
        let expanded = tree.flags(dnode).expanded;
        tree.set_deployment(dnode, if expanded { 1.0 } else { 0.0 });
        tree.mark_rebuild(dnode);
    }

    let children: Vec<NodeId> = tree.children(dnode).collect();
    for child in children {
        let mut size = tree.size(child).max(config.min_size);
        if tree.is_dir(child) {
            size += tree.subtree(child).size;
            tree.treev_mut(child).platform.height = config.platform_height;
            init_recursive(tree, animator, config, child);
        }
        tree.treev_mut(child).leaf.height = (size as f64).log2() * config.leaf_height_multiplier * 16.0;
    }
}

/// Recomputes platform angles, growing or shrinking the core until the
/// root's fan is within bounds.
///
/// With `initial` every expanded platform is reshaped; otherwise only the
/// directories queued by [`queue_rearrange`] are revisited.
pub fn arrange(
    tree: &mut FsTree,
    config: &TreeVConfig,
    core_radius: &mut f64,
    initial: bool,
    tracer: &mut Tracer<'_>,
) {
    let mut pending: Vec<u32> = tree
        .dirty
        .drain(dirty::REARRANGE)
        .deterministic()
        .run()
        .collect();
    pending.sort_unstable();

    let Some(root) = tree.root_dir() else {
        return;
    };

    let mut iterations = 0_u32;
    arrange_recursive(
        tree,
        config,
        root,
        *core_radius + config.platform_spacing_depth,
        initial,
        &pending,
        tracer,
    );
    tree.treev_mut(root).platform.arc_width = config.max_arc_width;

    loop {
        let subtree_arc = tree.treev(root).platform.subtree_arc_width;
        if subtree_arc > config.max_arc_width {
            *core_radius *= config.core_grow_factor;
        } else if subtree_arc < config.min_arc_width && *core_radius > config.min_core_radius {
            *core_radius = config.min_core_radius.max(*core_radius / config.core_grow_factor);
        } else {
            break;
        }
        iterations += 1;
        arrange_recursive(
            tree,
            config,
            root,
            *core_radius + config.platform_spacing_depth,
            true,
            &pending,
            tracer,
        );
        tree.treev_mut(root).platform.arc_width = config.max_arc_width;
    }

    tracer.arrange(&ArrangeEvent {
        core_radius: *core_radius,
        iterations,
        subtree_arc_width: tree.treev(root).platform.subtree_arc_width,
    });
}

/// Arranges the platforms below `dnode`, whose inner edge is at `r0`.
///
/// Without `reshape`, directories that are not in `pending` (sorted slot
/// indices) are left as they are.
pub fn arrange_recursive(
    tree: &mut FsTree,
    config: &TreeVConfig,
    dnode: NodeId,
    r0: f64,
    reshape: bool,
    pending: &[u32],
    tracer: &mut Tracer<'_>,
) {
    if !reshape && pending.binary_search(&dnode.idx).is_err() {
        return;
    }
    if reshape && tree.is_dir(dnode) {
        if is_leaf(tree, dnode) {
            // A collapsed directory is drawn as a leaf; it only moves.
            tree.mark_rebuild(dnode);
            return;
        }
        reshape_platform(tree, config, dnode, r0, tracer);
    }

    let subtree_r0 = r0 + tree.treev(dnode).platform.depth + config.platform_spacing_depth;
    let dirs: Vec<NodeId> = tree.children(dnode).take_while(|&c| tree.is_dir(c)).collect();

    let mut subtree_arc_width = 0.0;
    for &child in &dirs {
        arrange_recursive(tree, config, child, subtree_r0, reshape, pending, tracer);
        let p = tree.treev(child).platform;
        let arc = tree.deployment(child) * p.arc_width.max(p.subtree_arc_width);
        tree.treev_mut(child).platform.theta = arc;
        subtree_arc_width += arc;
    }
    tree.treev_mut(dnode).platform.subtree_arc_width = subtree_arc_width;

    // Sweep counter-clockwise, centered on the parent.
    let mut theta = -0.5 * subtree_arc_width;
    for &child in &dirs {
        let p = &mut tree.treev_mut(child).platform;
        let arc = p.theta;
        p.theta = theta + 0.5 * arc;
        theta += arc;
    }
}

/// Sizes the platform of `dnode` for an inner radius of `r0`.
///
/// The platform's area is estimated from a square grid of its children. The
/// depth solves the cubic relating depth, arc and area at this radius and is
/// then rounded up to a whole number of leaf rows. The arc is never narrower
/// than [`TreeVConfig::min_platform_arc`].
///
/// # Panics
///
/// Panics if the resulting arc width is negative.
pub fn reshape_platform(
    tree: &mut FsTree,
    config: &TreeVConfig,
    dnode: NodeId,
    r0: f64,
    tracer: &mut Tracer<'_>,
) {
    let edge = config.leaf_node_edge;
    let w = config.platform_spacing_width;
    let n = tree.child_count(dnode).max(1);
    let k = 1.5 * edge * (n as f64).sqrt().ceil() + 0.5 * edge;
    let area = k * k;

    let mut d = platform_depth_root(area, r0, w);
    if !d.is_finite() || d <= 0.0 {
        tracer.cubic_fallback(&CubicFallbackEvent {
            node_index: dnode.idx,
            child_count: tree.child_count(dnode),
            r0,
            raw_depth: d,
        });
        d = 0.5 * edge;
    }
    let theta = 180.0 * (d + w) / (PI * (r0 + d));
    let depth = d + (1.5 * edge - (d - 0.5 * edge) % (1.5 * edge)) + 0.5 * edge;

    let arc_width = config.min_platform_arc(r0).max(theta);
    assert!(
        arc_width >= 0.0,
        "negative arc width {arc_width} for {dnode:?} at r0 {r0}"
    );
    let p = &mut tree.treev_mut(dnode).platform;
    p.arc_width = arc_width;
    p.depth = depth;
    tree.mark_rebuild(dnode);
}

/// Positive root of `d³ + (2r+w)d² + (2wr − 2A − w)d − 2Ar = 0`.
///
/// Closed form via the trigonometric method; `A` is the platform area, `r`
/// its inner radius and `w` the spacing width.
pub(crate) fn platform_depth_root(area: f64, r: f64, w: f64) -> f64 {
    let a = area;
    let (a2, a3) = (a * a, a * a * a);
    let (r2, r3, r4) = (r * r, r * r * r, r * r * r * r);
    let (w2, w3, w4) = (w * w, w * w * w, w * w * w * w);

    let ka = 72.0 * (a * r - w * (a + r)) - 64.0 * r3 + 48.0 * r2 * w - 36.0 * w2 + 24.0 * r * w2
        - 8.0 * w3;
    let t1 = 72.0 * a * w2 - 132.0 * a * r * w2 - 240.0 * a * w * r3 + 120.0 * a * w2 * r2
        - 24.0 * a2 * w * r
        - 60.0 * w3 * r;
    let t2 = 12.0 * (w2 * r2 + a2 * w2 - w4 * r + w4 * r2 + a * w3 + w3);
    let t3 = 48.0 * (w2 * r4 - w2 * r3 - w3 * r3) + 96.0 * (a3 + w3 * r2);
    let t4 = 192.0 * a * r4 + 156.0 * a2 * r2 + 3.0 * w4 + 144.0 * a2 * w + 264.0 * a * w * r2;
    let kb = 12.0 * (t1 + t2 + t3 + t4).abs().sqrt();
    let kc = (kb.atan2(ka) / 3.0).cos();
    let kd = ka.hypot(kb).cbrt();

    (-w - 2.0 * r) / 3.0
        + ((8.0 * r2 - 4.0 * w * r + 2.0 * w2) / 3.0 + 4.0 * a + 2.0 * w) * kc / kd
        + kc * kd / 6.0
}

/// Places the leaves of `dnode` in rows across its platform, inner edge
/// first, and sets the platform's depth to fit them.
///
/// Children are laid down in reverse order so that the largest end up on
/// the outermost row.
pub fn layout_leaf_rows(tree: &mut FsTree, config: &TreeVConfig, dnode: NodeId, r0: f64) {
    let edge = config.leaf_node_edge;
    let children: Vec<NodeId> = tree.children(dnode).collect();
    let arc_width = tree.treev(dnode).platform.arc_width;

    let mut remaining = children.len();
    let mut next = children.len();
    let mut r = r0 + edge;
    while next > 0 {
        let arc_len = (PI / 180.0) * r * arc_width - config.platform_spacing_width;
        let row_count = row_capacity(arc_len, edge);
        let inter_arc = (180.0 * 1.5 * edge / PI) / r;

        let mut theta = 0.5 * inter_arc * (row_count.min(remaining) - 1) as f64;
        for _ in 0..row_count {
            if next == 0 {
                break;
            }
            next -= 1;
            let leaf = &mut tree.treev_mut(children[next]).leaf;
            leaf.theta = theta;
            leaf.distance = r - r0;
            theta -= inter_arc;
        }
        remaining = remaining.saturating_sub(row_count);
        r += 1.5 * edge;
    }

    r -= 0.5 * edge;
    tree.treev_mut(dnode).platform.depth = r - r0;
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "row counts are small and non-negative after the floor"
)]
fn row_capacity(arc_len: f64, edge: f64) -> usize {
    let n = ((arc_len - 0.5 * edge) / (1.5 * edge)).floor();
    if n.is_finite() && n >= 1.0 { n as usize } else { 1 }
}

/// Marks `dnode` and every ancestor for rearrangement; their branches are
/// rebuilt too.
///
/// # Panics
///
/// Panics if `dnode` is not a directory.
pub fn queue_rearrange(tree: &mut FsTree, dnode: NodeId) {
    assert!(tree.is_dir(dnode), "rearrange takes a directory, got {dnode:?}");
    tree.mark_rearrange(dnode);
}

// -- Queries --

/// Whether `node` is drawn as a leaf: anything but an expanded directory.
#[must_use]
pub fn is_leaf(tree: &FsTree, node: NodeId) -> bool {
    !(tree.is_dir(node) && tree.flags(node).expanded)
}

/// Inner radius of `dnode`'s platform.
#[must_use]
pub fn platform_r0(tree: &FsTree, config: &TreeVConfig, core_radius: f64, dnode: NodeId) -> f64 {
    if dnode == tree.metanode() {
        return core_radius;
    }
    let rings: f64 = tree
        .ancestors(dnode)
        .map(|a| config.platform_spacing_depth + tree.treev(a).platform.depth)
        .sum();
    core_radius + rings
}

/// Absolute angle of `dnode`'s platform center.
#[must_use]
pub fn platform_theta(tree: &FsTree, dnode: NodeId) -> f64 {
    let own = tree.treev(dnode).platform.theta;
    own + tree
        .ancestors(dnode)
        .map(|a| tree.treev(a).platform.theta)
        .sum::<f64>()
}

/// Tallest leaf standing on `dnode`'s platform.
///
/// # Panics
///
/// Panics if `dnode` is drawn as a leaf.
#[must_use]
pub fn max_leaf_height(tree: &FsTree, dnode: NodeId) -> f64 {
    assert!(!is_leaf(tree, dnode), "{dnode:?} has no platform");
    tree.children(dnode)
        .filter(|&c| is_leaf(tree, c))
        .map(|c| tree.treev(c).leaf.height)
        .fold(0.0, f64::max)
}

/// Radial and angular bounds of the platforms in `dnode`'s subtree.
///
/// Returned as inner and outer corners; `z` is zero.
///
/// # Panics
///
/// Panics if `dnode` is drawn as a leaf.
#[must_use]
pub fn extents(tree: &FsTree, config: &TreeVConfig, core_radius: f64, dnode: NodeId) -> (Rtz, Rtz) {
    assert!(!is_leaf(tree, dnode), "{dnode:?} has no platform");
    let mut c0 = Rtz::new(f64::MAX, f64::MAX, 0.0);
    let mut c1 = Rtz::new(f64::MIN, f64::MIN, 0.0);
    extents_recursive(
        tree,
        config,
        dnode,
        platform_r0(tree, config, core_radius, dnode),
        platform_theta(tree, dnode),
        &mut c0,
        &mut c1,
    );
    (c0, c1)
}

fn extents_recursive(
    tree: &FsTree,
    config: &TreeVConfig,
    dnode: NodeId,
    r0: f64,
    theta: f64,
    c0: &mut Rtz,
    c1: &mut Rtz,
) {
    let p = tree.treev(dnode).platform;
    let subtree_r0 = r0 + p.depth + config.platform_spacing_depth;
    for child in tree.children(dnode).take_while(|&c| tree.is_dir(c)) {
        if !is_leaf(tree, child) {
            let child_theta = theta + tree.treev(child).platform.theta;
            extents_recursive(tree, config, child, subtree_r0, child_theta, c0, c1);
        }
    }
    c0.r = c0.r.min(r0);
    c0.theta = c0.theta.min(theta - p.arc_width);
    c1.r = c1.r.max(r0 + p.depth);
    c1.theta = c1.theta.max(theta + p.arc_width);
}

/// Cursor box around `node`, as inner-low and outer-high corners.
///
/// Leaves are boxed by their footprint and height; platforms by their
/// sector, padded radially.
///
/// # Panics
///
/// Panics if `node` is a leaf with no parent.
#[must_use]
pub fn corners(tree: &FsTree, config: &TreeVConfig, core_radius: f64, node: NodeId) -> (Rtz, Rtz) {
    if is_leaf(tree, node) {
        let Some(parent) = tree.parent(node) else {
            panic!("leaf {node:?} has no parent");
        };
        let g = tree.treev(node).leaf;
        let r = platform_r0(tree, config, core_radius, parent) + g.distance;
        let theta = platform_theta(tree, parent) + g.theta;
        let z = tree.treev(parent).platform.height;

        let edge = config.leaf_node_edge;
        let pad = config.leaf_padding;
        let half_arc = 0.5 * (180.0 * edge / PI) / r;
        let pad_arc = (180.0 * pad / PI) / r;
        (
            Rtz::new(r - 0.5 * edge - pad, theta - half_arc - pad_arc, z - 0.5 * pad),
            Rtz::new(
                r + 0.5 * edge + pad,
                theta + half_arc + pad_arc,
                z + g.height + 0.5 * pad,
            ),
        )
    } else {
        let p = tree.treev(node).platform;
        let r0 = platform_r0(tree, config, core_radius, node);
        let theta = platform_theta(tree, node);
        (
            Rtz::new(r0 - config.platform_padding, theta - 0.5 * p.arc_width, 0.0),
            Rtz::new(
                r0 + p.depth + config.platform_padding,
                theta + 0.5 * p.arc_width,
                p.height,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timebase;
    use crate::trace::TraceSink;
    use crate::tree::{NodeFlags, NodeKind};

    const EXPANDED: NodeFlags = NodeFlags { expanded: true };

    /// Root with `dirs` expanded subdirectories, each holding `files` files.
    fn fan_tree(dirs: usize, files: usize) -> (FsTree, NodeId, Vec<NodeId>) {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        tree.add_child(tree.metanode(), root);
        tree.set_flags(root, EXPANDED);
        let mut subs = Vec::new();
        for d in 0..dirs {
            let sub = tree.create_node(NodeKind::Directory, alloc::format!("d{d}"), 0);
            tree.add_child(root, sub);
            tree.set_flags(sub, EXPANDED);
            for f in 0..files {
                let file = tree.create_node(NodeKind::RegFile, alloc::format!("f{f}"), 1000);
                tree.add_child(sub, file);
            }
            subs.push(sub);
        }
        tree.finalize();
        (tree, root, subs)
    }

    fn layout(tree: &mut FsTree) -> f64 {
        let mut animator = Animator::new(Timebase::NANOS);
        let mut core = 0.0;
        init(tree, &mut animator, &TreeVConfig::standard(), &mut core, &mut Tracer::none());
        core
    }

    #[test]
    fn cubic_root_satisfies_equation() {
        let (w, r) = (512.0, 10_240.0);
        let k = 384.0 * 2.0 + 128.0;
        let a = k * k;
        let d = platform_depth_root(a, r, w);
        let residual = d * d * d + (2.0 * r + w) * d * d + (2.0 * w * r - 2.0 * a - w) * d - 2.0 * a * r;
        assert!(d > 0.0, "positive depth, got {d}");
        assert!((residual / (2.0 * a * r)).abs() < 1e-9, "residual {residual}");
    }

    #[test]
    fn unsolvable_depth_falls_back_to_one_row() {
        struct Fallbacks(Vec<CubicFallbackEvent>);
        impl TraceSink for Fallbacks {
            fn on_cubic_fallback(&mut self, e: &CubicFallbackEvent) {
                self.0.push(*e);
            }
        }

        let (mut tree, _, subs) = fan_tree(1, 1);
        let config = TreeVConfig::standard();
        // Overflows the cubic's intermediate powers.
        let r0 = 1e100;
        assert!(
            platform_depth_root(512.0 * 512.0, r0, config.platform_spacing_width).is_nan(),
            "no usable root"
        );

        let mut sink = Fallbacks(Vec::new());
        reshape_platform(&mut tree, &config, subs[0], r0, &mut Tracer::new(&mut sink));
        let p = tree.treev(subs[0]).platform;
        assert!(p.depth.is_finite() && p.arc_width.is_finite(), "finite platform");
        assert!(p.arc_width >= 0.0, "non-negative arc");
        assert!(
            (p.depth - 640.0).abs() < 1e-9,
            "half-edge depth rounded up to one row, got {}",
            p.depth
        );
        if cfg!(feature = "trace") {
            assert_eq!(sink.0.len(), 1, "fallback reported once");
            assert_eq!(sink.0[0].node_index, subs[0].index(), "for the reshaped platform");
            assert_eq!(sink.0[0].child_count, 1, "child count carried");
            assert!(sink.0[0].raw_depth.is_nan(), "rejected root carried");
        }
    }

    #[test]
    fn arc_is_floored_at_two_leaves() {
        let (mut tree, _, subs) = fan_tree(1, 1);
        let config = TreeVConfig::standard();
        let r0 = 10_240.0;
        reshape_platform(&mut tree, &config, subs[0], r0, &mut Tracer::none());
        let p = tree.treev(subs[0]).platform;
        assert!(
            (p.arc_width - config.min_platform_arc(r0)).abs() < 1e-9,
            "narrow platform floored to the minimum arc, got {}",
            p.arc_width
        );
        assert!((p.depth - 640.0).abs() < 1e-9, "rounded up to whole rows, got {}", p.depth);
    }

    #[test]
    fn arc_budget_holds_after_init() {
        for dirs in [1, 5, 40] {
            let (mut tree, root, subs) = fan_tree(dirs, 12);
            let config = TreeVConfig::standard();
            let core = layout(&mut tree);
            assert!(core >= config.min_core_radius, "core never below the minimum");

            let fan = tree.treev(root).platform.subtree_arc_width;
            assert!(fan <= config.max_arc_width + 1e-9, "{dirs} dirs: fan {fan} too wide");
            if core > config.min_core_radius {
                assert!(fan >= config.min_arc_width, "{dirs} dirs: core grew needlessly");
            }

            let total: f64 = subs
                .iter()
                .map(|&s| {
                    let p = tree.treev(s).platform;
                    p.arc_width.max(p.subtree_arc_width)
                })
                .sum();
            assert!((total - fan).abs() < 1e-6, "children fill the fan exactly");

            for &s in &subs {
                let r0 = platform_r0(&tree, &config, core, s);
                let arc = tree.treev(s).platform.arc_width;
                assert!(arc + 1e-12 >= config.min_platform_arc(r0), "{s:?} below the minimum arc");
            }
        }
    }

    #[test]
    fn children_are_centered_on_the_parent() {
        let (mut tree, _, subs) = fan_tree(4, 3);
        layout(&mut tree);
        let thetas: Vec<f64> = subs.iter().map(|&s| tree.treev(s).platform.theta).collect();
        let sum: f64 = thetas.iter().sum();
        assert!(sum.abs() < 1e-9, "equal siblings are symmetric, got {thetas:?}");
        assert!(thetas.windows(2).all(|w| w[0] < w[1]), "sweep is counter-clockwise");
    }

    #[test]
    fn collapsed_directory_takes_no_arc() {
        let (mut tree, root, subs) = fan_tree(3, 3);
        tree.set_flags(subs[1], NodeFlags { expanded: false });
        layout(&mut tree);
        assert_eq!(tree.deployment(subs[1]), 0.0, "collapsed from flags");
        let fan = tree.treev(root).platform.subtree_arc_width;
        let others: f64 = [subs[0], subs[2]]
            .iter()
            .map(|&s| tree.treev(s).platform.arc_width)
            .sum();
        assert!((fan - others).abs() < 1e-9, "collapsed child contributes nothing");
    }

    #[test]
    fn rearrange_only_revisits_queued_branches() {
        let (mut tree, root, subs) = fan_tree(3, 3);
        let config = TreeVConfig::standard();
        let mut core = layout(&mut tree);

        tree.set_deployment(subs[2], 0.5);
        queue_rearrange(&mut tree, subs[2]);
        arrange(&mut tree, &config, &mut core, false, &mut Tracer::none());

        let p = tree.treev(subs[2]).platform;
        let expected: f64 = tree.treev(subs[0]).platform.arc_width * 2.0 + 0.5 * p.arc_width;
        let fan = tree.treev(root).platform.subtree_arc_width;
        assert!((fan - expected).abs() < 1e-9, "half-deployed child weighs half");
        let left: Vec<u32> = tree
            .dirty
            .drain(dirty::REARRANGE)
            .deterministic()
            .run()
            .collect();
        assert!(left.is_empty(), "queue drained");
    }

    #[test]
    fn leaf_rows_fill_from_the_inner_edge() {
        let (mut tree, _, subs) = fan_tree(1, 5);
        let config = TreeVConfig::standard();
        let r0 = 10_240.0;
        tree.treev_mut(subs[0]).platform.arc_width = 10.0;
        layout_leaf_rows(&mut tree, &config, subs[0], r0);

        let files: Vec<NodeId> = tree.children(subs[0]).collect();
        let last = tree.treev(files[4]).leaf;
        assert_eq!(last.distance, 256.0, "last child on the first row");
        let depth = tree.treev(subs[0]).platform.depth;
        let outer = files
            .iter()
            .map(|&f| tree.treev(f).leaf.distance)
            .fold(0.0, f64::max);
        assert_eq!(outer, 640.0, "two rows");
        assert_eq!(depth, outer + 256.0, "depth ends one edge past the last row");
    }

    #[test]
    fn leaf_corners_enclose_the_leaf() {
        let (mut tree, _, subs) = fan_tree(1, 2);
        let config = TreeVConfig::standard();
        let core = layout(&mut tree);
        let r0 = platform_r0(&tree, &config, core, subs[0]);
        layout_leaf_rows(&mut tree, &config, subs[0], r0);

        let file = tree.children(subs[0]).next().expect("a file");
        let (c0, c1) = corners(&tree, &config, core, file);
        let r = r0 + tree.treev(file).leaf.distance;
        assert!(c0.r < r && r < c1.r, "radius inside the box");
        assert!(c1.z - c0.z > tree.treev(file).leaf.height, "box taller than the leaf");

        let (p0, p1) = corners(&tree, &config, core, subs[0]);
        assert_eq!(p0.r, r0 - 256.0, "platform box padded inward");
        assert!(p1.r > c1.r, "platform box reaches past its leaves");
    }

    #[test]
    #[should_panic(expected = "rearrange takes a directory")]
    fn rearrange_rejects_files() {
        let (mut tree, _, subs) = fan_tree(1, 1);
        let file = tree.children(subs[0]).next().expect("a file");
        queue_rearrange(&mut tree, file);
    }
}
