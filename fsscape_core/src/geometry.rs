// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry coordination across the three layouts.
//!
//! [`GeometryCoordinator`] owns the active [`ViewMode`] and the per-mode
//! layout state (the radial tree's core radius, the cursor box of the last
//! camera target), dispatches layout operations to the active mode, and
//! turns the store's dirty channels into a [`GeometryChanges`] set for the
//! renderer.
//!
//! # Draw stages
//!
//! The renderer draws in two stages (a fast low-detail pass and a
//! high-detail pass) and caches each. Any change to visible geometry resets
//! both stages to 0 via [`queue_uncached_draw`]; the renderer advances them
//! as its caches warm up.
//!
//! # Evaluation
//!
//! [`evaluate`] follows a drain-recompute pattern:
//!
//! 1. In radial-tree mode, if a draw stage is 0, platforms queued for
//!    rearrangement are re-fanned.
//! 2. **BODY** is drained. Radial-tree directories get their leaf rows laid
//!    out; every drained directory records whether it was built expanded.
//! 3. **BRANCHES** and **LABELS** are drained without recomputation.
//!
//! [`queue_uncached_draw`]: GeometryCoordinator::queue_uncached_draw
//! [`evaluate`]: GeometryCoordinator::evaluate

use alloc::vec::Vec;

use kurbo::Point;

use crate::animation::Animator;
use crate::dirty;
use crate::layout::{DiscVConfig, MapVConfig, TreeVConfig, discv, mapv, treev};
use crate::math::{EPSILON, Rtz, Xyz, lerp};
use crate::time::HostTime;
use crate::trace::{PhaseKind, Tracer};
use crate::tree::{FsTree, NodeId};

/// The active spatial arrangement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Radial discs.
    #[default]
    DiscV,
    /// Nested treemap.
    MapV,
    /// Radial tree of platforms.
    TreeV,
}

/// Box drawn around the camera's target node, in the active mode's space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CursorBox {
    /// A circle around a disc.
    Disc {
        /// Absolute center.
        center: Point,
        /// Radius.
        radius: f64,
    },
    /// An axis-aligned box.
    Map {
        /// Low corner.
        c0: Xyz,
        /// High corner.
        c1: Xyz,
    },
    /// A cylindrical sector.
    Tree {
        /// Inner, clockwise, low corner.
        c0: Rtz,
        /// Outer, counter-clockwise, high corner.
        c1: Rtz,
    },
}

impl CursorBox {
    /// Interpolates toward `to` by `t`.
    ///
    /// Boxes from different modes do not interpolate; the result is `to`.
    #[must_use]
    pub fn lerp(self, to: Self, t: f64) -> Self {
        match (self, to) {
            (
                Self::Disc { center, radius },
                Self::Disc {
                    center: c,
                    radius: r,
                },
            ) => Self::Disc {
                center: center.lerp(c, t),
                radius: lerp(radius, r, t),
            },
            (Self::Map { c0, c1 }, Self::Map { c0: d0, c1: d1 }) => Self::Map {
                c0: c0 + (d0 - c0) * t,
                c1: c1 + (d1 - c1) * t,
            },
            (Self::Tree { c0, c1 }, Self::Tree { c0: d0, c1: d1 }) => Self::Tree {
                c0: lerp_rtz(c0, d0, t),
                c1: lerp_rtz(c1, d1, t),
            },
            _ => to,
        }
    }
}

fn lerp_rtz(a: Rtz, b: Rtz, t: f64) -> Rtz {
    Rtz::new(lerp(a.r, b.r, t), lerp(a.theta, b.theta, t), lerp(a.z, b.z, t))
}

/// The set of changes produced by a single
/// [`GeometryCoordinator::evaluate`] call.
///
/// Each list holds raw slot indices so that renderers can read geometry
/// through the store's `*_at()` accessors.
#[derive(Clone, Debug, Default)]
pub struct GeometryChanges {
    /// Nodes whose body geometry must be rebuilt.
    pub bodies: Vec<u32>,
    /// Nodes whose connecting branches must be rebuilt.
    pub branches: Vec<u32>,
    /// Nodes whose labels must be rebuilt.
    pub labels: Vec<u32>,
    /// Directories that were built collapsed and are now built expanded.
    pub expanded: Vec<u32>,
    /// Directories that were built expanded and are now built collapsed.
    pub collapsed: Vec<u32>,
    /// Whether the radial-tree platforms were re-fanned.
    pub rearranged: bool,
}

impl GeometryChanges {
    /// Clears all change lists.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.branches.clear();
        self.labels.clear();
        self.expanded.clear();
        self.collapsed.clear();
        self.rearranged = false;
    }

    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
            && self.branches.is_empty()
            && self.labels.is_empty()
            && self.expanded.is_empty()
            && self.collapsed.is_empty()
            && !self.rearranged
    }
}

/// Dispatches layout work to the active mode and tracks draw state.
#[derive(Clone, Debug)]
pub struct GeometryCoordinator {
    mode: ViewMode,
    low_draw_stage: u8,
    high_draw_stage: u8,
    core_radius: f64,
    cursor_prev: Option<CursorBox>,
    discv: DiscVConfig,
    mapv: MapVConfig,
    treev: TreeVConfig,
}

impl Default for GeometryCoordinator {
    fn default() -> Self {
        Self::new(
            DiscVConfig::standard(),
            MapVConfig::standard(),
            TreeVConfig::standard(),
        )
    }
}

impl GeometryCoordinator {
    /// Creates a coordinator in disc mode with the given layout tunables.
    #[must_use]
    pub fn new(discv: DiscVConfig, mapv: MapVConfig, treev: TreeVConfig) -> Self {
        Self {
            mode: ViewMode::DiscV,
            low_draw_stage: 0,
            high_draw_stage: 0,
            core_radius: treev.min_core_radius,
            cursor_prev: None,
            discv,
            mapv,
            treev,
        }
    }

    // -- Accessors --

    /// The active mode.
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Radius of the radial tree's core.
    #[must_use]
    pub fn core_radius(&self) -> f64 {
        self.core_radius
    }

    /// Low-detail draw stage: 0 means uncached.
    #[must_use]
    pub fn low_draw_stage(&self) -> u8 {
        self.low_draw_stage
    }

    /// High-detail draw stage: 0 means uncached.
    #[must_use]
    pub fn high_draw_stage(&self) -> u8 {
        self.high_draw_stage
    }

    /// Disc layout tunables.
    #[must_use]
    pub fn discv_config(&self) -> &DiscVConfig {
        &self.discv
    }

    /// Treemap layout tunables.
    #[must_use]
    pub fn mapv_config(&self) -> &MapVConfig {
        &self.mapv
    }

    /// Radial tree layout tunables.
    #[must_use]
    pub fn treev_config(&self) -> &TreeVConfig {
        &self.treev
    }

    // -- Layout --

    /// Switches to `mode` and lays out the whole tree from scratch.
    pub fn init(
        &mut self,
        tree: &mut FsTree,
        animator: &mut Animator,
        mode: ViewMode,
        tracer: &mut Tracer<'_>,
    ) {
        self.mode = mode;
        self.low_draw_stage = 0;
        self.high_draw_stage = 0;
        self.cursor_prev = None;

        let meta = tree.metanode();
        tree.set_deployment(meta, 1.0);
        self.queue_rebuild(tree, meta);

        match mode {
            ViewMode::DiscV => discv::init(tree, animator, &self.discv),
            ViewMode::MapV => mapv::init(tree, animator, &self.mapv),
            ViewMode::TreeV => {
                treev::init(tree, animator, &self.treev, &mut self.core_radius, tracer);
            }
        }
        self.cursor_prev = tree.root_dir().map(|root| self.initial_cursor(tree, root));
    }

    fn initial_cursor(&self, tree: &FsTree, root: NodeId) -> CursorBox {
        match self.mode {
            ViewMode::DiscV => CursorBox::Disc {
                center: discv::node_pos(tree, root),
                radius: 4.0 * tree.discv(root).radius,
            },
            ViewMode::MapV => {
                let g = tree.mapv(root);
                let k = 4.0;
                CursorBox::Map {
                    c0: Xyz::new(k * g.c0.x, k * g.c0.y, -0.25 * k * g.depth()),
                    c1: Xyz::new(k * g.c1.x, k * g.c1.y, 0.25 * k * g.depth()),
                }
            }
            ViewMode::TreeV => {
                let (mut c0, mut c1) = treev::corners(tree, &self.treev, self.core_radius, root);
                let p = tree.treev(root).platform;
                c0.r *= 0.875;
                c0.theta -= p.arc_width;
                c0.z = 0.0;
                c1.r *= 1.125;
                c1.theta += p.arc_width;
                c1.z = p.height;
                CursorBox::Tree { c0, c1 }
            }
        }
    }

    /// Marks all of `node`'s geometry stale and resets the draw stages.
    pub fn queue_rebuild(&mut self, tree: &mut FsTree, node: NodeId) {
        tree.mark_rebuild(node);
        self.queue_uncached_draw();
    }

    /// Resets both draw stages so the next frame is drawn uncached.
    pub fn queue_uncached_draw(&mut self) {
        self.low_draw_stage = 0;
        self.high_draw_stage = 0;
    }

    /// Advances the low-detail draw stage, up to 2.
    pub fn advance_low_draw_stage(&mut self) {
        if self.low_draw_stage <= 1 {
            self.low_draw_stage += 1;
        }
    }

    /// Advances the high-detail draw stage, up to 2.
    pub fn advance_high_draw_stage(&mut self) {
        if self.high_draw_stage <= 1 {
            self.high_draw_stage += 1;
        }
    }

    // -- Cursor --

    /// Records `node`'s box as the starting point of the next cursor move.
    pub fn camera_pan_finished(&mut self, tree: &FsTree, node: NodeId) {
        self.cursor_prev = Some(self.cursor_box(tree, node));
    }

    /// The cursor box `pan_part` of the way from the previous target to
    /// `node`.
    #[must_use]
    pub fn cursor(&self, tree: &FsTree, node: NodeId, pan_part: f64) -> CursorBox {
        let to = self.cursor_box(tree, node);
        match self.cursor_prev {
            Some(from) => from.lerp(to, pan_part),
            None => to,
        }
    }

    /// The box around `node` in the active mode.
    #[must_use]
    pub fn cursor_box(&self, tree: &FsTree, node: NodeId) -> CursorBox {
        match self.mode {
            ViewMode::DiscV => CursorBox::Disc {
                center: discv::node_pos(tree, node),
                radius: tree.discv(node).radius,
            },
            ViewMode::MapV => {
                let g = tree.mapv(node);
                let z0 = mapv::node_z0(tree, node);
                CursorBox::Map {
                    c0: Xyz::new(g.c0.x, g.c0.y, z0),
                    c1: Xyz::new(g.c1.x, g.c1.y, z0 + g.height),
                }
            }
            ViewMode::TreeV => {
                let (c0, c1) = treev::corners(tree, &self.treev, self.core_radius, node);
                CursorBox::Tree { c0, c1 }
            }
        }
    }

    // -- Collapse/expand --

    /// Prepares `dnode` for a deployment animation.
    ///
    /// In radial-tree mode a collapsed directory's platform is shaped now,
    /// since it may never have been drawn or its inner radius may have
    /// moved.
    pub fn colexp_initiated(&mut self, tree: &mut FsTree, dnode: NodeId, tracer: &mut Tracer<'_>) {
        if !tree.is_dir(dnode) {
            return;
        }
        if tree.is_collapsed(dnode) && self.mode == ViewMode::TreeV {
            let r0 = self.treev_platform_r0(tree, dnode);
            treev::reshape_platform(tree, &self.treev, dnode, r0, tracer);
        }
    }

    /// Reacts to one step of `dnode`'s deployment animation.
    ///
    /// The directory is rebuilt when its built form (expanded or not) no
    /// longer matches its deployment; otherwise a redraw suffices.
    pub fn colexp_in_progress(&mut self, tree: &mut FsTree, dnode: NodeId) {
        if !tree.is_dir(dnode) {
            return;
        }
        if tree.geom_expanded(dnode) != (tree.deployment(dnode) > EPSILON) {
            self.queue_rebuild(tree, dnode);
        } else {
            self.queue_uncached_draw();
        }
        if self.mode == ViewMode::TreeV {
            treev::queue_rearrange(tree, dnode);
            self.queue_uncached_draw();
        }
    }

    /// Whether `node` gets a highlight when hovered.
    #[must_use]
    pub fn should_highlight(&self, tree: &FsTree, node: NodeId) -> bool {
        if !tree.is_dir(node) {
            return true;
        }
        match self.mode {
            ViewMode::DiscV => true,
            ViewMode::MapV => tree.is_collapsed(node),
            ViewMode::TreeV => treev::is_leaf(tree, node),
        }
    }

    // -- Helpers --

    /// See [`treev::is_leaf`].
    #[must_use]
    pub fn treev_is_leaf(&self, tree: &FsTree, node: NodeId) -> bool {
        treev::is_leaf(tree, node)
    }

    /// See [`treev::platform_r0`].
    #[must_use]
    pub fn treev_platform_r0(&self, tree: &FsTree, dnode: NodeId) -> f64 {
        treev::platform_r0(tree, &self.treev, self.core_radius, dnode)
    }

    /// See [`treev::platform_theta`].
    #[must_use]
    pub fn treev_platform_theta(&self, tree: &FsTree, dnode: NodeId) -> f64 {
        treev::platform_theta(tree, dnode)
    }

    /// See [`treev::max_leaf_height`].
    #[must_use]
    pub fn treev_max_leaf_height(&self, tree: &FsTree, dnode: NodeId) -> f64 {
        treev::max_leaf_height(tree, dnode)
    }

    /// See [`treev::extents`].
    #[must_use]
    pub fn treev_extents(&self, tree: &FsTree, dnode: NodeId) -> (Rtz, Rtz) {
        treev::extents(tree, &self.treev, self.core_radius, dnode)
    }

    /// See [`mapv::node_z0`].
    #[must_use]
    pub fn mapv_node_z0(&self, tree: &FsTree, node: NodeId) -> f64 {
        mapv::node_z0(tree, node)
    }

    /// See [`mapv::max_expanded_height`].
    #[must_use]
    pub fn mapv_max_expanded_height(&self, tree: &FsTree, dnode: NodeId) -> f64 {
        mapv::max_expanded_height(tree, dnode)
    }

    /// See [`discv::node_pos`].
    #[must_use]
    pub fn discv_node_pos(&self, tree: &FsTree, node: NodeId) -> Point {
        discv::node_pos(tree, node)
    }

    // -- Evaluation --

    /// Brings stale geometry up to date and reports what changed.
    pub fn evaluate(
        &mut self,
        tree: &mut FsTree,
        frame_index: u64,
        now: HostTime,
        tracer: &mut Tracer<'_>,
    ) -> GeometryChanges {
        let mut changes = GeometryChanges::default();
        self.evaluate_into(tree, frame_index, now, &mut changes, tracer);
        changes
    }

    /// Like [`evaluate`](Self::evaluate), but reuses a caller-provided
    /// buffer.
    pub fn evaluate_into(
        &mut self,
        tree: &mut FsTree,
        frame_index: u64,
        now: HostTime,
        changes: &mut GeometryChanges,
        tracer: &mut Tracer<'_>,
    ) {
        changes.clear();

        if self.mode == ViewMode::TreeV && (self.low_draw_stage == 0 || self.high_draw_stage == 0) {
            let (config, core_radius) = (&self.treev, &mut self.core_radius);
            tracer.phase(frame_index, PhaseKind::Arrange, now, |t| {
                treev::arrange(tree, config, core_radius, false, t);
            });
            changes.rearranged = true;
        }

        // Drain BODY, parents before children so inner radii are settled.
        let mut bodies: Vec<u32> = tree.dirty.drain(dirty::BODY).deterministic().run().collect();
        bodies.sort_by_key(|&idx| (tree.depth(tree.id_at(idx)), idx));
        for &idx in &bodies {
            let node = tree.id_at(idx);
            if !tree.is_dir(node) {
                continue;
            }
            let built_expanded = tree.deployment(node) > EPSILON;
            if self.mode == ViewMode::TreeV && built_expanded {
                let r0 = self.treev_platform_r0(tree, node);
                treev::layout_leaf_rows(tree, &self.treev, node, r0);
            }
            if built_expanded != tree.geom_expanded(node) {
                if built_expanded {
                    changes.expanded.push(idx);
                } else {
                    changes.collapsed.push(idx);
                }
                tree.set_geom_expanded(node, built_expanded);
            }
        }
        changes.bodies = bodies;

        // Drain BRANCHES and LABELS, no recomputation.
        changes.branches = tree.dirty.drain(dirty::BRANCHES).deterministic().run().collect();
        changes.labels = tree.dirty.drain(dirty::LABELS).deterministic().run().collect();

        #[cfg(feature = "trace-rich")]
        {
            use crate::trace::{NodeChange, NodeField};
            let mut out = Vec::new();
            for (list, field) in [
                (&changes.bodies, NodeField::Body),
                (&changes.branches, NodeField::Branches),
                (&changes.labels, NodeField::Labels),
            ] {
                out.extend(list.iter().map(|&node_index| NodeChange { node_index, field }));
            }
            if !out.is_empty() {
                tracer.node_changes(frame_index, &out);
            }
        }
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = frame_index;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Timebase;
    use crate::tree::{NodeFlags, NodeKind};

    fn sample_tree() -> (FsTree, NodeId, NodeId) {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        let sub = tree.create_node(NodeKind::Directory, "sub", 0);
        tree.add_child(tree.metanode(), root);
        tree.add_child(root, sub);
        for i in 0..4 {
            let f = tree.create_node(NodeKind::RegFile, alloc::format!("f{i}"), 5000);
            tree.add_child(sub, f);
        }
        let f = tree.create_node(NodeKind::RegFile, "top", 90_000);
        tree.add_child(root, f);
        tree.set_flags(root, NodeFlags { expanded: true });
        tree.set_flags(sub, NodeFlags { expanded: true });
        tree.finalize();
        (tree, root, sub)
    }

    fn coordinator(tree: &mut FsTree, mode: ViewMode) -> GeometryCoordinator {
        let mut g = GeometryCoordinator::default();
        let mut animator = Animator::new(Timebase::NANOS);
        g.init(tree, &mut animator, mode, &mut Tracer::none());
        g
    }

    #[test]
    fn init_queues_everything_and_resets_stages() {
        let (mut tree, root, sub) = sample_tree();
        let mut g = coordinator(&mut tree, ViewMode::MapV);
        assert_eq!(g.low_draw_stage(), 0, "uncached after init");

        let changes = g.evaluate(&mut tree, 0, HostTime(0), &mut Tracer::none());
        for id in [tree.metanode(), root, sub] {
            assert!(changes.bodies.contains(&id.index()), "{id:?} rebuilt");
            assert!(changes.labels.contains(&id.index()), "{id:?} relabelled");
        }
        assert!(changes.expanded.contains(&sub.index()), "sub built expanded");
        assert!(tree.geom_expanded(sub), "built form recorded");

        let again = g.evaluate(&mut tree, 1, HostTime(1), &mut Tracer::none());
        assert!(again.bodies.is_empty(), "nothing left to drain");
    }

    #[test]
    fn draw_stages_saturate_at_two() {
        let mut g = GeometryCoordinator::default();
        for _ in 0..5 {
            g.advance_low_draw_stage();
        }
        g.advance_high_draw_stage();
        assert_eq!(g.low_draw_stage(), 2, "low saturates");
        assert_eq!(g.high_draw_stage(), 1, "high advanced once");
        g.queue_uncached_draw();
        assert_eq!((g.low_draw_stage(), g.high_draw_stage()), (0, 0), "both reset");
    }

    #[test]
    fn in_progress_rebuilds_on_form_change() {
        let (mut tree, _, sub) = sample_tree();
        let mut g = coordinator(&mut tree, ViewMode::MapV);
        let _ = g.evaluate(&mut tree, 0, HostTime(0), &mut Tracer::none());

        tree.set_deployment(sub, 0.5);
        g.colexp_in_progress(&mut tree, sub);
        let changes = g.evaluate(&mut tree, 1, HostTime(1), &mut Tracer::none());
        assert!(changes.bodies.is_empty(), "still built expanded");

        tree.set_deployment(sub, 0.0);
        g.colexp_in_progress(&mut tree, sub);
        let changes = g.evaluate(&mut tree, 2, HostTime(2), &mut Tracer::none());
        assert_eq!(changes.bodies, [sub.index()], "form flipped");
        assert_eq!(changes.collapsed, [sub.index()], "reported collapsed");
    }

    #[test]
    fn treev_in_progress_rearranges_ancestors() {
        let (mut tree, root, sub) = sample_tree();
        let mut g = coordinator(&mut tree, ViewMode::TreeV);
        let _ = g.evaluate(&mut tree, 0, HostTime(0), &mut Tracer::none());
        let before = tree.treev(root).platform.subtree_arc_width;

        tree.set_deployment(sub, 0.5);
        g.colexp_in_progress(&mut tree, sub);
        let changes = g.evaluate(&mut tree, 1, HostTime(1), &mut Tracer::none());
        assert!(changes.rearranged, "re-fanned");
        assert!(changes.branches.contains(&root.index()), "ancestor branches rebuilt");
        let after = tree.treev(root).platform.subtree_arc_width;
        assert!(after < before, "half-deployed child narrows the fan");
    }

    #[test]
    fn highlight_depends_on_mode() {
        let (mut tree, root, sub) = sample_tree();
        let file = tree.children(sub).next().expect("a file");
        let disc = coordinator(&mut tree, ViewMode::DiscV);
        assert!(disc.should_highlight(&tree, root), "discs always highlight");
        let map = coordinator(&mut tree, ViewMode::MapV);
        assert!(!map.should_highlight(&tree, root), "expanded block does not");
        assert!(map.should_highlight(&tree, file), "files always do");
        let radial = coordinator(&mut tree, ViewMode::TreeV);
        assert!(!radial.should_highlight(&tree, sub), "platforms do not");
    }

    #[test]
    fn cursor_moves_between_boxes() {
        let (mut tree, root, sub) = sample_tree();
        let mut g = coordinator(&mut tree, ViewMode::MapV);
        g.camera_pan_finished(&tree, root);
        let start = g.cursor(&tree, sub, 0.0);
        assert_eq!(start, g.cursor_box(&tree, root), "starts at the old target");

        let (CursorBox::Map { c1: end, .. }, CursorBox::Map { c1: target, .. }) =
            (g.cursor(&tree, sub, 1.0), g.cursor_box(&tree, sub))
        else {
            panic!("treemap cursors");
        };
        assert!((end - target).length() < 1e-9, "ends at the new target");

        let (CursorBox::Map { c0: mid, .. }, CursorBox::Map { c0: a, .. }, CursorBox::Map { c0: b, .. }) = (
            g.cursor(&tree, sub, 0.5),
            g.cursor_box(&tree, root),
            g.cursor_box(&tree, sub),
        ) else {
            panic!("treemap cursors");
        };
        assert!((mid - (a + b) * 0.5).length() < 1e-9, "halfway at half pan");
    }
}
