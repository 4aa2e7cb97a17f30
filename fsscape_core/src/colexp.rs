// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated directory collapse and expansion.
//!
//! [`execute`] flips the `expanded` flags of the affected directories and
//! starts a deployment morph on each one. Recursive operations stagger
//! their morphs by depth so that a subtree folds up from the leaves inward
//! or unfolds from the top down: each directory first holds its current
//! deployment for a whole number of steps, then animates for one step.
//!
//! Every deployment stage emits [`Hook::Deployment`] on each step and at its
//! end; the engine routes it to
//! [`GeometryCoordinator::colexp_in_progress`] and requests a redraw.

use alloc::vec::Vec;

use crate::animation::{Animator, Hook, MorphKey};
use crate::geometry::{GeometryCoordinator, ViewMode};
use crate::morph::Easing;
use crate::time::HostTime;
use crate::trace::{ColexpEvent, Tracer};
use crate::tree::{FsTree, NodeId};

/// What to do to a directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColexpAction {
    /// Expand the directory alone.
    Expand,
    /// Expand the directory and any collapsed ancestors, outermost first.
    ExpandAny,
    /// Expand the directory and every directory below it, top down.
    ExpandRecursive,
    /// Collapse the directory and every directory below it, bottom up.
    CollapseRecursive,
}

/// Per-mode duration of one collapse or expand step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColexpConfig {
    /// Step duration in treemap mode, also used for discs.
    pub mapv_time: f64,
    /// Step duration in radial-tree mode.
    pub treev_time: f64,
}

impl ColexpConfig {
    /// The standard step durations.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            mapv_time: 0.375,
            treev_time: 0.5,
        }
    }

    /// Step duration in `mode`.
    #[must_use]
    pub const fn step_time(&self, mode: ViewMode) -> f64 {
        match mode {
            ViewMode::TreeV => self.treev_time,
            ViewMode::DiscV | ViewMode::MapV => self.mapv_time,
        }
    }
}

impl Default for ColexpConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// State carried down one [`execute`] recursion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColexpContext {
    /// Distance from the directory the operation was issued on.
    pub depth: u32,
    /// Deepest level involved; the stagger is measured against it.
    pub max_depth: u32,
    /// Duration of one step in seconds.
    pub step_time: f64,
    /// Mode the operation runs in.
    pub mode: ViewMode,
}

impl ColexpContext {
    fn wait_steps(&self, action: ColexpAction) -> u32 {
        match action {
            ColexpAction::CollapseRecursive | ColexpAction::ExpandAny => {
                self.max_depth.saturating_sub(self.depth)
            }
            ColexpAction::Expand | ColexpAction::ExpandRecursive => self.depth,
        }
    }
}

/// Collapses or expands `dnode` according to `action`.
///
/// The `expanded` flags change immediately; deployments follow over
/// subsequent ticks. Any deployment animation already running on an
/// affected directory is superseded.
///
/// # Panics
///
/// Panics if `dnode` is not a directory.
pub fn execute(
    tree: &mut FsTree,
    animator: &mut Animator,
    geometry: &mut GeometryCoordinator,
    config: &ColexpConfig,
    dnode: NodeId,
    action: ColexpAction,
    now: HostTime,
    tracer: &mut Tracer<'_>,
) {
    assert!(
        tree.is_dir(dnode),
        "collapse/expand takes a directory, got {dnode:?}"
    );

    let max_depth = match action {
        ColexpAction::CollapseRecursive => {
            set_subtree_expanded(tree, dnode, false);
            max_expanded_depth(tree, dnode)
        }
        ColexpAction::Expand => {
            tree.set_expanded(dnode, true);
            0
        }
        ColexpAction::ExpandAny => {
            let depth = collapsed_depth(tree, dnode);
            tree.set_expanded(dnode, true);
            let ancestors: Vec<NodeId> = tree
                .ancestors(dnode)
                .take(depth as usize)
                .collect();
            for a in ancestors {
                tree.set_expanded(a, true);
            }
            depth
        }
        ColexpAction::ExpandRecursive => {
            set_subtree_expanded(tree, dnode, true);
            0
        }
    };

    let mode = geometry.mode();
    let mut cx = ColexpContext {
        depth: 0,
        max_depth,
        step_time: config.step_time(mode),
        mode,
    };
    execute_recursive(tree, animator, geometry, dnode, action, now, &mut cx, tracer);

    tracer.colexp(&ColexpEvent {
        node_index: dnode.index(),
        action,
        max_depth: cx.max_depth,
    });
}

fn execute_recursive(
    tree: &mut FsTree,
    animator: &mut Animator,
    geometry: &mut GeometryCoordinator,
    dnode: NodeId,
    action: ColexpAction,
    now: HostTime,
    cx: &mut ColexpContext,
    tracer: &mut Tracer<'_>,
) {
    let key = MorphKey::Deployment(dnode);
    animator.morph_break(key);

    let current = tree.deployment(dnode);
    let wait = cx.wait_steps(action);
    if wait > 0 {
        animator.morph(key, current, Easing::Linear, current, f64::from(wait) * cx.step_time, now);
    }

    let hook = Some(Hook::Deployment(dnode));
    let (easing, target) = match action {
        ColexpAction::CollapseRecursive => (Easing::Quadratic, 0.0),
        _ => (Easing::InvQuadratic, 1.0),
    };
    animator.morph_full(key, current, easing, target, cx.step_time, now, hook, hook);

    // Geometry hears about parents before their children.
    match action {
        ColexpAction::Expand => geometry.colexp_initiated(tree, dnode, tracer),
        ColexpAction::ExpandAny => {
            if let Some(parent) = tree.parent(dnode).filter(|&p| tree.is_dir(p)) {
                cx.depth += 1;
                execute_recursive(tree, animator, geometry, parent, action, now, cx, tracer);
                cx.depth -= 1;
            }
            geometry.colexp_initiated(tree, dnode, tracer);
        }
        ColexpAction::CollapseRecursive | ColexpAction::ExpandRecursive => {
            geometry.colexp_initiated(tree, dnode, tracer);
            let dirs: Vec<NodeId> =
                tree.children(dnode).take_while(|&c| tree.is_dir(c)).collect();
            cx.depth += 1;
            for child in dirs {
                execute_recursive(tree, animator, geometry, child, action, now, cx, tracer);
            }
            cx.depth -= 1;
        }
    }

    if action == ColexpAction::ExpandRecursive {
        cx.max_depth = cx.max_depth.max(cx.depth);
    }
}

/// Number of consecutive collapsed directories directly above `dnode`.
#[must_use]
pub fn collapsed_depth(tree: &FsTree, dnode: NodeId) -> u32 {
    let mut depth = 0;
    for a in tree.ancestors(dnode) {
        if !tree.is_dir(a) || !tree.is_collapsed(a) {
            break;
        }
        depth += 1;
    }
    depth
}

/// How many levels below `dnode` are fully expanded.
#[must_use]
pub fn max_expanded_depth(tree: &FsTree, dnode: NodeId) -> u32 {
    tree.children(dnode)
        .take_while(|&c| tree.is_dir(c))
        .filter(|&c| tree.is_expanded(c))
        .map(|c| 1 + max_expanded_depth(tree, c))
        .max()
        .unwrap_or(0)
}

fn set_subtree_expanded(tree: &mut FsTree, dnode: NodeId, expanded: bool) {
    let dirs: Vec<NodeId> = core::iter::once(dnode)
        .chain(tree.descendants(dnode))
        .filter(|&n| tree.is_dir(n))
        .collect();
    for d in dirs {
        tree.set_expanded(d, expanded);
    }
}
