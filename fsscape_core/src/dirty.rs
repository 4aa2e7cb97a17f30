// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty-tracking channel constants.
//!
//! The node store uses multi-channel dirty tracking (via [`understory_dirty`])
//! to record which parts of the visualization must be recomputed or rebuilt.
//! Keys are raw node slot indices.
//!
//! # Propagation semantics
//!
//! Dependency edges run from parent to child: a directory *depends on* each of
//! its children. Marking a node with
//! [`EagerPolicy`](understory_dirty::EagerPolicy) therefore marks every
//! ancestor up to the metanode.
//!
//! - **Propagating**: [`REARRANGE`] is always marked eagerly. A change in a
//!   directory's deployment shifts the angular slices of every enclosing
//!   platform in the radial-tree layout. [`BRANCHES`] is marked eagerly by the
//!   same operation, since the connecting branches of every enclosing
//!   platform move with it.
//!
//! - **Local-only**: [`BODY`], [`BRANCHES`] and [`LABELS`] are marked
//!   without propagation when a single directory's geometry goes stale.
//!
//! # Consumption
//!
//! [`GeometryCoordinator::evaluate`](crate::geometry::GeometryCoordinator::evaluate)
//! drains the three geometry channels and surfaces them as
//! [`GeometryChanges`](crate::geometry::GeometryChanges).
//! [`REARRANGE`] is drained by the radial-tree arrangement pass.

use understory_dirty::Channel;

/// Platform angles and arc budgets must be recomputed (radial-tree layout).
pub const REARRANGE: Channel = Channel::new(0);

/// The node's own body geometry is stale.
pub const BODY: Channel = Channel::new(1);

/// Connecting geometry between a directory and its children is stale.
pub const BRANCHES: Channel = Channel::new(2);

/// Label geometry is stale.
pub const LABELS: Channel = Channel::new(3);
