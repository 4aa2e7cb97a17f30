// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filesystem tree data model.
//!
//! A *node* is a scanned filesystem object. Each node has:
//!
//! - An identity ([`NodeId`]), a generational handle that becomes stale when
//!   the node is destroyed.
//! - Topology: parent, first-child, and sibling links forming an ordered tree
//!   rooted at the invisible metanode.
//! - **Scanned attributes** set by the scanner: [`kind`](FsTree::kind),
//!   [`name`](FsTree::name), [`size`](FsTree::size), and the
//!   [`subtree`](FsTree::subtree) statistics computed by
//!   [`finalize`](FsTree::finalize).
//! - **Visual state**: the UI-set [`flags`](FsTree::flags), the animated
//!   [`deployment`](FsTree::deployment), and one geometry record per
//!   visualization mode written by the layouts.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//!
//! # Dirty tracking
//!
//! Layout passes mark the channels described in [`dirty`](crate::dirty).
//! A directory depends on its children, so eager marks travel toward the
//! metanode.

mod geom;
mod id;
mod kind;
mod store;
mod traverse;

pub use geom::{DiscGeom, MapGeom, TreeGeom, TreeLeafGeom, TreePlatformGeom};
pub use id::{INVALID, NodeId};
pub use kind::{NodeFlags, NodeKind, SubtreeInfo};
pub use store::FsTree;
pub use traverse::{Ancestors, Children, Descendants};

pub(crate) use store::compare_names;
