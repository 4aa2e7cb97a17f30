// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity.

use core::fmt;

/// Sentinel value indicating "no node" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a node in an [`FsTree`](super::FsTree).
///
/// Contains a slot index, a generation counter, and the epoch of the tree
/// that issued it, so that handles held by animations or navigation history
/// are detected as stale once the node is destroyed or the tree is replaced.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
    pub(crate) epoch: u32,
}

impl NodeId {
    /// Returns the raw slot index (for diagnostics and raw-slot accessors).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Returns the epoch of the tree that issued this handle.
    #[inline]
    #[must_use]
    pub const fn epoch(self) -> u32 {
        self.epoch
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NodeId({}@gen{}, tree {})",
            self.idx, self.generation, self.epoch
        )
    }
}
