// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kinds, flags, and aggregated subtree statistics.

/// The filesystem object a node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Invisible root whose single child is the root directory.
    Metanode,
    /// A directory.
    Directory,
    /// A regular file.
    RegFile,
    /// A symbolic link.
    Symlink,
    /// A named pipe.
    Fifo,
    /// A Unix domain socket.
    Socket,
    /// A character device.
    CharDev,
    /// A block device.
    BlockDev,
    /// Anything the scanner could not classify.
    Unknown,
}

impl NodeKind {
    /// Number of node kinds.
    pub const COUNT: usize = 9;

    /// All kinds in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Metanode,
        Self::Directory,
        Self::RegFile,
        Self::Symlink,
        Self::Fifo,
        Self::Socket,
        Self::CharDev,
        Self::BlockDev,
        Self::Unknown,
    ];

    /// Index of this kind in [`SubtreeInfo::counts`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether nodes of this kind have children.
    ///
    /// The metanode is treated as a directory for aggregation and layout.
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Metanode | Self::Directory)
    }
}

/// Per-node boolean flags set by the UI layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags {
    /// Whether the user wants this directory shown expanded.
    pub expanded: bool,
}

/// Statistics aggregated over all descendants of a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubtreeInfo {
    /// Total size in bytes of every descendant.
    pub size: u64,
    /// Number of descendants of each kind, indexed by [`NodeKind::index`].
    pub counts: [u32; NodeKind::COUNT],
}

impl SubtreeInfo {
    /// Returns the number of descendants of the given kind.
    #[inline]
    #[must_use]
    pub const fn count(&self, kind: NodeKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Total number of descendants.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}
