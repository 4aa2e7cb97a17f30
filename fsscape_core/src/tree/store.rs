// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, topology, and per-node state.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use super::geom::{DiscGeom, MapGeom, TreeGeom};
use super::id::{INVALID, NodeId};
use super::kind::{NodeFlags, NodeKind, SubtreeInfo};
use super::traverse::{Ancestors, Children, Descendants};
use crate::dirty;
use crate::math::EPSILON;

/// Source of per-tree epochs. Each store takes the next value on creation.
static NEXT_EPOCH: AtomicU32 = AtomicU32::new(0);

/// Struct-of-arrays storage for a scanned filesystem tree.
///
/// Nodes are addressed by [`NodeId`] handles. Slot 0 always holds the
/// metanode, an invisible container whose single child is the root
/// directory. The scanner fills the store with [`create_node`] and
/// [`add_child`], then calls [`finalize`] once.
///
/// [`create_node`]: Self::create_node
/// [`add_child`]: Self::add_child
/// [`finalize`]: Self::finalize
#[derive(Debug)]
pub struct FsTree {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Scanned attributes --
    pub(crate) kind: Vec<NodeKind>,
    pub(crate) name: Vec<String>,
    pub(crate) size: Vec<u64>,
    pub(crate) subtree: Vec<SubtreeInfo>,

    // -- Visual state --
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) deployment: Vec<f64>,
    pub(crate) geom_expanded: Vec<bool>,

    // -- Geometry records (one per mode) --
    pub(crate) discv: Vec<DiscGeom>,
    pub(crate) mapv: Vec<MapGeom>,
    pub(crate) treev: Vec<TreeGeom>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,
    pub(crate) epoch: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,
}

impl Default for FsTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FsTree {
    /// Creates a store holding only the metanode.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            kind: Vec::new(),
            name: Vec::new(),
            size: Vec::new(),
            subtree: Vec::new(),
            flags: Vec::new(),
            deployment: Vec::new(),
            geom_expanded: Vec::new(),
            discv: Vec::new(),
            mapv: Vec::new(),
            treev: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            epoch: NEXT_EPOCH.fetch_add(1, AtomicOrdering::Relaxed),
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
        };
        let meta = tree.alloc(NodeKind::Metanode, String::new(), 0);
        tree.flags[meta as usize].expanded = true;
        tree.deployment[meta as usize] = 1.0;
        tree
    }

    // -- Allocation API --

    /// Creates a detached node and returns its handle.
    ///
    /// The node starts collapsed, with no parent and zeroed geometry.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is [`NodeKind::Metanode`]; a store has exactly one.
    pub fn create_node(&mut self, kind: NodeKind, name: impl Into<String>, size: u64) -> NodeId {
        assert!(
            kind != NodeKind::Metanode,
            "a tree has exactly one metanode"
        );
        let idx = self.alloc(kind, name.into(), size);
        NodeId {
            idx,
            generation: self.generation[idx as usize],
            epoch: self.epoch,
        }
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale, if the node is the metanode, or if it
    /// still has children.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(idx != 0, "cannot destroy the metanode");
        assert!(
            self.first_child[idx as usize] == INVALID,
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.unlink_from_parent(idx);
        }
        self.dirty.remove_key(idx);
        self.generation[idx as usize] += 1;
        self.free_list.push(idx);
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    ///
    /// Handles issued by a different store are never alive.
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.epoch == self.epoch
            && (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Number of live nodes, including the metanode.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Topology API --

    /// Returns the metanode.
    #[must_use]
    pub fn metanode(&self) -> NodeId {
        self.id_at(0)
    }

    /// Returns the root directory, if the scanner attached one.
    #[must_use]
    pub fn root_dir(&self) -> Option<NodeId> {
        let first = self.first_child[0];
        (first != INVALID).then(|| self.id_at(first))
    }

    /// Adds `child` as the last child of `parent`.
    ///
    /// The parent comes to depend on the child in the rearrange and branch
    /// channels, so marking a node eagerly also marks its ancestors.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, if `child` already has a parent, if
    /// `parent` is not a directory, or if the metanode already has its root.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.kind[p as usize].is_container(),
            "parent must be a directory"
        );
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        assert!(
            p != 0 || self.first_child[0] == INVALID,
            "metanode already has a root directory"
        );
        assert!(
            p != 0 || self.kind[c as usize] == NodeKind::Directory,
            "the metanode's child must be a directory"
        );

        self.parent[c as usize] = p;
        self.prev_sibling[c as usize] = INVALID;
        self.next_sibling[c as usize] = INVALID;

        if self.first_child[p as usize] == INVALID {
            self.first_child[p as usize] = c;
        } else {
            let mut last = self.first_child[p as usize];
            while self.next_sibling[last as usize] != INVALID {
                last = self.next_sibling[last as usize];
            }
            self.next_sibling[last as usize] = c;
            self.prev_sibling[c as usize] = last;
        }

        let _ = self.dirty.add_dependency(p, c, dirty::REARRANGE);
        let _ = self.dirty.add_dependency(p, c, dirty::BRANCHES);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, self.first_child[id.idx as usize])
    }

    /// Returns an iterator over the ancestors of a node, nearest first,
    /// ending with the metanode.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        self.validate(id);
        Ancestors::new(self, self.parent[id.idx as usize])
    }

    /// Returns a pre-order iterator over the strict descendants of a node.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        self.validate(id);
        Descendants::new(self, self.first_child[id.idx as usize])
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).count()
    }

    /// Number of ancestors below the metanode (the root directory is depth 0).
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count().saturating_sub(1)
    }

    // -- Scanner handoff --

    /// Aggregates subtree statistics and sorts every child list.
    ///
    /// Children are ordered directories first, then by size descending (a
    /// directory's size being its own plus its subtree's), then by name,
    /// case-insensitively.
    pub fn finalize(&mut self) {
        let order = self.post_order();
        for &idx in &order {
            let mut info = SubtreeInfo::default();
            let mut c = self.first_child[idx as usize];
            while c != INVALID {
                let cu = c as usize;
                info.size += self.size[cu] + self.subtree[cu].size;
                info.counts[self.kind[cu].index()] += 1;
                for (total, n) in info.counts.iter_mut().zip(self.subtree[cu].counts) {
                    *total += n;
                }
                c = self.next_sibling[cu];
            }
            self.subtree[idx as usize] = info;
        }

        for &idx in &order {
            self.sort_children(idx);
        }
    }

    // -- Property getters --

    /// Returns the kind of a node.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.kind[id.idx as usize]
    }

    /// Whether the node is a directory.
    #[must_use]
    pub fn is_dir(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Directory
    }

    /// Returns the name of a node.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.validate(id);
        &self.name[id.idx as usize]
    }

    /// Returns the node's own size in bytes.
    #[must_use]
    pub fn size(&self, id: NodeId) -> u64 {
        self.validate(id);
        self.size[id.idx as usize]
    }

    /// Returns the aggregated subtree statistics.
    ///
    /// Only valid after [`finalize`](Self::finalize).
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> SubtreeInfo {
        self.validate(id);
        self.subtree[id.idx as usize]
    }

    /// Own size plus subtree size for directories, own size otherwise.
    #[must_use]
    pub fn total_size(&self, id: NodeId) -> u64 {
        self.validate(id);
        self.total_size_at(id.idx)
    }

    /// Returns the flags of a node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.validate(id);
        self.flags[id.idx as usize]
    }

    /// Returns the deployment of a node.
    #[must_use]
    pub fn deployment(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.deployment[id.idx as usize]
    }

    /// Whether the node is fully collapsed.
    #[must_use]
    pub fn is_collapsed(&self, id: NodeId) -> bool {
        self.deployment(id) < EPSILON
    }

    /// Whether the node is fully expanded.
    #[must_use]
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.deployment(id) > 1.0 - EPSILON
    }

    /// Whether the last geometry pass built this directory expanded.
    #[must_use]
    pub fn geom_expanded(&self, id: NodeId) -> bool {
        self.validate(id);
        self.geom_expanded[id.idx as usize]
    }

    /// Returns the disc layout record.
    #[must_use]
    pub fn discv(&self, id: NodeId) -> &DiscGeom {
        self.validate(id);
        &self.discv[id.idx as usize]
    }

    /// Returns the treemap layout record.
    #[must_use]
    pub fn mapv(&self, id: NodeId) -> &MapGeom {
        self.validate(id);
        &self.mapv[id.idx as usize]
    }

    /// Returns the radial-tree layout record.
    #[must_use]
    pub fn treev(&self, id: NodeId) -> &TreeGeom {
        self.validate(id);
        &self.treev[id.idx as usize]
    }

    // -- Mutation API --

    /// Sets the flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        self.validate(id);
        self.flags[id.idx as usize] = flags;
    }

    /// Sets the deployment of a node.
    ///
    /// Outside of layout initialization, deployment changes go through the
    /// morph engine.
    pub fn set_deployment(&mut self, id: NodeId, deployment: f64) {
        self.validate(id);
        self.deployment[id.idx as usize] = deployment;
    }

    pub(crate) fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        self.validate(id);
        self.flags[id.idx as usize].expanded = expanded;
    }

    pub(crate) fn set_geom_expanded(&mut self, id: NodeId, built_expanded: bool) {
        self.validate(id);
        self.geom_expanded[id.idx as usize] = built_expanded;
    }

    pub(crate) fn discv_mut(&mut self, id: NodeId) -> &mut DiscGeom {
        self.validate(id);
        &mut self.discv[id.idx as usize]
    }

    pub(crate) fn mapv_mut(&mut self, id: NodeId) -> &mut MapGeom {
        self.validate(id);
        &mut self.mapv[id.idx as usize]
    }

    pub(crate) fn treev_mut(&mut self, id: NodeId) -> &mut TreeGeom {
        self.validate(id);
        &mut self.treev[id.idx as usize]
    }

    /// Marks the node's geometry stale in every geometry channel.
    pub(crate) fn mark_rebuild(&mut self, id: NodeId) {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::BODY);
        self.dirty.mark(id.idx, dirty::BRANCHES);
        self.dirty.mark(id.idx, dirty::LABELS);
    }

    /// Marks the node and every ancestor as needing rearrangement.
    pub(crate) fn mark_rearrange(&mut self, id: NodeId) {
        self.validate(id);
        self.dirty.mark_with(id.idx, dirty::REARRANGE, &EagerPolicy);
        self.dirty.mark_with(id.idx, dirty::BRANCHES, &EagerPolicy);
    }

    // -- Raw-index accessors --
    //
    // These accept raw slot indices (as found in `GeometryChanges`) rather
    // than `NodeId` handles, skipping generation validation.

    /// Returns the live handle for raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn id_at(&self, idx: u32) -> NodeId {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        NodeId {
            idx,
            generation: self.generation[idx as usize],
            epoch: self.epoch,
        }
    }

    /// Returns the kind at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn kind_at(&self, idx: u32) -> NodeKind {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.kind[idx as usize]
    }

    /// Returns the deployment at raw slot `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= self.len`.
    #[must_use]
    pub fn deployment_at(&self, idx: u32) -> f64 {
        assert!(
            idx < self.len,
            "slot index {idx} out of range (len {})",
            self.len
        );
        self.deployment[idx as usize]
    }

    // -- Internal helpers --

    /// Panics if the handle is stale or was issued by another store.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.epoch == self.epoch
                && id.idx < self.len
                && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    pub(crate) fn total_size_at(&self, idx: u32) -> u64 {
        let i = idx as usize;
        if self.kind[i].is_container() {
            self.size[i] + self.subtree[i].size
        } else {
            self.size[i]
        }
    }

    fn alloc(&mut self, kind: NodeKind, name: String, size: u64) -> u32 {
        if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.generation[i] += 1;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.kind[i] = kind;
            self.name[i] = name;
            self.size[i] = size;
            self.subtree[i] = SubtreeInfo::default();
            self.flags[i] = NodeFlags::default();
            self.deployment[i] = 0.0;
            self.geom_expanded[i] = false;
            self.discv[i] = DiscGeom::default();
            self.mapv[i] = MapGeom::default();
            self.treev[i] = TreeGeom::default();
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.kind.push(kind);
            self.name.push(name);
            self.size.push(size);
            self.subtree.push(SubtreeInfo::default());
            self.flags.push(NodeFlags::default());
            self.deployment.push(0.0);
            self.geom_expanded.push(false);
            self.discv.push(DiscGeom::default());
            self.mapv.push(MapGeom::default());
            self.treev.push(TreeGeom::default());
            self.generation.push(0);
            idx
        }
    }

    /// Removes `idx` from its parent's child list and dependency edges.
    fn unlink_from_parent(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        let prev = self.prev_sibling[idx as usize];
        let next = self.next_sibling[idx as usize];

        if prev != INVALID {
            self.next_sibling[prev as usize] = next;
        } else {
            self.first_child[p as usize] = next;
        }
        if next != INVALID {
            self.prev_sibling[next as usize] = prev;
        }

        self.dirty.remove_dependency(p, idx, dirty::REARRANGE);
        self.dirty.remove_dependency(p, idx, dirty::BRANCHES);

        self.parent[idx as usize] = INVALID;
        self.prev_sibling[idx as usize] = INVALID;
        self.next_sibling[idx as usize] = INVALID;
    }

    /// Slot indices of every node reachable from the metanode, children
    /// before parents.
    fn post_order(&self) -> Vec<u32> {
        let mut out = Vec::with_capacity(self.len as usize);
        let mut stack = Vec::new();
        stack.push((0_u32, false));
        while let Some((idx, visited)) = stack.pop() {
            if visited {
                out.push(idx);
                continue;
            }
            stack.push((idx, true));
            let mut c = self.first_child[idx as usize];
            while c != INVALID {
                stack.push((c, false));
                c = self.next_sibling[c as usize];
            }
        }
        out
    }

    fn sort_children(&mut self, idx: u32) {
        let mut kids = Vec::new();
        let mut c = self.first_child[idx as usize];
        while c != INVALID {
            kids.push(c);
            c = self.next_sibling[c as usize];
        }
        if kids.len() < 2 {
            return;
        }
        kids.sort_by(|&a, &b| self.compare_siblings(a, b));

        self.first_child[idx as usize] = kids[0];
        let mut prev = INVALID;
        for (i, &k) in kids.iter().enumerate() {
            self.prev_sibling[k as usize] = prev;
            self.next_sibling[k as usize] = kids.get(i + 1).copied().unwrap_or(INVALID);
            prev = k;
        }
    }

    fn compare_siblings(&self, a: u32, b: u32) -> Ordering {
        let a_dir = self.kind[a as usize].is_container();
        let b_dir = self.kind[b as usize].is_container();
        b_dir
            .cmp(&a_dir)
            .then_with(|| self.total_size_at(b).cmp(&self.total_size_at(a)))
            .then_with(|| compare_names(&self.name[a as usize], &self.name[b as usize]))
    }
}

/// Case-insensitive name order, falling back to byte order for names that
/// differ only in case.
pub(crate) fn compare_names(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn names(tree: &FsTree, id: NodeId) -> Vec<&str> {
        tree.children(id).map(|c| tree.name(c)).collect()
    }

    #[test]
    fn new_store_holds_metanode() {
        let tree = FsTree::new();
        let meta = tree.metanode();
        assert_eq!(tree.kind(meta), NodeKind::Metanode, "slot 0 is the metanode");
        assert!(tree.root_dir().is_none(), "no root before the scanner runs");
        assert!(tree.is_expanded(meta), "metanode starts deployed");
        assert_eq!(tree.node_count(), 1, "only the metanode");
    }

    #[test]
    fn create_and_destroy() {
        let mut tree = FsTree::new();
        let id = tree.create_node(NodeKind::RegFile, "a", 10);
        assert!(tree.is_alive(id), "fresh node is alive");
        tree.destroy_node(id);
        assert!(!tree.is_alive(id), "destroyed node is not alive");

        let reused = tree.create_node(NodeKind::RegFile, "b", 10);
        assert_eq!(reused.index(), id.index(), "slot reused");
        assert_ne!(reused.generation(), id.generation(), "generation bumped");
    }

    #[test]
    fn add_child_and_query() {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        let a = tree.create_node(NodeKind::RegFile, "a", 1);
        let b = tree.create_node(NodeKind::RegFile, "b", 2);
        tree.add_child(tree.metanode(), root);
        tree.add_child(root, a);
        tree.add_child(root, b);

        assert_eq!(tree.root_dir(), Some(root), "root attached");
        assert_eq!(tree.parent(a), Some(root), "parent link");
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, b], "order");
        assert_eq!(tree.depth(a), 1, "root dir is depth 0");
        assert_eq!(
            tree.ancestors(a).collect::<Vec<_>>(),
            vec![root, tree.metanode()],
            "nearest first"
        );
    }

    #[test]
    fn finalize_aggregates_and_sorts() {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        let sub = tree.create_node(NodeKind::Directory, "sub", 0);
        let big = tree.create_node(NodeKind::RegFile, "Big", 500);
        let small = tree.create_node(NodeKind::RegFile, "alpha", 10);
        let tie = tree.create_node(NodeKind::RegFile, "Beta", 10);
        let nested = tree.create_node(NodeKind::Symlink, "link", 5);
        tree.add_child(tree.metanode(), root);
        tree.add_child(root, small);
        tree.add_child(root, big);
        tree.add_child(root, tie);
        tree.add_child(root, sub);
        tree.add_child(sub, nested);
        tree.finalize();

        let info = tree.subtree(root);
        assert_eq!(info.size, 525, "all descendant sizes");
        assert_eq!(info.count(NodeKind::RegFile), 3, "three regular files");
        assert_eq!(info.count(NodeKind::Directory), 1, "one subdirectory");
        assert_eq!(info.count(NodeKind::Symlink), 1, "nested symlink counted");
        assert_eq!(tree.subtree(tree.metanode()).size, 525, "metanode aggregates");
        assert_eq!(
            names(&tree, root),
            vec!["sub", "Big", "alpha", "Beta"],
            "dirs first, size desc, name case-insensitive"
        );
    }

    #[test]
    fn destroy_unlinks_from_parent() {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        let a = tree.create_node(NodeKind::RegFile, "a", 1);
        let b = tree.create_node(NodeKind::RegFile, "b", 1);
        let c = tree.create_node(NodeKind::RegFile, "c", 1);
        tree.add_child(tree.metanode(), root);
        tree.add_child(root, a);
        tree.add_child(root, b);
        tree.add_child(root, c);
        tree.destroy_node(b);
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, c], "b gone");
    }

    #[test]
    fn rearrange_marks_ancestors() {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        let sub = tree.create_node(NodeKind::Directory, "sub", 0);
        tree.add_child(tree.metanode(), root);
        tree.add_child(root, sub);
        tree.mark_rearrange(sub);
        let rearrange: Vec<u32> = tree
            .dirty
            .drain(dirty::REARRANGE)
            .deterministic()
            .run()
            .collect();
        let branches: Vec<u32> = tree
            .dirty
            .drain(dirty::BRANCHES)
            .deterministic()
            .run()
            .collect();
        assert!(rearrange.contains(&sub.idx), "node marked");
        assert!(rearrange.contains(&root.idx), "parent marked");
        assert!(branches.contains(&0), "metanode branches marked");
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_access() {
        let mut tree = FsTree::new();
        let id = tree.create_node(NodeKind::RegFile, "a", 1);
        tree.destroy_node(id);
        let _ = tree.deployment(id);
    }

    #[test]
    fn handles_from_another_tree_are_stale() {
        let mut first = FsTree::new();
        let mut second = FsTree::new();
        let a = first.create_node(NodeKind::RegFile, "a", 1);
        let b = second.create_node(NodeKind::RegFile, "b", 1);
        assert_eq!((a.index(), a.generation()), (b.index(), b.generation()), "same slot");
        assert_ne!(a.epoch(), b.epoch(), "different trees");
        assert!(!second.is_alive(a), "foreign handle rejected");
        assert!(!second.is_alive(first.metanode()), "foreign metanode rejected");
        assert!(second.is_alive(b), "own handle accepted");
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn foreign_handle_panics_on_access() {
        let mut first = FsTree::new();
        let a = first.create_node(NodeKind::RegFile, "a", 1);
        let mut second = FsTree::new();
        let _ = second.create_node(NodeKind::RegFile, "b", 1);
        let _ = second.name(a);
    }

    #[test]
    #[should_panic(expected = "parent must be a directory")]
    fn file_cannot_have_children() {
        let mut tree = FsTree::new();
        let f = tree.create_node(NodeKind::RegFile, "f", 1);
        let g = tree.create_node(NodeKind::RegFile, "g", 1);
        tree.add_child(f, g);
    }

    #[test]
    #[should_panic(expected = "metanode already has a root directory")]
    fn metanode_has_one_child() {
        let mut tree = FsTree::new();
        let a = tree.create_node(NodeKind::Directory, "a", 0);
        let b = tree.create_node(NodeKind::Directory, "b", 0);
        tree.add_child(tree.metanode(), a);
        tree.add_child(tree.metanode(), b);
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut tree = FsTree::new();
        let d = tree.create_node(NodeKind::Directory, "d", 0);
        let f = tree.create_node(NodeKind::RegFile, "f", 1);
        tree.add_child(d, f);
        tree.destroy_node(d);
    }
}
