// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::{INVALID, NodeId};
use super::store::FsTree;

/// An iterator over the direct children of a node.
///
/// Created by [`FsTree::children`].
#[derive(Debug)]
pub struct Children<'a> {
    tree: &'a FsTree,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(tree: &'a FsTree, first: u32) -> Self {
        Self {
            tree,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.next_sibling[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// An iterator walking from a node's parent up to the metanode.
///
/// Created by [`FsTree::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    tree: &'a FsTree,
    current: u32,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a FsTree, start: u32) -> Self {
        Self {
            tree,
            current: start,
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.tree.parent[idx as usize];
        Some(self.tree.id_at(idx))
    }
}

/// A depth-first pre-order iterator over a node's strict descendants.
///
/// Created by [`FsTree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a FsTree,
    stack: Vec<u32>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(tree: &'a FsTree, first: u32) -> Self {
        let mut stack = Vec::new();
        if first != INVALID {
            stack.push(first);
        }
        Self { tree, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.stack.pop()?;
        let next = self.tree.next_sibling[idx as usize];
        if next != INVALID {
            self.stack.push(next);
        }
        let child = self.tree.first_child[idx as usize];
        if child != INVALID {
            self.stack.push(child);
        }
        Some(self.tree.id_at(idx))
    }
}
