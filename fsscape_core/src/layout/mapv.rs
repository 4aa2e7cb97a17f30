// Copyright 2026 the Fsscape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangular treemap layout.
//!
//! Each directory is a raised block whose top face is partitioned among its
//! children in rows. Children are taken in order (largest first) and packed
//! into the current row until the next one would make the row's blocks
//! narrower than they are deep; the row is then closed and a new one opened.
//! Every child gets a border carved out of its block so that the inner
//! rectangle's area is proportional to the child's size.

use alloc::vec::Vec;

use kurbo::Point;

use crate::animation::{Animator, MorphKey};
use crate::tree::{FsTree, NodeId, NodeKind};

/// Tunables for the treemap layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapVConfig {
    /// Border between blocks, as a proportion of the parent's side.
    pub border_scale: f64,
    /// Width to depth ratio of the root rectangle.
    pub root_aspect_ratio: f64,
    /// Height of a directory block.
    pub dir_height: f64,
    /// Height of a leaf block.
    pub leaf_height: f64,
    /// Floor applied to sizes when computing a block's footprint.
    pub min_size: u64,
    /// Floor applied to sizes when computing a block's content area.
    pub min_leaf_size: u64,
}

impl MapVConfig {
    /// The standard treemap layout.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            border_scale: 0.01,
            root_aspect_ratio: 1.2,
            dir_height: 384.0,
            leaf_height: 128.0,
            min_size: 4096,
            min_leaf_size: 256,
        }
    }
}

impl Default for MapVConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Slope of a block's sides, as a fraction of its shorter dimension.
#[must_use]
pub fn side_slant_ratio(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Directory => 0.032,
        NodeKind::RegFile => 0.064,
        NodeKind::Symlink => 0.333,
        NodeKind::CharDev | NodeKind::BlockDev => 0.25,
        _ => 0.0,
    }
}

/// Lays out the whole tree.
///
/// The root rectangle is sized so its area equals the total size of the
/// tree, then centered on the origin.
pub fn init(tree: &mut FsTree, animator: &mut Animator, config: &MapVConfig) {
    let Some(root) = tree.root_dir() else {
        return;
    };
    let meta = tree.metanode();
    tree.mapv_mut(meta).height = 0.0;

    let depth = (tree.subtree(meta).size as f64 / config.root_aspect_ratio).sqrt();
    let width = config.root_aspect_ratio * depth;
    {
        let g = tree.mapv_mut(root);
        g.c0 = Point::new(-0.5 * width, -0.5 * depth);
        g.c1 = Point::new(0.5 * width, 0.5 * depth);
        g.height = config.dir_height;
    }
    init_recursive(tree, animator, config, root);
}

/// Partitions the top face of `dnode` among its children, recursing into
/// subdirectories.
///
/// `dnode`'s own rectangle and height must already be set.
pub fn init_recursive(tree: &mut FsTree, animator: &mut Animator, config: &MapVConfig, dnode: NodeId) {
    if tree.kind(dnode) == NodeKind::Directory {
        animator.morph_break(MorphKey::Deployment(dnode));
        let expanded = tree.flags(dnode).expanded;
        tree.set_deployment(dnode, if expanded { 1.0 } else { 0.0 });
        tree.mark_rebuild(dnode);
    }

    let geom = *tree.mapv(dnode);
    let center = geom.center();
    let mut dims_x = geom.width();
    let mut dims_y = geom.depth();
    let slant = side_slant_ratio(NodeKind::Directory);
    dims_x -= 2.0 * geom.height.min(slant * dims_x);
    dims_y -= 2.0 * geom.height.min(slant * dims_y);

    let nominal_border = (config.border_scale * (dims_x * dims_y).max(0.0).sqrt()).min(dims_x.min(dims_y) / 3.0);
    dims_x -= nominal_border;
    dims_y -= nominal_border;
    let dir_area = dims_x * dims_y;

    let mut blocks: Vec<Block> = Vec::new();
    let mut total = 0.0;
    for child in tree.children(dnode) {
        let area = (footprint_size(tree, config, child).sqrt() + nominal_border).powi(2);
        total += area;
        blocks.push(Block { node: child, area });
    }
    if blocks.is_empty() {
        return;
    }

    if dims_x <= 0.0 || dims_y <= 0.0 || total <= 0.0 {
        // Nothing fits; children collapse onto the parent's center.
        for b in &blocks {
            let g = tree.mapv_mut(b.node);
            g.c0 = center;
            g.c1 = center;
            g.height = child_height(config, tree.is_dir(b.node));
        }
        for b in &blocks {
            if tree.is_dir(b.node) {
                init_recursive(tree, animator, config, b.node);
            }
        }
        return;
    }

    let scale = dir_area / total;
    let rows = partition_rows(&mut blocks, scale, dims_x);

    let start = Point::new(center.x + 0.5 * dims_x, center.y + 0.5 * dims_y);
    let mut pos = start;
    for row in &rows {
        let depth = row.area / dims_x;
        pos.x = start.x;
        for b in &blocks[row.first..row.first + row.len] {
            let width = b.area / depth;
            let content = scale * content_size(tree, config, b.node);
            let k = width + depth;
            let border = 0.25 * (k - (k * k - 4.0 * (b.area - content)).max(0.0).sqrt());
            let is_dir = tree.is_dir(b.node);
            let g = tree.mapv_mut(b.node);
            g.c0 = Point::new(pos.x - width + border, pos.y - depth + border);
            g.c1 = Point::new(pos.x - border, pos.y - border);
            g.height = child_height(config, is_dir);
            pos.x -= width;
        }
        pos.y -= depth;
    }

    for b in &blocks {
        if tree.is_dir(b.node) {
            init_recursive(tree, animator, config, b.node);
        }
    }
}

/// Bottom of a node's block: the sum of its ancestors' heights.
#[must_use]
pub fn node_z0(tree: &FsTree, node: NodeId) -> f64 {
    tree.ancestors(node).map(|a| tree.mapv(a).height).sum()
}

/// Tallest stack of blocks standing on `dnode`'s top face, or 0 when
/// `dnode` is not expanded.
#[must_use]
pub fn max_expanded_height(tree: &FsTree, dnode: NodeId) -> f64 {
    assert!(tree.is_dir(dnode), "max_expanded_height takes a directory");
    if !tree.flags(dnode).expanded {
        return 0.0;
    }
    let mut max = 0.0_f64;
    for child in tree.children(dnode) {
        let height = tree.mapv(child).height;
        if tree.is_dir(child) {
            max = max.max(height + max_expanded_height(tree, child));
        } else {
            // Leaves follow directories, largest first.
            max = max.max(height);
            break;
        }
    }
    max
}

fn footprint_size(tree: &FsTree, config: &MapVConfig, node: NodeId) -> f64 {
    let mut size = tree.size(node).max(config.min_size);
    if tree.is_dir(node) {
        size += tree.subtree(node).size;
    }
    size as f64
}

fn content_size(tree: &FsTree, config: &MapVConfig, node: NodeId) -> f64 {
    let mut size = tree.size(node).max(config.min_leaf_size);
    if tree.is_dir(node) {
        size += tree.subtree(node).size;
    }
    size as f64
}

fn child_height(config: &MapVConfig, is_dir: bool) -> f64 {
    if is_dir {
        config.dir_height
    } else {
        config.leaf_height
    }
}

/// Scales every block's area and splits the sequence into rows.
fn partition_rows(blocks: &mut [Block], scale: f64, row_width: f64) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::new();
    let mut open = false;
    for (i, b) in blocks.iter_mut().enumerate() {
        b.area *= scale;
        if !open {
            rows.push(Row {
                first: i,
                len: 0,
                area: 0.0,
            });
            open = true;
        }
        let Some(row) = rows.last_mut() else {
            unreachable!("a row was just opened");
        };
        row.len += 1;
        row.area += b.area;
        let depth = row.area / row_width;
        let width = b.area / depth;
        if width / depth < 1.0 {
            open = false;
        }
    }
    rows
}

#[derive(Clone, Copy, Debug)]
struct Block {
    node: NodeId,
    area: f64,
}

#[derive(Clone, Copy, Debug)]
struct Row {
    first: usize,
    len: usize,
    area: f64,
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::time::Timebase;
    use crate::tree::MapGeom;

    fn flat_tree(sizes: &[u64]) -> (FsTree, NodeId) {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        tree.add_child(tree.metanode(), root);
        for (i, &s) in sizes.iter().enumerate() {
            let f = tree.create_node(NodeKind::RegFile, alloc::format!("f{i}"), s);
            tree.add_child(root, f);
        }
        tree.finalize();
        (tree, root)
    }

    fn rect(g: &MapGeom) -> Rect {
        Rect::from_points(g.c0, g.c1)
    }

    fn assert_disjoint(tree: &FsTree, nodes: &[NodeId]) {
        for (i, &a) in nodes.iter().enumerate() {
            for &b in &nodes[i + 1..] {
                let overlap = rect(tree.mapv(a)).intersect(rect(tree.mapv(b)));
                assert!(overlap.area() < 1e-6, "{a:?} and {b:?} overlap by {}", overlap.area());
            }
        }
    }

    #[test]
    fn thousand_square_root_splits_by_size() {
        let (mut tree, root) = flat_tree(&[100, 50, 10]);
        {
            let g = tree.mapv_mut(root);
            g.c0 = Point::new(-500.0, -500.0);
            g.c1 = Point::new(500.0, 500.0);
            g.height = 384.0;
        }
        let config = MapVConfig {
            min_size: 0,
            min_leaf_size: 0,
            ..MapVConfig::standard()
        };
        let mut animator = Animator::new(Timebase::NANOS);
        init_recursive(&mut tree, &mut animator, &config, root);

        let kids: Vec<_> = tree.children(root).collect();
        assert_eq!(kids.len(), 3, "three children");
        assert_disjoint(&tree, &kids);

        let areas: Vec<f64> = kids.iter().map(|&k| rect(tree.mapv(k)).area()).collect();
        assert!((areas[0] / areas[1] - 2.0).abs() < 1e-6, "100:50, got {areas:?}");
        assert!((areas[0] / areas[2] - 10.0).abs() < 1e-6, "100:10, got {areas:?}");

        let parent = rect(tree.mapv(root));
        for &k in &kids {
            let r = rect(tree.mapv(k));
            assert!(
                r.x0 >= parent.x0 && r.y0 >= parent.y0 && r.x1 <= parent.x1 && r.y1 <= parent.y1,
                "{k:?} inside the root"
            );
            assert_eq!(tree.mapv(k).height, 128.0, "leaf height");
        }
    }

    #[test]
    fn root_area_matches_total_size() {
        let (mut tree, root) = flat_tree(&[40_000, 20_000, 10_000]);
        let mut animator = Animator::new(Timebase::NANOS);
        init(&mut tree, &mut animator, &MapVConfig::standard());
        let g = tree.mapv(root);
        let total = tree.subtree(tree.metanode()).size as f64;
        assert!((g.width() * g.depth() - total).abs() < 1e-6, "area equals size");
        assert!((g.width() / g.depth() - 1.2).abs() < 1e-9, "aspect ratio");
        assert!(g.center().distance(Point::ORIGIN) < 1e-9, "centered");
    }

    #[test]
    fn many_children_are_disjoint_and_ordered() {
        let sizes: Vec<u64> = (1..=20).map(|i| i * 10_000).collect();
        let (mut tree, root) = flat_tree(&sizes);
        let mut animator = Animator::new(Timebase::NANOS);
        init(&mut tree, &mut animator, &MapVConfig::standard());
        let kids: Vec<_> = tree.children(root).collect();
        assert_disjoint(&tree, &kids);
        for w in kids.windows(2) {
            assert!(
                rect(tree.mapv(w[0])).area() >= rect(tree.mapv(w[1])).area() - 1e-6,
                "larger children get larger rectangles"
            );
        }
    }

    #[test]
    fn nested_directories_stack_heights() {
        let mut tree = FsTree::new();
        let root = tree.create_node(NodeKind::Directory, "root", 0);
        let sub = tree.create_node(NodeKind::Directory, "sub", 0);
        let leaf = tree.create_node(NodeKind::RegFile, "leaf", 50_000);
        tree.add_child(tree.metanode(), root);
        tree.add_child(root, sub);
        tree.add_child(sub, leaf);
        tree.finalize();
        let mut animator = Animator::new(Timebase::NANOS);
        init(&mut tree, &mut animator, &MapVConfig::standard());

        assert_eq!(node_z0(&tree, leaf), 768.0, "two directory heights below the leaf");
        assert_eq!(max_expanded_height(&tree, root), 0.0, "collapsed root");

        tree.set_flags(root, crate::tree::NodeFlags { expanded: true });
        tree.set_flags(sub, crate::tree::NodeFlags { expanded: true });
        assert_eq!(max_expanded_height(&tree, root), 384.0 + 128.0, "dir plus leaf");
    }

    #[test]
    fn empty_directory_collapses_children_to_center() {
        let (mut tree, root) = flat_tree(&[10]);
        {
            let g = tree.mapv_mut(root);
            g.c0 = Point::ORIGIN;
            g.c1 = Point::ORIGIN;
            g.height = 384.0;
        }
        let mut animator = Animator::new(Timebase::NANOS);
        init_recursive(&mut tree, &mut animator, &MapVConfig::standard(), root);
        let kid = tree.children(root).next().expect("one child");
        let g = tree.mapv(kid);
        assert!(g.c0.x.is_finite() && g.c1.y.is_finite(), "no NaN");
        assert_eq!(g.c0, g.c1, "zero-size rectangle");
    }
}
