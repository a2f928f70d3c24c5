//! Top-down tree layout for a single stack
//!
//! Leaves take consecutive horizontal slots, internal nodes are centered
//! over the span of their children, and every level sits `V_GAP` below its
//! parent. Coordinates are node centers. The result is normalized so the
//! whole diagram, node extents included, fits in `[0, width] x [0, height]`.

use serde::Serialize;

use super::tree::BranchTree;
use crate::models::Branch;

pub const NODE_WIDTH: f64 = 160.0;
pub const NODE_HEIGHT: f64 = 56.0;
/// Horizontal gap between neighbouring leaves
pub const H_GAP: f64 = 40.0;
/// Vertical distance between levels
pub const V_GAP: f64 = 80.0;
pub const PADDING: f64 = 20.0;

/// A branch placed in the diagram
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode<'a> {
    pub branch: &'a Branch,
    pub x: f64,
    pub y: f64,
}

/// Connector from a parent's bottom edge to a child's top edge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutEdge {
    pub parent_name: String,
    pub child_name: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub needs_restack: bool,
}

/// Positioned nodes and edges plus the diagram bounds
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLayout<'a> {
    pub nodes: Vec<LayoutNode<'a>>,
    pub edges: Vec<LayoutEdge>,
    pub width: f64,
    pub height: f64,
}

impl<'a> TreeLayout<'a> {
    /// True when there is nothing to draw; callers show "No branches in this stack"
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, name: &str) -> Option<&LayoutNode<'a>> {
        self.nodes.iter().find(|n| n.branch.name == name)
    }
}

/// Pending post-order work for one node
struct Frame {
    node: usize,
    depth: usize,
    next_child: usize,
    /// Horizontal span of the children placed so far
    span: Option<(f64, f64)>,
}

impl Frame {
    fn new(node: usize, depth: usize) -> Self {
        Self {
            node,
            depth,
            next_child: 0,
            span: None,
        }
    }
}

fn merge_span(a: Option<(f64, f64)>, b: (f64, f64)) -> (f64, f64) {
    match a {
        Some((lo, hi)) => (lo.min(b.0), hi.max(b.1)),
        None => b,
    }
}

/// Raw (unnormalized) center of every node, indexed like the input
fn place(tree: &BranchTree<'_>) -> Vec<Option<(f64, f64)>> {
    let mut positions: Vec<Option<(f64, f64)>> = vec![None; tree.len()];
    let mut next_x = 0.0;
    let mut stack: Vec<Frame> = Vec::new();

    for &root in tree.roots() {
        if positions[root].is_some() {
            continue;
        }
        stack.push(Frame::new(root, 0));

        while let Some(frame) = stack.last_mut() {
            let children = tree.children_of(frame.node);
            if frame.next_child < children.len() {
                let child = children[frame.next_child];
                frame.next_child += 1;
                if positions[child].is_none() {
                    let depth = frame.depth + 1;
                    stack.push(Frame::new(child, depth));
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let y = frame.depth as f64 * V_GAP;
            let (x, span) = match frame.span {
                None => {
                    let x = next_x;
                    next_x += NODE_WIDTH + H_GAP;
                    (x, (x, x))
                }
                Some((lo, hi)) => {
                    let x = (lo + hi) / 2.0;
                    (x, (lo.min(x), hi.max(x)))
                }
            };
            positions[frame.node] = Some((x, y));

            if let Some(parent) = stack.last_mut() {
                parent.span = Some(merge_span(parent.span, span));
            }
        }
    }

    positions
}

/// Compute the diagram for one stack's branches
pub fn compute_tree_layout(branches: &[Branch]) -> TreeLayout<'_> {
    if branches.is_empty() {
        return TreeLayout::default();
    }

    let tree = BranchTree::new(branches);
    let positions = place(&tree);

    let mut nodes: Vec<LayoutNode<'_>> = Vec::with_capacity(branches.len());
    for (i, branch) in branches.iter().enumerate() {
        if let Some((x, y)) = positions[i] {
            nodes.push(LayoutNode { branch, x, y });
        }
    }

    let mut edges = Vec::new();
    for (i, branch) in branches.iter().enumerate() {
        let Some(p) = tree.parent_of(i) else { continue };
        let (Some(parent_pos), Some(child_pos)) = (positions[p], positions[i]) else {
            continue;
        };
        edges.push(LayoutEdge {
            parent_name: branches[p].name.clone(),
            child_name: branch.name.clone(),
            x1: parent_pos.0,
            y1: parent_pos.1 + NODE_HEIGHT / 2.0,
            x2: child_pos.0,
            y2: child_pos.1 - NODE_HEIGHT / 2.0,
            needs_restack: branch.needs_restack,
        });
    }

    let min_x = nodes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
    let max_x = nodes.iter().map(|n| n.x).fold(f64::NEG_INFINITY, f64::max);
    let min_y = nodes.iter().map(|n| n.y).fold(f64::INFINITY, f64::min);
    let max_y = nodes.iter().map(|n| n.y).fold(f64::NEG_INFINITY, f64::max);

    let offset_x = -min_x + NODE_WIDTH / 2.0 + PADDING;
    let offset_y = -min_y + NODE_HEIGHT / 2.0 + PADDING;

    for node in &mut nodes {
        node.x += offset_x;
        node.y += offset_y;
    }
    for edge in &mut edges {
        edge.x1 += offset_x;
        edge.x2 += offset_x;
        edge.y1 += offset_y;
        edge.y2 += offset_y;
    }

    TreeLayout {
        nodes,
        edges,
        width: (max_x - min_x) + NODE_WIDTH + PADDING * 2.0,
        height: (max_y - min_y) + NODE_HEIGHT + PADDING * 2.0,
    }
}
