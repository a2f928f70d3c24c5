//! Branch tree reconstruction
//!
//! Rebuilds parent/child structure from a flat list of branches. Nodes are
//! addressed by their position in the input slice, so every adjacency list
//! is a plain `Vec<usize>` and siblings keep the order they arrived in.

use std::collections::{HashMap, HashSet};

use crate::models::Branch;

/// Forest of branches built from `parent` links
///
/// Orphans (parent missing from the set) and self-parented branches become
/// roots. Cycles that cannot be reached from any root are broken at their
/// first member in input order, which is appended to the root list. After
/// construction every branch is reachable from exactly one root.
#[derive(Debug, Clone)]
pub struct BranchTree<'a> {
    branches: &'a [Branch],
    index: HashMap<&'a str, usize>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl<'a> BranchTree<'a> {
    pub fn new(branches: &'a [Branch]) -> Self {
        let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(branches.len());
        for (i, branch) in branches.iter().enumerate() {
            // First occurrence wins on duplicate names
            index.entry(branch.name.as_str()).or_insert(i);
        }

        let mut parents: Vec<Option<usize>> = Vec::with_capacity(branches.len());
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); branches.len()];
        let mut roots = Vec::new();

        for (i, branch) in branches.iter().enumerate() {
            let parent = branch
                .parent
                .as_deref()
                .and_then(|name| index.get(name).copied())
                .filter(|&p| p != i);

            match parent {
                Some(p) => children[p].push(i),
                None => roots.push(i),
            }
            parents.push(parent);
        }

        let mut tree = Self {
            branches,
            index,
            parents,
            children,
            roots,
        };
        tree.break_cycles();
        tree
    }

    /// Promote one member of every unreachable cycle to a root
    ///
    /// Branches hanging off a cycle keep their parent; only the cycle member
    /// with the lowest input position loses its parent link.
    fn break_cycles(&mut self) {
        let mut visited = vec![false; self.branches.len()];
        for &root in &self.roots {
            self.mark_reachable(root, &mut visited);
        }

        for i in 0..self.branches.len() {
            if visited[i] {
                continue;
            }
            let head = match self.cycle_node(i) {
                Some(member) => self.first_cycle_member(member),
                None => i,
            };
            if let Some(p) = self.parents[head].take() {
                self.children[p].retain(|&c| c != head);
            }
            self.roots.push(head);
            self.mark_reachable(head, &mut visited);
        }
    }

    /// First node that repeats while walking up from `start`
    fn cycle_node(&self, start: usize) -> Option<usize> {
        let mut seen = HashSet::new();
        let mut node = start;
        loop {
            if !seen.insert(node) {
                return Some(node);
            }
            node = self.parents[node]?;
        }
    }

    /// Lowest input position on the cycle through `member`
    fn first_cycle_member(&self, member: usize) -> usize {
        let mut first = member;
        let mut node = member;
        while let Some(p) = self.parents[node] {
            if p == member {
                break;
            }
            first = first.min(p);
            node = p;
        }
        first
    }

    fn mark_reachable(&self, start: usize, visited: &mut [bool]) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            stack.extend(self.children[node].iter().copied());
        }
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn branch(&self, idx: usize) -> &'a Branch {
        &self.branches[idx]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Resolved parent, `None` for roots
    pub fn parent_of(&self, idx: usize) -> Option<usize> {
        self.parents[idx]
    }

    /// Direct children in input order
    pub fn children_of(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn root_branches(&self) -> impl Iterator<Item = &'a Branch> + '_ {
        self.roots.iter().map(|&i| &self.branches[i])
    }

    /// Names of the direct children of every branch that has any
    pub fn children_map(&self) -> HashMap<&'a str, Vec<&'a str>> {
        let mut map = HashMap::new();
        for (i, kids) in self.children.iter().enumerate() {
            if kids.is_empty() {
                continue;
            }
            map.insert(
                self.branches[i].name.as_str(),
                kids.iter().map(|&c| self.branches[c].name.as_str()).collect(),
            );
        }
        map
    }

    /// Depth-first preorder from each root, siblings in input order
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.branches.len());
        let mut visited = vec![false; self.branches.len()];
        let mut stack = Vec::new();

        for &root in &self.roots {
            stack.push(root);
            while let Some(node) = stack.pop() {
                if visited[node] {
                    continue;
                }
                visited[node] = true;
                order.push(node);
                stack.extend(self.children[node].iter().rev().copied());
            }
        }

        order
    }

    /// Branches in depth-first preorder
    pub fn preorder_branches(&self) -> Vec<&'a Branch> {
        self.preorder()
            .into_iter()
            .map(|i| &self.branches[i])
            .collect()
    }
}
