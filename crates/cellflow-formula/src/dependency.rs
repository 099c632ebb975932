//! Dependency graph for formula calculation
//!
//! A directed graph where an edge `from -> to` means `to` reads `from`. The
//! graph orders its nodes for evaluation and isolates the ones that sit on a
//! cycle.

use ahash::{AHashMap, AHashSet};
use cellflow_core::{Error, Result};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

/// Result of [`Graph::topological_sort`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopSortResult<T> {
    /// Nodes in evaluation order: every edge goes from an earlier node to a later one
    pub sorted: Vec<T>,
    /// Nodes that lie on at least one directed cycle, in insertion order
    pub cycled: Vec<T>,
}

/// Directed graph over small copyable handles
///
/// Node handles are kept in insertion order, which makes every ordering the
/// graph produces deterministic for a given sequence of mutations.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    nodes: Vec<T>,
    index: AHashMap<T, usize>,
    /// Node index -> indices of nodes that depend on it
    dependents: Vec<Vec<usize>>,
    edges: AHashSet<(usize, usize)>,
}

impl<T> Default for Graph<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            index: AHashMap::new(),
            dependents: Vec::new(),
            edges: AHashSet::new(),
        }
    }
}

impl<T: Copy + Eq + Hash + Debug> Graph<T> {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; returns `false` if it was already present
    pub fn add_node(&mut self, node: T) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }
        self.index.insert(node, self.nodes.len());
        self.nodes.push(node);
        self.dependents.push(Vec::new());
        true
    }

    /// Add an edge: `to` depends on `from`
    ///
    /// Adding an edge that already exists is a no-op. Both endpoints must have
    /// been added with [`Graph::add_node`].
    pub fn add_edge(&mut self, from: T, to: T) -> Result<()> {
        let from_idx = self.index_of(from)?;
        let to_idx = self.index_of(to)?;

        if self.edges.insert((from_idx, to_idx)) {
            self.dependents[from_idx].push(to_idx);
        }
        Ok(())
    }

    /// Remove an edge; returns `false` if it did not exist
    pub fn remove_edge(&mut self, from: T, to: T) -> bool {
        let (Some(&from_idx), Some(&to_idx)) = (self.index.get(&from), self.index.get(&to)) else {
            return false;
        };

        if !self.edges.remove(&(from_idx, to_idx)) {
            return false;
        }
        self.dependents[from_idx].retain(|&idx| idx != to_idx);
        true
    }

    /// Check whether a node is present
    pub fn contains(&self, node: T) -> bool {
        self.index.contains_key(&node)
    }

    /// Check whether an edge is present
    pub fn has_edge(&self, from: T, to: T) -> bool {
        match (self.index.get(&from), self.index.get(&to)) {
            (Some(&from_idx), Some(&to_idx)) => self.edges.contains(&(from_idx, to_idx)),
            _ => false,
        }
    }

    /// Nodes that depend directly on `node`
    pub fn dependents(&self, node: T) -> impl Iterator<Item = T> + '_ {
        self.index
            .get(&node)
            .into_iter()
            .flat_map(move |&idx| self.dependents[idx].iter().map(move |&dep| self.nodes[dep]))
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.dependents.clear();
        self.edges.clear();
    }

    /// Order the graph for evaluation
    ///
    /// Nodes are removed in Kahn order, seeded and broken by insertion order.
    /// Whenever no node with zero remaining in-degree is left, the strongly
    /// connected components of what remains are computed and every node on a
    /// cycle is moved to `cycled`; the nodes they fed are released and the sort
    /// carries on. Nodes downstream of a cycle therefore stay in `sorted`.
    pub fn topological_sort(&self) -> TopSortResult<T> {
        let n = self.nodes.len();
        let mut in_degree = vec![0usize; n];
        for &(_, to) in &self.edges {
            in_degree[to] += 1;
        }

        let mut removed = vec![false; n];
        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut sorted = Vec::with_capacity(n);
        let mut cycled = Vec::new();

        loop {
            while let Some(idx) = queue.pop_front() {
                removed[idx] = true;
                sorted.push(idx);
                for &dep in &self.dependents[idx] {
                    in_degree[dep] -= 1;
                    if in_degree[dep] == 0 {
                        queue.push_back(dep);
                    }
                }
            }

            if sorted.len() + cycled.len() == n {
                break;
            }

            let on_cycle = self.cycle_members(&removed);
            if on_cycle.is_empty() {
                // Every remaining node has a live predecessor, so a cycle must exist
                tracing::warn!("topological sort stalled without a cycle");
                break;
            }

            for &idx in &on_cycle {
                removed[idx] = true;
            }
            for &idx in &on_cycle {
                for &dep in &self.dependents[idx] {
                    if removed[dep] {
                        continue;
                    }
                    in_degree[dep] -= 1;
                    if in_degree[dep] == 0 {
                        queue.push_back(dep);
                    }
                }
            }
            cycled.extend(on_cycle);
        }

        cycled.sort_unstable();

        TopSortResult {
            sorted: sorted.into_iter().map(|idx| self.nodes[idx]).collect(),
            cycled: cycled.into_iter().map(|idx| self.nodes[idx]).collect(),
        }
    }

    /// Nodes among the non-removed ones that belong to a cycle
    ///
    /// Kosaraju: finish order on the forward edges, then components on the
    /// reversed edges in reverse finish order. A component is a cycle when it has
    /// more than one member or its single member has a self-loop.
    fn cycle_members(&self, removed: &[bool]) -> Vec<usize> {
        let n = self.nodes.len();

        let mut visited = vec![false; n];
        let mut finish_order = Vec::new();
        for root in 0..n {
            if removed[root] || visited[root] {
                continue;
            }
            visited[root] = true;
            let mut stack = vec![(root, 0usize)];
            while let Some(top) = stack.last_mut() {
                let node = top.0;
                match self.dependents[node].get(top.1) {
                    Some(&next) => {
                        top.1 += 1;
                        if !removed[next] && !visited[next] {
                            visited[next] = true;
                            stack.push((next, 0));
                        }
                    }
                    None => {
                        finish_order.push(node);
                        stack.pop();
                    }
                }
            }
        }

        let mut precedents = vec![Vec::new(); n];
        for (from, deps) in self.dependents.iter().enumerate() {
            if removed[from] {
                continue;
            }
            for &to in deps {
                if !removed[to] {
                    precedents[to].push(from);
                }
            }
        }

        let mut assigned = vec![false; n];
        let mut members = Vec::new();
        for &root in finish_order.iter().rev() {
            if assigned[root] {
                continue;
            }
            assigned[root] = true;
            let mut component = vec![root];
            let mut stack = vec![root];
            while let Some(node) = stack.pop() {
                for &prev in &precedents[node] {
                    if !assigned[prev] {
                        assigned[prev] = true;
                        component.push(prev);
                        stack.push(prev);
                    }
                }
            }

            if component.len() > 1 || self.edges.contains(&(root, root)) {
                members.extend(component);
            }
        }

        members
    }

    fn index_of(&self, node: T) -> Result<usize> {
        self.index
            .get(&node)
            .copied()
            .ok_or_else(|| Error::UnknownVertex(format!("{:?}", node)))
    }
}
