//! Generic dependency graph with topological ordering.
//!
//! Nodes are arbitrary keys held in an insertion-ordered arena; edges point
//! from a dependent node to the node it depends on. [`DepGraph::overall_order`]
//! yields every dependency before its dependents and preserves insertion
//! order among nodes that no edge constrains, which makes the result stable
//! for callers that care about declaration order.
//!
//! # Example
//!
//! ```
//! use depgraph::DepGraph;
//!
//! let mut graph = DepGraph::new();
//! graph.add_node("a");
//! graph.add_node("b");
//! graph.add_node("c");
//! graph.add_dependency(&"b", &"c").unwrap();
//!
//! // `b` depends on `c`, so `c` comes first; `a` keeps its insertion slot.
//! assert_eq!(graph.overall_order().unwrap(), vec!["a", "c", "b"]);
//! ```

use std::fmt::{Display, Write};
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node does not exist: {0}")]
    MissingNode(String),
    #[error("dependency cycle found: {0}")]
    Cycle(String),
}

// ── Graph ─────────────────────────────────────────────────────────────────

/// A directed graph of dependencies between keys.
///
/// An edge added with [`add_dependency(from, to)`](DepGraph::add_dependency)
/// reads "`from` depends on `to`".
#[derive(Debug, Clone)]
pub struct DepGraph<K> {
    nodes: IndexSet<K>,
    /// node -> the nodes it depends on
    outgoing: IndexMap<K, IndexSet<K>>,
    /// node -> the nodes that depend on it
    incoming: IndexMap<K, IndexSet<K>>,
}

impl<K> Default for DepGraph<K>
where
    K: Clone + Eq + Hash + Display,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DepGraph<K>
where
    K: Clone + Eq + Hash + Display,
{
    pub fn new() -> Self {
        DepGraph {
            nodes: IndexSet::new(),
            outgoing: IndexMap::new(),
            incoming: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_node(&self, key: &K) -> bool {
        self.nodes.contains(key)
    }

    /// Add a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, key: K) {
        if self.nodes.insert(key.clone()) {
            self.outgoing.insert(key.clone(), IndexSet::new());
            self.incoming.insert(key, IndexSet::new());
        }
    }

    /// Remove a node and every edge that touches it.
    pub fn remove_node(&mut self, key: &K) {
        if !self.nodes.shift_remove(key) {
            return;
        }
        self.outgoing.shift_remove(key);
        self.incoming.shift_remove(key);
        for deps in self.outgoing.values_mut() {
            deps.shift_remove(key);
        }
        for dependants in self.incoming.values_mut() {
            dependants.shift_remove(key);
        }
    }

    /// Record that `from` depends on `to`. Both nodes must already exist.
    pub fn add_dependency(&mut self, from: &K, to: &K) -> Result<(), GraphError> {
        if !self.has_node(from) {
            return Err(GraphError::MissingNode(from.to_string()));
        }
        if !self.has_node(to) {
            return Err(GraphError::MissingNode(to.to_string()));
        }
        if let Some(deps) = self.outgoing.get_mut(from) {
            deps.insert(to.clone());
        }
        if let Some(dependants) = self.incoming.get_mut(to) {
            dependants.insert(from.clone());
        }
        Ok(())
    }

    pub fn remove_dependency(&mut self, from: &K, to: &K) {
        if let Some(deps) = self.outgoing.get_mut(from) {
            deps.shift_remove(to);
        }
        if let Some(dependants) = self.incoming.get_mut(to) {
            dependants.shift_remove(from);
        }
    }

    /// Transitive dependencies of `key`, every dependency before the nodes
    /// that need it.
    pub fn dependencies_of(&self, key: &K) -> Result<Vec<K>, GraphError> {
        if !self.has_node(key) {
            return Err(GraphError::MissingNode(key.to_string()));
        }
        self.check_cycle_from(key)?;
        let mut visited = IndexSet::new();
        self.collect(key, &self.outgoing, &mut visited);
        visited.shift_remove(key);
        Ok(visited.into_iter().collect())
    }

    /// Transitive dependants of `key` (the nodes that directly or indirectly
    /// depend on it).
    pub fn dependants_of(&self, key: &K) -> Result<Vec<K>, GraphError> {
        if !self.has_node(key) {
            return Err(GraphError::MissingNode(key.to_string()));
        }
        self.check_cycle_from(key)?;
        let mut visited = IndexSet::new();
        self.collect(key, &self.incoming, &mut visited);
        visited.shift_remove(key);
        Ok(visited.into_iter().collect())
    }

    /// Nodes that nothing depends on. In an acyclic graph every node is
    /// reachable from one of these by walking dependency edges.
    pub fn entry_nodes(&self) -> Vec<K> {
        self.nodes
            .iter()
            .filter(|n| self.incoming.get(*n).map_or(true, IndexSet::is_empty))
            .cloned()
            .collect()
    }

    /// Topological order over the whole graph: dependencies first, insertion
    /// order among unconstrained peers. Fails with [`GraphError::Cycle`]
    /// when any cycle exists, reachable from an entry node or not.
    pub fn overall_order(&self) -> Result<Vec<K>, GraphError> {
        if self.nodes.is_empty() {
            return Ok(Vec::new());
        }
        for node in &self.nodes {
            self.check_cycle_from(node)?;
        }
        let mut order = IndexSet::new();
        for entry in self.entry_nodes() {
            self.collect(&entry, &self.outgoing, &mut order);
        }
        Ok(order.into_iter().collect())
    }

    /// Post-order DFS along `edges`, pushing each node after everything it
    /// points at.
    fn collect(&self, key: &K, edges: &IndexMap<K, IndexSet<K>>, out: &mut IndexSet<K>) {
        if out.contains(key) {
            return;
        }
        if let Some(next) = edges.get(key) {
            for n in next {
                if !out.contains(n) {
                    self.collect(n, edges, out);
                }
            }
        }
        out.insert(key.clone());
    }

    /// DFS cycle check along dependency edges starting at `key`.
    fn check_cycle_from(&self, key: &K) -> Result<(), GraphError> {
        let mut path = Vec::new();
        let mut done = IndexSet::new();
        self.walk_for_cycle(key, &mut path, &mut done)
    }

    fn walk_for_cycle<'a>(
        &'a self,
        key: &'a K,
        path: &mut Vec<&'a K>,
        done: &mut IndexSet<&'a K>,
    ) -> Result<(), GraphError> {
        if done.contains(&key) {
            return Ok(());
        }
        if path.contains(&key) {
            return Err(GraphError::Cycle(format_cycle(path, key)));
        }
        path.push(key);
        if let Some(deps) = self.outgoing.get(key) {
            for dep in deps {
                self.walk_for_cycle(dep, path, done)?;
            }
        }
        path.pop();
        done.insert(key);
        Ok(())
    }
}

fn format_cycle<K: Display + PartialEq>(path: &[&K], repeated: &K) -> String {
    let start = path.iter().position(|k| *k == repeated).unwrap_or(0);
    let mut msg = String::new();
    for k in &path[start..] {
        let _ = write!(msg, "{k} -> ");
    }
    let _ = write!(msg, "{repeated}");
    msg
}

// ── Tests ─────────────────────────────────────────────────────────────────
