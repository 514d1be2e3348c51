mod builder;
mod declaration;
pub mod facts;
mod parallel_builder;

pub use builder::{Aggregator, GlobalGraphs};
pub use declaration::{
    normalize_identifier, Declaration, DeclarationId, DeclarationKind, ExclusionReason, LineSpan,
    Location,
};
pub use facts::{FactBundle, FactSet, FileFacts, ImportStatement, ParameterBinding, SourceDeclaration};
pub use parallel_builder::aggregate_parallel;

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// Type name -> direct ancestor edges (superclass and conformances), merged
/// across every file that mentions the type
#[derive(Debug, Clone, Default)]
pub struct InheritanceGraph {
    /// Edges point from a type to one of its direct ancestors
    inner: DiGraph<String, ()>,

    /// Map from type name to node index
    node_map: HashMap<String, NodeIndex>,
}

impl InheritanceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            return idx;
        }
        let idx = self.inner.add_node(name.to_string());
        self.node_map.insert(name.to_string(), idx);
        idx
    }

    /// Register a type with no ancestors yet
    pub fn add_type(&mut self, name: &str) {
        self.node(name);
    }

    /// Record that `ty` inherits from or conforms to `ancestor`
    pub fn add_edge(&mut self, ty: &str, ancestor: &str) {
        let from = self.node(ty);
        let to = self.node(ancestor);
        self.inner.update_edge(from, to, ());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    pub fn direct_ancestors(&self, ty: &str) -> HashSet<String> {
        let Some(&idx) = self.node_map.get(ty) else {
            return HashSet::new();
        };
        self.inner
            .neighbors(idx)
            .map(|n| self.inner[n].clone())
            .collect()
    }

    /// Every transitive ancestor of `ty`, excluding `ty` itself even when a cycle leads back to it
    pub fn ancestors(&self, ty: &str) -> HashSet<String> {
        let mut found = HashSet::new();
        self.walk_ancestors(ty, |name| {
            found.insert(name.to_string());
            false
        });
        found
    }

    /// Whether any transitive ancestor of `ty` is in `symbols`
    pub fn has_ancestor_in(&self, ty: &str, symbols: &HashSet<String>) -> bool {
        self.walk_ancestors(ty, |name| symbols.contains(name))
    }

    /// Whether `ty` transitively inherits from or conforms to `ancestor`
    pub fn inherits_from(&self, ty: &str, ancestor: &str) -> bool {
        self.walk_ancestors(ty, |name| name == ancestor)
    }

    /// Whether some other type lists `ty` as a direct ancestor
    pub fn has_descendants(&self, ty: &str) -> bool {
        let Some(&idx) = self.node_map.get(ty) else {
            return false;
        };
        self.inner
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .any(|n| n != idx)
    }

    /// Depth-first walk over ancestors with an explicit visited set.
    /// Stops early and returns true as soon as `visit` does.
    fn walk_ancestors<F>(&self, ty: &str, mut visit: F) -> bool
    where
        F: FnMut(&str) -> bool,
    {
        let Some(&start) = self.node_map.get(ty) else {
            return false;
        };

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        visited.insert(start);
        let mut stack: Vec<NodeIndex> = self.inner.neighbors(start).collect();

        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            if visit(&self.inner[idx]) {
                return true;
            }
            stack.extend(self.inner.neighbors(idx).filter(|n| !visited.contains(n)));
        }

        false
    }

    /// Union another graph into this one
    pub fn merge(&mut self, other: &InheritanceGraph) {
        for idx in other.inner.node_indices() {
            self.node(&other.inner[idx]);
        }
        for edge in other.inner.raw_edges() {
            let from = &other.inner[edge.source()];
            let to = &other.inner[edge.target()];
            self.add_edge(from, to);
        }
    }

    /// Names of every type with at least one recorded ancestor edge
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.node_map.keys().map(String::as_str)
    }

    pub fn type_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Get the underlying petgraph for advanced operations
    pub fn inner(&self) -> &DiGraph<String, ()> {
        &self.inner
    }
}
