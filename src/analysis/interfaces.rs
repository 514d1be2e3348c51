// Interface resolution - effective requirement sets for every interface
//
// An interface's effective requirements are its own plus those of every
// transitive ancestor. Framework interfaces the project only conforms to are
// looked up through the injected oracle before the closure runs.

use crate::graph::{GlobalGraphs, InheritanceGraph};
use crate::oracle::InterfaceOracle;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Interface name -> requirements and parents, closed in place by [`InterfaceGraph::close`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceGraph {
    requirements: HashMap<String, HashSet<String>>,
    parents: HashMap<String, HashSet<String>>,
    unresolved: HashSet<String>,
}

impl InterfaceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the project-defined interfaces in the merged graphs
    pub fn from_graphs(graphs: &GlobalGraphs) -> Self {
        let mut graph = Self::new();
        for (name, members) in &graphs.interface_requirements {
            graph.insert(name, members.iter().cloned(), std::iter::empty::<String>());
        }
        for (name, parents) in &graphs.interface_parents {
            graph.insert(name, std::iter::empty::<String>(), parents.iter().cloned());
        }
        graph
    }

    /// Union requirements and parents into `name`
    pub fn insert<M, P>(&mut self, name: &str, members: M, parents: P)
    where
        M: IntoIterator<Item = String>,
        P: IntoIterator<Item = String>,
    {
        self.requirements
            .entry(name.to_string())
            .or_default()
            .extend(members);
        self.parents.entry(name.to_string()).or_default().extend(parents);
    }

    /// Expand every parent set transitively, then fold each ancestor's
    /// requirements into its descendants. Idempotent; terminates on cycles.
    pub fn close(&mut self) {
        self.close_parents();

        let direct = self.requirements.clone();
        for (name, parents) in &self.parents {
            let Some(effective) = self.requirements.get_mut(name) else {
                continue;
            };
            for parent in parents {
                if let Some(members) = direct.get(parent) {
                    effective.extend(members.iter().cloned());
                }
            }
        }
    }

    fn close_parents(&mut self) {
        let closed: HashMap<String, HashSet<String>> = self
            .parents
            .keys()
            .map(|name| (name.clone(), self.transitive_parents(name)))
            .collect();
        self.parents = closed;
    }

    /// Depth-first walk with a visited set keyed by interface name, so
    /// diamonds are counted once and cycles stop at the first revisit
    fn transitive_parents(&self, name: &str) -> HashSet<String> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(name);
        let mut found = HashSet::new();
        let mut stack: Vec<&str> = self
            .parents
            .get(name)
            .map(|p| p.iter().map(String::as_str).collect())
            .unwrap_or_default();

        while let Some(parent) = stack.pop() {
            if !visited.insert(parent) {
                continue;
            }
            found.insert(parent.to_string());
            if let Some(grandparents) = self.parents.get(parent) {
                stack.extend(
                    grandparents
                        .iter()
                        .map(String::as_str)
                        .filter(|g| !visited.contains(g)),
                );
            }
        }

        found
    }

    pub fn contains(&self, name: &str) -> bool {
        self.requirements.contains_key(name)
    }

    pub fn requirements(&self, name: &str) -> Option<&HashSet<String>> {
        self.requirements.get(name)
    }

    pub fn parents(&self, name: &str) -> Option<&HashSet<String>> {
        self.parents.get(name)
    }

    /// External interfaces the oracle did not know
    pub fn unresolved(&self) -> &HashSet<String> {
        &self.unresolved
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Union of effective requirements of every interface `ty` conforms to,
    /// including `ty` itself when it is an interface (default implementations)
    pub fn requirements_for_type(&self, ty: &str, inheritance: &InheritanceGraph) -> HashSet<String> {
        let mut result = HashSet::new();
        if let Some(own) = self.requirements.get(ty) {
            result.extend(own.iter().cloned());
        }
        for ancestor in inheritance.ancestors(ty) {
            if let Some(members) = self.requirements.get(&ancestor) {
                result.extend(members.iter().cloned());
            }
        }
        result
    }

    /// Whether `member` satisfies a requirement of some interface `ty` conforms to
    pub fn is_requirement_of(&self, member: &str, ty: &str, inheritance: &InheritanceGraph) -> bool {
        if self.requirements.get(ty).map(|r| r.contains(member)).unwrap_or(false) {
            return true;
        }
        inheritance.ancestors(ty).iter().any(|ancestor| {
            self.requirements
                .get(ancestor)
                .map(|r| r.contains(member))
                .unwrap_or(false)
        })
    }
}

/// Computes effective requirement sets, consulting an oracle for framework interfaces
pub struct InterfaceResolver<'a, O: InterfaceOracle + ?Sized> {
    oracle: &'a O,
}

impl<'a, O: InterfaceOracle + ?Sized> InterfaceResolver<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self { oracle }
    }

    /// External lookups always complete before the closure runs
    pub fn resolve(&self, graphs: &GlobalGraphs) -> InterfaceGraph {
        let mut graph = InterfaceGraph::from_graphs(graphs);
        self.resolve_external(&mut graph, graphs);
        graph.close();
        graph
    }

    fn resolve_external(&self, graph: &mut InterfaceGraph, graphs: &GlobalGraphs) {
        let mut pending: Vec<String> = graphs
            .conformed_interfaces
            .iter()
            .chain(graphs.interface_parents.values().flatten())
            .filter(|name| !graphs.defined_interfaces.contains(*name))
            .cloned()
            .collect();
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(name) = pending.pop() {
            if graphs.defined_interfaces.contains(&name) || !visited.insert(name.clone()) {
                continue;
            }

            match self.oracle.requirements(&name) {
                Some(found) => {
                    debug!(
                        "External interface {}: {} members, {} parents",
                        name,
                        found.members.len(),
                        found.parents.len()
                    );
                    pending.extend(found.parents.iter().filter(|p| !visited.contains(*p)).cloned());
                    graph.insert(&name, found.members, found.parents);
                }
                None => {
                    info!("Unknown external interface {}; assuming no requirements", name);
                    graph.insert(&name, std::iter::empty(), std::iter::empty());
                    graph.unresolved.insert(name);
                }
            }
        }
    }
}
