//! Resolution integration tests
//!
//! Aggregation, interface closure, and cross-file import resolution over
//! multi-file fact sets.

use deadsweep::analysis::{ImportDependencyResolver, InterfaceGraph, InterfaceResolver};
use deadsweep::graph::{aggregate_parallel, Aggregator, FactSet, FileFacts, ImportStatement};
use deadsweep::oracle::{CachedOracle, InterfaceOracle, InterfaceRequirements, ModuleIndex, NullOracle};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

fn set(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn file(path: &str, build: impl FnOnce(&mut FactSet)) -> FileFacts {
    let mut facts = FactSet::new();
    build(&mut facts);
    FileFacts::new(path).with_facts(facts)
}

/// Oracle backed by a fixed table, counting lookups
struct TableOracle {
    table: HashMap<String, InterfaceRequirements>,
    lookups: AtomicUsize,
}

impl TableOracle {
    fn new() -> Self {
        Self {
            table: HashMap::new(),
            lookups: AtomicUsize::new(0),
        }
    }

    fn with(mut self, name: &str, members: &[&str], parents: &[&str]) -> Self {
        self.table.insert(
            name.to_string(),
            InterfaceRequirements::new(members.iter().copied(), parents.iter().copied()),
        );
        self
    }
}

impl InterfaceOracle for TableOracle {
    fn requirements(&self, name: &str) -> Option<InterfaceRequirements> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.table.get(name).cloned()
    }
}

// ============================================================================
// Interface closure
// ============================================================================

#[test]
fn test_closure_is_idempotent() {
    let mut graph = InterfaceGraph::new();
    graph.insert("Identifiable", strings(&["id"]), strings(&[]));
    graph.insert("Named", strings(&["name"]), strings(&["Identifiable"]));
    graph.insert("Listing", strings(&["items"]), strings(&["Named"]));
    graph.close();

    let once = graph.clone();
    graph.close();

    assert_eq!(graph, once);
    assert_eq!(graph.requirements("Listing").unwrap(), &set(&["id", "name", "items"]));
}

#[test]
fn test_cycle_terminates() {
    let mut graph = InterfaceGraph::new();
    graph.insert("A", strings(&["a"]), strings(&["B"]));
    graph.insert("B", strings(&["b"]), strings(&["C"]));
    graph.insert("C", strings(&["c"]), strings(&["A"]));
    graph.close();

    assert_eq!(graph.requirements("A").unwrap(), &set(&["a", "b", "c"]));
    assert_eq!(graph.parents("A").unwrap(), &set(&["B", "C"]));
}

#[test]
fn test_type_cycle_does_not_invent_external_ancestor() {
    let files = vec![file("Cycle.swift", |f| {
        f.type_inheritance.insert("A".into(), set(&["B"]));
        f.type_inheritance.insert("B".into(), set(&["C"]));
        f.type_inheritance.insert("C".into(), set(&["A"]));
    })];
    let graphs = Aggregator::from_files(&files);

    assert!(!graphs.inheritance.has_ancestor_in("A", &set(&["UIView", "NSObject"])));
    assert_eq!(graphs.inheritance.ancestors("A"), set(&["B", "C"]));
}

#[test]
fn test_diamond_union_without_duplicates() {
    let files = vec![
        file("Root.swift", |f| {
            f.defined_interfaces.insert("Root".into());
            f.interface_requirements.insert("Root".into(), set(&["id"]));
        }),
        file("Sides.swift", |f| {
            f.defined_interfaces.extend(set(&["Left", "Right"]));
            f.interface_requirements.insert("Left".into(), set(&["left"]));
            f.interface_requirements.insert("Right".into(), set(&["right"]));
            f.interface_parents.insert("Left".into(), set(&["Root"]));
            f.interface_parents.insert("Right".into(), set(&["Root"]));
        }),
        file("Leaf.swift", |f| {
            f.defined_interfaces.insert("Leaf".into());
            f.interface_requirements.insert("Leaf".into(), set(&["leaf"]));
            f.interface_parents.insert("Leaf".into(), set(&["Left", "Right"]));
        }),
    ];

    let graph = InterfaceResolver::new(&NullOracle).resolve(&Aggregator::from_files(&files));
    assert_eq!(
        graph.requirements("Leaf").unwrap(),
        &set(&["id", "left", "right", "leaf"])
    );
    assert_eq!(graph.parents("Leaf").unwrap(), &set(&["Left", "Right", "Root"]));
}

// ============================================================================
// Aggregation
// ============================================================================

#[test]
fn test_merge_union_law_independent_of_order() {
    let a = file("A.swift", |f| {
        f.interface_requirements.insert("Shape".into(), set(&["area"]));
        f.interface_parents.insert("Shape".into(), set(&["Drawable"]));
        f.used_identifiers.insert("area".into());
    });
    let b = file("B.swift", |f| {
        f.interface_requirements.insert("Shape".into(), set(&["perimeter"]));
        f.interface_parents.insert("Shape".into(), set(&["Sendable"]));
    });

    let forward = Aggregator::from_files(&[a.clone(), b.clone()]);
    let backward = Aggregator::from_files(&[b.clone(), a.clone()]);
    let parallel = aggregate_parallel(&[a, b]);

    for graphs in [&forward, &backward, &parallel] {
        assert_eq!(graphs.interface_requirements["Shape"], set(&["area", "perimeter"]));
        assert_eq!(graphs.interface_parents["Shape"], set(&["Drawable", "Sendable"]));
        assert!(graphs.is_read("area"));
    }
}

#[test]
fn test_empty_input_gives_empty_graphs() {
    let graphs = Aggregator::from_files(&[]);
    assert!(graphs.interface_requirements.is_empty());
    assert!(InterfaceResolver::new(&NullOracle).resolve(&graphs).is_empty());
}

// ============================================================================
// External interfaces
// ============================================================================

#[test]
fn test_external_ancestors_resolved_before_closure() {
    let files = vec![file("Model.swift", |f| {
        f.conformed_interfaces.insert("Hashable".into());
        f.type_inheritance.insert("Model".into(), set(&["Hashable"]));
    })];
    let oracle = TableOracle::new()
        .with("Hashable", &["hash"], &["Equatable"])
        .with("Equatable", &["=="], &[]);

    let graphs = Aggregator::from_files(&files);
    let graph = InterfaceResolver::new(&oracle).resolve(&graphs);

    assert_eq!(graph.requirements("Hashable").unwrap(), &set(&["hash", "=="]));
    assert!(graph.is_requirement_of("==", "Model", &graphs.inheritance));
    assert!(graph.unresolved().is_empty());
}

#[test]
fn test_unknown_external_interface_is_empty_not_fatal() {
    let files = vec![file("View.swift", |f| {
        f.conformed_interfaces.insert("MysteryDelegate".into());
    })];

    let graph = InterfaceResolver::new(&NullOracle).resolve(&Aggregator::from_files(&files));
    assert!(graph.requirements("MysteryDelegate").unwrap().is_empty());
    assert!(graph.unresolved().contains("MysteryDelegate"));
}

#[test]
fn test_cached_oracle_queries_each_name_once() {
    let inner = TableOracle::new().with("Codable", &["encode"], &[]);
    let cached = CachedOracle::new(&inner);

    for _ in 0..3 {
        assert!(cached.requirements("Codable").is_some());
        assert!(cached.requirements("Unknown").is_none());
    }
    assert_eq!(cached.cached_names(), 2);
    assert_eq!(inner.lookups.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Cross-file imports
// ============================================================================

#[test]
fn test_cross_file_leak_marks_module() {
    let modules = ModuleIndex::new()
        .with_module("Charts", ["LineChart", "BarChart"])
        .with_module("Maps", ["MapView"]);
    let always_needed = set(&["Swift"]);

    let files = vec![
        file("Dashboard.swift", |f| {
            f.imports.push(ImportStatement::new("Charts", 1));
        }),
        file("Summary.swift", |f| {
            f.used_identifiers.insert("LineChart".into());
            f.used_identifiers.insert("MapView".into());
        }),
    ];

    let leaked = ImportDependencyResolver::new(&modules, &always_needed).resolve(&files);
    assert_eq!(leaked, set(&["Charts"]));
}

#[test]
fn test_always_needed_modules_are_exempt() {
    let modules = ModuleIndex::new().with_module("Swift", ["print"]);
    let always_needed = set(&["Swift"]);
    let files = vec![
        file("A.swift", |f| f.imports.push(ImportStatement::new("Swift", 1))),
        file("B.swift", |f| {
            f.used_identifiers.insert("print".into());
        }),
    ];

    let leaked = ImportDependencyResolver::new(&modules, &always_needed).resolve(&files);
    assert!(leaked.is_empty());
}
