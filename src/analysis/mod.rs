//! Whole-program resolution and classification.
//!
//! Pass 1 merges every file's facts into the global graphs; pass 2 resolves
//! interfaces and cross-file imports over the frozen graphs and only then
//! classifies declarations. No decision is made during a single-file walk.

mod classifier;
pub mod detectors;
mod imports;
mod interfaces;

pub use classifier::ClassificationEngine;
pub use imports::ImportDependencyResolver;
pub use interfaces::{InterfaceGraph, InterfaceResolver};

use crate::config::Config;
use crate::discovery::ProjectFacts;
use crate::graph::{aggregate_parallel, Declaration, ExclusionReason, GlobalGraphs};
use crate::oracle::{InterfaceOracle, ModuleIndex};
use std::collections::HashSet;
use tracing::info;

/// Outcome of classifying every declaration in a project
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Unused with no exclusion reason, sorted by file then line
    pub unused: Vec<Declaration>,

    /// Unused but held back by an exclusion reason, sorted by file then line
    pub excluded: Vec<Declaration>,

    /// Declarations found to be used
    pub used_count: usize,

    /// Test files whose declarations were not classified
    pub excluded_test_files: usize,
}

impl Classification {
    pub fn total_unused(&self) -> usize {
        self.unused.len() + self.excluded.len()
    }

    pub fn excluded_with(&self, reason: ExclusionReason) -> impl Iterator<Item = &Declaration> {
        self.excluded.iter().filter(move |d| d.reason == reason)
    }

    pub fn find(&self, name: &str) -> Option<&Declaration> {
        self.unused
            .iter()
            .chain(self.excluded.iter())
            .find(|d| d.name == name)
    }
}

/// Everything the resolvers derive from the merged graphs
pub struct Resolution {
    pub graphs: GlobalGraphs,
    pub interfaces: InterfaceGraph,
    pub cross_file_modules: HashSet<String>,
}

/// Run the full pipeline: aggregate, resolve, classify
pub fn analyze<O: InterfaceOracle + ?Sized>(
    project: &ProjectFacts,
    config: &Config,
    oracle: &O,
    modules: &ModuleIndex,
) -> (Classification, Resolution) {
    let graphs = aggregate_parallel(&project.files);
    let interfaces = InterfaceResolver::new(oracle).resolve(&graphs);

    let always_needed: HashSet<String> = config.modules.always_needed.iter().cloned().collect();
    let cross_file_modules =
        ImportDependencyResolver::new(modules, &always_needed).resolve(&project.files);

    info!(
        "Resolved {} interfaces ({} unknown), {} cross-file modules",
        interfaces.len(),
        interfaces.unresolved().len(),
        cross_file_modules.len()
    );

    let classification = ClassificationEngine::new(config, &graphs, &interfaces, modules, &cross_file_modules)
        .classify(project);

    (
        classification,
        Resolution {
            graphs,
            interfaces,
            cross_file_modules,
        },
    )
}
