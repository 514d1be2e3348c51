//! deadsweep - whole-program unused declaration detection and safe deletion
//!
//! deadsweep works on facts produced by an external source extractor
//! (declarations, identifier uses, conformances, imports) and never parses
//! source itself, except for the line-level edits made when deleting.
//!
//! # Architecture
//!
//! The pipeline consists of:
//! 1. **Fact discovery** - Load per-file extraction facts
//! 2. **Aggregation** - Merge facts into project-wide graphs
//! 3. **Interface resolution** - Transitive requirements of every conformed interface
//! 4. **Import resolution** - Modules whose symbols leak across files
//! 5. **Classification** - Used, unused, or unused but excluded, per declaration
//! 6. **Reporting** - Persisted CSV report plus terminal and JSON output
//! 7. **Deletion** - Plan and apply line and column edits, with related code

pub mod analysis;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod launch;
pub mod oracle;
pub mod refactor;
pub mod report;

pub use analysis::{analyze, Classification, ClassificationEngine, InterfaceGraph, InterfaceResolver};
pub use config::{AnalysisOptions, Config};
pub use discovery::{FactFinder, ProjectFacts};
pub use error::{SweepError, SweepResult};
pub use graph::{Aggregator, Declaration, DeclarationKind, ExclusionReason, FileFacts, GlobalGraphs};
pub use launch::EditorLauncher;
pub use oracle::{CachedOracle, CatalogOracle, InterfaceOracle, ModuleIndex, NullOracle};
pub use refactor::{DeletionOptions, DeletionPlanner, DeletionRequest, RelatedCodeFinder, SafeDeleter};
pub use report::{AnalysisReport, ReportFilter, ReportFormat, Reporter};
