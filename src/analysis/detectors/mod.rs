// Per-kind usage detectors and the exclusion rules that run on their findings
//
// Detectors decide used / unused for one declaration kind. Exclusion rules
// then attach a reason to an unused declaration; rules only ever upgrade a
// reason, so their order does not change the outcome.

mod interface_member;
mod markers;
mod unused_declaration;
mod unused_enum_case;
mod unused_import;
mod unused_param;
mod write_only;

pub use interface_member::InterfaceMemberRule;
pub use markers::{OverrideRule, PlatformMarkerRule};
pub use unused_declaration::UnusedDeclarationDetector;
pub use unused_enum_case::EnumerableCaseRule;
pub use unused_import::UnusedImportDetector;
pub use unused_param::UnusedParamDetector;
pub use write_only::WriteOnlyDetector;

use crate::analysis::InterfaceGraph;
use crate::config::Config;
use crate::graph::{ExclusionReason, FileFacts, GlobalGraphs, SourceDeclaration};
use crate::oracle::ModuleIndex;
use std::collections::HashSet;

/// Frozen whole-program state every detector reads
pub struct AnalysisContext<'a> {
    pub config: &'a Config,
    pub graphs: &'a GlobalGraphs,
    pub interfaces: &'a InterfaceGraph,
    pub modules: &'a ModuleIndex,
    pub cross_file_modules: &'a HashSet<String>,
    pub always_needed: HashSet<String>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        config: &'a Config,
        graphs: &'a GlobalGraphs,
        interfaces: &'a InterfaceGraph,
        modules: &'a ModuleIndex,
        cross_file_modules: &'a HashSet<String>,
    ) -> Self {
        Self {
            config,
            graphs,
            interfaces,
            modules,
            cross_file_modules,
            always_needed: config.modules.always_needed.iter().cloned().collect(),
        }
    }
}

/// Result of checking one declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Used,
    Unused,
    /// Not a candidate at all (discarded parameters)
    Skip,
}

/// Trait for usage detectors
pub trait Detector: Send + Sync {
    /// Whether this detector handles `decl`
    fn applies_to(&self, decl: &SourceDeclaration) -> bool;

    fn classify(&self, decl: &SourceDeclaration, file: &FileFacts, ctx: &AnalysisContext) -> Verdict;
}

/// Trait for rules that explain why an unused declaration must stay
pub trait ExclusionRule: Send + Sync {
    /// `subject` is the declaration whose markers matter: the declaration
    /// itself, or the owning function for a parameter
    fn reason(
        &self,
        decl: &SourceDeclaration,
        subject: &SourceDeclaration,
        ctx: &AnalysisContext,
    ) -> Option<ExclusionReason>;
}

/// The default detector set, most specific first
pub fn default_detectors() -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(UnusedImportDetector::new()),
        Box::new(UnusedParamDetector::new()),
        Box::new(UnusedDeclarationDetector::new()),
    ]
}

pub fn default_rules() -> Vec<Box<dyn ExclusionRule>> {
    vec![
        Box::new(OverrideRule),
        Box::new(PlatformMarkerRule),
        Box::new(InterfaceMemberRule),
        Box::new(EnumerableCaseRule),
        Box::new(WriteOnlyDetector::new()),
    ]
}
