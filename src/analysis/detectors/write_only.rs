//! Write-only property detection
//!
//! A stored property that is assigned somewhere in the project but never read.
//! Such a property is still reported, but tagged so that it can be reviewed
//! separately from plainly unused code:
//!
//! ```swift
//! final class Uploader {
//!     private var lastAttempt: Date?     // write-only
//!
//!     func start() {
//!         lastAttempt = Date()
//!     }
//! }
//! ```

use super::{AnalysisContext, ExclusionRule};
use crate::graph::{DeclarationKind, ExclusionReason, SourceDeclaration};

/// Tags unused stored properties that have assignments
pub struct WriteOnlyDetector {
    /// Also consider top-level variables, not just members of a type
    include_globals: bool,
}

impl WriteOnlyDetector {
    pub fn new() -> Self {
        Self {
            include_globals: false,
        }
    }

    pub fn include_globals(mut self) -> Self {
        self.include_globals = true;
        self
    }

    fn is_candidate(&self, decl: &SourceDeclaration) -> bool {
        decl.kind == DeclarationKind::Variable && (self.include_globals || decl.parent_type.is_some())
    }
}

impl Default for WriteOnlyDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusionRule for WriteOnlyDetector {
    fn reason(
        &self,
        decl: &SourceDeclaration,
        _subject: &SourceDeclaration,
        ctx: &AnalysisContext,
    ) -> Option<ExclusionReason> {
        if !self.is_candidate(decl) {
            return None;
        }
        let name = decl.bare_name();
        (ctx.graphs.is_assigned(name) && !ctx.graphs.is_read(name)).then_some(ExclusionReason::WriteOnly)
    }
}
