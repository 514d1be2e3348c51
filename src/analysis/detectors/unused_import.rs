use super::{AnalysisContext, Detector, Verdict};
use crate::graph::{normalize_identifier, DeclarationKind, FileFacts, SourceDeclaration};
use tracing::trace;

/// An import is used when the file references one of the module's exports,
/// a type in the file inherits from one, or another file relies on it
pub struct UnusedImportDetector;

impl UnusedImportDetector {
    pub fn new() -> Self {
        Self
    }

    /// Whether any type declared in `file` has a transitive ancestor among `exports`
    fn inherits_export(
        file: &FileFacts,
        exports: &std::collections::HashSet<String>,
        ctx: &AnalysisContext,
    ) -> bool {
        let inheritance = &ctx.graphs.inheritance;
        let declared_types = file
            .declarations
            .iter()
            .filter(|d| d.kind.is_type())
            .map(|d| d.bare_name());
        let extended_types = file.facts.type_inheritance.keys().map(|t| normalize_identifier(t));

        declared_types
            .chain(extended_types)
            .any(|ty| inheritance.has_ancestor_in(ty, exports))
    }
}

impl Default for UnusedImportDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for UnusedImportDetector {
    fn applies_to(&self, decl: &SourceDeclaration) -> bool {
        decl.kind == DeclarationKind::Import
    }

    fn classify(&self, decl: &SourceDeclaration, file: &FileFacts, ctx: &AnalysisContext) -> Verdict {
        let module = decl.bare_name();

        if ctx.always_needed.contains(module) || ctx.cross_file_modules.contains(module) {
            return Verdict::Used;
        }

        let Some(exports) = ctx.modules.exports(module) else {
            trace!("No export list for module {}; keeping import", module);
            return Verdict::Used;
        };

        let referenced = file
            .facts
            .used_identifiers
            .iter()
            .any(|id| exports.contains(normalize_identifier(id)));

        if referenced || Self::inherits_export(file, exports, ctx) {
            Verdict::Used
        } else {
            Verdict::Unused
        }
    }
}
