use super::{AnalysisContext, Detector, Verdict};
use crate::graph::{DeclarationKind, FileFacts, SourceDeclaration};

/// Usage check for every kind without a dedicated detector: functions,
/// variables, types, interfaces, enumeration cases, type aliases
pub struct UnusedDeclarationDetector;

impl UnusedDeclarationDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnusedDeclarationDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for UnusedDeclarationDetector {
    fn applies_to(&self, decl: &SourceDeclaration) -> bool {
        !matches!(decl.kind, DeclarationKind::Import | DeclarationKind::Parameter)
    }

    fn classify(&self, decl: &SourceDeclaration, _file: &FileFacts, ctx: &AnalysisContext) -> Verdict {
        let name = decl.bare_name();
        if ctx.graphs.is_read(name) {
            return Verdict::Used;
        }

        let inheritance = &ctx.graphs.inheritance;
        let used = match decl.kind {
            DeclarationKind::Interface => {
                ctx.graphs.conformed_interfaces.contains(name)
                    || inheritance.has_descendants(name)
                    || ctx.graphs.interface_parents.values().any(|p| p.contains(name))
            }
            DeclarationKind::Type => inheritance.has_descendants(name),
            _ => false,
        };

        if used {
            Verdict::Used
        } else {
            Verdict::Unused
        }
    }
}
