//! Unused function parameter detection
//!
//! A parameter is unused when its internal binding never appears in the
//! owning function's body. Parameters explicitly discarded with the discard
//! marker (`_`) are not candidates at all.

use super::{AnalysisContext, Detector, Verdict};
use crate::graph::{normalize_identifier, DeclarationKind, FileFacts, SourceDeclaration};

pub struct UnusedParamDetector;

impl UnusedParamDetector {
    pub fn new() -> Self {
        Self
    }

    /// The function declaration owning `param` in the same file: same name,
    /// same parent type, closest declaration at or above the parameter's line
    pub fn owner<'f>(param: &SourceDeclaration, file: &'f FileFacts) -> Option<&'f SourceDeclaration> {
        let binding = param.parameter.as_ref()?;
        let function = normalize_identifier(&binding.function);

        file.declarations
            .iter()
            .filter(|d| d.kind == DeclarationKind::Function)
            .filter(|d| d.bare_name() == function)
            .filter(|d| d.parent_type == param.parent_type)
            .filter(|d| d.line <= param.line)
            .max_by_key(|d| d.line)
    }
}

impl Default for UnusedParamDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for UnusedParamDetector {
    fn applies_to(&self, decl: &SourceDeclaration) -> bool {
        decl.kind == DeclarationKind::Parameter
    }

    fn classify(&self, decl: &SourceDeclaration, _file: &FileFacts, ctx: &AnalysisContext) -> Verdict {
        // Without binding facts there is nothing to judge against
        let Some(param) = &decl.parameter else {
            return Verdict::Used;
        };

        let binding = normalize_identifier(&param.binding);
        if binding.is_empty() || binding == ctx.config.markers.discard_marker {
            return Verdict::Skip;
        }

        let referenced = param
            .body_identifiers
            .iter()
            .any(|id| normalize_identifier(id) == binding);

        if referenced {
            Verdict::Used
        } else {
            Verdict::Unused
        }
    }
}
