use super::{AnalysisContext, ExclusionRule};
use crate::graph::{normalize_identifier, DeclarationKind, ExclusionReason, SourceDeclaration};

/// Cases of an enumeration conforming to an enumerable interface are
/// reachable through the generated case list even when never named
pub struct EnumerableCaseRule;

impl ExclusionRule for EnumerableCaseRule {
    fn reason(
        &self,
        decl: &SourceDeclaration,
        _subject: &SourceDeclaration,
        ctx: &AnalysisContext,
    ) -> Option<ExclusionReason> {
        if decl.kind != DeclarationKind::EnumCase {
            return None;
        }
        let parent = normalize_identifier(decl.parent_type.as_deref()?);

        ctx.config
            .markers
            .enumerable_interfaces
            .iter()
            .any(|iface| ctx.graphs.inheritance.inherits_from(parent, iface))
            .then_some(ExclusionReason::EnumerableCase)
    }
}
