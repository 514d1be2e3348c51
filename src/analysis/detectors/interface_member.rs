use super::{AnalysisContext, ExclusionRule};
use crate::graph::{normalize_identifier, ExclusionReason, SourceDeclaration};

/// Members whose name matches an effective requirement of an interface the
/// enclosing type conforms to, directly or through any ancestor
pub struct InterfaceMemberRule;

impl ExclusionRule for InterfaceMemberRule {
    fn reason(
        &self,
        _decl: &SourceDeclaration,
        subject: &SourceDeclaration,
        ctx: &AnalysisContext,
    ) -> Option<ExclusionReason> {
        let parent = normalize_identifier(subject.parent_type.as_deref()?);
        ctx.interfaces
            .is_requirement_of(subject.bare_name(), parent, &ctx.graphs.inheritance)
            .then_some(ExclusionReason::InterfaceImplementation)
    }
}
