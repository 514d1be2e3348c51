use super::{AnalysisContext, ExclusionRule};
use crate::graph::{ExclusionReason, SourceDeclaration};

/// Members overriding an inherited implementation are reached through the parent type
pub struct OverrideRule;

impl ExclusionRule for OverrideRule {
    fn reason(
        &self,
        _decl: &SourceDeclaration,
        subject: &SourceDeclaration,
        ctx: &AnalysisContext,
    ) -> Option<ExclusionReason> {
        subject
            .has_modifier(&ctx.config.markers.override_marker)
            .then_some(ExclusionReason::Override)
    }
}

/// Members exposed to dynamic dispatch or UI wiring (`@objc`, `@IBAction`, `dynamic`)
pub struct PlatformMarkerRule;

impl ExclusionRule for PlatformMarkerRule {
    fn reason(
        &self,
        _decl: &SourceDeclaration,
        subject: &SourceDeclaration,
        ctx: &AnalysisContext,
    ) -> Option<ExclusionReason> {
        let markers = &ctx.config.markers;
        let marked = markers
            .platform_attributes
            .iter()
            .any(|a| subject.has_attribute(a))
            || markers.platform_modifiers.iter().any(|m| subject.has_modifier(m));

        marked.then_some(ExclusionReason::PlatformMarker)
    }
}
