//! Planning and applying deletions of unused code.

mod editor;
mod planner;
mod related;
mod safe_delete;
mod undo;

pub use editor::{find_block_end, is_effectively_empty, EditResult, FileEditor, LineEdits};
pub use planner::{
    declaration_span, plan_file, ColumnRange, DeletionMode, DeletionOptions, DeletionPlanner, DeletionRequest,
    DeletionSummary, FilePlan, FileResult,
};
pub use related::{RelatedCodeFinder, RelatedDeletion};
pub use safe_delete::SafeDeleter;
pub use undo::UndoScript;

use crate::discovery::ProjectFacts;
use crate::graph::Declaration;

/// Copy extractor spans onto report declarations, matched by file, line, and name.
/// Returns how many declarations received a span.
pub fn attach_spans(declarations: &mut [Declaration], project: &ProjectFacts) -> usize {
    let mut attached = 0;
    for decl in declarations.iter_mut().filter(|d| d.span.is_none()) {
        let span = project.file(&decl.location.file).and_then(|file| {
            file.declarations
                .iter()
                .find(|s| s.line == decl.location.line && s.bare_name() == decl.name)
                .and_then(|s| s.span)
        });
        if let Some(span) = span {
            decl.span = Some(span);
            attached += 1;
        }
    }
    attached
}
