use super::editor::{find_block_end, is_comment_line, is_effectively_empty, FileEditor, LineEdits};
use super::related::{list_entry_removal, RelatedDeletion};
use super::undo::UndoScript;
use crate::error::{SweepError, SweepResult};
use crate::graph::{Declaration, DeclarationKind, LineSpan};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A column sub-range of one line: 1-based character columns, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnRange {
    pub line: usize,
    pub start_column: usize,
    pub end_column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionMode {
    /// The declaration's whole syntactic span
    FullDeclaration,
    /// Exactly these 1-based lines
    Lines(BTreeSet<usize>),
    Partial(ColumnRange),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeletionRequest {
    pub declaration: Declaration,
    pub mode: DeletionMode,
}

impl DeletionRequest {
    pub fn full(declaration: Declaration) -> Self {
        Self {
            declaration,
            mode: DeletionMode::FullDeclaration,
        }
    }

    pub fn lines(declaration: Declaration, lines: impl IntoIterator<Item = usize>) -> Self {
        Self {
            declaration,
            mode: DeletionMode::Lines(lines.into_iter().collect()),
        }
    }

    pub fn partial(declaration: Declaration, range: ColumnRange) -> Self {
        Self {
            declaration,
            mode: DeletionMode::Partial(range),
        }
    }

    pub fn file(&self) -> &Path {
        &self.declaration.location.file
    }
}

impl From<RelatedDeletion> for DeletionRequest {
    fn from(related: RelatedDeletion) -> Self {
        match related.partial {
            Some(range) => Self::partial(related.parent, range),
            None => Self::lines(related.parent, related.lines.lines()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletionOptions {
    /// Compute everything, write nothing
    pub dry_run: bool,

    /// Remove files left with only whitespace, comments, and imports
    pub delete_empty_files: bool,
}

/// Outcome for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    pub path: PathBuf,
    pub success: bool,
    pub lines_removed: usize,
    pub file_deleted: bool,
    pub error: Option<String>,
    /// Requests that could not be located in the file's current text
    pub unresolved: Vec<String>,
}

impl FileResult {
    fn failed(path: &Path, error: impl ToString) -> Self {
        Self {
            path: path.to_path_buf(),
            success: false,
            lines_removed: 0,
            file_deleted: false,
            error: Some(error.to_string()),
            unresolved: Vec::new(),
        }
    }
}

/// Aggregate result of one deletion run; never short-circuits on a failure
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeletionSummary {
    pub dry_run: bool,
    pub results: Vec<FileResult>,
    pub undo_script: Option<PathBuf>,
}

impl DeletionSummary {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    pub fn lines_removed(&self) -> usize {
        self.results.iter().map(|r| r.lines_removed).sum()
    }

    pub fn files_deleted(&self) -> usize {
        self.results.iter().filter(|r| r.file_deleted).count()
    }

    pub fn unresolved(&self) -> usize {
        self.results.iter().map(|r| r.unresolved.len()).sum()
    }

    pub fn result_for(&self, path: &Path) -> Option<&FileResult> {
        self.results.iter().find(|r| r.path == path)
    }
}

/// Turns deletion requests into per-file edits and applies them.
/// Files are processed in parallel; edits within one file are applied in a single pass.
pub struct DeletionPlanner {
    options: DeletionOptions,
    undo_script_path: Option<PathBuf>,
}

impl DeletionPlanner {
    pub fn new(options: DeletionOptions) -> Self {
        Self {
            options,
            undo_script_path: None,
        }
    }

    pub fn with_undo_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.undo_script_path = Some(path.into());
        self
    }

    pub fn execute(&self, requests: &[DeletionRequest]) -> DeletionSummary {
        let mut by_file: BTreeMap<&Path, Vec<&DeletionRequest>> = BTreeMap::new();
        for request in requests {
            by_file.entry(request.file()).or_default().push(request);
        }

        info!(
            "Planning {} deletions across {} files{}",
            requests.len(),
            by_file.len(),
            if self.options.dry_run { " (dry run)" } else { "" }
        );

        let outcomes: Vec<(FileResult, Option<String>)> = by_file
            .into_iter()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|(path, requests)| self.process_file(path, requests))
            .collect();

        let mut summary = DeletionSummary {
            dry_run: self.options.dry_run,
            ..DeletionSummary::default()
        };
        let mut undo = UndoScript::new();
        for (result, original) in outcomes {
            if let (true, Some(original)) = (result.success, original) {
                undo.record_file_state(&result.path, &original);
            }
            summary.results.push(result);
        }

        if let Some(path) = &self.undo_script_path {
            if !self.options.dry_run && undo.file_count() > 0 {
                match undo.write(path) {
                    Ok(()) => summary.undo_script = Some(path.clone()),
                    Err(e) => warn!("Failed to write undo script {}: {}", path.display(), e),
                }
            }
        }

        summary
    }

    /// Plan, apply, and (unless dry-running) persist one file's edits.
    /// Returns the original contents when the file was changed.
    fn process_file(&self, path: &Path, requests: &[&DeletionRequest]) -> (FileResult, Option<String>) {
        let original = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                return (FileResult::failed(path, e), None);
            }
        };

        let plan = plan_file(&original, requests);
        for missing in &plan.unresolved {
            warn!("{}: could not locate {}; left in place", path.display(), missing);
        }
        let edited = FileEditor::new().apply(&original, &plan.edits);
        let delete_file = self.options.delete_empty_files && is_effectively_empty(&edited.contents);

        debug!(
            "{}: {} lines removed{}",
            path.display(),
            edited.lines_removed,
            if delete_file { ", file now empty" } else { "" }
        );

        if !self.options.dry_run {
            if let Err(e) = persist(path, &edited.contents, edited.changed, delete_file) {
                warn!("Failed to edit {}: {}", path.display(), e);
                return (FileResult::failed(path, e), None);
            }
        }

        let changed = edited.changed || delete_file;
        (
            FileResult {
                path: path.to_path_buf(),
                success: true,
                lines_removed: edited.lines_removed,
                file_deleted: delete_file,
                error: None,
                unresolved: plan.unresolved,
            },
            changed.then_some(original),
        )
    }
}

fn persist(path: &Path, contents: &str, changed: bool, delete_file: bool) -> SweepResult<()> {
    if delete_file {
        std::fs::remove_file(path).map_err(|e| SweepError::io(path, e))
    } else if changed {
        std::fs::write(path, contents).map_err(|e| SweepError::io(path, e))
    } else {
        Ok(())
    }
}

/// Edits for one file, plus the requests that matched nothing in its text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilePlan {
    pub edits: LineEdits,
    pub unresolved: Vec<String>,
}

/// Resolve every request against the file's current text
pub fn plan_file(contents: &str, requests: &[&DeletionRequest]) -> FilePlan {
    let lines: Vec<&str> = contents.lines().collect();
    let mut plan = FilePlan::default();

    for request in requests {
        let decl = &request.declaration;
        match &request.mode {
            DeletionMode::FullDeclaration => {
                if let Some(found) = list_entry_removal(decl, &lines) {
                    for related in found {
                        match related.partial {
                            Some(range) => plan.edits.remove_columns(range.line, range.start_column, range.end_column),
                            None => related.lines.lines().for_each(|line| plan.edits.remove_line(line)),
                        }
                    }
                    continue;
                }

                // A parameter outside any list it could be cut from is never widened to a block
                let span = match decl.kind {
                    DeclarationKind::Parameter => None,
                    _ => declaration_span(&lines, decl),
                };
                match span {
                    Some(span) => span.lines().for_each(|line| plan.edits.remove_line(line)),
                    None => plan.unresolved.push(decl.display()),
                }
            }
            DeletionMode::Lines(set) => {
                set.iter()
                    .filter(|&&line| line <= lines.len())
                    .for_each(|&line| plan.edits.remove_line(line));
            }
            DeletionMode::Partial(range) => {
                plan.edits.remove_columns(range.line, range.start_column, range.end_column);
            }
        }
    }

    plan
}

/// Lines making up a declaration. An extractor span wins; otherwise the
/// block is found by brace matching and attached comments are added.
/// Imports never take comment lines above them, so a file header survives.
/// `None` when the declaration lies past the end of the file.
pub fn declaration_span(lines: &[&str], decl: &Declaration) -> Option<LineSpan> {
    let line = decl.location.line.max(1);
    let last = lines.len();

    if decl.kind == DeclarationKind::Import {
        let span = decl.span.unwrap_or_else(|| LineSpan::single(line));
        let start = span.start.max(line);
        let mut end = span.end.max(line).min(last);
        if start > end {
            return None;
        }

        // A blank line after an import opening a group goes with it
        let opens_group = start == 1 || lines[start - 2].trim().is_empty();
        if opens_group && lines.get(end).is_some_and(|l| l.trim().is_empty()) {
            end += 1;
        }
        return Some(LineSpan::new(start, end));
    }

    if let Some(span) = decl.span {
        let start = span.start.max(1);
        let end = span.end.min(last);
        return (start <= end).then(|| LineSpan::new(start, end));
    }

    if line > lines.len() {
        return None;
    }

    let end = find_block_end(lines, line - 1) + 1;
    let mut start = line;
    while start > 1 && is_attached(lines[start - 2]) {
        start -= 1;
    }

    // One blank separator goes with the declaration when another follows it
    let blank_before = start > 1 && lines[start - 2].trim().is_empty();
    let blank_after = end >= lines.len() || lines[end].trim().is_empty();
    if blank_before && blank_after {
        start -= 1;
    }

    Some(LineSpan::new(start, end))
}

/// Doc comments, line comments, and attributes on their own line
fn is_attached(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && (is_comment_line(trimmed) || trimmed.starts_with('@'))
}
