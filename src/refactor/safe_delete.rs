use super::planner::{DeletionOptions, DeletionPlanner, DeletionRequest, DeletionSummary};
use super::related::{RelatedCodeFinder, RelatedDeletion};
use crate::graph::Declaration;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Deletes selected declarations (and optionally their related code) with user confirmation
pub struct SafeDeleter {
    interactive: bool,
    options: DeletionOptions,
    related: Option<RelatedCodeFinder>,
    undo_script_path: Option<PathBuf>,
}

impl SafeDeleter {
    pub fn new(options: DeletionOptions) -> Self {
        Self {
            interactive: false,
            options,
            related: None,
            undo_script_path: None,
        }
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Also remove code coupled to each declaration
    pub fn with_related(mut self, finder: RelatedCodeFinder) -> Self {
        self.related = Some(finder);
        self
    }

    pub fn with_undo_script(mut self, path: Option<PathBuf>) -> Self {
        self.undo_script_path = path;
        self
    }

    /// Full-declaration requests for every declaration plus their related deletions
    pub fn requests(&self, declarations: &[Declaration]) -> Vec<DeletionRequest> {
        let mut requests: Vec<DeletionRequest> = declarations.iter().cloned().map(DeletionRequest::full).collect();

        if let Some(finder) = &self.related {
            let mut contents: HashMap<&Path, Option<String>> = HashMap::new();
            for decl in declarations {
                let path = decl.location.file.as_path();
                let text = contents.entry(path).or_insert_with(|| match std::fs::read_to_string(path) {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!("Skipping related code in {}: {}", path.display(), e);
                        None
                    }
                });
                if let Some(text) = text {
                    requests.extend(finder.find(decl, text).into_iter().map(DeletionRequest::from));
                }
            }
        }

        requests
    }

    /// Related fragments found for `decl`, for previews
    pub fn related_for(&self, decl: &Declaration) -> Vec<RelatedDeletion> {
        let Some(finder) = &self.related else {
            return Vec::new();
        };
        std::fs::read_to_string(&decl.location.file)
            .map(|text| finder.find(decl, &text))
            .unwrap_or_default()
    }

    pub fn delete(&self, declarations: &[Declaration]) -> Result<DeletionSummary> {
        if declarations.is_empty() {
            println!("{}", "Nothing to delete.".green());
            return Ok(DeletionSummary::default());
        }

        let selected: Vec<Declaration> = if self.interactive && !self.options.dry_run {
            self.interactive_select(declarations)?
        } else {
            declarations.to_vec()
        };

        if selected.is_empty() {
            println!("{}", "No items selected for deletion.".yellow());
            return Ok(DeletionSummary::default());
        }

        if self.options.dry_run {
            self.preview(&selected);
        }

        let mut planner = DeletionPlanner::new(self.options);
        if let Some(path) = &self.undo_script_path {
            planner = planner.with_undo_script(path);
        }
        let summary = planner.execute(&self.requests(&selected));

        print_summary(&summary);
        Ok(summary)
    }

    fn preview(&self, declarations: &[Declaration]) {
        println!();
        println!("{}", "Dry run - would delete:".yellow().bold());
        for decl in declarations {
            println!(
                "  {} {} at {}",
                decl.kind.display_name(),
                decl.name.white(),
                decl.location
            );
            for related in self.related_for(decl) {
                println!(
                    "    {} {} (line {})",
                    "+".dimmed(),
                    related.description,
                    related.lines.start
                );
            }
        }
    }

    /// Select from a checklist, then confirm the selection
    fn interactive_select(&self, declarations: &[Declaration]) -> Result<Vec<Declaration>> {
        let items: Vec<String> = declarations.iter().map(|d| d.display()).collect();

        println!();
        println!("{}", "Select items to delete:".cyan().bold());
        println!("{}", "(Space to toggle, Enter to confirm)".dimmed());
        println!();

        let selections = MultiSelect::with_theme(&ColorfulTheme::default())
            .items(&items)
            .interact()
            .into_diagnostic()?;

        let selected: Vec<Declaration> = selections.into_iter().map(|i| declarations[i].clone()).collect();

        if !selected.is_empty() {
            println!();
            let confirm = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("Delete {} items?", selected.len()))
                .default(false)
                .interact()
                .into_diagnostic()?;

            if !confirm {
                return Ok(Vec::new());
            }
        }

        Ok(selected)
    }
}

fn print_summary(summary: &DeletionSummary) {
    println!();
    for result in &summary.results {
        match &result.error {
            None if result.file_deleted => println!(
                "  {} {} (file deleted)",
                "✓".green(),
                result.path.display()
            ),
            None => println!(
                "  {} {} ({} lines removed)",
                "✓".green(),
                result.path.display(),
                result.lines_removed
            ),
            Some(error) => println!("  {} {}: {}", "✗".red(), result.path.display(), error),
        }
        for missing in &result.unresolved {
            println!("    {} {} not found in current text; left in place", "!".yellow(), missing);
        }
    }

    println!();
    let verb = if summary.dry_run { "Would remove" } else { "Removed" };
    println!(
        "{}",
        format!(
            "{} {} lines in {} files ({} files deleted, {} failed)",
            verb,
            summary.lines_removed(),
            summary.succeeded(),
            summary.files_deleted(),
            summary.failed()
        )
        .dimmed()
    );

    if let Some(path) = &summary.undo_script {
        println!("{} Undo script saved to: {}", "→".dimmed(), path.display());
    }
}
