use super::AnalysisReport;
use crate::graph::{Declaration, ExclusionReason};
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// List excluded declarations as well as actionable ones
    show_excluded: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_excluded: true }
    }

    pub fn with_excluded(mut self, show: bool) -> Self {
        self.show_excluded = show;
        self
    }

    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        let shown: Vec<&Declaration> = report
            .declarations
            .iter()
            .filter(|d| self.show_excluded || report.is_actionable(d))
            .collect();
        self.print_declarations(report, &shown);
        Ok(())
    }

    /// Print a selection of a report's declarations grouped by file
    pub fn print_declarations(&self, report: &AnalysisReport, declarations: &[&Declaration]) {
        if declarations.is_empty() {
            println!("{}", "No unused declarations found!".green().bold());
            return;
        }

        let mut by_file: BTreeMap<&Path, Vec<&Declaration>> = BTreeMap::new();
        for decl in declarations {
            by_file.entry(decl.location.file.as_path()).or_default().push(decl);
        }

        println!();
        println!(
            "{}",
            format!("Found {} unused declarations:", declarations.len()).yellow().bold()
        );
        println!();

        for (file, items) in &by_file {
            println!("{}", file.display().to_string().cyan().bold());
            for item in items {
                self.print_item(report, item);
            }
            println!();
        }

        self.print_summary(report, declarations);
    }

    fn print_item(&self, report: &AnalysisReport, decl: &Declaration) {
        let id = decl.id.map(|id| format!("#{}", id)).unwrap_or_else(|| "#-".to_string());
        let reason = if report.is_actionable(decl) {
            decl.reason.description().red()
        } else {
            decl.reason.description().dimmed()
        };
        let name = match &decl.parent_type {
            Some(parent) => format!("{}.{}", parent, decl.name),
            None => decl.name.clone(),
        };

        println!(
            "  {:>5} {} {} '{}' {}",
            id.dimmed(),
            format!("{}:", decl.location.line).dimmed(),
            decl.kind.display_name(),
            name.white(),
            reason
        );
    }

    fn print_summary(&self, report: &AnalysisReport, declarations: &[&Declaration]) {
        println!("{}", "─".repeat(60).dimmed());

        let actionable = declarations.iter().filter(|d| report.is_actionable(d)).count();
        println!(
            "Summary: {} actionable, {} excluded",
            actionable.to_string().red(),
            (declarations.len() - actionable).to_string().dimmed()
        );

        let parts: Vec<String> = ExclusionReason::ALL
            .iter()
            .filter(|r| r.is_excluded())
            .filter_map(|reason| {
                let count = declarations.iter().filter(|d| d.reason == *reason).count();
                (count > 0).then(|| format!("{} {}", count, reason))
            })
            .collect();
        if !parts.is_empty() {
            println!("Excluded: {}", parts.join(", ").dimmed());
        }
        if report.excluded_test_files > 0 {
            println!(
                "{}",
                format!("{} test files not analysed", report.excluded_test_files).dimmed()
            );
        }
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
