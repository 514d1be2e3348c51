mod json;
mod persisted;
mod terminal;

pub use json::JsonReporter;
pub use persisted::{parse, read_report, render, write_report, REPORT_VERSION};
pub use terminal::TerminalReporter;

use crate::analysis::Classification;
use crate::config::AnalysisOptions;
use crate::error::{SweepError, SweepResult};
use crate::graph::{Declaration, DeclarationId, DeclarationKind, ExclusionReason};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

/// Result of one analysis run, as persisted and read back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub options: AnalysisOptions,
    pub excluded_test_files: usize,

    /// Unused declarations first, then excluded ones, each sorted by file then line
    pub declarations: Vec<Declaration>,
}

impl AnalysisReport {
    /// Assign ids 1..n over the unused declarations, then the excluded ones
    pub fn from_classification(classification: Classification, options: AnalysisOptions) -> Self {
        let declarations: Vec<Declaration> = classification
            .unused
            .into_iter()
            .chain(classification.excluded)
            .enumerate()
            .map(|(i, mut decl)| {
                decl.id = Some(DeclarationId(i + 1));
                decl
            })
            .collect();

        Self {
            options,
            excluded_test_files: classification.excluded_test_files,
            declarations,
        }
    }

    pub fn unused(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| !d.reason.is_excluded())
    }

    pub fn excluded(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| d.reason.is_excluded())
    }

    /// Whether the options recorded with this report make `decl` a deletion candidate
    pub fn is_actionable(&self, decl: &Declaration) -> bool {
        match decl.reason {
            ExclusionReason::None => true,
            ExclusionReason::Override => self.options.include_overrides,
            ExclusionReason::InterfaceImplementation => self.options.include_interface_members,
            ExclusionReason::PlatformMarker => self.options.include_platform_marked,
            ExclusionReason::WriteOnly | ExclusionReason::EnumerableCase => false,
        }
    }

    pub fn actionable(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(|d| self.is_actionable(d))
    }

    pub fn find(&self, id: usize) -> SweepResult<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.id == Some(DeclarationId(id)))
            .ok_or(SweepError::UnknownId(id))
    }

    pub fn select(&self, filter: &ReportFilter) -> Vec<&Declaration> {
        self.declarations.iter().filter(|d| filter.matches(d)).collect()
    }
}

/// Narrowing applied by `list` and pattern-based `delete`
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub pattern: Option<String>,
    pub reason: Option<ExclusionReason>,
    pub kind: Option<DeclarationKind>,
}

impl ReportFilter {
    pub fn matches(&self, decl: &Declaration) -> bool {
        self.pattern.as_deref().map(|p| decl.matches_pattern(p)).unwrap_or(true)
            && self.reason.map(|r| decl.reason == r).unwrap_or(true)
            && self.kind.map(|k| decl.kind == k).unwrap_or(true)
    }
}

/// Output format for reports
#[derive(Debug, Clone, Default)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
    Csv,
}

/// Writes an analysis report in the chosen format
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self { format, output_path }
    }

    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        match &self.format {
            ReportFormat::Terminal => TerminalReporter::new().report(report),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(report),
            ReportFormat::Csv => match &self.output_path {
                Some(path) => {
                    write_report(report, path)?;
                    println!("Report written to: {}", path.display());
                    Ok(())
                }
                None => {
                    use std::io::Write;
                    std::io::stdout()
                        .write_all(render(report).as_bytes())
                        .into_diagnostic()
                }
            },
        }
    }
}
