use super::AnalysisReport;
use crate::graph::ExclusionReason;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, report: &AnalysisReport) -> Result<()> {
        let json = serde_json::to_string_pretty(&JsonReport::from_report(report)).into_diagnostic()?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: u32,
    options: JsonOptions,
    excluded_test_files: usize,
    declarations: Vec<JsonDeclaration>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonOptions {
    include_overrides: bool,
    include_interface_members: bool,
    include_platform_marked: bool,
}

#[derive(Serialize)]
struct JsonDeclaration {
    id: Option<usize>,
    name: String,
    kind: &'static str,
    file: String,
    line: usize,
    parent_type: Option<String>,
    exclusion_reason: &'static str,
    actionable: bool,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    actionable: usize,
    by_reason: BTreeMap<&'static str, usize>,
}

impl JsonReport {
    fn from_report(report: &AnalysisReport) -> Self {
        let mut by_reason: BTreeMap<&'static str, usize> = BTreeMap::new();
        for reason in ExclusionReason::ALL {
            by_reason.insert(reason.as_str(), 0);
        }

        let declarations: Vec<JsonDeclaration> = report
            .declarations
            .iter()
            .map(|decl| {
                *by_reason.entry(decl.reason.as_str()).or_default() += 1;
                JsonDeclaration {
                    id: decl.id.map(|id| id.0),
                    name: decl.name.clone(),
                    kind: decl.kind.display_name(),
                    file: decl.location.file.to_string_lossy().to_string(),
                    line: decl.location.line,
                    parent_type: decl.parent_type.clone(),
                    exclusion_reason: decl.reason.as_str(),
                    actionable: report.is_actionable(decl),
                }
            })
            .collect();

        let actionable = declarations.iter().filter(|d| d.actionable).count();
        let options = &report.options;

        Self {
            version: super::REPORT_VERSION,
            options: JsonOptions {
                include_overrides: options.include_overrides,
                include_interface_members: options.include_interface_members,
                include_platform_marked: options.include_platform_marked,
            },
            excluded_test_files: report.excluded_test_files,
            summary: JsonSummary {
                total: declarations.len(),
                actionable,
                by_reason,
            },
            declarations,
        }
    }
}
