//! The persisted report: a versioned, comma-separated listing of every
//! unused declaration that later `list`, `open`, and `delete` runs read back.
//!
//! ```text
//! # deadsweep-report v1
//! # options: include_overrides=false,include_interface_members=false,include_platform_marked=false
//! # excluded_test_files: 2
//! id,name,kind,file,line,exclusion_reason,parent_type
//! 1,helper,function,Sources/A.swift,12,none,
//! ```

use super::AnalysisReport;
use crate::config::AnalysisOptions;
use crate::error::{SweepError, SweepResult};
use crate::graph::{Declaration, DeclarationId, DeclarationKind, ExclusionReason, Location};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const REPORT_VERSION: u32 = 1;

const VERSION_PREFIX: &str = "# deadsweep-report v";
const OPTIONS_PREFIX: &str = "# options: ";
const TEST_FILES_PREFIX: &str = "# excluded_test_files: ";
const HEADER: &str = "id,name,kind,file,line,exclusion_reason,parent_type";
const COLUMNS: usize = 7;

pub fn write_report(report: &AnalysisReport, path: &Path) -> SweepResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SweepError::io(parent, e))?;
    }
    std::fs::write(path, render(report)).map_err(|e| SweepError::io(path, e))?;
    debug!("Wrote {} declarations to {}", report.declarations.len(), path.display());
    Ok(())
}

pub fn read_report(path: &Path) -> SweepResult<AnalysisReport> {
    let contents = std::fs::read_to_string(path).map_err(|e| SweepError::io(path, e))?;
    parse(&contents, path)
}

pub fn render(report: &AnalysisReport) -> String {
    let options = &report.options;
    let mut out = String::new();

    out.push_str(&format!("{}{}\n", VERSION_PREFIX, REPORT_VERSION));
    out.push_str(&format!(
        "{}include_overrides={},include_interface_members={},include_platform_marked={}\n",
        OPTIONS_PREFIX,
        options.include_overrides,
        options.include_interface_members,
        options.include_platform_marked
    ));
    out.push_str(&format!("{}{}\n", TEST_FILES_PREFIX, report.excluded_test_files));
    out.push_str(HEADER);
    out.push('\n');

    for decl in &report.declarations {
        let id = decl.id.map(|id| id.to_string()).unwrap_or_default();
        let file = decl.location.file.to_string_lossy();
        let line = decl.location.line.to_string();
        let fields = [
            id.as_str(),
            decl.name.as_str(),
            decl.kind.display_name(),
            file.as_ref(),
            line.as_str(),
            decl.reason.as_str(),
            decl.parent_type.as_deref().unwrap_or(""),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quote a field containing a separator, quote, or line break; double inner quotes
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Parse report text; `path` only labels errors
pub fn parse(contents: &str, path: &Path) -> SweepResult<AnalysisReport> {
    let mut lines = contents.lines();
    let malformed = |line: usize, message: String| SweepError::malformed(path, line, message);

    let version_line = lines.next().unwrap_or("");
    let version = version_line
        .strip_prefix(VERSION_PREFIX)
        .ok_or_else(|| malformed(1, "missing report version line".to_string()))?;
    let version: u32 = version
        .trim()
        .parse()
        .map_err(|_| malformed(1, format!("invalid report version `{}`", version.trim())))?;
    if version != REPORT_VERSION {
        return Err(SweepError::ReportVersion {
            found: version,
            expected: REPORT_VERSION,
        });
    }

    let options_line = lines.next().unwrap_or("");
    let options = parse_options(options_line).map_err(|message| malformed(2, message))?;

    let test_files_line = lines.next().unwrap_or("");
    let excluded_test_files = test_files_line
        .strip_prefix(TEST_FILES_PREFIX)
        .and_then(|n| n.trim().parse().ok())
        .ok_or_else(|| malformed(3, "missing excluded test file count".to_string()))?;

    if lines.next().map(str::trim_end) != Some(HEADER) {
        return Err(malformed(4, format!("expected header `{}`", HEADER)));
    }

    let body_start = nth_line_offset(contents, 4);
    let mut declarations = Vec::new();
    for (line, fields) in split_records(&contents[body_start..], 5, path)? {
        declarations.push(parse_row(&fields, line, path)?);
    }

    Ok(AnalysisReport {
        options,
        excluded_test_files,
        declarations,
    })
}

fn parse_options(line: &str) -> Result<AnalysisOptions, String> {
    let body = line
        .strip_prefix(OPTIONS_PREFIX)
        .ok_or_else(|| "missing options line".to_string())?;
    let mut options = AnalysisOptions::default();

    for pair in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("invalid option `{}`", pair))?;
        let value: bool = value
            .parse()
            .map_err(|_| format!("invalid value for {}: `{}`", key, value))?;
        match key {
            "include_overrides" => options.include_overrides = value,
            "include_interface_members" => options.include_interface_members = value,
            "include_platform_marked" => options.include_platform_marked = value,
            other => return Err(format!("unknown option `{}`", other)),
        }
    }

    Ok(options)
}

/// Byte offset of the start of line `n` (0-based)
fn nth_line_offset(contents: &str, n: usize) -> usize {
    contents
        .match_indices('\n')
        .nth(n.saturating_sub(1))
        .map(|(i, _)| i + 1)
        .unwrap_or(contents.len())
}

/// Split CSV text into records, honouring quoted fields that span lines.
/// Each record carries the 1-based file line it starts on.
fn split_records(text: &str, first_line: usize, path: &Path) -> SweepResult<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = first_line;
    let mut record_line = first_line;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut field));
                if !(fields.len() == 1 && fields[0].is_empty()) {
                    records.push((record_line, std::mem::take(&mut fields)));
                }
                fields.clear();
                line += 1;
                record_line = line;
            }
            '\n' => {
                field.push(c);
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SweepError::malformed(path, record_line, "unterminated quoted field"));
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push((record_line, fields));
    }

    Ok(records)
}

fn parse_row(fields: &[String], line: usize, path: &Path) -> SweepResult<Declaration> {
    let malformed = |message: String| SweepError::malformed(path, line, message);

    if fields.len() != COLUMNS {
        return Err(malformed(format!("expected {} fields, found {}", COLUMNS, fields.len())));
    }

    let id = match fields[0].as_str() {
        "" => None,
        raw => Some(DeclarationId(
            raw.parse().map_err(|_| malformed(format!("invalid id `{}`", raw)))?,
        )),
    };
    let kind = DeclarationKind::from_display_name(&fields[2])
        .ok_or_else(|| malformed(format!("unknown kind `{}`", fields[2])))?;
    let decl_line: usize = fields[4]
        .parse()
        .map_err(|_| malformed(format!("invalid line `{}`", fields[4])))?;
    let reason = ExclusionReason::parse(&fields[5])
        .ok_or_else(|| malformed(format!("unknown exclusion reason `{}`", fields[5])))?;

    Ok(Declaration {
        id,
        name: fields[1].clone(),
        kind,
        location: Location::new(PathBuf::from(&fields[3]), decl_line),
        parent_type: (!fields[6].is_empty()).then(|| fields[6].clone()),
        reason,
        span: None,
    })
}
