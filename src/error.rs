//! Typed errors for deadsweep operations.
//!
//! Library entry points return these so callers can match on the failure
//! class; the binary renders them through miette.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum SweepError {
    /// A project, facts, report, or source file that the operation needs is missing
    #[error("input not found: {}", path.display())]
    #[diagnostic(
        code(deadsweep::input_absent),
        help("check the path; deadsweep never substitutes empty data for a missing input")
    )]
    InputAbsent { path: PathBuf },

    #[error("I/O error at {}: {source}", path.display())]
    #[diagnostic(code(deadsweep::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse extraction facts in {}: {message}", path.display())]
    #[diagnostic(code(deadsweep::facts))]
    Facts { path: PathBuf, message: String },

    #[error("malformed report {} at line {line}: {message}", path.display())]
    #[diagnostic(code(deadsweep::report))]
    MalformedReport {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("unsupported report version {found} (expected {expected})")]
    #[diagnostic(code(deadsweep::report_version))]
    ReportVersion { found: u32, expected: u32 },

    #[error("invalid configuration in {}: {message}", path.display())]
    #[diagnostic(code(deadsweep::config))]
    Config { path: PathBuf, message: String },

    #[error("no declaration with id {0} in report")]
    #[diagnostic(code(deadsweep::unknown_id))]
    UnknownId(usize),

    #[error("failed to launch editor `{command}`: {message}")]
    #[diagnostic(code(deadsweep::editor))]
    EditorLaunch { command: String, message: String },
}

impl SweepError {
    /// Wrap an I/O error, mapping `NotFound` onto [`SweepError::InputAbsent`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::InputAbsent { path }
        } else {
            Self::Io { path, source }
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::MalformedReport {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Whether the failure is an absent input rather than a content problem.
    pub fn is_input_absent(&self) -> bool {
        matches!(self, Self::InputAbsent { .. })
    }
}

pub type SweepResult<T> = Result<T, SweepError>;
