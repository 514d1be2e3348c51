//! Opening a reported declaration in the user's editor.

use crate::error::{SweepError, SweepResult};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Launches an external editor at a file and line
#[derive(Debug, Clone)]
pub struct EditorLauncher {
    command: String,
}

impl EditorLauncher {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Pick the configured editor, else `$VISUAL`, else `$EDITOR`
    pub fn from_env(configured: Option<&str>) -> SweepResult<Self> {
        let visual = std::env::var("VISUAL").ok();
        let editor = std::env::var("EDITOR").ok();
        resolve_command(configured, visual.as_deref(), editor.as_deref())
            .map(Self::new)
            .ok_or_else(|| SweepError::EditorLaunch {
                command: String::new(),
                message: "no editor configured; set `editor` in the config, $VISUAL, or $EDITOR".to_string(),
            })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Program and full argument list for opening `path` at `line`
    pub fn invocation(&self, path: &Path, line: usize) -> (String, Vec<String>) {
        let mut words = self.command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_default();
        let mut args: Vec<String> = words.collect();
        args.extend(line_args(&program, path, line));
        (program, args)
    }

    pub fn open(&self, path: &Path, line: usize) -> SweepResult<()> {
        let (program, args) = self.invocation(path, line);
        let failed = |message: String| SweepError::EditorLaunch {
            command: self.command.clone(),
            message,
        };
        if program.is_empty() {
            return Err(failed("empty editor command".to_string()));
        }

        debug!("Launching {} {:?}", program, args);
        let status = Command::new(&program)
            .args(&args)
            .status()
            .map_err(|e| failed(e.to_string()))?;

        if !status.success() {
            return Err(failed(format!("editor exited with {}", status)));
        }
        Ok(())
    }
}

fn resolve_command(configured: Option<&str>, visual: Option<&str>, editor: Option<&str>) -> Option<String> {
    [configured, visual, editor]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

/// Line-positioning arguments understood by well-known editors
fn line_args(program: &str, path: &Path, line: usize) -> Vec<String> {
    let name = Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program);
    let file = path.display().to_string();

    match name {
        "code" | "code-insiders" | "codium" => vec!["-g".to_string(), format!("{}:{}", file, line)],
        "subl" | "zed" => vec![format!("{}:{}", file, line)],
        "vi" | "vim" | "nvim" | "gvim" | "nano" | "emacs" | "emacsclient" | "micro" | "kak" => {
            vec![format!("+{}", line), file]
        }
        _ => vec![file],
    }
}
