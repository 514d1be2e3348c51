use crate::error::{SweepError, SweepResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Generates a shell script restoring files to their pre-deletion contents.
/// Deleted files are recreated.
pub struct UndoScript {
    file_states: BTreeMap<PathBuf, String>,
}

const DELIMITER: &str = "DEADSWEEP_EOF";

impl UndoScript {
    pub fn new() -> Self {
        Self {
            file_states: BTreeMap::new(),
        }
    }

    /// Record the state of a file before modification; the first recording wins
    pub fn record_file_state(&mut self, path: &Path, contents: &str) {
        self.file_states
            .entry(path.to_path_buf())
            .or_insert_with(|| contents.to_string());
    }

    pub fn render(&self) -> String {
        let mut script = String::new();

        script.push_str("#!/bin/bash\n");
        script.push_str("# deadsweep undo script\n");
        script.push_str("# Run to restore files changed by the last deletion\n\n");
        script.push_str("set -e\n\n");

        for (file_path, contents) in &self.file_states {
            let escaped_path = file_path.display().to_string().replace('\'', "'\\''");

            script.push_str(&format!("# Restore {}\n", file_path.display()));
            script.push_str(&format!("mkdir -p \"$(dirname '{}')\"\n", escaped_path));
            if contents.is_empty() {
                script.push_str(&format!(": > '{}'\n", escaped_path));
            } else if contents.ends_with('\n') {
                // Quoted heredoc: contents are written verbatim
                script.push_str(&format!("cat > '{}' << '{}'\n", escaped_path, DELIMITER));
                script.push_str(contents);
                script.push_str(DELIMITER);
                script.push('\n');
            } else {
                script.push_str(&format!("printf '%s' \"$(cat << '{}'\n", DELIMITER));
                script.push_str(contents);
                script.push('\n');
                script.push_str(DELIMITER);
                script.push_str(&format!("\n)\" > '{}'\n", escaped_path));
            }
            script.push_str(&format!("echo '  Restored: {}'\n\n", escaped_path));
        }

        script.push_str("echo 'Done.'\n");
        script
    }

    pub fn write(&self, path: &Path) -> SweepResult<()> {
        std::fs::write(path, self.render()).map_err(|e| SweepError::io(path, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)
                .map_err(|e| SweepError::io(path, e))?
                .permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms).map_err(|e| SweepError::io(path, e))?;
        }

        Ok(())
    }

    pub fn file_count(&self) -> usize {
        self.file_states.len()
    }
}

impl Default for UndoScript {
    fn default() -> Self {
        Self::new()
    }
}
