use crate::config::Config;
use crate::error::{SweepError, SweepResult};
use crate::graph::{FactBundle, FileFacts};
use ignore::WalkBuilder;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

/// Facts for a whole project, split into analysed and test sources
#[derive(Debug, Clone, Default)]
pub struct ProjectFacts {
    /// Every non-excluded file, test files included
    pub files: Vec<FileFacts>,

    /// Source paths recognized as tests; their declarations are never reported
    pub test_files: HashSet<PathBuf>,

    /// Files dropped by `exclude` patterns
    pub excluded_files: usize,
}

impl ProjectFacts {
    /// Partition raw facts using the config's exclude and test patterns
    pub fn from_files(files: Vec<FileFacts>, config: &Config) -> Self {
        let mut project = Self::default();
        for file in files {
            if config.should_exclude(&file.path) {
                trace!("Excluding facts for {}", file.path.display());
                project.excluded_files += 1;
                continue;
            }
            if config.is_test_file(&file.path) {
                project.test_files.insert(file.path.clone());
            }
            project.files.push(file);
        }
        project
    }

    pub fn is_test_file(&self, path: &Path) -> bool {
        self.test_files.contains(path)
    }

    pub fn excluded_test_files(&self) -> usize {
        self.test_files.len()
    }

    /// Files whose declarations are classified
    pub fn analysed_files(&self) -> impl Iterator<Item = &FileFacts> {
        self.files.iter().filter(|f| !self.test_files.contains(&f.path))
    }

    pub fn file(&self, path: &Path) -> Option<&FileFacts> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// A fact file holds either one file's facts or a whole bundle
#[derive(Deserialize)]
#[serde(untagged)]
enum FactDocument {
    Bundle(FactBundle),
    Single(FileFacts),
}

/// Locates and loads extractor output
pub struct FactFinder<'a> {
    config: &'a Config,
}

impl<'a> FactFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Load facts from a bundle file or a directory of per-file fact files
    pub fn load(&self, path: &Path) -> SweepResult<ProjectFacts> {
        if !path.exists() {
            return Err(SweepError::InputAbsent {
                path: path.to_path_buf(),
            });
        }

        let files = if path.is_dir() {
            let fact_files = self.find_fact_files(path);
            info!("Loading {} fact files from {}", fact_files.len(), path.display());

            let loaded: Vec<SweepResult<Vec<FileFacts>>> =
                fact_files.par_iter().map(|p| read_fact_file(p)).collect();

            let mut files = Vec::new();
            for result in loaded {
                files.extend(result?);
            }
            files
        } else {
            read_fact_file(path)?
        };

        let project = ProjectFacts::from_files(files, self.config);
        debug!(
            "Loaded facts for {} files ({} tests, {} excluded)",
            project.files.len(),
            project.test_files.len(),
            project.excluded_files
        );
        Ok(project)
    }

    /// Every `*.json` file below `dir`, honouring ignore files
    fn find_fact_files(&self, dir: &Path) -> Vec<PathBuf> {
        let walker = WalkBuilder::new(dir)
            .hidden(true)
            .git_ignore(true)
            .ignore(true)
            .parents(true)
            .follow_links(false)
            .build();

        let mut found: Vec<PathBuf> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();

        found.sort();
        found
    }
}

fn read_fact_file(path: &Path) -> SweepResult<Vec<FileFacts>> {
    let contents = std::fs::read_to_string(path).map_err(|e| SweepError::io(path, e))?;
    let document: FactDocument = serde_json::from_str(&contents).map_err(|e| SweepError::Facts {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    Ok(match document {
        FactDocument::Bundle(bundle) => bundle.files,
        FactDocument::Single(file) => vec![file],
    })
}
