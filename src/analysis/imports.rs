// Cross-file import dependencies
//
// When a file uses a module's exported symbol without importing that module,
// it compiles only because a sibling file in the same unit does import it.
// Such modules must never be reported as unused anywhere.

use crate::graph::{normalize_identifier, FileFacts};
use crate::oracle::ModuleIndex;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

pub struct ImportDependencyResolver<'a> {
    modules: &'a ModuleIndex,
    always_needed: &'a HashSet<String>,
}

impl<'a> ImportDependencyResolver<'a> {
    pub fn new(modules: &'a ModuleIndex, always_needed: &'a HashSet<String>) -> Self {
        Self {
            modules,
            always_needed,
        }
    }

    /// Modules some file depends on without importing them itself
    pub fn resolve(&self, files: &[FileFacts]) -> HashSet<String> {
        let imported: HashSet<&str> = files
            .iter()
            .flat_map(|f| f.facts.imports.iter())
            .map(|i| normalize_identifier(&i.module))
            .collect();

        let needed = files
            .par_iter()
            .map(|file| self.leaks_in_file(file, &imported))
            .reduce(HashSet::new, |mut acc, set| {
                acc.extend(set);
                acc
            });

        debug!("{} modules needed across files", needed.len());
        needed
    }

    /// Modules imported elsewhere whose exports `file` uses without importing them
    pub fn leaks_in_file(&self, file: &FileFacts, imported: &HashSet<&str>) -> HashSet<String> {
        let own: HashSet<&str> = file
            .facts
            .imports
            .iter()
            .map(|i| normalize_identifier(&i.module))
            .collect();

        self.modules
            .modules()
            .filter(|(module, _)| !self.always_needed.contains(*module))
            .filter(|(module, _)| imported.contains(module.as_str()) && !own.contains(module.as_str()))
            .filter(|(_, exports)| {
                file.facts
                    .used_identifiers
                    .iter()
                    .any(|id| exports.contains(normalize_identifier(id)))
            })
            .map(|(module, _)| module.clone())
            .collect()
    }
}
