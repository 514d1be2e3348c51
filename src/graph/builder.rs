use super::{normalize_identifier, FactSet, FileFacts, InheritanceGraph};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-wide maps merged from every file's facts.
///
/// Every map merges by union: a name contributed by two files accumulates both
/// contributions, so merge order never changes the result.
#[derive(Debug, Clone, Default)]
pub struct GlobalGraphs {
    /// Interface name -> direct member requirements
    pub interface_requirements: HashMap<String, HashSet<String>>,

    /// Interface name -> direct parent interfaces
    pub interface_parents: HashMap<String, HashSet<String>>,

    /// Interfaces declared somewhere in the project
    pub defined_interfaces: HashSet<String>,

    /// Interfaces some project type conforms to
    pub conformed_interfaces: HashSet<String>,

    /// Type -> direct ancestors
    pub inheritance: InheritanceGraph,

    /// File -> modules it imports
    pub imports_by_file: HashMap<PathBuf, HashSet<String>>,

    /// Module -> files importing it
    pub importers: HashMap<String, HashSet<PathBuf>>,

    /// Every identifier read anywhere in the project
    pub used_identifiers: HashSet<String>,

    /// Every identifier assigned anywhere in the project
    pub assigned_identifiers: HashSet<String>,
}

fn union_into(target: &mut HashMap<String, HashSet<String>>, source: &HashMap<String, HashSet<String>>) {
    for (name, values) in source {
        target
            .entry(normalize_identifier(name).to_string())
            .or_default()
            .extend(values.iter().map(|v| normalize_identifier(v).to_string()));
    }
}

fn normalized(values: &HashSet<String>) -> impl Iterator<Item = String> + '_ {
    values.iter().map(|v| normalize_identifier(v).to_string())
}

impl GlobalGraphs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's facts into the global maps
    pub fn add_file(&mut self, path: &Path, facts: &FactSet) {
        union_into(&mut self.interface_requirements, &facts.interface_requirements);
        union_into(&mut self.interface_parents, &facts.interface_parents);

        self.defined_interfaces.extend(normalized(&facts.defined_interfaces));
        self.conformed_interfaces.extend(normalized(&facts.conformed_interfaces));

        for name in &facts.defined_interfaces {
            let name = normalize_identifier(name).to_string();
            self.interface_requirements.entry(name.clone()).or_default();
            self.interface_parents.entry(name).or_default();
        }

        for (ty, ancestors) in &facts.type_inheritance {
            let ty = normalize_identifier(ty);
            self.inheritance.add_type(ty);
            for ancestor in ancestors {
                self.inheritance.add_edge(ty, normalize_identifier(ancestor));
            }
        }

        let modules = self.imports_by_file.entry(path.to_path_buf()).or_default();
        for import in &facts.imports {
            modules.insert(import.module.clone());
            self.importers
                .entry(import.module.clone())
                .or_default()
                .insert(path.to_path_buf());
        }

        self.used_identifiers.extend(normalized(&facts.used_identifiers));
        self.assigned_identifiers.extend(normalized(&facts.assigned_identifiers));
    }

    /// Union another partial result into this one
    pub fn merge(&mut self, other: GlobalGraphs) {
        union_into(&mut self.interface_requirements, &other.interface_requirements);
        union_into(&mut self.interface_parents, &other.interface_parents);
        self.defined_interfaces.extend(other.defined_interfaces);
        self.conformed_interfaces.extend(other.conformed_interfaces);
        self.inheritance.merge(&other.inheritance);

        for (file, modules) in other.imports_by_file {
            self.imports_by_file.entry(file).or_default().extend(modules);
        }
        for (module, files) in other.importers {
            self.importers.entry(module).or_default().extend(files);
        }

        self.used_identifiers.extend(other.used_identifiers);
        self.assigned_identifiers.extend(other.assigned_identifiers);
    }

    pub fn is_read(&self, name: &str) -> bool {
        self.used_identifiers.contains(normalize_identifier(name))
    }

    pub fn is_assigned(&self, name: &str) -> bool {
        self.assigned_identifiers.contains(normalize_identifier(name))
    }

    /// Whether any file imports `module`
    pub fn is_imported(&self, module: &str) -> bool {
        self.importers.get(module).map(|f| !f.is_empty()).unwrap_or(false)
    }
}

/// Sequential reduction of per-file facts into [`GlobalGraphs`]
pub struct Aggregator {
    graphs: GlobalGraphs,
    file_count: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            graphs: GlobalGraphs::new(),
            file_count: 0,
        }
    }

    /// Add one file's facts
    pub fn add(&mut self, file: &FileFacts) {
        debug!("Aggregating facts from {}", file.path.display());
        self.graphs.add_file(&file.path, &file.facts);
        self.file_count += 1;
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn build(self) -> GlobalGraphs {
        debug!(
            "Aggregated {} files: {} interfaces, {} types",
            self.file_count,
            self.graphs.interface_requirements.len(),
            self.graphs.inheritance.type_count()
        );
        self.graphs
    }

    /// Fold a whole slice of files
    pub fn from_files(files: &[FileFacts]) -> GlobalGraphs {
        let mut aggregator = Self::new();
        for file in files {
            aggregator.add(file);
        }
        aggregator.build()
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
