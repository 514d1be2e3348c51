//! Per-file extraction facts.
//!
//! These are produced by an external, language-specific extractor (one value
//! per source file, built independently) and are immutable once loaded.

use super::{normalize_identifier, Declaration, DeclarationKind, LineSpan, Location};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// An `import` statement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportStatement {
    #[serde(alias = "moduleName")]
    pub module: String,
    pub line: usize,
}

impl ImportStatement {
    pub fn new(module: impl Into<String>, line: usize) -> Self {
        Self {
            module: module.into(),
            line,
        }
    }
}

/// Project-wide relationships visible in one file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactSet {
    /// Imports in source order
    pub imports: Vec<ImportStatement>,

    /// Identifiers read or referenced anywhere in the file
    pub used_identifiers: HashSet<String>,

    /// Identifiers that appear only as assignment targets
    pub assigned_identifiers: HashSet<String>,

    /// Interface name -> direct member requirements
    pub interface_requirements: HashMap<String, HashSet<String>>,

    /// Interface name -> direct parent interfaces
    pub interface_parents: HashMap<String, HashSet<String>>,

    /// Interfaces declared in this file
    pub defined_interfaces: HashSet<String>,

    /// Interfaces any type in this file conforms to
    pub conformed_interfaces: HashSet<String>,

    /// Type name -> direct ancestors (superclass and conformances, extensions included)
    pub type_inheritance: HashMap<String, HashSet<String>>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imports_module(&self, module: &str) -> bool {
        self.imports.iter().any(|i| i.module == module)
    }

    pub fn uses(&self, name: &str) -> bool {
        self.used_identifiers.contains(name)
    }
}

/// Parameter-specific facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterBinding {
    /// External argument label, if it differs from the binding
    pub label: Option<String>,

    /// Internal name the body refers to; `_` discards the value
    pub binding: String,

    /// Owning function name
    pub function: String,

    /// Identifiers referenced in the owning function body
    pub body_identifiers: HashSet<String>,
}

/// A declaration as the extractor reports it, before classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDeclaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub line: usize,

    /// Full syntactic span, leading blank lines and attached comment included
    #[serde(default)]
    pub span: Option<LineSpan>,

    #[serde(default)]
    pub parent_type: Option<String>,

    /// Keyword modifiers (`override`, `dynamic`, `private`, ...)
    #[serde(default)]
    pub modifiers: Vec<String>,

    /// Attributes without the leading `@` (`objc`, `IBAction`, ...)
    #[serde(default)]
    pub attributes: Vec<String>,

    #[serde(default)]
    pub parameter: Option<ParameterBinding>,
}

impl SourceDeclaration {
    pub fn new(name: impl Into<String>, kind: DeclarationKind, line: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            line,
            span: None,
            parent_type: None,
            modifiers: Vec::new(),
            attributes: Vec::new(),
            parameter: None,
        }
    }

    pub fn bare_name(&self) -> &str {
        normalize_identifier(&self.name)
    }

    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes
            .iter()
            .any(|a| a.trim_start_matches('@') == attribute)
    }

    /// Unclassified [`Declaration`] located in `file`
    pub fn to_declaration(&self, file: &PathBuf) -> Declaration {
        let mut decl = Declaration::new(self.bare_name(), self.kind, Location::new(file.clone(), self.line));
        decl.parent_type = self.parent_type.as_deref().map(|p| normalize_identifier(p).to_string());
        decl.span = self.span;
        decl
    }
}

/// Everything the extractor produced for one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFacts {
    pub path: PathBuf,

    #[serde(default)]
    pub declarations: Vec<SourceDeclaration>,

    #[serde(default)]
    pub facts: FactSet,
}

impl FileFacts {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declarations: Vec::new(),
            facts: FactSet::default(),
        }
    }

    pub fn with_declaration(mut self, decl: SourceDeclaration) -> Self {
        self.declarations.push(decl);
        self
    }

    pub fn with_facts(mut self, facts: FactSet) -> Self {
        self.facts = facts;
        self
    }
}

/// A serialized collection of per-file facts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactBundle {
    pub files: Vec<FileFacts>,
}
