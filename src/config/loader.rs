use crate::error::{SweepError, SweepResult};
use miette::{Result, WrapErr};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for deadsweep analysis and deletion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source path patterns whose facts are ignored entirely
    pub exclude: Vec<String>,

    /// Declaration name patterns that are never reported
    pub retain_patterns: Vec<String>,

    /// Source path patterns identifying test files
    pub test_patterns: Vec<String>,

    /// Which excluded declarations are still listed as actionable
    pub analysis: AnalysisOptions,

    /// Markers the classifier recognizes
    pub markers: MarkerConfig,

    pub modules: ModuleConfig,

    pub interfaces: InterfaceConfig,

    pub deletion: DeletionConfig,

    /// Editor command used by `open`; falls back to $VISUAL / $EDITOR
    pub editor: Option<String>,
}

/// Inclusion flags, recorded in the persisted report header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// List declarations excluded only by an override marker
    pub include_overrides: bool,

    /// List declarations excluded only as interface implementations
    pub include_interface_members: bool,

    /// List declarations excluded only by a platform marker
    pub include_platform_marked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Modifier marking an overriding member
    pub override_marker: String,

    /// Attributes that expose a member to dynamic dispatch or UI wiring
    pub platform_attributes: Vec<String>,

    /// Modifiers with the same effect as `platform_attributes`
    pub platform_modifiers: Vec<String>,

    /// Parameter binding that explicitly discards the value
    pub discard_marker: String,

    /// Interfaces that enumerate every case of a conforming enumeration
    pub enumerable_interfaces: Vec<String>,

    /// Name of the nested enumeration mapping properties to serialization keys
    pub serialization_keys_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    /// Modules never reported as unused imports
    pub always_needed: Vec<String>,

    /// Module export catalog (module -> exported symbols)
    pub exports_catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Framework interface catalog consulted for interfaces the project does not define
    pub catalog: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletionConfig {
    /// Remove files left with only comments, whitespace, and imports
    pub delete_empty_files: bool,

    /// Also remove code coupled to each deleted declaration
    pub include_related: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude: vec![
                "**/.build/**".to_string(),
                "**/Pods/**".to_string(),
                "**/Carthage/**".to_string(),
                "**/DerivedData/**".to_string(),
            ],
            retain_patterns: vec![],
            test_patterns: vec![
                "**/Tests/**".to_string(),
                "**/*Tests.swift".to_string(),
                "**/*Test.swift".to_string(),
            ],
            analysis: AnalysisOptions::default(),
            markers: MarkerConfig::default(),
            modules: ModuleConfig::default(),
            interfaces: InterfaceConfig::default(),
            deletion: DeletionConfig::default(),
            editor: None,
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            override_marker: "override".to_string(),
            platform_attributes: [
                "objc",
                "objcMembers",
                "IBAction",
                "IBOutlet",
                "IBInspectable",
                "IBDesignable",
                "IBSegueAction",
                "NSManaged",
                "GKInspectable",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            platform_modifiers: vec!["dynamic".to_string()],
            discard_marker: "_".to_string(),
            enumerable_interfaces: vec!["CaseIterable".to_string()],
            serialization_keys_type: "CodingKeys".to_string(),
        }
    }
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            always_needed: vec!["Swift".to_string()],
            exports_catalog: None,
        }
    }
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            delete_empty_files: false,
            include_related: true,
        }
    }
}

/// Read a JSON, YAML, or TOML document, picking the format from the extension
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> SweepResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| SweepError::io(path, e))?;
    let invalid = |message: String| SweepError::Config {
        path: path.to_path_buf(),
        message,
    };

    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "json" => serde_json::from_str(&contents).map_err(|e| invalid(e.to_string())),
        "yml" | "yaml" => serde_yaml::from_str(&contents).map_err(|e| invalid(e.to_string())),
        "toml" => toml::from_str(&contents).map_err(|e| invalid(e.to_string())),
        _ => {
            // Try YAML first (a JSON superset), then TOML
            if let Ok(value) = serde_yaml::from_str(&contents) {
                Ok(value)
            } else {
                toml::from_str(&contents).map_err(|e| invalid(e.to_string()))
            }
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        read_structured(path)
            .wrap_err_with(|| format!("Failed to load config file: {}", path.display()))
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".deadsweep.yml",
            ".deadsweep.yaml",
            ".deadsweep.toml",
            "deadsweep.yml",
            "deadsweep.yaml",
            "deadsweep.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Check if a source path is excluded from analysis
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = portable(path);
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }

    /// Check if a source path is a test file
    pub fn is_test_file(&self, path: &Path) -> bool {
        let path_str = portable(path);
        self.test_patterns.iter().any(|pattern| glob_match(pattern, &path_str))
    }

    /// Check if a declaration name should be retained
    pub fn should_retain(&self, name: &str) -> bool {
        self.retain_patterns.iter().any(|p| glob_match(p, name))
    }
}

fn portable(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Wildcard matching for name patterns (`*ViewModel`, `Test*`) and path
/// patterns (`**/Tests/**`, `**/*Tests.swift`).
///
/// `*` and `?` never cross a `/`; `**` matches any run of characters and
/// `**/` may also match nothing.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_from(&pattern, &text)
}

fn match_from(pattern: &[char], text: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('*') if pattern.get(1) == Some(&'*') => {
            let rest = &pattern[2..];
            if rest.first() == Some(&'/') && match_from(&rest[1..], text) {
                return true;
            }
            (0..=text.len()).any(|i| match_from(rest, &text[i..]))
        }
        Some('*') => {
            let rest = &pattern[1..];
            for i in 0..=text.len() {
                if match_from(rest, &text[i..]) {
                    return true;
                }
                if i < text.len() && text[i] == '/' {
                    break;
                }
            }
            false
        }
        Some('?') => {
            !text.is_empty() && text[0] != '/' && match_from(&pattern[1..], &text[1..])
        }
        Some(c) => text.first() == Some(c) && match_from(&pattern[1..], &text[1..]),
    }
}
