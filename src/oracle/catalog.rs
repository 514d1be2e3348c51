use super::{InterfaceOracle, InterfaceRequirements};
use crate::config::read_structured;
use crate::error::SweepResult;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

/// Framework interface catalog loaded from a JSON, YAML, or TOML file:
///
/// ```yaml
/// interfaces:
///   Hashable: { members: [hash], parents: [Equatable] }
///   Equatable: { members: ["=="] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOracle {
    interfaces: HashMap<String, InterfaceRequirements>,
}

impl CatalogOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> SweepResult<Self> {
        let catalog: Self = read_structured(path)?;
        info!(
            "Loaded {} framework interfaces from {}",
            catalog.interfaces.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn with_interface(mut self, name: impl Into<String>, requirements: InterfaceRequirements) -> Self {
        self.interfaces.insert(name.into(), requirements);
        self
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

impl InterfaceOracle for CatalogOracle {
    fn requirements(&self, name: &str) -> Option<InterfaceRequirements> {
        self.interfaces.get(name).cloned()
    }
}

/// Module name -> symbols it exports
///
/// ```yaml
/// modules:
///   UIKit: [UIViewController, UIView, UITableViewCell]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleIndex {
    modules: HashMap<String, HashSet<String>>,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: &Path) -> SweepResult<Self> {
        let index: Self = read_structured(path)?;
        info!("Loaded exports for {} modules from {}", index.modules.len(), path.display());
        Ok(index)
    }

    pub fn with_module<I>(mut self, module: impl Into<String>, exports: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.modules
            .entry(module.into())
            .or_default()
            .extend(exports.into_iter().map(Into::into));
        self
    }

    /// `None` when the module is unknown
    pub fn exports(&self, module: &str) -> Option<&HashSet<String>> {
        self.modules.get(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = (&String, &HashSet<String>)> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
