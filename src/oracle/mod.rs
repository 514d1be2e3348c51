//! Lookups for framework symbols the project does not define itself.
//!
//! Both sources are explicit inputs rather than process-wide state, so the
//! resolvers stay pure functions of what they are handed.

mod catalog;

pub use catalog::{CatalogOracle, ModuleIndex};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

/// Direct requirements of one interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceRequirements {
    pub members: HashSet<String>,
    pub parents: HashSet<String>,
}

impl InterfaceRequirements {
    pub fn new<M, P>(members: M, parents: P) -> Self
    where
        M: IntoIterator,
        M::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            parents: parents.into_iter().map(Into::into).collect(),
        }
    }
}

/// Answers "what does framework interface X require?"
pub trait InterfaceOracle: Send + Sync {
    /// `None` when the interface is unknown
    fn requirements(&self, name: &str) -> Option<InterfaceRequirements>;
}

/// Knows no interfaces; every external interface resolves to no requirements
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl InterfaceOracle for NullOracle {
    fn requirements(&self, _name: &str) -> Option<InterfaceRequirements> {
        None
    }
}

impl<O: InterfaceOracle + ?Sized> InterfaceOracle for &O {
    fn requirements(&self, name: &str) -> Option<InterfaceRequirements> {
        (**self).requirements(name)
    }
}

/// Per-name memoization in front of another oracle. Misses are cached too.
pub struct CachedOracle<O> {
    inner: O,
    cache: RwLock<HashMap<String, Option<InterfaceRequirements>>>,
}

impl<O: InterfaceOracle> CachedOracle<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Number of distinct names looked up so far
    pub fn cached_names(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}

impl<O: InterfaceOracle> InterfaceOracle for CachedOracle<O> {
    fn requirements(&self, name: &str) -> Option<InterfaceRequirements> {
        if let Ok(cache) = self.cache.read() {
            if let Some(hit) = cache.get(name) {
                return hit.clone();
            }
        }

        // Concurrent duplicate lookups may both reach the inner oracle; both store the same value
        let answer = self.inner.requirements(name);
        debug!(
            "Interface oracle lookup for {}: {}",
            name,
            if answer.is_some() { "found" } else { "unknown" }
        );
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(name.to_string(), answer.clone());
        }
        answer
    }
}
