//! Cache Generation Module
//!
//! Derives both cache store names from one generation identifier and holds the
//! static manifest pre-cached at install time.

use crate::error::{AgentError, Result};

// == Cache Generation ==
/// Version tag shared by the static and dynamic cache stores of one deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheGeneration {
    prefix: String,
    id: String,
}

impl CacheGeneration {
    /// Creates a generation from a name prefix and an identifier.
    ///
    /// Neither part may be empty or contain whitespace.
    pub fn new(prefix: impl Into<String>, id: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        let id = id.into();

        for (label, value) in [("prefix", &prefix), ("generation", &id)] {
            if value.is_empty() || value.chars().any(char::is_whitespace) {
                return Err(AgentError::InvalidRequest(format!(
                    "Cache {} must be non-empty without whitespace: {:?}",
                    label, value
                )));
            }
        }

        Ok(Self { prefix, id })
    }

    /// The generation identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name of the store populated from the static manifest.
    pub fn static_name(&self) -> String {
        format!("{}-static-{}", self.prefix, self.id)
    }

    /// Name of the store populated at run time.
    pub fn dynamic_name(&self) -> String {
        format!("{}-dynamic-{}", self.prefix, self.id)
    }

    /// Returns true if `name` belongs to this generation.
    pub fn owns(&self, name: &str) -> bool {
        name == self.static_name() || name == self.dynamic_name()
    }
}

// == Static Manifest ==
/// Ordered list of same-origin paths that must be available offline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticManifest {
    paths: Vec<String>,
}

impl StaticManifest {
    /// Builds a manifest, keeping the first occurrence of each path.
    ///
    /// Every path must be absolute (start with `/`).
    pub fn new<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for path in paths {
            let path = path.into();
            if !path.starts_with('/') {
                return Err(AgentError::InvalidRequest(format!(
                    "Manifest path must start with '/': {}",
                    path
                )));
            }
            if !ordered.contains(&path) {
                ordered.push(path);
            }
        }
        Ok(Self { paths: ordered })
    }

    /// Manifest paths in declaration order.
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
