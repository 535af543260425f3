use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::Result;

/// Lint run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// Fail the lint run when at least one error is reported
    pub exit_on_errors: bool,

    /// Rule names to skip; an entry may hold several comma-separated names
    pub exclude: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            exit_on_errors: true,
            exclude: Vec::new(),
        }
    }
}

impl LintConfig {
    /// Flatten `exclude` into the set of rule names to skip.
    pub fn excluded_rules(&self) -> BTreeSet<String> {
        self.exclude
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// A registry entry of `registries.yaml`.
///
/// Authentication blocks are accepted in the file but not modelled here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryDefinition {
    /// Git repositories allowed to push to this registry
    pub repositories: Vec<String>,
}

/// Registry policy consumed by the linter.
///
/// Built once by the caller and passed by reference; nothing here is global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryPolicy {
    /// Restrict base images and pushes to the registries listed below
    pub push_only_to_defined_registries: bool,

    /// Registry name -> definition
    #[serde(deserialize_with = "null_as_default_entries")]
    pub registries: BTreeMap<String, RegistryDefinition>,
}

impl RegistryPolicy {
    /// Parse a `registries.yaml` document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a `registries.yaml` file. A missing file yields the disabled default policy.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            tracing::info!(path = %path.display(), "No registries.yaml found");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let policy = Self::from_yaml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            registries = policy.registries.len(),
            "Loaded registry policy"
        );
        Ok(policy)
    }

    /// Enable or disable the restriction, keeping the registry list.
    pub fn with_push_only_to_defined_registries(mut self, enabled: bool) -> Self {
        self.push_only_to_defined_registries = enabled;
        self
    }

    /// Registry names in sorted order.
    pub fn allowed_registries(&self) -> Vec<&str> {
        self.registries.keys().map(String::as_str).collect()
    }

    /// Whether base images are checked against the registry list at all.
    pub fn is_enforced(&self) -> bool {
        self.push_only_to_defined_registries && !self.registries.is_empty()
    }

    /// Whether `registry` is one of the configured names.
    pub fn allows(&self, registry: Option<&str>) -> bool {
        registry.is_some_and(|name| self.registries.contains_key(name))
    }
}

// `registry.a.com:` with no body is a valid entry
fn null_as_default_entries<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, RegistryDefinition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<RegistryDefinition>>> =
        Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, definition)| (name, definition.unwrap_or_default()))
        .collect())
}
