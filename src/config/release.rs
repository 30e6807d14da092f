use crate::config::toml_config::TomlConfig;
use crate::domain::model::{ComponentId, ComponentSpec, Environment};
use crate::utils::error::{ReleaseError, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Validated, immutable settings for a run: environments by name and one spec per component.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    environments: BTreeMap<String, Environment>,
    components: BTreeMap<ComponentId, ComponentSpec>,
}

impl ReleaseConfig {
    pub(crate) fn new(
        environments: BTreeMap<String, Environment>,
        components: BTreeMap<ComponentId, ComponentSpec>,
    ) -> Self {
        Self {
            environments,
            components,
        }
    }

    /// Loads, validates and resolves a config file. Relative paths are taken from the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        };
        TomlConfig::from_file(path)?.resolve(&base_dir)
    }

    pub fn environment(&self, name: &str) -> Result<&Environment> {
        self.environments
            .get(name)
            .ok_or_else(|| ReleaseError::UnknownEnvironment {
                name: name.to_string(),
                available: self.environment_names().join(", "),
            })
    }

    pub fn environment_names(&self) -> Vec<&str> {
        self.environments.keys().map(String::as_str).collect()
    }

    pub fn component(&self, id: ComponentId) -> &ComponentSpec {
        // resolve() 會為每個 ComponentId 建立 spec
        &self.components[&id]
    }
}
