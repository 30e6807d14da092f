use crate::config::release::ReleaseConfig;
use crate::domain::model::{ComponentId, ComponentSpec, Environment, ManifestTarget};
use crate::utils::error::{ReleaseError, Result};
use crate::utils::validation::{
    validate_env_var_name, validate_non_empty_string, validate_path, validate_required_field,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub project: Option<ProjectConfig>,
    #[serde(default)]
    pub components: HashMap<String, ComponentConfig>,
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub root: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    pub dir: Option<String>,
    pub release_command: Option<String>,
    pub env: Option<HashMap<String, String>>,
    pub manifest: Option<ManifestConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfig {
    pub path: String,
    pub identifier: String,
}

/// Fields are optional here so a missing key is reported by name during validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub api_base: Option<String>,
    pub head_title: Option<String>,
    pub head_description: Option<String>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReleaseError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ReleaseError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_BASE})，未設定的變數保留原文
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(root) = self.project.as_ref().and_then(|p| p.root.as_deref()) {
            validate_path("project.root", root)?;
        }

        if self.environments.is_empty() {
            return Err(ReleaseError::MissingConfigError {
                field: "environments".to_string(),
            });
        }

        for (name, env) in &self.environments {
            Self::validate_environment(name, env)?;
        }

        for (name, component) in &self.components {
            name.parse::<ComponentId>()?;
            Self::validate_component(name, component)?;
        }

        Ok(())
    }

    fn validate_environment(name: &str, env: &EnvironmentConfig) -> Result<()> {
        let field = |key: &str| format!("environments.{}.{}", name, key);

        let api_base = validate_required_field(&field("api_base"), &env.api_base)?;
        validate_url(&field("api_base"), api_base)?;

        let head_title = validate_required_field(&field("head_title"), &env.head_title)?;
        validate_non_empty_string(&field("head_title"), head_title)?;

        let head_description =
            validate_required_field(&field("head_description"), &env.head_description)?;
        validate_non_empty_string(&field("head_description"), head_description)?;

        Ok(())
    }

    fn validate_component(name: &str, component: &ComponentConfig) -> Result<()> {
        let field = |key: &str| format!("components.{}.{}", name, key);

        if let Some(dir) = &component.dir {
            validate_path(&field("dir"), dir)?;
        }
        if let Some(command) = &component.release_command {
            validate_non_empty_string(&field("release_command"), command)?;
        }
        if let Some(env) = &component.env {
            for key in env.keys() {
                validate_env_var_name(&field("env"), key)?;
            }
        }
        if let Some(manifest) = &component.manifest {
            validate_path(&field("manifest.path"), &manifest.path)?;
            validate_non_empty_string(&field("manifest.identifier"), &manifest.identifier)?;
        }

        Ok(())
    }

    /// Validates and turns the file into the immutable runtime configuration.
    ///
    /// Relative paths are resolved against `base_dir`, usually the config file's directory.
    pub fn resolve(&self, base_dir: &Path) -> Result<ReleaseConfig> {
        self.validate_config()?;

        let root = match self.project.as_ref().and_then(|p| p.root.as_deref()) {
            Some(root) => base_dir.join(root),
            None => base_dir.to_path_buf(),
        };

        let mut environments = BTreeMap::new();
        for (name, env) in &self.environments {
            // validate_config 已確認欄位存在
            environments.insert(
                name.clone(),
                Environment {
                    name: name.clone(),
                    api_base: env.api_base.clone().unwrap_or_default(),
                    head_title: env.head_title.clone().unwrap_or_default(),
                    head_description: env.head_description.clone().unwrap_or_default(),
                },
            );
        }

        let mut components = BTreeMap::new();
        for id in ComponentId::ALL {
            let mut spec = ComponentSpec::with_defaults(id, &root);
            if let Some(config) = self.components.get(id.name()) {
                if let Some(dir) = &config.dir {
                    spec.dir = root.join(dir);
                }
                if let Some(command) = &config.release_command {
                    spec.release_command = command.clone();
                }
                if let Some(env) = &config.env {
                    spec.env = env.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                }
                spec.manifest = config.manifest.as_ref().map(|m| ManifestTarget {
                    path: base_dir.join(&m.path),
                    identifier: m.identifier.clone(),
                });
            }
            components.insert(id, spec);
        }

        Ok(ReleaseConfig::new(environments, components))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
