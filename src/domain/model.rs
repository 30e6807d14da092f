use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::error::ReleaseError;

/// The two deployable components this tool knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentId {
    App,
    Web,
}

impl ComponentId {
    pub const ALL: [ComponentId; 2] = [ComponentId::App, ComponentId::Web];

    pub fn name(self) -> &'static str {
        match self {
            ComponentId::App => "app",
            ComponentId::Web => "web",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ComponentId::App => "App",
            ComponentId::Web => "Web",
        }
    }

    /// Whether the release script consumes the environment's site variables.
    pub fn uses_site_env(self) -> bool {
        matches!(self, ComponentId::Web)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComponentId {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "app" => Ok(ComponentId::App),
            "web" => Ok(ComponentId::Web),
            other => Err(ReleaseError::UnknownComponent {
                name: other.to_string(),
            }),
        }
    }
}

/// A deployment target and the values templated into the web build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
    pub name: String,
    pub api_base: String,
    pub head_title: String,
    pub head_description: String,
}

impl Environment {
    pub fn site_vars(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("API_BASE_URL".to_string(), self.api_base.clone()),
            ("HEAD_TITLE".to_string(), self.head_title.clone()),
            ("HEAD_DESCRIPTION".to_string(), self.head_description.clone()),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestTarget {
    pub path: PathBuf,
    pub identifier: String,
}

/// Everything needed to build one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    pub id: ComponentId,
    pub dir: PathBuf,
    pub release_command: String,
    pub env: BTreeMap<String, String>,
    pub manifest: Option<ManifestTarget>,
}

impl ComponentSpec {
    pub const DEFAULT_RELEASE_COMMAND: &'static str = "/bin/sh bin/release.sh";

    pub fn with_defaults(id: ComponentId, root: &std::path::Path) -> Self {
        Self {
            id,
            dir: root.join(id.name()),
            release_command: Self::DEFAULT_RELEASE_COMMAND.to_string(),
            env: BTreeMap::new(),
            manifest: None,
        }
    }

    /// Variables for the release subprocess in the given environment.
    pub fn build_env(&self, environment: &Environment) -> BTreeMap<String, String> {
        let mut vars = self.env.clone();
        if self.id.uses_site_env() {
            vars.extend(environment.site_vars());
        }
        vars
    }
}

/// Which components an operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(Vec<ComponentId>),
}

impl Selection {
    /// Parses `all` or a comma separated list of component names.
    pub fn parse(input: &str) -> Result<Self, ReleaseError> {
        let names: Vec<&str> = input
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        if names.is_empty() {
            return Err(ReleaseError::UnknownComponent {
                name: input.to_string(),
            });
        }
        if names.contains(&"all") {
            return Ok(Selection::All);
        }

        let mut ids = Vec::new();
        for name in names {
            let id: ComponentId = name.parse()?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(Selection::Only(ids))
    }

    pub fn components(&self) -> Vec<ComponentId> {
        match self {
            Selection::All => ComponentId::ALL.to_vec(),
            Selection::Only(ids) => ids.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildStatus {
    Built { previous: String, version: String },
    Failed { kind: String, reason: String },
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentOutcome {
    pub component: ComponentId,
    #[serde(flatten)]
    pub status: BuildStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub environment: String,
    pub outcomes: Vec<ComponentOutcome>,
}

impl BuildReport {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            outcomes: Vec::new(),
        }
    }

    pub fn failed(&self) -> Vec<ComponentId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, BuildStatus::Failed { .. }))
            .map(|o| o.component)
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failed().is_empty()
    }

    pub fn to_json(&self) -> crate::utils::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
