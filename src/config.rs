use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

pub const ENV_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_URL: &str = "JIRA_URL";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub fields: FieldConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Credential fallbacks used when the environment does not provide them
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct JiraConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

/// Custom field ids, which differ per Jira instance
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldConfig {
    #[serde(default = "default_story_points_field")]
    pub story_points: String,
    #[serde(default = "default_sprints_field")]
    pub sprints: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Status menu offered by the interactive flow
    #[serde(default = "default_statuses")]
    pub statuses: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_jql")]
    pub jql: String,
}

impl Config {
    /// Load configuration from an explicit path, or from the default location if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("No config file found, using defaults");
                    return Ok(Config::default());
                }
            },
        };

        debug!("Reading config from {:?}", config_path);
        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::Config(format!("failed to read config from {:?}: {}", config_path, e))
        })?;

        let config = Self::parse(&contents)
            .map_err(|e| Error::Config(format!("failed to parse config from {:?}: {}", config_path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would leave a flow with nothing to offer
    pub fn validate(&self) -> Result<()> {
        if self.workflow.statuses.iter().all(|s| s.trim().is_empty()) {
            return Err(Error::Config(
                "[workflow] statuses must name at least one status".to_string(),
            ));
        }
        Ok(())
    }

    pub fn parse(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(".config").join("jira-sprint").join("config.toml"))
    }
}

/// Immutable credentials threaded into every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub api_token: String,
    pub base_url: String,
}

impl Credentials {
    /// Resolve credentials from the process environment, falling back to the config file
    pub fn resolve(config: &JiraConfig) -> Result<Self> {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Resolve credentials with an explicit variable lookup
    pub fn resolve_with<F>(config: &JiraConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, fallback: &Option<String>| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| fallback.clone().filter(|v| !v.trim().is_empty()))
                .ok_or_else(|| Error::Config(format!("missing env: {}", key)))
        };

        let email = pick(ENV_EMAIL, &config.email)?;
        let base_url = pick(ENV_URL, &config.url)?;
        let api_token = pick(ENV_API_TOKEN, &config.api_token)?;

        Ok(Credentials {
            email,
            api_token,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

// Default value functions
fn default_story_points_field() -> String {
    "customfield_10004".to_string()
}

fn default_sprints_field() -> String {
    "customfield_10007".to_string()
}

fn default_statuses() -> Vec<String> {
    ["Open", "In Progress", "In Review", "In Testing", "Resolved"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_jql() -> String {
    "assignee = currentUser() AND statusCategory != Done AND issuetype != Epic".to_string()
}

impl Default for FieldConfig {
    fn default() -> Self {
        FieldConfig {
            story_points: default_story_points_field(),
            sprints: default_sprints_field(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            statuses: default_statuses(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig { jql: default_jql() }
    }
}
