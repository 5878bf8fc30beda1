//! Scope tool configuration.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vitrine_rules::{default_scope_specs, ScopeSpec, ScopeTable};

use crate::runner::{CommandRunner, DEFAULT_TASK_TEMPLATE};

/// Default location, relative to the repository root.
pub const DEFAULT_CONFIG_PATH: &str = ".vitrine/scopes.toml";

/// Scope tool configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    /// Task runner settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Git settings
    #[serde(default)]
    pub git: GitConfig,

    /// Scope table
    #[serde(default = "default_scope_specs")]
    pub scopes: Vec<ScopeSpec>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            runner: RunnerConfig::default(),
            git: GitConfig::default(),
            scopes: default_scope_specs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Command template; `{target}` is replaced by the scope's target
    #[serde(default = "default_command")]
    pub command: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
        }
    }
}

fn default_command() -> String {
    DEFAULT_TASK_TEMPLATE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Remote holding the base branch
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

impl ScopeConfig {
    /// Load config from a file path, falling back to defaults when it is missing
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = path.as_ref().to_string_lossy();
        let expanded = shellexpand::tilde(&raw).to_string();
        let path = Path::new(&expanded);

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: ScopeConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Validate the scopes into a table
    pub fn scope_table(&self) -> Result<ScopeTable> {
        ScopeTable::from_specs(&self.scopes).context("invalid scope table")
    }

    /// Build the task runner from the command template
    pub fn task_runner(&self) -> Result<CommandRunner> {
        CommandRunner::from_template(&self.runner.command).context("invalid [runner] command")
    }
}
