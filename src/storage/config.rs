//! Configuration handling for wbs-planner
//!
//! Configuration is stored in `.wbs/config.toml` (project) and the platform
//! config directory, e.g. `~/.config/wbs-planner/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{HolidayCalendar, StoreOptions};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Header written above a project config saved by a command
const SAVED_HEADER: &str = "# wbs project configuration\n\
# Rewritten by `wbs calendar add-holiday` / `remove-holiday`; comments are not kept.\n\n";

/// Project-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Planned duration in days for tasks added without one
    pub default_duration: u32,

    /// Number of undo steps kept in `.wbs/history.json`
    pub history_limit: usize,

    /// Move a task's start after its predecessors whenever it is updated
    pub auto_schedule: bool,

    /// Recompute WBS codes after deletes
    pub renumber_on_delete: bool,

    /// Working days and holidays
    pub calendar: HolidayCalendar,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let options = StoreOptions::default();
        Self {
            default_duration: options.default_duration,
            history_limit: options.history_limit,
            auto_schedule: options.auto_schedule,
            renumber_on_delete: options.renumber_on_delete,
            calendar: HolidayCalendar::default(),
        }
    }
}

impl ProjectConfig {
    /// Checks values that parse but make no sense
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_duration == 0 {
            return Err(ConfigError::Invalid(
                "default_duration must be at least 1".to_string(),
            ));
        }
        if self.calendar.working_days.is_empty() {
            return Err(ConfigError::Invalid(
                "calendar.working_days must name at least one weekday".to_string(),
            ));
        }
        Ok(())
    }

    /// Options for the in-memory task store
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            default_duration: self.default_duration,
            history_limit: self.history_limit,
            auto_schedule: self.auto_schedule,
            renumber_on_delete: self.renumber_on_delete,
        }
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + project)
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific project
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let project = Self::load_project_config(project_root)?;

        Ok(Self {
            project,
            global,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "wbs", "wbs-planner").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads project configuration from a specific root
    fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
        let config_path = Self::project_config_path(project_root);

        if !config_path.exists() {
            return Ok(ProjectConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read project config: {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse project config")?;

        config
            .validate()
            .with_context(|| format!("Invalid project config: {}", config_path.display()))?;

        Ok(config)
    }

    fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(".wbs").join("config.toml")
    }

    /// Finds the project root by looking for a `.wbs/` directory
    pub fn find_project_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_project_root_from(&current)
    }

    /// Walks up from `start` looking for a `.wbs/` directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(".wbs").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the project root, or an error if not in a project
    pub fn require_project_root(&self) -> Result<&Path> {
        self.project_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a wbs project. Run 'wbs init' first."))
    }

    /// Saves the project configuration
    ///
    /// The file is rewritten from the parsed values, so comments in it are
    /// replaced by a short header.
    pub fn save_project(&self) -> Result<()> {
        let root = self.require_project_root()?;
        let config_path = Self::project_config_path(root);

        let body =
            toml::to_string_pretty(&self.project).context("Failed to serialize project config")?;
        let content = format!("{}{}", SAVED_HEADER, body);

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write project config: {}", config_path.display()))
    }
}
