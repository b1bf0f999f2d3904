//! Project management
//!
//! Handles project initialization and loading/saving the task store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, HistoryFile, TaskFile};
use crate::domain::TaskStore;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a wbs project. Run 'wbs init' first.")]
    NotInProject,
}

const DEFAULT_CONFIG: &str = r#"# wbs-planner project configuration
#
# `wbs calendar add-holiday` and `remove-holiday` rewrite this file and
# drop these comments.

# Planned duration in days for tasks added without --duration
default_duration = 1

# Undo steps kept in .wbs/history.json
history_limit = 100

# Move a task's start after its predecessors when it is updated.
# Dependents of the task are not moved; run `wbs schedule` for that.
auto_schedule = true

# Recompute WBS codes after deleting tasks
renumber_on_delete = true

[calendar]
working_days = ["Mon", "Tue", "Wed", "Thu", "Fri"]
observe_optional = false

# [[calendar.holidays]]
# date = "2026-12-25"
# name = "Christmas Day"
# optional = false
"#;

const GITIGNORE: &str = r#"# Undo history is local state
history.json

# Temp files from atomic writes
*.tmp
"#;

/// A wbs project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".wbs").is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    ///
    /// Existing files are left alone, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let wbs_dir = root.join(".wbs");

        fs::create_dir_all(&wbs_dir)
            .with_context(|| format!("Failed to create .wbs directory: {}", wbs_dir.display()))?;

        let config_path = wbs_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = wbs_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        let tasks_path = wbs_dir.join("tasks.jsonl");
        if !tasks_path.exists() {
            fs::write(&tasks_path, "")
                .with_context(|| format!("Failed to create {}", tasks_path.display()))?;
        }

        tracing::debug!(root = %root.display(), "initialized project");
        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .wbs directory path
    pub fn wbs_dir(&self) -> PathBuf {
        self.root.join(".wbs")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the task file
    pub fn task_file(&self) -> TaskFile {
        TaskFile::for_project(&self.root)
    }

    /// Returns the history file
    pub fn history_file(&self) -> HistoryFile {
        HistoryFile::for_project(&self.root)
    }

    /// Loads the task list and its undo history into a store
    pub fn load_store(&self) -> Result<TaskStore> {
        let tasks = self.task_file().read_all()?;
        let history = self.history_file().read()?;

        Ok(TaskStore::from_parts(
            tasks,
            history,
            self.config.project.store_options(),
        ))
    }

    /// Persists the task list and history
    pub fn save_store(&self, store: &TaskStore) -> Result<()> {
        self.task_file().write_all(store.tasks())?;
        self.history_file().write(store.history())
    }
}
