//! Undo/redo history persistence
//!
//! Snapshots live in `.wbs/history.json` so `wbs undo` works across
//! invocations. The file is local state and is git-ignored.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::History;

/// History snapshots persisted as a single JSON document
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates the default history file for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".wbs").join("history.json"))
    }

    /// Reads the history, empty if the file does not exist
    pub fn read(&self) -> Result<History> {
        if !self.path.exists() {
            return Ok(History::default());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open history: {}", self.path.display()))?;
        file.lock_shared()
            .context("Failed to acquire read lock on history")?;

        serde_json::from_reader(BufReader::new(&file))
            .with_context(|| format!("Failed to parse history: {}", self.path.display()))
    }

    /// Writes the history atomically
    pub fn write(&self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
            file.lock_exclusive()
                .context("Failed to acquire write lock on history")?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer(&mut writer, history).context("Failed to serialize history")?;
            writer.flush().context("Failed to flush history")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })
    }
}
