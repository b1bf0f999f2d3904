//! # Storage Layer
//!
//! Persistence layer for wbs-planner with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line, display order) | `.wbs/tasks.jsonl` |
//! | Undo/redo | JSON | `.wbs/history.json` |
//! | Config | TOML | `.wbs/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`TaskFile`] and [`HistoryFile`] use file locking (`fs2`)
//! - All writes are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .wbs/
//! ├── tasks.jsonl     # All tasks, deleted ones included
//! ├── history.json    # Undo/redo snapshots (git-ignored)
//! ├── config.toml     # Project configuration
//! └── .gitignore
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a wbs project
//! - [`TaskFile`] - Read/write the ordered task list
//! - [`HistoryFile`] - Read/write undo history
//! - [`Config`] - Project and global configuration

mod config;
mod history;
mod jsonl;
mod project;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use history::HistoryFile;
pub use jsonl::TaskFile;
pub use project::{Project, ProjectError};
