//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Tasks | Plan editing | `add`, `update`, `delete`, `indent`, `move-up` |
//! | History | Undo/redo | `undo`, `redo` |
//! | Scheduling | Predecessor dates | `schedule`, `validate` |
//! | Calendar | Business days | `calendar days`, `calendar add-holiday` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Logging
//!
//! Use `--verbose` (or `-v`) for debug logs on stderr, or set `RUST_LOG`:
//! ```bash
//! wbs --verbose schedule
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod calendar;
mod output;
mod schedule;
mod task;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
