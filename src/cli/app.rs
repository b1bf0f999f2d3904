//! Main CLI application structure

use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{calendar, schedule, task};
use crate::domain::StoreError;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "wbs")]
#[command(author, version, about = "Local-first work breakdown planner")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new wbs project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Add a task at the end of the plan, or after another task
    Add {
        /// Task name
        name: String,

        /// Insert after this task (sequence number or ID)
        #[arg(long)]
        after: Option<String>,

        /// Planned start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Planned duration in days
        #[arg(long)]
        duration: Option<u32>,
    },

    /// List tasks in plan order
    List {
        /// Include deleted tasks
        #[arg(long)]
        all: bool,
    },

    /// Show task details
    Show {
        /// Sequence number or task ID
        task: String,
    },

    /// Update task fields
    Update(task::UpdateArgs),

    /// Soft-delete one or more tasks
    Delete {
        /// Sequence numbers or task IDs
        #[arg(required = true)]
        tasks: Vec<String>,
    },

    /// Move tasks one level deeper
    Indent {
        #[arg(required = true)]
        tasks: Vec<String>,
    },

    /// Move tasks one level shallower
    Outdent {
        #[arg(required = true)]
        tasks: Vec<String>,
    },

    /// Swap a task with the one above it
    MoveUp { task: String },

    /// Swap a task with the one below it
    MoveDown { task: String },

    /// Undo the last change
    Undo,

    /// Redo the last undone change
    Redo,

    /// Move start dates after predecessors (one task, or the whole plan)
    Schedule {
        /// Sequence number or task ID; omit to schedule every task
        task: Option<String>,
    },

    /// Report date and predecessor problems without changing anything
    Validate,

    /// Working calendar and business-day helpers
    #[command(subcommand)]
    Calendar(calendar::CalendarCommands),
}

/// Installs the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format,
    };
    let output = Output::new(format);

    match dispatch(cli.command, &output) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<StoreError>() {
            Some(store_err) => {
                output.errors(&store_err.messages());
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}

fn dispatch(command: Commands, output: &Output) -> Result<()> {
    match command {
        Commands::Init { path } => {
            tracing::debug!(%path, "initializing project");
            let project = Project::init(&path)?;
            output.success(&format!(
                "Initialized wbs project at {}",
                project.root().display()
            ));
            Ok(())
        }

        Commands::Add {
            name,
            after,
            start,
            duration,
        } => task::add(output, name, after.as_deref(), start, duration),
        Commands::List { all } => task::list(output, all),
        Commands::Show { task } => task::show(output, &task),
        Commands::Update(args) => task::update(output, args),
        Commands::Delete { tasks } => task::delete(output, &tasks),
        Commands::Indent { tasks } => task::indent(output, &tasks),
        Commands::Outdent { tasks } => task::outdent(output, &tasks),
        Commands::MoveUp { task } => task::move_up(output, &task),
        Commands::MoveDown { task } => task::move_down(output, &task),
        Commands::Undo => task::undo(output),
        Commands::Redo => task::redo(output),

        Commands::Schedule { task } => schedule::schedule(output, task.as_deref()),
        Commands::Validate => schedule::validate(output),

        Commands::Calendar(cmd) => calendar::run(cmd, output),
    }
}
