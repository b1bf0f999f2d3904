//! Task CLI commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

use super::output::Output;
use crate::domain::{
    DatePatch, DateTriple, Effects, NewTask, Predecessors, StoreError, Task, TaskId, TaskPatch,
    TaskStore,
};
use crate::storage::Project;

#[derive(Args)]
pub struct UpdateArgs {
    /// Sequence number or task ID
    pub task: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// Predecessors as comma-separated sequence numbers ("0" clears)
    #[arg(long)]
    pub pred: Option<String>,

    /// Planned start (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Planned end (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Planned duration in days
    #[arg(long)]
    pub duration: Option<u32>,

    /// Actual start (YYYY-MM-DD)
    #[arg(long)]
    pub actual_start: Option<NaiveDate>,

    /// Actual end (YYYY-MM-DD)
    #[arg(long)]
    pub actual_end: Option<NaiveDate>,

    /// Actual duration in days
    #[arg(long)]
    pub actual_duration: Option<u32>,
}

impl UpdateArgs {
    fn patch(&self) -> TaskPatch {
        TaskPatch {
            name: self.name.clone(),
            predecessors: self.pred.as_deref().map(Predecessors::parse),
            planned: DatePatch {
                start: self.start,
                end: self.end,
                duration: self.duration,
            },
            actual: DatePatch {
                start: self.actual_start,
                end: self.actual_end,
                duration: self.actual_duration,
            },
        }
    }
}

/// Loads the store, runs one change, and saves the result
///
/// Nothing is written if the change is rejected.
pub(super) fn edit<T>(
    change: impl FnOnce(&mut TaskStore) -> Result<T, StoreError>,
) -> Result<(T, TaskStore)> {
    let project = Project::open_current()?;
    let mut store = project.load_store()?;

    let value = change(&mut store)?;

    project.save_store(&store)?;
    Ok((value, store))
}

fn resolve_all(store: &TaskStore, refs: &[String]) -> Result<Vec<TaskId>, StoreError> {
    refs.iter().map(|r| store.resolve_ref(r)).collect()
}

/// Prints the non-fatal side information of a command
pub(super) fn report_effects(output: &Output, effects: &Effects) {
    for anomaly in &effects.anomalies {
        output.warn(&anomaly.to_string());
    }
    for issue in &effects.issues {
        output.warn(&issue.to_string());
    }
    if !effects.adjusted.is_empty() && !output.is_json() {
        let seqs: Vec<String> = effects.adjusted.iter().map(|s| s.to_string()).collect();
        println!("Rescheduled: {}", seqs.join(", "));
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn format_triple(triple: &DateTriple) -> String {
    format!(
        "{} .. {} ({})",
        format_date(triple.start),
        format_date(triple.end),
        triple
            .duration
            .map(|d| format!("{}d", d))
            .unwrap_or_else(|| "-".to_string())
    )
}

fn print_table(tasks: &[&Task]) {
    println!(
        "{:<5} {:<10} {:<32} {:<11} {:<11} {:>4}  PRED",
        "SEQ", "WBS", "NAME", "START", "END", "DUR"
    );
    println!("{}", "-".repeat(86));

    for task in tasks {
        let name = format!("{}{}", "  ".repeat(task.level as usize), task.name);
        let seq = if task.is_live() {
            task.sequence.to_string()
        } else {
            "x".to_string()
        };
        println!(
            "{:<5} {:<10} {:<32} {:<11} {:<11} {:>4}  {}",
            seq,
            task.wbs,
            name,
            format_date(task.planned.start),
            format_date(task.planned.end),
            task.planned
                .duration
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            task.predecessors
        );
    }
}

pub fn add(
    output: &Output,
    name: String,
    after: Option<&str>,
    start: Option<NaiveDate>,
    duration: Option<u32>,
) -> Result<()> {
    let new = NewTask {
        name,
        start,
        duration,
    };

    let (effects, store) = edit(|store| match after {
        Some(reference) => {
            let target = store.resolve_ref(reference)?;
            store.add_task_after(&target, new)
        }
        None => store.add_task(new),
    })?;

    let task = effects
        .created
        .as_ref()
        .and_then(|id| store.find(id))
        .ok_or_else(|| anyhow::anyhow!("Created task is missing from the store"))?;

    if output.is_json() {
        output.data(task);
    } else {
        output.success(&format!(
            "Created task {} ({}): {}",
            task.sequence, task.id, task.name
        ));
    }
    report_effects(output, &effects);

    Ok(())
}

pub fn list(output: &Output, all: bool) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.load_store()?;

    let tasks: Vec<&Task> = store
        .tasks()
        .iter()
        .filter(|t| all || t.is_live())
        .collect();

    if output.is_json() {
        output.data(&tasks);
    } else if tasks.is_empty() {
        println!("No tasks");
    } else {
        print_table(&tasks);
    }

    Ok(())
}

pub fn show(output: &Output, reference: &str) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.load_store()?;

    let id = store.resolve_ref(reference)?;
    let task = store
        .find(&id)
        .ok_or_else(|| StoreError::TaskNotFound(reference.to_string()))?;
    let issues = store.validate_task(&id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "task": task,
            "issues": issues,
        }));
        return Ok(());
    }

    println!("Task: {} ({})", task.sequence, task.id);
    println!("Name: {}", task.name);
    println!("WBS: {}", task.wbs);
    println!("Level: {}", task.level);
    if task.is_parent {
        println!("Parent: yes");
    }
    if !task.predecessors.is_empty() {
        println!("Predecessors: {}", task.predecessors);
    }
    println!("Planned: {}", format_triple(&task.planned));
    if !task.actual.is_empty() {
        println!("Actual: {}", format_triple(&task.actual));
    }
    println!("Created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", task.updated_at.format("%Y-%m-%d %H:%M"));

    if !issues.is_empty() {
        println!("\nIssues:");
        for issue in &issues {
            println!("  {}", issue);
        }
    }

    Ok(())
}

pub fn update(output: &Output, args: UpdateArgs) -> Result<()> {
    let patch = args.patch();
    if patch.is_empty() {
        anyhow::bail!("Nothing to update. Pass at least one field flag.");
    }

    let ((id, effects), store) = edit(|store| {
        let id = store.resolve_ref(&args.task)?;
        let effects = store.update_task(&id, patch)?;
        Ok((id, effects))
    })?;

    let task = store
        .find(&id)
        .ok_or_else(|| anyhow::anyhow!("Updated task is missing from the store"))?;

    if output.is_json() {
        output.data(task);
    } else {
        output.success(&format!("Updated task {}: {}", task.sequence, task.name));
    }
    report_effects(output, &effects);

    Ok(())
}

pub fn delete(output: &Output, refs: &[String]) -> Result<()> {
    let (count, _) = edit(|store| {
        let ids = resolve_all(store, refs)?;
        let count = ids.len();
        match ids.as_slice() {
            [id] => store.delete_task(id)?,
            _ => store.bulk_delete(ids)?,
        };
        Ok(count)
    })?;

    output.success(&format!("Deleted {} task(s)", count));
    Ok(())
}

pub fn indent(output: &Output, refs: &[String]) -> Result<()> {
    let (effects, _) = edit(|store| {
        let ids = resolve_all(store, refs)?;
        store.indent(ids)
    })?;

    output.success("Indented");
    report_effects(output, &effects);
    Ok(())
}

pub fn outdent(output: &Output, refs: &[String]) -> Result<()> {
    let (effects, _) = edit(|store| {
        let ids = resolve_all(store, refs)?;
        store.outdent(ids)
    })?;

    output.success("Outdented");
    report_effects(output, &effects);
    Ok(())
}

pub fn move_up(output: &Output, reference: &str) -> Result<()> {
    let (effects, _) = edit(|store| {
        let id = store.resolve_ref(reference)?;
        store.move_up(&id)
    })?;

    output.success("Moved up");
    report_effects(output, &effects);
    Ok(())
}

pub fn move_down(output: &Output, reference: &str) -> Result<()> {
    let (effects, _) = edit(|store| {
        let id = store.resolve_ref(reference)?;
        store.move_down(&id)
    })?;

    output.success("Moved down");
    report_effects(output, &effects);
    Ok(())
}

pub fn undo(output: &Output) -> Result<()> {
    let (undone, _) = edit(|store| Ok(store.undo()))?;

    if undone {
        output.success("Undid last change");
    } else {
        output.success("Nothing to undo");
    }
    Ok(())
}

pub fn redo(output: &Output) -> Result<()> {
    let (redone, _) = edit(|store| Ok(store.redo()))?;

    if redone {
        output.success("Redid last change");
    } else {
        output.success("Nothing to redo");
    }
    Ok(())
}
