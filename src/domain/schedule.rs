//! Predecessor-driven scheduling
//!
//! Two paths exist side by side. `enforce_schedule` is soft: it moves a
//! task's planned start past its predecessors and keeps the adjustment even
//! if the result still fails validation. `validate_task_dates` is hard: it
//! only reports. Callers pick the path they need.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::graph::{GraphError, PredecessorGraph};
use super::task::Task;

fn join_seqs(seqs: &[u32]) -> String {
    seqs.iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A scheduling or referential problem with a single task
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleIssue {
    #[error("Task {task}: planned start {start} is after planned end {end}")]
    InvalidRange {
        task: u32,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Task {task}: predecessor(s) {} not found", join_seqs(.missing))]
    UnresolvedPredecessor { task: u32, missing: Vec<u32> },

    #[error("Task {task} lists itself as a predecessor")]
    SelfDependency { task: u32 },

    #[error("Task {task}: planned start {start} must be after predecessor finish {finish}")]
    SchedulingConflict {
        task: u32,
        start: NaiveDate,
        finish: NaiveDate,
    },

    #[error("Task {task}: predecessor {predecessor} closes a dependency cycle")]
    PredecessorCycle { task: u32, predecessor: u32 },
}

/// Finds a live task by sequence number
pub fn find_by_sequence(tasks: &[Task], seq: u32) -> Option<&Task> {
    tasks.iter().find(|t| t.is_live() && t.sequence == seq)
}

/// Resolves a task's predecessor references to live tasks
///
/// Self references and references with no live task are reported.
pub fn resolve_predecessors<'a>(
    task: &Task,
    tasks: &'a [Task],
) -> Result<Vec<&'a Task>, Vec<ScheduleIssue>> {
    let mut issues = Vec::new();
    let mut resolved = Vec::new();
    let mut missing = Vec::new();

    for seq in task.predecessors.iter() {
        if seq == task.sequence {
            issues.push(ScheduleIssue::SelfDependency {
                task: task.sequence,
            });
            continue;
        }
        match find_by_sequence(tasks, seq) {
            Some(pred) => resolved.push(pred),
            None => missing.push(seq),
        }
    }

    if !missing.is_empty() {
        issues.push(ScheduleIssue::UnresolvedPredecessor {
            task: task.sequence,
            missing,
        });
    }

    if issues.is_empty() {
        Ok(resolved)
    } else {
        Err(issues)
    }
}

/// Returns the latest planned finish among a task's predecessors
///
/// The task may start the day after the returned date. `None` when the task
/// has no predecessors or none of them has a planned end.
pub fn resolve_earliest_start(
    task: &Task,
    tasks: &[Task],
) -> Result<Option<NaiveDate>, Vec<ScheduleIssue>> {
    let resolved = resolve_predecessors(task, tasks)?;
    Ok(resolved.iter().filter_map(|pred| pred.planned_end()).max())
}

/// Moves a task's planned start past its predecessors' finish if needed
///
/// Returns true when the task changed. A start already after the bound is
/// left alone. If the moved start cannot be reconciled with the stored end,
/// the new start is kept anyway and `validate_task_dates` will report it.
pub fn enforce_schedule(task: &mut Task, tasks: &[Task]) -> Result<bool, Vec<ScheduleIssue>> {
    let Some(finish) = resolve_earliest_start(task, tasks)? else {
        return Ok(false);
    };

    if matches!(task.planned.start, Some(start) if start > finish) {
        return Ok(false);
    }

    let earliest = finish.succ_opt().unwrap_or(finish);
    let mut planned = task.planned;
    planned.start = Some(earliest);

    task.planned = match planned.reconcile() {
        Ok(reconciled) => reconciled,
        Err(err) => {
            tracing::debug!(task = task.sequence, %err, "kept adjusted start without reconciling");
            planned
        }
    };
    task.updated_at = Utc::now();

    tracing::debug!(task = task.sequence, start = %earliest, "moved planned start after predecessors");
    Ok(true)
}

/// Reports every date and reference problem with a single task
pub fn validate_task_dates(task: &Task, tasks: &[Task]) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();

    if let (Some(start), Some(end)) = (task.planned.start, task.planned.end) {
        if start > end {
            issues.push(ScheduleIssue::InvalidRange {
                task: task.sequence,
                start,
                end,
            });
        }
    }

    match resolve_earliest_start(task, tasks) {
        Ok(Some(finish)) => {
            if let Some(start) = task.planned.start {
                if start <= finish {
                    issues.push(ScheduleIssue::SchedulingConflict {
                        task: task.sequence,
                        start,
                        finish,
                    });
                }
            }
        }
        Ok(None) => {}
        Err(reference_issues) => issues.extend(reference_issues),
    }

    issues
}

/// Validates every live task and reports predecessor cycles
pub fn validate_plan(tasks: &[Task]) -> Vec<ScheduleIssue> {
    let mut issues: Vec<ScheduleIssue> = tasks
        .iter()
        .filter(|t| t.is_live())
        .flat_map(|t| validate_task_dates(t, tasks))
        .collect();

    let (_, errors) = PredecessorGraph::from_tasks(tasks);
    issues.extend(errors.into_iter().filter_map(cycle_issue));
    issues
}

fn cycle_issue(err: GraphError) -> Option<ScheduleIssue> {
    match err {
        GraphError::CycleDetected(task, predecessor) => {
            Some(ScheduleIssue::PredecessorCycle { task, predecessor })
        }
        _ => None,
    }
}

/// Outcome of scheduling a whole plan
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleReport {
    /// Sequence numbers of tasks whose planned dates moved
    pub adjusted: Vec<u32>,

    /// Problems that stopped individual tasks from being scheduled
    pub issues: Vec<ScheduleIssue>,
}

/// Enforces predecessor ordering across the plan, upstream tasks first
///
/// Moved finish dates propagate to dependents. Every task on a predecessor
/// cycle, and every task whose references do not resolve, is left untouched.
pub fn reschedule_all(tasks: &mut [Task]) -> ScheduleReport {
    let mut report = ScheduleReport::default();
    let (graph, errors) = PredecessorGraph::from_tasks(tasks);

    for err in errors {
        if let Some(issue) = cycle_issue(err) {
            tracing::warn!(%issue, "predecessor cycle");
            report.issues.push(issue);
        }
    }

    let skipped: HashSet<u32> = PredecessorGraph::cyclic_tasks(tasks);
    if !skipped.is_empty() {
        tracing::warn!(count = skipped.len(), "skipping tasks on predecessor cycles");
    }

    let order = match graph.topological_order() {
        Ok(order) => order,
        Err(err) => {
            // Unreachable while the graph rejects cyclic edges
            tracing::warn!(%err, "predecessor graph is cyclic");
            return report;
        }
    };

    let positions: HashMap<u32, usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_live())
        .map(|(i, t)| (t.sequence, i))
        .collect();

    for seq in order {
        if skipped.contains(&seq) {
            continue;
        }
        let Some(&index) = positions.get(&seq) else {
            continue;
        };

        let mut task = tasks[index].clone();
        match enforce_schedule(&mut task, tasks) {
            Ok(true) => {
                report.adjusted.push(seq);
                tasks[index] = task;
            }
            Ok(false) => {}
            Err(issues) => report.issues.extend(issues),
        }
    }

    report
}
