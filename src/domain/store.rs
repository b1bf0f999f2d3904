//! In-memory task store with undo/redo
//!
//! Every mutation goes through [`reduce`], a pure function from the current
//! task list and a [`Command`] to the next list. [`TaskStore::apply`] swaps
//! the result in and records the previous list on the undo stack. A rejected
//! command leaves the list and both stacks untouched.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::dates::{DateError, DateTriple};
use super::id::TaskId;
use super::indent;
use super::schedule::{self, ScheduleIssue, ScheduleReport};
use super::task::{Task, TaskPatch};
use super::wbs::{self, WbsAnomaly};

/// Direction of a single-row move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Up,
    Down,
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDirection::Up => write!(f, "up"),
            MoveDirection::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error(transparent)]
    Dates(#[from] DateError),

    #[error("{}", join_issues(.0))]
    Validation(Vec<ScheduleIssue>),

    #[error("Task {task} cannot move {direction}")]
    CannotMove { task: u32, direction: MoveDirection },

    #[error("No tasks selected")]
    EmptySelection,
}

fn join_issues(issues: &[ScheduleIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl StoreError {
    /// Human-readable messages, one per underlying problem
    pub fn messages(&self) -> Vec<String> {
        match self {
            StoreError::Validation(issues) => issues.iter().map(|i| i.to_string()).collect(),
            other => vec![other.to_string()],
        }
    }
}

/// Knobs that change how commands behave
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Planned duration in days for new tasks without one
    pub default_duration: u32,

    /// Maximum number of undo snapshots kept
    pub history_limit: usize,

    /// Run the soft scheduling path after schedule-relevant updates
    ///
    /// Only the updated task moves. Its dependents keep their dates until
    /// [`Command::RescheduleAll`] runs.
    pub auto_schedule: bool,

    /// Recompute WBS codes after deletes
    pub renumber_on_delete: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            default_duration: 1,
            history_limit: 100,
            auto_schedule: false,
            renumber_on_delete: false,
        }
    }
}

/// Fields for a task being created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub start: Option<NaiveDate>,
    pub duration: Option<u32>,
}

impl NewTask {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A recorded mutation of the task list
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddTask(NewTask),
    AddTaskAfter { after: TaskId, task: NewTask },
    UpdateTask { id: TaskId, patch: TaskPatch },
    DeleteTask { id: TaskId },
    BulkDelete { ids: Vec<TaskId> },
    Indent { ids: Vec<TaskId> },
    Outdent { ids: Vec<TaskId> },
    MoveUp { id: TaskId },
    MoveDown { id: TaskId },
    EnforceSchedule { id: TaskId },
    RescheduleAll,
    Renumber,
}

/// Side information produced by a command
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Effects {
    /// ID of the task a create command added
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<TaskId>,

    /// Tasks whose planned dates were moved by scheduling
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adjusted: Vec<u32>,

    /// Tasks numbered as top-level for lack of a parent
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub anomalies: Vec<WbsAnomaly>,

    /// Problems that did not stop the command
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ScheduleIssue>,
}

/// Undo and redo snapshots, most recent last
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub undo: Vec<Vec<Task>>,

    #[serde(default)]
    pub redo: Vec<Vec<Task>>,
}

impl History {
    fn push_undo(&mut self, snapshot: Vec<Task>, limit: usize) {
        self.undo.push(snapshot);
        if self.undo.len() > limit {
            let excess = self.undo.len() - limit;
            self.undo.drain(..excess);
        }
    }
}

/// Computes the next task list for a command without touching any history
pub fn reduce(
    tasks: &[Task],
    command: &Command,
    options: &StoreOptions,
) -> Result<(Vec<Task>, Effects), StoreError> {
    let mut next = tasks.to_vec();
    let mut effects = Effects::default();

    match command {
        Command::AddTask(new) => {
            let task = build_task(&next, new, options, 0)?;
            effects.created = Some(task.id.clone());
            next.push(task);
            effects.anomalies = restructure(&mut next);
        }

        Command::AddTaskAfter { after, task: new } => {
            let index = live_index(&next, after)?;
            let target = &next[index];
            let level = if target.is_parent {
                target.level + 1
            } else {
                target.level
            };
            let insert_at = target.sequence + 1;

            for task in next.iter_mut().filter(|t| t.is_live()) {
                task.predecessors.shift_from(insert_at);
            }

            let task = build_task(&next, new, options, level)?;
            effects.created = Some(task.id.clone());
            next.insert(index + 1, task);
            effects.anomalies = restructure(&mut next);
        }

        Command::UpdateTask { id, patch } => {
            let index = live_index(&next, id)?;
            let mut task = next[index].clone();
            task.apply_patch(patch)?;

            if patch.predecessors.is_some() {
                schedule::resolve_predecessors(&task, &next).map_err(StoreError::Validation)?;
            }

            if options.auto_schedule && patch.touches_schedule() {
                if schedule::enforce_schedule(&mut task, &next).map_err(StoreError::Validation)? {
                    effects.adjusted.push(task.sequence);
                }
            }

            next[index] = task;
        }

        Command::DeleteTask { id } => {
            effects.anomalies = delete(&mut next, std::slice::from_ref(id), options)?;
        }

        Command::BulkDelete { ids } => {
            effects.anomalies = delete(&mut next, ids, options)?;
        }

        Command::Indent { ids } => {
            check_selection(&next, ids)?;
            effects.anomalies = indent::indent(&mut next, ids);
        }

        Command::Outdent { ids } => {
            check_selection(&next, ids)?;
            effects.anomalies = indent::outdent(&mut next, ids);
        }

        Command::MoveUp { id } => {
            effects.anomalies = move_task(&mut next, id, MoveDirection::Up)?;
        }

        Command::MoveDown { id } => {
            effects.anomalies = move_task(&mut next, id, MoveDirection::Down)?;
        }

        Command::EnforceSchedule { id } => {
            let index = live_index(&next, id)?;
            let mut task = next[index].clone();
            if schedule::enforce_schedule(&mut task, &next).map_err(StoreError::Validation)? {
                effects.adjusted.push(task.sequence);
                next[index] = task;
            }
        }

        Command::RescheduleAll => {
            let ScheduleReport { adjusted, issues } = schedule::reschedule_all(&mut next);
            effects.adjusted = adjusted;
            effects.issues = issues;
        }

        Command::Renumber => {
            effects.anomalies = restructure(&mut next);
        }
    }

    Ok((next, effects))
}

/// Creates a task with an ID not already used in the list
fn build_task(
    tasks: &[Task],
    new: &NewTask,
    options: &StoreOptions,
    level: u32,
) -> Result<Task, StoreError> {
    let now = Utc::now();
    let mut nonce = 0;
    let mut id = TaskId::new(&new.name, now, nonce);
    while tasks.iter().any(|t| t.id == id) {
        nonce += 1;
        id = TaskId::new(&new.name, now, nonce);
    }

    let duration = new.duration.unwrap_or(options.default_duration);
    let mut task = Task::new(id, new.name.clone());
    task.level = level;
    task.planned = match new.start {
        Some(start) => DateTriple::starting(start, duration)?,
        None => DateTriple::with_duration(duration),
    };
    Ok(task)
}

/// Reassigns sequence numbers, parent flags and WBS codes
fn restructure(tasks: &mut [Task]) -> Vec<WbsAnomaly> {
    wbs::resequence(tasks);
    wbs::refresh_parents(tasks);
    wbs::renumber(tasks)
}

fn live_index(tasks: &[Task], id: &TaskId) -> Result<usize, StoreError> {
    tasks
        .iter()
        .position(|t| t.is_live() && &t.id == id)
        .ok_or_else(|| StoreError::TaskNotFound(id.to_string()))
}

fn check_selection(tasks: &[Task], ids: &[TaskId]) -> Result<(), StoreError> {
    if ids.is_empty() {
        return Err(StoreError::EmptySelection);
    }
    for id in ids {
        live_index(tasks, id)?;
    }
    Ok(())
}

/// Soft-deletes the selection and closes the gaps it leaves
///
/// Children of a deleted parent are pulled up to a legal depth.
fn delete(
    tasks: &mut [Task],
    ids: &[TaskId],
    options: &StoreOptions,
) -> Result<Vec<WbsAnomaly>, StoreError> {
    check_selection(tasks, ids)?;

    let mut removed: Vec<(usize, u32)> = ids
        .iter()
        .map(|id| live_index(tasks, id).map(|index| (index, tasks[index].sequence)))
        .collect::<Result<_, _>>()?;
    // Highest first so each gap closes against the original numbering
    removed.sort_by(|a, b| b.1.cmp(&a.1));
    removed.dedup();

    let doomed: Vec<usize> = removed.iter().map(|(index, _)| *index).collect();

    for &(_, seq) in &removed {
        for (index, task) in tasks.iter_mut().enumerate() {
            if task.is_live() && !doomed.contains(&index) {
                task.predecessors.close_gap(seq);
            }
        }
    }

    for &index in &doomed {
        tasks[index].soft_delete();
    }

    wbs::resequence(tasks);
    wbs::normalize_levels(tasks);
    wbs::refresh_parents(tasks);
    let anomalies = if options.renumber_on_delete {
        wbs::renumber(tasks)
    } else {
        Vec::new()
    };

    tracing::debug!(count = doomed.len(), "soft-deleted tasks");
    Ok(anomalies)
}

fn move_task(
    tasks: &mut [Task],
    id: &TaskId,
    direction: MoveDirection,
) -> Result<Vec<WbsAnomaly>, StoreError> {
    let index = live_index(tasks, id)?;
    let live = wbs::live_indices(tasks);
    let position = live.iter().position(|&i| i == index).unwrap_or(0);

    let neighbour = match direction {
        MoveDirection::Up => position.checked_sub(1).and_then(|p| live.get(p)),
        MoveDirection::Down => live.get(position + 1),
    };
    let Some(&neighbour) = neighbour else {
        return Err(StoreError::CannotMove {
            task: tasks[index].sequence,
            direction,
        });
    };

    let (a, b) = (tasks[index].sequence, tasks[neighbour].sequence);
    for task in tasks.iter_mut().filter(|t| t.is_live()) {
        task.predecessors.swap(a, b);
    }

    tasks.swap(index, neighbour);
    tasks[neighbour].updated_at = Utc::now();

    wbs::resequence(tasks);
    wbs::normalize_levels(tasks);
    wbs::refresh_parents(tasks);
    Ok(wbs::renumber(tasks))
}

/// Ordered task list plus undo/redo history
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    history: History,
    options: StoreOptions,
}

impl TaskStore {
    /// Creates an empty store
    pub fn new(options: StoreOptions) -> Self {
        Self {
            tasks: Vec::new(),
            history: History::default(),
            options,
        }
    }

    /// Rebuilds a store from persisted state
    pub fn from_parts(tasks: Vec<Task>, history: History, options: StoreOptions) -> Self {
        Self {
            tasks,
            history,
            options,
        }
    }

    /// Splits the store into its persisted state
    pub fn into_parts(self) -> (Vec<Task>, History) {
        (self.tasks, self.history)
    }

    /// All tasks in display order, deleted ones included
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Live tasks in display order
    pub fn live_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.is_live())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Finds a task by ID, deleted or not
    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Finds a live task by sequence number
    pub fn find_by_sequence(&self, seq: u32) -> Option<&Task> {
        schedule::find_by_sequence(&self.tasks, seq)
    }

    /// Resolves a user reference (`3` or `t-1a2b3c4`) to a live task's ID
    pub fn resolve_ref(&self, reference: &str) -> Result<TaskId, StoreError> {
        let reference = reference.trim();
        let not_found = || StoreError::TaskNotFound(reference.to_string());

        if TaskId::looks_like_id(reference) {
            let id: TaskId = reference.parse().map_err(|_| not_found())?;
            return match self.find(&id) {
                Some(task) if task.is_live() => Ok(id),
                _ => Err(not_found()),
            };
        }

        let seq: u32 = reference.parse().map_err(|_| not_found())?;
        self.find_by_sequence(seq)
            .map(|t| t.id.clone())
            .ok_or_else(not_found)
    }

    /// Applies a command, recording the previous list for undo
    pub fn apply(&mut self, command: Command) -> Result<Effects, StoreError> {
        let (next, effects) = reduce(&self.tasks, &command, &self.options)?;

        let previous = std::mem::replace(&mut self.tasks, next);
        self.history.push_undo(previous, self.options.history_limit);
        self.history.redo.clear();

        Ok(effects)
    }

    /// Restores the list before the last mutation; false if nothing to undo
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.tasks, previous);
        self.history.redo.push(current);
        tracing::debug!(undo = self.history.undo.len(), redo = self.history.redo.len(), "undo");
        true
    }

    /// Re-applies the last undone mutation; false if nothing to redo
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.tasks, next);
        self.history.push_undo(current, self.options.history_limit);
        tracing::debug!(undo = self.history.undo.len(), redo = self.history.redo.len(), "redo");
        true
    }

    /// Reports every problem in the plan without changing it
    pub fn validate(&self) -> Vec<ScheduleIssue> {
        schedule::validate_plan(&self.tasks)
    }

    /// Reports the problems with one task
    pub fn validate_task(&self, id: &TaskId) -> Result<Vec<ScheduleIssue>, StoreError> {
        let index = live_index(&self.tasks, id)?;
        Ok(schedule::validate_task_dates(&self.tasks[index], &self.tasks))
    }

    pub fn add_task(&mut self, task: NewTask) -> Result<Effects, StoreError> {
        self.apply(Command::AddTask(task))
    }

    pub fn add_task_after(&mut self, after: &TaskId, task: NewTask) -> Result<Effects, StoreError> {
        self.apply(Command::AddTaskAfter {
            after: after.clone(),
            task,
        })
    }

    pub fn update_task(&mut self, id: &TaskId, patch: TaskPatch) -> Result<Effects, StoreError> {
        self.apply(Command::UpdateTask {
            id: id.clone(),
            patch,
        })
    }

    pub fn delete_task(&mut self, id: &TaskId) -> Result<Effects, StoreError> {
        self.apply(Command::DeleteTask { id: id.clone() })
    }

    pub fn bulk_delete(&mut self, ids: Vec<TaskId>) -> Result<Effects, StoreError> {
        self.apply(Command::BulkDelete { ids })
    }

    pub fn indent(&mut self, ids: Vec<TaskId>) -> Result<Effects, StoreError> {
        self.apply(Command::Indent { ids })
    }

    pub fn outdent(&mut self, ids: Vec<TaskId>) -> Result<Effects, StoreError> {
        self.apply(Command::Outdent { ids })
    }

    pub fn move_up(&mut self, id: &TaskId) -> Result<Effects, StoreError> {
        self.apply(Command::MoveUp { id: id.clone() })
    }

    pub fn move_down(&mut self, id: &TaskId) -> Result<Effects, StoreError> {
        self.apply(Command::MoveDown { id: id.clone() })
    }

    pub fn enforce_schedule(&mut self, id: &TaskId) -> Result<Effects, StoreError> {
        self.apply(Command::EnforceSchedule { id: id.clone() })
    }

    pub fn reschedule_all(&mut self) -> Result<Effects, StoreError> {
        self.apply(Command::RescheduleAll)
    }

    pub fn renumber(&mut self) -> Result<Effects, StoreError> {
        self.apply(Command::Renumber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates::DatePatch;
    use crate::domain::task::Predecessors;
    use crate::domain::test_support::date;

    fn store_with(names: &[&str]) -> (TaskStore, Vec<TaskId>) {
        let mut store = TaskStore::new(StoreOptions::default());
        let ids = names
            .iter()
            .map(|name| store.add_task(NewTask::named(*name)).unwrap().created.unwrap())
            .collect();
        (store, ids)
    }

    fn live_seqs(store: &TaskStore) -> Vec<u32> {
        store.live_tasks().map(|t| t.sequence).collect()
    }

    fn names(store: &TaskStore) -> Vec<&str> {
        store.live_tasks().map(|t| t.name.as_str()).collect()
    }

    fn preds(store: &TaskStore, name: &str) -> String {
        store
            .live_tasks()
            .find(|t| t.name == name)
            .map(|t| t.predecessors.to_string())
            .unwrap_or_default()
    }

    fn set_preds(store: &mut TaskStore, id: &TaskId, preds: &str) -> Result<Effects, StoreError> {
        store.update_task(
            id,
            TaskPatch {
                predecessors: Some(Predecessors::parse(preds)),
                ..Default::default()
            },
        )
    }

    #[test]
    fn add_appends_with_default_duration() {
        let (store, ids) = store_with(&["Design", "Build"]);

        assert_eq!(live_seqs(&store), vec![1, 2]);
        let build = store.find(&ids[1]).unwrap();
        assert_eq!(build.wbs, "2");
        assert_eq!(build.planned.duration, Some(1));
    }

    #[test]
    fn add_uses_configured_duration_and_start() {
        let mut store = TaskStore::new(StoreOptions {
            default_duration: 5,
            ..Default::default()
        });
        let id = store
            .add_task(NewTask {
                name: "Survey".to_string(),
                start: Some(date(2026, 5, 4)),
                duration: None,
            })
            .unwrap()
            .created
            .unwrap();

        let task = store.find(&id).unwrap();
        assert_eq!(task.planned.end, Some(date(2026, 5, 8)));
    }

    #[test]
    fn add_with_unrepresentable_end_is_rejected() {
        let mut store = TaskStore::new(StoreOptions::default());

        let result = store.add_task(NewTask {
            name: "Forever".to_string(),
            start: Some(date(2026, 5, 4)),
            duration: Some(u32::MAX),
        });

        assert!(matches!(result, Err(StoreError::Dates(DateError::OutOfRange { .. }))));
        assert!(store.tasks().is_empty());
        assert!(store.history().undo.is_empty());
    }

    #[test]
    fn same_name_gets_distinct_ids() {
        let (store, ids) = store_with(&["Review", "Review", "Review"]);
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);
        assert_eq!(store.tasks().len(), 3);
    }

    #[test]
    fn add_after_shifts_sequences_and_references() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        set_preds(&mut store, &ids[2], "1,2").unwrap();

        store.add_task_after(&ids[0], NewTask::named("A2")).unwrap();

        assert_eq!(names(&store), vec!["A", "A2", "B", "C"]);
        assert_eq!(live_seqs(&store), vec![1, 2, 3, 4]);
        // C still points at A and B
        assert_eq!(preds(&store, "C"), "1,3");
    }

    #[test]
    fn add_after_parent_becomes_first_child() {
        let (mut store, ids) = store_with(&["Phase", "Step"]);
        store.indent(vec![ids[1].clone()]).unwrap();

        let created = store
            .add_task_after(&ids[0], NewTask::named("Prep"))
            .unwrap()
            .created
            .unwrap();

        let prep = store.find(&created).unwrap();
        assert_eq!(prep.level, 1);
        assert_eq!(prep.wbs, "1.1");
        assert_eq!(store.find(&ids[1]).unwrap().wbs, "1.2");
    }

    #[test]
    fn add_after_unknown_task_is_rejected() {
        let (mut store, _) = store_with(&["A"]);
        let ghost = TaskId::new("ghost", Utc::now(), 99);

        let result = store.add_task_after(&ghost, NewTask::named("B"));
        assert!(matches!(result, Err(StoreError::TaskNotFound(_))));
    }

    #[test]
    fn update_reconciles_dates() {
        let (mut store, ids) = store_with(&["A"]);
        store
            .update_task(
                &ids[0],
                TaskPatch {
                    planned: DatePatch {
                        start: Some(date(2026, 7, 1)),
                        end: Some(date(2026, 7, 3)),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.find(&ids[0]).unwrap().planned.duration, Some(3));
    }

    #[test]
    fn update_with_bad_range_is_rejected() {
        let (mut store, ids) = store_with(&["A"]);
        let before = store.tasks().to_vec();

        let result = store.update_task(
            &ids[0],
            TaskPatch {
                planned: DatePatch {
                    start: Some(date(2026, 7, 5)),
                    end: Some(date(2026, 7, 1)),
                    ..Default::default()
                },
                ..Default::default()
            },
        );

        assert!(matches!(result, Err(StoreError::Dates(DateError::InvalidRange { .. }))));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn unresolved_predecessor_leaves_list_unmutated() {
        let (mut store, ids) = store_with(&["Only"]);
        let before = store.tasks().to_vec();
        let undo_depth = store.history().undo.len();

        let err = set_preds(&mut store, &ids[0], "2").unwrap_err();

        assert!(err
            .messages()
            .iter()
            .any(|m| m.contains("predecessor(s) 2 not found")));
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(store.history().undo.len(), undo_depth);
    }

    #[test]
    fn self_reference_is_rejected() {
        let (mut store, ids) = store_with(&["A", "B"]);
        let err = set_preds(&mut store, &ids[1], "2").unwrap_err();

        assert_eq!(
            err,
            StoreError::Validation(vec![ScheduleIssue::SelfDependency { task: 2 }])
        );
    }

    #[test]
    fn auto_schedule_moves_start_after_predecessor() {
        let mut store = TaskStore::new(StoreOptions {
            auto_schedule: true,
            ..Default::default()
        });
        let a = store
            .add_task(NewTask {
                name: "A".to_string(),
                start: Some(date(2026, 3, 1)),
                duration: Some(10),
            })
            .unwrap()
            .created
            .unwrap();
        let b = store.add_task(NewTask::named("B")).unwrap().created.unwrap();

        let effects = set_preds(&mut store, &b, "1").unwrap();

        assert_eq!(effects.adjusted, vec![2]);
        assert_eq!(store.find(&b).unwrap().planned.start, Some(date(2026, 3, 11)));
        assert!(store.find(&a).unwrap().planned.start.is_some());
    }

    #[test]
    fn without_auto_schedule_update_does_not_move_dates() {
        let (mut store, ids) = store_with(&["A", "B"]);
        store
            .update_task(
                &ids[0],
                TaskPatch {
                    planned: DatePatch {
                        start: Some(date(2026, 3, 1)),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap();

        set_preds(&mut store, &ids[1], "1").unwrap();
        assert_eq!(store.find(&ids[1]).unwrap().planned.start, None);

        store.enforce_schedule(&ids[1]).unwrap();
        assert_eq!(
            store.find(&ids[1]).unwrap().planned.start,
            Some(date(2026, 3, 2))
        );
    }

    #[test]
    fn delete_keeps_sequences_dense() {
        let (mut store, ids) = store_with(&["A", "B", "C", "D"]);
        store.delete_task(&ids[1]).unwrap();

        assert_eq!(names(&store), vec!["A", "C", "D"]);
        assert_eq!(live_seqs(&store), vec![1, 2, 3]);
        assert_eq!(store.tasks().len(), 4);
    }

    #[test]
    fn delete_rewrites_references() {
        let (mut store, ids) = store_with(&["A", "B", "C", "D"]);
        set_preds(&mut store, &ids[3], "1,2,3").unwrap();

        store.delete_task(&ids[1]).unwrap();

        // A stays 1, B dropped, C moves from 3 to 2
        assert_eq!(preds(&store, "D"), "1,2");
    }

    #[test]
    fn bulk_delete_closes_every_gap() {
        let (mut store, ids) = store_with(&["A", "B", "C", "D", "E"]);
        set_preds(&mut store, &ids[4], "1,3,4").unwrap();

        store
            .bulk_delete(vec![ids[1].clone(), ids[2].clone()])
            .unwrap();

        assert_eq!(live_seqs(&store), vec![1, 2, 3]);
        assert_eq!(preds(&store, "E"), "1,2");
    }

    #[test]
    fn delete_without_renumber_keeps_codes() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        store.delete_task(&ids[0]).unwrap();
        assert_eq!(store.find(&ids[2]).unwrap().wbs, "3");

        store.renumber().unwrap();
        assert_eq!(store.find(&ids[2]).unwrap().wbs, "2");
    }

    #[test]
    fn delete_with_renumber_option() {
        let mut store = TaskStore::new(StoreOptions {
            renumber_on_delete: true,
            ..Default::default()
        });
        let a = store.add_task(NewTask::named("A")).unwrap().created.unwrap();
        let b = store.add_task(NewTask::named("B")).unwrap().created.unwrap();

        store.delete_task(&a).unwrap();
        assert_eq!(store.find(&b).unwrap().wbs, "1");
    }

    #[test]
    fn deleting_a_parent_pulls_children_up() {
        let mut store = TaskStore::new(StoreOptions {
            renumber_on_delete: true,
            ..Default::default()
        });
        let ids: Vec<TaskId> = ["A", "B", "C"]
            .iter()
            .map(|name| store.add_task(NewTask::named(*name)).unwrap().created.unwrap())
            .collect();
        store.indent(vec![ids[1].clone(), ids[2].clone()]).unwrap();
        store.indent(vec![ids[2].clone()]).unwrap();
        assert_eq!(store.find(&ids[2]).unwrap().level, 2);

        let effects = store.delete_task(&ids[1]).unwrap();

        let c = store.find(&ids[2]).unwrap();
        assert_eq!(c.level, 1);
        assert_eq!(c.wbs, "1.1");
        assert!(store.find(&ids[0]).unwrap().is_parent);
        assert!(effects.anomalies.is_empty());
    }

    #[test]
    fn deleted_task_cannot_be_deleted_again() {
        let (mut store, ids) = store_with(&["A"]);
        store.delete_task(&ids[0]).unwrap();

        assert!(matches!(
            store.delete_task(&ids[0]),
            Err(StoreError::TaskNotFound(_))
        ));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let (mut store, _) = store_with(&["A"]);
        assert_eq!(store.indent(vec![]), Err(StoreError::EmptySelection));
        assert_eq!(store.bulk_delete(vec![]), Err(StoreError::EmptySelection));
    }

    #[test]
    fn indent_scenario() {
        let (mut store, ids) = store_with(&["A", "B"]);
        store.indent(vec![ids[1].clone()]).unwrap();

        let a = store.find(&ids[0]).unwrap();
        let b = store.find(&ids[1]).unwrap();
        assert_eq!(b.level, 1);
        assert!(a.is_parent);
        assert_eq!(a.wbs, "1");
        assert_eq!(b.wbs, "1.1");
    }

    #[test]
    fn move_down_swaps_rows_and_references() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        set_preds(&mut store, &ids[2], "1").unwrap();

        store.move_down(&ids[0]).unwrap();

        assert_eq!(names(&store), vec!["B", "A", "C"]);
        assert_eq!(store.find(&ids[0]).unwrap().sequence, 2);
        assert_eq!(preds(&store, "C"), "2");
        assert_eq!(store.find(&ids[0]).unwrap().wbs, "2");
    }

    #[test]
    fn move_past_the_edge_is_rejected() {
        let (mut store, ids) = store_with(&["A", "B"]);
        let depth = store.history().undo.len();

        assert_eq!(
            store.move_up(&ids[0]),
            Err(StoreError::CannotMove {
                task: 1,
                direction: MoveDirection::Up
            })
        );
        assert!(matches!(
            store.move_down(&ids[1]),
            Err(StoreError::CannotMove { .. })
        ));
        assert_eq!(store.history().undo.len(), depth);
    }

    #[test]
    fn move_skips_deleted_rows() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        store.delete_task(&ids[1]).unwrap();

        store.move_up(&ids[2]).unwrap();
        assert_eq!(names(&store), vec!["C", "A"]);
    }

    #[test]
    fn undo_restores_previous_list_and_redo_reapplies() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        let before = store.tasks().to_vec();

        store.delete_task(&ids[1]).unwrap();
        let after = store.tasks().to_vec();

        assert!(store.undo());
        assert_eq!(store.tasks(), before.as_slice());

        assert!(store.redo());
        assert_eq!(store.tasks(), after.as_slice());
    }

    #[test]
    fn undo_and_redo_on_empty_stacks_are_noops() {
        let mut store = TaskStore::new(StoreOptions::default());
        assert!(!store.undo());
        assert!(!store.redo());
    }

    #[test]
    fn new_mutation_clears_redo() {
        let (mut store, _) = store_with(&["A", "B"]);
        store.undo();
        assert_eq!(store.history().redo.len(), 1);

        store.add_task(NewTask::named("C")).unwrap();
        assert!(store.history().redo.is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let mut store = TaskStore::new(StoreOptions {
            history_limit: 2,
            ..Default::default()
        });
        for name in ["A", "B", "C", "D"] {
            store.add_task(NewTask::named(name)).unwrap();
        }

        assert_eq!(store.history().undo.len(), 2);
        assert!(store.undo());
        assert!(store.undo());
        assert!(!store.undo());
        assert_eq!(names(&store), vec!["A", "B"]);
    }

    #[test]
    fn undo_after_unchanged_command_restores_same_list() {
        let (mut store, ids) = store_with(&["A", "B"]);
        let before = store.tasks().to_vec();
        let depth = store.history().undo.len();

        store.outdent(vec![ids[0].clone()]).unwrap();
        assert_eq!(store.history().undo.len(), depth + 1);

        assert!(store.undo());
        assert_eq!(store.tasks(), before.as_slice());
        assert_eq!(names(&store), vec!["A", "B"]);
    }

    #[test]
    fn reschedule_all_propagates() {
        let (mut store, ids) = store_with(&["A", "B", "C"]);
        store
            .update_task(
                &ids[0],
                TaskPatch {
                    planned: DatePatch {
                        start: Some(date(2026, 3, 1)),
                        duration: Some(10),
                        ..Default::default()
                    },
                    ..Default::default()
                },
            )
            .unwrap();
        set_preds(&mut store, &ids[1], "1").unwrap();
        set_preds(&mut store, &ids[2], "2").unwrap();

        let effects = store.reschedule_all().unwrap();

        assert_eq!(effects.adjusted, vec![2, 3]);
        assert_eq!(store.find(&ids[2]).unwrap().planned.start, Some(date(2026, 3, 12)));
        assert!(store.validate().is_empty());
    }

    #[test]
    fn validate_reports_conflict_without_fixing() {
        let (mut store, ids) = store_with(&["A", "B"]);
        for id in &ids {
            store
                .update_task(
                    id,
                    TaskPatch {
                        planned: DatePatch {
                            start: Some(date(2026, 3, 1)),
                            ..Default::default()
                        },
                        ..Default::default()
                    },
                )
                .unwrap();
        }
        set_preds(&mut store, &ids[1], "1").unwrap();

        let issues = store.validate_task(&ids[1]).unwrap();
        assert!(matches!(
            issues.as_slice(),
            [ScheduleIssue::SchedulingConflict { task: 2, .. }]
        ));
        assert_eq!(
            store.find(&ids[1]).unwrap().planned.start,
            Some(date(2026, 3, 1))
        );
    }

    #[test]
    fn resolve_ref_accepts_sequence_and_id() {
        let (store, ids) = store_with(&["A", "B"]);

        assert_eq!(store.resolve_ref("2").unwrap(), ids[1]);
        assert_eq!(store.resolve_ref(&ids[0].to_string()).unwrap(), ids[0]);
        assert!(store.resolve_ref("3").is_err());
        assert!(store.resolve_ref("t-zzzzzzz").is_err());
        assert!(store.resolve_ref("abc").is_err());
    }
}
