//! Indent and outdent of selected tasks
//!
//! Both operations keep the hierarchy well formed (no task more than one
//! level below the task before it) and leave WBS codes and parent flags
//! recomputed.

use chrono::Utc;

use super::id::TaskId;
use super::task::Task;
use super::wbs::{normalize_levels, refresh_parents, renumber, WbsAnomaly};

/// Moves each selected task one level deeper, in list order
///
/// A task can sink at most to one level below the live task before it, so
/// the first live task never moves.
pub fn indent(tasks: &mut [Task], selected: &[TaskId]) -> Vec<WbsAnomaly> {
    let mut previous: Option<usize> = None;

    for index in 0..tasks.len() {
        if !tasks[index].is_live() {
            continue;
        }

        if selected.contains(&tasks[index].id) {
            if let Some(prev) = previous {
                let prev_level = tasks[prev].level;
                let new_level = (tasks[index].level + 1).min(prev_level + 1);

                if new_level != tasks[index].level {
                    tasks[index].level = new_level;
                    tasks[index].updated_at = Utc::now();
                }
                if new_level == prev_level + 1 {
                    tasks[prev].is_parent = true;
                }
            }
        }

        previous = Some(index);
    }

    settle(tasks)
}

/// Moves each selected task one level shallower; level 0 is left alone
pub fn outdent(tasks: &mut [Task], selected: &[TaskId]) -> Vec<WbsAnomaly> {
    for task in tasks
        .iter_mut()
        .filter(|t| t.is_live() && selected.contains(&t.id))
    {
        if task.level > 0 {
            task.level -= 1;
            task.updated_at = Utc::now();
        }
    }

    settle(tasks)
}

/// Restores level invariants, parent flags and codes after a level change
fn settle(tasks: &mut [Task]) -> Vec<WbsAnomaly> {
    normalize_levels(tasks);
    refresh_parents(tasks);
    renumber(tasks)
}
