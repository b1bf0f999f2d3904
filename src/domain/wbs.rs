//! Work breakdown structure numbering
//!
//! WBS codes, parent flags and sequence numbers are all derived from the
//! order and levels of the live tasks. Nothing here reads dates, names or
//! predecessors.

use serde::Serialize;
use std::fmt;

use super::id::TaskId;
use super::task::Task;

/// A task whose level has no parent one level up
///
/// Such a task is numbered as a top-level task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WbsAnomaly {
    pub task: TaskId,
    pub sequence: u32,
    pub level: u32,
}

impl fmt::Display for WbsAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task {} at level {} has no parent at level {}; numbered as top-level",
            self.sequence,
            self.level,
            self.level.saturating_sub(1)
        )
    }
}

/// Returns the indices of live tasks in list order
pub fn live_indices(tasks: &[Task]) -> Vec<usize> {
    tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_live())
        .map(|(i, _)| i)
        .collect()
}

/// Recomputes WBS codes for every live task
///
/// Returns the tasks that had to be numbered as top-level because no parent
/// precedes them.
pub fn renumber(tasks: &mut [Task]) -> Vec<WbsAnomaly> {
    let mut anomalies = Vec::new();
    // Code of the most recent task seen at each level
    let mut last_code: Vec<Option<String>> = Vec::new();
    // Siblings seen at each level since the last shallower task
    let mut counters: Vec<u32> = Vec::new();

    for task in tasks.iter_mut().filter(|t| t.is_live()) {
        let level = task.level as usize;

        if counters.len() <= level {
            counters.resize(level + 1, 0);
        }
        counters.truncate(level + 1);
        last_code.truncate(level);

        let parent_code = match level {
            0 => None,
            _ => last_code.get(level - 1).cloned().flatten(),
        };

        let code = match parent_code {
            Some(parent) => {
                counters[level] += 1;
                format!("{}.{}", parent, counters[level])
            }
            None => {
                if level > 0 {
                    tracing::warn!(
                        task = %task.id,
                        sequence = task.sequence,
                        level = task.level,
                        "task has no parent; numbering as top-level"
                    );
                    anomalies.push(WbsAnomaly {
                        task: task.id.clone(),
                        sequence: task.sequence,
                        level: task.level,
                    });
                }
                counters[0] += 1;
                counters[0].to_string()
            }
        };

        if last_code.len() <= level {
            last_code.resize(level + 1, None);
        }
        last_code[level] = Some(code.clone());
        task.wbs = code;
    }

    anomalies
}

/// Recomputes `is_parent`: true iff the next live task is one level deeper
pub fn refresh_parents(tasks: &mut [Task]) {
    let live = live_indices(tasks);

    for task in tasks.iter_mut().filter(|t| !t.is_live()) {
        task.is_parent = false;
    }

    for (pos, &index) in live.iter().enumerate() {
        let is_parent = live
            .get(pos + 1)
            .map(|&next| tasks[next].level == tasks[index].level + 1)
            .unwrap_or(false);
        tasks[index].is_parent = is_parent;
    }
}

/// Assigns dense sequence numbers 1..N to live tasks in list order
pub fn resequence(tasks: &mut [Task]) {
    let mut next = 1;
    for task in tasks.iter_mut().filter(|t| t.is_live()) {
        task.sequence = next;
        next += 1;
    }
}

/// Clamps levels so no live task is more than one level below its predecessor
pub fn normalize_levels(tasks: &mut [Task]) {
    let mut previous: Option<u32> = None;
    for task in tasks.iter_mut().filter(|t| t.is_live()) {
        let max_level = previous.map(|level| level + 1).unwrap_or(0);
        if task.level > max_level {
            task.level = max_level;
        }
        previous = Some(task.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{plan, well_formed_levels};
    use proptest::prelude::*;

    fn codes(tasks: &[Task]) -> Vec<&str> {
        tasks
            .iter()
            .filter(|t| t.is_live())
            .map(|t| t.wbs.as_str())
            .collect()
    }

    #[test]
    fn flat_list_is_numbered_sequentially() {
        let mut tasks = plan(&[0, 0, 0]);
        let anomalies = renumber(&mut tasks);

        assert!(anomalies.is_empty());
        assert_eq!(codes(&tasks), vec!["1", "2", "3"]);
    }

    #[test]
    fn nested_codes() {
        let mut tasks = plan(&[0, 1, 1, 2, 2, 1, 0, 1]);
        renumber(&mut tasks);

        assert_eq!(
            codes(&tasks),
            vec!["1", "1.1", "1.2", "1.2.1", "1.2.2", "1.3", "2", "2.1"]
        );
    }

    #[test]
    fn deeper_counters_reset_under_new_parent() {
        let mut tasks = plan(&[0, 1, 2, 1, 2, 2]);
        renumber(&mut tasks);

        assert_eq!(codes(&tasks), vec!["1", "1.1", "1.1.1", "1.2", "1.2.1", "1.2.2"]);
    }

    #[test]
    fn deleted_tasks_are_skipped() {
        let mut tasks = plan(&[0, 1, 1, 0]);
        tasks[1].soft_delete();
        resequence(&mut tasks);
        renumber(&mut tasks);

        assert_eq!(codes(&tasks), vec!["1", "1.1", "2"]);
    }

    #[test]
    fn orphan_is_numbered_top_level_and_reported() {
        let mut tasks = plan(&[0, 2, 0]);
        let anomalies = renumber(&mut tasks);

        assert_eq!(codes(&tasks), vec!["1", "2", "3"]);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].sequence, 2);
        assert_eq!(anomalies[0].level, 2);
    }

    #[test]
    fn leading_indented_task_is_an_anomaly() {
        let mut tasks = plan(&[1, 1]);
        let anomalies = renumber(&mut tasks);

        assert_eq!(anomalies.len(), 2);
        assert_eq!(codes(&tasks), vec!["1", "2"]);
    }

    #[test]
    fn renumber_only_writes_codes() {
        let mut tasks = plan(&[0, 1]);
        let before = tasks.clone();
        renumber(&mut tasks);

        for (a, b) in before.iter().zip(&tasks) {
            assert_eq!(a.level, b.level);
            assert_eq!(a.sequence, b.sequence);
            assert_eq!(a.is_parent, b.is_parent);
            assert_eq!(a.updated_at, b.updated_at);
        }
    }

    #[test]
    fn refresh_parents_marks_parents() {
        let mut tasks = plan(&[0, 1, 1, 0, 0]);
        refresh_parents(&mut tasks);

        let flags: Vec<bool> = tasks.iter().map(|t| t.is_parent).collect();
        assert_eq!(flags, vec![true, false, false, false, false]);
    }

    #[test]
    fn refresh_parents_looks_past_deleted_tasks() {
        let mut tasks = plan(&[0, 0, 1]);
        tasks[1].soft_delete();
        refresh_parents(&mut tasks);

        assert!(tasks[0].is_parent);
    }

    #[test]
    fn resequence_is_dense() {
        let mut tasks = plan(&[0, 0, 0, 0]);
        tasks[1].soft_delete();
        resequence(&mut tasks);

        let seqs: Vec<u32> = tasks.iter().filter(|t| t.is_live()).map(|t| t.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn normalize_clamps_skipped_levels() {
        let mut tasks = plan(&[1, 3, 1, 0, 2]);
        normalize_levels(&mut tasks);

        let levels: Vec<u32> = tasks.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![0, 1, 1, 0, 1]);
    }

    proptest! {
        #[test]
        fn child_code_extends_parent_code(levels in well_formed_levels()) {
            let mut tasks = plan(&levels);
            let anomalies = renumber(&mut tasks);
            prop_assert!(anomalies.is_empty());

            for index in 0..tasks.len() {
                let level = tasks[index].level;
                if level == 0 {
                    continue;
                }
                let parent = (0..index)
                    .rev()
                    .find(|&j| tasks[j].level == level - 1)
                    .expect("well-formed list has a parent");
                let position = tasks[parent + 1..=index]
                    .iter()
                    .filter(|t| t.level == level)
                    .count();
                prop_assert_eq!(
                    &tasks[index].wbs,
                    &format!("{}.{}", tasks[parent].wbs, position)
                );
            }
        }

        #[test]
        fn top_level_codes_count_up(levels in well_formed_levels()) {
            let mut tasks = plan(&levels);
            renumber(&mut tasks);

            let top: Vec<String> = tasks
                .iter()
                .filter(|t| t.level == 0)
                .map(|t| t.wbs.clone())
                .collect();
            let expected: Vec<String> = (1..=top.len()).map(|n| n.to_string()).collect();
            prop_assert_eq!(top, expected);
        }
    }
}
