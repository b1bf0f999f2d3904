//! Shared fixtures for domain unit tests

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;

use super::dates::DateTriple;
use super::id::TaskId;
use super::task::{Predecessors, Task};
use super::wbs::resequence;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builds a sequenced plan with one task per level entry
pub fn plan(levels: &[u32]) -> Vec<Task> {
    let now = Utc::now();
    let mut tasks: Vec<Task> = levels
        .iter()
        .enumerate()
        .map(|(i, &level)| {
            let name = format!("Task {}", i + 1);
            let mut task = Task::new(TaskId::new(&name, now, i as u64), name);
            task.level = level;
            task
        })
        .collect();
    resequence(&mut tasks);
    tasks
}

/// Builds a flat plan where each entry is (planned start, duration, predecessors)
pub fn scheduled(rows: &[(Option<NaiveDate>, u32, &str)]) -> Vec<Task> {
    let mut tasks = plan(&vec![0; rows.len()]);
    for (task, (start, duration, preds)) in tasks.iter_mut().zip(rows) {
        task.planned = match start {
            Some(start) => DateTriple::starting(*start, *duration).unwrap(),
            None => DateTriple::with_duration(*duration),
        };
        task.predecessors = Predecessors::parse(preds);
    }
    tasks
}

/// Level sequences where each level is at most one deeper than the last
pub fn well_formed_levels() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..4, 1..40).prop_map(|raw| {
        let mut levels = Vec::with_capacity(raw.len());
        let mut previous: Option<u32> = None;
        for level in raw {
            let max = previous.map(|p| p + 1).unwrap_or(0);
            let level = level.min(max);
            levels.push(level);
            previous = Some(level);
        }
        levels
    })
}
