//! Domain models for wbs-planner
//!
//! Contains the planning engine without any I/O concerns.

mod calendar;
mod dates;
mod graph;
mod id;
mod indent;
mod schedule;
mod store;
mod task;
mod wbs;

#[cfg(test)]
mod test_support;

pub use calendar::{Holiday, HolidayCalendar};
pub use dates::{
    add_business_days, count_business_days, duration_from_start_and_end,
    end_from_start_and_duration, is_business_day, reconcile_triple, start_from_end_and_duration,
    DateError, DatePatch, DateTriple, ExclusionPolicy, NoExclusions,
};
pub use graph::{GraphError, PredecessorGraph};
pub use id::{IdError, TaskId};
pub use indent::{indent, outdent};
pub use schedule::{
    enforce_schedule, reschedule_all, resolve_earliest_start, validate_plan, validate_task_dates,
    ScheduleIssue, ScheduleReport,
};
pub use store::{
    reduce, Command, Effects, History, MoveDirection, NewTask, StoreError, StoreOptions, TaskStore,
};
pub use task::{Predecessors, Task, TaskPatch};
pub use wbs::{renumber, WbsAnomaly};
