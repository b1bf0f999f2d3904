//! wbs-planner - A local-first planner for work breakdown structures
//!
//! A plan is a flat, ordered list of tasks with nesting levels. The domain
//! layer derives WBS codes, parent flags and sequence numbers from that list,
//! schedules tasks after their finish-to-start predecessors, and keeps an
//! undo/redo history of every change.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{Task, TaskId, TaskStore};
