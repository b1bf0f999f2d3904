//! Predecessor graph over task sequence numbers
//!
//! Manages finish-to-start links with cycle detection and topological
//! ordering. Uses petgraph for graph operations.

use petgraph::algo::{is_cyclic_directed, tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use super::task::Task;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Adding predecessor would create a cycle: {0} -> {1}")]
    CycleDetected(u32, u32),

    #[error("Task not found: {0}")]
    TaskNotFound(u32),

    #[error("Self-dependency not allowed: {0}")]
    SelfDependency(u32),
}

/// A dependency graph keyed by task sequence number
#[derive(Debug, Default)]
pub struct PredecessorGraph {
    /// Edges run from predecessor to dependent
    graph: DiGraph<u32, ()>,

    node_map: HashMap<u32, NodeIndex>,
}

impl PredecessorGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from the live tasks of a plan
    ///
    /// Links that cannot be added (unknown task, self link, cycle) are
    /// skipped and returned alongside the graph.
    pub fn from_tasks(tasks: &[Task]) -> (Self, Vec<GraphError>) {
        let mut graph = Self::new();
        let mut errors = Vec::new();

        let live: Vec<&Task> = tasks.iter().filter(|t| t.is_live()).collect();

        // First pass: add all nodes
        for task in &live {
            graph.add_task(task.sequence);
        }

        // Second pass: add all edges
        for task in &live {
            for pred in task.predecessors.iter() {
                if let Err(err) = graph.add_dependency(task.sequence, pred) {
                    errors.push(err);
                }
            }
        }

        (graph, errors)
    }

    /// Returns every live task that sits on a predecessor cycle
    ///
    /// Unlike [`from_tasks`](Self::from_tasks), all resolvable links are
    /// kept here, so each member of a cyclic component is found and not only
    /// the task whose link closed it.
    pub fn cyclic_tasks(tasks: &[Task]) -> HashSet<u32> {
        let mut graph: DiGraph<u32, ()> = DiGraph::new();
        let mut node_map = HashMap::new();

        let live: Vec<&Task> = tasks.iter().filter(|t| t.is_live()).collect();
        for task in &live {
            node_map.insert(task.sequence, graph.add_node(task.sequence));
        }
        for task in &live {
            for pred in task.predecessors.iter() {
                let from = node_map.get(&pred).copied();
                let to = node_map.get(&task.sequence).copied();
                if let (Some(from), Some(to)) = (from, to) {
                    if from != to {
                        graph.update_edge(from, to, ());
                    }
                }
            }
        }

        tarjan_scc(&graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .flatten()
            .filter_map(|idx| graph.node_weight(idx).copied())
            .collect()
    }

    /// Adds a task node
    pub fn add_task(&mut self, seq: u32) {
        if !self.node_map.contains_key(&seq) {
            let idx = self.graph.add_node(seq);
            self.node_map.insert(seq, idx);
        }
    }

    /// Adds a link: `task` starts after `predecessor` finishes
    pub fn add_dependency(&mut self, task: u32, predecessor: u32) -> Result<(), GraphError> {
        if task == predecessor {
            return Err(GraphError::SelfDependency(task));
        }

        let task_idx = *self
            .node_map
            .get(&task)
            .ok_or(GraphError::TaskNotFound(task))?;

        let pred_idx = *self
            .node_map
            .get(&predecessor)
            .ok_or(GraphError::TaskNotFound(predecessor))?;

        if self.graph.find_edge(pred_idx, task_idx).is_some() {
            return Ok(());
        }

        let edge = self.graph.add_edge(pred_idx, task_idx, ());

        if is_cyclic_directed(&self.graph) {
            self.graph.remove_edge(edge);
            return Err(GraphError::CycleDetected(task, predecessor));
        }

        Ok(())
    }

    /// Returns the direct predecessors of a task
    pub fn predecessors(&self, seq: u32) -> Vec<u32> {
        let idx = match self.node_map.get(&seq) {
            Some(idx) => *idx,
            None => return vec![],
        };

        let mut seqs: Vec<u32> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        seqs.sort_unstable();
        seqs
    }

    /// Returns all tasks with predecessors before dependents
    pub fn topological_order(&self) -> Result<Vec<u32>, GraphError> {
        toposort(&self.graph, None)
            .map(|order| {
                order
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).copied())
                    .collect()
            })
            .map_err(|cycle| {
                let seq = self.graph.node_weight(cycle.node_id()).copied().unwrap_or(0);
                GraphError::CycleDetected(seq, seq)
            })
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}
