//! Task domain model
//!
//! A plan is a flat, ordered list of tasks. The hierarchy is implicit: a
//! task's parent is the nearest preceding live task one level shallower.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use super::dates::{DateError, DatePatch, DateTriple};
use super::id::TaskId;

/// Finish-to-start predecessor references, by sequence number
///
/// Textual form is a comma-separated list such as `"1,3"`. Parsing is
/// lenient: non-numeric tokens and the `0` sentinel ("no predecessor") are
/// ignored, duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predecessors(Vec<u32>);

impl Predecessors {
    /// Creates an empty reference list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a list from sequence numbers, dropping zeros and duplicates
    pub fn from_seqs(seqs: impl IntoIterator<Item = u32>) -> Self {
        let mut list = Self::new();
        for seq in seqs {
            list.add(seq);
        }
        list
    }

    /// Parses the comma-separated form
    pub fn parse(s: &str) -> Self {
        Self::from_seqs(s.split(',').filter_map(|token| token.trim().parse::<u32>().ok()))
    }

    /// Adds a reference, returning false for zeros and duplicates
    pub fn add(&mut self, seq: u32) -> bool {
        if seq == 0 || self.0.contains(&seq) {
            return false;
        }
        self.0.push(seq);
        true
    }

    /// Returns true if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over referenced sequence numbers
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Shifts every reference at or after `from` up by one (row inserted at `from`)
    pub fn shift_from(&mut self, from: u32) {
        for seq in &mut self.0 {
            if *seq >= from {
                *seq += 1;
            }
        }
    }

    /// Drops references to `removed` and closes the gap above it
    pub fn close_gap(&mut self, removed: u32) {
        self.0.retain(|seq| *seq != removed);
        for seq in &mut self.0 {
            if *seq > removed {
                *seq -= 1;
            }
        }
    }

    /// Exchanges references to two sequence numbers (rows swapped)
    pub fn swap(&mut self, a: u32, b: u32) {
        for seq in &mut self.0 {
            if *seq == a {
                *seq = b;
            } else if *seq == b {
                *seq = a;
            }
        }
    }
}

impl fmt::Display for Predecessors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|seq| seq.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl FromStr for Predecessors {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for Predecessors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Always serialize as the comma-separated form
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Predecessors {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{SeqAccess, Visitor};

        struct PredecessorsVisitor;

        impl<'de> Visitor<'de> for PredecessorsVisitor {
            type Value = Predecessors;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a comma-separated string or a sequence of numbers")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(Predecessors::parse(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let seq = u32::try_from(value).map_err(E::custom)?;
                Ok(Predecessors::from_seqs([seq]))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let seq = u32::try_from(value).map_err(E::custom)?;
                Ok(Predecessors::from_seqs([seq]))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                // Hand-edited files may use [1, 2] or ["1", "2"]
                let mut list = Predecessors::new();
                while let Some(value) = seq.next_element::<serde_json::Value>()? {
                    match value {
                        serde_json::Value::Number(n) => {
                            let seq = n
                                .as_u64()
                                .and_then(|n| u32::try_from(n).ok())
                                .ok_or_else(|| serde::de::Error::custom("invalid sequence number"))?;
                            list.add(seq);
                        }
                        serde_json::Value::String(s) => {
                            for seq in Predecessors::parse(&s).iter() {
                                list.add(seq);
                            }
                        }
                        _ => {
                            return Err(serde::de::Error::custom(
                                "expected number or string for predecessor",
                            ))
                        }
                    }
                }
                Ok(list)
            }
        }

        deserializer.deserialize_any(PredecessorsVisitor)
    }
}

fn is_false(val: &bool) -> bool {
    !*val
}

/// A task in a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// 1-based position among live tasks (siNo)
    pub sequence: u32,

    /// Dotted work breakdown code, derived from order and level
    #[serde(default)]
    pub wbs: String,

    /// Nesting depth, 0 for top-level tasks
    #[serde(default)]
    pub level: u32,

    /// Human-readable name
    pub name: String,

    /// Finish-to-start predecessors by sequence number
    #[serde(default, skip_serializing_if = "Predecessors::is_empty")]
    pub predecessors: Predecessors,

    /// Baseline schedule
    #[serde(default, skip_serializing_if = "DateTriple::is_empty")]
    pub planned: DateTriple,

    /// Recorded progress
    #[serde(default, skip_serializing_if = "DateTriple::is_empty")]
    pub actual: DateTriple,

    /// True when the next live task is one level deeper
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_parent: bool,

    /// Soft-delete flag
    #[serde(default, skip_serializing_if = "is_false")]
    pub deleted: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new top-level task with the given ID and name
    pub fn new(id: TaskId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            sequence: 0,
            wbs: String::new(),
            level: 0,
            name: name.into(),
            predecessors: Predecessors::new(),
            planned: DateTriple::default(),
            actual: DateTriple::default(),
            is_parent: false,
            deleted: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Returns true unless the task has been soft-deleted
    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// Planned end, if known
    pub fn planned_end(&self) -> Option<NaiveDate> {
        self.planned.end
    }

    /// Marks the task as deleted
    pub fn soft_delete(&mut self) {
        if !self.deleted {
            let now = Utc::now();
            self.deleted = true;
            self.deleted_at = Some(now);
            self.is_parent = false;
            self.updated_at = now;
        }
    }

    /// Merges a patch into the task, reconciling both date triples
    ///
    /// The task is left untouched if either triple fails to reconcile.
    pub fn apply_patch(&mut self, patch: &TaskPatch) -> Result<(), DateError> {
        let planned = self.planned.merge(&patch.planned).reconcile()?;
        let actual = self.actual.merge(&patch.actual).reconcile()?;

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(predecessors) = &patch.predecessors {
            self.predecessors = predecessors.clone();
        }
        self.planned = planned;
        self.actual = actual;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Partial update of a task's editable fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub predecessors: Option<Predecessors>,
    pub planned: DatePatch,
    pub actual: DatePatch,
}

impl TaskPatch {
    /// Returns true if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.predecessors.is_none()
            && self.planned.is_empty()
            && self.actual.is_empty()
    }

    /// Returns true if the patch can affect predecessor scheduling
    pub fn touches_schedule(&self) -> bool {
        self.predecessors.is_some() || !self.planned.is_empty()
    }
}
