/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the Timpani-TT schedule builder.
//!
//! ```text
//! YAML task set ──(config)──►  TaskDescriptor<W>  ──(schedule)──►  ScheduleTable<W>  ──►  dispatcher
//!                               ↑ input                              ↑ output
//!                               immutable timing + work handle       time-indexed action buckets
//! ```
//!
//! # Ownership model
//! A `TaskDescriptor` is built once per task and then **moved** into the
//! [`ScheduleBuilder`](crate::schedule::ScheduleBuilder).  The work handle is
//! an `Arc<W>` so the produced table can name the same handle at every
//! release instant without copying the underlying work.

use std::fmt;
use std::sync::Arc;

// ── Identity ──────────────────────────────────────────────────────────────────

/// Name of a task.  Action labels in the schedule table are qualified by it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(name: impl Into<String>) -> Self {
        TaskId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

/// Port identifier, qualified by the owning task (`"task.port"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortId {
    pub task: TaskId,
    pub name: String,
}

impl PortId {
    pub fn new(task: impl Into<String>, name: impl Into<String>) -> Self {
        PortId {
            task: TaskId(task.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.task, self.name)
    }
}

// ── Work capability ───────────────────────────────────────────────────────────

/// The thing a task executes.
///
/// The schedule builder only enumerates ports to populate the action lists;
/// invoking the body is left to whoever walks the produced table.
pub trait TaskWork {
    /// Port handle type recorded in the schedule table.
    type Port: Clone + fmt::Debug + PartialEq;

    /// Input ports, in latch order.
    fn inputs(&self) -> &[Self::Port];

    /// Output ports, in commit order.
    fn outputs(&self) -> &[Self::Port];
}

/// Declarative work handle: just the ports, no behaviour.
///
/// Used by the YAML loader and the CLI, where tasks are described rather than
/// linked against real code.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PortSet {
    pub inputs: Vec<PortId>,
    pub outputs: Vec<PortId>,
}

impl PortSet {
    /// Build a port set for `task` from bare port names.
    pub fn named<I, O, S, T>(task: &str, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator<Item = S>,
        O: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        PortSet {
            inputs: inputs.into_iter().map(|p| PortId::new(task, p)).collect(),
            outputs: outputs.into_iter().map(|p| PortId::new(task, p)).collect(),
        }
    }
}

impl TaskWork for PortSet {
    type Port = PortId;

    fn inputs(&self) -> &[PortId] {
        &self.inputs
    }

    fn outputs(&self) -> &[PortId] {
        &self.outputs
    }
}

// ── TaskDescriptor ────────────────────────────────────────────────────────────

/// Timing parameters of one periodic LET task plus its work handle.
///
/// All times are integer ticks at the smallest time resolution of the
/// system, so the hyperperiod LCM stays exact.
///
/// Nothing is validated here: a zero `period` is rejected by the builder,
/// `let_ticks > period` and `offset >= period` are only reported by
/// [`lint_tasks`](crate::schedule::lint::lint_tasks).
#[derive(Debug)]
pub struct TaskDescriptor<W> {
    pub id: TaskId,

    /// Invocation period in ticks.
    pub period: u64,

    /// Logical execution time in ticks.
    pub let_ticks: u64,

    /// First release instant in ticks.
    pub offset: u64,

    pub work: Arc<W>,
}

impl<W> TaskDescriptor<W> {
    pub fn new(id: impl Into<TaskId>, period: u64, let_ticks: u64, offset: u64, work: W) -> Self {
        Self::with_shared_work(id, period, let_ticks, offset, Arc::new(work))
    }

    /// Like [`new`](Self::new) but for a handle the caller already shares.
    pub fn with_shared_work(
        id: impl Into<TaskId>,
        period: u64,
        let_ticks: u64,
        offset: u64,
        work: Arc<W>,
    ) -> Self {
        TaskDescriptor {
            id: id.into(),
            period,
            let_ticks,
            offset,
            work,
        }
    }
}

// Manual impl: cloning only bumps the Arc, W itself need not be Clone.
impl<W> Clone for TaskDescriptor<W> {
    fn clone(&self) -> Self {
        TaskDescriptor {
            id: self.id.clone(),
            period: self.period,
            let_ticks: self.let_ticks,
            offset: self.offset,
            work: Arc::clone(&self.work),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
