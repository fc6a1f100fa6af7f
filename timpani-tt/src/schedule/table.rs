/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The time-indexed action table produced by the schedule builder.
//!
//! ```text
//! ScheduleTable
//! └── instant (u64, ascending) ──► ActionBucket
//!                                   ├── output updates   [A out, B out]            (appended)
//!                                   └── input updates    [B in + invoke, A in + invoke]  (prepended)
//! ```
//!
//! Action labels are a tagged enum qualified by [`TaskId`], so two tasks can
//! never share a label list and nothing has to be parsed back out of a
//! string.
//!
//! # Dispatch order
//! [`ActionBucket::actions`] yields output updates first, then input updates:
//! a task released at `t` must observe outputs committed by a task whose LET
//! ends at `t`.  Consumers wanting another interleaving can read
//! [`ActionBucket::output_updates`] and [`ActionBucket::input_updates`]
//! separately.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::task::{TaskId, TaskWork};

// ── ActionLabel ───────────────────────────────────────────────────────────────

/// What kind of action a bucket entry is, and for which task.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionLabel {
    /// Latch the task's input ports, then invoke its body.
    InputUpdateAndExecute(TaskId),
    /// Commit the task's output ports.
    OutputUpdate(TaskId),
}

impl ActionLabel {
    pub fn task(&self) -> &TaskId {
        match self {
            ActionLabel::InputUpdateAndExecute(t) | ActionLabel::OutputUpdate(t) => t,
        }
    }

    pub fn is_input_update(&self) -> bool {
        matches!(self, ActionLabel::InputUpdateAndExecute(_))
    }
}

impl fmt::Display for ActionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionLabel::InputUpdateAndExecute(t) => write!(f, "{t} input-update-and-execute"),
            ActionLabel::OutputUpdate(t) => write!(f, "{t} output-update"),
        }
    }
}

// ── Participant ───────────────────────────────────────────────────────────────

/// One entry of an action list: a port to latch/commit or a body to invoke.
pub enum Participant<W: TaskWork> {
    InputPort(W::Port),
    Invoke { task: TaskId, work: Arc<W> },
    OutputPort(W::Port),
}

impl<W: TaskWork> Participant<W> {
    /// The port this participant refers to, if any.
    pub fn port(&self) -> Option<&W::Port> {
        match self {
            Participant::InputPort(p) | Participant::OutputPort(p) => Some(p),
            Participant::Invoke { .. } => None,
        }
    }

    /// `true` if this is the invocation of `task`'s body.
    pub fn invokes(&self, task: &TaskId) -> bool {
        matches!(self, Participant::Invoke { task: t, .. } if t == task)
    }
}

impl<W: TaskWork> Clone for Participant<W> {
    fn clone(&self) -> Self {
        match self {
            Participant::InputPort(p) => Participant::InputPort(p.clone()),
            Participant::Invoke { task, work } => Participant::Invoke {
                task: task.clone(),
                work: Arc::clone(work),
            },
            Participant::OutputPort(p) => Participant::OutputPort(p.clone()),
        }
    }
}

/// Work handles compare by identity: two invocations are equal only if they
/// name the same task and the same `Arc`.
impl<W: TaskWork> PartialEq for Participant<W> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Participant::InputPort(a), Participant::InputPort(b)) => a == b,
            (Participant::OutputPort(a), Participant::OutputPort(b)) => a == b,
            (
                Participant::Invoke { task: ta, work: wa },
                Participant::Invoke { task: tb, work: wb },
            ) => ta == tb && Arc::ptr_eq(wa, wb),
            _ => false,
        }
    }
}

impl<W: TaskWork> fmt::Debug for Participant<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::InputPort(p) => f.debug_tuple("InputPort").field(p).finish(),
            Participant::Invoke { task, .. } => {
                f.debug_struct("Invoke").field("task", task).finish_non_exhaustive()
            }
            Participant::OutputPort(p) => f.debug_tuple("OutputPort").field(p).finish(),
        }
    }
}

impl<W> fmt::Display for Participant<W>
where
    W: TaskWork,
    W::Port: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::InputPort(p) | Participant::OutputPort(p) => write!(f, "{p}"),
            Participant::Invoke { task, .. } => write!(f, "invoke({task})"),
        }
    }
}

// ── Action ────────────────────────────────────────────────────────────────────

/// A labelled, ordered participant list.
pub struct Action<W: TaskWork> {
    pub label: ActionLabel,
    pub participants: Vec<Participant<W>>,
}

impl<W: TaskWork> Clone for Action<W> {
    fn clone(&self) -> Self {
        Action {
            label: self.label.clone(),
            participants: self.participants.clone(),
        }
    }
}

impl<W: TaskWork> PartialEq for Action<W> {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label && self.participants == other.participants
    }
}

impl<W: TaskWork> fmt::Debug for Action<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label)
            .field("participants", &self.participants)
            .finish()
    }
}

// ── ActionBucket ──────────────────────────────────────────────────────────────

/// Everything scheduled at one instant.
pub struct ActionBucket<W: TaskWork> {
    /// Most recently added task first.
    input_updates: VecDeque<Action<W>>,
    /// Task-addition order.
    output_updates: Vec<Action<W>>,
}

impl<W: TaskWork> ActionBucket<W> {
    pub(crate) fn new() -> Self {
        ActionBucket {
            input_updates: VecDeque::new(),
            output_updates: Vec::new(),
        }
    }

    /// Insert at the front: later tasks latch and run before earlier ones.
    ///
    /// A label already present at this instant (two tasks sharing a name)
    /// keeps its position; the new participants are spliced in ahead of the
    /// existing ones.
    pub(crate) fn prepend_input_update(&mut self, action: Action<W>) {
        debug_assert!(action.label.is_input_update());
        match self.input_updates.iter_mut().find(|a| a.label == action.label) {
            Some(existing) => {
                existing.participants.splice(0..0, action.participants);
            }
            None => self.input_updates.push_front(action),
        }
    }

    /// Insert at the back: outputs commit in task-addition order.
    ///
    /// A label already present at this instant is extended in place.
    pub(crate) fn append_output_update(&mut self, action: Action<W>) {
        debug_assert!(!action.label.is_input_update());
        match self.output_updates.iter_mut().find(|a| a.label == action.label) {
            Some(existing) => existing.participants.extend(action.participants),
            None => self.output_updates.push(action),
        }
    }

    pub fn input_updates(&self) -> impl Iterator<Item = &Action<W>> {
        self.input_updates.iter()
    }

    pub fn output_updates(&self) -> &[Action<W>] {
        &self.output_updates
    }

    /// All actions in dispatch order: output updates, then input updates.
    pub fn actions(&self) -> impl Iterator<Item = &Action<W>> {
        self.output_updates.iter().chain(self.input_updates.iter())
    }

    /// Participant list recorded under `label`, if any.
    pub fn get(&self, label: &ActionLabel) -> Option<&[Participant<W>]> {
        self.actions()
            .find(|a| &a.label == label)
            .map(|a| a.participants.as_slice())
    }

    /// Labels in dispatch order.
    pub fn labels(&self) -> impl Iterator<Item = &ActionLabel> {
        self.actions().map(|a| &a.label)
    }

    /// Number of actions (labels) in this bucket.
    pub fn len(&self) -> usize {
        self.input_updates.len() + self.output_updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<W: TaskWork> Clone for ActionBucket<W> {
    fn clone(&self) -> Self {
        ActionBucket {
            input_updates: self.input_updates.clone(),
            output_updates: self.output_updates.clone(),
        }
    }
}

impl<W: TaskWork> PartialEq for ActionBucket<W> {
    fn eq(&self, other: &Self) -> bool {
        self.input_updates == other.input_updates && self.output_updates == other.output_updates
    }
}

impl<W: TaskWork> fmt::Debug for ActionBucket<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionBucket")
            .field("output_updates", &self.output_updates)
            .field("input_updates", &self.input_updates)
            .finish()
    }
}

// ── ScheduleTable ─────────────────────────────────────────────────────────────

/// Complete schedule for one hyperperiod, keyed by instant.
///
/// `BTreeMap` so iteration is always in ascending instant order, which is
/// what a dispatcher walking the cycle needs.
pub struct ScheduleTable<W: TaskWork> {
    hyperperiod: u64,
    buckets: BTreeMap<u64, ActionBucket<W>>,
}

impl<W: TaskWork> ScheduleTable<W> {
    pub(crate) fn new(hyperperiod: u64) -> Self {
        ScheduleTable {
            hyperperiod,
            buckets: BTreeMap::new(),
        }
    }

    /// Get-or-create the bucket at `instant`.
    pub(crate) fn bucket_mut(&mut self, instant: u64) -> &mut ActionBucket<W> {
        self.buckets.entry(instant).or_insert_with(ActionBucket::new)
    }

    /// Length of the cycle this table covers, in ticks.
    pub fn hyperperiod(&self) -> u64 {
        self.hyperperiod
    }

    pub fn get(&self, instant: u64) -> Option<&ActionBucket<W>> {
        self.buckets.get(&instant)
    }

    /// Buckets in ascending instant order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &ActionBucket<W>)> {
        self.buckets.iter().map(|(&t, b)| (t, b))
    }

    /// Instants that carry at least one action, ascending.
    pub fn instants(&self) -> impl Iterator<Item = u64> + '_ {
        self.buckets.keys().copied()
    }

    /// Number of distinct instants.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of labelled actions across all instants.
    pub fn action_count(&self) -> usize {
        self.buckets.values().map(ActionBucket::len).sum()
    }

    /// Instants at which `task` latches inputs and runs, ascending.
    pub fn release_instants(&self, task: &TaskId) -> Vec<u64> {
        self.instants_with(&ActionLabel::InputUpdateAndExecute(task.clone()))
    }

    /// Instants at which `task` commits outputs, ascending.
    pub fn commit_instants(&self, task: &TaskId) -> Vec<u64> {
        self.instants_with(&ActionLabel::OutputUpdate(task.clone()))
    }

    fn instants_with(&self, label: &ActionLabel) -> Vec<u64> {
        self.iter()
            .filter(|(_, b)| b.get(label).is_some())
            .map(|(t, _)| t)
            .collect()
    }
}

impl<W> ScheduleTable<W>
where
    W: TaskWork,
    W::Port: fmt::Display,
{
    /// Flatten into plain strings for serialisation.
    pub fn to_dump(&self) -> ScheduleDump {
        ScheduleDump {
            hyperperiod: self.hyperperiod,
            instants: self
                .iter()
                .map(|(at, bucket)| InstantDump {
                    at,
                    actions: bucket
                        .actions()
                        .map(|a| ActionDump {
                            label: a.label.to_string(),
                            participants: a.participants.iter().map(|p| p.to_string()).collect(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl<W: TaskWork> Clone for ScheduleTable<W> {
    fn clone(&self) -> Self {
        ScheduleTable {
            hyperperiod: self.hyperperiod,
            buckets: self.buckets.clone(),
        }
    }
}

impl<W: TaskWork> PartialEq for ScheduleTable<W> {
    fn eq(&self, other: &Self) -> bool {
        self.hyperperiod == other.hyperperiod && self.buckets == other.buckets
    }
}

impl<W: TaskWork> fmt::Debug for ScheduleTable<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleTable")
            .field("hyperperiod", &self.hyperperiod)
            .field("buckets", &self.buckets)
            .finish()
    }
}

impl<W> fmt::Display for ScheduleTable<W>
where
    W: TaskWork,
    W::Port: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "hyperperiod: {} ticks", self.hyperperiod)?;
        for (at, bucket) in self.iter() {
            writeln!(f, "@{at}")?;
            for action in bucket.actions() {
                let list: Vec<String> = action.participants.iter().map(|p| p.to_string()).collect();
                writeln!(f, "  {}: [{}]", action.label, list.join(", "))?;
            }
        }
        Ok(())
    }
}

// ── Serialisable dump ─────────────────────────────────────────────────────────

/// String-only view of a [`ScheduleTable`], for YAML output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDump {
    pub hyperperiod: u64,
    pub instants: Vec<InstantDump>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstantDump {
    pub at: u64,
    pub actions: Vec<ActionDump>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDump {
    pub label: String,
    pub participants: Vec<String>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
