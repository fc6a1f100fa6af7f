//! Time-triggered schedule construction for LET task sets.
//!
//! [`build_schedule`] turns a set of [`TaskDescriptor`]s into a
//! [`ScheduleTable`]: for every release `j = offset + k·period < H` of every
//! task it records
//!
//! * at `j mod H`: an input-update-and-execute action (input ports, then the
//!   work handle), **prepended** to that instant's input updates;
//! * at `(j + let) mod H`: an output-update action (output ports),
//!   **appended** to that instant's output updates.
//!
//! So at a shared release instant the most recently
//! added task latches and runs first, while at a shared end-of-LET instant
//! outputs commit in task-addition order.
//!
//! | Topic | Rust |
//! |---|---|
//! | State | [`ScheduleBuilder`] owns the task list; the build itself is the pure [`build_schedule`] |
//! | Map iteration order | `BTreeMap` keyed by instant, ascending |
//! | Labels | `ActionLabel` enum qualified by `TaskId`, no string concatenation |
//! | Arithmetic | checked LCM, `u128` end-of-LET, checked release stepping |
//! | Error returns | `Result<ScheduleTable, ScheduleError>`, never a partial table |
//!
//! # Example
//! ```rust
//! use timpani_tt::schedule::ScheduleBuilder;
//! use timpani_tt::task::{PortSet, TaskDescriptor};
//!
//! let mut builder = ScheduleBuilder::new();
//! builder
//!     .add_task(TaskDescriptor::new("a", 4, 1, 0, PortSet::named("a", ["in"], ["out"])))
//!     .unwrap();
//! builder
//!     .add_task(TaskDescriptor::new("b", 6, 2, 0, PortSet::named("b", ["in"], ["out"])))
//!     .unwrap();
//!
//! let table = builder.build_schedule().unwrap();
//! assert_eq!(table.hyperperiod(), 12);
//! assert_eq!(table.release_instants(&"a".into()), vec![0, 4, 8]);
//! ```

pub mod error;
pub mod lint;
pub mod table;

pub use error::ScheduleError;
pub use table::{Action, ActionBucket, ActionLabel, Participant, ScheduleDump, ScheduleTable};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::hyperperiod::{calculate_hyperperiod, DEFAULT_HYPERPERIOD_LIMIT};
use crate::task::{TaskDescriptor, TaskWork};

use lint::lint_against;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default cap on task releases per hyperperiod (summed over all tasks).
pub const DEFAULT_INVOCATION_LIMIT: u64 = 1_000_000;

// ── Limits ────────────────────────────────────────────────────────────────────

/// Capacity bounds checked before the table is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleLimits {
    /// Largest accepted hyperperiod, in ticks.
    pub max_hyperperiod: u64,

    /// Largest accepted number of task releases in one hyperperiod.
    pub max_invocations: u64,
}

impl Default for ScheduleLimits {
    fn default() -> Self {
        ScheduleLimits {
            max_hyperperiod: DEFAULT_HYPERPERIOD_LIMIT,
            max_invocations: DEFAULT_INVOCATION_LIMIT,
        }
    }
}

/// Number of releases `offset + k·period < hyperperiod`, `k ≥ 0`.
///
/// `period` must be non-zero.
fn releases_within(offset: u64, period: u64, hyperperiod: u64) -> u64 {
    if offset >= hyperperiod {
        0
    } else {
        (hyperperiod - offset - 1) / period + 1
    }
}

// ── build_schedule ────────────────────────────────────────────────────────────

/// Build the schedule table for `tasks` in one synchronous pass.
///
/// Tasks are processed in slice order, which is what the prepend/append
/// ordering of shared instants is defined against.
///
/// # Errors
/// * [`ScheduleError::NoTasks`] – `tasks` is empty.
/// * [`ScheduleError::ZeroPeriod`] – a task has `period == 0`.
/// * [`ScheduleError::PeriodOverflow`] – the LCM does not fit in `u64`.
/// * [`ScheduleError::HyperperiodTooLarge`] – LCM above `limits.max_hyperperiod`.
/// * [`ScheduleError::TooManyInvocations`] – releases above `limits.max_invocations`.
pub fn build_schedule<W: TaskWork>(
    tasks: &[TaskDescriptor<W>],
    limits: &ScheduleLimits,
) -> Result<ScheduleTable<W>, ScheduleError> {
    // ── Preconditions ─────────────────────────────────────────────────────────
    if tasks.is_empty() {
        return Err(ScheduleError::NoTasks);
    }
    if let Some(task) = tasks.iter().find(|t| t.period == 0) {
        return Err(ScheduleError::ZeroPeriod {
            task: task.id.clone(),
        });
    }

    // ── Hyperperiod ───────────────────────────────────────────────────────────
    let periods: Vec<u64> = tasks.iter().map(|t| t.period).collect();
    let hyperperiod = calculate_hyperperiod(&periods, limits.max_hyperperiod)?.hyperperiod;

    // ── Capacity ──────────────────────────────────────────────────────────────
    let total = tasks.iter().fold(0u64, |acc, t| {
        acc.saturating_add(releases_within(t.offset, t.period, hyperperiod))
    });
    if total > limits.max_invocations {
        warn!(
            releases = total,
            limit = limits.max_invocations,
            hyperperiod,
            "Schedule exceeds release limit"
        );
        return Err(ScheduleError::TooManyInvocations {
            count: total,
            limit: limits.max_invocations,
        });
    }

    for finding in lint_against(tasks, Some(hyperperiod)) {
        warn!(%finding, "questionable task timing");
    }

    info!(
        task_count = tasks.len(),
        hyperperiod,
        releases = total,
        "=== build_schedule() ==="
    );

    // ── Per-task scheduling ───────────────────────────────────────────────────
    let mut table = ScheduleTable::new(hyperperiod);

    for task in tasks {
        let mut release = task.offset;
        let mut count = 0u64;

        while release < hyperperiod {
            let start_of_let = release % hyperperiod;
            let end_of_let =
                ((u128::from(release) + u128::from(task.let_ticks)) % u128::from(hyperperiod)) as u64;

            table
                .bucket_mut(start_of_let)
                .prepend_input_update(input_update_action(task));
            table
                .bucket_mut(end_of_let)
                .append_output_update(output_update_action(task));

            count += 1;
            release = match release.checked_add(task.period) {
                Some(next) => next,
                None => break,
            };
        }

        debug!(
            task = %task.id,
            period = task.period,
            let_ticks = task.let_ticks,
            offset = task.offset,
            releases = count,
            "task scheduled"
        );
    }

    info!(
        instants = table.len(),
        actions = table.action_count(),
        "=== Schedule built ==="
    );

    Ok(table)
}

/// Input ports in enumeration order, followed by the work handle.
fn input_update_action<W: TaskWork>(task: &TaskDescriptor<W>) -> Action<W> {
    let participants = task
        .work
        .inputs()
        .iter()
        .cloned()
        .map(Participant::InputPort)
        .chain(std::iter::once(Participant::Invoke {
            task: task.id.clone(),
            work: Arc::clone(&task.work),
        }))
        .collect();

    Action {
        label: ActionLabel::InputUpdateAndExecute(task.id.clone()),
        participants,
    }
}

fn output_update_action<W: TaskWork>(task: &TaskDescriptor<W>) -> Action<W> {
    Action {
        label: ActionLabel::OutputUpdate(task.id.clone()),
        participants: task
            .work
            .outputs()
            .iter()
            .cloned()
            .map(Participant::OutputPort)
            .collect(),
    }
}

// ── ScheduleBuilder ───────────────────────────────────────────────────────────

/// Lifecycle of a [`ScheduleBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    /// No task added yet.
    Empty,
    /// At least one task added, no schedule built yet.
    Accumulating,
    /// A schedule has been built; the task set is frozen.
    Built,
}

/// Accumulates task descriptors and builds the schedule table from them.
///
/// ```text
/// Empty ──add_task──► Accumulating ──build_schedule──► Built
///                       ▲      │                        │
///                       └──────┘ add_task               └── build_schedule (recompute)
/// ```
///
/// The builder holds no locks.  Callers registering tasks from several
/// threads must serialise access themselves (e.g. a `Mutex` around the
/// builder), or build the task list first and call [`build_schedule`]
/// directly.
pub struct ScheduleBuilder<W: TaskWork> {
    tasks: Vec<TaskDescriptor<W>>,
    limits: ScheduleLimits,
    state: BuilderState,
}

impl<W: TaskWork> ScheduleBuilder<W> {
    /// Create an empty builder with [`ScheduleLimits::default`].
    pub fn new() -> Self {
        Self::with_limits(ScheduleLimits::default())
    }

    /// Create an empty builder with custom capacity limits.
    pub fn with_limits(limits: ScheduleLimits) -> Self {
        ScheduleBuilder {
            tasks: Vec::new(),
            limits,
            state: BuilderState::Empty,
        }
    }

    /// Append `task` to the task set.  No uniqueness check is made.
    ///
    /// # Errors
    /// [`ScheduleError::AlreadyBuilt`] once a schedule has been built.
    pub fn add_task(&mut self, task: TaskDescriptor<W>) -> Result<(), ScheduleError> {
        if self.state == BuilderState::Built {
            return Err(ScheduleError::AlreadyBuilt { task: task.id });
        }
        debug!(
            task = %task.id,
            period = task.period,
            let_ticks = task.let_ticks,
            offset = task.offset,
            "task added"
        );
        self.tasks.push(task);
        self.state = BuilderState::Accumulating;
        Ok(())
    }

    /// Build the schedule from the current task set.
    ///
    /// Calling this again recomputes from scratch; with an unchanged task set
    /// the tables are equal.  The task list itself is never modified.  On
    /// error the state is left unchanged.
    pub fn build_schedule(&mut self) -> Result<ScheduleTable<W>, ScheduleError> {
        let table = build_schedule(&self.tasks, &self.limits)?;
        self.state = BuilderState::Built;
        Ok(table)
    }

    /// Warning-only timing checks for the current task set.
    pub fn lint(&self) -> Vec<lint::DescriptorWarning> {
        lint::lint_tasks(&self.tasks)
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn limits(&self) -> &ScheduleLimits {
        &self.limits
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[TaskDescriptor<W>] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<W: TaskWork> Default for ScheduleBuilder<W> {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
