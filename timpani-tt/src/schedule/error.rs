/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for schedule construction.
//!
//! Every variant is returned synchronously from
//! [`build_schedule`](super::build_schedule); no partial table is ever
//! produced alongside an error.
//!
//! | Variant | Meaning |
//! |---|---|
//! | `NoTasks` | empty task set |
//! | `ZeroPeriod` | a task with `period == 0` |
//! | `PeriodOverflow` | the LCM fold left the `u64` range |
//! | `HyperperiodTooLarge` | LCM above `ScheduleLimits::max_hyperperiod` |
//! | `TooManyInvocations` | table would exceed `ScheduleLimits::max_invocations` |
//! | `AlreadyBuilt` | `add_task` after `build_schedule` |

use thiserror::Error;

use crate::hyperperiod::HyperperiodError;
use crate::task::TaskId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// `build_schedule()` was called with an empty task set.
    #[error("no tasks provided: task set is empty")]
    NoTasks,

    /// A task declares a zero invocation period.
    ///
    /// A zero period collapses the LCM to zero, which would otherwise
    /// produce an empty schedule without complaint.
    #[error("task '{task}' has a zero invocation period")]
    ZeroPeriod { task: TaskId },

    /// The LCM of the task periods does not fit in 64 bits.
    ///
    /// `a` is the running LCM and `b` the period being folded in.
    #[error("hyperperiod overflow computing lcm({a}, {b})")]
    PeriodOverflow { a: u64, b: u64 },

    /// The hyperperiod exceeds the configured limit.
    #[error("hyperperiod {value} ticks exceeds limit {limit} ticks")]
    HyperperiodTooLarge { value: u64, limit: u64 },

    /// The table would hold more task releases than the configured limit.
    #[error("schedule needs {count} task releases per hyperperiod, limit is {limit}")]
    TooManyInvocations { count: u64, limit: u64 },

    /// `add_task()` was called on a builder whose schedule is already built.
    #[error("cannot add task '{task}': schedule already built")]
    AlreadyBuilt { task: TaskId },
}

impl From<HyperperiodError> for ScheduleError {
    fn from(e: HyperperiodError) -> Self {
        match e {
            HyperperiodError::NoValidPeriods => ScheduleError::NoTasks,
            HyperperiodError::Overflow { a, b } => ScheduleError::PeriodOverflow { a, b },
            HyperperiodError::TooLarge { value, limit } => {
                ScheduleError::HyperperiodTooLarge { value, limit }
            }
        }
    }
}
