/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Warning-only timing checks for task descriptors.
//!
//! The builder does not reject these configurations: it schedules them
//! exactly as the release/LET formulae dictate.  They are reported so that a
//! task set which *probably* contains a mistake does not go unnoticed.
//!
//! | Finding | Effect on the table |
//! |---|---|
//! | `LetExceedsPeriod` | a release's outputs commit after the next release latches inputs |
//! | `OffsetNotBelowPeriod` | fewer than `H / period` releases per hyperperiod |
//! | `NoReleaseInHyperperiod` | the task never appears in the table |
//! | `DuplicateTask` | two tasks share a label; their participants merge into one list per instant |
//!
//! Zero periods are not reported here, they are a hard build error.

use std::collections::BTreeSet;
use std::fmt;

use crate::hyperperiod::math::lcm_fold;
use crate::task::{TaskDescriptor, TaskId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorWarning {
    LetExceedsPeriod {
        task: TaskId,
        let_ticks: u64,
        period: u64,
    },
    OffsetNotBelowPeriod {
        task: TaskId,
        offset: u64,
        period: u64,
    },
    NoReleaseInHyperperiod {
        task: TaskId,
        offset: u64,
        hyperperiod: u64,
    },
    DuplicateTask { task: TaskId },
}

impl fmt::Display for DescriptorWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorWarning::LetExceedsPeriod {
                task,
                let_ticks,
                period,
            } => write!(f, "task '{task}': LET {let_ticks} exceeds period {period}"),
            DescriptorWarning::OffsetNotBelowPeriod {
                task,
                offset,
                period,
            } => write!(f, "task '{task}': offset {offset} is not below period {period}"),
            DescriptorWarning::NoReleaseInHyperperiod {
                task,
                offset,
                hyperperiod,
            } => write!(
                f,
                "task '{task}': offset {offset} is beyond hyperperiod {hyperperiod}, task is never released"
            ),
            DescriptorWarning::DuplicateTask { task } => {
                write!(f, "task '{task}' is declared more than once")
            }
        }
    }
}

/// Check `tasks`, computing the hyperperiod on the way.
///
/// If the hyperperiod cannot be computed (zero period, overflow) the
/// hyperperiod-dependent check is skipped.
pub fn lint_tasks<W>(tasks: &[TaskDescriptor<W>]) -> Vec<DescriptorWarning> {
    let hyperperiod = if tasks.iter().any(|t| t.period == 0) {
        None
    } else {
        lcm_fold(tasks.iter().map(|t| t.period))
            .ok()
            .filter(|&h| h > 0)
    };
    lint_against(tasks, hyperperiod)
}

/// Check `tasks` against an already known hyperperiod.
pub(crate) fn lint_against<W>(
    tasks: &[TaskDescriptor<W>],
    hyperperiod: Option<u64>,
) -> Vec<DescriptorWarning> {
    let mut findings = Vec::new();
    let mut seen = BTreeSet::new();

    for task in tasks {
        if !seen.insert(&task.id) {
            findings.push(DescriptorWarning::DuplicateTask {
                task: task.id.clone(),
            });
        }
        if task.period == 0 {
            continue;
        }
        if task.let_ticks > task.period {
            findings.push(DescriptorWarning::LetExceedsPeriod {
                task: task.id.clone(),
                let_ticks: task.let_ticks,
                period: task.period,
            });
        }
        match hyperperiod {
            Some(h) if task.offset >= h => {
                findings.push(DescriptorWarning::NoReleaseInHyperperiod {
                    task: task.id.clone(),
                    offset: task.offset,
                    hyperperiod: h,
                });
            }
            _ if task.offset >= task.period => {
                findings.push(DescriptorWarning::OffsetNotBelowPeriod {
                    task: task.id.clone(),
                    offset: task.offset,
                    period: task.period,
                });
            }
            _ => {}
        }
    }

    findings
}

// ── Tests ─────────────────────────────────────────────────────────────────────
