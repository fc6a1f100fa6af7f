/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timpani-TT – static time-triggered LET schedule builder
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── task/           – task descriptors, ports, the TaskWork handle trait
//! ├── hyperperiod/    – checked GCD / LCM and hyperperiod limit
//! ├── schedule/       – builder, action table, errors, descriptor lint
//! ├── slots/          – slot-selection strings → (period, LET, offset)
//! └── config/         – YAML task-set loading
//! ```

pub mod config;
pub mod hyperperiod;
pub mod schedule;
pub mod slots;
pub mod task;
