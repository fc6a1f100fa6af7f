//! Task-set configuration loading.
//!
//! The expected YAML structure is:
//! ```yaml
//! mode_period: 20000          # needed only by slot-based tasks
//! limits:
//!   max_hyperperiod: 3600000000
//!   max_invocations: 1000000
//! tasks:
//!   - name: sensor
//!     period: 10000
//!     let: 3000
//!     offset: 0
//!     inputs: [raw]
//!     outputs: [filtered]
//!   - name: actuator
//!     frequency: 4
//!     slots: "1-2|3-4"
//!     inputs: [cmd]
//!     outputs: [pwm]
//! ```
//!
//! A task gives either `period` (with `let` and `offset` defaulting to 0) or
//! `frequency` (with `slots` defaulting to [`DEFAULT_SLOTS`]).

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::hyperperiod::DEFAULT_HYPERPERIOD_LIMIT;
use crate::schedule::{ScheduleBuilder, ScheduleError, ScheduleLimits, DEFAULT_INVOCATION_LIMIT};
use crate::slots::{SlotSelection, DEFAULT_SLOTS};
use crate::task::{PortSet, TaskDescriptor};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
///
/// Kept private: callers work with [`TaskSet`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskSetFile {
    mode_period: Option<u64>,
    limits: Option<LimitsEntry>,
    #[serde(default)]
    tasks: Vec<TaskEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LimitsEntry {
    #[serde(default = "default_max_hyperperiod")]
    max_hyperperiod: u64,
    #[serde(default = "default_max_invocations")]
    max_invocations: u64,
}

fn default_max_hyperperiod() -> u64 {
    DEFAULT_HYPERPERIOD_LIMIT
}

fn default_max_invocations() -> u64 {
    DEFAULT_INVOCATION_LIMIT
}

/// Per-task fields as they appear in the YAML file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskEntry {
    name: String,
    period: Option<u64>,
    #[serde(rename = "let")]
    let_ticks: Option<u64>,
    offset: Option<u64>,
    frequency: Option<u32>,
    slots: Option<String>,
    #[serde(default)]
    inputs: Vec<String>,
    #[serde(default)]
    outputs: Vec<String>,
}

impl TaskEntry {
    fn into_descriptor(self, mode_period: Option<u64>) -> Result<TaskDescriptor<PortSet>> {
        let (period, let_ticks, offset) = match (self.period, self.frequency) {
            (Some(_), Some(_)) => {
                bail!("task '{}': give either 'period' or 'frequency', not both", self.name)
            }
            (None, None) => {
                bail!("task '{}': one of 'period' or 'frequency' is required", self.name)
            }
            (Some(period), None) => {
                if self.slots.is_some() {
                    bail!("task '{}': 'slots' needs 'frequency'", self.name);
                }
                (period, self.let_ticks.unwrap_or(0), self.offset.unwrap_or(0))
            }
            (None, Some(frequency)) => {
                if self.let_ticks.is_some() || self.offset.is_some() {
                    bail!(
                        "task '{}': 'let' and 'offset' are derived from 'slots' when 'frequency' is set",
                        self.name
                    );
                }
                let Some(mode_period) = mode_period else {
                    bail!("task '{}': slot-based timing needs a top-level 'mode_period'", self.name);
                };
                let selection = self.slots.as_deref().unwrap_or(DEFAULT_SLOTS);
                let timing = SlotSelection::parse(selection, frequency)
                    .and_then(|s| s.let_timing(mode_period))
                    .with_context(|| format!("task '{}': invalid slot selection", self.name))?;
                debug!(
                    task = %self.name,
                    selection,
                    frequency,
                    period = timing.period,
                    let_ticks = timing.let_ticks,
                    offset = timing.offset,
                    "Derived LET timing from slots"
                );
                (timing.period, timing.let_ticks, timing.offset)
            }
        };

        let work = PortSet::named(&self.name, self.inputs, self.outputs);
        Ok(TaskDescriptor::new(self.name, period, let_ticks, offset, work))
    }
}

// ── TaskSet ───────────────────────────────────────────────────────────────────

/// Task descriptors and build limits loaded from a task-set file.
#[derive(Debug, Clone)]
pub struct TaskSet {
    /// Tasks in file order; this is the order they are added to a builder.
    pub tasks: Vec<TaskDescriptor<PortSet>>,
    pub limits: ScheduleLimits,
    pub mode_period: Option<u64>,
}

impl TaskSet {
    /// Reads and parses the task-set file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is
    /// structurally invalid, or a task entry is inconsistent.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading task set from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open task-set file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to load task-set file: {}", path.display()))
    }

    /// Parses a task set from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: TaskSetFile =
            serde_yaml::from_str(content).context("Failed to parse task-set YAML")?;

        let limits = file
            .limits
            .map(|l| ScheduleLimits {
                max_hyperperiod: l.max_hyperperiod,
                max_invocations: l.max_invocations,
            })
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let mut tasks = Vec::with_capacity(file.tasks.len());
        for entry in file.tasks {
            if !seen.insert(entry.name.clone()) {
                warn!(task = %entry.name, "Task declared more than once");
            }
            let task = entry.into_descriptor(file.mode_period)?;
            debug!(
                "  Task: {} | period: {} | LET: {} | offset: {} | in: {} | out: {}",
                task.id,
                task.period,
                task.let_ticks,
                task.offset,
                task.work.inputs.len(),
                task.work.outputs.len(),
            );
            tasks.push(task);
        }

        if tasks.is_empty() {
            warn!("No tasks found in task set");
        }

        info!(
            tasks = tasks.len(),
            max_hyperperiod = limits.max_hyperperiod,
            max_invocations = limits.max_invocations,
            "Task set loaded"
        );

        Ok(TaskSet {
            tasks,
            limits,
            mode_period: file.mode_period,
        })
    }

    /// Moves every task, in file order, into a new builder using the loaded
    /// limits.
    pub fn into_builder(self) -> Result<ScheduleBuilder<PortSet>, ScheduleError> {
        let mut builder = ScheduleBuilder::with_limits(self.limits);
        for task in self.tasks {
            builder.add_task(task)?;
        }
        Ok(builder)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::PortId;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    const SAMPLE: &str = r#"
mode_period: 20
limits:
  max_hyperperiod: 1000
  max_invocations: 50
tasks:
  - name: sensor
    period: 10
    let: 3
    offset: 1
    inputs: [raw]
    outputs: [filtered]
  - name: actuator
    frequency: 4
    slots: "1-2|3-4"
    inputs: [cmd]
    outputs: [pwm]
"#;

    // ── load_from_file ────────────────────────────────────────────────────────

    #[test]
    fn load_sample_yaml() {
        let f = yaml_tempfile(SAMPLE);
        let set = TaskSet::load_from_file(f.path()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.mode_period, Some(20));
        assert_eq!(
            set.limits,
            ScheduleLimits {
                max_hyperperiod: 1000,
                max_invocations: 50
            }
        );

        let sensor = &set.tasks[0];
        assert_eq!(sensor.id.as_str(), "sensor");
        assert_eq!((sensor.period, sensor.let_ticks, sensor.offset), (10, 3, 1));
        assert_eq!(sensor.work.inputs, vec![PortId::new("sensor", "raw")]);
        assert_eq!(sensor.work.outputs, vec![PortId::new("sensor", "filtered")]);

        // 20 / 4 = 5 ticks per slot, two-slot invocations every two slots.
        let actuator = &set.tasks[1];
        assert_eq!(
            (actuator.period, actuator.let_ticks, actuator.offset),
            (10, 10, 0)
        );
    }

    #[test]
    fn missing_file_returns_error() {
        assert!(TaskSet::load_from_file(Path::new("/nonexistent/path/tasks.yaml")).is_err());
    }

    #[test]
    fn malformed_yaml_returns_error() {
        let f = yaml_tempfile("this is: not: valid: yaml: content:::");
        assert!(TaskSet::load_from_file(f.path()).is_err());
    }

    // ── from_yaml_str: defaults ───────────────────────────────────────────────

    #[test]
    fn optional_fields_use_defaults_when_absent() {
        let set = TaskSet::from_yaml_str("tasks:\n  - name: t\n    period: 8\n").unwrap();
        let t = &set.tasks[0];
        assert_eq!((t.period, t.let_ticks, t.offset), (8, 0, 0));
        assert!(t.work.inputs.is_empty());
        assert!(t.work.outputs.is_empty());
        assert_eq!(set.limits, ScheduleLimits::default());
        assert_eq!(set.mode_period, None);
    }

    #[test]
    fn partial_limits_keep_other_default() {
        let yaml = "limits:\n  max_invocations: 7\ntasks: []\n";
        let set = TaskSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set.limits.max_invocations, 7);
        assert_eq!(set.limits.max_hyperperiod, DEFAULT_HYPERPERIOD_LIMIT);
    }

    #[test]
    fn frequency_without_slots_runs_every_slot() {
        let yaml = "mode_period: 40\ntasks:\n  - name: t\n    frequency: 4\n";
        let set = TaskSet::from_yaml_str(yaml).unwrap();
        let t = &set.tasks[0];
        assert_eq!((t.period, t.let_ticks, t.offset), (10, 10, 0));
    }

    #[test]
    fn empty_task_list_is_accepted() {
        let set = TaskSet::from_yaml_str("tasks: []\n").unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn duplicate_names_are_kept() {
        let yaml = "tasks:\n  - name: a\n    period: 4\n  - name: a\n    period: 6\n";
        let set = TaskSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set.len(), 2);
    }

    // ── from_yaml_str: rejected entries ───────────────────────────────────────

    #[test]
    fn period_and_frequency_together_is_error() {
        let yaml = "mode_period: 8\ntasks:\n  - name: t\n    period: 4\n    frequency: 2\n";
        assert!(TaskSet::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn neither_period_nor_frequency_is_error() {
        assert!(TaskSet::from_yaml_str("tasks:\n  - name: t\n").is_err());
    }

    #[test]
    fn slots_without_mode_period_is_error() {
        let yaml = "tasks:\n  - name: t\n    frequency: 2\n";
        let err = TaskSet::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("mode_period"));
    }

    #[test]
    fn explicit_let_with_frequency_is_error() {
        let yaml = "mode_period: 8\ntasks:\n  - name: t\n    frequency: 2\n    let: 1\n";
        assert!(TaskSet::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn non_periodic_slots_are_error() {
        let yaml = "mode_period: 8\ntasks:\n  - name: t\n    frequency: 4\n    slots: \"1|3-4\"\n";
        assert!(TaskSet::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn unknown_field_is_error() {
        let yaml = "tasks:\n  - name: t\n    period: 4\n    priority: 3\n";
        assert!(TaskSet::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn shipped_demo_task_set_loads_and_builds() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/task_set.yaml");
        let set = TaskSet::load_from_file(&path).unwrap();

        let timing: Vec<_> = set
            .tasks
            .iter()
            .map(|t| (t.id.as_str(), t.period, t.let_ticks, t.offset))
            .collect();
        assert_eq!(
            timing,
            vec![
                ("sensor", 5000, 1000, 0),
                ("controller", 10000, 4000, 1000),
                ("actuator", 10000, 5000, 5000),
                ("logger", 20000, 20000, 0),
            ]
        );
        assert!(set.tasks[3].work.outputs.is_empty());

        let mut builder = set.into_builder().unwrap();
        assert!(builder.lint().is_empty());
        let table = builder.build_schedule().unwrap();
        assert_eq!(table.hyperperiod(), 20000);
        assert_eq!(table.release_instants(&"sensor".into()), vec![0, 5000, 10000, 15000]);
        assert_eq!(table.commit_instants(&"actuator".into()), vec![0, 10000]);
    }

    // ── into_builder ──────────────────────────────────────────────────────────

    #[test]
    fn into_builder_preserves_order_and_limits() {
        let set = TaskSet::from_yaml_str(SAMPLE).unwrap();
        let builder = set.into_builder().unwrap();
        let names: Vec<_> = builder.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(names, vec!["sensor", "actuator"]);
        assert_eq!(builder.limits().max_invocations, 50);
    }

    #[test]
    fn loaded_set_builds_a_schedule() {
        let mut builder = TaskSet::from_yaml_str(SAMPLE)
            .unwrap()
            .into_builder()
            .unwrap();
        let table = builder.build_schedule().unwrap();
        assert_eq!(table.hyperperiod(), 10);
        assert_eq!(table.release_instants(&"sensor".into()), vec![1]);
        assert_eq!(table.commit_instants(&"sensor".into()), vec![4]);
        // LET == period == H: release and commit share instant 0.
        assert_eq!(table.release_instants(&"actuator".into()), vec![0]);
        assert_eq!(table.commit_instants(&"actuator".into()), vec![0]);
    }
}
