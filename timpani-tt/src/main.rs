/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{error, info};

use timpani_tt::config::TaskSet;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Timpani-TT static LET schedule builder.
///
/// Example:
///   timpani-tt --taskset demos/task_set.yaml --format yaml
#[derive(Debug, Parser)]
#[command(
    name = "timpani-tt",
    about = "Timpani-TT – builds the time-triggered LET action table for a task set",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML task-set file.
    #[arg(short = 't', long = "taskset")]
    task_set: PathBuf,

    /// Output format for the schedule table.
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Override the hyperperiod limit from the task-set file, in ticks.
    #[arg(long = "max-hyperperiod")]
    max_hyperperiod: Option<u64>,

    /// Override the per-hyperperiod release limit from the task-set file.
    #[arg(long = "max-invocations")]
    max_invocations: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Yaml,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    // Logs go to stderr so the table on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        task_set        = %cli.task_set.display(),
        format          = ?cli.format,
        max_hyperperiod = ?cli.max_hyperperiod,
        max_invocations = ?cli.max_invocations,
        "Configuration"
    );

    match run(&cli) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            error!("Failed to build schedule: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    let mut task_set = TaskSet::load_from_file(&cli.task_set)?;

    if let Some(limit) = cli.max_hyperperiod {
        task_set.limits.max_hyperperiod = limit;
    }
    if let Some(limit) = cli.max_invocations {
        task_set.limits.max_invocations = limit;
    }

    // Descriptor warnings are logged by the build itself.
    let mut builder = task_set.into_builder()?;
    let table = builder.build_schedule()?;
    info!(
        hyperperiod = table.hyperperiod(),
        instants = table.len(),
        actions = table.action_count(),
        "Schedule built"
    );

    match cli.format {
        OutputFormat::Text => Ok(table.to_string()),
        OutputFormat::Yaml => {
            serde_yaml::to_string(&table.to_dump()).context("Failed to render schedule as YAML")
        }
    }
}
