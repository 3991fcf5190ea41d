//! Command-line interface orchestration for the tobiko engines.
//!
//! The CLI offers a `run` command that loads a `uid_l,uid_r[,probability]`
//! edge table (and optionally a node table), executes the selected engine at
//! one or more thresholds, and writes `uid,cluster_id` rows to stdout.

mod commands;

pub use commands::{
    Cli, CliError, Command, EngineArg, ExecutionSummary, RunCommand, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
