//! Command implementations and argument parsing for the tobiko CLI.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tobiko_core::{
    Edge, Engine, MismatchReport, Node, PartitionCheck, ThresholdClustering, Tobiko,
    TobikoBuilder, TobikoError, validate_partition,
};
use tracing::info;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "tobiko", about = "Cluster probabilistically weighted graphs.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster an edge table at one or more thresholds.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to the edge table: one `uid_l,uid_r[,match_probability]` row per
    /// line. Rows without a probability are treated as deterministic.
    pub edges: PathBuf,

    /// Optional node table, one uid per line. Defaults to the set of edge
    /// endpoints, which leaves isolated vertices out of the run.
    #[arg(long)]
    pub nodes: Option<PathBuf>,

    /// Core engine.
    #[arg(long, value_enum, default_value_t = EngineArg::LabelPropagation)]
    pub engine: EngineArg,

    /// Match-probability threshold for a single-level run.
    #[arg(long, default_value_t = 0.5)]
    pub threshold: f64,

    /// Hierarchical mode: repeat once per threshold level.
    #[arg(long = "at")]
    pub at: Vec<f64>,

    /// Use the strict `>` comparator in the stability certificate.
    #[arg(long)]
    pub strict_stability: bool,

    /// Seed for the contraction hash sequence.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Iteration safety bound.
    #[arg(long, default_value_t = 64)]
    pub max_iterations: usize,

    /// Cross-check every level against a reference traversal.
    #[arg(long)]
    pub validate: bool,
}

/// Engine selection exposed on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EngineArg {
    /// Bulk-synchronous min-label diffusion.
    LabelPropagation,
    /// Diffusion restricted to the active frontier.
    ActiveSet,
    /// Randomised star contraction.
    RandomContraction,
}

impl From<EngineArg> for Engine {
    fn from(value: EngineArg) -> Self {
        match value {
            EngineArg::LabelPropagation => Self::LabelPropagation,
            EngineArg::ActiveSet => Self::ActiveSet,
            EngineArg::RandomContraction => Self::RandomContraction,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input table.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// An input table row could not be parsed.
    #[error("`{path}` line {line}: {message}")]
    Parse {
        /// Path of the offending table.
        path: PathBuf,
        /// One-based line number.
        line: usize,
        /// Why the row was rejected.
        message: String,
    },
    /// The reference cross-check rejected a computed level.
    #[error("clustering at threshold {threshold} failed the reference check")]
    ValidationFailed {
        /// The threshold whose level failed.
        threshold: f64,
        /// Structured mismatch description.
        report: MismatchReport,
    },
    /// Core engine failure.
    #[error(transparent)]
    Core(#[from] TobikoError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// One clustering per requested threshold, in request order.
    pub levels: Vec<ThresholdClustering>,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when parsing or execution fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use tobiko_cli::cli::{Cli, run_cli};
/// # use clap::Parser;
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0,1,0.9\n1,2,0.4\n")?;
/// let path = file.path().display().to_string();
/// let cli = Cli::parse_from(["tobiko", "run", path.as_str()]);
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.levels.len(), 1);
/// assert_eq!(summary.levels[0].clustering().cluster_count(), 2);
/// # Ok(())
/// # }
/// ```
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => run_command(run),
    }
}

pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let edges = read_edges(&command.edges)?;
    let nodes = match &command.nodes {
        Some(path) => read_nodes(path)?,
        None => derive_nodes(&edges),
    };

    let mut builder = TobikoBuilder::new()
        .with_engine(command.engine.into())
        .with_threshold(command.threshold)
        .with_strict_stability(command.strict_stability)
        .with_max_iterations(command.max_iterations);
    if let Some(seed) = command.seed {
        builder = builder.with_seed(seed);
    }
    if !command.at.is_empty() {
        builder = builder.with_thresholds(command.at.clone());
    }
    let tobiko = builder.build()?;

    let levels = execute(&tobiko, &command, &nodes, &edges)?;

    if command.validate {
        for level in &levels {
            let check =
                validate_partition(&nodes, &edges, level.threshold(), level.clustering())?;
            if let PartitionCheck::Mismatch(report) = check {
                return Err(CliError::ValidationFailed {
                    threshold: level.threshold(),
                    report,
                });
            }
        }
    }

    for level in &levels {
        let clusters = level.clustering().cluster_count();
        let members = level.clustering().len();
        info!(
            threshold = level.threshold(),
            clusters,
            avg_cluster_size = if clusters == 0 {
                0.0
            } else {
                members as f64 / clusters as f64
            },
            "level complete"
        );
    }

    Ok(ExecutionSummary { levels })
}

fn execute(
    tobiko: &Tobiko,
    command: &RunCommand,
    nodes: &[Node],
    edges: &[Edge],
) -> Result<Vec<ThresholdClustering>, CliError> {
    if command.at.is_empty() {
        let clustering = tobiko.cluster(nodes, edges)?;
        Ok(vec![ThresholdClustering::new(command.threshold, clustering)])
    } else {
        Ok(tobiko.cluster_hierarchical(nodes, edges)?)
    }
}

fn read_nodes(path: &Path) -> Result<Vec<Node>, CliError> {
    let mut nodes = Vec::new();
    for (line, row) in read_rows(path)? {
        let uid = row
            .parse::<u64>()
            .map_err(|err| parse_error(path, line, format!("bad uid `{row}`: {err}")))?;
        nodes.push(Node::new(uid));
    }
    Ok(nodes)
}

fn read_edges(path: &Path) -> Result<Vec<Edge>, CliError> {
    let mut edges = Vec::new();
    for (line, row) in read_rows(path)? {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        let (uid_l, uid_r, probability) = match fields.as_slice() {
            [left, right] => (*left, *right, None),
            [left, right, probability] => (*left, *right, Some(*probability)),
            _ => {
                return Err(parse_error(
                    path,
                    line,
                    format!("expected `uid_l,uid_r[,match_probability]`, got `{row}`"),
                ));
            }
        };
        let uid_l = uid_l
            .parse::<u64>()
            .map_err(|err| parse_error(path, line, format!("bad uid `{uid_l}`: {err}")))?;
        let uid_r = uid_r
            .parse::<u64>()
            .map_err(|err| parse_error(path, line, format!("bad uid `{uid_r}`: {err}")))?;
        let edge = match probability {
            Some(raw) => {
                let value = raw.parse::<f64>().map_err(|err| {
                    parse_error(path, line, format!("bad probability `{raw}`: {err}"))
                })?;
                Edge::new(uid_l, uid_r, value)
            }
            None => Edge::deterministic(uid_l, uid_r),
        };
        edges.push(edge);
    }
    Ok(edges)
}

/// Reads the non-empty, non-comment rows of a table with line numbers.
fn read_rows(path: &Path) -> Result<Vec<(usize, String)>, CliError> {
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rows = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        rows.push((index + 1, trimmed.to_owned()));
    }
    Ok(rows)
}

fn parse_error(path: &Path, line: usize, message: String) -> CliError {
    CliError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    }
}

/// Node table fallback: the distinct endpoints of the edge table.
fn derive_nodes(edges: &[Edge]) -> Vec<Node> {
    let uids: BTreeSet<u64> = edges
        .iter()
        .flat_map(|edge| [edge.uid_l(), edge.uid_r()])
        .collect();
    uids.into_iter().map(Node::new).collect()
}

/// Renders `summary` to `writer` as CSV rows ordered by cluster then uid.
///
/// Single-level runs emit `uid,cluster_id`; hierarchical runs prefix every
/// row with its threshold.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let hierarchical = summary.levels.len() > 1;
    for level in &summary.levels {
        let mut rows: Vec<(u64, u64)> = level
            .clustering()
            .assignments()
            .iter()
            .map(|row| (row.cluster_id(), row.uid()))
            .collect();
        rows.sort_unstable();
        for (cluster_id, uid) in rows {
            if hierarchical {
                writeln!(writer, "{},{uid},{cluster_id}", level.threshold())?;
            } else {
                writeln!(writer, "{uid},{cluster_id}")?;
            }
        }
    }
    Ok(())
}
