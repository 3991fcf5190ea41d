//! Tests for the CLI command pipeline.

use std::io::Cursor;

use clap::Parser;
use rstest::rstest;
use tempfile::NamedTempFile;

use super::{Cli, CliError, render_summary, run_cli};

fn table(content: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file must be created");
    std::fs::write(file.path(), content).expect("temp file must be writable");
    file
}

fn parse(args: &[&str]) -> Cli {
    Cli::parse_from(args)
}

fn rendered(summary: &super::ExecutionSummary) -> String {
    let mut buffer = Cursor::new(Vec::new());
    render_summary(summary, &mut buffer).expect("rendering must succeed");
    String::from_utf8(buffer.into_inner()).expect("output must be UTF-8")
}

#[test]
fn runs_an_edge_table_at_the_default_threshold() {
    let edges = table("0,1,0.9\n1,2,0.4\n2,3,0.8\n");
    let path = edges.path().display().to_string();
    let summary = run_cli(parse(&["tobiko", "run", path.as_str()])).expect("run must succeed");

    assert_eq!(summary.levels.len(), 1);
    assert_eq!(summary.levels[0].clustering().cluster_count(), 2);
    assert_eq!(rendered(&summary), "0,0\n1,0\n2,2\n3,2\n");
}

#[test]
fn rows_without_probability_are_deterministic() {
    let edges = table("0,1\n1,2\n");
    let path = edges.path().display().to_string();
    let summary =
        run_cli(parse(&["tobiko", "run", path.as_str(), "--threshold", "1.0"])).expect("run must succeed");
    assert_eq!(summary.levels[0].clustering().cluster_count(), 1);
}

#[test]
fn a_node_table_brings_isolated_vertices_into_the_run() {
    let edges = table("0,1,0.9\n");
    let nodes = table("0\n1\n2\n");
    let edges_path = edges.path().display().to_string();
    let nodes_path = nodes.path().display().to_string();
    let summary = run_cli(parse(&[
        "tobiko", "run", edges_path.as_str(), "--nodes", nodes_path.as_str(),
    ]))
    .expect("run must succeed");
    assert_eq!(summary.levels[0].clustering().len(), 3);
    assert_eq!(summary.levels[0].clustering().cluster_count(), 2);
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let edges = table("# header\n\n0,1,0.9\n");
    let path = edges.path().display().to_string();
    let summary = run_cli(parse(&["tobiko", "run", path.as_str()])).expect("run must succeed");
    assert_eq!(summary.levels[0].clustering().len(), 2);
}

#[test]
fn hierarchical_output_is_prefixed_with_thresholds() {
    let edges = table("0,1,0.6\n1,2,0.4\n");
    let path = edges.path().display().to_string();
    let summary = run_cli(parse(&[
        "tobiko", "run", path.as_str(), "--at", "0.3", "--at", "0.5",
    ]))
    .expect("run must succeed");

    assert_eq!(summary.levels.len(), 2);
    let output = rendered(&summary);
    assert!(output.starts_with("0.3,"));
    assert!(output.contains("0.5,"));
}

#[rstest]
#[case::bad_uid("x,1,0.9\n", 1)]
#[case::bad_probability("0,1,maybe\n", 1)]
#[case::wrong_shape("0\n", 1)]
#[case::later_line("0,1,0.9\n0,1,0.9,extra\n", 2)]
fn malformed_rows_are_rejected_with_line_numbers(#[case] content: &str, #[case] line: usize) {
    let edges = table(content);
    let path = edges.path().display().to_string();
    let err = run_cli(parse(&["tobiko", "run", path.as_str()])).expect_err("run must fail");
    match err {
        CliError::Parse { line: reported, .. } => assert_eq!(reported, line),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_files_surface_io_errors() {
    let err = run_cli(parse(&["tobiko", "run", "/no/such/table.csv"]))
        .expect_err("run must fail");
    assert!(matches!(err, CliError::Io { .. }));
}

#[test]
fn validation_passes_on_engine_output() {
    let edges = table("0,1,0.9\n2,3,0.8\n");
    let path = edges.path().display().to_string();
    let summary = run_cli(parse(&[
        "tobiko",
        "run",
        path.as_str(),
        "--engine",
        "random-contraction",
        "--seed",
        "9",
        "--validate",
    ]))
    .expect("run must succeed");
    assert_eq!(summary.levels[0].clustering().cluster_count(), 2);
}

#[test]
fn core_errors_are_propagated() {
    let edges = table("0,1,0.9\n");
    let path = edges.path().display().to_string();
    let err = run_cli(parse(&["tobiko", "run", path.as_str(), "--threshold", "1.5"]))
        .expect_err("run must fail");
    assert!(matches!(err, CliError::Core(_)));
}
