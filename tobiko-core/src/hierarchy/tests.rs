//! Unit tests for the hierarchical threshold driver.

use super::{run_layers, stability::stable_clusters};
use crate::{
    Edge, Node, TobikoError,
    cancel::CancellationToken,
    engine::EngineOptions,
    error::Result,
    prepare::PreparedGraph,
    propagate,
    result::{Assignment, Clustering},
};

fn nodes(uids: &[u64]) -> Vec<Node> {
    uids.iter().copied().map(Node::new).collect()
}

fn propagate_at(nodes: &[Node], edges: &[Edge], threshold: f64) -> Result<Clustering> {
    let graph = PreparedGraph::build(nodes, edges, threshold)?;
    let options = EngineOptions {
        max_iterations: 64,
        cancel: CancellationToken::new(),
    };
    let reps = propagate::run(&graph, &options)?;
    Ok(Clustering::from_assignments(
        reps.iter()
            .enumerate()
            .map(|(vertex, &rep)| Assignment::new(graph.uid(vertex), graph.uid(rep)))
            .collect(),
    ))
}

fn labels_of(clustering: &Clustering) -> Vec<(u64, u64)> {
    clustering
        .assignments()
        .iter()
        .map(|row| (row.uid(), row.cluster_id()))
        .collect()
}

#[test]
fn levels_split_as_the_threshold_rises() {
    let nodes = nodes(&[0, 1, 2]);
    let edges = [Edge::new(0, 1, 0.6), Edge::new(1, 2, 0.4)];
    let levels = run_layers(&nodes, &edges, &[0.3, 0.5, 0.7], false, propagate_at)
        .expect("layered run must succeed");

    assert_eq!(levels.len(), 3);
    assert_eq!(levels[0].threshold(), 0.3);
    assert_eq!(labels_of(levels[0].clustering()), vec![(0, 0), (1, 0), (2, 0)]);
    assert_eq!(labels_of(levels[1].clustering()), vec![(0, 0), (1, 0), (2, 2)]);
    assert_eq!(labels_of(levels[2].clustering()), vec![(0, 0), (1, 1), (2, 2)]);
}

#[test]
fn each_level_matches_the_flat_result() {
    let nodes = nodes(&[0, 1, 2, 3, 4, 5]);
    let edges = [
        Edge::new(0, 1, 0.9),
        Edge::new(1, 2, 0.7),
        Edge::new(2, 3, 0.5),
        Edge::new(3, 4, 0.3),
        Edge::new(4, 5, 0.8),
    ];
    let thresholds = [0.2, 0.4, 0.6, 0.8];
    let levels = run_layers(&nodes, &edges, &thresholds, false, propagate_at)
        .expect("layered run must succeed");

    for level in &levels {
        let flat = propagate_at(&nodes, &edges, level.threshold()).expect("flat run must succeed");
        assert_eq!(
            level.clustering().assignments(),
            flat.assignments(),
            "level at {} diverged from the flat result",
            level.threshold()
        );
    }
}

#[test]
fn descending_input_is_reported_in_caller_order() {
    let nodes = nodes(&[0, 1, 2]);
    let edges = [Edge::new(0, 1, 0.6), Edge::new(1, 2, 0.4)];
    let levels = run_layers(&nodes, &edges, &[0.7, 0.5, 0.3], false, propagate_at)
        .expect("layered run must succeed");

    let thresholds: Vec<f64> = levels.iter().map(|level| level.threshold()).collect();
    assert_eq!(thresholds, vec![0.7, 0.5, 0.3]);
    assert_eq!(levels[0].clustering().cluster_count(), 3);
    assert_eq!(levels[2].clustering().cluster_count(), 1);
}

#[test]
fn tight_clusters_are_promoted_without_reclustering() {
    // Two triangles joined by a weak bridge. The merged component is unstable
    // at 0.7 (the bridge sits inside it), but after the 0.7 split both
    // triangles certify stable for the 0.8 level and are promoted unchanged.
    let nodes = nodes(&[0, 1, 2, 3, 4, 5]);
    let edges = [
        Edge::new(0, 1, 0.9),
        Edge::new(1, 2, 0.9),
        Edge::new(0, 2, 0.9),
        Edge::new(2, 3, 0.6),
        Edge::new(3, 4, 0.9),
        Edge::new(4, 5, 0.9),
        Edge::new(3, 5, 0.9),
    ];

    let levels = run_layers(&nodes, &edges, &[0.5, 0.7, 0.8], false, propagate_at)
        .expect("layered run must succeed");
    assert_eq!(
        labels_of(levels[0].clustering()),
        vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0)]
    );
    let split = vec![(0, 0), (1, 0), (2, 0), (3, 3), (4, 3), (5, 3)];
    assert_eq!(labels_of(levels[1].clustering()), split);
    assert_eq!(labels_of(levels[2].clustering()), split);

    // The certificate itself: nothing survives 0.5 → 0.7, both triangles
    // survive 0.7 → 0.8.
    let merged = labels_of(levels[0].clustering()).into_iter().collect();
    assert!(stable_clusters(&edges, &merged, 0.7, false).is_empty());
    let at_07 = labels_of(levels[1].clustering()).into_iter().collect();
    let stable = stable_clusters(&edges, &at_07, 0.8, false);
    assert!(stable.contains(&0));
    assert!(stable.contains(&3));
}

#[test]
fn engine_errors_carry_the_failing_threshold() {
    let nodes = nodes(&[0, 1]);
    let edges = [Edge::new(0, 1, 0.9)];
    let result = run_layers(&nodes, &edges, &[0.3, 0.6], false, |n, e, t| {
        if t > 0.5 {
            Err(TobikoError::Cancelled)
        } else {
            propagate_at(n, e, t)
        }
    });

    match result {
        Err(TobikoError::ThresholdFailure { threshold, source }) => {
            assert_eq!(threshold, 0.6);
            assert_eq!(*source, TobikoError::Cancelled);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn non_monotone_sequences_are_rejected() {
    let nodes = nodes(&[0]);
    let repeated = run_layers(&nodes, &[], &[0.3, 0.3], false, propagate_at);
    assert!(matches!(
        repeated,
        Err(TobikoError::InvalidThreshold { value }) if value == 0.3
    ));

    let zigzag = run_layers(&nodes, &[], &[0.3, 0.5, 0.4], false, propagate_at);
    assert!(matches!(
        zigzag,
        Err(TobikoError::InvalidThreshold { value }) if value == 0.4
    ));
}

#[test]
fn empty_sequence_yields_no_levels() {
    let levels = run_layers(&nodes(&[0]), &[], &[], false, propagate_at)
        .expect("empty sequence must be a no-op");
    assert!(levels.is_empty());
}
