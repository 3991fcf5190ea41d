//! Label-propagation union-find: bulk-synchronous min-label diffusion.
//!
//! Each vertex starts labelled with its minimum neighbour and every sweep
//! replaces each label with the minimum label over the neighbour list. The
//! fixed point labels every vertex with the minimum uid of its connected
//! component. A sweep reads only the previous iteration's labels; the next
//! iterate is built in a second buffer and the buffers are swapped at the end
//! of the sweep.
//!
//! Convergence: labels are non-increasing per sweep and bounded below, so a
//! fixed point is reached within the effective diameter of each component.
//! A label that increases indicates a broken neighbour relation and aborts
//! the run.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::{
    engine::{self, EngineOptions},
    error::{Result, TobikoError},
    prepare::PreparedGraph,
};

/// Runs min-label diffusion to its fixed point.
///
/// Returns, for every dense vertex, the dense index of the minimum-uid vertex
/// of its component.
pub(crate) fn run(graph: &PreparedGraph, options: &EngineOptions) -> Result<Vec<usize>> {
    let mut reps = engine::initial_representatives(graph);
    let mut next = vec![0usize; graph.len()];

    for iteration in 1..=options.max_iterations {
        if options.cancel.is_cancelled() {
            return Err(TobikoError::Cancelled);
        }

        next.par_iter_mut().enumerate().for_each(|(vertex, slot)| {
            *slot = engine::min_neighbour_rep(graph, &reps, vertex);
        });

        let (changes, regressed) = next
            .par_iter()
            .zip(reps.par_iter())
            .fold(
                || (0usize, false),
                |(changes, regressed), (new, old)| {
                    (changes + usize::from(new != old), regressed || new > old)
                },
            )
            .reduce(|| (0usize, false), |left, right| {
                (left.0 + right.0, left.1 || right.1)
            });
        if regressed {
            return Err(TobikoError::EngineFailure {
                detail: Arc::from("representative increased during a propagation sweep"),
            });
        }

        debug!(iteration, changes, "label propagation sweep");
        std::mem::swap(&mut reps, &mut next);
        if changes == 0 {
            return Ok(reps);
        }
    }

    Err(TobikoError::IterationBudgetExceeded {
        max_iterations: options.max_iterations,
        last_known: engine::representative_table(graph, &reps),
    })
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::{
        Edge, Node, TobikoError,
        cancel::CancellationToken,
        engine::EngineOptions,
        prepare::PreparedGraph,
    };

    fn options(max_iterations: usize) -> EngineOptions {
        EngineOptions {
            max_iterations,
            cancel: CancellationToken::new(),
        }
    }

    fn graph(uids: &[u64], edges: &[(u64, u64)]) -> PreparedGraph {
        let nodes: Vec<Node> = uids.iter().copied().map(Node::new).collect();
        let edges: Vec<Edge> = edges
            .iter()
            .map(|&(left, right)| Edge::deterministic(left, right))
            .collect();
        PreparedGraph::build(&nodes, &edges, 0.5).expect("fixture must prepare")
    }

    fn uid_labels(graph: &PreparedGraph, reps: &[usize]) -> Vec<u64> {
        reps.iter().map(|&rep| graph.uid(rep)).collect()
    }

    #[test]
    fn chain_collapses_to_minimum_uid() {
        let edges: Vec<(u64, u64)> = (0..9).map(|v| (v, v + 1)).collect();
        let graph = graph(&(0..10).collect::<Vec<_>>(), &edges);
        let reps = run(&graph, &options(64)).expect("chain must converge");
        assert_eq!(uid_labels(&graph, &reps), vec![0; 10]);
    }

    #[test]
    fn components_get_their_minimum_uid() {
        let graph = graph(&[0, 1, 2, 3, 4], &[(0, 1), (1, 2), (3, 4)]);
        let reps = run(&graph, &options(64)).expect("graph must converge");
        assert_eq!(uid_labels(&graph, &reps), vec![0, 0, 0, 3, 3]);
    }

    #[test]
    fn isolated_vertices_label_themselves() {
        let graph = graph(&[5, 9], &[]);
        let reps = run(&graph, &options(64)).expect("isolated vertices must converge");
        assert_eq!(uid_labels(&graph, &reps), vec![5, 9]);
    }

    #[test]
    fn empty_graph_converges_immediately() {
        let graph = graph(&[], &[]);
        let reps = run(&graph, &options(64)).expect("empty graph must converge");
        assert!(reps.is_empty());
    }

    #[test]
    fn sparse_uids_still_take_the_component_minimum() {
        let graph = graph(&[100, 7, 55], &[(100, 7), (7, 55)]);
        let reps = run(&graph, &options(64)).expect("graph must converge");
        assert_eq!(uid_labels(&graph, &reps), vec![7, 7, 7]);
    }

    #[test]
    fn exhausted_budget_reports_last_representatives() {
        let edges: Vec<(u64, u64)> = (0..9).map(|v| (v, v + 1)).collect();
        let graph = graph(&(0..10).collect::<Vec<_>>(), &edges);
        let err = run(&graph, &options(2)).expect_err("budget must be exhausted");
        match err {
            TobikoError::IterationBudgetExceeded {
                max_iterations,
                last_known,
            } => {
                assert_eq!(max_iterations, 2);
                assert_eq!(last_known.len(), 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn cancellation_is_observed_before_a_sweep() {
        let graph = graph(&[0, 1], &[(0, 1)]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = run(
            &graph,
            &EngineOptions {
                max_iterations: 64,
                cancel,
            },
        );
        assert!(matches!(result, Err(TobikoError::Cancelled)));
    }
}
