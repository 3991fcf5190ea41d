//! Shared plumbing for the bulk-synchronous engines.

use std::sync::Arc;

use crate::{cancel::CancellationToken, prepare::PreparedGraph};

/// Per-invocation options common to the iterative engines.
#[derive(Clone, Debug)]
pub(crate) struct EngineOptions {
    /// Safety bound on bulk-synchronous sweeps.
    pub(crate) max_iterations: usize,
    /// Cooperative cancellation flag, polled between sweeps.
    pub(crate) cancel: CancellationToken,
}

/// Initial representatives: the minimum neighbour of each vertex.
///
/// The self-neighbour guarantees a defined minimum and `rep(v) <= v`.
pub(crate) fn initial_representatives(graph: &PreparedGraph) -> Vec<usize> {
    (0..graph.len())
        .map(|vertex| {
            graph
                .neighbours(vertex)
                .iter()
                .copied()
                .min()
                .unwrap_or(vertex)
        })
        .collect()
}

/// Minimum representative over a vertex's neighbour list.
pub(crate) fn min_neighbour_rep(graph: &PreparedGraph, reps: &[usize], vertex: usize) -> usize {
    graph
        .neighbours(vertex)
        .iter()
        .map(|&neighbour| reps[neighbour])
        .min()
        .unwrap_or(reps[vertex])
}

/// Snapshot of a representative vector as a `(uid, representative_uid)` table.
///
/// Attached to `IterationBudgetExceeded` so a stuck run can be inspected.
pub(crate) fn representative_table(graph: &PreparedGraph, reps: &[usize]) -> Arc<[(u64, u64)]> {
    reps.iter()
        .enumerate()
        .map(|(vertex, &rep)| (graph.uid(vertex), graph.uid(rep)))
        .collect()
}
