//! Randomised parallel contraction connected components.
//!
//! Each level draws a fresh affine hash, turns local hash minima into roots
//! (star contraction), projects the edge set through the chosen
//! representatives, and recurses on the contracted graph. The expected vertex
//! count shrinks by a constant factor per level, so the loop finishes in
//! O(log n) expected levels where plain diffusion needs the component
//! diameter.
//!
//! The per-level representative tables are kept as an ordered list; once the
//! edge set is exhausted, a composition pass walks the list top-down and
//! folds the recorded hashes into a single running affine map so vertices
//! that never merged still receive deterministic labels. Raw labels are hash
//! values; a final pass renames them densely by first occurrence over
//! ascending uids, which also gives isolated vertices collision-free
//! singleton labels.

mod affine;

use std::collections::{HashMap, HashSet};

use rand::{SeedableRng, rngs::SmallRng};
use tracing::debug;

use self::affine::AffineHash;
use crate::{
    cancel::CancellationToken,
    error::{Result, TobikoError},
    prepare::PreparedGraph,
};

/// Sanity bound on contraction levels. Any realistic input finishes far
/// below this; hitting it indicates a broken projection step.
const MAX_LEVELS: usize = 64;

struct Level {
    hash: AffineHash,
    reps: HashMap<u64, u64>,
}

/// Runs star contraction and returns a dense cluster label per vertex.
pub(crate) fn run(
    graph: &PreparedGraph,
    seed: Option<u64>,
    cancel: &CancellationToken,
) -> Result<Vec<u64>> {
    let mut rng = seed.map_or_else(SmallRng::from_entropy, SmallRng::seed_from_u64);

    let mut edges: Vec<(u64, u64)> = Vec::with_capacity(graph.edges().len() * 2);
    for &(left, right) in graph.edges() {
        let uid_l = graph.uid(left);
        let uid_r = graph.uid(right);
        edges.push((uid_l, uid_r));
        edges.push((uid_r, uid_l));
    }

    let mut levels: Vec<Level> = Vec::new();
    while !edges.is_empty() {
        if levels.len() == MAX_LEVELS {
            return Err(TobikoError::ContractionDiverged {
                levels: levels.len(),
            });
        }
        if cancel.is_cancelled() {
            return Err(TobikoError::Cancelled);
        }

        let hash = AffineHash::draw(&mut rng);
        let mut reps: HashMap<u64, u64> = HashMap::new();
        for &(vertex, neighbour) in &edges {
            let candidate = hash.apply(neighbour);
            let entry = reps.entry(vertex).or_insert_with(|| hash.apply(vertex));
            if candidate < *entry {
                *entry = candidate;
            }
        }

        let mut seen: HashSet<(u64, u64)> = HashSet::new();
        let mut contracted: Vec<(u64, u64)> = Vec::new();
        for &(vertex, neighbour) in &edges {
            let rep_v = reps[&vertex];
            let rep_w = reps[&neighbour];
            if rep_v != rep_w && seen.insert((rep_v, rep_w)) {
                contracted.push((rep_v, rep_w));
            }
        }

        debug!(
            level = levels.len() + 1,
            survivors = reps.len(),
            edges = contracted.len(),
            "contraction level complete"
        );
        levels.push(Level { hash, reps });
        edges = contracted;
    }

    let lifted = lift(&levels);
    Ok(canonicalise(graph, &lifted))
}

/// Composes the per-level representative tables into level-0 labels.
///
/// The top level maps every surviving super-vertex to its own representative.
/// Walking downwards, each level's representative either appears in the level
/// above (its label is already known) or vanished from the edge set, in which
/// case its label is what the remaining hash sequence would have named it:
/// the running affine composition applied to the representative.
fn lift(levels: &[Level]) -> HashMap<u64, u64> {
    let Some((top, rest)) = levels.split_last() else {
        return HashMap::new();
    };

    let mut composed = top.reps.clone();
    let mut running = AffineHash::IDENTITY;
    for (index, level) in rest.iter().enumerate().rev() {
        running = running.compose(levels[index + 1].hash);
        let mut next = HashMap::with_capacity(level.reps.len());
        for (&vertex, &rep) in &level.reps {
            let label = composed
                .get(&rep)
                .copied()
                .unwrap_or_else(|| running.apply(rep));
            next.insert(vertex, label);
        }
        composed = next;
    }
    composed
}

/// Renames hash-derived labels to dense ids by first occurrence over
/// ascending uids. Vertices absent from the lift never touched an active
/// edge and become singleton clusters.
fn canonicalise(graph: &PreparedGraph, lifted: &HashMap<u64, u64>) -> Vec<u64> {
    let mut dense: HashMap<(bool, u64), u64> = HashMap::new();
    let mut labels = Vec::with_capacity(graph.len());
    for vertex in 0..graph.len() {
        let uid = graph.uid(vertex);
        let key = lifted
            .get(&uid)
            .map_or((true, uid), |&label| (false, label));
        let next_id = dense.len() as u64;
        let id = *dense.entry(key).or_insert(next_id);
        labels.push(id);
    }
    labels
}
