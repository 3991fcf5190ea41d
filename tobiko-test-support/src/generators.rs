//! Random graph generators producing node and edge tables.
//!
//! Generators return plain `(uid, uid, probability)` tables in the shape the
//! engines consume, so suites in any crate can build their own input types
//! without this crate depending on them. All randomness flows through a
//! seeded [`SmallRng`], keeping generated fixtures reproducible.

use rand::{Rng, SeedableRng, rngs::SmallRng};

/// A generated node table plus edge table.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedGraph {
    /// Vertex uids, dense from zero.
    pub nodes: Vec<u64>,
    /// Edges as `(uid_l, uid_r, match_probability)` rows.
    pub edges: Vec<(u64, u64, f64)>,
}

/// A path graph `0 — 1 — … — (length − 1)` with deterministic edges.
///
/// Chains maximise component diameter, which makes them the worst case for
/// diffusion-based engines and a good fixture for iteration-budget tests.
///
/// # Examples
/// ```
/// use tobiko_test_support::generators::chain_graph;
///
/// let graph = chain_graph(4);
/// assert_eq!(graph.nodes, vec![0, 1, 2, 3]);
/// assert_eq!(graph.edges.len(), 3);
/// ```
#[must_use]
pub fn chain_graph(length: u64) -> GeneratedGraph {
    GeneratedGraph {
        nodes: (0..length).collect(),
        edges: (0..length.saturating_sub(1))
            .map(|uid| (uid, uid + 1, 1.0))
            .collect(),
    }
}

/// A random graph with uniformly distributed match probabilities.
///
/// Draws `edge_count` endpoint pairs uniformly; pairs that land on the same
/// vertex are skipped rather than re-drawn, matching the behaviour of the
/// edge tables the engines are designed against, so the edge table can be
/// slightly shorter than requested. Probabilities are uniform in `[0, 1)`.
///
/// # Examples
/// ```
/// use tobiko_test_support::generators::uniform_probability_graph;
///
/// let graph = uniform_probability_graph(100, 300, 42);
/// assert_eq!(graph.nodes.len(), 100);
/// assert!(graph.edges.len() <= 300);
/// assert!(graph.edges.iter().all(|&(_, _, p)| (0.0..1.0).contains(&p)));
/// ```
#[must_use]
pub fn uniform_probability_graph(
    node_count: u64,
    edge_count: usize,
    seed: u64,
) -> GeneratedGraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = Vec::with_capacity(edge_count);
    for _ in 0..edge_count {
        let uid_l = rng.gen_range(0..node_count);
        let uid_r = rng.gen_range(0..node_count);
        if uid_l != uid_r {
            edges.push((uid_l, uid_r, rng.gen_range(0.0..1.0)));
        }
    }
    GeneratedGraph {
        nodes: (0..node_count).collect(),
        edges,
    }
}

/// A sparse Erdős–Rényi graph: each unordered pair joined with fixed
/// probability.
///
/// Edges are deterministic (probability `1.0`), so the component structure is
/// controlled entirely by `edge_probability`. Small values give the scattered
/// many-component graphs that exercise frontier tracking and contraction on
/// something other than chains.
///
/// # Panics
/// Panics when `edge_probability` is outside `[0, 1]`.
///
/// # Examples
/// ```
/// use tobiko_test_support::generators::sparse_random_graph;
///
/// let graph = sparse_random_graph(20, 0.05, 42);
/// assert_eq!(graph.nodes.len(), 20);
/// assert!(graph.edges.iter().all(|&(l, r, p)| l < r && p == 1.0));
/// ```
#[must_use]
pub fn sparse_random_graph(node_count: u64, edge_probability: f64, seed: u64) -> GeneratedGraph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for uid_l in 0..node_count {
        for uid_r in (uid_l + 1)..node_count {
            if rng.gen_bool(edge_probability) {
                edges.push((uid_l, uid_r, 1.0));
            }
        }
    }
    GeneratedGraph {
        nodes: (0..node_count).collect(),
        edges,
    }
}
