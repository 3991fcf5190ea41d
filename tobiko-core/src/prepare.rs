//! Graph preparation: canonical symmetric neighbour relation at a threshold.
//!
//! Preparation validates the node and edge tables, keeps the edges active at
//! the requested threshold, and materialises the symmetric neighbour relation
//! as contiguous offset/target vectors over dense vertex indices. Uids are
//! sorted ascending before indexing, so the minimum over dense indices is the
//! minimum over uids and the propagation engines can work purely on indices.
//!
//! Every vertex carries a synthetic self-neighbour, so isolated vertices are
//! representable and the minimum over a neighbour list is always defined.
//! Real self-referencing edges in the input are noise and are dropped.

use std::collections::HashMap;

use crate::{
    error::{Result, TobikoError},
    graph::{Edge, Node},
};

/// Validated input graph in dense-index form.
///
/// `offsets`/`targets` hold the neighbour relation in compressed sparse row
/// form, self-loop included, one entry per direction. `edges` keeps the
/// active undirected edges once each in `(low, high)` form for the
/// contraction engine and the validation harness.
#[derive(Clone, Debug)]
pub(crate) struct PreparedGraph {
    uids: Vec<u64>,
    offsets: Vec<usize>,
    targets: Vec<usize>,
    edges: Vec<(usize, usize)>,
}

impl PreparedGraph {
    /// Validates the input tables and builds the thresholded relation.
    ///
    /// Edges are validated in full before thresholding: an edge referencing
    /// an unknown uid is rejected even when its probability is below the
    /// threshold, and probabilities outside `[0, 1]` are rejected outright.
    pub(crate) fn build(nodes: &[Node], edges: &[Edge], threshold: f64) -> Result<Self> {
        validate_threshold(threshold)?;

        let mut uids: Vec<u64> = nodes.iter().map(|node| node.uid()).collect();
        uids.sort_unstable();
        if let Some(pair) = uids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(TobikoError::DuplicateVertex { uid: pair[0] });
        }

        let index: HashMap<u64, usize> = uids
            .iter()
            .enumerate()
            .map(|(dense, &uid)| (uid, dense))
            .collect();

        let mut active: Vec<(usize, usize)> = Vec::new();
        for edge in edges {
            let left = resolve(&index, edge, edge.uid_l())?;
            let right = resolve(&index, edge, edge.uid_r())?;
            let probability = edge.match_probability();
            if !(0.0..=1.0).contains(&probability) {
                return Err(TobikoError::InvalidProbability {
                    uid_l: edge.uid_l(),
                    uid_r: edge.uid_r(),
                    value: probability,
                });
            }
            if edge.uid_l() != edge.uid_r() && probability >= threshold {
                active.push((left.min(right), left.max(right)));
            }
        }
        active.sort_unstable();
        active.dedup();

        let vertex_count = uids.len();
        let mut degree = vec![1usize; vertex_count];
        for &(left, right) in &active {
            degree[left] += 1;
            degree[right] += 1;
        }

        let mut offsets = Vec::with_capacity(vertex_count + 1);
        let mut total = 0usize;
        offsets.push(0);
        for &count in &degree {
            total += count;
            offsets.push(total);
        }

        let mut targets = vec![0usize; total];
        let mut cursor: Vec<usize> = offsets[..vertex_count].to_vec();
        for (vertex, slot) in cursor.iter_mut().enumerate() {
            targets[*slot] = vertex;
            *slot += 1;
        }
        for &(left, right) in &active {
            targets[cursor[left]] = right;
            cursor[left] += 1;
            targets[cursor[right]] = left;
            cursor[right] += 1;
        }

        Ok(Self {
            uids,
            offsets,
            targets,
            edges: active,
        })
    }

    /// Number of vertices.
    pub(crate) fn len(&self) -> usize {
        self.uids.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    /// Uid of the vertex at a dense index.
    pub(crate) fn uid(&self, vertex: usize) -> u64 {
        self.uids[vertex]
    }

    /// All uids in ascending order; dense index order matches this order.
    pub(crate) fn uids(&self) -> &[u64] {
        &self.uids
    }

    /// Neighbour list of a vertex, self-loop included.
    pub(crate) fn neighbours(&self, vertex: usize) -> &[usize] {
        &self.targets[self.offsets[vertex]..self.offsets[vertex + 1]]
    }

    /// Active undirected edges, once each, in `(low, high)` dense form.
    pub(crate) fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }
}

fn validate_threshold(threshold: f64) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(TobikoError::InvalidThreshold { value: threshold })
    }
}

fn resolve(index: &HashMap<u64, usize>, edge: &Edge, uid: u64) -> Result<usize> {
    index
        .get(&uid)
        .copied()
        .ok_or(TobikoError::DanglingEdge {
            uid_l: edge.uid_l(),
            uid_r: edge.uid_r(),
            missing: uid,
        })
}
