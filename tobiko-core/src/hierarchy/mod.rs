//! Hierarchical threshold driver.
//!
//! Computes clusterings for a strictly monotone sequence of thresholds,
//! reusing earlier levels: a cluster whose internal edges all remain active
//! at the next threshold is promoted unchanged, and only the remaining
//! "in-play" vertices and the edges between them are reclustered. Raising the
//! threshold can only split clusters, and a stable cluster has no active edge
//! to the rest of the graph, so the promoted and reclustered parts are
//! independent subproblems.
//!
//! The driver normalises every level's labels to the minimum uid of each
//! cluster before merging. Promoted labels are minima over stable vertices
//! and fresh labels are minima over in-play vertices, so the two halves can
//! never collide regardless of the engine's native label space.
//!
//! A descending threshold sequence is computed over its ascending order
//! internally and reported back in caller order; descending-specific reuse
//! (relaxation) is out of scope.

mod stability;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::{
    error::{Result, TobikoError},
    graph::{Edge, Node},
    result::{Assignment, Clustering, ThresholdClustering},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Direction {
    Ascending,
    Descending,
}

/// Runs the layered computation, calling `cluster_at` once per level.
pub(crate) fn run_layers<F>(
    nodes: &[Node],
    edges: &[Edge],
    thresholds: &[f64],
    strict_stability: bool,
    mut cluster_at: F,
) -> Result<Vec<ThresholdClustering>>
where
    F: FnMut(&[Node], &[Edge], f64) -> Result<Clustering>,
{
    let Some(direction) = sequence_direction(thresholds)? else {
        return Ok(Vec::new());
    };
    let ascending: Vec<f64> = match direction {
        Direction::Ascending => thresholds.to_vec(),
        Direction::Descending => thresholds.iter().rev().copied().collect(),
    };

    let mut levels: Vec<Clustering> = Vec::with_capacity(ascending.len());
    let mut labels: HashMap<u64, u64> = HashMap::new();

    for (index, &threshold) in ascending.iter().enumerate() {
        if index == 0 {
            let clustering =
                cluster_at(nodes, edges, threshold).map_err(|err| at_threshold(threshold, err))?;
            labels = min_uid_labels(&clustering);
        } else {
            let stable = stability::stable_clusters(edges, &labels, threshold, strict_stability);
            let stable_nodes: HashSet<u64> = labels
                .iter()
                .filter(|(_, cluster)| stable.contains(cluster))
                .map(|(&uid, _)| uid)
                .collect();
            let in_play_nodes: Vec<Node> = nodes
                .iter()
                .copied()
                .filter(|node| !stable_nodes.contains(&node.uid()))
                .collect();
            let in_play_edges: Vec<Edge> = edges
                .iter()
                .copied()
                .filter(|edge| {
                    !stable_nodes.contains(&edge.uid_l()) && !stable_nodes.contains(&edge.uid_r())
                })
                .collect();
            debug!(
                threshold,
                stable_clusters = stable.len(),
                stable_nodes = stable_nodes.len(),
                in_play_nodes = in_play_nodes.len(),
                "threshold level"
            );

            let partial = cluster_at(&in_play_nodes, &in_play_edges, threshold)
                .map_err(|err| at_threshold(threshold, err))?;
            for (uid, label) in min_uid_labels(&partial) {
                labels.insert(uid, label);
            }
        }
        levels.push(build_clustering(&labels));
    }

    let paired = ascending.into_iter().zip(levels);
    let ordered: Vec<ThresholdClustering> = match direction {
        Direction::Ascending => paired
            .map(|(threshold, clustering)| ThresholdClustering::new(threshold, clustering))
            .collect(),
        Direction::Descending => paired
            .rev()
            .map(|(threshold, clustering)| ThresholdClustering::new(threshold, clustering))
            .collect(),
    };
    Ok(ordered)
}

/// Validates strict monotonicity and reports the direction.
///
/// Returns `None` for an empty sequence. A repeated threshold or a sequence
/// that changes direction is rejected with the offending value. The builder
/// runs this at configuration time as well, so a bad sequence fails fast.
pub(crate) fn sequence_direction(thresholds: &[f64]) -> Result<Option<Direction>> {
    let (Some(&first), Some(&second)) = (thresholds.first(), thresholds.get(1)) else {
        return Ok(thresholds.first().map(|_| Direction::Ascending));
    };
    let direction = if second > first {
        Direction::Ascending
    } else {
        Direction::Descending
    };
    for pair in thresholds.windows(2) {
        let ordered = match direction {
            Direction::Ascending => pair[1] > pair[0],
            Direction::Descending => pair[1] < pair[0],
        };
        if !ordered {
            return Err(TobikoError::InvalidThreshold { value: pair[1] });
        }
    }
    Ok(Some(direction))
}

fn at_threshold(threshold: f64, source: TobikoError) -> TobikoError {
    TobikoError::ThresholdFailure {
        threshold,
        source: Box::new(source),
    }
}

/// Replaces every label with the minimum uid of its cluster.
fn min_uid_labels(clustering: &Clustering) -> HashMap<u64, u64> {
    let mut minimum: HashMap<u64, u64> = HashMap::new();
    for row in clustering.assignments() {
        let entry = minimum.entry(row.cluster_id()).or_insert_with(|| row.uid());
        if row.uid() < *entry {
            *entry = row.uid();
        }
    }
    clustering
        .assignments()
        .iter()
        .map(|row| (row.uid(), minimum[&row.cluster_id()]))
        .collect()
}

fn build_clustering(labels: &HashMap<u64, u64>) -> Clustering {
    Clustering::from_assignments(
        labels
            .iter()
            .map(|(&uid, &cluster)| Assignment::new(uid, cluster))
            .collect(),
    )
}

#[cfg(test)]
mod tests;
