//! Stability certificate for threshold layering.
//!
//! A cluster from the previous level is stable at the next threshold iff
//! every edge strictly inside it has probability at or above that threshold.
//! Stable clusters keep their labels; only the remainder is reclustered.

use std::collections::{HashMap, HashSet};

use crate::graph::Edge;

/// Returns the labels of the clusters that survive at `threshold`.
///
/// `labels` is the previous level's `uid → cluster` mapping. Every cluster
/// starts from the synthetic self-edge probability of `1.0`, so clusters
/// without internal edges (singletons included) stay stable. The comparator
/// is inclusive (`>=`) unless `strict` is set; the inclusive form matches the
/// edge-activity predicate used by the engines.
pub(super) fn stable_clusters(
    edges: &[Edge],
    labels: &HashMap<u64, u64>,
    threshold: f64,
    strict: bool,
) -> HashSet<u64> {
    let mut min_internal: HashMap<u64, f64> =
        labels.values().map(|&cluster| (cluster, 1.0)).collect();

    for edge in edges {
        if edge.uid_l() == edge.uid_r() {
            continue;
        }
        let (Some(&left), Some(&right)) =
            (labels.get(&edge.uid_l()), labels.get(&edge.uid_r()))
        else {
            continue;
        };
        if left != right {
            continue;
        }
        let entry = min_internal.entry(left).or_insert(1.0);
        if edge.match_probability() < *entry {
            *entry = edge.match_probability();
        }
    }

    min_internal
        .into_iter()
        .filter(|&(_, minimum)| {
            if strict {
                minimum > threshold
            } else {
                minimum >= threshold
            }
        })
        .map(|(cluster, _)| cluster)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::stable_clusters;
    use crate::Edge;

    fn labels(rows: &[(u64, u64)]) -> HashMap<u64, u64> {
        rows.iter().copied().collect()
    }

    #[test]
    fn singleton_clusters_are_always_stable() {
        let labels = labels(&[(0, 0), (1, 1)]);
        let stable = stable_clusters(&[], &labels, 1.0, false);
        assert!(stable.contains(&0));
        assert!(stable.contains(&1));
    }

    #[test]
    fn weak_internal_edge_breaks_stability() {
        let labels = labels(&[(0, 0), (1, 0), (2, 0)]);
        let edges = [Edge::new(0, 1, 0.9), Edge::new(1, 2, 0.6)];
        let stable = stable_clusters(&edges, &labels, 0.7, false);
        assert!(stable.is_empty());
    }

    #[test]
    fn cross_cluster_edges_are_ignored() {
        let labels = labels(&[(0, 0), (1, 0), (2, 2)]);
        let edges = [Edge::new(0, 1, 0.9), Edge::new(1, 2, 0.1)];
        let stable = stable_clusters(&edges, &labels, 0.7, false);
        assert!(stable.contains(&0));
        assert!(stable.contains(&2));
    }

    #[test]
    fn boundary_comparison_is_inclusive_by_default() {
        let labels = labels(&[(0, 0), (1, 0)]);
        let edges = [Edge::new(0, 1, 0.7)];
        assert!(stable_clusters(&edges, &labels, 0.7, false).contains(&0));
        assert!(!stable_clusters(&edges, &labels, 0.7, true).contains(&0));
    }
}
