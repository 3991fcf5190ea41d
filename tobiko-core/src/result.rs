//! Result types for clustering operations.
//!
//! A [`Clustering`] is the `uid → cluster_id` mapping produced by a run; the
//! hierarchical driver wraps one per threshold level in a
//! [`ThresholdClustering`].

use std::collections::HashSet;

/// A single `uid → cluster_id` row of a clustering result.
///
/// # Examples
/// ```
/// use tobiko_core::Assignment;
///
/// let row = Assignment::new(7, 0);
/// assert_eq!(row.uid(), 7);
/// assert_eq!(row.cluster_id(), 0);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Assignment {
    uid: u64,
    cluster_id: u64,
}

impl Assignment {
    /// Creates an assignment row.
    #[rustfmt::skip]
    #[must_use]
    pub const fn new(uid: u64, cluster_id: u64) -> Self { Self { uid, cluster_id } }

    /// Returns the vertex uid.
    #[rustfmt::skip]
    #[must_use]
    pub const fn uid(self) -> u64 { self.uid }

    /// Returns the cluster label assigned to the vertex.
    #[rustfmt::skip]
    #[must_use]
    pub const fn cluster_id(self) -> u64 { self.cluster_id }
}

/// The output of a clustering run: a total mapping from uid to cluster label.
///
/// Two vertices share a `cluster_id` iff they belong to the same connected
/// component of the thresholded graph. Label values depend on the engine:
/// label propagation emits the minimum uid of the component, randomised
/// contraction emits dense first-occurrence identifiers.
///
/// # Examples
/// ```
/// use tobiko_core::{Assignment, Clustering};
///
/// let clustering = Clustering::from_assignments(vec![
///     Assignment::new(1, 0),
///     Assignment::new(0, 0),
///     Assignment::new(2, 2),
/// ]);
/// assert_eq!(clustering.len(), 3);
/// assert_eq!(clustering.cluster_count(), 2);
/// assert_eq!(clustering.cluster_of(1), Some(0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Clustering {
    assignments: Vec<Assignment>,
    cluster_count: usize,
}

impl Clustering {
    /// Builds a clustering from explicit assignment rows.
    ///
    /// Rows are sorted by uid; the distinct cluster labels are counted once
    /// here so lookups stay cheap.
    #[must_use]
    pub fn from_assignments(mut assignments: Vec<Assignment>) -> Self {
        assignments.sort_unstable_by_key(|row| row.uid());
        let cluster_count = assignments
            .iter()
            .map(|row| row.cluster_id)
            .collect::<HashSet<_>>()
            .len();
        Self {
            assignments,
            cluster_count,
        }
    }

    /// Returns the assignment rows ordered by uid.
    #[rustfmt::skip]
    #[must_use]
    pub fn assignments(&self) -> &[Assignment] { &self.assignments }

    /// Returns the number of distinct clusters.
    #[rustfmt::skip]
    #[must_use]
    pub const fn cluster_count(&self) -> usize { self.cluster_count }

    /// Returns the number of vertices covered by the mapping.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Returns `true` when the mapping covers no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Looks up the cluster label of a uid, if the uid was part of the run.
    #[must_use]
    pub fn cluster_of(&self, uid: u64) -> Option<u64> {
        self.assignments
            .binary_search_by_key(&uid, |row| row.uid())
            .ok()
            .map(|index| self.assignments[index].cluster_id)
    }

    /// Returns `true` when both uids are covered and share a cluster.
    #[must_use]
    pub fn same_cluster(&self, left: u64, right: u64) -> bool {
        match (self.cluster_of(left), self.cluster_of(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// A clustering paired with the threshold it was computed at.
///
/// Produced by hierarchical runs, one per requested threshold, in the order
/// the caller supplied the thresholds.
#[derive(Clone, Debug, PartialEq)]
pub struct ThresholdClustering {
    threshold: f64,
    clustering: Clustering,
}

impl ThresholdClustering {
    /// Pairs a clustering with its threshold.
    #[must_use]
    pub const fn new(threshold: f64, clustering: Clustering) -> Self {
        Self {
            threshold,
            clustering,
        }
    }

    /// Returns the threshold this level was computed at.
    #[rustfmt::skip]
    #[must_use]
    pub const fn threshold(&self) -> f64 { self.threshold }

    /// Returns the clustering for this level.
    #[rustfmt::skip]
    #[must_use]
    pub const fn clustering(&self) -> &Clustering { &self.clustering }

    /// Consumes the pair and returns the clustering.
    #[must_use]
    pub fn into_clustering(self) -> Clustering {
        self.clustering
    }
}

#[cfg(test)]
mod tests {
    use super::{Assignment, Clustering};

    #[test]
    fn assignments_are_sorted_by_uid() {
        let clustering = Clustering::from_assignments(vec![
            Assignment::new(5, 3),
            Assignment::new(3, 3),
            Assignment::new(4, 4),
        ]);
        let uids: Vec<u64> = clustering.assignments().iter().map(|a| a.uid()).collect();
        assert_eq!(uids, vec![3, 4, 5]);
        assert_eq!(clustering.cluster_count(), 2);
    }

    #[test]
    fn cluster_of_misses_unknown_uids() {
        let clustering = Clustering::from_assignments(vec![Assignment::new(1, 1)]);
        assert_eq!(clustering.cluster_of(1), Some(1));
        assert_eq!(clustering.cluster_of(2), None);
    }

    #[test]
    fn same_cluster_requires_both_sides() {
        let clustering = Clustering::from_assignments(vec![
            Assignment::new(0, 0),
            Assignment::new(1, 0),
            Assignment::new(2, 2),
        ]);
        assert!(clustering.same_cluster(0, 1));
        assert!(!clustering.same_cluster(0, 2));
        assert!(!clustering.same_cluster(0, 9));
    }

    #[test]
    fn empty_clustering_is_valid() {
        let clustering = Clustering::from_assignments(Vec::new());
        assert!(clustering.is_empty());
        assert_eq!(clustering.cluster_count(), 0);
    }
}
