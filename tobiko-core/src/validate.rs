//! Validation harness: independent reference cross-check of a clustering.
//!
//! Rebuilds the thresholded graph, derives connected components with a plain
//! breadth-first traversal, and compares the two labellings as equivalence
//! relations: every engine cluster must map onto exactly one reference
//! component and vice versa. Label values are irrelevant; only the grouping
//! is compared.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::{
    error::Result,
    graph::{Edge, Node},
    prepare::PreparedGraph,
    result::Clustering,
};

/// Outcome of a partition cross-check.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum PartitionCheck {
    /// The clustering induces exactly the reference partition.
    Consistent,
    /// The clustering deviates from the reference partition.
    Mismatch(MismatchReport),
}

/// Structured description of how a clustering deviates from the reference.
///
/// # Examples
/// ```
/// use tobiko_core::{
///     Assignment, Clustering, Edge, Node, PartitionCheck, validate_partition,
/// };
///
/// let nodes = [Node::new(0), Node::new(1)];
/// let edges = [Edge::new(0, 1, 0.9)];
/// // Claim the two connected vertices live in different clusters.
/// let wrong = Clustering::from_assignments(vec![
///     Assignment::new(0, 0),
///     Assignment::new(1, 1),
/// ]);
/// let check = validate_partition(&nodes, &edges, 0.5, &wrong)?;
/// let PartitionCheck::Mismatch(report) = check else {
///     panic!("expected a mismatch");
/// };
/// assert_eq!(report.split_components(), &[0]);
/// # Ok::<(), tobiko_core::TobikoError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MismatchReport {
    missing: Vec<u64>,
    unexpected: Vec<u64>,
    overmerged_clusters: Vec<u64>,
    split_components: Vec<u64>,
}

impl MismatchReport {
    /// Uids present in the node table but absent from the clustering.
    #[rustfmt::skip]
    #[must_use]
    pub fn missing(&self) -> &[u64] { &self.missing }

    /// Uids present in the clustering but absent from the node table.
    #[rustfmt::skip]
    #[must_use]
    pub fn unexpected(&self) -> &[u64] { &self.unexpected }

    /// Engine cluster labels that span more than one reference component.
    #[rustfmt::skip]
    #[must_use]
    pub fn overmerged_clusters(&self) -> &[u64] { &self.overmerged_clusters }

    /// Reference components (named by their minimum uid) that are split
    /// across more than one engine cluster.
    #[rustfmt::skip]
    #[must_use]
    pub fn split_components(&self) -> &[u64] { &self.split_components }

    fn is_empty(&self) -> bool {
        self.missing.is_empty()
            && self.unexpected.is_empty()
            && self.overmerged_clusters.is_empty()
            && self.split_components.is_empty()
    }
}

/// Cross-checks a clustering against a reference traversal of the same input.
///
/// # Errors
/// Returns the usual preparation errors when the node or edge tables are
/// invalid; a partition deviation is a successful check with a
/// [`PartitionCheck::Mismatch`] outcome, not an error.
pub fn validate_partition(
    nodes: &[Node],
    edges: &[Edge],
    threshold: f64,
    clustering: &Clustering,
) -> Result<PartitionCheck> {
    let graph = PreparedGraph::build(nodes, edges, threshold)?;
    let reference = reference_components(&graph);

    let mut report = MismatchReport::default();
    for vertex in 0..graph.len() {
        if clustering.cluster_of(graph.uid(vertex)).is_none() {
            report.missing.push(graph.uid(vertex));
        }
    }
    let known: HashSet<u64> = graph.uids().iter().copied().collect();
    for row in clustering.assignments() {
        if !known.contains(&row.uid()) {
            report.unexpected.push(row.uid());
        }
    }

    let mut by_cluster: HashMap<u64, HashSet<usize>> = HashMap::new();
    let mut by_component: HashMap<usize, HashSet<u64>> = HashMap::new();
    for vertex in 0..graph.len() {
        if let Some(label) = clustering.cluster_of(graph.uid(vertex)) {
            by_cluster.entry(label).or_default().insert(reference[vertex]);
            by_component.entry(reference[vertex]).or_default().insert(label);
        }
    }
    for (&label, components) in &by_cluster {
        if components.len() > 1 {
            report.overmerged_clusters.push(label);
        }
    }
    for (&component, labels) in &by_component {
        if labels.len() > 1 {
            report.split_components.push(graph.uid(component));
        }
    }

    report.missing.sort_unstable();
    report.unexpected.sort_unstable();
    report.overmerged_clusters.sort_unstable();
    report.split_components.sort_unstable();

    if report.is_empty() {
        Ok(PartitionCheck::Consistent)
    } else {
        Ok(PartitionCheck::Mismatch(report))
    }
}

/// Breadth-first components over the prepared graph.
///
/// Components are named by the dense index of their first vertex; iteration
/// runs in ascending dense order, so the name is the minimum-uid member.
fn reference_components(graph: &PreparedGraph) -> Vec<usize> {
    let mut component = vec![usize::MAX; graph.len()];
    for start in 0..graph.len() {
        if component[start] != usize::MAX {
            continue;
        }
        component[start] = start;
        let mut queue = VecDeque::from([start]);
        while let Some(vertex) = queue.pop_front() {
            for &neighbour in graph.neighbours(vertex) {
                if component[neighbour] == usize::MAX {
                    component[neighbour] = start;
                    queue.push_back(neighbour);
                }
            }
        }
    }
    component
}
