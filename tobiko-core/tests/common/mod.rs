//! Shared fixtures for the integration suites.

use std::collections::BTreeMap;

use tobiko_core::Clustering;

/// Canonical partition view: member lists sorted internally and by first
/// member, independent of the engine's label space.
pub fn partition_of(clustering: &Clustering) -> Vec<Vec<u64>> {
    let mut groups: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
    for row in clustering.assignments() {
        groups.entry(row.cluster_id()).or_default().push(row.uid());
    }
    let mut partition: Vec<Vec<u64>> = groups
        .into_values()
        .map(|mut members| {
            members.sort_unstable();
            members
        })
        .collect();
    partition.sort();
    partition
}
