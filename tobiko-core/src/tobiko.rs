//! Core clustering orchestration.
//!
//! [`Tobiko`] owns a validated configuration and dispatches runs to the
//! selected engine: preparation, the engine sweep loop, and the mapping of
//! dense representatives back to uid-labelled assignments. Hierarchical runs
//! delegate level sequencing to the [`hierarchy`] driver, handing it a
//! single-threshold closure over this same dispatch path.

use tracing::{info, instrument};

use crate::{
    active,
    builder::Engine,
    cancel::CancellationToken,
    contraction,
    engine::EngineOptions,
    error::Result,
    graph::{Edge, Node},
    hierarchy,
    prepare::PreparedGraph,
    propagate,
    result::{Assignment, Clustering, ThresholdClustering},
};

/// Entry point for running the clustering engines.
///
/// Constructed through [`TobikoBuilder`](crate::TobikoBuilder); a `Tobiko`
/// instance is immutable and can be reused across inputs. Engine state lives
/// only for the duration of a call.
///
/// # Examples
/// ```
/// use tobiko_core::{Edge, Node, TobikoBuilder};
///
/// let nodes = [Node::new(0), Node::new(1), Node::new(2)];
/// let edges = [Edge::new(0, 1, 0.9), Edge::new(1, 2, 0.4)];
/// let tobiko = TobikoBuilder::new().build().expect("defaults are valid");
/// let clustering = tobiko.cluster(&nodes, &edges).expect("run must succeed");
/// assert!(clustering.same_cluster(0, 1));
/// assert!(!clustering.same_cluster(1, 2));
/// ```
#[derive(Clone, Debug)]
pub struct Tobiko {
    engine: Engine,
    threshold: f64,
    thresholds: Option<Vec<f64>>,
    strict_stability: bool,
    seed: Option<u64>,
    max_iterations: usize,
    cancel: CancellationToken,
}

impl Tobiko {
    pub(crate) const fn new(
        engine: Engine,
        threshold: f64,
        thresholds: Option<Vec<f64>>,
        strict_stability: bool,
        seed: Option<u64>,
        max_iterations: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            engine,
            threshold,
            thresholds,
            strict_stability,
            seed,
            max_iterations,
            cancel,
        }
    }

    /// Returns the configured engine.
    #[rustfmt::skip]
    #[must_use]
    pub const fn engine(&self) -> Engine { self.engine }

    /// Returns the single-run threshold.
    #[rustfmt::skip]
    #[must_use]
    pub const fn threshold(&self) -> f64 { self.threshold }

    /// Returns the hierarchical threshold sequence, when one is configured.
    #[must_use]
    pub fn thresholds(&self) -> Option<&[f64]> {
        self.thresholds.as_deref()
    }

    /// Returns whether the stability certificate uses the strict comparator.
    #[rustfmt::skip]
    #[must_use]
    pub const fn strict_stability(&self) -> bool { self.strict_stability }

    /// Returns the configured contraction seed, when one is set.
    #[rustfmt::skip]
    #[must_use]
    pub const fn seed(&self) -> Option<u64> { self.seed }

    /// Returns the iteration safety bound.
    #[rustfmt::skip]
    #[must_use]
    pub const fn max_iterations(&self) -> usize { self.max_iterations }

    /// Clusters the input at the configured threshold.
    ///
    /// # Errors
    /// Returns preparation errors for invalid tables, and engine errors
    /// (`IterationBudgetExceeded`, `ContractionDiverged`, `EngineFailure`,
    /// `Cancelled`) when a run cannot complete.
    #[instrument(
        name = "core.cluster",
        err,
        skip(self, nodes, edges),
        fields(
            engine = ?self.engine,
            threshold = self.threshold,
            nodes = nodes.len(),
            edges = edges.len(),
        ),
    )]
    pub fn cluster(&self, nodes: &[Node], edges: &[Edge]) -> Result<Clustering> {
        let clustering = self.cluster_at(nodes, edges, self.threshold)?;
        info!(clusters = clustering.cluster_count(), "clustering complete");
        Ok(clustering)
    }

    /// Clusters the input at every configured threshold, reusing stable
    /// clusters between levels.
    ///
    /// Falls back to a single level at the plain threshold when no sequence
    /// is configured. Results are returned in the caller's threshold order.
    ///
    /// # Errors
    /// Engine failures are wrapped in
    /// [`TobikoError::ThresholdFailure`](crate::TobikoError::ThresholdFailure)
    /// naming the level that failed.
    #[instrument(
        name = "core.cluster_hierarchical",
        err,
        skip(self, nodes, edges),
        fields(
            engine = ?self.engine,
            levels = self.thresholds.as_ref().map_or(1, Vec::len),
            nodes = nodes.len(),
            edges = edges.len(),
        ),
    )]
    pub fn cluster_hierarchical(
        &self,
        nodes: &[Node],
        edges: &[Edge],
    ) -> Result<Vec<ThresholdClustering>> {
        let single = [self.threshold];
        let thresholds: &[f64] = self.thresholds.as_deref().unwrap_or(&single);
        let levels = hierarchy::run_layers(
            nodes,
            edges,
            thresholds,
            self.strict_stability,
            |level_nodes, level_edges, threshold| {
                self.cluster_at(level_nodes, level_edges, threshold)
            },
        )?;
        info!(levels = levels.len(), "hierarchical clustering complete");
        Ok(levels)
    }

    fn cluster_at(&self, nodes: &[Node], edges: &[Edge], threshold: f64) -> Result<Clustering> {
        let graph = PreparedGraph::build(nodes, edges, threshold)?;
        let options = EngineOptions {
            max_iterations: self.max_iterations,
            cancel: self.cancel.clone(),
        };

        let assignments = match self.engine {
            Engine::LabelPropagation => {
                uid_assignments(&graph, &propagate::run(&graph, &options)?)
            }
            Engine::ActiveSet => uid_assignments(&graph, &active::run(&graph, &options)?),
            Engine::RandomContraction => {
                let labels = contraction::run(&graph, self.seed, &self.cancel)?;
                graph
                    .uids()
                    .iter()
                    .zip(labels)
                    .map(|(&uid, label)| Assignment::new(uid, label))
                    .collect()
            }
        };
        Ok(Clustering::from_assignments(assignments))
    }
}

/// Maps dense representative indices back to uid-labelled rows.
fn uid_assignments(graph: &PreparedGraph, reps: &[usize]) -> Vec<Assignment> {
    reps.iter()
        .enumerate()
        .map(|(vertex, &rep)| Assignment::new(graph.uid(vertex), graph.uid(rep)))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::{Edge, Engine, Node, TobikoBuilder, TobikoError};

    fn nodes(uids: &[u64]) -> Vec<Node> {
        uids.iter().copied().map(Node::new).collect()
    }

    #[test]
    fn empty_input_yields_an_empty_mapping() {
        let tobiko = TobikoBuilder::new().build().expect("defaults are valid");
        let clustering = tobiko.cluster(&[], &[]).expect("empty input is valid");
        assert!(clustering.is_empty());
    }

    #[test]
    fn engines_agree_on_the_partition() {
        let nodes = nodes(&[0, 1, 2, 3, 4, 5, 6]);
        let edges = [
            Edge::new(0, 1, 0.8),
            Edge::new(1, 2, 0.8),
            Edge::new(3, 4, 0.8),
            Edge::new(5, 6, 0.2),
        ];
        let reference = TobikoBuilder::new()
            .build()
            .expect("defaults are valid")
            .cluster(&nodes, &edges)
            .expect("run must succeed");

        for engine in [Engine::ActiveSet, Engine::RandomContraction] {
            let other = TobikoBuilder::new()
                .with_engine(engine)
                .with_seed(5)
                .build()
                .expect("configuration is valid")
                .cluster(&nodes, &edges)
                .expect("run must succeed");
            for left in &nodes {
                for right in &nodes {
                    assert_eq!(
                        reference.same_cluster(left.uid(), right.uid()),
                        other.same_cluster(left.uid(), right.uid()),
                        "{engine:?} disagreed on ({}, {})",
                        left.uid(),
                        right.uid()
                    );
                }
            }
        }
    }

    #[test]
    fn hierarchical_without_a_sequence_uses_the_single_threshold() {
        let nodes = nodes(&[0, 1]);
        let edges = [Edge::new(0, 1, 0.9)];
        let tobiko = TobikoBuilder::new().build().expect("defaults are valid");
        let levels = tobiko
            .cluster_hierarchical(&nodes, &edges)
            .expect("run must succeed");
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].threshold(), 0.5);
        assert_eq!(levels[0].clustering().cluster_count(), 1);
    }

    #[test]
    fn duplicate_nodes_fail_the_run() {
        let tobiko = TobikoBuilder::new().build().expect("defaults are valid");
        let result = tobiko.cluster(&nodes(&[1, 1]), &[]);
        assert!(matches!(
            result,
            Err(TobikoError::DuplicateVertex { uid: 1 })
        ));
    }
}
