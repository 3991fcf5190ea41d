//! Tobiko core library.
//!
//! Computes connected components of large, undirected, probabilistically
//! weighted graphs. Each edge carries a match probability in `[0, 1]`; at a
//! threshold τ the edges with probability `>= τ` are active and their
//! transitive closure defines the clusters. Three engines share one
//! contract — a total `uid → cluster_id` mapping equal to the connected
//! components of the thresholded graph:
//!
//! - label propagation: bulk-synchronous min-label diffusion to a fixed point;
//! - active set: the same diffusion, restricted to vertices that can still
//!   change;
//! - randomised contraction: star contraction over affine hashes, finishing
//!   in O(log n) expected levels.
//!
//! A hierarchical driver runs a monotone threshold sequence, promoting
//! clusters that provably cannot change at the next level, and a validation
//! harness cross-checks any clustering against an independent traversal.

mod active;
mod builder;
mod cancel;
mod contraction;
mod engine;
mod error;
mod graph;
mod hierarchy;
mod prepare;
mod propagate;
mod result;
mod tobiko;
mod validate;

pub use crate::{
    builder::{Engine, TobikoBuilder},
    cancel::CancellationToken,
    error::{Result, TobikoError, TobikoErrorCode},
    graph::{Edge, Node},
    result::{Assignment, Clustering, ThresholdClustering},
    tobiko::Tobiko,
    validate::{MismatchReport, PartitionCheck, validate_partition},
};
