//! Error types for the tobiko core library.
//!
//! Defines the error enum exposed by the public API, its stable machine
//! readable codes, and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

/// Stable codes describing [`TobikoError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum TobikoErrorCode {
    /// The node table contained the same uid more than once.
    DuplicateVertex,
    /// An edge referenced a uid that is not present in the node table.
    DanglingEdge,
    /// A threshold fell outside `[0, 1]` or a threshold sequence was not
    /// strictly monotone.
    InvalidThreshold,
    /// An edge carried a match probability outside `[0, 1]`.
    InvalidProbability,
    /// The iteration budget must be at least one sweep.
    InvalidIterationBudget,
    /// An engine did not reach a fixed point within the iteration budget.
    IterationBudgetExceeded,
    /// Randomised contraction exceeded the level sanity bound.
    ContractionDiverged,
    /// An internal engine invariant was violated.
    EngineFailure,
    /// The caller cancelled the run between iterations.
    Cancelled,
    /// An engine failed while the hierarchical driver was processing a level.
    ThresholdFailure,
}

impl TobikoErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateVertex => "DUPLICATE_VERTEX",
            Self::DanglingEdge => "DANGLING_EDGE",
            Self::InvalidThreshold => "INVALID_THRESHOLD",
            Self::InvalidProbability => "INVALID_PROBABILITY",
            Self::InvalidIterationBudget => "INVALID_ITERATION_BUDGET",
            Self::IterationBudgetExceeded => "ITERATION_BUDGET_EXCEEDED",
            Self::ContractionDiverged => "CONTRACTION_DIVERGED",
            Self::EngineFailure => "ENGINE_FAILURE",
            Self::Cancelled => "CANCELLED",
            Self::ThresholdFailure => "THRESHOLD_FAILURE",
        }
    }
}

impl fmt::Display for TobikoErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced when preparing inputs or running the engines.
///
/// Every failure is fatal to the call that produced it; partial results are
/// never returned, except that [`TobikoError::IterationBudgetExceeded`]
/// carries the last representative table for debugging.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TobikoError {
    /// The node table contained the same uid more than once.
    #[error("node table contains uid {uid} more than once")]
    DuplicateVertex {
        /// The duplicated uid.
        uid: u64,
    },
    /// An edge referenced a uid that is not present in the node table.
    #[error("edge ({uid_l}, {uid_r}) references unknown uid {missing}")]
    DanglingEdge {
        /// Left endpoint as provided by the caller.
        uid_l: u64,
        /// Right endpoint as provided by the caller.
        uid_r: u64,
        /// The endpoint that is absent from the node table.
        missing: u64,
    },
    /// A threshold fell outside `[0, 1]` or a sequence was not strictly
    /// monotone.
    #[error("threshold {value} is not a valid probability threshold")]
    InvalidThreshold {
        /// The offending threshold value.
        value: f64,
    },
    /// An edge carried a match probability outside `[0, 1]`.
    #[error("edge ({uid_l}, {uid_r}) has match probability {value} outside [0, 1]")]
    InvalidProbability {
        /// Left endpoint of the edge.
        uid_l: u64,
        /// Right endpoint of the edge.
        uid_r: u64,
        /// The out-of-range probability.
        value: f64,
    },
    /// The configured iteration budget cannot drive a single sweep.
    #[error("max_iterations must be at least 1 (got {got})")]
    InvalidIterationBudget {
        /// The rejected budget.
        got: usize,
    },
    /// An engine did not reach a fixed point within the iteration budget.
    ///
    /// `last_known` holds the `(uid, representative)` table at the moment the
    /// budget ran out. It is debugging material, not a usable clustering.
    #[error("no fixed point within {max_iterations} iterations")]
    IterationBudgetExceeded {
        /// The exhausted budget.
        max_iterations: usize,
        /// Representative table at the last completed iteration.
        last_known: Arc<[(u64, u64)]>,
    },
    /// Randomised contraction exceeded the level sanity bound.
    #[error("contraction did not terminate within {levels} levels")]
    ContractionDiverged {
        /// Number of levels completed before giving up.
        levels: usize,
    },
    /// An internal engine invariant was violated.
    #[error("engine invariant violated: {detail}")]
    EngineFailure {
        /// Description of the violated invariant.
        detail: Arc<str>,
    },
    /// The caller cancelled the run between iterations.
    #[error("clustering run was cancelled")]
    Cancelled,
    /// An engine failed while the hierarchical driver was processing a level.
    #[error("clustering failed at threshold {threshold}")]
    ThresholdFailure {
        /// The threshold level being processed when the failure occurred.
        threshold: f64,
        /// The underlying engine error.
        #[source]
        source: Box<TobikoError>,
    },
}

impl TobikoError {
    /// Retrieve the stable [`TobikoErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> TobikoErrorCode {
        match self {
            Self::DuplicateVertex { .. } => TobikoErrorCode::DuplicateVertex,
            Self::DanglingEdge { .. } => TobikoErrorCode::DanglingEdge,
            Self::InvalidThreshold { .. } => TobikoErrorCode::InvalidThreshold,
            Self::InvalidProbability { .. } => TobikoErrorCode::InvalidProbability,
            Self::InvalidIterationBudget { .. } => TobikoErrorCode::InvalidIterationBudget,
            Self::IterationBudgetExceeded { .. } => TobikoErrorCode::IterationBudgetExceeded,
            Self::ContractionDiverged { .. } => TobikoErrorCode::ContractionDiverged,
            Self::EngineFailure { .. } => TobikoErrorCode::EngineFailure,
            Self::Cancelled => TobikoErrorCode::Cancelled,
            Self::ThresholdFailure { .. } => TobikoErrorCode::ThresholdFailure,
        }
    }

    /// Retrieve the code of the engine error inside a threshold failure.
    #[must_use]
    pub fn level_source_code(&self) -> Option<TobikoErrorCode> {
        match self {
            Self::ThresholdFailure { source, .. } => Some(source.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TobikoError>;
