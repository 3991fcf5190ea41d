//! Builder utilities for configuring clustering runs.
//!
//! Exposes the engine selection surface and the configuration validation
//! performed before constructing [`Tobiko`] instances.

use crate::{
    cancel::CancellationToken,
    error::{Result, TobikoError},
    hierarchy,
    tobiko::Tobiko,
};

/// Selects the core engine used by [`Tobiko::cluster`].
///
/// All three engines induce the same partition; they differ in label space
/// and cost profile. Label propagation and the active-set variant label each
/// component with its minimum uid; randomised contraction emits dense
/// first-occurrence labels and finishes in O(log n) expected sweeps instead
/// of the component diameter.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Engine {
    /// Bulk-synchronous min-label diffusion.
    #[default]
    LabelPropagation,
    /// Min-label diffusion restricted to the active frontier.
    ActiveSet,
    /// Randomised star contraction with affine hashing.
    RandomContraction,
}

/// Configures and constructs [`Tobiko`] instances.
///
/// # Examples
/// ```
/// use tobiko_core::{Engine, TobikoBuilder};
///
/// let tobiko = TobikoBuilder::new()
///     .with_engine(Engine::ActiveSet)
///     .with_threshold(0.7)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(tobiko.engine(), Engine::ActiveSet);
/// assert_eq!(tobiko.threshold(), 0.7);
/// ```
#[derive(Clone, Debug)]
pub struct TobikoBuilder {
    engine: Engine,
    threshold: f64,
    thresholds: Option<Vec<f64>>,
    strict_stability: bool,
    seed: Option<u64>,
    max_iterations: usize,
    cancel: CancellationToken,
}

impl Default for TobikoBuilder {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            threshold: 0.5,
            thresholds: None,
            strict_stability: false,
            seed: None,
            max_iterations: 64,
            cancel: CancellationToken::default(),
        }
    }
}

impl TobikoBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use tobiko_core::{Engine, TobikoBuilder};
    ///
    /// let tobiko = TobikoBuilder::new().build().expect("defaults are valid");
    /// assert_eq!(tobiko.engine(), Engine::LabelPropagation);
    /// assert_eq!(tobiko.threshold(), 0.5);
    /// assert_eq!(tobiko.max_iterations(), 64);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the core engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Sets the single match-probability threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the threshold sequence for hierarchical runs.
    ///
    /// The sequence must be strictly ascending or strictly descending; an
    /// empty sequence behaves as if none was configured.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Uses the strict `>` comparator in the stability certificate.
    ///
    /// The inclusive comparator matches the engines' edge-activity predicate
    /// and is correct; the strict form exists for compatibility with data
    /// produced by implementations that used it.
    #[must_use]
    pub fn with_strict_stability(mut self, strict: bool) -> Self {
        self.strict_stability = strict;
        self
    }

    /// Seeds the randomised contraction hash sequence.
    ///
    /// Without a seed the sequence is drawn from system entropy and the
    /// contraction labels vary between runs (the partition does not).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Overrides the iteration safety bound.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Attaches a cancellation token polled between iterations.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Validates the configuration and constructs a [`Tobiko`] instance.
    ///
    /// # Errors
    /// Returns [`TobikoError::InvalidThreshold`] when the threshold or any
    /// entry of the threshold sequence is outside `[0, 1]` or the sequence is
    /// not strictly monotone, and [`TobikoError::InvalidIterationBudget`]
    /// when `max_iterations` is zero.
    pub fn build(self) -> Result<Tobiko> {
        if self.max_iterations == 0 {
            return Err(TobikoError::InvalidIterationBudget { got: 0 });
        }
        validate_unit_interval(self.threshold)?;
        let thresholds = match self.thresholds {
            Some(values) if values.is_empty() => None,
            Some(values) => {
                for &value in &values {
                    validate_unit_interval(value)?;
                }
                hierarchy::sequence_direction(&values)?;
                Some(values)
            }
            None => None,
        };

        Ok(Tobiko::new(
            self.engine,
            self.threshold,
            thresholds,
            self.strict_stability,
            self.seed,
            self.max_iterations,
            self.cancel,
        ))
    }
}

fn validate_unit_interval(value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TobikoError::InvalidThreshold { value })
    }
}
