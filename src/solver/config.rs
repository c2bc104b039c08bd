//! Configuration options for the solvers and the verification harness.
//!
//! This module provides configuration structs that control tolerances,
//! tie-breaking, the reference solver's method, and batch parallelism.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// How a best response splits mass across tied maximizing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TiePolicy {
    /// All mass on the lowest-indexed maximizer.
    LowestIndex,
    /// Mass spread uniformly over every maximizer.
    Uniform,
}

/// Method used by the reference Nash solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NashMethod {
    /// Enumerate equal-size supports and solve the indifference equations.
    SupportEnumeration,
    /// Solve the minimax linear program with the simplex backend.
    Simplex,
    /// Support enumeration when the number of candidate supports is at most
    /// `max_support_pairs`, simplex otherwise.
    Auto,
}

/// Configuration for the solvers and harness.
///
/// # Example
/// ```
/// use epa_solver::SolverConfig;
///
/// let config = SolverConfig::default();
/// assert_eq!(config.tolerance, 1e-6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum `|epa - nash|` for a comparison to count as matched.
    pub tolerance: f64,

    /// Tie-breaking rule for fixed-opponent best responses.
    pub tie_policy: TiePolicy,

    /// Cap on full row+column elimination passes.
    ///
    /// `None` uses `rows + columns + 1`, which a correct dominance check
    /// never reaches.
    pub max_elimination_passes: Option<usize>,

    /// Magnitude below which simplex tableau entries are treated as zero.
    pub pivot_epsilon: f64,

    /// Maximum simplex pivots before reporting non-convergence.
    pub max_pivots: usize,

    /// Method for the reference Nash solver.
    pub nash_method: NashMethod,

    /// Largest number of `(row support, column support)` pairs that
    /// [`NashMethod::Auto`] will enumerate.
    pub max_support_pairs: u64,

    /// Run batch comparisons in parallel.
    pub parallel: bool,

    /// Number of threads for parallel batches.
    ///
    /// Set to `None` to use all available cores.
    pub num_threads: Option<usize>,

    /// Random seed for generated corpora.
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            tie_policy: TiePolicy::LowestIndex,
            max_elimination_passes: None,
            pivot_epsilon: 1e-10,
            max_pivots: 100_000,
            nash_method: NashMethod::Auto,
            max_support_pairs: 200_000,
            parallel: true,
            num_threads: None,
            seed: None,
        }
    }
}

impl SolverConfig {
    /// Create a new SolverConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight tolerance, single thread, support enumeration only.
    ///
    /// Useful for reproducing a single suspicious case.
    pub fn strict() -> Self {
        Self {
            tolerance: 1e-9,
            nash_method: NashMethod::SupportEnumeration,
            parallel: false,
            num_threads: Some(1),
            ..Default::default()
        }
    }

    /// Builder method: set match tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder method: set best-response tie policy.
    pub fn with_tie_policy(mut self, policy: TiePolicy) -> Self {
        self.tie_policy = policy;
        self
    }

    /// Builder method: set reference Nash method.
    pub fn with_nash_method(mut self, method: NashMethod) -> Self {
        self.nash_method = method;
        self
    }

    /// Builder method: cap elimination passes.
    pub fn with_max_elimination_passes(mut self, passes: usize) -> Self {
        self.max_elimination_passes = Some(passes);
        self
    }

    /// Builder method: enable or disable parallel batches.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Builder method: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tolerance >= 0.0) || !self.tolerance.is_finite() {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        if !(self.pivot_epsilon > 0.0) || self.pivot_epsilon >= 1e-3 {
            return Err(ConfigError::InvalidPivotEpsilon(self.pivot_epsilon));
        }
        if self.max_pivots == 0 {
            return Err(ConfigError::ZeroLimit("max_pivots"));
        }
        if self.max_elimination_passes == Some(0) {
            return Err(ConfigError::ZeroLimit("max_elimination_passes"));
        }
        if self.num_threads == Some(0) {
            return Err(ConfigError::ZeroLimit("num_threads"));
        }
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Tolerance is negative or not finite.
    InvalidTolerance(f64),
    /// Pivot epsilon is not a small positive number.
    InvalidPivotEpsilon(f64),
    /// A limit that must be positive was zero.
    ZeroLimit(&'static str),
    /// Reading the config file failed.
    IoError(String),
    /// The config JSON was malformed.
    ParseError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidTolerance(val) => {
                write!(f, "Tolerance {} must be finite and non-negative", val)
            }
            ConfigError::InvalidPivotEpsilon(val) => {
                write!(f, "Pivot epsilon {} is out of range (0, 1e-3)", val)
            }
            ConfigError::ZeroLimit(name) => write!(f, "{} must be positive", name),
            ConfigError::IoError(msg) => write!(f, "Failed to read config: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Statistics tracked during a verification batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessStats {
    /// Total number of cases submitted.
    pub cases: usize,

    /// Cases where both solvers produced a value.
    pub compared: usize,

    /// Compared cases within tolerance.
    pub matched: usize,

    /// Compared cases outside tolerance (candidate counterexamples).
    pub mismatched: usize,

    /// Cases aborted by a solver error.
    pub failed: usize,

    /// Largest `|epa - nash|` seen.
    pub max_difference: f64,

    /// Total time spent (in seconds).
    pub elapsed_seconds: f64,

    /// Cases per second.
    pub cases_per_second: f64,
}

impl HarnessStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update cases per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.cases_per_second = self.cases as f64 / self.elapsed_seconds;
        }
    }
}
