//! Verification harness: EPA versus the reference Nash solver.
//!
//! [`VerificationHarness::compare`] solves one matrix both ways and reports
//! the discrepancy. [`VerificationHarness::run_batch`] does the same over a
//! corpus, isolating failures per case: a divergent value is recorded as a
//! candidate counterexample and a solver error aborts only its own case.
//! Records come back in input order whether or not the batch ran in parallel.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::solver::config::{ConfigError, HarnessStats, SolverConfig};
use crate::solver::epa::EpaSolver;
use crate::solver::error::{ErrorKind, SolverError, ToleranceViolation};
use crate::solver::lp::{LpBackend, SimplexBackend};
use crate::solver::matrix::{GameResult, PayoffMatrix};
use crate::solver::nash::ReferenceSolver;

/// A named matrix to verify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Human-readable label.
    pub name: String,
    /// The game.
    pub matrix: PayoffMatrix,
}

impl TestCase {
    /// Create a test case.
    pub fn new(name: impl Into<String>, matrix: PayoffMatrix) -> Self {
        Self {
            name: name.into(),
            matrix,
        }
    }
}

/// Outcome of comparing the two solvers on one matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Value reported by the EPA solver.
    pub epa_value: f64,
    /// Value reported by the reference Nash solver.
    pub nash_value: f64,
    /// `|epa_value - nash_value|`.
    pub absolute_difference: f64,
    /// Whether the difference is within tolerance.
    pub matched: bool,
    /// Tolerance used.
    pub tolerance: f64,
    /// Full EPA result, in original index space.
    pub epa: GameResult,
    /// Full Nash result.
    pub nash: GameResult,
}

impl Comparison {
    fn new(epa: GameResult, nash: GameResult, tolerance: f64) -> Self {
        let absolute_difference = (epa.value - nash.value).abs();
        Self {
            epa_value: epa.value,
            nash_value: nash.value,
            absolute_difference,
            matched: absolute_difference <= tolerance,
            tolerance,
            epa,
            nash,
        }
    }

    /// `Err` with the details when the values did not match.
    pub fn check(&self) -> Result<(), ToleranceViolation> {
        if self.matched {
            return Ok(());
        }
        Err(ToleranceViolation {
            epa_value: self.epa_value,
            nash_value: self.nash_value,
            difference: self.absolute_difference,
            tolerance: self.tolerance,
        })
    }
}

/// A case the solvers could not finish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFailure {
    /// Class of the error.
    pub kind: ErrorKind,
    /// Rendered error, including the matrix dump for internal errors.
    pub message: String,
}

impl From<SolverError> for CaseFailure {
    fn from(err: SolverError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// What happened to one case in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CaseOutcome {
    /// Both solvers produced a value.
    Compared(Comparison),
    /// A solver failed on this case.
    Failed(CaseFailure),
}

/// One row of a batch report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case label.
    pub name: String,
    /// `(rows, columns)` of the original matrix.
    pub shape: (usize, usize),
    /// Result of the comparison.
    pub outcome: CaseOutcome,
}

impl CaseRecord {
    /// The comparison, if both solvers succeeded.
    pub fn comparison(&self) -> Option<&Comparison> {
        match &self.outcome {
            CaseOutcome::Compared(c) => Some(c),
            CaseOutcome::Failed(_) => None,
        }
    }

    /// Whether this case is a candidate counterexample.
    pub fn is_mismatch(&self) -> bool {
        self.comparison().is_some_and(|c| !c.matched)
    }
}

/// Records for a whole batch plus summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// One record per input case, in input order.
    pub records: Vec<CaseRecord>,
    /// Summary counts and timing.
    pub stats: HarnessStats,
}

impl BatchReport {
    /// Cases where EPA and Nash disagree beyond tolerance.
    pub fn counterexamples(&self) -> Vec<&CaseRecord> {
        self.records.iter().filter(|r| r.is_mismatch()).collect()
    }

    /// Cases aborted by a solver error.
    pub fn failures(&self) -> Vec<&CaseRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, CaseOutcome::Failed(_)))
            .collect()
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Save to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())
    }
}

/// Runs the EPA and reference solvers side by side.
#[derive(Debug, Clone)]
pub struct VerificationHarness<B: LpBackend + Clone = SimplexBackend> {
    epa: EpaSolver<B>,
    reference: ReferenceSolver<B>,
    config: SolverConfig,
}

impl Default for VerificationHarness<SimplexBackend> {
    fn default() -> Self {
        let config = SolverConfig::default();
        Self::build(SimplexBackend::from_config(&config), config)
    }
}

impl VerificationHarness<SimplexBackend> {
    /// Create a harness using the simplex backend.
    ///
    /// Fails if `config` does not pass [`SolverConfig::validate`].
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        Self::with_backend(SimplexBackend::from_config(&config), config)
    }
}

impl<B: LpBackend + Clone> VerificationHarness<B> {
    /// Create a harness around a custom LP backend.
    ///
    /// Fails if `config` does not pass [`SolverConfig::validate`].
    pub fn with_backend(backend: B, config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(backend, config))
    }

    fn build(backend: B, config: SolverConfig) -> Self {
        Self {
            epa: EpaSolver::with_backend(backend.clone(), &config),
            reference: ReferenceSolver::with_backend(backend, &config),
            config,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve `matrix` both ways and compare the values.
    pub fn compare(&self, matrix: &PayoffMatrix) -> Result<Comparison, SolverError> {
        let epa = self.epa.solve(matrix)?;
        let nash = self.reference.solve_nash(matrix)?;
        Ok(Comparison::new(epa, nash, self.config.tolerance))
    }

    /// Compare one named case, capturing errors in the record.
    pub fn run_case(&self, case: &TestCase) -> CaseRecord {
        let outcome = match self.compare(&case.matrix) {
            Ok(comparison) => {
                if let Err(violation) = comparison.check() {
                    info!("{}: {}", case.name, violation);
                }
                CaseOutcome::Compared(comparison)
            }
            Err(err) => {
                warn!("{}: {}", case.name, err);
                CaseOutcome::Failed(err.into())
            }
        };
        CaseRecord {
            name: case.name.clone(),
            shape: case.matrix.shape(),
            outcome,
        }
    }

    /// Compare every case and summarize.
    pub fn run_batch(&self, cases: &[TestCase]) -> BatchReport {
        self.run_batch_with_callback(cases, |_| {})
    }

    /// Compare every case, calling `callback` as each record completes.
    ///
    /// In parallel mode the callback runs on worker threads in completion order.
    pub fn run_batch_with_callback<F>(&self, cases: &[TestCase], callback: F) -> BatchReport
    where
        F: Fn(&CaseRecord) + Sync,
    {
        let start = Instant::now();
        let run = |case: &TestCase| {
            let record = self.run_case(case);
            callback(&record);
            record
        };

        let records: Vec<CaseRecord> = if self.config.parallel {
            match self.config.num_threads {
                Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build()
                {
                    Ok(pool) => pool.install(|| cases.par_iter().map(run).collect()),
                    Err(err) => {
                        warn!("could not build {}-thread pool ({}); using global pool", threads, err);
                        cases.par_iter().map(run).collect()
                    }
                },
                None => cases.par_iter().map(run).collect(),
            }
        } else {
            cases.iter().map(run).collect()
        };

        let stats = summarize(&records, start.elapsed().as_secs_f64());
        debug!(
            "batch of {} cases: {} matched, {} mismatched, {} failed",
            stats.cases, stats.matched, stats.mismatched, stats.failed
        );
        BatchReport { records, stats }
    }
}

fn summarize(records: &[CaseRecord], elapsed_seconds: f64) -> HarnessStats {
    let mut stats = HarnessStats::new();
    stats.cases = records.len();
    for record in records {
        match &record.outcome {
            CaseOutcome::Compared(c) => {
                stats.compared += 1;
                if c.matched {
                    stats.matched += 1;
                } else {
                    stats.mismatched += 1;
                }
                stats.max_difference = stats.max_difference.max(c.absolute_difference);
            }
            CaseOutcome::Failed(_) => stats.failed += 1,
        }
    }
    stats.elapsed_seconds = elapsed_seconds;
    stats.update_rate();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::lp::BestResponse;
    use crate::solver::matrix::Strategy;

    fn case(name: &str, rows: Vec<Vec<f64>>) -> TestCase {
        TestCase::new(name, PayoffMatrix::new(rows).unwrap())
    }

    #[test]
    fn test_compare_paper_example() {
        let harness = VerificationHarness::default();
        let m = PayoffMatrix::new(vec![
            vec![0.5, 1.0, 1.0],
            vec![1.0, 0.5, 1.0],
            vec![1.0, 1.0, 0.0],
        ])
        .unwrap();
        let comparison = harness.compare(&m).unwrap();
        assert!(comparison.matched);
        assert!((comparison.epa_value - 0.8).abs() < 1e-6);
        assert!((comparison.nash_value - 0.8).abs() < 1e-6);
        assert!(comparison.check().is_ok());
    }

    #[test]
    fn test_skewed_game_matches_despite_different_columns() {
        let harness = VerificationHarness::default();
        let m = PayoffMatrix::new(vec![vec![100.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let comparison = harness.compare(&m).unwrap();
        assert!(comparison.matched);
        assert_eq!(comparison.epa.column_strategy.as_slice(), &[0.5, 0.5]);
        assert!((comparison.nash.column_strategy.probability(1) - 100.0 / 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_divergence_is_reported_not_raised() {
        let harness = VerificationHarness::default();
        let m = PayoffMatrix::new(vec![vec![3.0, 0.0, 2.0], vec![0.0, 3.0, 2.0]]).unwrap();
        let comparison = harness.compare(&m).unwrap();
        assert!(!comparison.matched);
        assert!((comparison.absolute_difference - 1.0 / 6.0).abs() < 1e-9);

        let violation = comparison.check().unwrap_err();
        assert_eq!(violation.tolerance, 1e-6);
        assert!(violation.to_string().contains("differs from Nash value"));
    }

    #[test]
    fn test_batch_returns_one_record_per_case_in_order() {
        let cases = vec![
            case("pennies", vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            case("diverges", vec![vec![3.0, 0.0, 2.0], vec![0.0, 3.0, 2.0]]),
            case("constant", vec![vec![1.0; 3]; 3]),
            case("saddle", vec![vec![2.0, -1.0, 3.0], vec![-4.0, -2.0, 0.0]]),
        ];

        for parallel in [false, true] {
            let harness = VerificationHarness::new(SolverConfig::default().with_parallel(parallel)).unwrap();
            let report = harness.run_batch(&cases);
            assert_eq!(report.records.len(), cases.len());
            let names: Vec<&str> = report.records.iter().map(|r| r.name.as_str()).collect();
            assert_eq!(names, vec!["pennies", "diverges", "constant", "saddle"]);

            assert_eq!(report.stats.cases, 4);
            assert_eq!(report.stats.matched, 3);
            assert_eq!(report.stats.mismatched, 1);
            assert_eq!(report.stats.failed, 0);

            let counterexamples = report.counterexamples();
            assert_eq!(counterexamples.len(), 1);
            assert_eq!(counterexamples[0].name, "diverges");
            assert_eq!(counterexamples[0].shape, (2, 3));
        }
    }

    #[test]
    fn test_batch_is_deterministic() {
        let cases = vec![
            case("a", vec![vec![0.3, 0.9, 0.1], vec![0.7, 0.2, 0.8]]),
            case("b", vec![vec![4.0, 1.0], vec![2.0, 3.0], vec![0.0, 5.0]]),
        ];
        let harness = VerificationHarness::default();
        let first = harness.run_batch(&cases);
        let second = harness.run_batch(&cases);
        assert_eq!(first.records, second.records);
    }

    /// Backend whose minimax always fails, to exercise per-case isolation.
    #[derive(Debug, Clone)]
    struct BrokenBackend;

    impl LpBackend for BrokenBackend {
        fn best_response(
            &self,
            matrix: &PayoffMatrix,
            column_strategy: &Strategy,
        ) -> Result<BestResponse, SolverError> {
            SimplexBackend::new().best_response(matrix, column_strategy)
        }

        fn minimax(&self, matrix: &PayoffMatrix) -> Result<GameResult, SolverError> {
            Err(SolverError::internal("infeasible", matrix))
        }
    }

    #[test]
    fn test_internal_errors_do_not_abort_batch() {
        let harness = VerificationHarness::with_backend(BrokenBackend, SolverConfig::default()).unwrap();
        let cases = vec![
            case("one", vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            case("two", vec![vec![5.0]]),
        ];
        let report = harness.run_batch(&cases);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.stats.failed, 2);
        for record in report.failures() {
            match &record.outcome {
                CaseOutcome::Failed(failure) => {
                    assert_eq!(failure.kind, ErrorKind::InternalSolver);
                    assert!(failure.message.contains("infeasible"));
                }
                CaseOutcome::Compared(_) => panic!("expected failure"),
            }
        }
    }

    #[test]
    fn test_report_json() {
        let harness = VerificationHarness::new(SolverConfig::strict()).unwrap();
        let report = harness.run_batch(&[case("pennies", vec![vec![1.0, 0.0], vec![0.0, 1.0]])]);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"pennies\""));
        let back: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.records.len(), 1);
        assert_eq!(back.records[0].name, "pennies");
        assert_eq!(back.stats.matched, 1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let negative = SolverConfig::default().with_tolerance(-1.0);
        assert_eq!(
            VerificationHarness::new(negative).unwrap_err(),
            ConfigError::InvalidTolerance(-1.0)
        );
        let nan = SolverConfig::default().with_tolerance(f64::NAN);
        assert!(VerificationHarness::new(nan).is_err());
        let zero_pivots = SolverConfig {
            max_pivots: 0,
            ..Default::default()
        };
        assert!(VerificationHarness::with_backend(SimplexBackend::new(), zero_pivots).is_err());
    }

    #[test]
    fn test_compare_large_payoff_range() {
        // Round-off grows with the payoffs, so the match tolerance does too.
        let harness = VerificationHarness::new(SolverConfig::default().with_tolerance(1e-3)).unwrap();
        let m = PayoffMatrix::new(vec![vec![1e11, 0.0], vec![0.0, 1e11]]).unwrap();
        let comparison = harness.compare(&m).unwrap();
        assert!((comparison.epa_value - 5e10).abs() < 1e-2);
        assert!((comparison.nash_value - 5e10).abs() < 1e-2);
        assert!(comparison.matched);
    }
}
