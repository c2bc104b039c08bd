//! Linear-programming capability behind the solvers.
//!
//! The solvers only need two things from an LP engine, captured by the
//! [`LpBackend`] trait:
//!
//! - **Fixed-opponent best response**: given `A` and a column distribution
//!   `q`, the row distribution maximizing `pᵀ A q`. The objective is linear
//!   in `p`, so a pure best response on `argmax (A q)` is optimal; ties are
//!   resolved by [`TiePolicy`].
//! - **Minimax**: optimal strategies for both players and the game value.
//!
//! [`SimplexBackend`] implements both with a dense tableau simplex.
//!
//! # Minimax formulation
//!
//! Map the matrix affinely onto `[1, 2]`, `A' = (A - min) / r + 1` with
//! `r` the payoff range. Then the column player's program
//!
//! ```text
//! maximize   Σ y_j
//! subject to A' y <= 1,  y >= 0
//! ```
//!
//! is feasible at the origin and bounded. At the optimum `Σ y = 1 / v'`,
//! `q = y v'`, and the duals of the row constraints scaled by `v'` give the
//! row player's strategy `p`. The value of the original game is
//! `(v' - 1) r + min`. Since `v'` lies in `[1, 2]`, the pivot thresholds do
//! not depend on the magnitude of the payoffs.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::solver::config::{SolverConfig, TiePolicy};
use crate::solver::error::SolverError;
use crate::solver::matrix::{GameResult, PayoffMatrix, Strategy};

/// Tolerance for the minimax certificate, relative to the payoff range.
pub const MINIMAX_TOLERANCE: f64 = 1e-6;

/// Absolute slack for treating best-response scores as tied.
const TIE_TOLERANCE: f64 = 1e-12;

/// A best response to a fixed column distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestResponse {
    /// The responding row distribution.
    pub strategy: Strategy,
    /// `max_i (A q)_i`.
    pub value: f64,
    /// Every row achieving the maximum, ascending.
    pub maximizers: Vec<usize>,
}

/// The LP capability the EPA and reference solvers are built on.
pub trait LpBackend: Send + Sync {
    /// Row player's best response to a fixed column distribution.
    fn best_response(
        &self,
        matrix: &PayoffMatrix,
        column_strategy: &Strategy,
    ) -> Result<BestResponse, SolverError>;

    /// Optimal strategies for both players and the game value.
    fn minimax(&self, matrix: &PayoffMatrix) -> Result<GameResult, SolverError>;
}

/// Dense tableau simplex with Bland's pivoting rule.
#[derive(Debug, Clone)]
pub struct SimplexBackend {
    tie_policy: TiePolicy,
    pivot_epsilon: f64,
    max_pivots: usize,
}

impl Default for SimplexBackend {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl SimplexBackend {
    /// Create a backend with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend from the relevant fields of a [`SolverConfig`].
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            tie_policy: config.tie_policy,
            pivot_epsilon: config.pivot_epsilon,
            max_pivots: config.max_pivots,
        }
    }

    /// Builder method: set tie policy.
    pub fn with_tie_policy(mut self, policy: TiePolicy) -> Self {
        self.tie_policy = policy;
        self
    }

    /// The tie policy in use.
    pub fn tie_policy(&self) -> TiePolicy {
        self.tie_policy
    }
}

impl LpBackend for SimplexBackend {
    fn best_response(
        &self,
        matrix: &PayoffMatrix,
        column_strategy: &Strategy,
    ) -> Result<BestResponse, SolverError> {
        let scores = matrix.row_payoffs(column_strategy.as_slice())?;
        let value = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let slack = TIE_TOLERANCE * value.abs().max(1.0);
        let maximizers: Vec<usize> = scores
            .iter()
            .enumerate()
            .filter(|&(_, &s)| s >= value - slack)
            .map(|(i, _)| i)
            .collect();

        let strategy = match self.tie_policy {
            TiePolicy::LowestIndex => Strategy::pure(scores.len(), maximizers[0]),
            TiePolicy::Uniform => {
                Strategy::uniform(maximizers.len()).lift(&maximizers, scores.len())?
            }
        };

        Ok(BestResponse {
            strategy,
            value,
            maximizers,
        })
    }

    fn minimax(&self, matrix: &PayoffMatrix) -> Result<GameResult, SolverError> {
        let scaling = Scaling::of(matrix);
        let mut tableau = Tableau::new(matrix, scaling);
        let pivots = tableau.optimize(self.pivot_epsilon, self.max_pivots, matrix)?;

        let objective = tableau.objective_value();
        if !(objective > self.pivot_epsilon) {
            return Err(SolverError::internal(
                format!("degenerate optimum with objective {}", objective),
                matrix,
            ));
        }
        let scaled_value = 1.0 / objective;

        let row_strategy = Strategy::from_weights(tableau.dual_solution())
            .map_err(|e| SolverError::internal(format!("row strategy: {}", e), matrix))?;
        let column_strategy = Strategy::from_weights(tableau.primal_solution())
            .map_err(|e| SolverError::internal(format!("column strategy: {}", e), matrix))?;
        let value = scaling.restore(scaled_value);

        certify(matrix, &row_strategy, &column_strategy, value)?;
        debug!(
            "simplex solved {}x{} in {} pivots, value {}",
            matrix.num_rows(),
            matrix.num_columns(),
            pivots,
            value
        );

        Ok(GameResult {
            row_strategy,
            column_strategy,
            value,
        })
    }
}

/// Check the minimax equality: `min_j (pᵀA)_j >= v >= max_i (Aq)_i` within tolerance.
pub fn certify(
    matrix: &PayoffMatrix,
    row_strategy: &Strategy,
    column_strategy: &Strategy,
    value: f64,
) -> Result<(), SolverError> {
    let scale = (matrix.max_entry() - matrix.min_entry()).max(1.0);
    let tolerance = MINIMAX_TOLERANCE * scale;

    let guaranteed = matrix
        .column_payoffs(row_strategy.as_slice())?
        .into_iter()
        .fold(f64::INFINITY, f64::min);
    let conceded = matrix
        .row_payoffs(column_strategy.as_slice())?
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);

    if guaranteed < value - tolerance || conceded > value + tolerance {
        return Err(SolverError::internal(
            format!(
                "minimax certificate failed: row guarantees {}, column concedes {}, value {}",
                guaranteed, conceded, value
            ),
            matrix,
        ));
    }
    Ok(())
}

// ============================================================================
// Tableau
// ============================================================================

/// Affine map of the payoffs onto `[1, 2]`.
#[derive(Debug, Clone, Copy)]
struct Scaling {
    min: f64,
    range: f64,
}

impl Scaling {
    fn of(matrix: &PayoffMatrix) -> Self {
        let min = matrix.min_entry();
        let range = matrix.max_entry() - min;
        Self {
            min,
            // Constant games map every entry to one.
            range: if range > 0.0 { range } else { 1.0 },
        }
    }

    #[inline]
    fn apply(&self, payoff: f64) -> f64 {
        (payoff - self.min) / self.range + 1.0
    }

    fn restore(&self, scaled: f64) -> f64 {
        (scaled - 1.0) * self.range + self.min
    }
}

/// Simplex tableau for `max Σy s.t. A'y <= 1, y >= 0`.
///
/// Rows `0..m` are constraints, row `m` the objective. Columns `0..n` are
/// the `y` variables, `n..n+m` the slacks, and the last column the RHS.
struct Tableau {
    cells: Vec<f64>,
    width: usize,
    constraints: usize,
    variables: usize,
    basis: Vec<usize>,
}

impl Tableau {
    fn new(matrix: &PayoffMatrix, scaling: Scaling) -> Self {
        let (m, n) = matrix.shape();
        let width = n + m + 1;
        let mut cells = vec![0.0; (m + 1) * width];
        for i in 0..m {
            for j in 0..n {
                cells[i * width + j] = scaling.apply(matrix.get(i, j));
            }
            cells[i * width + n + i] = 1.0;
            cells[i * width + width - 1] = 1.0;
        }
        for j in 0..n {
            cells[m * width + j] = -1.0;
        }

        Self {
            cells,
            width,
            constraints: m,
            variables: n,
            basis: (n..n + m).collect(),
        }
    }

    #[inline]
    fn at(&self, row: usize, column: usize) -> f64 {
        self.cells[row * self.width + column]
    }

    fn rhs(&self, row: usize) -> f64 {
        self.at(row, self.width - 1)
    }

    fn objective_value(&self) -> f64 {
        self.rhs(self.constraints)
    }

    /// Pivot until no reduced cost is negative. Returns the pivot count.
    fn optimize(
        &mut self,
        epsilon: f64,
        max_pivots: usize,
        matrix: &PayoffMatrix,
    ) -> Result<usize, SolverError> {
        let objective_row = self.constraints;
        for pivots in 0..max_pivots {
            // Bland's rule: lowest-index improving column.
            let entering = (0..self.width - 1).find(|&c| self.at(objective_row, c) < -epsilon);
            let entering = match entering {
                Some(c) => c,
                None => return Ok(pivots),
            };

            let mut leaving: Option<(usize, f64)> = None;
            for r in 0..self.constraints {
                let coefficient = self.at(r, entering);
                if coefficient <= epsilon {
                    continue;
                }
                let ratio = self.rhs(r) / coefficient;
                leaving = match leaving {
                    None => Some((r, ratio)),
                    Some((best, best_ratio)) => {
                        if ratio < best_ratio - epsilon
                            || (ratio <= best_ratio + epsilon && self.basis[r] < self.basis[best])
                        {
                            Some((r, ratio))
                        } else {
                            Some((best, best_ratio))
                        }
                    }
                };
            }

            let (leaving, _) = leaving.ok_or_else(|| {
                SolverError::internal(format!("unbounded in column {}", entering), matrix)
            })?;
            trace!("pivot {}: column {} enters, row {} leaves", pivots, entering, leaving);
            self.pivot(leaving, entering);
        }

        Err(SolverError::internal(
            format!("no convergence after {} pivots", max_pivots),
            matrix,
        ))
    }

    fn pivot(&mut self, row: usize, column: usize) {
        let width = self.width;
        let pivot = self.at(row, column);
        for c in 0..width {
            self.cells[row * width + c] /= pivot;
        }
        for r in 0..=self.constraints {
            if r == row {
                continue;
            }
            let factor = self.at(r, column);
            if factor == 0.0 {
                continue;
            }
            for c in 0..width {
                let delta = factor * self.cells[row * width + c];
                self.cells[r * width + c] -= delta;
            }
        }
        self.basis[row] = column;
    }

    /// Optimal `y`.
    fn primal_solution(&self) -> Vec<f64> {
        let mut y = vec![0.0; self.variables];
        for (r, &b) in self.basis.iter().enumerate() {
            if b < self.variables {
                y[b] = self.rhs(r);
            }
        }
        y
    }

    /// Duals of the constraint rows: reduced costs of the slack columns.
    fn dual_solution(&self) -> Vec<f64> {
        (0..self.constraints)
            .map(|i| self.at(self.constraints, self.variables + i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> PayoffMatrix {
        PayoffMatrix::new(rows).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_best_response_single_argmax() {
        let m = matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
        let q = Strategy::new(vec![0.75, 0.25]).unwrap();
        let br = SimplexBackend::new().best_response(&m, &q).unwrap();
        assert_eq!(br.maximizers, vec![0]);
        assert_eq!(br.strategy, Strategy::pure(3, 0));
        assert_close(br.value, 0.75);
    }

    #[test]
    fn test_best_response_ties_lowest_index() {
        let m = matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
        let q = Strategy::uniform(2);
        let br = SimplexBackend::new().best_response(&m, &q).unwrap();
        assert_eq!(br.maximizers, vec![0, 1, 2]);
        assert_eq!(br.strategy, Strategy::pure(3, 0));
        assert_close(br.value, 0.5);
    }

    #[test]
    fn test_best_response_ties_uniform() {
        let m = matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]]);
        let q = Strategy::uniform(2);
        let backend = SimplexBackend::new().with_tie_policy(TiePolicy::Uniform);
        let br = backend.best_response(&m, &q).unwrap();
        assert_eq!(br.maximizers, vec![0, 1]);
        assert_eq!(br.strategy.as_slice(), &[0.5, 0.5, 0.0]);
        assert_close(br.value, 0.5);
    }

    #[test]
    fn test_best_response_dimension_mismatch() {
        let m = matrix(vec![vec![1.0, 0.0]]);
        let q = Strategy::uniform(3);
        assert_eq!(
            SimplexBackend::new().best_response(&m, &q),
            Err(SolverError::DimensionMismatch { expected: 2, found: 3 })
        );
    }

    #[test]
    fn test_minimax_paper_example() {
        let m = matrix(vec![
            vec![0.5, 1.0, 1.0],
            vec![1.0, 0.5, 1.0],
            vec![1.0, 1.0, 0.0],
        ]);
        let result = SimplexBackend::new().minimax(&m).unwrap();
        assert_close(result.value, 0.8);
        assert_close(result.row_strategy.probability(0), 0.4);
        assert_close(result.row_strategy.probability(1), 0.4);
        assert_close(result.row_strategy.probability(2), 0.2);
        assert_close(result.expected_payoff(&m).unwrap(), 0.8);
    }

    #[test]
    fn test_minimax_skewed_diagonal() {
        let m = matrix(vec![vec![100.0, 0.0], vec![0.0, 1.0]]);
        let result = SimplexBackend::new().minimax(&m).unwrap();
        assert_close(result.value, 100.0 / 101.0);
        assert_close(result.row_strategy.probability(0), 1.0 / 101.0);
        assert_close(result.column_strategy.probability(0), 1.0 / 101.0);
        assert_close(result.column_strategy.probability(1), 100.0 / 101.0);
    }

    #[test]
    fn test_minimax_saddle_point_and_negative_entries() {
        // Saddle at (0, 1): row 0 guarantees -1, column 1 concedes at most -1.
        let m = matrix(vec![vec![2.0, -1.0, 3.0], vec![-4.0, -2.0, 0.0]]);
        let result = SimplexBackend::new().minimax(&m).unwrap();
        assert_close(result.value, -1.0);
        assert_close(result.row_strategy.probability(0), 1.0);
        assert_close(result.column_strategy.probability(1), 1.0);
    }

    #[test]
    fn test_minimax_matching_pennies() {
        let m = matrix(vec![vec![1.0, -1.0], vec![-1.0, 1.0]]);
        let result = SimplexBackend::new().minimax(&m).unwrap();
        assert_close(result.value, 0.0);
        assert_close(result.row_strategy.probability(0), 0.5);
        assert_close(result.column_strategy.probability(0), 0.5);
    }

    #[test]
    fn test_minimax_single_cell() {
        let m = matrix(vec![vec![7.5]]);
        let result = SimplexBackend::new().minimax(&m).unwrap();
        assert_close(result.value, 7.5);
    }

    #[test]
    fn test_minimax_large_payoff_range() {
        let m = matrix(vec![vec![1e11, 0.0], vec![0.0, 1e11]]);
        let result = SimplexBackend::new().minimax(&m).unwrap();
        assert!((result.value - 5e10).abs() < 1e-3);
        assert_close(result.row_strategy.probability(0), 0.5);
        assert_close(result.column_strategy.probability(1), 0.5);
    }

    #[test]
    fn test_minimax_large_random_games_certify() {
        let mut generator = crate::games::GameGenerator::new(Some(17));
        let backend = SimplexBackend::new();
        for high in [1e8, 1e9, 1e12] {
            for _ in 0..20 {
                let m = generator.uniform(15, 15, 0.0, high).unwrap();
                let result = backend.minimax(&m).unwrap();
                assert!(result.value >= m.min_entry() && result.value <= m.max_entry());
            }
        }
    }

    #[test]
    fn test_minimax_tiny_payoff_range() {
        let m = matrix(vec![vec![1e-9, 0.0], vec![0.0, 1e-9]]);
        let result = SimplexBackend::new().minimax(&m).unwrap();
        assert!((result.value - 5e-10).abs() < 1e-18);
        assert_close(result.row_strategy.probability(0), 0.5);
    }

    #[test]
    fn test_pivot_limit_is_internal_error() {
        let m = matrix(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let config = SolverConfig {
            max_pivots: 1,
            ..Default::default()
        };
        let err = SimplexBackend::from_config(&config).minimax(&m).unwrap_err();
        assert_eq!(err.kind(), crate::solver::error::ErrorKind::InternalSolver);
    }

    #[test]
    fn test_certify_rejects_wrong_value() {
        let m = matrix(vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        let p = Strategy::uniform(2);
        assert!(certify(&m, &p, &p, 0.5).is_ok());
        assert!(certify(&m, &p, &p, 0.6).is_err());
    }
}
