//! Reference Nash equilibrium solver.
//!
//! This is the oracle the EPA heuristic is compared against, so it shares no
//! code path with the EPA solver: it never eliminates dominated strategies
//! and works on the original matrix.
//!
//! # Support enumeration
//!
//! Every matrix game has an optimal strategy pair supported on a square
//! submatrix whose bordered system
//!
//! ```text
//! Σ_{j∈J} A[i][j] q_j = v   (i ∈ I)        Σ_{i∈I} p_i A[i][j] = v   (j ∈ J)
//! Σ_{j∈J} q_j = 1                          Σ_{i∈I} p_i = 1
//! ```
//!
//! is nonsingular. Enumerating supports `|I| = |J| = k` for `k = 1, 2, ...`,
//! solving both systems, and keeping the first non-negative solution where
//! no pure strategy outside the support does better, yields an equilibrium.
//! The number of candidate pairs is `C(m + n, min(m, n))`, so for larger
//! games the simplex minimax is used instead.

use itertools::Itertools;
use log::{debug, warn};

use crate::solver::config::{NashMethod, SolverConfig};
use crate::solver::error::SolverError;
use crate::solver::lp::{LpBackend, SimplexBackend};
use crate::solver::matrix::{GameResult, PayoffMatrix, Strategy};

/// Pivots smaller than this make a support system singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Slack for non-negativity and best-response checks, relative to the payoff range.
const SUPPORT_TOLERANCE: f64 = 1e-9;

/// Computes a genuine Nash equilibrium of a matrix game.
#[derive(Debug, Clone)]
pub struct ReferenceSolver<B: LpBackend = SimplexBackend> {
    backend: B,
    method: NashMethod,
    max_support_pairs: u64,
}

impl Default for ReferenceSolver<SimplexBackend> {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl ReferenceSolver<SimplexBackend> {
    /// Create a solver with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver using the simplex backend configured from `config`.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self::with_backend(SimplexBackend::from_config(config), config)
    }
}

impl<B: LpBackend> ReferenceSolver<B> {
    /// Create a solver around a custom LP backend.
    pub fn with_backend(backend: B, config: &SolverConfig) -> Self {
        Self {
            backend,
            method: config.nash_method,
            max_support_pairs: config.max_support_pairs,
        }
    }

    /// The method that will be used for a matrix of this shape.
    pub fn method_for(&self, matrix: &PayoffMatrix) -> NashMethod {
        match self.method {
            NashMethod::Auto => {
                let (m, n) = matrix.shape();
                if support_pairs(m, n) <= self.max_support_pairs {
                    NashMethod::SupportEnumeration
                } else {
                    NashMethod::Simplex
                }
            }
            method => method,
        }
    }

    /// Compute a Nash equilibrium of `matrix`.
    pub fn solve_nash(&self, matrix: &PayoffMatrix) -> Result<GameResult, SolverError> {
        match self.method_for(matrix) {
            NashMethod::Simplex => self.backend.minimax(matrix),
            _ => match support_enumeration(matrix)? {
                Some(result) => Ok(result),
                None if self.method == NashMethod::Auto => {
                    warn!(
                        "support enumeration found no equilibrium for {}x{}; using simplex",
                        matrix.num_rows(),
                        matrix.num_columns()
                    );
                    self.backend.minimax(matrix)
                }
                None => Err(SolverError::internal(
                    "support enumeration found no equilibrium",
                    matrix,
                )),
            },
        }
    }
}

/// Number of equal-size support pairs of an m×n game, `C(m + n, min(m, n))`,
/// saturating at `u64::MAX`.
pub fn support_pairs(rows: usize, columns: usize) -> u64 {
    let n = (rows + columns) as u128;
    let k = rows.min(columns) as u128;
    let mut count: u128 = 1;
    for i in 0..k {
        count = count * (n - i) / (i + 1);
        if count > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    count as u64
}

/// Find an equilibrium by enumerating equal-size supports.
///
/// Returns `Ok(None)` if no support passes the checks, which only happens
/// when round-off defeats every candidate.
pub fn support_enumeration(matrix: &PayoffMatrix) -> Result<Option<GameResult>, SolverError> {
    let (m, n) = matrix.shape();
    let tolerance = SUPPORT_TOLERANCE * (matrix.max_entry() - matrix.min_entry()).max(1.0);
    let mut examined = 0u64;

    for k in 1..=m.min(n) {
        for rows in (0..m).combinations(k) {
            for columns in (0..n).combinations(k) {
                examined += 1;
                if let Some(result) = try_support(matrix, &rows, &columns, tolerance)? {
                    debug!(
                        "support enumeration found {}x{} support after {} candidates",
                        k, k, examined
                    );
                    return Ok(Some(result));
                }
            }
        }
    }

    Ok(None)
}

fn try_support(
    matrix: &PayoffMatrix,
    rows: &[usize],
    columns: &[usize],
    tolerance: f64,
) -> Result<Option<GameResult>, SolverError> {
    let k = rows.len();

    // Column weights making every support row indifferent.
    let (q, v) = match solve_bordered(k, |r, c| matrix.get(rows[r], columns[c])) {
        Some(solution) => solution,
        None => return Ok(None),
    };
    if q.iter().any(|&x| x < -tolerance) {
        return Ok(None);
    }

    // Row weights making every support column indifferent.
    let (p, _) = match solve_bordered(k, |r, c| matrix.get(rows[c], columns[r])) {
        Some(solution) => solution,
        None => return Ok(None),
    };
    if p.iter().any(|&x| x < -tolerance) {
        return Ok(None);
    }

    let (Ok(row_strategy), Ok(column_strategy)) =
        (Strategy::from_weights(p), Strategy::from_weights(q))
    else {
        return Ok(None);
    };
    let row_strategy = row_strategy.lift(rows, matrix.num_rows())?;
    let column_strategy = column_strategy.lift(columns, matrix.num_columns())?;

    // No pure strategy may beat the support against the opponent's mix.
    let best_row = matrix
        .row_payoffs(column_strategy.as_slice())?
        .into_iter()
        .fold(f64::NEG_INFINITY, f64::max);
    let worst_column = matrix
        .column_payoffs(row_strategy.as_slice())?
        .into_iter()
        .fold(f64::INFINITY, f64::min);
    if best_row > v + tolerance || worst_column < v - tolerance {
        return Ok(None);
    }

    let value = matrix.expected_payoff(row_strategy.as_slice(), column_strategy.as_slice())?;
    Ok(Some(GameResult {
        row_strategy,
        column_strategy,
        value,
    }))
}

/// Solve `Σ_c coeff(r, c) x_c - v = 0` for `r < k` together with `Σ x_c = 1`.
///
/// Gaussian elimination with partial pivoting; `None` if singular.
fn solve_bordered<F>(k: usize, coeff: F) -> Option<(Vec<f64>, f64)>
where
    F: Fn(usize, usize) -> f64,
{
    let n = k + 1;
    let width = n + 1;
    let mut a = vec![0.0; n * width];
    for r in 0..k {
        for c in 0..k {
            a[r * width + c] = coeff(r, c);
        }
        a[r * width + k] = -1.0;
    }
    for c in 0..k {
        a[k * width + c] = 1.0;
    }
    a[k * width + n] = 1.0;

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&x, &y| a[x * width + col].abs().total_cmp(&a[y * width + col].abs()))?;
        if a[pivot_row * width + col].abs() < SINGULAR_EPSILON {
            return None;
        }
        if pivot_row != col {
            for c in 0..width {
                a.swap(pivot_row * width + c, col * width + c);
            }
        }
        let pivot = a[col * width + col];
        for r in 0..n {
            if r == col {
                continue;
            }
            let factor = a[r * width + col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..width {
                a[r * width + c] -= factor * a[col * width + c];
            }
        }
    }

    let solution: Vec<f64> = (0..n).map(|r| a[r * width + n] / a[r * width + r]).collect();
    Some((solution[..k].to_vec(), solution[k]))
}
