//! Core data types: payoff matrices, mixed strategies, index maps and results.
//!
//! A [`PayoffMatrix`] is stored dense and row-major. Rows are the pure
//! strategies of player 1 (the maximizer), columns those of player 2 (the
//! minimizer), and entry `(i, j)` is player 1's payoff.
//!
//! Dominance elimination works on index sets rather than on resized arrays,
//! so the link between a reduced matrix and the original is an [`IndexMap`].
//! Strategies computed in reduced space are lifted back through it, with
//! eliminated strategies receiving probability zero.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::solver::error::SolverError;

/// Tolerance for a strategy's probabilities to sum to one.
pub const DISTRIBUTION_TOLERANCE: f64 = 1e-9;

// ============================================================================
// Payoff Matrix
// ============================================================================

/// An m×n matrix of finite payoffs to the row player.
///
/// Immutable once constructed. Construction validates that the matrix is
/// non-empty, rectangular and finite, so every solver can rely on that.
///
/// # Example
/// ```
/// use epa_solver::PayoffMatrix;
///
/// let matrix = PayoffMatrix::new(vec![vec![100.0, 0.0], vec![0.0, 1.0]]).unwrap();
/// assert_eq!(matrix.shape(), (2, 2));
/// assert_eq!(matrix.get(0, 0), 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct PayoffMatrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl PayoffMatrix {
    /// Build a matrix from nested rows.
    ///
    /// Fails if the matrix is empty, ragged, or contains NaN/infinite entries.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self, SolverError> {
        let num_rows = rows.len();
        let num_columns = rows.first().map_or(0, |r| r.len());
        if num_rows == 0 || num_columns == 0 {
            return Err(SolverError::EmptyMatrix);
        }

        let mut data = Vec::with_capacity(num_rows * num_columns);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != num_columns {
                return Err(SolverError::RaggedMatrix {
                    row: i,
                    expected: num_columns,
                    found: row.len(),
                });
            }
            data.extend(row);
        }

        Self::from_data(num_rows, num_columns, data)
    }

    /// Build a matrix by evaluating `f(row, column)` for every cell.
    pub fn from_fn<F>(rows: usize, columns: usize, mut f: F) -> Result<Self, SolverError>
    where
        F: FnMut(usize, usize) -> f64,
    {
        if rows == 0 || columns == 0 {
            return Err(SolverError::EmptyMatrix);
        }
        let mut data = Vec::with_capacity(rows * columns);
        for i in 0..rows {
            for j in 0..columns {
                data.push(f(i, j));
            }
        }
        Self::from_data(rows, columns, data)
    }

    fn from_data(rows: usize, columns: usize, data: Vec<f64>) -> Result<Self, SolverError> {
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(SolverError::NonFiniteEntry {
                row: pos / columns,
                column: pos % columns,
                value: data[pos],
            });
        }
        Ok(Self { rows, columns, data })
    }

    /// Parse a matrix from delimited text.
    ///
    /// One row per line; entries separated by whitespace and/or commas.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_text(text: &str) -> Result<Self, SolverError> {
        let mut rows = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(|t| {
                    t.parse::<f64>().map_err(|_| SolverError::Parse {
                        line: line_no + 1,
                        token: t.to_string(),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            rows.push(row);
        }
        Self::new(rows)
    }

    /// Load a matrix from a delimited text file (see [`PayoffMatrix::from_text`]).
    pub fn from_text_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_text(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Number of rows (player 1 strategies).
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (player 2 strategies).
    pub fn num_columns(&self) -> usize {
        self.columns
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Entry at `(row, column)`.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, column: usize) -> f64 {
        assert!(column < self.columns, "column {} out of bounds", column);
        self.data[row * self.columns + column]
    }

    /// A full row as a slice.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.columns..(row + 1) * self.columns]
    }

    /// Smallest entry.
    pub fn min_entry(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest entry.
    pub fn max_entry(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// The submatrix at the given row and column indices, in the given order.
    ///
    /// # Panics
    /// Panics if an index is out of bounds or either index list is empty.
    pub fn submatrix(&self, rows: &[usize], columns: &[usize]) -> PayoffMatrix {
        assert!(!rows.is_empty() && !columns.is_empty(), "empty submatrix");
        let mut data = Vec::with_capacity(rows.len() * columns.len());
        for &i in rows {
            for &j in columns {
                data.push(self.get(i, j));
            }
        }
        PayoffMatrix {
            rows: rows.len(),
            columns: columns.len(),
            data,
        }
    }

    /// Expected payoff of each row against a column distribution: `A q`.
    pub fn row_payoffs(&self, column_strategy: &[f64]) -> Result<Vec<f64>, SolverError> {
        check_len(column_strategy, self.columns)?;
        Ok((0..self.rows)
            .map(|i| dot(self.row(i), column_strategy))
            .collect())
    }

    /// Expected payoff of each column against a row distribution: `pᵀ A`.
    pub fn column_payoffs(&self, row_strategy: &[f64]) -> Result<Vec<f64>, SolverError> {
        check_len(row_strategy, self.rows)?;
        let mut payoffs = vec![0.0; self.columns];
        for (i, &p) in row_strategy.iter().enumerate() {
            if p == 0.0 {
                continue;
            }
            for (acc, &a) in payoffs.iter_mut().zip(self.row(i)) {
                *acc += p * a;
            }
        }
        Ok(payoffs)
    }

    /// Expected payoff `pᵀ A q`.
    pub fn expected_payoff(
        &self,
        row_strategy: &[f64],
        column_strategy: &[f64],
    ) -> Result<f64, SolverError> {
        let payoffs = self.row_payoffs(column_strategy)?;
        check_len(row_strategy, self.rows)?;
        Ok(dot(row_strategy, &payoffs))
    }

    /// Nested-row copy of the matrix.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.row(i).to_vec()).collect()
    }
}

impl TryFrom<Vec<Vec<f64>>> for PayoffMatrix {
    type Error = SolverError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<PayoffMatrix> for Vec<Vec<f64>> {
    fn from(matrix: PayoffMatrix) -> Self {
        matrix.to_rows()
    }
}

/// Writes the matrix in the same delimited form [`PayoffMatrix::from_text`] reads.
impl fmt::Display for PayoffMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            let line: Vec<String> = self.row(i).iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

fn check_len(values: &[f64], expected: usize) -> Result<(), SolverError> {
    if values.len() != expected {
        return Err(SolverError::DimensionMismatch {
            expected,
            found: values.len(),
        });
    }
    Ok(())
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

// ============================================================================
// Strategy
// ============================================================================

/// A mixed strategy: non-negative probabilities summing to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Strategy(Vec<f64>);

impl Strategy {
    /// Validate and wrap a probability vector.
    pub fn new(probabilities: Vec<f64>) -> Result<Self, SolverError> {
        if probabilities.is_empty() {
            return Err(SolverError::InvalidDistribution("empty".to_string()));
        }
        if let Some(p) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(SolverError::InvalidDistribution(format!(
                "probability {} is negative or not finite",
                p
            )));
        }
        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(SolverError::InvalidDistribution(format!(
                "probabilities sum to {}",
                sum
            )));
        }
        Ok(Self(probabilities))
    }

    /// Normalize non-negative weights into a strategy.
    ///
    /// Tiny negative weights (solver round-off) are clamped to zero first.
    pub fn from_weights(weights: Vec<f64>) -> Result<Self, SolverError> {
        let clamped: Vec<f64> = weights.into_iter().map(|w| w.max(0.0)).collect();
        let total: f64 = clamped.iter().sum();
        if !(total > 0.0) || !total.is_finite() {
            return Err(SolverError::InvalidDistribution(format!(
                "weights sum to {}",
                total
            )));
        }
        Self::new(clamped.into_iter().map(|w| w / total).collect())
    }

    /// The uniform distribution over `n` strategies.
    ///
    /// # Panics
    /// Panics if `n` is zero.
    pub fn uniform(n: usize) -> Self {
        assert!(n > 0, "uniform strategy over zero actions");
        Self(vec![1.0 / n as f64; n])
    }

    /// All mass on `index` out of `n` strategies.
    ///
    /// # Panics
    /// Panics if `index >= n`.
    pub fn pure(n: usize, index: usize) -> Self {
        assert!(index < n, "pure strategy index {} out of {}", index, n);
        let mut probabilities = vec![0.0; n];
        probabilities[index] = 1.0;
        Self(probabilities)
    }

    /// Number of pure strategies.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; strategies are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Probabilities as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Probability of pure strategy `index`.
    pub fn probability(&self, index: usize) -> f64 {
        self.0[index]
    }

    /// Embed into a space of `len` strategies, placing entry `k` at `indices[k]`.
    ///
    /// Positions not named by `indices` get probability zero.
    pub fn lift(&self, indices: &[usize], len: usize) -> Result<Strategy, SolverError> {
        if indices.len() != self.0.len() {
            return Err(SolverError::DimensionMismatch {
                expected: indices.len(),
                found: self.0.len(),
            });
        }
        let mut lifted = vec![0.0; len];
        for (&index, &p) in indices.iter().zip(&self.0) {
            if index >= len {
                return Err(SolverError::DimensionMismatch {
                    expected: len,
                    found: index + 1,
                });
            }
            lifted[index] = p;
        }
        Ok(Strategy(lifted))
    }
}

impl AsRef<[f64]> for Strategy {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Strategy> for Vec<f64> {
    fn from(strategy: Strategy) -> Self {
        strategy.0
    }
}

// ============================================================================
// Index Map
// ============================================================================

/// Maps reduced-matrix positions back to original row/column indices.
///
/// `rows()[k]` is the original index of reduced row `k`; likewise for columns.
/// Both lists are strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMap {
    rows: Vec<usize>,
    columns: Vec<usize>,
    original_rows: usize,
    original_columns: usize,
}

impl IndexMap {
    /// Build a map from surviving indices and the original shape.
    pub fn new(rows: Vec<usize>, columns: Vec<usize>, original_shape: (usize, usize)) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(columns.windows(2).all(|w| w[0] < w[1]));
        Self {
            rows,
            columns,
            original_rows: original_shape.0,
            original_columns: original_shape.1,
        }
    }

    /// The map where nothing was eliminated.
    pub fn identity(shape: (usize, usize)) -> Self {
        Self::new((0..shape.0).collect(), (0..shape.1).collect(), shape)
    }

    /// Original indices of surviving rows.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Original indices of surviving columns.
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Shape of the original matrix.
    pub fn original_shape(&self) -> (usize, usize) {
        (self.original_rows, self.original_columns)
    }

    /// Shape of the reduced matrix.
    pub fn reduced_shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Original row indices that were eliminated.
    pub fn eliminated_rows(&self) -> Vec<usize> {
        (0..self.original_rows)
            .filter(|i| self.rows.binary_search(i).is_err())
            .collect()
    }

    /// Original column indices that were eliminated.
    pub fn eliminated_columns(&self) -> Vec<usize> {
        (0..self.original_columns)
            .filter(|j| self.columns.binary_search(j).is_err())
            .collect()
    }

    /// The reduced matrix this map describes.
    pub fn reduce(&self, original: &PayoffMatrix) -> PayoffMatrix {
        original.submatrix(&self.rows, &self.columns)
    }

    /// Lift a reduced-space row strategy into original row space.
    pub fn lift_rows(&self, reduced: &Strategy) -> Result<Strategy, SolverError> {
        reduced.lift(&self.rows, self.original_rows)
    }

    /// Lift a reduced-space column strategy into original column space.
    pub fn lift_columns(&self, reduced: &Strategy) -> Result<Strategy, SolverError> {
        reduced.lift(&self.columns, self.original_columns)
    }

}

// ============================================================================
// Game Result
// ============================================================================

/// A solution to a matrix game: both strategies and the value to player 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    /// Row player's (maximizer's) strategy.
    pub row_strategy: Strategy,
    /// Column player's (minimizer's) strategy.
    pub column_strategy: Strategy,
    /// Game value to the row player.
    pub value: f64,
}

impl GameResult {
    /// Recompute `pᵀ A q` for these strategies.
    pub fn expected_payoff(&self, matrix: &PayoffMatrix) -> Result<f64, SolverError> {
        matrix.expected_payoff(self.row_strategy.as_slice(), self.column_strategy.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper_matrix() -> PayoffMatrix {
        PayoffMatrix::new(vec![
            vec![0.5, 1.0, 1.0],
            vec![1.0, 0.5, 1.0],
            vec![1.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_matrix_validation() {
        assert_eq!(PayoffMatrix::new(vec![]), Err(SolverError::EmptyMatrix));
        assert_eq!(PayoffMatrix::new(vec![vec![]]), Err(SolverError::EmptyMatrix));
        assert!(matches!(
            PayoffMatrix::new(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(SolverError::RaggedMatrix { row: 1, expected: 2, found: 1 })
        ));
        assert!(matches!(
            PayoffMatrix::new(vec![vec![1.0, f64::NAN]]),
            Err(SolverError::NonFiniteEntry { row: 0, column: 1, .. })
        ));
        assert!(matches!(
            PayoffMatrix::new(vec![vec![1.0], vec![f64::INFINITY]]),
            Err(SolverError::NonFiniteEntry { row: 1, column: 0, .. })
        ));
    }

    #[test]
    fn test_matrix_accessors() {
        let m = paper_matrix();
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m.get(2, 2), 0.0);
        assert_eq!(m.row(1), &[1.0, 0.5, 1.0]);
        assert_eq!(m.min_entry(), 0.0);
        assert_eq!(m.max_entry(), 1.0);

        let sub = m.submatrix(&[0, 2], &[1, 2]);
        assert_eq!(sub.to_rows(), vec![vec![1.0, 1.0], vec![1.0, 0.0]]);
    }

    #[test]
    fn test_payoff_products() {
        let m = paper_matrix();
        let q = Strategy::uniform(3);
        let scores = m.row_payoffs(q.as_slice()).unwrap();
        assert!((scores[0] - 2.5 / 3.0).abs() < 1e-12);
        assert!((scores[2] - 2.0 / 3.0).abs() < 1e-12);

        let p = [0.4, 0.4, 0.2];
        for payoff in m.column_payoffs(&p).unwrap() {
            assert!((payoff - 0.8).abs() < 1e-12);
        }
        assert!((m.expected_payoff(&p, q.as_slice()).unwrap() - 0.8).abs() < 1e-12);

        assert_eq!(
            m.row_payoffs(&[0.5, 0.5]),
            Err(SolverError::DimensionMismatch { expected: 3, found: 2 })
        );
    }

    #[test]
    fn test_text_round_trip() {
        let text = "# paper example\n0.5, 1, 1\n1 0.5 1\n\n1,1,0\n";
        let m = PayoffMatrix::from_text(text).unwrap();
        assert_eq!(m, paper_matrix());
        assert_eq!(PayoffMatrix::from_text(&m.to_string()).unwrap(), m);

        assert_eq!(
            PayoffMatrix::from_text("1 2\n3 x"),
            Err(SolverError::Parse { line: 2, token: "x".to_string() })
        );
    }

    #[test]
    fn test_matrix_json() {
        let m = paper_matrix();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "[[0.5,1.0,1.0],[1.0,0.5,1.0],[1.0,1.0,0.0]]");
        let back: PayoffMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);

        assert!(serde_json::from_str::<PayoffMatrix>("[[1.0],[2.0,3.0]]").is_err());
    }

    #[test]
    fn test_strategy_validation() {
        assert!(Strategy::new(vec![0.5, 0.5]).is_ok());
        assert!(Strategy::new(vec![0.6, 0.5]).is_err());
        assert!(Strategy::new(vec![1.5, -0.5]).is_err());
        assert!(Strategy::new(vec![]).is_err());

        let s = Strategy::from_weights(vec![2.0, -1e-15, 6.0]).unwrap();
        assert_eq!(s.as_slice(), &[0.25, 0.0, 0.75]);
        assert!(Strategy::from_weights(vec![0.0, 0.0]).is_err());
    }

    #[test]
    fn test_index_map_lift() {
        let map = IndexMap::new(vec![1, 3], vec![0, 2, 4], (4, 5));
        let reduced_rows = Strategy::new(vec![0.25, 0.75]).unwrap();
        let reduced_columns = Strategy::uniform(3);

        let rows = map.lift_rows(&reduced_rows).unwrap();
        assert_eq!(rows.as_slice(), &[0.0, 0.25, 0.0, 0.75]);
        let columns = map.lift_columns(&reduced_columns).unwrap();
        assert_eq!(columns.probability(1), 0.0);
        assert_eq!(columns.probability(4), 1.0 / 3.0);

        // Reading the surviving indices back recovers the reduced vectors.
        let back: Vec<f64> = map.rows().iter().map(|&i| rows.probability(i)).collect();
        assert_eq!(back, reduced_rows.as_slice());
        let back: Vec<f64> = map.columns().iter().map(|&j| columns.probability(j)).collect();
        assert_eq!(back, reduced_columns.as_slice());

        assert_eq!(map.eliminated_rows(), vec![0, 2]);
        assert_eq!(map.eliminated_columns(), vec![1, 3]);
        assert_eq!(map.reduced_shape(), (2, 3));
    }
}
