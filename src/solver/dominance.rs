//! Iterated elimination of weakly dominated strategies.
//!
//! The eliminator keeps a live row set and a live column set over the
//! original matrix and shrinks them until a fixed point. Nothing is copied
//! until the end, when the surviving submatrix is materialized.
//!
//! # Dominance
//!
//! Row `k` dominates row `i` when `A[k][j] >= A[i][j]` on every live column
//! with at least one strict inequality. Column `k` dominates column `j` when
//! `A[i][k] <= A[i][j]` on every live row, again with one strict inequality
//! (the column player minimizes).
//!
//! Strategies with identical live payoff vectors never strictly dominate
//! each other. To collapse them, a strategy with an identical live vector at
//! a lower index is also treated as dominated, retiring at most one member
//! of each equivalence class per pass. The lowest index always survives.
//!
//! Each pass removes dominated strategies simultaneously against the live set
//! at the start of the pass. "Dominated or duplicated-below" is a strict
//! partial order, so every pass keeps at least one row and one column.

use log::{debug, warn};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::solver::matrix::{IndexMap, PayoffMatrix};

/// How one strategy's payoff vector relates to another's on the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Dominates,
    Equal,
    Incomparable,
}

/// Result of elimination: the reduced matrix and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reduction {
    /// The surviving submatrix.
    pub matrix: PayoffMatrix,
    /// Original indices of the surviving rows and columns.
    pub index_map: IndexMap,
    /// Full row+column passes performed, including the final no-op pass.
    pub passes: usize,
}

impl Reduction {
    /// Original indices of surviving rows.
    pub fn surviving_rows(&self) -> &[usize] {
        self.index_map.rows()
    }

    /// Original indices of surviving columns.
    pub fn surviving_columns(&self) -> &[usize] {
        self.index_map.columns()
    }
}

/// Live row and column index sets during one elimination run.
#[derive(Debug)]
pub struct EliminationState<'a> {
    matrix: &'a PayoffMatrix,
    live_rows: Vec<usize>,
    live_columns: Vec<usize>,
}

impl<'a> EliminationState<'a> {
    /// Start with every row and column live.
    pub fn new(matrix: &'a PayoffMatrix) -> Self {
        Self {
            matrix,
            live_rows: (0..matrix.num_rows()).collect(),
            live_columns: (0..matrix.num_columns()).collect(),
        }
    }

    /// Live row indices, ascending.
    pub fn live_rows(&self) -> &[usize] {
        &self.live_rows
    }

    /// Live column indices, ascending.
    pub fn live_columns(&self) -> &[usize] {
        &self.live_columns
    }

    fn compare_rows(&self, k: usize, i: usize) -> Relation {
        let mut strict = false;
        for &j in &self.live_columns {
            let (a, b) = (self.matrix.get(k, j), self.matrix.get(i, j));
            if a < b {
                return Relation::Incomparable;
            }
            if a > b {
                strict = true;
            }
        }
        if strict {
            Relation::Dominates
        } else {
            Relation::Equal
        }
    }

    fn compare_columns(&self, k: usize, j: usize) -> Relation {
        let mut strict = false;
        for &i in &self.live_rows {
            let (a, b) = (self.matrix.get(i, k), self.matrix.get(i, j));
            if a > b {
                return Relation::Incomparable;
            }
            if a < b {
                strict = true;
            }
        }
        if strict {
            Relation::Dominates
        } else {
            Relation::Equal
        }
    }

    /// Indices in `live` beaten by another live index under `compare(k, i)`.
    fn dominated<F>(live: &[usize], compare: F) -> Vec<usize>
    where
        F: Fn(usize, usize) -> Relation,
    {
        if live.len() <= 1 {
            return Vec::new();
        }

        let mut trimmed_classes = FxHashSet::default();
        let mut removed = Vec::new();

        for &i in live {
            let mut canonical = None;
            let mut dominated = false;
            for &k in live {
                if k == i {
                    continue;
                }
                match compare(k, i) {
                    Relation::Dominates => {
                        dominated = true;
                        break;
                    }
                    Relation::Equal if k < i && canonical.is_none() => canonical = Some(k),
                    _ => {}
                }
            }

            if dominated {
                removed.push(i);
            } else if let Some(c) = canonical {
                if trimmed_classes.insert(c) {
                    removed.push(i);
                }
            }
        }

        removed
    }

    /// Remove dominated rows. Returns how many were removed.
    pub fn row_pass(&mut self) -> usize {
        let removed = Self::dominated(&self.live_rows, |k, i| self.compare_rows(k, i));
        Self::retire(&mut self.live_rows, &removed, "row")
    }

    /// Remove dominated columns. Returns how many were removed.
    pub fn column_pass(&mut self) -> usize {
        let removed = Self::dominated(&self.live_columns, |k, j| self.compare_columns(k, j));
        Self::retire(&mut self.live_columns, &removed, "column")
    }

    fn retire(live: &mut Vec<usize>, removed: &[usize], side: &str) -> usize {
        if removed.is_empty() {
            return 0;
        }
        if removed.len() >= live.len() {
            warn!("{} pass would remove every live {}; keeping them", side, side);
            return 0;
        }
        debug!("eliminating {}s {:?}", side, removed);
        live.retain(|x| !removed.contains(x));
        removed.len()
    }

    /// Freeze the current live sets into a [`Reduction`].
    pub fn finish(self, passes: usize) -> Reduction {
        let index_map = IndexMap::new(self.live_rows, self.live_columns, self.matrix.shape());
        Reduction {
            matrix: index_map.reduce(self.matrix),
            index_map,
            passes,
        }
    }
}

/// Eliminate dominated strategies until a fixed point.
///
/// Equivalent to [`eliminate_with_cap`] with the default cap of
/// `rows + columns + 1` passes.
pub fn eliminate(matrix: &PayoffMatrix) -> Reduction {
    eliminate_with_cap(matrix, None)
}

/// Eliminate dominated strategies, stopping after at most `max_passes`
/// full row+column passes.
///
/// Every non-final pass removes at least one strategy, so a correct run
/// needs at most `rows + columns - 1` passes; hitting the cap is logged.
pub fn eliminate_with_cap(matrix: &PayoffMatrix, max_passes: Option<usize>) -> Reduction {
    let (rows, columns) = matrix.shape();
    let cap = max_passes.unwrap_or(rows + columns + 1);
    let mut state = EliminationState::new(matrix);
    let mut passes = 0;

    loop {
        if passes >= cap {
            warn!(
                "elimination stopped at pass cap {} with {}x{} live",
                cap,
                state.live_rows.len(),
                state.live_columns.len()
            );
            break;
        }
        passes += 1;

        let removed = state.row_pass() + state.column_pass();
        if removed == 0 {
            break;
        }
    }

    debug!(
        "elimination reduced {}x{} to {}x{} in {} passes",
        rows,
        columns,
        state.live_rows.len(),
        state.live_columns.len(),
        passes
    );
    state.finish(passes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> PayoffMatrix {
        PayoffMatrix::new(rows).unwrap()
    }

    #[test]
    fn test_no_dominance_is_unchanged() {
        let m = matrix(vec![
            vec![0.5, 1.0, 1.0],
            vec![1.0, 0.5, 1.0],
            vec![1.0, 1.0, 0.0],
        ]);
        let reduction = eliminate(&m);
        assert_eq!(reduction.matrix, m);
        assert_eq!(reduction.surviving_rows(), &[0, 1, 2]);
        assert_eq!(reduction.surviving_columns(), &[0, 1, 2]);
        assert_eq!(reduction.passes, 1);
    }

    #[test]
    fn test_row_then_column_elimination() {
        // Row 0 dominates row 1; then column 0 dominates column 1 for the minimizer.
        let m = matrix(vec![vec![0.5, 1.0], vec![0.0, 0.5]]);
        let reduction = eliminate(&m);
        assert_eq!(reduction.surviving_rows(), &[0]);
        assert_eq!(reduction.surviving_columns(), &[0]);
        assert_eq!(reduction.matrix.get(0, 0), 0.5);
    }

    #[test]
    fn test_weak_dominance_needs_one_strict_entry() {
        // Row 1 is >= row 0 everywhere and strictly better in column 1.
        let m = matrix(vec![vec![1.0, 0.0, 3.0], vec![1.0, 2.0, 3.0], vec![0.0, 5.0, 1.0]]);
        let mut state = EliminationState::new(&m);
        assert_eq!(state.row_pass(), 1);
        assert_eq!(state.live_rows(), &[1, 2]);
    }

    #[test]
    fn test_iterated_elimination_cascades() {
        // Column 2 is dominated by column 0 only after row 2 is gone.
        let m = matrix(vec![
            vec![3.0, 1.0, 4.0],
            vec![1.0, 3.0, 2.0],
            vec![0.0, 0.0, -1.0],
        ]);
        let reduction = eliminate(&m);
        assert_eq!(reduction.surviving_rows(), &[0, 1]);
        assert_eq!(reduction.surviving_columns(), &[0, 1]);
        assert!(reduction.passes >= 2);
    }

    #[test]
    fn test_identical_rows_collapse_to_single_cell() {
        let m = matrix(vec![vec![2.0, 1.0, 3.0]; 3]);
        let reduction = eliminate(&m);
        assert_eq!(reduction.matrix.shape(), (1, 1));
        assert_eq!(reduction.surviving_rows(), &[0]);
        assert_eq!(reduction.surviving_columns(), &[1]);
        assert_eq!(reduction.matrix.get(0, 0), 1.0);
    }

    #[test]
    fn test_one_duplicate_retired_per_class_per_pass() {
        let m = matrix(vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]]);
        let mut state = EliminationState::new(&m);
        assert_eq!(state.row_pass(), 1);
        assert_eq!(state.live_rows(), &[0, 2, 3]);
        assert_eq!(state.row_pass(), 1);
        assert_eq!(state.live_rows(), &[0, 3]);
        assert_eq!(state.row_pass(), 0);
    }

    #[test]
    fn test_constant_matrix() {
        let m = matrix(vec![vec![1.0; 3]; 3]);
        let reduction = eliminate(&m);
        assert_eq!(reduction.matrix.shape(), (1, 1));
        assert_eq!(reduction.surviving_rows(), &[0]);
        assert_eq!(reduction.surviving_columns(), &[0]);
    }

    #[test]
    fn test_single_row_and_column_survive() {
        let m = matrix(vec![vec![4.0]]);
        let reduction = eliminate(&m);
        assert_eq!(reduction.matrix, m);

        let row = matrix(vec![vec![3.0, 1.0, 2.0]]);
        let reduction = eliminate(&row);
        assert_eq!(reduction.surviving_rows(), &[0]);
        assert_eq!(reduction.surviving_columns(), &[1]);
    }

    #[test]
    fn test_elimination_is_idempotent() {
        let m = matrix(vec![
            vec![3.0, 1.0, 4.0, 1.0],
            vec![5.0, 9.0, 2.0, 6.0],
            vec![5.0, 3.0, 5.0, 8.0],
            vec![9.0, 7.0, 9.0, 3.0],
        ]);
        let first = eliminate(&m);
        let second = eliminate(&first.matrix);
        assert_eq!(second.matrix, first.matrix);
        assert_eq!(second.passes, 1);
        assert_eq!(second.index_map, IndexMap::identity(first.matrix.shape()));
    }

    #[test]
    fn test_column_removal_exposes_row_dominance() {
        // Row 0 is only dominated once columns 0 and 2 are gone.
        let m = matrix(vec![vec![2.0, 0.0, 5.0], vec![1.0, 1.0, 6.0]]);
        let reduction = eliminate(&m);
        assert_eq!(reduction.surviving_rows(), &[1]);
        assert_eq!(reduction.surviving_columns(), &[1]);
        assert_eq!(reduction.passes, 3);
    }

    #[test]
    fn test_pass_cap_stops_early() {
        let m = matrix(vec![vec![2.0, 0.0, 5.0], vec![1.0, 1.0, 6.0]]);
        let reduction = eliminate_with_cap(&m, Some(1));
        assert_eq!(reduction.passes, 1);
        assert_eq!(reduction.surviving_rows(), &[0, 1]);
        assert_eq!(reduction.surviving_columns(), &[1]);
    }
}
