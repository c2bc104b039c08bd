//! Synthetic game families.
//!
//! Random families draw from a seeded `StdRng`, so the same seed always
//! yields the same sequence of matrices. Structured families are
//! deterministic and useful as edge cases.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::solver::error::SolverError;
use crate::solver::matrix::PayoffMatrix;

/// A family of payoff matrices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Family {
    /// Independent entries uniform in `[low, high)`.
    Uniform {
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// Entries drawn from {0, 0.5, 1}.
    WinTieLoss,
    /// Integer entries in `0..=max`.
    SmallInteger {
        /// Largest entry.
        max: u32,
    },
    /// Random positive diagonal in `[1, 10)`, zero elsewhere.
    Diagonal,
    /// Circulant `a[i][j] = (j - i) mod n`.
    Cyclic,
    /// Every entry equal to the value.
    Constant(f64),
    /// One random row repeated.
    IdenticalRows,
}

impl Family {
    /// Families mixed into random corpora.
    pub const RANDOM: [Family; 4] = [
        Family::Uniform {
            low: 0.0,
            high: 1.0,
        },
        Family::WinTieLoss,
        Family::SmallInteger { max: 9 },
        Family::Diagonal,
    ];

    /// Short label used in case names.
    pub fn label(&self) -> &'static str {
        match self {
            Family::Uniform { .. } => "uniform",
            Family::WinTieLoss => "win-tie-loss",
            Family::SmallInteger { .. } => "integer",
            Family::Diagonal => "diagonal",
            Family::Cyclic => "cyclic",
            Family::Constant(_) => "constant",
            Family::IdenticalRows => "identical-rows",
        }
    }
}

/// Seeded generator for synthetic games.
#[derive(Debug, Clone)]
pub struct GameGenerator {
    rng: StdRng,
}

impl GameGenerator {
    /// Create a generator. `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Generate one `rows`×`columns` matrix from `family`.
    ///
    /// Square-only families (`Diagonal`, `Cyclic`) use `rows` for both sides.
    pub fn generate(
        &mut self,
        family: Family,
        rows: usize,
        columns: usize,
    ) -> Result<PayoffMatrix, SolverError> {
        match family {
            Family::Uniform { low, high } => self.uniform(rows, columns, low, high),
            Family::WinTieLoss => self.win_tie_loss(rows, columns),
            Family::SmallInteger { max } => self.small_integer(rows, columns, max),
            Family::Diagonal => self.diagonal(rows),
            Family::Cyclic => cyclic(rows),
            Family::Constant(value) => constant(rows, columns, value),
            Family::IdenticalRows => self.identical_rows(rows, columns),
        }
    }

    /// Entries uniform in `[low, high)`. A degenerate range yields a constant matrix.
    pub fn uniform(
        &mut self,
        rows: usize,
        columns: usize,
        low: f64,
        high: f64,
    ) -> Result<PayoffMatrix, SolverError> {
        if !(low < high) {
            return constant(rows, columns, low);
        }
        let rng = &mut self.rng;
        PayoffMatrix::from_fn(rows, columns, |_, _| rng.gen_range(low..high))
    }

    /// Entries from {0, 0.5, 1} with equal probability.
    pub fn win_tie_loss(&mut self, rows: usize, columns: usize) -> Result<PayoffMatrix, SolverError> {
        let rng = &mut self.rng;
        PayoffMatrix::from_fn(rows, columns, |_, _| {
            f64::from(rng.gen_range(0..3u8)) * 0.5
        })
    }

    /// Integer entries in `0..=max`.
    pub fn small_integer(
        &mut self,
        rows: usize,
        columns: usize,
        max: u32,
    ) -> Result<PayoffMatrix, SolverError> {
        let rng = &mut self.rng;
        PayoffMatrix::from_fn(rows, columns, |_, _| f64::from(rng.gen_range(0..=max)))
    }

    /// Positive diagonal entries, zero elsewhere.
    ///
    /// The value of such a game is `1 / Σ (1 / d_i)`.
    pub fn diagonal(&mut self, n: usize) -> Result<PayoffMatrix, SolverError> {
        let diagonal: Vec<f64> = (0..n).map(|_| self.rng.gen_range(1.0..10.0)).collect();
        PayoffMatrix::from_fn(n, n, |i, j| if i == j { diagonal[i] } else { 0.0 })
    }

    /// A single random row repeated `rows` times.
    pub fn identical_rows(
        &mut self,
        rows: usize,
        columns: usize,
    ) -> Result<PayoffMatrix, SolverError> {
        let row: Vec<f64> = (0..columns).map(|_| self.rng.gen_range(0.0..1.0)).collect();
        PayoffMatrix::from_fn(rows, columns, |_, j| row[j])
    }
}

/// Circulant `n`×`n` game with `a[i][j] = (j - i) mod n`.
///
/// Every row and column is a rotation of `0..n`, so uniform play is optimal
/// for both players and the value is `(n - 1) / 2`.
pub fn cyclic(n: usize) -> Result<PayoffMatrix, SolverError> {
    PayoffMatrix::from_fn(n, n, |i, j| ((j + n - i) % n) as f64)
}

/// Every entry equal to `value`.
pub fn constant(rows: usize, columns: usize, value: f64) -> Result<PayoffMatrix, SolverError> {
    PayoffMatrix::from_fn(rows, columns, |_, _| value)
}
