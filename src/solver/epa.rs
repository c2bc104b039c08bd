//! Equal Probabilities Approach (EPA) solver.
//!
//! The heuristic:
//! 1. Eliminate weakly dominated strategies to a fixed point.
//! 2. Fix the column player to the uniform distribution over the surviving
//!    columns.
//! 3. Solve the row player's linear program on the reduced matrix.
//! 4. Report `p · R · q_uniform` and lift both strategies back to the
//!    original index space.
//!
//! Whether this value always equals the Nash value is an open empirical
//! question; the [`harness`](crate::solver::harness) exists to look for
//! games where it does not.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::solver::config::SolverConfig;
use crate::solver::dominance::{eliminate_with_cap, Reduction};
use crate::solver::error::SolverError;
use crate::solver::lp::{BestResponse, LpBackend, SimplexBackend};
use crate::solver::matrix::{GameResult, IndexMap, PayoffMatrix, Strategy};

/// Everything the EPA solver computed for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpaSolution {
    /// Strategies in original index space and the EPA value.
    pub result: GameResult,
    /// Which rows and columns survived elimination.
    pub index_map: IndexMap,
    /// Elimination passes performed.
    pub passes: usize,
    /// Row player's maximin value on the reduced matrix.
    pub reduced_minimax_value: f64,
    /// Row player's pure best response to the uniform columns, in reduced space.
    pub uniform_best_response: BestResponse,
}

impl EpaSolution {
    /// The EPA game value.
    pub fn value(&self) -> f64 {
        self.result.value
    }
}

/// Solver for the Equal Probabilities Approach.
///
/// # Example
/// ```
/// use epa_solver::{EpaSolver, PayoffMatrix};
///
/// let matrix = PayoffMatrix::new(vec![
///     vec![0.5, 1.0, 1.0],
///     vec![1.0, 0.5, 1.0],
///     vec![1.0, 1.0, 0.0],
/// ]).unwrap();
/// let result = EpaSolver::new().solve(&matrix).unwrap();
/// assert!((result.value - 0.8).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct EpaSolver<B: LpBackend = SimplexBackend> {
    backend: B,
    max_elimination_passes: Option<usize>,
}

impl Default for EpaSolver<SimplexBackend> {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl EpaSolver<SimplexBackend> {
    /// Create a solver with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver using the simplex backend configured from `config`.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self::with_backend(SimplexBackend::from_config(config), config)
    }
}

impl<B: LpBackend> EpaSolver<B> {
    /// Create a solver around a custom LP backend.
    pub fn with_backend(backend: B, config: &SolverConfig) -> Self {
        Self {
            backend,
            max_elimination_passes: config.max_elimination_passes,
        }
    }

    /// Solve `matrix` and return the EPA strategies and value.
    pub fn solve(&self, matrix: &PayoffMatrix) -> Result<GameResult, SolverError> {
        Ok(self.solve_detailed(matrix)?.result)
    }

    /// Solve `matrix` and keep the intermediate results.
    pub fn solve_detailed(&self, matrix: &PayoffMatrix) -> Result<EpaSolution, SolverError> {
        let Reduction {
            matrix: reduced,
            index_map,
            passes,
        } = eliminate_with_cap(matrix, self.max_elimination_passes);

        let uniform = Strategy::uniform(reduced.num_columns());
        let maximin = self.backend.minimax(&reduced)?;
        let value = reduced.expected_payoff(maximin.row_strategy.as_slice(), uniform.as_slice())?;
        let uniform_best_response = self.backend.best_response(&reduced, &uniform)?;

        debug_assert!(
            value >= reduced.min_entry() - 1e-9 && value <= reduced.max_entry() + 1e-9,
            "EPA value {} outside reduced payoff range",
            value
        );
        debug!(
            "EPA on {}x{} (reduced {}x{}): value {}, reduced maximin {}",
            matrix.num_rows(),
            matrix.num_columns(),
            reduced.num_rows(),
            reduced.num_columns(),
            value,
            maximin.value
        );

        let result = GameResult {
            row_strategy: index_map.lift_rows(&maximin.row_strategy)?,
            column_strategy: index_map.lift_columns(&uniform)?,
            value,
        };

        Ok(EpaSolution {
            result,
            index_map,
            passes,
            reduced_minimax_value: maximin.value,
            uniform_best_response,
        })
    }
}
