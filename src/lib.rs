//! # EPA Solver
//!
//! Solvers for two-person zero-sum matrix games, built to test the Equal
//! Probabilities Approach (EPA) against exact Nash equilibria.
//!
//! ## Features
//!
//! - **Dominance Elimination**: Iterated removal of weakly dominated rows and columns
//! - **EPA Solver**: Uniform column play on the reduced game, maximin row play
//! - **Reference Solver**: Support enumeration or simplex minimax
//! - **Pluggable LP**: Any [`LpBackend`] can drive both solvers
//! - **Verification Harness**: Parallel batch comparison with JSON reports
//!
//! ## Quick Start
//!
//! ```
//! use epa_solver::{EpaSolver, PayoffMatrix, ReferenceSolver};
//!
//! let matrix = PayoffMatrix::new(vec![
//!     vec![0.5, 1.0, 1.0],
//!     vec![1.0, 0.5, 1.0],
//!     vec![1.0, 1.0, 0.0],
//! ]).unwrap();
//!
//! let epa = EpaSolver::new().solve(&matrix).unwrap();
//! let nash = ReferenceSolver::new().solve_nash(&matrix).unwrap();
//! assert!((epa.value - nash.value).abs() < 1e-6);
//! ```
//!
//! ## Modules
//!
//! - [`solver`]: Matrix types, elimination, LP, EPA, Nash and the harness
//! - [`games`]: Colonel Blotto, synthetic families and known corpora
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Verification Harness                        │
//! │  - Batch comparison (rayon)   - Counterexample collection       │
//! └─────────────────────────────────────────────────────────────────┘
//!                  │                               │
//!                  ▼                               ▼
//!         ┌────────────────┐              ┌────────────────┐
//!         │   EPA Solver   │              │ Reference Nash │
//!         └────────────────┘              └────────────────┘
//!            │          │                    │          │
//!            ▼          └─────────┬──────────┘          ▼
//!    ┌──────────────┐             ▼             ┌──────────────┐
//!    │  Dominance   │      ┌────────────┐       │   Support    │
//!    │  Eliminator  │      │ LpBackend  │       │ Enumeration  │
//!    └──────────────┘      └────────────┘       └──────────────┘
//! ```

#![warn(missing_docs)]

/// Matrix game solver module.
///
/// This is the core module containing elimination, the LP backend and both solvers.
pub mod solver;

/// Game generators module.
///
/// Produces payoff matrices for validation and counterexample search.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use solver::{
    eliminate, BatchReport, Comparison, EpaSolution, EpaSolver, GameResult, IndexMap, LpBackend,
    PayoffMatrix, ReferenceSolver, SimplexBackend, SolverConfig, SolverError, Strategy, TestCase,
    VerificationHarness,
};
