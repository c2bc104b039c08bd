//! Matrix game solvers.
//!
//! This module holds everything needed to solve a finite two-person
//! zero-sum game given as a payoff matrix, both with the Equal
//! Probabilities Approach (EPA) heuristic and with an exact reference
//! method, and to compare the two.
//!
//! # Overview
//!
//! The EPA pipeline is:
//! 1. Iteratively remove weakly dominated rows and columns
//!    ([`dominance`])
//! 2. Fix the column player to the uniform distribution over what remains
//! 3. Solve the row player's program on the reduced matrix ([`lp`])
//! 4. Map both strategies back to the original indices ([`epa`])
//!
//! The reference solver ([`nash`]) computes a true equilibrium, by support
//! enumeration for small games and by the simplex method otherwise. The
//! [`harness`] runs both over a corpus and collects the games where they
//! disagree.
//!
//! # Example
//!
//! ```
//! use epa_solver::solver::{PayoffMatrix, SolverConfig, VerificationHarness};
//!
//! let harness = VerificationHarness::new(SolverConfig::default()).unwrap();
//! let matrix = PayoffMatrix::new(vec![vec![100.0, 0.0], vec![0.0, 1.0]]).unwrap();
//!
//! let comparison = harness.compare(&matrix).unwrap();
//! assert!(comparison.matched);
//! assert!((comparison.nash_value - 100.0 / 101.0).abs() < 1e-6);
//! ```
//!
//! # Conventions
//!
//! - The row player maximizes; the column player minimizes.
//! - Values are expected payoffs to the row player.
//! - Every strategy returned has the length of the ORIGINAL matrix side,
//!   with zeros at eliminated indices.
//!
//! # Theory
//!
//! By the minimax theorem every finite zero-sum game has a value `v` with
//!
//! ```text
//! max_p min_q  pᵀ A q  =  v  =  min_q max_p  pᵀ A q
//! ```
//!
//! EPA replaces the inner minimization by a fixed uniform `q`. It is exact
//! whenever the column player's optimal strategy on the reduced matrix is
//! uniform, and can overstate `v` otherwise.

pub mod config;
pub mod dominance;
pub mod epa;
pub mod error;
pub mod harness;
pub mod lp;
pub mod matrix;
pub mod nash;

// Re-export main types for convenient access
pub use config::{ConfigError, HarnessStats, NashMethod, SolverConfig, TiePolicy};
pub use dominance::{eliminate, eliminate_with_cap, Reduction};
pub use epa::{EpaSolution, EpaSolver};
pub use error::{ErrorKind, SolverError, ToleranceViolation};
pub use harness::{
    BatchReport, CaseFailure, CaseOutcome, CaseRecord, Comparison, TestCase, VerificationHarness,
};
pub use lp::{certify, BestResponse, LpBackend, SimplexBackend};
pub use matrix::{GameResult, IndexMap, PayoffMatrix, Strategy};
pub use nash::{support_enumeration, support_pairs, ReferenceSolver};
