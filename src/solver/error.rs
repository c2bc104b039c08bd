//! Error types for the matrix game solvers.
//!
//! Errors fall into two classes:
//! - **Invalid matrix**: the caller supplied something that is not a finite,
//!   rectangular, non-empty payoff matrix (or a distribution that does not
//!   fit it). These are surfaced immediately and never recovered silently.
//! - **Internal solver**: a well-formed problem that the solver failed on.
//!   This always indicates a bug, so the error carries a dump of the matrix.
//!
//! A divergence between the EPA and Nash values is *not* an error of either
//! kind; see [`ToleranceViolation`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad classification of a [`SolverError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The input matrix or distribution was malformed.
    InvalidMatrix,
    /// The solver failed on a well-formed problem.
    InternalSolver,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidMatrix => write!(f, "invalid matrix"),
            ErrorKind::InternalSolver => write!(f, "internal solver error"),
        }
    }
}

/// Errors raised while building matrices or solving games.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// The matrix has zero rows or zero columns.
    EmptyMatrix,
    /// A row has a different length than the first row.
    RaggedMatrix {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// An entry is NaN or infinite.
    NonFiniteEntry {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        column: usize,
        /// The offending value.
        value: f64,
    },
    /// A distribution's length does not match the matrix dimension it is used with.
    DimensionMismatch {
        /// Length required by the matrix.
        expected: usize,
        /// Length supplied.
        found: usize,
    },
    /// A vector that should be a probability distribution is not one.
    InvalidDistribution(String),
    /// Delimited text could not be parsed into a matrix.
    Parse {
        /// 1-based line number.
        line: usize,
        /// The token that failed to parse.
        token: String,
    },
    /// The solver failed on a well-formed problem.
    Internal {
        /// What went wrong.
        reason: String,
        /// Dump of the matrix being solved.
        matrix: String,
    },
}

impl SolverError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolverError::Internal { .. } => ErrorKind::InternalSolver,
            _ => ErrorKind::InvalidMatrix,
        }
    }

    /// Build an internal error carrying a dump of `matrix`.
    pub fn internal(reason: impl Into<String>, matrix: &impl fmt::Display) -> Self {
        SolverError::Internal {
            reason: reason.into(),
            matrix: matrix.to_string(),
        }
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::EmptyMatrix => write!(f, "payoff matrix has a zero dimension"),
            SolverError::RaggedMatrix { row, expected, found } => write!(
                f,
                "row {} has {} entries, expected {}",
                row, found, expected
            ),
            SolverError::NonFiniteEntry { row, column, value } => write!(
                f,
                "entry ({}, {}) is not finite: {}",
                row, column, value
            ),
            SolverError::DimensionMismatch { expected, found } => write!(
                f,
                "distribution has length {}, matrix requires {}",
                found, expected
            ),
            SolverError::InvalidDistribution(msg) => write!(f, "invalid distribution: {}", msg),
            SolverError::Parse { line, token } => {
                write!(f, "line {}: cannot parse '{}' as a number", line, token)
            }
            SolverError::Internal { reason, matrix } => {
                write!(f, "internal solver error: {}\nmatrix:\n{}", reason, matrix)
            }
        }
    }
}

impl std::error::Error for SolverError {}

/// EPA and Nash values diverged beyond the configured tolerance.
///
/// This is a finding about the heuristic, not a defect in either solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceViolation {
    /// Value reported by the EPA solver.
    pub epa_value: f64,
    /// Value reported by the reference Nash solver.
    pub nash_value: f64,
    /// `|epa_value - nash_value|`.
    pub difference: f64,
    /// Tolerance the difference was checked against.
    pub tolerance: f64,
}

impl fmt::Display for ToleranceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EPA value {:.9} differs from Nash value {:.9} by {:.3e} (tolerance {:.1e})",
            self.epa_value, self.nash_value, self.difference, self.tolerance
        )
    }
}

impl std::error::Error for ToleranceViolation {}
