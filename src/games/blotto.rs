//! Colonel Blotto payoff matrices.
//!
//! An attacker and a defender each split their units across the same set of
//! battlefields. The attacker wins if it outnumbers the defender on ANY
//! battlefield; the defender wins only by matching or exceeding the attacker
//! everywhere.
//!
//! ## Payoffs (to the attacker)
//!
//! | Outcome                                   | Payoff |
//! |-------------------------------------------|--------|
//! | Attacker strictly ahead somewhere         | 1.0    |
//! | Identical forces on every battlefield     | 0.5    |
//! | Otherwise                                 | 0.0    |
//!
//! ## Strategy ordering
//!
//! Pure strategies are the ordered allocations `(u_1, ..., u_k)` with
//! `Σ u_i = units`, sorted lexicographically. For two battlefields and four
//! units that is `(0,4), (1,3), (2,2), (3,1), (4,0)`.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::solver::error::SolverError;
use crate::solver::matrix::PayoffMatrix;

/// One player's split of units across battlefields.
pub type Allocation = Vec<u32>;

/// A Colonel Blotto game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonelBlotto {
    /// Attacking units (row player).
    pub attackers: u32,
    /// Defending units (column player).
    pub defenders: u32,
    /// Number of battlefields.
    pub battlefields: usize,
}

impl ColonelBlotto {
    /// Create a game with the given forces.
    pub fn new(attackers: u32, defenders: u32, battlefields: usize) -> Self {
        Self {
            attackers,
            defenders,
            battlefields,
        }
    }

    /// The attacker's pure strategies, in row order.
    pub fn attacker_allocations(&self) -> Vec<Allocation> {
        allocations(self.attackers, self.battlefields)
    }

    /// The defender's pure strategies, in column order.
    pub fn defender_allocations(&self) -> Vec<Allocation> {
        allocations(self.defenders, self.battlefields)
    }

    /// Payoff to the attacker for one pair of allocations.
    pub fn payoff(attacker: &[u32], defender: &[u32]) -> f64 {
        if attacker.iter().zip(defender).any(|(a, d)| a > d) {
            1.0
        } else if attacker == defender {
            0.5
        } else {
            0.0
        }
    }

    /// Build the full payoff matrix.
    ///
    /// Fails with [`SolverError::EmptyMatrix`] when either side has no
    /// allocation, which happens with zero battlefields and positive units.
    pub fn payoff_matrix(&self) -> Result<PayoffMatrix, SolverError> {
        let rows = self.attacker_allocations();
        let columns = self.defender_allocations();
        PayoffMatrix::from_fn(rows.len(), columns.len(), |i, j| {
            Self::payoff(&rows[i], &columns[j])
        })
    }
}

impl fmt::Display for ColonelBlotto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Blotto {}v{} on {} battlefields",
            self.attackers, self.defenders, self.battlefields
        )
    }
}

/// All ordered ways to place `units` on `battlefields`, lexicographically sorted.
pub fn allocations(units: u32, battlefields: usize) -> Vec<Allocation> {
    if battlefields == 0 {
        return if units == 0 { vec![Vec::new()] } else { Vec::new() };
    }
    // The cartesian product is emitted in lexicographic order.
    itertools::repeat_n(0..=units, battlefields)
        .multi_cartesian_product()
        .filter(|allocation| allocation.iter().sum::<u32>() == units)
        .collect()
}

/// Format an allocation as `(a, b, c)`.
pub fn format_allocation(allocation: &[u32]) -> String {
    let parts: Vec<String> = allocation.iter().map(|u| u.to_string()).collect();
    format!("({})", parts.join(", "))
}
