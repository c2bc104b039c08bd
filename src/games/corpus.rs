//! Verification corpora.
//!
//! [`KNOWN_GAMES`] lists hand-built games with their Nash values: the worked
//! example from the EPA paper, small classics and the cases built while
//! searching for counterexamples. [`random_cases`] fills out a batch with
//! seeded synthetic games.

use crate::games::blotto::ColonelBlotto;
use crate::games::synthetic::{Family, GameGenerator};
use crate::solver::error::SolverError;
use crate::solver::harness::TestCase;
use crate::solver::matrix::PayoffMatrix;

/// A hand-built game with a known value.
#[derive(Debug, Clone, Copy)]
pub struct KnownGame {
    /// Case label.
    pub name: &'static str,
    /// Payoff rows.
    pub payoffs: &'static [&'static [f64]],
    /// Nash value.
    pub value: f64,
    /// EPA value, when it differs from the Nash value.
    pub epa_value: Option<f64>,
}

impl KnownGame {
    /// Build the payoff matrix.
    pub fn matrix(&self) -> Result<PayoffMatrix, SolverError> {
        PayoffMatrix::new(self.payoffs.iter().map(|row| row.to_vec()).collect())
    }

    /// Value the EPA solver is expected to report.
    pub fn expected_epa_value(&self) -> f64 {
        self.epa_value.unwrap_or(self.value)
    }
}

/// Hand-built games.
pub const KNOWN_GAMES: &[KnownGame] = &[
    KnownGame {
        name: "paper-3x3",
        payoffs: &[&[0.5, 1.0, 1.0], &[1.0, 0.5, 1.0], &[1.0, 1.0, 0.0]],
        value: 0.8,
        epa_value: None,
    },
    KnownGame {
        name: "symmetric-2x2",
        payoffs: &[&[0.5, 1.0], &[0.0, 0.5]],
        value: 0.5,
        epa_value: None,
    },
    KnownGame {
        name: "skewed-diagonal-3x3",
        payoffs: &[&[10.0, 0.0, 0.0], &[0.0, 5.0, 0.0], &[0.0, 0.0, 1.0]],
        value: 10.0 / 13.0,
        epa_value: None,
    },
    KnownGame {
        name: "diagonal-3-2-1",
        payoffs: &[&[3.0, 0.0, 0.0], &[0.0, 2.0, 0.0], &[0.0, 0.0, 1.0]],
        value: 6.0 / 11.0,
        epa_value: None,
    },
    KnownGame {
        name: "dominated-mixture-row",
        payoffs: &[&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.5, 0.5, 0.0]],
        value: 0.0,
        epa_value: None,
    },
    KnownGame {
        name: "weak-column",
        payoffs: &[&[0.0, 1.0, 1.0], &[1.0, 0.0, 1.0], &[1.0, 1.0, 0.1]],
        value: 0.678_571_428_571_428_6,
        epa_value: None,
    },
    KnownGame {
        name: "extreme-2x2",
        payoffs: &[&[100.0, 0.0], &[0.0, 1.0]],
        value: 100.0 / 101.0,
        epa_value: None,
    },
    KnownGame {
        name: "three-to-one-2x2",
        payoffs: &[&[3.0, 0.0], &[0.0, 1.0]],
        value: 0.75,
        epa_value: None,
    },
    KnownGame {
        name: "matching-pennies",
        payoffs: &[&[1.0, 0.0], &[0.0, 1.0]],
        value: 0.5,
        epa_value: None,
    },
    KnownGame {
        name: "gradient-4x4",
        payoffs: &[
            &[4.0, 3.0, 2.0, 1.0],
            &[3.0, 4.0, 1.0, 2.0],
            &[2.0, 1.0, 4.0, 3.0],
            &[1.0, 2.0, 3.0, 4.0],
        ],
        value: 2.5,
        epa_value: None,
    },
    KnownGame {
        name: "constant-3x3",
        payoffs: &[&[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0], &[1.0, 1.0, 1.0]],
        value: 1.0,
        epa_value: None,
    },
    KnownGame {
        name: "one-different-cell",
        payoffs: &[&[0.5, 0.5, 0.5], &[0.5, 0.5, 0.5], &[0.5, 0.5, 1.0]],
        value: 0.5,
        epa_value: None,
    },
    KnownGame {
        name: "cyclic-0-1-2",
        payoffs: &[&[0.0, 1.0, 2.0], &[2.0, 0.0, 1.0], &[1.0, 2.0, 0.0]],
        value: 1.0,
        epa_value: None,
    },
    KnownGame {
        name: "cyclic-single-win",
        payoffs: &[&[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0], &[1.0, 0.0, 0.0]],
        value: 1.0 / 3.0,
        epa_value: None,
    },
    KnownGame {
        name: "rock-paper-scissors",
        payoffs: &[&[0.5, 1.0, 0.0], &[0.0, 0.5, 1.0], &[1.0, 0.0, 0.5]],
        value: 0.5,
        epa_value: None,
    },
    KnownGame {
        name: "exploit-uniform",
        payoffs: &[&[0.0, 0.0, 10.0], &[0.0, 5.0, 0.0], &[1.0, 0.0, 0.0]],
        value: 10.0 / 13.0,
        epa_value: None,
    },
    KnownGame {
        // Column 2 survives elimination but lies outside the optimal support.
        name: "undominated-idle-column",
        payoffs: &[&[3.0, 0.0, 2.0], &[0.0, 3.0, 2.0]],
        value: 1.5,
        epa_value: Some(5.0 / 3.0),
    },
];

/// Two-battlefield Blotto games with their values.
pub const BLOTTO_GAMES: &[(ColonelBlotto, f64)] = &[
    (
        ColonelBlotto {
            attackers: 4,
            defenders: 4,
            battlefields: 2,
        },
        0.9,
    ),
    (
        ColonelBlotto {
            attackers: 5,
            defenders: 5,
            battlefields: 2,
        },
        11.0 / 12.0,
    ),
    (
        ColonelBlotto {
            attackers: 6,
            defenders: 8,
            battlefields: 2,
        },
        2.0 / 3.0,
    ),
    (
        ColonelBlotto {
            attackers: 8,
            defenders: 9,
            battlefields: 2,
        },
        0.8,
    ),
];

/// Every hand-built game as a test case.
pub fn known_cases() -> Result<Vec<TestCase>, SolverError> {
    KNOWN_GAMES
        .iter()
        .map(|game| Ok(TestCase::new(game.name, game.matrix()?)))
        .collect()
}

/// Test cases for the given Blotto games.
pub fn blotto_cases(games: &[ColonelBlotto]) -> Result<Vec<TestCase>, SolverError> {
    games
        .iter()
        .map(|game| {
            let name = format!(
                "blotto-{}v{}-{}",
                game.attackers, game.defenders, game.battlefields
            );
            Ok(TestCase::new(name, game.payoff_matrix()?))
        })
        .collect()
}

/// `count` seeded random games, cycling through [`Family::RANDOM`].
pub fn random_cases(
    count: usize,
    rows: usize,
    columns: usize,
    seed: Option<u64>,
) -> Result<Vec<TestCase>, SolverError> {
    let mut generator = GameGenerator::new(seed);
    let families = Family::RANDOM;
    (0..count)
        .map(|i| {
            let family = families[i % families.len()];
            let matrix = generator.generate(family, rows, columns)?;
            let (m, n) = matrix.shape();
            Ok(TestCase::new(
                format!("{}-{}x{}-{}", family.label(), m, n, i),
                matrix,
            ))
        })
        .collect()
}
