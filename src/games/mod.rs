//! Game generators for the matrix solvers.
//!
//! Everything here produces plain [`PayoffMatrix`](crate::solver::PayoffMatrix)
//! values; the solvers never depend on this module. These serve as:
//!
//! 1. **Validation**: games with known values (the paper example, Blotto)
//!    check that both solvers are correct.
//!
//! 2. **Search**: seeded random families feed the verification harness
//!    while it looks for games where EPA and Nash disagree.
//!
//! 3. **Benchmarks**: standardized games for performance testing.
//!
//! ## Available Generators
//!
//! - [`blotto`]: Colonel Blotto with any forces and battlefield count
//! - [`synthetic`]: random and structured matrix families
//! - [`corpus`]: hand-built known games and batch builders

pub mod blotto;
pub mod corpus;
pub mod synthetic;

pub use blotto::{allocations, format_allocation, Allocation, ColonelBlotto};
pub use corpus::{blotto_cases, known_cases, random_cases, KnownGame, BLOTTO_GAMES, KNOWN_GAMES};
pub use synthetic::{constant, cyclic, Family, GameGenerator};
