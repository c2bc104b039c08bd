//! Cross-module properties over seeded random games.

use epa_solver::games::{random_cases, ColonelBlotto, Family, GameGenerator};
use epa_solver::solver::{certify, eliminate, LpBackend, NashMethod, SimplexBackend};
use epa_solver::{EpaSolver, PayoffMatrix, ReferenceSolver, SolverConfig, VerificationHarness};

fn corpus(seed: u64) -> Vec<PayoffMatrix> {
    let mut generator = GameGenerator::new(Some(seed));
    let mut matrices = Vec::new();
    for (rows, columns) in [(2, 2), (2, 5), (3, 3), (4, 3), (4, 4), (5, 5)] {
        for family in Family::RANDOM {
            for _ in 0..3 {
                matrices.push(generator.generate(family, rows, columns).unwrap());
            }
        }
    }
    matrices
}

fn scale(matrix: &PayoffMatrix) -> f64 {
    (matrix.max_entry() - matrix.min_entry()).max(1.0)
}

#[test]
fn test_nash_methods_agree() {
    let enumeration = ReferenceSolver::from_config(
        &SolverConfig::default().with_nash_method(NashMethod::SupportEnumeration),
    );
    let simplex =
        ReferenceSolver::from_config(&SolverConfig::default().with_nash_method(NashMethod::Simplex));

    for matrix in corpus(1) {
        let a = enumeration.solve_nash(&matrix).unwrap();
        let b = simplex.solve_nash(&matrix).unwrap();
        assert!(
            (a.value - b.value).abs() <= 1e-6 * scale(&matrix),
            "enumeration {} vs simplex {} on\n{}",
            a.value,
            b.value,
            matrix
        );
    }
}

#[test]
fn test_nash_results_are_certified() {
    let solver = ReferenceSolver::new();
    for matrix in corpus(2) {
        let result = solver.solve_nash(&matrix).unwrap();
        assert_eq!(result.row_strategy.len(), matrix.num_rows());
        assert_eq!(result.column_strategy.len(), matrix.num_columns());
        certify(
            &matrix,
            &result.row_strategy,
            &result.column_strategy,
            result.value,
        )
        .unwrap();
    }
}

#[test]
fn test_elimination_preserves_value() {
    let backend = SimplexBackend::new();
    for matrix in corpus(3) {
        let reduction = eliminate(&matrix);
        let full = backend.minimax(&matrix).unwrap().value;
        let reduced = backend.minimax(&reduction.matrix).unwrap().value;
        assert!(
            (full - reduced).abs() <= 1e-6 * scale(&matrix),
            "value {} became {} after elimination of\n{}",
            full,
            reduced,
            matrix
        );

        // A second run finds nothing more to remove.
        let again = eliminate(&reduction.matrix);
        assert_eq!(again.matrix, reduction.matrix);
        assert_eq!(again.passes, 1);
    }
}

#[test]
fn test_epa_never_undershoots_nash() {
    let epa = EpaSolver::new();
    let nash = ReferenceSolver::new();
    for matrix in corpus(4) {
        let e = epa.solve(&matrix).unwrap();
        let n = nash.solve_nash(&matrix).unwrap();
        assert!(
            e.value >= n.value - 1e-6 * scale(&matrix),
            "EPA {} below Nash {} on\n{}",
            e.value,
            n.value,
            matrix
        );
        assert!(e.value >= matrix.min_entry() - 1e-9 && e.value <= matrix.max_entry() + 1e-9);
    }
}

#[test]
fn test_epa_strategies_respect_elimination() {
    let solver = EpaSolver::new();
    for matrix in corpus(5) {
        let solution = solver.solve_detailed(&matrix).unwrap();
        let map = &solution.index_map;
        for &row in &map.eliminated_rows() {
            assert_eq!(solution.result.row_strategy.probability(row), 0.0);
        }
        for &column in &map.eliminated_columns() {
            assert_eq!(solution.result.column_strategy.probability(column), 0.0);
        }
        let weight = 1.0 / map.columns().len() as f64;
        for &column in map.columns() {
            assert!((solution.result.column_strategy.probability(column) - weight).abs() < 1e-12);
        }
    }
}

#[test]
fn test_batch_over_random_corpus() {
    let cases = random_cases(60, 4, 4, Some(99)).unwrap();
    let harness = VerificationHarness::new(SolverConfig::default().with_threads(2)).unwrap();
    let report = harness.run_batch(&cases);

    assert_eq!(report.records.len(), 60);
    assert_eq!(report.stats.failed, 0);
    assert_eq!(report.stats.matched + report.stats.mismatched, 60);
    for record in report.counterexamples() {
        let comparison = record.comparison().unwrap();
        assert!(comparison.epa_value > comparison.nash_value);
    }

    let sequential = VerificationHarness::new(SolverConfig::default().with_parallel(false)).unwrap();
    let again = sequential.run_batch(&cases);
    assert_eq!(again.records, report.records);
}

#[test]
fn test_blotto_three_battlefields() {
    let matrix = ColonelBlotto::new(3, 3, 3).payoff_matrix().unwrap();
    assert_eq!(matrix.shape(), (10, 10));

    // Equal-size supports of a 10x10 game number C(20, 10); the simplex is quicker.
    let config = SolverConfig::default().with_nash_method(NashMethod::Simplex);
    let harness = VerificationHarness::new(config).unwrap();
    let comparison = harness.compare(&matrix).unwrap();
    assert!((comparison.nash_value - 0.95).abs() < 1e-6);
    assert!(comparison.matched);
}
