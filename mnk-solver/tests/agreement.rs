//! Descent and graph solvers must agree on every reachable state.

use mnk_core::{Board, Error, KeyMode, Outcome, Player};
use mnk_solver::{cross_validate, solve_graph, Budget, SolveError, Solver, SolverConfig};
use rand::prelude::*;

fn assert_agree(rows: usize, columns: usize, k: usize, key_mode: KeyMode) -> Outcome {
    let board = Board::new(rows, columns, k).unwrap();
    let agreement = cross_validate(&board, key_mode, &Budget::unlimited()).unwrap();
    assert!(
        agreement.is_consistent(),
        "{}x{} k={}: {} mismatches",
        rows,
        columns,
        k,
        agreement.mismatches.len()
    );
    agreement.root
}

#[test]
fn test_small_shapes_agree() {
    assert_eq!(assert_agree(1, 1, 1, KeyMode::Symmetric), Outcome::Win(Player::One));
    assert_eq!(assert_agree(1, 3, 3, KeyMode::Symmetric), Outcome::Draw);
    assert_eq!(assert_agree(2, 2, 2, KeyMode::Symmetric), Outcome::Win(Player::One));
    assert_eq!(assert_agree(3, 3, 3, KeyMode::Symmetric), Outcome::Draw);
    assert_agree(2, 4, 2, KeyMode::Symmetric);
    assert_agree(3, 4, 3, KeyMode::Symmetric);
}

#[test]
fn test_raw_keys_agree() {
    assert_eq!(assert_agree(3, 3, 3, KeyMode::Raw), Outcome::Draw);
    assert_agree(2, 3, 2, KeyMode::Raw);
}

#[test]
fn test_root_value_independent_of_key_mode() {
    for (rows, columns, k) in [(2, 3, 2), (3, 3, 2), (2, 4, 3), (3, 3, 3)] {
        let board = Board::new(rows, columns, k).unwrap();
        let symmetric = solve_graph(&board, KeyMode::Symmetric, &Budget::unlimited()).unwrap();
        let raw = solve_graph(&board, KeyMode::Raw, &Budget::unlimited()).unwrap();
        assert_eq!(symmetric, raw, "{}x{} k={}", rows, columns, k);
    }
}

#[test]
fn test_random_midgame_positions_agree() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..8 {
        let mut board = Board::new(3, 4, 3).unwrap();
        let plies = rng.random_range(2..6);
        for _ in 0..plies {
            let moves = board.legal_moves();
            if moves.is_empty() {
                break;
            }
            let mov = moves[rng.random_range(0..moves.len())];
            board.apply_move(mov).unwrap();
        }

        let mut solver = Solver::for_board(&board, SolverConfig::default());
        let descent = solver.solve(&board).unwrap();
        let graph = solve_graph(&board, KeyMode::Symmetric, &Budget::unlimited()).unwrap();
        assert_eq!(descent, graph, "disagreement on\n{}", board);
    }
}

#[test]
fn test_impossible_k_is_rejected() {
    assert!(matches!(
        Board::new(3, 3, 4),
        Err(Error::InvalidDimension { .. })
    ));
}

#[test]
fn test_budget_is_enforced_by_both_solvers() {
    let board = Board::new(3, 5, 4).unwrap();
    let budget = Budget::unlimited().with_max_states(1_000);

    assert!(matches!(
        solve_graph(&board, KeyMode::Symmetric, &budget),
        Err(SolveError::ResourceExhausted { .. })
    ));

    let mut solver = Solver::for_board(
        &board,
        SolverConfig {
            budget,
            ..SolverConfig::default()
        },
    );
    assert!(matches!(
        solver.solve(&board),
        Err(SolveError::ResourceExhausted { .. })
    ));
    assert!(solver.table.len() <= 1_001);
}

#[test]
#[ignore] // Slow in debug builds: cargo test --release -- --ignored
fn test_three_by_five_four_in_a_row_agrees() {
    let outcome = assert_agree(3, 5, 4, KeyMode::Symmetric);
    let board = Board::new(3, 5, 4).unwrap();
    let mut solver = Solver::for_board(&board, SolverConfig::default());
    assert_eq!(solver.solve(&board).unwrap(), outcome);
}
