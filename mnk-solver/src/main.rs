//! m,n,k game solver
//!
//! Solves a board under perfect play with the descent solver, the graph
//! solver, or both.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use mnk_core::{Board, KeyMode, Move, Outcome, Player};
use mnk_solver::{
    Budget, CheckpointConfig, GameGraph, GraphStats, Solver, SolverConfig, SolverStats,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum Method {
    /// Memoized descent with a transposition table
    Descent,
    /// Full state graph, labeled from the leaves
    Graph,
    /// Run both and require them to agree
    Both,
}

#[derive(Parser, Debug)]
#[command(name = "solver")]
#[command(version, about = "Exact solver for m,n,k games", long_about = None)]
struct Args {
    /// Board rows
    #[arg(long, default_value_t = 3)]
    rows: usize,

    /// Board columns
    #[arg(long, default_value_t = 5)]
    columns: usize,

    /// Marks in a row needed to win
    #[arg(long, default_value_t = 4)]
    k: usize,

    #[arg(long, value_enum, default_value_t = Method::Descent)]
    method: Method,

    /// Key positions by their exact grid instead of their canonical image
    #[arg(long)]
    raw_keys: bool,

    /// Report draws as wins for player 2
    #[arg(long)]
    fold_draws: bool,

    /// Opening moves to play before solving, as row,column pairs
    #[arg(long, num_args = 1..)]
    moves: Vec<String>,

    /// Abort once this many states are stored
    #[arg(long)]
    max_states: Option<usize>,

    /// Abort after this many seconds
    #[arg(long)]
    time_limit_secs: Option<u64>,

    /// Checkpoint file for the descent solver's table
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    #[arg(long, default_value_t = 60)]
    checkpoint_interval_secs: u64,

    #[arg(long, default_value_t = 5)]
    log_interval_secs: u64,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    rows: usize,
    columns: usize,
    k: usize,
    method: Method,
    symmetric_keys: bool,
    outcome: Outcome,
    winner: Option<Player>,
    secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    descent: Option<SolverStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph: Option<GraphStats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    best_moves: Vec<Move>,
}

fn parse_move(text: &str) -> Result<(usize, usize)> {
    let (row, column) = text
        .split_once(',')
        .with_context(|| format!("move {:?} is not of the form row,column", text))?;
    Ok((row.trim().parse()?, column.trim().parse()?))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut board = Board::new(args.rows, args.columns, args.k)?;
    for text in &args.moves {
        let (row, column) = parse_move(text)?;
        board
            .play(row, column)
            .with_context(|| format!("playing opening move {}", text))?;
    }

    // Set up SIGINT handler for graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        warn!("interrupt received, stopping");
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    let mut budget = Budget::unlimited().with_running(running);
    budget.max_states = args.max_states;
    budget.time_limit = args.time_limit_secs.map(Duration::from_secs);

    let key_mode = if args.raw_keys {
        KeyMode::Raw
    } else {
        KeyMode::Symmetric
    };

    info!(
        rows = args.rows,
        columns = args.columns,
        k = args.k,
        method = ?args.method,
        ?key_mode,
        "starting solve"
    );

    let start = Instant::now();
    let mut descent = None;
    let mut graph = None;
    let mut best_moves = Vec::new();

    let descent_outcome = if args.method != Method::Graph {
        let config = SolverConfig {
            key_mode,
            budget: budget.clone(),
            log_interval: Duration::from_secs(args.log_interval_secs),
            checkpoint: args.checkpoint.as_ref().map(|path| CheckpointConfig {
                path: path.clone(),
                interval: Duration::from_secs(args.checkpoint_interval_secs),
            }),
        };
        let mut solver = Solver::for_board(&board, config);

        if let Some(path) = &args.checkpoint {
            if path.exists() {
                // A checkpoint that cannot be resumed is left alone.
                solver
                    .load_checkpoint(path)
                    .with_context(|| format!("resuming from checkpoint {:?}", path))?;
            } else if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let result = solver.solve(&board);
        if let Some(path) = &args.checkpoint {
            // Resolved states are kept even when the solve was cut short.
            solver.save_checkpoint(path).ok();
        }
        let outcome = result?;
        solver.stats.log_summary(solver.table.len());
        if !board.is_over() {
            best_moves = solver.best_moves(&board)?;
        }
        descent = Some(solver.stats.clone());
        Some(outcome)
    } else {
        None
    };

    let graph_outcome = if args.method != Method::Descent {
        let mut built = GameGraph::build(&board, key_mode, &budget)?;
        let outcome = built.propagate()?;
        graph = Some(built.stats());
        Some(outcome)
    } else {
        None
    };

    let outcome = match (descent_outcome, graph_outcome) {
        (Some(a), Some(b)) if a != b => {
            bail!("solvers disagree: descent says {}, graph says {}", a, b)
        }
        (Some(outcome), _) | (None, Some(outcome)) => outcome,
        (None, None) => bail!("no solver selected"),
    };
    let secs = start.elapsed().as_secs_f64();

    let winner = if args.fold_draws {
        Some(outcome.folded_winner())
    } else {
        outcome.winner()
    };

    if args.json {
        let report = Report {
            rows: args.rows,
            columns: args.columns,
            k: args.k,
            method: args.method,
            symmetric_keys: key_mode == KeyMode::Symmetric,
            outcome,
            winner,
            secs,
            descent,
            graph,
            best_moves,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", board);
    println!("{}x{} board, {} in a row", args.rows, args.columns, args.k);
    if let Some(run) = board.winning_run() {
        println!(
            "Already decided: {:?} run from ({},{}) for player {}",
            run.direction, run.row, run.column, run.player as u8
        );
    }
    match winner {
        Some(Player::One) => println!("Player 1 wins with optimal play."),
        Some(Player::Two) => println!("Player 2 wins with optimal play."),
        None => println!("Game is a draw with optimal play."),
    }
    println!("Time: {:.2}s", secs);

    if !best_moves.is_empty() {
        let cells: Vec<String> = best_moves
            .iter()
            .map(|m| format!("({},{})", m.row, m.column))
            .collect();
        println!("Best moves: {}", cells.join(" "));
    }
    if let Some(stats) = &descent {
        println!();
        println!("Positions evaluated: {}", stats.positions_evaluated);
        println!(
            "Terminal positions: {} (P1 {}, P2 {}, draw {})",
            stats.terminal_positions, stats.p1_wins, stats.p2_wins, stats.draws
        );
    }
    if let Some(stats) = &graph {
        println!();
        println!("Graph states: {}", stats.states);
        println!("Graph leaves: {}", stats.leaves);
        println!("Graph edges: {}", stats.edges);
    }

    Ok(())
}
