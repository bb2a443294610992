//! Compute statistics from a solver checkpoint.
//!
//! Usage: stats [--input data/3x5k4.bin]

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use mnk_core::{Board, CanonicalKey, KeyMode, Outcome, Player};
use mnk_solver::checkpoint::Checkpoint;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stats")]
#[command(version, about = "Outcome statistics of a solved checkpoint", long_about = None)]
struct Args {
    #[arg(long, default_value = "data/3x5k4.bin")]
    input: PathBuf,
}

#[derive(Default)]
struct Tally {
    p1_wins: u64,
    p2_wins: u64,
    draws: u64,
    terminal: u64,
}

impl Tally {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win(Player::One) => self.p1_wins += 1,
            Outcome::Win(Player::Two) => self.p2_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    fn total(&self) -> u64 {
        self.p1_wins + self.p2_wins + self.draws
    }
}

fn pct(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

/// Outcome distribution, overall and by number of marks on the board
fn outcome_distribution(checkpoint: &Checkpoint) {
    println!("=== Outcome Distribution ===");

    let shape = checkpoint.shape;
    let mut overall = Tally::default();
    let mut by_marks: BTreeMap<usize, Tally> = BTreeMap::new();
    let mut invalid = 0usize;

    for (key, outcome) in &checkpoint.entries {
        overall.record(*outcome);

        let board = match Board::from_cells(shape.rows, shape.columns, shape.k, key.cells()) {
            Ok(board) => board,
            Err(e) => {
                invalid += 1;
                warn!(error = %e, "entry is not a valid position");
                continue;
            }
        };
        let tally = by_marks.entry(board.marks_placed()).or_default();
        tally.record(*outcome);
        if board.is_over() {
            tally.terminal += 1;
        }
    }

    let total = overall.total();
    println!("P1 wins: {} ({:.2}%)", overall.p1_wins, pct(overall.p1_wins, total));
    println!("P2 wins: {} ({:.2}%)", overall.p2_wins, pct(overall.p2_wins, total));
    println!("Draws:   {} ({:.2}%)", overall.draws, pct(overall.draws, total));
    println!("Total:   {}", total);
    if invalid > 0 {
        println!("Invalid: {}", invalid);
    }
    println!();

    println!("=== By Marks Placed ===");
    println!("{:>5} {:>10} {:>10} {:>10} {:>10}", "marks", "p1", "p2", "draw", "terminal");
    for (marks, tally) in &by_marks {
        println!(
            "{:>5} {:>10} {:>10} {:>10} {:>10}",
            marks, tally.p1_wins, tally.p2_wins, tally.draws, tally.terminal
        );
    }
    println!();
}

/// Value of each opening move, looked up in the table
fn first_move_values(
    checkpoint: &Checkpoint,
    table: &HashMap<CanonicalKey, Outcome>,
) -> Result<()> {
    println!("=== First Move Values ===");

    let shape = checkpoint.shape;
    let board = Board::new(shape.rows, shape.columns, shape.k)?;

    match lookup(table, &board) {
        Some(outcome) => println!("Initial position: {}", outcome),
        None => println!("Initial position NOT FOUND in table!"),
    }

    for row in 0..shape.rows {
        let cells: Vec<String> = (0..shape.columns)
            .map(|column| {
                let mut child = board.clone();
                if child.play(row, column).is_err() {
                    return "?".to_string();
                }
                match lookup(table, &child) {
                    Some(Outcome::Win(Player::One)) => "W".to_string(),
                    Some(Outcome::Win(Player::Two)) => "L".to_string(),
                    Some(Outcome::Draw) => "D".to_string(),
                    None => ".".to_string(),
                }
            })
            .collect();
        println!("  {}", cells.join(" "));
    }
    println!("  (W = player 1 wins, L = player 2 wins, D = draw, . = not in table)");
    println!();
    Ok(())
}

/// Tables are keyed by canonical image unless solved with raw keys.
fn lookup(table: &HashMap<CanonicalKey, Outcome>, board: &Board) -> Option<Outcome> {
    table
        .get(&board.key(KeyMode::Symmetric))
        .or_else(|| table.get(&board.key(KeyMode::Raw)))
        .copied()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let start = Instant::now();
    let checkpoint = Checkpoint::load(&args.input)
        .with_context(|| format!("loading checkpoint {:?}", args.input))?;
    info!(
        positions = checkpoint.entries.len(),
        secs = %format!("{:.2}", start.elapsed().as_secs_f64()),
        "loaded checkpoint"
    );

    let shape = checkpoint.shape;
    println!("{}x{} board, {} in a row\n", shape.rows, shape.columns, shape.k);

    outcome_distribution(&checkpoint);

    let table: HashMap<CanonicalKey, Outcome> = checkpoint.entries.iter().cloned().collect();
    first_move_values(&checkpoint, &table)?;

    Ok(())
}
