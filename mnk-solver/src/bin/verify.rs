//! Cross-check the descent and graph solvers on every reachable state.
//!
//! Usage: verify --rows 3 --columns 3 --k 3 [--raw-keys] [--max-states N]

use anyhow::{bail, Result};
use clap::Parser;
use mnk_core::{Board, KeyMode};
use mnk_solver::{cross_validate, Budget};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "verify")]
#[command(version, about = "Compare both solvers over a reachable state graph", long_about = None)]
struct Args {
    #[arg(long, default_value_t = 3)]
    rows: usize,

    #[arg(long, default_value_t = 3)]
    columns: usize,

    #[arg(long, default_value_t = 3)]
    k: usize,

    /// Key positions by their exact grid instead of their canonical image
    #[arg(long)]
    raw_keys: bool,

    #[arg(long)]
    max_states: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let board = Board::new(args.rows, args.columns, args.k)?;
    let key_mode = if args.raw_keys {
        KeyMode::Raw
    } else {
        KeyMode::Symmetric
    };

    let mut budget = Budget::unlimited();
    budget.max_states = args.max_states;

    let agreement = cross_validate(&board, key_mode, &budget)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&agreement)?);
    } else {
        println!("{}x{} board, {} in a row", args.rows, args.columns, args.k);
        println!("States compared: {}", agreement.states);
        println!("Root outcome: {}", agreement.root);
        for mismatch in &agreement.mismatches {
            println!(
                "\nMismatch after {} marks: descent {}, graph {}",
                mismatch.marks_placed, mismatch.descent, mismatch.graph
            );
            print!("{}", mismatch.board);
        }
    }

    if !agreement.is_consistent() {
        bail!("{} states disagree", agreement.mismatches.len());
    }
    Ok(())
}
