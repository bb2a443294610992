//! Export binary checkpoint to SQLite database.
//!
//! Usage: export_sqlite [--input data/3x5k4.bin] [--output data/3x5k4.db]
//!
//! Converts the binary checkpoint format to a SQLite database for
//! on-demand lookups. Keys are stored as the packed grid bytes.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use mnk_solver::checkpoint::Checkpoint;
use rusqlite::{params, Connection};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "export_sqlite")]
#[command(version, about = "Convert a solver checkpoint to SQLite", long_about = None)]
struct Args {
    #[arg(long, default_value = "data/3x5k4.bin")]
    input: PathBuf,

    #[arg(long, default_value = "data/3x5k4.db")]
    output: PathBuf,

    /// Rows per progress line
    #[arg(long, default_value_t = 100_000)]
    batch_size: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!(input = ?args.input, output = ?args.output, "exporting checkpoint");

    // Load binary checkpoint
    let start = Instant::now();
    let checkpoint = Checkpoint::load(&args.input)
        .with_context(|| format!("loading checkpoint {:?}", args.input))?;
    let shape = checkpoint.shape;
    info!(
        positions = checkpoint.entries.len(),
        secs = %format!("{:.2}", start.elapsed().as_secs_f64()),
        "loaded checkpoint"
    );

    // Remove existing output file if present
    if args.output.exists() {
        std::fs::remove_file(&args.output).ok();
    }

    let start = Instant::now();
    let conn = Connection::open(&args.output).context("creating database")?;

    conn.execute(
        "CREATE TABLE meta (
            rows INTEGER NOT NULL,
            columns INTEGER NOT NULL,
            k INTEGER NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "INSERT INTO meta (rows, columns, k) VALUES (?1, ?2, ?3)",
        params![shape.rows as i64, shape.columns as i64, shape.k as i64],
    )?;
    conn.execute(
        "CREATE TABLE positions (
            key BLOB NOT NULL,
            to_move INTEGER NOT NULL,
            outcome INTEGER NOT NULL,
            PRIMARY KEY (key, to_move)
        )",
        [],
    )?;

    let total = checkpoint.entries.len();
    let mut inserted = 0usize;

    // Use a transaction for much faster inserts
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt =
            tx.prepare("INSERT INTO positions (key, to_move, outcome) VALUES (?1, ?2, ?3)")?;

        for (i, (key, outcome)) in checkpoint.entries.iter().enumerate() {
            stmt.execute(params![
                key.packed_cells(),
                key.to_move() as i32,
                outcome.to_i8() as i32
            ])?;
            inserted += 1;

            if (i + 1) % args.batch_size.max(1) == 0 {
                let pct = 100.0 * inserted as f64 / total as f64;
                let rate = inserted as f64 / start.elapsed().as_secs_f64();
                info!(
                    pct = %format!("{:.0}%", pct),
                    inserted,
                    total,
                    rate = %format!("{:.0}/s", rate),
                    "inserting"
                );
            }
        }
    }
    tx.commit()?;

    let insert_time = start.elapsed().as_secs_f64();
    info!(
        inserted,
        secs = %format!("{:.2}", insert_time),
        "inserted positions"
    );

    // Spot-check a few lookups
    let step = (total / 5).max(1);
    for (key, expected) in checkpoint.entries.iter().step_by(step).take(5) {
        let stored: i32 = conn.query_row(
            "SELECT outcome FROM positions WHERE key = ?1 AND to_move = ?2",
            params![key.packed_cells(), key.to_move() as i32],
            |row| row.get(0),
        )?;
        ensure!(
            stored == expected.to_i8() as i32,
            "outcome mismatch after export: stored {}, expected {}",
            stored,
            expected
        );
    }
    info!("verification passed");

    let input_size = std::fs::metadata(&args.input).map(|m| m.len()).unwrap_or(0);
    let output_size = std::fs::metadata(&args.output).map(|m| m.len()).unwrap_or(0);

    println!("File sizes:");
    println!("  Binary: {:.1} MB", input_size as f64 / 1024.0 / 1024.0);
    println!("  SQLite: {:.1} MB", output_size as f64 / 1024.0 / 1024.0);
    println!("Database created at {:?}", args.output);

    Ok(())
}
