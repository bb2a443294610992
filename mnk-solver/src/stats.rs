//! Solver statistics tracking.

use std::time::Instant;

use mnk_core::{Outcome, Player};
use serde::Serialize;
use tracing::info;

/// Peak resident set size of this process in bytes.
#[cfg(unix)]
pub fn peak_memory() -> Option<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    // SAFETY: getrusage fills the struct when it returns 0.
    let usage = unsafe {
        if libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) != 0 {
            return None;
        }
        usage.assume_init()
    };
    let max_rss = u64::try_from(usage.ru_maxrss).ok()?;
    // macOS reports bytes, other unixes kilobytes.
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss * 1024)
    }
}

#[cfg(not(unix))]
pub fn peak_memory() -> Option<u64> {
    None
}

/// Render a byte count with a binary unit, e.g. `3.0 MiB`.
pub fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Statistics collected by the descent solver.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SolverStats {
    /// Positions whose outcome was computed from their children
    pub positions_evaluated: u64,

    /// Cache hits (position already in transposition table)
    pub cache_hits: u64,

    /// Terminal positions (someone won or the board filled up)
    pub terminal_positions: u64,

    /// Maximum stack depth reached
    pub max_depth: u64,

    /// Sibling moves skipped after a winning move was found
    pub branches_pruned: u64,

    /// Breakdown of terminal outcomes
    pub p1_wins: u64,
    pub p2_wins: u64,
    pub draws: u64,

    #[serde(skip)]
    start_time: Option<Instant>,
    #[serde(skip)]
    last_log_time: Option<Instant>,
    #[serde(skip)]
    last_log_positions: u64,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a terminal position outcome
    pub fn record_terminal(&mut self, outcome: Outcome) {
        self.terminal_positions += 1;
        match outcome {
            Outcome::Win(Player::One) => self.p1_wins += 1,
            Outcome::Win(Player::Two) => self.p2_wins += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    /// Seconds since the stats were created.
    fn elapsed_secs(&self) -> f64 {
        self.start_time.map_or(0.0, |start| start.elapsed().as_secs_f64())
    }

    /// Average positions evaluated per second
    pub fn positions_per_sec(&self) -> f64 {
        let elapsed = self.elapsed_secs();
        if elapsed > 0.0 {
            self.positions_evaluated as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, table_size: usize) {
        let now = Instant::now();
        let elapsed_total = self.elapsed_secs() as u64;

        // Rate since last log
        let rate = match self.last_log_time {
            Some(last) if last.elapsed().as_secs_f64() > 0.0 => {
                (self.positions_evaluated - self.last_log_positions) as f64
                    / last.elapsed().as_secs_f64()
            }
            Some(_) => 0.0,
            None => self.positions_per_sec(),
        };

        let mem = peak_memory().map(human_bytes).unwrap_or_else(|| "n/a".to_string());

        info!(
            elapsed = %format!(
                "{:02}:{:02}:{:02}",
                elapsed_total / 3600,
                (elapsed_total % 3600) / 60,
                elapsed_total % 60
            ),
            positions = self.positions_evaluated,
            unique = table_size,
            cache_hits = self.cache_hits,
            rate = %format!("{:.0}/s", rate),
            depth = self.max_depth,
            pruned = self.branches_pruned,
            mem = %mem,
            "progress"
        );
        info!(
            p1 = self.p1_wins,
            p2 = self.p2_wins,
            draw = self.draws,
            "terminals"
        );

        self.last_log_time = Some(now);
        self.last_log_positions = self.positions_evaluated;
    }

    /// Log the final counters of a finished solve.
    pub fn log_summary(&self, table_size: usize) {
        info!(
            positions = self.positions_evaluated,
            unique = table_size,
            cache_hits = self.cache_hits,
            depth = self.max_depth,
            pruned = self.branches_pruned,
            secs = %format!("{:.2}", self.elapsed_secs()),
            rate = %format!("{:.0}/s", self.positions_per_sec()),
            peak_mem = %peak_memory().map(human_bytes).unwrap_or_else(|| "n/a".to_string()),
            "solve summary"
        );
        info!(
            terminals = self.terminal_positions,
            p1 = self.p1_wins,
            p2 = self.p2_wins,
            draw = self.draws,
            "terminal outcomes"
        );
    }
}
