//! Resource budgets for long solves.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::warn;

use crate::error::{Resource, SolveError};

/// How often (in steps) the wall clock is consulted.
const TIME_CHECK_INTERVAL: u64 = 1024;

/// Limits a solve must stay within. All limits are optional.
#[derive(Debug, Clone, Default)]
pub struct Budget {
    /// Maximum number of stored states (table entries or graph nodes).
    pub max_states: Option<usize>,
    /// Maximum wall-clock time.
    pub time_limit: Option<Duration>,
    /// Cleared to request a graceful stop (e.g. from a SIGINT handler).
    pub running: Option<Arc<AtomicBool>>,
}

impl Budget {
    /// Unlimited budget.
    pub fn unlimited() -> Budget {
        Budget::default()
    }

    pub fn with_max_states(mut self, max_states: usize) -> Budget {
        self.max_states = Some(max_states);
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Budget {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Budget {
        self.running = Some(running);
        self
    }

    /// Start metering against this budget.
    pub fn start(&self) -> BudgetClock<'_> {
        BudgetClock {
            budget: self,
            started: Instant::now(),
            steps: 0,
        }
    }
}

/// Running meter for one solve.
pub struct BudgetClock<'a> {
    budget: &'a Budget,
    started: Instant,
    steps: u64,
}

impl BudgetClock<'_> {
    /// Account for one step with `states` stored so far.
    pub fn check(&mut self, states: usize) -> Result<(), SolveError> {
        self.steps += 1;

        if let Some(running) = &self.budget.running {
            if !running.load(Ordering::SeqCst) {
                return Err(SolveError::Interrupted);
            }
        }

        if let Some(max_states) = self.budget.max_states {
            if states > max_states {
                warn!(states, max_states, "state budget exhausted");
                return Err(SolveError::ResourceExhausted {
                    resource: Resource::States,
                    limit: max_states as u64,
                });
            }
        }

        if let Some(limit) = self.budget.time_limit {
            if self.steps % TIME_CHECK_INTERVAL == 0 && self.started.elapsed() > limit {
                warn!(
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                    "time budget exhausted"
                );
                return Err(SolveError::ResourceExhausted {
                    resource: Resource::Time,
                    limit: limit.as_millis() as u64,
                });
            }
        }

        Ok(())
    }

    /// Time since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
