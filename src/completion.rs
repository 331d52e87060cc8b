//! Quiet-period completion detection.
//!
//! The server never sends an explicit end-of-audio marker, so completion is
//! inferred: a fixed quiet period with no new chunk counts as the end of the
//! artifact. Every chunk arrival is evidence against completion and re-arms
//! the deadline; a hard reset cancels it. This is a heuristic, not a proof:
//! a chunk arriving after the window elapsed cannot un-declare completion.
//!
//! Time is injected by the caller so the race-prone cancel/re-arm behavior
//! is deterministically testable.

use std::time::{Duration, Instant};
use tracing::debug;

/// Quiet period after the last audio chunk before the artifact is declared
/// complete. Chosen to exceed typical inter-chunk gaps of the upstream
/// synthesis while keeping latency usable.
pub const QUIET_PERIOD: Duration = Duration::from_millis(3000);

/// Single-shot, re-armable deadline.
#[derive(Debug)]
pub struct CompletionDetector {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl CompletionDetector {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Schedule the deadline `quiet` from `now`. An earlier pending deadline
    /// is replaced, so N rapid arms yield one fire, measured from the last.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
        debug!("completion detector armed ({}ms quiet window)", self.quiet.as_millis());
    }

    /// Unconditionally clear any pending deadline; returns whether one was
    /// pending. A cancel that happens-before a fire always wins.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if the deadline has passed. Consumes the deadline, so any given
    /// arm fires at most once.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
