//! Phase state machine
//!
//! Maps one item's state plus the time since the last tick to its next state:
//!
//! ```text
//! Start ──(entrance reaches 1)──▶ Progress ──(execution window over)──▶ End
//! ```
//!
//! `advance` is pure: the lifecycle manager owns the items and stores the result.

use super::item::{Phase, PhaseState, Timing};

/// Length of the entrance animation, independent of execution time
pub const ENTRANCE_DURATION: f64 = 1.0;
/// Length of the exit animation
pub const EXIT_DURATION: f64 = 1.0;

/// Advance one item by `delta` seconds at wall-clock `now`.
///
/// A zero, negative or non-finite `delta` returns the state unchanged.
pub fn advance(state: PhaseState, timing: Timing, delta: f64, now: f64) -> PhaseState {
    if !(delta.is_finite() && delta > 0.0) {
        return state;
    }

    let total = state.elapsed + delta;
    match state.phase {
        Phase::Start => advance_start(state, timing, total, now),
        Phase::Progress => advance_progress(state, timing, total, now),
        Phase::End => advance_end(state, total),
    }
}

fn advance_start(state: PhaseState, timing: Timing, total: f64, now: f64) -> PhaseState {
    let since_start = (total - timing.start_offset).max(0.0);
    let position = (since_start / ENTRANCE_DURATION).min(1.0);

    if position >= 1.0 {
        // Entrance complete. Elapsed time carries over into the traversal.
        return PhaseState {
            phase: Phase::Progress,
            elapsed: total,
            position: 0.0,
            is_active: true,
            end_time: Some(now + timing.execution_time),
        };
    }

    PhaseState {
        elapsed: total,
        position,
        is_active: since_start < timing.execution_time,
        ..state
    }
}

fn advance_progress(state: PhaseState, timing: Timing, total: f64, now: f64) -> PhaseState {
    let since_start = total - timing.start_offset;

    if since_start >= timing.execution_time {
        return PhaseState {
            phase: Phase::End,
            elapsed: 0.0,
            position: 0.0,
            is_active: true,
            end_time: Some(now),
        };
    }

    PhaseState {
        elapsed: total,
        is_active: true,
        ..state
    }
}

fn advance_end(state: PhaseState, total: f64) -> PhaseState {
    PhaseState {
        elapsed: total,
        position: (total / EXIT_DURATION).clamp(0.0, 1.0),
        is_active: total <= EXIT_DURATION,
        ..state
    }
}
