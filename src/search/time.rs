//! UCI time-control parsing and per-move budget allocation.

use std::time::Duration;

use crate::config;

/// The `go` subset of UCI time-control parameters relevant to allocating a
/// per-move search budget.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimeControl {
    pub remaining_ms: u64,
    pub increment_ms: u64,
    pub moves_to_go: Option<u64>,
}

/// Allocate a search budget from a UCI time control: `remaining / moves_to_go
/// + 0.75 * increment` when `moves_to_go` is known, otherwise `remaining / 30
/// + 0.75 * increment` clamped to `[100ms, remaining / 3]`. Either way, an
/// emergency buffer is subtracted to absorb OS/network latency, floored at
/// [`config::search::MIN_EMERGENCY_BUFFER_MS`].
#[must_use]
pub fn allocate_budget(tc: TimeControl) -> Duration {
    let increment_share = (tc.increment_ms as f64 * 0.75) as u64;

    let raw_ms = match tc.moves_to_go {
        Some(moves_to_go) if moves_to_go > 0 => tc.remaining_ms / moves_to_go + increment_share,
        _ => {
            let estimated = tc.remaining_ms / config::search::DEFAULT_MOVES_TO_GO + increment_share;
            let max_ms = tc.remaining_ms / 3;
            estimated.clamp(config::search::MIN_MOVE_BUDGET_MS, max_ms.max(config::search::MIN_MOVE_BUDGET_MS))
        }
    };

    let buffer = if raw_ms > config::search::EMERGENCY_BUFFER_MS {
        config::search::EMERGENCY_BUFFER_MS
    } else {
        config::search::MIN_EMERGENCY_BUFFER_MS.min(raw_ms)
    };
    let budgeted_ms = raw_ms.saturating_sub(buffer);

    Duration::from_millis(budgeted_ms)
}
