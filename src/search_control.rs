//! Cooperative search cancellation: a process-wide stop flag, an optional
//! node limit, and a node counter.
//!
//! The search polls [`should_stop`] every [`crate::config::search::
//! CANCELLATION_POLL_INTERVAL`] nodes rather than on every node, so the
//! check doesn't show up in a profile. A UCI `stop` command or an expired
//! time budget calls [`set_stop`] from outside the search thread; a mid-tree
//! recursive call only ever reads it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

static STOP_FLAG: AtomicBool = AtomicBool::new(false);
static NODE_LIMIT: AtomicU64 = AtomicU64::new(0);
static NODE_COUNT: AtomicU64 = AtomicU64::new(0);

/// Clear the stop flag, node limit, and node counter. Call before starting a
/// new search.
pub fn reset() {
    STOP_FLAG.store(false, Ordering::SeqCst);
    NODE_LIMIT.store(0, Ordering::SeqCst);
    NODE_COUNT.store(0, Ordering::SeqCst);
}

/// Request that the running search stop as soon as it next polls.
pub fn set_stop(stopped: bool) {
    STOP_FLAG.store(stopped, Ordering::SeqCst);
}

#[must_use]
pub fn should_stop() -> bool {
    STOP_FLAG.load(Ordering::SeqCst)
}

/// Bound the search to `limit` nodes (0 = unlimited), resetting the node
/// counter.
pub fn set_node_limit(limit: u64) {
    NODE_LIMIT.store(limit, Ordering::SeqCst);
    NODE_COUNT.store(0, Ordering::SeqCst);
}

/// Record that one node was visited. Sets the stop flag and returns `true`
/// once the configured node limit is reached.
pub fn node_visited() -> bool {
    let visited = NODE_COUNT.fetch_add(1, Ordering::SeqCst) + 1;
    let limit = NODE_LIMIT.load(Ordering::SeqCst);
    if limit > 0 && visited >= limit {
        STOP_FLAG.store(true, Ordering::SeqCst);
        true
    } else {
        false
    }
}

#[must_use]
pub fn get_node_count() -> u64 {
    NODE_COUNT.load(Ordering::SeqCst)
}
