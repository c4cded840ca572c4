//! The `info` line emitted once per completed iterative-deepening depth.
//!
//! Kept separate from [`crate::uci`] so the search-progress-to-wire-format
//! translation can be unit-tested without a stdin/stdout loop, and so the
//! background search thread can hand lines to a dedicated printer thread
//! over an mpsc channel rather than locking stdout itself on every depth.

use std::sync::mpsc::{Receiver, Sender};

use crate::config::search::MATE_THRESHOLD;
use crate::search::SearchProgress;
use crate::types::Move;

/// One `info` line's worth of search progress, already split into the
/// `score cp` / `score mate` alternative the UCI protocol expects.
#[derive(Clone, Debug)]
pub struct Info {
    pub depth: u32,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u128,
    pub score_cp: Option<i32>,
    pub score_mate: Option<i32>,
    pub pv: Vec<Move>,
}

impl Info {
    /// Build an `Info` from one iterative-deepening iteration's progress.
    #[must_use]
    pub fn from_progress(progress: &SearchProgress, elapsed_ms: u128) -> Self {
        let nps = if elapsed_ms > 0 {
            (progress.nodes as u128 * 1000 / elapsed_ms) as u64
        } else {
            progress.nodes
        };

        let (score_cp, score_mate) = if progress.score.abs() >= MATE_THRESHOLD {
            let plies_to_mate = crate::config::search::MATE_VALUE - progress.score.abs();
            let moves_to_mate = (plies_to_mate + 1) / 2;
            let signed = if progress.score > 0 {
                moves_to_mate
            } else {
                -moves_to_mate
            };
            (None, Some(signed))
        } else {
            (Some(progress.score), None)
        };

        Info {
            depth: progress.depth,
            nodes: progress.nodes,
            nps,
            time_ms: elapsed_ms,
            score_cp,
            score_mate,
            pv: progress.pv.clone(),
        }
    }

    #[must_use]
    pub fn to_uci_line(&self) -> String {
        let mut parts = vec![format!("depth {}", self.depth)];
        if let Some(cp) = self.score_cp {
            parts.push(format!("score cp {cp}"));
        }
        if let Some(mate) = self.score_mate {
            parts.push(format!("score mate {mate}"));
        }
        parts.push(format!("nodes {}", self.nodes));
        parts.push(format!("nps {}", self.nps));
        parts.push(format!("time {}", self.time_ms));
        if !self.pv.is_empty() {
            let pv = self
                .pv
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            parts.push(format!("pv {pv}"));
        }
        format!("info {}", parts.join(" "))
    }
}

/// A channel carrying `info` lines from the search thread to the printer
/// thread that owns stdout.
#[must_use]
pub fn channel() -> (Sender<Info>, Receiver<Info>) {
    std::sync::mpsc::channel()
}
