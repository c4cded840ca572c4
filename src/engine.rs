//! The external-collaborator surface: a [`Session`] facade that owns a
//! position and its transposition table, and drives the search drivers in
//! [`crate::search`] without the caller needing to know about bitboards,
//! move generation, or alpha-beta.

use std::fmt;
use std::time::Duration;

use crate::board::Board;
use crate::config;
use crate::error::FenError;
use crate::search::{self, SearchProgress, TimeControl};
use crate::transposition_table::TranspositionTable;
use crate::types::Move;

/// Either a depth or a time budget for a search. If both are set, `time`
/// takes precedence, matching `go wtime ... depth ...`-style UCI input.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchOptions {
    pub depth: Option<u32>,
    pub time: Option<Duration>,
    pub max_nodes: Option<u64>,
}

/// Outcome of a completed (or cut-off) search: the best move, its score, and
/// the depth actually reached.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
}

#[derive(Debug)]
pub enum SearchError {
    /// Neither `depth` nor `time` was set in [`SearchOptions`].
    MissingBudget,
    /// The FEN string given to [`Session::set_position`] did not parse.
    InvalidFen(FenError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::MissingBudget => write!(f, "either depth or time must be specified"),
            SearchError::InvalidFen(e) => write!(f, "invalid position: {e}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<FenError> for SearchError {
    fn from(e: FenError) -> Self {
        SearchError::InvalidFen(e)
    }
}

/// A chess session: the current position plus its transposition table,
/// across however many searches and moves a UCI game involves.
pub struct Session {
    board: Board,
    tt: TranspositionTable,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Session {
            board: Board::new(),
            tt: TranspositionTable::new(config::search::DEFAULT_TT_MB),
        }
    }

    #[must_use]
    pub fn with_hash_size_mb(size_mb: usize) -> Self {
        Session {
            board: Board::new(),
            tt: TranspositionTable::new(size_mb),
        }
    }

    /// Resize the transposition table, discarding its contents. Corresponds
    /// to `setoption name Hash value N`.
    pub fn set_hash_size_mb(&mut self, size_mb: usize) {
        self.tt = TranspositionTable::new(size_mb);
    }

    /// Reset to the starting position and clear the transposition table, as
    /// `ucinewgame` requires.
    pub fn new_game(&mut self) {
        self.board = Board::new();
        self.tt.clear();
    }

    /// Replace the current position with the one described by `fen`.
    pub fn set_position(&mut self, fen: &str) -> Result<(), SearchError> {
        self.board = Board::try_from_fen(fen)?;
        Ok(())
    }

    /// Replace the current position with the game's starting position.
    pub fn set_startpos(&mut self) {
        self.board = Board::new();
    }

    /// Apply a UCI long-algebraic move (e.g. `e2e4`, `e7e8q`) to the current
    /// position. Returns `false` (leaving the position unchanged) if the
    /// string names no legal move here.
    pub fn apply_uci_move(&mut self, uci: &str) -> bool {
        crate::board::make_move_uci(&mut self.board, uci)
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Run a search per `opts`, optionally reporting progress once per
    /// completed iterative-deepening depth.
    pub fn search(
        &mut self,
        opts: SearchOptions,
        mut on_progress: impl FnMut(&SearchProgress),
    ) -> Result<SearchResult, SearchError> {
        if let Some(limit) = opts.max_nodes {
            crate::search_control::set_node_limit(limit);
        }

        let (best_move, score, depth, nodes) = if let Some(time) = opts.time {
            let max_depth = opts.depth.unwrap_or(crate::types::MAX_PLY as u32);
            let mut reached_depth = 0;
            let (mv, score) = search::search_timed(
                &mut self.board,
                &mut self.tt,
                time,
                max_depth,
                |progress| {
                    reached_depth = progress.depth;
                    on_progress(progress);
                },
            );
            (mv, score, reached_depth, crate::search_control::get_node_count())
        } else if let Some(depth) = opts.depth {
            let (mv, score) = search::search_fixed_depth(&mut self.board, &mut self.tt, depth);
            on_progress(&SearchProgress {
                depth,
                score,
                nodes: crate::search_control::get_node_count(),
                pv: best_move_pv(mv),
            });
            (mv, score, depth, crate::search_control::get_node_count())
        } else {
            return Err(SearchError::MissingBudget);
        };

        Ok(SearchResult {
            best_move,
            score,
            depth,
            nodes,
        })
    }

    /// Allocate a time budget from UCI `go` time-control fields and search
    /// with it. Equivalent to computing [`crate::search::allocate_budget`]
    /// and calling [`Session::search`] directly, provided for convenience.
    pub fn search_with_time_control(
        &mut self,
        tc: TimeControl,
        max_depth: Option<u32>,
        on_progress: impl FnMut(&SearchProgress),
    ) -> Result<SearchResult, SearchError> {
        let budget = search::allocate_budget(tc);
        self.search(
            SearchOptions {
                depth: max_depth,
                time: Some(budget),
                max_nodes: None,
            },
            on_progress,
        )
    }

    /// Request that an in-progress search (running on another thread) stop
    /// as soon as it next polls.
    pub fn stop(&self) {
        crate::search_control::set_stop(true);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn best_move_pv(mv: Option<Move>) -> Vec<Move> {
    mv.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_at_the_standard_position() {
        let session = Session::new();
        assert_eq!(session.board().side_to_move(), crate::types::Color::White);
    }

    #[test]
    fn set_position_rejects_malformed_fen() {
        let mut session = Session::new();
        assert!(session.set_position("not a fen").is_err());
    }

    #[test]
    fn search_without_a_budget_is_an_error() {
        let mut session = Session::new();
        let result = session.search(SearchOptions::default(), |_| {});
        assert!(matches!(result, Err(SearchError::MissingBudget)));
    }

    #[test]
    fn fixed_depth_search_returns_a_legal_move() {
        let mut session = Session::new();
        let result = session
            .search(
                SearchOptions {
                    depth: Some(2),
                    time: None,
                    max_nodes: None,
                },
                |_| {},
            )
            .unwrap();
        assert!(result.best_move.is_some());
    }

    #[test]
    fn apply_uci_move_updates_the_position() {
        let mut session = Session::new();
        assert!(session.apply_uci_move("e2e4"));
        assert_eq!(session.board().side_to_move(), crate::types::Color::Black);
    }

    #[test]
    fn apply_uci_move_rejects_an_illegal_move() {
        let mut session = Session::new();
        assert!(!session.apply_uci_move("e2e5"));
        assert_eq!(session.board().side_to_move(), crate::types::Color::White);
    }
}
