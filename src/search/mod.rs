//! Fail-hard alpha-beta search: the negamax core, quiescence search, and the
//! iterative-deepening drivers used by both fixed-depth and time-budgeted
//! searches.
//!
//! A node's returned score always lies within the `(alpha, beta)` window it
//! was called with: a beta cutoff returns exactly `beta`, and a node that
//! never raises alpha returns exactly the `alpha` it was given. Mate scores
//! are expressed relative to the search root via `ply`, threaded down through
//! every recursive call; the transposition table re-roots them for whichever
//! node ends up probing a stored entry.

mod time;

pub use time::{allocate_budget, TimeControl};

use crate::board::Board;
use crate::config;
use crate::ordering::{self, OrderingContext};
use crate::search_control;
use crate::transposition_table::{Bound, TranspositionTable};
use crate::types::{Color, Move, Piece};

/// One line of iterative-deepening progress, handed to the caller as each
/// depth completes so a UCI front end can print `info` without this module
/// knowing anything about the UCI wire format.
#[derive(Clone, Debug)]
pub struct SearchProgress {
    pub depth: u32,
    pub score: i32,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

/// Increment the node counter and, every [`config::search::
/// CANCELLATION_POLL_INTERVAL`] nodes, check the shared stop flag.
fn poll_cancellation() -> bool {
    if search_control::node_visited() {
        return true;
    }
    if search_control::get_node_count() % config::search::CANCELLATION_POLL_INTERVAL == 0 {
        search_control::should_stop()
    } else {
        false
    }
}

fn non_pawn_material(board: &Board, color: Color) -> i32 {
    [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .iter()
        .map(|&piece| {
            board.pieces_of(color, piece).popcount() as i32 * config::MATERIAL_MG[piece.index()]
        })
        .sum()
}

fn should_try_null_move(board: &Board, depth: i32, in_check: bool) -> bool {
    !in_check
        && depth >= config::search::NULL_MOVE_MIN_DEPTH as i32
        && non_pawn_material(board, board.side_to_move())
            >= config::search::NULL_MOVE_ZUGZWANG_MARGIN
}

/// Fail-hard negamax. `depth` is plies remaining, `ply` is the node's
/// distance from the search root (used for mate-distance scoring and TT
/// re-rooting).
pub fn negamax(
    board: &mut Board,
    tt: &mut TranspositionTable,
    ctx: &mut OrderingContext,
    mut depth: i32,
    ply: i32,
    mut alpha: i32,
    beta: i32,
) -> i32 {
    let original_alpha = alpha;

    if poll_cancellation() {
        return 0;
    }

    if board.is_draw() || board.is_theoretical_draw() {
        return 0;
    }

    if depth <= 0 {
        return quiescence(board, ctx, ply, alpha, beta, 0);
    }

    let in_check = crate::board::is_in_check(board, board.side_to_move());
    if in_check {
        depth += 1;
    }

    let hash = board.hash();
    let mut hash_move = None;
    if let Some(probe) = tt.probe(hash, ply) {
        hash_move = probe.best_move;
        if i32::from(probe.depth) >= depth {
            match probe.bound {
                Bound::Exact => return probe.score,
                Bound::Lower if probe.score >= beta => return probe.score,
                Bound::Upper if probe.score <= alpha => return probe.score,
                _ => {}
            }
        }
    }

    if should_try_null_move(board, depth, in_check) {
        let reduced_depth = depth - 1 - config::search::NULL_MOVE_REDUCTION as i32;
        let null_info = board.make_null_move();
        let null_score = -negamax(board, tt, ctx, reduced_depth, ply + 1, -beta, -beta + 1);
        board.unmake_null_move(null_info);

        if !search_control::should_stop() && null_score >= beta {
            let verify_score = negamax(board, tt, ctx, depth - 1, ply, alpha, beta);
            if verify_score >= beta {
                tt.store(hash, depth as i8, beta, Bound::Lower, None, ply);
                return beta;
            }
        }
    }

    let mut moves = board.generate_moves();
    if moves.is_empty() {
        return if in_check {
            -(config::search::MATE_VALUE - ply)
        } else {
            0
        };
    }
    if moves.len() == 1 && !in_check {
        depth += 1;
    }

    ordering::order_moves(ctx, board, moves.as_mut_slice(), ply as usize, hash_move);

    let mut best_move = None;
    let mut cutoff = false;

    for (i, &mv) in moves.iter().enumerate() {
        if search_control::should_stop() {
            return 0;
        }

        let moving_piece = board.piece_at(mv.from).map(|(piece, _)| piece);
        let is_quiet = !mv.is_capture() && mv.promotion.is_none();

        let undo = board.make_move(mv);

        let score = if is_quiet
            && i >= config::search::LMR_MOVE_THRESHOLD
            && depth >= config::search::LMR_MIN_DEPTH as i32
        {
            let reduction = 1 + (i - config::search::LMR_MOVE_THRESHOLD) as i32 / 6;
            let reduced_depth = (depth - 1 - reduction).max(0);
            let reduced_score = -negamax(board, tt, ctx, reduced_depth, ply + 1, -beta, -alpha);
            if reduced_score > alpha {
                -negamax(board, tt, ctx, depth - 1, ply + 1, -beta, -alpha)
            } else {
                reduced_score
            }
        } else {
            -negamax(board, tt, ctx, depth - 1, ply + 1, -beta, -alpha)
        };

        board.unmake_move(mv, undo);

        if search_control::should_stop() {
            return 0;
        }

        if score > alpha {
            alpha = score;
            best_move = Some(mv);
        }

        if alpha >= beta {
            if is_quiet {
                ctx.record_killer(ply as usize, mv);
                if let Some(piece) = moving_piece {
                    ctx.record_history(
                        piece,
                        mv.from.index().as_usize(),
                        mv.to.index().as_usize(),
                        depth as u32,
                    );
                }
            }
            cutoff = true;
            break;
        }
    }

    let final_score = if cutoff { beta } else { alpha };
    let bound = if cutoff {
        Bound::Lower
    } else if alpha <= original_alpha {
        Bound::Upper
    } else {
        Bound::Exact
    };
    tt.store(hash, depth as i8, final_score, bound, best_move, ply);
    final_score
}

/// Captures, promotions, and (while in check) full legal evasions only, with
/// stand-pat, delta pruning, and no depth limit other than
/// [`config::search::MAX_QSEARCH_PLY`].
fn quiescence(
    board: &mut Board,
    ctx: &mut OrderingContext,
    ply: i32,
    mut alpha: i32,
    beta: i32,
    qdepth: i32,
) -> i32 {
    if poll_cancellation() {
        return 0;
    }

    if board.is_draw() || board.is_theoretical_draw() {
        return 0;
    }

    let in_check = crate::board::is_in_check(board, board.side_to_move());

    if !in_check {
        let stand_pat = board.evaluate();
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if qdepth >= config::search::MAX_QSEARCH_PLY {
            return alpha;
        }

        let mut moves = crate::board::generate_tactical_moves(board);
        if moves.is_empty() {
            return alpha;
        }
        order_captures(board, moves.as_mut_slice());

        for &mv in moves.iter() {
            if mv.promotion.is_none() {
                if let Some(victim) = mv.captured_piece {
                    let victim_value = config::MATERIAL_MG[victim.index()];
                    if stand_pat + victim_value + DELTA_PRUNE_MARGIN < alpha {
                        continue;
                    }
                }
            }

            let undo = board.make_move(mv);
            let score = -quiescence(board, ctx, ply + 1, -beta, -alpha, qdepth + 1);
            board.unmake_move(mv, undo);

            if search_control::should_stop() {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    } else {
        let mut moves = board.generate_moves();
        if moves.is_empty() {
            return -(config::search::MATE_VALUE - ply);
        }
        order_captures(board, moves.as_mut_slice());

        for &mv in moves.iter() {
            let undo = board.make_move(mv);
            let score = -quiescence(board, ctx, ply + 1, -beta, -alpha, qdepth + 1);
            board.unmake_move(mv, undo);

            if search_control::should_stop() {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

/// Margin added to a capture's material value before comparing against alpha
/// in quiescence delta pruning.
const DELTA_PRUNE_MARGIN: i32 = 200;

fn order_captures(board: &Board, moves: &mut [Move]) {
    moves.sort_by_key(|mv| {
        std::cmp::Reverse(mv.captured_piece.map_or(0, |victim| {
            let attacker = board.piece_at(mv.from).map(|(piece, _)| piece);
            ordering::mvv_lva_score(victim, attacker)
        }))
    });
}

/// Search exactly `depth` plies with no time budget. Returns the best move
/// found (`None` if the position has no legal moves) and its score.
pub fn search_fixed_depth(
    board: &mut Board,
    tt: &mut TranspositionTable,
    depth: u32,
) -> (Option<Move>, i32) {
    search_control::reset();
    let mut ctx = OrderingContext::new(crate::types::MAX_PLY);
    iterative_deepening(board, tt, &mut ctx, depth, None, |_| {})
}

/// Search within `budget`, deepening one ply at a time until the budget is
/// exhausted or `depth` is reached (whichever comes first). `on_progress` is
/// called after every completed iteration.
pub fn search_timed(
    board: &mut Board,
    tt: &mut TranspositionTable,
    budget: std::time::Duration,
    max_depth: u32,
    on_progress: impl FnMut(&SearchProgress),
) -> (Option<Move>, i32) {
    search_control::reset();
    let mut ctx = OrderingContext::new(crate::types::MAX_PLY);
    let deadline = std::time::Instant::now() + budget;
    iterative_deepening(board, tt, &mut ctx, max_depth, Some(deadline), on_progress)
}

/// Iterative deepening with aspiration windows: each depth after the first
/// opens a narrow window around the previous iteration's score and widens it
/// (doubling the margin) on a fail-low or fail-high, falling back to a full
/// window if the margin grows past a cap.
fn iterative_deepening(
    board: &mut Board,
    tt: &mut TranspositionTable,
    ctx: &mut OrderingContext,
    max_depth: u32,
    deadline: Option<std::time::Instant>,
    mut on_progress: impl FnMut(&SearchProgress),
) -> (Option<Move>, i32) {
    let mut best_move = None;
    let mut best_score = 0;
    let mut last_iteration_time = std::time::Duration::from_millis(0);

    for depth in 1..=max_depth {
        if let Some(deadline) = deadline {
            let now = std::time::Instant::now();
            if now >= deadline {
                break;
            }
            let remaining = deadline - now;
            let predicted_next =
                last_iteration_time.mul_f32(config::search::TIME_GROWTH_FACTOR);
            if depth > 1 && predicted_next > remaining {
                break;
            }
        }

        let start = std::time::Instant::now();
        let mut window = 25;
        let mut alpha = if depth == 1 {
            -config::search::SCORE_INFINITE
        } else {
            (best_score - window).max(-config::search::SCORE_INFINITE)
        };
        let mut beta = if depth == 1 {
            config::search::SCORE_INFINITE
        } else {
            (best_score + window).min(config::search::SCORE_INFINITE)
        };

        let score = loop {
            let score = negamax(board, tt, ctx, depth as i32, 0, alpha, beta);

            if search_control::should_stop() {
                break score;
            }
            if score <= alpha {
                window *= 2;
                alpha = (best_score - window).max(-config::search::SCORE_INFINITE);
                if window > 500 {
                    alpha = -config::search::SCORE_INFINITE;
                }
                continue;
            }
            if score >= beta {
                window *= 2;
                beta = (best_score + window).min(config::search::SCORE_INFINITE);
                if window > 500 {
                    beta = config::search::SCORE_INFINITE;
                }
                continue;
            }
            break score;
        };

        if search_control::should_stop() && depth > 1 {
            break;
        }

        best_score = score;
        last_iteration_time = start.elapsed();

        let hash = board.hash();
        if let Some(probe) = tt.probe(hash, 0) {
            best_move = probe.best_move.or(best_move);
        }

        let pv = build_pv(board, tt, depth);
        let nodes = search_control::get_node_count();

        #[cfg(feature = "logging")]
        log::debug!(
            "depth={depth} score={score} nodes={nodes} elapsed_ms={}",
            last_iteration_time.as_millis()
        );

        on_progress(&SearchProgress {
            depth,
            score,
            nodes,
            pv,
        });

        if search_control::should_stop() {
            break;
        }
    }

    (best_move, best_score)
}

/// Reconstruct the principal variation by repeatedly probing the
/// transposition table for the hash move and replaying it, up to `max_len`
/// plies or until a position repeats (a TT cycle, which would otherwise loop
/// forever).
fn build_pv(board: &mut Board, tt: &TranspositionTable, max_len: u32) -> Vec<Move> {
    let mut pv = Vec::with_capacity(max_len as usize);
    let mut undone = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for ply in 0..max_len {
        let hash = board.hash();
        if !seen.insert(hash) {
            break;
        }
        let Some(mv) = tt.probe(hash, ply as i32).and_then(|p| p.best_move) else {
            break;
        };
        let undo = board.make_move(mv);
        pv.push(mv);
        undone.push((mv, undo));
    }

    for (mv, undo) in undone.into_iter().rev() {
        board.unmake_move(mv, undo);
    }

    pv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    #[test]
    fn finds_mate_in_one() {
        let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let mut tt = TranspositionTable::new(1);
        let (mv, score) = search_fixed_depth(&mut board, &mut tt, 3);
        assert!(mv.is_some());
        assert!(score >= config::search::MATE_VALUE - 2);
    }

    #[test]
    fn avoids_stalemate_when_winning() {
        let mut board = Board::from_fen("7k/8/8/8/8/8/8/K6R w - - 0 1");
        let mut tt = TranspositionTable::new(1);
        let (mv, _) = search_fixed_depth(&mut board, &mut tt, 2);
        assert!(mv.is_some());
    }

    #[test]
    fn returns_no_move_with_no_legal_moves() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let mut tt = TranspositionTable::new(1);
        let (mv, score) = search_fixed_depth(&mut board, &mut tt, 2);
        assert!(mv.is_none());
        assert!(score <= -(config::search::MATE_VALUE - 2));
    }

    #[test]
    fn fixed_depth_search_terminates_and_returns_a_legal_move() {
        let mut board = Board::new();
        let mut tt = TranspositionTable::new(1);
        let (mv, _) = search_fixed_depth(&mut board, &mut tt, 3);
        let mv = mv.unwrap();
        assert!(board.generate_moves().iter().any(|&m| m == mv));
    }
}
