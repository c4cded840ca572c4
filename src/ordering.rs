//! Move ordering: hash move, MVV-LVA captures, promotions, killers, and
//! history heuristic, used by the search to try the most promising moves
//! first and maximize alpha-beta cutoffs.

use crate::board::Board;
use crate::config;
use crate::types::{Move, Piece};

/// MVV-LVA score for a capture: higher for a valuable victim taken by a
/// cheap attacker. Falls back to victim value alone if the attacker is
/// unknown (never happens for legally generated moves, but keeps this
/// usable standalone).
#[must_use]
pub fn mvv_lva_score(victim: Piece, attacker: Option<Piece>) -> i32 {
    let victim_value = config::MATERIAL_MG[victim.index()];
    match attacker {
        Some(a) => victim_value * 10 - config::MATERIAL_MG[a.index()],
        None => victim_value * 10,
    }
}

const HISTORY_PIECES: usize = 6;
const HISTORY_SQUARES: usize = 64;
const HISTORY_SIZE: usize = HISTORY_PIECES * HISTORY_SQUARES * HISTORY_SQUARES;

fn history_index(piece: Piece, from: usize, to: usize) -> usize {
    piece.index() * HISTORY_SQUARES * HISTORY_SQUARES + from * HISTORY_SQUARES + to
}

/// Per-search move-ordering state: a killer-move table indexed by ply and a
/// history table indexed by (piece, from, to). Persists across the
/// iterations of one iterative-deepening search so heuristics learned at
/// shallow depths help order moves at deeper ones.
pub struct OrderingContext {
    /// `killers[ply]` holds up to two quiet moves that caused a beta cutoff
    /// at that ply in a sibling branch.
    killers: Vec<[Option<Move>; 2]>,
    history: Vec<i32>,
}

impl OrderingContext {
    #[must_use]
    pub fn new(max_ply: usize) -> Self {
        OrderingContext {
            killers: vec![[None, None]; max_ply + 1],
            history: vec![0; HISTORY_SIZE],
        }
    }

    /// Record a quiet move that produced a beta cutoff at `ply`. Keeps the
    /// two most recent distinct killers, most-recent first.
    pub fn record_killer(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.killers.get_mut(ply) else {
            return;
        };
        if slot[0] == Some(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }

    /// Reward a quiet move that produced a beta cutoff, scaled by the
    /// remaining depth so deeper cutoffs count for more. Capped below
    /// [`config::search::KILLER2_SCORE`] so an accumulated history score can
    /// never outrank a killer move or capture in the ordering comparator.
    pub fn record_history(&mut self, piece: Piece, from: usize, to: usize, depth: u32) {
        let idx = history_index(piece, from, to);
        let bonus = (depth * depth) as i32;
        let cap = config::search::KILLER2_SCORE - 1;
        self.history[idx] = self.history[idx].saturating_add(bonus).min(cap);
    }

    fn killer_score(&self, ply: usize, mv: Move) -> i32 {
        match self.killers.get(ply) {
            Some([Some(k0), _]) if *k0 == mv => config::search::KILLER1_SCORE,
            Some([_, Some(k1)]) if *k1 == mv => config::search::KILLER2_SCORE,
            _ => 0,
        }
    }

    fn history_score(&self, piece: Piece, from: usize, to: usize) -> i32 {
        self.history[history_index(piece, from, to)]
    }
}

fn move_score(ctx: &OrderingContext, board: &Board, mv: Move, ply: usize, tt_move: Option<Move>) -> i32 {
    if Some(mv) == tt_move {
        return config::search::TT_MOVE_SCORE;
    }

    if let Some(victim) = mv.captured_piece {
        let attacker = board.piece_at(mv.from).map(|(piece, _)| piece);
        return config::search::CAPTURE_BASE_SCORE + mvv_lva_score(victim, attacker);
    }

    if let Some(promotion) = mv.promotion {
        return config::search::CAPTURE_BASE_SCORE + config::MATERIAL_MG[promotion.index()];
    }

    let killer = ctx.killer_score(ply, mv);
    if killer > 0 {
        return killer;
    }

    let Some((piece, _)) = board.piece_at(mv.from) else {
        return 0;
    };
    ctx.history_score(piece, mv.from.index().as_usize(), mv.to.index().as_usize())
}

/// Sort `moves` in place, highest-priority first: the transposition-table
/// move, then captures/promotions by MVV-LVA/promoted value, then killer
/// moves for this ply, then quiet moves by history score.
pub fn order_moves(
    ctx: &OrderingContext,
    board: &Board,
    moves: &mut [Move],
    ply: usize,
    tt_move: Option<Move>,
) {
    moves.sort_by_key(|&mv| std::cmp::Reverse(move_score(ctx, board, mv, ply, tt_move)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::{Color, Square};

    #[test]
    fn mvv_lva_prefers_cheap_attacker_on_valuable_victim() {
        let pawn_takes_queen = mvv_lva_score(Piece::Queen, Some(Piece::Pawn));
        let queen_takes_queen = mvv_lva_score(Piece::Queen, Some(Piece::Queen));
        assert!(pawn_takes_queen > queen_takes_queen);
    }

    #[test]
    fn tt_move_is_ordered_first() {
        let board = Board::new();
        let mut moves = board.generate_moves().iter().copied().collect::<Vec<_>>();
        let tt_move = moves[5];
        let ctx = OrderingContext::new(64);
        order_moves(&ctx, &board, &mut moves, 0, Some(tt_move));
        assert_eq!(moves[0], tt_move);
    }

    #[test]
    fn captures_are_ordered_before_quiet_moves() {
        let board = Board::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let mut moves = board.generate_moves().iter().copied().collect::<Vec<_>>();
        let ctx = OrderingContext::new(64);
        order_moves(&ctx, &board, &mut moves, 0, None);
        assert!(moves[0].is_capture());
    }

    #[test]
    fn killer_move_outranks_unrelated_quiet_moves() {
        let board = Board::new();
        let mut moves = board.generate_moves().iter().copied().collect::<Vec<_>>();
        let quiet_moves: Vec<Move> = moves.iter().copied().filter(|m| !m.is_capture()).collect();
        let killer = quiet_moves[3];
        let mut ctx = OrderingContext::new(64);
        ctx.record_killer(0, killer);
        order_moves(&ctx, &board, &mut moves, 0, None);
        let killer_pos = moves.iter().position(|&m| m == killer).unwrap();
        let other_quiet_pos = moves
            .iter()
            .position(|&m| !m.is_capture() && m != killer)
            .unwrap();
        assert!(killer_pos < other_quiet_pos);
    }

    #[test]
    fn history_bonus_breaks_ties_between_quiet_moves() {
        let board = Board::new();
        let mut moves = board.generate_moves().iter().copied().collect::<Vec<_>>();
        let quiet = *moves.iter().find(|m| !m.is_capture()).unwrap();
        let mut ctx = OrderingContext::new(64);
        let (piece, _) = board.piece_at(quiet.from).unwrap();
        assert_eq!(piece_color_is_white(&board, quiet), Color::White);
        ctx.record_history(piece, quiet.from.index().as_usize(), quiet.to.index().as_usize(), 4);
        order_moves(&ctx, &board, &mut moves, 0, None);
        assert_eq!(moves[0], quiet);
    }

    fn piece_color_is_white(board: &Board, mv: Move) -> Color {
        board.piece_at(mv.from).unwrap().1
    }
}
