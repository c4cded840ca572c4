//! Make/unmake move application with incremental hash and eval maintenance.
//!
//! Moves are applied and reversed in place rather than by cloning the board,
//! so the search can walk deep lines without allocating. [`UnmakeInfo`]
//! captures exactly the state a move's own effect cannot be recovered from
//! (the captured piece, prior castling/en-passant/clock state, and the
//! pre-move hash/eval/phase), and [`Board::unmake_move`] reverses the move
//! using that record plus the move itself.

use crate::board::state::{Board, NullMoveInfo, UnmakeInfo};
use crate::config::game;
use crate::pst;
use crate::types::{
    Color, Move, Piece, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q,
};
use crate::zobrist;

impl Board {
    fn add_piece_score(&mut self, piece: Piece, color: Color, sq: Square) {
        let sign = if color == Color::White { 1 } else { -1 };
        let eval_sq = if color == Color::White {
            sq.index().as_usize()
        } else {
            pst::mirror(sq.index().as_usize())
        };
        let (mg, eg) = pst::piece_square_value(piece.index(), eval_sq);
        self.mg_score += sign * mg;
        self.eg_score += sign * eg;
        self.phase += crate::config::PHASE_WEIGHTS[piece.index()];
        self.hash ^= zobrist::piece_key(piece, color, sq);
    }

    fn remove_piece_score(&mut self, piece: Piece, color: Color, sq: Square) {
        let sign = if color == Color::White { 1 } else { -1 };
        let eval_sq = if color == Color::White {
            sq.index().as_usize()
        } else {
            pst::mirror(sq.index().as_usize())
        };
        let (mg, eg) = pst::piece_square_value(piece.index(), eval_sq);
        self.mg_score -= sign * mg;
        self.eg_score -= sign * eg;
        self.phase -= crate::config::PHASE_WEIGHTS[piece.index()];
        self.hash ^= zobrist::piece_key(piece, color, sq);
    }

    fn place_tracked(&mut self, sq: Square, piece: Piece, color: Color) {
        self.place_piece(sq, piece, color);
        self.add_piece_score(piece, color, sq);
    }

    fn remove_tracked(&mut self, sq: Square) -> Option<(Piece, Color)> {
        let removed = self.remove_piece(sq);
        if let Some((piece, color)) = removed {
            self.remove_piece_score(piece, color, sq);
        }
        removed
    }

    fn update_castling_rights(&mut self, mv: Move, moving_piece: Piece) {
        self.hash ^= zobrist::castling_key(self.castling_rights);

        if moving_piece == Piece::King {
            let (king_side, queen_side) = match self.side_to_move {
                Color::White => (CASTLE_WHITE_K, CASTLE_WHITE_Q),
                Color::Black => (CASTLE_BLACK_K, CASTLE_BLACK_Q),
            };
            self.castling_rights &= !(king_side | queen_side);
        }

        let clear_for_rook_square = |rights: &mut u8, sq: Square| {
            let white_back = game::WHITE_START_RANK;
            let black_back = game::BLACK_START_RANK;
            if sq == Square::new(white_back, game::KINGSIDE_ROOK_FILE) {
                *rights &= !CASTLE_WHITE_K;
            } else if sq == Square::new(white_back, game::QUEENSIDE_ROOK_FILE) {
                *rights &= !CASTLE_WHITE_Q;
            } else if sq == Square::new(black_back, game::KINGSIDE_ROOK_FILE) {
                *rights &= !CASTLE_BLACK_K;
            } else if sq == Square::new(black_back, game::QUEENSIDE_ROOK_FILE) {
                *rights &= !CASTLE_BLACK_Q;
            }
        };
        clear_for_rook_square(&mut self.castling_rights, mv.from);
        clear_for_rook_square(&mut self.castling_rights, mv.to);

        self.hash ^= zobrist::castling_key(self.castling_rights);
    }

    fn castling_rook_squares(color: Color, to: Square) -> (Square, Square) {
        let rank = match color {
            Color::White => game::WHITE_START_RANK,
            Color::Black => game::BLACK_START_RANK,
        };
        if to.file() == game::KINGSIDE_KING_FILE {
            (
                Square::new(rank, game::KINGSIDE_ROOK_FILE),
                Square::new(rank, game::KINGSIDE_ROOK_DEST_FILE),
            )
        } else {
            (
                Square::new(rank, game::QUEENSIDE_ROOK_FILE),
                Square::new(rank, game::QUEENSIDE_ROOK_DEST_FILE),
            )
        }
    }

    /// Apply `mv`, which must be a legal (or at least pseudo-legal) move for
    /// the side to move. Returns the record needed to reverse it.
    pub fn make_move(&mut self, mv: Move) -> UnmakeInfo {
        let color = self.side_to_move;
        let (moving_piece, _) = self
            .piece_at(mv.from)
            .expect("make_move called with no piece on the from-square");

        let prev_castling_rights = self.castling_rights;
        let prev_en_passant = self.en_passant;
        let prev_halfmove_clock = self.halfmove_clock;
        let prev_hash = self.hash;
        let prev_mg_score = self.mg_score;
        let prev_eg_score = self.eg_score;
        let prev_phase = self.phase;

        if let Some(ep) = self.en_passant {
            self.hash ^= zobrist::en_passant_key(ep.file());
        }
        self.en_passant = None;

        let mut captured_square = None;

        if mv.is_en_passant {
            let captured_sq = Square::new(mv.from.rank(), mv.to.file());
            self.remove_tracked(captured_sq);
            captured_square = Some(captured_sq);
        } else if mv.captured_piece.is_some() {
            self.remove_tracked(mv.to);
            captured_square = Some(mv.to);
        }

        self.remove_tracked(mv.from);
        if let Some(promoted) = mv.promotion {
            self.place_tracked(mv.to, promoted, color);
        } else {
            self.place_tracked(mv.to, moving_piece, color);
        }

        if mv.is_castling {
            let (rook_from, rook_to) = Self::castling_rook_squares(color, mv.to);
            self.remove_tracked(rook_from);
            self.place_tracked(rook_to, Piece::Rook, color);
        }

        self.update_castling_rights(mv, moving_piece);

        if mv.is_double_pawn_push(moving_piece) {
            let ep_rank = (mv.from.rank() + mv.to.rank()) / 2;
            let ep_square = Square::new(ep_rank, mv.from.file());
            self.en_passant = Some(ep_square);
            self.hash ^= zobrist::en_passant_key(ep_square.file());
        }

        if moving_piece == Piece::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if color == Color::Black {
            self.fullmove_number += 1;
        }

        self.hash ^= zobrist::black_to_move_key();
        self.side_to_move = color.opponent();
        self.push_hash();

        UnmakeInfo {
            mv,
            moving_piece,
            captured_square,
            prev_castling_rights,
            prev_en_passant,
            prev_halfmove_clock,
            prev_hash,
            prev_mg_score,
            prev_eg_score,
            prev_phase,
        }
    }

    /// Reverse the effect of [`Board::make_move`]. `mv`/`undo` must be the
    /// exact pair returned by the matching `make_move` call.
    pub fn unmake_move(&mut self, mv: Move, undo: UnmakeInfo) {
        self.pop_hash();
        let color = self.side_to_move.opponent();
        self.side_to_move = color;

        if mv.is_castling {
            let (rook_from, rook_to) = Self::castling_rook_squares(color, mv.to);
            self.remove_piece(rook_to);
            self.place_piece(rook_from, Piece::Rook, color);
        }

        self.remove_piece(mv.to);
        self.place_piece(mv.from, undo.moving_piece, color);

        if let Some(captured_sq) = undo.captured_square {
            let captured_piece = if mv.is_en_passant {
                Piece::Pawn
            } else {
                mv.captured_piece.expect("captured_square implies captured_piece")
            };
            self.place_piece(captured_sq, captured_piece, color.opponent());
        }

        self.castling_rights = undo.prev_castling_rights;
        self.en_passant = undo.prev_en_passant;
        self.halfmove_clock = undo.prev_halfmove_clock;
        self.hash = undo.prev_hash;
        self.mg_score = undo.prev_mg_score;
        self.eg_score = undo.prev_eg_score;
        self.phase = undo.prev_phase;

        if color == Color::Black {
            self.fullmove_number -= 1;
        }
    }

    /// Flip the side to move without moving a piece, for null-move pruning.
    pub fn make_null_move(&mut self) -> NullMoveInfo {
        let prev_en_passant = self.en_passant;
        let prev_hash = self.hash;
        let prev_halfmove_clock = self.halfmove_clock;

        if let Some(ep) = self.en_passant {
            self.hash ^= zobrist::en_passant_key(ep.file());
        }
        self.en_passant = None;
        self.halfmove_clock += 1;
        self.hash ^= zobrist::black_to_move_key();
        self.side_to_move = self.side_to_move.opponent();
        self.push_hash();

        NullMoveInfo {
            prev_en_passant,
            prev_hash,
            prev_halfmove_clock,
        }
    }

    pub fn unmake_null_move(&mut self, info: NullMoveInfo) {
        self.pop_hash();
        self.side_to_move = self.side_to_move.opponent();
        self.en_passant = info.prev_en_passant;
        self.hash = info.prev_hash;
        self.halfmove_clock = info.prev_halfmove_clock;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::movegen::generate_legal_moves;

    #[test]
    fn make_unmake_round_trips_hash_and_eval() {
        let mut board = Board::new();
        let moves = generate_legal_moves(&board);
        for mv in moves.iter() {
            let before_hash = board.hash();
            let before_mg = board.mg_score;
            let before_eg = board.eg_score;
            let before_phase = board.phase;
            let undo = board.make_move(*mv);
            board.unmake_move(*mv, undo);
            assert_eq!(board.hash(), before_hash);
            assert_eq!(board.mg_score, before_mg);
            assert_eq!(board.eg_score, before_eg);
            assert_eq!(board.phase, before_phase);
        }
    }

    #[test]
    fn incremental_hash_matches_recomputed_hash_after_moves() {
        let mut board = Board::new();
        let e2e4 = Move {
            from: Square::new(1, 4),
            to: Square::new(3, 4),
            promotion: None,
            is_castling: false,
            is_en_passant: false,
            captured_piece: None,
        };
        board.make_move(e2e4);
        assert_eq!(board.hash(), board.calculate_initial_hash());
    }

    #[test]
    fn en_passant_capture_removes_the_correct_pawn() {
        let mut board = Board::new();
        let moves = [
            Move {
                from: Square::new(1, 4),
                to: Square::new(3, 4),
                promotion: None,
                is_castling: false,
                is_en_passant: false,
                captured_piece: None,
            },
            Move {
                from: Square::new(6, 0),
                to: Square::new(5, 0),
                promotion: None,
                is_castling: false,
                is_en_passant: false,
                captured_piece: None,
            },
            Move {
                from: Square::new(3, 4),
                to: Square::new(4, 4),
                promotion: None,
                is_castling: false,
                is_en_passant: false,
                captured_piece: None,
            },
            Move {
                from: Square::new(6, 3),
                to: Square::new(4, 3),
                promotion: None,
                is_castling: false,
                is_en_passant: false,
                captured_piece: None,
            },
        ];
        for mv in moves {
            board.make_move(mv);
        }
        assert_eq!(board.en_passant_square(), Some(Square::new(5, 3)));
        let ep_capture = Move {
            from: Square::new(4, 4),
            to: Square::new(5, 3),
            promotion: None,
            is_castling: false,
            is_en_passant: true,
            captured_piece: Some(Piece::Pawn),
        };
        let undo = board.make_move(ep_capture);
        assert!(board.is_empty_at(Square::new(4, 3)));
        board.unmake_move(ep_capture, undo);
        assert_eq!(board.piece_at(Square::new(4, 3)), Some((Piece::Pawn, Color::Black)));
    }
}
