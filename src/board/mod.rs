//! Board representation, move generation, make/unmake, FEN, and evaluation.

mod eval;
mod fen;
mod make_unmake;
mod movegen;
mod state;

pub use fen::{make_move_uci, parse_move};
pub use movegen::{
    generate_tactical_moves, is_checkmate, is_in_check, is_square_attacked, is_stalemate,
    mobility_counts, perft,
};
pub use state::{Board, NullMoveInfo, UnmakeInfo};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    #[test]
    fn startpos_has_20_legal_moves() {
        let board = Board::new();
        assert_eq!(board.generate_moves().len(), 20);
    }

    #[test]
    fn startpos_side_to_move_is_white() {
        let board = Board::new();
        assert_eq!(board.side_to_move(), Color::White);
    }
}
