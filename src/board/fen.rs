//! Forsyth-Edwards Notation parsing/formatting and UCI long-algebraic move
//! parsing.

use std::str::FromStr;

use crate::board::state::Board;
use crate::error::{FenError, MoveParseError};
use crate::types::{
    file_to_index, rank_to_index, Color, Move, Piece, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q,
    CASTLE_WHITE_K, CASTLE_WHITE_Q,
};

impl Board {
    /// Parse a position from FEN. Fails on malformed input; never panics.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        for (rank_idx, rank_str) in parts[0].split('/').enumerate() {
            if rank_idx >= 8 {
                return Err(FenError::InvalidRank { rank: rank_idx });
            }
            let rank = 7 - rank_idx;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(digit) = c.to_digit(10) {
                    file += digit as usize;
                } else {
                    let color = if c.is_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file + 1,
                        });
                    }
                    board.place_piece(Square::new(rank, file), piece, color);
                    file += 1;
                }
            }
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        for c in parts[2].chars() {
            match c {
                'K' => board.castling_rights |= CASTLE_WHITE_K,
                'Q' => board.castling_rights |= CASTLE_WHITE_Q,
                'k' => board.castling_rights |= CASTLE_BLACK_K,
                'q' => board.castling_rights |= CASTLE_BLACK_Q,
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }

        board.en_passant = if parts[3] == "-" {
            None
        } else {
            let chars: Vec<char> = parts[3].chars().collect();
            if chars.len() == 2
                && ('a'..='h').contains(&chars[0])
                && ('1'..='8').contains(&chars[1])
            {
                Some(Square::new(rank_to_index(chars[1]), file_to_index(chars[0])))
            } else {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
        };

        if parts.len() >= 5 {
            board.halfmove_clock = parts[4].parse().unwrap_or(0);
        }
        if parts.len() >= 6 {
            board.fullmove_number = parts[5].parse().unwrap_or(1);
        }

        board.recalculate_incremental_eval();
        board.hash = board.calculate_initial_hash();
        board.push_hash();
        Ok(board)
    }

    /// Parse a position from FEN.
    ///
    /// # Panics
    /// Panics on malformed FEN; use [`Board::try_from_fen`] for fallible parsing.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        Self::try_from_fen(fen).expect("invalid FEN string")
    }

    /// Serialize the position to FEN.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut ranks = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0u32;
            for file in 0..8 {
                let sq = Square::new(rank, file);
                if let Some((piece, color)) = self.piece_at(sq) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            ranks.push(row);
        }

        let side = if self.side_to_move() == Color::White {
            "w"
        } else {
            "b"
        };

        let mut castling = String::new();
        if self.castling_rights() & CASTLE_WHITE_K != 0 {
            castling.push('K');
        }
        if self.castling_rights() & CASTLE_WHITE_Q != 0 {
            castling.push('Q');
        }
        if self.castling_rights() & CASTLE_BLACK_K != 0 {
            castling.push('k');
        }
        if self.castling_rights() & CASTLE_BLACK_Q != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = self
            .en_passant_square()
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            ranks.join("/"),
            side,
            castling,
            ep,
            self.halfmove_clock(),
            self.fullmove_number(),
        )
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::try_from_fen(s)
    }
}

/// Parse a UCI long-algebraic move string (e.g. `"e2e4"`, `"e7e8q"`) against
/// the legal moves available in `board`.
pub fn parse_move(board: &Board, uci: &str) -> Result<Move, MoveParseError> {
    if uci.len() < 4 || uci.len() > 5 {
        return Err(MoveParseError::InvalidLength { len: uci.len() });
    }
    let chars: Vec<char> = uci.chars().collect();
    if !('a'..='h').contains(&chars[0])
        || !('1'..='8').contains(&chars[1])
        || !('a'..='h').contains(&chars[2])
        || !('1'..='8').contains(&chars[3])
    {
        return Err(MoveParseError::InvalidSquare {
            notation: uci.to_string(),
        });
    }

    let from = Square::new(rank_to_index(chars[1]), file_to_index(chars[0]));
    let to = Square::new(rank_to_index(chars[3]), file_to_index(chars[2]));

    let promotion = if uci.len() == 5 {
        let piece = Piece::from_char(chars[4]).ok_or(MoveParseError::InvalidPromotion {
            char: chars[4],
        })?;
        if matches!(piece, Piece::Pawn | Piece::King) {
            return Err(MoveParseError::InvalidPromotion { char: chars[4] });
        }
        Some(piece)
    } else {
        None
    };

    board
        .generate_moves()
        .iter()
        .find(|m| m.from == from && m.to == to && m.promotion == promotion)
        .copied()
        .ok_or_else(|| MoveParseError::IllegalMove {
            notation: uci.to_string(),
        })
}

/// Parse and apply a UCI long-algebraic move in one step.
pub fn make_move_uci(board: &mut Board, uci: &str) -> Result<Move, MoveParseError> {
    let mv = parse_move(board, uci)?;
    board.make_move(mv);
    Ok(mv)
}
