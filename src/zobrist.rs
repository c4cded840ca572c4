//! Zobrist hashing for chess positions.
//!
//! Provides an incrementally-updatable 64-bit position hash used as the
//! transposition-table key and for repetition detection.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::types::{Color, Piece, Square};

pub(crate) struct ZobristKeys {
    /// `piece_keys[piece_index][color_index][square_index]`
    pub(crate) piece_keys: [[[u64; 64]; 2]; 6],
    pub(crate) black_to_move_key: u64,
    /// Indexed by the full 4-bit castling-rights mask (0..16), so every
    /// distinct combination of rights gets its own independent key rather
    /// than four keys XORed together.
    pub(crate) castling_keys: [u64; 16],
    /// Indexed by en passant target file (0..8).
    pub(crate) en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(1_234_567_890_u64);
        let mut piece_keys = [[[0u64; 64]; 2]; 6];
        for piece in &mut piece_keys {
            for color in piece.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let black_to_move_key = rng.gen();

        let mut castling_keys = [0u64; 16];
        for key in &mut castling_keys {
            *key = rng.gen();
        }
        castling_keys[0] = 0;

        let mut en_passant_keys = [0u64; 8];
        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            black_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);

#[inline]
pub(crate) fn piece_key(piece: Piece, color: Color, sq: Square) -> u64 {
    ZOBRIST.piece_keys[piece.index()][color.index()][sq.index().as_usize()]
}

#[inline]
pub(crate) fn castling_key(rights_mask: u8) -> u64 {
    ZOBRIST.castling_keys[rights_mask as usize]
}

#[inline]
pub(crate) fn en_passant_key(file: usize) -> u64 {
    ZOBRIST.en_passant_keys[file]
}

#[inline]
pub(crate) fn black_to_move_key() -> u64 {
    ZOBRIST.black_to_move_key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castling_key_zero_mask_is_zero() {
        assert_eq!(castling_key(0), 0);
    }

    #[test]
    fn distinct_masks_give_distinct_keys() {
        let k1 = castling_key(0b0001);
        let k2 = castling_key(0b0010);
        let k3 = castling_key(0b1111);
        assert_ne!(k1, k2);
        assert_ne!(k2, k3);
        assert_ne!(k1, k3);
    }

    #[test]
    fn piece_keys_differ_by_square() {
        let a = piece_key(Piece::Knight, Color::White, Square::new(0, 1));
        let b = piece_key(Piece::Knight, Color::White, Square::new(0, 2));
        assert_ne!(a, b);
    }
}
