//! Piece-square tables for the tapered evaluation.
//!
//! Tables are stored as pure positional deltas on top of
//! [`crate::config::MATERIAL_MG`]/[`crate::config::MATERIAL_EG`] — every
//! entry is added to the piece's flat material value, never a replacement
//! for it. Indexed `[square_index]` with square 0 = a1, 63 = h8, from
//! White's perspective; flip the square (`sq ^ 56`) to evaluate for Black.

use crate::config::{MATERIAL_EG, MATERIAL_MG};

#[rustfmt::skip]
const PAWN_MG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     -6,  10,   4, -14, -14,   4,  10,  -6,
     -9,   4,   2,   6,   6,   2,   4,  -9,
    -10,   2,  10,  22,  22,  10,   2, -10,
     -6,   8,  14,  26,  26,  14,   8,  -6,
      4,  12,  22,  30,  30,  22,  12,   4,
     40,  40,  40,  40,  40,  40,  40,  40,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PAWN_EG: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
     -2,   0,   0,  -4,  -4,   0,   0,  -2,
     -3,  -2,  -4,   0,   0,  -4,  -2,  -3,
      2,   2,   0,  -4,  -4,   0,   2,   2,
     10,   8,   4,   0,   0,   4,   8,  10,
     34,  30,  24,  18,  18,  24,  30,  34,
     60,  56,  50,  44,  44,  50,  56,  60,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const KNIGHT_MG: [i32; 64] = [
    -48, -34, -26, -22, -22, -26, -34, -48,
    -32, -18,   0,   4,   4,   0, -18, -32,
    -20,   4,  12,  18,  18,  12,   4, -20,
    -16,   8,  20,  24,  24,  20,   8, -16,
    -16,   8,  22,  26,  26,  22,   8, -16,
    -20,   6,  18,  22,  22,  18,   6, -20,
    -32, -16,   0,   6,   6,   0, -16, -32,
    -48, -32, -20, -16, -16, -20, -32, -48,
];

#[rustfmt::skip]
const KNIGHT_EG: [i32; 64] = [
    -40, -28, -18, -14, -14, -18, -28, -40,
    -26, -12,  -2,   2,   2,  -2, -12, -26,
    -16,  -2,   8,  12,  12,   8,  -2, -16,
    -12,   4,  14,  18,  18,  14,   4, -12,
    -12,   4,  14,  18,  18,  14,   4, -12,
    -16,  -2,   8,  12,  12,   8,  -2, -16,
    -26, -12,  -2,   2,   2,  -2, -12, -26,
    -40, -28, -18, -14, -14, -18, -28, -40,
];

#[rustfmt::skip]
const BISHOP_MG: [i32; 64] = [
    -18,  -8,  -8,  -6,  -6,  -8,  -8, -18,
     -8,   4,   0,   0,   0,   0,   4,  -8,
     -6,   4,   8,   8,   8,   8,   4,  -6,
     -4,   2,   8,  14,  14,   8,   2,  -4,
     -4,   2,   8,  14,  14,   8,   2,  -4,
     -6,   0,   8,   8,   8,   8,   0,  -6,
     -8,   0,   0,   0,   0,   0,   0,  -8,
    -18, -10,  -8,  -6,  -6,  -8, -10, -18,
];

#[rustfmt::skip]
const BISHOP_EG: [i32; 64] = [
    -12,  -8,  -6,  -4,  -4,  -6,  -8, -12,
     -6,  -2,   0,   2,   2,   0,  -2,  -6,
     -4,   0,   4,   6,   6,   4,   0,  -4,
     -4,   2,   6,  10,  10,   6,   2,  -4,
     -4,   2,   6,  10,  10,   6,   2,  -4,
     -4,   0,   4,   6,   6,   4,   0,  -4,
     -6,  -2,   0,   2,   2,   0,  -2,  -6,
    -12,  -8,  -6,  -4,  -4,  -6,  -8, -12,
];

#[rustfmt::skip]
const ROOK_MG: [i32; 64] = [
     -6,  -2,   2,   6,   6,   2,  -2,  -6,
    -10,  -2,   0,   0,   0,   0,  -2, -10,
    -10,  -2,   0,   0,   0,   0,  -2, -10,
    -10,  -2,   0,   0,   0,   0,  -2, -10,
    -10,  -2,   0,   0,   0,   0,  -2, -10,
    -10,  -2,   0,   0,   0,   0,  -2, -10,
      4,  10,  10,  10,  10,  10,  10,   4,
     -4,   0,   4,   8,   8,   4,   0,  -4,
];

#[rustfmt::skip]
const ROOK_EG: [i32; 64] = [
      0,   0,   0,   2,   2,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      0,   0,   0,   0,   0,   0,   0,   0,
      6,   6,   6,   6,   6,   6,   6,   6,
      4,   4,   4,   6,   6,   4,   4,   4,
];

#[rustfmt::skip]
const QUEEN_MG: [i32; 64] = [
     -8,  -4,  -4,  -2,  -2,  -4,  -4,  -8,
     -4,   0,   2,   2,   2,   2,   0,  -4,
     -4,   2,   4,   4,   4,   4,   2,  -4,
     -2,   2,   4,   6,   6,   4,   2,  -2,
      0,   2,   4,   6,   6,   4,   2,   0,
     -4,   4,   4,   4,   4,   4,   0,  -4,
     -4,   0,   2,   0,   0,   0,   0,  -4,
     -8,  -4,  -4,  -2,  -2,  -4,  -4,  -8,
];

#[rustfmt::skip]
const QUEEN_EG: [i32; 64] = [
    -18, -12,  -8,  -6,  -6,  -8, -12, -18,
    -10,  -2,   0,   4,   4,   0,  -2, -10,
     -6,   2,   8,  10,  10,   8,   2,  -6,
     -4,   6,  10,  14,  14,  10,   6,  -4,
     -4,   6,  10,  14,  14,  10,   6,  -4,
     -6,   2,   8,  10,  10,   8,   2,  -6,
    -10,  -4,   0,   2,   2,   0,  -4, -10,
    -18, -12,  -8,  -6,  -6,  -8, -12, -18,
];

#[rustfmt::skip]
const KING_MG: [i32; 64] = [
     16,  34,  10, -14,   2, -10,  32,  20,
     16,  16, -10, -26, -24, -14,  14,  16,
    -24, -30, -36, -44, -44, -36, -30, -24,
    -40, -50, -58, -64, -64, -58, -50, -40,
    -54, -62, -70, -76, -76, -70, -62, -54,
    -60, -68, -76, -80, -80, -76, -68, -60,
    -62, -70, -78, -82, -82, -78, -70, -62,
    -64, -72, -80, -84, -84, -80, -72, -64,
];

#[rustfmt::skip]
const KING_EG: [i32; 64] = [
    -46, -28, -20, -14, -14, -20, -28, -46,
    -22,  -2,   8,  12,  12,   8,  -2, -22,
     -8,  16,  26,  32,  32,  26,  16,  -8,
     -6,  22,  34,  40,  40,  34,  22,  -6,
     -6,  22,  34,  40,  40,  34,  22,  -6,
     -8,  16,  26,  32,  32,  26,  16,  -8,
    -20,  -2,   8,  12,  12,   8,  -2, -20,
    -46, -26, -18, -14, -14, -18, -26, -46,
];

/// `PST_MG[piece_index][square_index]`.
pub static PST_MG: [[i32; 64]; 6] = [PAWN_MG, KNIGHT_MG, BISHOP_MG, ROOK_MG, QUEEN_MG, KING_MG];
/// `PST_EG[piece_index][square_index]`.
pub static PST_EG: [[i32; 64]; 6] = [PAWN_EG, KNIGHT_EG, BISHOP_EG, ROOK_EG, QUEEN_EG, KING_EG];

/// Bonus for a pawn defended by another pawn, by rank (White's perspective).
pub const PAWN_SUPPORT_BONUS: [i32; 8] = [0, 2, 4, 6, 8, 12, 16, 0];

/// Flip a square index vertically so a White-relative table reads correctly
/// for Black (e.g. rank 1 for White maps to rank 8 for Black).
#[inline]
#[must_use]
pub fn mirror(sq: usize) -> usize {
    sq ^ 56
}

/// Material plus positional delta for `piece` on `sq` (White's perspective),
/// as `(middlegame, endgame)`.
#[inline]
#[must_use]
pub fn piece_square_value(piece_index: usize, sq: usize) -> (i32, i32) {
    (
        MATERIAL_MG[piece_index] + PST_MG[piece_index][sq],
        MATERIAL_EG[piece_index] + PST_EG[piece_index][sq],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_is_involution() {
        for sq in 0..64 {
            assert_eq!(mirror(mirror(sq)), sq);
        }
    }

    #[test]
    fn mirror_maps_rank1_to_rank8() {
        assert_eq!(mirror(0), 56); // a1 -> a8
        assert_eq!(mirror(7), 63); // h1 -> h8
    }

    #[test]
    fn pawn_mg_table_has_zero_back_ranks() {
        assert!(PAWN_MG[0..8].iter().all(|&v| v == 0));
        assert!(PAWN_MG[56..64].iter().all(|&v| v == 0));
    }

    #[test]
    fn piece_square_value_adds_material_and_pst() {
        let (mg, eg) = piece_square_value(0, 27);
        assert_eq!(mg, MATERIAL_MG[0] + PAWN_MG[27]);
        assert_eq!(eg, MATERIAL_EG[0] + PAWN_EG[27]);
    }
}
