//! Fixed-size, always-replace transposition table keyed by Zobrist hash.
//!
//! Entries store only the upper 32 bits of the hash rather than the full 64.
//! A probe that finds a populated slot whose stored half-hash doesn't match
//! is a miss, not a panic or a wrong-hash hit: the remaining 2^-32 collision
//! probability per entry is accepted, as is usual for this data structure.

use std::mem;

use crate::types::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    hash32: u32,
    score: i16,
    depth: i8,
    bound: Bound,
    best_move: Option<Move>,
}

/// A transposition-table lookup result, with the score already adjusted for
/// mate-distance so the caller can use it directly.
#[derive(Clone, Copy, Debug)]
pub struct Probe {
    pub score: i32,
    pub depth: i8,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

pub struct TranspositionTable {
    entries: Vec<Option<Entry>>,
    mask: usize,
}

impl TranspositionTable {
    /// Build a table sized to the largest power-of-two entry count that fits
    /// in `size_mb` megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = mem::size_of::<Option<Entry>>().max(1);
        let budget_bytes = size_mb.max(1) * 1024 * 1024;
        let max_entries = (budget_bytes / entry_size).max(1);
        let num_entries = 1usize << max_entries.ilog2();
        TranspositionTable {
            entries: vec![None; num_entries],
            mask: num_entries - 1,
        }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Look up `hash`, adjusting a stored mate score for the number of plies
    /// from the root so it reads correctly at this node (`ply_from_root`
    /// must be the caller's own distance from the search root).
    #[must_use]
    pub fn probe(&self, hash: u64, ply_from_root: i32) -> Option<Probe> {
        let entry = self.entries[self.index(hash)]?;
        if entry.hash32 != (hash >> 32) as u32 {
            return None;
        }
        Some(Probe {
            score: score_from_tt(entry.score as i32, ply_from_root),
            depth: entry.depth,
            bound: entry.bound,
            best_move: entry.best_move,
        })
    }

    /// Overwrite the slot for `hash` unconditionally. Mate scores are stored
    /// relative to the node they were found at (distance-to-mate), not the
    /// search root, so they remain valid when probed from a different node.
    pub fn store(
        &mut self,
        hash: u64,
        depth: i8,
        score: i32,
        bound: Bound,
        best_move: Option<Move>,
        ply_from_root: i32,
    ) {
        let index = self.index(hash);
        self.entries[index] = Some(Entry {
            hash32: (hash >> 32) as u32,
            score: score_to_tt(score, ply_from_root).clamp(i16::MIN as i32, i16::MAX as i32) as i16,
            depth,
            bound,
            best_move,
        });
    }

    /// Reset every slot to empty.
    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}

/// Convert a search-relative mate score (distance from the current node) to
/// a root-relative one for storage, so that multiple nodes on a principal
/// line can still probe and reuse the same entry correctly.
fn score_to_tt(score: i32, ply_from_root: i32) -> i32 {
    if score >= crate::config::search::MATE_THRESHOLD {
        score + ply_from_root
    } else if score <= -crate::config::search::MATE_THRESHOLD {
        score - ply_from_root
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply_from_root: i32) -> i32 {
    if score >= crate::config::search::MATE_THRESHOLD {
        score - ply_from_root
    } else if score <= -crate::config::search::MATE_THRESHOLD {
        score + ply_from_root
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn sample_move() -> Move {
        Move {
            from: Square::new(1, 4),
            to: Square::new(3, 4),
            promotion: None,
            is_castling: false,
            is_en_passant: false,
            captured_piece: None,
        }
    }

    #[test]
    fn table_size_is_a_power_of_two() {
        let tt = TranspositionTable::new(1);
        assert!(tt.capacity().is_power_of_two());
    }

    #[test]
    fn probe_after_store_returns_the_same_entry() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0xDEAD_BEEF_0000_0001, 6, 120, Bound::Exact, Some(sample_move()), 0);
        let probe = tt.probe(0xDEAD_BEEF_0000_0001, 0).unwrap();
        assert_eq!(probe.score, 120);
        assert_eq!(probe.depth, 6);
        assert_eq!(probe.bound, Bound::Exact);
        assert_eq!(probe.best_move, Some(sample_move()));
    }

    #[test]
    fn probe_rejects_a_half_hash_collision() {
        let mut tt = TranspositionTable::new(1);
        let index_bits = tt.mask as u64;
        let hash_a = index_bits;
        let hash_b = index_bits | (1u64 << 32);
        tt.store(hash_a, 4, 10, Bound::Exact, None, 0);
        assert!(tt.probe(hash_b, 0).is_none());
    }

    #[test]
    fn store_always_replaces_the_slot() {
        let mut tt = TranspositionTable::new(1);
        tt.store(1, 2, 10, Bound::Exact, None, 0);
        tt.store(1, 20, 999, Bound::Lower, None, 0);
        let probe = tt.probe(1, 0).unwrap();
        assert_eq!(probe.depth, 20);
        assert_eq!(probe.score, 999);
    }

    #[test]
    fn clear_empties_every_slot() {
        let mut tt = TranspositionTable::new(1);
        tt.store(1, 2, 10, Bound::Exact, None, 0);
        tt.clear();
        assert!(tt.probe(1, 0).is_none());
    }

    #[test]
    fn mate_score_is_adjusted_for_distance_from_root() {
        // A mate stored when found 2 plies from the root, re-probed from a
        // node 5 plies from the root, must read back 3 plies "slower" (the
        // mating sequence is the same length, but this path reaches the
        // same node 3 plies later, so it resolves 3 plies further from the
        // true root).
        let mut tt = TranspositionTable::new(1);
        let mate_in_3 = crate::config::search::MATE_THRESHOLD + 3;
        tt.store(7, 1, mate_in_3, Bound::Exact, None, 2);
        let probe = tt.probe(7, 5).unwrap();
        assert_eq!(probe.score, mate_in_3 - (5 - 2));
    }
}
