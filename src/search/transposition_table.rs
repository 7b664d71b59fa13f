//! Fixed-size transposition table keyed by Zobrist hash.
//!
//! The slot is chosen by the low key bits and the remaining high bits are kept
//! as a verifier, so two positions sharing a slot can never answer for each
//! other. A store into a slot held by a different key always overwrites; how a
//! same-key entry is replaced, and which stored depths answer a probe, is
//! decided by the payload type. One table serves perft (node counts) and
//! search (scores with bounds).

use std::mem;

use crate::moves::move_descriptions::Move;

/// Depth rules a payload imposes on its table.
pub trait TablePayload: Copy {
    /// Whether an entry stored at `stored_depth` answers a probe at
    /// `requested_depth`.
    fn answers(stored_depth: u8, requested_depth: u8) -> bool;

    /// Whether a new entry for the same key replaces the stored one.
    fn replaces(stored_depth: u8, new_depth: u8) -> bool;
}

/// Node counts are only valid for the exact depth they were counted at.
impl TablePayload for u64 {
    #[inline]
    fn answers(stored_depth: u8, requested_depth: u8) -> bool {
        stored_depth == requested_depth
    }

    #[inline]
    fn replaces(_stored_depth: u8, _new_depth: u8) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchEntry {
    pub score: i32,
    pub best_move: Option<Move>,
    pub bound: Bound,
}

/// A deeper search result stays usable for shallower requests.
impl TablePayload for SearchEntry {
    #[inline]
    fn answers(stored_depth: u8, requested_depth: u8) -> bool {
        stored_depth >= requested_depth
    }

    #[inline]
    fn replaces(stored_depth: u8, new_depth: u8) -> bool {
        new_depth >= stored_depth
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
}

#[derive(Debug, Clone, Copy)]
struct Slot<P> {
    verifier: u64,
    depth: u8,
    payload: P,
}

#[derive(Debug, Clone)]
pub struct TranspositionTable<P: TablePayload> {
    slots: Vec<Option<Slot<P>>>,
    index_bits: u32,
    stats: TableStats,
}

pub type PerftTable = TranspositionTable<u64>;
pub type SearchTable = TranspositionTable<SearchEntry>;

impl<P: TablePayload> TranspositionTable<P> {
    /// Table with `capacity` rounded down to a power of two (at least one slot).
    pub fn with_capacity(capacity: usize) -> Self {
        let count = match capacity {
            0 | 1 => 1,
            n => 1usize << (usize::BITS - 1 - n.leading_zeros()),
        };
        Self {
            slots: vec![None; count],
            index_bits: count.trailing_zeros(),
            stats: TableStats::default(),
        }
    }

    /// Largest power-of-two table fitting in `size_mb` megabytes.
    pub fn new_with_mb(size_mb: usize) -> Self {
        Self::with_capacity(Self::capacity_for_mb(size_mb))
    }

    /// Slot count (before rounding) that `size_mb` megabytes can hold.
    pub fn capacity_for_mb(size_mb: usize) -> usize {
        let bytes = size_mb.max(1).saturating_mul(1024 * 1024);
        bytes / mem::size_of::<Option<Slot<P>>>().max(1)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.stats = TableStats::default();
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    #[inline]
    pub fn stats(&self) -> TableStats {
        self.stats
    }

    #[inline]
    pub fn hit_count(&self) -> u64 {
        self.stats.hits
    }

    #[inline]
    fn locate(&self, key: u64) -> (usize, u64) {
        let mask = (self.slots.len() - 1) as u64;
        ((key & mask) as usize, key >> self.index_bits)
    }

    /// Payload for `key` if it was stored at a depth that answers `depth`.
    pub fn probe(&mut self, key: u64, depth: u8) -> Option<P> {
        self.stats.probes += 1;
        let (idx, verifier) = self.locate(key);
        let hit = self.slots[idx]
            .filter(|slot| slot.verifier == verifier && P::answers(slot.depth, depth))
            .map(|slot| slot.payload);
        if hit.is_some() {
            self.stats.hits += 1;
        }
        hit
    }

    /// Payload for `key` regardless of depth. Not counted in the stats.
    #[inline]
    pub fn peek(&self, key: u64) -> Option<P> {
        let (idx, verifier) = self.locate(key);
        self.slots[idx]
            .filter(|slot| slot.verifier == verifier)
            .map(|slot| slot.payload)
    }

    pub fn store(&mut self, key: u64, depth: u8, payload: P) {
        self.stats.stores += 1;
        let (idx, verifier) = self.locate(key);
        let replace = match self.slots[idx] {
            Some(existing) if existing.verifier == verifier => P::replaces(existing.depth, depth),
            _ => true,
        };
        if replace {
            self.slots[idx] = Some(Slot {
                verifier,
                depth,
                payload,
            });
        }
    }
}
