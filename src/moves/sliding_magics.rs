//! Blocker-indexed attack tables for bishops and rooks.
//!
//! For every origin square the relevant blocker bits are hashed by a
//! multiplier ("magic") found at build time, so a lookup is one mask, one
//! multiply, one shift and one load. Multipliers come from a seeded RNG, which
//! keeps table construction deterministic between runs.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_state::chess_types::{Bitboard, Square};
use crate::moves::slider_rays::{ray_attacks, relevant_blocker_mask, Directions};

/// Per-square hashing parameters.
#[derive(Debug, Clone, Copy, Default)]
struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u32,
    offset: usize,
}

impl MagicEntry {
    #[inline]
    fn index(&self, occupancy: Bitboard) -> usize {
        self.offset + ((occupancy & self.mask).wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Attack lookup for one slider kind over all 64 origins.
#[derive(Debug, Clone)]
pub struct SlidingAttacks {
    entries: [MagicEntry; 64],
    attacks: Vec<Bitboard>,
}

impl SlidingAttacks {
    /// Build tables for the slider moving along `directions`.
    pub fn build(directions: &Directions, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut entries = [MagicEntry::default(); 64];
        let mut attacks = Vec::new();

        for square in 0..64u8 {
            let mask = relevant_blocker_mask(square, directions);
            let (magic, table) = find_magic(square, mask, directions, &mut rng);

            entries[square as usize] = MagicEntry {
                mask,
                magic,
                shift: 64 - mask.count_ones(),
                offset: attacks.len(),
            };
            attacks.extend_from_slice(&table);
        }

        Self { entries, attacks }
    }

    #[inline]
    pub fn attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        self.attacks[self.entries[square as usize].index(occupancy)]
    }

    /// Total number of stored attack sets.
    pub fn table_len(&self) -> usize {
        self.attacks.len()
    }
}

/// Search for a multiplier mapping every blocker subset of `mask` to a slot
/// without destructive collisions. Returns the multiplier and its filled table.
fn find_magic(
    square: Square,
    mask: Bitboard,
    directions: &Directions,
    rng: &mut StdRng,
) -> (u64, Vec<Bitboard>) {
    let bits = mask.count_ones();
    let shift = 64 - bits;
    let size = 1usize << bits;

    // Carry-rippler walk over every subset of the mask.
    let mut occupancies = Vec::with_capacity(size);
    let mut references = Vec::with_capacity(size);
    let mut subset = 0u64;
    loop {
        occupancies.push(subset);
        references.push(ray_attacks(square, subset, directions));
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }

    let mut table = vec![0u64; size];
    // Slot i is valid for the current attempt only when epoch[i] == attempt.
    let mut epoch = vec![0u32; size];
    let mut attempt = 0u32;

    loop {
        let magic = sparse_random(rng);
        if (mask.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
            continue;
        }

        attempt += 1;
        let mut ok = true;
        for (occ, reference) in occupancies.iter().zip(&references) {
            let idx = (occ.wrapping_mul(magic) >> shift) as usize;
            if epoch[idx] < attempt {
                epoch[idx] = attempt;
                table[idx] = *reference;
            } else if table[idx] != *reference {
                ok = false;
                break;
            }
        }

        if ok {
            return (magic, table);
        }
    }
}

#[inline]
fn sparse_random(rng: &mut StdRng) -> u64 {
    rng.random::<u64>() & rng.random::<u64>() & rng.random::<u64>()
}

#[cfg(test)]
mod tests {
    use super::SlidingAttacks;
    use crate::moves::slider_rays::{ray_attacks, BISHOP_DIRECTIONS, ROOK_DIRECTIONS};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn magic_lookups_match_ray_walking() {
        let bishops = SlidingAttacks::build(&BISHOP_DIRECTIONS, 11);
        let rooks = SlidingAttacks::build(&ROOK_DIRECTIONS, 13);
        let mut rng = StdRng::seed_from_u64(2024);

        for square in 0..64u8 {
            for _ in 0..64 {
                let occupancy = rng.random::<u64>() & rng.random::<u64>();
                assert_eq!(
                    bishops.attacks(square, occupancy),
                    ray_attacks(square, occupancy, &BISHOP_DIRECTIONS)
                );
                assert_eq!(
                    rooks.attacks(square, occupancy),
                    ray_attacks(square, occupancy, &ROOK_DIRECTIONS)
                );
            }
        }
    }

    #[test]
    fn table_sizes_follow_mask_bits() {
        // Sum of 2^bits over all squares for plain (non-shared) magics.
        assert_eq!(SlidingAttacks::build(&BISHOP_DIRECTIONS, 1).table_len(), 5248);
        assert_eq!(SlidingAttacks::build(&ROOK_DIRECTIONS, 1).table_len(), 102_400);
    }
}
