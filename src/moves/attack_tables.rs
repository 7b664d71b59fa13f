//! Per-square attack lookup for every piece kind.
//!
//! `AttackTables` is built once, then only read. Leaper patterns are copied
//! from compile-time tables; slider tables are hashed by blocker occupancy.

use crate::game_state::chess_types::{Bitboard, Color, Square};
use crate::moves::leaper_attacks::{pawn_attack_table, KING_ATTACKS, KNIGHT_ATTACKS};
use crate::moves::slider_rays::{BISHOP_DIRECTIONS, ROOK_DIRECTIONS};
use crate::moves::sliding_magics::SlidingAttacks;

const BISHOP_MAGIC_SEED: u64 = 0x5EED_B15B_0000_0001;
const ROOK_MAGIC_SEED: u64 = 0x5EED_0000_700C_0002;

#[derive(Debug, Clone)]
pub struct AttackTables {
    knight: [Bitboard; 64],
    king: [Bitboard; 64],
    pawn: [[Bitboard; 64]; 2],
    bishop: SlidingAttacks,
    rook: SlidingAttacks,
}

impl AttackTables {
    pub fn build() -> Self {
        Self {
            knight: KNIGHT_ATTACKS,
            king: KING_ATTACKS,
            pawn: [
                *pawn_attack_table(Color::White),
                *pawn_attack_table(Color::Black),
            ],
            bishop: SlidingAttacks::build(&BISHOP_DIRECTIONS, BISHOP_MAGIC_SEED),
            rook: SlidingAttacks::build(&ROOK_DIRECTIONS, ROOK_MAGIC_SEED),
        }
    }

    #[inline]
    pub fn knight_attacks(&self, square: Square) -> Bitboard {
        self.knight[square as usize]
    }

    #[inline]
    pub fn king_attacks(&self, square: Square) -> Bitboard {
        self.king[square as usize]
    }

    /// Squares a `color` pawn on `square` captures on.
    #[inline]
    pub fn pawn_attacks(&self, color: Color, square: Square) -> Bitboard {
        self.pawn[color.index()][square as usize]
    }

    #[inline]
    pub fn bishop_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        self.bishop.attacks(square, occupancy)
    }

    #[inline]
    pub fn rook_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        self.rook.attacks(square, occupancy)
    }

    #[inline]
    pub fn queen_attacks(&self, square: Square, occupancy: Bitboard) -> Bitboard {
        self.bishop.attacks(square, occupancy) | self.rook.attacks(square, occupancy)
    }
}

#[cfg(test)]
mod tests {
    use super::AttackTables;
    use crate::game_state::chess_types::Color;

    #[test]
    fn queen_attacks_match_union() {
        let tables = AttackTables::build();
        let d4 = 27u8;
        let blockers = (1u64 << 43) | (1u64 << 30);
        let attacks = tables.queen_attacks(d4, blockers);

        assert_ne!(attacks & (1u64 << 43), 0);
        assert_ne!(attacks & (1u64 << 30), 0);
        assert_eq!(attacks & (1u64 << 51), 0);
        assert_eq!(attacks & (1u64 << 31), 0);
        assert_eq!(tables.queen_attacks(d4, 0).count_ones(), 27);
    }

    #[test]
    fn leaper_lookups_are_wired_by_color() {
        let tables = AttackTables::build();
        assert_eq!(tables.pawn_attacks(Color::White, 12), (1u64 << 19) | (1u64 << 21));
        assert_eq!(tables.pawn_attacks(Color::Black, 12), (1u64 << 3) | (1u64 << 5));
        assert_eq!(tables.knight_attacks(27).count_ones(), 8);
        assert_eq!(tables.king_attacks(63).count_ones(), 3);
    }
}
