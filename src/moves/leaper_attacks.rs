//! Knight, king and pawn-capture attack patterns.
//!
//! These pieces ignore occupancy, so each table is a plain
//! origin -> attack-bitboard array computed at compile time.

use crate::game_state::chess_types::{Bitboard, Color};

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const WHITE_PAWN_CAPTURE_STEPS: [(i8, i8); 2] = [(-1, 1), (1, 1)];
const BLACK_PAWN_CAPTURE_STEPS: [(i8, i8); 2] = [(-1, -1), (1, -1)];

pub const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_STEPS);
pub const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_STEPS);

/// Squares a pawn of each color attacks, indexed `[color][square]`.
pub static PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&WHITE_PAWN_CAPTURE_STEPS),
    leaper_table(&BLACK_PAWN_CAPTURE_STEPS),
];

#[inline]
pub fn pawn_attack_table(color: Color) -> &'static [Bitboard; 64] {
    &PAWN_ATTACKS[color.index()]
}

const fn leaper_table(steps: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [0u64; 64];
    let mut sq = 0usize;

    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut attacks = 0u64;
        let mut i = 0usize;

        while i < steps.len() {
            attacks |= set_if_valid(file + steps[i].0, rank + steps[i].1);
            i += 1;
        }

        table[sq] = attacks;
        sq += 1;
    }

    table
}

const fn set_if_valid(file: i8, rank: i8) -> Bitboard {
    if file < 0 || file > 7 || rank < 0 || rank > 7 {
        return 0;
    }

    1u64 << ((rank as usize) * 8 + (file as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knight_attacks_from_d4_has_eight_targets() {
        assert_eq!(KNIGHT_ATTACKS[27].count_ones(), 8);
        assert_eq!(KNIGHT_ATTACKS[0], (1u64 << 10) | (1u64 << 17));
    }

    #[test]
    fn king_attacks_from_a1_has_three_targets() {
        assert_eq!(KING_ATTACKS[0].count_ones(), 3);
        assert_eq!(KING_ATTACKS[27].count_ones(), 8);
    }

    #[test]
    fn pawn_attacks_point_forward_for_each_color() {
        let e2 = 12;
        let e7 = 52;
        assert_eq!(pawn_attack_table(Color::White)[e2], (1u64 << 19) | (1u64 << 21));
        assert_eq!(pawn_attack_table(Color::Black)[e7], (1u64 << 43) | (1u64 << 45));
        // a-file pawns only capture inward.
        assert_eq!(pawn_attack_table(Color::White)[8], 1u64 << 17);
        // Last-rank pawns attack nothing.
        assert_eq!(pawn_attack_table(Color::White)[60], 0);
    }
}
