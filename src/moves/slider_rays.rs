//! Ray walking for bishops and rooks.
//!
//! The slow but obviously-correct reference the magic tables are built from
//! and checked against. Not used on the move-generation hot path.

use crate::game_state::chess_types::{Bitboard, Square};

/// `(file_step, rank_step)` per direction.
pub type Directions = [(i8, i8); 4];

pub const BISHOP_DIRECTIONS: Directions = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
pub const ROOK_DIRECTIONS: Directions = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Attack set of a slider on `square`, each ray stopping at (and including)
/// the first occupied square.
pub fn ray_attacks(square: Square, occupancy: Bitboard, directions: &Directions) -> Bitboard {
    directions
        .iter()
        .fold(0u64, |acc, &(df, dr)| acc | trace_ray(square, df, dr, occupancy))
}

/// Squares whose occupancy can change the slider's attack set.
///
/// The last square of every ray is dropped: a piece there blocks nothing
/// further.
pub fn relevant_blocker_mask(square: Square, directions: &Directions) -> Bitboard {
    let mut mask = 0u64;
    for &(df, dr) in directions {
        let mut file = (square % 8) as i8 + df;
        let mut rank = (square / 8) as i8 + dr;

        while on_board(file + df, rank + dr) {
            mask |= 1u64 << (rank * 8 + file);
            file += df;
            rank += dr;
        }
    }
    mask
}

fn trace_ray(square: Square, file_step: i8, rank_step: i8, occupancy: Bitboard) -> Bitboard {
    let mut file = (square % 8) as i8 + file_step;
    let mut rank = (square / 8) as i8 + rank_step;
    let mut attacks = 0u64;

    while on_board(file, rank) {
        let bit = 1u64 << (rank * 8 + file);
        attacks |= bit;

        if (occupancy & bit) != 0 {
            break;
        }

        file += file_step;
        rank += rank_step;
    }

    attacks
}

#[inline]
fn on_board(file: i8, rank: i8) -> bool {
    (0..8).contains(&file) && (0..8).contains(&rank)
}
