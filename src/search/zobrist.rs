//! Zobrist hashing support for fast position identity.
//!
//! The keys are generated from a fixed seed so hashes are deterministic across
//! runs, which is useful for testing and debugging. One key per castling-right
//! bit keeps the castling contribution linear, so a rights change can be
//! applied by XORing `castling_key(old ^ new)`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;

pub const DEFAULT_ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone)]
pub struct ZobristKeys {
    piece_square: [[[u64; 64]; 6]; 2],
    castling: [u64; 4],
    en_passant_file: [u64; 8],
    side_to_move: u64,
}

impl ZobristKeys {
    pub fn build(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut piece_square = [[[0u64; 64]; 6]; 2];
        for color in &mut piece_square {
            for piece in color {
                for sq in piece {
                    *sq = rng.random();
                }
            }
        }

        let mut castling = [0u64; 4];
        for key in &mut castling {
            *key = rng.random();
        }

        let mut en_passant_file = [0u64; 8];
        for key in &mut en_passant_file {
            *key = rng.random();
        }

        Self {
            piece_square,
            castling,
            en_passant_file,
            side_to_move: rng.random(),
        }
    }

    /// Key for a `(color, piece, square)` occupancy term.
    #[inline]
    pub fn piece_square_key(&self, color: Color, piece: PieceKind, square: Square) -> u64 {
        self.piece_square[color.index()][piece.index()][square as usize]
    }

    /// XOR of the keys of every right set in `castling_rights`.
    #[inline]
    pub fn castling_key(&self, castling_rights: CastlingRights) -> u64 {
        let mut key = 0u64;
        for (bit, bit_key) in self.castling.iter().enumerate() {
            if castling_rights & (1 << bit) != 0 {
                key ^= bit_key;
            }
        }
        key
    }

    #[inline]
    pub fn en_passant_file_key(&self, file: u8) -> u64 {
        self.en_passant_file[file as usize]
    }

    /// Toggle key, XORed in while Black is to move.
    #[inline]
    pub fn side_to_move_key(&self) -> u64 {
        self.side_to_move
    }
}

/// Compute the full position key from scratch.
pub fn compute_zobrist_key(position: &Position) -> u64 {
    let keys = &position.tables().zobrist;
    let mut key = 0u64;

    for color in Color::ALL {
        for piece in PieceKind::ALL {
            let mut bb = position.pieces[color.index()][piece.index()];
            while bb != 0 {
                key ^= keys.piece_square_key(color, piece, pop_lsb(&mut bb));
            }
        }
    }

    if position.side_to_move == Color::Black {
        key ^= keys.side_to_move_key();
    }

    key ^= keys.castling_key(position.castling_rights);

    if let Some(ep_square) = position.en_passant_square {
        key ^= keys.en_passant_file_key(file_of(ep_square));
    }

    key
}

#[cfg(test)]
mod tests {
    use super::{compute_zobrist_key, ZobristKeys, DEFAULT_ZOBRIST_SEED};
    use crate::game_state::chess_types::*;
    use crate::game_state::position::Position;
    use crate::tables::engine_tables::EngineTables;

    fn from_fen(fen: &str) -> Position {
        Position::from_fen(EngineTables::shared_for_tests(), fen).expect("FEN should parse")
    }

    #[test]
    fn keys_are_deterministic_per_seed() {
        let a = ZobristKeys::build(DEFAULT_ZOBRIST_SEED);
        let b = ZobristKeys::build(DEFAULT_ZOBRIST_SEED);
        let c = ZobristKeys::build(DEFAULT_ZOBRIST_SEED + 1);
        assert_eq!(
            a.piece_square_key(Color::White, PieceKind::King, 4),
            b.piece_square_key(Color::White, PieceKind::King, 4)
        );
        assert_ne!(a.side_to_move_key(), c.side_to_move_key());
    }

    #[test]
    fn castling_key_is_linear_in_rights() {
        let keys = ZobristKeys::build(DEFAULT_ZOBRIST_SEED);
        assert_eq!(keys.castling_key(0), 0);
        assert_eq!(
            keys.castling_key(CASTLE_ALL),
            keys.castling_key(CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_QUEENSIDE)
                ^ keys.castling_key(CASTLE_WHITE_QUEENSIDE | CASTLE_BLACK_KINGSIDE)
        );
    }

    #[test]
    fn starting_position_hash_is_deterministic() {
        let a = Position::new_game(EngineTables::shared_for_tests());
        let b = Position::new_game(EngineTables::shared_for_tests());
        assert_eq!(a.zobrist_key, b.zobrist_key);
        assert_eq!(a.zobrist_key, compute_zobrist_key(&a));
    }

    #[test]
    fn side_to_move_changes_hash() {
        let w = from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let b = from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert_ne!(w.zobrist_key, b.zobrist_key);
    }

    #[test]
    fn castling_rights_change_hash() {
        let with_rights = from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let without_rights = from_fen("4k3/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert_ne!(with_rights.zobrist_key, without_rights.zobrist_key);
    }

    #[test]
    fn en_passant_file_changes_hash() {
        let no_ep = from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 1");
        let ep = from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        assert_ne!(no_ep.zobrist_key, ep.zobrist_key);
    }
}
