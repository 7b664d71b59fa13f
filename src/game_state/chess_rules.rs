//! Canonical chess-rule constants.
//!
//! Starting position, castling geometry and the per-square castling-rights
//! masks consulted by move application.

use crate::game_state::chess_types::*;

/// Standard chess starting position in Forsyth-Edwards Notation (FEN).
pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const WHITE_KING_HOME: Square = 4;
pub const BLACK_KING_HOME: Square = 60;

/// Geometry of one castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlingLane {
    pub right: CastlingRights,
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
    /// Squares that must be empty.
    pub between: Bitboard,
    /// Squares the king crosses or lands on; none may be attacked.
    pub transit: Bitboard,
}

pub const CASTLING_LANES: [[CastlingLane; 2]; 2] = [
    [
        CastlingLane {
            right: CASTLE_WHITE_KINGSIDE,
            king_from: 4,
            king_to: 6,
            rook_from: 7,
            rook_to: 5,
            between: square_bb(5) | square_bb(6),
            transit: square_bb(5) | square_bb(6),
        },
        CastlingLane {
            right: CASTLE_WHITE_QUEENSIDE,
            king_from: 4,
            king_to: 2,
            rook_from: 0,
            rook_to: 3,
            between: square_bb(1) | square_bb(2) | square_bb(3),
            transit: square_bb(2) | square_bb(3),
        },
    ],
    [
        CastlingLane {
            right: CASTLE_BLACK_KINGSIDE,
            king_from: 60,
            king_to: 62,
            rook_from: 63,
            rook_to: 61,
            between: square_bb(61) | square_bb(62),
            transit: square_bb(61) | square_bb(62),
        },
        CastlingLane {
            right: CASTLE_BLACK_QUEENSIDE,
            king_from: 60,
            king_to: 58,
            rook_from: 56,
            rook_to: 59,
            between: square_bb(57) | square_bb(58) | square_bb(59),
            transit: square_bb(58) | square_bb(59),
        },
    ],
];

/// Castling lanes for `color`.
#[inline]
pub fn castling_lanes(color: Color) -> &'static [CastlingLane; 2] {
    &CASTLING_LANES[color.index()]
}

/// Rook squares for a king move `from -> to` when it is a castle.
#[inline]
pub fn castling_rook_squares(king_from: Square, king_to: Square) -> Option<(Square, Square)> {
    CASTLING_LANES
        .iter()
        .flatten()
        .find(|lane| lane.king_from == king_from && lane.king_to == king_to)
        .map(|lane| (lane.rook_from, lane.rook_to))
}

/// Rights that survive a move touching `square` (as origin or destination).
pub const CASTLING_RIGHTS_MASK: [CastlingRights; 64] = build_castling_rights_mask();

const fn build_castling_rights_mask() -> [CastlingRights; 64] {
    let mut table = [CASTLE_ALL; 64];
    table[0] = CASTLE_ALL & !CASTLE_WHITE_QUEENSIDE;
    table[7] = CASTLE_ALL & !CASTLE_WHITE_KINGSIDE;
    table[4] = CASTLE_ALL & !(CASTLE_WHITE_KINGSIDE | CASTLE_WHITE_QUEENSIDE);
    table[56] = CASTLE_ALL & !CASTLE_BLACK_QUEENSIDE;
    table[63] = CASTLE_ALL & !CASTLE_BLACK_KINGSIDE;
    table[60] = CASTLE_ALL & !(CASTLE_BLACK_KINGSIDE | CASTLE_BLACK_QUEENSIDE);
    table
}
