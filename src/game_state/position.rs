//! Core incremental board state representation.
//!
//! `Position` stores piece bitboards, occupancy caches, turn/state flags,
//! clocks, the running Zobrist key and the running evaluation. Only the
//! piece helpers below touch bitboards, so every placement change keeps the
//! key and evaluation in step.

use std::fmt;
use std::sync::Arc;

use crate::chess_errors::ChessError;
use crate::game_state::chess_types::*;
use crate::search::board_scoring::initial_evaluation;
use crate::search::zobrist::compute_zobrist_key;
use crate::tables::engine_tables::EngineTables;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Clone)]
pub struct Position {
    // [color][piece_kind]
    pub pieces: [[Bitboard; 6]; 2],

    pub occupancy_by_color: [Bitboard; 2],
    pub occupancy_all: Bitboard,

    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant_square: Option<Square>,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    pub zobrist_key: u64,
    /// Absolute material-and-development score, White-positive.
    pub evaluation: i32,

    tables: Arc<EngineTables>,
}

impl Position {
    /// Board with no pieces, White to move, no rights.
    pub fn empty(tables: &Arc<EngineTables>) -> Self {
        let mut position = Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,
            side_to_move: Color::White,
            castling_rights: 0,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            zobrist_key: 0,
            evaluation: 0,
            tables: Arc::clone(tables),
        };
        position.refresh_incremental_state();
        position
    }

    /// Standard starting position.
    pub fn new_game(tables: &Arc<EngineTables>) -> Self {
        let mut position = Self::empty(tables);
        for (file, piece) in BACK_RANK.iter().enumerate() {
            let file = file as Square;
            position.put_piece(Color::White, *piece, file);
            position.put_piece(Color::White, PieceKind::Pawn, 8 + file);
            position.put_piece(Color::Black, PieceKind::Pawn, 48 + file);
            position.put_piece(Color::Black, *piece, 56 + file);
        }
        position.castling_rights = CASTLE_ALL;
        position.refresh_incremental_state();
        position
    }

    #[inline]
    pub fn from_fen(tables: &Arc<EngineTables>, fen: &str) -> Result<Self, ChessError> {
        parse_fen(tables, fen)
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn tables(&self) -> &Arc<EngineTables> {
        &self.tables
    }

    /// Piece of `color` on `square`, if any.
    #[inline]
    pub fn piece_of(&self, color: Color, square: Square) -> Option<PieceKind> {
        let mask = square_bb(square);
        if self.occupancy_by_color[color.index()] & mask == 0 {
            return None;
        }
        PieceKind::ALL
            .into_iter()
            .find(|piece| self.pieces[color.index()][piece.index()] & mask != 0)
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<(Color, PieceKind)> {
        Color::ALL
            .into_iter()
            .find_map(|color| self.piece_of(color, square).map(|piece| (color, piece)))
    }

    /// Square of `color`'s king. Positions always hold one king per side.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.pieces[color.index()][PieceKind::King.index()].trailing_zeros() as Square
    }

    /// Recompute occupancy, key and evaluation after direct field edits.
    pub fn refresh_incremental_state(&mut self) {
        for color in Color::ALL {
            self.occupancy_by_color[color.index()] = self.pieces[color.index()]
                .iter()
                .fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all =
            self.occupancy_by_color[Color::White.index()] | self.occupancy_by_color[Color::Black.index()];
        self.zobrist_key = compute_zobrist_key(self);
        self.evaluation = initial_evaluation(self);
    }

    #[inline]
    pub(crate) fn put_piece(&mut self, color: Color, piece: PieceKind, square: Square) {
        let mask = square_bb(square);
        self.pieces[color.index()][piece.index()] |= mask;
        self.occupancy_by_color[color.index()] |= mask;
        self.occupancy_all |= mask;
        self.zobrist_key ^= self.tables.zobrist.piece_square_key(color, piece, square);
        self.evaluation += self.tables.scoring.signed_value(color, piece, square);
    }

    #[inline]
    pub(crate) fn remove_piece(&mut self, color: Color, piece: PieceKind, square: Square) {
        let mask = square_bb(square);
        self.pieces[color.index()][piece.index()] &= !mask;
        self.occupancy_by_color[color.index()] &= !mask;
        self.occupancy_all &= !mask;
        self.zobrist_key ^= self.tables.zobrist.piece_square_key(color, piece, square);
        self.evaluation -= self.tables.scoring.signed_value(color, piece, square);
    }

    #[inline]
    pub(crate) fn move_piece(&mut self, color: Color, piece: PieceKind, from: Square, to: Square) {
        self.remove_piece(color, piece, from);
        self.put_piece(color, piece, to);
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.occupancy_by_color == other.occupancy_by_color
            && self.occupancy_all == other.occupancy_all
            && self.side_to_move == other.side_to_move
            && self.castling_rights == other.castling_rights
            && self.en_passant_square == other.en_passant_square
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.zobrist_key == other.zobrist_key
            && self.evaluation == other.evaluation
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.get_fen())
            .field("zobrist_key", &format_args!("{:#018x}", self.zobrist_key))
            .field("evaluation", &self.evaluation)
            .finish()
    }
}
