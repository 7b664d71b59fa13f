use crate::game_state::chess_types::*;

/// Ancillary state captured by `make_move` that the move alone cannot restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoState {
    pub captured_piece: Option<PieceKind>,

    pub prev_castling_rights: CastlingRights,
    pub prev_en_passant_square: Option<Square>,
    pub prev_halfmove_clock: u16,

    // Checked against the restored position in debug builds.
    pub prev_zobrist_key: u64,
    pub prev_evaluation: i32,
}
