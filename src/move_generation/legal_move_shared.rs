use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::moves::move_descriptions::Move;

/// Push one move per square in `targets`.
#[inline]
pub fn push_moves_to_targets(from: Square, mut targets: Bitboard, out: &mut Vec<Move>) {
    while targets != 0 {
        out.push(Move::new(from, pop_lsb(&mut targets)));
    }
}

/// Squares the side to move may land on: empty or enemy-occupied.
#[inline]
pub fn quiet_or_capture_targets(position: &Position) -> Bitboard {
    !position.occupancy_by_color[position.side_to_move.index()]
}
