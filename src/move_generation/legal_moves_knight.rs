use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_shared::{push_moves_to_targets, quiet_or_capture_targets};
use crate::moves::move_descriptions::Move;

pub fn generate_knight_moves(position: &Position, out: &mut Vec<Move>) {
    let attacks = &position.tables().attacks;
    let targets = quiet_or_capture_targets(position);

    let mut knights = position.pieces[position.side_to_move.index()][PieceKind::Knight.index()];
    while knights != 0 {
        let from = pop_lsb(&mut knights);
        push_moves_to_targets(from, attacks.knight_attacks(from) & targets, out);
    }
}
