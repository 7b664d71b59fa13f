//! Bishop, rook and queen pseudo-legal moves from the blocker-indexed tables.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_shared::{push_moves_to_targets, quiet_or_capture_targets};
use crate::moves::move_descriptions::Move;

pub fn generate_slider_moves(position: &Position, out: &mut Vec<Move>) {
    let attacks = &position.tables().attacks;
    let ours = &position.pieces[position.side_to_move.index()];
    let occupancy = position.occupancy_all;
    let targets = quiet_or_capture_targets(position);

    let mut bishops = ours[PieceKind::Bishop.index()];
    while bishops != 0 {
        let from = pop_lsb(&mut bishops);
        push_moves_to_targets(from, attacks.bishop_attacks(from, occupancy) & targets, out);
    }

    let mut rooks = ours[PieceKind::Rook.index()];
    while rooks != 0 {
        let from = pop_lsb(&mut rooks);
        push_moves_to_targets(from, attacks.rook_attacks(from, occupancy) & targets, out);
    }

    let mut queens = ours[PieceKind::Queen.index()];
    while queens != 0 {
        let from = pop_lsb(&mut queens);
        push_moves_to_targets(from, attacks.queen_attacks(from, occupancy) & targets, out);
    }
}
