use crate::game_state::chess_rules::castling_lanes;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::move_generation::legal_move_shared::{push_moves_to_targets, quiet_or_capture_targets};
use crate::moves::move_descriptions::Move;

pub fn generate_king_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move;
    let from = position.king_square(side);
    let targets = position.tables().attacks.king_attacks(from) & quiet_or_capture_targets(position);
    push_moves_to_targets(from, targets, out);

    generate_castling_moves(position, out);
}

/// Castling needs the right, the rook still home, empty squares between king
/// and rook, and no enemy attack on the king's start or transit squares. The
/// landing square is re-checked by the generic legality filter.
fn generate_castling_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move;
    let enemy = side.opposite();
    let rooks = position.pieces[side.index()][PieceKind::Rook.index()];

    let mut king_checked: Option<bool> = None;

    for lane in castling_lanes(side) {
        if position.castling_rights & lane.right == 0
            || rooks & square_bb(lane.rook_from) == 0
            || position.occupancy_all & lane.between != 0
        {
            continue;
        }

        let in_check =
            *king_checked.get_or_insert_with(|| is_square_attacked(position, lane.king_from, enemy));
        if in_check {
            return;
        }

        let mut transit = lane.transit;
        let mut safe = true;
        while transit != 0 {
            if is_square_attacked(position, pop_lsb(&mut transit), enemy) {
                safe = false;
                break;
            }
        }

        if safe {
            out.push(Move::new(lane.king_from, lane.king_to));
        }
    }
}
