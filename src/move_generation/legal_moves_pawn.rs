use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::moves::move_descriptions::Move;

const RANK_3: Bitboard = 0x0000_0000_00FF_0000;
const RANK_6: Bitboard = 0x0000_FF00_0000_0000;
const PROMOTION_RANKS: Bitboard = 0xFF00_0000_0000_00FF;

pub fn generate_pawn_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move;
    let attacks = &position.tables().attacks;
    let pawns = position.pieces[side.index()][PieceKind::Pawn.index()];
    let enemy_occ = position.occupancy_by_color[side.opposite().index()];
    let empty = !position.occupancy_all;

    // Pushes are generated set-wise, then walked back to their origin.
    let (single, double, back) = match side {
        Color::White => {
            let single = (pawns << 8) & empty;
            (single, ((single & RANK_3) << 8) & empty, 8i8)
        }
        Color::Black => {
            let single = (pawns >> 8) & empty;
            (single, ((single & RANK_6) >> 8) & empty, -8i8)
        }
    };

    let mut pushes = single;
    while pushes != 0 {
        let to = pop_lsb(&mut pushes);
        push_pawn_move(to.wrapping_add_signed(-back), to, out);
    }

    let mut double_pushes = double;
    while double_pushes != 0 {
        let to = pop_lsb(&mut double_pushes);
        out.push(Move::new(to.wrapping_add_signed(-2 * back), to));
    }

    let mut capturers = pawns;
    while capturers != 0 {
        let from = pop_lsb(&mut capturers);
        let mut captures = attacks.pawn_attacks(side, from) & enemy_occ;
        while captures != 0 {
            push_pawn_move(from, pop_lsb(&mut captures), out);
        }
    }

    if let Some(ep_square) = position.en_passant_square {
        // Our pawns that attack the target are exactly those a pawn of the
        // other color standing on the target would attack.
        let mut takers = attacks.pawn_attacks(side.opposite(), ep_square) & pawns;
        while takers != 0 {
            out.push(Move::new(pop_lsb(&mut takers), ep_square));
        }
    }
}

#[inline]
fn push_pawn_move(from: Square, to: Square, out: &mut Vec<Move>) {
    if square_bb(to) & PROMOTION_RANKS != 0 {
        for promotion in PieceKind::PROMOTIONS {
            out.push(Move::with_promotion(from, to, promotion));
        }
    } else {
        out.push(Move::new(from, to));
    }
}
