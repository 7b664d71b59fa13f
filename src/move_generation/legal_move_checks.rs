//! Attack and check detection against the current occupancy.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;

/// Whether any `attacker_color` piece attacks `square`.
///
/// Each piece pattern is looked up from the target square outward; a pawn
/// attacks `square` exactly when a pawn of the other color on `square` would
/// attack the pawn's square.
pub fn is_square_attacked(position: &Position, square: Square, attacker_color: Color) -> bool {
    let attacks = &position.tables().attacks;
    let theirs = &position.pieces[attacker_color.index()];
    let occupancy = position.occupancy_all;

    if attacks.pawn_attacks(attacker_color.opposite(), square) & theirs[PieceKind::Pawn.index()] != 0 {
        return true;
    }

    if attacks.knight_attacks(square) & theirs[PieceKind::Knight.index()] != 0 {
        return true;
    }

    if attacks.king_attacks(square) & theirs[PieceKind::King.index()] != 0 {
        return true;
    }

    let queens = theirs[PieceKind::Queen.index()];
    if attacks.bishop_attacks(square, occupancy) & (theirs[PieceKind::Bishop.index()] | queens) != 0 {
        return true;
    }

    attacks.rook_attacks(square, occupancy) & (theirs[PieceKind::Rook.index()] | queens) != 0
}

#[inline]
pub fn is_king_in_check(position: &Position, color: Color) -> bool {
    is_square_attacked(position, position.king_square(color), color.opposite())
}

#[cfg(test)]
mod tests {
    use super::{is_king_in_check, is_square_attacked};
    use crate::game_state::chess_types::Color;
    use crate::game_state::position::Position;
    use crate::tables::engine_tables::EngineTables;

    fn from_fen(fen: &str) -> Position {
        Position::from_fen(EngineTables::shared_for_tests(), fen).expect("FEN should parse")
    }

    #[test]
    fn start_position_attack_map() {
        let position = Position::new_game(EngineTables::shared_for_tests());
        // e3 by pawns, f3 by knight and pawns.
        assert!(is_square_attacked(&position, 20, Color::White));
        assert!(is_square_attacked(&position, 21, Color::White));
        assert!(!is_square_attacked(&position, 28, Color::White));
        assert!(is_square_attacked(&position, 45, Color::Black));
        assert!(!is_king_in_check(&position, Color::White));
    }

    #[test]
    fn sliders_are_blocked_by_occupancy() {
        let position = from_fen("4k3/8/8/8/4r3/8/4P3/4K3 w - - 0 1");
        assert!(!is_king_in_check(&position, Color::White));
        assert!(is_square_attacked(&position, 12, Color::Black));
        assert!(!is_square_attacked(&position, 4, Color::Black));

        let checked = from_fen("4k3/8/8/8/4r3/8/8/4K3 w - - 0 1");
        assert!(is_king_in_check(&checked, Color::White));
    }

    #[test]
    fn pawn_attacks_respect_direction() {
        let position = from_fen("4k3/8/8/3p4/8/8/8/4K3 w - - 0 1");
        // Black pawn on d5 hits c4 and e4, not c6 or e6.
        assert!(is_square_attacked(&position, 26, Color::Black));
        assert!(is_square_attacked(&position, 28, Color::Black));
        assert!(!is_square_attacked(&position, 42, Color::Black));
        assert!(!is_square_attacked(&position, 44, Color::Black));
    }
}
