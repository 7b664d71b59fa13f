//! Full legal move generation pipeline.
//!
//! Collects piece-wise pseudo-legal moves, then keeps only those that do not
//! leave the mover's king attacked. Each candidate is played on the position
//! itself and retracted, so the check test always sees post-move occupancy.

use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_moves_king::generate_king_moves;
use crate::move_generation::legal_moves_knight::generate_knight_moves;
use crate::move_generation::legal_moves_pawn::generate_pawn_moves;
use crate::move_generation::legal_moves_sliders::generate_slider_moves;
use crate::moves::move_descriptions::Move;

/// Pseudo-legal moves for the side to move, appended to `out`.
pub fn generate_pseudo_legal_moves(position: &Position, out: &mut Vec<Move>) {
    generate_pawn_moves(position, out);
    generate_knight_moves(position, out);
    generate_slider_moves(position, out);
    generate_king_moves(position, out);
}

/// Replace the contents of `out` with the strictly legal moves of `position`.
///
/// The position is mutated while filtering and restored before returning.
pub fn generate_legal_moves(position: &mut Position, out: &mut Vec<Move>) {
    out.clear();
    generate_pseudo_legal_moves(position, out);

    let mover = position.side_to_move;
    out.retain(|&mv| {
        let undo = make_move(position, mv);
        let legal = !is_king_in_check(position, mover);
        unmake_move(position, mv, &undo);
        legal
    });
}

/// Legal moves of `position` in a fresh vector.
pub fn legal_moves(position: &Position) -> Vec<Move> {
    let mut scratch = position.clone();
    let mut out = Vec::with_capacity(64);
    generate_legal_moves(&mut scratch, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::{generate_legal_moves, legal_moves};
    use crate::game_state::position::Position;
    use crate::moves::move_descriptions::Move;
    use crate::tables::engine_tables::EngineTables;

    fn from_fen(fen: &str) -> Position {
        Position::from_fen(EngineTables::shared_for_tests(), fen).expect("FEN should parse")
    }

    #[test]
    fn twenty_moves_from_start() {
        let position = Position::new_game(EngineTables::shared_for_tests());
        assert_eq!(legal_moves(&position).len(), 20);
    }

    #[test]
    fn generation_leaves_position_untouched_and_reuses_buffer() {
        let mut position =
            from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let before = position.clone();
        let mut buffer = vec![Move::new(0, 1); 5];

        generate_legal_moves(&mut position, &mut buffer);

        assert_eq!(buffer.len(), 48);
        assert_eq!(position, before);
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // Knight on e2 is pinned by the rook on e8.
        let moves = legal_moves(&from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1"));
        assert!(moves.iter().all(|mv| mv.from != 12));
    }

    #[test]
    fn en_passant_exposing_king_is_rejected() {
        // Capturing d6 would clear the fifth rank between the king and rook.
        let moves = legal_moves(&from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 1"));
        assert!(!moves.contains(&Move::new(36, 43)));
        assert!(moves.contains(&Move::new(36, 44)));
    }

    #[test]
    fn checkmate_and_stalemate_have_no_moves() {
        let mated = from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(legal_moves(&mated).is_empty());

        let stalemate = from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        assert!(legal_moves(&stalemate).is_empty());
    }
}
