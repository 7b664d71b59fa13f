//! Reversible move application.
//!
//! `make_move` / `unmake_move` mutate one position in place and keep the
//! Zobrist key and evaluation current through the piece helpers. They trust
//! their input: moves must come from the generator. External moves go
//! through `apply_checked_move`, which validates against the legal move list
//! first.

use crate::chess_errors::ChessError;
use crate::game_state::chess_rules::{castling_rook_squares, CASTLING_RIGHTS_MASK};
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::game_state::undo_state::UndoState;
use crate::move_generation::legal_move_generator::legal_moves;
use crate::moves::move_descriptions::Move;
use crate::utils::long_algebraic::long_algebraic_to_move;

pub fn make_move(position: &mut Position, mv: Move) -> UndoState {
    let us = position.side_to_move;
    let them = us.opposite();
    let Move { from, to, promotion } = mv;

    let Some(moved_piece) = position.piece_of(us, from) else {
        panic!("make_move: no {us:?} piece on square {from} for {mv} in {}", position.get_fen());
    };

    let mut undo = UndoState {
        captured_piece: None,
        prev_castling_rights: position.castling_rights,
        prev_en_passant_square: position.en_passant_square,
        prev_halfmove_clock: position.halfmove_clock,
        prev_zobrist_key: position.zobrist_key,
        prev_evaluation: position.evaluation,
    };

    let zobrist = &position.tables().zobrist;
    let ep_out = position
        .en_passant_square
        .map_or(0, |sq| zobrist.en_passant_file_key(file_of(sq)));
    position.zobrist_key ^= ep_out;

    // Captures, including en passant onto the empty target square.
    if moved_piece == PieceKind::Pawn
        && Some(to) == position.en_passant_square
        && file_of(from) != file_of(to)
    {
        let victim = match us {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        position.remove_piece(them, PieceKind::Pawn, victim);
        undo.captured_piece = Some(PieceKind::Pawn);
    } else if let Some(captured) = position.piece_of(them, to) {
        position.remove_piece(them, captured, to);
        undo.captured_piece = Some(captured);
    }

    match promotion {
        Some(promoted) => {
            position.remove_piece(us, PieceKind::Pawn, from);
            position.put_piece(us, promoted, to);
        }
        None => position.move_piece(us, moved_piece, from, to),
    }

    if moved_piece == PieceKind::King && from.abs_diff(to) == 2 {
        if let Some((rook_from, rook_to)) = castling_rook_squares(from, to) {
            position.move_piece(us, PieceKind::Rook, rook_from, rook_to);
        }
    }

    let rights = position.castling_rights
        & CASTLING_RIGHTS_MASK[from as usize]
        & CASTLING_RIGHTS_MASK[to as usize];
    set_castling_rights(position, rights);

    position.en_passant_square = if moved_piece == PieceKind::Pawn && from.abs_diff(to) == 16 {
        let ep_square = (from + to) / 2;
        position.zobrist_key ^= position.tables().zobrist.en_passant_file_key(file_of(ep_square));
        Some(ep_square)
    } else {
        None
    };

    if moved_piece == PieceKind::Pawn || undo.captured_piece.is_some() {
        position.halfmove_clock = 0;
    } else {
        position.halfmove_clock = position.halfmove_clock.saturating_add(1);
    }
    if us == Color::Black {
        position.fullmove_number = position.fullmove_number.saturating_add(1);
    }

    position.side_to_move = them;
    position.zobrist_key ^= position.tables().zobrist.side_to_move_key();

    undo
}

pub fn unmake_move(position: &mut Position, mv: Move, undo: &UndoState) {
    let them = position.side_to_move;
    let us = them.opposite();
    let Move { from, to, promotion } = mv;

    position.side_to_move = us;
    position.zobrist_key ^= position.tables().zobrist.side_to_move_key();
    if us == Color::Black {
        position.fullmove_number = position.fullmove_number.saturating_sub(1);
    }
    position.halfmove_clock = undo.prev_halfmove_clock;

    set_castling_rights(position, undo.prev_castling_rights);

    let zobrist = &position.tables().zobrist;
    let ep_current = position
        .en_passant_square
        .map_or(0, |sq| zobrist.en_passant_file_key(file_of(sq)));
    let ep_previous = undo
        .prev_en_passant_square
        .map_or(0, |sq| zobrist.en_passant_file_key(file_of(sq)));
    position.zobrist_key ^= ep_current ^ ep_previous;
    position.en_passant_square = undo.prev_en_passant_square;

    let moved_piece = match promotion {
        Some(promoted) => {
            position.remove_piece(us, promoted, to);
            position.put_piece(us, PieceKind::Pawn, from);
            PieceKind::Pawn
        }
        None => {
            let Some(piece) = position.piece_of(us, to) else {
                panic!("unmake_move: no {us:?} piece on square {to} for {mv}");
            };
            position.move_piece(us, piece, to, from);
            piece
        }
    };

    if moved_piece == PieceKind::King && from.abs_diff(to) == 2 {
        if let Some((rook_from, rook_to)) = castling_rook_squares(from, to) {
            position.move_piece(us, PieceKind::Rook, rook_to, rook_from);
        }
    }

    if let Some(captured) = undo.captured_piece {
        let en_passant = moved_piece == PieceKind::Pawn
            && Some(to) == undo.prev_en_passant_square
            && file_of(from) != file_of(to);
        let square = match (en_passant, us) {
            (true, Color::White) => to - 8,
            (true, Color::Black) => to + 8,
            (false, _) => to,
        };
        position.put_piece(them, captured, square);
    }

    debug_assert_eq!(position.zobrist_key, undo.prev_zobrist_key, "key not restored after {mv}");
    debug_assert_eq!(position.evaluation, undo.prev_evaluation, "evaluation not restored after {mv}");
}

/// Validating entry point for moves from outside the engine. The position is
/// untouched on error.
pub fn apply_checked_move(position: &mut Position, mv: Move) -> Result<UndoState, ChessError> {
    if !legal_moves(position).contains(&mv) {
        return Err(ChessError::IllegalMove(mv.to_string()));
    }
    Ok(make_move(position, mv))
}

/// Parse coordinate move text (`e2e4`, `e7e8q`, `e7e8=Q`) and play it.
pub fn play_long_algebraic(position: &mut Position, text: &str) -> Result<Move, ChessError> {
    let mv = long_algebraic_to_move(text)?;
    apply_checked_move(position, mv)?;
    Ok(mv)
}

#[inline]
fn set_castling_rights(position: &mut Position, rights: CastlingRights) {
    let changed = position.castling_rights ^ rights;
    if changed != 0 {
        position.zobrist_key ^= position.tables().zobrist.castling_key(changed);
        position.castling_rights = rights;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::search::board_scoring::initial_evaluation;
    use crate::search::zobrist::compute_zobrist_key;
    use crate::tables::engine_tables::EngineTables;

    const FENS: [&str; 6] = [
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "rnbqkbnr/pp1ppppp/8/2pP4/8/8/PPP1PPPP/RNBQKBNR w KQkq c6 0 3",
    ];

    fn from_fen(fen: &str) -> Position {
        Position::from_fen(EngineTables::shared_for_tests(), fen).expect("FEN should parse")
    }

    fn assert_incremental_state_exact(position: &Position) {
        assert_eq!(position.zobrist_key, compute_zobrist_key(position), "{}", position.get_fen());
        assert_eq!(position.evaluation, initial_evaluation(position), "{}", position.get_fen());
    }

    #[test]
    fn unmake_restores_every_field_for_every_legal_move() {
        for fen in FENS {
            let mut position = from_fen(fen);
            let original = position.clone();

            for mv in legal_moves(&position) {
                let undo = make_move(&mut position, mv);
                assert_incremental_state_exact(&position);
                unmake_move(&mut position, mv, &undo);
                assert_eq!(position, original, "{fen} {mv}");
            }
        }
    }

    #[test]
    fn keys_stay_exact_two_plies_deep() {
        for fen in FENS {
            let mut position = from_fen(fen);
            for first in legal_moves(&position) {
                let first_undo = make_move(&mut position, first);
                for second in legal_moves(&position) {
                    let second_undo = make_move(&mut position, second);
                    assert_incremental_state_exact(&position);
                    unmake_move(&mut position, second, &second_undo);
                }
                unmake_move(&mut position, first, &first_undo);
            }
            assert_eq!(position, from_fen(fen));
        }
    }

    #[test]
    fn transposed_move_orders_reach_same_key() {
        let mut a = Position::new_game(EngineTables::shared_for_tests());
        let mut b = a.clone();
        for text in ["g1f3", "g8f6", "b1c3", "b8c6"] {
            play_long_algebraic(&mut a, text).expect("move should be legal");
        }
        for text in ["b1c3", "b8c6", "g1f3", "g8f6"] {
            play_long_algebraic(&mut b, text).expect("move should be legal");
        }
        assert_eq!(a.zobrist_key, b.zobrist_key);
        assert_eq!(a.get_fen(), b.get_fen());
    }

    #[test]
    fn special_moves_update_board() {
        let mut castle = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        play_long_algebraic(&mut castle, "e1g1").expect("castle should be legal");
        assert_eq!(castle.get_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");

        let mut ep = from_fen("rnbqkbnr/pp1ppppp/8/2pP4/8/8/PPP1PPPP/RNBQKBNR w KQkq c6 0 3");
        play_long_algebraic(&mut ep, "d5c6").expect("en passant should be legal");
        assert_eq!(ep.get_fen(), "rnbqkbnr/pp1ppppp/2P5/8/8/8/PPP1PPPP/RNBQKBNR b KQkq - 0 3");

        let mut promo = from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8");
        play_long_algebraic(&mut promo, "d7c8=Q").expect("promotion should be legal");
        assert_eq!(
            promo.get_fen(),
            "rnQq1k1r/pp2bppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R b KQ - 0 8"
        );
        assert_incremental_state_exact(&promo);
    }

    #[test]
    fn rook_capture_clears_castling_right() {
        let mut position = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        play_long_algebraic(&mut position, "a1a8").expect("capture should be legal");
        assert_eq!(position.castling_rights, CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_KINGSIDE);
        assert_incremental_state_exact(&position);
    }

    #[test]
    fn illegal_external_moves_leave_state_unchanged() {
        let mut position = from_fen("4k3/8/8/8/4r3/8/4P3/4K3 w - - 0 1");
        let before = position.clone();

        // Unparseable text, off-pattern moves and moves onto own pieces.
        for text in ["e1e2", "e2e5", "e1f1f", "z9z9", "e2e3x"] {
            assert!(play_long_algebraic(&mut position, text).is_err(), "{text}");
            assert_eq!(position, before);
        }

        assert_eq!(
            apply_checked_move(&mut position, Move::new(4, 12)),
            Err(ChessError::IllegalMove("e1e2".to_owned()))
        );
        assert_eq!(position, before);
    }
}
