//! FEN-to-Position parser.
//!
//! Builds a fully-populated position from a Forsyth-Edwards Notation string,
//! including piece bitboards, rights, clocks, occupancies, key and
//! evaluation. The halfmove and fullmove fields are optional and default to
//! `0 1`.

use std::sync::Arc;

use crate::chess_errors::ChessError;
use crate::game_state::chess_rules::castling_lanes;
use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::tables::engine_tables::EngineTables;
use crate::utils::algebraic::algebraic_to_square;

fn invalid(reason: impl Into<String>) -> ChessError {
    ChessError::InvalidFen(reason.into())
}

pub fn parse_fen(tables: &Arc<EngineTables>, fen: &str) -> Result<Position, ChessError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if !(4..=6).contains(&fields.len()) {
        return Err(invalid(format!(
            "expected 4 to 6 fields, found {}",
            fields.len()
        )));
    }

    let mut position = Position::empty(tables);

    parse_board(fields[0], &mut position)?;
    position.side_to_move = parse_side_to_move(fields[1])?;
    position.castling_rights = parse_castling_rights(fields[2])?;
    position.en_passant_square = parse_en_passant_square(fields[3], position.side_to_move)?;
    if let Some(halfmove_part) = fields.get(4) {
        position.halfmove_clock = halfmove_part
            .parse::<u16>()
            .map_err(|_| invalid(format!("invalid halfmove clock: {halfmove_part}")))?;
    }
    if let Some(fullmove_part) = fields.get(5) {
        position.fullmove_number = fullmove_part
            .parse::<u16>()
            .map_err(|_| invalid(format!("invalid fullmove number: {fullmove_part}")))?;
    }

    validate_kings_and_pawns(&position)?;
    validate_en_passant_square(&position)?;
    drop_unbacked_castling_rights(&mut position);
    position.refresh_incremental_state();

    if is_king_in_check(&position, position.side_to_move.opposite()) {
        return Err(invalid("side not to move is in check"));
    }

    Ok(position)
}

fn parse_board(board_part: &str, position: &mut Position) -> Result<(), ChessError> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    for (fen_rank_idx, rank_str) in ranks.iter().enumerate() {
        let board_rank = 7 - fen_rank_idx;
        let mut file = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(format!("invalid empty-square count '{ch}'")));
                }
                file += empty_count as usize;
                continue;
            }

            let piece = PieceKind::from_fen_char(ch)
                .ok_or_else(|| invalid(format!("invalid piece character '{ch}'")))?;
            let color = if ch.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };

            if file >= 8 {
                return Err(invalid(format!("rank '{rank_str}' has too many files")));
            }

            let sq = (board_rank * 8 + file) as Square;
            position.pieces[color.index()][piece.index()] |= square_bb(sq);
            file += 1;
        }

        if file != 8 {
            return Err(invalid(format!("rank '{rank_str}' does not sum to 8 files")));
        }
    }

    Ok(())
}

fn parse_side_to_move(side_part: &str) -> Result<Color, ChessError> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(invalid(format!("invalid side-to-move field: {side_part}"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> Result<CastlingRights, ChessError> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights: CastlingRights = 0;

    for ch in castling_part.chars() {
        match ch {
            'K' => rights |= CASTLE_WHITE_KINGSIDE,
            'Q' => rights |= CASTLE_WHITE_QUEENSIDE,
            'k' => rights |= CASTLE_BLACK_KINGSIDE,
            'q' => rights |= CASTLE_BLACK_QUEENSIDE,
            _ => return Err(invalid(format!("invalid castling rights character: {ch}"))),
        }
    }

    Ok(rights)
}

fn parse_en_passant_square(
    en_passant_part: &str,
    side_to_move: Color,
) -> Result<Option<Square>, ChessError> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)
        .map_err(|_| invalid(format!("invalid en-passant square: {en_passant_part}")))?;
    let expected_rank = match side_to_move {
        Color::White => 5,
        Color::Black => 2,
    };
    if rank_of(square) != expected_rank {
        return Err(invalid(format!(
            "en-passant square {en_passant_part} is on the wrong rank"
        )));
    }

    Ok(Some(square))
}

fn validate_kings_and_pawns(position: &Position) -> Result<(), ChessError> {
    for color in Color::ALL {
        let kings = position.pieces[color.index()][PieceKind::King.index()].count_ones();
        if kings != 1 {
            return Err(invalid(format!("{color:?} has {kings} kings, expected 1")));
        }
    }

    const BACK_RANKS: Bitboard = 0xFF00_0000_0000_00FF;
    let pawns = position.pieces[Color::White.index()][PieceKind::Pawn.index()]
        | position.pieces[Color::Black.index()][PieceKind::Pawn.index()];
    if pawns & BACK_RANKS != 0 {
        return Err(invalid("pawn on first or last rank"));
    }

    let white: Bitboard = position.pieces[Color::White.index()].iter().fold(0, |acc, bb| acc | bb);
    let black: Bitboard = position.pieces[Color::Black.index()].iter().fold(0, |acc, bb| acc | bb);
    if white & black != 0 {
        return Err(invalid("square occupied by both colors"));
    }

    Ok(())
}

/// The target must be empty with the pushed pawn just behind it and its
/// origin square vacated.
fn validate_en_passant_square(position: &Position) -> Result<(), ChessError> {
    let Some(target) = position.en_passant_square else {
        return Ok(());
    };

    let pushed_by = position.side_to_move.opposite();
    let (pawn_square, origin_square) = match pushed_by {
        Color::White => (target + 8, target - 8),
        Color::Black => (target - 8, target + 8),
    };

    let occupied: Bitboard = position
        .pieces
        .iter()
        .flatten()
        .fold(0, |acc, bb| acc | bb);
    let pushed_pawns = position.pieces[pushed_by.index()][PieceKind::Pawn.index()];

    if occupied & square_bb(target) != 0 {
        return Err(invalid("en-passant target square is occupied"));
    }
    if pushed_pawns & square_bb(pawn_square) == 0 {
        return Err(invalid("no pawn in front of the en-passant target"));
    }
    if occupied & square_bb(origin_square) != 0 {
        return Err(invalid("en-passant origin square is occupied"));
    }

    Ok(())
}

/// A right is only meaningful while its king and rook stand on their home
/// squares.
fn drop_unbacked_castling_rights(position: &mut Position) {
    for color in Color::ALL {
        let kings = position.pieces[color.index()][PieceKind::King.index()];
        let rooks = position.pieces[color.index()][PieceKind::Rook.index()];
        for lane in castling_lanes(color) {
            let backed = kings & square_bb(lane.king_from) != 0 && rooks & square_bb(lane.rook_from) != 0;
            if !backed {
                position.castling_rights &= !lane.right;
            }
        }
    }
}
