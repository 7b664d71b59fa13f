use crate::chess_errors::ChessError;
use crate::game_state::chess_types::PieceKind;
use crate::moves::move_descriptions::Move;
use crate::utils::algebraic::algebraic_to_square;

/// Parse coordinate move text.
///
/// Accepts `e2e4`, `e7e8q` and `e7e8=Q`. Only the shape is checked here;
/// whether the move is playable is decided against a position's legal moves.
pub fn long_algebraic_to_move(text: &str) -> Result<Move, ChessError> {
    let invalid = || ChessError::InvalidMoveText(text.to_owned());

    if !text.is_ascii() || !(4..=6).contains(&text.len()) {
        return Err(invalid());
    }

    let from = algebraic_to_square(&text[0..2]).map_err(|_| invalid())?;
    let to = algebraic_to_square(&text[2..4]).map_err(|_| invalid())?;

    let promotion_text = match &text[4..] {
        "" => return Ok(Move::new(from, to)),
        rest => rest.strip_prefix('=').unwrap_or(rest),
    };

    let mut chars = promotion_text.chars();
    let (Some(ch), None) = (chars.next(), chars.next()) else {
        return Err(invalid());
    };
    let promotion = char_to_promotion(ch).ok_or_else(invalid)?;

    Ok(Move::with_promotion(from, to, promotion))
}

fn char_to_promotion(ch: char) -> Option<PieceKind> {
    match ch.to_ascii_lowercase() {
        'n' => Some(PieceKind::Knight),
        'b' => Some(PieceKind::Bishop),
        'r' => Some(PieceKind::Rook),
        'q' => Some(PieceKind::Queen),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::long_algebraic_to_move;
    use crate::chess_errors::ChessError;
    use crate::game_state::chess_types::PieceKind;
    use crate::moves::move_descriptions::Move;

    #[test]
    fn parses_plain_and_promotion_forms() {
        assert_eq!(long_algebraic_to_move("e2e4"), Ok(Move::new(12, 28)));
        assert_eq!(
            long_algebraic_to_move("e7e8q"),
            Ok(Move::with_promotion(52, 60, PieceKind::Queen))
        );
        assert_eq!(
            long_algebraic_to_move("a2a1=N"),
            Ok(Move::with_promotion(8, 0, PieceKind::Knight))
        );
    }

    #[test]
    fn text_round_trips_through_display() {
        for text in ["g1f3", "b7b8r", "h2h1b"] {
            let mv = long_algebraic_to_move(text).expect("move should parse");
            assert_eq!(mv.to_string(), text);
        }
    }

    #[test]
    fn rejects_malformed_text() {
        for text in ["", "e2", "e2e", "e2e9", "e7e8k", "e7e8=", "e7e8=QQ", "e7e8==Q", "é2e4"] {
            assert_eq!(
                long_algebraic_to_move(text),
                Err(ChessError::InvalidMoveText(text.to_owned())),
                "{text:?}"
            );
        }
    }
}
