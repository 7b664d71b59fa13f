//! Terminal-oriented board renderer.
//!
//! Creates a human-readable board view for the `d` diagnostic command and for
//! test output.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::search::board_scoring::relative_evaluation;

/// Render the board to a Unicode string, rank 8 at the top.
pub fn render_position(position: &Position) -> String {
    let mut out = String::new();

    out.push_str("  a b c d e f g h\n");

    for rank in (0..8u8).rev() {
        out.push(char::from(b'1' + rank));
        out.push(' ');

        for file in 0..8u8 {
            match position.piece_at(rank * 8 + file) {
                Some((color, piece)) => out.push(piece_to_unicode(color, piece)),
                None => out.push('·'),
            }

            if file < 7 {
                out.push(' ');
            }
        }

        out.push(' ');
        out.push(char::from(b'1' + rank));
        out.push('\n');
    }

    out.push_str("  a b c d e f g h");

    out
}

/// Board plus the identity and score lines printed by the `d` command.
pub fn render_diagnostics(position: &Position) -> String {
    format!(
        "{}\nFen: {}\nKey: {:016X}\nEvaluation: {} (side to move {})",
        render_position(position),
        position.get_fen(),
        position.zobrist_key,
        position.evaluation,
        relative_evaluation(position)
    )
}

fn piece_to_unicode(color: Color, piece: PieceKind) -> char {
    match (color, piece) {
        (Color::White, PieceKind::Pawn) => '♙',
        (Color::White, PieceKind::Knight) => '♘',
        (Color::White, PieceKind::Bishop) => '♗',
        (Color::White, PieceKind::Rook) => '♖',
        (Color::White, PieceKind::Queen) => '♕',
        (Color::White, PieceKind::King) => '♔',
        (Color::Black, PieceKind::Pawn) => '♟',
        (Color::Black, PieceKind::Knight) => '♞',
        (Color::Black, PieceKind::Bishop) => '♝',
        (Color::Black, PieceKind::Rook) => '♜',
        (Color::Black, PieceKind::Queen) => '♛',
        (Color::Black, PieceKind::King) => '♚',
    }
}

#[cfg(test)]
mod tests {
    use super::{render_diagnostics, render_position};
    use crate::game_state::position::Position;
    use crate::tables::engine_tables::EngineTables;

    #[test]
    fn renders_starting_position() {
        let position = Position::new_game(EngineTables::shared_for_tests());
        let board = render_position(&position);
        println!("\n{board}");

        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[1], "8 ♜ ♞ ♝ ♛ ♚ ♝ ♞ ♜ 8");
        assert_eq!(lines[5], "4 · · · · · · · · 4");
        assert_eq!(lines[8], "1 ♖ ♘ ♗ ♕ ♔ ♗ ♘ ♖ 1");
    }

    #[test]
    fn diagnostics_include_fen() {
        let position = Position::new_game(EngineTables::shared_for_tests());
        let text = render_diagnostics(&position);
        assert!(text.contains("Fen: rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"));
        assert!(text.contains("Evaluation: 0"));
    }
}
