//! Material-and-development evaluation.
//!
//! Every piece contributes one table value combining its material worth with
//! a square bonus. Tables are written once, in board-diagram order (first row
//! is rank 8 seen from White's side); White looks squares up mirrored
//! (`sq ^ 56`), Black looks them up directly. `Position` keeps the absolute
//! (White-positive) sum current through make/unmake, so search never
//! rescores a board from scratch.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;

pub const QUEEN_VALUE: i32 = 900;
pub const ROOK_VALUE: i32 = 500;
pub const BISHOP_KNIGHT_VALUE: i32 = 300;
pub const PAWN_VALUE: i32 = 100;

/// Score of the side to move when it has been checkmated at the root.
pub const MATE_SCORE: i32 = 30000;

#[inline]
pub const fn material_value(piece: PieceKind) -> i32 {
    match piece {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight | PieceKind::Bishop => BISHOP_KNIGHT_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => 0,
    }
}

#[rustfmt::skip]
const PAWN_DEVELOPMENT: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_DEVELOPMENT: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_DEVELOPMENT: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_DEVELOPMENT: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_DEVELOPMENT: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_DEVELOPMENT: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

/// Material plus square bonus per `(piece, diagram square)`.
#[derive(Debug, Clone)]
pub struct MaterialDevelopmentTable {
    values: [[i32; 64]; 6],
}

impl MaterialDevelopmentTable {
    pub fn build() -> Self {
        let development = [
            &PAWN_DEVELOPMENT,
            &KNIGHT_DEVELOPMENT,
            &BISHOP_DEVELOPMENT,
            &ROOK_DEVELOPMENT,
            &QUEEN_DEVELOPMENT,
            &KING_DEVELOPMENT,
        ];

        let mut values = [[0i32; 64]; 6];
        for piece in PieceKind::ALL {
            for (sq, value) in values[piece.index()].iter_mut().enumerate() {
                *value = material_value(piece) + development[piece.index()][sq];
            }
        }

        Self { values }
    }

    /// Unsigned contribution of a `color` piece on `square`.
    #[inline]
    pub fn value(&self, color: Color, piece: PieceKind, square: Square) -> i32 {
        let diagram_square = match color {
            Color::White => square ^ 56,
            Color::Black => square,
        };
        self.values[piece.index()][diagram_square as usize]
    }

    /// Signed (White-positive) contribution of a piece.
    #[inline]
    pub fn signed_value(&self, color: Color, piece: PieceKind, square: Square) -> i32 {
        color.sign() * self.value(color, piece, square)
    }
}

/// From-scratch absolute evaluation, White-positive.
pub fn initial_evaluation(position: &Position) -> i32 {
    let table = &position.tables().scoring;
    let mut score = [0i32; 2];

    for color in Color::ALL {
        for piece in PieceKind::ALL {
            let mut bb = position.pieces[color.index()][piece.index()];
            while bb != 0 {
                score[color.index()] += table.value(color, piece, pop_lsb(&mut bb));
            }
        }
    }

    score[Color::White.index()] - score[Color::Black.index()]
}

/// Evaluation from the side to move's point of view.
#[inline]
pub fn relative_evaluation(position: &Position) -> i32 {
    position.evaluation * position.side_to_move.sign()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::tables::engine_tables::EngineTables;

    fn from_fen(fen: &str) -> Position {
        Position::from_fen(EngineTables::shared_for_tests(), fen).expect("FEN should parse")
    }

    /// Flip ranks, swap colors, keep the side to move.
    fn mirror_fen(fen: &str) -> String {
        let mut fields = fen.split_whitespace();
        let board = fields.next().expect("board field");
        let side = fields.next().expect("side field");

        let mirrored_board = board
            .split('/')
            .rev()
            .map(|rank| {
                rank.chars()
                    .map(|c| {
                        if c.is_ascii_uppercase() {
                            c.to_ascii_lowercase()
                        } else {
                            c.to_ascii_uppercase()
                        }
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("/");

        format!("{mirrored_board} {side} - - 0 1")
    }

    #[test]
    fn starting_position_is_balanced() {
        let position = from_fen(STARTING_POSITION_FEN);
        assert_eq!(position.evaluation, 0);
        assert_eq!(relative_evaluation(&position), 0);
    }

    #[test]
    fn material_values_follow_classic_weights() {
        assert_eq!(material_value(PieceKind::Queen), 900);
        assert_eq!(material_value(PieceKind::Rook), 500);
        assert_eq!(material_value(PieceKind::Bishop), 300);
        assert_eq!(material_value(PieceKind::Knight), 300);
        assert_eq!(material_value(PieceKind::Pawn), 100);
        assert_eq!(material_value(PieceKind::King), 0);
    }

    #[test]
    fn mirrored_positions_negate_relative_score() {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w - - 0 1",
            "rnbqkb1r/pp1p1ppp/4pn2/2p5/2PP4/2N5/PP2PPPP/R1BQKBNR b - - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ] {
            let position = from_fen(fen);
            let mirrored = from_fen(&mirror_fen(fen));
            assert_eq!(
                relative_evaluation(&position),
                -relative_evaluation(&mirrored),
                "{fen}"
            );
        }
    }

    #[test]
    fn side_to_move_flips_relative_sign() {
        let white = from_fen("4k3/8/8/8/8/8/8/QQ2K3 w - - 0 1");
        let black = from_fen("4k3/8/8/8/8/8/8/QQ2K3 b - - 0 1");
        assert!(relative_evaluation(&white) > 0);
        assert_eq!(relative_evaluation(&white), -relative_evaluation(&black));
    }

    #[test]
    fn table_uses_mirrored_squares_for_white() {
        let table = MaterialDevelopmentTable::build();
        // A pawn on its seventh rank is worth the same for both colors.
        assert_eq!(
            table.value(Color::White, PieceKind::Pawn, 52),
            table.value(Color::Black, PieceKind::Pawn, 12)
        );
        assert_eq!(table.value(Color::White, PieceKind::Pawn, 52), 150);
    }
}
