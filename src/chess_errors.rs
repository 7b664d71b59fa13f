//! Errors used throughout the chess engine.
//!
//! `ChessError` is the single error type returned by parsing, validated move
//! application and search entry points. Every variant describes bad input from
//! outside the engine; broken internal invariants panic instead (see
//! `make_move` and `unmake_move`).

use thiserror::Error;

/// Unified, recoverable error type for the chess engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    /// A position description (FEN) failed to parse. Payload: the reason.
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    /// A coordinate such as `e4` was malformed.
    #[error("invalid square: {0}")]
    InvalidSquare(String),

    /// Coordinate move text such as `e7e8q` could not be parsed.
    #[error("invalid move text: {0}")]
    InvalidMoveText(String),

    /// A well-formed move that is not legal in the current position.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// Requested search or perft depth outside the supported range.
    #[error("depth {depth} out of range 1..={max}")]
    DepthOutOfRange { depth: u8, max: u8 },

    /// A protocol command that could not be understood.
    #[error("protocol error: {0}")]
    Protocol(String),
}

#[cfg(test)]
mod tests {
    use super::ChessError;

    #[test]
    fn messages_carry_context() {
        let err = ChessError::DepthOutOfRange { depth: 0, max: 64 };
        assert_eq!(err.to_string(), "depth 0 out of range 1..=64");
        assert_eq!(
            ChessError::IllegalMove("e2e5".to_owned()).to_string(),
            "illegal move: e2e5"
        );
    }
}
