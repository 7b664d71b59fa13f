//! Crate root module declarations for the Nemo Chess engine.
//!
//! Exposes the subsystems (position state, attack tables, move generation,
//! search, UCI protocol handling, and utility helpers) so the binary, benches
//! and external tooling can import stable module paths.

pub mod chess_errors;

pub mod game_state {
    pub mod chess_rules;
    pub mod chess_types;
    pub mod position;
    pub mod undo_state;
}

pub mod moves {
    pub mod attack_tables;
    pub mod leaper_attacks;
    pub mod move_descriptions;
    pub mod slider_rays;
    pub mod sliding_magics;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_move_shared;
    pub mod legal_moves_king;
    pub mod legal_moves_knight;
    pub mod legal_moves_pawn;
    pub mod legal_moves_sliders;
    pub mod perft;
}

pub mod search {
    pub mod board_scoring;
    pub mod iterative_deepening;
    pub mod search_control;
    pub mod transposition_table;
    pub mod zobrist;
}

pub mod tables {
    pub mod engine_tables;
}

pub mod uci {
    pub mod uci_top;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
}
