//! Exhaustive leaf counting ("perft").
//!
//! Used as the correctness oracle for move generation and as a raw
//! generation-throughput benchmark. One position is mutated in place with
//! make/unmake; move lists live in one buffer per ply, allocated once per
//! call. The table-backed variant must return exactly the same counts.

use log::info;

use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_generator::generate_legal_moves;
use crate::moves::move_descriptions::Move;
use crate::search::transposition_table::PerftTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeCountReport {
    pub nodes: u64,
    pub table_hits: u64,
}

/// Per-ply move buffers reused across the whole recursion.
fn move_layers(depth: u8) -> Vec<Vec<Move>> {
    (0..depth.max(1)).map(|_| Vec::with_capacity(64)).collect()
}

/// Count leaf positions exactly `depth` plies below `position`.
pub fn perft(position: &mut Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut layers = move_layers(depth);
    perft_recurse(position, depth, &mut layers)
}

fn perft_recurse(position: &mut Position, depth: u8, layers: &mut [Vec<Move>]) -> u64 {
    let Some((moves, deeper)) = layers.split_first_mut() else {
        return 1;
    };
    generate_legal_moves(position, moves);

    // Bulk count: every legal move at the last ply is one leaf.
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &mv in moves.iter() {
        let undo = make_move(position, mv);
        nodes += perft_recurse(position, depth - 1, deeper);
        unmake_move(position, mv, &undo);
    }
    nodes
}

/// `perft`, with subtree counts cached by `(key, depth)`.
pub fn perft_with_table(position: &mut Position, depth: u8, table: &mut PerftTable) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut layers = move_layers(depth);
    perft_table_recurse(position, depth, &mut layers, table)
}

fn perft_table_recurse(
    position: &mut Position,
    depth: u8,
    layers: &mut [Vec<Move>],
    table: &mut PerftTable,
) -> u64 {
    let Some((moves, deeper)) = layers.split_first_mut() else {
        return 1;
    };

    if let Some(nodes) = table.probe(position.zobrist_key, depth) {
        return nodes;
    }

    generate_legal_moves(position, moves);

    let nodes = if depth == 1 {
        moves.len() as u64
    } else {
        let mut nodes = 0u64;
        for &mv in moves.iter() {
            let undo = make_move(position, mv);
            nodes += perft_table_recurse(position, depth - 1, deeper, table);
            unmake_move(position, mv, &undo);
        }
        nodes
    };

    table.store(position.zobrist_key, depth, nodes);
    nodes
}

/// Per-root-move subtree counts, in generation order.
pub fn perft_divide(position: &mut Position, depth: u8) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    let mut root_moves = Vec::with_capacity(64);
    generate_legal_moves(position, &mut root_moves);

    let mut layers = move_layers(depth - 1);
    root_moves
        .into_iter()
        .map(|mv| {
            let undo = make_move(position, mv);
            let nodes = if depth == 1 {
                1
            } else {
                perft_recurse(position, depth - 1, &mut layers)
            };
            unmake_move(position, mv, &undo);
            (mv, nodes)
        })
        .collect()
}

/// Adapter facade: count from a copy of `position`, optionally through a
/// fresh table of `table_capacity` slots.
pub fn node_count(
    position: &Position,
    depth: u8,
    use_table: bool,
    table_capacity: usize,
) -> NodeCountReport {
    let mut scratch = position.clone();
    let report = if use_table {
        let mut table = PerftTable::with_capacity(table_capacity);
        let nodes = perft_with_table(&mut scratch, depth, &mut table);
        NodeCountReport {
            nodes,
            table_hits: table.hit_count(),
        }
    } else {
        NodeCountReport {
            nodes: perft(&mut scratch, depth),
            table_hits: 0,
        }
    };

    info!(
        "perft depth {depth}: {} nodes, {} table hits",
        report.nodes, report.table_hits
    );
    report
}
