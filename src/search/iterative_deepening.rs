//! Iterative deepening search with negamax alpha-beta pruning.
//!
//! Each iteration is a complete fixed-depth search. Scores are always from
//! the point of view of the side to move at the node. Leaves return the
//! incrementally maintained evaluation; there is no capture extension. The
//! transposition table cuts off subtrees already searched at least as deep,
//! and its stored best move is tried first when a node is searched again.
//! A raised stop signal abandons the running iteration; the result of the
//! last completed one is returned.

use std::mem;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::chess_errors::ChessError;
use crate::game_state::chess_types::{PieceKind, Square};
use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::{make_move, unmake_move};
use crate::move_generation::legal_move_checks::is_king_in_check;
use crate::move_generation::legal_move_generator::generate_legal_moves;
use crate::moves::move_descriptions::Move;
use crate::search::board_scoring::{relative_evaluation, MATE_SCORE};
use crate::search::search_control::{StopSignal, NODE_POLL_INTERVAL};
use crate::search::transposition_table::{Bound, SearchEntry, SearchTable};

pub const MAX_SEARCH_DEPTH: u8 = 64;

const INFINITY: i32 = MATE_SCORE + 1;
/// Scores beyond this magnitude encode a forced mate.
const MATE_THRESHOLD: i32 = MATE_SCORE - 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    /// Relative to the side to move at the root.
    pub score: i32,
}

impl SearchedMove {
    fn new(mv: Move, score: i32) -> Self {
        Self {
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion,
            score,
        }
    }

    #[inline]
    pub fn as_move(&self) -> Move {
        Move {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

/// Progress line emitted after every completed iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationSummary {
    pub depth: u8,
    pub best: SearchedMove,
    pub nodes: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchReport {
    pub best: Option<SearchedMove>,
    pub completed_depth: u8,
    pub nodes: u64,
    pub table_hits: u64,
    pub stopped: bool,
}

type IterationCallback<'a> = Box<dyn FnMut(&IterationSummary) + Send + 'a>;

pub struct MoveSearch<'a> {
    position: Position,
    table: &'a mut SearchTable,
    stop: StopSignal,
    nodes: u64,
    layers: Vec<Vec<Move>>,
    on_iteration: Option<IterationCallback<'a>>,
}

impl<'a> MoveSearch<'a> {
    pub fn new(position: Position, table: &'a mut SearchTable) -> Self {
        Self {
            position,
            table,
            stop: StopSignal::new(),
            nodes: 0,
            layers: Vec::new(),
            on_iteration: None,
        }
    }

    /// Poll `stop` instead of a private flag.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Call `callback` after every completed iteration.
    pub fn on_iteration(mut self, callback: impl FnMut(&IterationSummary) + Send + 'a) -> Self {
        self.on_iteration = Some(Box::new(callback));
        self
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Best move from the deepest completed iteration, `None` when the root
    /// has no legal move.
    pub fn search_and_return(&mut self, max_depth: u8) -> Result<Option<SearchedMove>, ChessError> {
        self.search(max_depth).map(|report| report.best)
    }

    pub fn search(&mut self, max_depth: u8) -> Result<SearchReport, ChessError> {
        if !(1..=MAX_SEARCH_DEPTH).contains(&max_depth) {
            return Err(ChessError::DepthOutOfRange {
                depth: max_depth,
                max: MAX_SEARCH_DEPTH,
            });
        }

        let started_at = Instant::now();
        let hits_before = self.table.hit_count();
        self.nodes = 0;

        let mut root_moves = Vec::with_capacity(64);
        generate_legal_moves(&mut self.position, &mut root_moves);

        let mut report = SearchReport {
            best: None,
            completed_depth: 0,
            nodes: 0,
            table_hits: 0,
            stopped: false,
        };

        if !root_moves.is_empty() {
            for depth in 1..=max_depth {
                if self.stop.should_stop() {
                    report.stopped = true;
                    break;
                }
                let Some(best) = self.search_root(depth, &mut root_moves) else {
                    report.stopped = true;
                    break;
                };

                report.best = Some(best);
                report.completed_depth = depth;

                let summary = IterationSummary {
                    depth,
                    best,
                    nodes: self.nodes,
                    elapsed: started_at.elapsed(),
                };
                debug!(
                    "depth {depth}: {} score {} nodes {} ({} ms)",
                    best.as_move(),
                    best.score,
                    summary.nodes,
                    summary.elapsed.as_millis()
                );
                if let Some(callback) = self.on_iteration.as_mut() {
                    callback(&summary);
                }
            }

            if report.best.is_none() {
                let fallback = self.fallback_move(&root_moves);
                warn!("search stopped before depth 1 completed, playing {}", fallback.as_move());
                report.best = Some(fallback);
            }
        }

        report.nodes = self.nodes;
        report.table_hits = self.table.hit_count() - hits_before;
        Ok(report)
    }

    /// First legal move, preferring the table's hint, scored statically.
    fn fallback_move(&self, root_moves: &[Move]) -> SearchedMove {
        let hint = self
            .table
            .peek(self.position.zobrist_key)
            .and_then(|entry| entry.best_move)
            .filter(|mv| root_moves.contains(mv));
        let mv = hint.unwrap_or(root_moves[0]);
        SearchedMove::new(mv, relative_evaluation(&self.position))
    }

    fn search_root(&mut self, depth: u8, root_moves: &mut [Move]) -> Option<SearchedMove> {
        let key = self.position.zobrist_key;
        let hint = self.table.peek(key).and_then(|entry| entry.best_move);
        move_to_front(root_moves, hint);

        let mut alpha = -INFINITY;
        let mut best: Option<(Move, i32)> = None;

        for &mv in root_moves.iter() {
            let undo = make_move(&mut self.position, mv);
            let child = self.negamax(depth - 1, -INFINITY, -alpha, 1);
            unmake_move(&mut self.position, mv, &undo);

            let score = -child?;
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
            alpha = alpha.max(score);
        }

        let (mv, score) = best?;
        self.table.store(
            key,
            depth,
            SearchEntry {
                score: score_to_table(score, 0),
                best_move: Some(mv),
                bound: Bound::Exact,
            },
        );
        Some(SearchedMove::new(mv, score))
    }

    /// `None` when the stop signal interrupted the subtree.
    fn negamax(&mut self, depth: u8, mut alpha: i32, beta: i32, ply: usize) -> Option<i32> {
        self.nodes += 1;
        if self.nodes % NODE_POLL_INTERVAL == 0 && self.stop.should_stop() {
            return None;
        }

        if depth == 0 {
            return Some(relative_evaluation(&self.position));
        }

        let key = self.position.zobrist_key;
        if let Some(entry) = self.table.probe(key, depth) {
            let score = score_from_table(entry.score, ply);
            match entry.bound {
                Bound::Exact => return Some(score),
                Bound::Lower if score >= beta => return Some(score),
                Bound::Upper if score <= alpha => return Some(score),
                _ => {}
            }
        }

        if self.layers.len() <= ply {
            self.layers.resize_with(ply + 1, || Vec::with_capacity(64));
        }
        let mut moves = mem::take(&mut self.layers[ply]);
        generate_legal_moves(&mut self.position, &mut moves);

        if moves.is_empty() {
            self.layers[ply] = moves;
            let side = self.position.side_to_move;
            return Some(if is_king_in_check(&self.position, side) {
                -(MATE_SCORE - ply as i32)
            } else {
                0
            });
        }

        let hint = self.table.peek(key).and_then(|entry| entry.best_move);
        move_to_front(&mut moves, hint);

        let alpha_orig = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut interrupted = false;

        for &mv in moves.iter() {
            let undo = make_move(&mut self.position, mv);
            let child = self.negamax(depth - 1, -beta, -alpha, ply + 1);
            unmake_move(&mut self.position, mv, &undo);

            let Some(child) = child else {
                interrupted = true;
                break;
            };
            let score = -child;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }

        self.layers[ply] = moves;
        if interrupted {
            return None;
        }

        let bound = if best_score <= alpha_orig {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.table.store(
            key,
            depth,
            SearchEntry {
                score: score_to_table(best_score, ply),
                best_move,
                bound,
            },
        );

        Some(best_score)
    }
}

/// Mate scores are stored relative to the node, not the root, so a hit at a
/// different ply still reports the right distance to mate.
#[inline]
fn score_to_table(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply as i32
    } else if score < -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

#[inline]
fn score_from_table(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply as i32
    } else if score < -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

#[inline]
fn move_to_front(moves: &mut [Move], hint: Option<Move>) {
    if let Some(hint) = hint {
        if let Some(idx) = moves.iter().position(|&mv| mv == hint) {
            moves[..=idx].rotate_right(1);
        }
    }
}

/// One-shot search with a private table of `table_mb` megabytes.
pub fn best_move(
    position: &Position,
    depth: u8,
    table_mb: usize,
) -> Result<Option<SearchedMove>, ChessError> {
    let mut table = SearchTable::new_with_mb(table_mb);
    // Bound to a local so the search, which borrows `table`, drops first.
    let result = MoveSearch::new(position.clone(), &mut table).search_and_return(depth);
    result
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::move_generation::legal_move_generator::legal_moves;
    use crate::tables::engine_tables::EngineTables;

    fn from_fen(fen: &str) -> Position {
        Position::from_fen(EngineTables::shared_for_tests(), fen).expect("FEN should parse")
    }

    #[test]
    fn returned_moves_are_legal_at_every_depth() {
        for fen in [
            STARTING_POSITION_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        ] {
            let position = from_fen(fen);
            let legal = legal_moves(&position);
            for depth in 1..=3 {
                let best = best_move(&position, depth, 1)
                    .expect("search should run")
                    .expect("position has legal moves");
                assert!(legal.contains(&best.as_move()), "{fen} depth {depth}");
            }
        }
    }

    #[test]
    fn search_leaves_caller_position_untouched() {
        let position = from_fen(STARTING_POSITION_FEN);
        let mut table = SearchTable::with_capacity(1 << 12);
        let mut search = MoveSearch::new(position.clone(), &mut table);
        search.search(3).expect("search should run");
        assert_eq!(search.position, position);
    }

    #[test]
    fn takes_a_hanging_queen() {
        let position = from_fen("4k3/8/8/3q4/8/8/3R4/4K3 w - - 0 1");
        let best = best_move(&position, 2, 1)
            .expect("search should run")
            .expect("position has legal moves");
        assert_eq!(best.as_move(), Move::new(11, 35));
        assert!(best.score > 0);
    }

    #[test]
    fn finds_mate_in_one_and_scores_it() {
        // Back-rank mate: Ra1-a8.
        let position = from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let best = best_move(&position, 3, 1)
            .expect("search should run")
            .expect("position has legal moves");
        assert_eq!(best.as_move(), Move::new(0, 56));
        assert_eq!(best.score, MATE_SCORE - 1);
    }

    #[test]
    fn no_legal_moves_returns_none() {
        let mated = from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert_eq!(best_move(&mated, 2, 1), Ok(None));
    }

    #[test]
    fn rejects_out_of_range_depth() {
        let position = from_fen(STARTING_POSITION_FEN);
        assert_eq!(
            best_move(&position, 0, 1),
            Err(ChessError::DepthOutOfRange {
                depth: 0,
                max: MAX_SEARCH_DEPTH
            })
        );
        assert!(best_move(&position, MAX_SEARCH_DEPTH + 1, 1).is_err());
    }

    #[test]
    fn pre_raised_stop_falls_back_to_first_legal_move() {
        let position = from_fen(STARTING_POSITION_FEN);
        let mut table = SearchTable::with_capacity(1 << 12);
        let stop = StopSignal::new();
        stop.request_stop();

        let report = MoveSearch::new(position.clone(), &mut table)
            .with_stop_signal(stop)
            .search(MAX_SEARCH_DEPTH)
            .expect("search should run");

        assert!(report.stopped);
        assert_eq!(report.completed_depth, 0);
        let best = report.best.expect("fallback move expected");
        let legal = legal_moves(&position);
        assert_eq!(best.as_move(), legal[0]);
        assert_eq!(best.score, relative_evaluation(&position));
    }

    #[test]
    fn pre_raised_stop_prefers_the_table_hint() {
        let position = from_fen(STARTING_POSITION_FEN);
        let hint = Move::new(6, 21); // g1f3
        let mut table = SearchTable::with_capacity(1 << 12);
        table.store(
            position.zobrist_key,
            1,
            SearchEntry {
                score: 0,
                best_move: Some(hint),
                bound: Bound::Exact,
            },
        );
        let stop = StopSignal::new();
        stop.request_stop();

        let report = MoveSearch::new(position.clone(), &mut table)
            .with_stop_signal(stop)
            .search(4)
            .expect("search should run");

        assert!(report.stopped);
        assert_eq!(report.completed_depth, 0);
        let best = report.best.expect("fallback move expected");
        assert!(legal_moves(&position).contains(&best.as_move()));
        assert_eq!(best.as_move(), hint);
    }

    #[test]
    fn stop_raised_mid_search_keeps_last_completed_depth() {
        let position = from_fen(STARTING_POSITION_FEN);
        let mut table = SearchTable::with_capacity(1 << 12);
        let stop = StopSignal::new();
        let trigger = stop.clone();

        let report = MoveSearch::new(position.clone(), &mut table)
            .with_stop_signal(stop)
            .on_iteration(move |summary| {
                if summary.depth == 2 {
                    trigger.request_stop();
                }
            })
            .search(MAX_SEARCH_DEPTH)
            .expect("search should run");

        assert!(report.stopped);
        assert_eq!(report.completed_depth, 2);
        let best = report.best.expect("depth 2 result expected");
        assert!(legal_moves(&position).contains(&best.as_move()));
    }

    #[test]
    fn iterations_are_reported_in_order() {
        let position = from_fen(STARTING_POSITION_FEN);
        let mut table = SearchTable::with_capacity(1 << 14);
        let depths = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&depths);

        let report = MoveSearch::new(position, &mut table)
            .on_iteration(move |summary| {
                sink.lock().expect("lock").push(summary.depth);
            })
            .search(4)
            .expect("search should run");

        assert_eq!(report.completed_depth, 4);
        assert!(!report.stopped);
        assert!(report.table_hits > 0);
        assert_eq!(*depths.lock().expect("lock"), vec![1, 2, 3, 4]);
    }

    #[test]
    fn mate_scores_shift_with_ply() {
        let mate_in_three_plies = MATE_SCORE - 3;
        assert_eq!(score_to_table(mate_in_three_plies, 2), MATE_SCORE - 1);
        assert_eq!(score_from_table(MATE_SCORE - 1, 2), mate_in_three_plies);
        assert_eq!(score_to_table(-mate_in_three_plies, 2), -(MATE_SCORE - 1));
        assert_eq!(score_to_table(150, 7), 150);
    }
}
