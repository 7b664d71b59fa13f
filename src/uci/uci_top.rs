//! UCI protocol front-end and command loop.
//!
//! Parses UCI commands, keeps the current position, runs `go` on a worker
//! thread so `stop` stays responsive, and emits protocol-compliant output.
//! A few local commands (`perft`, `divide`, `d`, `bestmove`, `moves`) are
//! accepted for diagnostics; they are not part of the protocol.

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{error, info};

use crate::chess_errors::ChessError;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_apply::play_long_algebraic;
use crate::move_generation::perft::{node_count, perft_divide};
use crate::moves::move_descriptions::Move;
use crate::search::board_scoring::MATE_SCORE;
use crate::search::iterative_deepening::{IterationSummary, MoveSearch, MAX_SEARCH_DEPTH};
use crate::search::search_control::StopSignal;
use crate::search::transposition_table::{PerftTable, SearchTable};
use crate::tables::engine_tables::EngineTables;
use crate::utils::render_game_state::render_diagnostics;

const UCI_ENGINE_NAME: &str = "Nemo Chess";
const UCI_ENGINE_AUTHOR: &str = "the Nemo Chess developers";
pub const MAX_HASH_MB: usize = 4096;

/// Runtime settings shared by the binary flags and `setoption`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub hash_mb: usize,
    /// Depth used by a bare `go`.
    pub default_depth: u8,
    /// Perft table size; `None` counts without a table.
    pub perft_table_mb: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: 16,
            default_depth: 6,
            perft_table_mb: None,
        }
    }
}

pub fn run_stdio_loop(tables: Arc<EngineTables>, config: EngineConfig) -> io::Result<()> {
    let stdin = io::stdin();
    let mut uci = UciState::new(tables, config, io::stdout());

    for line in stdin.lock().lines() {
        let line = line?;
        if uci.handle_command(&line)? {
            break;
        }
    }

    // Input ended: let a bounded `go` finish its last `bestmove`.
    uci.wait_for_search();
    Ok(())
}

struct RunningSearch {
    stop: StopSignal,
    handle: JoinHandle<SearchTable>,
    infinite: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GoParams {
    depth: u8,
    infinite: bool,
}

pub struct UciState<W: Write + Send + 'static> {
    tables: Arc<EngineTables>,
    config: EngineConfig,
    position: Position,
    /// Kept between searches; `None` while a worker owns it or after a resize.
    search_table: Option<SearchTable>,
    running: Option<RunningSearch>,
    out: Arc<Mutex<W>>,
}

impl<W: Write + Send + 'static> UciState<W> {
    pub fn new(tables: Arc<EngineTables>, config: EngineConfig, out: W) -> Self {
        let position = Position::new_game(&tables);
        Self {
            tables,
            config,
            position,
            search_table: None,
            running: None,
            out: Arc::new(Mutex::new(out)),
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn output(&self) -> &Arc<Mutex<W>> {
        &self.out
    }

    /// Handle one input line. Returns `true` when the loop should exit.
    pub fn handle_command(&mut self, line: &str) -> io::Result<bool> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }

        let mut parts = trimmed.split_whitespace();
        let cmd = parts.next().unwrap_or_default();

        match cmd {
            "uci" => {
                self.emit(&format!("id name {UCI_ENGINE_NAME}"))?;
                self.emit(&format!("id author {UCI_ENGINE_AUTHOR}"))?;
                self.emit(&format!(
                    "option name Hash type spin default {} min 1 max {MAX_HASH_MB}",
                    self.config.hash_mb
                ))?;
                self.emit("uciok")?;
            }
            "isready" => {
                self.emit("readyok")?;
            }
            "setoption" => {
                if let Err(err) = self.handle_setoption(trimmed) {
                    self.emit(&format!("info string setoption error: {err}"))?;
                }
            }
            "ucinewgame" => {
                self.finish_search();
                self.position = Position::new_game(&self.tables);
                if let Some(table) = self.search_table.as_mut() {
                    table.clear();
                }
            }
            "position" => {
                self.finish_search();
                match parse_position(&self.tables, trimmed) {
                    Ok(position) => self.position = position,
                    Err(err) => self.emit(&format!("info string position error: {err}"))?,
                }
            }
            "go" => {
                self.finish_search();
                match parse_go_params(trimmed, self.config.default_depth) {
                    Ok(params) => self.start_search(params),
                    Err(err) => {
                        self.emit(&format!("info string go error: {err}"))?;
                        self.emit("bestmove 0000")?;
                    }
                }
            }
            "stop" => {
                self.finish_search();
            }
            "quit" => {
                self.finish_search();
                return Ok(true);
            }
            "perft" => {
                self.finish_search();
                match parse_depth_argument(parts.next()) {
                    Ok(depth) => self.run_perft(depth)?,
                    Err(err) => self.emit(&format!("info string perft error: {err}"))?,
                }
            }
            "divide" => {
                self.finish_search();
                match parse_depth_argument(parts.next()) {
                    Ok(depth) => self.run_divide(depth)?,
                    Err(err) => self.emit(&format!("info string divide error: {err}"))?,
                }
            }
            "d" => {
                self.emit(&render_diagnostics(&self.position))?;
            }
            "bestmove" => {
                self.finish_search();
                let depth = parts
                    .next()
                    .map_or(Ok(self.config.default_depth), |tok| parse_depth_argument(Some(tok)));
                match depth {
                    Ok(depth) => self.run_bestmove(depth)?,
                    Err(err) => self.emit(&format!("info string bestmove error: {err}"))?,
                }
            }
            "moves" => {
                self.finish_search();
                if let Err(err) = self.apply_moves(parts) {
                    self.emit(&format!("info string moves error: {err}"))?;
                }
            }
            _ => {
                // Unknown commands are ignored for UCI compatibility.
            }
        }

        Ok(false)
    }

    /// Raise the stop signal of a running `go`, wait for its `bestmove`, and
    /// take its table back.
    pub fn finish_search(&mut self) {
        if let Some(running) = self.running.as_ref() {
            running.stop.request_stop();
        }
        self.wait_for_search();
    }

    /// Wait for a running `go` to reach its depth and take its table back.
    /// An infinite search is stopped first, since it would never return.
    pub fn wait_for_search(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        if running.infinite {
            running.stop.request_stop();
        }
        match running.handle.join() {
            Ok(table) => self.search_table = Some(table),
            Err(_) => error!("search worker panicked; dropping its table"),
        }
    }

    fn emit(&self, line: &str) -> io::Result<()> {
        write_line(&self.out, line)
    }

    fn handle_setoption(&mut self, line: &str) -> Result<(), ChessError> {
        let mut tokens = line.split_whitespace();
        let _ = tokens.next(); // setoption

        let mut name_tokens = Vec::<&str>::new();
        let mut value_tokens = Vec::<&str>::new();
        let mut mode = "";

        for tok in tokens {
            match tok {
                "name" => mode = "name",
                "value" => mode = "value",
                _ if mode == "name" => name_tokens.push(tok),
                _ if mode == "value" => value_tokens.push(tok),
                _ => {}
            }
        }

        let name = name_tokens.join(" ");
        let value = value_tokens.join(" ");

        if name.eq_ignore_ascii_case("Hash") {
            let parsed = value
                .parse::<usize>()
                .map_err(|_| ChessError::Protocol(format!("invalid Hash value '{value}'")))?;
            let hash_mb = parsed.clamp(1, MAX_HASH_MB);
            if hash_mb != self.config.hash_mb {
                self.finish_search();
                self.config.hash_mb = hash_mb;
                self.search_table = None;
            }
            Ok(())
        } else {
            Err(ChessError::Protocol(format!("unknown option '{name}'")))
        }
    }

    fn start_search(&mut self, params: GoParams) {
        let stop = StopSignal::new();
        let worker_stop = stop.clone();
        let position = self.position.clone();
        let out = Arc::clone(&self.out);
        let hash_mb = self.config.hash_mb;
        let mut table = self
            .search_table
            .take()
            .unwrap_or_else(|| SearchTable::new_with_mb(hash_mb));

        info!(
            "go depth {}{} on {}",
            params.depth,
            if params.infinite { " (infinite)" } else { "" },
            position.get_fen()
        );

        let handle = thread::spawn(move || {
            let info_out = Arc::clone(&out);
            let result = MoveSearch::new(position, &mut table)
                .with_stop_signal(worker_stop)
                .on_iteration(move |summary| {
                    if let Err(err) = write_line(&info_out, &format_info_line(summary)) {
                        error!("failed to write info line: {err}");
                    }
                })
                .search(params.depth);

            let reply = match result {
                Ok(report) => {
                    let best = report.best.map(|best| best.as_move().to_string());
                    format!("bestmove {}", best.as_deref().unwrap_or(Move::NULL_TEXT))
                }
                Err(err) => {
                    if let Err(io_err) = write_line(&out, &format!("info string go error: {err}")) {
                        error!("failed to write search error: {io_err}");
                    }
                    format!("bestmove {}", Move::NULL_TEXT)
                }
            };
            if let Err(err) = write_line(&out, &reply) {
                error!("failed to write bestmove: {err}");
            }
            table
        });

        self.running = Some(RunningSearch {
            stop,
            handle,
            infinite: params.infinite,
        });
    }

    fn run_perft(&mut self, depth: u8) -> io::Result<()> {
        let started_at = Instant::now();
        let capacity = self.config.perft_table_mb.map(PerftTable::capacity_for_mb);
        let report = node_count(
            &self.position,
            depth,
            capacity.is_some(),
            capacity.unwrap_or(0),
        );
        let elapsed = started_at.elapsed().as_millis();

        let mut line = format!(
            "Searched {} nodes ({elapsed} ms).",
            group_thousands(report.nodes)
        );
        if capacity.is_some() {
            line.push_str(&format!(" TT: {} hits.", report.table_hits));
        }
        self.emit(&line)
    }

    fn run_divide(&mut self, depth: u8) -> io::Result<()> {
        let mut scratch = self.position.clone();
        let divided = perft_divide(&mut scratch, depth);
        for (mv, nodes) in &divided {
            self.emit(&format!("{mv}: {nodes}"))?;
        }
        let total: u64 = divided.iter().map(|(_, nodes)| nodes).sum();
        self.emit(&format!("Nodes searched: {total}"))
    }

    /// Synchronous search printing one line per completed depth.
    fn run_bestmove(&mut self, depth: u8) -> io::Result<()> {
        let mut table = self
            .search_table
            .take()
            .unwrap_or_else(|| SearchTable::new_with_mb(self.config.hash_mb));
        let out = Arc::clone(&self.out);

        let result = MoveSearch::new(self.position.clone(), &mut table)
            .on_iteration(move |summary| {
                let line = format!(
                    "{}: {} [{}] ({} ms)",
                    summary.depth,
                    summary.best.as_move(),
                    summary.best.score,
                    summary.elapsed.as_millis()
                );
                if let Err(err) = write_line(&out, &line) {
                    error!("failed to write bestmove line: {err}");
                }
            })
            .search(depth);
        self.search_table = Some(table);

        match result {
            Ok(report) if report.best.is_none() => self.emit("no legal moves"),
            Ok(_) => Ok(()),
            Err(err) => self.emit(&format!("info string bestmove error: {err}")),
        }
    }

    /// Play every move or none of them.
    fn apply_moves<'t>(&mut self, moves: impl Iterator<Item = &'t str>) -> Result<(), ChessError> {
        let mut next = self.position.clone();
        for text in moves {
            play_long_algebraic(&mut next, text)?;
        }
        self.position = next;
        Ok(())
    }
}

impl<W: Write + Send + 'static> Drop for UciState<W> {
    fn drop(&mut self) {
        self.finish_search();
    }
}

fn write_line<W: Write>(out: &Mutex<W>, line: &str) -> io::Result<()> {
    let mut out = out
        .lock()
        .map_err(|_| io::Error::other("output lock poisoned"))?;
    writeln!(out, "{line}")?;
    out.flush()
}

fn format_info_line(summary: &IterationSummary) -> String {
    format!(
        "info depth {} score {} nodes {} time {} pv {}",
        summary.depth,
        format_score(summary.best.score),
        summary.nodes,
        summary.elapsed.as_millis(),
        summary.best.as_move()
    )
}

/// `cp N`, or `mate N` in full moves when the score encodes a forced mate.
fn format_score(score: i32) -> String {
    let mate_window = MATE_SCORE - i32::from(MAX_SEARCH_DEPTH) - 1;
    if score.abs() >= mate_window {
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {score}")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn parse_depth_argument(token: Option<&str>) -> Result<u8, ChessError> {
    let token = token.ok_or_else(|| ChessError::Protocol("missing depth".to_owned()))?;
    let depth = token
        .parse::<u8>()
        .map_err(|_| ChessError::Protocol(format!("invalid depth '{token}'")))?;
    if (1..=MAX_SEARCH_DEPTH).contains(&depth) {
        Ok(depth)
    } else {
        Err(ChessError::DepthOutOfRange {
            depth,
            max: MAX_SEARCH_DEPTH,
        })
    }
}

fn parse_position(tables: &Arc<EngineTables>, line: &str) -> Result<Position, ChessError> {
    let mut tokens = line.split_whitespace().peekable();
    let _ = tokens.next(); // "position"

    let mut position = match tokens.next() {
        Some("startpos") => Position::new_game(tables),
        Some("fen") => {
            let mut fen_parts = Vec::<&str>::new();
            while let Some(&next) = tokens.peek() {
                if next == "moves" {
                    break;
                }
                fen_parts.push(next);
                tokens.next();
            }
            if fen_parts.is_empty() {
                return Err(ChessError::Protocol(
                    "missing FEN after 'position fen'".to_owned(),
                ));
            }
            Position::from_fen(tables, &fen_parts.join(" "))?
        }
        Some(other) => {
            return Err(ChessError::Protocol(format!(
                "unsupported position token '{other}'"
            )))
        }
        None => return Err(ChessError::Protocol("incomplete position command".to_owned())),
    };

    match tokens.next() {
        Some("moves") => {
            for text in tokens {
                play_long_algebraic(&mut position, text)?;
            }
        }
        Some(other) => {
            return Err(ChessError::Protocol(format!("unexpected token '{other}'")));
        }
        None => {}
    }

    Ok(position)
}

fn parse_go_params(line: &str, default_depth: u8) -> Result<GoParams, ChessError> {
    let mut params = GoParams {
        depth: default_depth,
        infinite: false,
    };
    let mut tokens = line.split_whitespace().skip(1);
    while let Some(tok) = tokens.next() {
        match tok {
            "depth" => params.depth = parse_depth_argument(tokens.next())?,
            "infinite" => params.infinite = true,
            _ => {}
        }
    }
    if params.infinite {
        params.depth = MAX_SEARCH_DEPTH;
    }
    Ok(params)
}
