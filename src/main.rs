//! UCI engine binary.
//!
//! Builds the shared tables once, then hands stdin/stdout to the protocol
//! loop. Logs go to stderr only; stdout carries protocol lines.

use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use log::{error, info};

use nemo_chess::search::iterative_deepening::MAX_SEARCH_DEPTH;
use nemo_chess::tables::engine_tables::EngineTables;
use nemo_chess::uci::uci_top::{run_stdio_loop, EngineConfig, MAX_HASH_MB};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Search transposition table size in megabytes
    #[arg(long, default_value_t = 16)]
    hash_mb: usize,

    /// Depth used by `go` without an explicit depth
    #[arg(long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(1..=MAX_SEARCH_DEPTH as i64))]
    depth: u8,

    /// Count `perft` leaves through a transposition table
    #[arg(long)]
    perft_tt: bool,

    /// Perft table size in megabytes (implies --perft-tt)
    #[arg(long)]
    perft_tt_mb: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let hash_mb = self.hash_mb.clamp(1, MAX_HASH_MB);
        let perft_table_mb = match (self.perft_tt, self.perft_tt_mb) {
            (_, Some(mb)) => Some(mb.clamp(1, MAX_HASH_MB)),
            (true, None) => Some(hash_mb),
            (false, None) => None,
        };
        EngineConfig {
            hash_mb,
            default_depth: self.depth,
            perft_table_mb,
        }
    }
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    })
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    let config = args.engine_config();
    let started_at = Instant::now();
    let tables = EngineTables::build();
    info!(
        "engine tables built in {} ms; config {:?}",
        started_at.elapsed().as_millis(),
        config
    );

    match run_stdio_loop(tables, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("protocol loop failed: {err}");
            ExitCode::FAILURE
        }
    }
}
