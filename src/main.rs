use std::time::Duration;

use anyhow::{bail, Context, Result};
use chessbot::{
    engine::{ella::EllaChess, Engine, EngineOptions, SearchLimits},
    ChessError,
};
use clap::Parser;

/// Finds and plays the best move for a chess position
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Starting position in FEN, the standard start position if omitted
    #[arg(long)]
    fen: Option<String>,

    /// Moves in UCI notation played before the search, e.g. `e2e4 e7e5`
    moves: Vec<String>,

    /// Deepest iteration to search
    #[arg(short, long, default_value_t = 3)]
    depth: u32,

    /// Time budget per move in minutes
    #[arg(short, long, default_value_t = 2.0)]
    time_limit: f64,

    /// Search to `--depth` regardless of the time it takes
    #[arg(long, conflicts_with = "time_limit")]
    no_time_limit: bool,

    /// Number of engine moves to play in a row
    #[arg(short, long, default_value_t = 1)]
    plies: u32,

    /// Endgame once the weaker side has at most this many non-king pieces
    #[arg(long, default_value_t = 4)]
    endgame_threshold: usize,

    /// Transposition table size in MiB
    #[arg(long, default_value_t = 1)]
    hash_size_mb: usize,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .init();

    if args.depth == 0 {
        bail!("--depth must be at least 1");
    }
    let time_limit = if args.no_time_limit {
        None
    } else {
        let seconds = args.time_limit * 60.0;
        Some(Duration::try_from_secs_f64(seconds).with_context(|| {
            format!("invalid time limit of {} minutes", args.time_limit)
        })?)
    };
    let limits = SearchLimits {
        max_depth: args.depth,
        time_limit,
    };
    let options = EngineOptions {
        endgame_threshold: args.endgame_threshold,
        hash_size_mb: args.hash_size_mb,
        ..EngineOptions::default()
    };

    let (mut session, error) = EllaChess::new_session_with_options(args.fen.as_deref(), options);
    if let Some(error) = error {
        eprintln!("{error}, using the start position instead");
    }

    for mve in &args.moves {
        session
            .play_uci(mve)
            .with_context(|| format!("could not play {mve}"))?;
    }

    for _ in 0..args.plies {
        match session.play_best_move(&limits) {
            Ok(report) => {
                println!(
                    "{} score {} depth {} nodes {} time {:?}{}",
                    report.best_move,
                    report.score,
                    report.depth,
                    report.nodes,
                    report.elapsed,
                    if report.endgame { " (endgame)" } else { "" },
                );
            }
            Err(ChessError::NoMoveFound(outcome)) => {
                println!("game over: {outcome}");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("{}", session.board());
    println!("fen {}", session.fen());
    println!("hash {:#018x}", session.hash());

    Ok(())
}
