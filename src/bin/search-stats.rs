use std::time::Instant;

use anyhow::{Context, Result};
use chessbot::engine::ella::EllaChess;
use chessbot::engine::{Engine, SearchLimits};
use chessbot::{Board, START_BOARD_FEN};
use clap::Parser;

/// Prints search statistics for increasing depths
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Position to search, the start position if omitted
    #[arg(long, default_value = START_BOARD_FEN)]
    fen: String,

    /// Depths to search, each with a fresh engine
    #[arg(default_values_t = [1, 3, 5])]
    depths: Vec<u32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let board = Board::from_fen(&args.fen).context("parsing --fen")?;
    for depth in args.depths {
        search_stats(&board, depth)?;
    }
    Ok(())
}

fn search_stats(board: &Board, depth: u32) -> Result<()> {
    let mut engine = EllaChess::new_from_board(board.clone());

    let start = Instant::now();
    let report = engine
        .find_best_move(&SearchLimits::depth_only(depth))
        .with_context(|| format!("searching to depth {depth}"))?;
    let elapsed = start.elapsed();

    println!("Stats after searching to depth {depth}:\ntime: {elapsed:?}\n{report:#?}");
    Ok(())
}
