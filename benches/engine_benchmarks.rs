use chessbot::{engine::transposition::TranspositionTable, Board};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

mod ella {
    use chessbot::{
        engine::{ella::EllaChess, Engine, SearchLimits},
        Board,
    };

    pub fn find_best_move(board: Board, depth: u32) {
        let mut ella = EllaChess::new_from_board(board);
        if let Err(e) = ella.find_best_move(&SearchLimits::depth_only(depth)) {
            panic!("{e}");
        }
    }
}

fn search_benchmark(c: &mut Criterion) {
    const SEARCH_DEPTHS: &[u32] = &[1, 3, 4];

    let positions = [
        ("start", Board::start_position()),
        ("kiwipete", Board::from_fen(KIWIPETE).unwrap()),
    ];

    let mut ella_group = c.benchmark_group("ella::find_best_move");
    ella_group.sample_size(10);
    for (name, board) in &positions {
        for &depth in SEARCH_DEPTHS {
            ella_group.bench_with_input(
                BenchmarkId::new(*name, depth),
                &(depth, board),
                |b, (depth, board)| {
                    b.iter(|| ella::find_best_move((*board).clone(), *depth));
                },
            );
        }
    }
    ella_group.finish();
}

fn search_core_benchmark(c: &mut Criterion) {
    use chessbot::engine::search::Search;

    let board = Board::start_position();
    let mut group = c.benchmark_group("search::search_to_depth");
    group.sample_size(10);
    for depth in [2u32, 3] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut tt = TranspositionTable::new(1);
                let mut search = Search::new(&mut tt, None, 1024, false);
                search.search_to_depth(&board, depth).unwrap()
            });
        });
    }
    group.finish();
}

fn movegen_benchmark(c: &mut Criterion) {
    let board = Board::from_fen(KIWIPETE).unwrap();
    c.bench_function("board::perft kiwipete 2", |b| b.iter(|| board.perft(2)));
    c.bench_function("board::play_move", |b| {
        let moves = board.legal_moves();
        b.iter(|| {
            for &mve in &moves {
                let mut child = board.clone();
                child.play_move(mve);
            }
        })
    });
}

criterion_group!(benches, search_benchmark, search_core_benchmark, movegen_benchmark);
criterion_main!(benches);
