use criterion::{black_box, criterion_group, criterion_main, Criterion};
use oribi::chess::position::{perft, Position};
use oribi::search::find_best_move;

fn perft_benchmark(c: &mut Criterion) {
    let position = Position::starting();
    c.bench_function("perft_starting_depth_3", |b| {
        b.iter(|| perft(black_box(&position), 3))
    });
}

fn search_benchmark(c: &mut Criterion) {
    let starting = Position::starting();
    c.bench_function("best_move_starting_depth_3", |b| {
        b.iter(|| find_best_move(black_box(&starting), 3))
    });

    let middlegame =
        Position::try_from("r2qkb1r/1pp1pp1p/p1np1np1/1B6/3PP1b1/2N1BN2/PPP2PPP/R2QK2R w KQkq - 0 7")
            .expect("valid position");
    c.bench_function("best_move_middlegame_depth_3", |b| {
        b.iter(|| find_best_move(black_box(&middlegame), 3))
    });
}

criterion_group!(benches, perft_benchmark, search_benchmark);
criterion_main!(benches);
