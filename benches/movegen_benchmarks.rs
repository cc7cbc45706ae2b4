//! Benchmarks for move generation and legality filtering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use cotulenh_core::air_defense::AirDefenseMap;
use cotulenh_core::board::Board;
use cotulenh_core::game::Game;
use cotulenh_core::legality;
use cotulenh_core::movegen::{self, MoveFilter};
use cotulenh_core::piece::Color;

fn bench_pseudo_legal_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    let startpos = Board::starting_position();
    group.bench_function("startpos_pseudo_legal", |b| {
        let ad = AirDefenseMap::rebuild(&startpos);
        b.iter(|| black_box(movegen::generate_moves(&startpos, &ad, Color::Red, MoveFilter::default())))
    });

    group.finish();
}

fn bench_legal_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("legality");

    let startpos = Board::starting_position();
    group.bench_function("startpos_filter_legal", |b| {
        let ad = AirDefenseMap::rebuild(&startpos);
        b.iter(|| {
            let moves = movegen::generate_moves(&startpos, &ad, Color::Red, MoveFilter::default());
            black_box(legality::filter_legal(&startpos, moves, false))
        })
    });

    group.finish();
}

fn bench_facade_legal_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade");
    group.sample_size(30);

    for label in ["startpos"] {
        group.bench_with_input(BenchmarkId::new("legal_moves", label), &label, |b, _| {
            let game = Game::new();
            b.iter(|| black_box(game.legal_moves(MoveFilter::default())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pseudo_legal_movegen, bench_legal_filter, bench_facade_legal_moves);
criterion_main!(benches);
