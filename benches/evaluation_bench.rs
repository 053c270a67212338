use owlbot::evaluation::evaluate;
use owlbot::movegen::ordered_legal_moves;
use owlbot::Position;
use criterion::{criterion_group, criterion_main, Criterion};

fn positions() -> Vec<(&'static str, Position)> {
    vec![
        ("startpos", Position::default()),
        ("middlegame", Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4").unwrap()),
        ("endgame", Position::from_fen("8/5k2/8/8/8/8/4K3/4R3 w - - 0 1").unwrap()),
        ("complex", Position::from_fen("r1bq1rk1/pp2ppbp/2np2p1/2n5/P3PP2/N1P2N2/1PB3PP/R1B1QRK1 b - - 0 10").unwrap()),
    ]
}

fn bench_evaluation(c: &mut Criterion) {
    for (name, pos) in &positions() {
        let side = pos.turn();
        c.bench_function(&format!("eval_{}", name), |b| {
            b.iter(|| evaluate(pos.board(), side))
        });
    }
}

fn bench_ordering(c: &mut Criterion) {
    for (name, pos) in positions() {
        let mut pos = pos;
        c.bench_function(&format!("order_{}", name), |b| {
            b.iter(|| ordered_legal_moves(&mut pos).len())
        });
    }
}

criterion_group!(benches, bench_evaluation, bench_ordering);
criterion_main!(benches);
