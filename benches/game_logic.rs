use criterion::{black_box, criterion_group, criterion_main, Criterion};
use color_connect::core::{
    cascade, generate, resolve, EngineConfig, GameLoop, Grid, Session, SessionEvent, TokenFactory,
};
use color_connect::types::Position;

fn bench_generate(c: &mut Criterion) {
    let config = EngineConfig::default().with_seed(12345);
    let mut factory = TokenFactory::from_config(&config);

    c.bench_function("generate_board", |b| {
        b.iter(|| generate(black_box(&config), &mut factory))
    });
}

fn bench_has_any_match(c: &mut Criterion) {
    // Worst case: no pair anywhere, every cell is scanned.
    let rows = ["YRYRYR", "RYRYRY", "YRYRYR", "RYRYRY", "YRYRYR", "RYRYRY", "YRYRYR", "RYRYRY"];
    let grid = Grid::parse(&rows).unwrap_or_else(|| Grid::empty(8, 6));

    c.bench_function("has_any_match_none", |b| {
        b.iter(|| black_box(&grid).has_any_match(2))
    });
}

fn bench_resolve_bomb(c: &mut Criterion) {
    let rows = ["RrRRRR", "BBBBBB", "RRRRRR", "GGGGGG", "RRRRRR", "YYYYYY", "RRRRRR", "WWWWWW"];
    let grid = Grid::parse(&rows).unwrap_or_else(|| Grid::empty(8, 6));
    let chain: Vec<Position> = (0..6).map(|col| Position::new(0, col)).collect();

    c.bench_function("resolve_bomb_chain", |b| {
        b.iter(|| resolve(black_box(&grid), black_box(&chain), 2))
    });
}

fn bench_cascade(c: &mut Criterion) {
    let config = EngineConfig::default().with_seed(7);
    let mut factory = TokenFactory::from_config(&config);
    let grid = generate(&config, &mut factory).grid;
    let clear: Vec<Position> = (0..8).map(|row| Position::new(row, 2)).collect();

    c.bench_function("cascade_full_column", |b| {
        b.iter(|| cascade(black_box(&grid), black_box(&clear), &mut factory, 2))
    });
}

fn bench_advance(c: &mut Criterion) {
    let mut game = GameLoop::new(Session::new(EngineConfig::default().with_seed(12345)));
    game.handle(SessionEvent::Start);

    c.bench_function("advance_16ms", |b| {
        b.iter(|| {
            game.advance(black_box(16));
            if game.session().is_game_over() {
                game.handle(SessionEvent::Restart);
            }
        })
    });
}

fn bench_drag(c: &mut Criterion) {
    let rows = ["RRRRRR", "BBBBBB", "RRRRRR", "GGGGGG", "RRRRRR", "YYYYYY", "RRRRRR", "WWWWWW"];
    let grid = Grid::parse(&rows).unwrap_or_else(|| Grid::empty(8, 6));
    let mut session = Session::with_grid(EngineConfig::default(), grid);
    session.start();

    c.bench_function("drag_six_and_cancel", |b| {
        b.iter(|| {
            session.pointer_down(Position::new(0, 0));
            for col in 1..6 {
                session.pointer_enter(black_box(Position::new(0, col)));
            }
            for col in (0..5).rev() {
                session.pointer_enter(Position::new(0, col));
            }
            session.pointer_up();
        })
    });
}

criterion_group!(
    benches,
    bench_generate,
    bench_has_any_match,
    bench_resolve_bomb,
    bench_cascade,
    bench_advance,
    bench_drag
);
criterion_main!(benches);
