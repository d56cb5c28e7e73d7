//! Round-level tests through the game loop

use color_connect::core::{
    Effect, EngineConfig, GameLoop, Grid, ScoreResult, Session, SessionEvent,
};
use color_connect::types::{GameOverReason, PointerEvent, Position, SessionPhase};

fn p(row: u8, col: u8) -> Position {
    Position::new(row, col)
}

fn config() -> EngineConfig {
    EngineConfig {
        bomb_chance_percent: 0,
        ..EngineConfig::default()
    }
}

fn started(config: EngineConfig, rows: &[&str]) -> GameLoop {
    let mut game = GameLoop::new(Session::with_grid(config, Grid::parse(rows).unwrap()));
    game.handle(SessionEvent::Start);
    game
}

fn drag(game: &mut GameLoop, path: &[Position]) -> Vec<Effect> {
    let mut effects = Vec::new();
    effects.extend(game.handle(SessionEvent::Pointer(PointerEvent::Down(path[0]))));
    for &pos in &path[1..] {
        effects.extend(game.handle(SessionEvent::Pointer(PointerEvent::Enter(pos))));
    }
    effects.extend(game.handle(SessionEvent::Pointer(PointerEvent::Up)));
    effects
}

fn matched(effects: &[Effect]) -> ScoreResult {
    effects
        .iter()
        .find_map(|e| match e {
            Effect::Matched(result) => Some(*result),
            _ => None,
        })
        .expect("expected a Matched effect")
}

#[test]
fn test_chain_of_three_scores_90() {
    let mut game = started(config(), &["RRR", "GBY", "GBY"]);
    let result = matched(&drag(&mut game, &[p(0, 0), p(0, 1), p(0, 2)]));
    assert_eq!(result.total, 90);
    assert_eq!(result.time_bonus_secs, 0);
    assert_eq!(game.session().time_remaining(), 60);
}

#[test]
fn test_chain_of_four_adds_two_seconds() {
    let mut game = started(config(), &["RRRR", "GBYG", "GBYG"]);
    let result = matched(&drag(&mut game, &[p(0, 0), p(0, 1), p(0, 2), p(0, 3)]));
    assert_eq!(result.total, 160);
    assert_eq!(game.session().score(), 160);
    assert_eq!(game.session().time_remaining(), 62);
}

#[test]
fn test_chain_of_nine_adds_twelve_seconds() {
    let mut game = started(config(), &["RRR", "RRR", "RRR"]);
    let snake = [
        p(0, 0),
        p(0, 1),
        p(0, 2),
        p(1, 2),
        p(1, 1),
        p(1, 0),
        p(2, 0),
        p(2, 1),
        p(2, 2),
    ];
    let result = matched(&drag(&mut game, &snake));
    assert_eq!(result.total, 810);
    assert_eq!(result.time_bonus_secs, 12);
    assert_eq!(game.session().time_remaining(), 72);
}

#[test]
fn test_bomb_clears_every_ball_of_its_color() {
    // Five reds, one of them a bomb inside the drawn chain.
    let mut game = started(config(), &["RrR", "BRB", "YBR"]);
    let result = matched(&drag(&mut game, &[p(0, 0), p(0, 1), p(0, 2)]));
    assert_eq!(result.match_score, 90);
    assert_eq!(result.bonus_score, 20);
    assert_eq!(result.total, 110);
    assert_eq!(game.session().clearing().len(), 5);

    game.advance(300);
    assert!(game.session().clearing().is_empty());
    assert!(game.session().grid().is_full());
}

#[test]
fn test_short_chain_changes_nothing() {
    let mut game = started(config(), &["RRG", "GBY", "GBY"]);
    let before = game.snapshot();
    let effects = drag(&mut game, &[p(0, 2)]);
    assert!(effects.is_empty());
    assert_eq!(game.snapshot(), before);
}

#[test]
fn test_no_moves_after_refill_ends_round() {
    // Two-cell column, two colors: seed 3 refills with different colors.
    let config = EngineConfig {
        rows: 2,
        cols: 1,
        palette_size: 2,
        seed: 3,
        ..config()
    };
    let mut game = started(config, &["R", "R"]);
    drag(&mut game, &[p(0, 0), p(1, 0)]);

    let effects = game.advance(300);
    assert_eq!(effects, vec![Effect::GameOver(GameOverReason::NoMoves)]);
    assert_eq!(game.session().phase(), SessionPhase::GameOver);
    assert!(game.advance(5_000).is_empty());
}

#[test]
fn test_clock_paused_while_dissolving() {
    let mut game = started(config(), &["RRG", "GBY", "GBY"]);
    game.advance(500);
    drag(&mut game, &[p(0, 0), p(0, 1)]);
    assert!(game.session().is_suspended());

    // A drag cannot begin during the dissolve window.
    game.handle(SessionEvent::Pointer(PointerEvent::Down(p(1, 0))));
    assert!(game.session().chain().is_empty());

    game.advance(299);
    assert_eq!(game.session().time_remaining(), 60);
    game.advance(1);
    assert!(!game.session().is_suspended());
    game.advance(1000);
    assert_eq!(game.session().time_remaining(), 59);
}

#[test]
fn test_stale_cascade_after_restart_is_ignored() {
    let mut game = started(config(), &["RRG", "GBY", "GBY"]);
    drag(&mut game, &[p(0, 0), p(0, 1)]);
    let stale = game.session().pending_ticket().unwrap();

    let effects = game.handle(SessionEvent::Restart);
    assert_eq!(effects.as_slice(), &[Effect::CancelCascade(stale)]);
    assert_eq!(game.session().session_id(), 2);

    let grid = game.session().grid().clone();
    assert!(game.handle(SessionEvent::CascadeDue(stale)).is_empty());
    assert_eq!(game.session().grid(), &grid);
    assert_eq!(game.session().score(), 0);
}

#[test]
fn test_abandon_during_suspension_leaves_grid_untouched() {
    let mut game = started(config(), &["RRG", "GBY", "GBY"]);
    let before = game.session().grid().clone();
    drag(&mut game, &[p(0, 0), p(0, 1)]);

    let effects = game.handle(SessionEvent::Abandon);
    assert!(effects.contains(&Effect::GameOver(GameOverReason::Abandoned)));
    game.advance(1_000);
    assert_eq!(game.session().grid(), &before);
    assert_eq!(game.session().game_over_reason(), Some(GameOverReason::Abandoned));
}

#[test]
fn test_full_round_times_out() {
    let config = EngineConfig {
        round_secs: 5,
        ..config()
    };
    let mut game = started(config, &["RRG", "GBY", "GBY"]);
    let effects = game.advance(10_000);
    assert_eq!(effects, vec![Effect::GameOver(GameOverReason::TimesUp)]);
    assert_eq!(game.session().time_remaining(), 0);

    // Game over is read-only.
    drag(&mut game, &[p(1, 0), p(2, 0)]);
    assert_eq!(game.session().score(), 0);
}

#[test]
fn test_generated_round_plays_through() {
    let config = EngineConfig::default().with_seed(2024);
    let mut game = GameLoop::new(Session::new(config));
    game.handle(SessionEvent::Start);

    // Play whatever horizontal pair exists until the round ends.
    for _ in 0..200 {
        if game.session().is_game_over() {
            break;
        }
        let grid = game.session().grid().clone();
        let pair = grid.tokens().find_map(|(pos, token)| {
            let right = Position::new(pos.row, pos.col + 1);
            let down = Position::new(pos.row + 1, pos.col);
            [right, down]
                .into_iter()
                .find(|&n| grid.token(n).is_some_and(|t| t.color == token.color))
                .map(|n| (pos, n))
        });
        match pair {
            Some((a, b)) => {
                drag(&mut game, &[a, b]);
                game.advance(300);
            }
            None => {
                game.advance(1_000);
            }
        }
        game.advance(1_000);
    }

    assert!(game.session().score() > 0);
    let ids: std::collections::HashSet<u32> =
        game.session().grid().tokens().map(|(_, t)| t.id).collect();
    assert_eq!(ids.len(), 48);
}
