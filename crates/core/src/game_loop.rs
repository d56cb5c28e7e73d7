//! Game loop - clock and cascade scheduling around a [`Session`]
//!
//! The host calls [`GameLoop::advance`] with wall-clock deltas. The loop turns
//! them into one `Tick` per second of unsuspended play and delivers
//! `CascadeDue` when the dissolve delay has elapsed. Events that land inside
//! the same delta are delivered in time order.

use tracing::debug;

use crate::session::{CascadeTicket, Effect, Effects, Session, SessionEvent};
use crate::snapshot::SessionSnapshot;
use crate::types::TICK_MS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scheduled {
    ticket: CascadeTicket,
    remaining_ms: u32,
}

#[derive(Debug, Clone)]
pub struct GameLoop {
    session: Session,
    tick_acc_ms: u32,
    scheduled: Option<Scheduled>,
}

impl GameLoop {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            tick_acc_ms: 0,
            scheduled: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        self.session.snapshot_into(out);
    }

    /// Milliseconds until the pending cascade fires, if one is scheduled.
    pub fn cascade_in_ms(&self) -> Option<u32> {
        self.scheduled.map(|s| s.remaining_ms)
    }

    /// Feed an event to the session and track the timers it asks for.
    pub fn handle(&mut self, event: SessionEvent) -> Effects {
        if matches!(event, SessionEvent::Start | SessionEvent::Restart) {
            self.tick_acc_ms = 0;
        }
        let effects = self.session.handle(event);
        self.observe(&effects);
        effects
    }

    fn observe(&mut self, effects: &[Effect]) {
        for effect in effects {
            match *effect {
                Effect::ScheduleCascade { ticket, delay_ms } => {
                    self.scheduled = Some(Scheduled {
                        ticket,
                        remaining_ms: delay_ms,
                    });
                    self.tick_acc_ms = 0;
                }
                Effect::CancelCascade(ticket) => {
                    if self.scheduled.is_some_and(|s| s.ticket == ticket) {
                        debug!(?ticket, "cascade cancelled");
                        self.scheduled = None;
                    }
                }
                Effect::GameOver(_) => {
                    self.scheduled = None;
                    self.tick_acc_ms = 0;
                }
                Effect::Matched(_) => {}
            }
        }
    }

    /// Advance the clocks by `elapsed_ms` and return every effect produced.
    pub fn advance(&mut self, elapsed_ms: u32) -> Vec<Effect> {
        let mut out = Vec::new();
        let mut remaining = elapsed_ms;

        loop {
            let ticking = self.session.is_ticking();
            let to_tick = if ticking {
                TICK_MS.saturating_sub(self.tick_acc_ms)
            } else {
                u32::MAX
            };
            let to_cascade = self.scheduled.map(|s| s.remaining_ms).unwrap_or(u32::MAX);
            let step = to_tick.min(to_cascade);

            if step == u32::MAX || step > remaining {
                if ticking {
                    self.tick_acc_ms += remaining;
                }
                if let Some(s) = self.scheduled.as_mut() {
                    s.remaining_ms -= remaining.min(s.remaining_ms);
                }
                break;
            }

            remaining -= step;
            if ticking {
                self.tick_acc_ms += step;
            }
            if let Some(s) = self.scheduled.as_mut() {
                s.remaining_ms -= step;
            }

            let due = self.scheduled.filter(|s| s.remaining_ms == 0);
            let effects = if let Some(due) = due {
                self.scheduled = None;
                self.handle(SessionEvent::CascadeDue(due.ticket))
            } else {
                self.tick_acc_ms = 0;
                self.handle(SessionEvent::Tick)
            };
            out.extend(effects);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::grid::Grid;
    use crate::types::{GameOverReason, PointerEvent, Position};

    fn p(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn started(rows: &[&str]) -> GameLoop {
        let config = EngineConfig {
            bomb_chance_percent: 0,
            ..EngineConfig::default()
        };
        let mut game = GameLoop::new(Session::with_grid(config, Grid::parse(rows).unwrap()));
        game.handle(SessionEvent::Start);
        game
    }

    fn commit(game: &mut GameLoop, a: Position, b: Position) {
        game.handle(SessionEvent::Pointer(PointerEvent::Down(a)));
        game.handle(SessionEvent::Pointer(PointerEvent::Enter(b)));
        game.handle(SessionEvent::Pointer(PointerEvent::Up));
    }

    #[test]
    fn test_ticks_once_per_second() {
        let mut game = started(&["RRG", "GBY", "GBY"]);
        game.advance(999);
        assert_eq!(game.session().time_remaining(), 60);
        game.advance(1);
        assert_eq!(game.session().time_remaining(), 59);
        game.advance(2500);
        assert_eq!(game.session().time_remaining(), 57);
    }

    #[test]
    fn test_no_ticks_before_start() {
        let config = EngineConfig::default();
        let mut game = GameLoop::new(Session::new(config));
        assert!(game.advance(10_000).is_empty());
        assert_eq!(game.session().time_remaining(), 60);
    }

    #[test]
    fn test_cascade_fires_after_dissolve_and_clock_pauses() {
        let mut game = started(&["RRG", "GBY", "GBY"]);
        game.advance(900);
        commit(&mut game, p(0, 0), p(0, 1));
        assert_eq!(game.cascade_in_ms(), Some(300));

        game.advance(299);
        assert!(game.session().is_suspended());
        assert_eq!(game.session().time_remaining(), 60);

        game.advance(1);
        assert!(!game.session().is_suspended());
        assert_eq!(game.cascade_in_ms(), None);

        // Tick accumulator restarted with the suspension.
        game.advance(999);
        assert_eq!(game.session().time_remaining(), 60);
        game.advance(1);
        assert_eq!(game.session().time_remaining(), 59);
    }

    #[test]
    fn test_cascade_and_tick_in_one_delta() {
        let mut game = started(&["RRG", "GBY", "GBY"]);
        commit(&mut game, p(0, 0), p(0, 1));
        game.advance(1300);
        assert!(!game.session().is_suspended());
        assert_eq!(game.session().time_remaining(), 59);
    }

    #[test]
    fn test_restart_drops_scheduled_cascade() {
        let mut game = started(&["RRG", "GBY", "GBY"]);
        commit(&mut game, p(0, 0), p(0, 1));
        game.handle(SessionEvent::Restart);
        assert_eq!(game.cascade_in_ms(), None);
        let grid = game.session().grid().clone();
        game.advance(300);
        assert_eq!(game.session().grid(), &grid);
        assert_eq!(game.session().session_id(), 2);
    }

    #[test]
    fn test_abandon_cancels_schedule() {
        let mut game = started(&["RRG", "GBY", "GBY"]);
        commit(&mut game, p(0, 0), p(0, 1));
        game.handle(SessionEvent::Abandon);
        assert_eq!(game.cascade_in_ms(), None);
        assert!(game.advance(5000).is_empty());
    }

    #[test]
    fn test_round_runs_out() {
        let mut game = started(&["RRG", "GBY", "GBY"]);
        let effects = game.advance(120_000);
        assert_eq!(effects, vec![Effect::GameOver(GameOverReason::TimesUp)]);
        assert_eq!(game.session().time_remaining(), 0);
        assert!(game.session().is_game_over());
    }
}
