//! Session controller - one timed round
//!
//! The session is a state machine driven by [`SessionEvent`]s. Each call to
//! [`Session::handle`] returns the [`Effect`]s the host has to act on, most
//! importantly the scheduled cascade that ends the dissolve window.
//!
//! Lifecycle: `NotStarted -> Active -> GameOver(reason)`. While a cascade is
//! pending the session is *suspended*: the clock does not run and no new drag
//! can begin. Score and time bonus are credited the moment a chain commits.

use arrayvec::ArrayVec;
use tracing::{debug, info};

use crate::cascade::{cascade, CascadeOutcome};
use crate::config::EngineConfig;
use crate::generator::{generate, TokenFactory};
use crate::grid::Grid;
use crate::resolver::{resolve, MatchResolution};
use crate::scoring::{calculate_score, ScoreResult};
use crate::selection::Selection;
use crate::snapshot::SessionSnapshot;
use crate::types::{GameOverReason, PointerEvent, Position, SessionPhase};

/// Identifies one scheduled cascade.
///
/// Carries the session id so a callback that outlives a restart is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CascadeTicket {
    pub session_id: u32,
    pub seq: u32,
}

/// Inputs to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Start,
    Pointer(PointerEvent),
    /// One second of play.
    Tick,
    CascadeDue(CascadeTicket),
    Abandon,
    Restart,
}

/// Work for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `CascadeDue(ticket)` after `delay_ms`.
    ScheduleCascade { ticket: CascadeTicket, delay_ms: u32 },
    /// Drop the pending callback for `ticket`.
    CancelCascade(CascadeTicket),
    Matched(ScoreResult),
    GameOver(GameOverReason),
}

pub type Effects = ArrayVec<Effect, 4>;

#[derive(Debug, Clone)]
struct PendingCascade {
    ticket: CascadeTicket,
    resolution: MatchResolution,
}

/// One round of play.
#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    factory: TokenFactory,
    session_id: u32,
    grid: Grid,
    selection: Selection,
    phase: SessionPhase,
    reason: Option<GameOverReason>,
    score: u32,
    time_remaining: i32,
    pending: Option<PendingCascade>,
    cascade_seq: u32,
}

impl Session {
    /// Fresh session on a generated board, not started yet.
    pub fn new(config: EngineConfig) -> Self {
        let config = config.normalized();
        let mut factory = TokenFactory::from_config(&config);
        let grid = generate(&config, &mut factory).grid;
        Self::build(config, factory, grid, 1)
    }

    /// Session on a prepared board. Future tokens get ids above the board's.
    pub fn with_grid(config: EngineConfig, grid: Grid) -> Self {
        let config = config.normalized();
        let mut factory = TokenFactory::from_config(&config);
        factory.reserve_past(grid.max_id());
        Self::build(config, factory, grid, 1)
    }

    fn build(config: EngineConfig, factory: TokenFactory, grid: Grid, session_id: u32) -> Self {
        Self {
            time_remaining: config.round_secs,
            config,
            factory,
            session_id,
            grid,
            selection: Selection::new(),
            phase: SessionPhase::NotStarted,
            reason: None,
            score: 0,
            pending: None,
            cascade_seq: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn game_over_reason(&self) -> Option<GameOverReason> {
        self.reason
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    /// A match is dissolving and its cascade has not run yet.
    pub fn is_suspended(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the clock runs right now.
    pub fn is_ticking(&self) -> bool {
        self.is_active() && !self.is_suspended()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn time_remaining(&self) -> i32 {
        self.time_remaining
    }

    pub fn chain(&self) -> &[Position] {
        self.selection.chain()
    }

    /// Positions being dissolved, empty unless suspended.
    pub fn clearing(&self) -> &[Position] {
        self.pending
            .as_ref()
            .map(|p| p.resolution.cleared.as_slice())
            .unwrap_or(&[])
    }

    pub fn pending_ticket(&self) -> Option<CascadeTicket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// Dispatch one event.
    pub fn handle(&mut self, event: SessionEvent) -> Effects {
        match event {
            SessionEvent::Start => self.start(),
            SessionEvent::Pointer(PointerEvent::Down(pos)) => self.pointer_down(pos),
            SessionEvent::Pointer(PointerEvent::Enter(pos)) => self.pointer_enter(pos),
            SessionEvent::Pointer(PointerEvent::Up) => self.pointer_up(),
            SessionEvent::Tick => self.tick(),
            SessionEvent::CascadeDue(ticket) => self.cascade_due(ticket),
            SessionEvent::Abandon => self.abandon(),
            SessionEvent::Restart => self.restart(),
        }
    }

    /// Begin the round.
    pub fn start(&mut self) -> Effects {
        if self.phase == SessionPhase::NotStarted {
            self.phase = SessionPhase::Active;
            info!(
                session_id = self.session_id,
                seconds = self.time_remaining,
                "round started"
            );
        }
        Effects::new()
    }

    pub fn pointer_down(&mut self, pos: Position) -> Effects {
        if self.is_ticking() && self.time_remaining > 0 && self.selection.begin(&self.grid, pos) {
            debug!(row = pos.row, col = pos.col, "drag started");
        }
        Effects::new()
    }

    pub fn pointer_enter(&mut self, pos: Position) -> Effects {
        if self.is_active() {
            self.selection.extend(&self.grid, pos);
        }
        Effects::new()
    }

    /// Release: commit the chain if it is long enough.
    pub fn pointer_up(&mut self) -> Effects {
        let mut effects = Effects::new();
        if !self.is_active() {
            self.selection.cancel();
            return effects;
        }
        let Some(chain) = self.selection.commit(self.config.min_match_len) else {
            return effects;
        };
        let resolution = match resolve(&self.grid, &chain, self.config.min_match_len) {
            Ok(resolution) => resolution,
            Err(err) => {
                debug!(%err, "chain rejected");
                return effects;
            }
        };

        let result = calculate_score(&resolution, self.config.bomb_points_per_ball);
        self.score = self.score.saturating_add(result.total);
        self.time_remaining = self
            .time_remaining
            .saturating_add(result.time_bonus_secs as i32);

        self.cascade_seq = self.cascade_seq.wrapping_add(1);
        let ticket = CascadeTicket {
            session_id: self.session_id,
            seq: self.cascade_seq,
        };
        debug!(
            chain = resolution.chain_length,
            bonus = resolution.bonus_cleared,
            points = result.total,
            time_bonus = result.time_bonus_secs,
            "match committed"
        );
        self.pending = Some(PendingCascade { ticket, resolution });

        effects.push(Effect::Matched(result));
        effects.push(Effect::ScheduleCascade {
            ticket,
            delay_ms: self.config.dissolve_ms,
        });
        effects
    }

    /// One second elapsed.
    pub fn tick(&mut self) -> Effects {
        let mut effects = Effects::new();
        if !self.is_ticking() {
            return effects;
        }
        self.time_remaining -= 1;
        if self.time_remaining <= 0 {
            self.time_remaining = 0;
            self.selection.cancel();
            self.finish(GameOverReason::TimesUp, &mut effects);
        }
        effects
    }

    /// The dissolve window for `ticket` is over.
    pub fn cascade_due(&mut self, ticket: CascadeTicket) -> Effects {
        let mut effects = Effects::new();
        let pending = match self.pending.take() {
            Some(pending) if pending.ticket == ticket => pending,
            other => {
                self.pending = other;
                debug!(?ticket, "stale cascade ignored");
                return effects;
            }
        };

        let outcome = cascade(
            &self.grid,
            &pending.resolution.cleared,
            &mut self.factory,
            self.config.min_match_len,
        );
        if let CascadeOutcome::Applied {
            grid,
            removed,
            has_moves,
            ..
        } = outcome
        {
            self.grid = grid;
            debug!(removed, has_moves, "cascade applied");
            if removed > 0 && !has_moves && self.is_active() {
                self.finish(GameOverReason::NoMoves, &mut effects);
            }
        }
        effects
    }

    /// Tear the round down. The board stays as it was before any pending match.
    pub fn abandon(&mut self) -> Effects {
        let mut effects = Effects::new();
        if self.is_game_over() {
            return effects;
        }
        if let Some(pending) = self.pending.take() {
            effects.push(Effect::CancelCascade(pending.ticket));
        }
        self.selection.cancel();
        self.finish(GameOverReason::Abandoned, &mut effects);
        effects
    }

    /// New round on a new board, started immediately.
    pub fn restart(&mut self) -> Effects {
        let mut effects = Effects::new();
        if let Some(pending) = self.pending.take() {
            effects.push(Effect::CancelCascade(pending.ticket));
        }
        let grid = generate(&self.config, &mut self.factory).grid;
        let factory = self.factory.clone();
        *self = Self::build(
            self.config.clone(),
            factory,
            grid,
            self.session_id.wrapping_add(1),
        );
        self.start();
        effects
    }

    fn finish(&mut self, reason: GameOverReason, effects: &mut Effects) {
        self.phase = SessionPhase::GameOver;
        self.reason = Some(reason);
        info!(
            session_id = self.session_id,
            score = self.score,
            reason = reason.as_str(),
            "round over"
        );
        effects.push(Effect::GameOver(reason));
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let mut snap = SessionSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    /// Fill `out` in place, reusing its buffers.
    pub fn snapshot_into(&self, out: &mut SessionSnapshot) {
        out.session_id = self.session_id;
        out.grid.clone_from(&self.grid);
        out.active_chain.clear();
        out.active_chain.extend_from_slice(self.chain());
        out.clearing.clear();
        out.clearing.extend_from_slice(self.clearing());
        out.score = self.score;
        out.time_remaining = self.time_remaining;
        out.phase = self.phase;
        out.game_over_reason = self.reason;
        out.suspended = self.is_suspended();
    }
}
