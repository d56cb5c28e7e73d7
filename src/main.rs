//! Terminal Color Connect runner (default binary).
//!
//! Mouse drags build chains, the keyboard starts, restarts and abandons
//! rounds. It uses crossterm for input and the framebuffer renderer from
//! `color_connect::term`. An optional TCP adapter lets a remote client watch
//! and play the same round.
//!
//! Local mouse and remote controller share one board. Whichever opens a drag
//! owns it until release; pointer input from the other side is dropped
//! meanwhile.

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use color_connect::adapter::protocol::{create_ack, ActionName};
use color_connect::adapter::{build_observation, Adapter, ClientCommand, InboundPayload, OutboundMessage};
use color_connect::core::{Effect, EngineConfig, GameLoop, Session, SessionEvent, SessionSnapshot};
use color_connect::input::{
    handle_key_event, handle_name_key, is_interrupt, AppCommand, NameKey, PointerTracker,
};
use color_connect::leaderboard::{
    provisional_rank, qualifies, top, FileLeaderboard, HighScoreEntry, Leaderboard,
};
use color_connect::term::{FrameBuffer, GameView, PanelInfo, ScoreLine, TerminalRenderer, Viewport};
use color_connect::types::{BoardLayout, GameOverReason, PointerEvent, MAX_NAME_LEN};

/// Input poll timeout; also the redraw cadence while idle.
const FRAME_MS: u64 = 33;

fn main() -> Result<()> {
    init_logging();

    let config = EngineConfig::from_env();
    info!(seed = config.seed, round_secs = config.round_secs, "starting");

    let adapter = match Adapter::start_from_env(config.rows, config.cols) {
        Ok(adapter) => adapter,
        Err(e) => {
            warn!(error = %e, "adapter not started");
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let mut app = App::new(config, FileLeaderboard::from_env(), player_name(), adapter);
    let result = app.run(&mut term);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

/// Log to the file named by `COLOR_CONNECT_LOG`; the terminal is in raw mode.
fn init_logging() {
    let Ok(path) = std::env::var("COLOR_CONNECT_LOG") else {
        return;
    };
    let file = match File::create(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("cannot open log file {}: {}", path, e);
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn player_name() -> String {
    ["COLOR_CONNECT_PLAYER", "USER"]
        .iter()
        .filter_map(|k| std::env::var(k).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| "player".to_string())
}

/// Side panel for the current frame.
fn panel_info(scores: &[HighScoreEntry], snap: &SessionSnapshot, message: Option<&str>) -> PanelInfo {
    PanelInfo {
        rank: provisional_rank(scores, snap.score),
        top: top(scores)
            .iter()
            .map(|e| ScoreLine {
                name: e.name.clone(),
                score: e.score,
            })
            .collect(),
        message: message.map(str::to_string),
    }
}

/// Who is driving the open drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragOwner {
    Local,
    Remote,
}

/// Name entry for a score that made the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NamePrompt {
    score: u32,
    name: String,
}

impl NamePrompt {
    fn line(&self) -> String {
        format!("High score {}! Name: {}_", self.score, self.name)
    }
}

struct App<L: Leaderboard> {
    game: GameLoop,
    leaderboard: L,
    scores: Vec<HighScoreEntry>,
    player: String,
    message: Option<String>,
    prompt: Option<NamePrompt>,
    pointer: PointerTracker,
    drag: Option<DragOwner>,
    adapter: Option<Adapter>,
    obs_seq: u64,
}

impl<L: Leaderboard> App<L> {
    fn new(config: EngineConfig, leaderboard: L, player: String, adapter: Option<Adapter>) -> Self {
        let mut app = Self {
            game: GameLoop::new(Session::new(config)),
            leaderboard,
            scores: Vec::new(),
            player,
            message: None,
            prompt: None,
            pointer: PointerTracker::new(),
            drag: None,
            adapter,
            obs_seq: 0,
        };
        match app.leaderboard.fetch() {
            Ok(list) => app.scores = list,
            Err(e) => {
                warn!(error = %e, "leaderboard unavailable");
                app.message = Some(format!("Scores: {}", e));
            }
        }
        app
    }

    fn run(&mut self, term: &mut TerminalRenderer) -> Result<()> {
        let view = GameView::default();
        let mut fb = FrameBuffer::new(0, 0);
        let mut snap = SessionSnapshot::default();
        let mut last_snap = SessionSnapshot::default();
        let mut last_frame = Instant::now();

        loop {
            self.game.snapshot_into(&mut snap);
            let prompt = self.prompt.as_ref().map(NamePrompt::line);
            let panel = panel_info(&self.scores, &snap, prompt.as_deref().or(self.message.as_deref()));
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            let layout = view.render_into(&snap, &panel, Viewport::new(w, h), &mut fb);
            term.draw_swap(&mut fb)?;

            if snap != last_snap {
                self.broadcast(&snap);
                std::mem::swap(&mut snap, &mut last_snap);
            }

            if event::poll(Duration::from_millis(FRAME_MS))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse, &layout),
                    Event::Resize(_, _) => term.invalidate(),
                    _ => {}
                }
            }

            self.drain_adapter();

            let elapsed = last_frame.elapsed();
            last_frame = Instant::now();
            let effects = self.game.advance(elapsed.as_millis().min(u32::MAX as u128) as u32);
            self.observe(&effects);
        }
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.prompt.is_some() {
            if is_interrupt(key) {
                return true;
            }
            if let Some(edit) = handle_name_key(key) {
                self.edit_name(edit);
            }
            return false;
        }
        match handle_key_event(key) {
            Some(AppCommand::Quit) => true,
            Some(cmd) => {
                self.apply_command(cmd);
                false
            }
            None => false,
        }
    }

    fn handle_mouse(&mut self, mouse: event::MouseEvent, layout: &BoardLayout) {
        if let Some(ev) = self.pointer.handle_mouse_event(mouse, layout) {
            self.pointer_event(ev, DragOwner::Local);
        }
    }

    /// Feed one pointer event from `source`. Dropped while the other side
    /// owns the drag, or, for remote input, while the local button is held.
    fn pointer_event(&mut self, ev: PointerEvent, source: DragOwner) {
        if self.drag.is_some_and(|owner| owner != source) {
            return;
        }
        if source == DragOwner::Remote && self.pointer.is_pressed() {
            return;
        }
        let effects = self.game.handle(SessionEvent::Pointer(ev));
        self.drag = (!self.game.session().chain().is_empty()).then_some(source);
        self.observe(&effects);
    }

    fn apply_command(&mut self, cmd: AppCommand) {
        let event = match cmd {
            AppCommand::Start => SessionEvent::Start,
            AppCommand::Restart => SessionEvent::Restart,
            AppCommand::Abandon => SessionEvent::Abandon,
            AppCommand::Quit => return,
        };
        if matches!(event, SessionEvent::Start | SessionEvent::Restart) {
            self.pointer.reset();
            self.drag = None;
            self.message = None;
        }
        let effects = self.game.handle(event);
        self.observe(&effects);
    }

    fn observe(&mut self, effects: &[Effect]) {
        for effect in effects {
            if let Effect::GameOver(reason) = *effect {
                self.pointer.reset();
                self.drag = None;
                self.round_over(reason);
            }
        }
    }

    fn round_over(&mut self, reason: GameOverReason) {
        let score = self.game.session().score();
        info!(reason = reason.as_str(), score, "round over");
        if reason == GameOverReason::Abandoned || !qualifies(&self.scores, score) {
            return;
        }
        if let Some(open) = self.prompt.take() {
            self.submit(&open.name, open.score);
        }
        self.prompt = Some(NamePrompt {
            score,
            name: self.player.chars().take(MAX_NAME_LEN).collect(),
        });
    }

    fn edit_name(&mut self, edit: NameKey) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match edit {
            NameKey::Char(c) => {
                if prompt.name.chars().count() < MAX_NAME_LEN {
                    prompt.name.push(c);
                }
            }
            NameKey::Backspace => {
                prompt.name.pop();
            }
            NameKey::Confirm => {
                if prompt.name.trim().is_empty() {
                    return;
                }
                let NamePrompt { score, name } = prompt.clone();
                self.prompt = None;
                self.player = name.trim().to_string();
                self.submit(&name, score);
            }
            NameKey::Cancel => {
                self.prompt = None;
                self.message = Some("Score not saved".to_string());
            }
        }
    }

    fn submit(&mut self, name: &str, score: u32) {
        match self.leaderboard.submit(name, score) {
            Ok(list) => {
                self.scores = list;
                self.message = Some(format!("Saved {} for {}", score, name.trim()));
            }
            Err(e) => {
                warn!(error = %e, "score not saved");
                self.message = Some(format!("Not saved: {}", e));
            }
        }
    }

    /// Apply queued remote commands and answer each with an ack.
    fn drain_adapter(&mut self) {
        loop {
            let Some(inbound) = self.adapter.as_mut().and_then(Adapter::try_recv) else {
                return;
            };
            match inbound.payload {
                InboundPayload::SnapshotRequest => {
                    self.obs_seq += 1;
                    let obs = build_observation(&self.game.snapshot(), self.obs_seq);
                    self.send(OutboundMessage::ToClientObservation {
                        client_id: inbound.client_id,
                        obs,
                    });
                }
                InboundPayload::Command(cmd) => {
                    let before = self.game.snapshot();
                    match cmd {
                        ClientCommand::Pointer(ev) => self.pointer_event(ev, DragOwner::Remote),
                        ClientCommand::Action(ActionName::Start) => self.apply_command(AppCommand::Start),
                        ClientCommand::Action(ActionName::Restart) => {
                            self.apply_command(AppCommand::Restart)
                        }
                        ClientCommand::Action(ActionName::Abandon) => {
                            self.apply_command(AppCommand::Abandon)
                        }
                    }
                    let applied = self.game.snapshot() != before;
                    self.send(OutboundMessage::ToClientAck {
                        client_id: inbound.client_id,
                        ack: create_ack(inbound.seq, applied),
                    });
                }
            }
        }
    }

    fn broadcast(&mut self, snap: &SessionSnapshot) {
        if self.adapter.is_none() {
            return;
        }
        self.obs_seq += 1;
        let obs = build_observation(snap, self.obs_seq);
        self.send(OutboundMessage::BroadcastObservation { obs });
    }

    fn send(&self, msg: OutboundMessage) {
        if let Some(adapter) = self.adapter.as_ref() {
            adapter.send(msg);
        }
    }
}
