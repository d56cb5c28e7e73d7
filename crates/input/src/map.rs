//! Keyboard bindings.
//!
//! | key              | command   |
//! |------------------|-----------|
//! | Enter, Space     | start     |
//! | r                | restart   |
//! | Esc, x           | abandon   |
//! | q, Ctrl-C        | quit      |
//!
//! Letters match either case. Everything else is ignored; the board itself is
//! played with the mouse.
//!
//! While the high-score name prompt is open, printable keys edit the name
//! instead (see [`handle_name_key`]) and only Ctrl-C quits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Round-level commands issued from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    Start,
    Restart,
    Abandon,
    Quit,
}

/// Map a key press to a command, if it is bound.
pub fn handle_key_event(key: KeyEvent) -> Option<AppCommand> {
    if should_quit(key) {
        return Some(AppCommand::Quit);
    }
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => Some(AppCommand::Start),
        KeyCode::Esc => Some(AppCommand::Abandon),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'r' => Some(AppCommand::Restart),
            'x' => Some(AppCommand::Abandon),
            _ => None,
        },
        _ => None,
    }
}

/// `q`/`Q`, or Ctrl-C (raw mode swallows SIGINT).
pub fn should_quit(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') => is_interrupt(key),
        KeyCode::Char(c) => c.eq_ignore_ascii_case(&'q'),
        _ => false,
    }
}

pub fn is_interrupt(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Edit to the name typed after a qualifying round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKey {
    Char(char),
    Backspace,
    Confirm,
    Cancel,
}

/// Map a key press to a name edit. Control chords are ignored.
pub fn handle_name_key(key: KeyEvent) -> Option<NameKey> {
    match key.code {
        KeyCode::Enter => Some(NameKey::Confirm),
        KeyCode::Esc => Some(NameKey::Cancel),
        KeyCode::Backspace => Some(NameKey::Backspace),
        KeyCode::Char(_) if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => None,
        KeyCode::Char(c) if !c.is_control() => Some(NameKey::Char(c)),
        _ => None,
    }
}
