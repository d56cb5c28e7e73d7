//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the board engine and the round state machine. It has
//! **no dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical boards and refills
//! - **Testable**: Every rule is exercised by unit tests
//! - **Portable**: Runs under the terminal runner, the TCP adapter, or headless
//!
//! # Module Structure
//!
//! - [`grid`]: rows x cols board of balls and the "any move left" scan
//! - [`generator`]: random playable boards and the [`TokenFactory`]
//! - [`selection`]: drag-to-chain state machine
//! - [`resolver`]: chain validation and color bomb expansion
//! - [`cascade`]: removal, gravity and refill
//! - [`scoring`]: points and time bonus per match
//! - [`session`]: one timed round driven by events
//! - [`game_loop`]: wall-clock ticks and cascade scheduling
//!
//! # Game Rules
//!
//! - Drag through orthogonally adjacent balls of one color; release to clear
//!   a chain of at least two.
//! - A chain scores `len² × 10`; chains of four or more add time to the clock.
//! - A color bomb inside a chain clears every ball of its color, 10 points each.
//! - Cleared balls dissolve for 300ms, then the columns fall and refill.
//! - The round ends when the clock hits zero or the refilled board has no
//!   chain left.
//!
//! # Example
//!
//! ```
//! use color_connect_core::{EngineConfig, Grid, Session};
//! use color_connect_types::{PointerEvent, Position};
//!
//! let grid = Grid::parse(&["RRG", "GBY", "GBY"]).unwrap();
//! let mut session = Session::with_grid(EngineConfig::default(), grid);
//! session.start();
//!
//! session.pointer_down(Position::new(0, 0));
//! session.pointer_enter(Position::new(0, 1));
//! let effects = session.pointer_up();
//!
//! assert_eq!(session.score(), 40);
//! assert_eq!(effects.len(), 2); // Matched + ScheduleCascade
//! ```
//!
//! # Timing
//!
//! - **Tick**: one per second of unsuspended play
//! - **Dissolve**: 300ms between a match and its cascade, clock paused
//!
//! Call [`GameLoop::advance`](game_loop::GameLoop::advance) every frame with
//! elapsed time.

pub mod cascade;
pub mod config;
pub mod game_loop;
pub mod generator;
pub mod grid;
pub mod resolver;
pub mod rng;
pub mod scoring;
pub mod selection;
pub mod session;
pub mod snapshot;

pub use color_connect_types as types;

// Re-export commonly used types for convenience
pub use cascade::{cascade, CascadeOutcome};
pub use config::EngineConfig;
pub use game_loop::GameLoop;
pub use generator::{generate, Generated, TokenFactory};
pub use grid::{adjacent, Grid};
pub use resolver::{resolve, ChainError, MatchResolution};
pub use rng::SimpleRng;
pub use scoring::{bonus_score, calculate_score, match_score, time_bonus_secs, ScoreResult};
pub use selection::{Chain, Selection, SelectionState};
pub use session::{CascadeTicket, Effect, Effects, Session, SessionEvent};
pub use snapshot::SessionSnapshot;
