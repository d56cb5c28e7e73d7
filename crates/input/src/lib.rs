//! Terminal input module (engine-facing).
//!
//! Independent of any UI framework. Keys map to [`AppCommand`]s; mouse events
//! are hit-tested against the [`BoardLayout`](crate::types::BoardLayout) the
//! view last drew and become [`PointerEvent`](crate::types::PointerEvent)s.

pub mod map;
pub mod pointer;

pub use color_connect_types as types;

pub use map::{handle_key_event, handle_name_key, is_interrupt, should_quit, AppCommand, NameKey};
pub use pointer::PointerTracker;
