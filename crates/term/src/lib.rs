//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer: the view draws a
//! [`SessionSnapshot`](crate::core::SessionSnapshot) into a plain framebuffer,
//! and the renderer flushes only the cells that changed.
//!
//! Board cells are 2 columns wide to compensate for terminal glyph aspect
//! ratio. The view reports where it put the board as a
//! [`BoardLayout`](crate::types::BoardLayout) so mouse input can be mapped back
//! to cells.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use color_connect_core as core;
pub use color_connect_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, PanelInfo, ScoreLine, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
