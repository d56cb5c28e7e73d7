//! Color Connect (workspace facade crate).
//!
//! Re-exports the workspace crates under short names so the binary, the
//! integration tests and benches can write `color_connect::core::Session`.

pub use color_connect_adapter as adapter;
pub use color_connect_core as core;
pub use color_connect_input as input;
pub use color_connect_leaderboard as leaderboard;
pub use color_connect_term as term;
pub use color_connect_types as types;
