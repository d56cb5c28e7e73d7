use crate::grid::Grid;
use crate::types::{GameOverReason, Position, SessionPhase, Token};

/// Everything a view or remote observer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: u32,
    pub grid: Grid,
    pub active_chain: Vec<Position>,
    pub clearing: Vec<Position>,
    pub score: u32,
    pub time_remaining: i32,
    pub phase: SessionPhase,
    pub game_over_reason: Option<GameOverReason>,
    pub suspended: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            session_id: 0,
            grid: Grid::empty(0, 0),
            active_chain: Vec::new(),
            clearing: Vec::new(),
            score: 0,
            time_remaining: 0,
            phase: SessionPhase::NotStarted,
            game_over_reason: None,
            suspended: false,
        }
    }
}

impl SessionSnapshot {
    pub fn token(&self, pos: Position) -> Option<Token> {
        self.grid.token(pos)
    }

    pub fn in_chain(&self, pos: Position) -> bool {
        self.active_chain.contains(&pos)
    }

    pub fn is_clearing(&self, pos: Position) -> bool {
        self.clearing.contains(&pos)
    }

    /// Board as color codes (0 empty, 1..=6 colors), one row per entry.
    pub fn color_codes(&self) -> Vec<Vec<u8>> {
        (0..self.grid.rows())
            .map(|row| {
                (0..self.grid.cols())
                    .map(|col| {
                        self.grid
                            .token(Position::new(row, col))
                            .map(|t| t.color.code())
                            .unwrap_or(0)
                    })
                    .collect()
            })
            .collect()
    }

    /// Bomb flags, same layout as [`color_codes`](Self::color_codes).
    pub fn bomb_flags(&self) -> Vec<Vec<bool>> {
        (0..self.grid.rows())
            .map(|row| {
                (0..self.grid.cols())
                    .map(|col| {
                        self.grid
                            .token(Position::new(row, col))
                            .is_some_and(|t| t.is_bomb())
                    })
                    .collect()
            })
            .collect()
    }

    /// Remaining time split into minutes and seconds.
    pub fn clock(&self) -> (u32, u32) {
        let secs = self.time_remaining.max(0) as u32;
        (secs / 60, secs % 60)
    }
}
