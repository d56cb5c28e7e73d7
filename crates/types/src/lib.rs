//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, adapter protocol).
//!
//! # Board Dimensions
//!
//! The reference playfield is 8 rows by 6 columns:
//!
//! - **Rows**: 8 (indexed 0-7, row 0 is the top)
//! - **Columns**: 6 (indexed 0-5, left to right)
//!
//! # Round Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_MATCH_LENGTH` | 2 | Shortest chain that can be committed |
//! | `ROUND_DURATION_SECS` | 60 | Starting clock for a round |
//! | `TICK_MS` | 1000 | One timer tick per second |
//! | `DISSOLVE_MS` | 300 | Suspended window between match and cascade |
//! | `COLOR_BOMB_CHANCE_PERCENT` | 5 | Chance that a spawned ball is a color bomb |
//! | `BOMB_POINTS_PER_BALL` | 10 | Bonus points per ball cleared only by a bomb |
//! | `MAX_GENERATION_ATTEMPTS` | 100 | Cap on board rejection sampling |
//!
//! # Examples
//!
//! ```
//! use color_connect_types::{BallColor, Position, BOARD_COLS, BOARD_ROWS};
//!
//! let color = BallColor::from_str("Red").unwrap();
//! assert_eq!(color, BallColor::Red);
//!
//! let a = Position::new(0, 0);
//! assert!(a.is_adjacent(Position::new(1, 0)));
//! assert!(!a.is_adjacent(Position::new(1, 1)));
//!
//! assert_eq!(BOARD_ROWS, 8);
//! assert_eq!(BOARD_COLS, 6);
//! ```

/// Board height in cells (8 rows)
pub const BOARD_ROWS: u8 = 8;

/// Board width in cells (6 columns)
pub const BOARD_COLS: u8 = 6;

/// Shortest chain that counts as a match.
pub const MIN_MATCH_LENGTH: usize = 2;

/// Length of one round in seconds.
pub const ROUND_DURATION_SECS: i32 = 60;

/// Timer tick interval in milliseconds.
pub const TICK_MS: u32 = 1000;

/// Dissolve window between a committed match and the cascade (ms).
pub const DISSOLVE_MS: u32 = 300;

/// Chance (0..=100) that a freshly spawned ball carries the color bomb.
pub const COLOR_BOMB_CHANCE_PERCENT: u32 = 5;

/// Points per ball removed solely by a color bomb.
pub const BOMB_POINTS_PER_BALL: u32 = 10;

/// Maximum number of boards the generator samples before giving up.
pub const MAX_GENERATION_ATTEMPTS: u32 = 100;

/// Size of the persisted leaderboard.
pub const MAX_HIGH_SCORES: usize = 20;

/// Entries shown on the side panel.
pub const TOP_SCORES_TO_DISPLAY: usize = 3;

/// Longest accepted leaderboard name (in chars).
pub const MAX_NAME_LEN: usize = 15;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_round_defaults() {
        assert_eq!(BOARD_ROWS, 8);
        assert_eq!(BOARD_COLS, 6);
        assert_eq!(MIN_MATCH_LENGTH, 2);
        assert_eq!(ROUND_DURATION_SECS, 60);
        assert_eq!(DISSOLVE_MS, 300);
        assert_eq!(COLOR_BOMB_CHANCE_PERCENT, 5);
        assert_eq!(BOMB_POINTS_PER_BALL, 10);
        assert_eq!(MAX_HIGH_SCORES, 20);
        assert_eq!(MAX_NAME_LEN, 15);
    }

    #[test]
    fn position_adjacency_is_orthogonal_only() {
        let p = Position::new(3, 3);
        assert!(p.is_adjacent(Position::new(2, 3)));
        assert!(p.is_adjacent(Position::new(4, 3)));
        assert!(p.is_adjacent(Position::new(3, 2)));
        assert!(p.is_adjacent(Position::new(3, 4)));
        assert!(!p.is_adjacent(p));
        assert!(!p.is_adjacent(Position::new(4, 4)));
        assert!(!p.is_adjacent(Position::new(3, 5)));
    }

    #[test]
    fn color_codes_are_stable() {
        for (i, c) in BallColor::ALL.iter().enumerate() {
            assert_eq!(c.code() as usize, i + 1);
            assert_eq!(BallColor::from_code(c.code()), Some(*c));
            assert_eq!(BallColor::from_str(c.as_str()), Some(*c));
        }
        assert_eq!(BallColor::from_code(0), None);
        assert_eq!(BallColor::from_code(7), None);
    }

    #[test]
    fn board_layout_hit_test() {
        let layout = BoardLayout {
            origin_x: 1,
            origin_y: 1,
            cell_w: 2,
            cell_h: 1,
            rows: 8,
            cols: 6,
        };
        assert_eq!(layout.hit(1, 1), Some(Position::new(0, 0)));
        assert_eq!(layout.hit(2, 1), Some(Position::new(0, 0)));
        assert_eq!(layout.hit(3, 1), Some(Position::new(0, 1)));
        assert_eq!(layout.hit(12, 8), Some(Position::new(7, 5)));
        assert_eq!(layout.hit(0, 1), None);
        assert_eq!(layout.hit(13, 1), None);
        assert_eq!(layout.hit(1, 9), None);
    }
}

/// A board coordinate. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// True when `other` is exactly one step up, down, left or right.
    pub fn is_adjacent(&self, other: Position) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr + dc == 1
    }
}

/// Ball colors, in palette order.
///
/// Palettes smaller than six use the first N entries of [`BallColor::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BallColor {
    Yellow,
    Red,
    Blue,
    White,
    Black,
    Green,
}

impl BallColor {
    pub const ALL: [Self; 6] = [
        Self::Yellow,
        Self::Red,
        Self::Blue,
        Self::White,
        Self::Black,
        Self::Green,
    ];

    /// The first `n` colors (clamped to 1..=6).
    ///
    /// ```
    /// use color_connect_types::BallColor;
    ///
    /// assert_eq!(BallColor::palette(2), &[BallColor::Yellow, BallColor::Red]);
    /// assert_eq!(BallColor::palette(0).len(), 1);
    /// assert_eq!(BallColor::palette(99).len(), 6);
    /// ```
    pub fn palette(n: usize) -> &'static [BallColor] {
        static PALETTE: [BallColor; 6] = BallColor::ALL;
        &PALETTE[..n.clamp(1, PALETTE.len())]
    }

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use color_connect_types::BallColor;
    ///
    /// assert_eq!(BallColor::from_str("green"), Some(BallColor::Green));
    /// assert_eq!(BallColor::from_str("BLUE"), Some(BallColor::Blue));
    /// assert_eq!(BallColor::from_str("purple"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yellow" => Some(Self::Yellow),
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            "white" => Some(Self::White),
            "black" => Some(Self::Black),
            "green" => Some(Self::Green),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::White => "white",
            Self::Black => "black",
            Self::Green => "green",
        }
    }

    /// Wire code used by snapshots and the adapter (1..=6, 0 is empty).
    pub fn code(&self) -> u8 {
        match self {
            Self::Yellow => 1,
            Self::Red => 2,
            Self::Blue => 3,
            Self::White => 4,
            Self::Black => 5,
            Self::Green => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1..=6 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }
}

/// Power-ups a ball can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUp {
    /// Clears every ball of its own color when part of a committed chain.
    ColorBomb,
}

/// A ball on the board.
///
/// `id` is unique across the board and survives gravity moves; a token is
/// never edited in place, only removed or relocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    pub id: u32,
    pub color: BallColor,
    pub power_up: Option<PowerUp>,
}

impl Token {
    pub fn new(id: u32, color: BallColor) -> Self {
        Self {
            id,
            color,
            power_up: None,
        }
    }

    pub fn bomb(id: u32, color: BallColor) -> Self {
        Self {
            id,
            color,
            power_up: Some(PowerUp::ColorBomb),
        }
    }

    pub fn is_bomb(&self) -> bool {
        self.power_up == Some(PowerUp::ColorBomb)
    }
}

/// A cell on the board
///
/// - `None`: Empty cell (only observable mid-cascade)
/// - `Some(Token)`: Cell holding a ball
pub type Cell = Option<Token>;

/// Resolved pointer input. The core never sees raw device events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    /// Pointer pressed over a cell.
    Down(Position),
    /// Pointer moved into a cell while pressed.
    Enter(Position),
    /// Pointer released, anywhere.
    Up,
}

impl PointerEvent {
    /// Parse the adapter's pointer kind.
    ///
    /// `up` needs no position; `down` and `enter` require one.
    pub fn from_parts(kind: &str, pos: Option<Position>) -> Option<Self> {
        match (kind.to_lowercase().as_str(), pos) {
            ("down", Some(p)) => Some(Self::Down(p)),
            ("enter", Some(p)) => Some(Self::Enter(p)),
            ("up", _) => Some(Self::Up),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down(_) => "down",
            Self::Enter(_) => "enter",
            Self::Up => "up",
        }
    }
}

/// Round lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    NotStarted,
    Active,
    GameOver,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "notStarted",
            Self::Active => "active",
            Self::GameOver => "gameOver",
        }
    }
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOverReason {
    /// The clock reached zero.
    TimesUp,
    /// The stabilized board has no legal chain.
    NoMoves,
    /// The round was torn down from outside.
    Abandoned,
}

impl GameOverReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TimesUp => "timesUp",
            Self::NoMoves => "noMoves",
            Self::Abandoned => "abandoned",
        }
    }

    /// Player-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::TimesUp => "Time's up!",
            Self::NoMoves => "No more moves!",
            Self::Abandoned => "Round abandoned",
        }
    }
}

/// Where the board is drawn on screen.
///
/// Published by the view and consumed by the input layer to turn terminal
/// coordinates into board positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardLayout {
    /// Terminal column of the first cell's left edge.
    pub origin_x: u16,
    /// Terminal row of the first cell's top edge.
    pub origin_y: u16,
    pub cell_w: u16,
    pub cell_h: u16,
    pub rows: u8,
    pub cols: u8,
}

impl BoardLayout {
    /// Board position under terminal coordinate `(x, y)`, if any.
    pub fn hit(&self, x: u16, y: u16) -> Option<Position> {
        if self.cell_w == 0 || self.cell_h == 0 || x < self.origin_x || y < self.origin_y {
            return None;
        }
        let col = (x - self.origin_x) / self.cell_w;
        let row = (y - self.origin_y) / self.cell_h;
        if row >= self.rows as u16 || col >= self.cols as u16 {
            return None;
        }
        Some(Position::new(row as u8, col as u8))
    }
}
