//! Engine configuration
//!
//! Every knob of a round lives here. Defaults match the reference game; the
//! terminal runner overrides a few of them from the environment.

use std::env;

use tracing::warn;

use crate::types::{
    BallColor, BOARD_COLS, BOARD_ROWS, BOMB_POINTS_PER_BALL, COLOR_BOMB_CHANCE_PERCENT,
    DISSOLVE_MS, MAX_GENERATION_ATTEMPTS, MIN_MATCH_LENGTH, ROUND_DURATION_SECS,
};

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub rows: u8,
    pub cols: u8,
    /// Number of colors in play, taken from the front of [`BallColor::ALL`] (1..=6).
    pub palette_size: u8,
    pub min_match_len: usize,
    pub round_secs: i32,
    /// Suspension between a committed match and its cascade.
    pub dissolve_ms: u32,
    pub bomb_chance_percent: u32,
    pub bomb_points_per_ball: u32,
    pub max_generation_attempts: u32,
    pub seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rows: BOARD_ROWS,
            cols: BOARD_COLS,
            palette_size: BallColor::ALL.len() as u8,
            min_match_len: MIN_MATCH_LENGTH,
            round_secs: ROUND_DURATION_SECS,
            dissolve_ms: DISSOLVE_MS,
            bomb_chance_percent: COLOR_BOMB_CHANCE_PERCENT,
            bomb_points_per_ball: BOMB_POINTS_PER_BALL,
            max_generation_attempts: MAX_GENERATION_ATTEMPTS,
            seed: 1,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `COLOR_CONNECT_SEED`, `COLOR_CONNECT_DURATION_SECS`
    /// and `COLOR_CONNECT_PALETTE`.
    ///
    /// Without an explicit seed the wall clock is used.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.seed = match env_parse::<u32>("COLOR_CONNECT_SEED") {
            Some(seed) => seed,
            None => clock_seed(),
        };
        if let Some(secs) = env_parse::<i32>("COLOR_CONNECT_DURATION_SECS") {
            config.round_secs = secs;
        }
        if let Some(n) = env_parse::<u8>("COLOR_CONNECT_PALETTE") {
            config.palette_size = n;
        }

        config.normalized()
    }

    /// Clamp values into ranges the engine can play with.
    pub fn normalized(mut self) -> Self {
        let max_palette = BallColor::ALL.len() as u8;
        if self.palette_size == 0 || self.palette_size > max_palette {
            warn!(palette_size = self.palette_size, "palette size out of range, clamping");
            self.palette_size = self.palette_size.clamp(1, max_palette);
        }
        if self.rows == 0 || self.cols == 0 {
            warn!(rows = self.rows, cols = self.cols, "empty board requested, using defaults");
            self.rows = BOARD_ROWS;
            self.cols = BOARD_COLS;
        }
        if self.round_secs <= 0 {
            warn!(round_secs = self.round_secs, "non-positive round length, using default");
            self.round_secs = ROUND_DURATION_SECS;
        }
        self.min_match_len = self.min_match_len.max(1);
        self.bomb_chance_percent = self.bomb_chance_percent.min(100);
        self.max_generation_attempts = self.max_generation_attempts.max(1);
        self
    }

    /// Colors in play.
    pub fn palette(&self) -> &'static [BallColor] {
        BallColor::palette(self.palette_size as usize)
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable environment value");
            None
        }
    }
}

fn clock_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u32 ^ d.as_secs() as u32)
        .unwrap_or(1)
}
