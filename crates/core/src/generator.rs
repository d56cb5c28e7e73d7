//! Board generator - random boards that are guaranteed playable
//!
//! Boards are rejection-sampled: fill every cell at random and retry until at
//! least one legal chain exists. After `max_generation_attempts` the last
//! board is kept anyway (logged as a warning) so a round can always start.

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::grid::Grid;
use crate::rng::SimpleRng;
use crate::types::{BallColor, Token};

/// Source of fresh tokens: unique ids, random colors, random bombs.
#[derive(Debug, Clone)]
pub struct TokenFactory {
    rng: SimpleRng,
    next_id: u32,
    palette: &'static [BallColor],
    bomb_chance_percent: u32,
}

impl TokenFactory {
    pub fn new(seed: u32, palette: &'static [BallColor], bomb_chance_percent: u32) -> Self {
        let palette = if palette.is_empty() {
            BallColor::palette(BallColor::ALL.len())
        } else {
            palette
        };
        Self {
            rng: SimpleRng::new(seed),
            next_id: 1,
            palette,
            bomb_chance_percent: bomb_chance_percent.min(100),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.seed, config.palette(), config.bomb_chance_percent)
    }

    /// Produce a new token. Color and bomb roll are independent.
    pub fn spawn(&mut self) -> Token {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let color = self.palette[self.rng.next_range(self.palette.len() as u32) as usize];
        if self.rng.chance(self.bomb_chance_percent) {
            Token::bomb(id, color)
        } else {
            Token::new(id, color)
        }
    }

    /// Make sure future ids are greater than `id`.
    pub fn reserve_past(&mut self, id: u32) {
        if self.next_id <= id {
            self.next_id = id.wrapping_add(1);
        }
    }

    /// Id the next spawned token will carry
    pub fn next_id(&self) -> u32 {
        self.next_id
    }
}

/// Result of [`generate`].
#[derive(Debug, Clone)]
pub struct Generated {
    pub grid: Grid,
    /// Boards sampled, including the returned one.
    pub attempts: u32,
    /// False only when the attempt cap was hit.
    pub has_match: bool,
}

/// Generate a starting board.
pub fn generate(config: &EngineConfig, factory: &mut TokenFactory) -> Generated {
    let max_attempts = config.max_generation_attempts.max(1);
    let mut attempts = 0;
    loop {
        attempts += 1;
        let grid = Grid::from_fn(config.rows, config.cols, |_| Some(factory.spawn()));
        let has_match = grid.has_any_match(config.min_match_len);
        if has_match {
            debug!(attempts, "generated playable board");
            return Generated {
                grid,
                attempts,
                has_match,
            };
        }
        if attempts >= max_attempts {
            warn!(
                attempts,
                "no playable board within attempt cap, keeping the last one"
            );
            return Generated {
                grid,
                attempts,
                has_match,
            };
        }
    }
}
