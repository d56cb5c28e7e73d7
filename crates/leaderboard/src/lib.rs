//! High score leaderboard
//!
//! The game talks to the leaderboard through the [`Leaderboard`] trait: fetch
//! the ranked list, submit a finished round. Two stores ship with the crate:
//!
//! - [`FileLeaderboard`]: JSON file under `$XDG_CONFIG_HOME/color-connect/`
//! - [`MemoryLeaderboard`]: in-process list for tests and offline play
//!
//! The list is sorted by score (highest first) and never holds more than
//! [`MAX_HIGH_SCORES`] entries. Ties keep the older entry ahead.
//!
//! # Example
//!
//! ```
//! use color_connect_leaderboard::{Leaderboard, MemoryLeaderboard, qualifies};
//!
//! let mut board = MemoryLeaderboard::default();
//! board.submit("  ada  ", 420).unwrap();
//! let list = board.fetch().unwrap();
//! assert_eq!(list[0].name, "ada");
//! assert!(qualifies(&list, 10));
//! ```

mod date;
mod file;
mod memory;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use color_connect_types::{MAX_HIGH_SCORES, MAX_NAME_LEN, TOP_SCORES_TO_DISPLAY};
pub use date::{format_date, today};
pub use file::{default_scores_path, FileLeaderboard};
pub use memory::MemoryLeaderboard;

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
    /// `dd.mm.yyyy`
    pub date: String,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt score file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("name must not be blank")]
    InvalidName,
    #[error("score must be positive")]
    InvalidScore,
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;

/// Port to a high score store.
pub trait Leaderboard {
    /// Ranked list, best first.
    fn fetch(&self) -> Result<Vec<HighScoreEntry>>;

    /// Record a finished round and return the updated list.
    fn submit(&mut self, name: &str, score: u32) -> Result<Vec<HighScoreEntry>>;
}

/// Validate and normalize a submission into an entry dated `date`.
///
/// The name is trimmed and cut to [`MAX_NAME_LEN`] characters.
pub fn make_entry(name: &str, score: u32, date: String) -> Result<HighScoreEntry> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LeaderboardError::InvalidName);
    }
    if score == 0 {
        return Err(LeaderboardError::InvalidScore);
    }
    Ok(HighScoreEntry {
        name: name.chars().take(MAX_NAME_LEN).collect::<String>().trim_end().to_string(),
        score,
        date,
    })
}

/// Insert `entry` after every entry scoring at least as much, then cap.
pub fn insert_ranked(list: &mut Vec<HighScoreEntry>, entry: HighScoreEntry) {
    let at = list.partition_point(|e| e.score >= entry.score);
    list.insert(at, entry);
    list.truncate(MAX_HIGH_SCORES);
}

/// Sort best first (stable) and cap. Used on data read from storage.
pub fn normalize(list: &mut Vec<HighScoreEntry>) {
    list.sort_by(|a, b| b.score.cmp(&a.score));
    list.truncate(MAX_HIGH_SCORES);
}

/// Whether a finished round with `score` earns a place on the board.
pub fn qualifies(list: &[HighScoreEntry], score: u32) -> bool {
    if score == 0 {
        return false;
    }
    if list.len() < MAX_HIGH_SCORES {
        return true;
    }
    list.get(MAX_HIGH_SCORES - 1)
        .is_some_and(|last| score > last.score)
}

/// Rank a running score would have right now, if it could make the board.
///
/// Rank is one plus the number of strictly better entries.
pub fn provisional_rank(list: &[HighScoreEntry], score: u32) -> Option<usize> {
    if score == 0 {
        return None;
    }
    let better = list.iter().filter(|e| e.score > score).count();
    let rank = better + 1;
    let last = list
        .get(MAX_HIGH_SCORES - 1)
        .map(|e| e.score)
        .unwrap_or(0);
    let on_board = list.len() < MAX_HIGH_SCORES || score > last;
    (rank <= MAX_HIGH_SCORES && on_board).then_some(rank)
}

/// The first [`TOP_SCORES_TO_DISPLAY`] entries.
pub fn top(list: &[HighScoreEntry]) -> &[HighScoreEntry] {
    &list[..list.len().min(TOP_SCORES_TO_DISPLAY)]
}
