use crate::{insert_ranked, make_entry, today, HighScoreEntry, Leaderboard, Result};

/// Leaderboard kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeaderboard {
    entries: Vec<HighScoreEntry>,
}

impl MemoryLeaderboard {
    /// Seed with existing entries (re-sorted and capped).
    pub fn with_entries(mut entries: Vec<HighScoreEntry>) -> Self {
        crate::normalize(&mut entries);
        Self { entries }
    }
}

impl Leaderboard for MemoryLeaderboard {
    fn fetch(&self) -> Result<Vec<HighScoreEntry>> {
        Ok(self.entries.clone())
    }

    fn submit(&mut self, name: &str, score: u32) -> Result<Vec<HighScoreEntry>> {
        let entry = make_entry(name, score, today())?;
        insert_ranked(&mut self.entries, entry);
        Ok(self.entries.clone())
    }
}
