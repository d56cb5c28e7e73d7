//! Persist the leaderboard as JSON (XDG config or ~/.config/color-connect).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{insert_ranked, make_entry, normalize, today, HighScoreEntry, Leaderboard, Result};

const DIR_NAME: &str = "color-connect";
const FILENAME: &str = "highscores.json";

/// Default location of the score file (config dir / color-connect / highscores.json).
pub fn default_scores_path() -> PathBuf {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(DIR_NAME).join(FILENAME)
}

/// Leaderboard stored in a JSON file.
#[derive(Debug, Clone)]
pub struct FileLeaderboard {
    path: PathBuf,
}

impl FileLeaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `COLOR_CONNECT_SCORES_PATH` if set, else [`default_scores_path`].
    pub fn from_env() -> Self {
        match std::env::var("COLOR_CONNECT_SCORES_PATH") {
            Ok(p) if !p.trim().is_empty() => Self::new(p.trim()),
            _ => Self::new(default_scores_path()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<HighScoreEntry>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no score file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let mut list: Vec<HighScoreEntry> = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "score file unreadable");
            e
        })?;
        normalize(&mut list);
        Ok(list)
    }

    /// Writes a sibling temp file, then renames it over the real one.
    fn save(&self, list: &[HighScoreEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(list)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Leaderboard for FileLeaderboard {
    fn fetch(&self) -> Result<Vec<HighScoreEntry>> {
        self.load()
    }

    fn submit(&mut self, name: &str, score: u32) -> Result<Vec<HighScoreEntry>> {
        let entry = make_entry(name, score, today())?;
        let mut list = self.load()?;
        insert_ranked(&mut list, entry);
        self.save(&list)?;
        Ok(list)
    }
}
