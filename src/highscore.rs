//! High score persistence
//!
//! The session only sees the [`HighScoreStore`] trait. The binary stores the
//! record as JSON in the platform data directory.

use crate::error::{Result, StorageError};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Load/save the best score across runs
pub trait HighScoreStore {
    /// Read the stored record; a store with nothing recorded returns 0
    fn load(&self) -> Result<u64>;

    fn save(&mut self, score: u64) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreFile {
    high_score: u64,
}

/// High score kept in `highscore.json`
#[derive(Debug, Clone)]
pub struct FileHighScoreStore {
    path: PathBuf,
}

impl FileHighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store under the platform data dir (~/.local/share/blockfall on Linux)
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "blockfall", "blockfall")
            .ok_or(StorageError::NoDirectory("data"))?;
        Ok(Self::new(dirs.data_dir().join("highscore.json")))
    }
}

impl HighScoreStore for FileHighScoreStore {
    fn load(&self) -> Result<u64> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let file: HighScoreFile = serde_json::from_str(&contents)?;
        Ok(file.high_score)
    }

    fn save(&mut self, score: u64) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = serde_json::to_string_pretty(&HighScoreFile { high_score: score })?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

/// Store with no backend: nothing is read, and the record only lives for
/// the lifetime of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScoreStore {
    high_score: u64,
}

impl HighScoreStore for MemoryHighScoreStore {
    fn load(&self) -> Result<u64> {
        Ok(self.high_score)
    }

    fn save(&mut self, score: u64) -> Result<()> {
        self.high_score = score;
        Ok(())
    }
}
