//! File-backed leaderboard that receives the final record of each run.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use robot_rescue_core::LeaderboardRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of entries shown after a run.
pub(crate) const DISPLAYED_ENTRIES: usize = 10;

/// Leaderboard entries ordered by score, best first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Leaderboard {
    #[serde(default)]
    entries: Vec<LeaderboardRecord>,
}

/// Result of adding a record to the leaderboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Placement {
    /// One-based position of the new record.
    pub(crate) rank: usize,
    /// Whether the record beat every previous entry.
    pub(crate) new_high_score: bool,
}

impl Leaderboard {
    /// Loads the leaderboard, treating a missing file as empty.
    pub(crate) fn load(path: &Path) -> Result<Self, LeaderboardError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(LeaderboardError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut board: Self = toml::from_str(&contents).map_err(|source| {
            LeaderboardError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        board.sort();
        Ok(board)
    }

    /// Adds a record and reports where it landed.
    ///
    /// Records with equal scores keep their arrival order.
    pub(crate) fn record(&mut self, record: LeaderboardRecord) -> Placement {
        let new_high_score = record.is_new_high_score(&self.entries);
        let rank = self
            .entries
            .iter()
            .take_while(|entry| entry.score >= record.score)
            .count();
        self.entries.insert(rank, record);
        Placement {
            rank: rank + 1,
            new_high_score,
        }
    }

    /// Writes every entry back to disk.
    pub(crate) fn save(&self, path: &Path) -> Result<(), LeaderboardError> {
        let contents = toml::to_string(self)?;
        fs::write(path, contents).map_err(|source| LeaderboardError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The best `count` entries.
    #[must_use]
    pub(crate) fn top(&self, count: usize) -> &[LeaderboardRecord] {
        &self.entries[..count.min(self.entries.len())]
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
    }
}

/// Errors raised by the leaderboard store.
#[derive(Debug, Error)]
pub(crate) enum LeaderboardError {
    /// The leaderboard file exists but could not be read.
    #[error("failed to read leaderboard {}", path.display())]
    Read {
        /// Leaderboard location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The leaderboard file is malformed.
    #[error("failed to parse leaderboard {}", path.display())]
    Parse {
        /// Leaderboard location.
        path: PathBuf,
        /// Parser failure.
        #[source]
        source: toml::de::Error,
    },
    /// The leaderboard could not be serialised.
    #[error("failed to serialise leaderboard")]
    Serialize(#[from] toml::ser::Error),
    /// The leaderboard could not be written.
    #[error("failed to write leaderboard {}", path.display())]
    Write {
        /// Leaderboard location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
