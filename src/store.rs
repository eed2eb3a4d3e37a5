//! Score persistence: the bounded result history, the best-run keystroke
//! timeline, and the high-score scalar, each in its own JSON file.
//!
//! Absent or unreadable files load as empty/zero defaults, and write
//! failures are swallowed; a broken state directory degrades the trainer
//! to scoreless play, it never interrupts a live session.

use crate::app_dirs::AppDirs;
use crate::config::Mode;
use crate::session::Keystroke;
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// History keeps this many results, newest first.
pub const HISTORY_CAP: usize = 10;

const HISTORY_FILE: &str = "history.json";
const BEST_RUN_FILE: &str = "best_run.json";
const HIGH_SCORE_FILE: &str = "high_score.json";

/// Outcome of one finished session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunRecord {
    pub wpm: u32,
    pub accuracy: u32,
    pub timestamp: DateTime<Local>,
    pub mode: Mode,
}

/// Keystroke timeline of the highest-scoring run, replayed as the ghost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BestRun {
    pub keystrokes: Vec<Keystroke>,
    pub wpm: u32,
}

#[derive(Debug, Clone)]
pub struct ScoreStore {
    dir: PathBuf,
}

impl ScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let dir = AppDirs::state_dir().unwrap_or_else(|| PathBuf::from("typespeed_state"));
        Self { dir }
    }

    pub fn with_dir<P: AsRef<Path>>(p: P) -> Self {
        Self {
            dir: p.as_ref().to_path_buf(),
        }
    }

    /// Past results, newest first. At most [`HISTORY_CAP`] entries.
    pub fn history(&self) -> Vec<RunRecord> {
        self.read_json(HISTORY_FILE).unwrap_or_default()
    }

    /// Prepend a result, trim to the cap, persist. Returns the new history.
    pub fn record_result(&self, result: &RunRecord) -> Vec<RunRecord> {
        let mut history = self.history();
        history.insert(0, result.clone());
        history.truncate(HISTORY_CAP);
        self.write_json(HISTORY_FILE, &history);
        history
    }

    pub fn high_score(&self) -> u32 {
        self.read_json(HIGH_SCORE_FILE).unwrap_or(0)
    }

    pub fn best_run(&self) -> Option<BestRun> {
        self.read_json(BEST_RUN_FILE)
    }

    /// Replace the persisted best run when the candidate strictly beats the
    /// high score. Ties keep the earlier recorded ghost. Returns whether a
    /// new best was recorded.
    pub fn record_best_if_higher(&self, candidate_wpm: u32, keystrokes: &[Keystroke]) -> bool {
        if candidate_wpm <= self.high_score() {
            return false;
        }
        self.write_json(HIGH_SCORE_FILE, &candidate_wpm);
        self.write_json(
            BEST_RUN_FILE,
            &BestRun {
                keystrokes: keystrokes.to_vec(),
                wpm: candidate_wpm,
            },
        );
        true
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let bytes = fs::read(self.dir.join(name)).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) {
        if fs::create_dir_all(&self.dir).is_err() {
            return;
        }
        if let Ok(data) = serde_json::to_vec(value) {
            let _ = fs::write(self.dir.join(name), data);
        }
    }
}
