use crate::config::atomic_rename;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub(crate) const SCORES_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct ScoreFile {
    pub(crate) version: u32,
    pub(crate) updated_utc: DateTime<Utc>,
    pub(crate) best_score: i32,
    pub(crate) best_level: i32,
}

impl ScoreFile {
    pub(crate) fn new() -> Self {
        Self {
            version: SCORES_VERSION,
            updated_utc: Utc::now(),
            best_score: 0,
            best_level: 1,
        }
    }

    pub(crate) fn record(&mut self, score: i32, level: i32) -> bool {
        let mut changed = false;
        if score > self.best_score {
            self.best_score = score;
            changed = true;
        }
        if level > self.best_level {
            self.best_level = level;
            changed = true;
        }
        if changed {
            self.updated_utc = Utc::now();
        }
        changed
    }
}

pub(crate) fn load_or_init_scores(path: &Path) -> ScoreFile {
    if let Ok(s) = fs::read_to_string(path) {
        if let Ok(v) = serde_json::from_str::<ScoreFile>(&s) {
            return v;
        }
    }
    ScoreFile::new()
}

pub(crate) fn save_scores_atomic(path: &Path, scores: &ScoreFile) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(scores)?;
    fs::write(&tmp, data)?;
    atomic_rename(&tmp, path)?;
    Ok(())
}
