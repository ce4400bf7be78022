use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::profile::parse_json;
use crate::types::{EngineConfig, ExerciseConfig, ResultDocument, SummaryRecord};

/// Ferdig økt slik den skrives til disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub exercise_title: Option<String>,
    pub result: ResultDocument,
}

impl StoredSession {
    pub fn new(exercise_title: Option<String>, summary: &SummaryRecord) -> Self {
        Self {
            recorded_at: Utc::now(),
            exercise_title,
            result: ResultDocument::from(summary),
        }
    }
}

/// Leser øvelseskonfig fra disk (JSON). Parse-feil rapporteres med JSON-sti.
pub fn load_exercise_config(path: impl AsRef<Path>) -> Result<ExerciseConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let cfg: ExerciseConfig = parse_json(&contents)?;
    info!("exercise config loaded from {} (title={:?})", path.display(), cfg.title);
    Ok(cfg)
}

/// Leser motor-konfig. Hvis filen ikke finnes, returneres defaults.
pub fn load_engine_config(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("no engine config at {}, using defaults", path.display());
        return Ok(EngineConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let cfg: EngineConfig = parse_json(&contents)?;
    info!("engine config loaded from {}", path.display());
    Ok(cfg)
}

/// Lagrer økt til disk som JSON (pretty-print).
pub fn save_session_record(record: &StoredSession, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    info!(
        "session saved to {} (reps={}, correct={})",
        path.display(),
        record.result.reps,
        record.result.correct_reps
    );
    Ok(())
}

pub fn load_session_record(path: impl AsRef<Path>) -> Result<StoredSession> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&contents)?)
}
