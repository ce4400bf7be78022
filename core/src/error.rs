use thiserror::Error;

/// Ugyldig øvelseskonfigurasjon. Avvises når profilen bygges, aldri senere.
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfBounds { field: &'static str, value: f64, min: f64, max: f64 },

    #[error("{field} is inverted: min {min} > max {max}")]
    InvertedRange { field: &'static str, min: f64, max: f64 },

    #[error("upAngle ({up}) must be below downAngle ({down})")]
    ThresholdOrder { up: f64, down: f64 },

    #[error("unknown joints '{0}' (expected knee, arm or shoulder)")]
    UnknownJoints(String),

    #[error("unknown target type '{0}'")]
    UnknownTargetType(String),

    #[error("unknown counting mode '{0}' (expected reps or hold)")]
    UnknownMode(String),

    #[error("exercise config parse at {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("telemetry: {0}")]
    Telemetry(#[from] prometheus::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
