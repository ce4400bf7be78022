use serde::{Deserialize, Serialize};

use crate::models::Side;

/// Lagret øvelses-/mal-konfigurasjon, slik CRUD-laget leverer den.
/// Tolerant: godtar både camelCase og snake_case, alt er valgfritt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub joints: Option<String>,
    #[serde(default, alias = "upAngle", alias = "upAngleDeg", alias = "up_angle_deg")]
    pub up_angle: Option<f64>,
    #[serde(default, alias = "downAngle", alias = "downAngleDeg", alias = "down_angle_deg")]
    pub down_angle: Option<f64>,
    #[serde(default, alias = "smoothingAlpha", alias = "alpha")]
    pub smoothing_alpha: Option<f64>,
    #[serde(default, alias = "minRepDurationMs", alias = "minRepMs")]
    pub min_rep_duration_ms: Option<f64>,
    #[serde(default)]
    pub targets: Option<TargetsConfig>,
}

/// Løst typet `targets`-objekt. Normaliseres til `profile::Targets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetsConfig {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// "reps" | "hold" (kun squat)
    #[serde(default)]
    pub mode: Option<String>,

    // T-pose
    #[serde(default, alias = "allowedTiltDeg")]
    pub allowed_tilt_deg: Option<f64>,
    #[serde(default, alias = "elbowToleranceDeg")]
    pub elbow_tolerance_deg: Option<f64>,
    #[serde(default, alias = "minScore")]
    pub min_score: Option<f64>,
    #[serde(default, alias = "correctMessage")]
    pub correct_message: Option<String>,
    #[serde(default, alias = "incorrectMessage")]
    pub incorrect_message: Option<String>,

    // Squat
    #[serde(default, alias = "kneeRange")]
    pub knee_range: Option<[f64; 2]>,
    #[serde(default, alias = "hipRange")]
    pub hip_range: Option<[f64; 2]>,
    #[serde(default, alias = "torsoMaxLeanDeg")]
    pub torso_max_lean_deg: Option<f64>,
    /// Eldre felt: minste rygg-vinkel; gir maks lean = 180 - backMin.
    #[serde(default, alias = "backMin")]
    pub back_min: Option<f64>,
    #[serde(default, alias = "armMaxTiltDeg")]
    pub arm_max_tilt_deg: Option<f64>,

    // Dynamisk / legacy
    #[serde(default, alias = "targetRange")]
    pub target_range: Option<[f64; 2]>,
    #[serde(default, alias = "bottomRange")]
    pub bottom_range: Option<[f64; 2]>,
    #[serde(default, alias = "topRange")]
    pub top_range: Option<[f64; 2]>,
}

/// Motor-innstillinger som ikke hører til en enkelt øvelse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Score-gulv for vinkel-tripletten.
    #[serde(alias = "minKeypointScore")]
    pub min_keypoint_score: f64,
    /// Minste tid mellom to like talemeldinger.
    #[serde(alias = "speakMinGapMs")]
    pub speak_min_gap_ms: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_keypoint_score: 0.3,
            speak_min_gap_ms: 1800.0,
        }
    }
}

/// Sammendrag fra `finalize`/`snapshot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SummaryRecord {
    pub rep_count: u32,
    pub correct_reps: u32,
    pub incorrect_reps: u32,
    pub min_angle: Option<f64>,
    pub max_angle: Option<f64>,
    pub avg_angle: Option<f64>,
    pub time_in_target_ms: f64,
    pub time_in_target_sec: f64,
    pub out_of_range_count: u32,
    /// reps per minutt
    pub cadence: f64,
    pub quality: Vec<f64>,
    pub used_side: Option<Side>,
    pub sample_count: u64,
    pub duration_sec: f64,
}

/// Resultatdokumentet persistenslaget lagrer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultDocument {
    pub reps: u32,
    pub correct_reps: u32,
    pub incorrect_reps: u32,
    pub min_angle: Option<f64>,
    pub max_angle: Option<f64>,
    pub avg_angle: Option<f64>,
    pub time_in_target_ms: f64,
    pub out_of_range_count: u32,
    pub cadence: f64,
    pub quality: Vec<f64>,
}

impl From<&SummaryRecord> for ResultDocument {
    fn from(s: &SummaryRecord) -> Self {
        Self {
            reps: s.rep_count,
            correct_reps: s.correct_reps,
            incorrect_reps: s.incorrect_reps,
            min_angle: s.min_angle,
            max_angle: s.max_angle,
            avg_angle: s.avg_angle,
            time_in_target_ms: s.time_in_target_ms,
            out_of_range_count: s.out_of_range_count,
            cadence: s.cadence,
            quality: s.quality.clone(),
        }
    }
}
