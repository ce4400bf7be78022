//! Normalisering av lagret øvelseskonfigurasjon til en validert, uforanderlig
//! `ExerciseProfile`.
//!
//! All gjetting (joints fra tittel/type, eldre feltnavn, defaults) skjer her
//! og bare her. Evaluatoren ser kun den ferdige profilen.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProfileError;
use crate::models::JointSet;
use crate::types::{ExerciseConfig, TargetsConfig};

pub const DEFAULT_UP_ANGLE: f64 = 90.0;
pub const DEFAULT_DOWN_ANGLE: f64 = 140.0;
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.2;
pub const DEFAULT_MIN_REP_DURATION_MS: f64 = 400.0;

pub const DEFAULT_ALLOWED_TILT_DEG: f64 = 12.0;
pub const DEFAULT_ELBOW_TOLERANCE_DEG: f64 = 15.0;
pub const DEFAULT_TARGET_MIN_SCORE: f64 = 0.35;
pub const DEFAULT_KNEE_RANGE: Range = Range { min: 80.0, max: 110.0 };
pub const DEFAULT_TORSO_MAX_LEAN_DEG: f64 = 25.0;
pub const DEFAULT_BOTTOM_RANGE: Range = Range { min: 70.0, max: 100.0 };
pub const DEFAULT_TOP_RANGE: Range = Range { min: 150.0, max: 180.0 };

/// Lukket intervall i grader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TPoseTargets {
    pub allowed_tilt_deg: f64,
    pub elbow_tolerance_deg: f64,
    pub min_score: f64,
    pub correct_message: Option<String>,
    pub incorrect_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquatTargets {
    pub knee_range: Range,
    pub hip_range: Option<Range>,
    /// Allerede løst: eksplisitt verdi, ellers 180 - backMin, ellers 25°.
    pub torso_max_lean_deg: f64,
    pub arm_max_tilt_deg: Option<f64>,
    pub min_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacyRanges {
    pub bottom_range: Range,
    pub top_range: Range,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Targets {
    StaticHold(TPoseTargets),
    StaticSquatHold(SquatTargets),
    DynamicRange { target_range: Range },
    Legacy(LegacyRanges),
}

impl Targets {
    pub fn target_range(&self) -> Option<Range> {
        match self {
            Targets::DynamicRange { target_range } => Some(*target_range),
            _ => None,
        }
    }
}

/// Om økten teller repetisjoner eller måler ett statisk hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Counting {
    Reps,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseProfile {
    pub title: Option<String>,
    pub joints: JointSet,
    pub up_angle_deg: f64,
    pub down_angle_deg: f64,
    pub smoothing_alpha: f64,
    pub min_rep_duration_ms: f64,
    pub counting: Counting,
    pub targets: Targets,
}

impl ExerciseProfile {
    /// Bygg og valider fra lagret konfigurasjon.
    pub fn from_config(cfg: &ExerciseConfig) -> Result<Self, ProfileError> {
        let targets_cfg = cfg.targets.clone().unwrap_or_default();
        let kind = targets_cfg
            .kind
            .as_deref()
            .map(|k| k.trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty() && k != "none");

        let joints = match cfg.joints.as_deref() {
            Some(j) => parse_joints(j)?,
            None => guess_joints(kind.as_deref(), cfg.title.as_deref()),
        };

        let up = finite("upAngle", cfg.up_angle.unwrap_or(DEFAULT_UP_ANGLE))?;
        let down = finite("downAngle", cfg.down_angle.unwrap_or(DEFAULT_DOWN_ANGLE))?;
        let alpha = bounded(
            "smoothingAlpha",
            cfg.smoothing_alpha.unwrap_or(DEFAULT_SMOOTHING_ALPHA),
            0.0,
            1.0,
        )?;
        let min_rep = non_negative(
            "minRepDurationMs",
            cfg.min_rep_duration_ms.unwrap_or(DEFAULT_MIN_REP_DURATION_MS),
        )?;

        let targets = build_targets(kind.as_deref(), &targets_cfg)?;
        let counting = resolve_counting(&targets, targets_cfg.mode.as_deref())?;

        // Tersklene brukes bare når vi teller reps
        if counting == Counting::Reps && up >= down {
            return Err(ProfileError::ThresholdOrder { up, down });
        }

        Ok(Self {
            title: cfg.title.clone(),
            joints,
            up_angle_deg: up,
            down_angle_deg: down,
            smoothing_alpha: alpha,
            min_rep_duration_ms: min_rep,
            counting,
            targets,
        })
    }

    /// Parse JSON og bygg profil. Parse-feil rapporteres med JSON-sti.
    pub fn from_json(txt: &str) -> Result<Self, ProfileError> {
        let cfg: ExerciseConfig = parse_json(txt)?;
        Self::from_config(&cfg)
    }

    /// Knebøy-mål: kvalitet låses når bunnen nås. Andre kne-øvelser
    /// scores som vanlige reps.
    pub fn is_squat(&self) -> bool {
        matches!(self.targets, Targets::StaticSquatHold(_))
    }

    pub fn is_static(&self) -> bool {
        self.counting == Counting::Hold
    }
}

fn parse_joints(s: &str) -> Result<JointSet, ProfileError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "knee" | "knees" => Ok(JointSet::Knee),
        "arm" | "arms" | "elbow" => Ok(JointSet::Arm),
        "shoulder" | "shoulders" => Ok(JointSet::Shoulder),
        other => Err(ProfileError::UnknownJoints(other.to_string())),
    }
}

/// JSON → `T`; feil bærer JSON-stien (f.eks. `targets.kneeRange[1]`).
pub(crate) fn parse_json<T: DeserializeOwned>(txt: &str) -> Result<T, ProfileError> {
    let mut de = serde_json::Deserializer::from_str(txt);
    serde_path_to_error::deserialize(&mut de).map_err(|e| ProfileError::Parse {
        path: e.path().to_string(),
        message: e.inner().to_string(),
    })
}

/// Brukervennlighets-heuristikk når joints mangler i lagret data.
fn guess_joints(kind: Option<&str>, title: Option<&str>) -> JointSet {
    match kind {
        Some("tpose") => return JointSet::Arm,
        Some("squat") => return JointSet::Knee,
        _ => {}
    }
    let title = title.unwrap_or_default().to_lowercase();
    if title.contains("arm") || title.contains("elbow") {
        JointSet::Arm
    } else {
        JointSet::Knee
    }
}

fn build_targets(kind: Option<&str>, t: &TargetsConfig) -> Result<Targets, ProfileError> {
    match kind {
        Some("tpose") => Ok(Targets::StaticHold(TPoseTargets {
            allowed_tilt_deg: non_negative(
                "allowedTiltDeg",
                t.allowed_tilt_deg.unwrap_or(DEFAULT_ALLOWED_TILT_DEG),
            )?,
            elbow_tolerance_deg: non_negative(
                "elbowToleranceDeg",
                t.elbow_tolerance_deg.unwrap_or(DEFAULT_ELBOW_TOLERANCE_DEG),
            )?,
            min_score: min_score(t.min_score)?,
            correct_message: t.correct_message.clone().filter(|m| !m.trim().is_empty()),
            incorrect_message: t.incorrect_message.clone().filter(|m| !m.trim().is_empty()),
        })),
        Some("squat") => {
            let torso_max_lean_deg = match (t.torso_max_lean_deg, t.back_min) {
                (Some(lean), _) => non_negative("torsoMaxLeanDeg", lean)?,
                (None, Some(back_min)) => {
                    let back_min = bounded("backMin", back_min, 0.0, 180.0)?;
                    180.0 - back_min
                }
                (None, None) => DEFAULT_TORSO_MAX_LEAN_DEG,
            };
            Ok(Targets::StaticSquatHold(SquatTargets {
                knee_range: range("kneeRange", t.knee_range)?.unwrap_or(DEFAULT_KNEE_RANGE),
                hip_range: range("hipRange", t.hip_range)?,
                torso_max_lean_deg,
                arm_max_tilt_deg: t
                    .arm_max_tilt_deg
                    .map(|v| non_negative("armMaxTiltDeg", v))
                    .transpose()?,
                min_score: min_score(t.min_score)?,
            }))
        }
        Some("range") | Some("dynamic") | Some("dynamic_range") => match range("targetRange", t.target_range)? {
            Some(target_range) => Ok(Targets::DynamicRange { target_range }),
            None => Err(ProfileError::Parse {
                path: "targets.targetRange".into(),
                message: "dynamic range target requires targetRange".into(),
            }),
        },
        Some(other) => Err(ProfileError::UnknownTargetType(other.to_string())),
        None => {
            if let Some(target_range) = range("targetRange", t.target_range)? {
                return Ok(Targets::DynamicRange { target_range });
            }
            Ok(Targets::Legacy(LegacyRanges {
                bottom_range: range("bottomRange", t.bottom_range)?.unwrap_or(DEFAULT_BOTTOM_RANGE),
                top_range: range("topRange", t.top_range)?.unwrap_or(DEFAULT_TOP_RANGE),
            }))
        }
    }
}

fn resolve_counting(targets: &Targets, mode: Option<&str>) -> Result<Counting, ProfileError> {
    let mode = match mode.map(|m| m.trim().to_ascii_lowercase()) {
        None => None,
        Some(m) if m.is_empty() => None,
        Some(m) if m == "hold" || m == "static" => Some(Counting::Hold),
        Some(m) if m == "reps" || m == "dynamic" => Some(Counting::Reps),
        Some(m) => return Err(ProfileError::UnknownMode(m)),
    };
    Ok(match targets {
        Targets::StaticHold(_) => Counting::Hold,
        Targets::StaticSquatHold(_) => mode.unwrap_or(Counting::Reps),
        Targets::DynamicRange { .. } | Targets::Legacy(_) => Counting::Reps,
    })
}

fn finite(field: &'static str, value: f64) -> Result<f64, ProfileError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ProfileError::NonFinite { field, value })
    }
}

fn bounded(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ProfileError> {
    let value = finite(field, value)?;
    if value < min || value > max {
        return Err(ProfileError::OutOfBounds { field, value, min, max });
    }
    Ok(value)
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, ProfileError> {
    bounded(field, value, 0.0, f64::MAX)
}

fn min_score(value: Option<f64>) -> Result<f64, ProfileError> {
    bounded("minScore", value.unwrap_or(DEFAULT_TARGET_MIN_SCORE), 0.0, 1.0)
}

fn range(field: &'static str, raw: Option<[f64; 2]>) -> Result<Option<Range>, ProfileError> {
    let Some([min, max]) = raw else {
        return Ok(None);
    };
    let min = finite(field, min)?;
    let max = finite(field, max)?;
    if min > max {
        return Err(ProfileError::InvertedRange { field, min, max });
    }
    Ok(Some(Range::new(min, max)))
}
