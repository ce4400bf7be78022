//! Formvurdering: (glattet vinkel, keypoints, profil) → dom.
//!
//! Ren funksjon uten tilstand. Fasen sendes inn fordi legacy-grenen vurderer
//! mot bunn- eller topp-intervallet avhengig av hvor i repen pasienten er.

use serde::Serialize;

use crate::geometry::{angle_at, elbow_flexion, lean_from_vertical, tilt_from_horizontal};
use crate::models::{JointName, JointSet, Keypoint, Phase, Point, Pose, Side};
use crate::profile::{ExerciseProfile, LegacyRanges, Range, SquatTargets, TPoseTargets, Targets};

/// Knevinkel mer enn dette under minimum gir "bad".
pub const SQUAT_TOO_DEEP_MARGIN_DEG: f64 = 5.0;
pub const LEGACY_BAND_DEG: f64 = 10.0;
pub const LEGACY_MAX_LEAN_DEG: f64 = 25.0;
pub const LEGACY_MIN_SCORE: f64 = 0.3;

pub const MSG_ARMS_NOT_VISIBLE: &str = "Move into frame so both arms are visible";
pub const MSG_SIDE_NOT_VISIBLE: &str = "Step back so your whole side is visible";
pub const MSG_TPOSE_GOOD: &str = "Great T-pose, hold it there";
pub const MSG_TPOSE_COMBINED: &str = "Straighten your elbows and bring your arms level with your shoulders";
pub const MSG_SQUAT_GOOD: &str = "Good squat position";
pub const MSG_RANGE_GOOD: &str = "Good range of motion";
pub const MSG_BACK_STRAIGHT: &str = "Keep your back straight";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Good,
    Caution,
    Bad,
    Info,
}

impl Level {
    fn severity(self) -> u8 {
        match self {
            Level::Info | Level::Good => 0,
            Level::Caution => 1,
            Level::Bad => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Good => "good",
            Level::Caution => "caution",
            Level::Bad => "bad",
            Level::Info => "info",
        }
    }
}

/// Diagnostikk for overlay/logg. Bare feltene grenen faktisk målte er satt.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Details {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knee_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hip_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torso_lean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arm_tilt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_tilt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_tilt: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_elbow_flex: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_elbow_flex: Option<f64>,
    /// Brudd i den rekkefølgen de ble oppdaget.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub level: Level,
    pub message: String,
    /// `None` kun for `info` (kunne ikke vurdere).
    pub in_range: Option<bool>,
    pub details: Details,
}

impl Evaluation {
    fn info(message: &str) -> Self {
        Self {
            level: Level::Info,
            message: message.to_string(),
            in_range: None,
            details: Details::default(),
        }
    }

    fn verdict(level: Level, message: impl Into<String>, in_range: bool, details: Details) -> Self {
        Self { level, message: message.into(), in_range: Some(in_range), details }
    }

    pub fn is_good(&self) -> bool {
        self.level == Level::Good
    }
}

/// Vurder én frame.
pub fn evaluate(angle: f64, pose: &Pose, profile: &ExerciseProfile, phase: Phase) -> Evaluation {
    match &profile.targets {
        Targets::StaticHold(t) => evaluate_tpose(pose, t),
        Targets::StaticSquatHold(t) => evaluate_squat(angle, pose, profile.joints, t),
        Targets::DynamicRange { target_range } => evaluate_range(angle, *target_range),
        Targets::Legacy(r) => evaluate_legacy(angle, pose, r, phase),
    }
}

/// Samme som [`evaluate`], men rett fra rå keypoints.
pub fn evaluate_keypoints(
    angle: f64,
    keypoints: &[Keypoint],
    profile: &ExerciseProfile,
    phase: Phase,
) -> Evaluation {
    evaluate(angle, &Pose::from_keypoints(keypoints), profile, phase)
}

// ──────────────────────────────────────────────────────────────────────────────
// T-pose
// ──────────────────────────────────────────────────────────────────────────────

struct Arm {
    side: Side,
    shoulder: Point,
    wrist: Point,
    tilt: f64,
}

impl Arm {
    /// Positiv = håndledd under skulder (bildets y peker ned).
    fn vertical_offset(&self) -> f64 {
        self.wrist.y - self.shoulder.y
    }
}

fn raise_or_lower(offset: f64) -> &'static str {
    if offset > 0.0 { "Raise" } else { "Lower" }
}

fn evaluate_tpose(pose: &Pose, t: &TPoseTargets) -> Evaluation {
    let min = t.min_score;
    let arm = |side: Side| -> Option<Arm> {
        let shoulder = pose.visible(JointName::shoulder(side), min)?;
        let wrist = pose.visible(JointName::wrist(side), min)?;
        let tilt = tilt_from_horizontal(shoulder, wrist)?;
        Some(Arm { side, shoulder, wrist, tilt })
    };
    let (Some(left), Some(right)) = (arm(Side::Left), arm(Side::Right)) else {
        return Evaluation::info(MSG_ARMS_NOT_VISIBLE);
    };

    // Albuer er valgfrie og vurderes parvis: er én skjult, hoppes albuesjekken
    // over for begge armer
    let flexion = |a: &Arm| -> Option<f64> {
        let elbow = pose.visible(JointName::elbow(a.side), min)?;
        elbow_flexion(a.shoulder, elbow, a.wrist)
    };
    let flex = match (flexion(&left), flexion(&right)) {
        (Some(l), Some(r)) => Some((l, r)),
        _ => None,
    };

    let details = Details {
        left_tilt: Some(left.tilt),
        right_tilt: Some(right.tilt),
        left_elbow_flex: flex.map(|f| f.0),
        right_elbow_flex: flex.map(|f| f.1),
        ..Details::default()
    };

    let tilt_bad = (left.tilt > t.allowed_tilt_deg, right.tilt > t.allowed_tilt_deg);
    let elbow_bad = flex.map_or((false, false), |(l, r)| {
        (l > t.elbow_tolerance_deg, r > t.elbow_tolerance_deg)
    });
    let any_tilt = tilt_bad.0 || tilt_bad.1;
    let any_elbow = elbow_bad.0 || elbow_bad.1;

    if !any_tilt && !any_elbow {
        let msg = t.correct_message.as_deref().unwrap_or(MSG_TPOSE_GOOD);
        return Evaluation::verdict(Level::Good, msg, true, details);
    }

    let worst_tilt = left.tilt.max(right.tilt);
    let level = if (any_tilt && any_elbow) || worst_tilt > 2.0 * t.allowed_tilt_deg {
        Level::Bad
    } else {
        Level::Caution
    };

    let message = if any_tilt && any_elbow {
        t.incorrect_message.clone().unwrap_or_else(|| MSG_TPOSE_COMBINED.to_string())
    } else if any_elbow {
        match elbow_bad {
            (true, true) => "Straighten both elbows".to_string(),
            (true, false) => "Straighten your left elbow".to_string(),
            _ => "Straighten your right elbow".to_string(),
        }
    } else if tilt_bad.0 != tilt_bad.1 {
        let bad = if tilt_bad.0 { &left } else { &right };
        format!(
            "{} your {} arm to shoulder height",
            raise_or_lower(bad.vertical_offset()),
            bad.side.as_str()
        )
    } else if let Some(custom) = &t.incorrect_message {
        custom.clone()
    } else {
        let mean_offset = 0.5 * (left.vertical_offset() + right.vertical_offset());
        format!("{} both arms to shoulder height", raise_or_lower(mean_offset))
    };

    Evaluation::verdict(level, message, false, details)
}

// ──────────────────────────────────────────────────────────────────────────────
// Knebøy
// ──────────────────────────────────────────────────────────────────────────────

/// Første oppdagede brudd bestemmer meldingen; nivået er det verste.
struct Violations {
    level: Level,
    message: Option<&'static str>,
    codes: Vec<&'static str>,
}

impl Violations {
    fn new() -> Self {
        Self { level: Level::Good, message: None, codes: Vec::new() }
    }

    fn push(&mut self, level: Level, code: &'static str, message: &'static str) {
        if level.severity() > self.level.severity() {
            self.level = level;
        }
        if self.message.is_none() {
            self.message = Some(message);
        }
        self.codes.push(code);
    }
}

fn evaluate_squat(angle: f64, pose: &Pose, joints: JointSet, t: &SquatTargets) -> Evaluation {
    let (side, _) = pose.best_side(|s| {
        vec![JointName::shoulder(s), JointName::hip(s), JointName::knee(s), JointName::ankle(s)]
    });
    let min = t.min_score;
    let (Some(shoulder), Some(hip), Some(knee), Some(ankle)) = (
        pose.visible(JointName::shoulder(side), min),
        pose.visible(JointName::hip(side), min),
        pose.visible(JointName::knee(side), min),
        pose.visible(JointName::ankle(side), min),
    ) else {
        return Evaluation::info(MSG_SIDE_NOT_VISIBLE);
    };

    // Når kneet er det sporede leddet er den glattede vinkelen kneets vinkel
    let knee_angle = match joints {
        JointSet::Knee => Some(angle),
        _ => angle_at(hip, knee, ankle),
    };
    let (Some(knee_angle), Some(hip_angle), Some(lean)) =
        (knee_angle, angle_at(shoulder, hip, knee), lean_from_vertical(shoulder, hip))
    else {
        return Evaluation::info(MSG_SIDE_NOT_VISIBLE);
    };
    let arm_tilt = pose
        .visible(JointName::wrist(side), min)
        .and_then(|wrist| tilt_from_horizontal(shoulder, wrist));

    let mut v = Violations::new();

    let torso_ok = lean <= t.torso_max_lean_deg;
    if !torso_ok {
        v.push(Level::Caution, "torso_lean", "Keep your chest up and your back straight");
    }

    let mut hip_ok = true;
    if let Some(hr) = t.hip_range {
        if hip_angle < hr.min {
            hip_ok = false;
            v.push(Level::Caution, "hip_low", "Don't fold forward, open your hips");
        } else if hip_angle > hr.max {
            hip_ok = false;
            v.push(Level::Caution, "hip_high", "Sit your hips back");
        }
    }

    let kr = t.knee_range;
    let knee_ok = kr.contains(knee_angle);
    if knee_angle > kr.max {
        v.push(Level::Caution, "knee_high", "Bend your knees a little more");
    } else if knee_angle < kr.min - SQUAT_TOO_DEEP_MARGIN_DEG {
        v.push(Level::Bad, "knee_too_deep", "Too deep, come up a little");
    } else if knee_angle < kr.min {
        v.push(Level::Caution, "knee_low", "Slightly too deep, ease up");
    }

    if let (Some(max_tilt), Some(tilt)) = (t.arm_max_tilt_deg, arm_tilt) {
        if tilt > max_tilt {
            v.push(Level::Caution, "arm_tilt", "Keep your arms level");
        }
    }

    let details = Details {
        side: Some(side),
        knee_angle: Some(knee_angle),
        hip_angle: Some(hip_angle),
        torso_lean: Some(lean),
        arm_tilt,
        violations: v.codes,
        ..Details::default()
    };
    let in_range = knee_ok && torso_ok && hip_ok;
    let message = v.message.unwrap_or(MSG_SQUAT_GOOD);
    Evaluation::verdict(v.level, message, in_range, details)
}

// ──────────────────────────────────────────────────────────────────────────────
// Generisk intervall (albue o.l.)
// ──────────────────────────────────────────────────────────────────────────────

fn evaluate_range(angle: f64, range: Range) -> Evaluation {
    if range.contains(angle) {
        Evaluation::verdict(Level::Good, MSG_RANGE_GOOD, true, Details::default())
    } else if angle < range.min {
        Evaluation::verdict(Level::Caution, "Extend a little more", false, Details::default())
    } else {
        Evaluation::verdict(Level::Caution, "Bend a little more", false, Details::default())
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Legacy: bunn/topp-intervall avhengig av fase
// ──────────────────────────────────────────────────────────────────────────────

fn evaluate_legacy(angle: f64, pose: &Pose, r: &LegacyRanges, phase: Phase) -> Evaluation {
    let at_bottom = phase == Phase::Up;
    let range = if at_bottom { r.bottom_range } else { r.top_range };

    let (mut level, mut message) = if range.contains(angle) {
        (Level::Good, if at_bottom { "Good depth" } else { "Good extension" })
    } else if angle > range.max {
        let near = angle - range.max <= LEGACY_BAND_DEG;
        match (at_bottom, near) {
            (true, true) => (Level::Caution, "Bend a little further"),
            (true, false) => (Level::Bad, "Bend further to reach the target"),
            (false, true) => (Level::Caution, "Ease back slightly"),
            (false, false) => (Level::Bad, "Ease back, you're overextending"),
        }
    } else {
        let near = range.min - angle <= LEGACY_BAND_DEG;
        match (at_bottom, near) {
            (true, true) => (Level::Caution, "Not quite so deep"),
            (true, false) => (Level::Bad, "Too deep, come up"),
            (false, true) => (Level::Caution, "Straighten up fully"),
            (false, false) => (Level::Bad, "Extend fully before the next rep"),
        }
    };

    let (side, _) = pose.best_side(|s| vec![JointName::shoulder(s), JointName::hip(s)]);
    let lean = match (
        pose.visible(JointName::shoulder(side), LEGACY_MIN_SCORE),
        pose.visible(JointName::hip(side), LEGACY_MIN_SCORE),
    ) {
        (Some(sh), Some(hip)) => lean_from_vertical(sh, hip),
        _ => None,
    };

    let mut details = Details { side: Some(side), torso_lean: lean, ..Details::default() };
    if lean.map_or(false, |l| l > LEGACY_MAX_LEAN_DEG) && level == Level::Good {
        level = Level::Caution;
        message = MSG_BACK_STRAIGHT;
        details.violations.push("torso_lean");
    }

    Evaluation::verdict(level, message, level == Level::Good, details)
}
