use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Ett keypoint slik pose-leverandøren sender det (pikselrom, y peker nedover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(alias = "confidence")]
    pub score: f64,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64, score: f64) -> Self {
        Self { name: name.into(), x, y, score }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Fast joint-vokabular (COCO-17).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

const JOINT_COUNT: usize = 17;

static JOINT_LOOKUP: Lazy<HashMap<&'static str, JointName>> = Lazy::new(|| {
    JointName::ALL.iter().map(|j| (j.as_str(), *j)).collect()
});

impl JointName {
    pub const ALL: [JointName; JOINT_COUNT] = [
        JointName::Nose,
        JointName::LeftEye,
        JointName::RightEye,
        JointName::LeftEar,
        JointName::RightEar,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftWrist,
        JointName::RightWrist,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::LeftAnkle,
        JointName::RightAnkle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JointName::Nose => "nose",
            JointName::LeftEye => "left_eye",
            JointName::RightEye => "right_eye",
            JointName::LeftEar => "left_ear",
            JointName::RightEar => "right_ear",
            JointName::LeftShoulder => "left_shoulder",
            JointName::RightShoulder => "right_shoulder",
            JointName::LeftElbow => "left_elbow",
            JointName::RightElbow => "right_elbow",
            JointName::LeftWrist => "left_wrist",
            JointName::RightWrist => "right_wrist",
            JointName::LeftHip => "left_hip",
            JointName::RightHip => "right_hip",
            JointName::LeftKnee => "left_knee",
            JointName::RightKnee => "right_knee",
            JointName::LeftAnkle => "left_ankle",
            JointName::RightAnkle => "right_ankle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        JOINT_LOOKUP.get(name).copied()
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => JointName::LeftShoulder,
            Side::Right => JointName::RightShoulder,
        }
    }

    pub fn elbow(side: Side) -> Self {
        match side {
            Side::Left => JointName::LeftElbow,
            Side::Right => JointName::RightElbow,
        }
    }

    pub fn wrist(side: Side) -> Self {
        match side {
            Side::Left => JointName::LeftWrist,
            Side::Right => JointName::RightWrist,
        }
    }

    pub fn hip(side: Side) -> Self {
        match side {
            Side::Left => JointName::LeftHip,
            Side::Right => JointName::RightHip,
        }
    }

    pub fn knee(side: Side) -> Self {
        match side {
            Side::Left => JointName::LeftKnee,
            Side::Right => JointName::RightKnee,
        }
    }

    pub fn ankle(side: Side) -> Self {
        match side {
            Side::Left => JointName::LeftAnkle,
            Side::Right => JointName::RightAnkle,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Detected {
    point: Point,
    score: f64,
}

/// Én frame med keypoints, slått opp på joint-navn.
///
/// Ukjente navn og ikke-endelige verdier forkastes. Hvis samme navn
/// forekommer flere ganger vinner høyeste score.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    joints: [Option<Detected>; JOINT_COUNT],
    unknown_names: Vec<String>,
}

impl Pose {
    pub fn from_keypoints(keypoints: &[Keypoint]) -> Self {
        let mut pose = Pose::default();
        for kp in keypoints {
            let Some(joint) = JointName::from_name(&kp.name) else {
                if !pose.unknown_names.contains(&kp.name) {
                    pose.unknown_names.push(kp.name.clone());
                }
                continue;
            };
            if !(kp.x.is_finite() && kp.y.is_finite() && kp.score.is_finite()) {
                continue;
            }
            let slot = &mut pose.joints[joint.index()];
            let better = slot.map_or(true, |d| kp.score > d.score);
            if better {
                *slot = Some(Detected { point: Point::new(kp.x, kp.y), score: kp.score });
            }
        }
        pose
    }

    /// Score for joint, 0.0 hvis den mangler.
    pub fn score(&self, joint: JointName) -> f64 {
        self.joints[joint.index()].map_or(0.0, |d| d.score)
    }

    pub fn point(&self, joint: JointName) -> Option<Point> {
        self.joints[joint.index()].map(|d| d.point)
    }

    /// Punktet hvis score er minst `min_score`.
    pub fn visible(&self, joint: JointName, min_score: f64) -> Option<Point> {
        self.joints[joint.index()]
            .filter(|d| d.score >= min_score)
            .map(|d| d.point)
    }

    /// Laveste score blant leddene (0.0 hvis noen mangler).
    pub fn min_score(&self, joints: &[JointName]) -> f64 {
        joints
            .iter()
            .map(|j| self.score(*j))
            .fold(f64::INFINITY, f64::min)
            .min(1.0)
    }

    /// Velg siden med høyest minimum-score over leddene som `pick` gir.
    /// Likt → venstre.
    pub fn best_side(&self, pick: impl Fn(Side) -> Vec<JointName>) -> (Side, f64) {
        let left = self.min_score(&pick(Side::Left));
        let right = self.min_score(&pick(Side::Right));
        if right > left {
            (Side::Right, right)
        } else {
            (Side::Left, left)
        }
    }

    pub fn unknown_names(&self) -> &[String] {
        &self.unknown_names
    }
}

/// Hvilket vinkel-triplett som spores (toppunktet står i midten).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointSet {
    Knee,
    Arm,
    Shoulder,
}

impl JointSet {
    pub fn triad(self, side: Side) -> [JointName; 3] {
        match self {
            JointSet::Knee => [JointName::hip(side), JointName::knee(side), JointName::ankle(side)],
            JointSet::Arm => [JointName::shoulder(side), JointName::elbow(side), JointName::wrist(side)],
            JointSet::Shoulder => [JointName::elbow(side), JointName::shoulder(side), JointName::hip(side)],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JointSet::Knee => "knee",
            JointSet::Arm => "arm",
            JointSet::Shoulder => "shoulder",
        }
    }
}

/// Fase i rep/hold-tilstandsmaskinen.
///
/// `Up` betyr at vinkelen har krysset under `up_angle_deg` (bunnen av en
/// knebøy, toppen av en bicepscurl).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Down,
    Up,
    Hold,
}

/// Per-frame vinkelmåling etter glatting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngleSample {
    pub raw: f64,
    pub smoothed: f64,
    pub timestamp_ms: f64,
    pub side: Side,
    pub in_range: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepEvent {
    pub index: u32,
    pub quality_score: f64,
    pub timestamp_ms: f64,
    pub correct: bool,
}
