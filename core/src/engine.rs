//! Én øvingsøkt: keypoints inn per frame, tilbakemelding og metrikker ut.
//!
//! Verten kaller `process_frame` én gang per pose-resultat og bestemmer selv
//! takten. Alt er synkront. `process_frame` tar `&mut self`; å kalle den
//! parallelt for samme økt over FFI er en programmeringsfeil.

use std::collections::HashSet;

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{ProfileError, Result};
use crate::evaluator::{evaluate, Evaluation, Level};
use crate::geometry::angle_at;
use crate::metrics::{resolve_in_range, MetricsAggregator, SessionMetrics};
use crate::models::{AngleSample, JointName, Keypoint, Phase, Pose, RepEvent, Side};
use crate::profile::{parse_json, ExerciseProfile, Targets};
use crate::smoothing::Ema;
use crate::state_machine::RepStateMachine;
use crate::telemetry::EngineCounters;
use crate::throttle::FeedbackThrottler;
use crate::types::{EngineConfig, SummaryRecord};

/// Hvorfor en frame ble hoppet over (ingen tilstand ble endret).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingJoints,
    LowConfidence,
    DegenerateGeometry,
    NonMonotonicTime,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::MissingJoints => "missing_joints",
            SkipReason::LowConfidence => "low_confidence",
            SkipReason::DegenerateGeometry => "degenerate_geometry",
            SkipReason::NonMonotonicTime => "non_monotonic_time",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedFrame {
    pub sample: AngleSample,
    pub phase: Phase,
    pub evaluation: Evaluation,
    pub rep: Option<RepEvent>,
    /// Melding godkjent av throttleren, klar for tale.
    pub cue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FrameOutcome {
    Skipped { reason: SkipReason },
    Processed(ProcessedFrame),
}

impl FrameOutcome {
    pub fn processed(&self) -> Option<&ProcessedFrame> {
        match self {
            FrameOutcome::Processed(p) => Some(p),
            FrameOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, FrameOutcome::Skipped { .. })
    }
}

#[derive(Debug)]
pub struct SessionEngine {
    profile: ExerciseProfile,
    config: EngineConfig,
    ema: Ema,
    machine: RepStateMachine,
    aggregator: MetricsAggregator,
    throttler: FeedbackThrottler,
    counters: EngineCounters,
    last_ts: Option<f64>,
    prev_in_range: Option<bool>,
    reported_unknown: HashSet<String>,
}

impl SessionEngine {
    pub fn new(profile: ExerciseProfile, config: EngineConfig) -> Result<Self> {
        let counters = EngineCounters::new()?;
        Self::with_counters(profile, config, counters)
    }

    /// Som `new`, men med tellere verten deler mellom økter.
    pub fn with_counters(
        profile: ExerciseProfile,
        config: EngineConfig,
        counters: EngineCounters,
    ) -> Result<Self> {
        validate_config(&config)?;
        info!(
            "session start: title={:?} joints={} counting={:?} alpha={}",
            profile.title,
            profile.joints.as_str(),
            profile.counting,
            profile.smoothing_alpha
        );
        Ok(Self {
            ema: Ema::new(profile.smoothing_alpha),
            machine: RepStateMachine::new(&profile),
            aggregator: MetricsAggregator::new(),
            throttler: FeedbackThrottler::new(config.speak_min_gap_ms),
            profile,
            config,
            counters,
            last_ts: None,
            prev_in_range: None,
            reported_unknown: HashSet::new(),
        })
    }

    /// Bygg fra lagret JSON (øvelse + valgfri motor-konfig).
    pub fn from_json(exercise_json: &str, engine_json: Option<&str>) -> Result<Self> {
        let profile = ExerciseProfile::from_json(exercise_json)?;
        let config = match engine_json {
            Some(txt) => parse_json(txt)?,
            None => EngineConfig::default(),
        };
        Self::new(profile, config)
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn metrics(&self) -> &SessionMetrics {
        self.aggregator.metrics()
    }

    pub fn process_frame(&mut self, keypoints: &[Keypoint], now_ms: f64) -> FrameOutcome {
        if !now_ms.is_finite() || self.last_ts.map_or(false, |t| now_ms < t) {
            return self.skip(SkipReason::NonMonotonicTime, now_ms);
        }

        let pose = Pose::from_keypoints(keypoints);
        for name in pose.unknown_names() {
            if self.reported_unknown.insert(name.clone()) {
                warn!("ignoring keypoint outside joint vocabulary: {}", name);
            }
        }

        let (side, [a, b, c]) = match self.tracked_triad(&pose) {
            Ok(tracked) => tracked,
            Err(reason) => return self.skip(reason, now_ms),
        };
        let (Some(pa), Some(pb), Some(pc)) = (pose.point(a), pose.point(b), pose.point(c)) else {
            return self.skip(SkipReason::MissingJoints, now_ms);
        };
        let Some(raw) = angle_at(pa, pb, pc) else {
            return self.skip(SkipReason::DegenerateGeometry, now_ms);
        };

        let smoothed = self.ema.update(raw);
        let transition = self.machine.advance(smoothed, now_ms);
        let evaluation = evaluate(smoothed, &pose, &self.profile, self.machine.phase());
        let rep = self.machine.resolve(transition, &evaluation, now_ms);

        let in_range = resolve_in_range(&evaluation, self.profile.targets.target_range(), smoothed);
        let sample = AngleSample { raw, smoothed, timestamp_ms: now_ms, side, in_range };
        self.aggregator.record_frame(&sample);
        self.counters.frames_processed.inc();
        if let Some(rep) = &rep {
            self.aggregator.record_rep(rep);
            self.counters.rep(rep.correct);
            info!(
                "rep {} counted: quality={:.2} correct={}",
                rep.index, rep.quality_score, rep.correct
            );
        }

        let cue = self.cue_for(&evaluation, in_range, now_ms);
        self.prev_in_range = Some(in_range);
        self.last_ts = Some(now_ms);

        FrameOutcome::Processed(ProcessedFrame {
            sample,
            phase: self.machine.phase(),
            evaluation,
            rep,
            cue,
        })
    }

    /// Løpende sammendrag (varighet = første til siste prosesserte frame).
    pub fn snapshot(&self) -> SummaryRecord {
        self.aggregator.snapshot()
    }

    /// Sluttsammendrag; kan kalles fra enhver tilstand og nullstiller ingenting.
    pub fn finalize(&self, duration_sec: f64) -> SummaryRecord {
        self.aggregator.finalize(duration_sec)
    }

    /// Velg side og vinkel-triplett for framen. T-pose krever bare skuldre og
    /// håndledd; med skjulte albuer spores vinkelen i skulderen mellom
    /// skulderlinjen og håndleddet (180° i perfekt T-pose).
    fn tracked_triad(&self, pose: &Pose) -> std::result::Result<(Side, [JointName; 3]), SkipReason> {
        let floor = self.config.min_keypoint_score;
        let joints = self.profile.joints;
        let (side, score) = pose.best_side(|s| joints.triad(s).to_vec());
        if score > floor {
            return Ok((side, joints.triad(side)));
        }

        if let Targets::StaticHold(t) = &self.profile.targets {
            let across = |s: Side| {
                [JointName::shoulder(s.opposite()), JointName::shoulder(s), JointName::wrist(s)]
            };
            let (side, arm_score) = pose.best_side(|s| across(s).to_vec());
            if arm_score > floor && arm_score >= t.min_score {
                return Ok((side, across(side)));
            }
        }

        if score <= 0.0 {
            Err(SkipReason::MissingJoints)
        } else {
            Err(SkipReason::LowConfidence)
        }
    }

    fn skip(&self, reason: SkipReason, now_ms: f64) -> FrameOutcome {
        debug!("frame skipped at t={}ms: {}", now_ms, reason.as_str());
        self.counters.skipped(reason.as_str());
        FrameOutcome::Skipped { reason }
    }

    /// Rettemeldinger sendes hver frame (throttlet); ros bare når pasienten
    /// kommer inn i målet.
    fn cue_for(&mut self, evaluation: &Evaluation, in_range: bool, now_ms: f64) -> Option<String> {
        let speak = match evaluation.level {
            Level::Good => in_range && self.prev_in_range != Some(true),
            Level::Caution | Level::Bad | Level::Info => true,
        };
        if speak && self.throttler.should_speak(&evaluation.message, now_ms) {
            Some(evaluation.message.clone())
        } else {
            None
        }
    }
}

fn validate_config(config: &EngineConfig) -> std::result::Result<(), ProfileError> {
    let score = config.min_keypoint_score;
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(ProfileError::OutOfBounds {
            field: "minKeypointScore",
            value: score,
            min: 0.0,
            max: 1.0,
        });
    }
    let gap = config.speak_min_gap_ms;
    if !gap.is_finite() || gap < 0.0 {
        return Err(ProfileError::OutOfBounds {
            field: "speakMinGapMs",
            value: gap,
            min: 0.0,
            max: f64::MAX,
        });
    }
    Ok(())
}
