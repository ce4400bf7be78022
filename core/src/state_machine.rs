use log::{debug, warn};

use crate::evaluator::{Evaluation, Level};
use crate::models::{Phase, RepEvent};
use crate::profile::{Counting, ExerciseProfile};

/// Rep regnes som korrekt fra og med denne kvaliteten.
pub const CORRECT_REP_THRESHOLD: f64 = 0.8;

pub const QUALITY_GOOD: f64 = 1.0;
pub const QUALITY_CAUTION: f64 = 0.6;
pub const QUALITY_POOR: f64 = 0.2;

/// Faseskifte oppdaget i denne framen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    /// down → up: vinkelen krysset under `up_angle_deg`.
    EnteredUp,
    /// up → down: vinkelen krysset over `down_angle_deg`.
    LeftUp,
}

#[derive(Debug, Clone)]
pub struct RepStateMachine {
    phase: Phase,
    up_angle: f64,
    down_angle: f64,
    min_rep_duration_ms: f64,
    squat: bool,
    /// Satt ved første prosesserte frame, deretter ved hver talt rep.
    last_rep_ts: Option<f64>,
    pending_quality: Option<f64>,
    rep_count: u32,
}

impl RepStateMachine {
    pub fn new(profile: &ExerciseProfile) -> Self {
        let phase = match profile.counting {
            Counting::Reps => Phase::Down,
            Counting::Hold => Phase::Hold,
        };
        Self {
            phase,
            up_angle: profile.up_angle_deg,
            down_angle: profile.down_angle_deg,
            min_rep_duration_ms: profile.min_rep_duration_ms,
            squat: profile.is_squat(),
            last_rep_ts: None,
            pending_quality: None,
            rep_count: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn pending_quality(&self) -> Option<f64> {
        self.pending_quality
    }

    /// Oppdater fasen fra glattet vinkel. Hold-økter står stille.
    pub fn advance(&mut self, smoothed: f64, now_ms: f64) -> Transition {
        if self.last_rep_ts.is_none() {
            self.last_rep_ts = Some(now_ms);
        }
        match self.phase {
            Phase::Hold => Transition::None,
            Phase::Down if smoothed < self.up_angle => {
                debug!("phase down→up at {:.1}° (t={:.0}ms)", smoothed, now_ms);
                self.phase = Phase::Up;
                Transition::EnteredUp
            }
            Phase::Up if smoothed > self.down_angle => {
                debug!("phase up→down at {:.1}° (t={:.0}ms)", smoothed, now_ms);
                self.phase = Phase::Down;
                Transition::LeftUp
            }
            _ => Transition::None,
        }
    }

    /// Bruk framens vurdering på et faseskifte. Gir `Some` når en rep telles.
    pub fn resolve(&mut self, transition: Transition, eval: &Evaluation, now_ms: f64) -> Option<RepEvent> {
        match transition {
            Transition::None => None,
            Transition::EnteredUp => {
                if self.squat {
                    self.pending_quality = Some(in_range_quality(eval));
                }
                None
            }
            Transition::LeftUp => {
                let pending = self.pending_quality.take();
                let since_last = now_ms - self.last_rep_ts.unwrap_or(now_ms);
                if since_last < self.min_rep_duration_ms {
                    warn!(
                        "rep ignored: {:.0}ms since last rep (< {:.0}ms)",
                        since_last, self.min_rep_duration_ms
                    );
                    return None;
                }

                let quality_score = if self.squat {
                    pending.unwrap_or_else(|| in_range_quality(eval))
                } else {
                    level_quality(eval.level)
                };
                self.rep_count += 1;
                self.last_rep_ts = Some(now_ms);
                Some(RepEvent {
                    index: self.rep_count,
                    quality_score,
                    timestamp_ms: now_ms,
                    correct: quality_score >= CORRECT_REP_THRESHOLD,
                })
            }
        }
    }
}

fn in_range_quality(eval: &Evaluation) -> f64 {
    if eval.in_range == Some(true) { QUALITY_GOOD } else { QUALITY_POOR }
}

fn level_quality(level: Level) -> f64 {
    match level {
        Level::Good => QUALITY_GOOD,
        Level::Caution => QUALITY_CAUTION,
        Level::Bad | Level::Info => QUALITY_POOR,
    }
}
