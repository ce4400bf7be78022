use std::fmt;

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use crate::error::Result;

/// Prometheus-tellere for motoren. Klones fritt; klonene deler verdiene,
/// så verten kan lage ett sett og gi det til hver økt.
#[derive(Clone)]
pub struct EngineCounters {
    pub frames_processed: IntCounter,
    pub frames_skipped: IntCounterVec,
    pub reps: IntCounterVec,
}

impl EngineCounters {
    /// Uregistrerte tellere.
    pub fn new() -> Result<Self> {
        Ok(Self {
            frames_processed: IntCounter::new(
                "rehabpose_frames_processed_total",
                "Frames that produced an angle sample",
            )?,
            frames_skipped: IntCounterVec::new(
                Opts::new("rehabpose_frames_skipped_total", "Frames skipped before smoothing"),
                &["reason"],
            )?,
            reps: IntCounterVec::new(
                Opts::new("rehabpose_reps_total", "Counted repetitions"),
                &["correct"],
            )?,
        })
    }

    /// Lag og registrer i vertens registry.
    pub fn registered(registry: &Registry) -> Result<Self> {
        let c = Self::new()?;
        registry.register(Box::new(c.frames_processed.clone()))?;
        registry.register(Box::new(c.frames_skipped.clone()))?;
        registry.register(Box::new(c.reps.clone()))?;
        Ok(c)
    }

    pub(crate) fn skipped(&self, reason: &str) {
        self.frames_skipped.with_label_values(&[reason]).inc();
    }

    pub(crate) fn rep(&self, correct: bool) {
        let label = if correct { "true" } else { "false" };
        self.reps.with_label_values(&[label]).inc();
    }
}

impl fmt::Debug for EngineCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineCounters")
            .field("frames_processed", &self.frames_processed.get())
            .finish_non_exhaustive()
    }
}
