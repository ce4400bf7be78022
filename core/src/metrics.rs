use log::info;
use serde::Serialize;

use crate::evaluator::Evaluation;
use crate::geometry::RoundTo;
use crate::models::{AngleSample, RepEvent, Side};
use crate::profile::Range;
use crate::types::SummaryRecord;

/// Løpende økt-metrikker. Eies av `MetricsAggregator`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub rep_count: u32,
    pub correct_reps: u32,
    pub incorrect_reps: u32,
    pub min_angle: Option<f64>,
    pub max_angle: Option<f64>,
    pub sum_angle: f64,
    pub sample_count: u64,
    pub time_in_target_ms: f64,
    pub out_of_range_transitions: u32,
    pub used_side: Option<Side>,
    pub rep_quality_history: Vec<f64>,
}

/// In-range for kontinuerlig sporing: evaluatorens verdi, ellers medlemskap
/// i et eksplisitt målintervall, ellers `level == good`.
pub fn resolve_in_range(eval: &Evaluation, target_range: Option<Range>, smoothed: f64) -> bool {
    match (eval.in_range, target_range) {
        (Some(v), _) => v,
        (None, Some(r)) => r.contains(smoothed),
        (None, None) => eval.is_good(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    metrics: SessionMetrics,
    prev_in_range: Option<bool>,
    prev_ts: Option<f64>,
    first_ts: Option<f64>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    /// Én prosessert frame. Tid i mål teller intervallet fra forrige frame
    /// bare når forrige in-range var kjent og sann.
    pub fn record_frame(&mut self, sample: &AngleSample) {
        let m = &mut self.metrics;
        let a = sample.smoothed;
        m.min_angle = Some(m.min_angle.map_or(a, |v| v.min(a)));
        m.max_angle = Some(m.max_angle.map_or(a, |v| v.max(a)));
        m.sum_angle += a;
        m.sample_count += 1;
        m.used_side = Some(sample.side);

        if let (Some(prev), Some(prev_ts)) = (self.prev_in_range, self.prev_ts) {
            if prev {
                m.time_in_target_ms += (sample.timestamp_ms - prev_ts).max(0.0);
                if !sample.in_range {
                    m.out_of_range_transitions += 1;
                }
            }
        }

        self.prev_in_range = Some(sample.in_range);
        self.prev_ts = Some(sample.timestamp_ms);
        if self.first_ts.is_none() {
            self.first_ts = Some(sample.timestamp_ms);
        }
    }

    pub fn record_rep(&mut self, rep: &RepEvent) {
        let m = &mut self.metrics;
        m.rep_count += 1;
        if rep.correct {
            m.correct_reps += 1;
        } else {
            m.incorrect_reps += 1;
        }
        m.rep_quality_history.push(rep.quality_score);
    }

    /// Tid mellom første og siste prosesserte frame.
    pub fn elapsed_ms(&self) -> f64 {
        match (self.first_ts, self.prev_ts) {
            (Some(a), Some(b)) => (b - a).max(0.0),
            _ => 0.0,
        }
    }

    /// Løpende sammendrag midt i økten.
    pub fn snapshot(&self) -> SummaryRecord {
        self.summarize(self.elapsed_ms() / 1000.0)
    }

    /// Sluttsammendrag. Nullstiller ikke noe; kan kalles fra enhver tilstand.
    pub fn finalize(&self, duration_sec: f64) -> SummaryRecord {
        let out = self.summarize(duration_sec);
        info!(
            "session finalized: reps={} correct={} in_target={:.1}s cadence={:.1}/min",
            out.rep_count, out.correct_reps, out.time_in_target_sec, out.cadence
        );
        out
    }

    fn summarize(&self, duration_sec: f64) -> SummaryRecord {
        let m = &self.metrics;
        let avg_angle = if m.sample_count == 0 {
            None
        } else {
            Some(m.sum_angle / m.sample_count as f64)
        };
        let duration_sec = if duration_sec.is_finite() { duration_sec.max(0.0) } else { 0.0 };
        let cadence = if duration_sec > 0.0 {
            (m.rep_count as f64 / (duration_sec / 60.0)).round_to(2)
        } else {
            0.0
        };

        SummaryRecord {
            rep_count: m.rep_count,
            correct_reps: m.correct_reps,
            incorrect_reps: m.incorrect_reps,
            min_angle: m.min_angle,
            max_angle: m.max_angle,
            avg_angle,
            time_in_target_ms: m.time_in_target_ms,
            time_in_target_sec: (m.time_in_target_ms / 1000.0).round_to(3),
            out_of_range_count: m.out_of_range_transitions,
            cadence,
            quality: m.rep_quality_history.clone(),
            used_side: m.used_side,
            sample_count: m.sample_count,
            duration_sec,
        }
    }
}
