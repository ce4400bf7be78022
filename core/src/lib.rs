//! Rehab pose core: leddvinkler, glatting, rep/hold-telling, formvurdering og
//! økt-metrikker for kamerabaserte rehabiliteringsøvelser.
//!
//! Pose-deteksjon, rendering og lagringspolicy ligger hos verten.

pub mod engine;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod metrics;
pub mod models;
pub mod profile;
pub mod smoothing;
pub mod state_machine;
pub mod storage;
pub mod telemetry;
pub mod throttle;
pub mod types;

#[cfg(feature = "python")]
mod py;

pub use engine::{FrameOutcome, ProcessedFrame, SessionEngine, SkipReason};
pub use error::{EngineError, ProfileError, Result};
pub use evaluator::{evaluate, evaluate_keypoints, Details, Evaluation, Level};
pub use geometry::{angle_at, RoundTo};
pub use metrics::{MetricsAggregator, SessionMetrics};
pub use models::{AngleSample, JointSet, Keypoint, Phase, Point, Pose, RepEvent, Side};
pub use profile::{Counting, ExerciseProfile, Range, Targets};
pub use smoothing::{smooth, Ema};
pub use state_machine::RepStateMachine;
pub use storage::{load_engine_config, load_exercise_config, load_session_record, save_session_record, StoredSession};
pub use telemetry::EngineCounters;
pub use throttle::FeedbackThrottler;
pub use types::{EngineConfig, ExerciseConfig, ResultDocument, SummaryRecord, TargetsConfig};
