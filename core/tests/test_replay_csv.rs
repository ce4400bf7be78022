// Replay av et opptak (CSV, én rad per frame) gjennom hele motoren.

use rehabpose_core::engine::{SessionEngine, SkipReason};
use rehabpose_core::models::Keypoint;
use rehabpose_core::storage::StoredSession;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Row {
    t_ms: f64,
    shoulder_x: f64,
    shoulder_y: f64,
    hip_x: f64,
    hip_y: f64,
    knee_x: f64,
    knee_y: f64,
    ankle_x: f64,
    ankle_y: f64,
    score: f64,
}

impl Row {
    fn keypoints(&self) -> Vec<Keypoint> {
        vec![
            Keypoint::new("left_shoulder", self.shoulder_x, self.shoulder_y, self.score),
            Keypoint::new("left_hip", self.hip_x, self.hip_y, self.score),
            Keypoint::new("left_knee", self.knee_x, self.knee_y, self.score),
            Keypoint::new("left_ankle", self.ankle_x, self.ankle_y, self.score),
        ]
    }
}

fn load_rows() -> Vec<Row> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/squat_two_reps.csv");
    let mut rdr = csv::Reader::from_path(path).expect("fixture finnes");
    rdr.deserialize::<Row>().collect::<Result<Vec<_>, _>>().expect("gyldig CSV")
}

#[test]
fn recorded_squats_replay_to_two_correct_reps() {
    let rows = load_rows();
    assert_eq!(rows.len(), 121);

    let mut engine = SessionEngine::from_json(
        r#"{"title":"Squat","upAngle":110,"downAngle":140,"smoothingAlpha":0.5,
            "targets":{"type":"squat","kneeRange":[80,110]}}"#,
        None,
    )
    .unwrap();

    let mut low_conf = 0;
    for row in &rows {
        let out = engine.process_frame(&row.keypoints(), row.t_ms);
        if let rehabpose_core::FrameOutcome::Skipped { reason } = out {
            assert_eq!(reason, SkipReason::LowConfidence);
            low_conf += 1;
        }
    }
    assert_eq!(low_conf, 8);

    let duration = rows.last().unwrap().t_ms / 1000.0;
    let summary = engine.finalize(duration);
    assert_eq!(summary.rep_count, 2);
    assert_eq!(summary.correct_reps, 2);
    assert_eq!(summary.sample_count, 113);
    assert_eq!(summary.cadence, 30.0);
    assert!(summary.min_angle.unwrap() >= 85.0 && summary.min_angle.unwrap() < 100.0);
    assert!(summary.time_in_target_ms > 0.0);

    let stored = StoredSession::new(Some("Squat".into()), &summary);
    assert_eq!(stored.result.reps, 2);
}
