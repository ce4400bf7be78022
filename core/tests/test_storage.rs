use std::path::PathBuf;

use rehabpose_core::error::{EngineError, ProfileError};
use rehabpose_core::profile::ExerciseProfile;
use rehabpose_core::storage::{
    load_engine_config, load_exercise_config, load_session_record, save_session_record, StoredSession,
};
use rehabpose_core::types::{EngineConfig, SummaryRecord};

fn tmp(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rehabpose_core_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn session_record_survives_disk_round() {
    let summary = SummaryRecord {
        rep_count: 3,
        correct_reps: 2,
        incorrect_reps: 1,
        min_angle: Some(88.5),
        max_angle: Some(161.0),
        avg_angle: Some(120.25),
        time_in_target_ms: 4200.0,
        time_in_target_sec: 4.2,
        out_of_range_count: 2,
        cadence: 12.0,
        quality: vec![1.0, 1.0, 0.2],
        ..SummaryRecord::default()
    };
    let record = StoredSession::new(Some("Squat".into()), &summary);
    let path = tmp("session.json");
    save_session_record(&record, &path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"recordedAt\""));
    assert!(text.contains("\"correctReps\": 2"));

    let back = load_session_record(&path).unwrap();
    assert_eq!(back, record);
}

#[test]
fn missing_engine_config_falls_back_to_defaults() {
    let cfg = load_engine_config(tmp("does_not_exist.json")).unwrap();
    assert_eq!(cfg.min_keypoint_score, EngineConfig::default().min_keypoint_score);
    assert_eq!(cfg.speak_min_gap_ms, 1800.0);

    let path = tmp("engine.json");
    std::fs::write(&path, r#"{"minKeypointScore":0.5}"#).unwrap();
    let cfg = load_engine_config(&path).unwrap();
    assert_eq!(cfg.min_keypoint_score, 0.5);
    assert_eq!(cfg.speak_min_gap_ms, 1800.0);
}

#[test]
fn exercise_config_loads_and_builds_profile() {
    let path = tmp("squat.json");
    std::fs::write(
        &path,
        r#"{"title":"Wall squat","targets":{"type":"squat","mode":"hold","backMin":160}}"#,
    )
    .unwrap();
    let cfg = load_exercise_config(&path).unwrap();
    let profile = ExerciseProfile::from_config(&cfg).unwrap();
    assert!(profile.is_static());
    assert!(profile.is_squat());
}

#[test]
fn broken_exercise_config_reports_json_path() {
    let path = tmp("broken.json");
    std::fs::write(&path, r#"{"targets":{"hipRange":[90,"wide"]}}"#).unwrap();
    match load_exercise_config(&path) {
        Err(EngineError::Profile(ProfileError::Parse { path, .. })) => {
            assert_eq!(path, "targets.hipRange[1]");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_exercise_file_is_io_error() {
    let err = load_exercise_config(tmp("nope.json")).unwrap_err();
    assert!(matches!(err, EngineError::Io(_)));
}

#[test]
fn broken_engine_config_reports_json_path() {
    let path = tmp("engine_broken.json");
    std::fs::write(&path, r#"{"speakMinGapMs":1800,"minKeypointScore":"high"}"#).unwrap();
    match load_engine_config(&path) {
        Err(EngineError::Profile(ProfileError::Parse { path, .. })) => {
            assert_eq!(path, "minKeypointScore");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
