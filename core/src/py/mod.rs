// Python-binding (feature "python"). JSON inn, JSON ut, slik at verten
// slipper å speile Rust-typene.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::engine::SessionEngine;
use crate::evaluator::evaluate_keypoints;
use crate::models::{Keypoint, Phase};
use crate::profile::ExerciseProfile;

fn value_err(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_keypoints(keypoints_json: &str) -> PyResult<Vec<Keypoint>> {
    let mut de = serde_json::Deserializer::from_str(keypoints_json);
    serde_path_to_error::deserialize(&mut de)
        .map_err(|e| value_err(format!("keypoints parse at {}: {}", e.path(), e.inner())))
}

/// Én økt per instans. Python-verten serialiserer frame-kallene.
#[pyclass(name = "PoseSession")]
pub struct PyPoseSession {
    engine: SessionEngine,
}

#[pymethods]
impl PyPoseSession {
    #[new]
    #[pyo3(signature = (exercise_json, engine_json = None))]
    fn new(exercise_json: &str, engine_json: Option<&str>) -> PyResult<Self> {
        let engine = SessionEngine::from_json(exercise_json, engine_json).map_err(value_err)?;
        Ok(Self { engine })
    }

    fn process_frame(&mut self, keypoints_json: &str, now_ms: f64) -> PyResult<String> {
        let keypoints = parse_keypoints(keypoints_json)?;
        let outcome = self.engine.process_frame(&keypoints, now_ms);
        serde_json::to_string(&outcome).map_err(value_err)
    }

    fn snapshot(&self) -> PyResult<String> {
        serde_json::to_string(&self.engine.snapshot()).map_err(value_err)
    }

    fn finalize(&self, duration_sec: f64) -> PyResult<String> {
        serde_json::to_string(&self.engine.finalize(duration_sec)).map_err(value_err)
    }

    fn profile(&self) -> PyResult<String> {
        serde_json::to_string(self.engine.profile()).map_err(value_err)
    }
}

/// Stateløs vurdering av én frame, f.eks. for forhåndsvisning i mal-editoren.
#[pyfunction]
#[pyo3(signature = (exercise_json, keypoints_json, angle, phase = "down"))]
fn evaluate_pose(exercise_json: &str, keypoints_json: &str, angle: f64, phase: &str) -> PyResult<String> {
    let profile = ExerciseProfile::from_json(exercise_json).map_err(value_err)?;
    let keypoints = parse_keypoints(keypoints_json)?;
    let phase = match phase {
        "up" => Phase::Up,
        "hold" => Phase::Hold,
        "down" => Phase::Down,
        other => return Err(value_err(format!("unknown phase '{other}'"))),
    };
    let out = evaluate_keypoints(angle, &keypoints, &profile, phase);
    serde_json::to_string(&out).map_err(value_err)
}

#[pymodule]
fn rehabpose_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyPoseSession>()?;
    m.add_function(wrap_pyfunction!(evaluate_pose, m)?)?;
    Ok(())
}
