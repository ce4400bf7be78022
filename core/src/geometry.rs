// core/src/geometry.rs
use crate::models::Point;

/// Vektorlengder under denne regnes som null (sammenfallende punkter).
pub const MIN_VECTOR_LEN: f64 = 1e-9;

// --- RoundTo trait (offentlig, brukt i rapporter) ---
pub trait RoundTo {
    fn round_to(self, dp: u32) -> f64;
}

impl RoundTo for f64 {
    #[inline]
    fn round_to(self, dp: u32) -> f64 {
        if dp == 0 { return self.round(); }
        let factor = 10_f64.powi(dp as i32);
        (self * factor).round() / factor
    }
}

/// Indre vinkel (grader) i toppunktet `b`, fra vektorene b→a og b→c.
///
/// cos(θ) = (v1 · v2) / (|v1| × |v2|)
///
/// Returnerer `None` når en av vektorene har null lengde. Kalleren skal da
/// behandle framen som "ingen måling", ikke som 0°.
pub fn angle_at(a: Point, b: Point, c: Point) -> Option<f64> {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);
    if !(mag1 > MIN_VECTOR_LEN && mag2 > MIN_VECTOR_LEN) {
        return None;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

/// Helning fra horisontalen for linjestykket a→b, i [0, 90].
pub fn tilt_from_horizontal(a: Point, b: Point) -> Option<f64> {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    if dx.hypot(dy) <= MIN_VECTOR_LEN {
        return None;
    }
    Some(dy.atan2(dx).to_degrees())
}

/// Lean fra vertikalen for overkropp (skulder over hofte), i [0, 90].
pub fn lean_from_vertical(top: Point, bottom: Point) -> Option<f64> {
    let dx = (top.x - bottom.x).abs();
    let dy = (top.y - bottom.y).abs();
    if dx.hypot(dy) <= MIN_VECTOR_LEN {
        return None;
    }
    Some(dx.atan2(dy).to_degrees())
}

/// Albuebøy: 0° = helt strak arm.
pub fn elbow_flexion(shoulder: Point, elbow: Point, wrist: Point) -> Option<f64> {
    angle_at(shoulder, elbow, wrist).map(|a| (180.0 - a).max(0.0))
}
