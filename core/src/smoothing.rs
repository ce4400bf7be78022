/// Eksponentielt glidende snitt: `alpha·raw + (1-alpha)·prev`.
///
/// Uten forrige verdi returneres rå-verdien uendret (ingen oppvarming).
#[inline]
pub fn smooth(prev: Option<f64>, raw: f64, alpha: f64) -> f64 {
    match prev {
        Some(p) => alpha * raw + (1.0 - alpha) * p,
        None => raw,
    }
}

/// EMA med tilstand, én per økt.
#[derive(Debug, Clone, Copy)]
pub struct Ema {
    alpha: f64,
    value: Option<f64>,
}

impl Ema {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, value: None }
    }

    pub fn update(&mut self, raw: f64) -> f64 {
        let next = smooth(self.value, raw, self.alpha);
        self.value = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}
