pub const DEFAULT_MIN_GAP_MS: f64 = 1800.0;

/// Demper gjentatte talemeldinger. Vet ingenting om øvelser.
#[derive(Debug, Clone)]
pub struct FeedbackThrottler {
    min_gap_ms: f64,
    last: Option<(String, f64)>,
}

impl FeedbackThrottler {
    pub fn new(min_gap_ms: f64) -> Self {
        Self { min_gap_ms, last: None }
    }

    /// `true` og husk meldingen, med mindre samme tekst ble godkjent for
    /// under `min_gap_ms` siden. Ny tekst slipper alltid gjennom.
    pub fn should_speak(&mut self, text: &str, now_ms: f64) -> bool {
        if let Some((last_text, last_ms)) = &self.last {
            if last_text == text && now_ms - *last_ms < self.min_gap_ms {
                return false;
            }
        }
        self.last = Some((text.to_string(), now_ms));
        true
    }

    pub fn min_gap_ms(&self) -> f64 {
        self.min_gap_ms
    }
}

impl Default for FeedbackThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GAP_MS)
    }
}
