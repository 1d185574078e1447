/// Min-max scaling onto a display range.
///
/// `scaled = (x - min) / (max - min) * (max_val - min_val) + min_val`.
///
/// When every value is equal the range collapses; each element then becomes
/// the midpoint `(min_val + max_val) / 2` so NaN never reaches a client.
/// An empty slice yields an empty vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    pub min_val: f64,
    pub max_val: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer { min_val: 0.0, max_val: 1.0 }
    }
}

impl Normalizer {
    pub fn new(min_val: f64, max_val: f64) -> Normalizer {
        Normalizer { min_val, max_val }
    }

    pub fn normalize(&self, values: &[f64]) -> Vec<f64> {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = hi - lo;

        if span == 0.0 || !span.is_finite() {
            let mid = (self.min_val + self.max_val) / 2.0;
            return vec![mid; values.len()];
        }

        let target = self.max_val - self.min_val;
        values
            .iter()
            .map(|&x| (x - lo) / span * target + self.min_val)
            .collect()
    }

    /// Normalizes, then rounds each value to 4 decimal places for display.
    pub fn normalize_rounded(&self, values: &[f64]) -> Vec<f64> {
        self.normalize(values).into_iter().map(round4).collect()
    }
}

pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
