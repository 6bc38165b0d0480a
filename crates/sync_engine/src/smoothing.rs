//! Exponential smoothing of the live delta.

/// First-order exponential filter
///
/// `value = alpha * raw + (1 - alpha) * previous`; the first update after a
/// reset seeds the filter with `raw`.
#[derive(Debug, Clone)]
pub struct DeltaSmoother {
    alpha: f64,
    value: Option<f64>,
}

impl DeltaSmoother {
    /// `alpha` is clamped to `[0, 1]`; non-finite input uses 0.3.
    pub fn new(alpha: f64) -> Self {
        let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.3 };
        Self { alpha, value: None }
    }

    /// Feed one raw delta and return the smoothed value.
    #[inline]
    pub fn update(&mut self, raw: f64) -> f64 {
        let next = match self.value {
            Some(previous) => self.alpha * raw + (1.0 - self.alpha) * previous,
            None => raw,
        };
        self.value = Some(next);
        next
    }

    /// Current smoothed value (0 before the first update)
    #[inline]
    pub fn value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.value = None;
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}
