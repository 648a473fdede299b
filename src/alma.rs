use std::hash::{Hash, Hasher};

/// ALMA kernel shape.
///
/// `offset` places the Gaussian peak along the window (`0` = oldest bar,
/// `1` = newest bar); `sigma` controls its width (larger is sharper).
/// Defaults to `offset = 0.85`, `sigma = 6.0`.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// non-finite values are rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct AlmaParams {
    offset: f64,
    sigma: f64,
}

impl AlmaParams {
    /// # Panics
    ///
    /// Panics if `offset` is outside `[0, 1]` or `sigma` is not finite and
    /// positive.
    #[must_use]
    pub fn new(offset: f64, sigma: f64) -> Self {
        assert!((0.0..=1.0).contains(&offset), "offset must lie in [0, 1]");
        assert!(sigma.is_finite() && sigma > 0.0, "sigma must be positive");
        Self { offset, sigma }
    }

    #[must_use]
    pub fn offset(self) -> f64 {
        self.offset
    }

    #[must_use]
    pub fn sigma(self) -> f64 {
        self.sigma
    }
}

impl Default for AlmaParams {
    fn default() -> Self {
        Self {
            offset: 0.85,
            sigma: 6.0,
        }
    }
}

impl PartialEq for AlmaParams {
    fn eq(&self, other: &Self) -> bool {
        self.offset.to_bits() == other.offset.to_bits()
            && self.sigma.to_bits() == other.sigma.to_bits()
    }
}

impl Eq for AlmaParams {}

impl Hash for AlmaParams {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.to_bits().hash(state);
        self.sigma.to_bits().hash(state);
    }
}

/// Normalized Gaussian weights for an ALMA window.
///
/// `weights()[i]` applies to the price at offset `bar + i`. With `n` periods
/// the peak sits `(1 - offset) × (n - 1)` bars back from the newest bar and
/// the kernel width is `n / sigma`:
///
/// ```text
/// w[i] = exp(−(i − center)² / (2 s²)),   normalized to Σ w = 1
/// ```
#[derive(Clone, Debug)]
pub(crate) struct AlmaWeights {
    params: AlmaParams,
    weights: Vec<f64>,
}

impl AlmaWeights {
    pub fn new(params: AlmaParams) -> Self {
        Self {
            params,
            weights: Vec::new(),
        }
    }

    /// Recomputes the kernel when `periods` differs from the current length.
    /// Returns `true` if the weights changed.
    #[allow(clippy::cast_precision_loss)]
    pub fn ensure(&mut self, periods: usize) -> bool {
        if self.weights.len() == periods {
            return false;
        }

        let span = periods.saturating_sub(1) as f64;
        let center = (1.0 - self.params.offset) * span;
        let width = periods as f64 / self.params.sigma;
        let denominator = 2.0 * width * width;

        self.weights.clear();
        self.weights.extend((0..periods).map(|i| {
            let distance = i as f64 - center;
            (-(distance * distance) / denominator).exp()
        }));

        let total: f64 = self.weights.iter().sum();
        for weight in &mut self.weights {
            *weight /= total;
        }

        true
    }

    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}
