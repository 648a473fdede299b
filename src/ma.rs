//! Moving-average kernels over a newest-first price window.
//!
//! Every function takes `window[i] = price(bar + i)`, i.e. index `0` is the
//! newest bar of the window.

use crate::Price;

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Moving-average method used for the middle line of
/// [`Bands`](crate::Bands).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MaMethod {
    /// Simple (arithmetic) moving average.
    #[default]
    Sma,
    /// Exponential moving average, `α = 2 / (periods + 1)`.
    Ema,
    /// Linear weighted moving average, newest bar weighted highest.
    Lwma,
    /// Arnaud Legoux moving average (Gaussian weights).
    Alma,
}

impl Display for MaMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sma => "SMA",
            Self::Ema => "EMA",
            Self::Lwma => "LWMA",
            Self::Alma => "ALMA",
        };
        f.write_str(name)
    }
}

#[allow(clippy::cast_precision_loss)]
#[inline]
pub(crate) fn sma(window: &[Price]) -> Price {
    window.iter().sum::<Price>() / window.len() as f64
}

/// Weights `n, n-1, .., 1` from the newest bar back.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn lwma(window: &[Price]) -> Price {
    let n = window.len();
    let (weighted, weights) = window
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, total), (i, price)| {
            let weight = (n - i) as f64;
            (weight.mul_add(*price, sum), total + weight)
        });

    weighted / weights
}

/// One EMA step from the previous (older) value.
#[inline]
pub(crate) fn ema_step(previous: Price, price: Price, alpha: f64) -> Price {
    alpha.mul_add(price - previous, previous)
}

#[allow(clippy::cast_precision_loss)]
#[inline]
pub(crate) fn ema_alpha(periods: usize) -> f64 {
    2.0 / periods.saturating_add(1) as f64
}

/// Weighted sum `Σ w[i] × window[i]`. Weights must already sum to one.
#[inline]
pub(crate) fn weighted(window: &[Price], weights: &[f64]) -> Price {
    window
        .iter()
        .zip(weights)
        .fold(0.0, |sum, (price, weight)| weight.mul_add(*price, sum))
}

#[inline]
fn squared_residuals(window: &[Price], mean: Price) -> f64 {
    window
        .iter()
        .map(|price| {
            let diff = price - mean;
            diff * diff
        })
        .sum()
}

/// Sample standard deviation (`n - 1`) of the window around `mean`.
#[allow(clippy::cast_precision_loss)]
#[inline]
pub(crate) fn sample_std_dev(window: &[Price], mean: Price) -> f64 {
    (squared_residuals(window, mean) / (window.len() - 1) as f64).sqrt()
}

/// Unweighted mean of squared residuals around `mean`, square-rooted.
///
/// ALMA pairs this with its Gaussian-weighted mean: the residuals are taken
/// against the weighted average but averaged with equal weights.
#[allow(clippy::cast_precision_loss)]
#[inline]
pub(crate) fn mean_square_dev(window: &[Price], mean: Price) -> f64 {
    (squared_residuals(window, mean) / window.len() as f64).sqrt()
}
