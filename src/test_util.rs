// src/test_util.rs

use crate::{Ohlcv, Price};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() <= e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

/// Asserts that two `f64` values are within an absolute tolerance.
macro_rules! assert_near {
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (a, e, t) = ($actual, $expected, $tolerance);
        assert!(
            (a - e).abs() <= t,
            "assert_near failed: actual={a}, expected={e}, diff={}, tolerance={t}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;
pub(crate) use assert_near;

#[derive(Clone, Copy, Debug)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }
}

/// Convenience: bar with just a close price (OHLC all equal to close).
pub fn bar(close: f64) -> Bar {
    Bar::new(close, close, close, close)
}

/// Chronological history (oldest first) from close prices.
pub fn closes(values: &[f64]) -> Vec<Bar> {
    values.iter().copied().map(bar).collect()
}

impl Ohlcv for Bar {
    fn open(&self) -> Price {
        self.open
    }
    fn high(&self) -> Price {
        self.high
    }
    fn low(&self) -> Price {
        self.low
    }
    fn close(&self) -> Price {
        self.close
    }
}
