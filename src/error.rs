use thiserror::Error;

/// Faults raised while filling indicator buffers.
///
/// Expected conditions (not enough history, engine not initialized) are
/// reported through [`Status`](crate::Status) instead.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum IndicatorError {
    /// A computed value left its mathematically valid domain. The recompute
    /// pass stopped at `bar`; that bar and every newer one keep their
    /// previous contents.
    #[error("invariant violation at bar {bar}: value {value} outside [{min}, {max}]")]
    InvariantViolation {
        bar: usize,
        value: f64,
        min: f64,
        max: f64,
    },

    /// An indicator read a bar the price series does not hold.
    #[error("price offset {offset} out of range for series of {len} bars")]
    PriceOutOfRange { offset: usize, len: usize },
}

/// Host settings rejected before they reach an engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("periods must be finite and positive, got {0}")]
    InvalidPeriods(f64),

    #[error("periods {periods} exceed {max} bars on the working timeframe")]
    PeriodsTooLarge { periods: f64, max: usize },

    #[error("deviation multiplier must be finite and non-negative, got {0}")]
    InvalidDeviation(f64),

    #[error("max_visible must be -1 (unbounded) or non-negative, got {0}")]
    InvalidMaxVisible(i64),

    #[error("ALMA {name} out of range, got {value}")]
    InvalidAlmaParameter { name: &'static str, value: f64 },

    #[error("FDI seed must lie in [1, 2], got {0}")]
    InvalidSeed(f64),
}

pub type Result<T, E = IndicatorError> = std::result::Result<T, E>;
