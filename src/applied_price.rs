use crate::{Ohlcv, Price};

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Price field extracted from an [`Ohlcv`] bar before it enters an
/// indicator window.
///
/// Each indicator is configured with an `AppliedPrice` that determines which
/// value (or derived value) it computes on.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppliedPrice {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Closing price.
    #[default]
    Close,
    /// Lowest price.
    Low,
    /// Median price: `(high + low) / 2`.
    Median,
    /// Typical price: `(high + low + close) / 3`.
    Typical,
    /// Weighted close: `(high + low + close + close) / 4`.
    Weighted,
    /// Average price: `(open + high + low + close) / 4`.
    Average,
}

impl Display for AppliedPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl AppliedPrice {
    #[inline]
    pub(crate) fn extract(self, ohlcv: &impl Ohlcv) -> Price {
        match self {
            Self::Open => ohlcv.open(),
            Self::High => ohlcv.high(),
            Self::Close => ohlcv.close(),
            Self::Low => ohlcv.low(),
            Self::Median => f64::midpoint(ohlcv.high(), ohlcv.low()),
            Self::Typical => (ohlcv.high() + ohlcv.low() + ohlcv.close()) / 3.0,
            Self::Weighted => (ohlcv.high() + ohlcv.low() + ohlcv.close() + ohlcv.close()) / 4.0,
            Self::Average => (ohlcv.open() + ohlcv.high() + ohlcv.low() + ohlcv.close()) / 4.0,
        }
    }
}
