/// A price value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Price = f64;

/// OHLC bar data read by all indicators.
///
/// Implement this on your own kline/candle type to avoid per-tick
/// conversion. Indicators extract the configured
/// [`AppliedPrice`](crate::AppliedPrice) internally.
///
/// # Example
///
/// ```
/// use quantedge_series::{Ohlcv, Price};
///
/// struct MyKline {
///     o: f64, h: f64, l: f64, c: f64,
/// }
///
/// impl Ohlcv for MyKline {
///     fn open(&self) -> Price { self.o }
///     fn high(&self) -> Price { self.h }
///     fn low(&self) -> Price { self.l }
///     fn close(&self) -> Price { self.c }
/// }
/// ```
pub trait Ohlcv {
    /// Opening price of the bar.
    fn open(&self) -> Price;

    /// Highest price during the bar.
    fn high(&self) -> Price;

    /// Lowest price during the bar.
    fn low(&self) -> Price;

    /// Closing (or latest) price of the bar.
    fn close(&self) -> Price;
}

/// Read-only price history, addressed by bar offset.
///
/// Offset `0` is the newest bar; larger offsets are older. The series is
/// owned by the host and grows or reindexes independently of the engines
/// reading it.
///
/// Slices and vectors of [`Ohlcv`] bars implement this trait with
/// chronological storage: the **last** element is offset `0`.
///
/// ```
/// use quantedge_series::{Ohlcv, Price, PriceSeries};
///
/// struct Bar(f64);
/// impl Ohlcv for Bar {
///     fn open(&self) -> Price { self.0 }
///     fn high(&self) -> Price { self.0 }
///     fn low(&self) -> Price { self.0 }
///     fn close(&self) -> Price { self.0 }
/// }
///
/// let history = vec![Bar(1.0), Bar(2.0), Bar(3.0)];
/// assert_eq!(history.bar(0).map(Ohlcv::close), Some(3.0));
/// assert_eq!(history.bar(2).map(Ohlcv::close), Some(1.0));
/// assert!(history.bar(3).is_none());
/// ```
pub trait PriceSeries {
    /// Bar type stored in the series.
    type Bar: Ohlcv;

    /// Total number of bars available.
    fn len(&self) -> usize;

    /// Bar at `offset` from the newest, or `None` past the oldest bar.
    fn bar(&self, offset: usize) -> Option<&Self::Bar>;

    /// `true` when the series holds no bars.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<B: Ohlcv> PriceSeries for [B] {
    type Bar = B;

    #[inline]
    fn len(&self) -> usize {
        <[B]>::len(self)
    }

    #[inline]
    fn bar(&self, offset: usize) -> Option<&B> {
        let last = <[B]>::len(self).checked_sub(1)?;
        let index = last.checked_sub(offset)?;
        <[B]>::get(self, index)
    }
}

impl<B: Ohlcv> PriceSeries for Vec<B> {
    type Bar = B;

    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn bar(&self, offset: usize) -> Option<&B> {
        self.as_slice().bar(offset)
    }
}
