use crate::{AppliedPrice, BufferSet, MaxVisible, PriceSeries, error::Result};

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

/// Output buffers owned by every indicator: three lines aligned to bar
/// offsets.
pub type Buffers = BufferSet<3>;

/// Configuration for a buffer-based [`Indicator`].
///
/// Every indicator has a corresponding config type that holds its parameters
/// (period count, applied price, etc). Configs are value types: cheap to
/// clone, compare, and hash.
pub trait IndicatorConfig: Sized + PartialEq + Eq + Hash + Display + Debug {
    /// Builder type for constructing this config.
    type Builder: IndicatorConfigBuilder<Self>;

    /// Returns a new builder with default values.
    fn builder() -> Self::Builder;

    /// Period count, already normalized to the working timeframe.
    ///
    /// May be below `2` after timeframe conversion, in which case engines
    /// skip computation.
    fn periods(&self) -> usize;

    /// Price field read from each bar.
    fn applied_price(&self) -> AppliedPrice;

    /// Per-cycle recompute cap.
    fn max_visible(&self) -> MaxVisible;
}

/// Builder for an [`IndicatorConfig`].
pub trait IndicatorConfigBuilder<Config>
where
    Config: IndicatorConfig,
{
    /// Sets the period count.
    #[must_use]
    fn periods(self, periods: usize) -> Self;

    /// Sets the applied price.
    #[must_use]
    fn applied_price(self, applied_price: AppliedPrice) -> Self;

    /// Sets the per-cycle recompute cap.
    #[must_use]
    fn max_visible(self, max_visible: MaxVisible) -> Self;

    /// Builds the config. Panics if required fields are missing.
    #[must_use]
    fn build(self) -> Config;
}

/// A technical indicator that fills offset-aligned output buffers one bar at
/// a time.
///
/// [`compute_bar`](Indicator::compute_bar) reads only bars at the same or
/// larger offset (equal or older data). Filling a range from the oldest bar
/// to the newest in one pass is therefore always safe. The
/// [`Engine`](crate::Engine) drives this from host notifications.
pub trait Indicator: Sized + Clone + Display + Debug {
    /// Configuration type for this indicator.
    type Config: IndicatorConfig;

    /// Buffer names in storage order.
    const BUFFER_NAMES: [&'static str; 3];

    /// Creates a new indicator with unsized buffers.
    fn new(config: Self::Config) -> Self;

    /// The active configuration.
    fn config(&self) -> &Self::Config;

    /// Minimum number of bars a single computation reads.
    fn window_size(&self) -> usize;

    /// Computes and stores the outputs for `bar`.
    ///
    /// # Errors
    ///
    /// Returns an error when the price series is shorter than the window or
    /// the computed value violates an invariant of the indicator. Buffers at
    /// `bar` are left untouched in both cases.
    fn compute_bar(&mut self, bar: usize, prices: &(impl PriceSeries + ?Sized)) -> Result<()>;

    /// Output buffers.
    fn buffers(&self) -> &Buffers;

    /// Mutable output buffers, used by the engine for reset and shift.
    fn buffers_mut(&mut self) -> &mut Buffers;
}
