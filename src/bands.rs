use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::{
    AppliedPrice, Buffers, Indicator, IndicatorConfig, IndicatorConfigBuilder, MaMethod,
    MaxVisible, PriceSeries,
    alma::{AlmaParams, AlmaWeights},
    error::Result,
    ma,
    price_window::PriceWindow,
};

/// Band offset multiplier, in standard deviations.
///
/// Wraps a finite, non-negative `f64`. Zero collapses the bands onto the
/// moving average. Defaults to `2.0`.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug)]
pub struct Deviation(f64);

impl Deviation {
    /// # Panics
    ///
    /// Panics if `value` is negative, infinite, or NaN.
    #[must_use]
    pub fn new(value: f64) -> Self {
        assert!(!value.is_nan(), "deviation must not be NaN");
        assert!(
            value.is_finite() && value >= 0.0,
            "deviation must be finite and non-negative"
        );
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Deviation {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Deviation {}

impl Hash for Deviation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl Default for Deviation {
    fn default() -> Self {
        Self(2.0)
    }
}

/// Configuration for the moving-average [`Bands`] indicator.
///
/// # Example
///
/// ```
/// use quantedge_series::{BandsConfig, Deviation, IndicatorConfig, IndicatorConfigBuilder, MaMethod};
///
/// let config = BandsConfig::builder()
///     .periods(20)
///     .method(MaMethod::Lwma)
///     .deviation(Deviation::new(1.5))
///     .build();
///
/// assert_eq!(config.periods(), 20);
/// assert_eq!(config.method(), MaMethod::Lwma);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct BandsConfig {
    periods: usize,
    method: MaMethod,
    applied_price: AppliedPrice,
    deviation: Deviation,
    max_visible: MaxVisible,
    alma: AlmaParams,
}

impl IndicatorConfig for BandsConfig {
    type Builder = BandsConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        BandsConfigBuilder::new()
    }

    #[inline]
    fn periods(&self) -> usize {
        self.periods
    }

    #[inline]
    fn applied_price(&self) -> AppliedPrice {
        self.applied_price
    }

    #[inline]
    fn max_visible(&self) -> MaxVisible {
        self.max_visible
    }
}

impl BandsConfig {
    /// Moving-average method for the middle line.
    #[inline]
    #[must_use]
    pub fn method(&self) -> MaMethod {
        self.method
    }

    /// Band offset in standard deviations.
    #[inline]
    #[must_use]
    pub fn deviation(&self) -> Deviation {
        self.deviation
    }

    /// ALMA kernel shape; ignored by the other methods.
    #[inline]
    #[must_use]
    pub fn alma(&self) -> AlmaParams {
        self.alma
    }

    /// Simple moving average of closes with 2σ bands.
    #[must_use]
    pub fn sma(periods: usize) -> Self {
        Self::builder().periods(periods).build()
    }

    /// Bands around a moving average of closes with the given method.
    #[must_use]
    pub fn close(periods: usize, method: MaMethod) -> Self {
        Self::builder().periods(periods).method(method).build()
    }
}

impl Display for BandsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BandsConfig({}, {}, {}, {})",
            self.periods,
            self.method,
            self.applied_price,
            self.deviation.value()
        )
    }
}

/// Builder for [`BandsConfig`].
///
/// Defaults: method = [`MaMethod::Sma`], applied price =
/// [`AppliedPrice::Close`], deviation = `2.0`, max visible = unbounded,
/// ALMA offset/sigma = `0.85`/`6.0`.
/// Periods must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct BandsConfigBuilder {
    periods: Option<usize>,
    method: MaMethod,
    applied_price: AppliedPrice,
    deviation: Deviation,
    max_visible: MaxVisible,
    alma: AlmaParams,
}

impl BandsConfigBuilder {
    fn new() -> Self {
        Self {
            periods: None,
            method: MaMethod::Sma,
            applied_price: AppliedPrice::Close,
            deviation: Deviation::default(),
            max_visible: MaxVisible::Unbounded,
            alma: AlmaParams::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn method(mut self, method: MaMethod) -> Self {
        self.method = method;
        self
    }

    #[inline]
    #[must_use]
    pub fn deviation(mut self, deviation: Deviation) -> Self {
        self.deviation = deviation;
        self
    }

    #[inline]
    #[must_use]
    pub fn alma(mut self, alma: AlmaParams) -> Self {
        self.alma = alma;
        self
    }
}

impl IndicatorConfigBuilder<BandsConfig> for BandsConfigBuilder {
    #[inline]
    fn periods(mut self, periods: usize) -> Self {
        self.periods.replace(periods);
        self
    }

    #[inline]
    fn applied_price(mut self, applied_price: AppliedPrice) -> Self {
        self.applied_price = applied_price;
        self
    }

    #[inline]
    fn max_visible(mut self, max_visible: MaxVisible) -> Self {
        self.max_visible = max_visible;
        self
    }

    #[inline]
    fn build(self) -> BandsConfig {
        BandsConfig {
            periods: self.periods.expect("periods is required"),
            method: self.method,
            applied_price: self.applied_price,
            deviation: self.deviation,
            max_visible: self.max_visible,
            alma: self.alma,
        }
    }
}

/// Moving average with symmetric deviation bands.
///
/// Three buffers, addressed by [`Bands::UPPER`], [`Bands::MAIN`] and
/// [`Bands::LOWER`]:
///
/// ```text
/// upper = ma + k × dev
/// main  = ma
/// lower = ma − k × dev
/// ```
///
/// For SMA, EMA and LWMA, `dev` is the sample standard deviation (`n − 1`)
/// of the window's residuals against `ma`. For ALMA, `ma` is the
/// Gaussian-weighted average while `dev` is the square root of the
/// *unweighted* mean of squared residuals against it (`n`).
///
/// EMA continues from the already computed middle value of the older
/// neighbor bar and seeds with the window SMA where none exists.
///
/// With fewer than two periods nothing is computed and the buffers are left
/// as they are.
///
/// # Example
///
/// ```
/// use quantedge_series::{Bands, BandsConfig, Indicator, IndicatorConfig, IndicatorConfigBuilder};
/// use quantedge_series::{Deviation, Engine, Ohlcv, Price, Status, Tick};
/// #
/// # struct Bar(f64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// # }
///
/// let config = BandsConfig::builder()
///     .periods(2)
///     .deviation(Deviation::new(1.0))
///     .build();
/// let mut engine = Engine::<Bands>::init(config);
///
/// let history: Vec<Bar> = [1.0, 2.0, 3.0, 4.0].into_iter().map(Bar).collect();
/// assert_eq!(engine.on_update(&Tick::full(4), &history), Ok(Status::Ok));
///
/// let bands = engine.indicator().unwrap();
/// assert_eq!(bands.buffers()[Bands::MAIN].get(0), Some(3.5));
/// ```
#[derive(Clone, Debug)]
pub struct Bands {
    config: BandsConfig,
    alpha: f64,
    multiplier: f64,
    alma: AlmaWeights,
    window: PriceWindow,
    buffers: Buffers,
}

impl Bands {
    pub const UPPER: usize = 0;
    pub const MAIN: usize = 1;
    pub const LOWER: usize = 2;
}

impl Indicator for Bands {
    type Config = BandsConfig;

    const BUFFER_NAMES: [&'static str; 3] = ["upper", "main", "lower"];

    fn new(config: Self::Config) -> Self {
        Self {
            config,
            alpha: ma::ema_alpha(config.periods),
            multiplier: config.deviation.value(),
            alma: AlmaWeights::new(config.alma),
            window: PriceWindow::new(config.applied_price),
            buffers: Buffers::new(Self::BUFFER_NAMES),
        }
    }

    #[inline]
    fn config(&self) -> &Self::Config {
        &self.config
    }

    #[inline]
    fn window_size(&self) -> usize {
        self.config.periods
    }

    fn compute_bar(&mut self, bar: usize, prices: &(impl PriceSeries + ?Sized)) -> Result<()> {
        let periods = self.config.periods;
        if periods < 2 {
            return Ok(());
        }

        let window = self.window.load(prices, bar, periods)?;

        let (average, dev) = match self.config.method {
            MaMethod::Sma => {
                let average = ma::sma(window);
                (average, ma::sample_std_dev(window, average))
            }
            MaMethod::Lwma => {
                let average = ma::lwma(window);
                (average, ma::sample_std_dev(window, average))
            }
            MaMethod::Ema => {
                let average = match self.buffers[Self::MAIN].get(bar + 1) {
                    Some(previous) => ma::ema_step(previous, window[0], self.alpha),
                    None => ma::sma(window),
                };
                (average, ma::sample_std_dev(window, average))
            }
            MaMethod::Alma => {
                self.alma.ensure(periods);
                let average = ma::weighted(window, self.alma.weights());
                (average, ma::mean_square_dev(window, average))
            }
        };

        let offset = dev * self.multiplier;

        self.buffers[Self::UPPER][bar] = Some(average + offset);
        self.buffers[Self::MAIN][bar] = Some(average);
        self.buffers[Self::LOWER][bar] = Some(average - offset);

        Ok(())
    }

    #[inline]
    fn buffers(&self) -> &Buffers {
        &self.buffers
    }

    #[inline]
    fn buffers_mut(&mut self) -> &mut Buffers {
        &mut self.buffers
    }
}

impl Display for Bands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bands({}, {}, {}, {})",
            self.config.periods, self.config.method, self.config.applied_price, self.multiplier,
        )
    }
}
