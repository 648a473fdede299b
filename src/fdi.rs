use std::{
    f64::consts::LN_2,
    fmt::Display,
    hash::{Hash, Hasher},
};

use crate::{
    AppliedPrice, Buffers, Indicator, IndicatorConfig, IndicatorConfigBuilder, MaxVisible,
    PriceSeries,
    error::{IndicatorError, Result},
    price_window::PriceWindow,
};

/// FDI above this value is classified as ranging, at or below as trending.
pub const FDI_THRESHOLD: f64 = 1.5;

/// Lower bound of a valid fractal dimension.
pub const FDI_MIN: f64 = 1.0;

/// Upper bound of a valid fractal dimension.
pub const FDI_MAX: f64 = 2.0;

/// Configuration for the fractal dimension index ([`Fdi`]).
///
/// `seed` is the value used on a flat window (zero price range) when the
/// older neighbor bar has no FDI to carry forward. Defaults to `1.5`.
///
/// `price_digits` is the instrument precision the window range is rounded to
/// before use. Defaults to `5`.
///
/// # Example
///
/// ```
/// use quantedge_series::{FdiConfig, IndicatorConfig};
///
/// let config = FdiConfig::close(30);
///
/// assert_eq!(config.periods(), 30);
/// assert!(config.draw_as_line());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FdiConfig {
    periods: usize,
    applied_price: AppliedPrice,
    draw_as_line: bool,
    price_digits: u8,
    seed: f64,
    max_visible: MaxVisible,
}

impl PartialEq for FdiConfig {
    fn eq(&self, other: &Self) -> bool {
        self.periods == other.periods
            && self.applied_price == other.applied_price
            && self.draw_as_line == other.draw_as_line
            && self.price_digits == other.price_digits
            && self.seed.to_bits() == other.seed.to_bits()
            && self.max_visible == other.max_visible
    }
}

impl Eq for FdiConfig {}

impl Hash for FdiConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.periods.hash(state);
        self.applied_price.hash(state);
        self.draw_as_line.hash(state);
        self.price_digits.hash(state);
        self.seed.to_bits().hash(state);
        self.max_visible.hash(state);
    }
}

impl IndicatorConfig for FdiConfig {
    type Builder = FdiConfigBuilder;

    #[inline]
    fn builder() -> Self::Builder {
        FdiConfigBuilder::new()
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

impl FdiConfig {
    /// Connected lines (`true`) or discrete markers (`false`).
    #[inline]
    #[must_use]
    pub fn draw_as_line(&self) -> bool {
        self.draw_as_line
    }

    /// Decimal places the window range is rounded to.
    #[inline]
    #[must_use]
    pub fn price_digits(&self) -> u8 {
        self.price_digits
    }

    /// FDI assumed for a flat window with no older value to carry.
    #[inline]
    #[must_use]
    pub fn seed(&self) -> f64 {
        self.seed
    }

    /// FDI on closing prices, drawn as lines.
    #[must_use]
    pub fn close(periods: usize) -> Self {
        Self::builder().periods(periods).build()
    }
}

impl Display for FdiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FdiConfig({}, {}, {})",
            self.periods,
            self.applied_price,
            if self.draw_as_line { "line" } else { "markers" }
        )
    }
}

/// Builder for [`FdiConfig`].
///
/// Defaults: applied price = [`AppliedPrice::Close`], draw as line,
/// 5 price digits, seed = `1.5`, max visible = unbounded.
/// Periods must be set before calling
/// [`build`](IndicatorConfigBuilder::build).
pub struct FdiConfigBuilder {
    periods: Option<usize>,
    applied_price: AppliedPrice,
    draw_as_line: bool,
    price_digits: u8,
    seed: f64,
    max_visible: MaxVisible,
}

impl FdiConfigBuilder {
    fn new() -> Self {
        Self {
            periods: None,
            applied_price: AppliedPrice::Close,
            draw_as_line: true,
            price_digits: 5,
            seed: FDI_THRESHOLD,
            max_visible: MaxVisible::Unbounded,
        }
    }

    #[inline]
    #[must_use]
    pub fn draw_as_line(mut self, draw_as_line: bool) -> Self {
        self.draw_as_line = draw_as_line;
        self
    }

    #[inline]
    #[must_use]
    pub fn price_digits(mut self, price_digits: u8) -> Self {
        self.price_digits = price_digits;
        self
    }

    /// # Panics
    ///
    /// Panics if `seed` is outside `[1, 2]`.
    #[inline]
    #[must_use]
    pub fn seed(mut self, seed: f64) -> Self {
        assert!((FDI_MIN..=FDI_MAX).contains(&seed), "seed must lie in [1, 2]");
        self.seed = seed;
        self
    }
}

impl IndicatorConfigBuilder<FdiConfig> for FdiConfigBuilder {
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
    fn build(self) -> FdiConfig {
        FdiConfig {
            periods: self.periods.expect("periods is required"),
            applied_price: self.applied_price,
            draw_as_line: self.draw_as_line,
            price_digits: self.price_digits,
            seed: self.seed,
            max_visible: self.max_visible,
        }
    }
}

/// Fractal Dimension Index (FDI), Sevcik's estimate as adapted by Matulich.
///
/// For each bar the window spans `periods + 1` prices. With `N = periods` and
/// the window range `R = max − min` (rounded to the instrument precision):
///
/// ```text
/// L   = Σ_{i<N} √( ((p[i] − p[i+1]) / R)² + N⁻² )
/// FDI = 1 + (ln L + ln 2) / ln(2N)
/// ```
///
/// Smooth trends drive FDI toward 1, choppy ranges toward 2. A flat window
/// (`R = 0`) carries the older neighbor's FDI forward, or the configured seed
/// if there is none. A result outside `[1, 2]` is an
/// [`IndicatorError::InvariantViolation`].
///
/// Buffers, addressed by [`Fdi::MAIN`], [`Fdi::RANGING`] and
/// [`Fdi::TRENDING`]: `main` always holds the FDI; it is also copied to
/// `ranging` when above [`FDI_THRESHOLD`] and to `trending` otherwise, the
/// other line being empty at that bar. When drawn as lines, a line that
/// receives a value and is empty at the older neighbor bar gets that bar's
/// FDI, so it connects across a classification flip.
#[derive(Clone, Debug)]
pub struct Fdi {
    config: FdiConfig,
    log_2n: f64,
    inv_periods_sq: f64,
    precision: f64,
    window: PriceWindow,
    buffers: Buffers,
}

impl Fdi {
    pub const MAIN: usize = 0;
    pub const RANGING: usize = 1;
    pub const TRENDING: usize = 2;

    #[inline]
    fn line_for(fdi: f64) -> usize {
        if fdi > FDI_THRESHOLD {
            Self::RANGING
        } else {
            Self::TRENDING
        }
    }

    /// Writes `fdi` at `bar` and classifies it.
    pub(crate) fn place(&mut self, bar: usize, fdi: f64) {
        let active = Self::line_for(fdi);
        let inactive = if active == Self::RANGING {
            Self::TRENDING
        } else {
            Self::RANGING
        };

        self.buffers[Self::MAIN][bar] = Some(fdi);
        self.buffers[active][bar] = Some(fdi);
        self.buffers[inactive][bar] = None;

        let older = bar + 1;
        if older >= self.buffers.len() {
            return;
        }

        let older_fdi = self.buffers[Self::MAIN][older];
        // connector left by an earlier classification of `bar`
        if older_fdi.is_some_and(|value| Self::line_for(value) != inactive) {
            self.buffers[inactive][older] = None;
        }
        if self.config.draw_as_line && self.buffers[active][older].is_none() {
            self.buffers[active][older] = older_fdi;
        }
    }
}

#[inline]
fn round_to_precision(value: f64, precision: f64) -> f64 {
    (value * precision).round() / precision
}

impl Indicator for Fdi {
    type Config = FdiConfig;

    const BUFFER_NAMES: [&'static str; 3] = ["main", "ranging", "trending"];

    #[allow(clippy::cast_precision_loss)]
    fn new(config: Self::Config) -> Self {
        let periods = config.periods as f64;

        Self {
            config,
            log_2n: (2.0 * periods).ln(),
            inv_periods_sq: 1.0 / (periods * periods),
            precision: 10f64.powi(i32::from(config.price_digits)),
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
        self.config.periods.saturating_add(1)
    }

    fn compute_bar(&mut self, bar: usize, prices: &(impl PriceSeries + ?Sized)) -> Result<()> {
        let periods = self.config.periods;
        if periods < 2 {
            return Ok(());
        }

        let precision = self.precision;
        let inv_periods_sq = self.inv_periods_sq;
        let window = self.window.load(prices, bar, periods.saturating_add(1))?;

        let (low, high) = window
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), price| {
                (low.min(*price), high.max(*price))
            });
        let range = round_to_precision(high - low, precision);

        let fdi = if range > 0.0 {
            let length: f64 = window
                .windows(2)
                .map(|pair| {
                    let step = (pair[0] - pair[1]) / range;
                    step.mul_add(step, inv_periods_sq).sqrt()
                })
                .sum();

            let fdi = 1.0 + (length.ln() + LN_2) / self.log_2n;
            if !(FDI_MIN..=FDI_MAX).contains(&fdi) {
                return Err(IndicatorError::InvariantViolation {
                    bar,
                    value: fdi,
                    min: FDI_MIN,
                    max: FDI_MAX,
                });
            }
            fdi
        } else {
            self.buffers[Self::MAIN]
                .get(bar + 1)
                .unwrap_or(self.config.seed)
        };

        self.place(bar, fdi);

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

impl Display for Fdi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FDI({}, {})", self.config.periods, self.config.applied_price)
    }
}
