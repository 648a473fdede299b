use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::{
    AlmaParams, AppliedPrice, BandsConfig, Deviation, FDI_MAX, FDI_MIN, FDI_THRESHOLD, FdiConfig,
    IndicatorConfig, IndicatorConfigBuilder, MaMethod, MaxVisible, error::SettingsError,
};

/// Chart timeframe a period count is expressed in.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
    MN1,
}

impl Timeframe {
    /// Bar duration in minutes. A month counts as 30 days.
    #[must_use]
    pub fn minutes(self) -> u32 {
        match self {
            Self::M1 => 1,
            Self::M5 => 5,
            Self::M15 => 15,
            Self::M30 => 30,
            Self::H1 => 60,
            Self::H4 => 240,
            Self::D1 => 1_440,
            Self::W1 => 10_080,
            Self::MN1 => 43_200,
        }
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Converts a period count expressed on `from` bars into whole bars of `to`.
///
/// Exact halves round up; everything else rounds to the nearest bar. A value
/// counts as a half only when its shortest decimal form ends in `.5`, so
/// `2.5000000000000004` rounds like any other value.
///
/// ```
/// use quantedge_series::{Timeframe, normalize_periods};
///
/// assert_eq!(normalize_periods(20.0, Timeframe::H1, Timeframe::M15), 80);
/// assert_eq!(normalize_periods(5.0, Timeframe::M30, Timeframe::H1), 3);
/// assert_eq!(normalize_periods(5.0, Timeframe::H1, Timeframe::H4), 1);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn normalize_periods(count: f64, from: Timeframe, to: Timeframe) -> usize {
    let scaled = count * f64::from(from.minutes()) / f64::from(to.minutes());

    let whole = if scaled.to_string().ends_with(".5") {
        scaled.ceil()
    } else {
        scaled.round()
    };

    whole.max(0.0) as usize
}

/// Largest period count, in working-timeframe bars, a [`Settings`] converts
/// into a config.
pub const MAX_PERIODS: usize = 1_000_000;

/// Host-facing indicator inputs, typically deserialized from TOML.
///
/// Every field has a default, so a settings file only lists what it
/// overrides. [`bands`](Settings::bands) and [`fdi`](Settings::fdi) validate
/// the inputs and convert the period count to the working timeframe.
///
/// ```
/// use quantedge_series::{IndicatorConfig, MaMethod, Settings, Timeframe};
///
/// let settings: Settings = toml::from_str(
///     r#"
///     periods = 20
///     timeframe = "H1"
///     method = "EMA"
///     "#,
/// )
/// .unwrap();
///
/// let config = settings.bands(Timeframe::M30).unwrap();
/// assert_eq!(config.periods(), 40);
/// assert_eq!(config.method(), MaMethod::Ema);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Period count, possibly fractional, on [`timeframe`](Self::timeframe).
    pub periods: f64,
    /// Timeframe `periods` is expressed in. `None` means the working one.
    pub timeframe: Option<Timeframe>,
    pub method: MaMethod,
    pub applied_price: AppliedPrice,
    pub deviation_multiplier: f64,
    /// `-1` for unbounded, otherwise the per-cycle recompute cap.
    pub max_visible: i64,
    pub draw_as_line: bool,
    pub price_digits: u8,
    pub alma_offset: f64,
    pub alma_sigma: f64,
    /// FDI used on a flat window with nothing to carry forward.
    pub seed: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let alma = AlmaParams::default();

        Self {
            periods: 20.0,
            timeframe: None,
            method: MaMethod::Sma,
            applied_price: AppliedPrice::Close,
            deviation_multiplier: 2.0,
            max_visible: -1,
            draw_as_line: true,
            price_digits: 5,
            alma_offset: alma.offset(),
            alma_sigma: alma.sigma(),
            seed: FDI_THRESHOLD,
        }
    }
}

impl Settings {
    /// Period count in whole bars of `working`.
    ///
    /// # Errors
    ///
    /// [`SettingsError::InvalidPeriods`] when `periods` is not finite and
    /// positive, [`SettingsError::PeriodsTooLarge`] when it converts to more
    /// than [`MAX_PERIODS`] bars.
    pub fn periods_on(&self, working: Timeframe) -> Result<usize, SettingsError> {
        if !self.periods.is_finite() || self.periods <= 0.0 {
            return Err(SettingsError::InvalidPeriods(self.periods));
        }

        let periods = normalize_periods(self.periods, self.timeframe.unwrap_or(working), working);
        if periods > MAX_PERIODS {
            return Err(SettingsError::PeriodsTooLarge {
                periods: self.periods,
                max: MAX_PERIODS,
            });
        }

        Ok(periods)
    }

    /// Bands configuration for a chart on `working`.
    ///
    /// # Errors
    ///
    /// Returns the first rejected input.
    pub fn bands(&self, working: Timeframe) -> Result<BandsConfig, SettingsError> {
        let periods = self.periods_on(working)?;

        if !self.deviation_multiplier.is_finite() || self.deviation_multiplier < 0.0 {
            return Err(SettingsError::InvalidDeviation(self.deviation_multiplier));
        }

        Ok(BandsConfig::builder()
            .periods(periods)
            .method(self.method)
            .applied_price(self.applied_price)
            .deviation(Deviation::new(self.deviation_multiplier))
            .alma(self.alma()?)
            .max_visible(self.max_visible()?)
            .build())
    }

    /// FDI configuration for a chart on `working`.
    ///
    /// # Errors
    ///
    /// Returns the first rejected input.
    pub fn fdi(&self, working: Timeframe) -> Result<FdiConfig, SettingsError> {
        let periods = self.periods_on(working)?;

        if !(FDI_MIN..=FDI_MAX).contains(&self.seed) {
            return Err(SettingsError::InvalidSeed(self.seed));
        }

        Ok(FdiConfig::builder()
            .periods(periods)
            .applied_price(self.applied_price)
            .draw_as_line(self.draw_as_line)
            .price_digits(self.price_digits)
            .seed(self.seed)
            .max_visible(self.max_visible()?)
            .build())
    }

    fn max_visible(&self) -> Result<MaxVisible, SettingsError> {
        MaxVisible::from_host(self.max_visible)
            .ok_or(SettingsError::InvalidMaxVisible(self.max_visible))
    }

    fn alma(&self) -> Result<AlmaParams, SettingsError> {
        if !(0.0..=1.0).contains(&self.alma_offset) {
            return Err(SettingsError::InvalidAlmaParameter {
                name: "offset",
                value: self.alma_offset,
            });
        }
        if !self.alma_sigma.is_finite() || self.alma_sigma <= 0.0 {
            return Err(SettingsError::InvalidAlmaParameter {
                name: "sigma",
                value: self.alma_sigma,
            });
        }

        Ok(AlmaParams::new(self.alma_offset, self.alma_sigma))
    }
}
