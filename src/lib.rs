//! Incremental, buffer-based technical indicators for offset-indexed bar
//! series.
//!
//! Bars are addressed by offset: `0` is the newest, larger offsets are
//! older. Each indicator owns three output buffers aligned to those offsets
//! and fills them one bar at a time from a host-owned [`PriceSeries`].
//!
//! The [`Engine`] drives an indicator through host notifications ([`Tick`]):
//! it shifts buffers when new bars arrive, plans the smallest safe recompute
//! range with the [`InvalidationPlanner`] and fills it from the oldest
//! invalidated bar to the newest.
//!
//! Indicators:
//!
//! - [`Bands`]: moving average (SMA, EMA, LWMA, ALMA) with symmetric
//!   deviation bands.
//! - [`Fdi`]: fractal dimension index, classified into ranging and trending
//!   lines.
//!
//! Each indicator type exposes [`new`](Bands::new),
//! [`compute_bar`](Bands::compute_bar) and [`buffers`](Bands::buffers) as
//! inherent methods, so no trait import is needed. Import [`Indicator`] only
//! for generic code.
//!
//! Host inputs given as a fractional period count on another timeframe go
//! through [`Settings`], which validates them and produces the configs.
//!
//! The crate logs through [`tracing`] and installs no subscriber.

mod alma;
mod applied_price;
mod bands;
mod buffer;
mod engine;
mod error;
mod fdi;
mod indicator;
mod ma;
mod ohlcv;
mod planner;
mod price_window;
mod settings;

pub use crate::applied_price::AppliedPrice;
pub use crate::buffer::{BufferSet, OutputBuffer};
pub use crate::engine::{Engine, Status, Tick};
pub use crate::error::{IndicatorError, Result, SettingsError};
pub use crate::indicator::{Buffers, Indicator, IndicatorConfig, IndicatorConfigBuilder};
pub use crate::ohlcv::{Ohlcv, Price, PriceSeries};
pub use crate::planner::{InvalidationPlanner, MaxVisible, Plan, RecomputeRange};
pub use crate::settings::{MAX_PERIODS, Settings, Timeframe, normalize_periods};

pub use crate::alma::AlmaParams;
pub use crate::bands::{Bands, BandsConfig, BandsConfigBuilder, Deviation};
pub use crate::fdi::{FDI_MAX, FDI_MIN, FDI_THRESHOLD, Fdi, FdiConfig, FdiConfigBuilder};
pub use crate::ma::MaMethod;

macro_rules! impl_indicator_methods {
    ($type:ty, $config:ty) => {
        impl $type {
            /// See [`Indicator::new`].
            #[must_use]
            pub fn new(config: $config) -> Self {
                <Self as Indicator>::new(config)
            }

            /// See [`Indicator::compute_bar`].
            ///
            /// # Errors
            ///
            /// See [`Indicator::compute_bar`].
            #[inline]
            pub fn compute_bar(
                &mut self,
                bar: usize,
                prices: &(impl PriceSeries + ?Sized),
            ) -> Result<()> {
                <Self as Indicator>::compute_bar(self, bar, prices)
            }

            /// See [`Indicator::buffers`].
            #[must_use]
            #[inline]
            pub fn buffers(&self) -> &Buffers {
                <Self as Indicator>::buffers(self)
            }
        }
    };
}

impl_indicator_methods!(Bands, BandsConfig);
impl_indicator_methods!(Fdi, FdiConfig);

#[cfg(test)]
mod test_util;
