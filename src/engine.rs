use std::fmt::Display;

use tracing::{debug, trace, warn};

use crate::{
    Buffers, Indicator, IndicatorConfig, InvalidationPlanner, Plan, PriceSeries, error::Result,
};

/// Per-cycle notification from the host.
///
/// `changed_bars` counts the most recent bars the price feed reports as new
/// or modified; `shifted_bars` counts the new bars that pushed older ones to
/// higher offsets since the previous cycle.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Tick {
    pub changed_bars: usize,
    pub total_bars: usize,
    pub shifted_bars: usize,
    pub full_recalculation: bool,
}

impl Tick {
    /// Full reload: every bar is new.
    #[must_use]
    pub fn full(total_bars: usize) -> Self {
        Self {
            changed_bars: total_bars,
            total_bars,
            shifted_bars: 0,
            full_recalculation: true,
        }
    }

    /// `new_bars` bars were appended; the newest of the previously known bars
    /// may also have changed.
    #[must_use]
    pub fn new_bars(new_bars: usize, total_bars: usize) -> Self {
        Self {
            changed_bars: new_bars + 1,
            total_bars,
            shifted_bars: new_bars,
            full_recalculation: false,
        }
    }

    /// The newest bar was updated in place.
    #[must_use]
    pub fn repaint(total_bars: usize) -> Self {
        Self {
            changed_bars: 1,
            total_bars,
            shifted_bars: 0,
            full_recalculation: false,
        }
    }
}

/// Outcome of a successful update cycle.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Status {
    /// The planned range was recomputed.
    Ok,
    /// The configured period count is below two; nothing was computed and
    /// the buffers were left as they were.
    Idle,
    /// Not enough bars for a single window; retried on a later cycle.
    InsufficientHistory,
    /// The engine is not initialized, or the price feed does not yet hold
    /// the bars the notification announces.
    NotReady,
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Drives an [`Indicator`] through the host's attach / update / detach
/// lifecycle.
///
/// Each [`on_update`](Engine::on_update) call:
///
/// 1. resets the buffers on first use or a full recalculation, otherwise
///    shifts them by the number of new bars and aligns them to the
///    announced bar count;
/// 2. plans the recompute range from the changed-bar count, the
///    `max_visible` cap and the indicator's window;
/// 3. fills the range from the oldest invalidated bar to the newest.
///
/// A fault in step 3 stops the pass. Bars already filled keep their new
/// values, the failing bar and all newer ones keep their old values, and the
/// error is returned.
///
/// # Example
///
/// ```
/// use quantedge_series::{Engine, Fdi, FdiConfig, Indicator, Status, Tick};
/// # use quantedge_series::{Ohlcv, Price};
/// #
/// # struct Bar(f64);
/// # impl Ohlcv for Bar {
/// #     fn open(&self) -> Price { self.0 }
/// #     fn high(&self) -> Price { self.0 }
/// #     fn low(&self) -> Price { self.0 }
/// #     fn close(&self) -> Price { self.0 }
/// # }
///
/// let mut engine = Engine::<Fdi>::init(FdiConfig::close(3));
/// let mut history: Vec<Bar> = [1.0, 2.0].into_iter().map(Bar).collect();
///
/// assert_eq!(engine.on_update(&Tick::full(2), &history), Ok(Status::InsufficientHistory));
///
/// history.extend([4.0, 3.0].map(Bar));
/// assert_eq!(engine.on_update(&Tick::new_bars(2, 4), &history), Ok(Status::Ok));
/// assert!(engine.indicator().unwrap().buffers()[Fdi::MAIN].get(0).is_some());
///
/// engine.teardown();
/// assert_eq!(engine.on_update(&Tick::repaint(4), &history), Ok(Status::NotReady));
/// ```
#[derive(Clone, Debug)]
pub struct Engine<I: Indicator> {
    indicator: Option<I>,
    planner: InvalidationPlanner,
}

impl<I: Indicator> Engine<I> {
    /// Creates the indicator. Buffers are sized on the first update.
    #[must_use]
    pub fn init(config: I::Config) -> Self {
        debug!(%config, "indicator initialized");

        Self {
            planner: InvalidationPlanner::new(config.max_visible()),
            indicator: Some(I::new(config)),
        }
    }

    /// Replaces the configuration. All buffers are cleared and fully
    /// recomputed on the next update.
    pub fn reconfigure(&mut self, config: I::Config) {
        debug!(%config, "indicator reconfigured");

        self.planner = InvalidationPlanner::new(config.max_visible());
        self.indicator = Some(I::new(config));
    }

    /// Releases the indicator and its buffers. Later updates report
    /// [`Status::NotReady`] until [`reconfigure`](Self::reconfigure).
    pub fn teardown(&mut self) {
        if let Some(indicator) = self.indicator.take() {
            debug!(%indicator, "indicator released");
        }
    }

    /// `true` between [`init`](Self::init) and [`teardown`](Self::teardown).
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.indicator.is_some()
    }

    #[must_use]
    pub fn indicator(&self) -> Option<&I> {
        self.indicator.as_ref()
    }

    #[must_use]
    pub fn buffers(&self) -> Option<&Buffers> {
        self.indicator.as_ref().map(Indicator::buffers)
    }

    /// Processes one host notification.
    ///
    /// # Errors
    ///
    /// Returns the indicator's error when a bar in the planned range cannot
    /// be computed, such as an FDI outside `[1, 2]`.
    pub fn on_update(
        &mut self,
        tick: &Tick,
        prices: &(impl PriceSeries + ?Sized),
    ) -> Result<Status> {
        let Some(indicator) = self.indicator.as_mut() else {
            return Ok(Status::NotReady);
        };

        if prices.len() < tick.total_bars {
            debug!(
                available = prices.len(),
                announced = tick.total_bars,
                "price feed behind notification"
            );
            return Ok(Status::NotReady);
        }

        let buffers = indicator.buffers_mut();
        let changed_bars = if !buffers.is_sized() || tick.full_recalculation {
            debug!(total_bars = tick.total_bars, "buffers reset");
            buffers.reset(tick.total_bars);
            tick.total_bars
        } else {
            buffers.shift_sync(tick.shifted_bars);
            if buffers.len() != tick.total_bars {
                debug!(
                    from = buffers.len(),
                    to = tick.total_bars,
                    "history reindexed"
                );
                buffers.resize(tick.total_bars);
            }
            tick.changed_bars
        };

        if indicator.config().periods() < 2 {
            trace!(%indicator, "fewer than two periods, idle");
            return Ok(Status::Idle);
        }

        let range = match self
            .planner
            .plan(changed_bars, tick.total_bars, indicator.window_size())
        {
            Plan::Recompute(range) => range,
            Plan::InsufficientHistory => {
                trace!(
                    total_bars = tick.total_bars,
                    window = indicator.window_size(),
                    "insufficient history"
                );
                return Ok(Status::InsufficientHistory);
            }
        };

        debug!(start = range.start(), bars = range.len(), "recompute");

        for bar in range.bars() {
            if let Err(err) = indicator.compute_bar(bar, prices) {
                warn!(%indicator, bar, %err, "recompute aborted");
                return Err(err);
            }
        }

        Ok(Status::Ok)
    }
}
